use once_cell::sync::Lazy;
use regex::Regex;

/// Digit groups of 1-3 digits, optionally separated by `,` or whitespace in
/// 3-digit groups, followed by exactly two decimal digits.
pub const CURRENCY_PATTERN: &str = r"\b\d{1,3}(?:[,\s]?\d{3})*(?:\.\d{2})\b";

static CURRENCY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(CURRENCY_PATTERN).expect("currency pattern is a valid literal")
});

static CURRENCY_FULL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("^(?:{CURRENCY_PATTERN})$")).expect("currency pattern is a valid literal")
});

pub fn currency_regex() -> &'static Regex {
    &CURRENCY_RE
}

pub fn is_currency_token(token: &str) -> bool {
    CURRENCY_FULL_RE.is_match(token)
}

/// Strips thousands separators: `12,345.00` -> `12345.00`.
pub fn normalize_amount(token: &str) -> String {
    token
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect()
}

/// Every currency-shaped value in `text`, in order of appearance.
pub fn currency_tokens(text: &str) -> Vec<String> {
    CURRENCY_RE
        .find_iter(text)
        .map(|m| normalize_amount(m.as_str()))
        .collect()
}

/// First `n` currency tokens of an already tokenized word stream.
pub fn first_n_currency<'a, I>(tokens: I, n: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    tokens
        .into_iter()
        .filter(|token| is_currency_token(token))
        .map(normalize_amount)
        .take(n)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn recognizes_currency_tokens() {
        assert!(is_currency_token("5015.97"));
        assert!(is_currency_token("12,345.00"));
        assert!(is_currency_token("0.00"));
        assert!(!is_currency_token("1200"));
        assert!(!is_currency_token("12.5"));
        assert!(!is_currency_token("123-45-6789"));
        assert!(!is_currency_token("$12.00x"));
    }

    #[test]
    fn normalizes_separators() {
        assert_eq!(normalize_amount("1,234,567.89"), "1234567.89");
        assert_eq!(normalize_amount("1 234.00"), "1234.00");
    }

    #[test]
    fn harvests_tokens_from_text() {
        let text = "Box 1 wages 5,015.97 Box 2 withheld 311.00 EIN 12-3456789";
        assert_eq!(currency_tokens(text), vec!["5015.97", "311.00"]);
    }

    #[test]
    fn takes_first_n_in_order() {
        let words = ["Wages", "10.00", "x", "20.00", "30.00"];
        assert_eq!(first_n_currency(words, 2), vec!["10.00", "20.00"]);
    }
}
