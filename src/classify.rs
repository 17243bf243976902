use unicode_normalization::UnicodeNormalization;

use crate::core::model::DocumentType;

const COMPENSATION_MARKERS: &[&str] = &["1099-nec", "nonemployee compensation"];
const INTEREST_MARKERS: &[&str] = &["1099-int", "interest income"];
const WAGE_MARKERS: &[&str] = &["w-2", "wage and tax statement"];

/// Collapses every whitespace run to one space and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// NFKC, collapse whitespace runs, trim, lowercase.
pub fn normalize_text(text: &str) -> String {
    let folded = text.nfkc().collect::<String>();
    collapse_whitespace(&folded).to_lowercase()
}

/// Compensation markers win over interest markers, which win over the
/// wage-statement default.
pub fn classify(normalized: &str) -> DocumentType {
    if COMPENSATION_MARKERS.iter().any(|m| normalized.contains(m)) {
        DocumentType::CompensationStatement
    } else if INTEREST_MARKERS.iter().any(|m| normalized.contains(m)) {
        DocumentType::InterestStatement
    } else {
        DocumentType::WageStatement
    }
}

/// True when the text carries an explicit wage-statement marker. Only used to
/// annotate documents that reached the wage extractor by default.
pub fn has_wage_marker(normalized: &str) -> bool {
    WAGE_MARKERS.iter().any(|m| normalized.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_spacing_and_case() {
        assert_eq!(
            normalize_text("  Form\n1099-NEC\t\tNonemployee   Compensation "),
            "form 1099-nec nonemployee compensation"
        );
    }

    #[test]
    fn folds_compatibility_characters() {
        // U+FB01 ligature and full-width digits as produced by some OCR runs
        assert_eq!(normalize_text("\u{FB01}eld １０９９-INT"), "field 1099-int");
    }

    #[test]
    fn compensation_beats_interest() {
        let text = "form 1099-nec nonemployee compensation see also interest income";
        assert_eq!(classify(text), DocumentType::CompensationStatement);
    }

    #[test]
    fn interest_beats_wage() {
        let text = "form w-2 wage and tax statement interest income";
        assert_eq!(classify(text), DocumentType::InterestStatement);
        assert_eq!(classify("form 1099-int"), DocumentType::InterestStatement);
    }

    #[test]
    fn defaults_to_wage_statement() {
        assert_eq!(classify(""), DocumentType::WageStatement);
        assert_eq!(classify("grocery receipt"), DocumentType::WageStatement);
        assert!(!has_wage_marker("grocery receipt"));
        assert!(has_wage_marker("form w-2 wage and tax statement"));
    }
}
