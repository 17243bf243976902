use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ExtractConfig;
use crate::core::currency::{currency_regex, first_n_currency, normalize_amount, CURRENCY_PATTERN};
use crate::core::model::{DocumentType, LayoutCheck, ParsedDocument};
use crate::error::ConfigError;
use crate::extract::profile::{AssignmentPolicy, IdentityRule, LayoutProfile, TextView};
use crate::extract::{DocumentInput, FieldExtractor, EIN_PATTERN, SSN_PATTERN};
use crate::parser::layout_builder::quadrant_tokens;
use crate::parser::WordSource;
use crate::text::ScratchPdf;

pub const W2_SCHEMA: &[&str] = &[
    "a_employee_ssn",
    "1_wages_tips_other_comp",
    "2_federal_income_tax_withheld",
    "b_employer_ein",
    "3_social_security_wages",
    "4_social_security_tax_withheld",
    "5_medicare_wages_and_tips",
    "6_medicare_tax_withheld",
    "c_employer_name_address_zip",
    "d_control_number",
    "e_employee_name_address_zip",
    "7_social_security_tips",
    "8_allocated_tips",
    "9_blank",
    "10_dependent_care_benefits",
    "11_nonqualified_plans",
    "12a_d_codes",
    "13_checkboxes",
    "14_other",
    "15_state_employer_id",
    "16_state_wages_tips",
    "17_state_income_tax",
    "18_local_wages_tips",
    "19_local_income_tax",
    "20_locality_name",
];

/// Order of the amounts in the employee copy, boxes 1 through 6.
pub const W2_SLOTS: &[&str] = &[
    "1_wages_tips_other_comp",
    "2_federal_income_tax_withheld",
    "3_social_security_wages",
    "4_social_security_tax_withheld",
    "5_medicare_wages_and_tips",
    "6_medicare_tax_withheld",
];

pub const W2_WAGES: &str = "1_wages_tips_other_comp";
pub const W2_FEDERAL_WITHHELD: &str = "2_federal_income_tax_withheld";
pub const W2_OTHER: &str = "14_other";
pub const W2_STATE_TAX: &str = "17_state_income_tax";
pub const W2_EMPLOYEE_SSN: &str = "a_employee_ssn";
pub const W2_EMPLOYER_EIN: &str = "b_employer_ein";

static SSN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(SSN_PATTERN).expect("ssn pattern"));
static EIN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(EIN_PATTERN).expect("ein pattern"));

pub fn w2_profile() -> LayoutProfile {
    LayoutProfile {
        name: "w2-copy-b",
        tax_year: 2024,
        schema: W2_SCHEMA,
        slots: W2_SLOTS,
        policy: AssignmentPolicy::AllOrNothing,
        identity: vec![
            IdentityRule::new(W2_EMPLOYEE_SSN, SSN_RE.clone(), TextView::Collapsed),
            IdentityRule::new(W2_EMPLOYER_EIN, EIN_RE.clone(), TextView::Collapsed),
        ],
    }
}

type BoxedWordSource = Box<dyn WordSource + Send + Sync>;

/// Reads boxes 1-6 from the top-left copy of a W-2 by token order, identity
/// numbers from the whole text, and state/other withholding from keyword and
/// state-code lines.
pub struct WageStatementExtractor {
    profile: LayoutProfile,
    words: BoxedWordSource,
    other_keyword: Option<Regex>,
    state_line: Option<Regex>,
}

impl WageStatementExtractor {
    pub fn new(words: BoxedWordSource) -> Self {
        Self {
            profile: w2_profile(),
            words,
            other_keyword: None,
            state_line: None,
        }
    }

    pub fn from_config(config: &ExtractConfig, words: BoxedWordSource) -> Result<Self, ConfigError> {
        let mut extractor = Self::new(words)
            .with_other_keywords(&config.other_withholding_keywords)?
            .with_state_codes(&config.state_codes)?;
        if let Some(pattern) = &config.employer_anchor {
            extractor.profile = extractor
                .profile
                .with_rule(IdentityRule::anchor("c_employer_name_address_zip", pattern)?);
        }
        if let Some(pattern) = &config.employee_anchor {
            extractor.profile = extractor
                .profile
                .with_rule(IdentityRule::anchor("e_employee_name_address_zip", pattern)?);
        }
        Ok(extractor)
    }

    pub fn with_other_keywords(mut self, keywords: &[String]) -> Result<Self, ConfigError> {
        self.other_keyword = keyword_regex(keywords)?;
        Ok(self)
    }

    pub fn with_state_codes(mut self, codes: &[String]) -> Result<Self, ConfigError> {
        self.state_line = state_code_regex(codes)?;
        Ok(self)
    }

    fn quadrant_tokens(&self, input: &DocumentInput<'_>, notes: &mut Vec<String>) -> Vec<String> {
        let pages = match input.pdf {
            Some(pdf) => self.words.page_words(pdf),
            None => ScratchPdf::new(input.bytes).and_then(|pdf| self.words.page_words(&pdf)),
        };
        match pages {
            Ok(pages) => quadrant_tokens(&pages),
            Err(err) => {
                log::warn!("word layout unavailable: {err:#}");
                notes.push(format!("Word layout unavailable: {err}"));
                Vec::new()
            }
        }
    }

    fn amount_after_keyword(&self, text: &str) -> Option<String> {
        let caps = self.other_keyword.as_ref()?.captures(text)?;
        caps.get(1).map(|m| normalize_amount(m.as_str()))
    }

    /// Last amount on the last state line: a known state code opening the
    /// line (after an optional "15 State" label) or followed by a state ID.
    fn state_line_amount(&self, text: &str) -> Option<String> {
        let state_line = self.state_line.as_ref()?;
        text.lines()
            .filter(|line| state_line.is_match(line))
            .filter_map(|line| currency_regex().find_iter(line).last())
            .last()
            .map(|m| normalize_amount(m.as_str()))
    }
}

fn keyword_regex(keywords: &[String]) -> Result<Option<Regex>, ConfigError> {
    if keywords.is_empty() {
        return Ok(None);
    }
    let alternation = keywords
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(r"(?i)(?:{alternation})\s*({CURRENCY_PATTERN})");
    Regex::new(&pattern)
        .map(Some)
        .map_err(|source| ConfigError::Pattern {
            field: "other_withholding_keywords",
            pattern,
            source,
        })
}

fn state_code_regex(codes: &[String]) -> Result<Option<Regex>, ConfigError> {
    if codes.is_empty() {
        return Ok(None);
    }
    let alternation = codes
        .iter()
        .map(|c| regex::escape(c))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(
        r"^\s*(?:15\s+)?(?:(?i:state)\s+)?(?:{alternation})\b|\b(?:{alternation})\s+\d[\d-]{{4,}}\b"
    );
    Regex::new(&pattern)
        .map(Some)
        .map_err(|source| ConfigError::Pattern {
            field: "state_codes",
            pattern,
            source,
        })
}

impl FieldExtractor for WageStatementExtractor {
    fn form_type(&self) -> DocumentType {
        DocumentType::WageStatement
    }

    fn extract(&self, input: &DocumentInput<'_>) -> ParsedDocument {
        let mut notes = Vec::new();
        let mut fields = self.profile.new_record();

        let tokens = self.quadrant_tokens(input, &mut notes);
        let first6 = first_n_currency(tokens.iter().map(String::as_str), self.profile.slots.len());
        let layout = self.profile.assign(&first6, &mut fields);

        self.profile.apply_identity(input.text, &mut fields);

        if let Some(amount) = self.amount_after_keyword(input.text) {
            fields.set(W2_OTHER, amount);
        }
        if let Some(amount) = self.state_line_amount(input.text) {
            fields.set(W2_STATE_TAX, amount);
        }

        notes.insert(0, format!("Copy B top-left words extracted: {} tokens", tokens.len()));
        notes.insert(
            1,
            format!("First 6 currency tokens (order-preserved): {first6:?}"),
        );
        if let LayoutCheck::Partial { found, expected } = layout {
            notes.push(format!(
                "Only {found} of {expected} box amounts found; boxes 1-6 left missing"
            ));
        }
        notes.push(self.profile.note());

        ParsedDocument {
            filename: input.filename.to_string(),
            form_type: DocumentType::WageStatement,
            fields,
            notes,
            layout,
        }
    }
}
