//! Positional extractors for payer-issued statements (1099-INT, 1099-NEC).
//!
//! The Nth currency value in the document text goes to the Nth declared box.
//! That only holds while the payer's layout lists boxes in form order; the
//! layout check and notes make short or shifted layouts visible.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ExtractConfig;
use crate::core::currency::currency_tokens;
use crate::core::model::{DocumentType, LayoutCheck, ParsedDocument};
use crate::error::ConfigError;
use crate::extract::profile::{AssignmentPolicy, IdentityRule, LayoutProfile, TextView};
use crate::extract::{DocumentInput, FieldExtractor, EIN_PATTERN, SSN_PATTERN};

pub const INT_SCHEMA: &[&str] = &[
    "payer_name_address",
    "payer_tin",
    "recipient_tin",
    "recipient_name_address",
    "account_number",
    "payer_rtn",
    "box_1_interest_income",
    "box_2_early_withdrawal_penalty",
    "box_3_us_savings_bonds_interest",
    "box_4_federal_income_tax_withheld",
    "box_5_investment_expenses",
    "box_6_foreign_tax_paid",
    "box_7_foreign_country",
    "box_8_tax_exempt_interest",
    "box_9_specified_private_activity_bond_interest",
    "box_10_market_discount",
    "box_11_bond_premium",
    "box_12_bond_premium_treasury",
    "box_13_bond_premium_tax_exempt",
    "box_14_tax_exempt_tax_credit_bond_no",
    "box_15_state",
    "box_16_state_identification_no",
    "box_17_state_tax_withheld",
];

const INT_SLOTS: &[&str] = &[
    "box_1_interest_income",
    "box_2_early_withdrawal_penalty",
    "box_3_us_savings_bonds_interest",
    "box_4_federal_income_tax_withheld",
    "box_5_investment_expenses",
    "box_6_foreign_tax_paid",
    "box_8_tax_exempt_interest",
    "box_9_specified_private_activity_bond_interest",
    "box_10_market_discount",
    "box_11_bond_premium",
    "box_12_bond_premium_treasury",
    "box_13_bond_premium_tax_exempt",
    "box_17_state_tax_withheld",
];

pub const NEC_SCHEMA: &[&str] = &[
    "payer_name_address",
    "payer_tin",
    "recipient_tin",
    "recipient_name_address",
    "account_number",
    "tax_year",
    "box_1_nonemployee_compensation",
    "box_2_sales_over_5000_checkbox",
    "box_3_other_income",
    "box_4_federal_income_tax_withheld",
    "box_5_state_tax_withheld",
    "box_6_state_payer_state_no",
    "box_7_state_income",
];

const NEC_SLOTS: &[&str] = &[
    "box_1_nonemployee_compensation",
    "box_3_other_income",
    "box_4_federal_income_tax_withheld",
    "box_5_state_tax_withheld",
    "box_7_state_income",
];

pub const INT_INTEREST: &str = "box_1_interest_income";
pub const INT_TAX_EXEMPT: &str = "box_8_tax_exempt_interest";
pub const NEC_COMPENSATION: &str = "box_1_nonemployee_compensation";
/// Same box name on both 1099 variants.
pub const FEDERAL_WITHHELD_1099: &str = "box_4_federal_income_tax_withheld";

static PAYER_TIN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(EIN_PATTERN).expect("ein pattern"));
static RECIPIENT_TIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(SSN_PATTERN).expect("ssn pattern"));
static TAX_YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b20\d{2}\b").expect("year pattern"));

fn payer_identity() -> Vec<IdentityRule> {
    vec![
        IdentityRule::new("payer_tin", PAYER_TIN_RE.clone(), TextView::Collapsed),
        IdentityRule::new("recipient_tin", RECIPIENT_TIN_RE.clone(), TextView::Collapsed),
    ]
}

pub fn interest_profile() -> LayoutProfile {
    LayoutProfile {
        name: "1099-int",
        tax_year: 2024,
        schema: INT_SCHEMA,
        slots: INT_SLOTS,
        policy: AssignmentPolicy::Prefix,
        identity: payer_identity(),
    }
}

pub fn compensation_profile() -> LayoutProfile {
    let mut identity = payer_identity();
    identity.push(IdentityRule::new(
        "tax_year",
        TAX_YEAR_RE.clone(),
        TextView::Collapsed,
    ));
    LayoutProfile {
        name: "1099-nec",
        tax_year: 2024,
        schema: NEC_SCHEMA,
        slots: NEC_SLOTS,
        policy: AssignmentPolicy::Prefix,
        identity,
    }
}

#[derive(Debug, Clone)]
pub struct PayerStatementExtractor {
    form_type: DocumentType,
    profile: LayoutProfile,
}

impl PayerStatementExtractor {
    pub fn interest() -> Self {
        Self {
            form_type: DocumentType::InterestStatement,
            profile: interest_profile(),
        }
    }

    pub fn compensation() -> Self {
        Self {
            form_type: DocumentType::CompensationStatement,
            profile: compensation_profile(),
        }
    }

    /// Adds configured payer/recipient name anchors.
    pub fn with_anchors(mut self, config: &ExtractConfig) -> Result<Self, ConfigError> {
        if let Some(pattern) = &config.payer_anchor {
            self.profile = self
                .profile
                .with_rule(IdentityRule::anchor("payer_name_address", pattern)?);
        }
        if let Some(pattern) = &config.recipient_anchor {
            self.profile = self
                .profile
                .with_rule(IdentityRule::anchor("recipient_name_address", pattern)?);
        }
        Ok(self)
    }

}

impl FieldExtractor for PayerStatementExtractor {
    fn form_type(&self) -> DocumentType {
        self.form_type
    }

    fn extract(&self, input: &DocumentInput<'_>) -> ParsedDocument {
        let mut fields = self.profile.new_record();
        let tokens = currency_tokens(input.text);
        let layout = self.profile.assign(&tokens, &mut fields);
        self.profile.apply_identity(input.text, &mut fields);

        let mut notes = vec![format!(
            "{} currency tokens harvested for {} {} boxes",
            tokens.len(),
            self.profile.slots.len(),
            self.form_type
        )];
        if let LayoutCheck::Partial { found, expected } = layout {
            notes.push(format!(
                "Layout shorter than profile '{}': {found} of {expected} boxes filled",
                self.profile.name
            ));
        }
        notes.push("Boxes assigned by token order; verify against the source form.".to_string());
        notes.push(self.profile.note());

        ParsedDocument {
            filename: input.filename.to_string(),
            form_type: self.form_type,
            fields,
            notes,
            layout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::FieldValue;
    use pretty_assertions::assert_eq;

    fn input(text: &str) -> DocumentInput<'_> {
        DocumentInput {
            filename: "1099.pdf",
            bytes: b"",
            text,
            pdf: None,
        }
    }

    #[test]
    fn nec_boxes_follow_token_order() {
        let text = "PAYER'S TIN 12-3456789 RECIPIENT'S TIN 123-45-6789 2024 Form 1099-NEC \
                    1 Nonemployee compensation 12,345.00 3 0.00 4 Federal income tax withheld 500.00";
        let doc = PayerStatementExtractor::compensation().extract(&input(text));
        let value = |k: &str| doc.field(k).unwrap().clone();
        assert_eq!(value("box_1_nonemployee_compensation"), FieldValue::Value("12345.00".into()));
        assert_eq!(value("box_3_other_income"), FieldValue::Value("0.00".into()));
        assert_eq!(value("box_4_federal_income_tax_withheld"), FieldValue::Value("500.00".into()));
        assert_eq!(value("box_5_state_tax_withheld"), FieldValue::Missing);
        assert_eq!(value("payer_tin"), FieldValue::Value("12-3456789".into()));
        assert_eq!(value("recipient_tin"), FieldValue::Value("123-45-6789".into()));
        assert_eq!(value("tax_year"), FieldValue::Value("2024".into()));
        assert_eq!(doc.layout, LayoutCheck::Partial { found: 3, expected: 5 });
        assert_eq!(doc.notes.last().unwrap(), "Layout profile 1099-nec (tax year 2024)");
    }

    #[test]
    fn empty_text_is_all_missing() {
        let doc = PayerStatementExtractor::interest().extract(&input(""));
        assert_eq!(doc.form_type, DocumentType::InterestStatement);
        assert_eq!(doc.missing_fields(), INT_SCHEMA.to_vec());
        assert_eq!(doc.layout, LayoutCheck::Partial { found: 0, expected: 13 });
    }

    #[test]
    fn interest_prefix_fill() {
        let text = "Form 1099-INT Interest income 1,200.00 2 3000.00";
        let doc = PayerStatementExtractor::interest().extract(&input(text));
        assert_eq!(doc.field(INT_INTEREST).unwrap().as_str(), "1200.00");
        assert_eq!(doc.field("box_2_early_withdrawal_penalty").unwrap().as_str(), "3000.00");
        assert!(doc.field(FEDERAL_WITHHELD_1099).unwrap().is_missing());
    }
}
