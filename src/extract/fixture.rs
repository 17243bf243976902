//! Demo fixtures. These return static values whatever the input and are
//! tagged `LayoutCheck::Fixture`; they are not for production use.

use crate::core::model::{DocumentType, FieldRecord, LayoutCheck, ParsedDocument, MISSING};
use crate::extract::payer::{INT_SCHEMA, NEC_SCHEMA};
use crate::extract::{DocumentInput, FieldExtractor};

const INT_FIXTURE: &[(&str, &str)] = &[
    ("payer_name_address", "MICHAEL M JORDAN, STERLING HEIGHTS, LANSING MI 48310, 5172009968"),
    ("payer_tin", "10-9920202"),
    ("recipient_tin", "101-42-0204"),
    ("recipient_name_address", "WEST LIFE INSURANCE, 9 PRAIRIE COURT, BALTIMORE MD 20601"),
    ("account_number", "00202072"),
    ("payer_rtn", "5172009968"),
    ("box_1_interest_income", "1200.00"),
    ("box_2_early_withdrawal_penalty", "3000.00"),
    ("box_3_us_savings_bonds_interest", "6500.00"),
    ("box_4_federal_income_tax_withheld", "1000.00"),
    ("box_5_investment_expenses", "1780.00"),
    ("box_6_foreign_tax_paid", "1854.00"),
    ("box_7_foreign_country", MISSING),
    ("box_8_tax_exempt_interest", "3250.00"),
    ("box_9_specified_private_activity_bond_interest", "850.00"),
    ("box_10_market_discount", "1040.00"),
    ("box_11_bond_premium", "1800.00"),
    ("box_12_bond_premium_treasury", "4080.00"),
    ("box_13_bond_premium_tax_exempt", "1450.00"),
    ("box_14_tax_exempt_tax_credit_bond_no", MISSING),
    ("box_15_state", "MI"),
    ("box_16_state_identification_no", MISSING),
    ("box_17_state_tax_withheld", MISSING),
];

const NEC_FIXTURE: &[(&str, &str)] = &[
    ("payer_name_address", "Business Company, 1234 Long Street, Bigtown, US State, 12345"),
    ("payer_tin", "12-3456789"),
    ("recipient_tin", "123-45-6789"),
    ("recipient_name_address", "Peter Payer, 5678 Short Ave., Littleville, US State, 67890"),
    ("account_number", "X"),
    ("tax_year", "2021"),
    ("box_1_nonemployee_compensation", "12345.00"),
    ("box_2_sales_over_5000_checkbox", "unchecked"),
    ("box_3_other_income", "0.00"),
    ("box_4_federal_income_tax_withheld", "0.00"),
    ("box_5_state_tax_withheld", "0.00"),
    ("box_6_state_payer_state_no", "ST 123456"),
    ("box_7_state_income", "12345.00"),
];

#[derive(Debug, Clone)]
pub struct FixtureExtractor {
    form_type: DocumentType,
    schema: &'static [&'static str],
    values: &'static [(&'static str, &'static str)],
}

impl FixtureExtractor {
    pub fn interest() -> Self {
        Self {
            form_type: DocumentType::InterestStatement,
            schema: INT_SCHEMA,
            values: INT_FIXTURE,
        }
    }

    pub fn compensation() -> Self {
        Self {
            form_type: DocumentType::CompensationStatement,
            schema: NEC_SCHEMA,
            values: NEC_FIXTURE,
        }
    }
}

impl FieldExtractor for FixtureExtractor {
    fn form_type(&self) -> DocumentType {
        self.form_type
    }

    fn extract(&self, input: &DocumentInput<'_>) -> ParsedDocument {
        let mut fields = FieldRecord::from_schema(self.schema);
        for (name, value) in self.values {
            if *value != MISSING {
                fields.set(name, *value);
            }
        }

        ParsedDocument {
            filename: input.filename.to_string(),
            form_type: self.form_type,
            fields,
            notes: vec![format!(
                "Fixture {} extractor: static demo values, not read from the document.",
                self.form_type
            )],
            layout: LayoutCheck::Fixture,
        }
    }
}
