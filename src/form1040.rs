//! Form 1040 line items for a downstream form filler. Nothing here renders a
//! PDF; it only lays the batch results out by line number.

use serde::{Deserialize, Serialize};

use crate::aggregate::parse_amount;
use crate::core::model::{DocumentType, FieldValue, ParsedDocument, TaxResult};
use crate::extract::payer::{FEDERAL_WITHHELD_1099, INT_INTEREST, INT_TAX_EXEMPT, NEC_COMPENSATION};
use crate::extract::wage::{W2_EMPLOYEE_SSN, W2_EMPLOYER_EIN, W2_FEDERAL_WITHHELD, W2_WAGES};
use crate::tax::{round2, FilingStatus};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Identity {
    pub taxpayer_name: String,
    /// Empty means "use the first W-2 employee SSN".
    pub taxpayer_ssn: String,
    pub address_line: String,
    pub filing_status: FilingStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Form1040Lines {
    pub taxpayer_name: String,
    pub taxpayer_ssn: String,
    pub address_line: String,
    pub filing_status: FilingStatus,
    pub employer_ein: String,

    pub line1a_wages: f64,
    pub line2a_tax_exempt_interest: f64,
    pub line2b_taxable_interest: f64,
    pub line8_other_income: f64,
    pub line9_total_income: f64,
    pub line10_adjustments: f64,
    pub line11_agi: f64,
    pub line12_standard_deduction: f64,
    pub line15_taxable_income: f64,
    pub line16_tax: f64,
    pub line18_total_tax: f64,
    pub line25a_withheld_w2: f64,
    pub line25b_withheld_1099: f64,
    pub line25d_total_withheld: f64,
    pub line33_total_payments: f64,
    pub line34_refund: f64,
    pub line37_amount_owed: f64,
}

fn amount(doc: &ParsedDocument, field: &str) -> f64 {
    doc.field(field)
        .and_then(FieldValue::value)
        .and_then(parse_amount)
        .unwrap_or(0.0)
}

fn first_value(documents: &[ParsedDocument], form_type: DocumentType, field: &str) -> Option<String> {
    documents
        .iter()
        .filter(|doc| doc.form_type == form_type)
        .find_map(|doc| doc.field(field).and_then(FieldValue::value))
        .map(str::to_string)
}

impl Form1040Lines {
    pub fn build(documents: &[ParsedDocument], tax: &TaxResult, identity: &Identity) -> Self {
        let mut lines = Form1040Lines {
            taxpayer_name: identity.taxpayer_name.clone(),
            taxpayer_ssn: identity.taxpayer_ssn.clone(),
            address_line: identity.address_line.clone(),
            filing_status: identity.filing_status,
            ..Form1040Lines::default()
        };

        if lines.taxpayer_ssn.is_empty() {
            if let Some(ssn) = first_value(documents, DocumentType::WageStatement, W2_EMPLOYEE_SSN) {
                lines.taxpayer_ssn = ssn;
            }
        }
        lines.employer_ein =
            first_value(documents, DocumentType::WageStatement, W2_EMPLOYER_EIN).unwrap_or_default();

        for doc in documents {
            match doc.form_type {
                DocumentType::WageStatement => {
                    lines.line1a_wages += amount(doc, W2_WAGES);
                    lines.line25a_withheld_w2 += amount(doc, W2_FEDERAL_WITHHELD);
                }
                DocumentType::InterestStatement => {
                    lines.line2a_tax_exempt_interest += amount(doc, INT_TAX_EXEMPT);
                    lines.line2b_taxable_interest += amount(doc, INT_INTEREST);
                    lines.line25b_withheld_1099 += amount(doc, FEDERAL_WITHHELD_1099);
                }
                DocumentType::CompensationStatement => {
                    lines.line8_other_income += amount(doc, NEC_COMPENSATION);
                    lines.line25b_withheld_1099 += amount(doc, FEDERAL_WITHHELD_1099);
                }
            }
        }

        lines.line1a_wages = round2(lines.line1a_wages);
        lines.line2a_tax_exempt_interest = round2(lines.line2a_tax_exempt_interest);
        lines.line2b_taxable_interest = round2(lines.line2b_taxable_interest);
        lines.line8_other_income = round2(lines.line8_other_income);
        lines.line25a_withheld_w2 = round2(lines.line25a_withheld_w2);
        lines.line25b_withheld_1099 = round2(lines.line25b_withheld_1099);

        lines.line9_total_income =
            round2(lines.line1a_wages + lines.line2b_taxable_interest + lines.line8_other_income);
        lines.line11_agi = tax.agi;
        lines.line12_standard_deduction = tax.standard_deduction;
        lines.line15_taxable_income = tax.taxable_income;
        lines.line16_tax = tax.estimated_tax;
        lines.line18_total_tax = tax.estimated_tax;
        lines.line25d_total_withheld = round2(lines.line25a_withheld_w2 + lines.line25b_withheld_1099);
        lines.line33_total_payments = lines.line25d_total_withheld;
        lines.line34_refund = tax.refund;
        lines.line37_amount_owed = tax.balance_due;

        lines
    }
}
