use crate::core::model::{ConversionFault, DocumentType, FieldValue, ParsedDocument, Summary};
use crate::extract::payer::{FEDERAL_WITHHELD_1099, INT_INTEREST, NEC_COMPENSATION};
use crate::extract::wage::{W2_FEDERAL_WITHHELD, W2_WAGES};

/// Income and federal-withholding field for each form type.
pub fn designated_fields(form_type: DocumentType) -> (&'static str, &'static str) {
    match form_type {
        DocumentType::WageStatement => (W2_WAGES, W2_FEDERAL_WITHHELD),
        DocumentType::InterestStatement => (INT_INTEREST, FEDERAL_WITHHELD_1099),
        DocumentType::CompensationStatement => (NEC_COMPENSATION, FEDERAL_WITHHELD_1099),
    }
}

/// `None` for missing fields and for values that are not a usable
/// non-negative amount.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

fn amount_of(
    doc: &ParsedDocument,
    field: &'static str,
    faults: &mut Vec<ConversionFault>,
) -> f64 {
    let Some(FieldValue::Value(raw)) = doc.field(field) else {
        return 0.0;
    };
    match parse_amount(raw) {
        Some(amount) => amount,
        None => {
            log::warn!(
                "{}: '{}' value '{raw}' is not an amount, counted as zero",
                doc.filename,
                field
            );
            faults.push(ConversionFault {
                filename: doc.filename.clone(),
                field,
                raw: raw.clone(),
            });
            0.0
        }
    }
}

/// Folds every document into the income and withholding totals. A bad field
/// only zeroes its own contribution.
pub fn aggregate(documents: &[ParsedDocument]) -> Summary {
    let mut summary = Summary::default();

    for doc in documents {
        let (income_field, withholding_field) = designated_fields(doc.form_type);
        let income = amount_of(doc, income_field, &mut summary.faults);
        let withheld = amount_of(doc, withholding_field, &mut summary.faults);

        match doc.form_type {
            DocumentType::WageStatement => summary.income.add_wages(income),
            DocumentType::InterestStatement => summary.income.add_interest(income),
            DocumentType::CompensationStatement => summary.income.add_nonemployee_comp(income),
        }
        summary.withholding.add_federal(withheld);
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{FieldRecord, LayoutCheck};
    use crate::extract::payer::{INT_SCHEMA, NEC_SCHEMA};
    use crate::extract::wage::W2_SCHEMA;
    use pretty_assertions::assert_eq;

    fn doc(form_type: DocumentType, values: &[(&str, &str)]) -> ParsedDocument {
        let schema = match form_type {
            DocumentType::WageStatement => W2_SCHEMA,
            DocumentType::InterestStatement => INT_SCHEMA,
            DocumentType::CompensationStatement => NEC_SCHEMA,
        };
        let mut fields = FieldRecord::from_schema(schema);
        for (name, value) in values {
            fields.set(name, *value);
        }
        ParsedDocument {
            filename: format!("{form_type}.pdf"),
            form_type,
            fields,
            notes: vec![],
            layout: LayoutCheck::Complete,
        }
    }

    fn batch() -> Vec<ParsedDocument> {
        vec![
            doc(
                DocumentType::WageStatement,
                &[(W2_WAGES, "5015.97"), (W2_FEDERAL_WITHHELD, "119.31")],
            ),
            doc(
                DocumentType::InterestStatement,
                &[(INT_INTEREST, "1200.00"), (FEDERAL_WITHHELD_1099, "1000.00")],
            ),
            doc(
                DocumentType::CompensationStatement,
                &[(NEC_COMPENSATION, "12,345.00"), (FEDERAL_WITHHELD_1099, "0.00")],
            ),
        ]
    }

    #[test]
    fn sums_each_bucket() {
        let summary = aggregate(&batch());
        assert_eq!(summary.income.w2_wages, 5015.97);
        assert_eq!(summary.income.int_interest, 1200.0);
        assert_eq!(summary.income.nec_nonemployee_comp, 12345.0);
        assert!((summary.withholding.federal - 1119.31).abs() < 1e-9);
        assert!(summary.faults.is_empty());
    }

    #[test]
    fn order_does_not_change_totals() {
        let forward = aggregate(&batch());
        let mut reversed = batch();
        reversed.reverse();
        let backward = aggregate(&reversed);
        assert!((forward.income.total() - backward.income.total()).abs() < 1e-9);
        assert!((forward.withholding.federal - backward.withholding.federal).abs() < 1e-9);
    }

    #[test]
    fn missing_counts_as_zero() {
        let summary = aggregate(&[doc(DocumentType::WageStatement, &[])]);
        assert_eq!(summary, Summary::default());
    }

    #[test]
    fn bad_value_only_zeroes_its_bucket() {
        let docs = vec![
            doc(
                DocumentType::WageStatement,
                &[(W2_WAGES, "5O15.97"), (W2_FEDERAL_WITHHELD, "119.31")],
            ),
            doc(DocumentType::InterestStatement, &[(INT_INTEREST, "1200.00")]),
        ];
        let summary = aggregate(&docs);
        assert_eq!(summary.income.w2_wages, 0.0);
        assert_eq!(summary.income.int_interest, 1200.0);
        assert_eq!(summary.withholding.federal, 119.31);
        assert_eq!(summary.faults.len(), 1);
        assert_eq!(summary.faults[0].raw, "5O15.97");
    }

    #[test]
    fn empty_batch_is_zero() {
        assert_eq!(aggregate(&[]), Summary::default());
    }
}
