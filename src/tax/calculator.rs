use crate::core::model::{IncomeComponents, TaxResult};
use crate::error::TableError;
use crate::tax::table::TaxTable;
use crate::tax::{round2, FilingStatus};

#[derive(Debug, Clone)]
pub struct TaxCalculator {
    table: TaxTable,
}

impl TaxCalculator {
    pub fn new(table: TaxTable) -> Self {
        Self { table }
    }

    pub fn tax_year_2024() -> Result<Self, TableError> {
        Ok(Self::new(TaxTable::tax_year_2024()?))
    }

    pub fn standard_deduction(&self, status: FilingStatus) -> f64 {
        *self.table.standard_deduction.get(status)
    }

    /// Marginal tax on `taxable`, rounded to cents once at the end.
    pub fn tax_from_brackets(&self, taxable: f64, status: FilingStatus) -> f64 {
        if taxable.is_nan() || taxable <= 0.0 {
            return 0.0;
        }

        let mut tax = 0.0;
        let mut previous = 0.0;
        let mut remaining = taxable;
        for bracket in self.table.brackets.get(status) {
            let Some(upper) = bracket.upper else {
                tax += remaining * bracket.rate;
                break;
            };
            let span = remaining.min(upper - previous);
            if span > 0.0 {
                tax += span * bracket.rate;
                remaining -= span;
            }
            previous = upper;
            if remaining <= 0.0 {
                break;
            }
        }
        round2(tax)
    }

    pub fn compute(
        &self,
        income: &IncomeComponents,
        withholding: f64,
        status: FilingStatus,
    ) -> TaxResult {
        let agi = income.w2_wages + income.interest + income.nec;
        let standard_deduction = self.standard_deduction(status);
        let taxable_income = (agi - standard_deduction).max(0.0);
        let estimated_tax = self.tax_from_brackets(taxable_income, status);
        let withholding = round2(withholding);

        log::debug!(
            "{status}: agi {agi:.2}, taxable {taxable_income:.2}, tax {estimated_tax:.2}, withheld {withholding:.2}"
        );

        TaxResult {
            wages: round2(income.w2_wages),
            interest: round2(income.interest),
            nec: round2(income.nec),
            agi: round2(agi),
            standard_deduction: round2(standard_deduction),
            taxable_income: round2(taxable_income),
            estimated_tax,
            withholding,
            balance_due: round2((estimated_tax - withholding).max(0.0)),
            refund: round2((withholding - estimated_tax).max(0.0)),
        }
    }

    /// Same as [`TaxCalculator::compute`] with a free-form status string;
    /// unknown statuses are treated as single.
    pub fn compute_str(&self, income: &IncomeComponents, withholding: f64, status: &str) -> TaxResult {
        self.compute(income, withholding, FilingStatus::parse_lossy(status))
    }
}

/// One-shot computation against the bundled 2024 table.
pub fn compute_tax_summary(
    income: &IncomeComponents,
    withholding: f64,
    filing_status: &str,
) -> Result<TaxResult, TableError> {
    Ok(TaxCalculator::tax_year_2024()?.compute_str(income, withholding, filing_status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn calculator() -> TaxCalculator {
        TaxCalculator::tax_year_2024().unwrap()
    }

    fn income(w2_wages: f64, interest: f64, nec: f64) -> IncomeComponents {
        IncomeComponents {
            w2_wages,
            interest,
            nec,
        }
    }

    #[test]
    fn single_filer_with_refund() {
        let result = calculator().compute(&income(5015.97, 1200.0, 12345.0), 1119.31, FilingStatus::Single);
        assert_eq!(result.agi, 18560.97);
        assert_eq!(result.standard_deduction, 14600.0);
        assert_eq!(result.taxable_income, 3960.97);
        assert_eq!(result.estimated_tax, 396.10);
        assert_eq!(result.withholding, 1119.31);
        assert_eq!(result.refund, 723.21);
        assert_eq!(result.balance_due, 0.0);
    }

    #[test]
    fn income_below_deduction_owes_nothing() {
        let result = calculator().compute(&income(10000.0, 0.0, 0.0), 0.0, FilingStatus::Single);
        assert_eq!(result.taxable_income, 0.0);
        assert_eq!(result.estimated_tax, 0.0);
        assert_eq!(result.balance_due, 0.0);
        assert_eq!(result.refund, 0.0);
    }

    #[test]
    fn zero_taxable_income_is_zero_tax_for_every_status() {
        let calc = calculator();
        for status in FilingStatus::ALL {
            let below = calc.standard_deduction(status) - 100.0;
            let result = calc.compute(&income(below, 0.0, 0.0), 250.0, status);
            assert_eq!(result.taxable_income, 0.0, "{status}");
            assert_eq!(result.estimated_tax, 0.0, "{status}");
            assert_eq!(result.balance_due, 0.0, "{status}");
            assert_eq!(result.refund, 250.0, "{status}");
        }
    }

    #[test]
    fn spans_multiple_brackets() {
        // 11600 * 0.10 + (47150 - 11600) * 0.12 + 2850 * 0.22
        let tax = calculator().tax_from_brackets(50000.0, FilingStatus::Single);
        assert_eq!(tax, 6053.0);
    }

    #[test]
    fn top_bracket_is_unbounded() {
        let calc = calculator();
        let at_top = calc.tax_from_brackets(609350.0, FilingStatus::Single);
        let above = calc.tax_from_brackets(709350.0, FilingStatus::Single);
        assert_eq!(round2(above - at_top), 37000.0);
    }

    #[test]
    fn balance_due_when_underwithheld() {
        let result = calculator().compute(&income(60000.0, 0.0, 0.0), 1000.0, FilingStatus::Single);
        assert!(result.balance_due > 0.0);
        assert_eq!(result.refund, 0.0);
        assert_eq!(result.balance_due, round2(result.estimated_tax - 1000.0));
    }

    #[test]
    fn tax_is_monotone_in_income() {
        let calc = calculator();
        for status in FilingStatus::ALL {
            let mut last = 0.0;
            for step in 0..200 {
                let tax = calc.tax_from_brackets(step as f64 * 5000.0, status);
                assert!(tax >= last, "{status} at {}", step * 5000);
                last = tax;
            }
        }
    }

    #[test]
    fn same_input_same_result() {
        let calc = calculator();
        let components = income(45000.0, 321.5, 800.0);
        let first = calc.compute(&components, 4000.0, FilingStatus::HeadOfHousehold);
        let second = calc.compute(&components, 4000.0, FilingStatus::HeadOfHousehold);
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_status_computes_as_single() {
        let calc = calculator();
        let components = income(80000.0, 0.0, 0.0);
        assert_eq!(
            calc.compute_str(&components, 0.0, "unknown_value"),
            calc.compute(&components, 0.0, FilingStatus::Single)
        );
    }

    #[test]
    fn joint_filers_get_larger_deduction() {
        let result = compute_tax_summary(&income(40000.0, 0.0, 0.0), 0.0, "married_filing_jointly")
            .unwrap();
        assert_eq!(result.standard_deduction, 29200.0);
        assert_eq!(result.taxable_income, 10800.0);
        assert_eq!(result.estimated_tax, 1080.0);
    }
}
