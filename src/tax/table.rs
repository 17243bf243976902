//! Versioned tax tables. The 2024 table is bundled; other years load from
//! TOML with the same layout as `data/tax_2024.toml`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::tax::FilingStatus;

const TAX_2024: &str = include_str!("../../data/tax_2024.toml");

/// One marginal band. `upper: None` marks the open top bracket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bracket {
    #[serde(default)]
    pub upper: Option<f64>,
    pub rate: f64,
}

/// One value per filing status; lookups are exhaustive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerStatus<T> {
    pub single: T,
    pub married_filing_jointly: T,
    pub married_filing_separately: T,
    pub head_of_household: T,
}

impl<T> PerStatus<T> {
    pub fn get(&self, status: FilingStatus) -> &T {
        match status {
            FilingStatus::Single => &self.single,
            FilingStatus::MarriedFilingJointly => &self.married_filing_jointly,
            FilingStatus::MarriedFilingSeparately => &self.married_filing_separately,
            FilingStatus::HeadOfHousehold => &self.head_of_household,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaxTable {
    pub year: u16,
    pub standard_deduction: PerStatus<f64>,
    pub brackets: PerStatus<Vec<Bracket>>,
}

impl TaxTable {
    pub fn tax_year_2024() -> Result<Self, TableError> {
        Self::from_toml(TAX_2024)
    }

    pub fn from_toml(raw: &str) -> Result<Self, TableError> {
        let table: TaxTable = toml::from_str(raw)?;
        table.validate()?;
        Ok(table)
    }

    pub fn from_path(path: &Path) -> Result<Self, TableError> {
        if !path.exists() {
            return Err(TableError::NotFound(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path).map_err(|source| TableError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_toml(&raw)?;
        log::info!("loaded {} tax table from {}", table.year, path.display());
        Ok(table)
    }

    /// Uppers strictly ascending, last bracket open, rates in [0, 1],
    /// deductions non-negative.
    pub fn validate(&self) -> Result<(), TableError> {
        for status in FilingStatus::ALL {
            let label = status.as_str();
            let invalid = |reason: String| TableError::Invalid {
                status: label,
                reason,
            };

            let deduction = *self.standard_deduction.get(status);
            if !deduction.is_finite() || deduction < 0.0 {
                return Err(invalid(format!("standard deduction {deduction} is negative")));
            }

            let brackets = self.brackets.get(status);
            let Some((last, bounded)) = brackets.split_last() else {
                return Err(invalid("no brackets".to_string()));
            };
            if last.upper.is_some() {
                return Err(invalid("top bracket must have no upper bound".to_string()));
            }

            let mut previous = 0.0;
            for (idx, bracket) in bounded.iter().enumerate() {
                let Some(upper) = bracket.upper else {
                    return Err(invalid(format!("bracket {idx} is unbounded but not last")));
                };
                if !upper.is_finite() || upper <= previous {
                    return Err(invalid(format!(
                        "bracket {idx} upper {upper} does not exceed {previous}"
                    )));
                }
                previous = upper;
            }

            if let Some(bad) = brackets
                .iter()
                .find(|b| !(0.0..=1.0).contains(&b.rate))
            {
                return Err(invalid(format!("rate {} outside [0, 1]", bad.rate)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn bundled_table_matches_2024_figures() {
        let table = TaxTable::tax_year_2024().unwrap();
        assert_eq!(table.year, 2024);
        assert_eq!(*table.standard_deduction.get(FilingStatus::Single), 14600.0);
        assert_eq!(
            *table.standard_deduction.get(FilingStatus::MarriedFilingJointly),
            29200.0
        );
        assert_eq!(
            *table.standard_deduction.get(FilingStatus::MarriedFilingSeparately),
            14600.0
        );
        assert_eq!(*table.standard_deduction.get(FilingStatus::HeadOfHousehold), 21900.0);

        let single = table.brackets.get(FilingStatus::Single);
        assert_eq!(single.len(), 7);
        assert_eq!(single[0], Bracket { upper: Some(11600.0), rate: 0.10 });
        assert_eq!(single[6], Bracket { upper: None, rate: 0.37 });
        assert_eq!(
            table.brackets.get(FilingStatus::MarriedFilingSeparately)[5].upper,
            Some(365600.0)
        );
        assert_eq!(
            table.brackets.get(FilingStatus::HeadOfHousehold)[4].upper,
            Some(243700.0)
        );
    }

    fn table_with_single(brackets: Vec<Bracket>) -> TaxTable {
        let mut table = TaxTable::tax_year_2024().unwrap();
        table.brackets.single = brackets;
        table
    }

    #[test]
    fn rejects_descending_uppers() {
        let table = table_with_single(vec![
            Bracket { upper: Some(5000.0), rate: 0.1 },
            Bracket { upper: Some(4000.0), rate: 0.2 },
            Bracket { upper: None, rate: 0.3 },
        ]);
        assert!(matches!(
            table.validate(),
            Err(TableError::Invalid { status: "single", .. })
        ));
    }

    #[test]
    fn rejects_bounded_top_bracket() {
        let table = table_with_single(vec![Bracket { upper: Some(5000.0), rate: 0.1 }]);
        assert!(table.validate().is_err());
    }

    #[test]
    fn rejects_rate_above_one() {
        let table = table_with_single(vec![Bracket { upper: None, rate: 1.5 }]);
        assert!(table.validate().is_err());
    }

    #[test]
    fn rejects_negative_deduction() {
        let mut table = TaxTable::tax_year_2024().unwrap();
        table.standard_deduction.head_of_household = -1.0;
        assert!(matches!(
            table.validate(),
            Err(TableError::Invalid { status: "head_of_household", .. })
        ));
    }

    #[test]
    fn missing_status_is_a_parse_error() {
        let raw = r#"
year = 2025
[standard_deduction]
single = 15000.0
"#;
        assert!(matches!(TaxTable::from_toml(raw), Err(TableError::Parse(_))));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tax.toml");
        std::fs::write(&path, TAX_2024).unwrap();
        assert_eq!(TaxTable::from_path(&path).unwrap(), TaxTable::tax_year_2024().unwrap());
        assert!(matches!(
            TaxTable::from_path(&dir.path().join("absent.toml")),
            Err(TableError::NotFound(_))
        ));
    }
}
