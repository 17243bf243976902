pub mod calculator;
pub mod table;

pub use calculator::{compute_tax_summary, TaxCalculator};
pub use table::{Bracket, PerStatus, TaxTable};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownFilingStatus;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    #[default]
    Single,
    MarriedFilingJointly,
    MarriedFilingSeparately,
    HeadOfHousehold,
}

impl FilingStatus {
    pub const ALL: [FilingStatus; 4] = [
        FilingStatus::Single,
        FilingStatus::MarriedFilingJointly,
        FilingStatus::MarriedFilingSeparately,
        FilingStatus::HeadOfHousehold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilingStatus::Single => "single",
            FilingStatus::MarriedFilingJointly => "married_filing_jointly",
            FilingStatus::MarriedFilingSeparately => "married_filing_separately",
            FilingStatus::HeadOfHousehold => "head_of_household",
        }
    }

    /// Unknown or malformed input means `Single`.
    pub fn parse_lossy(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|_| {
            log::debug!("unknown filing status '{raw}', using single");
            FilingStatus::Single
        })
    }
}

impl fmt::Display for FilingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilingStatus {
    type Err = UnknownFilingStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let key = raw.trim().to_lowercase();
        FilingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == key)
            .ok_or_else(|| UnknownFilingStatus(raw.to_string()))
    }
}

/// Rounds half away from zero to cents.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
