//! Age tier mapping
//!
//! A learner's age selects a set of tiers rather than a single tier;
//! adjacent tiers overlap by one neighbor so a work tagged for the next
//! band stays visible across a birthday boundary.

use crate::{Error, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Discrete age bucket used to filter age-appropriate works
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeTier {
    Toddler,
    PrimaryYear1,
    PrimaryYear2,
    PrimaryYear3,
    LowerElementary,
    UpperElementary,
}

impl AgeTier {
    /// All tiers, youngest first
    pub const ALL: [AgeTier; 6] = [
        AgeTier::Toddler,
        AgeTier::PrimaryYear1,
        AgeTier::PrimaryYear2,
        AgeTier::PrimaryYear3,
        AgeTier::LowerElementary,
        AgeTier::UpperElementary,
    ];

    /// Database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeTier::Toddler => "toddler",
            AgeTier::PrimaryYear1 => "primary_year1",
            AgeTier::PrimaryYear2 => "primary_year2",
            AgeTier::PrimaryYear3 => "primary_year3",
            AgeTier::LowerElementary => "lower_elementary",
            AgeTier::UpperElementary => "upper_elementary",
        }
    }

    /// Parse a tier tag
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "toddler" => Ok(AgeTier::Toddler),
            "primary_year1" => Ok(AgeTier::PrimaryYear1),
            "primary_year2" => Ok(AgeTier::PrimaryYear2),
            "primary_year3" => Ok(AgeTier::PrimaryYear3),
            "lower_elementary" => Ok(AgeTier::LowerElementary),
            "upper_elementary" => Ok(AgeTier::UpperElementary),
            other => Err(Error::Validation(format!(
                "invalid age tier '{}'; allowed: toddler, primary_year1, primary_year2, \
                 primary_year3, lower_elementary, upper_elementary",
                other
            ))),
        }
    }
}

impl std::fmt::Display for AgeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a whole-year age to its tier set (fixed table)
pub fn tiers_for_age(age_years: u32) -> &'static [AgeTier] {
    match age_years {
        0..=2 => &[AgeTier::Toddler],
        3 => &[AgeTier::Toddler, AgeTier::PrimaryYear1],
        4 => &[AgeTier::PrimaryYear1, AgeTier::PrimaryYear2],
        5 => &[
            AgeTier::PrimaryYear1,
            AgeTier::PrimaryYear2,
            AgeTier::PrimaryYear3,
        ],
        6..=8 => &[
            AgeTier::PrimaryYear2,
            AgeTier::PrimaryYear3,
            AgeTier::LowerElementary,
        ],
        _ => &[AgeTier::LowerElementary, AgeTier::UpperElementary],
    }
}

/// Whole calendar years between `birth_date` and `on`
///
/// Month/day aware: the year only counts once the birthday has passed.
/// Age is always derived on demand, never stored.
pub fn age_in_years(birth_date: NaiveDate, on: NaiveDate) -> u32 {
    let mut age = on.year() - birth_date.year();
    if (on.month(), on.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age.max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_age_in_years_birthday_boundary() {
        let birth = d(2020, 6, 15);
        assert_eq!(age_in_years(birth, d(2024, 6, 14)), 3);
        assert_eq!(age_in_years(birth, d(2024, 6, 15)), 4);
        assert_eq!(age_in_years(birth, d(2024, 6, 16)), 4);
    }

    #[test]
    fn test_age_never_negative() {
        assert_eq!(age_in_years(d(2030, 1, 1), d(2024, 1, 1)), 0);
    }

    #[test]
    fn test_tier_table() {
        assert_eq!(tiers_for_age(2), &[AgeTier::Toddler]);
        assert_eq!(tiers_for_age(3), &[AgeTier::Toddler, AgeTier::PrimaryYear1]);
        assert_eq!(
            tiers_for_age(4),
            &[AgeTier::PrimaryYear1, AgeTier::PrimaryYear2]
        );
        assert_eq!(
            tiers_for_age(5),
            &[
                AgeTier::PrimaryYear1,
                AgeTier::PrimaryYear2,
                AgeTier::PrimaryYear3
            ]
        );
        assert_eq!(
            tiers_for_age(7),
            &[
                AgeTier::PrimaryYear2,
                AgeTier::PrimaryYear3,
                AgeTier::LowerElementary
            ]
        );
        assert_eq!(
            tiers_for_age(9),
            &[AgeTier::LowerElementary, AgeTier::UpperElementary]
        );
        assert_eq!(
            tiers_for_age(12),
            &[AgeTier::LowerElementary, AgeTier::UpperElementary]
        );
    }

    #[test]
    fn test_neighbor_overlap() {
        // Every adjacent age shares at least one tier with the next,
        // smoothing birthday boundaries.
        for age in 0..12 {
            let here = tiers_for_age(age);
            let next = tiers_for_age(age + 1);
            assert!(
                here.iter().any(|t| next.contains(t)),
                "no overlap between age {} and {}",
                age,
                age + 1
            );
        }
    }

    #[test]
    fn test_tier_roundtrip() {
        for tier in AgeTier::ALL {
            assert_eq!(AgeTier::parse(tier.as_str()).unwrap(), tier);
        }
        assert!(AgeTier::parse("adult").is_err());
    }
}
