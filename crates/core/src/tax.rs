//! Tax rate value object.
//!
//! The quotation and invoicing modules only ever need the *percentage* of a
//! tax record, so the domain carries the rate itself rather than a reference
//! into an accounting configuration store.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Percentage tax rate, stored in basis points (1% == 100 bp).
///
/// Integer basis points keep tax arithmetic exact; amounts are in the smallest
/// currency unit (e.g., cents).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxRate(u32);

/// Upper bound: 100% expressed in basis points.
const MAX_BASIS_POINTS: u32 = 10_000;

impl TaxRate {
    /// Build a rate from whole percent (e.g. `from_percent(15)` for 15%).
    pub fn from_percent(percent: u32) -> DomainResult<Self> {
        Self::from_basis_points(percent.saturating_mul(100))
    }

    /// Build a rate from basis points (e.g. `from_basis_points(1550)` for 15.5%).
    pub fn from_basis_points(basis_points: u32) -> DomainResult<Self> {
        if basis_points > MAX_BASIS_POINTS {
            return Err(DomainError::validation(format!(
                "tax rate cannot exceed 100% (got {basis_points} bp)"
            )));
        }
        Ok(Self(basis_points))
    }

    pub fn basis_points(&self) -> u32 {
        self.0
    }

    /// Tax amount for `amount` (smallest currency unit), rounded half up.
    ///
    /// Never exceeds `amount` since the rate is capped at 100%.
    pub fn apply(&self, amount: u64) -> u64 {
        let raw = (amount as u128) * (self.0 as u128) + (MAX_BASIS_POINTS as u128 / 2);
        (raw / MAX_BASIS_POINTS as u128) as u64
    }
}

impl ValueObject for TaxRate {}

impl core::fmt::Display for TaxRate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "{}%", self.0 / 100)
        } else {
            write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifteen_percent_of_one_hundred_units() {
        let rate = TaxRate::from_percent(15).unwrap();
        assert_eq!(rate.apply(100), 15);
        assert_eq!(rate.apply(200), 30);
    }

    #[test]
    fn fractional_rates_round_half_up() {
        // 15.5% of 10 units = 1.55 -> 2
        let rate = TaxRate::from_basis_points(1550).unwrap();
        assert_eq!(rate.apply(10), 2);
        // 15% of 3 units = 0.45 -> 0
        let rate = TaxRate::from_percent(15).unwrap();
        assert_eq!(rate.apply(3), 0);
    }

    #[test]
    fn rate_above_one_hundred_percent_is_rejected() {
        let err = TaxRate::from_percent(101).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(TaxRate::from_basis_points(10_000).is_ok());
    }

    #[test]
    fn apply_never_exceeds_amount() {
        let rate = TaxRate::from_basis_points(10_000).unwrap();
        assert_eq!(rate.apply(u64::MAX), u64::MAX);
        assert_eq!(rate.apply(0), 0);
    }

    #[test]
    fn display_formats_percent() {
        assert_eq!(TaxRate::from_percent(15).unwrap().to_string(), "15%");
        assert_eq!(TaxRate::from_basis_points(1550).unwrap().to_string(), "15.50%");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: tax amount is monotone in the base amount and bounded by it.
            #[test]
            fn tax_is_bounded_and_monotone(
                amount in 0u64..1_000_000_000,
                bump in 1u64..1_000_000,
                bp in 0u32..=10_000
            ) {
                let rate = TaxRate::from_basis_points(bp).unwrap();
                prop_assert!(rate.apply(amount) <= amount);
                prop_assert!(rate.apply(amount + bump) >= rate.apply(amount));
            }
        }
    }
}
