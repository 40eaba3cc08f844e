//! Day-based proration of monthly amounts.
//!
//! All divisions round half-even at fixed scales so that the same inputs
//! always produce the same amounts, whatever the call site.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::payroll::error::ProrationError;

/// Decimal places kept on a per-day rate.
pub const RATE_SCALE: u32 = 16;

/// Decimal places kept on a prorated amount.
pub const AMOUNT_SCALE: u32 = 8;

/// Result of prorating one monthly amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proration {
    /// `monthly / basis` at [`RATE_SCALE`].
    pub daily_rate: Decimal,
    /// `daily_rate * actual` at [`AMOUNT_SCALE`].
    pub prorated_amount: Decimal,
}

/// Stateless proration calculator.
pub struct ProrationCalculator;

impl ProrationCalculator {
    /// Per-day rate of `monthly_amount` over `basis_days`.
    pub fn daily_rate(monthly_amount: Decimal, basis_days: Decimal) -> Result<Decimal, ProrationError> {
        if basis_days <= Decimal::ZERO {
            return Err(ProrationError::InvalidBasis(basis_days));
        }
        let rate = monthly_amount
            .checked_div(basis_days)
            .ok_or(ProrationError::Overflow)?;
        Ok(rate.round_dp_with_strategy(RATE_SCALE, RoundingStrategy::MidpointNearestEven))
    }

    /// Prorates `monthly_amount`, expressed against `basis_days`, to
    /// `actual_days`.
    pub fn prorate(
        monthly_amount: Decimal,
        basis_days: Decimal,
        actual_days: Decimal,
    ) -> Result<Proration, ProrationError> {
        if actual_days < Decimal::ZERO {
            return Err(ProrationError::InvalidDays(actual_days));
        }
        let daily_rate = Self::daily_rate(monthly_amount, basis_days)?;
        let prorated_amount = daily_rate
            .checked_mul(actual_days)
            .ok_or(ProrationError::Overflow)?
            .round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointNearestEven);
        Ok(Proration {
            daily_rate,
            prorated_amount,
        })
    }

    /// Twelve months of `monthly_amount`.
    pub fn yearly(monthly_amount: Decimal) -> Result<Decimal, ProrationError> {
        monthly_amount
            .checked_mul(Decimal::from(12))
            .ok_or(ProrationError::Overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_full_month_is_identity() {
        let p = ProrationCalculator::prorate(dec!(3000), dec!(30), dec!(30)).unwrap();
        assert_eq!(p.daily_rate, dec!(100));
        assert_eq!(p.prorated_amount, dec!(3000));
    }

    #[test]
    fn test_partial_month() {
        let p = ProrationCalculator::prorate(dec!(3000), dec!(30), dec!(15)).unwrap();
        assert_eq!(p.prorated_amount, dec!(1500));
    }

    #[test]
    fn test_rate_is_rounded_to_rate_scale() {
        let rate = ProrationCalculator::daily_rate(dec!(1000), dec!(30)).unwrap();
        assert_eq!(rate, dec!(33.3333333333333333));
        assert_eq!(rate.scale(), RATE_SCALE);
    }

    #[test]
    fn test_non_terminating_rate_round_trips() {
        let p = ProrationCalculator::prorate(dec!(1000), dec!(30), dec!(30)).unwrap();
        assert_eq!(p.prorated_amount, dec!(1000));
    }

    #[test]
    fn test_thirty_one_day_basis() {
        let p = ProrationCalculator::prorate(dec!(3100), dec!(31), dec!(30)).unwrap();
        assert_eq!(p.prorated_amount, dec!(3000));
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-1))]
    fn test_invalid_basis(#[case] basis: Decimal) {
        assert_eq!(
            ProrationCalculator::prorate(dec!(3000), basis, dec!(30)),
            Err(ProrationError::InvalidBasis(basis))
        );
    }

    #[test]
    fn test_negative_days() {
        assert_eq!(
            ProrationCalculator::prorate(dec!(3000), dec!(30), dec!(-1)),
            Err(ProrationError::InvalidDays(dec!(-1)))
        );
    }

    #[test]
    fn test_zero_days() {
        let p = ProrationCalculator::prorate(dec!(3000), dec!(30), dec!(0)).unwrap();
        assert_eq!(p.prorated_amount, Decimal::ZERO);
    }

    #[test]
    fn test_overflow() {
        assert_eq!(
            ProrationCalculator::prorate(Decimal::MAX, dec!(1), dec!(2)),
            Err(ProrationError::Overflow)
        );
        assert_eq!(
            ProrationCalculator::yearly(Decimal::MAX),
            Err(ProrationError::Overflow)
        );
    }

    #[test]
    fn test_yearly() {
        assert_eq!(ProrationCalculator::yearly(dec!(2500)).unwrap(), dec!(30000));
    }
}
