//! Money rounding and VAT arithmetic.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Everything here works on `rust_decimal::Decimal`.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places stored for monetary amounts.
pub const MONEY_SCALE: u32 = 2;

/// Rounds an amount to cents, half away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// A VAT rate expressed in percent (e.g. `21` for 21%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VatRate(Decimal);

/// Net and tax parts of a gross amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrossSplit {
    /// Amount before tax, rounded to cents.
    pub net: Decimal,
    /// Tax part; `net + vat` always equals the gross amount.
    pub vat: Decimal,
}

impl VatRate {
    /// The 21% rate the legacy system assumed for totals without a breakdown.
    #[must_use]
    pub fn standard() -> Self {
        Self(Decimal::from(21))
    }

    /// Splits a gross amount into net and VAT.
    ///
    /// `net = round(gross / (1 + rate/100))`, `vat = gross - net`.
    #[must_use]
    pub fn split_gross(self, gross: Decimal) -> GrossSplit {
        let divisor = Decimal::ONE + self.0 / Decimal::ONE_HUNDRED;
        let net = round_money(gross / divisor);

        GrossSplit {
            net,
            vat: gross - net,
        }
    }
}

impl std::fmt::Display for VatRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money() {
        assert_eq!(round_money(dec!(1.005)), dec!(1.01));
        assert_eq!(round_money(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round_money(dec!(99.994)), dec!(99.99));
    }

    #[test]
    fn test_split_standard_rate() {
        let split = VatRate::standard().split_gross(dec!(121.00));
        assert_eq!(split.net, dec!(100.00));
        assert_eq!(split.vat, dec!(21.00));
    }

    #[test]
    fn test_split_rounds_net() {
        let split = VatRate::standard().split_gross(dec!(10));
        assert_eq!(split.net, dec!(8.26));
        assert_eq!(split.vat, dec!(1.74));
    }

    #[test]
    fn test_vat_rate_display() {
        assert_eq!(VatRate::standard().to_string(), "21%");
    }

    proptest! {
        /// Net and VAT always add back up to the gross amount.
        #[test]
        fn test_split_is_exact(cents in 0i64..100_000_000) {
            let gross = Decimal::new(cents, 2);
            let split = VatRate::standard().split_gross(gross);
            prop_assert_eq!(split.net + split.vat, gross);
            prop_assert!(split.net <= gross);
            prop_assert!(split.net.scale() <= MONEY_SCALE);
        }
    }
}
