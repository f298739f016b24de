//! Basis-point rates for payback calculations
//!
//! Amounts in this system are indivisible native-token units, so rate
//! application is integer floor division: `1245` at `9000` bps yields
//! `1120`, never `1121`.

use serde::{Deserialize, Serialize};

/// Denominator for basis-point rates (10000 = 100%).
pub const BPS_DENOMINATOR: u128 = 10_000;

/// A rate in basis points, guaranteed to be within 0..=10000.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BasisPoints(u16);

impl BasisPoints {
    /// 0%.
    pub const ZERO: BasisPoints = BasisPoints(0);
    /// 100%.
    pub const FULL: BasisPoints = BasisPoints(BPS_DENOMINATOR as u16);

    /// Create a rate, rejecting values above 10000.
    pub fn new(bps: u16) -> Option<Self> {
        if bps as u128 <= BPS_DENOMINATOR {
            Some(Self(bps))
        } else {
            None
        }
    }

    /// Get the raw basis-point value.
    pub fn value(&self) -> u16 {
        self.0
    }

    /// Apply the rate to an amount with floor division.
    ///
    /// Split into quotient and remainder so the intermediate product never
    /// overflows `u128`; the result equals `floor(amount * bps / 10000)`.
    pub fn apply(&self, amount: u128) -> u128 {
        let rate = self.0 as u128;
        let whole = (amount / BPS_DENOMINATOR) * rate;
        let partial = (amount % BPS_DENOMINATOR) * rate / BPS_DENOMINATOR;
        whole + partial
    }
}

impl Default for BasisPoints {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(BasisPoints::new(10_000).is_some());
        assert!(BasisPoints::new(10_001).is_none());
    }

    #[test]
    fn test_apply_floor_rounding() {
        // 1245 * 9000 / 10000 = 1120.5 → 1120
        let rate = BasisPoints::new(9_000).unwrap();
        assert_eq!(rate.apply(1245), 1120);
    }

    #[test]
    fn test_apply_zero_and_full() {
        assert_eq!(BasisPoints::ZERO.apply(1_000_000), 0);
        assert_eq!(BasisPoints::FULL.apply(1_000_000), 1_000_000);
    }

    #[test]
    fn test_apply_large_amount_no_overflow() {
        let rate = BasisPoints::new(5_000).unwrap();
        assert_eq!(rate.apply(u128::MAX), u128::MAX / 2);
    }

    #[test]
    fn test_serialization_transparent() {
        let rate = BasisPoints::new(250).unwrap();
        let json = serde_json::to_string(&rate).unwrap();
        assert_eq!(json, "250");
        let deserialized: BasisPoints = serde_json::from_str(&json).unwrap();
        assert_eq!(rate, deserialized);
    }

    proptest! {
        /// Floor division never pays out more than the exact share.
        #[test]
        fn fuzz_apply_never_exceeds_amount(
            amount in 0u128..=u128::MAX,
            bps in 0u16..=10_000u16,
        ) {
            let rate = BasisPoints::new(bps).unwrap();
            prop_assert!(rate.apply(amount) <= amount);
        }

        /// Quotient/remainder split matches the naive formula in the
        /// overflow-free range.
        #[test]
        fn fuzz_apply_matches_naive(
            amount in 0u128..=u64::MAX as u128,
            bps in 0u16..=10_000u16,
        ) {
            let rate = BasisPoints::new(bps).unwrap();
            let naive = amount * bps as u128 / BPS_DENOMINATOR;
            prop_assert_eq!(rate.apply(amount), naive);
        }
    }
}
