//! Compact rate encoding.
//!
//! The pricing contract stores per token a base rate and a one byte delta
//! relative to it, in 1/1000 of the base. Updating deltas only is much cheaper
//! than resetting bases, so a new rate is expressed as a delta whenever it fits.

use alloy::primitives::{Address, U256};

use crate::types::{CompactData, PriceUpdate};

/// Smallest delta, exclusive, stored without a base reset.
const MIN_DELTA: i64 = -128;

/// Largest delta, exclusive, stored without a base reset.
const MAX_DELTA: i64 = 127;

/// Delta resolution, 1/1000 of the base rate.
const DELTA_SCALE: u64 = 1000;

/// Compacts a new `rate` against the `base` currently recorded on chain.
///
/// Returns the new rate as a base with zero delta if no base is recorded yet or
/// if the delta does not fit. Otherwise keeps `base` and returns the delta as a
/// two's complement byte.
pub fn compact_data(rate: U256, base: U256) -> CompactData {
    if base.is_zero() {
        return CompactData::new(rate, 0);
    }

    // Both bounds are excluded although -128 and 127 fit into a signed byte
    match delta(rate, base) {
        Some(delta) if delta > MIN_DELTA && delta < MAX_DELTA => {
            let compact = if delta < 0 { delta + 256 } else { delta };
            CompactData::new(base, compact as u8)
        }
        _ => CompactData::new(rate, 0),
    }
}

/// Recovers the signed delta from a compact byte produced by [`compact_data`].
pub fn decode_compact(compact: u8) -> i8 {
    compact as i8
}

/// Computes the per-token update for the new buy and sell rates, compacting
/// each leg against its own recorded base.
pub fn build_price_update(
    token: Address,
    buy: U256,
    sell: U256,
    current_base_buy: U256,
    current_base_sell: U256,
) -> PriceUpdate {
    let compact_buy = compact_data(buy, current_base_buy);
    let compact_sell = compact_data(sell, current_base_sell);
    let base_changed =
        compact_buy.base() != current_base_buy || compact_sell.base() != current_base_sell;
    PriceUpdate::new(token, compact_buy, compact_sell, base_changed)
}

/// `(rate / base - 1) * 1000` truncated toward zero, `None` on overflow.
///
/// Computed exactly on integers, so float rounding artefacts are not
/// reproduced: 1127/1000 is 127 (a reset) and 873/1000 is -127, where a float
/// computation lands on 126 and -126.
fn delta(rate: U256, base: U256) -> Option<i64> {
    let (diff, negative) = if rate >= base {
        (rate - base, false)
    } else {
        (base - rate, true)
    };
    let magnitude = diff.checked_mul(U256::from(DELTA_SCALE))? / base;
    let magnitude = i64::try_from(u64::try_from(magnitude).ok()?).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;

    const TOKEN: Address = address!("0xdd974D5C2e2928deA5F71b9825b8b646686BD200");

    fn wei(units: u64) -> U256 {
        U256::from(units) * U256::from(10u64).pow(U256::from(18))
    }

    fn milli_wei(milli_units: u64) -> U256 {
        U256::from(milli_units) * U256::from(10u64).pow(U256::from(15))
    }

    #[test]
    fn test_compact_without_base() {
        assert_eq!(compact_data(wei(105), U256::ZERO), CompactData::new(wei(105), 0));
        assert_eq!(compact_data(U256::ZERO, U256::ZERO), CompactData::new(U256::ZERO, 0));
    }

    #[test]
    fn test_compact_positive_delta() {
        let data = compact_data(wei(105), wei(100));
        assert_eq!(data.base(), wei(100));
        assert_eq!(data.compact(), 50);
    }

    #[test]
    fn test_compact_negative_delta() {
        let data = compact_data(milli_wei(98_700), wei(100));
        assert_eq!(data.base(), wei(100));
        assert_eq!(data.compact(), 243);
        assert_eq!(decode_compact(data.compact()), -13);
    }

    #[test]
    fn test_compact_truncates_toward_zero() {
        // -13.7 -> -13, 1.9 -> 1
        let data = compact_data(U256::from(986_300), U256::from(1_000_000));
        assert_eq!(decode_compact(data.compact()), -13);
        let data = compact_data(U256::from(1_001_900), U256::from(1_000_000));
        assert_eq!(decode_compact(data.compact()), 1);
        // Less than a unit of delta either way
        let data = compact_data(U256::from(999_001), U256::from(1_000_000));
        assert_eq!(data, CompactData::new(U256::from(1_000_000), 0));
    }

    #[test]
    fn test_compact_exact_delta() {
        // 1.127 - 1 and 0.873 - 1 are not exact in binary floating point
        assert_eq!(
            compact_data(U256::from(1127), U256::from(1000)),
            CompactData::new(U256::from(1127), 0)
        );
        let data = compact_data(U256::from(873), U256::from(1000));
        assert_eq!(data, CompactData::new(U256::from(1000), 129));
        assert_eq!(decode_compact(data.compact()), -127);
    }

    #[test]
    fn test_compact_out_of_range_resets_base() {
        assert_eq!(compact_data(wei(150), wei(100)), CompactData::new(wei(150), 0));
        assert_eq!(compact_data(wei(80), wei(100)), CompactData::new(wei(80), 0));
        assert_eq!(compact_data(wei(87), wei(100)), CompactData::new(wei(87), 0));
    }

    #[test]
    fn test_compact_boundaries() {
        let base = U256::from(1000);
        // 126 and -127 are the extreme deltas kept as compact
        assert_eq!(compact_data(U256::from(1126), base), CompactData::new(base, 126));
        assert_eq!(compact_data(U256::from(873), base), CompactData::new(base, 129));
        // 127 and -128 fit a byte but still force a reset
        assert_eq!(
            compact_data(U256::from(1127), base),
            CompactData::new(U256::from(1127), 0)
        );
        assert_eq!(
            compact_data(U256::from(872), base),
            CompactData::new(U256::from(872), 0)
        );
    }

    #[test]
    fn test_compact_extreme_values() {
        assert_eq!(
            compact_data(U256::MAX, U256::from(1)),
            CompactData::new(U256::MAX, 0)
        );
        assert_eq!(
            compact_data(U256::ZERO, U256::MAX),
            CompactData::new(U256::ZERO, 0)
        );
    }

    #[test]
    fn test_decode_every_compact_delta() {
        let base = U256::from(1_000_000);
        for delta in (MIN_DELTA + 1)..MAX_DELTA {
            let rate = U256::from((1_000_000 + delta * 1000) as u64);
            let data = compact_data(rate, base);
            assert_eq!(data.base(), base, "delta {delta}");
            assert_eq!(i64::from(decode_compact(data.compact())), delta, "delta {delta}");
        }
    }

    #[test]
    fn test_price_update_compact_only() {
        let update = build_price_update(TOKEN, wei(105), milli_wei(98_700), wei(100), wei(100));
        assert_eq!(update.token(), TOKEN);
        assert_eq!(update.base_buy(), wei(100));
        assert_eq!(update.base_sell(), wei(100));
        assert_eq!(update.compact_buy(), 50);
        assert_eq!(update.compact_sell(), 243);
        assert!(!update.base_changed());
    }

    #[test]
    fn test_price_update_single_leg_reset() {
        let update = build_price_update(TOKEN, wei(105), wei(150), wei(100), wei(100));
        assert_eq!(update.base_buy(), wei(100));
        assert_eq!(update.compact_buy(), 50);
        assert_eq!(update.base_sell(), wei(150));
        assert_eq!(update.compact_sell(), 0);
        assert!(update.base_changed());
    }

    #[test]
    fn test_price_update_new_token() {
        let update = build_price_update(TOKEN, wei(500), wei(2), U256::ZERO, U256::ZERO);
        assert_eq!(update.base_buy(), wei(500));
        assert_eq!(update.base_sell(), wei(2));
        assert!(update.base_changed());
    }
}
