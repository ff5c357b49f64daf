use crate::error::{Error, MathError, PoolError};
use crate::math::liquidity_math::add_delta;
use crate::math::tick_math::{MAX_TICK, MIN_TICK};
use alloy_primitives::U256;

/// Per-tick bookkeeping for every position boundary that references it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickInfo {
    /// Sum of |liquidity delta| over positions using this tick as a boundary.
    pub liquidity_gross: u128,
    /// Net liquidity added to the pool when the tick is crossed left to right.
    pub liquidity_net: i128,
    pub fee_growth_outside_0_x128: U256,
    pub fee_growth_outside_1_x128: U256,
}

/// Largest `liquidity_gross` a single tick may carry, chosen so that the
/// sum over all usable ticks of a given spacing cannot overflow u128.
pub fn max_liquidity_per_tick(tick_spacing: i32) -> u128 {
    let min_tick = (MIN_TICK / tick_spacing) * tick_spacing;
    let max_tick = (MAX_TICK / tick_spacing) * tick_spacing;
    let num_ticks = ((max_tick - min_tick) / tick_spacing) as u128 + 1;
    u128::MAX / num_ticks
}

/// Applies a liquidity delta to one boundary tick, returning the updated
/// record and whether the tick flipped between initialized and empty.
///
/// Pure: the caller commits the result only once the whole operation has
/// validated.
pub(crate) fn liquidity_update(
    info: &TickInfo,
    tick: i32,
    tick_current: i32,
    liquidity_delta: i128,
    upper: bool,
    fee_growth_global_0_x128: U256,
    fee_growth_global_1_x128: U256,
    max_liquidity: u128,
) -> Result<(TickInfo, bool), Error> {
    let liquidity_gross_before = info.liquidity_gross;
    let liquidity_gross_after = add_delta(liquidity_gross_before, liquidity_delta)?;

    if liquidity_gross_after > max_liquidity {
        return Err(PoolError::TickLiquidityOverflow(tick).into());
    }

    let flipped = (liquidity_gross_after == 0) != (liquidity_gross_before == 0);

    let mut updated = info.clone();
    if liquidity_gross_before == 0 && tick <= tick_current {
        // Convention: all growth before the first touch happened below.
        updated.fee_growth_outside_0_x128 = fee_growth_global_0_x128;
        updated.fee_growth_outside_1_x128 = fee_growth_global_1_x128;
    }
    updated.liquidity_gross = liquidity_gross_after;
    updated.liquidity_net = if upper {
        updated.liquidity_net.checked_sub(liquidity_delta)
    } else {
        updated.liquidity_net.checked_add(liquidity_delta)
    }
    .ok_or(MathError::Overflow)?;

    Ok((updated, flipped))
}

/// Crossing a tick transposes its outside growth to the other side of the
/// current price. Returns the updated record and the stored net liquidity.
pub(crate) fn crossed(
    info: &TickInfo,
    fee_growth_global_0_x128: U256,
    fee_growth_global_1_x128: U256,
) -> (TickInfo, i128) {
    let updated = TickInfo {
        liquidity_gross: info.liquidity_gross,
        liquidity_net: info.liquidity_net,
        fee_growth_outside_0_x128: fee_growth_global_0_x128
            .wrapping_sub(info.fee_growth_outside_0_x128),
        fee_growth_outside_1_x128: fee_growth_global_1_x128
            .wrapping_sub(info.fee_growth_outside_1_x128),
    };
    (updated, info.liquidity_net)
}

/// Cumulative fee growth per unit of liquidity inside [tick_lower,
/// tick_upper], derived from the two outside accumulators and the globals.
///
/// All subtraction is modular; only differences of snapshots are
/// meaningful.
pub(crate) fn fee_growth_inside(
    lower: &TickInfo,
    upper: &TickInfo,
    tick_lower: i32,
    tick_upper: i32,
    tick_current: i32,
    fee_growth_global_0_x128: U256,
    fee_growth_global_1_x128: U256,
) -> (U256, U256) {
    if tick_current < tick_lower {
        (
            lower
                .fee_growth_outside_0_x128
                .wrapping_sub(upper.fee_growth_outside_0_x128),
            lower
                .fee_growth_outside_1_x128
                .wrapping_sub(upper.fee_growth_outside_1_x128),
        )
    } else if tick_current >= tick_upper {
        (
            upper
                .fee_growth_outside_0_x128
                .wrapping_sub(lower.fee_growth_outside_0_x128),
            upper
                .fee_growth_outside_1_x128
                .wrapping_sub(lower.fee_growth_outside_1_x128),
        )
    } else {
        (
            fee_growth_global_0_x128
                .wrapping_sub(lower.fee_growth_outside_0_x128)
                .wrapping_sub(upper.fee_growth_outside_0_x128),
            fee_growth_global_1_x128
                .wrapping_sub(lower.fee_growth_outside_1_x128)
                .wrapping_sub(upper.fee_growth_outside_1_x128),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update_simple(
        info: &TickInfo,
        tick: i32,
        tick_current: i32,
        delta: i128,
        upper: bool,
    ) -> (TickInfo, bool) {
        liquidity_update(
            info,
            tick,
            tick_current,
            delta,
            upper,
            U256::ZERO,
            U256::ZERO,
            u128::MAX,
        )
        .unwrap()
    }

    #[test]
    fn max_liquidity_shrinks_with_tick_density() {
        let sparse = max_liquidity_per_tick(60);
        let dense = max_liquidity_per_tick(1);
        assert!(sparse > dense);

        // spacing 1 admits every tick
        assert_eq!(dense, u128::MAX / (2 * 887272 + 1));
    }

    #[test]
    fn first_touch_initializes_and_flips() {
        let (info, flipped) = update_simple(&TickInfo::default(), -100, 0, 1_000, false);
        assert!(flipped);
        assert_eq!(info.liquidity_gross, 1_000);
        assert_eq!(info.liquidity_net, 1_000);
    }

    #[test]
    fn upper_boundary_subtracts_from_net() {
        let (info, flipped) = update_simple(&TickInfo::default(), 100, 0, 1_000, true);
        assert!(flipped);
        assert_eq!(info.liquidity_gross, 1_000);
        assert_eq!(info.liquidity_net, -1_000);
    }

    #[test]
    fn second_touch_does_not_flip() {
        let (info, _) = update_simple(&TickInfo::default(), -100, 0, 1_000, false);
        let (info, flipped) = update_simple(&info, -100, 0, 500, false);
        assert!(!flipped);
        assert_eq!(info.liquidity_gross, 1_500);
        assert_eq!(info.liquidity_net, 1_500);
    }

    #[test]
    fn removing_everything_flips_back() {
        let (info, _) = update_simple(&TickInfo::default(), 0, 0, 1_000, false);
        let (info, flipped) = update_simple(&info, 0, 0, -1_000, false);
        assert!(flipped);
        assert_eq!(info.liquidity_gross, 0);
    }

    #[test]
    fn per_tick_liquidity_cap_is_enforced() {
        let result = liquidity_update(
            &TickInfo::default(),
            0,
            0,
            2_000,
            false,
            U256::ZERO,
            U256::ZERO,
            1_000,
        );
        assert!(matches!(
            result,
            Err(Error::PoolError(PoolError::TickLiquidityOverflow(0)))
        ));
    }

    #[test]
    fn outside_growth_snapshots_only_at_or_below_current() {
        let g0 = U256::from(1_000u64);
        let g1 = U256::from(2_000u64);

        let (below, _) =
            liquidity_update(&TickInfo::default(), -100, 0, 1_000, false, g0, g1, u128::MAX)
                .unwrap();
        assert_eq!(below.fee_growth_outside_0_x128, g0);
        assert_eq!(below.fee_growth_outside_1_x128, g1);

        let (above, _) =
            liquidity_update(&TickInfo::default(), 100, 0, 1_000, false, g0, g1, u128::MAX)
                .unwrap();
        assert_eq!(above.fee_growth_outside_0_x128, U256::ZERO);
        assert_eq!(above.fee_growth_outside_1_x128, U256::ZERO);
    }

    #[test]
    fn crossing_transposes_outside_growth() {
        let info = TickInfo {
            liquidity_gross: 1_000,
            liquidity_net: 500,
            fee_growth_outside_0_x128: U256::from(100u64),
            fee_growth_outside_1_x128: U256::from(200u64),
        };

        let (updated, net) = crossed(&info, U256::from(1_000u64), U256::from(2_000u64));
        assert_eq!(net, 500);
        assert_eq!(updated.fee_growth_outside_0_x128, U256::from(900u64));
        assert_eq!(updated.fee_growth_outside_1_x128, U256::from(1_800u64));
    }

    #[test]
    fn crossing_wraps_modulo_2_256() {
        let info = TickInfo {
            fee_growth_outside_0_x128: U256::MAX,
            ..TickInfo::default()
        };
        let (updated, _) = crossed(&info, U256::from(5u64), U256::ZERO);
        assert_eq!(updated.fee_growth_outside_0_x128, U256::from(6u64));
    }

    #[test]
    fn fee_growth_inside_three_cases() {
        let lower = TickInfo {
            fee_growth_outside_0_x128: U256::from(100u64),
            fee_growth_outside_1_x128: U256::from(200u64),
            ..TickInfo::default()
        };
        let upper = TickInfo {
            fee_growth_outside_0_x128: U256::from(50u64),
            fee_growth_outside_1_x128: U256::from(80u64),
            ..TickInfo::default()
        };
        let g0 = U256::from(1_000u64);
        let g1 = U256::from(2_000u64);

        // in range: global - outside_lower - outside_upper
        let (f0, f1) = fee_growth_inside(&lower, &upper, -100, 100, 0, g0, g1);
        assert_eq!(f0, U256::from(850u64));
        assert_eq!(f1, U256::from(1_720u64));

        // below the range: outside_lower - outside_upper
        let (f0, f1) = fee_growth_inside(&lower, &upper, 100, 200, 0, g0, g1);
        assert_eq!(f0, U256::from(50u64));
        assert_eq!(f1, U256::from(120u64));

        // above the range: outside_upper - outside_lower
        let (f0, f1) = fee_growth_inside(&lower, &upper, -200, -100, 0, g0, g1);
        assert_eq!(f0, U256::ZERO.wrapping_sub(U256::from(50u64)));
        assert_eq!(f1, U256::ZERO.wrapping_sub(U256::from(120u64)));
    }
}
