use crate::error::{Error, PoolError};
use crate::math::liquidity_math::add_delta;
use crate::math::sqrt_price_math::{get_amount_0_delta, get_amount_1_delta};
use crate::math::tick_bitmap::flip_tick;
use crate::math::tick_math::{MAX_TICK, MIN_TICK, get_sqrt_price_at_tick};
use crate::pool::Pool;
use crate::pool::tick::{self, TickInfo};
use crate::pool::position;
use alloy_primitives::{Address, B256, I256, U256};
use tracing::debug;

/// Request to add or remove liquidity over a tick range.
#[derive(Copy, Clone, Debug)]
pub struct ModifyLiquidityParams {
    pub owner: Address,
    pub tick_lower: i32,
    pub tick_upper: i32,
    /// Positive to deposit, negative to withdraw.
    pub liquidity_delta: i128,
    pub tick_spacing: i32,
    /// Distinguishes multiple positions of one owner on the same range.
    pub salt: B256,
}

/// Token amounts produced by a liquidity change. Deltas are positive when
/// owed by the user to the pool and negative when owed back; fees are
/// always owed to the position owner.
#[derive(Copy, Clone, Debug, Default)]
pub struct ModifyLiquidityResult {
    pub amount0: I256,
    pub amount1: I256,
    pub fees_owed_0: U256,
    pub fees_owed_1: U256,
}

fn check_ticks(tick_lower: i32, tick_upper: i32) -> Result<(), PoolError> {
    if tick_lower >= tick_upper {
        return Err(PoolError::TicksMisordered {
            lower: tick_lower,
            upper: tick_upper,
        });
    }
    if tick_lower < MIN_TICK {
        return Err(PoolError::TickLowerOutOfBounds(tick_lower));
    }
    if tick_upper > MAX_TICK {
        return Err(PoolError::TickUpperOutOfBounds(tick_upper));
    }
    Ok(())
}

impl Pool {
    /// Adds or removes liquidity for one position, returning the token
    /// amounts moved and the fees the position has earned since its last
    /// update.
    ///
    /// Everything fallible is computed against staged copies first, so an
    /// error leaves the pool untouched.
    pub fn modify_liquidity(
        &mut self,
        params: ModifyLiquidityParams,
    ) -> Result<ModifyLiquidityResult, Error> {
        self.check_initialized()?;

        let ModifyLiquidityParams {
            owner,
            tick_lower,
            tick_upper,
            liquidity_delta,
            tick_spacing,
            salt,
        } = params;

        check_ticks(tick_lower, tick_upper)?;

        let tick_current = self.slot0.tick;

        // Stage the boundary-tick updates.
        let mut staged_ticks: Option<((TickInfo, bool), (TickInfo, bool))> = None;
        if liquidity_delta != 0 {
            for tick in [tick_lower, tick_upper] {
                if tick % tick_spacing != 0 {
                    return Err(PoolError::TickMisaligned {
                        tick,
                        spacing: tick_spacing,
                    }
                    .into());
                }
            }

            let max_liquidity = tick::max_liquidity_per_tick(tick_spacing);
            let lower = tick::liquidity_update(
                &self.tick_info(tick_lower),
                tick_lower,
                tick_current,
                liquidity_delta,
                false,
                self.fee_growth_global_0_x128,
                self.fee_growth_global_1_x128,
                max_liquidity,
            )?;
            let upper = tick::liquidity_update(
                &self.tick_info(tick_upper),
                tick_upper,
                tick_current,
                liquidity_delta,
                true,
                self.fee_growth_global_0_x128,
                self.fee_growth_global_1_x128,
                max_liquidity,
            )?;
            staged_ticks = Some((lower, upper));
        }

        // Fee growth inside the range, read from the staged records so a
        // first-touch outside-growth snapshot is already reflected.
        let (lower_info, upper_info) = match &staged_ticks {
            Some(((lower, _), (upper, _))) => (lower.clone(), upper.clone()),
            None => (self.tick_info(tick_lower), self.tick_info(tick_upper)),
        };
        let (fee_growth_inside_0, fee_growth_inside_1) = tick::fee_growth_inside(
            &lower_info,
            &upper_info,
            tick_lower,
            tick_upper,
            tick_current,
            self.fee_growth_global_0_x128,
            self.fee_growth_global_1_x128,
        );

        // Stage the position update and settle its fees.
        let key = position::position_key(owner, tick_lower, tick_upper, salt);
        let position_before = self.positions.get(&key).cloned().unwrap_or_default();
        let (position_after, fees_owed_0, fees_owed_1) = position::updated(
            &position_before,
            liquidity_delta,
            fee_growth_inside_0,
            fee_growth_inside_1,
        )?;

        // Token amounts owed for the liquidity change, and the new in-range
        // liquidity when the range straddles the current tick.
        let mut amount0 = I256::ZERO;
        let mut amount1 = I256::ZERO;
        let mut liquidity_after = self.liquidity;
        if liquidity_delta != 0 {
            let sqrt_price_lower = get_sqrt_price_at_tick(tick_lower)?;
            let sqrt_price_upper = get_sqrt_price_at_tick(tick_upper)?;

            if tick_current < tick_lower {
                // range entirely above: crossing up into it needs token0
                amount0 = get_amount_0_delta(sqrt_price_lower, sqrt_price_upper, liquidity_delta)?;
            } else if tick_current < tick_upper {
                amount0 = get_amount_0_delta(
                    self.slot0.sqrt_price_x96,
                    sqrt_price_upper,
                    liquidity_delta,
                )?;
                amount1 = get_amount_1_delta(
                    sqrt_price_lower,
                    self.slot0.sqrt_price_x96,
                    liquidity_delta,
                )?;
                liquidity_after = add_delta(self.liquidity, liquidity_delta)?;
            } else {
                amount1 = get_amount_1_delta(sqrt_price_lower, sqrt_price_upper, liquidity_delta)?;
            }
        }

        // All checks passed: commit ticks, bitmap, position, and liquidity.
        if let Some(((lower_info, lower_flipped), (upper_info, upper_flipped))) = staged_ticks {
            let removing = liquidity_delta < 0;
            if lower_flipped {
                flip_tick(&mut self.bitmap, tick_lower, tick_spacing)?;
            }
            if upper_flipped {
                flip_tick(&mut self.bitmap, tick_upper, tick_spacing)?;
            }
            if lower_flipped && removing {
                self.ticks.remove(&tick_lower);
            } else {
                self.ticks.insert(tick_lower, lower_info);
            }
            if upper_flipped && removing {
                self.ticks.remove(&tick_upper);
            } else {
                self.ticks.insert(tick_upper, upper_info);
            }
        }

        if position_after.liquidity == 0 {
            self.positions.remove(&key);
        } else {
            self.positions.insert(key, position_after);
        }
        self.liquidity = liquidity_after;

        debug!(
            tick_lower,
            tick_upper,
            liquidity_delta,
            %amount0,
            %amount1,
            "liquidity modified"
        );

        Ok(ModifyLiquidityResult {
            amount0,
            amount1,
            fees_owed_0,
            fees_owed_1,
        })
    }
}
