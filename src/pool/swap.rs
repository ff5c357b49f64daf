use crate::Q128;
use crate::error::{Error, PoolError};
use crate::math::liquidity_math::add_delta;
use crate::math::math_helpers::mul_div;
use crate::math::swap_math::{MAX_SWAP_FEE, compute_swap_step, get_sqrt_price_target};
use crate::math::tick_bitmap::next_initialized_tick_within_one_word;
use crate::math::tick_math::{
    MAX_SQRT_PRICE, MAX_TICK, MIN_SQRT_PRICE, MIN_TICK, get_sqrt_price_at_tick,
    get_tick_at_sqrt_price,
};
use crate::pool::Pool;
use crate::pool::tick::{self, TickInfo};
use alloy_primitives::{I256, U256};
use tracing::trace;

/// Request to swap against the pool up to a price limit.
#[derive(Copy, Clone, Debug)]
pub struct SwapParams {
    /// true: sell token0 for token1 (price moves down).
    pub zero_for_one: bool,
    /// Magnitude of the fixed side of the trade.
    pub amount_specified: U256,
    /// false: `amount_specified` is the input; true: the output.
    pub exact_output: bool,
    pub sqrt_price_limit_x96: U256,
    pub tick_spacing: i32,
}

/// Signed result of a swap: positive amounts are owed by the swapper to
/// the pool, negative amounts are owed by the pool to the swapper.
#[derive(Copy, Clone, Debug, Default)]
pub struct SwapResult {
    pub amount0: I256,
    pub amount1: I256,
    /// Total fee charged on the input token, already reflected in the
    /// fee-growth accumulators.
    pub fees_paid: U256,
}

// Running state of the swap loop; persisted to the pool only on success.
struct SwapState {
    amount_specified_remaining: U256,
    amount_calculated: U256,
    sqrt_price_x96: U256,
    tick: i32,
    liquidity: u128,
    // global fee growth of the input token, accumulated per step
    fee_growth_global_x128: U256,
    swap_fee: U256,
}

#[derive(Default)]
struct StepComputations {
    sqrt_price_start_x96: U256,
    tick_next: i32,
    initialized: bool,
    sqrt_price_next_x96: U256,
    amount_in: U256,
    amount_out: U256,
    fee_amount: U256,
}

impl Pool {
    /// Swaps against the aggregated liquidity of all in-range positions,
    /// walking initialized ticks until the specified amount is consumed or
    /// the price limit is reached.
    ///
    /// Tick crossings are buffered and written back together with the
    /// price, liquidity, and fee growth, so a failing swap changes
    /// nothing.
    pub fn swap(&mut self, params: SwapParams) -> Result<SwapResult, Error> {
        self.check_initialized()?;

        let SwapParams {
            zero_for_one,
            amount_specified,
            exact_output,
            sqrt_price_limit_x96,
            tick_spacing,
        } = params;

        let slot0_start = self.slot0;
        let lp_fee = slot0_start.lp_fee;

        if zero_for_one {
            if sqrt_price_limit_x96 >= slot0_start.sqrt_price_x96 {
                return Err(PoolError::PriceLimitAlreadyExceeded {
                    price: slot0_start.sqrt_price_x96,
                    limit: sqrt_price_limit_x96,
                }
                .into());
            }
            if sqrt_price_limit_x96 <= MIN_SQRT_PRICE {
                return Err(PoolError::PriceLimitOutOfBounds(sqrt_price_limit_x96).into());
            }
        } else {
            if sqrt_price_limit_x96 <= slot0_start.sqrt_price_x96 {
                return Err(PoolError::PriceLimitAlreadyExceeded {
                    price: slot0_start.sqrt_price_x96,
                    limit: sqrt_price_limit_x96,
                }
                .into());
            }
            if sqrt_price_limit_x96 >= MAX_SQRT_PRICE {
                return Err(PoolError::PriceLimitOutOfBounds(sqrt_price_limit_x96).into());
            }
        }

        // A 100% fee can never produce output, so exact-output swaps must
        // specify nothing.
        if lp_fee >= MAX_SWAP_FEE && exact_output && !amount_specified.is_zero() {
            return Err(PoolError::InvalidFeeForExactOutput.into());
        }

        let exact_in = !exact_output;

        let mut state = SwapState {
            amount_specified_remaining: amount_specified,
            amount_calculated: U256::ZERO,
            sqrt_price_x96: slot0_start.sqrt_price_x96,
            tick: slot0_start.tick,
            liquidity: self.liquidity,
            fee_growth_global_x128: if zero_for_one {
                self.fee_growth_global_0_x128
            } else {
                self.fee_growth_global_1_x128
            },
            swap_fee: U256::ZERO,
        };

        let mut crossed_ticks: Vec<(i32, TickInfo)> = Vec::new();

        while !state.amount_specified_remaining.is_zero()
            && state.sqrt_price_x96 != sqrt_price_limit_x96
        {
            let mut step = StepComputations {
                sqrt_price_start_x96: state.sqrt_price_x96,
                ..StepComputations::default()
            };

            (step.tick_next, step.initialized) = next_initialized_tick_within_one_word(
                &self.bitmap,
                state.tick,
                tick_spacing,
                zero_for_one,
            )?;

            step.tick_next = step.tick_next.clamp(MIN_TICK, MAX_TICK);
            step.sqrt_price_next_x96 = get_sqrt_price_at_tick(step.tick_next)?;

            (
                state.sqrt_price_x96,
                step.amount_in,
                step.amount_out,
                step.fee_amount,
            ) = compute_swap_step(
                state.sqrt_price_x96,
                get_sqrt_price_target(zero_for_one, step.sqrt_price_next_x96, sqrt_price_limit_x96),
                state.liquidity,
                state.amount_specified_remaining,
                exact_in,
                lp_fee,
            )?;

            if exact_in {
                state.amount_specified_remaining -= step.amount_in + step.fee_amount;
                state.amount_calculated += step.amount_out;
            } else {
                state.amount_specified_remaining -= step.amount_out;
                state.amount_calculated += step.amount_in + step.fee_amount;
            }
            state.swap_fee += step.fee_amount;

            if state.liquidity > 0 {
                state.fee_growth_global_x128 = state.fee_growth_global_x128.wrapping_add(mul_div(
                    step.fee_amount,
                    Q128,
                    U256::from(state.liquidity),
                )?);
            }

            // The step closed exactly on the next tick's price: cross it.
            if state.sqrt_price_x96 == step.sqrt_price_next_x96 {
                if step.initialized {
                    let (fee_growth_0, fee_growth_1) = if zero_for_one {
                        (state.fee_growth_global_x128, self.fee_growth_global_1_x128)
                    } else {
                        (self.fee_growth_global_0_x128, state.fee_growth_global_x128)
                    };
                    let (crossed, mut liquidity_net) =
                        tick::crossed(&self.tick_info(step.tick_next), fee_growth_0, fee_growth_1);
                    crossed_ticks.push((step.tick_next, crossed));

                    if zero_for_one {
                        liquidity_net = -liquidity_net;
                    }
                    state.liquidity = add_delta(state.liquidity, liquidity_net)?;
                }
                state.tick = if zero_for_one {
                    step.tick_next - 1
                } else {
                    step.tick_next
                };
            } else if state.sqrt_price_x96 != step.sqrt_price_start_x96 {
                state.tick = get_tick_at_sqrt_price(state.sqrt_price_x96)?;
            }

            trace!(
                tick = state.tick,
                %step.amount_in,
                %step.amount_out,
                %step.fee_amount,
                crossed = step.initialized && state.sqrt_price_x96 == step.sqrt_price_next_x96,
                "swap step"
            );
        }

        // Persist the loop's outcome.
        self.slot0.sqrt_price_x96 = state.sqrt_price_x96;
        self.slot0.tick = state.tick;
        self.liquidity = state.liquidity;
        if zero_for_one {
            self.fee_growth_global_0_x128 = state.fee_growth_global_x128;
        } else {
            self.fee_growth_global_1_x128 = state.fee_growth_global_x128;
        }
        for (tick, info) in crossed_ticks {
            self.ticks.insert(tick, info);
        }

        let consumed = amount_specified - state.amount_specified_remaining;
        let (amount_in_total, amount_out_total) = if exact_in {
            (consumed, state.amount_calculated)
        } else {
            (state.amount_calculated, consumed)
        };
        let (amount0, amount1) = if zero_for_one {
            (
                I256::from_raw(amount_in_total),
                -I256::from_raw(amount_out_total),
            )
        } else {
            (
                -I256::from_raw(amount_out_total),
                I256::from_raw(amount_in_total),
            )
        };

        Ok(SwapResult {
            amount0,
            amount1,
            fees_paid: state.swap_fee,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::testing::{add_liquidity, assert_pool_invariants, owner_a, pool_at_tick_zero};
    use alloy_primitives::B256;

    fn swap_params(
        zero_for_one: bool,
        amount: u64,
        exact_output: bool,
        limit: U256,
    ) -> SwapParams {
        SwapParams {
            zero_for_one,
            amount_specified: U256::from(amount),
            exact_output,
            sqrt_price_limit_x96: limit,
            tick_spacing: 2,
        }
    }

    fn pool_with_symmetric_liquidity() -> Pool {
        let mut pool = pool_at_tick_zero();
        add_liquidity(&mut pool, -60, 60, 1_000_000, 2);
        pool
    }

    #[test]
    fn requires_initialized_pool() {
        let mut pool = Pool::new();
        let result = pool.swap(swap_params(true, 10, false, MIN_SQRT_PRICE + U256::ONE));
        assert!(matches!(
            result,
            Err(Error::PoolError(PoolError::NotInitialized))
        ));
    }

    #[test]
    fn rejects_price_limit_on_the_wrong_side() {
        let mut pool = pool_with_symmetric_liquidity();
        let price = pool.slot0.sqrt_price_x96;

        let result = pool.swap(swap_params(true, 10, false, price));
        assert!(matches!(
            result,
            Err(Error::PoolError(PoolError::PriceLimitAlreadyExceeded { .. }))
        ));

        let result = pool.swap(swap_params(false, 10, false, price));
        assert!(matches!(
            result,
            Err(Error::PoolError(PoolError::PriceLimitAlreadyExceeded { .. }))
        ));
    }

    #[test]
    fn rejects_price_limit_outside_the_valid_range() {
        let mut pool = pool_with_symmetric_liquidity();

        let result = pool.swap(swap_params(true, 10, false, MIN_SQRT_PRICE));
        assert!(matches!(
            result,
            Err(Error::PoolError(PoolError::PriceLimitOutOfBounds(_)))
        ));

        let result = pool.swap(swap_params(false, 10, false, MAX_SQRT_PRICE));
        assert!(matches!(
            result,
            Err(Error::PoolError(PoolError::PriceLimitOutOfBounds(_)))
        ));
    }

    #[test]
    fn exact_input_zero_for_one_within_range() {
        let mut pool = pool_with_symmetric_liquidity();
        let price_before = pool.slot0.sqrt_price_x96;
        let limit = get_sqrt_price_at_tick(-2).unwrap();

        let result = pool.swap(swap_params(true, 10, false, limit)).unwrap();

        // the fixed input is consumed in full
        assert_eq!(result.amount0, I256::from_raw(U256::from(10u64)));
        assert!(result.amount1 < I256::ZERO, "swapper receives token1");
        assert!(pool.slot0.sqrt_price_x96 < price_before);
        assert!(pool.slot0.sqrt_price_x96 >= limit);
        assert!(pool.slot0.tick <= 0);

        assert_pool_invariants(&pool, 2, &[(owner_a(), -60, 60, B256::ZERO)]);
    }

    #[test]
    fn exact_output_one_for_zero_within_range() {
        let mut pool = pool_with_symmetric_liquidity();
        pool.swap(swap_params(true, 10, false, get_sqrt_price_at_tick(-2).unwrap()))
            .unwrap();
        let price_before = pool.slot0.sqrt_price_x96;
        let limit = get_sqrt_price_at_tick(101).unwrap();

        let result = pool.swap(swap_params(false, 10, true, limit)).unwrap();

        // the fixed output is received in full
        assert_eq!(result.amount0, -I256::from_raw(U256::from(10u64)));
        assert!(result.amount1 > I256::ZERO, "swapper pays token1");
        assert!(pool.slot0.sqrt_price_x96 > price_before);
        assert!(pool.slot0.sqrt_price_x96 <= limit);
    }

    #[test]
    fn zero_amount_swap_is_a_no_op() {
        let mut pool = pool_with_symmetric_liquidity();
        let snapshot = pool.clone();

        let result = pool
            .swap(swap_params(true, 0, false, get_sqrt_price_at_tick(-2).unwrap()))
            .unwrap();

        assert_eq!(result.amount0, I256::ZERO);
        assert_eq!(result.amount1, I256::ZERO);
        assert_eq!(pool.slot0, snapshot.slot0);
        assert_eq!(pool.liquidity, snapshot.liquidity);
    }

    #[test]
    fn hundred_percent_fee_rejects_nonzero_exact_output() {
        let mut pool = pool_with_symmetric_liquidity();
        pool.set_lp_fee(MAX_SWAP_FEE).unwrap();

        let result = pool.swap(swap_params(
            false,
            10,
            true,
            get_sqrt_price_at_tick(101).unwrap(),
        ));
        assert!(matches!(
            result,
            Err(Error::PoolError(PoolError::InvalidFeeForExactOutput))
        ));

        // zero amount passes the same validation
        let result = pool
            .swap(swap_params(false, 0, true, get_sqrt_price_at_tick(101).unwrap()))
            .unwrap();
        assert_eq!(result.amount1, I256::ZERO);
    }

    #[test]
    fn swap_stops_at_the_price_limit() {
        let mut pool = pool_with_symmetric_liquidity();
        let limit = get_sqrt_price_at_tick(-2).unwrap();

        // far more input than the limit allows
        let result = pool
            .swap(swap_params(true, 1_000_000_000, false, limit))
            .unwrap();

        assert_eq!(pool.slot0.sqrt_price_x96, limit);
        // not everything was consumed
        assert!(result.amount0 < I256::from_raw(U256::from(1_000_000_000u64)));
        assert!(result.amount0 > I256::ZERO);
    }

    #[test]
    fn crossing_out_of_range_deactivates_liquidity() {
        let mut pool = pool_with_symmetric_liquidity();
        let limit = get_sqrt_price_at_tick(-100).unwrap();

        pool.swap(swap_params(true, 1_000_000_000, false, limit))
            .unwrap();

        // price fell through the lower boundary at -60
        assert!(pool.slot0.tick < -60);
        assert_eq!(pool.liquidity, 0, "no position is in range below -60");
        assert_pool_invariants(&pool, 2, &[(owner_a(), -60, 60, B256::ZERO)]);
    }

    #[test]
    fn crossing_back_restores_liquidity() {
        let mut pool = pool_with_symmetric_liquidity();
        add_liquidity(&mut pool, -200, -100, 2_000_000, 2);

        // swap down into the second range, then back up into the first
        pool.swap(swap_params(
            true,
            200_000,
            false,
            get_sqrt_price_at_tick(-150).unwrap(),
        ))
        .unwrap();
        assert_eq!(pool.liquidity, 2_000_000);

        pool.swap(swap_params(
            false,
            200_000,
            false,
            get_sqrt_price_at_tick(10).unwrap(),
        ))
        .unwrap();
        assert_eq!(pool.liquidity, 1_000_000);

        assert_pool_invariants(
            &pool,
            2,
            &[
                (owner_a(), -60, 60, B256::ZERO),
                (owner_a(), -200, -100, B256::ZERO),
            ],
        );
    }

    #[test]
    fn fees_accrue_to_the_input_side_accumulator() {
        let mut pool = pool_with_symmetric_liquidity();
        let liquidity = pool.liquidity;
        let limit = get_sqrt_price_at_tick(-40).unwrap();

        let result = pool
            .swap(swap_params(true, 100_000, false, limit))
            .unwrap();

        assert!(result.fees_paid > U256::ZERO);
        // single in-range segment: growth delta is exactly fee * 2^128 / L
        let expected =
            mul_div(result.fees_paid, Q128, U256::from(liquidity)).unwrap();
        assert_eq!(pool.fee_growth_global_0_x128, expected);
        assert_eq!(pool.fee_growth_global_1_x128, U256::ZERO);
    }

    #[test]
    fn fee_growth_sums_per_step_liquidity_across_a_crossing() {
        // two adjacent ranges with different depths sharing the -60 boundary
        let mut pool = pool_with_symmetric_liquidity();
        add_liquidity(&mut pool, -200, -60, 3_000_000, 2);

        let boundary = get_sqrt_price_at_tick(-60).unwrap();
        let limit = get_sqrt_price_at_tick(-120).unwrap();
        let amount = U256::from(1_000_000u64);

        // mirror the engine's segments with compute_swap_step: first drain
        // the 1M range down to the boundary, then run the 3M range to the
        // price limit
        let (price_1, in_1, _, fee_1) = compute_swap_step(
            get_sqrt_price_at_tick(0).unwrap(),
            boundary,
            1_000_000,
            amount,
            true,
            3000,
        )
        .unwrap();
        assert_eq!(price_1, boundary, "first segment must fill to the boundary");

        let (price_2, _, _, fee_2) = compute_swap_step(
            boundary,
            limit,
            3_000_000,
            amount - in_1 - fee_1,
            true,
            3000,
        )
        .unwrap();
        assert_eq!(price_2, limit, "second segment must fill to the limit");
        assert!(fee_1 > U256::ZERO && fee_2 > U256::ZERO);

        let expected = mul_div(fee_1, Q128, U256::from(1_000_000u64))
            .unwrap()
            .wrapping_add(mul_div(fee_2, Q128, U256::from(3_000_000u64)).unwrap());

        let result = pool
            .swap(SwapParams {
                zero_for_one: true,
                amount_specified: amount,
                exact_output: false,
                sqrt_price_limit_x96: limit,
                tick_spacing: 2,
            })
            .unwrap();

        // the crossing happened and the deeper range is now active
        assert_eq!(pool.slot0.sqrt_price_x96, limit);
        assert_eq!(pool.liquidity, 3_000_000);

        // accumulator equals the per-step sum at each step's liquidity
        assert_eq!(result.fees_paid, fee_1 + fee_2);
        assert_eq!(pool.fee_growth_global_0_x128, expected);
        assert_eq!(pool.fee_growth_global_1_x128, U256::ZERO);

        assert_pool_invariants(
            &pool,
            2,
            &[
                (owner_a(), -60, 60, B256::ZERO),
                (owner_a(), -200, -60, B256::ZERO),
            ],
        );
    }

    #[test]
    fn accrued_fees_are_claimable_by_the_position() {
        use crate::pool::liquidity::ModifyLiquidityParams;

        let mut pool = pool_with_symmetric_liquidity();
        pool.swap(swap_params(
            true,
            100_000,
            false,
            get_sqrt_price_at_tick(-40).unwrap(),
        ))
        .unwrap();

        let poked = pool
            .modify_liquidity(ModifyLiquidityParams {
                owner: owner_a(),
                tick_lower: -60,
                tick_upper: 60,
                liquidity_delta: 0,
                tick_spacing: 2,
                salt: B256::ZERO,
            })
            .unwrap();

        // the sole LP earns the whole fee, up to rounding dust
        assert!(poked.fees_owed_0 > U256::ZERO);
        assert!(poked.fees_owed_0 <= U256::from(300u64));
        assert_eq!(poked.fees_owed_1, U256::ZERO);
    }

    #[test]
    fn failed_swap_leaves_state_untouched() {
        let mut pool = pool_with_symmetric_liquidity();
        let snapshot = pool.clone();

        let result = pool.swap(swap_params(true, 10, false, MIN_SQRT_PRICE));
        assert!(result.is_err());

        assert_eq!(pool.slot0, snapshot.slot0);
        assert_eq!(pool.liquidity, snapshot.liquidity);
        assert_eq!(pool.ticks, snapshot.ticks);
        assert_eq!(pool.fee_growth_global_0_x128, snapshot.fee_growth_global_0_x128);
    }

    #[test]
    fn round_trip_swaps_do_not_refund_fees() {
        let mut pool = pool_with_symmetric_liquidity();

        // pay 1000 token0 down, then feed the received token1 back up
        let down = pool
            .swap(swap_params(true, 1_000, false, get_sqrt_price_at_tick(-40).unwrap()))
            .unwrap();
        assert_eq!(down.amount0, I256::from_raw(U256::from(1_000u64)));

        let up = pool
            .swap(SwapParams {
                zero_for_one: false,
                amount_specified: (-down.amount1).into_raw(),
                exact_output: false,
                sqrt_price_limit_x96: get_sqrt_price_at_tick(40).unwrap(),
                tick_spacing: 2,
            })
            .unwrap();

        // the fee is kept on both legs
        assert!(-up.amount0 < down.amount0);
    }
}
