use crate::error::{Error, PoolError};
use crate::math::math_helpers::{mul_div, mul_div_rounding_up};
use crate::math::sqrt_price_math::{
    get_amount_0_delta_base, get_amount_1_delta_base, get_next_sqrt_price_from_input,
    get_next_sqrt_price_from_output,
};
use alloy_primitives::U256;

/// 100% expressed in fee pips (hundredths of a basis point).
pub const MAX_SWAP_FEE: u32 = 1_000_000;

const FEE_PIPS_DENOMINATOR: U256 = U256::from_limbs([1_000_000, 0, 0, 0]);

/// Clamps the next-tick price to the swap's price limit: the step may not
/// move below the limit when selling token0 nor above it when buying.
pub fn get_sqrt_price_target(
    zero_for_one: bool,
    sqrt_price_next_x96: U256,
    sqrt_price_limit_x96: U256,
) -> U256 {
    if zero_for_one {
        if sqrt_price_next_x96 < sqrt_price_limit_x96 {
            sqrt_price_limit_x96
        } else {
            sqrt_price_next_x96
        }
    } else if sqrt_price_next_x96 > sqrt_price_limit_x96 {
        sqrt_price_limit_x96
    } else {
        sqrt_price_next_x96
    }
}

/// Consumes as much of `amount_remaining` as the price interval
/// [current, target] allows, returning
/// `(sqrt_price_next, amount_in, amount_out, fee_amount)`.
///
/// Amounts charged to the swapper round up, amounts paid out round down.
/// A fee of 100% is only meaningful on an exact-input step, where the
/// whole remainder becomes fee; on an exact-output step it is rejected.
pub fn compute_swap_step(
    sqrt_price_current_x96: U256,
    sqrt_price_target_x96: U256,
    liquidity: u128,
    amount_remaining: U256,
    exact_in: bool,
    fee_pips: u32,
) -> Result<(U256, U256, U256, U256), Error> {
    if fee_pips > MAX_SWAP_FEE || (fee_pips == MAX_SWAP_FEE && !exact_in) {
        return Err(PoolError::InvalidSwapFee(fee_pips).into());
    }

    let zero_for_one = sqrt_price_current_x96 >= sqrt_price_target_x96;
    let fee = U256::from(fee_pips);

    let sqrt_price_next_x96;
    let mut amount_in;
    let mut amount_out;
    let fee_amount;

    if exact_in {
        let amount_remaining_less_fee = mul_div(
            amount_remaining,
            FEE_PIPS_DENOMINATOR - fee,
            FEE_PIPS_DENOMINATOR,
        )?;

        // Input needed to reach the target outright.
        amount_in = if zero_for_one {
            get_amount_0_delta_base(sqrt_price_target_x96, sqrt_price_current_x96, liquidity, true)?
        } else {
            get_amount_1_delta_base(sqrt_price_current_x96, sqrt_price_target_x96, liquidity, true)?
        };

        if amount_remaining_less_fee >= amount_in {
            sqrt_price_next_x96 = sqrt_price_target_x96;
            fee_amount = if fee_pips == MAX_SWAP_FEE {
                amount_in
            } else {
                mul_div_rounding_up(amount_in, fee, FEE_PIPS_DENOMINATOR - fee)?
            };
        } else {
            sqrt_price_next_x96 = get_next_sqrt_price_from_input(
                sqrt_price_current_x96,
                liquidity,
                amount_remaining_less_fee,
                zero_for_one,
            )?;
            amount_in = amount_remaining_less_fee;
            // Partial step: whatever the price move did not consume is fee.
            fee_amount = amount_remaining - amount_in;
        }

        amount_out = if zero_for_one {
            get_amount_1_delta_base(sqrt_price_next_x96, sqrt_price_current_x96, liquidity, false)?
        } else {
            get_amount_0_delta_base(sqrt_price_current_x96, sqrt_price_next_x96, liquidity, false)?
        };
    } else {
        // Output available by moving all the way to the target.
        amount_out = if zero_for_one {
            get_amount_1_delta_base(sqrt_price_target_x96, sqrt_price_current_x96, liquidity, false)?
        } else {
            get_amount_0_delta_base(sqrt_price_current_x96, sqrt_price_target_x96, liquidity, false)?
        };

        if amount_remaining >= amount_out {
            sqrt_price_next_x96 = sqrt_price_target_x96;
        } else {
            sqrt_price_next_x96 = get_next_sqrt_price_from_output(
                sqrt_price_current_x96,
                liquidity,
                amount_remaining,
                zero_for_one,
            )?;
            amount_out = amount_remaining;
        }

        amount_in = if zero_for_one {
            get_amount_0_delta_base(sqrt_price_next_x96, sqrt_price_current_x96, liquidity, true)?
        } else {
            get_amount_1_delta_base(sqrt_price_current_x96, sqrt_price_next_x96, liquidity, true)?
        };
        fee_amount = mul_div_rounding_up(amount_in, fee, FEE_PIPS_DENOMINATOR - fee)?;
    }

    Ok((sqrt_price_next_x96, amount_in, amount_out, fee_amount))
}
