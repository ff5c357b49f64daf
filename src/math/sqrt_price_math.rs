use crate::math::math_helpers::{div_rounding_up, mul_div, mul_div_rounding_up};
use crate::{
    Q96, RESOLUTION, U160_MAX,
    error::{Error, MathError, StateError},
};
use alloy_primitives::{I256, U256};

/// Next sqrt price after moving `amount` of token0 into (`add`) or out of
/// the pool, always rounded up so the pool is never under-charged.
///
/// price' = L * 2^96 * price / (L * 2^96 +/- amount * price)
pub fn get_next_sqrt_price_from_amount_0_rounding_up(
    sqrt_price_x96: U256,
    liquidity: u128,
    amount: U256,
    add: bool,
) -> Result<U256, Error> {
    if amount.is_zero() {
        return Ok(sqrt_price_x96);
    }

    let numerator1: U256 = U256::from(liquidity) << RESOLUTION;
    let product: U256 = amount.wrapping_mul(sqrt_price_x96);

    if add {
        // Take the cheap path only when amount * price did not overflow.
        if product.wrapping_div(amount) == sqrt_price_x96 {
            let denominator = numerator1.wrapping_add(product);
            if denominator >= numerator1 {
                return mul_div_rounding_up(numerator1, sqrt_price_x96, denominator)
                    .map_err(Error::from);
            }
        }
        Ok(div_rounding_up(
            numerator1,
            (numerator1 / sqrt_price_x96) + amount,
        ))
    } else {
        // Removing token0 only works while the virtual reserve covers it.
        if product.wrapping_div(amount) != sqrt_price_x96 || numerator1 <= product {
            return Err(StateError::InsufficientReserves.into());
        }
        let denominator = numerator1 - product;
        mul_div_rounding_up(numerator1, sqrt_price_x96, denominator).map_err(Error::from)
    }
}

/// Next sqrt price after moving `amount` of token1 into (`add`) or out of
/// the pool. The added quotient is floored and the removed quotient is
/// ceiled, so the price moves conservatively in both directions.
///
/// price' = price +/- amount * 2^96 / L
pub fn get_next_sqrt_price_from_amount_1_rounding_down(
    sqrt_price_x96: U256,
    liquidity: u128,
    amount: U256,
    add: bool,
) -> Result<U256, Error> {
    let liquidity = U256::from(liquidity);
    if add {
        let quotient: U256 = if amount <= U160_MAX {
            (amount << RESOLUTION) / liquidity
        } else {
            mul_div(amount, Q96, liquidity)?
        };

        let result = sqrt_price_x96 + quotient;
        if result <= U160_MAX {
            Ok(result)
        } else {
            Err(StateError::AmountOverflow.into())
        }
    } else {
        let quotient: U256 = if amount <= U160_MAX {
            div_rounding_up(amount << RESOLUTION, liquidity)
        } else {
            mul_div_rounding_up(amount, Q96, liquidity)?
        };

        if sqrt_price_x96 <= quotient {
            return Err(StateError::InsufficientReserves.into());
        }
        Ok(sqrt_price_x96 - quotient)
    }
}

/// Token0 owed between two sqrt prices at the given liquidity:
/// L * 2^96 * (pb - pa) / (pb * pa), floored or ceiled per `round_up`.
///
/// The bounds may be passed in either order; the lower bound must be
/// non-zero.
pub fn get_amount_0_delta_base(
    mut sqrt_price_a_x96: U256,
    mut sqrt_price_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, Error> {
    if sqrt_price_a_x96 > sqrt_price_b_x96 {
        (sqrt_price_a_x96, sqrt_price_b_x96) = (sqrt_price_b_x96, sqrt_price_a_x96)
    };

    if sqrt_price_a_x96.is_zero() {
        return Err(StateError::SqrtPriceIsZero.into());
    }

    let numerator1 = U256::from(liquidity) << RESOLUTION;
    let numerator2 = sqrt_price_b_x96 - sqrt_price_a_x96;

    if round_up {
        Ok(div_rounding_up(
            mul_div_rounding_up(numerator1, numerator2, sqrt_price_b_x96)?,
            sqrt_price_a_x96,
        ))
    } else {
        Ok(mul_div(numerator1, numerator2, sqrt_price_b_x96)? / sqrt_price_a_x96)
    }
}

/// Token1 owed between two sqrt prices at the given liquidity:
/// L * (pb - pa) / 2^96, floored or ceiled per `round_up`.
pub fn get_amount_1_delta_base(
    mut sqrt_price_a_x96: U256,
    mut sqrt_price_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, MathError> {
    if sqrt_price_a_x96 > sqrt_price_b_x96 {
        (sqrt_price_a_x96, sqrt_price_b_x96) = (sqrt_price_b_x96, sqrt_price_a_x96)
    };
    let liquidity = U256::from(liquidity);

    if round_up {
        mul_div_rounding_up(liquidity, sqrt_price_b_x96 - sqrt_price_a_x96, Q96)
    } else {
        mul_div(liquidity, sqrt_price_b_x96 - sqrt_price_a_x96, Q96)
    }
}

/// Signed token0 delta for a signed liquidity change: amounts the user
/// owes round up, amounts owed to the user round down.
pub fn get_amount_0_delta(
    sqrt_price_a_x96: U256,
    sqrt_price_b_x96: U256,
    liquidity: i128,
) -> Result<I256, Error> {
    if liquidity < 0 {
        Ok(-I256::from_raw(get_amount_0_delta_base(
            sqrt_price_a_x96,
            sqrt_price_b_x96,
            liquidity.unsigned_abs(),
            false,
        )?))
    } else {
        Ok(I256::from_raw(get_amount_0_delta_base(
            sqrt_price_a_x96,
            sqrt_price_b_x96,
            liquidity as u128,
            true,
        )?))
    }
}

/// Signed token1 delta for a signed liquidity change; rounding as in
/// [`get_amount_0_delta`].
pub fn get_amount_1_delta(
    sqrt_price_a_x96: U256,
    sqrt_price_b_x96: U256,
    liquidity: i128,
) -> Result<I256, MathError> {
    if liquidity < 0 {
        Ok(-I256::from_raw(get_amount_1_delta_base(
            sqrt_price_a_x96,
            sqrt_price_b_x96,
            liquidity.unsigned_abs(),
            false,
        )?))
    } else {
        Ok(I256::from_raw(get_amount_1_delta_base(
            sqrt_price_a_x96,
            sqrt_price_b_x96,
            liquidity as u128,
            true,
        )?))
    }
}

/// Next sqrt price after consuming `amount_in` of the input token,
/// dispatching on the swap direction.
pub fn get_next_sqrt_price_from_input(
    sqrt_price_x96: U256,
    liquidity: u128,
    amount_in: U256,
    zero_for_one: bool,
) -> Result<U256, Error> {
    if sqrt_price_x96.is_zero() {
        return Err(StateError::SqrtPriceIsZero.into());
    }
    if liquidity == 0 {
        return Err(StateError::LiquidityIsZero.into());
    }

    if zero_for_one {
        get_next_sqrt_price_from_amount_0_rounding_up(sqrt_price_x96, liquidity, amount_in, true)
    } else {
        get_next_sqrt_price_from_amount_1_rounding_down(sqrt_price_x96, liquidity, amount_in, true)
    }
}

/// Next sqrt price after producing `amount_out` of the output token,
/// dispatching on the swap direction.
pub fn get_next_sqrt_price_from_output(
    sqrt_price_x96: U256,
    liquidity: u128,
    amount_out: U256,
    zero_for_one: bool,
) -> Result<U256, Error> {
    if sqrt_price_x96.is_zero() {
        return Err(StateError::SqrtPriceIsZero.into());
    }
    if liquidity == 0 {
        return Err(StateError::LiquidityIsZero.into());
    }

    if zero_for_one {
        get_next_sqrt_price_from_amount_1_rounding_down(sqrt_price_x96, liquidity, amount_out, false)
    } else {
        get_next_sqrt_price_from_amount_0_rounding_up(sqrt_price_x96, liquidity, amount_out, false)
    }
}
