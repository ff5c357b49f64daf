use crate::Q128;
use crate::error::{Error, PoolError};
use crate::math::liquidity_math::add_delta;
use crate::math::math_helpers::mul_div;
use alloy_primitives::{Address, B256, U256, keccak256};

/// One liquidity position: the held amount plus the fee-growth-inside
/// snapshots taken at its last update.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Position {
    pub liquidity: u128,
    pub fee_growth_inside_0_last_x128: U256,
    pub fee_growth_inside_1_last_x128: U256,
}

/// Ledger key for (owner, range, salt): keccak256 over the owner's address
/// bytes, both ticks little-endian, and the raw salt.
pub fn position_key(owner: Address, tick_lower: i32, tick_upper: i32, salt: B256) -> B256 {
    let mut buf = [0u8; 60];
    buf[..20].copy_from_slice(owner.as_slice());
    buf[20..24].copy_from_slice(&tick_lower.to_le_bytes());
    buf[24..28].copy_from_slice(&tick_upper.to_le_bytes());
    buf[28..].copy_from_slice(salt.as_slice());
    keccak256(buf)
}

/// Applies a liquidity delta to a position and settles the fees accrued
/// since its last snapshot, returning the updated position and the owed
/// token amounts.
///
/// A zero delta is a fee poke and requires the position to exist.
pub(crate) fn updated(
    position: &Position,
    liquidity_delta: i128,
    fee_growth_inside_0_x128: U256,
    fee_growth_inside_1_x128: U256,
) -> Result<(Position, U256, U256), Error> {
    let liquidity_before = position.liquidity;
    let liquidity_after = if liquidity_delta == 0 {
        if liquidity_before == 0 {
            return Err(PoolError::CannotUpdateEmptyPosition.into());
        }
        liquidity_before
    } else {
        add_delta(liquidity_before, liquidity_delta)?
    };

    // Fees accrue to the liquidity held while the growth happened, so the
    // pre-delta amount is the right multiplier. Snapshot differences wrap.
    let fees_owed_0 = mul_div(
        fee_growth_inside_0_x128.wrapping_sub(position.fee_growth_inside_0_last_x128),
        U256::from(liquidity_before),
        Q128,
    )?;
    let fees_owed_1 = mul_div(
        fee_growth_inside_1_x128.wrapping_sub(position.fee_growth_inside_1_last_x128),
        U256::from(liquidity_before),
        Q128,
    )?;

    Ok((
        Position {
            liquidity: liquidity_after,
            fee_growth_inside_0_last_x128: fee_growth_inside_0_x128,
            fee_growth_inside_1_last_x128: fee_growth_inside_1_x128,
        },
        fees_owed_0,
        fees_owed_1,
    ))
}
