use alloy_primitives::U256;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MathError {
    #[error("math error - overflow")]
    Overflow,
    #[error("math error - underflow")]
    Underflow,
    #[error("math error - division by zero")]
    DivisionByZero,
    #[error("bit math error - zero input value")]
    ZeroValue,
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("state error - sqrt price out of bounds")]
    SqrtPriceOutOfBounds,
    #[error("state error - sqrt price is 0")]
    SqrtPriceIsZero,
    #[error("state error - liquidity is 0")]
    LiquidityIsZero,
    #[error("state error - tick out of bounds")]
    TickOutOfBounds,
    #[error("state error - requested amount exceeds pool reserves")]
    InsufficientReserves,
    #[error("state error - amount exceeds the 160-bit range")]
    AmountOverflow,
}

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("pool is already initialized")]
    AlreadyInitialized,
    #[error("pool is not initialized")]
    NotInitialized,
    #[error("tick range misordered: lower {lower} >= upper {upper}")]
    TicksMisordered { lower: i32, upper: i32 },
    #[error("lower tick {0} below the minimum tick")]
    TickLowerOutOfBounds(i32),
    #[error("upper tick {0} above the maximum tick")]
    TickUpperOutOfBounds(i32),
    #[error("tick {tick} not aligned to spacing {spacing}")]
    TickMisaligned { tick: i32, spacing: i32 },
    #[error("liquidity on tick {0} exceeds the per-tick maximum")]
    TickLiquidityOverflow(i32),
    #[error("cannot update a position that holds no liquidity")]
    CannotUpdateEmptyPosition,
    #[error("price limit {limit} already exceeded at price {price}")]
    PriceLimitAlreadyExceeded { price: U256, limit: U256 },
    #[error("price limit {0} outside the valid sqrt price range")]
    PriceLimitOutOfBounds(U256),
    #[error("swap fee of {0} pips is not valid")]
    InvalidSwapFee(u32),
    #[error("exact-output swap is impossible with a 100% fee")]
    InvalidFeeForExactOutput,
}

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("token0 must sort strictly before token1")]
    InvalidTokenOrder,
    #[error("tick spacing {0} below the minimum")]
    TickSpacingTooSmall(i32),
    #[error("tick spacing {0} above the maximum")]
    TickSpacingTooLarge(i32),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    MathError(#[from] MathError),

    #[error(transparent)]
    StateError(#[from] StateError),

    #[error(transparent)]
    PoolError(#[from] PoolError),

    #[error(transparent)]
    KeyError(#[from] KeyError),
}
