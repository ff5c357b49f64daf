pub mod liquidity;
pub mod position;
pub mod swap;
pub mod tick;

use crate::FastMap;
use crate::error::{Error, PoolError};
use crate::math::swap_math::MAX_SWAP_FEE;
use crate::math::tick_math::get_tick_at_sqrt_price;
use crate::pool::position::{Position, position_key};
use crate::pool::tick::TickInfo;
use alloy_primitives::{Address, B256, U256};
use tracing::debug;

/// The pool's hot fields: current price, tick, and fee configuration.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Slot0 {
    /// Current sqrt price, Q64.96. Zero means the pool is uninitialized.
    pub sqrt_price_x96: U256,
    pub tick: i32,
    pub protocol_fee: u8,
    /// LP fee in pips.
    pub lp_fee: u32,
}

/// State of a single (pair, fee, spacing) pool: price, in-range liquidity,
/// global fee-growth accumulators, and the three sparse ledgers.
///
/// The engine is strictly sequential per pool; wrap a `Pool` in exclusive
/// access when sharing across threads.
#[derive(Clone, Debug, Default)]
pub struct Pool {
    pub slot0: Slot0,
    /// Liquidity currently in range at `slot0.tick`.
    pub liquidity: u128,
    pub fee_growth_global_0_x128: U256,
    pub fee_growth_global_1_x128: U256,
    pub ticks: FastMap<i32, TickInfo>,
    pub bitmap: FastMap<i16, U256>,
    pub positions: FastMap<B256, Position>,
}

impl Pool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        !self.slot0.sqrt_price_x96.is_zero()
    }

    /// Sets the starting price and LP fee of a fresh pool and returns the
    /// tick containing that price. May only be called once.
    pub fn initialize(&mut self, sqrt_price_x96: U256, lp_fee: u32) -> Result<i32, Error> {
        if self.is_initialized() {
            return Err(PoolError::AlreadyInitialized.into());
        }
        if lp_fee > MAX_SWAP_FEE {
            return Err(PoolError::InvalidSwapFee(lp_fee).into());
        }

        let tick = get_tick_at_sqrt_price(sqrt_price_x96)?;
        self.slot0 = Slot0 {
            sqrt_price_x96,
            tick,
            protocol_fee: 0,
            lp_fee,
        };

        debug!(tick, %sqrt_price_x96, lp_fee, "pool initialized");
        Ok(tick)
    }

    pub fn set_protocol_fee(&mut self, protocol_fee: u8) -> Result<(), Error> {
        self.check_initialized()?;
        self.slot0.protocol_fee = protocol_fee;
        Ok(())
    }

    pub fn set_lp_fee(&mut self, lp_fee: u32) -> Result<(), Error> {
        self.check_initialized()?;
        if lp_fee > MAX_SWAP_FEE {
            return Err(PoolError::InvalidSwapFee(lp_fee).into());
        }
        self.slot0.lp_fee = lp_fee;
        Ok(())
    }

    pub(crate) fn check_initialized(&self) -> Result<(), PoolError> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(PoolError::NotInitialized)
        }
    }

    /// Snapshot of a tick's record; absent ticks read as all-zero.
    pub fn tick_info(&self, tick: i32) -> TickInfo {
        self.ticks.get(&tick).cloned().unwrap_or_default()
    }

    /// Looks up a position by its constituent fields.
    pub fn position(
        &self,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        salt: B256,
    ) -> Option<&Position> {
        self.positions
            .get(&position_key(owner, tick_lower, tick_upper, salt))
    }
}
