use alloy_primitives::U256;

pub mod error;
mod hash;
pub mod key;
pub mod ledger;
pub mod math;
pub mod pool;

pub use hash::FastMap;
pub use key::PoolKey;
pub use pool::Pool;

const U256_1: U256 = U256::from_limbs([1, 0, 0, 0]);
const U256_127: U256 = U256::from_limbs([127, 0, 0, 0]);
const U256_128: U256 = U256::from_limbs([128, 0, 0, 0]);

/// 2^160 - 1, the largest representable sqrt price / amount1 operand.
const U160_MAX: U256 = U256::from_limbs([u64::MAX, u64::MAX, 4294967295, 0]);

pub const RESOLUTION: u8 = 96;
pub const Q96: U256 = U256::from_limbs([0, 4294967296, 0, 0]);
pub const Q128: U256 = U256::from_limbs([0, 0, 1, 0]);
