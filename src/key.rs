use crate::error::KeyError;
use alloy_primitives::{Address, B256, keccak256};

/// Smallest admissible tick spacing.
pub const MIN_TICK_SPACING: i32 = 1;
/// Largest admissible tick spacing.
pub const MAX_TICK_SPACING: i32 = 32767;

/// Identity of a pool: the sorted token pair, LP fee in pips, and tick
/// spacing. Two keys differing in any field address distinct pools.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PoolKey {
    pub token0: Address,
    pub token1: Address,
    pub fee: u32,
    pub tick_spacing: i32,
}

impl PoolKey {
    /// Checks the registry-boundary constraints: strict token ordering and
    /// the tick-spacing bounds.
    pub fn validate(&self) -> Result<(), KeyError> {
        if self.token0 >= self.token1 {
            return Err(KeyError::InvalidTokenOrder);
        }
        if self.tick_spacing < MIN_TICK_SPACING {
            return Err(KeyError::TickSpacingTooSmall(self.tick_spacing));
        }
        if self.tick_spacing > MAX_TICK_SPACING {
            return Err(KeyError::TickSpacingTooLarge(self.tick_spacing));
        }
        Ok(())
    }

    /// keccak256 over token0, token1, fee, and tick spacing, in that
    /// order; integers are serialized little-endian.
    pub fn id(&self) -> B256 {
        let mut buf = [0u8; 48];
        buf[..20].copy_from_slice(self.token0.as_slice());
        buf[20..40].copy_from_slice(self.token1.as_slice());
        buf[40..44].copy_from_slice(&self.fee.to_le_bytes());
        buf[44..].copy_from_slice(&self.tick_spacing.to_le_bytes());
        keccak256(buf)
    }
}

/// Canonical (token0, token1) ordering by address bytes.
pub fn sort_tokens(a: Address, b: Address) -> (Address, Address) {
    if a < b { (a, b) } else { (b, a) }
}
