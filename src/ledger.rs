use crate::FastMap;
use crate::error::MathError;
use alloy_primitives::Address;

/// Deferred-settlement balances between the engine's callers and the
/// registry: signed amounts per (target, currency), plus a watermark of
/// how many entries are still unsettled.
///
/// The pool engine itself never touches this; the registry applies the
/// deltas returned by `modify_liquidity` and `swap` and refuses teardown
/// while any entry is non-zero.
#[derive(Clone, Debug, Default)]
pub struct DeltaLedger {
    deltas: FastMap<(Address, Address), i128>,
    nonzero: usize,
}

impl DeltaLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `delta` to the balance of (target, currency) and returns the
    /// new balance. Entries settling back to zero are dropped.
    pub fn apply(
        &mut self,
        target: Address,
        currency: Address,
        delta: i128,
    ) -> Result<i128, MathError> {
        let current = self.current(target, currency);
        let next = current.checked_add(delta).ok_or(MathError::Overflow)?;

        match (current == 0, next == 0) {
            (true, false) => self.nonzero += 1,
            (false, true) => self.nonzero -= 1,
            _ => {}
        }
        if next == 0 {
            self.deltas.remove(&(target, currency));
        } else {
            self.deltas.insert((target, currency), next);
        }
        Ok(next)
    }

    pub fn current(&self, target: Address, currency: Address) -> i128 {
        self.deltas.get(&(target, currency)).copied().unwrap_or(0)
    }

    /// Number of (target, currency) pairs with an outstanding balance.
    pub fn nonzero_count(&self) -> usize {
        self.nonzero
    }

    pub fn is_settled(&self) -> bool {
        self.nonzero == 0
    }
}
