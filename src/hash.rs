//! Map type used for all sparse pool state (ticks, bitmap words, positions).
//! The hasher is selected at build time; `rustc-hash` wins when both hashing
//! features are enabled.

#[cfg(feature = "rustc-hash")]
pub type FastMap<K, V> = rustc_hash::FxHashMap<K, V>;

#[cfg(all(feature = "ahash", not(feature = "rustc-hash")))]
pub type FastMap<K, V> = ahash::AHashMap<K, V>;

#[cfg(not(any(feature = "rustc-hash", feature = "ahash")))]
pub type FastMap<K, V> = std::collections::HashMap<K, V>;
