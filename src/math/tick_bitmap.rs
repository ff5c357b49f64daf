use crate::FastMap;
use crate::U256_1;
use crate::error::{MathError, PoolError};
use crate::math::bit_math::{least_significant_bit, most_significant_bit};
use alloy_primitives::U256;

/// Splits a compressed tick (tick / spacing) into its bitmap coordinates:
/// the 256-bit word index and the bit within that word.
pub fn position(compressed: i32) -> (i16, u8) {
    ((compressed >> 8) as i16, (compressed & 0xff) as u8)
}

/// Reads a bitmap word, treating absent entries as all-zero.
pub fn get_word(bitmap: &FastMap<i16, U256>, word: i16) -> U256 {
    bitmap.get(&word).copied().unwrap_or(U256::ZERO)
}

/// Toggles the initialized bit for `tick`, which must be aligned to
/// `tick_spacing`. Words that return to zero are removed from the map.
pub fn flip_tick(
    bitmap: &mut FastMap<i16, U256>,
    tick: i32,
    tick_spacing: i32,
) -> Result<(), PoolError> {
    if tick % tick_spacing != 0 {
        return Err(PoolError::TickMisaligned {
            tick,
            spacing: tick_spacing,
        });
    }

    let (word_pos, bit_pos) = position(tick / tick_spacing);
    let word = get_word(bitmap, word_pos) ^ (U256_1 << bit_pos);
    if word.is_zero() {
        bitmap.remove(&word_pos);
    } else {
        bitmap.insert(word_pos, word);
    }
    Ok(())
}

/// Finds the next initialized tick within the bitmap word containing
/// `tick` (searching down when `lte`, up otherwise).
///
/// Returns the candidate tick and whether it is actually initialized;
/// an uninitialized result is the word boundary in the search direction.
pub fn next_initialized_tick_within_one_word(
    bitmap: &FastMap<i16, U256>,
    tick: i32,
    tick_spacing: i32,
    lte: bool,
) -> Result<(i32, bool), MathError> {
    let mut compressed: i32 = tick / tick_spacing;

    // Round toward negative infinity.
    if tick < 0 && tick % tick_spacing != 0 {
        compressed -= 1;
    }

    if lte {
        let (word_pos, bit_pos) = position(compressed);

        // Bits at or below the current position.
        let mask: U256 = (U256_1 << bit_pos) | ((U256_1 << bit_pos) - U256_1);
        let masked: U256 = get_word(bitmap, word_pos) & mask;

        let initialized = !masked.is_zero();
        let next: i32 = if initialized {
            (compressed - (bit_pos - most_significant_bit(masked)?) as i32) * tick_spacing
        } else {
            (compressed - bit_pos as i32) * tick_spacing
        };
        Ok((next, initialized))
    } else {
        let (word_pos, bit_pos) = position(compressed + 1);

        // Bits at or above the position one past the current tick.
        let mask: U256 = !((U256_1 << bit_pos) - U256_1);
        let masked: U256 = get_word(bitmap, word_pos) & mask;

        let initialized = !masked.is_zero();
        let next: i32 = if initialized {
            (compressed + 1 + (least_significant_bit(masked)? - bit_pos) as i32) * tick_spacing
        } else {
            (compressed + 1 + (255u8 - bit_pos) as i32) * tick_spacing
        };
        Ok((next, initialized))
    }
}
