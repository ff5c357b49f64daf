use crate::error::MathError;
use alloy_primitives::U256;

const U256_TWO: U256 = U256::from_limbs([2, 0, 0, 0]);
const U256_THREE: U256 = U256::from_limbs([3, 0, 0, 0]);

/// Computes `floor(a * b / denominator)` with a full 512-bit intermediate
/// product, so the multiplication may overflow 256 bits as long as the
/// final quotient fits.
///
/// Fails with `DivisionByZero` when the denominator is zero and with
/// `Overflow` when the quotient does not fit in 256 bits.
pub fn mul_div(a: U256, b: U256, mut denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }

    // 512-bit product (prod1, prod0) recovered from the product mod 2^256
    // and the product mod 2^256 - 1.
    let mm = a.mul_mod(b, U256::MAX);
    let mut prod0 = a.wrapping_mul(b);
    let (mut prod1, borrow) = mm.overflowing_sub(prod0);
    if borrow {
        prod1 = prod1.wrapping_sub(U256::ONE);
    }

    if prod1.is_zero() {
        return Ok(prod0.wrapping_div(denominator));
    }

    if denominator <= prod1 {
        return Err(MathError::Overflow);
    }

    // Make (prod1, prod0) exactly divisible by subtracting the remainder.
    let remainder = a.mul_mod(b, denominator);
    let (diff, borrow) = prod0.overflowing_sub(remainder);
    prod0 = diff;
    if borrow {
        prod1 = prod1.wrapping_sub(U256::ONE);
    }

    // Factor powers of two out of the denominator and fold the high half
    // of the product into the low half.
    let twos = denominator & denominator.wrapping_neg();
    denominator = denominator.wrapping_div(twos);
    prod0 = prod0.wrapping_div(twos);
    let twos_shift = twos
        .wrapping_neg()
        .wrapping_div(twos)
        .wrapping_add(U256::ONE);
    prod0 |= prod1.wrapping_mul(twos_shift);

    // Invert the now-odd denominator modulo 2^256. The seed is correct to
    // four bits and each Newton step doubles the precision.
    let mut inv = U256_THREE.wrapping_mul(denominator) ^ U256_TWO;
    for _ in 0..6 {
        inv = inv.wrapping_mul(U256_TWO.wrapping_sub(denominator.wrapping_mul(inv)));
    }

    Ok(prod0.wrapping_mul(inv))
}

/// Like [`mul_div`], but rounds the quotient up when `a * b` is not an
/// exact multiple of the denominator.
pub fn mul_div_rounding_up(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    let mut result = mul_div(a, b, denominator)?;

    if a.mul_mod(b, denominator) > U256::ZERO {
        if result == U256::MAX {
            return Err(MathError::Overflow);
        }
        result += U256::ONE;
    }
    Ok(result)
}

/// Divides `a` by `b`, rounding up on a non-zero remainder.
///
/// Panics on division by zero, mirroring primitive integer division;
/// callers must guard the denominator.
pub fn div_rounding_up(a: U256, b: U256) -> U256 {
    let (quotient, remainder) = a.div_rem(b);
    if remainder.is_zero() {
        quotient
    } else {
        quotient + U256::ONE
    }
}
