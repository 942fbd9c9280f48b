//! Pure 32-bit arithmetic used by the interpreter.

use crate::exception::Exception;

#[inline]
pub fn ashl(a: u32, count: u32) -> u32 {
    (a as i32).wrapping_shl(count) as u32
}

#[inline]
pub fn ashr(a: u32, count: u32) -> u32 {
    (a as i32).wrapping_shr(count) as u32
}

#[inline]
pub fn lshr(a: u32, count: u32) -> u32 {
    a.wrapping_shr(count)
}

/// Low 32 bits of the signed 64-bit product.
#[inline]
pub fn mul(a: u32, b: u32) -> u32 {
    (a as i32).wrapping_mul(b as i32) as u32
}

/// High 32 bits of the signed 64-bit product.
#[inline]
pub fn mul_high(a: u32, b: u32) -> u32 {
    let product = i64::from(a as i32) * i64::from(b as i32);
    (product >> 32) as u32
}

/// High 32 bits of the unsigned 64-bit product.
#[inline]
pub fn umul_high(a: u32, b: u32) -> u32 {
    let product = u64::from(a) * u64::from(b);
    (product >> 32) as u32
}

/// Signed division truncating toward zero. `i32::MIN / -1` wraps to `i32::MIN`.
#[inline]
pub fn div(a: u32, b: u32) -> Result<u32, Exception> {
    match b {
        0 => Err(Exception::DivisionByZero),
        _ => Ok((a as i32).wrapping_div(b as i32) as u32),
    }
}

/// Signed remainder with the sign of the dividend. `i32::MIN % -1` is `0`.
#[inline]
pub fn rem(a: u32, b: u32) -> Result<u32, Exception> {
    match b {
        0 => Err(Exception::DivisionByZero),
        _ => Ok((a as i32).wrapping_rem(b as i32) as u32),
    }
}

#[inline]
pub fn udiv(a: u32, b: u32) -> Result<u32, Exception> {
    a.checked_div(b).ok_or(Exception::DivisionByZero)
}

#[inline]
pub fn urem(a: u32, b: u32) -> Result<u32, Exception> {
    a.checked_rem(b).ok_or(Exception::DivisionByZero)
}

#[inline]
pub fn sign_extend_byte(b: u32) -> u32 {
    b as u8 as i8 as i32 as u32
}

#[inline]
pub fn sign_extend_short(b: u32) -> u32 {
    b as u16 as i16 as i32 as u32
}
