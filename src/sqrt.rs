//! Digit-by-digit (binary restoring) integer square root: [`sqrt_fast`]
//! produces a half-precision result directly from the backing integer;
//! [`sqrt`] gets full precision by first promoting into a double-width
//! magnitude via [`HasDouble`] and running the same digit-by-digit kernel
//! there.

use crate::bits::{self, Backing, HasDouble, UInt};
use crate::error::{FixedError, Result};
use crate::fixed::Fixed;

/// Classic binary restoring integer square root on an unsigned magnitude:
/// `g` such that `g*g <= val < (g+1)*(g+1)`.
fn isqrt<U: UInt>(val: U) -> U {
    if val == U::ZERO {
        return U::ZERO;
    }
    let mut bshft: i64 = (bits::log2_ceil(val) as i64 - 1) >> 1;
    let mut b: U = U::ONE << (bshft as u32);
    let mut g = U::ZERO;
    let mut remaining = val;

    loop {
        if bshft < 0 {
            break;
        }
        let bs = bshft as u32;
        let trial = (g + g + b) << bs;
        if remaining >= trial {
            remaining = remaining - trial;
            g = g + b;
        }
        b = b >> 1;
        bshft -= 1;
    }
    g
}

/// Half-precision square root: Q(I,F) -> Q(I2,F2) where `I2 == I/2` and
/// `F2 == F/2`. The destination shape (and its backing type, which may
/// differ from `R` once the halved bit count crosses a width boundary) is
/// supplied by the caller via turbofish, the same convention used by
/// [`Fixed::floor`]/[`Fixed::ceil`].
pub fn sqrt_fast<R, const I: u32, const F: u32, R2, const I2: u32, const F2: u32>(
    x: Fixed<R, I, F>,
) -> Result<Fixed<R2, I2, F2>>
where
    R: Backing,
    R2: Backing,
{
    debug_assert_eq!(I2, I / 2, "sqrt_fast's destination I must be I/2");
    debug_assert_eq!(F2, F / 2, "sqrt_fast's destination F must be F/2");

    if x.to_bits().is_negative() {
        return Err(FixedError::Domain("sqrt of negative value"));
    }
    let mag = x.to_bits().to_unsigned();
    let root = isqrt(mag);
    Ok(Fixed::from_bits(R2::from_i128(root.as_u128() as i128)))
}

/// Full-precision square root: Q(I,F) -> Q(I,F), bit-exact. Promotes `x`'s
/// magnitude to the width of `R::Double` (conceptually Q(2I,2F)) before
/// taking the digit-by-digit root, so the halving in [`isqrt`]'s result
/// lands back exactly at the original shape.
pub fn sqrt<R, const I: u32, const F: u32>(x: Fixed<R, I, F>) -> Result<Fixed<R, I, F>>
where
    R: HasDouble,
{
    if x.to_bits().is_negative() {
        return Err(FixedError::Domain("sqrt of negative value"));
    }
    let mag = x.to_bits().to_unsigned();
    let widened = <R::Double as Backing>::Unsigned::from_u128(mag.as_u128());
    let promoted = widened << F;
    let root = isqrt(promoted);
    Ok(Fixed::from_bits(R::from_i128(root.as_u128() as i128)))
}
