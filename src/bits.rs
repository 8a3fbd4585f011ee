//! Integer utilities: count-leading-zeros, overflow-checked add/sub,
//! bit-width fitting, and the two division-free primitives the rest of the
//! crate is built on top of — `mul_hu` (high-half unsigned multiply at a
//! configurable shift) and `scaled_add` (`(a+b)>>s` without intermediate
//! overflow).
//!
//! Every numeric kernel above this module (`fixed`, `decimal`, `reciprocal`,
//! `sqrt`) is generic over [`Backing`], the trait that picks the
//! machine-native signed integer (`i8`/`i32`/`i64`/`i128`) used to store a
//! given Q(I,F) shape. 16-bit is deliberately absent — it is slow on common
//! CPUs and the width-selection table in [`fastest_width`] skips it.

use std::fmt;
use std::ops;

/// Minimal surface over the native unsigned integer types needed by
/// [`Backing`]. Every inherent method here already exists on `u8`/`u32`/
/// `u64`/`u128`; this trait just lets the rest of the crate stay generic
/// over the backing width instead of writing four copies of each kernel.
pub trait UInt:
    Copy
    + Clone
    + fmt::Debug
    + PartialEq
    + Eq
    + PartialOrd
    + Ord
    + ops::Shl<u32, Output = Self>
    + ops::Shr<u32, Output = Self>
    + ops::BitOr<Output = Self>
    + ops::BitAnd<Output = Self>
    + ops::Add<Output = Self>
    + ops::Sub<Output = Self>
{
    const WIDTH: u32;
    const ZERO: Self;
    const ONE: Self;
    const MAX: Self;

    fn leading_zeros(self) -> u32;
    fn overflowing_add(self, rhs: Self) -> (Self, bool);
    fn wrapping_add(self, rhs: Self) -> Self;
    fn wrapping_sub(self, rhs: Self) -> Self;
    fn wrapping_mul(self, rhs: Self) -> Self;
    fn as_u128(self) -> u128;
    fn from_u128(v: u128) -> Self;
}

macro_rules! impl_uint {
    ($($t:ty),+) => {$(
        impl UInt for $t {
            const WIDTH: u32 = <$t>::BITS;
            const ZERO: Self = 0;
            const ONE: Self = 1;
            const MAX: Self = <$t>::MAX;

            #[inline]
            fn leading_zeros(self) -> u32 { <$t>::leading_zeros(self) }
            #[inline]
            fn overflowing_add(self, rhs: Self) -> (Self, bool) { <$t>::overflowing_add(self, rhs) }
            #[inline]
            fn wrapping_add(self, rhs: Self) -> Self { <$t>::wrapping_add(self, rhs) }
            #[inline]
            fn wrapping_sub(self, rhs: Self) -> Self { <$t>::wrapping_sub(self, rhs) }
            #[inline]
            fn wrapping_mul(self, rhs: Self) -> Self { <$t>::wrapping_mul(self, rhs) }
            #[inline]
            fn as_u128(self) -> u128 { self as u128 }
            #[inline]
            fn from_u128(v: u128) -> Self { v as $t }
        }
    )+};
}
impl_uint!(u8, u16, u32, u64, u128);

/// `log2_ceil(x) = W(T) - clz(x)`: the bit-length of `|x|`, i.e. the number
/// of bits needed to hold `x` as an unsigned magnitude. `x` must be nonzero.
#[inline]
pub fn log2_ceil<U: UInt>(x: U) -> u32 {
    debug_assert!(x != U::ZERO, "log2_ceil of zero is undefined");
    U::WIDTH - x.leading_zeros()
}

/// The machine-native signed integer backing a Q(I,F) value. Implemented for
/// `i8`, `i32`, `i64`, and (behind the `wide128` capability switch) `i128`.
pub trait Backing:
    Copy
    + Clone
    + fmt::Debug
    + PartialEq
    + Eq
    + PartialOrd
    + Ord
    + ops::Add<Output = Self>
    + ops::Sub<Output = Self>
    + ops::Neg<Output = Self>
{
    /// Unsigned companion of the same width.
    type Unsigned: UInt;

    const WIDTH: u32;
    const ZERO: Self;
    const ONE: Self;
    const MIN: Self;
    const MAX: Self;

    fn from_i128(v: i128) -> Self;
    fn to_i128(self) -> i128;

    fn to_unsigned(self) -> Self::Unsigned;
    fn from_unsigned(u: Self::Unsigned) -> Self;

    fn overflowing_add(self, rhs: Self) -> (Self, bool);
    fn overflowing_sub(self, rhs: Self) -> (Self, bool);

    /// Arithmetic (sign-extending) right shift. Shifting by `>= WIDTH` saturates
    /// to all-sign-bits, matching native Rust shift semantics extended past width.
    fn shr(self, n: u32) -> Self;
    /// Left shift, wrapping. Shifting by `>= WIDTH` yields zero.
    fn shl(self, n: u32) -> Self;

    /// The high-half unsigned multiply `(a*b) >> shift`, `shift >= Self::WIDTH`.
    /// `a` and `b` are reinterpreted as unsigned magnitudes of the backing width.
    fn mul_hu_unsigned(a: Self::Unsigned, b: Self::Unsigned, shift: u32) -> Self::Unsigned;

    /// `(a+b) >> shift` on unsigned magnitudes, exact even when `a+b` would
    /// overflow the backing width. Implemented uniformly via the carry bit
    /// out of `overflowing_add`, the same idiom used throughout this crate's
    /// teacher for every multi-limb add.
    #[inline]
    fn scaled_add_unsigned(a: Self::Unsigned, b: Self::Unsigned, shift: u32) -> Self::Unsigned {
        debug_assert!(shift >= 1, "scaled_add shift must be at least 1");
        let (sum, carry) = a.overflowing_add(b);
        let w = Self::Unsigned::WIDTH;
        if shift >= w {
            // The 1-bit carry is all that's left once we've shifted past the
            // whole low word; further shift only matters if shift == w.
            if carry && shift == w {
                Self::Unsigned::ONE
            } else {
                Self::Unsigned::ZERO
            }
        } else {
            let hi = if carry {
                Self::Unsigned::ONE << (w - shift)
            } else {
                Self::Unsigned::ZERO
            };
            (sum >> shift) | hi
        }
    }

    #[inline]
    fn is_negative(self) -> bool {
        self < Self::ZERO
    }
}

/// `abs(x)`. On the most-negative representable value this returns the same
/// bit pattern (documented, not treated as an error here — see
/// `FixedError::Overflow` at the `Fixed::abs` call site for the checked form).
#[inline]
pub fn abs<R: Backing>(x: R) -> R {
    if x == R::MIN {
        x
    } else if x.is_negative() {
        R::ZERO - x
    } else {
        x
    }
}

/// `true` iff signed `a+b` would overflow.
#[inline]
pub fn add_overflow<R: Backing>(a: R, b: R) -> bool {
    a.overflowing_add(b).1
}

/// `true` iff signed `a-b` would overflow.
#[inline]
pub fn sub_overflow<R: Backing>(a: R, b: R) -> bool {
    a.overflowing_sub(b).1
}

/// `true` iff signed `x` fits in `n` bits, i.e. `x in [-2^(n-1), 2^(n-1)-1]`.
/// Works for `n == R::WIDTH` (the whole-width case always fits).
#[inline]
pub fn fit_in<R: Backing>(x: R, n: u32) -> bool {
    if n >= R::WIDTH {
        return true;
    }
    let half = 1i128 << (n - 1);
    let v = x.to_i128();
    v >= -half && v <= half - 1
}

/// High-half unsigned multiply: `(a*b) >> shift`, `shift >= R::WIDTH`.
#[inline]
pub fn mul_hu<R: Backing>(a: R::Unsigned, b: R::Unsigned, shift: u32) -> R::Unsigned {
    R::mul_hu_unsigned(a, b, shift)
}

/// `(a+b) >> shift` on unsigned magnitudes without intermediate overflow.
#[inline]
pub fn scaled_add<R: Backing>(a: R::Unsigned, b: R::Unsigned, shift: u32) -> R::Unsigned {
    R::scaled_add_unsigned(a, b, shift)
}

/// The exact high/low halves of the full double-width product of two
/// half-width unsigned limbs, recombined with the carry chain.
///
/// This is the split-multiply recurrence from the spec's §4.1, generalized
/// so it can serve both the 64-bit-without-128-bit-support `mul_hu` branch
/// *and* the 128-bit branch (for which no native 256-bit type exists at
/// all). It is grounded directly in this crate's teacher
/// (`Int128::mul_u64_full`/`Uint64::widening_mul`): split each operand into
/// two halves, form the four partial products, and combine the middle terms
/// with carry propagation exactly as the teacher's limb-struct arithmetic
/// does — just applied to plain native integers instead of a limb struct.
macro_rules! impl_split_widening_mul {
    ($full:ty, $half:ty, $name:ident) => {
        #[inline]
        fn $name(a: $full, b: $full) -> ($full, $full) {
            const HALF_BITS: u32 = <$half>::BITS;
            let a_lo = a as $half as $full;
            let a_hi = (a >> HALF_BITS) as $half as $full;
            let b_lo = b as $half as $full;
            let b_hi = (b >> HALF_BITS) as $half as $full;

            let p00 = a_lo * b_lo;
            let p01 = a_lo * b_hi;
            let p10 = a_hi * b_lo;
            let p11 = a_hi * b_hi;

            // Each accumulator is truncated back to half-width before the
            // next stage, exactly as the teacher's widening_mul casts every
            // limb down to u32: the true product of two $full values always
            // fits in 2*FULL_BITS bits, so any apparent overflow here is a
            // phantom carry-out that the truncation correctly discards.
            let r0 = (p00 as $half) as $full;
            let carry = p00 >> HALF_BITS;

            let mid = carry + (p01 as $half as $full) + (p10 as $half as $full);
            let r1 = (mid as $half) as $full;
            let carry = mid >> HALF_BITS;

            let mid = carry + (p01 >> HALF_BITS) + (p10 >> HALF_BITS) + (p11 as $half as $full);
            let r2 = (mid as $half) as $full;
            let carry = mid >> HALF_BITS;

            let r3 = ((carry + (p11 >> HALF_BITS)) as $half) as $full;

            let lo = r0 | (r1 << HALF_BITS);
            let hi = r2 | (r3 << HALF_BITS);
            (hi, lo)
        }
    };
}

impl_split_widening_mul!(u64, u32, widening_mul_u64);
impl_split_widening_mul!(u128, u64, widening_mul_u128);

// ============================================================================
// Backing impls
// ============================================================================

impl Backing for i8 {
    type Unsigned = u8;
    const WIDTH: u32 = 8;
    const ZERO: Self = 0;
    const ONE: Self = 1;
    const MIN: Self = i8::MIN;
    const MAX: Self = i8::MAX;

    #[inline]
    fn from_i128(v: i128) -> Self {
        v as i8
    }
    #[inline]
    fn to_i128(self) -> i128 {
        self as i128
    }
    #[inline]
    fn to_unsigned(self) -> u8 {
        self as u8
    }
    #[inline]
    fn from_unsigned(u: u8) -> Self {
        u as i8
    }
    #[inline]
    fn overflowing_add(self, rhs: Self) -> (Self, bool) {
        i8::overflowing_add(self, rhs)
    }
    #[inline]
    fn overflowing_sub(self, rhs: Self) -> (Self, bool) {
        i8::overflowing_sub(self, rhs)
    }
    #[inline]
    fn shr(self, n: u32) -> Self {
        if n >= 8 {
            if self.is_negative() { -1 } else { 0 }
        } else {
            self >> n
        }
    }
    #[inline]
    fn shl(self, n: u32) -> Self {
        if n >= 8 { 0 } else { self << n }
    }
    #[inline]
    fn mul_hu_unsigned(a: u8, b: u8, shift: u32) -> u8 {
        ((a as u16 * b as u16) >> shift) as u8
    }
}

impl Backing for i32 {
    type Unsigned = u32;
    const WIDTH: u32 = 32;
    const ZERO: Self = 0;
    const ONE: Self = 1;
    const MIN: Self = i32::MIN;
    const MAX: Self = i32::MAX;

    #[inline]
    fn from_i128(v: i128) -> Self {
        v as i32
    }
    #[inline]
    fn to_i128(self) -> i128 {
        self as i128
    }
    #[inline]
    fn to_unsigned(self) -> u32 {
        self as u32
    }
    #[inline]
    fn from_unsigned(u: u32) -> Self {
        u as i32
    }
    #[inline]
    fn overflowing_add(self, rhs: Self) -> (Self, bool) {
        i32::overflowing_add(self, rhs)
    }
    #[inline]
    fn overflowing_sub(self, rhs: Self) -> (Self, bool) {
        i32::overflowing_sub(self, rhs)
    }
    #[inline]
    fn shr(self, n: u32) -> Self {
        if n >= 32 {
            if self.is_negative() { -1 } else { 0 }
        } else {
            self >> n
        }
    }
    #[inline]
    fn shl(self, n: u32) -> Self {
        if n >= 32 { 0 } else { self << n }
    }
    #[inline]
    fn mul_hu_unsigned(a: u32, b: u32, shift: u32) -> u32 {
        ((a as u64 * b as u64) >> shift) as u32
    }
}

impl Backing for i64 {
    type Unsigned = u64;
    const WIDTH: u32 = 64;
    const ZERO: Self = 0;
    const ONE: Self = 1;
    const MIN: Self = i64::MIN;
    const MAX: Self = i64::MAX;

    #[inline]
    fn from_i128(v: i128) -> Self {
        v as i64
    }
    #[inline]
    fn to_i128(self) -> i128 {
        self as i128
    }
    #[inline]
    fn to_unsigned(self) -> u64 {
        self as u64
    }
    #[inline]
    fn from_unsigned(u: u64) -> Self {
        u as i64
    }
    #[inline]
    fn overflowing_add(self, rhs: Self) -> (Self, bool) {
        i64::overflowing_add(self, rhs)
    }
    #[inline]
    fn overflowing_sub(self, rhs: Self) -> (Self, bool) {
        i64::overflowing_sub(self, rhs)
    }
    #[inline]
    fn shr(self, n: u32) -> Self {
        if n >= 64 {
            if self.is_negative() { -1 } else { 0 }
        } else {
            self >> n
        }
    }
    #[inline]
    fn shl(self, n: u32) -> Self {
        if n >= 64 { 0 } else { self << n }
    }
    #[inline]
    fn mul_hu_unsigned(a: u64, b: u64, shift: u32) -> u64 {
        #[cfg(feature = "wide128")]
        {
            (((a as u128) * (b as u128)) >> shift) as u64
        }
        #[cfg(not(feature = "wide128"))]
        {
            // No native 128-bit promotion: compute the exact high/low halves
            // of the 128-bit product via the split-multiply recurrence and
            // drop only the low partial product's low half, as the spec's
            // §4.1 permits for shift >= W(T).
            let (hi, lo) = widening_mul_u64(a, b);
            if shift == 64 {
                hi
            } else if shift > 64 {
                hi >> (shift - 64)
            } else {
                // shift < 64: keep bits of `lo` that survive the shift too.
                (hi << (64 - shift)) | (lo >> shift)
            }
        }
    }
}

#[cfg(feature = "wide128")]
impl Backing for i128 {
    type Unsigned = u128;
    const WIDTH: u32 = 128;
    const ZERO: Self = 0;
    const ONE: Self = 1;
    const MIN: Self = i128::MIN;
    const MAX: Self = i128::MAX;

    #[inline]
    fn from_i128(v: i128) -> Self {
        v
    }
    #[inline]
    fn to_i128(self) -> i128 {
        self
    }
    #[inline]
    fn to_unsigned(self) -> u128 {
        self as u128
    }
    #[inline]
    fn from_unsigned(u: u128) -> Self {
        u as i128
    }
    #[inline]
    fn overflowing_add(self, rhs: Self) -> (Self, bool) {
        i128::overflowing_add(self, rhs)
    }
    #[inline]
    fn overflowing_sub(self, rhs: Self) -> (Self, bool) {
        i128::overflowing_sub(self, rhs)
    }
    #[inline]
    fn shr(self, n: u32) -> Self {
        if n >= 128 {
            if self.is_negative() { -1 } else { 0 }
        } else {
            self >> n
        }
    }
    #[inline]
    fn shl(self, n: u32) -> Self {
        if n >= 128 { 0 } else { self << n }
    }
    #[inline]
    fn mul_hu_unsigned(a: u128, b: u128, shift: u32) -> u128 {
        // There is no native 256-bit type regardless of `wide128`; this is
        // the crate's one unconditional split-multiply branch.
        let (hi, lo) = widening_mul_u128(a, b);
        if shift == 128 {
            hi
        } else if shift > 128 {
            hi >> (shift - 128)
        } else {
            (hi << (128 - shift)) | (lo >> shift)
        }
    }
}

/// Double-width promotion used by `sqrt`'s full-precision path: the backing
/// type exactly twice as wide as `Self`, when one exists natively.
pub trait HasDouble: Backing {
    type Double: Backing;
}

impl HasDouble for i8 {
    type Double = i32;
}
impl HasDouble for i32 {
    type Double = i64;
}
#[cfg(feature = "wide128")]
impl HasDouble for i64 {
    type Double = i128;
}
// i128 has no `HasDouble` impl: doubling it would need a 256-bit type this
// crate does not provide. `Fixed::sqrt` is therefore unavailable at the
// i128 backing width; `sqrt_fast` (half precision, no promotion) still is.

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[quickcheck]
    fn mul_hu_i32_matches_u64_reference(a: u32, b: u32) -> bool {
        let expected = (((a as u64) * (b as u64)) >> 32) as u32;
        mul_hu::<i32>(a, b, 32) == expected
    }

    #[quickcheck]
    fn mul_hu_i64_matches_u128_reference(a: u64, b: u64, shift: u8) -> bool {
        let shift = 64 + (shift % 64) as u32;
        let expected = (((a as u128) * (b as u128)) >> shift) as u64;
        mul_hu::<i64>(a, b, shift) == expected
    }

    #[quickcheck]
    fn scaled_add_i64_matches_u128_reference(a: u64, b: u64, shift_raw: u8) -> bool {
        let shift = 1 + (shift_raw % 63) as u32;
        let expected = (((a as u128) + (b as u128)) >> shift) as u64;
        scaled_add::<i64>(a, b, shift) == expected
    }

    #[test]
    fn mul_hu_u8_example() {
        assert_eq!(mul_hu::<i8>(245, 38, 8), 36);
    }

    #[test]
    fn mul_hu_u32_example() {
        assert_eq!(mul_hu::<i32>(3894967294, 2222222222, 32), 2015261648);
    }

    #[test]
    fn mul_hu_u64_example() {
        assert_eq!(
            mul_hu::<i64>(11111111111111111111, 2222222222222222222, 64),
            1338521200599388189
        );
    }

    #[test]
    fn scaled_add_u64_shift1_example() {
        assert_eq!(
            scaled_add::<i64>(11111111111111111111, 11111111111111111111, 1),
            11111111111111111111
        );
    }

    #[test]
    fn scaled_add_u64_shift2_example() {
        assert_eq!(
            scaled_add::<i64>(1999999999999999992, 1999999999999999992, 2),
            999999999999999996
        );
    }

    #[test]
    fn fit_in_whole_width() {
        assert!(fit_in::<i32>(i32::MIN, 32));
        assert!(fit_in::<i32>(i32::MAX, 32));
    }

    #[test]
    fn fit_in_narrow() {
        assert!(fit_in::<i32>(-1, 1));
        assert!(!fit_in::<i32>(1, 1));
        assert!(fit_in::<i32>(1, 2));
        assert!(!fit_in::<i32>(2, 2));
    }

    #[test]
    fn abs_min_preserves_bit_pattern() {
        assert_eq!(abs::<i32>(i32::MIN), i32::MIN);
    }
}
