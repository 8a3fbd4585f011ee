//! The Q(I,F) value type: storage, construction, bit-alignment, overflow
//! checks, comparison, `+`/`-`, floor/ceil, and float conversion.
//!
//! `Fixed<R, I, F>` is the realization of Q(I,F): `R` is the backing integer
//! (`i8`/`i32`/`i64`/`i128`), `I` the number of integer bits (including
//! sign), `F` the number of fractional bits. `R` is picked by the caller via
//! one of the [`Q8`], [`Q32`], [`Q64`], [`Q128`] aliases rather than derived
//! from `I+F` automatically — stable const generics can select a *value*
//! from a type, not a *type* from a const expression, so the crate instead
//! checks the choice at monomorphization time with a `const` assertion
//! (`WIDTH_OK`), referenced from every constructor. A mismatched alias (say,
//! `Q8<4, 6>`, which needs 10 bits) is therefore a compile error.

use crate::bits::{self, Backing};
use crate::error::{FixedError, Result};
use crate::width::fastest_width;
use std::cmp::Ordering;
use std::marker::PhantomData;

/// `true` iff signed `i` fits in `n` bits, `i` given as a wide `i128`
/// intermediate (the crate's maximum supported width) rather than as some
/// `Backing` type — used by the conversions below, which juggle several
/// different `(I, F)` shapes at once and so need a representation wider
/// than any single one of them.
#[inline]
fn int_fits(i: i128, n: u32) -> bool {
    // `n == 128` is the only width `i128` itself can't express a tighter
    // bound for (the full range already is `i128`'s range); anything
    // narrower, including `n == 127`, still needs the real check below.
    if n >= 128 {
        return true;
    }
    let half = 1i128 << (n - 1);
    i >= -half && i <= half - 1
}

/// A fixed-point value with `I` integer bits (including sign) and `F`
/// fractional bits, backed by the native signed integer `R`.
#[derive(Clone, Copy)]
pub struct Fixed<R: Backing, const I: u32, const F: u32> {
    raw: R,
    _marker: PhantomData<[(); 0]>,
}

/// Q(I,F) backed by `i8`. Valid for `I + F <= 8`.
pub type Q8<const I: u32, const F: u32> = Fixed<i8, I, F>;
/// Q(I,F) backed by `i32`. Valid for `8 < I + F <= 32`.
pub type Q32<const I: u32, const F: u32> = Fixed<i32, I, F>;
/// Q(I,F) backed by `i64`. Valid for `32 < I + F <= 64`.
pub type Q64<const I: u32, const F: u32> = Fixed<i64, I, F>;
/// Q(I,F) backed by `i128`. Valid for `64 < I + F <= 128`. Requires the
/// `wide128` feature (on by default).
#[cfg(feature = "wide128")]
pub type Q128<const I: u32, const F: u32> = Fixed<i128, I, F>;

impl<R: Backing, const I: u32, const F: u32> Fixed<R, I, F> {
    /// Compile-time check that `R` is in fact the fastest backing width for
    /// this `(I, F)` shape, and that at least one sign bit is reserved.
    /// Every public constructor references this to force its evaluation.
    const WIDTH_OK: () = {
        assert!(I >= 1, "Q(I,F) needs at least one sign bit");
        assert!(
            R::WIDTH == fastest_width(I + F),
            "backing integer width does not match the fastest width for I+F bits"
        );
    };

    pub const ZERO: Self = Self {
        raw: R::ZERO,
        _marker: PhantomData,
    };

    /// The raw backing integer, interpreted as `raw / 2^F`.
    #[inline]
    pub fn to_bits(self) -> R {
        self.raw
    }

    /// Construct directly from a backing integer, bypassing range checks.
    /// Callers are responsible for the invariant that `raw >> F` fits in `I`
    /// bits; violating it only corrupts arithmetic on this value, it cannot
    /// cause memory unsafety.
    #[inline]
    pub fn from_bits(raw: R) -> Self {
        let () = Self::WIDTH_OK;
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    /// Construct from a plain integer. Fails with `Overflow` unless `i` fits
    /// in `I` bits.
    pub fn from_int(i: i128) -> Result<Self> {
        let () = Self::WIDTH_OK;
        if !int_fits(i, I) {
            return Err(FixedError::Overflow);
        }
        let raw = i << F;
        Ok(Self::from_bits(R::from_i128(raw)))
    }

    /// Construct from a floating-point value, rounding toward zero — the
    /// same truncation a C-style float-to-integer cast performs. Fails with
    /// `Overflow` if the resulting raw value's integer part does not fit in
    /// `I` bits.
    pub fn from_f64(f: f64) -> Result<Self> {
        let () = Self::WIDTH_OK;
        if !f.is_finite() {
            return Err(FixedError::Overflow);
        }
        let scale = 2f64.powi(F as i32);
        let scaled = (f * scale).trunc();
        let lo = -(2f64.powi((I + F - 1) as i32));
        let hi = 2f64.powi((I + F - 1) as i32) - 1.0;
        if scaled < lo || scaled > hi {
            return Err(FixedError::Overflow);
        }
        Ok(Self::from_bits(R::from_i128(scaled as i128)))
    }

    /// Construct by converting a value of a different Q(I2,F2) shape,
    /// aligning fractional bits via [`fx_align`] and checking that the
    /// integer part still fits in `I` bits.
    pub fn from_shape<R2: Backing, const I2: u32, const F2: u32>(
        other: Fixed<R2, I2, F2>,
    ) -> Result<Self> {
        let () = Self::WIDTH_OK;
        let aligned = fx_align(other.to_bits().to_i128(), F2, F);
        if !int_fits(aligned >> F, I) {
            return Err(FixedError::Overflow);
        }
        Ok(Self::from_bits(R::from_i128(aligned)))
    }

    /// Checked addition. `Overflow` on signed wrap or if the sum's integer
    /// part no longer fits in `I` bits.
    pub fn checked_add(self, rhs: Self) -> Result<Self> {
        let (sum, native_overflow) = self.raw.overflowing_add(rhs.raw);
        if native_overflow || !int_fits(sum.to_i128() >> F, I) {
            return Err(FixedError::Overflow);
        }
        Ok(Self::from_bits(sum))
    }

    /// Checked subtraction. `Overflow` on signed wrap or if the difference's
    /// integer part no longer fits in `I` bits.
    pub fn checked_sub(self, rhs: Self) -> Result<Self> {
        let (diff, native_overflow) = self.raw.overflowing_sub(rhs.raw);
        if native_overflow || !int_fits(diff.to_i128() >> F, I) {
            return Err(FixedError::Overflow);
        }
        Ok(Self::from_bits(diff))
    }

    /// Add a value of a different Q(I2,F2) shape, converting it to this
    /// shape first.
    pub fn checked_add_shape<R2: Backing, const I2: u32, const F2: u32>(
        self,
        rhs: Fixed<R2, I2, F2>,
    ) -> Result<Self> {
        self.checked_add(Self::from_shape(rhs)?)
    }

    /// Subtract a value of a different Q(I2,F2) shape, converting it to this
    /// shape first.
    pub fn checked_sub_shape<R2: Backing, const I2: u32, const F2: u32>(
        self,
        rhs: Fixed<R2, I2, F2>,
    ) -> Result<Self> {
        self.checked_sub(Self::from_shape(rhs)?)
    }

    /// Arithmetic floor: `raw >> F`, returned in the caller-chosen narrow
    /// integer type `N` (typically the smallest type holding `I` bits — see
    /// [`crate::width::smallest_width`]).
    #[inline]
    pub fn floor<N: Backing>(self) -> N {
        N::from_i128(self.raw.to_i128() >> F)
    }

    /// `(raw + (2^F - 1)) >> F`, in the caller-chosen narrow integer type `N`.
    #[inline]
    pub fn ceil<N: Backing>(self) -> N {
        let bias: i128 = if F == 0 { 0 } else { (1i128 << F) - 1 };
        N::from_i128((self.raw.to_i128() + bias) >> F)
    }

    /// `raw / 2^F` as an `f64`.
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.raw.to_i128() as f64 / 2f64.powi(F as i32)
    }

    /// Absolute value. On the most-negative backing value this returns the
    /// same bit pattern rather than erroring — see [`Fixed::checked_abs`]
    /// for the checked form. Same-shape only.
    #[inline]
    pub fn abs(self) -> Self {
        Self::from_bits(bits::abs::<R>(self.raw))
    }

    /// Checked absolute value. `Overflow` only on the most-negative input.
    pub fn checked_abs(self) -> Result<Self> {
        if self.raw == R::MIN {
            return Err(FixedError::Overflow);
        }
        Ok(self.abs())
    }

    /// Bits of difference between two same-shape values: `log2_ceil(|a.raw -
    /// b.raw|)`. Used to bound loss-of-precision in round-trip tests.
    pub fn error(a: Self, b: Self) -> u32 {
        let d = (a.raw.to_i128() - b.raw.to_i128()).unsigned_abs();
        if d == 0 {
            0
        } else {
            128 - d.leading_zeros()
        }
    }
}

impl<R: Backing, const I: u32, const F: u32> Default for Fixed<R, I, F> {
    #[inline]
    fn default() -> Self {
        Self::ZERO
    }
}

impl<R: Backing, const I: u32, const F: u32> PartialEq for Fixed<R, I, F> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}
impl<R: Backing, const I: u32, const F: u32> Eq for Fixed<R, I, F> {}

impl<R: Backing, const I: u32, const F: u32> PartialOrd for Fixed<R, I, F> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<R: Backing, const I: u32, const F: u32> Ord for Fixed<R, I, F> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<R: Backing, const I: u32, const F: u32> std::ops::Add for Fixed<R, I, F> {
    type Output = Self;
    /// Panics on overflow, mirroring the way `std`'s own integer `+`
    /// operator behaves in debug builds. Use [`Fixed::checked_add`] to
    /// observe the failure instead.
    #[inline]
    fn add(self, rhs: Self) -> Self {
        self.checked_add(rhs).expect("fixed-point overflow")
    }
}

impl<R: Backing, const I: u32, const F: u32> std::ops::Sub for Fixed<R, I, F> {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self.checked_sub(rhs).expect("fixed-point overflow")
    }
}

impl<R: Backing, const I: u32, const F: u32> std::fmt::Debug for Fixed<R, I, F> {
    /// Debug output is the same hex dump [`Fixed::to_hex`] produces — the raw
    /// bit pattern, not an attempted decimal render (decimal needs
    /// `R: DecimalBacking`; hex works for every backing width).
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fixed({})", self.to_hex())
    }
}

/// Shift a raw value from `f_from` fractional bits to `f_to`: arithmetic
/// right shift (round toward −∞) when narrowing, left shift when widening.
/// Losslessly round-trips when `f_to >= f_from`. Integer-part overflow of
/// the result is the caller's concern, checked separately via `int_fits`.
#[inline]
pub fn fx_align(x: i128, f_from: u32, f_to: u32) -> i128 {
    if f_from > f_to {
        x >> (f_from - f_to)
    } else {
        x << (f_to - f_from)
    }
}

impl<R: Backing, const I: u32, const F: u32> Fixed<R, I, F> {
    /// Defer `1/self` until multiplied against a concrete `Fixed`, at which
    /// point it is evaluated to the precision the destination shape needs.
    /// `Domain` error if `self` is zero.
    pub fn reciprocal(self) -> Result<crate::reciprocal::Reciprocal<R>> {
        crate::reciprocal::Reciprocal::new(self.raw, F)
    }

    /// Half-precision square root: Q(I,F) -> Q(I2,F2), caller-chosen output
    /// shape via turbofish. See [`crate::sqrt::sqrt_fast`].
    pub fn sqrt_fast<R2: Backing, const I2: u32, const F2: u32>(self) -> Result<Fixed<R2, I2, F2>> {
        crate::sqrt::sqrt_fast(self)
    }

    /// Render this value's backing bit pattern as `0x` plus `R::WIDTH / 4`
    /// lowercase hex digits.
    pub fn to_hex(self) -> String {
        crate::hex::to_hex(self)
    }
}

impl<R: crate::bits::HasDouble, const I: u32, const F: u32> Fixed<R, I, F> {
    /// Full-precision, bit-exact square root: Q(I,F) -> Q(I,F). Promotes to
    /// a double-width magnitude internally. `Domain` error if `self < 0`.
    pub fn sqrt(self) -> Result<Self> {
        crate::sqrt::sqrt(self)
    }
}

impl<R: crate::decimal::DecimalBacking, const I: u32, const F: u32> Fixed<R, I, F> {
    /// Render as a decimal string. `prec` of `None` uses the largest
    /// precision `F` fractional bits justify.
    pub fn to_decimal(self, prec: Option<u32>, zeropad: bool) -> String {
        crate::decimal::to_decimal(self.raw, F, prec, zeropad)
    }

    /// Parse a decimal string at this shape's `F`. `Domain` error on any
    /// byte that isn't an ASCII digit, a leading `-`, or one `.`.
    pub fn from_decimal(s: &str) -> Result<Self> {
        let raw = crate::decimal::from_decimal::<R>(s, F)?;
        Ok(Self::from_bits(raw))
    }

    /// Out-parameter form of [`Fixed::from_decimal`] for callers who would
    /// rather check a success flag than match on `Result`: `*ok` is set to
    /// whether parsing succeeded, and the return value is `ZERO` on failure.
    pub fn from_decimal_checked(s: &str, ok: &mut bool) -> Self {
        match Self::from_decimal(s) {
            Ok(v) => {
                *ok = true;
                v
            }
            Err(_) => {
                *ok = false;
                Self::ZERO
            }
        }
    }
}

impl<R: crate::decimal::DecimalBacking, const I: u32, const F: u32> std::fmt::Display
    for Fixed<R, I, F>
{
    /// Full-precision decimal render, trailing zeros trimmed — `to_decimal(None, false)`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_decimal(None, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn q1_7_boundary() {
        assert!(Q8::<1, 7>::from_int(0).is_ok());
        assert!(Q8::<1, 7>::from_int(-1).is_ok());
        assert!(Q8::<1, 7>::from_int(1).is_err());
        assert!(Q8::<1, 7>::from_int(2).is_err());
        assert!(Q8::<1, 7>::from_int(-2).is_err());
    }

    #[test]
    fn q2_6_boundary() {
        assert!(Q8::<2, 6>::from_int(-2).is_ok());
        assert!(Q8::<2, 6>::from_int(-1).is_ok());
        assert!(Q8::<2, 6>::from_int(0).is_ok());
        assert!(Q8::<2, 6>::from_int(1).is_ok());
        assert!(Q8::<2, 6>::from_int(2).is_err());
        assert!(Q8::<2, 6>::from_int(-3).is_err());
    }

    #[test]
    fn q8_0_boundary() {
        assert!(Q8::<8, 0>::from_int(-128).is_ok());
        assert!(Q8::<8, 0>::from_int(127).is_ok());
        assert!(Q8::<8, 0>::from_int(128).is_err());
        assert!(Q8::<8, 0>::from_int(-129).is_err());
    }

    #[test]
    fn q16_16_from_huge_float_overflows() {
        assert!(Q32::<16, 16>::from_f64(1e20).is_err());
    }

    #[cfg(feature = "wide128")]
    #[test]
    fn q127_1_rejects_out_of_range_int() {
        // `int_fits` used to short-circuit to `true` for any `n >= 127`,
        // which made a 127-bit integer part unconditionally "fit" even when
        // it didn't.
        use crate::fixed::Q128;
        assert!(Q128::<127, 1>::from_int((1i128 << 126) - 1).is_ok());
        assert!(Q128::<127, 1>::from_int(1i128 << 126).is_err());
        assert!(Q128::<127, 1>::from_int(-(1i128 << 126)).is_ok());
        assert!(Q128::<127, 1>::from_int(-(1i128 << 126) - 1).is_err());
    }

    #[test]
    fn fx_align_widens_losslessly() {
        let v = Q32::<16, 16>::from_int(7).unwrap();
        let wide = Q64::<16, 48>::from_shape(v).unwrap();
        let back = Q32::<16, 16>::from_shape(wide).unwrap();
        assert_eq!(v, back);
    }

    #[quickcheck]
    fn error_is_symmetric(a: i16, b: i16) -> bool {
        type Q = Q32<16, 16>;
        let fa = Q::from_int(a as i128).unwrap();
        let fb = Q::from_int(b as i128).unwrap();
        Q::error(fa, fb) == Q::error(fb, fa)
    }

    #[quickcheck]
    fn add_matches_i128_reference(a: i32, b: i32) -> bool {
        type Q = Q64<32, 32>;
        let fa = Q::from_int(a as i128).unwrap();
        let fb = Q::from_int(b as i128).unwrap();
        let expected = (a as i128 + b as i128) << 32;
        match fa.checked_add(fb) {
            Ok(sum) => sum.to_bits() as i128 == expected,
            Err(_) => !int_fits(expected, 64),
        }
    }

    #[test]
    fn debug_is_hex_dump() {
        type Q = Q32<32, 0>;
        let v = Q::from_int(-1).unwrap();
        assert_eq!(format!("{:?}", v), "Fixed(0xffffffff)");
    }

    #[test]
    fn display_is_decimal() {
        type Q = Q32<16, 16>;
        let v = Q::from_int(3).unwrap();
        assert_eq!(format!("{}", v), "3.0");
    }

    #[test]
    fn from_decimal_checked_reports_failure() {
        type Q = Q32<16, 16>;
        let mut ok = true;
        let v = Q::from_decimal_checked("not a number", &mut ok);
        assert!(!ok);
        assert_eq!(v, Q::ZERO);

        let v2 = Q::from_decimal_checked("2.5", &mut ok);
        assert!(ok);
        assert_eq!(v2, Q::from_f64(2.5).unwrap());
    }
}
