//! Decimal string ⇄ fixed-point conversion: `to_decimal`/`from_decimal`,
//! built on a division-free `div_pow10` kernel and a precomputed table of
//! scaled reciprocal powers of ten.
//!
//! Only the two widths the original design keys its tables on — 32-bit and
//! 64-bit backing integers — carry decimal support; see [`DecimalBacking`].
//! An `i8`- or `i128`-backed `Fixed` simply has no `to_decimal`/`from_decimal`
//! inherent methods, rather than a table sized for a width nothing else in
//! the crate needs.

use crate::bits::{self, Backing, UInt};
use crate::error::{FixedError, Result};

/// Backing widths with decimal conversion support, plus the precomputed
/// tables `div_pow10` draws from. `10^k` (`POW10`) is needed up to
/// `MAX_LOG10`; `10^k`'s scaled reciprocal (`INV_POW10`) is needed for the
/// same range, plus one extra slot for the `prec+1` rounding ULP.
pub trait DecimalBacking: Backing {
    /// Largest `k` for which `10^k` is tabulated at this width.
    const MAX_LOG10: u32;

    /// `floor(log10(2^bits))`, for `bits` up to `Self::WIDTH`.
    fn log10_of_pow2(bits: u32) -> u32;

    /// `(mantissa, extra_shift)` for `10^k`: the reciprocal of `10^k` is
    /// `mantissa >> (Self::WIDTH + extra_shift)`, mantissa's top bit set.
    fn inv_pow10(k: u32) -> (u128, i32);
}

const fn pow10_value(k: u32) -> u128 {
    let mut r = 1u128;
    let mut i = 0;
    while i < k {
        r *= 10;
        i += 1;
    }
    r
}

const fn log10_of_pow2_digit(bits: u32) -> u32 {
    let pow2 = 1u128 << bits;
    let mut k = 0u32;
    let mut p = 1u128;
    loop {
        let next = p * 10;
        if next > pow2 {
            return k;
        }
        p = next;
        k += 1;
    }
}

/// `floor(log10(2^bits))` for every `bits` in `0..=64`, shared by both
/// tabulated widths.
const LOG10_TABLE: [u32; 65] = {
    let mut t = [0u32; 65];
    let mut bits = 0u32;
    while bits <= 64 {
        t[bits as usize] = log10_of_pow2_digit(bits);
        bits += 1;
    }
    t
};

/// `(mantissa, extra_shift)` for `10^k` at backing width `w`, found by
/// normalizing `2^(w+extra_shift)/10^k` until its top bit lands at bit
/// `w-1`. `extra_shift` starts from `10^k`'s own bit length and is nudged by
/// one position at a time — at most a couple of iterations in practice.
const fn inv_pow10_entry(w: u32, k: u32) -> (u128, i32) {
    let p = pow10_value(k);
    let bl = 128 - p.leading_zeros();
    let mut extra_shift: i32 = bl as i32 - 1;
    let top_bit = 1u128 << (w - 1);
    loop {
        let total_shift = w as i32 + extra_shift;
        if total_shift < 0 {
            extra_shift += 1;
            continue;
        }
        if total_shift > 127 {
            extra_shift -= 1;
            continue;
        }
        let numerator = 1u128 << total_shift;
        let q = numerator / p;
        let r = numerator % p;
        let mantissa = if r * 2 >= p { q + 1 } else { q };
        if mantissa < top_bit {
            extra_shift += 1;
        } else if mantissa >= top_bit * 2 {
            extra_shift -= 1;
        } else {
            return (mantissa, extra_shift);
        }
    }
}

const fn make_inv_pow10<const N: usize>(w: u32) -> [(u128, i32); N] {
    let mut t = [(0u128, 0i32); N];
    let mut i = 0;
    while i < N {
        t[i] = inv_pow10_entry(w, i as u32);
        i += 1;
    }
    t
}

const INV_POW10_32: [(u128, i32); 10] = make_inv_pow10::<10>(32);
const INV_POW10_64: [(u128, i32); 19] = make_inv_pow10::<19>(64);

impl DecimalBacking for i32 {
    const MAX_LOG10: u32 = 9;

    #[inline]
    fn log10_of_pow2(bits: u32) -> u32 {
        LOG10_TABLE[bits as usize]
    }
    #[inline]
    fn inv_pow10(k: u32) -> (u128, i32) {
        INV_POW10_32[k as usize]
    }
}

impl DecimalBacking for i64 {
    const MAX_LOG10: u32 = 18;

    #[inline]
    fn log10_of_pow2(bits: u32) -> u32 {
        LOG10_TABLE[bits as usize]
    }
    #[inline]
    fn inv_pow10(k: u32) -> (u128, i32) {
        INV_POW10_64[k as usize]
    }
}

/// `num / 10^exp` scaled into an `f`-bit-fractional fixed-point value,
/// without a division opcode. `num` is always a single decimal digit (0-9)
/// at both call sites (`to_decimal`'s rounding ULP and `from_decimal`'s
/// per-digit accumulation), so the shift-to-make-room step in the middle
/// never has to juggle more than a few bits of `num`.
pub fn div_pow10<R: DecimalBacking>(num: u32, exp: u32, f: u32) -> R::Unsigned {
    if num == 0 {
        return R::Unsigned::ZERO;
    }
    let w = R::WIDTH;
    let (mantissa, extra_shift) = R::inv_pow10(exp);
    let mut m = R::Unsigned::from_u128(mantissa);
    let mut s: i64 = w as i64 + extra_shift as i64;

    let intbits = bits::log2_ceil(num);
    m = m >> intbits;
    s -= intbits as i64;

    let mut value = m.wrapping_mul(R::Unsigned::from_u128(num as u128));
    value = value >> 1;
    s -= 1;

    let f = f as i64;
    if s > f {
        let drop = (s - f) as u32;
        if drop > w {
            return R::Unsigned::ZERO;
        }
        let bias = if drop == 0 {
            R::Unsigned::ZERO
        } else {
            R::Unsigned::ONE << (drop - 1)
        };
        value.wrapping_add(bias) >> drop
    } else {
        value << (f - s) as u32
    }
}

/// Render `raw` (the backing integer of a Q(*, f) value) as a decimal
/// string. `prec` of `None` uses the largest precision `f` fractional bits
/// justify; `Some(p) >= MAX_LOG10` clamps to `MAX_LOG10 - 1`.
pub fn to_decimal<R: DecimalBacking>(raw: R, f: u32, prec: Option<u32>, zeropad: bool) -> String {
    let prec = match prec {
        // Same clamp as the `Some(p)` arm below: `div_pow10`'s rounding step
        // indexes `inv_pow10(prec + 1)`, and the table has exactly one extra
        // slot past `MAX_LOG10` for that lookup, not two.
        None => R::log10_of_pow2(f).min(R::MAX_LOG10 - 1),
        Some(p) if p >= R::MAX_LOG10 => R::MAX_LOG10 - 1,
        Some(p) => p,
    };

    let negative = raw.is_negative();
    let mag = bits::abs(raw).to_unsigned();
    let rounding = div_pow10::<R>(5, prec + 1, f);
    let rounded = mag.wrapping_add(rounding);

    let int_part = rounded >> f;
    let mut frac = if f == 0 {
        R::Unsigned::ZERO
    } else {
        rounded - (int_part << f)
    };

    let mut digits: Vec<char> = Vec::with_capacity(prec as usize);
    for _ in 0..prec {
        // `frac < 2^f` can sit within a handful of bits of `R::Unsigned`'s
        // own width (e.g. `Q32<3,29>`'s `f=29`), so `frac * 10` overflows the
        // backing width before the digit can be extracted. Widen to `u128`
        // for this one multiply — the rest of the digit stays in `R::Unsigned`.
        let scaled = frac.as_u128() * 10;
        let digit = (scaled >> f) as u32;
        digits.push(std::char::from_digit(digit, 10).unwrap_or('0'));
        frac = R::Unsigned::from_u128(scaled - ((digit as u128) << f));
    }
    if !zeropad {
        while digits.len() > 1 && digits.last() == Some(&'0') {
            digits.pop();
        }
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&int_part.as_u128().to_string());
    out.push('.');
    out.extend(digits);
    out
}

/// Parse a decimal string into the raw backing integer of a Q(*, f) value.
/// Leading whitespace and an optional `-` are allowed; anything but ASCII
/// digits and at most one `.` is a parse error. Fractional digits past
/// `(inv-table-size) / 2` (the table holds `MAX_LOG10 + 1` entries, for
/// `k` in `0..=MAX_LOG10`) are read but silently ignored, matching the
/// table's capacity.
pub fn from_decimal<R: DecimalBacking>(s: &str, f: u32) -> Result<R> {
    let trimmed = s.trim_start();
    let bytes = trimmed.as_bytes();
    let mut i = 0;

    let negative = if i < bytes.len() && bytes[i] == b'-' {
        i += 1;
        true
    } else {
        false
    };

    let mut xi: i128 = 0;
    let mut saw_digit = false;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        xi = xi * 10 + (bytes[i] - b'0') as i128;
        saw_digit = true;
        i += 1;
    }

    let w = R::WIDTH;
    let mut xf = R::Unsigned::ZERO;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let cap = (R::MAX_LOG10 + 1) / 2;
        let mut fi = 0u32;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            let d = (bytes[i] - b'0') as u32;
            if fi < cap {
                fi += 1;
                xf = xf + div_pow10::<R>(d, fi, w - 1);
            }
            saw_digit = true;
            i += 1;
        }
    }

    if !saw_digit || i != bytes.len() {
        return Err(FixedError::Domain("invalid decimal string"));
    }

    let shift = w - 1 - f;
    let round_bit = if shift >= 1 {
        R::Unsigned::ONE << (shift - 1)
    } else {
        R::Unsigned::ZERO
    };
    let frac_part = (xf + round_bit) >> shift;

    let magnitude: i128 = (xi << f) | frac_part.as_u128() as i128;
    let signed = if negative { -magnitude } else { magnitude };
    Ok(R::from_i128(signed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn div_pow10_matches_direct_division_reference() {
        // div_pow10(num, exp, f) approximates num / 10^exp in Q(*, f); check
        // against straightforward floating reference within one ULP.
        let got = div_pow10::<i64>(5, 2, 16).as_u128() as f64 / (1u128 << 16) as f64;
        let expected = 5.0 / 100.0;
        assert!((got - expected).abs() < 1e-3);
    }

    #[test]
    fn parse_print_integer() {
        let raw: i64 = from_decimal::<i64>("123", 16).unwrap();
        assert_eq!(to_decimal(raw, 16, Some(1), true), "123.0");
    }

    #[test]
    fn parse_print_negative_trailing_dot() {
        let raw: i64 = from_decimal::<i64>("-123.", 16).unwrap();
        assert_eq!(to_decimal(raw, 16, Some(1), true), "-123.0");
    }

    #[test]
    fn decimal_round_trip_within_two_bits() {
        let raw = from_decimal::<i64>("999.000009999", 32).unwrap();
        let printed = to_decimal(raw, 32, None, true);
        let reparsed = from_decimal::<i64>(&printed, 32).unwrap();
        let diff = (raw - reparsed).unsigned_abs();
        let bits_of_error = if diff == 0 { 0 } else { 64 - diff.leading_zeros() };
        assert!(bits_of_error <= 2);
    }

    #[test]
    fn rejects_garbage() {
        assert!(from_decimal::<i64>("12a3", 16).is_err());
        assert!(from_decimal::<i64>("", 16).is_err());
    }

    #[test]
    fn to_decimal_none_prec_clamped_at_max_log10() {
        // i32's log10_of_pow2(31) == MAX_LOG10 (9); unclamped, the rounding
        // step would index inv_pow10(prec + 1) == inv_pow10(10), one past
        // the 10-entry table's end.
        let raw: i32 = 1 << 30; // 0.5 in Q(*, 31)
        let s = to_decimal::<i32>(raw, 31, None, true);
        assert_eq!(s, "0.50000000");
    }

    #[test]
    fn to_decimal_wide_fraction_matches_float_reference() {
        // Q(*, 29) on an i32 backing: frac sits within a couple of bits of
        // the backing width, so the per-digit multiply-by-10 step overflows
        // u32 before widening to u128.
        let raw: i32 = 483_183_821; // ~0.9
        let s = to_decimal::<i32>(raw, 29, Some(6), true);
        let got: f64 = s.parse().unwrap();
        let expected = raw as f64 / (1u64 << 29) as f64;
        assert!((got - expected).abs() < 1e-6, "got {s}, expected ~{expected}");
    }

    #[test]
    fn from_decimal_reads_fifth_fractional_digit_for_i32() {
        // i32's inv-table holds 10 entries (k = 0..=9); half of that is 5
        // fractional digits of precision, not 4.
        let raw: i32 = from_decimal::<i32>("0.12345", 24).unwrap();
        let got = raw as f64 / (1u64 << 24) as f64;
        assert!((got - 0.12345).abs() < 1e-5);
    }
}
