//! Division-free reciprocal: a lazily-evaluated carrier produced by
//! [`crate::Fixed::reciprocal`], consumed by multiplying it against a
//! concrete `Fixed` value. The carrier performs no work until that
//! multiplication happens, at which point it runs a Newton–Raphson
//! iteration seeded from a count-leading-zeros normalization and a 3-bit
//! estimate, refining only as far as the destination shape's total bit
//! width demands.
//!
//! The source this is modeled on frames `result_highestbit`/`result_shift`
//! as two mutable scratch fields on a reused carrier object. Nothing here
//! actually needs them to persist between evaluations — each multiplication
//! picks its own target precision and gets a fresh answer — so `evaluate`
//! is a plain, side-effect-free function returning a small result struct
//! instead of mutating interior state.

use crate::bits::{self, Backing, UInt};
use crate::error::{FixedError, Result};
use crate::fixed::Fixed;

const NR_TARGETS: [u32; 6] = [6, 12, 24, 48, 96, 192];

/// A deferred `1/v` for a Q(*, F) value `v`, F taken from the construction
/// site. Multiply it by a `Fixed<R, I, F>` to evaluate it at that shape's
/// precision and obtain `(1/v) * rhs`.
#[derive(Clone, Copy)]
pub struct Reciprocal<R: Backing> {
    raw: R,
    f: u32,
}

struct Evaluated<U> {
    magnitude: U,
    highest_bit: bool,
    shift: i64,
}

impl<R: Backing> Reciprocal<R> {
    /// Snapshot `raw` (a Q(*, f) backing integer) for later evaluation.
    /// `Domain` error if `raw` is zero — clz of zero is undefined and the
    /// reciprocal of zero has no answer.
    pub fn new(raw: R, f: u32) -> Result<Self> {
        if raw == R::ZERO {
            return Err(FixedError::Domain("reciprocal of zero"));
        }
        Ok(Self { raw, f })
    }

    /// Run the Newton–Raphson iteration, stopping as soon as the running
    /// precision reaches `p` bits (the destination shape's `I + F`).
    fn evaluate(&self, p: u32) -> Evaluated<R::Unsigned> {
        let w = R::WIDTH;
        let mag = bits::abs(self.raw).to_unsigned();
        let s = mag.leading_zeros();
        let mut shift: i64 = w as i64 + (w as i64 - s as i64) - self.f as i64 - 1;

        let input = mag << s;
        let top_bit = R::Unsigned::ONE << (w - 1);

        // Power-of-two shortcut: after normalizing, nothing below the
        // leading one — the reciprocal is exactly another shifted power of
        // two.
        if input == top_bit {
            shift -= 1;
            return Evaluated {
                magnitude: input,
                highest_bit: false,
                shift,
            };
        }

        // 3-bit seed: two's-complement "minus one minus input", exploiting
        // the normalized (top-bit-set) representation. `MAX - top_bit` is
        // all-ones with the sign bit cleared, since the sign bit is set in
        // `MAX`.
        let not_sign = R::Unsigned::MAX - top_bit;
        let mut result = not_sign.wrapping_sub(input);
        let mut prec = 3u32;

        for &target in NR_TARGETS.iter() {
            let inner = bits::mul_hu::<R>(result, input, w);
            let neg_inner = R::Unsigned::ZERO.wrapping_sub(inner);
            let outer = bits::mul_hu::<R>(result, neg_inner, w);
            result = outer << 1;
            prec = target;

            if prec >= p {
                let corr = bits::mul_hu::<R>(result, input, w) << 1;
                return Evaluated {
                    magnitude: result.wrapping_sub(corr),
                    highest_bit: false,
                    shift,
                };
            }
            if prec >= w - 2 {
                break;
            }
        }

        // Final sharpening: the top bit of the true reciprocal no longer
        // fits the backing word without an implicit leading one.
        result = result << 1;
        shift += 1;
        for _ in 0..3 {
            let corr = bits::mul_hu::<R>(result, input, w).wrapping_add(input);
            result = result.wrapping_sub(corr);
        }

        Evaluated {
            magnitude: result,
            highest_bit: true,
            shift,
        }
    }
}

impl<R: Backing, const I: u32, const F: u32> std::ops::Mul<Fixed<R, I, F>> for Reciprocal<R> {
    type Output = Fixed<R, I, F>;

    fn mul(self, rhs: Fixed<R, I, F>) -> Fixed<R, I, F> {
        let w = R::WIDTH;
        let p = I + F;
        let ev = self.evaluate(p);

        let b_negative = rhs.to_bits().is_negative();
        let b_mag = bits::abs(rhs.to_bits()).to_unsigned();

        let mag_result = if !ev.highest_bit {
            debug_assert!(ev.shift >= 0);
            bits::mul_hu::<R>(ev.magnitude, b_mag, ev.shift as u32)
        } else {
            let s = ev.shift - w as i64;
            debug_assert!(s >= 0);
            let hu = bits::mul_hu::<R>(ev.magnitude, b_mag, w);
            bits::scaled_add::<R>(hu, b_mag, s as u32)
        };

        let negative = self.raw.is_negative() ^ b_negative;
        let signed: i128 = if negative {
            -(mag_result.as_u128() as i128)
        } else {
            mag_result.as_u128() as i128
        };
        Fixed::from_bits(R::from_i128(signed))
    }
}
