//! Cross-module scenarios from the value type's testable-properties table:
//! invariants that span construction, arithmetic, alignment, and the
//! boundary shapes, rather than any single kernel in isolation.

use qfix::fixed::{Q8, Q32, Q64};
use qfix::FixedError;
use quickcheck_macros::quickcheck;

#[test]
fn floor_stays_within_declared_bits() {
    type Q = Q32<8, 24>;
    let v = Q::from_f64(100.5).unwrap();
    let f: i8 = v.floor();
    assert!((-128..=127).contains(&f));
    assert_eq!(f, 100);
}

#[test]
fn ceil_rounds_up_fractional_remainder() {
    type Q = Q32<16, 16>;
    let v = Q::from_f64(3.25).unwrap();
    let c: i32 = v.ceil();
    assert_eq!(c, 4);
    let exact = Q::from_int(5).unwrap();
    let c2: i32 = exact.ceil();
    assert_eq!(c2, 5);
}

#[test]
fn add_overflow_is_reported_not_wrapped() {
    type Q = Q8<8, 0>;
    let a = Q::from_int(100).unwrap();
    let b = Q::from_int(100).unwrap();
    assert_eq!(a.checked_add(b), Err(FixedError::Overflow));
}

#[test]
fn fx_align_round_trips_when_widening() {
    type Narrow = Q32<16, 16>;
    type Wide = Q64<16, 48>;
    let v = Narrow::from_f64(-12.5).unwrap();
    let widened: Wide = Wide::from_shape(v).unwrap();
    let back: Narrow = Narrow::from_shape(widened).unwrap();
    assert_eq!(v, back);
}

#[test]
fn q1_7_and_q2_6_boundaries() {
    assert!(Q8::<1, 7>::from_int(0).is_ok());
    assert!(Q8::<1, 7>::from_int(-1).is_ok());
    assert!(Q8::<1, 7>::from_int(1).is_err());
    assert!(Q8::<2, 6>::from_int(1).is_ok());
    assert!(Q8::<2, 6>::from_int(2).is_err());
    assert!(Q8::<2, 6>::from_int(-3).is_err());
}

#[test]
fn q8_0_boundary() {
    type Q = Q8<8, 0>;
    assert!(Q::from_int(-128).is_ok());
    assert!(Q::from_int(127).is_ok());
    assert!(Q::from_int(128).is_err());
    assert!(Q::from_int(-129).is_err());
}

#[test]
fn reciprocal_then_decimal_round_trip() {
    type Q = Q32<16, 16>;
    let b = Q::from_int(47).unwrap();
    let a = Q::from_int(141).unwrap();
    let got = (b.reciprocal().unwrap() * a).to_decimal(Some(2), true);
    assert_eq!(got, "3.00");
}

#[quickcheck]
fn floor_of_every_constructible_value_fits_declared_bits(n: i16) -> bool {
    type Q = Q32<16, 16>;
    match Q::from_int(n as i128) {
        Ok(v) => {
            let f: i32 = v.floor();
            (-32768..=32767).contains(&f)
        }
        Err(_) => true,
    }
}

#[quickcheck]
fn add_never_wraps_silently(a: i16, b: i16) -> bool {
    type Q = Q32<16, 16>;
    let fa = Q::from_int(a as i128).unwrap();
    let fb = Q::from_int(b as i128).unwrap();
    let expected = a as i32 + b as i32;
    match fa.checked_add(fb) {
        Ok(sum) => sum == Q::from_int(expected as i128).unwrap(),
        Err(_) => !(-32768..=32767).contains(&expected),
    }
}
