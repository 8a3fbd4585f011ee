//! Compile-time-parameterized fixed-point numerics.
//!
//! A [`Fixed<R, I, F>`] is a Q(I,F) value: `I` bits of signed integer part,
//! `F` bits of fractional part, stored in the smallest native signed
//! integer `R` that holds `I + F` bits. Pick `R` via the [`Q8`]/[`Q32`]/
//! [`Q64`]/[`Q128`] aliases rather than naming it directly — the shape's
//! backing width is part of its type, not something this crate infers for
//! you, since stable const generics can select a value from a type but not
//! a type from a const expression.
//!
//! ```
//! use qfix::Q32;
//!
//! let a = Q32::<16, 16>::from_int(141).unwrap();
//! let b = Q32::<16, 16>::from_int(47).unwrap();
//! let product = (b.reciprocal().unwrap() * a).to_f64();
//! assert!((product - 3.0).abs() < 0.01);
//! ```
//!
//! The three numeric kernels this crate exists for:
//! - [`Fixed::reciprocal`] — division-free Newton–Raphson reciprocal.
//! - [`Fixed::sqrt`] / [`Fixed::sqrt_fast`] — digit-by-digit integer square root.
//! - [`Fixed::to_decimal`] / [`Fixed::from_decimal`] — exact decimal conversion.
//!
//! Everything else (`bits`, `width`) is the integer-utility layer these
//! kernels are built from.

pub mod bits;
pub mod decimal;
pub mod error;
pub mod fixed;
pub mod hex;
pub mod reciprocal;
pub mod sqrt;
pub mod width;

pub use error::{FixedError, Result};
#[cfg(feature = "wide128")]
pub use fixed::Q128;
pub use fixed::{Fixed, Q8, Q32, Q64};
pub use reciprocal::Reciprocal;
