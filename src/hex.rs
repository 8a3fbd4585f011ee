//! Hexadecimal pretty-printing: `0x` followed by exactly `W/4` lowercase
//! hex digits, zero-padded. Contract only — the spec calls this trivial and
//! unremarkable to design.

use crate::bits::{Backing, UInt};
use crate::fixed::Fixed;

/// Render the backing integer's bit pattern as `0x` plus exactly
/// `R::WIDTH / 4` lowercase hex digits, zero-padded.
pub fn to_hex<R: Backing, const I: u32, const F: u32>(x: Fixed<R, I, F>) -> String {
    let width_nibbles = (R::WIDTH / 4) as usize;
    let raw = x.to_bits().to_unsigned().as_u128();
    format!("0x{:0width$x}", raw, width = width_nibbles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::Q32;

    #[test]
    fn pads_to_full_width() {
        type Q = Q32<16, 16>;
        let x = Q::from_int(1).unwrap();
        assert_eq!(to_hex(x), "0x00010000");
    }

    #[test]
    fn negative_value_shows_twos_complement() {
        type Q = Q32<16, 16>;
        let x = Q::from_int(-1).unwrap();
        assert_eq!(to_hex(x), "0xffff0000");
    }

    #[test]
    fn negative_whole_number_is_all_ones() {
        type Q = Q32<32, 0>;
        let x = Q::from_int(-1).unwrap();
        assert_eq!(to_hex(x), "0xffffffff");
    }
}
