use ibig::UBig;

use crate::error::{Error, Result};
use crate::number::format;

const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

// bits per digit for the power-of-two radices, zero otherwise
#[rustfmt::skip]
static LOG2: [u8; 37] = [
    0, 0, 1, 0, 2, 0, 0, 0, 3, 0, 0, 0, 0, 0, 0, 0, 4, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 5, 0, 0, 0, 0,
];

fn check_radix(radix: u32) -> Result<()> {
    if (2..=36).contains(&radix) {
        Ok(())
    } else {
        Err(Error::InvalidRadix(radix as i64))
    }
}

/// Render an integer in the given radix (2..=36), lowercase digits.
pub fn int_to_radix(value: i64, radix: u32) -> Result<String> {
    check_radix(radix)?;
    if radix == 10 {
        return Ok(value.to_string());
    }
    let mut out = String::new();
    if value < 0 {
        out.push('-');
    }
    push_magnitude(&mut out, value.unsigned_abs(), radix);
    Ok(out)
}

fn push_magnitude(out: &mut String, magnitude: u64, radix: u32) {
    let mut digits = [0u8; 64];
    let mut count = 0;
    let shift = LOG2[radix as usize];
    if shift > 0 {
        // power-of-two fast path: mask and shift
        let mask = (radix - 1) as u64;
        let mut m = magnitude;
        loop {
            digits[count] = DIGITS[(m & mask) as usize];
            count += 1;
            m >>= shift;
            if m == 0 {
                break;
            }
        }
    } else {
        let mut m = magnitude;
        loop {
            digits[count] = DIGITS[(m % radix as u64) as usize];
            count += 1;
            m /= radix as u64;
            if m == 0 {
                break;
            }
        }
    }
    for i in (0..count).rev() {
        out.push(digits[i] as char);
    }
}

/// Render a float in the given radix (2..=36).
///
/// The integer part is exact: a mantissa-bit walk for power-of-two
/// radices, big-integer division otherwise. Fraction digits are emitted
/// until the remaining error cannot affect them.
pub fn f64_to_radix(value: f64, radix: u32) -> Result<String> {
    check_radix(radix)?;
    if radix == 10 {
        return Ok(format::to_string(value));
    }
    if value.is_nan() {
        return Ok("NaN".to_string());
    }
    if value.is_infinite() {
        return Ok(if value < 0.0 { "-Infinity" } else { "Infinity" }.to_string());
    }
    let mut out = String::new();
    if value < 0.0 {
        out.push('-');
    }
    let value = value.abs();
    let integer = value.trunc();
    let fraction = value - integer;

    if integer < 9.007199254740992e15 {
        // fits the integer fast paths exactly
        push_magnitude(&mut out, integer as u64, radix);
    } else {
        push_big_integer(&mut out, integer, radix);
    }

    if fraction > 0.0 {
        out.push('.');
        push_fraction(&mut out, value, fraction, radix);
    }
    Ok(out)
}

// Integer part of a large float, reconstructed exactly from its mantissa
// and binary exponent.
fn push_big_integer(out: &mut String, integer: f64, radix: u32) {
    let bits = integer.to_bits();
    let mantissa = (bits & ((1u64 << 52) - 1)) | (1u64 << 52);
    // values here are >= 2^53, so the exponent is positive
    let exponent = ((bits >> 52) & 0x7FF) as i64 - 1075;
    let shift = LOG2[radix as usize];
    if shift > 0 {
        // walk the shifted mantissa bits, one radix digit at a time
        let shift = shift as i64;
        let total_bits = 53 + exponent;
        let digit_count = (total_bits + shift - 1) / shift;
        let mask = (radix - 1) as u64;
        for position in (0..digit_count).rev() {
            let low = position * shift - exponent;
            let digit = if low >= 53 {
                0
            } else if low >= 0 {
                (mantissa >> low) & mask
            } else {
                (mantissa << -low) & mask
            };
            out.push(DIGITS[digit as usize] as char);
        }
        // strip the leading zeros the chunking may produce
        let start = out.len() - digit_count as usize;
        let zeros = out[start..]
            .bytes()
            .take_while(|b| *b == b'0')
            .count()
            .min(digit_count as usize - 1);
        out.replace_range(start..start + zeros, "");
    } else {
        // grammar-school division via the big integer
        let big = UBig::from(mantissa) << (exponent as usize);
        out.push_str(&big.in_radix(radix).to_string());
    }
}

// Fraction digits by repeated multiplication; stops once the residual
// error of the original double dominates the remaining fraction.
fn push_fraction(out: &mut String, value: f64, fraction: f64, radix: u32) {
    let mut fraction = fraction;
    let mut delta = (0.5 * (value * f64::EPSILON)).max(f64::MIN_POSITIVE);
    loop {
        fraction *= radix as f64;
        delta *= radix as f64;
        let digit = fraction.trunc();
        fraction -= digit;
        out.push(DIGITS[digit as usize] as char);
        if fraction <= delta || fraction == 0.0 {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_radix() {
        assert_eq!(int_to_radix(255, 16).unwrap(), "ff");
        assert_eq!(int_to_radix(255, 2).unwrap(), "11111111");
        assert_eq!(int_to_radix(-255, 16).unwrap(), "-ff");
        assert_eq!(int_to_radix(0, 8).unwrap(), "0");
        assert_eq!(int_to_radix(35, 36).unwrap(), "z");
        assert_eq!(int_to_radix(255, 10).unwrap(), "255");
    }

    #[test]
    fn test_int_radix_out_of_range() {
        assert_eq!(int_to_radix(1, 1), Err(Error::InvalidRadix(1)));
        assert_eq!(int_to_radix(1, 37), Err(Error::InvalidRadix(37)));
    }

    #[test]
    fn test_float_radix_integral() {
        assert_eq!(f64_to_radix(255.0, 16).unwrap(), "ff");
        assert_eq!(f64_to_radix(-8.0, 2).unwrap(), "-1000");
    }

    #[test]
    fn test_float_radix_fraction() {
        assert_eq!(f64_to_radix(0.5, 2).unwrap(), "0.1");
        assert_eq!(f64_to_radix(2.25, 4).unwrap(), "2.1");
        assert_eq!(f64_to_radix(255.5, 16).unwrap(), "ff.8");
    }

    #[test]
    fn test_float_radix_large_pow2() {
        // 2^60 in hex: 1 followed by 15 zeros
        let s = f64_to_radix(2f64.powi(60), 16).unwrap();
        assert_eq!(s, format!("1{}", "0".repeat(15)));
    }

    #[test]
    fn test_float_radix_large_decimal_like() {
        // 10^20 is exactly representable and ends in many zeros in base 5
        let s = f64_to_radix(1e20, 5).unwrap();
        let parsed = u128::from_str_radix(&s, 5).unwrap();
        assert_eq!(parsed, 100_000_000_000_000_000_000u128);
    }

    #[test]
    fn test_float_radix_specials() {
        assert_eq!(f64_to_radix(f64::NAN, 16).unwrap(), "NaN");
        assert_eq!(f64_to_radix(f64::INFINITY, 8).unwrap(), "Infinity");
    }
}
