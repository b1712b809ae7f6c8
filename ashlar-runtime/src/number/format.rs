use std::cell::RefCell;
use std::fmt::Write;

use crate::error::{Error, Result};

thread_local! {
    // scratch for the intermediate scientific rendering
    static FORMAT_SCRATCH: RefCell<String> = const { RefCell::new(String::new()) };
}

/// The canonical (shortest round-trip) decimal form, switching to
/// scientific notation below 1e-6 and at or above 1e21.
///
/// Negative zero prints as `0`.
pub fn to_string(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-Infinity" } else { "Infinity" }.to_string();
    }
    let (digits, exponent) = shortest_digits(value.abs());
    let mut out = String::new();
    if value < 0.0 {
        out.push('-');
    }
    assemble(&mut out, &digits, exponent);
    out
}

// Shortest round-trip digits and the decimal exponent, from the standard
// library's scientific formatting (which guarantees minimal digits).
fn shortest_digits(value: f64) -> (String, i32) {
    FORMAT_SCRATCH.with(|scratch| {
        let mut buf = scratch.borrow_mut();
        buf.clear();
        write!(buf, "{:e}", value).unwrap();
        split_scientific(&buf)
    })
}

// "d.ddde±x" -> (digits, exponent)
fn split_scientific(s: &str) -> (String, i32) {
    let (mantissa, exponent) = s.split_once('e').unwrap();
    let exponent: i32 = exponent.parse().unwrap();
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    (digits, exponent)
}

// ECMAScript Number::toString(10) assembly over (digits, exponent).
fn assemble(out: &mut String, digits: &str, exponent: i32) {
    let k = digits.len() as i32;
    // position of the decimal point relative to the digit string
    let n = exponent + 1;
    if n > 0 && n <= 21 {
        if k <= n {
            out.push_str(digits);
            for _ in 0..(n - k) {
                out.push('0');
            }
        } else {
            out.push_str(&digits[..n as usize]);
            out.push('.');
            out.push_str(&digits[n as usize..]);
        }
    } else if n > -6 && n <= 0 {
        out.push_str("0.");
        for _ in 0..(-n) {
            out.push('0');
        }
        out.push_str(digits);
    } else {
        out.push_str(&digits[..1]);
        if k > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        push_exponent(out, n - 1);
    }
}

// exponent with explicit sign and no leading zeros
fn push_exponent(out: &mut String, exponent: i32) {
    out.push('e');
    out.push(if exponent < 0 { '-' } else { '+' });
    write!(out, "{}", exponent.abs()).unwrap();
}

/// Fixed-point notation with `precision` fraction digits, `precision` in
/// 0..=21. Values at or above 1e21 fall back to [`to_string`].
pub fn to_fixed(value: f64, precision: usize) -> Result<String> {
    if precision > 21 {
        return Err(Error::InvalidPrecision(precision as i64));
    }
    if value.is_nan() {
        return Ok("NaN".to_string());
    }
    if value.is_infinite() {
        return Ok(if value < 0.0 { "-Infinity" } else { "Infinity" }.to_string());
    }
    if value.abs() >= 1e21 {
        return Ok(to_string(value));
    }
    let value = if value == 0.0 { 0.0 } else { value };
    Ok(format!("{:.*}", precision, value))
}

/// Scientific notation with `precision` fraction digits, `precision` in
/// 0..=20. The exponent carries an explicit sign and no leading zeros.
pub fn to_exponential(value: f64, precision: usize) -> Result<String> {
    if precision > 20 {
        return Err(Error::InvalidPrecision(precision as i64));
    }
    if value.is_nan() {
        return Ok("NaN".to_string());
    }
    if value.is_infinite() {
        return Ok(if value < 0.0 { "-Infinity" } else { "Infinity" }.to_string());
    }
    let value = if value == 0.0 { 0.0 } else { value };
    let formatted = format!("{:.*e}", precision, value);
    let (mantissa, exponent) = formatted.split_once('e').unwrap();
    let exponent: i32 = exponent.parse().unwrap();
    let mut out = mantissa.to_string();
    push_exponent(&mut out, exponent);
    Ok(out)
}

/// `precision` significant digits, `precision` in 1..=21; scientific
/// notation once the decimal exponent reaches `precision` (or drops below
/// -6), fixed notation otherwise.
pub fn to_precision(value: f64, precision: usize) -> Result<String> {
    if precision < 1 || precision > 21 {
        return Err(Error::InvalidPrecision(precision as i64));
    }
    if value.is_nan() {
        return Ok("NaN".to_string());
    }
    if value.is_infinite() {
        return Ok(if value < 0.0 { "-Infinity" } else { "Infinity" }.to_string());
    }
    if value == 0.0 {
        return Ok(if precision == 1 {
            "0".to_string()
        } else {
            format!("0.{}", "0".repeat(precision - 1))
        });
    }
    let negative = value < 0.0;
    // round to the requested significant digits first; the notation
    // decision uses the rounded exponent
    let formatted = format!("{:.*e}", precision - 1, value.abs());
    let (mantissa, exponent) = formatted.split_once('e').unwrap();
    let exponent: i32 = exponent.parse().unwrap();
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    if exponent < -6 || exponent >= precision as i32 {
        out.push_str(mantissa);
        push_exponent(&mut out, exponent);
    } else {
        let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
        if exponent >= 0 {
            let point = exponent as usize + 1;
            if point >= digits.len() {
                out.push_str(&digits);
            } else {
                out.push_str(&digits[..point]);
                out.push('.');
                out.push_str(&digits[point..]);
            }
        } else {
            out.push_str("0.");
            for _ in 0..(-exponent - 1) {
                out.push('0');
            }
            out.push_str(&digits);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_string_plain() {
        assert_eq!(to_string(0.0), "0");
        assert_eq!(to_string(-0.0), "0");
        assert_eq!(to_string(1.0), "1");
        assert_eq!(to_string(-1.5), "-1.5");
        assert_eq!(to_string(100.0), "100");
        assert_eq!(to_string(123.456), "123.456");
        assert_eq!(to_string(0.1), "0.1");
    }

    #[test]
    fn test_to_string_scientific_switch() {
        assert_eq!(to_string(1e21), "1e+21");
        assert_eq!(to_string(1e20), "100000000000000000000");
        assert_eq!(to_string(1e-6), "0.000001");
        assert_eq!(to_string(1e-7), "1e-7");
        assert_eq!(to_string(1.5e-7), "1.5e-7");
        assert_eq!(to_string(-1.5e22), "-1.5e+22");
    }

    #[test]
    fn test_to_string_specials() {
        assert_eq!(to_string(f64::NAN), "NaN");
        assert_eq!(to_string(f64::INFINITY), "Infinity");
        assert_eq!(to_string(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_to_string_round_trips() {
        for x in [
            0.1,
            1.0 / 3.0,
            f64::MAX,
            f64::MIN_POSITIVE,
            5e-324,
            123456789.123456789,
            2f64.powi(53),
        ] {
            let s = to_string(x);
            assert_eq!(s.parse::<f64>().unwrap(), x, "{}", s);
        }
    }

    #[test]
    fn test_to_fixed() {
        assert_eq!(to_fixed(1.0, 2).unwrap(), "1.00");
        assert_eq!(to_fixed(1.005, 0).unwrap(), "1");
        assert_eq!(to_fixed(-0.0, 2).unwrap(), "0.00");
        assert_eq!(to_fixed(2.5, 0).unwrap(), "2");
        assert_eq!(to_fixed(1e21, 2).unwrap(), "1e+21");
        assert!(to_fixed(1.0, 22).is_err());
    }

    #[test]
    fn test_to_exponential() {
        assert_eq!(to_exponential(123456.0, 2).unwrap(), "1.23e+5");
        assert_eq!(to_exponential(0.0, 2).unwrap(), "0.00e+0");
        assert_eq!(to_exponential(-0.0, 1).unwrap(), "0.0e+0");
        assert_eq!(to_exponential(0.00015, 1).unwrap(), "1.5e-4");
        assert!(to_exponential(1.0, 21).is_err());
    }

    #[test]
    fn test_to_precision() {
        assert_eq!(to_precision(1.5, 5).unwrap(), "1.5000");
        assert_eq!(to_precision(123.456, 2).unwrap(), "1.2e+2");
        assert_eq!(to_precision(0.000123, 2).unwrap(), "0.00012");
        assert_eq!(to_precision(9.99, 1).unwrap(), "1e+1");
        assert_eq!(to_precision(0.0, 3).unwrap(), "0.00");
        assert!(to_precision(1.0, 0).is_err());
        assert!(to_precision(1.0, 22).is_err());
    }
}
