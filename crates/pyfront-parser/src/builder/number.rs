// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Numeric literal interpretation.
//!
//! Integers accumulate digit by digit in an `i64`. The first step whose
//! multiply or add overflows switches to a [`BigInt`] that continues from the
//! value accumulated so far, so `9223372036854775807` stays native and
//! `9223372036854775808` becomes a big integer.

use num_bigint::BigInt;

use crate::ast::Constant;

/// Interpret the text of a NUMBER token.
pub fn parse_number(text: &str) -> Result<Constant, String> {
    let cleaned: String = text.chars().filter(|&c| c != '_').collect();

    if let Some(imag) = cleaned
        .strip_suffix('j')
        .or_else(|| cleaned.strip_suffix('J'))
    {
        let imag = parse_float(imag, text)?;
        return Ok(Constant::Complex { real: 0.0, imag });
    }

    let lower = cleaned.to_ascii_lowercase();
    if let Some(digits) = lower.strip_prefix("0x") {
        return parse_integer(digits, 16, text);
    }
    if let Some(digits) = lower.strip_prefix("0o") {
        return parse_integer(digits, 8, text);
    }
    if let Some(digits) = lower.strip_prefix("0b") {
        return parse_integer(digits, 2, text);
    }
    if lower.contains(['.', 'e']) {
        return Ok(Constant::Float(parse_float(&lower, text)?));
    }
    parse_integer(&lower, 10, text)
}

fn parse_float(digits: &str, original: &str) -> Result<f64, String> {
    digits
        .parse::<f64>()
        .map_err(|_| format!("invalid float literal '{}'", original))
}

fn parse_integer(digits: &str, radix: u32, original: &str) -> Result<Constant, String> {
    if digits.is_empty() {
        return Err(format!("invalid integer literal '{}'", original));
    }
    let mut value: i64 = 0;
    for (i, c) in digits.char_indices() {
        let digit = digit_value(c, radix, original)?;
        match value
            .checked_mul(i64::from(radix))
            .and_then(|v| v.checked_add(i64::from(digit)))
        {
            Some(next) => value = next,
            None => {
                let big = continue_big(BigInt::from(value), &digits[i..], radix, original)?;
                return Ok(Constant::BigInt(big));
            }
        }
    }
    Ok(Constant::Int(value))
}

/// Keep accumulating `rest` on top of the prefix value `acc`.
fn continue_big(mut acc: BigInt, rest: &str, radix: u32, original: &str) -> Result<BigInt, String> {
    for c in rest.chars() {
        let digit = digit_value(c, radix, original)?;
        acc = acc * radix + digit;
    }
    Ok(acc)
}

fn digit_value(c: char, radix: u32, original: &str) -> Result<u32, String> {
    c.to_digit(radix).ok_or_else(|| {
        let base = match radix {
            16 => "hexadecimal",
            8 => "octal",
            2 => "binary",
            _ => "decimal",
        };
        format!("invalid digit '{}' in {} literal '{}'", c, base, original)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(text: &str) -> i64 {
        match parse_number(text) {
            Ok(Constant::Int(v)) => v,
            other => panic!("{text}: expected Int, got {other:?}"),
        }
    }

    #[test]
    fn i64_max_stays_native() {
        assert_eq!(int("9223372036854775807"), i64::MAX);
    }

    #[test]
    fn overflow_promotes_to_bigint() {
        let Ok(Constant::BigInt(big)) = parse_number("9223372036854775808") else {
            panic!("expected BigInt");
        };
        assert_eq!(big.to_string(), "9223372036854775808");

        let Ok(Constant::BigInt(big)) = parse_number("123456789012345678901234567890") else {
            panic!("expected BigInt");
        };
        assert_eq!(big.to_string(), "123456789012345678901234567890");
    }

    #[test]
    fn bigint_in_other_bases() {
        let Ok(Constant::BigInt(big)) = parse_number("0xFFFF_FFFF_FFFF_FFFF_FF") else {
            panic!("expected BigInt");
        };
        assert_eq!(big, BigInt::from(0xFF_FFFF_FFFF_FFFF_FFFFu128));
    }

    #[test]
    fn underscores_are_ignored() {
        assert_eq!(int("1_000"), int("1000"));
        assert_eq!(int("0b1010"), 10);
        assert_eq!(int("0o17"), 15);
        assert_eq!(int("0X1f"), 31);
        assert_eq!(int("000"), 0);
    }

    #[test]
    fn floats_and_complex() {
        assert_eq!(parse_number("1.5"), Ok(Constant::Float(1.5)));
        assert_eq!(parse_number("1e3"), Ok(Constant::Float(1000.0)));
        assert_eq!(parse_number("1_0.2_5"), Ok(Constant::Float(10.25)));
        assert_eq!(
            parse_number("2.5j"),
            Ok(Constant::Complex {
                real: 0.0,
                imag: 2.5
            })
        );
        assert_eq!(
            parse_number("3J"),
            Ok(Constant::Complex {
                real: 0.0,
                imag: 3.0
            })
        );
    }

    #[test]
    fn bad_digit_is_an_error() {
        assert!(parse_number("0b102").is_err());
        assert!(parse_number("0x").is_err());
    }
}
