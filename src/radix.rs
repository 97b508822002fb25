//! Conversion between radix-encoded strings and non-negative integers.
//!
//! Symbol `k` of radix `r` is `'0'..'9'` for `k < 10`, then `'a'..'z'`.
//! Decoding accepts either case; rendering always emits lowercase.

use num_bigint::BigUint;

use crate::common::InputError;

/// Largest supported radix: digits plus the lowercase latin alphabet.
pub const MAX_RADIX: u32 = 36;

/// Reads `s` left-to-right as a base-`radix` number.
///
/// # Panics
///
/// Panics if `radix` is outside `[2, 36]`. The cipher constructors enforce
/// this bound, so calls made through [`FF1`](crate::FF1) or
/// [`FF3`](crate::FF3) never reach it.
///
/// # Errors
///
/// Returns [`InputError::InvalidSymbol`] if any symbol is outside the
/// radix's alphabet.
pub fn str_to_num(s: &str, radix: u32) -> Result<BigUint, InputError> {
    assert!(
        (2..=MAX_RADIX).contains(&radix),
        "radix must be in [2..36], got {radix}"
    );
    let mut n = BigUint::default();
    for c in s.chars() {
        let digit = c
            .to_digit(radix)
            .ok_or(InputError::InvalidSymbol { symbol: c, radix })?;
        n = n * radix + digit;
    }
    Ok(n)
}

/// Renders `n` in base `radix`, left-padded with `'0'` to exactly `length`
/// symbols. Assumes `n < radix^length`.
///
/// # Panics
///
/// Panics if `radix` is outside `[2, 36]`, as in [`str_to_num`].
pub fn num_to_str(n: &BigUint, radix: u32, length: usize) -> String {
    assert!(
        (2..=MAX_RADIX).contains(&radix),
        "radix must be in [2..36], got {radix}"
    );
    let digits = n.to_str_radix(radix);
    if digits.len() >= length {
        digits
    } else {
        let mut padded = "0".repeat(length - digits.len());
        padded.push_str(&digits);
        padded
    }
}

/// Symbol-wise reversal of a string.
pub fn reverse_str(s: &str) -> String {
    s.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_digits_and_letters() {
        assert_eq!(str_to_num("0", 10).unwrap(), BigUint::from(0u32));
        assert_eq!(str_to_num("255", 10).unwrap(), BigUint::from(255u32));
        assert_eq!(str_to_num("ff", 16).unwrap(), BigUint::from(255u32));
        assert_eq!(str_to_num("zz", 36).unwrap(), BigUint::from(1295u32));
    }

    #[test]
    fn decoding_is_case_insensitive() {
        assert_eq!(str_to_num("FF", 16).unwrap(), str_to_num("ff", 16).unwrap());
        assert_eq!(
            str_to_num("AbCdE", 36).unwrap(),
            str_to_num("abcde", 36).unwrap()
        );
    }

    #[test]
    fn rejects_symbols_outside_the_alphabet() {
        assert_eq!(
            str_to_num("12a", 10),
            Err(InputError::InvalidSymbol {
                symbol: 'a',
                radix: 10
            })
        );
        assert!(str_to_num("12 3", 10).is_err());
        assert!(str_to_num("é", 36).is_err());
    }

    #[test]
    #[should_panic(expected = "radix must be in [2..36]")]
    fn str_to_num_rejects_unsupported_radix() {
        let _ = str_to_num("0", 37);
    }

    #[test]
    #[should_panic(expected = "radix must be in [2..36]")]
    fn num_to_str_rejects_unsupported_radix() {
        let _ = num_to_str(&BigUint::from(0u32), 1, 3);
    }

    #[test]
    fn renders_lowercase_with_zero_padding() {
        assert_eq!(num_to_str(&BigUint::from(255u32), 16, 4), "00ff");
        assert_eq!(num_to_str(&BigUint::from(255u32), 16, 2), "ff");
        assert_eq!(num_to_str(&BigUint::from(0u32), 10, 3), "000");
        assert_eq!(num_to_str(&BigUint::from(1295u32), 36, 2), "zz");
    }

    #[test]
    fn encode_decode_round_trips() {
        for radix in [2u32, 10, 16, 26, 36] {
            for value in [0u32, 1, 99, 1000, 65535] {
                let n = BigUint::from(value);
                let s = num_to_str(&n, radix, 20);
                assert_eq!(s.len(), 20);
                assert_eq!(str_to_num(&s, radix).unwrap(), n);
            }
        }
    }

    #[test]
    fn reverse_str_is_an_involution() {
        assert_eq!(reverse_str("abc"), "cba");
        assert_eq!(reverse_str(&reverse_str("0123456789")), "0123456789");
        assert_eq!(reverse_str(""), "");
    }
}
