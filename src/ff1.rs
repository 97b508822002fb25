//! FF1 mode of format-preserving encryption (NIST SP 800-38G).
//!
//! FF1 is a 10-round Feistel network over strings of radix-`r` symbols. Each
//! round derives a pseudo-random number from one half of the message, the
//! tweak, and the round index via a CBC-MAC-style chain of AES block
//! encryptions, and folds it into the other half modulo `r^half_length`.
//!
//! Properties:
//! - Ciphertext length equals plaintext length, symbol for symbol
//! - Tweaks are non-secret domain separators; distinct tweaks yield
//!   distinct permutations
//! - Instances are immutable after construction and safe to share across
//!   threads

use num_bigint::BigUint;
use zeroize::Zeroize;

use crate::common::{
    ceil_log2, ceil_rsh, AesBlock, ConfigError, Direction, Error, Fpe, InputError, BLOCK_LENGTH,
};
use crate::radix::{num_to_str, str_to_num, MAX_RADIX};

const ROUNDS: usize = 10;

/// FF1 cipher for a fixed key, radix, and message length bounds.
pub struct FF1 {
    cipher: AesBlock,
    radix: u32,
    min_len: usize,
    max_len: usize,
    max_tweak_len: usize,
}

impl FF1 {
    /// Creates an FF1 instance.
    ///
    /// `key_hex` is the AES key in hexadecimal; the decoded length must be
    /// 16, 24, or 32 bytes, selecting AES-128, AES-192, or AES-256.
    /// `radix` is the alphabet size, 2 through 36. Messages must be between
    /// `min_len` and `max_len` symbols, tweaks at most `max_tweak_len`
    /// bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the key does not decode to an AES key, the
    /// radix is out of range, the length bounds are inconsistent
    /// (`2 <= min_len <= max_len < 2^32`), or the message domain is smaller
    /// than the standard's floor of 100.
    pub fn new(
        key_hex: &str,
        radix: u32,
        min_len: usize,
        max_len: usize,
        max_tweak_len: usize,
    ) -> Result<Self, ConfigError> {
        let mut key = hex::decode(key_hex)?;
        let cipher = AesBlock::new(&key);
        key.zeroize();
        let cipher = cipher?;

        if radix < 2 || radix > MAX_RADIX {
            return Err(ConfigError::RadixRange(radix));
        }
        if min_len < 2 || min_len > max_len || (max_len as u64) >= 1 << 32 {
            return Err(ConfigError::LengthBounds);
        }
        if min_len < 7 && (radix as u64).pow(min_len as u32) < 100 {
            return Err(ConfigError::DomainTooSmall);
        }

        Ok(Self {
            cipher,
            radix,
            min_len,
            max_len,
            max_tweak_len,
        })
    }

    /// Encrypts `plaintext` under `tweak`.
    ///
    /// # Errors
    ///
    /// Returns [`InputError`] (wrapped in [`Error`]) if the message is
    /// empty, outside the configured length bounds, contains a symbol
    /// outside the radix's alphabet, or the tweak exceeds `max_tweak_len`.
    pub fn encrypt(&self, plaintext: &str, tweak: &[u8]) -> Result<String, Error> {
        self.crypt(plaintext, tweak, Direction::Encrypt)
    }

    /// Decrypts `ciphertext` under `tweak`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`FF1::encrypt`].
    pub fn decrypt(&self, ciphertext: &str, tweak: &[u8]) -> Result<String, Error> {
        self.crypt(ciphertext, tweak, Direction::Decrypt)
    }

    fn crypt(&self, input: &str, tweak: &[u8], direction: Direction) -> Result<String, Error> {
        self.validate(input, tweak)?;

        let n = input.len();
        let u = n / 2;
        let v = n - u;
        let (first, second) = input.split_at(u);
        let mut a = first.to_string();
        let mut b = second.to_string();

        let pow_u = BigUint::from(self.radix).pow(u as u32);
        let pow_v = BigUint::from(self.radix).pow(v as u32);

        // The longer half drives how many bytes a round numeral occupies and
        // how far the PRF output is expanded.
        let num_len = ceil_rsh(ceil_log2(&pow_v), 3);
        let expand_len = 4 * ceil_rsh(num_len, 2) + 4;

        let fixed = self.fixed_block(n, u, tweak.len());

        let var_len = (tweak.len() + 1 + num_len).div_ceil(BLOCK_LENGTH) * BLOCK_LENGTH;
        let mut var_block = vec![0u8; var_len];
        var_block[..tweak.len()].copy_from_slice(tweak);

        let rounds: Vec<usize> = match direction {
            Direction::Encrypt => (0..ROUNDS).collect(),
            Direction::Decrypt => (0..ROUNDS).rev().collect(),
        };

        for round in rounds {
            let (m, modulus) = if round % 2 == 0 {
                (u, &pow_u)
            } else {
                (v, &pow_v)
            };

            let round_half = match direction {
                Direction::Encrypt => &b,
                Direction::Decrypt => &a,
            };
            self.fill_variable_block(&mut var_block, round, num_len, round_half)?;

            let prf = self.prf(&fixed, &var_block);
            let y = self.expand(&prf, expand_len);

            let other = match direction {
                Direction::Encrypt => &a,
                Direction::Decrypt => &b,
            };
            let other_num = str_to_num(other, self.radix)?;
            let result = match direction {
                Direction::Encrypt => (other_num + y) % modulus,
                Direction::Decrypt => (other_num + modulus - (y % modulus)) % modulus,
            };
            let result_str = num_to_str(&result, self.radix, m);

            match direction {
                Direction::Encrypt => a = std::mem::replace(&mut b, result_str),
                Direction::Decrypt => b = std::mem::replace(&mut a, result_str),
            }
        }

        let mut output = a;
        output.push_str(&b);
        Ok(output)
    }

    fn validate(&self, input: &str, tweak: &[u8]) -> Result<(), InputError> {
        if input.is_empty() {
            return Err(InputError::EmptyMessage);
        }
        let len = input.chars().count();
        if len < self.min_len {
            return Err(InputError::MessageTooShort {
                len,
                min: self.min_len,
            });
        }
        if len > self.max_len {
            return Err(InputError::MessageTooLong {
                len,
                max: self.max_len,
            });
        }
        if tweak.len() > self.max_tweak_len {
            return Err(InputError::TweakTooLong {
                len: tweak.len(),
                max: self.max_tweak_len,
            });
        }
        for symbol in input.chars() {
            if symbol.to_digit(self.radix).is_none() {
                return Err(InputError::InvalidSymbol {
                    symbol,
                    radix: self.radix,
                });
            }
        }
        Ok(())
    }

    /// The 16-byte block that is constant across rounds: version and method
    /// markers, the radix, the first-half length, the message length, and
    /// the tweak length, all big-endian.
    fn fixed_block(&self, n: usize, u: usize, tweak_len: usize) -> [u8; BLOCK_LENGTH] {
        let mut block = [0u8; BLOCK_LENGTH];
        let hi = 0x0102010000000a00u64 | u64::from(self.radix) << 16 | (u % 256) as u64;
        let lo = (n as u64) << 32 | tweak_len as u64;
        block[..8].copy_from_slice(&hi.to_be_bytes());
        block[8..].copy_from_slice(&lo.to_be_bytes());
        block
    }

    /// Writes the round index and the numeral of the round's input half into
    /// the tail of the variable block. The tweak prefix and zero padding in
    /// front of them never change between rounds.
    fn fill_variable_block(
        &self,
        var_block: &mut [u8],
        round: usize,
        num_len: usize,
        half: &str,
    ) -> Result<(), Error> {
        let len = var_block.len();
        var_block[len - num_len - 1] = round as u8;

        let value = str_to_num(half, self.radix)?;
        let bytes = value.to_bytes_be();
        if bytes.len() > num_len {
            return Err(Error::Internal(format!(
                "round numeral occupies {} bytes but only {} fit",
                bytes.len(),
                num_len
            )));
        }
        let tail = &mut var_block[len - num_len..];
        tail.fill(0);
        tail[num_len - bytes.len()..].copy_from_slice(&bytes);
        Ok(())
    }

    /// CBC-MAC-style chain over the fixed and variable blocks: the state is
    /// XORed with each 16-byte block and re-encrypted.
    fn prf(&self, fixed: &[u8; BLOCK_LENGTH], var_block: &[u8]) -> [u8; BLOCK_LENGTH] {
        let mut state = [0u8; BLOCK_LENGTH];
        for chunk in fixed
            .chunks_exact(BLOCK_LENGTH)
            .chain(var_block.chunks_exact(BLOCK_LENGTH))
        {
            for (s, c) in state.iter_mut().zip(chunk) {
                *s ^= c;
            }
            self.cipher.encrypt_block(&mut state);
        }
        state
    }

    /// Expands the PRF output to `expand_len` bytes, counter-mode style, and
    /// interprets the result as a big-endian integer. The first block is the
    /// PRF output itself; block `j` is `AES(prf XOR [j])`.
    fn expand(&self, prf: &[u8; BLOCK_LENGTH], expand_len: usize) -> BigUint {
        let mut masked = prf.to_vec();
        let mut counter: u128 = 1;
        while masked.len() < expand_len {
            let mut block = *prf;
            for (x, c) in block.iter_mut().zip(counter.to_be_bytes()) {
                *x ^= c;
            }
            self.cipher.encrypt_block(&mut block);
            masked.extend_from_slice(&block);
            counter += 1;
        }
        masked.truncate(expand_len);
        BigUint::from_bytes_be(&masked)
    }
}

impl Fpe for FF1 {
    fn encrypt(&self, plaintext: &str, tweak: &[u8]) -> Result<String, Error> {
        self.crypt(plaintext, tweak, Direction::Encrypt)
    }

    fn decrypt(&self, ciphertext: &str, tweak: &[u8]) -> Result<String, Error> {
        self.crypt(ciphertext, tweak, Direction::Decrypt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;

    const KEY_128: &str = "2B7E151628AED2A6ABF7158809CF4F3C";
    const KEY_256: &str = "2B7E151628AED2A6ABF7158809CF4F3CEF4359D8D580AA4F7F036D6F04FC6A94";

    #[test]
    fn rejects_invalid_key_hex() {
        assert!(matches!(
            FF1::new("2B7E151628AED2A6XYZ7158809CF4F3C", 10, 2, 20, 16),
            Err(ConfigError::KeyHex(_))
        ));
    }

    #[test]
    fn rejects_non_aes_key_length() {
        assert!(matches!(
            FF1::new("A1B2C3", 10, 2, 20, 16),
            Err(ConfigError::KeyLength(3))
        ));
    }

    #[test]
    fn rejects_radix_out_of_range() {
        assert!(matches!(
            FF1::new(KEY_128, 1, 2, 20, 16),
            Err(ConfigError::RadixRange(1))
        ));
        assert!(matches!(
            FF1::new(KEY_128, 37, 2, 20, 16),
            Err(ConfigError::RadixRange(37))
        ));
    }

    #[test]
    fn rejects_inconsistent_length_bounds() {
        assert!(matches!(
            FF1::new(KEY_128, 10, 1, 20, 16),
            Err(ConfigError::LengthBounds)
        ));
        assert!(matches!(
            FF1::new(KEY_128, 10, 21, 20, 16),
            Err(ConfigError::LengthBounds)
        ));
        assert!(matches!(
            FF1::new(KEY_128, 10, 2, 1 << 32, 16),
            Err(ConfigError::LengthBounds)
        ));
    }

    #[test]
    fn rejects_domain_below_security_floor() {
        // 2^6 = 64 < 100, 2^7 = 128 >= 100
        assert!(matches!(
            FF1::new(KEY_128, 2, 6, 20, 16),
            Err(ConfigError::DomainTooSmall)
        ));
        assert!(FF1::new(KEY_128, 2, 7, 20, 16).is_ok());
        // 10^2 = 100 is exactly the floor
        assert!(FF1::new(KEY_128, 10, 2, 20, 16).is_ok());
    }

    #[test]
    fn rejects_bad_call_inputs() {
        let ff1 = FF1::new(KEY_256, 10, 5, 20, 10).unwrap();
        assert_eq!(
            ff1.encrypt("", &[]),
            Err(Error::Input(InputError::EmptyMessage))
        );
        assert_eq!(
            ff1.encrypt("1234", &[]),
            Err(Error::Input(InputError::MessageTooShort { len: 4, min: 5 }))
        );
        assert_eq!(
            ff1.encrypt("123456789012345678901", &[]),
            Err(Error::Input(InputError::MessageTooLong { len: 21, max: 20 }))
        );
        assert_eq!(
            ff1.encrypt("1234567890", &[0u8; 11]),
            Err(Error::Input(InputError::TweakTooLong { len: 11, max: 10 }))
        );
        assert_eq!(
            ff1.decrypt("12345a", &[]),
            Err(Error::Input(InputError::InvalidSymbol {
                symbol: 'a',
                radix: 10
            }))
        );
    }

    #[test]
    fn decodes_mixed_case_and_emits_lowercase() {
        let ff1 = FF1::new(KEY_128, 36, 2, 20, 16).unwrap();
        let lower = ff1.encrypt("0123456789abcdefghi", &[]).unwrap();
        let upper = ff1.encrypt("0123456789ABCDEFGHI", &[]).unwrap();
        assert_eq!(lower, upper);
        assert!(lower
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn tweaks_separate_domains() {
        let ff1 = FF1::new(KEY_128, 10, 2, 20, 16).unwrap();
        let with_tweak = ff1.encrypt("0123456789", b"12345").unwrap();
        let without = ff1.encrypt("0123456789", &[]).unwrap();
        assert_ne!(with_tweak, without);
    }

    fn digits_message(raw: &[u8], radix: u32) -> String {
        raw.iter()
            .map(|d| char::from_digit(u32::from(*d) % radix, radix).unwrap())
            .collect()
    }

    #[quickcheck]
    fn encrypt_then_decrypt(raw: Vec<u8>, tweak: Vec<u8>) -> TestResult {
        if raw.len() < 2 || raw.len() > 20 || tweak.len() > 16 {
            return TestResult::discard();
        }
        let message = digits_message(&raw, 10);
        let ff1 = FF1::new(KEY_128, 10, 2, 20, 16).unwrap();
        let ciphertext = ff1.encrypt(&message, &tweak).unwrap();
        assert_eq!(ciphertext.len(), message.len());
        TestResult::from_bool(ff1.decrypt(&ciphertext, &tweak).unwrap() == message)
    }

    #[quickcheck]
    fn decrypt_then_encrypt(raw: Vec<u8>, tweak: Vec<u8>) -> TestResult {
        if raw.len() < 2 || raw.len() > 20 || tweak.len() > 16 {
            return TestResult::discard();
        }
        let message = digits_message(&raw, 36);
        let ff1 = FF1::new(KEY_256, 36, 2, 20, 16).unwrap();
        let plaintext = ff1.decrypt(&message, &tweak).unwrap();
        TestResult::from_bool(ff1.encrypt(&plaintext, &tweak).unwrap() == message)
    }
}
