//! FF3 mode of format-preserving encryption (NIST SP 800-38G).
//!
//! FF3 is an 8-round Feistel network. Compared to FF1 it is the "reversed"
//! sibling: the AES key schedule is built over the byte-reversed key, each
//! half-string is reversed before being read as a number and re-reversed on
//! output, and the 16-byte AES input and output blocks are byte-reversed.
//! All three reversals are required by the standard; none is redundant.
//!
//! The tweak is always exactly 8 bytes and is split into two 4-byte halves
//! that alternate across rounds.

use num_bigint::BigUint;
use zeroize::Zeroize;

use crate::common::{
    ceil_rsh, reverse_bytes, xor_bytes, AesBlock, ConfigError, Direction, Error, Fpe, InputError,
    BLOCK_LENGTH,
};
use crate::radix::{num_to_str, reverse_str, str_to_num, MAX_RADIX};

const ROUNDS: usize = 8;

/// Required tweak length in bytes.
pub const TWEAK_LENGTH: usize = 8;

/// Bytes available for a half-string numeral in the round block.
const NUM_LENGTH: usize = 12;

/// FF3 cipher for a fixed key, radix, and message length bounds.
pub struct FF3 {
    cipher: AesBlock,
    radix: u32,
    min_len: usize,
    max_len: usize,
}

impl FF3 {
    /// Creates an FF3 instance.
    ///
    /// `key_hex` is the AES key in hexadecimal; the decoded length must be
    /// 16, 24, or 32 bytes, selecting AES-128, AES-192, or AES-256. The AES
    /// schedule is built over the byte-reversed key, as the standard
    /// requires. `radix` is the alphabet size, 2 through 36.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the key does not decode to an AES key, the
    /// radix is out of range, the length bounds are inconsistent, the
    /// message domain exceeds `radix^(max_len/2) < 2^96`, or it is smaller
    /// than the standard's floor of 100.
    pub fn new(
        key_hex: &str,
        radix: u32,
        min_len: usize,
        max_len: usize,
    ) -> Result<Self, ConfigError> {
        let mut key = hex::decode(key_hex)?;
        key.reverse();
        let cipher = AesBlock::new(&key);
        key.zeroize();
        let cipher = cipher?;

        if radix < 2 || radix > MAX_RADIX {
            return Err(ConfigError::RadixRange(radix));
        }
        if min_len < 2 || min_len > max_len {
            return Err(ConfigError::LengthBounds);
        }
        let half = max_len / 2;
        if half >= 96 || BigUint::from(radix).pow(half as u32) >= BigUint::from(1u8) << 96 {
            return Err(ConfigError::DomainTooLarge);
        }
        if min_len < 7 && (radix as u64).pow(min_len as u32) < 100 {
            return Err(ConfigError::DomainTooSmall);
        }

        Ok(Self {
            cipher,
            radix,
            min_len,
            max_len,
        })
    }

    /// Encrypts `plaintext` under the 8-byte `tweak`.
    ///
    /// # Errors
    ///
    /// Returns [`InputError`] (wrapped in [`Error`]) if the message is
    /// empty, outside the configured length bounds, contains a symbol
    /// outside the radix's alphabet, the tweak is not exactly 8 bytes, or a
    /// half-string numeral does not fit in the round block.
    pub fn encrypt(&self, plaintext: &str, tweak: &[u8]) -> Result<String, Error> {
        self.crypt(plaintext, tweak, Direction::Encrypt)
    }

    /// Decrypts `ciphertext` under the 8-byte `tweak`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`FF3::encrypt`].
    pub fn decrypt(&self, ciphertext: &str, tweak: &[u8]) -> Result<String, Error> {
        self.crypt(ciphertext, tweak, Direction::Decrypt)
    }

    fn crypt(&self, input: &str, tweak: &[u8], direction: Direction) -> Result<String, Error> {
        self.validate(input, tweak)?;

        let n = input.len();
        let u = ceil_rsh(n, 1);
        let v = n - u;
        let (first, second) = input.split_at(u);
        let mut a = first.to_string();
        let mut b = second.to_string();

        let tweak_left: [u8; 4] = tweak[..4].try_into().unwrap();
        let tweak_right: [u8; 4] = tweak[4..].try_into().unwrap();

        let pow_u = BigUint::from(self.radix).pow(u as u32);
        let pow_v = BigUint::from(self.radix).pow(v as u32);

        let rounds: Vec<usize> = match direction {
            Direction::Encrypt => (0..ROUNDS).collect(),
            Direction::Decrypt => (0..ROUNDS).rev().collect(),
        };

        for round in rounds {
            let (m, modulus, tweak_half) = if round % 2 == 0 {
                (u, &pow_u, &tweak_right)
            } else {
                (v, &pow_v, &tweak_left)
            };

            let round_half = match direction {
                Direction::Encrypt => &b,
                Direction::Decrypt => &a,
            };
            let y = self.round_value(round, round_half, tweak_half)?;

            let other = match direction {
                Direction::Encrypt => &a,
                Direction::Decrypt => &b,
            };
            let other_num = str_to_num(&reverse_str(other), self.radix)?;
            let result = match direction {
                Direction::Encrypt => (other_num + y) % modulus,
                Direction::Decrypt => (other_num + modulus - (y % modulus)) % modulus,
            };
            let result_str = reverse_str(&num_to_str(&result, self.radix, m));

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
        if tweak.len() != TWEAK_LENGTH {
            return Err(InputError::TweakLength(tweak.len()));
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

    /// Assembles the round block from the half-tweak XORed with the round
    /// index and the numeral of the reversed input half, runs it through
    /// AES with byte-reversed input and output, and reads the result as a
    /// big-endian integer.
    fn round_value(
        &self,
        round: usize,
        half: &str,
        tweak_half: &[u8; 4],
    ) -> Result<BigUint, Error> {
        let mut block = [0u8; BLOCK_LENGTH];
        block[..4].copy_from_slice(&xor_bytes(tweak_half, &(round as u32).to_be_bytes()));

        let value = str_to_num(&reverse_str(half), self.radix)?;
        let bytes = value.to_bytes_be();
        if bytes.len() > NUM_LENGTH {
            return Err(InputError::HalfTooWide.into());
        }
        block[BLOCK_LENGTH - bytes.len()..].copy_from_slice(&bytes);

        let mut reversed: [u8; BLOCK_LENGTH] = reverse_bytes(&block).try_into().unwrap();
        self.cipher.encrypt_block(&mut reversed);
        let ciphered = reverse_bytes(&reversed);
        Ok(BigUint::from_bytes_be(&ciphered))
    }
}

impl Fpe for FF3 {
    fn encrypt(&self, plaintext: &str, tweak: &[u8]) -> Result<String, Error> {
        self.crypt(plaintext, tweak, Direction::Encrypt)
    }

    fn decrypt(&self, ciphertext: &str, tweak: &[u8]) -> Result<String, Error> {
        self.crypt(ciphertext, tweak, Direction::Decrypt)
    }
}
