//! Shared machinery for the FF1 and FF3 ciphers.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256};
use num_bigint::BigUint;
use thiserror::Error;

/// AES block length in bytes.
pub const BLOCK_LENGTH: usize = 16;

/// Errors raised while constructing an FF1 or FF3 instance.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The key string is not valid hexadecimal.
    #[error("key is not valid hex: {0}")]
    KeyHex(#[from] hex::FromHexError),
    /// The decoded key is not an AES key length.
    #[error("key must be 16, 24, or 32 bytes, got {0}")]
    KeyLength(usize),
    /// The radix is outside the supported alphabet.
    #[error("radix must be in [2..36], got {0}")]
    RadixRange(u32),
    /// The message length bounds are inconsistent.
    #[error("message length bounds must satisfy 2 <= min <= max")]
    LengthBounds,
    /// The message domain is below the standard's security floor.
    #[error("radix^min_len must be at least 100")]
    DomainTooSmall,
    /// The FF3 message domain exceeds what one round block can carry.
    #[error("radix^(max_len/2) must be less than 2^96")]
    DomainTooLarge,
}

/// Errors raised by a single encrypt or decrypt call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// The message is empty.
    #[error("message must not be empty")]
    EmptyMessage,
    /// The message is shorter than the configured minimum.
    #[error("message length {len} is below the minimum of {min}")]
    MessageTooShort {
        /// Length of the rejected message, in symbols.
        len: usize,
        /// Configured minimum message length.
        min: usize,
    },
    /// The message is longer than the configured maximum.
    #[error("message length {len} is above the maximum of {max}")]
    MessageTooLong {
        /// Length of the rejected message, in symbols.
        len: usize,
        /// Configured maximum message length.
        max: usize,
    },
    /// The tweak is longer than the configured maximum (FF1).
    #[error("tweak length {len} is above the maximum of {max}")]
    TweakTooLong {
        /// Length of the rejected tweak, in bytes.
        len: usize,
        /// Configured maximum tweak length.
        max: usize,
    },
    /// The tweak is not exactly 8 bytes (FF3).
    #[error("tweak must be exactly 8 bytes, got {0}")]
    TweakLength(usize),
    /// A message symbol is outside the radix's alphabet.
    #[error("symbol {symbol:?} is not valid for radix {radix}")]
    InvalidSymbol {
        /// The offending symbol.
        symbol: char,
        /// The radix it was decoded against.
        radix: u32,
    },
    /// The numeric value of a message half needs more than 12 bytes (FF3).
    #[error("half of the message does not fit in 12 bytes")]
    HalfTooWide,
}

/// Unified error type for encrypt and decrypt operations.
///
/// Hosts typically map [`Error::Config`] and [`Error::Input`] to a client
/// fault and [`Error::Internal`] to a server fault.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A construction-time failure.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A per-call validation failure.
    #[error(transparent)]
    Input(#[from] InputError),
    /// The block cipher produced an impossible state.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Direction of cipher operation.
#[derive(Clone, Copy)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// Common contract of the FF1 and FF3 ciphers.
///
/// Implementations are immutable after construction, so one instance can be
/// shared across threads and called concurrently.
pub trait Fpe {
    /// Encrypts `plaintext` under `tweak`, preserving length and alphabet.
    fn encrypt(&self, plaintext: &str, tweak: &[u8]) -> Result<String, Error>;
    /// Decrypts `ciphertext` under `tweak`, recovering the plaintext.
    fn decrypt(&self, ciphertext: &str, tweak: &[u8]) -> Result<String, Error>;
}

/// Single-block AES encryption with the key size chosen at runtime.
///
/// The decoded key length selects AES-128, AES-192, or AES-256. Only the
/// forward direction is needed: both Feistel modes run the block cipher
/// forwards during decryption as well.
pub(crate) enum AesBlock {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

impl AesBlock {
    pub(crate) fn new(key: &[u8]) -> Result<Self, ConfigError> {
        match key.len() {
            16 => Ok(AesBlock::Aes128(Aes128::new(GenericArray::from_slice(key)))),
            24 => Ok(AesBlock::Aes192(Aes192::new(GenericArray::from_slice(key)))),
            32 => Ok(AesBlock::Aes256(Aes256::new(GenericArray::from_slice(key)))),
            n => Err(ConfigError::KeyLength(n)),
        }
    }

    pub(crate) fn encrypt_block(&self, block: &mut [u8; BLOCK_LENGTH]) {
        let block = GenericArray::from_mut_slice(block.as_mut_slice());
        match self {
            AesBlock::Aes128(cipher) => cipher.encrypt_block(block),
            AesBlock::Aes192(cipher) => cipher.encrypt_block(block),
            AesBlock::Aes256(cipher) => cipher.encrypt_block(block),
        }
    }
}

/// XOR two byte runs, truncated to the shorter of the two.
pub fn xor_bytes(a: &[u8], b: &[u8]) -> Vec<u8> {
    a.iter().zip(b.iter()).map(|(x, y)| x ^ y).collect()
}

/// Byte-wise reversal of a byte run.
pub fn reverse_bytes(b: &[u8]) -> Vec<u8> {
    b.iter().rev().copied().collect()
}

/// `ceil(x / 2^n)`
pub fn ceil_rsh(x: usize, n: u32) -> usize {
    if x & ((1 << n) - 1) == 0 {
        x >> n
    } else {
        (x >> n) + 1
    }
}

/// `ceil(log2(x))`: the smallest `k` with `2^k >= x`. Returns 0 for 0 and 1.
pub fn ceil_log2(x: &BigUint) -> usize {
    let bits = x.bits();
    if bits <= 1 {
        return 0;
    }
    if x.count_ones() == 1 {
        bits as usize - 1
    } else {
        bits as usize
    }
}
