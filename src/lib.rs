//! Format-preserving encryption library implementing the FF1 and FF3 modes
//! of [NIST Special Publication 800-38G](https://nvlpubs.nist.gov/nistpubs/SpecialPublications/NIST.SP.800-38G.pdf).
//!
//! An FPE scheme encrypts a string of symbols drawn from a fixed alphabet
//! into another string of the same length over the same alphabet, and
//! decryption recovers the original. This makes it suitable for:
//! - Encrypting card numbers, account numbers, and other fixed-format fields
//! - Tokenizing identifiers without schema changes
//! - Database columns with length or character-set constraints
//!
//! # Modes
//!
//! - **FF1**: 10-round Feistel network, variable-length tweaks
//! - **FF3**: 8-round Feistel network, fixed 8-byte tweaks, byte-reversed
//!   key and block conventions
//!
//! Both modes run AES (128, 192, or 256, selected by key length) as their
//! round function and share the [`Fpe`] contract, so hosts can hold a map
//! of named `Box<dyn Fpe>` instances and dispatch per request.
//!
//! # Quick start
//!
//! ```rust
//! use fpe::FF1;
//!
//! let ff1 = FF1::new("2B7E151628AED2A6ABF7158809CF4F3C", 10, 2, 20, 16).unwrap();
//!
//! let ciphertext = ff1.encrypt("0123456789", &[]).unwrap();
//! assert_eq!(ciphertext, "2433477484");
//!
//! let plaintext = ff1.decrypt(&ciphertext, &[]).unwrap();
//! assert_eq!(plaintext, "0123456789");
//! ```
//!
//! FF3 tweaks are exactly 8 bytes:
//!
//! ```rust
//! use fpe::FF3;
//!
//! let ff3 = FF3::new("EF4359D8D580AA4F7F036D6F04FC6A94", 10, 2, 20).unwrap();
//! let tweak = [0xD8, 0xE7, 0x92, 0x0A, 0xFA, 0x33, 0x0A, 0x73];
//!
//! let ciphertext = ff3.encrypt("890121234567890000", &tweak).unwrap();
//! assert_eq!(ciphertext, "750918814058654607");
//! ```
//!
//! # Alphabet
//!
//! Radix `r` maps symbol `k` to `'0'..'9'` for `k < 10`, then `'a'..'z'`,
//! supporting radices 2 through 36. Decoding is case-insensitive; output is
//! always lowercase.
//!
//! # Security considerations
//!
//! - The message domain must hold at least 100 values (`radix^min_len >=
//!   100`); constructors enforce this
//! - Tweaks are not secret, but distinct tweaks yield distinct
//!   permutations; vary them per field or record where possible
//! - FPE provides no integrity protection; pair with a MAC or AEAD when
//!   tampering matters

pub mod common;
pub mod ff1;
pub mod ff3;
pub mod radix;

pub use common::{ConfigError, Error, Fpe, InputError};
pub use ff1::FF1;
pub use ff3::FF3;
