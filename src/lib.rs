//! Pure Rust implementation of an authenticated, encrypted binary
//! container: an AES-256/CFB128 symmetric cipher, a cursor-based DER codec
//! for a small ASN.1 profile, and PBKDF2 key stretching over a generic
//! HMAC, composed by the [`Container`] façade into encrypt-then-MAC blobs
//! suitable for storage on untrusted media.
//!
//! # Scope
//!
//! This crate does not manage keys, rotate them, or generate randomness —
//! callers supply key material and an IV. It implements exactly one
//! container version (`0`); the version field exists so a future crate
//! version can add others without breaking the wire format.
//!
//! # Minimum Supported Rust Version
//!
//! This crate requires **Rust 1.60** at a minimum.

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc(
    html_logo_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo_small.png",
    html_root_url = "https://docs.rs/crypto-container/0.1.0"
)]
#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod aes;
mod cfb;
mod container;
mod der;
mod error;
mod pbkdf2;

pub use crate::aes::{Aes256, BlockEngine};
pub use crate::cfb::Cfb;
pub use crate::container::Container;
pub use crate::der::{DerDecoder, DerEncoder, Range};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::pbkdf2::{pbkdf2, pbkdf2_hmac_sha1, HmacSha1, Pbkdf2Params};

/// Size in bytes of the AES-256 key this crate's [`Container`] uses.
pub const KEY_SIZE: usize = 32;

/// Block size in bytes of the underlying cipher (and thus the IV length).
pub const CIPHER_BLOCK_SIZE: usize = 16;

/// Recommended minimum size in bytes for a freshly generated HMAC salt.
/// Not enforced — [`Container::new`] only requires a non-empty salt — but
/// new containers should be provisioned with at least this much.
pub const RECOMMENDED_SALT_SIZE: usize = 24;

/// Default PBKDF2 iteration count used when no explicit parameters are
/// supplied. Preserved bit-for-bit for compatibility with blobs produced
/// by prior versions of this format.
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 10_000;

/// Default PBKDF2 salt: 16 bytes of the MD5 digest of the literal string
/// `"com.jkovacic.cryptoutil.Pbkdf2"`. Preserved bit-for-bit for
/// compatibility with blobs produced by prior versions of this format.
pub const DEFAULT_PBKDF2_SALT: [u8; 16] = [
    0x79, 0xC0, 0x5B, 0x84, 0xB7, 0xA8, 0x9E, 0x10, 0x78, 0xDC, 0x35, 0x05, 0xBD, 0x34, 0x6B, 0x23,
];
