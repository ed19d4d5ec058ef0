//! Cipher Feedback (CFB-128) mode driver.

use crate::aes::BlockEngine;
use crate::error::{Error, ErrorKind, Result};
use alloc::vec::Vec;
use zeroize::Zeroize;

/// CFB-128 stream driver over a [`BlockEngine`].
///
/// Each top-level [`encrypt`](Cfb::encrypt)/[`decrypt`](Cfb::decrypt) call
/// restarts the feedback register from the IV; no state is retained across
/// calls.
pub struct Cfb<E: BlockEngine> {
    engine: E,
    key: Vec<u8>,
    iv: [u8; 16],
}

impl<E: BlockEngine> core::fmt::Debug for Cfb<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Cfb")
            .field("key", &"[redacted]")
            .field("iv", &"[redacted]")
            .finish()
    }
}

impl<E: BlockEngine> Drop for Cfb<E> {
    fn drop(&mut self) {
        self.key.zeroize();
        self.iv.zeroize();
    }
}

impl<E: BlockEngine> Cfb<E> {
    /// Construct a driver over `engine` with the given key and IV. The key
    /// and IV are copied; `key` must be at least 16 bytes and `iv` must be
    /// exactly [`engine.block_size()`](BlockEngine::block_size) bytes (16
    /// for every engine this crate ships).
    pub fn new(engine: E, key: &[u8], iv: &[u8]) -> Result<Self> {
        if key.len() < 16 {
            return Err(Error::new(ErrorKind::InvalidParameter));
        }
        if iv.len() != 16 {
            return Err(Error::new(ErrorKind::InvalidParameter));
        }

        let mut iv_buf = [0u8; 16];
        iv_buf.copy_from_slice(iv);

        Ok(Self {
            engine,
            key: key.to_vec(),
            iv: iv_buf,
        })
    }

    /// Encrypt `plaintext`, returning a ciphertext of the same length.
    pub fn encrypt(&mut self, plaintext: &[u8]) -> Result<Vec<u8>> {
        if plaintext.is_empty() {
            return Err(Error::new(ErrorKind::InvalidParameter));
        }
        self.run(plaintext, true)
            .map_err(|_| Error::with_context(ErrorKind::CryptoFailure, "encryption failed"))
    }

    /// Decrypt `ciphertext`, returning a plaintext of the same length.
    pub fn decrypt(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.is_empty() {
            return Err(Error::new(ErrorKind::InvalidParameter));
        }
        self.run(ciphertext, false)
            .map_err(|_| Error::with_context(ErrorKind::CryptoFailure, "decryption failed"))
    }

    /// Shared CFB-128 loop. `for_encryption` selects whether `input` is
    /// plaintext (producing ciphertext) or ciphertext (producing
    /// plaintext); in both directions the underlying engine is initialized
    /// for *encryption*, since CFB always drives the block cipher forward.
    fn run(&mut self, input: &[u8], for_encryption: bool) -> Result<Vec<u8>> {
        self.engine.init(true, &self.key)?;

        let mut feedback = self.iv;
        let mut output = Vec::with_capacity(input.len());
        let mut scratch = [0u8; 16];

        for chunk in input.chunks(16) {
            self.engine.process_block(&feedback, 0, &mut scratch, 0)?;

            let start = output.len();
            for (s, i) in scratch.iter().zip(chunk.iter()) {
                output.push(s ^ i);
            }

            let out_block = if for_encryption {
                &output[start..]
            } else {
                chunk
            };
            feedback[..out_block.len()].copy_from_slice(out_block);
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aes::Aes256;
    use hex_literal::hex;

    fn cfb(key: &[u8], iv: &[u8]) -> Cfb<Aes256> {
        Cfb::new(Aes256::default(), key, iv).unwrap()
    }

    #[test]
    fn empty_input_is_rejected() {
        let mut c = cfb(&[0u8; 32], &[0u8; 16]);
        assert!(c.encrypt(&[]).is_err());
        assert!(c.decrypt(&[]).is_err());
    }

    #[test]
    fn round_trip_arbitrary_length() {
        let mut c = cfb(&[0x7cu8; 32], &[0x11u8; 16]);
        let plaintext = b"a CFB stream has no block alignment requirement at all";
        let ciphertext = c.encrypt(plaintext).unwrap();
        assert_eq!(ciphertext.len(), plaintext.len());

        let mut c2 = cfb(&[0x7cu8; 32], &[0x11u8; 16]);
        let recovered = c2.decrypt(&ciphertext).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn short_final_block_length_preserved() {
        let mut c = cfb(&[0x01u8; 32], &[0x02u8; 16]);
        for len in 1..=33 {
            let plaintext = alloc::vec![0xABu8; len];
            let ciphertext = c.encrypt(&plaintext).unwrap();
            assert_eq!(ciphertext.len(), len);
        }
    }

    #[test]
    fn decrypt_uses_forward_transform() {
        // CFB decryption must drive the engine with `for_encryption = true`;
        // verify decrypt(encrypt(p)) == p, which would fail if decrypt used
        // the inverse AES transform instead.
        let key = [0x5Au8; 32];
        let iv = [0x00u8; 16];
        let plaintext = b"forward transform both ways";

        let mut enc = cfb(&key, &iv);
        let ciphertext = enc.encrypt(plaintext).unwrap();

        let mut dec = cfb(&key, &iv);
        let recovered = dec.decrypt(&ciphertext).unwrap();
        assert_eq!(recovered, plaintext);
    }

    // AES-256/CFB128 VarTxt256 KAT.
    #[test]
    fn nist_cfb128_vartxt256() {
        let key = [0u8; 32];
        let iv = hex!("fffe0000000000000000000000000000");
        let plaintext = [0u8; 16];
        let expected = hex!("1569859ea6b7206c30bf4fd0cbfac33c");

        let mut c = Cfb::new(Aes256::default(), &key, &iv).unwrap();
        let ciphertext = c.encrypt(&plaintext).unwrap();
        assert_eq!(ciphertext, expected);
    }

    // AES-256/CFB128 KeySbox256 KAT.
    #[test]
    fn nist_cfb128_keysbox256() {
        let key = hex!("b7a5794d52737475d53d5a377200849be0260a67a2b22ced8bbef12882270d07");
        let iv = [0u8; 16];
        let plaintext = [0u8; 16];
        let expected = hex!("637c31dc2591a07636f646b72daabbe7");

        let mut c = Cfb::new(Aes256::default(), &key, &iv).unwrap();
        let ciphertext = c.encrypt(&plaintext).unwrap();
        assert_eq!(ciphertext, expected);
    }
}
