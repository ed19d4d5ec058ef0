//! The container façade: composes AES-256/CFB128, the DER codec and HMAC
//! into encrypt-then-MAC containers.

use crate::aes::Aes256;
use crate::cfb::Cfb;
use crate::der::{DerDecoder, DerEncoder};
use crate::error::{Error, ErrorKind, Result};
use crate::pbkdf2::{pbkdf2_hmac_sha1, HmacSha1};
use crate::{
    CIPHER_BLOCK_SIZE, DEFAULT_PBKDF2_ITERATIONS, DEFAULT_PBKDF2_SALT, KEY_SIZE,
    RECOMMENDED_SALT_SIZE,
};
use alloc::vec::Vec;
use digest::KeyInit;
use hmac::Mac;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// An authenticated, encrypted container: encrypt-then-MAC-over-plaintext,
/// DER-encoded as `SEQUENCE { version INTEGER, cipherText OCTET STRING,
/// hmac OCTET STRING }`.
///
/// The MAC is computed over the **plaintext**, not the ciphertext — an
/// inherited property of the format this crate is compatible with, not an
/// endorsement of encrypt-and-MAC over encrypt-then-MAC.
pub struct Container {
    key: [u8; KEY_SIZE],
    iv: [u8; CIPHER_BLOCK_SIZE],
    hmac_salt: Vec<u8>,
}

impl core::fmt::Debug for Container {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Container")
            .field("key", &"[redacted]")
            .field("iv", &"[redacted]")
            .field("hmac_salt", &"[redacted]")
            .finish()
    }
}

impl Drop for Container {
    fn drop(&mut self) {
        self.key.zeroize();
        self.iv.zeroize();
        self.hmac_salt.zeroize();
    }
}

impl Container {
    /// Construct a container from an explicit key, IV and HMAC salt. All
    /// three are copied defensively; the caller may zero its own buffers
    /// immediately after this call returns.
    pub fn new(key: &[u8; KEY_SIZE], iv: &[u8; CIPHER_BLOCK_SIZE], hmac_salt: &[u8]) -> Result<Self> {
        if hmac_salt.is_empty() {
            return Err(Error::new(ErrorKind::InvalidParameter));
        }
        Ok(Self {
            key: *key,
            iv: *iv,
            hmac_salt: hmac_salt.to_vec(),
        })
    }

    /// Construct a container by carving a single key-material buffer as
    /// `[0..32) -> key`, `[32..48) -> iv`, `[48..) -> hmac salt`. The salt
    /// must be at least 1 byte, so `key_material` must be at least 49
    /// bytes long.
    pub fn from_key_material(key_material: &[u8]) -> Result<Self> {
        if key_material.len() < KEY_SIZE + CIPHER_BLOCK_SIZE + 1 {
            return Err(Error::new(ErrorKind::InvalidParameter));
        }

        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(&key_material[..KEY_SIZE]);

        let mut iv = [0u8; CIPHER_BLOCK_SIZE];
        iv.copy_from_slice(&key_material[KEY_SIZE..KEY_SIZE + CIPHER_BLOCK_SIZE]);

        let hmac_salt = key_material[KEY_SIZE + CIPHER_BLOCK_SIZE..].to_vec();

        Ok(Self { key, iv, hmac_salt })
    }

    /// Construct a container from a passphrase alone, stretching it into
    /// key material with this crate's built-in PBKDF2-HMAC-SHA1 defaults
    /// (`DEFAULT_PBKDF2_ITERATIONS` rounds, `DEFAULT_PBKDF2_SALT`) — the
    /// "façade used without explicit parameters" path. The derived key
    /// material is carved exactly as in
    /// [`from_key_material`](Container::from_key_material) and the
    /// intermediate buffer is zeroed before this function returns.
    pub fn from_passphrase(passphrase: &[u8]) -> Result<Self> {
        let mut key_material = [0u8; KEY_SIZE + CIPHER_BLOCK_SIZE + RECOMMENDED_SALT_SIZE];
        pbkdf2_hmac_sha1(
            passphrase,
            &DEFAULT_PBKDF2_SALT,
            DEFAULT_PBKDF2_ITERATIONS,
            &mut key_material,
        )?;
        let container = Self::from_key_material(&key_material);
        key_material.zeroize();
        container
    }

    /// Encrypt `plaintext` and DER-encode the result as a container blob.
    pub fn encode(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let ciphertext = self.cfb()?.encrypt(plaintext)?;
        let tag = self.hmac(plaintext)?;

        let mut encoder = DerEncoder::new();
        encoder.append_int(0);
        encoder.append_octet_string(Some(&ciphertext));
        encoder.append_octet_string(Some(&tag));
        encoder.encode()
    }

    /// Parse `blob` as a container, verify its HMAC tag, and return the
    /// recovered plaintext.
    pub fn decode(&self, blob: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = DerDecoder::new(blob);

        let (seq_start, seq_len) = decoder.parse_sequence()?;
        if seq_start + seq_len != blob.len() {
            return Err(Error::new(ErrorKind::MalformedDer));
        }

        let version_range = decoder.parse_integer()?;
        if decoder.to_int(version_range)? != 0 {
            return Err(Error::new(ErrorKind::MalformedDer));
        }

        let ciphertext_range = decoder.parse_octet_string()?;
        let ciphertext = decoder.to_byte_array(ciphertext_range)?;

        let tag_range = decoder.parse_octet_string()?;
        let stored_tag = decoder.to_byte_array(tag_range)?;

        if decoder.position() != seq_start + seq_len {
            return Err(Error::new(ErrorKind::MalformedDer));
        }

        let plaintext = self.cfb()?.decrypt(&ciphertext)?;
        let computed_tag = self.hmac(&plaintext)?;

        if computed_tag.ct_eq(&stored_tag).unwrap_u8() != 1 {
            return Err(Error::new(ErrorKind::IntegrityFailure));
        }

        Ok(plaintext)
    }

    /// Overwrite the key and IV copies with zero. Idempotent; the same
    /// wipe also happens automatically on drop.
    pub fn destroy(&mut self) {
        self.key.zeroize();
        self.iv.zeroize();
        self.hmac_salt.zeroize();
    }

    fn cfb(&self) -> Result<Cfb<Aes256>> {
        Cfb::new(Aes256::default(), &self.key, &self.iv)
    }

    fn hmac(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut mac = HmacSha1::new_from_slice(&self.hmac_salt)
            .map_err(|_| Error::new(ErrorKind::InvalidParameter))?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container() -> Container {
        Container::new(&[0x11u8; KEY_SIZE], &[0x22u8; CIPHER_BLOCK_SIZE], b"test-salt").unwrap()
    }

    #[test]
    fn round_trip() {
        let c = container();
        let plaintext = b"store me encrypted and authenticated";
        let blob = c.encode(plaintext).unwrap();
        let recovered = c.decode(&blob).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn tampered_tag_fails_integrity_check() {
        let c = container();
        let mut blob = c.encode(b"super secret payload").unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0x01; // flip a bit inside the trailing HMAC tag
        assert_eq!(c.decode(&blob).unwrap_err().kind(), ErrorKind::IntegrityFailure);
    }

    #[test]
    fn flipped_ciphertext_bit_fails_integrity_check() {
        let c = container();
        let mut blob = c.encode(b"super secret payload, somewhat longer").unwrap();
        // The ciphertext octet string starts right after the SEQUENCE and
        // INTEGER headers; flip a bit well inside it.
        blob[10] ^= 0x01;
        assert_eq!(c.decode(&blob).unwrap_err().kind(), ErrorKind::IntegrityFailure);
    }

    #[test]
    fn non_zero_version_is_rejected() {
        let c = container();
        let mut encoder = DerEncoder::new();
        encoder.append_int(1);
        encoder.append_octet_string(Some(b"whatever"));
        encoder.append_octet_string(Some(b"whatever-tag-20-byte"));
        let blob = encoder.encode().unwrap();
        assert_eq!(c.decode(&blob).unwrap_err().kind(), ErrorKind::MalformedDer);
    }

    #[test]
    fn trailing_bytes_after_sequence_are_rejected() {
        let c = container();
        let mut blob = c.encode(b"trailing bytes test").unwrap();
        blob.push(0x00);
        assert_eq!(c.decode(&blob).unwrap_err().kind(), ErrorKind::MalformedDer);
    }

    #[test]
    fn from_key_material_carves_key_iv_and_salt() {
        let mut material = alloc::vec![0u8; KEY_SIZE + CIPHER_BLOCK_SIZE + 8];
        for (i, byte) in material.iter_mut().enumerate() {
            *byte = i as u8;
        }
        let c = Container::from_key_material(&material).unwrap();
        let blob = c.encode(b"carved key material works").unwrap();
        assert_eq!(c.decode(&blob).unwrap(), b"carved key material works");
    }

    #[test]
    fn from_key_material_rejects_short_buffers() {
        let material = alloc::vec![0u8; KEY_SIZE + CIPHER_BLOCK_SIZE];
        assert!(Container::from_key_material(&material).is_err());
    }

    #[test]
    fn rejects_empty_hmac_salt() {
        assert!(Container::new(&[0u8; KEY_SIZE], &[0u8; CIPHER_BLOCK_SIZE], b"").is_err());
    }

    #[test]
    fn from_passphrase_round_trips_using_built_in_pbkdf2_defaults() {
        let c = Container::from_passphrase(b"correct horse battery staple").unwrap();
        let plaintext = b"derived entirely from a passphrase";
        let blob = c.encode(plaintext).unwrap();
        assert_eq!(c.decode(&blob).unwrap(), plaintext);
    }

    #[test]
    fn from_passphrase_is_deterministic_for_the_same_passphrase() {
        let a = Container::from_passphrase(b"shared passphrase").unwrap();
        let b = Container::from_passphrase(b"shared passphrase").unwrap();

        let blob = a.encode(b"same key material both times").unwrap();
        assert_eq!(b.decode(&blob).unwrap(), b"same key material both times");
    }

    #[test]
    fn from_passphrase_differs_between_passphrases() {
        let a = Container::from_passphrase(b"passphrase-one").unwrap();
        let b = Container::from_passphrase(b"passphrase-two").unwrap();

        let blob = a.encode(b"only a's key should decode this").unwrap();
        assert!(b.decode(&blob).is_err());
    }
}
