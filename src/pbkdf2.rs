//! PBKDF2 (PKCS #5 v2.0 / RFC 8018) over a generic HMAC primitive.
//!
//! The HMAC construction itself is treated as an external collaborator —
//! this crate depends on the published `hmac`/`sha1`/`digest` crates for it
//! rather than reimplementing HMAC.

use crate::error::{Error, ErrorKind, Result};
use digest::KeyInit;
use hmac::Mac;

/// HMAC-SHA1, the only pseudo-random function this crate's container
/// format uses.
pub type HmacSha1 = hmac::Hmac<sha1::Sha1>;

/// Derive `output.len()` bytes of key material from `password` and
/// `salt` using `rounds` PRF iterations of `M`.
///
/// Rejects an empty passphrase, an empty salt, a zero iteration count, or
/// a zero-length output buffer.
pub fn pbkdf2<M>(password: &[u8], salt: &[u8], rounds: u32, output: &mut [u8]) -> Result<()>
where
    M: Mac + KeyInit + Clone,
{
    if password.is_empty() || salt.is_empty() || rounds == 0 || output.is_empty() {
        return Err(Error::new(ErrorKind::InvalidParameter));
    }

    let h_len = M::output_size();
    let dk_len = output.len();
    let block_count = (dk_len + h_len - 1) / h_len;

    let prf =
        M::new_from_slice(password).map_err(|_| Error::new(ErrorKind::InvalidParameter))?;

    for block_index in 1..=block_count {
        let mut u = {
            let mut mac = prf.clone();
            mac.update(salt);
            mac.update(&(block_index as u32).to_be_bytes());
            mac.finalize().into_bytes()
        };
        let mut t = u.clone();

        for _ in 1..rounds {
            let mut mac = prf.clone();
            mac.update(&u);
            u = mac.finalize().into_bytes();
            for (t_byte, u_byte) in t.iter_mut().zip(u.iter()) {
                *t_byte ^= u_byte;
            }
        }

        let offset = (block_index - 1) * h_len;
        let take = h_len.min(dk_len - offset);
        output[offset..offset + take].copy_from_slice(&t[..take]);
    }

    Ok(())
}

/// Convenience wrapper for PBKDF2-HMAC-SHA1, the scheme this crate's
/// container format uses by default.
pub fn pbkdf2_hmac_sha1(
    password: &[u8],
    salt: &[u8],
    rounds: u32,
    output: &mut [u8],
) -> Result<()> {
    pbkdf2::<HmacSha1>(password, salt, rounds, output)
}

/// A reusable bundle of PBKDF2 parameters: an HMAC algorithm (fixed by the
/// type parameter `M`), a salt, and an iteration count. Parameters may be
/// swapped out between [`get_key`](Pbkdf2Params::get_key) calls by
/// constructing a new [`Pbkdf2Params`].
#[derive(Clone, Debug)]
pub struct Pbkdf2Params<'a> {
    /// Salt bytes; must be non-empty.
    pub salt: &'a [u8],
    /// Iteration count; must be positive.
    pub rounds: u32,
}

impl<'a> Pbkdf2Params<'a> {
    /// Construct a new parameter bundle.
    pub const fn new(salt: &'a [u8], rounds: u32) -> Self {
        Self { salt, rounds }
    }

    /// Derive `output.len()` bytes of key material from `password` using
    /// PRF `M`.
    pub fn get_key<M>(&self, password: &[u8], output: &mut [u8]) -> Result<()>
    where
        M: Mac + KeyInit + Clone,
    {
        pbkdf2::<M>(password, self.salt, self.rounds, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    // RFC 6070 vector 1.
    #[test]
    fn rfc6070_vector1() {
        let mut dk = [0u8; 20];
        pbkdf2_hmac_sha1(b"password", b"salt", 1, &mut dk).unwrap();
        assert_eq!(dk, hex!("0c60c80f961f0e71f3a9b524af6012062fe037a6"));
    }

    // RFC 6070 vector 3.
    #[test]
    fn rfc6070_vector3() {
        let mut dk = [0u8; 20];
        pbkdf2_hmac_sha1(b"password", b"salt", 4096, &mut dk).unwrap();
        assert_eq!(dk, hex!("4b007901b765489abead49d926f721d065a429c1"));
    }

    // RFC 6070 vector 5: 25-byte derived key.
    #[test]
    fn rfc6070_vector5() {
        let mut dk = [0u8; 25];
        pbkdf2_hmac_sha1(
            b"passwordPASSWORDpassword",
            b"saltSALTsaltSALTsaltSALTsaltSALTsalt",
            4096,
            &mut dk,
        )
        .unwrap();
        assert_eq!(
            dk,
            hex!("3d2eec4fe41c849b80c8d83662c0e44a8b291a964cf2f07038")
        );
    }

    #[test]
    fn rejects_empty_password_and_salt_and_zero_rounds() {
        let mut dk = [0u8; 20];
        assert!(pbkdf2_hmac_sha1(b"", b"salt", 1, &mut dk).is_err());
        assert!(pbkdf2_hmac_sha1(b"password", b"", 1, &mut dk).is_err());
        assert!(pbkdf2_hmac_sha1(b"password", b"salt", 0, &mut dk).is_err());
        assert!(pbkdf2_hmac_sha1(b"password", b"salt", 1, &mut []).is_err());
    }
}
