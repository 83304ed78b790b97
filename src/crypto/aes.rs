//! AES-ECB adapter.
//!
//! Every non-carrier block is encrypted independently under the same
//! session key, with no chaining between blocks. The mode is pinned
//! explicitly in both directions; there is no implicit library default
//! to lean on here.

use aes::{Aes128, Aes256};
use ecb::cipher::{BlockDecryptMut, BlockEncryptMut, KeyInit, block_padding::NoPadding};

use crate::error::{Error, Result};

type Aes128EcbEnc = ecb::Encryptor<Aes128>;
type Aes128EcbDec = ecb::Decryptor<Aes128>;
type Aes256EcbEnc = ecb::Encryptor<Aes256>;
type Aes256EcbDec = ecb::Decryptor<Aes256>;

/// Encrypt `plaintext` with AES-ECB under `key`.
///
/// `key` must be 16 bytes (AES-128) or 32 bytes (AES-256); `plaintext`
/// must be a multiple of the 16-byte AES block size (Giltzarrapo always
/// hands this full, already-padded `chunk_size` blocks, so there is no
/// implicit padding here).
///
/// # Errors
///
/// Returns [`Error::InvalidKey`] for any other key length, or
/// [`Error::InvalidArg`] if `plaintext` is not block-aligned.
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    if plaintext.len() % 16 != 0 {
        return Err(Error::InvalidArg(
            "AES-ECB input must be a multiple of the 16-byte block size".to_string(),
        ));
    }
    match key.len() {
        16 => Ok(Aes128EcbEnc::new(key.into()).encrypt_padded_vec_mut::<NoPadding>(plaintext)),
        32 => Ok(Aes256EcbEnc::new(key.into()).encrypt_padded_vec_mut::<NoPadding>(plaintext)),
        other => Err(Error::InvalidKey(format!(
            "AES key must be 16 or 32 bytes, got {other}"
        ))),
    }
}

/// Decrypt `ciphertext` with AES-ECB under `key`. See [`encrypt`] for
/// the key-length and block-alignment requirements.
///
/// # Errors
///
/// Returns [`Error::InvalidKey`] for an unsupported key length, or
/// [`Error::Malformed`] if `ciphertext` is not block-aligned.
pub fn decrypt(key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    if ciphertext.len() % 16 != 0 {
        return Err(Error::Malformed(
            "AES-ECB input is not a multiple of the 16-byte block size".to_string(),
        ));
    }
    match key.len() {
        16 => Aes128EcbDec::new(key.into())
            .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
            .map_err(|_| Error::Malformed("AES-ECB decryption failed".to_string())),
        32 => Aes256EcbDec::new(key.into())
            .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
            .map_err(|_| Error::Malformed("AES-ECB decryption failed".to_string())),
        other => Err(Error::InvalidKey(format!(
            "AES key must be 16 or 32 bytes, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aes256_roundtrip() {
        let key = [0u8; 32];
        let plaintext = [0x41u8; 64];
        let ciphertext = encrypt(&key, &plaintext).unwrap();
        assert_eq!(ciphertext.len(), plaintext.len());
        assert_ne!(ciphertext, plaintext);
        let decrypted = decrypt(&key, &ciphertext).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn aes128_roundtrip() {
        let key = [7u8; 16];
        let plaintext = [0x99u8; 32];
        let ciphertext = encrypt(&key, &plaintext).unwrap();
        let decrypted = decrypt(&key, &ciphertext).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn same_plaintext_block_repeats_under_ecb() {
        // ECB has no chaining; lock that in so nobody "fixes" it into a
        // different mode by accident.
        let key = [3u8; 32];
        let plaintext = [5u8; 32]; // two identical 16-byte blocks
        let ciphertext = encrypt(&key, &plaintext).unwrap();
        assert_eq!(ciphertext[..16], ciphertext[16..]);
    }

    #[test]
    fn wrong_key_length_is_rejected() {
        assert!(matches!(
            encrypt(&[0u8; 24], &[0u8; 16]),
            Err(Error::InvalidKey(_))
        ));
    }

    #[test]
    fn unaligned_plaintext_is_rejected() {
        assert!(matches!(
            encrypt(&[0u8; 32], &[0u8; 15]),
            Err(Error::InvalidArg(_))
        ));
    }
}
