//! RSA adapter: PEM import/export and raw (textbook) RSA block
//! encryption.
//!
//! The carrier block is a full `chunk_size`-byte plaintext, which under
//! the spec's `rsa_modulus_bits = 8 * chunk_size` invariant is exactly
//! `modulus_bytes` long — too long to fit PKCS#1 v1.5's
//! `modulus_bytes - 11` ceiling. The scheme instead relies on raw
//! modular exponentiation (`m^e mod n` / `c^d mod n`), the same
//! primitive the original's `PUBkey.encrypt(b, 32)` /
//! `PRIVkey.decrypt(rsa_block)` calls perform, gated here behind the
//! `rsa` crate's `hazmat` module since it carries none of PKCS#1's
//! malleability protections on its own.

use rand::rngs::OsRng;
use rsa::hazmat::{rsa_decrypt, rsa_encrypt};
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};

use crate::error::{Error, Result};

/// Label on the PEM armor of an encrypted PKCS#8 private key, used to
/// tell "wrong passphrase" apart from "not a private key at all".
const ENCRYPTED_PKCS8_LABEL: &str = "ENCRYPTED PRIVATE KEY";

/// A PEM-imported key of unknown-until-inspected kind, mirroring the
/// original `RSA.importKey` which accepts either and leaves the caller
/// to check `has_private()`.
pub enum ImportedKey {
    Public(RsaPublicKey),
    Private(Box<RsaPrivateKey>),
}

/// Parse a PEM document as either an RSA public or private key, trying
/// the modern PKCS#8 encodings before falling back to legacy PKCS#1.
///
/// # Errors
///
/// [`Error::WrongPassphrase`] if the PEM is an encrypted private key and
/// `passphrase` fails to decrypt it. [`Error::InvalidKey`] if the PEM is
/// not a recognizable RSA key at all.
pub fn import_pem(pem: &str, passphrase: &str) -> Result<ImportedKey> {
    if let Ok(key) = RsaPublicKey::from_public_key_pem(pem) {
        return Ok(ImportedKey::Public(key));
    }
    if let Ok(key) = RsaPublicKey::from_pkcs1_pem(pem) {
        return Ok(ImportedKey::Public(key));
    }

    if pem.contains(ENCRYPTED_PKCS8_LABEL) {
        return RsaPrivateKey::from_pkcs8_encrypted_pem(pem, passphrase)
            .map(|key| ImportedKey::Private(Box::new(key)))
            .map_err(|_| Error::WrongPassphrase);
    }

    if let Ok(key) = RsaPrivateKey::from_pkcs8_pem(pem) {
        return Ok(ImportedKey::Private(Box::new(key)));
    }
    if let Ok(key) = RsaPrivateKey::from_pkcs1_pem(pem) {
        return Ok(ImportedKey::Private(Box::new(key)));
    }

    Err(Error::InvalidKey(
        "not a recognizable RSA public or private key PEM".to_string(),
    ))
}

/// Require that `imported` is a public key.
///
/// # Errors
///
/// [`Error::InvalidKey`] if `imported` actually carries private material.
pub fn require_public(imported: ImportedKey) -> Result<RsaPublicKey> {
    match imported {
        ImportedKey::Public(key) => Ok(key),
        ImportedKey::Private(_) => Err(Error::InvalidKey(
            "expected a public key, got a private key".to_string(),
        )),
    }
}

/// Require that `imported` is a private key.
///
/// # Errors
///
/// [`Error::InvalidKey`] if `imported` is actually a public key.
pub fn require_private(imported: ImportedKey) -> Result<RsaPrivateKey> {
    match imported {
        ImportedKey::Private(key) => Ok(*key),
        ImportedKey::Public(_) => Err(Error::InvalidKey(
            "expected a private key, got a public key".to_string(),
        )),
    }
}

/// Generate an RSA key pair of `bits` modulus length.
///
/// # Errors
///
/// Returns [`Error::InvalidArg`] if key generation fails internally
/// (practically unreachable for sane bit lengths, surfaced rather than
/// panicking).
pub fn generate_keypair(bits: usize) -> Result<RsaPrivateKey> {
    RsaPrivateKey::new(&mut OsRng, bits)
        .map_err(|e| Error::InvalidArg(format!("RSA key generation failed: {e}")))
}

/// Export a public key as PKCS#8 SubjectPublicKeyInfo PEM.
///
/// # Errors
///
/// Returns [`Error::InvalidKey`] if PEM encoding fails.
pub fn export_public_pem(key: &RsaPublicKey) -> Result<String> {
    key.to_public_key_pem(LineEnding::LF)
        .map_err(|e| Error::InvalidKey(format!("could not encode public key: {e}")))
}

/// Export a private key as PKCS#8 PEM, passphrase-encrypted when
/// `passphrase` is non-empty (an empty passphrase yields a plain,
/// unencrypted PEM, matching the original `exportKey(passphrase="")`
/// behavior of performing no encryption for an empty string).
///
/// # Errors
///
/// Returns [`Error::InvalidKey`] if PEM encoding fails.
pub fn export_private_pem(key: &RsaPrivateKey, passphrase: &str) -> Result<String> {
    if passphrase.is_empty() {
        return key
            .to_pkcs8_pem(LineEnding::LF)
            .map(|pem| pem.to_string())
            .map_err(|e| Error::InvalidKey(format!("could not encode private key: {e}")));
    }
    key.to_pkcs8_encrypted_pem(&mut OsRng, passphrase, LineEnding::LF)
        .map(|pem| pem.to_string())
        .map_err(|e| Error::InvalidKey(format!("could not encode private key: {e}")))
}

/// Modulus length in bytes (e.g. 512 for a 4096-bit key).
#[must_use]
pub fn modulus_bytes(key: &RsaPublicKey) -> usize {
    key.size()
}

/// Big-endian encoding of `value`, left-zero-padded (or, defensively,
/// truncated from the left) to exactly `len` bytes.
///
/// `BigUint::to_bytes_be` drops leading zero bytes, which raw RSA needs
/// back: every block on the wire is a fixed `len`-byte slot regardless
/// of how many significant bits the integer inside it actually has.
fn uint_to_fixed_be(value: &BigUint, len: usize) -> Vec<u8> {
    let raw = value.to_bytes_be();
    if raw.len() >= len {
        return raw[raw.len() - len..].to_vec();
    }
    let mut out = vec![0u8; len - raw.len()];
    out.extend_from_slice(&raw);
    out
}

/// Raw (textbook) RSA encryption of one block: `c = m^e mod n`.
///
/// `plaintext`, read as a big-endian integer, must be strictly less
/// than the modulus; this is the "input ≥ modulus" failure mode § 4.5
/// describes, and why the entropy selector's retry loop exists. Returns
/// `None` (rather than an `Err`) on that failure: a single candidate
/// failing is an expected, retried outcome of carrier selection, not an
/// error in its own right. See the encrypt pipeline's retry loop.
///
/// On success, the returned ciphertext is exactly `modulus_bytes` long.
#[must_use]
pub fn encrypt_block(key: &RsaPublicKey, plaintext: &[u8]) -> Option<Vec<u8>> {
    let m = BigUint::from_bytes_be(plaintext);
    if m >= *key.n() {
        return None;
    }
    let c = rsa_encrypt(key, &m).ok()?;
    Some(uint_to_fixed_be(&c, key.size()))
}

/// Raw (textbook) RSA decryption of one block: `m = c^d mod n`.
///
/// `plaintext_len` is the original plaintext's length: unlike PKCS#1
/// v1.5, raw RSA carries no framing that records how long the original
/// message was, so the caller must say how many bytes to zero-pad the
/// recovered integer back out to. For the carrier block this is the
/// length of its own ciphertext (`modulus_bytes`, since encryption never
/// shrinks or grows a full block).
///
/// Returns `None` on failure for the same reason as [`encrypt_block`];
/// in practice raw decryption itself essentially never fails (there is
/// no padding to reject), so the carrier-search loop's real filter is
/// the challenge-hash comparison that follows this call.
#[must_use]
pub fn decrypt_block(key: &RsaPrivateKey, ciphertext: &[u8], plaintext_len: usize) -> Option<Vec<u8>> {
    let c = BigUint::from_bytes_be(ciphertext);
    let m = rsa_decrypt(Some(&mut OsRng), key, &c).ok()?;
    Some(uint_to_fixed_be(&m, plaintext_len))
}
