//! SHA-1/SHA-256/SHA-512 digest helpers.

use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};

#[must_use]
pub fn sha1(data: &[u8]) -> [u8; 20] {
    Sha1::digest(data).into()
}

#[must_use]
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

#[must_use]
pub fn sha512(data: &[u8]) -> [u8; 64] {
    Sha512::digest(data).into()
}

/// Lowercase hex encoding, used for the carrier selector's entropy
/// measure (§ hex entropy) and for building the `auth` tag's ASCII
/// concatenation (hex(challenge) || carrier_index || password).
#[must_use]
pub fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(out, "{byte:02x}").expect("writing to a String cannot fail");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_of_64_zero_bytes_matches_known_digest() {
        // A 64-byte all-zero carrier block hashed with password "abc"
        // reduces to SHA256(64 zero bytes || "abc").
        let mut input = vec![0u8; 64];
        input.extend_from_slice(b"abc");
        let digest = sha256(&input);
        assert_eq!(
            to_hex(&digest),
            "da6d13e08cd1e0a0fa5220c1de798889b57407b56589e8768424cbbcf3a47ebc"
        );
    }

    #[test]
    fn sha1_of_empty_is_known_digest() {
        assert_eq!(
            to_hex(&sha1(b"")),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }

    #[test]
    fn sha512_of_empty_is_known_digest() {
        assert_eq!(
            to_hex(&sha512(b"")),
            "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e"
        );
    }

    #[test]
    fn to_hex_is_lowercase() {
        assert_eq!(to_hex(&[0xAB, 0xCD, 0x01]), "abcd01");
    }
}
