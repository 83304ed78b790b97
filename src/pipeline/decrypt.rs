//! Decrypt pipeline: locate the carrier (fast-path filtered or
//! brute-forced), recover the AES session key, decrypt everything else,
//! strip padding.

use rsa::RsaPrivateKey;
use secrecy::{ExposeSecret, SecretBox};

use crate::block::BlockStore;
use crate::container::Info;
use crate::crypto::{aes, hash, rsa as rsa_adapter};
use crate::error::{Error, Result};

pub struct DecryptParams<'a> {
    pub password: &'a str,
    pub private_key: &'a RsaPrivateKey,
    /// `Some(i)` checks exactly that candidate and never falls back to
    /// brute force; `None` searches every block in order.
    pub carrier: Option<usize>,
}

impl<'a> DecryptParams<'a> {
    #[must_use]
    pub fn new(password: &'a str, private_key: &'a RsaPrivateKey) -> Self {
        Self {
            password,
            private_key,
            carrier: None,
        }
    }
}

fn num_blocks_merged(modulus_bytes: usize, chunk_size: usize) -> usize {
    modulus_bytes.div_ceil(chunk_size)
}

fn auth_tag(challenge: &[u8; 20], carrier: usize, password: &str) -> [u8; 64] {
    let material = format!("{}{carrier}{password}", hash::to_hex(challenge));
    hash::sha512(material.as_bytes())
}

/// Concatenate `count` consecutive blocks starting at `index` without
/// mutating `blocks`, for brute-force candidates that may turn out not
/// to be the carrier.
fn peek_merged(blocks: &BlockStore, index: usize, count: usize) -> Option<Vec<u8>> {
    if index.checked_add(count)? > blocks.len() {
        return None;
    }
    let mut buf = Vec::new();
    for offset in 0..count {
        buf.extend_from_slice(blocks.get(index + offset)?);
    }
    Some(buf)
}

/// Verify a merged ciphertext candidate against `password`/`info`,
/// returning the recovered AES key material (`kaes`) and carrier
/// plaintext on success.
fn try_candidate(
    private_key: &RsaPrivateKey,
    merged: &[u8],
    password: &str,
    challenge: &[u8; 20],
) -> Option<(SecretBox<[u8; 32]>, Vec<u8>)> {
    // The merged span is `num_merge * chunk_size == modulus_bytes` long
    // (the default-config invariant), and raw RSA recovers exactly that
    // many bytes back: the carrier plaintext is the same length as its
    // own ciphertext.
    let carrier_plaintext = rsa_adapter::decrypt_block(private_key, merged, merged.len())?;
    let mut kaes_input = carrier_plaintext.clone();
    kaes_input.extend_from_slice(password.as_bytes());
    let kaes = SecretBox::new(Box::new(hash::sha256(&kaes_input)));
    let signature = hash::sha1(kaes.expose_secret());
    if &signature == challenge {
        Some((kaes, carrier_plaintext))
    } else {
        None
    }
}

/// Run the decrypt pipeline over `blocks` in place, leaving them as
/// plaintext (with the carrier's merged slots collapsed back into one
/// entry) on success.
///
/// # Errors
///
/// - [`Error::InvalidArg`] if an explicit carrier index plus its merge
///   span falls outside `blocks`.
/// - [`Error::VerificationFailed`] if an explicit carrier candidate does
///   not decrypt to something matching `info.challenge`.
/// - [`Error::CarrierNotFound`] if no candidate in a brute-force search
///   matches (wrong password and/or wrong private key).
pub fn decrypt(
    chunk_size: usize,
    blocks: &mut BlockStore,
    info: &Info,
    params: &DecryptParams,
) -> Result<()> {
    let public_key = RsaPublicKeyView::from(params.private_key);
    let num_merge = num_blocks_merged(public_key.modulus_bytes, chunk_size);

    let (carrier, kaes, carrier_plaintext) = if let Some(explicit) = params.carrier {
        let merged = peek_merged(blocks, explicit, num_merge).ok_or_else(|| {
            Error::InvalidArg(format!(
                "carrier index {explicit} (merging {num_merge} block(s)) is out of range"
            ))
        })?;
        let (kaes, plaintext) =
            try_candidate(params.private_key, &merged, params.password, &info.challenge)
                .ok_or(Error::VerificationFailed)?;
        (explicit, kaes, plaintext)
    } else {
        search_carrier(blocks, info, params, num_merge)?
    };

    blocks.merge_range(carrier, num_merge);

    for i in 0..blocks.len() {
        if i == carrier {
            blocks.replace_at(i, carrier_plaintext.clone());
        } else {
            let ciphertext = blocks.get(i).expect("index in range").to_vec();
            let plaintext = aes::decrypt(kaes.expose_secret(), &ciphertext)?;
            blocks.replace_at(i, plaintext);
        }
    }

    let last = blocks.len() - 1;
    let keep = chunk_size - info.padding as usize;
    let last_block = blocks.get(last).expect("non-empty").to_vec();
    if last_block.len() > keep {
        blocks.replace_at(last, last_block[..keep].to_vec());
    }

    Ok(())
}

fn search_carrier(
    blocks: &BlockStore,
    info: &Info,
    params: &DecryptParams,
    num_merge: usize,
) -> Result<(usize, SecretBox<[u8; 32]>, Vec<u8>)> {
    for candidate in 0..blocks.len() {
        if info.fast {
            if let Some(auth) = info.auth {
                let expected = auth_tag(&info.challenge, candidate, params.password);
                if expected != auth {
                    continue;
                }
            }
        }

        let Some(merged) = peek_merged(blocks, candidate, num_merge) else {
            continue;
        };
        if let Some((kaes, plaintext)) =
            try_candidate(params.private_key, &merged, params.password, &info.challenge)
        {
            return Ok((candidate, kaes, plaintext));
        }
    }

    Err(Error::CarrierNotFound)
}

/// Just enough of an `RsaPublicKey` to read the modulus length from a
/// private key without pulling the whole public-key type through every
/// call site.
struct RsaPublicKeyView {
    modulus_bytes: usize,
}

impl From<&RsaPrivateKey> for RsaPublicKeyView {
    fn from(private_key: &RsaPrivateKey) -> Self {
        let public_key = rsa::RsaPublicKey::from(private_key);
        Self {
            modulus_bytes: rsa_adapter::modulus_bytes(&public_key),
        }
    }
}
