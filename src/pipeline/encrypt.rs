//! Encrypt pipeline: pad → select carrier → derive AES key → RSA-encrypt
//! the carrier, AES-encrypt everything else.

use rand::Rng;
use rsa::RsaPublicKey;
use secrecy::{ExposeSecret, SecretBox};

use crate::block::BlockStore;
use crate::container::Info;
use crate::crypto::{aes, hash, rsa as rsa_adapter};
use crate::error::{Error, Result};
use crate::select::{self, DEFAULT_TRY_LIMIT};

/// Default bounded retry budget for automatic carrier re-selection.
pub const DEFAULT_TRY_MAX: u32 = 10;

pub struct EncryptParams<'a> {
    pub password: &'a str,
    pub public_key: &'a RsaPublicKey,
    /// `Some(i)` pins the carrier; `None` lets the entropy selector pick.
    pub carrier: Option<usize>,
    pub fast: bool,
    pub try_max: u32,
    pub try_limit: usize,
}

impl<'a> EncryptParams<'a> {
    #[must_use]
    pub fn new(password: &'a str, public_key: &'a RsaPublicKey) -> Self {
        Self {
            password,
            public_key,
            carrier: None,
            fast: true,
            try_max: DEFAULT_TRY_MAX,
            try_limit: DEFAULT_TRY_LIMIT,
        }
    }
}

fn auth_tag(challenge: &[u8; 20], carrier: usize, password: &str) -> [u8; 64] {
    let material = format!("{}{carrier}{password}", hash::to_hex(challenge));
    hash::sha512(material.as_bytes())
}

/// Run the encrypt pipeline over `blocks` in place, mutating every
/// block to its encrypted form and returning the [`Info`] to be
/// committed alongside.
///
/// # Errors
///
/// - [`Error::InvalidArg`] if `blocks` is empty, the explicit carrier is
///   out of range, or the RSA modulus length is not a multiple of
///   `chunk_size`.
/// - [`Error::CryptoRetriesExhausted`] if no candidate carrier survives
///   RSA encryption within `params.try_max` attempts (or the one
///   explicit candidate fails).
pub fn encrypt<R: Rng + ?Sized>(
    chunk_size: usize,
    blocks: &mut BlockStore,
    params: &EncryptParams,
    rng: &mut R,
) -> Result<Info> {
    if blocks.is_empty() {
        return Err(Error::InvalidArg(
            "cannot encrypt an empty file: no block to choose as carrier".to_string(),
        ));
    }

    let modulus_bytes = rsa_adapter::modulus_bytes(params.public_key);
    if modulus_bytes % chunk_size != 0 {
        return Err(Error::InvalidArg(format!(
            "RSA modulus length ({modulus_bytes} bytes) must be a multiple of chunk_size ({chunk_size})"
        )));
    }

    if let Some(explicit) = params.carrier {
        if explicit >= blocks.len() {
            return Err(Error::InvalidArg(format!(
                "carrier index {explicit} must be < {}",
                blocks.len()
            )));
        }
    }

    let last_index = blocks.len() - 1;
    let original_last_block = blocks.get(last_index).expect("non-empty").to_vec();

    let mut attempts_left = params.try_max.max(1);

    loop {
        // Roll back any padding appended by a previous failed attempt
        // before selecting (and possibly re-padding) again.
        blocks.replace_at(last_index, original_last_block.clone());

        let carrier = match params.carrier {
            Some(explicit) => explicit,
            None => select::select_carrier(blocks, params.try_limit, rng),
        };

        let padding = u16::try_from(chunk_size - original_last_block.len())
            .expect("chunk_size fits in u16 per the power-of-two constructor guard");
        if padding > 0 {
            let mut padded = original_last_block.clone();
            padded.extend(crate::crypto::random::random_bytes(padding as usize));
            blocks.replace_at(last_index, padded);
        }

        let carrier_plaintext = blocks.get(carrier).expect("carrier in range").to_vec();

        match rsa_adapter::encrypt_block(params.public_key, &carrier_plaintext) {
            Some(carrier_ciphertext) => {
                let mut kaes_input = carrier_plaintext.clone();
                kaes_input.extend_from_slice(params.password.as_bytes());
                // Kept off the heap as a plain `[u8; 32]` for only as
                // long as it takes to derive it; from here on it only
                // exists behind `SecretBox`, zeroized on drop.
                let kaes = SecretBox::new(Box::new(hash::sha256(&kaes_input)));
                let challenge = hash::sha1(kaes.expose_secret());
                let auth = auth_tag(&challenge, carrier, params.password);

                for i in 0..blocks.len() {
                    if i == carrier {
                        blocks.replace_at(i, carrier_ciphertext.clone());
                    } else {
                        let plaintext = blocks.get(i).expect("index in range").to_vec();
                        let ciphertext = aes::encrypt(kaes.expose_secret(), &plaintext)?;
                        blocks.replace_at(i, ciphertext);
                    }
                }

                return Ok(Info {
                    fast: params.fast,
                    padding,
                    challenge,
                    // Always retained: `write_encrypted_container` only
                    // puts it in the on-disk header when `fast`, but a
                    // slow-mode container still needs it available to
                    // write to an `--auth-out` sidecar.
                    auth: Some(auth),
                });
            }
            None => {
                if params.carrier.is_some() {
                    // No silent substitution for an explicit carrier.
                    return Err(Error::CryptoRetriesExhausted);
                }
                attempts_left -= 1;
                if attempts_left == 0 {
                    return Err(Error::CryptoRetriesExhausted);
                }
            }
        }
    }
}
