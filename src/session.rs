//! The public façade: a `Session` state machine wiring together the
//! block store, container codec, and encrypt/decrypt pipelines.

use std::fs;
use std::path::Path;

use rand::rngs::OsRng;

use crate::block::BlockStore;
use crate::container::{self, Info};
use crate::crypto::rsa as rsa_adapter;
use crate::error::{Error, Result};
use crate::pipeline::decrypt::{self, DecryptParams};
use crate::pipeline::encrypt::{self, DEFAULT_TRY_MAX, EncryptParams};
use crate::select::DEFAULT_TRY_LIMIT;

/// The three states a [`Session`] can be in. `info` is only reachable
/// through the `Encrypted` variant's accompanying value, eliminating the
/// `if status is None` guards the original carried at every call site.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    Unset,
    Plain,
    Encrypted,
}

/// Tuning knobs for [`Session::encrypt`]: an optional explicit carrier
/// index, fast/slow mode, and the bounded retry budgets for carrier
/// selection and RSA encryption attempts.
pub struct EncryptOptions {
    pub carrier: Option<usize>,
    pub fast: bool,
    pub try_max: u32,
    pub try_limit: usize,
}

impl Default for EncryptOptions {
    fn default() -> Self {
        Self {
            carrier: None,
            fast: true,
            try_max: DEFAULT_TRY_MAX,
            try_limit: DEFAULT_TRY_LIMIT,
        }
    }
}

pub struct Session {
    chunk_size: usize,
    status: Status,
    blocks: BlockStore,
    info: Option<Info>,
}

fn is_power_of_two(n: usize) -> bool {
    n > 0 && (n & (n - 1)) == 0
}

fn read_pem(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        let display = path.display().to_string();
        match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(display),
            std::io::ErrorKind::PermissionDenied => Error::PermDenied(display),
            _ => Error::InvalidKey(format!("{display}: {e}")),
        }
    })
}

impl Session {
    /// # Errors
    ///
    /// [`Error::InvalidArg`] if `chunk_size` is not a power of two.
    pub fn new(chunk_size: usize) -> Result<Self> {
        if !is_power_of_two(chunk_size) {
            return Err(Error::InvalidArg(format!(
                "chunk_size ({chunk_size}) must be a power of two"
            )));
        }
        Ok(Self {
            chunk_size,
            status: Status::Unset,
            blocks: BlockStore::new(),
            info: None,
        })
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    #[must_use]
    pub fn info(&self) -> Option<&Info> {
        self.info.as_ref()
    }

    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Load a plaintext file, chunking it into `chunk_size` blocks.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`]/[`Error::PermDenied`] per the underlying read.
    pub fn read_plain(&mut self, path: &Path) -> Result<&mut Self> {
        self.blocks = container::read_plain_file(path, self.chunk_size)?;
        self.info = None;
        self.status = Status::Plain;
        Ok(self)
    }

    /// Load an encrypted container, optionally upgrading it with a
    /// sidecar auth file.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`]/[`Error::PermDenied`]/[`Error::Malformed`] per
    /// the underlying read.
    pub fn read_encrypted(&mut self, path: &Path, auth_path: Option<&Path>) -> Result<&mut Self> {
        let (info, blocks) = container::read_encrypted_container(path, self.chunk_size, auth_path)?;
        self.blocks = blocks;
        self.info = Some(info);
        self.status = Status::Encrypted;
        Ok(self)
    }

    /// Encrypt the currently loaded plaintext in place.
    ///
    /// # Errors
    ///
    /// [`Error::BadState`] if the session is not `Plain`.
    /// [`Error::InvalidKey`]/[`Error::NotFound`]/[`Error::PermDenied`] if
    /// `pub_key_path` cannot be read and parsed as an RSA public key.
    /// [`Error::InvalidArg`]/[`Error::CryptoRetriesExhausted`] per the
    /// encrypt pipeline (see [`crate::pipeline::encrypt::encrypt`]).
    pub fn encrypt(
        &mut self,
        password: &str,
        pub_key_path: &Path,
        options: &EncryptOptions,
    ) -> Result<&mut Self> {
        if self.status != Status::Plain {
            return Err(Error::BadState(
                "encrypt requires a plain session; call read_plain first".to_string(),
            ));
        }

        let pem = read_pem(pub_key_path)?;
        let public_key = rsa_adapter::require_public(rsa_adapter::import_pem(&pem, "")?)?;

        let mut params = EncryptParams::new(password, &public_key);
        params.carrier = options.carrier;
        params.fast = options.fast;
        params.try_max = options.try_max;
        params.try_limit = options.try_limit;

        let info = encrypt::encrypt(self.chunk_size, &mut self.blocks, &params, &mut OsRng)?;
        self.info = Some(info);
        self.status = Status::Encrypted;
        Ok(self)
    }

    /// Decrypt the currently loaded ciphertext in place.
    ///
    /// # Errors
    ///
    /// [`Error::BadState`] if the session is not `Encrypted`.
    /// [`Error::InvalidKey`]/[`Error::WrongPassphrase`]/
    /// [`Error::NotFound`]/[`Error::PermDenied`] if `priv_key_path`
    /// cannot be read and parsed. [`Error::CarrierNotFound`]/
    /// [`Error::VerificationFailed`] per the decrypt pipeline (see
    /// [`crate::pipeline::decrypt::decrypt`]).
    pub fn decrypt(
        &mut self,
        password: &str,
        priv_key_path: &Path,
        passphrase: &str,
        carrier: Option<usize>,
    ) -> Result<&mut Self> {
        if self.status != Status::Encrypted {
            return Err(Error::BadState(
                "decrypt requires an encrypted session; call read_encrypted first".to_string(),
            ));
        }
        let info = self
            .info
            .clone()
            .expect("status Encrypted implies info is Some");

        let pem = read_pem(priv_key_path)?;
        let private_key = rsa_adapter::require_private(rsa_adapter::import_pem(&pem, passphrase)?)?;

        let mut params = DecryptParams::new(password, &private_key);
        params.carrier = carrier;

        decrypt::decrypt(self.chunk_size, &mut self.blocks, &info, &params)?;
        self.info = None;
        self.status = Status::Plain;
        Ok(self)
    }

    /// Write the session's current content to disk: raw concatenation
    /// when `Plain`, header-prefixed container (plus optional sidecar)
    /// when `Encrypted`.
    ///
    /// # Errors
    ///
    /// [`Error::BadState`] if the session is `Unset`.
    /// [`Error::PermDenied`] per the underlying write.
    pub fn save(&self, out_path: &Path, auth_path: Option<&Path>) -> Result<()> {
        match self.status {
            Status::Unset => Err(Error::BadState(
                "nothing to save: session is unset".to_string(),
            )),
            Status::Plain => container::write_plain_file(out_path, &self.blocks),
            Status::Encrypted => {
                let info = self
                    .info
                    .as_ref()
                    .expect("status Encrypted implies info is Some");
                container::write_encrypted_container(out_path, info, &self.blocks, auth_path)
            }
        }
    }

    /// Discard all loaded content, returning the session to `Unset`.
    pub fn clear(&mut self) -> &mut Self {
        self.blocks = BlockStore::new();
        self.info = None;
        self.status = Status::Unset;
        self
    }

    /// Generate and write a fresh RSA key pair. Static, independent of
    /// any session instance.
    ///
    /// # Errors
    ///
    /// See [`crate::keygen::generate_rsa_pair`].
    pub fn generate_rsa_pair(
        params: &crate::keygen::KeygenParams,
    ) -> Result<(std::path::PathBuf, std::path::PathBuf)> {
        crate::keygen::generate_rsa_pair(params)
    }
}
