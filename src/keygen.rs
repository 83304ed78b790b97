//! RSA key-pair bootstrap: generate a fresh key pair and write it out as
//! a PEM private/public file pair.
//!
//! Defaults are `giltza_rsa` / `giltza_rsa.pub`, written to the current
//! working directory, unencrypted when no passphrase is given.

use std::fs;
use std::path::{Path, PathBuf};

use crate::crypto::rsa as rsa_adapter;
use crate::error::{Error, Result};

pub const DEFAULT_BITS: usize = 4096;
pub const DEFAULT_NAME: &str = "giltza_rsa";

pub struct KeygenParams {
    pub bits: usize,
    pub dir: PathBuf,
    pub name: String,
    /// Empty means the private key PEM is written unencrypted.
    pub passphrase: String,
}

impl Default for KeygenParams {
    fn default() -> Self {
        Self {
            bits: DEFAULT_BITS,
            dir: PathBuf::from("."),
            name: DEFAULT_NAME.to_string(),
            passphrase: String::new(),
        }
    }
}

/// Generate an RSA key pair and write `<dir>/<name>` (private) and
/// `<dir>/<name>.pub` (public), creating `dir` if it does not exist.
/// Returns the two paths written, private first.
///
/// # Errors
///
/// [`Error::InvalidArg`] if key generation fails, [`Error::PermDenied`]/
/// [`Error::NotFound`] if `dir` cannot be created or the PEM files cannot
/// be written, [`Error::InvalidKey`] if PEM encoding fails.
pub fn generate_rsa_pair(params: &KeygenParams) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(&params.dir).map_err(|e| io_error(e, &params.dir))?;

    let private_key = rsa_adapter::generate_keypair(params.bits)?;
    let public_key = rsa::RsaPublicKey::from(&private_key);

    let private_pem = rsa_adapter::export_private_pem(&private_key, &params.passphrase)?;
    let public_pem = rsa_adapter::export_public_pem(&public_key)?;

    let private_path = params.dir.join(&params.name);
    let public_path = params.dir.join(format!("{}.pub", params.name));

    fs::write(&private_path, private_pem).map_err(|e| io_error(e, &private_path))?;
    fs::write(&public_path, public_pem).map_err(|e| io_error(e, &public_path))?;

    Ok((private_path, public_path))
}

fn io_error(err: std::io::Error, path: &Path) -> Error {
    let path = path.display().to_string();
    match err.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(path),
        std::io::ErrorKind::PermissionDenied => Error::PermDenied(path),
        _ => Error::InvalidArg(format!("{path}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::pkcs8::DecodePublicKey;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("giltzarrapo-keygen-test-{name}-{}", std::process::id()))
    }

    #[test]
    fn writes_unencrypted_pair_by_default() {
        let dir = temp_dir("plain");
        let params = KeygenParams {
            bits: 1024,
            dir: dir.clone(),
            name: "test-key".to_string(),
            passphrase: String::new(),
        };
        let (private_path, public_path) = generate_rsa_pair(&params).unwrap();

        assert_eq!(private_path, dir.join("test-key"));
        assert_eq!(public_path, dir.join("test-key.pub"));

        let public_pem = fs::read_to_string(&public_path).unwrap();
        assert!(rsa::RsaPublicKey::from_public_key_pem(&public_pem).is_ok());

        let private_pem = fs::read_to_string(&private_path).unwrap();
        assert!(!private_pem.contains("ENCRYPTED"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn writes_passphrase_encrypted_private_key() {
        let dir = temp_dir("encrypted");
        let params = KeygenParams {
            bits: 1024,
            dir: dir.clone(),
            name: DEFAULT_NAME.to_string(),
            passphrase: "hunter2".to_string(),
        };
        let (private_path, _) = generate_rsa_pair(&params).unwrap();

        let private_pem = fs::read_to_string(&private_path).unwrap();
        assert!(private_pem.contains("ENCRYPTED PRIVATE KEY"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn creates_missing_directory() {
        let dir = temp_dir("nested").join("a").join("b");
        let params = KeygenParams {
            bits: 1024,
            dir: dir.clone(),
            ..KeygenParams::default()
        };
        assert!(generate_rsa_pair(&params).is_ok());
        assert!(dir.is_dir());

        fs::remove_dir_all(temp_dir("nested")).ok();
    }
}
