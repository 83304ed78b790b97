use std::fmt;

/// Error kinds surfaced by session operations.
///
/// Mirrors the taxonomy in the container/pipeline design: every failure
/// mode a caller can hit is named here, rather than bubbling up raw I/O
/// or crypto-library error types.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// `chunk_size`/`bits` not a power of two, out-of-range carrier
    /// index, empty plaintext, or a `chunk_size` that does not evenly
    /// divide the RSA modulus length.
    InvalidArg(String),
    /// Missing input file.
    NotFound(String),
    /// Filesystem permission failure on read or write.
    PermDenied(String),
    /// Encrypted container shorter than its header, or body not a
    /// multiple of `chunk_size`.
    Malformed(String),
    /// PEM parse failure, or private key supplied where public was
    /// required (or vice versa).
    InvalidKey(String),
    /// PEM passphrase was wrong, or required and not given.
    WrongPassphrase,
    /// No candidate carrier passed RSA encryption within `try_max`
    /// attempts.
    CryptoRetriesExhausted,
    /// Decrypt could not locate a block matching `challenge`.
    CarrierNotFound,
    /// Explicit carrier index given, but its hash does not match
    /// `challenge`.
    VerificationFailed,
    /// Operation called from an incompatible session state.
    BadState(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArg(reason) => write!(f, "Invalid argument: {reason}."),
            Self::NotFound(path) => write!(f, "No such file or directory: {path}."),
            Self::PermDenied(path) => write!(f, "Permission denied: {path}."),
            Self::Malformed(reason) => write!(f, "Malformed container: {reason}."),
            Self::InvalidKey(reason) => write!(f, "Invalid key: {reason}."),
            Self::WrongPassphrase => write!(f, "Wrong or required passphrase."),
            Self::CryptoRetriesExhausted => write!(
                f,
                "Could not find a carrier block that survives RSA encryption within the retry budget."
            ),
            Self::CarrierNotFound => write!(
                f,
                "\
Could not locate the carrier block.
You are likely using the wrong password and/or the wrong private key."
            ),
            Self::VerificationFailed => {
                write!(f, "Wrong selected block or wrong password.")
            }
            Self::BadState(reason) => write!(f, "{reason}"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
