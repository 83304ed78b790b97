//! On-disk container format: header + concatenated blocks, plus the
//! optional sidecar auth file.
//!
//! The codec is oblivious to which block is the carrier; it only knows
//! `chunk_size` and slices the body into equally sized pieces. Locating
//! and reassembling the carrier is the decrypt pipeline's job (see
//! `pipeline::decrypt`).

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::block::BlockStore;
use crate::error::{Error, Result};

const FAST_OFFSET: usize = 0;
const PADDING_OFFSET: usize = 1;
const CHALLENGE_OFFSET: usize = 3;
const HEADER_LEN_SLOW: usize = 23;
const HEADER_LEN_FAST: usize = 87;
const CHALLENGE_LEN: usize = 20;
const AUTH_LEN: usize = 64;

/// Metadata recorded alongside an encrypted container. Present on a
/// [`crate::session::Session`] iff its status is `Encrypted`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Info {
    pub fast: bool,
    pub padding: u16,
    pub challenge: [u8; CHALLENGE_LEN],
    pub auth: Option<[u8; AUTH_LEN]>,
}

fn io_error(err: io::Error, path: &Path) -> Error {
    let path = path.display().to_string();
    match err.kind() {
        io::ErrorKind::NotFound => Error::NotFound(path),
        io::ErrorKind::PermissionDenied => Error::PermDenied(path),
        _ => Error::Malformed(format!("{path}: {err}")),
    }
}

/// Read a plaintext file into `chunk_size`-sized blocks. The last block
/// may be shorter than `chunk_size`; every other block is exactly
/// `chunk_size`.
///
/// # Errors
///
/// [`Error::NotFound`]/[`Error::PermDenied`] per the underlying I/O
/// failure.
pub fn read_plain_file(path: &Path, chunk_size: usize) -> Result<BlockStore> {
    let mut file = File::open(path).map_err(|e| io_error(e, path))?;
    let mut store = BlockStore::new();
    let mut buf = vec![0u8; chunk_size];
    loop {
        let read = read_up_to(&mut file, &mut buf, path)?;
        if read == 0 {
            break;
        }
        store.append(buf[..read].to_vec());
        if read < chunk_size {
            break;
        }
    }
    Ok(store)
}

fn read_up_to(reader: &mut impl Read, buf: &mut [u8], path: &Path) -> Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(io_error(e, path)),
        }
    }
    Ok(total)
}

/// Write every block in order with no header (the plain-file format).
///
/// # Errors
///
/// [`Error::PermDenied`] per the underlying I/O failure.
pub fn write_plain_file(path: &Path, blocks: &BlockStore) -> Result<()> {
    let mut file = File::create(path).map_err(|e| io_error(e, path))?;
    for block in blocks.iter() {
        file.write_all(block).map_err(|e| io_error(e, path))?;
    }
    Ok(())
}

/// Read an encrypted container: header followed by `chunk_size`-sized
/// body blocks. `auth_path`, when given, upgrades a slow-mode container
/// to fast-mode in memory; the sidecar always wins over an absent
/// in-file auth tag.
///
/// # Errors
///
/// [`Error::NotFound`]/[`Error::PermDenied`] on I/O failure,
/// [`Error::Malformed`] if the file is shorter than its header or the
/// body is not a multiple of `chunk_size`.
pub fn read_encrypted_container(
    path: &Path,
    chunk_size: usize,
    auth_path: Option<&Path>,
) -> Result<(Info, BlockStore)> {
    let mut file = File::open(path).map_err(|e| io_error(e, path))?;

    let mut fast_byte = [0u8; 1];
    file.read_exact(&mut fast_byte).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::Malformed(format!("{}: shorter than its header", path.display()))
        } else {
            io_error(e, path)
        }
    })?;
    let mut fast = fast_byte[0] != 0;

    let mut padding_bytes = [0u8; 2];
    read_header_field(&mut file, &mut padding_bytes, path)?;
    let padding = u16::from_le_bytes(padding_bytes);

    let mut challenge = [0u8; CHALLENGE_LEN];
    read_header_field(&mut file, &mut challenge, path)?;

    let mut auth = if fast {
        let mut auth_bytes = [0u8; AUTH_LEN];
        read_header_field(&mut file, &mut auth_bytes, path)?;
        Some(auth_bytes)
    } else {
        None
    };

    // Sidecar upgrade: a slow-mode container read alongside an auth
    // file behaves as if it had been produced in fast mode.
    if let Some(auth_path) = auth_path {
        if !fast {
            let mut auth_bytes = [0u8; AUTH_LEN];
            let mut auth_file = File::open(auth_path).map_err(|e| io_error(e, auth_path))?;
            auth_file
                .read_exact(&mut auth_bytes)
                .map_err(|e| io_error(e, auth_path))?;
            auth = Some(auth_bytes);
            fast = true;
        }
    }

    let mut body = Vec::new();
    file.read_to_end(&mut body).map_err(|e| io_error(e, path))?;
    if body.len() % chunk_size != 0 {
        return Err(Error::Malformed(format!(
            "body length {} is not a multiple of chunk size {chunk_size}",
            body.len()
        )));
    }

    let blocks = body
        .chunks(chunk_size)
        .map(<[u8]>::to_vec)
        .collect::<Vec<_>>();

    Ok((
        Info {
            fast,
            padding,
            challenge,
            auth,
        },
        BlockStore::from_blocks(blocks),
    ))
}

fn read_header_field(file: &mut File, buf: &mut [u8], path: &Path) -> Result<()> {
    file.read_exact(buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::Malformed(format!("{}: shorter than its header", path.display()))
        } else {
            io_error(e, path)
        }
    })
}

/// Write an encrypted container: header (per [`Info`]) followed by
/// every block concatenated in order. The in-header auth tag is written
/// only in fast mode; the bare 64-byte auth sidecar, when `auth_path` is
/// given, is written regardless of mode, since it's also how a slow-mode
/// container gets upgraded to fast later.
///
/// # Errors
///
/// [`Error::PermDenied`] per the underlying I/O failure.
pub fn write_encrypted_container(
    path: &Path,
    info: &Info,
    blocks: &BlockStore,
    auth_path: Option<&Path>,
) -> Result<()> {
    let mut file = File::create(path).map_err(|e| io_error(e, path))?;

    file.write_all(&[u8::from(info.fast)])
        .map_err(|e| io_error(e, path))?;
    file.write_all(&info.padding.to_le_bytes())
        .map_err(|e| io_error(e, path))?;
    file.write_all(&info.challenge)
        .map_err(|e| io_error(e, path))?;
    if info.fast {
        let auth = info
            .auth
            .ok_or_else(|| Error::Malformed("fast mode requires an auth tag".to_string()))?;
        file.write_all(&auth).map_err(|e| io_error(e, path))?;
    }

    for block in blocks.iter() {
        file.write_all(block).map_err(|e| io_error(e, path))?;
    }

    if let Some(auth_path) = auth_path {
        let auth = info
            .auth
            .ok_or_else(|| Error::Malformed("no auth tag to write to sidecar".to_string()))?;
        let mut auth_file = File::create(auth_path).map_err(|e| io_error(e, auth_path))?;
        auth_file
            .write_all(&auth)
            .map_err(|e| io_error(e, auth_path))?;
    }

    Ok(())
}

/// Header length in bytes for a given `fast` flag, per the on-disk
/// layout (23 bytes slow, 87 bytes fast).
#[must_use]
pub fn header_len(fast: bool) -> usize {
    if fast { HEADER_LEN_FAST } else { HEADER_LEN_SLOW }
}
