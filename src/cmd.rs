pub mod cli;
pub mod ui;

use std::path::{Path, PathBuf};
use std::time::Instant;

use giltzarrapo::keygen::{self, KeygenParams};
use giltzarrapo::session::{EncryptOptions, Session};

use cli::{DecryptArgs, EncryptArgs, GenKeyArgs};
use ui::color::Color;

const DEFAULT_CHUNK_SIZE: usize = 512;

/// Expand a leading `~` against the current user's home directory. Not
/// the library's job (see [`keygen::generate_rsa_pair`]'s docs); this is
/// purely a CLI convenience.
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        if rest.is_empty() || rest.starts_with('/') {
            if let Ok(home) = std::env::var("HOME") {
                return PathBuf::from(home).join(rest.trim_start_matches('/'));
            }
        }
    }
    PathBuf::from(path)
}

fn fail(message: &str) -> i32 {
    eprintln!("{}", Color::error(&format!("error: {message}")));
    1
}

fn required<'a>(value: &'a Option<String>, flag: &str) -> Result<&'a str, i32> {
    value.as_deref().ok_or_else(|| fail(&format!("{flag} is required")))
}

pub fn genkey(args: &GenKeyArgs) -> Result<(), i32> {
    let dir = args.dir.as_deref().map_or_else(|| PathBuf::from("."), expand_tilde);
    let params = KeygenParams {
        bits: args.bits.unwrap_or(keygen::DEFAULT_BITS),
        dir,
        name: args.name.clone().unwrap_or_else(|| keygen::DEFAULT_NAME.to_string()),
        passphrase: args.passphrase.clone().unwrap_or_default(),
    };

    let started = Instant::now();
    let (private_path, public_path) =
        Session::generate_rsa_pair(&params).map_err(|e| fail(&e.to_string()))?;
    println!(
        "{} {} and {} ({:.2?})",
        Color::none("Generated"),
        private_path.display(),
        public_path.display(),
        started.elapsed()
    );
    Ok(())
}

pub fn encrypt(args: &EncryptArgs) -> Result<(), i32> {
    let password = required(&args.password, "--password")?;
    let pubkey = required(&args.pubkey, "--pubkey")?;
    let input = required(&args.input, "--in")?;
    let output = required(&args.output, "--out")?;

    let chunk_size = args.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE);
    let mut options = EncryptOptions {
        carrier: args.carrier,
        fast: !args.slow,
        ..EncryptOptions::default()
    };
    if let Some(try_max) = args.try_max {
        options.try_max = try_max;
    }

    let started = Instant::now();
    let mut session = Session::new(chunk_size).map_err(|e| fail(&e.to_string()))?;
    session
        .read_plain(Path::new(input))
        .map_err(|e| fail(&e.to_string()))?;
    session
        .encrypt(password, Path::new(pubkey), &options)
        .map_err(|e| fail(&e.to_string()))?;
    session
        .save(Path::new(output), args.auth_out.as_deref().map(Path::new))
        .map_err(|e| fail(&e.to_string()))?;

    println!("{} {output} ({:.2?})", Color::none("Encrypted"), started.elapsed());
    Ok(())
}

pub fn decrypt(args: &DecryptArgs) -> Result<(), i32> {
    let password = required(&args.password, "--password")?;
    let privkey = required(&args.privkey, "--privkey")?;
    let input = required(&args.input, "--in")?;
    let output = required(&args.output, "--out")?;
    let passphrase = args.passphrase.as_deref().unwrap_or("");
    let chunk_size = args.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE);

    let started = Instant::now();
    let mut session = Session::new(chunk_size).map_err(|e| fail(&e.to_string()))?;
    session
        .read_encrypted(Path::new(input), args.auth_in.as_deref().map(Path::new))
        .map_err(|e| fail(&e.to_string()))?;
    session
        .decrypt(password, Path::new(privkey), passphrase, args.carrier)
        .map_err(|e| fail(&e.to_string()))?;
    session
        .save(Path::new(output), None)
        .map_err(|e| fail(&e.to_string()))?;

    println!("{} {output} ({:.2?})", Color::none("Decrypted"), started.elapsed());
    Ok(())
}
