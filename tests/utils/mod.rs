#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

const GILTZARRAPO: &str = env!("CARGO_BIN_EXE_giltzarrapo");
const TMP_DIR: &str = env!("CARGO_TARGET_TMPDIR");

#[derive(Debug)]
pub struct Output {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Write `content` to a fresh file under the test binary's scratch
/// directory and return its path.
pub fn write_test_file(file_name: &str, content: &[u8]) -> PathBuf {
    let path = Path::new(TMP_DIR).join(file_name);
    std::fs::write(&path, content).unwrap();
    path
}

pub fn scratch_path(file_name: &str) -> PathBuf {
    Path::new(TMP_DIR).join(file_name)
}

pub fn run(args: &[&str]) -> Output {
    let mut command = Command::new(GILTZARRAPO);
    command.env("NO_COLOR", "1");
    command.env_remove("PAGER");

    for arg in args {
        command.arg(arg);
    }

    let output = command.output().unwrap();

    Output {
        exit_code: output.status.code().unwrap(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

pub fn checksum(path: &Path) -> String {
    let payload = std::fs::read(path).unwrap();
    let hash = blake3::hash(&payload);
    // Hexadecimal is nicer to debug than plain bytes.
    hash.to_hex().to_string()
}
