mod utils;

use std::path::Path;

use utils::{checksum, run, scratch_path, write_test_file};

fn genkey(name: &str) -> (String, String) {
    let dir = scratch_path(&format!("{name}-keys"));
    let output = run(&[
        "genkey",
        "--dir",
        &dir.to_string_lossy(),
        "--name",
        "k",
        "--bits",
        "1024",
    ]);
    dbg!(&output);
    assert_eq!(output.exit_code, 0);

    let privkey = dir.join("k").to_string_lossy().to_string();
    let pubkey = dir.join("k.pub").to_string_lossy().to_string();
    assert!(Path::new(&privkey).exists());
    assert!(Path::new(&pubkey).exists());
    (privkey, pubkey)
}

#[test]
fn genkey_writes_a_usable_unencrypted_key_pair() {
    let (privkey, pubkey) = genkey("genkey-plain");
    let private_pem = std::fs::read_to_string(&privkey).unwrap();
    let public_pem = std::fs::read_to_string(&pubkey).unwrap();
    assert!(private_pem.contains("PRIVATE KEY"));
    assert!(!private_pem.contains("ENCRYPTED"));
    assert!(public_pem.contains("PUBLIC KEY"));
}

#[test]
fn genkey_with_passphrase_encrypts_the_private_key() {
    let dir = scratch_path("genkey-encrypted-keys");
    let output = run(&[
        "genkey",
        "--dir",
        &dir.to_string_lossy(),
        "--bits",
        "1024",
        "--passphrase",
        "s3cr3t",
    ]);
    dbg!(&output);
    assert_eq!(output.exit_code, 0);

    let private_pem = std::fs::read_to_string(dir.join("giltza_rsa")).unwrap();
    assert!(private_pem.contains("ENCRYPTED PRIVATE KEY"));
}

#[test]
fn encrypt_decrypt_round_trip() {
    let (privkey, pubkey) = genkey("round-trip");

    let file = write_test_file(
        "round-trip.txt",
        "the quick brown fox jumps over the lazy dog\n".repeat(100).as_bytes(),
    );
    let checksum_initial = checksum(&file);

    let encrypted = scratch_path("round-trip.glz");
    let output = run(&[
        "encrypt",
        "--password",
        "hunter2",
        "--pubkey",
        &pubkey,
        "--in",
        &file.to_string_lossy(),
        "--out",
        &encrypted.to_string_lossy(),
        // The test key pair is 1024 bits (128-byte modulus) for speed;
        // chunk_size must divide the modulus length, so the 512-byte
        // CLI default would be rejected as InvalidArg here.
        "--chunk-size",
        "128",
    ]);
    dbg!(&output);
    assert_eq!(output.exit_code, 0);

    let checksum_encrypted = checksum(&encrypted);
    assert_ne!(checksum_encrypted, checksum_initial);

    let decrypted = scratch_path("round-trip.out");
    let output = run(&[
        "decrypt",
        "--password",
        "hunter2",
        "--privkey",
        &privkey,
        "--in",
        &encrypted.to_string_lossy(),
        "--out",
        &decrypted.to_string_lossy(),
        "--chunk-size",
        "128",
    ]);
    dbg!(&output);
    assert_eq!(output.exit_code, 0);

    assert_eq!(checksum(&decrypted), checksum_initial);
}

#[test]
fn slow_mode_round_trip() {
    let (privkey, pubkey) = genkey("slow-mode");

    let file = write_test_file("slow-mode.txt", b"a slow-mode message without an auth tag");
    let checksum_initial = checksum(&file);

    let encrypted = scratch_path("slow-mode.glz");
    let output = run(&[
        "encrypt",
        "--password",
        "abc",
        "--pubkey",
        &pubkey,
        "--in",
        &file.to_string_lossy(),
        "--out",
        &encrypted.to_string_lossy(),
        "--chunk-size",
        "128",
        "--slow",
    ]);
    dbg!(&output);
    assert_eq!(output.exit_code, 0);

    let decrypted = scratch_path("slow-mode.out");
    let output = run(&[
        "decrypt",
        "--password",
        "abc",
        "--privkey",
        &privkey,
        "--in",
        &encrypted.to_string_lossy(),
        "--out",
        &decrypted.to_string_lossy(),
        "--chunk-size",
        "128",
    ]);
    dbg!(&output);
    assert_eq!(output.exit_code, 0);

    assert_eq!(checksum(&decrypted), checksum_initial);
}

#[test]
fn slow_mode_auth_sidecar_upgrades_decrypt_to_fast_path() {
    let (privkey, pubkey) = genkey("slow-sidecar");

    let file = write_test_file("slow-sidecar.txt", b"a slow-mode message with an exported auth tag");
    let checksum_initial = checksum(&file);

    let encrypted = scratch_path("slow-sidecar.glz");
    let auth_sidecar = scratch_path("slow-sidecar.auth");
    let output = run(&[
        "encrypt",
        "--password",
        "abc",
        "--pubkey",
        &pubkey,
        "--in",
        &file.to_string_lossy(),
        "--out",
        &encrypted.to_string_lossy(),
        "--chunk-size",
        "128",
        "--slow",
        "--auth-out",
        &auth_sidecar.to_string_lossy(),
    ]);
    dbg!(&output);
    assert_eq!(output.exit_code, 0);
    assert!(Path::new(&auth_sidecar).exists());

    let decrypted = scratch_path("slow-sidecar.out");
    let output = run(&[
        "decrypt",
        "--password",
        "abc",
        "--privkey",
        &privkey,
        "--in",
        &encrypted.to_string_lossy(),
        "--out",
        &decrypted.to_string_lossy(),
        "--chunk-size",
        "128",
        "--auth-in",
        &auth_sidecar.to_string_lossy(),
    ]);
    dbg!(&output);
    assert_eq!(output.exit_code, 0);

    assert_eq!(checksum(&decrypted), checksum_initial);
}

#[test]
fn wrong_password_fails_with_nonzero_exit() {
    let (privkey, pubkey) = genkey("wrong-password");

    let file = write_test_file("wrong-password.txt", b"something worth protecting");
    let encrypted = scratch_path("wrong-password.glz");
    let setup = run(&[
        "encrypt",
        "--password",
        "correct-password",
        "--pubkey",
        &pubkey,
        "--in",
        &file.to_string_lossy(),
        "--out",
        &encrypted.to_string_lossy(),
        "--chunk-size",
        "128",
    ]);
    dbg!(&setup);
    assert_eq!(setup.exit_code, 0);

    let decrypted = scratch_path("wrong-password.out");
    let output = run(&[
        "decrypt",
        "--password",
        "incorrect-password",
        "--privkey",
        &privkey,
        "--in",
        &encrypted.to_string_lossy(),
        "--out",
        &decrypted.to_string_lossy(),
        "--chunk-size",
        "128",
    ]);
    dbg!(&output);
    assert_ne!(output.exit_code, 0);
    assert!(!decrypted.exists());
}

#[test]
fn missing_required_flag_fails_with_nonzero_exit() {
    let output = run(&["encrypt", "--password", "abc"]);
    dbg!(&output);
    assert_ne!(output.exit_code, 0);
}
