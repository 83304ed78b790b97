mod cmd;

use std::env;
use std::process;

use lessify::Pager;

use cmd::cli;

fn main() {
    let args = match cli::Args::build_from_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("fatal: {err}.");
            println!("Try '{bin} -h' for help.", bin = env!("CARGO_BIN_NAME"));
            process::exit(2);
        }
    };

    if args.long_help {
        long_help();
    } else if args.short_help {
        short_help();
    } else if args.version {
        version();
    } else if let Some(command) = args.command {
        if let Err(code) = match &command {
            cli::Command::GenKey(genkey_args) => cmd::genkey(genkey_args),
            cli::Command::Encrypt(encrypt_args) => cmd::encrypt(encrypt_args),
            cli::Command::Decrypt(decrypt_args) => cmd::decrypt(decrypt_args),
        } {
            process::exit(code);
        }
    } else {
        // No arguments.
        short_help();
    }
}

fn short_help() {
    println!("{}", short_help_message());
    println!(
        "For full help, see `{bin} --help`.",
        bin = env!("CARGO_BIN_NAME")
    );
}

fn short_help_message() -> String {
    format!(
        "\
{description}

Usage: {bin} <command> [<args>]

Commands:
  genkey    Generate an RSA key pair
  encrypt   Hide a file's RSA key exchange inside its own ciphertext
  decrypt   Recover a file encrypted with `encrypt`

Options:
  -h, --help             Show this message and exit
  -V, --version          Show the version and exit
",
        description = env!("CARGO_PKG_DESCRIPTION"),
        bin = env!("CARGO_BIN_NAME"),
    )
}

#[allow(clippy::too_many_lines)]
fn long_help() {
    Pager::page_or_print(&format!(
        "\
{help}
genkey:
  {bin} genkey [--passphrase <p>] [--dir <d>] [--name <n>] [--bits <n>]

    Writes <name> (private key, PEM) and <name>.pub (public key, PEM)
    into <dir> (default: current directory). <name> defaults to
    'giltza_rsa'. <bits> defaults to 4096. When --passphrase is given,
    the private key PEM is PKCS#8-encrypted with it.

encrypt:
  {bin} encrypt --password <p> --pubkey <path> --in <path> --out <path>
    [--chunk-size <n>] [--carrier <i>] [--slow] [--try-max <n>]
    [--auth-out <path>]

    Splits <in> into <chunk-size>-byte blocks (default 512), promotes one
    high-entropy block to carrier, RSA-encrypts the carrier with
    <pubkey>, and AES-encrypts everything else with a key derived from
    the carrier and <password>. --slow omits the fast-path auth tag that
    otherwise lets decrypt skip RSA attempts on the wrong candidate.

decrypt:
  {bin} decrypt --password <p> --privkey <path> [--passphrase <p>]
    --in <path> --out <path> [--chunk-size <n>] [--auth-in <path>]
    [--carrier <i>]

    Recovers the carrier (using the auth tag when present, otherwise
    trying every block) and decrypts the rest. <chunk-size> must match
    the value used at encryption time. <passphrase> unlocks an
    encrypted private key PEM.
",
        help = short_help_message(),
        bin = env!("CARGO_BIN_NAME"),
    ));
}

fn version() {
    println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
}
