#[derive(Debug, Default, Eq, PartialEq)]
pub struct GenKeyArgs {
    pub passphrase: Option<String>,
    pub dir: Option<String>,
    pub name: Option<String>,
    pub bits: Option<usize>,
}

#[derive(Debug, Default, Eq, PartialEq)]
pub struct EncryptArgs {
    pub password: Option<String>,
    pub pubkey: Option<String>,
    pub input: Option<String>,
    pub output: Option<String>,
    pub chunk_size: Option<usize>,
    pub carrier: Option<usize>,
    pub slow: bool,
    pub try_max: Option<u32>,
    pub auth_out: Option<String>,
}

#[derive(Debug, Default, Eq, PartialEq)]
pub struct DecryptArgs {
    pub password: Option<String>,
    pub privkey: Option<String>,
    pub passphrase: Option<String>,
    pub input: Option<String>,
    pub output: Option<String>,
    pub chunk_size: Option<usize>,
    pub auth_in: Option<String>,
    pub carrier: Option<usize>,
}

#[derive(Debug, Eq, PartialEq)]
pub enum Command {
    GenKey(GenKeyArgs),
    Encrypt(EncryptArgs),
    Decrypt(DecryptArgs),
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Default, Eq, PartialEq)]
pub struct Args {
    pub command: Option<Command>,
    pub short_help: bool,
    pub long_help: bool,
    pub version: bool,
}

fn take_value<I>(flag: &str, cli_args: &mut I) -> Result<String, String>
where
    I: Iterator<Item: AsRef<str> + ToString>,
{
    cli_args
        .next()
        .map(|v| v.to_string())
        .ok_or_else(|| format!("Missing value for '{flag}'"))
}

fn parse_usize(flag: &str, value: &str) -> Result<usize, String> {
    value
        .parse()
        .map_err(|_| format!("'{flag}' expects an integer, got '{value}'"))
}

fn parse_u32(flag: &str, value: &str) -> Result<u32, String> {
    value
        .parse()
        .map_err(|_| format!("'{flag}' expects an integer, got '{value}'"))
}

impl Args {
    pub fn build_from_args<I>(mut cli_args: I) -> Result<Self, String>
    where
        I: Iterator<Item: AsRef<str> + ToString>,
    {
        let mut args = Self::default();

        while let Some(arg) = cli_args.next() {
            if args.command.is_none() {
                match arg.as_ref() {
                    "genkey" => {
                        args.command = Some(Command::GenKey(Self::parse_genkey(&mut cli_args)?));
                        continue;
                    }
                    "encrypt" => {
                        args.command = Some(Command::Encrypt(Self::parse_encrypt(&mut cli_args)?));
                        continue;
                    }
                    "decrypt" => {
                        args.command = Some(Command::Decrypt(Self::parse_decrypt(&mut cli_args)?));
                        continue;
                    }
                    _ => {}
                }
            }

            match arg.as_ref() {
                "-h" => args.short_help = true,
                "--help" => args.long_help = true,
                "-V" | "--version" => args.version = true,
                unknown => {
                    return Err(format!("Unknown argument: '{unknown}'"));
                }
            }
        }

        Ok(args)
    }

    fn parse_genkey<I>(cli_args: &mut I) -> Result<GenKeyArgs, String>
    where
        I: Iterator<Item: AsRef<str> + ToString>,
    {
        let mut out = GenKeyArgs::default();
        while let Some(arg) = cli_args.next() {
            match arg.as_ref() {
                "--passphrase" => out.passphrase = Some(take_value("--passphrase", cli_args)?),
                "--dir" => out.dir = Some(take_value("--dir", cli_args)?),
                "--name" => out.name = Some(take_value("--name", cli_args)?),
                "--bits" => {
                    let raw = take_value("--bits", cli_args)?;
                    out.bits = Some(parse_usize("--bits", &raw)?);
                }
                unknown => return Err(format!("Unknown argument: '{unknown}'")),
            }
        }
        Ok(out)
    }

    fn parse_encrypt<I>(cli_args: &mut I) -> Result<EncryptArgs, String>
    where
        I: Iterator<Item: AsRef<str> + ToString>,
    {
        let mut out = EncryptArgs::default();
        while let Some(arg) = cli_args.next() {
            match arg.as_ref() {
                "--password" => out.password = Some(take_value("--password", cli_args)?),
                "--pubkey" => out.pubkey = Some(take_value("--pubkey", cli_args)?),
                "--in" => out.input = Some(take_value("--in", cli_args)?),
                "--out" => out.output = Some(take_value("--out", cli_args)?),
                "--chunk-size" => {
                    let raw = take_value("--chunk-size", cli_args)?;
                    out.chunk_size = Some(parse_usize("--chunk-size", &raw)?);
                }
                "--carrier" => {
                    let raw = take_value("--carrier", cli_args)?;
                    out.carrier = Some(parse_usize("--carrier", &raw)?);
                }
                "--slow" => out.slow = true,
                "--try-max" => {
                    let raw = take_value("--try-max", cli_args)?;
                    out.try_max = Some(parse_u32("--try-max", &raw)?);
                }
                "--auth-out" => out.auth_out = Some(take_value("--auth-out", cli_args)?),
                unknown => return Err(format!("Unknown argument: '{unknown}'")),
            }
        }
        Ok(out)
    }

    fn parse_decrypt<I>(cli_args: &mut I) -> Result<DecryptArgs, String>
    where
        I: Iterator<Item: AsRef<str> + ToString>,
    {
        let mut out = DecryptArgs::default();
        while let Some(arg) = cli_args.next() {
            match arg.as_ref() {
                "--password" => out.password = Some(take_value("--password", cli_args)?),
                "--privkey" => out.privkey = Some(take_value("--privkey", cli_args)?),
                "--passphrase" => out.passphrase = Some(take_value("--passphrase", cli_args)?),
                "--in" => out.input = Some(take_value("--in", cli_args)?),
                "--out" => out.output = Some(take_value("--out", cli_args)?),
                "--chunk-size" => {
                    let raw = take_value("--chunk-size", cli_args)?;
                    out.chunk_size = Some(parse_usize("--chunk-size", &raw)?);
                }
                "--auth-in" => out.auth_in = Some(take_value("--auth-in", cli_args)?),
                "--carrier" => {
                    let raw = take_value("--carrier", cli_args)?;
                    out.carrier = Some(parse_usize("--carrier", &raw)?);
                }
                unknown => return Err(format!("Unknown argument: '{unknown}'")),
            }
        }
        Ok(out)
    }
}
