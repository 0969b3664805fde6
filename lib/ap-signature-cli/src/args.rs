use clap::{Args, Parser, Subcommand, ValueEnum};
use http::{HeaderName, HeaderValue, Method};
use serde::Deserialize;
use std::path::PathBuf;

/// Hash algorithm used for the digest and the RSA signature
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl From<Algorithm> for ap_signature::HashAlgorithm {
    fn from(value: Algorithm) -> Self {
        match value {
            Algorithm::Sha256 => Self::Sha256,
            Algorithm::Sha384 => Self::Sha384,
            Algorithm::Sha512 => Self::Sha512,
        }
    }
}

/// Parse a `Name: value` header line
pub fn parse_header_line(line: &str) -> Result<(HeaderName, HeaderValue), String> {
    let (name, value) = line
        .split_once(':')
        .ok_or_else(|| format!("expected `Name: value`, got {line:?}"))?;

    let name = HeaderName::from_bytes(name.trim().as_bytes()).map_err(|err| err.to_string())?;
    let value = HeaderValue::from_str(value.trim()).map_err(|err| err.to_string())?;

    Ok((name, value))
}

#[derive(Args)]
pub struct ParseHeaderArgs {
    /// The header to parse
    ///
    /// Either a bare `Signature` header value or an `Authorization` value starting with `Signature `
    pub header: String,
}

#[derive(Args)]
pub struct SignArgs {
    /// Full URL of the receiving inbox
    #[arg(long)]
    pub url: String,

    /// File containing the request body
    #[arg(long)]
    pub body: Option<PathBuf>,

    /// URI of the key that verifies the signature
    #[arg(long)]
    pub key_id: Option<String>,

    /// PEM encoded RSA private key (PKCS#1 or PKCS#8)
    #[arg(long)]
    pub private_key: Option<PathBuf>,

    /// Hash algorithm
    #[arg(long, short, value_enum)]
    pub algorithm: Option<Algorithm>,

    /// `Date` header value, defaults to the current time
    #[arg(long, conflicts_with = "send")]
    pub date: Option<String>,

    /// Deliver the signed request instead of printing its headers
    #[arg(long)]
    pub send: bool,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct KeySourceArgs {
    /// PEM encoded public key
    #[arg(long)]
    pub public_key: Option<PathBuf>,

    /// URI of the actor (or of its key) to fetch the public key from
    #[arg(long)]
    pub actor: Option<String>,

    /// Fetch the public key of the `actor` named in the request body
    #[arg(long, requires = "body")]
    pub from_body: bool,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// HTTP method of the request
    #[arg(long, short = 'X', default_value = "POST")]
    pub method: Method,

    /// Full URL the request was sent to
    #[arg(long)]
    pub url: String,

    /// Request header in the form `Name: value`
    #[arg(long = "header", short = 'H', value_parser = parse_header_line)]
    pub headers: Vec<(HeaderName, HeaderValue)>,

    /// File containing the request body
    #[arg(long)]
    pub body: Option<PathBuf>,

    /// Reject requests whose `Date` header is older than this many seconds
    #[arg(long)]
    pub max_age_secs: Option<u64>,

    #[command(flatten)]
    pub key: KeySourceArgs,
}

#[derive(Subcommand)]
pub enum ToolSubcommand {
    /// Parse the HTTP Signature header and report any format errors
    ParseHeader(ParseHeaderArgs),

    /// Sign an ActivityPub delivery
    Sign(SignArgs),

    /// Verify the signature of a received request
    Verify(VerifyArgs),
}

#[derive(Parser)]
#[command(about, version)]
pub struct ToolArgs {
    /// Path to the configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub subcommand: ToolSubcommand,
}
