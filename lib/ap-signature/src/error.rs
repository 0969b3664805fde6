use crate::{crypto, digest::ParseDigestError, header::ParseError, BoxError};
use miette::Diagnostic;
use thiserror::Error;

/// Result alias defaulting to the crate error
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced while signing or verifying
#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum Error {
    /// Neither a `Signature` nor an `Authorization: Signature` header was present,
    /// or the parsed header carries no `algorithm` parameter
    #[error("Signature algorithm not found")]
    AlgorithmNotFound,

    /// The `Digest` header doesn't match the request body
    #[error("Digest doesn't match the request body")]
    DigestMismatch,

    /// The actor document (or request body) couldn't be parsed or lacks the expected field
    #[error("Failed to read the JSON-LD document")]
    DocumentParse(#[source] BoxError),

    /// The `Date` header isn't a valid HTTP date
    #[error(transparent)]
    InvalidDate(#[from] httpdate::Error),

    /// The `Digest` header couldn't be parsed
    #[error(transparent)]
    InvalidDigest(#[from] ParseDigestError),

    /// Header value contains non-visible ASCII characters
    #[error(transparent)]
    InvalidHeaderValue(#[from] http::header::ToStrError),

    /// The request is unusable (invalid URL, invalid signing input, etc.)
    #[error("Invalid request")]
    InvalidRequest(#[source] BoxError),

    /// The `Signature` header is syntactically malformed
    #[error(transparent)]
    #[diagnostic(transparent)]
    InvalidSignatureHeader(#[from] ParseError),

    /// Private or public key failed to decode
    #[error(transparent)]
    KeyDecode(#[from] crypto::parse::Error),

    /// A header listed in the `headers` parameter is missing from the request
    #[error("Missing value for header {0:?}")]
    MissingHeaderValue(String),

    /// No headers were supplied to the verifier
    #[error("Headers are required")]
    MissingHeaders,

    /// A required signature parameter is absent
    #[error("Missing signature parameter {0:?}")]
    MissingParameter(&'static str),

    /// Fetching the actor document failed
    #[error("Failed to fetch the actor document")]
    Network(#[source] BoxError),

    /// The `Date` header is older than the accepted maximum age
    #[error("Signature is too old")]
    SignatureTooOld,

    /// The cryptographic primitive failed to produce a signature
    #[error("Failed to sign the message")]
    Signing(#[source] ring::error::Unspecified),

    /// The `algorithm` parameter names an algorithm we don't implement
    #[error("Unsupported signature algorithm {0:?}")]
    UnsupportedAlgorithm(String),

    /// The signature doesn't match
    #[error(transparent)]
    VerificationFailure(#[from] crypto::VerifyError),
}
