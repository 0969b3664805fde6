//!
//! HTTP signatures as spoken by ActivityPub servers
//!
//! Implements the cavage draft flavour with RSA keys: signing outbound deliveries over
//! `(request-target) date host digest` and verifying inbound requests against a public key
//! that is either handed over directly or resolved from the signing actor's document.
//!

#![deny(missing_docs)]

use http::HeaderName;

pub use self::algorithm::HashAlgorithm;
pub use self::crypto::{PrivateKey, PublicKey};
pub use self::digest::Digest;
pub use self::error::{Error, Result};
pub use self::key::{FetchActor, KeySource, NoFetch};
pub use self::sign::{SignedHeaders, SigningRequest};
pub use self::verify::{Initialized, Verifier};

mod algorithm;
mod error;

pub mod crypto;
pub mod digest;
pub mod header;
pub mod key;
pub mod sign;
pub mod signing_string;
pub mod verify;

/// Boxed error type used at the seams to caller-provided code
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

static DIGEST_HEADER: HeaderName = HeaderName::from_static("digest");
static SIGNATURE_HEADER: HeaderName = HeaderName::from_static("signature");
