//!
//! `Signature` header parameters
//!

use crate::HashAlgorithm;
use std::collections::{btree_map, BTreeMap};

mod parse;
mod serialise;

pub use self::parse::{parse, ParseError};

/// Scheme prefix of an `Authorization` header carrying a signature
pub const AUTHORIZATION_SCHEME: &str = "Signature ";

/// Strip the `Signature ` prefix an `Authorization` header value carries
///
/// Returns `None` if the value uses a different scheme
#[inline]
#[must_use]
pub fn strip_authorization_scheme(value: &str) -> Option<&str> {
    value.strip_prefix(AUTHORIZATION_SCHEME)
}

/// Parameters of a received `Signature` header, keyed by their name
///
/// Values are stored as they appeared in the header, minus the surrounding quotes.
/// Required parameters aren't enforced here, their absence is up to the consumer to handle.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SignatureParams<'a> {
    fields: BTreeMap<&'a str, &'a str>,
}

impl<'a> SignatureParams<'a> {
    /// Raw value of a parameter
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.fields.get(name).copied()
    }

    /// `keyId` parameter
    #[must_use]
    pub fn key_id(&self) -> Option<&'a str> {
        self.get("keyId")
    }

    /// `algorithm` parameter
    #[must_use]
    pub fn algorithm(&self) -> Option<&'a str> {
        self.get("algorithm")
    }

    /// `headers` parameter, split into the individual component names
    #[must_use]
    pub fn headers(&self) -> Option<impl Iterator<Item = &'a str> + Clone> {
        self.get("headers").map(str::split_whitespace)
    }

    /// `signature` parameter
    #[must_use]
    pub fn signature(&self) -> Option<&'a str> {
        self.get("signature")
    }

    /// Iterate over all parameters in lexicographic order of their names
    pub fn iter(&self) -> btree_map::Iter<'_, &'a str, &'a str> {
        self.fields.iter()
    }

    /// Number of parameters
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no parameters were present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for SignatureParams<'a> {
    fn from_iter<T: IntoIterator<Item = (&'a str, &'a str)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Outbound `Signature` header
///
/// The [`Display`](std::fmt::Display) implementation renders the wire format with the parameters
/// in the order `keyId`, `algorithm`, `headers`, `signature`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignatureHeader<'a> {
    /// URI of the key that verifies the signature
    pub key_id: &'a str,

    /// Hash algorithm the RSA signature was computed with
    pub algorithm: HashAlgorithm,

    /// Signed components, in signing string order
    pub headers: &'a [&'a str],

    /// Base64 encoded signature
    pub signature: &'a str,
}
