//!
//! `Digest` header values
//!

use crate::HashAlgorithm;
use miette::Diagnostic;
use std::{fmt, str::FromStr};
use thiserror::Error;

/// `Digest` header parsing error
#[derive(Debug, Diagnostic, Error)]
pub enum ParseDigestError {
    /// Digest isn't valid Base64
    #[error(transparent)]
    Base64(#[from] base64_simd::Error),

    /// Missing `=` between the algorithm and the digest
    #[error("Missing separator between algorithm and digest")]
    MissingSeparator,

    /// Length of the decoded digest doesn't fit the algorithm
    #[error("Digest has the wrong length for its algorithm")]
    InvalidLength,

    /// Algorithm isn't supported
    #[error(transparent)]
    UnknownAlgorithm(#[from] strum::ParseError),
}

/// Hash of a request body, labelled with the algorithm that produced it
///
/// Renders as `<DisplayName>=<Base64>`, e.g. `SHA-256=uU0nuZNNPgilLlLX2n2r+sSE7+N6U4DukIj3rOLvzek=`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Digest {
    algorithm: HashAlgorithm,
    hash: Vec<u8>,
}

impl Digest {
    /// Hash the body with the provided algorithm
    #[must_use]
    pub fn compute(algorithm: HashAlgorithm, body: &[u8]) -> Self {
        let hash = ring::digest::digest(algorithm.digest_algorithm(), body);

        Self {
            algorithm,
            hash: hash.as_ref().to_vec(),
        }
    }

    /// Algorithm the digest was computed with
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Algorithm label (the hash's display name)
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.algorithm.display_name()
    }

    /// Base64 encoded hash (standard alphabet, padded)
    #[must_use]
    pub fn encoded_value(&self) -> String {
        base64_simd::STANDARD.encode_to_string(&self.hash)
    }

    /// Check whether the body hashes to this digest
    #[must_use]
    pub fn matches(&self, body: &[u8]) -> bool {
        *self == Self::compute(self.algorithm, body)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.label(), self.encoded_value())
    }
}

impl FromStr for Digest {
    type Err = ParseDigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Base64 padding also uses `=`, the first one is the separator
        let (label, encoded) = s
            .trim()
            .split_once('=')
            .ok_or(ParseDigestError::MissingSeparator)?;

        let algorithm = HashAlgorithm::from_str(label)?;
        let hash = base64_simd::STANDARD.decode_to_vec(encoded)?;
        if hash.len() != algorithm.digest_algorithm().output_len() {
            return Err(ParseDigestError::InvalidLength);
        }

        Ok(Self { algorithm, hash })
    }
}

#[cfg(test)]
mod test {
    use super::{Digest, ParseDigestError};
    use crate::HashAlgorithm;
    use proptest::{prop_assert, prop_assert_eq, proptest};

    #[test]
    fn hello_world() {
        let digest = Digest::compute(HashAlgorithm::Sha256, b"hello world");
        assert_eq!(
            digest.to_string(),
            "SHA-256=uU0nuZNNPgilLlLX2n2r+sSE7+N6U4DukIj3rOLvzek="
        );
    }

    #[test]
    fn empty_body() {
        let digest = Digest::compute(HashAlgorithm::Sha256, b"");
        assert_eq!(
            digest.to_string(),
            "SHA-256=47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU="
        );
    }

    #[test]
    fn parse_lowercase_label() {
        let digest: Digest = "sha-256=uU0nuZNNPgilLlLX2n2r+sSE7+N6U4DukIj3rOLvzek="
            .parse()
            .unwrap();

        assert_eq!(digest.algorithm(), HashAlgorithm::Sha256);
        assert!(digest.matches(b"hello world"));
        assert!(!digest.matches(b"hello world!"));
    }

    #[test]
    fn parse_errors() {
        assert!(matches!(
            "SHA-256".parse::<Digest>(),
            Err(ParseDigestError::MissingSeparator)
        ));
        assert!(matches!(
            "MD5=XrY7u+Ae7tCTyyK7j1rNww==".parse::<Digest>(),
            Err(ParseDigestError::UnknownAlgorithm(..))
        ));
        assert!(matches!(
            "SHA-256=XrY7u+Ae7tCTyyK7j1rNww==".parse::<Digest>(),
            Err(ParseDigestError::InvalidLength)
        ));
        assert!(matches!(
            "SHA-256=not base64".parse::<Digest>(),
            Err(ParseDigestError::Base64(..))
        ));
    }

    proptest! {
        #[test]
        fn deterministic(body: Vec<u8>) {
            for algorithm in HashAlgorithm::ALL {
                let first = Digest::compute(algorithm, &body);
                let second = Digest::compute(algorithm, &body);

                prop_assert_eq!(&first, &second);
                prop_assert_eq!(first.label(), algorithm.display_name());

                let rendered = first.to_string();
                let label_prefix = format!("{}=", algorithm.display_name());
                prop_assert!(rendered.starts_with(&label_prefix));
            }
        }
    }
}
