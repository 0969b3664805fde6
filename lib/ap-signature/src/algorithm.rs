use ring::{
    digest,
    signature::{
        RsaEncoding, VerificationAlgorithm, RSA_PKCS1_2048_8192_SHA256,
        RSA_PKCS1_2048_8192_SHA384, RSA_PKCS1_2048_8192_SHA512, RSA_PKCS1_SHA256,
        RSA_PKCS1_SHA384, RSA_PKCS1_SHA512,
    },
};
use strum::{AsRefStr, Display, EnumString};

/// Hash algorithm used for the body digest and the RSA signature
///
/// The string representation is the display name used inside the `Digest` header (`SHA-256`).
/// Parsing it is case-insensitive since some servers send `sha-256`.
#[derive(AsRefStr, Clone, Copy, Debug, Default, Display, EnumString, Eq, Hash, PartialEq)]
#[strum(ascii_case_insensitive)]
#[non_exhaustive]
pub enum HashAlgorithm {
    /// SHA-256
    #[default]
    #[strum(serialize = "SHA-256")]
    Sha256,

    /// SHA-384
    #[strum(serialize = "SHA-384")]
    Sha384,

    /// SHA-512
    #[strum(serialize = "SHA-512")]
    Sha512,
}

impl HashAlgorithm {
    /// Every supported hash algorithm
    pub const ALL: [Self; 3] = [Self::Sha256, Self::Sha384, Self::Sha512];

    /// Display name of the hash, as written in the `Digest` header
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
        }
    }

    /// Token for the `algorithm` parameter of the `Signature` header
    #[must_use]
    pub fn signature_algorithm(self) -> &'static str {
        match self {
            Self::Sha256 => "rsa-sha256",
            Self::Sha384 => "rsa-sha384",
            Self::Sha512 => "rsa-sha512",
        }
    }

    /// Look up the hash algorithm from an `algorithm` parameter token
    #[must_use]
    pub fn from_signature_algorithm(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|algorithm| algorithm.signature_algorithm().eq_ignore_ascii_case(token))
    }

    pub(crate) fn digest_algorithm(self) -> &'static digest::Algorithm {
        match self {
            Self::Sha256 => &digest::SHA256,
            Self::Sha384 => &digest::SHA384,
            Self::Sha512 => &digest::SHA512,
        }
    }

    pub(crate) fn signing_encoding(self) -> &'static dyn RsaEncoding {
        match self {
            Self::Sha256 => &RSA_PKCS1_SHA256,
            Self::Sha384 => &RSA_PKCS1_SHA384,
            Self::Sha512 => &RSA_PKCS1_SHA512,
        }
    }

    pub(crate) fn verification_algorithm(self) -> &'static dyn VerificationAlgorithm {
        match self {
            Self::Sha256 => &RSA_PKCS1_2048_8192_SHA256,
            Self::Sha384 => &RSA_PKCS1_2048_8192_SHA384,
            Self::Sha512 => &RSA_PKCS1_2048_8192_SHA512,
        }
    }
}
