use super::PublicKey;
use crate::HashAlgorithm;
use miette::Diagnostic;
use thiserror::Error;

/// Verification error
#[derive(Debug, Diagnostic, Error)]
pub enum VerifyError {
    /// Failed to decode the Base64 payload
    #[error(transparent)]
    Base64(#[from] base64_simd::Error),

    /// Verification failed
    #[error("Verification failed")]
    Verification,
}

/// Verify that the message corresponds with the Base64 encoded signature using the provided public key
#[inline]
pub fn verify(
    msg: &[u8],
    encoded_signature: &str,
    key: &PublicKey,
    algorithm: HashAlgorithm,
) -> Result<(), VerifyError> {
    let signature = base64_simd::STANDARD.decode_to_vec(encoded_signature)?;
    key.verify(algorithm, msg, &signature)
        .map_err(|_| VerifyError::Verification)
}
