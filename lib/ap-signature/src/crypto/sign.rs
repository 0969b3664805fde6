use super::PrivateKey;
use crate::HashAlgorithm;
use ring::error::Unspecified;

/// Sign a message with RSA PKCS#1 v1.5 over the provided hash and encode the returned signature in Base64
#[inline]
pub fn sign(
    payload: &[u8],
    key: &PrivateKey,
    algorithm: HashAlgorithm,
) -> Result<String, Unspecified> {
    let signature = key.sign(algorithm, payload)?;
    Ok(base64_simd::STANDARD.encode_to_string(signature))
}
