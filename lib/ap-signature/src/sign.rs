//!
//! Sign outbound ActivityPub deliveries
//!

use crate::{
    crypto, header::SignatureHeader, signing_string, Digest, Error, HashAlgorithm, PrivateKey,
    Result, DIGEST_HEADER, SIGNATURE_HEADER,
};
use http::{
    header::{DATE, HOST},
    uri::Authority,
    HeaderMap, HeaderValue,
};
use std::time::SystemTime;
use tracing::{debug, instrument};
use typed_builder::TypedBuilder;

/// Current time formatted as an HTTP date (`Sun, 06 Nov 1994 08:49:37 GMT`)
#[inline]
#[must_use]
pub fn date() -> String {
    httpdate::fmt_http_date(SystemTime::now())
}

/// `Host` header value of an authority, without the userinfo
#[must_use]
pub fn host_header(authority: &Authority) -> String {
    match authority.port() {
        Some(port) => format!("{}:{port}", authority.host()),
        None => authority.host().to_owned(),
    }
}

/// Description of an outbound `POST` delivery
#[derive(Clone, Debug, TypedBuilder)]
pub struct SigningRequest<'a> {
    /// Hash used for the digest and the RSA signature
    #[builder(default)]
    pub algorithm: HashAlgorithm,

    /// Bare hostname of the receiving server (`example.com`)
    pub host: &'a str,

    /// Path of the receiving inbox, starting with `/`
    pub path: &'a str,

    /// Request body
    #[builder(default)]
    pub body: &'a [u8],

    /// URI of the key that verifies the signature
    pub key_id: &'a str,

    /// Preformatted `Date` header value
    ///
    /// Defaults to the current time
    #[builder(default, setter(strip_option))]
    pub date: Option<&'a str>,
}

impl SigningRequest<'_> {
    /// Check that the path is absolute and that the host doesn't carry a scheme, userinfo or path
    pub fn validate(&self) -> Result<()> {
        if !self.path.starts_with('/') {
            return Err(Error::InvalidRequest(
                format!("path {:?} doesn't start with '/'", self.path).into(),
            ));
        }

        if self.host.is_empty() || self.host.contains(['/', '@']) {
            return Err(Error::InvalidRequest(
                format!("host {:?} isn't a bare hostname", self.host).into(),
            ));
        }

        Ok(())
    }
}

/// Signer over the fixed `(request-target) date host digest` component list
#[derive(Clone, Copy, Debug)]
pub struct Signer<'a> {
    /// Key the signature is made with
    pub key: &'a PrivateKey,

    /// Hash the RSA signature is computed over
    pub algorithm: HashAlgorithm,

    /// `Date` header value
    pub date: &'a str,

    /// Digest of the request body
    pub digest: &'a Digest,

    /// `Host` header value
    pub host: &'a str,

    /// Request path
    pub path: &'a str,

    /// URI of the key that verifies the signature
    pub key_id: &'a str,
}

impl Signer<'_> {
    /// Sign the request and return the `Signature` header value
    pub fn sign(&self) -> Result<String> {
        let signing_string =
            signing_string::construct(self.path, self.date, self.host, self.digest);
        let signature = crypto::sign(signing_string.as_bytes(), self.key, self.algorithm)
            .map_err(Error::Signing)?;

        let header = SignatureHeader {
            key_id: self.key_id,
            algorithm: self.algorithm,
            headers: &signing_string::SIGNED_COMPONENTS,
            signature: &signature,
        };

        Ok(header.to_string())
    }
}

/// Headers that have to accompany a signed delivery
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedHeaders {
    /// `Date` header value
    pub date: String,

    /// `Host` header value
    pub host: String,

    /// `Digest` header value
    pub digest: Digest,

    /// `Signature` header value
    pub signature: String,
}

impl SignedHeaders {
    /// Insert the headers into a header map, replacing previous values
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<()> {
        let to_value = |value: &str| {
            HeaderValue::from_str(value).map_err(|err| Error::InvalidRequest(err.into()))
        };

        headers.insert(DATE, to_value(&self.date)?);
        headers.insert(HOST, to_value(&self.host)?);
        headers.insert(&DIGEST_HEADER, to_value(&self.digest.to_string())?);
        headers.insert(&SIGNATURE_HEADER, to_value(&self.signature)?);

        Ok(())
    }
}

/// Compute the digest, date and signature of a delivery
#[instrument(skip_all, fields(key_id = %request.key_id))]
pub fn generate(request: &SigningRequest<'_>, key: &PrivateKey) -> Result<SignedHeaders> {
    request.validate()?;

    let date = request.date.map_or_else(date, str::to_owned);
    let digest = Digest::compute(request.algorithm, request.body);

    let signature = Signer {
        key,
        algorithm: request.algorithm,
        date: &date,
        digest: &digest,
        host: request.host,
        path: request.path,
        key_id: request.key_id,
    }
    .sign()?;

    debug!(%digest, "signed delivery");

    Ok(SignedHeaders {
        date,
        host: request.host.to_owned(),
        digest,
        signature,
    })
}

#[cfg(test)]
mod test {
    use super::SigningRequest;
    use crate::{header, Error, HashAlgorithm, PrivateKey};
    use http::{header::DATE as DATE_HEADER, uri::Authority, HeaderMap, HeaderValue};
    use pretty_assertions::assert_eq;
    use std::time::{Duration, SystemTime};

    const ALICE_KEY: &str = include_str!("../../../test-fixtures/alice.key");
    const DATE: &str = "Sun, 05 Jan 2014 21:31:40 GMT";
    const KEY_ID: &str = "https://example.com/@alice#main-key";

    fn request<'a>(host: &'a str, path: &'a str) -> SigningRequest<'a> {
        SigningRequest::builder()
            .host(host)
            .path(path)
            .body(b"hello world")
            .key_id(KEY_ID)
            .date(DATE)
            .build()
    }

    #[test]
    fn invalid_path() {
        let key = PrivateKey::from_pem(ALICE_KEY).unwrap();
        let error = super::generate(&request("example.com", "inbox"), &key).unwrap_err();
        assert!(matches!(error, Error::InvalidRequest(..)));
    }

    #[test]
    fn invalid_host() {
        let key = PrivateKey::from_pem(ALICE_KEY).unwrap();

        for host in [
            "",
            "https://example.com",
            "example.com/inbox",
            "user@example.com",
        ] {
            let error = super::generate(&request(host, "/inbox"), &key).unwrap_err();
            assert!(matches!(error, Error::InvalidRequest(..)), "{host}");
        }
    }

    #[test]
    fn host_without_userinfo() {
        for (authority, expected) in [
            ("example.com", "example.com"),
            ("user@example.com", "example.com"),
            ("user:secret@example.com:8443", "example.com:8443"),
        ] {
            let authority = Authority::from_static(authority);
            assert_eq!(super::host_header(&authority), expected);
        }
    }

    #[test]
    fn header_layout() {
        let key = PrivateKey::from_pem(ALICE_KEY).unwrap();
        let signed = super::generate(&request("example.com", "/inbox"), &key).unwrap();

        assert_eq!(signed.date, DATE);
        assert_eq!(signed.host, "example.com");
        assert_eq!(
            signed.digest.to_string(),
            "SHA-256=uU0nuZNNPgilLlLX2n2r+sSE7+N6U4DukIj3rOLvzek="
        );
        assert!(signed.signature.starts_with(
            r#"keyId="https://example.com/@alice#main-key",algorithm="rsa-sha256",headers="(request-target) date host digest",signature=""#
        ));

        let params = header::parse(&signed.signature).unwrap();
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn algorithm_token() {
        let key = PrivateKey::from_pem(ALICE_KEY).unwrap();

        for algorithm in HashAlgorithm::ALL {
            let request = SigningRequest {
                algorithm,
                ..request("example.com", "/inbox")
            };
            let signed = super::generate(&request, &key).unwrap();
            let params = header::parse(&signed.signature).unwrap();

            assert_eq!(params.algorithm(), Some(algorithm.signature_algorithm()));
            assert_eq!(signed.digest.algorithm(), algorithm);
        }
    }

    #[test]
    fn default_date_is_now() {
        let key = PrivateKey::from_pem(ALICE_KEY).unwrap();
        let request = SigningRequest::builder()
            .host("example.com")
            .path("/inbox")
            .key_id(KEY_ID)
            .build();

        let signed = super::generate(&request, &key).unwrap();
        let date = httpdate::parse_http_date(&signed.date).unwrap();
        let age = SystemTime::now()
            .duration_since(date)
            .unwrap_or(Duration::ZERO);

        assert!(age < Duration::from_secs(60));
        assert!(signed.date.ends_with(" GMT"));
    }

    #[test]
    fn apply_headers() {
        let key = PrivateKey::from_pem(ALICE_KEY).unwrap();
        let signed = super::generate(&request("example.com", "/inbox"), &key).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(DATE_HEADER, HeaderValue::from_static("yesterday"));
        signed.apply(&mut headers).unwrap();

        assert_eq!(headers.len(), 4);
        assert_eq!(headers["date"], DATE);
        assert_eq!(headers["host"], "example.com");
        assert_eq!(
            headers["digest"],
            "SHA-256=uU0nuZNNPgilLlLX2n2r+sSE7+N6U4DukIj3rOLvzek="
        );
        assert_eq!(headers["signature"], signed.signature.as_str());
    }
}
