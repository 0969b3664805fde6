//!
//! Verify inbound signed requests
//!
//! Verification is split into two steps. [`Verifier::init`] reads and parses the signature from the
//! headers and rejects unusable header sets without touching the network. [`Initialized::verify`]
//! then runs the cryptographic check against a resolved key.
//!

use crate::{
    crypto,
    header::{self, strip_authorization_scheme},
    key::{self, FetchActor, KeySource},
    sign, signing_string, Digest, Error, HashAlgorithm, PublicKey, Result, DIGEST_HEADER,
    SIGNATURE_HEADER,
};
use http::{
    header::{AUTHORIZATION, DATE, HOST},
    request::Parts,
    HeaderMap, HeaderValue, Method, Request, Uri,
};
use std::time::{Duration, SystemTime};
use tracing::{debug, instrument};

/// Component list assumed when the `headers` parameter is absent
const DEFAULT_COMPONENTS: &[&str] = &["date"];

/// Verification attempt for a single inbound request
#[derive(Clone, Debug)]
pub struct Verifier {
    method: Method,
    url: String,
    headers: HeaderMap,
    max_age: Option<Duration>,
}

impl Verifier {
    /// Verifier for a request with the given method, full URL and headers
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            method,
            url: url.into(),
            headers,
            max_age: None,
        }
    }

    /// Reject requests whose `Date` header is older than `max_age`
    ///
    /// Requests without a `Date` header are rejected as well once this is set
    #[must_use]
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    fn signature_value(&self) -> Result<&str> {
        let is_present = |value: &&str| !value.trim().is_empty();

        let signature = self
            .headers
            .get(&SIGNATURE_HEADER)
            .map(HeaderValue::to_str)
            .transpose()?
            .filter(is_present);
        if let Some(signature) = signature {
            return Ok(signature);
        }

        // Blank `Signature` headers fall back to `Authorization`
        self.headers
            .get(AUTHORIZATION)
            .map(HeaderValue::to_str)
            .transpose()?
            .and_then(strip_authorization_scheme)
            .filter(is_present)
            .ok_or(Error::AlgorithmNotFound)
    }

    fn synthetic_request(&self) -> Result<Parts> {
        let uri: Uri = self
            .url
            .parse()
            .map_err(|err: http::uri::InvalidUri| Error::InvalidRequest(err.into()))?;

        let mut headers = self.headers.clone();
        if !headers.contains_key(HOST) {
            if let Some(authority) = uri.authority() {
                let host = HeaderValue::from_str(&sign::host_header(authority))
                    .map_err(|err| Error::InvalidRequest(err.into()))?;
                headers.insert(HOST, host);
            }
        }

        let (mut parts, ()) = Request::builder()
            .method(self.method.clone())
            .uri(uri)
            .body(())
            .map_err(|err| Error::InvalidRequest(err.into()))?
            .into_parts();
        parts.headers = headers;

        Ok(parts)
    }

    fn check_age(&self, parts: &Parts) -> Result<()> {
        let Some(max_age) = self.max_age else {
            return Ok(());
        };

        let date = parts
            .headers
            .get(DATE)
            .ok_or_else(|| Error::MissingHeaderValue(DATE.as_str().to_owned()))?
            .to_str()?;
        let date = httpdate::parse_http_date(date)?;

        // Clock skew can put the date slightly into the future
        let age = SystemTime::now()
            .duration_since(date)
            .unwrap_or(Duration::ZERO);

        if age > max_age {
            debug!(?age, ?max_age, "signature too old");
            return Err(Error::SignatureTooOld);
        }

        Ok(())
    }

    /// Read and parse the signature carried by the request
    pub fn init(&self) -> Result<Initialized> {
        if self.headers.is_empty() {
            return Err(Error::MissingHeaders);
        }

        let parts = self.synthetic_request()?;
        let params = header::parse(self.signature_value()?)?;

        let algorithm = params.algorithm().ok_or(Error::AlgorithmNotFound)?;
        let algorithm = HashAlgorithm::from_signature_algorithm(algorithm)
            .ok_or_else(|| Error::UnsupportedAlgorithm(algorithm.to_owned()))?;

        let signature = params
            .signature()
            .ok_or(Error::MissingParameter("signature"))?
            .to_owned();

        let components = match params.headers() {
            Some(components) => components.map(str::to_owned).collect(),
            None => DEFAULT_COMPONENTS.iter().copied().map(str::to_owned).collect(),
        };

        self.check_age(&parts)?;

        Ok(Initialized {
            parts,
            algorithm,
            key_id: params.key_id().map(str::to_owned),
            components,
            signature,
        })
    }

    /// Verify the request with a key resolved from the source
    ///
    /// The header set is checked before any fetch happens. When the key is resolved through
    /// the request body and the request carries a `Digest` header, the digest has to match the body.
    #[instrument(skip_all, fields(method = %self.method, url = %self.url))]
    pub async fn verify<F>(&self, source: KeySource<'_>, fetcher: &F) -> Result<()>
    where
        F: FetchActor,
    {
        let initialized = self.init()?;
        if let KeySource::Body(body) = source {
            initialized.check_digest(body)?;
        }

        let public_key = key::resolve(source, fetcher).await?;
        initialized
            .verify(&public_key)
            .inspect_err(|error| debug!(%error, "signature rejected"))
    }
}

/// Verifier whose signature has been read, ready for the cryptographic check
#[derive(Debug)]
pub struct Initialized {
    parts: Parts,
    algorithm: HashAlgorithm,
    key_id: Option<String>,
    components: Vec<String>,
    signature: String,
}

impl Initialized {
    /// Hash algorithm the signature claims
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// `keyId` parameter of the signature, if present
    #[must_use]
    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    /// Signed components, in signing string order
    #[must_use]
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Check the `Digest` header against the body
    ///
    /// Passes if the request doesn't carry a `Digest` header
    pub fn check_digest(&self, body: &[u8]) -> Result<()> {
        let Some(digest) = self.parts.headers.get(&DIGEST_HEADER) else {
            return Ok(());
        };

        let digest: Digest = digest.to_str()?.parse()?;
        if !digest.matches(body) {
            debug!("digest doesn't match the body");
            return Err(Error::DigestMismatch);
        }

        Ok(())
    }

    /// Rebuild the signing string and check the signature against the public key
    pub fn verify(&self, public_key: &PublicKey) -> Result<()> {
        let signing_string = signing_string::from_request(
            &self.parts,
            self.components.iter().map(String::as_str),
        )?;

        crypto::verify(
            signing_string.as_bytes(),
            &self.signature,
            public_key,
            self.algorithm,
        )?;

        Ok(())
    }
}
