//!
//! Opinionated HTTP client for ActivityPub federation
//!
//! Dereferences actor documents for signature verification and sends signed deliveries.
//! Every response body is size limited and every request is bounded by a timeout.
//!

#![deny(missing_docs)]

use ap_signature::{sign, FetchActor, HashAlgorithm, PrivateKey, SigningRequest};
use http::HeaderValue;
use http_body::Body as HttpBody;
use http_body_util::{BodyExt, Limited};
use hyper::{
    body::Bytes,
    header::{HeaderName, ACCEPT, CONTENT_TYPE, USER_AGENT},
    HeaderMap, Method, Request, Response as HyperResponse, StatusCode, Uri,
};
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client as HyperClient},
    rt::TokioExecutor,
};
use std::{error::Error as StdError, fmt, time::Duration};
use tower::{
    layer::util::Identity,
    util::{BoxCloneSyncService, Either},
    BoxError, Service, ServiceBuilder, ServiceExt,
};
use tower_http::{
    decompression::DecompressionLayer, follow_redirect::FollowRedirectLayer,
    map_response_body::MapResponseBodyLayer, timeout::TimeoutLayer,
};
use tracing::{debug, instrument};

mod body;

pub use self::body::Body;

type BoxBody = http_body_util::combinators::BoxBody<Bytes, BoxError>;
type Result<T, E = Error> = std::result::Result<T, E>;
type InnerService = BoxCloneSyncService<Request<Body>, HyperResponse<BoxBody>, BoxError>;

/// Actor documents and deliveries stay well below 1MiB
const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const DEFAULT_USER_AGENT: &str = concat!("ap-signature/", env!("CARGO_PKG_VERSION"));

/// `Accept` header value used to dereference actor documents
pub const ACTOR_ACCEPT: &str = "application/ld+json";

/// `Content-Type` of signed deliveries
pub const ACTIVITY_CONTENT_TYPE: &str = "application/activity+json";

/// Client error
///
/// Wraps anything from malformed URIs over TLS failures to rejected statuses
pub struct Error {
    inner: BoxError,
}

impl Error {
    fn new<E>(inner: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self {
            inner: inner.into(),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source()
    }
}

/// Builder for [`Client`]
pub struct ClientBuilder {
    body_limit: Option<usize>,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Upper bound for response bodies, `None` lifts the bound
    ///
    /// Counted on the body itself, so a missing or lying `Content-Length` doesn't get around it.
    /// Defaults to 1MiB.
    #[must_use]
    pub fn content_length_limit(mut self, limit: Option<usize>) -> Self {
        self.body_limit = limit;
        self
    }

    /// Header sent with every request unless the request sets it itself
    ///
    /// # Errors
    ///
    /// - The name or the value isn't a valid header component
    pub fn default_header<K, V>(mut self, name: K, value: V) -> Result<Self>
    where
        K: TryInto<HeaderName>,
        K::Error: Into<BoxError>,
        V: TryInto<HeaderValue>,
        V::Error: Into<BoxError>,
    {
        let name = name.try_into().map_err(Error::new)?;
        let value = value.try_into().map_err(Error::new)?;
        self.default_headers.insert(name, value);

        Ok(self)
    }

    /// `User-Agent` sent with every request, `ap-signature/<version>` by default
    ///
    /// # Errors
    ///
    /// - The value isn't a valid header value
    pub fn user_agent<V>(self, value: V) -> Result<Self>
    where
        V: TryInto<HeaderValue>,
        V::Error: Into<BoxError>,
    {
        self.default_header(USER_AGENT, value)
    }

    /// Time a request may take, `None` waits forever
    ///
    /// Defaults to 30 seconds. Requests running out of time resolve to `408 Request Timeout`.
    #[must_use]
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a client talking HTTP/1.1 and HTTP/2 over rustls with the native root store
    ///
    /// # Errors
    ///
    /// - The native root store couldn't be loaded
    pub fn build(self) -> Result<Client> {
        let mut http = HttpConnector::new();
        http.enforce_http(false);

        let https = HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(Error::new)?
            .https_or_http()
            .enable_http1()
            .enable_http2()
            .wrap_connector(http);

        let hyper = HyperClient::builder(TokioExecutor::new())
            .build(https)
            .map_response(|response| response.map(http_body_util::combinators::BoxBody::new));

        Ok(self.service(hyper))
    }

    /// Build a client on top of another HTTP service
    ///
    /// The body limit, redirects, decompression and the timeout are layered on top of it
    #[must_use]
    pub fn service<S, B>(self, service: S) -> Client
    where
        S: Service<Request<Body>, Response = HyperResponse<B>> + Clone + Send + Sync + 'static,
        S::Error: StdError + Send + Sync + 'static,
        S::Future: Send,
        B: HttpBody + Default + Send + Sync + 'static,
        B::Data: Send + Sync,
        B::Error: StdError + Send + Sync + 'static,
    {
        let body_limit = match self.body_limit {
            Some(limit) => Either::Right(MapResponseBodyLayer::new(move |body| {
                BoxBody::new(Limited::new(body, limit))
            })),
            None => Either::Left(MapResponseBodyLayer::new(BoxBody::new)),
        };
        let timeout = match self.timeout {
            Some(duration) => Either::Right(TimeoutLayer::new(duration)),
            None => Either::Left(Identity::new()),
        };

        let inner = ServiceBuilder::new()
            .layer(body_limit)
            .layer(FollowRedirectLayer::new())
            .layer(DecompressionLayer::default())
            .layer(timeout)
            .service(service)
            .map_err(BoxError::from);

        Client {
            default_headers: self.default_headers,
            inner: BoxCloneSyncService::new(inner),
        }
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));

        Self {
            body_limit: Some(DEFAULT_BODY_LIMIT),
            default_headers,
            timeout: Some(DEFAULT_REQUEST_TIMEOUT),
        }
    }
}

/// HTTP client for fetching actors and delivering activities
#[derive(Clone)]
pub struct Client {
    default_headers: HeaderMap,
    inner: InnerService,
}

impl Client {
    /// Builder with the default limits
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Send a request through the layer stack
    ///
    /// # Errors
    ///
    /// - The request failed before a response arrived
    pub async fn execute(&self, mut req: Request<Body>) -> Result<Response> {
        let headers = req.headers_mut();
        for (name, value) in &self.default_headers {
            if !headers.contains_key(name) {
                headers.insert(name, value.clone());
            }
        }

        let inner = self.inner.clone().oneshot(req).await.map_err(Error::new)?;

        Ok(Response { inner })
    }

    /// Send a `GET` request
    ///
    /// # Errors
    ///
    /// - The URI is invalid
    /// - The request failed
    pub async fn get<U>(&self, uri: U) -> Result<Response>
    where
        Uri: TryFrom<U>,
        <Uri as TryFrom<U>>::Error: Into<http::Error>,
    {
        let req = Request::get(uri).body(Body::empty()).map_err(Error::new)?;
        self.execute(req).await
    }

    /// Sign an ActivityPub delivery and `POST` it to the inbox
    ///
    /// The `Date`, `Host`, `Digest` and `Signature` headers are derived from the URI and body.
    ///
    /// # Errors
    ///
    /// - The URI isn't absolute
    /// - Signing the request failed
    /// - Executing the request failed
    #[instrument(skip_all, fields(%uri, %key_id))]
    pub async fn post_signed(
        &self,
        uri: &str,
        body: Bytes,
        key_id: &str,
        private_key: &PrivateKey,
        algorithm: HashAlgorithm,
    ) -> Result<Response> {
        let uri: Uri = uri.parse().map_err(Error::new)?;
        let host = uri
            .authority()
            .map(sign::host_header)
            .ok_or_else(|| Error::new("inbox URI has no authority"))?;
        let path = uri
            .path_and_query()
            .map_or("/", |path_and_query| path_and_query.as_str());

        let signing_request = SigningRequest::builder()
            .algorithm(algorithm)
            .host(&host)
            .path(path)
            .body(&body)
            .key_id(key_id)
            .build();
        let signed_headers = sign::generate(&signing_request, private_key).map_err(Error::new)?;

        let mut req = Request::builder()
            .method(Method::POST)
            .uri(uri.clone())
            .header(CONTENT_TYPE, ACTIVITY_CONTENT_TYPE)
            .body(Body::data(body.clone()))
            .map_err(Error::new)?;
        signed_headers
            .apply(req.headers_mut())
            .map_err(Error::new)?;

        self.execute(req).await
    }
}

impl FetchActor for Client {
    type Error = Error;

    async fn fetch_actor(&self, url: &str) -> Result<Bytes> {
        let req = Request::get(url)
            .header(ACCEPT, ACTOR_ACCEPT)
            .body(Body::empty())
            .map_err(Error::new)?;

        let response = self.execute(req).await?;
        let status = response.status();
        if !status.is_success() {
            debug!(%url, %status, "actor fetch failed");
            return Err(Error::new(format!(
                "fetching {url} failed with status {status}"
            )));
        }

        response.bytes().await
    }
}

/// Response of a delivery or an actor fetch
#[derive(Debug)]
pub struct Response {
    inner: HyperResponse<BoxBody>,
}

impl Response {
    /// Collect the size limited body
    ///
    /// # Errors
    ///
    /// - Reading the body failed or it exceeded the content length limit
    pub async fn bytes(self) -> Result<Bytes> {
        let collected = self.inner.into_body().collect().await.map_err(Error::new)?;
        Ok(collected.to_bytes())
    }

    /// Status code the remote answered with
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }
}
