//!
//! Resolve the public key a signature is verified with
//!

use crate::{BoxError, Error, PublicKey, Result};
use bytes::Bytes;
use serde::Deserialize;
use std::future::Future;
use tracing::{debug, instrument};

/// Where the verification key comes from
#[derive(Clone, Debug)]
pub enum KeySource<'a> {
    /// Already decoded public key
    PublicKey(PublicKey),

    /// PEM encoded SubjectPublicKeyInfo (`-----BEGIN PUBLIC KEY-----`)
    Pem(&'a str),

    /// URI of the actor (or of its key) whose document carries `publicKey.publicKeyPem`
    Actor(&'a str),

    /// Body of the inbound request, the key is resolved through its `actor` field
    Body(&'a [u8]),
}

/// Transport used to dereference actor documents
///
/// Implementations are expected to request `application/ld+json` and to bound the request in time
pub trait FetchActor {
    /// Error returned by the transport
    type Error: Into<BoxError>;

    /// Fetch the raw actor document located at the URL
    fn fetch_actor(&self, url: &str) -> impl Future<Output = Result<Bytes, Self::Error>> + Send;
}

/// Fetching is disabled
#[derive(Debug, thiserror::Error)]
#[error("Fetching actor {url:?} is disabled")]
pub struct FetchDisabled {
    url: String,
}

/// Transport for purely local verification
///
/// Every fetch fails, so only [`KeySource::PublicKey`] and [`KeySource::Pem`] resolve
#[derive(Clone, Copy, Debug, Default)]
pub struct NoFetch;

impl FetchActor for NoFetch {
    type Error = FetchDisabled;

    async fn fetch_actor(&self, url: &str) -> Result<Bytes, Self::Error> {
        Err(FetchDisabled {
            url: url.to_owned(),
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublicKeyObject {
    #[serde(default)]
    id: Option<String>,
    public_key_pem: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActorDocument {
    public_key: OneOrMany<PublicKeyObject>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ActorReference {
    Id(String),
    Object { id: String },
}

#[derive(Deserialize)]
struct Activity {
    actor: ActorReference,
}

fn parse_document<'de, T>(document: &'de [u8]) -> Result<T>
where
    T: Deserialize<'de>,
{
    sonic_rs::from_slice(document).map_err(|err| Error::DocumentParse(err.into()))
}

/// Extract the PEM of the key with the ID `key_id` from an actor document
///
/// Falls back to the first listed key if none of the IDs match
fn public_key_pem(document: &[u8], key_id: &str) -> Result<String> {
    let actor: ActorDocument = parse_document(document)?;
    let keys = match actor.public_key {
        OneOrMany::One(key) => vec![key],
        OneOrMany::Many(keys) => keys,
    };

    let position = keys
        .iter()
        .position(|key| key.id.as_deref() == Some(key_id))
        .unwrap_or(0);

    keys.into_iter()
        .nth(position)
        .map(|key| key.public_key_pem)
        .ok_or_else(|| Error::DocumentParse("actor document lists no public keys".into()))
}

/// Read the URI of the `actor` an activity is attributed to
fn activity_actor(body: &[u8]) -> Result<String> {
    let activity: Activity = parse_document(body)?;
    let actor = match activity.actor {
        ActorReference::Id(id) | ActorReference::Object { id } => id,
    };

    Ok(actor)
}

async fn fetch_public_key<F>(url: &str, fetcher: &F) -> Result<PublicKey>
where
    F: FetchActor,
{
    // Fragments never go over the wire, they only select the key inside the document
    let document_url = url.split_once('#').map_or(url, |(document_url, _)| document_url);

    debug!(%document_url, "fetching actor document");
    let document = fetcher
        .fetch_actor(document_url)
        .await
        .map_err(|err| Error::Network(err.into()))?;

    let pem = public_key_pem(&document, url)?;
    Ok(PublicKey::from_pem(&pem)?)
}

/// Resolve the key source into a public key
///
/// Nothing is cached, every actor-based resolution performs a fresh fetch
#[instrument(skip_all)]
pub async fn resolve<F>(source: KeySource<'_>, fetcher: &F) -> Result<PublicKey>
where
    F: FetchActor,
{
    match source {
        KeySource::PublicKey(public_key) => Ok(public_key),
        KeySource::Pem(pem) => Ok(PublicKey::from_pem(pem)?),
        KeySource::Actor(url) => fetch_public_key(url, fetcher).await,
        KeySource::Body(body) => {
            let actor = activity_actor(body)?;
            debug!(%actor, "resolved actor from request body");
            fetch_public_key(&actor, fetcher).await
        }
    }
}

#[cfg(test)]
mod test {
    use super::{FetchActor, KeySource, NoFetch};
    use crate::{BoxError, Error, PublicKey};
    use bytes::Bytes;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    const ALICE_ACTOR: &str = include_str!("../../../test-fixtures/alice_actor.json");
    const ALICE_PUB: &str = include_str!("../../../test-fixtures/alice.pub");
    const MALLORY_PUB: &str = include_str!("../../../test-fixtures/mallory.pub");
    const FOLLOW: &str = include_str!("../../../test-fixtures/follow_activity.json");

    #[derive(Default)]
    struct Recorder {
        document: Option<String>,
        requested: Mutex<Vec<String>>,
    }

    impl FetchActor for Recorder {
        type Error = BoxError;

        async fn fetch_actor(&self, url: &str) -> Result<Bytes, Self::Error> {
            self.requested.lock().unwrap().push(url.to_owned());
            self.document
                .clone()
                .map(Bytes::from)
                .ok_or_else(|| "connection refused".into())
        }
    }

    fn alice() -> Recorder {
        Recorder {
            document: Some(ALICE_ACTOR.to_owned()),
            ..Recorder::default()
        }
    }

    #[tokio::test]
    async fn pem() {
        let key = super::resolve(KeySource::Pem(ALICE_PUB), &NoFetch)
            .await
            .unwrap();
        assert_eq!(key, PublicKey::from_pem(ALICE_PUB).unwrap());
    }

    #[tokio::test]
    async fn malformed_pem() {
        let error = super::resolve(KeySource::Pem("-----BEGIN PUBLIC KEY-----"), &NoFetch)
            .await
            .unwrap_err();
        assert!(matches!(error, Error::KeyDecode(..)));
    }

    #[tokio::test]
    async fn actor() {
        let fetcher = alice();
        let key = super::resolve(
            KeySource::Actor("https://example.com/@alice#main-key"),
            &fetcher,
        )
        .await
        .unwrap();

        assert_eq!(key, PublicKey::from_pem(ALICE_PUB).unwrap());
        assert_eq!(
            *fetcher.requested.lock().unwrap(),
            ["https://example.com/@alice"]
        );
    }

    #[tokio::test]
    async fn body() {
        let fetcher = alice();
        let key = super::resolve(KeySource::Body(FOLLOW.as_bytes()), &fetcher)
            .await
            .unwrap();

        assert_eq!(key, PublicKey::from_pem(ALICE_PUB).unwrap());
    }

    #[tokio::test]
    async fn embedded_actor_object() {
        let fetcher = alice();
        let body =
            br#"{"type":"Note","actor":{"id":"https://example.com/@alice","type":"Person"}}"#;
        super::resolve(KeySource::Body(body), &fetcher)
            .await
            .unwrap();

        assert_eq!(
            *fetcher.requested.lock().unwrap(),
            ["https://example.com/@alice"]
        );
    }

    #[tokio::test]
    async fn no_caching() {
        let fetcher = alice();
        for _ in 0..2 {
            super::resolve(KeySource::Actor("https://example.com/@alice"), &fetcher)
                .await
                .unwrap();
        }

        assert_eq!(fetcher.requested.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn picks_key_by_id() {
        let document = sonic_rs::json!({
            "id": "https://example.com/@alice",
            "publicKey": [
                {
                    "id": "https://example.com/@alice#other-key",
                    "publicKeyPem": MALLORY_PUB,
                },
                {
                    "id": "https://example.com/@alice#main-key",
                    "publicKeyPem": ALICE_PUB,
                },
            ],
        });
        let fetcher = Recorder {
            document: Some(sonic_rs::to_string(&document).unwrap()),
            ..Recorder::default()
        };

        let key = super::resolve(
            KeySource::Actor("https://example.com/@alice#main-key"),
            &fetcher,
        )
        .await
        .unwrap();
        assert_eq!(key, PublicKey::from_pem(ALICE_PUB).unwrap());

        let key = super::resolve(KeySource::Actor("https://example.com/@alice"), &fetcher)
            .await
            .unwrap();
        assert_eq!(key, PublicKey::from_pem(MALLORY_PUB).unwrap());
    }

    #[tokio::test]
    async fn network_error() {
        let error = super::resolve(
            KeySource::Actor("https://example.com/@alice"),
            &Recorder::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(error, Error::Network(..)));

        let error = super::resolve(KeySource::Actor("https://example.com/@alice"), &NoFetch)
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Network(..)));
    }

    #[tokio::test]
    async fn document_errors() {
        let fetcher = Recorder {
            document: Some(r#"{"id":"https://example.com/@alice"}"#.to_owned()),
            ..Recorder::default()
        };
        let error = super::resolve(KeySource::Actor("https://example.com/@alice"), &fetcher)
            .await
            .unwrap_err();
        assert!(matches!(error, Error::DocumentParse(..)));

        let fetcher = Recorder {
            document: Some(r#"{"publicKey":[]}"#.to_owned()),
            ..Recorder::default()
        };
        let error = super::resolve(KeySource::Actor("https://example.com/@alice"), &fetcher)
            .await
            .unwrap_err();
        assert!(matches!(error, Error::DocumentParse(..)));

        for body in [&b"not json"[..], br#"{"type":"Follow"}"#] {
            let error = super::resolve(KeySource::Body(body), &alice())
                .await
                .unwrap_err();
            assert!(matches!(error, Error::DocumentParse(..)));
        }
    }
}
