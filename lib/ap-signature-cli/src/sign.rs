use crate::{args::SignArgs, config::Configuration, util::Kaomoji};
use ap_signature::{sign, HashAlgorithm, PrivateKey, SignedHeaders, SigningRequest};
use bytes::Bytes;
use http::Uri;
use miette::{miette, IntoDiagnostic, WrapErr};
use std::path::Path;
use tokio::fs;
use tracing::info;

pub async fn read_body(path: Option<&Path>) -> miette::Result<Vec<u8>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };

    fs::read(path)
        .await
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read the body from {}", path.display()))
}

fn render(signed: &SignedHeaders) -> String {
    format!(
        "Date: {}\nHost: {}\nDigest: {}\nSignature: {}",
        signed.date, signed.host, signed.digest, signed.signature
    )
}

pub async fn do_it(args: SignArgs, config: &Configuration) -> miette::Result<()> {
    let key_id = args
        .key_id
        .or_else(|| config.signing.key_id.clone())
        .ok_or_else(|| miette!("No key ID configured, pass `--key-id`"))?;
    let key_path = args
        .private_key
        .or_else(|| config.signing.private_key.clone())
        .ok_or_else(|| miette!("No private key configured, pass `--private-key`"))?;
    let algorithm: HashAlgorithm = args
        .algorithm
        .or(config.signing.algorithm)
        .unwrap_or_default()
        .into();

    let pem = fs::read_to_string(&key_path)
        .await
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read the private key from {}", key_path.display()))?;
    let private_key = PrivateKey::from_pem(&pem)?;
    let body = read_body(args.body.as_deref()).await?;

    if args.send {
        let client = config.fetch.client()?;
        let response = client
            .post_signed(&args.url, Bytes::from(body), &key_id, &private_key, algorithm)
            .await
            .into_diagnostic()?;

        let status = response.status();
        info!(%status, "delivered");
        println!("{status}");

        if !status.is_success() {
            miette::bail!("Delivery was rejected with status {status} {}", Kaomoji::Failure);
        }

        println!("✅ Delivered! {}", Kaomoji::Success);
        return Ok(());
    }

    let uri: Uri = args.url.parse().into_diagnostic()?;
    let host = uri
        .authority()
        .map(sign::host_header)
        .ok_or_else(|| miette!("The URL {} has no host", args.url))?;
    let path = uri
        .path_and_query()
        .map_or("/", |path_and_query| path_and_query.as_str());

    let request = SigningRequest {
        algorithm,
        host: &host,
        path,
        body: &body,
        key_id: &key_id,
        date: args.date.as_deref(),
    };
    let signed = sign::generate(&request, &private_key)?;

    println!("{}", render(&signed));

    Ok(())
}
