use crate::{args::VerifyArgs, config::Configuration, sign::read_body, util::Kaomoji};
use ap_signature::{KeySource, NoFetch, Verifier};
use http::HeaderMap;
use miette::{IntoDiagnostic, WrapErr};
use std::time::Duration;
use tokio::fs;

pub async fn do_it(args: VerifyArgs, config: &Configuration) -> miette::Result<()> {
    let headers = args.headers.into_iter().collect::<HeaderMap>();
    let body = read_body(args.body.as_deref()).await?;

    let mut verifier = Verifier::new(args.method, args.url, headers);
    if let Some(max_age) = args.max_age_secs {
        verifier = verifier.with_max_age(Duration::from_secs(max_age));
    }

    if let Some(path) = args.key.public_key {
        let pem = fs::read_to_string(&path)
            .await
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read the public key from {}", path.display()))?;

        verifier.verify(KeySource::Pem(&pem), &NoFetch).await?;
    } else {
        let source = match args.key.actor {
            Some(ref actor) => KeySource::Actor(actor),
            None => KeySource::Body(&body),
        };

        let client = config.fetch.client()?;
        verifier.verify(source, &client).await?;
    }

    println!("✅ Signature is valid! {}", Kaomoji::Success);

    Ok(())
}
