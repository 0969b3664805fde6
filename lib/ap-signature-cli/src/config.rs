use crate::args::Algorithm;
use ap_http_client::Client;
use miette::IntoDiagnostic;
use serde::Deserialize;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use tokio::fs;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct FetchConfiguration {
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
    pub body_limit: usize,
}

impl Default for FetchConfiguration {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: None,
            body_limit: 1024 * 1024,
        }
    }
}

impl FetchConfiguration {
    pub fn client(&self) -> miette::Result<Client> {
        let mut builder = Client::builder()
            .timeout(Some(Duration::from_secs(self.timeout_secs)))
            .content_length_limit(Some(self.body_limit));

        if let Some(ref user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent.as_str()).into_diagnostic()?;
        }

        builder.build().into_diagnostic()
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct SigningConfiguration {
    pub key_id: Option<String>,
    pub private_key: Option<PathBuf>,
    pub algorithm: Option<Algorithm>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Configuration {
    pub fetch: FetchConfiguration,
    pub signing: SigningConfiguration,
}

impl Configuration {
    pub async fn load<P>(path: P) -> eyre::Result<Self>
    where
        P: AsRef<Path>,
    {
        let content = fs::read_to_string(path).await?;
        toml::from_str(&content).map_err(eyre::Report::from)
    }
}
