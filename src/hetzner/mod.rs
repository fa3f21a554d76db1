//! Hetzner Cloud implementation of the provisioning provider interface.

mod error;
mod types;

use std::sync::LazyLock;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::provider::{CloudProvider, DatacentreCatalogue, ProviderFuture};
use types::{ApiErrorEnvelope, CreateSshKeyRequest, DatacentresResponse, SshKeysResponse};

pub use error::HetznerApiError;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const HETZNER_API_BASE: &str = "https://api.hetzner.cloud/v1";
const USER_AGENT: &str = concat!("berth/", env!("CARGO_PKG_VERSION"));
const SSH_KEYS_PER_PAGE: u64 = 50;

static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
});

/// Client for the Hetzner Cloud API.
#[derive(Clone, Debug)]
pub struct HetznerApi {
    token: String,
}

impl HetznerApi {
    /// Creates a client authenticating with the given API token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    async fn get_datacentres(&self) -> Result<DatacentreCatalogue, HetznerApiError> {
        let url = format!("{HETZNER_API_BASE}/datacenters");
        let parsed: DatacentresResponse = self.get_json(&url).await?;
        Ok(parsed.into_catalogue())
    }

    async fn list_fingerprints(&self) -> Result<Vec<String>, HetznerApiError> {
        let mut fingerprints = Vec::new();
        let mut page = 1u64;
        loop {
            let url =
                format!("{HETZNER_API_BASE}/ssh_keys?page={page}&per_page={SSH_KEYS_PER_PAGE}");
            let parsed: SshKeysResponse = self.get_json(&url).await?;
            fingerprints.extend(parsed.ssh_keys.into_iter().map(|key| key.fingerprint));
            match parsed.meta.pagination.next_page {
                Some(next) => page = next,
                None => break,
            }
        }
        Ok(fingerprints)
    }

    async fn create_ssh_key(&self, name: &str, public_key: &str) -> Result<(), HetznerApiError> {
        let url = format!("{HETZNER_API_BASE}/ssh_keys");
        let payload = CreateSshKeyRequest { name, public_key };

        let response = HTTP_CLIENT
            .post(&url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.bytes().await.map_err(transport_error)?;
        Err(Self::error_from_body(status, &body))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, HetznerApiError> {
        let response = HTTP_CLIENT
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;
        if !status.is_success() {
            return Err(Self::error_from_body(status, &body));
        }

        serde_json::from_slice(&body).map_err(|err| HetznerApiError::Decode {
            message: err.to_string(),
        })
    }

    fn error_from_body(status: reqwest::StatusCode, body: &[u8]) -> HetznerApiError {
        if let Ok(envelope) = serde_json::from_slice::<ApiErrorEnvelope>(body) {
            return HetznerApiError::Api {
                code: envelope.error.code,
                message: envelope.error.message,
            };
        }

        let text = String::from_utf8_lossy(body);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            HetznerApiError::Provider {
                message: format!("request failed with status {status}"),
            }
        } else {
            HetznerApiError::Provider {
                message: trimmed.to_owned(),
            }
        }
    }
}

fn transport_error(err: reqwest::Error) -> HetznerApiError {
    HetznerApiError::Transport {
        message: err.to_string(),
    }
}

impl CloudProvider for HetznerApi {
    type Error = HetznerApiError;

    fn fetch_datacentres(&self) -> ProviderFuture<'_, DatacentreCatalogue, Self::Error> {
        Box::pin(async move { self.get_datacentres().await })
    }

    fn list_key_fingerprints(&self) -> ProviderFuture<'_, Vec<String>, Self::Error> {
        Box::pin(async move { self.list_fingerprints().await })
    }

    fn register_key<'a>(
        &'a self,
        display_name: &'a str,
        public_key: &'a str,
    ) -> ProviderFuture<'a, (), Self::Error> {
        Box::pin(async move { self.create_ssh_key(display_name, public_key).await })
    }
}
