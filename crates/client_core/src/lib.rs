use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client};
use serde::de::DeserializeOwned;
use shared::{
    domain::{CharacterDetail, CharacterId, CharacterSummary, Page},
    protocol::{CharacterPageResponse, CharacterPayload},
};
use tracing::debug;
use url::Url;

pub mod error;
pub mod load;

pub use error::ClientError;
pub use load::{LoadController, LoadState};

pub const DEFAULT_API_BASE_URL: &str = "https://rickandmortyapi.com/api";
const USER_AGENT: &str = concat!("rickmorty-browser/", env!("CARGO_PKG_VERSION"));

/// Network collaborator consumed by the screens.
#[async_trait]
pub trait CharacterService: Send + Sync {
    async fn fetch_page(&self, page: u32) -> Result<Page<CharacterSummary>, ClientError>;
    async fn fetch_by_id(&self, id: CharacterId) -> Result<CharacterDetail, ClientError>;
}

pub struct RickMortyClient {
    http: Client,
    base_url: String,
}

impl RickMortyClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::build(base_url, None)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        Self::build(base_url, Some(timeout))
    }

    fn build(base_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let base_url = normalize_base_url(base_url)?;
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ClientError::Build)?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        debug!(%url, ?query, "GET");
        let response = self
            .http
            .get(&url)
            .query(query)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;
        serde_json::from_slice(&body).map_err(|source| ClientError::Decode { url, source })
    }
}

#[async_trait]
impl CharacterService for RickMortyClient {
    async fn fetch_page(&self, page: u32) -> Result<Page<CharacterSummary>, ClientError> {
        let response: CharacterPageResponse = self
            .get_json(
                format!("{}/character", self.base_url),
                &[("page", page.to_string())],
            )
            .await?;
        Ok(response.into_page(page))
    }

    async fn fetch_by_id(&self, id: CharacterId) -> Result<CharacterDetail, ClientError> {
        let payload: CharacterPayload = self
            .get_json(format!("{}/character/{}", self.base_url, id.0), &[])
            .await?;
        Ok(payload.into_detail())
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|err| ClientError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: err.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ClientError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
