//! GitHub Actions REST client for runnerdeck.
//!
//! Wraps the two reads the poller needs — the self-hosted runner registry and
//! the active (queued or in-progress) jobs — behind the [`RunnerSource`]
//! trait. Each operation exhausts pagination before returning, so callers see
//! either the complete collection or a single error, never a partial page.

pub mod error;
mod jobs;
mod runners;

pub use error::{FetchError, Result};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Client;
use runnerdeck_core::{Job, MonitorTarget, Runner};
use serde::de::DeserializeOwned;

pub(crate) const PAGE_SIZE: usize = 100;
const DEFAULT_API_BASE: &str = "https://api.github.com";

/// A source of runner and job listings for one monitored target.
///
/// The poller is generic over this so tests can substitute canned data for
/// the live API.
#[async_trait]
pub trait RunnerSource: Send + Sync {
    async fn list_runners(&self, target: &MonitorTarget) -> Result<Vec<Runner>>;
    async fn list_active_jobs(&self, target: &MonitorTarget) -> Result<Vec<Job>>;
}

/// Authenticated client for the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GithubClient {
    api_base: String,
    client: Client,
}

impl GithubClient {
    /// Builds a client from the ambient environment: a token in `GH_TOKEN` or
    /// `GITHUB_TOKEN`, and an optional API base in `GITHUB_API_URL` for
    /// GitHub Enterprise hosts.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("GH_TOKEN")
            .or_else(|_| std::env::var("GITHUB_TOKEN"))
            .map_err(|_| FetchError::MissingToken)?;
        let api_base =
            std::env::var("GITHUB_API_URL").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        Self::new(api_base, &token)
    }

    pub fn new(api_base: impl Into<String>, token: &str) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| FetchError::InvalidToken)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("runnerdeck"));

        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}/{}", self.api_base, path);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(FetchError::api(status.as_u16(), message));
        }
        response
            .json()
            .await
            .map_err(|error| FetchError::Decode(error.to_string()))
    }
}

#[async_trait]
impl RunnerSource for GithubClient {
    async fn list_runners(&self, target: &MonitorTarget) -> Result<Vec<Runner>> {
        self.fetch_runners(target).await
    }

    async fn list_active_jobs(&self, target: &MonitorTarget) -> Result<Vec<Job>> {
        self.fetch_active_jobs(target).await
    }
}
