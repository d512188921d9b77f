use async_trait::async_trait;
use octocrab::{service::middleware::retry::RetryConfig, Octocrab};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::model::{Issue, Repository, RepositoryDetails};

#[cfg(test)]
#[path = "lookup_tests.rs"]
mod lookup_tests;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Any non-success outcome of a repository lookup.
///
/// Not-found, transport failures and undecodable responses are deliberately
/// reported as the same error.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("lookup of repository [{identifier}] failed: {reason}")]
pub struct LookupError {
    pub identifier: String,
    pub reason: String,
}

impl LookupError {
    pub fn new(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }
}

/// Fetches repository metadata from the remote API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepositoryLookup: Send + Sync {
    /// Fetches the list record for an `owner/name` identifier.
    async fn fetch_repository(&self, identifier: &str) -> Result<Repository, LookupError>;

    /// Fetches the fields displayed on the repository detail page.
    async fn fetch_repository_details(
        &self,
        identifier: &str,
    ) -> Result<RepositoryDetails, LookupError>;

    /// Fetches the open issues of a repository.
    async fn fetch_issues(&self, identifier: &str) -> Result<Vec<Issue>, LookupError>;
}

/// Anonymous GitHub REST client.
pub struct GithubClient {
    octocrab: Octocrab,
}

impl GithubClient {
    pub fn new(base_uri: &str) -> Result<Self, LookupError> {
        let octocrab = Octocrab::builder()
            .base_uri(base_uri)
            .and_then(|builder| builder.add_retry_config(RetryConfig::None).build())
            .map_err(|e| LookupError::new("", format!("invalid API base [{}]: {}", base_uri, e)))?;

        Ok(Self { octocrab })
    }

    #[instrument(skip(self))]
    async fn get<R: DeserializeOwned>(&self, identifier: &str, route: String) -> Result<R, LookupError> {
        debug!("Requesting [{}]", route);
        self.octocrab
            .get::<R, _, ()>(route, None)
            .await
            .map_err(|e| {
                let (error_type, error_message) = describe_error(&e);
                warn!(
                    identifier = identifier,
                    error_message = error_message.as_str(),
                    error_type = error_type,
                    "Repository lookup failed"
                );
                LookupError::new(identifier, error_message)
            })
    }
}

#[async_trait]
impl RepositoryLookup for GithubClient {
    async fn fetch_repository(&self, identifier: &str) -> Result<Repository, LookupError> {
        let repository: Repository = self.get(identifier, repos_route(identifier)).await?;
        info!("Found repository [{}]", repository.full_name);
        Ok(repository)
    }

    async fn fetch_repository_details(
        &self,
        identifier: &str,
    ) -> Result<RepositoryDetails, LookupError> {
        self.get(identifier, repos_route(identifier)).await
    }

    async fn fetch_issues(&self, identifier: &str) -> Result<Vec<Issue>, LookupError> {
        let issues: Vec<Issue> = self
            .get(identifier, format!("{}/issues", repos_route(identifier)))
            .await?;
        info!("Found {} issues for [{}]", issues.len(), identifier);
        Ok(issues)
    }
}

fn repos_route(identifier: &str) -> String {
    format!("/repos/{}", identifier)
}

fn describe_error(error: &octocrab::Error) -> (&'static str, String) {
    match error {
        octocrab::Error::GitHub { source, .. } => (
            "github",
            format!("{} ({})", source.message, source.status_code),
        ),
        octocrab::Error::Serde { source, .. } => ("serde", source.to_string()),
        octocrab::Error::Json { source, .. } => ("json", source.to_string()),
        other => ("other", other.to_string()),
    }
}
