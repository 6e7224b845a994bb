//! Repository listing with ownership and name filtering

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::provider::{ListQuery, OwnershipType, RepoHost, RepositoryRecord};

/// Which repositories to request from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RepoFilter {
    #[serde(rename = "type", default)]
    pub ownership: OwnershipType,
}

impl RepoFilter {
    pub fn new(ownership: OwnershipType) -> Self {
        Self { ownership }
    }
}

/// Options for [`list_repositories`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    pub repo_filter: RepoFilter,

    /// Regular expression matched (unanchored) against repository names
    pub name_filter: Option<String>,
}

impl ListRequest {
    pub fn new(repo_filter: RepoFilter) -> Self {
        Self {
            repo_filter,
            name_filter: None,
        }
    }

    pub fn with_name_filter(mut self, pattern: impl Into<String>) -> Self {
        self.name_filter = Some(pattern.into());
        self
    }
}

/// Compile a repository name pattern
pub fn compile_name_filter(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).with_context(|| format!("Invalid repository name filter: {}", pattern))
}

/// Fetch every repository matching the ownership filter, then keep those whose
/// name matches the optional pattern. Host order is preserved.
pub async fn list_repositories<H>(host: &H, request: &ListRequest) -> Result<Vec<RepositoryRecord>>
where
    H: RepoHost + ?Sized,
{
    // Reject a bad pattern before spending any API calls
    let name_filter = request
        .name_filter
        .as_deref()
        .map(compile_name_filter)
        .transpose()?;

    let provider = host.provider_name();
    let query = ListQuery::new(request.repo_filter.ownership);
    debug!("Listing {} repositories from {}", query.ownership, provider);
    let repositories = host.list_repositories(&query).await?;

    let Some(pattern) = name_filter else {
        return Ok(repositories);
    };

    let total = repositories.len();
    let matching: Vec<RepositoryRecord> = repositories
        .into_iter()
        .filter(|repo| {
            let keep = pattern.is_match(&repo.name);
            if !keep {
                debug!("Excluding repository not matching name filter: {}", repo.name);
            }
            keep
        })
        .collect();

    info!(
        "{} of {} {} repositories match name filter '{}'",
        matching.len(),
        total,
        provider,
        pattern.as_str()
    );

    Ok(matching)
}
