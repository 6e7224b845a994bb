//! Repository host abstraction layer
//!
//! This module provides the provider-agnostic interface through which the lister
//! and the reconciler reach a git hosting platform. [`crate::GitHubClient`] is the
//! production implementation; tests plug in fakes and mocks.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::feature::{FeatureFlags, FeaturePatch};

/// Page size requested from the listing endpoint
pub const DEFAULT_PER_PAGE: u8 = 100;

/// Sort order requested from the listing endpoint
pub const SORT_FULL_NAME: &str = "full_name";

/// Repository ownership categories understood by `GET /user/repos`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OwnershipType {
    /// Every repository the user can access
    All,
    /// Repositories owned by the user
    #[default]
    Owner,
    /// Public repositories
    Public,
    /// Private repositories
    Private,
    /// Repositories the user collaborates on or reaches through an organization
    Member,
}

impl OwnershipType {
    pub fn as_str(self) -> &'static str {
        match self {
            OwnershipType::All => "all",
            OwnershipType::Owner => "owner",
            OwnershipType::Public => "public",
            OwnershipType::Private => "private",
            OwnershipType::Member => "member",
        }
    }
}

impl fmt::Display for OwnershipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OwnershipType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(OwnershipType::All),
            "owner" => Ok(OwnershipType::Owner),
            "public" => Ok(OwnershipType::Public),
            "private" => Ok(OwnershipType::Private),
            "member" => Ok(OwnershipType::Member),
            other => Err(anyhow!("Unknown ownership type: {}", other)),
        }
    }
}

/// Parameters of a single repository listing call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    pub ownership: OwnershipType,
    pub sort: &'static str,
    pub per_page: u8,
}

impl ListQuery {
    pub fn new(ownership: OwnershipType) -> Self {
        Self {
            ownership,
            sort: SORT_FULL_NAME,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Repository as seen by this crate
///
/// Records come verbatim from the host's listing call and are never mutated
/// locally; feature changes go through [`RepoHost::update_repository`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    /// Owner login (e.g., "lirantal")
    pub owner: String,

    /// Repository name (e.g., "typeform-client")
    pub name: String,

    /// Owner/name
    pub full_name: String,

    /// Current feature flags
    #[serde(flatten)]
    pub features: FeatureFlags,

    #[serde(default)]
    pub private: bool,

    #[serde(default)]
    pub fork: bool,

    #[serde(default)]
    pub archived: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
}

impl RepositoryRecord {
    /// Minimal record with every feature state unknown
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        let owner = owner.into();
        let name = name.into();
        Self {
            full_name: format!("{}/{}", owner, name),
            owner,
            name,
            features: FeatureFlags::default(),
            private: false,
            fork: false,
            archived: false,
            description: None,
            html_url: None,
        }
    }

    pub fn with_features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }
}

/// Trait for the hosting platform operations this crate needs
///
/// Implement this trait to reconcile features on a provider other than GitHub.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepoHost: Send + Sync {
    /// List every repository matching the query, following pagination to the end
    async fn list_repositories(&self, query: &ListQuery) -> Result<Vec<RepositoryRecord>>;

    /// Apply a feature patch to one repository
    async fn update_repository(&self, owner: &str, repo: &str, patch: &FeaturePatch) -> Result<()>;

    /// Provider name for display/logging
    fn provider_name(&self) -> &'static str;
}
