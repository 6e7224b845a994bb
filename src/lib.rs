//! repoflags - Bulk GitHub repository feature management
//!
//! repoflags inspects and toggles repository features (issues, wiki, projects)
//! across every repository of the authenticated user, only touching the
//! repositories whose current state differs from the requested one.
//!
//! ## Modules
//!
//! - [`config`]: Configuration management and parsing
//! - [`feature`]: Feature table, desired states and update payloads
//! - [`provider`]: Hosting platform abstraction and repository records
//! - [`github`]: GitHub API integration and authentication
//! - [`lister`]: Repository listing with name filtering
//! - [`reconcile`]: Feature reconciliation and dry runs

pub mod config;
pub mod feature;
pub mod github;
pub mod lister;
pub mod provider;
pub mod reconcile;

pub use config::Config;
pub use feature::{Feature, FeatureFlags, FeaturePatch, FeatureRequest, FeatureStatus};
pub use github::GitHubClient;
pub use lister::{list_repositories, ListRequest, RepoFilter};
pub use provider::{ListQuery, OwnershipType, RepoHost, RepositoryRecord};
pub use reconcile::{ChangeRecord, FeatureReconciler, ReconciliationResult, UpdateRequest};
