//! Feature Reconciler - Brings repository feature flags to a desired state
//!
//! For every listed repository and every requested feature, the reconciler
//! compares the desired status with the repository's current flag and only
//! issues an update when they differ. Dry runs compute the same change-set
//! without calling the host's update endpoint.

use anyhow::Result;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use tracing::{debug, info, info_span, Instrument, Span};

use crate::feature::{Feature, FeaturePatch, FeatureRequest, FeatureStatus};
use crate::lister::{self, ListRequest, RepoFilter};
use crate::provider::{RepoHost, RepositoryRecord};

/// Options for [`FeatureReconciler::update`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRequest {
    pub repo_filter: RepoFilter,

    /// Optional repository name pattern, same semantics as listing
    pub name_filter: Option<String>,

    /// Desired feature states, evaluated in order
    pub features: FeatureRequest,

    /// Compute changes without applying them
    pub dry_run: bool,
}

impl UpdateRequest {
    pub fn new(repo_filter: RepoFilter, features: FeatureRequest) -> Self {
        Self {
            repo_filter,
            name_filter: None,
            features,
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_name_filter(mut self, pattern: impl Into<String>) -> Self {
        self.name_filter = Some(pattern.into());
        self
    }
}

/// A feature change required on one repository
///
/// Serializes keyed by feature name, e.g.
/// `{"owner": "lirantal", "repo": "thinky", "issues": "off"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub owner: String,
    pub repo: String,
    pub feature: Feature,
    pub status: FeatureStatus,
}

impl Serialize for ChangeRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("owner", &self.owner)?;
        map.serialize_entry("repo", &self.repo)?;
        map.serialize_entry(self.feature.name(), &self.status)?;
        map.end()
    }
}

/// Outcome of a reconciliation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    /// Every repository considered, in listing order
    pub repositories: Vec<RepositoryRecord>,

    /// Changes applied (or that would be applied on a dry run), in evaluation order
    pub changes: Vec<ChangeRecord>,

    pub changes_total: usize,
}

/// Lists repositories and reconciles their features through a [`RepoHost`]
pub struct FeatureReconciler<H> {
    host: H,
    span: Span,
}

impl<H: RepoHost> FeatureReconciler<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            span: info_span!("reconcile"),
        }
    }

    /// Emit all reconciliation events inside the given span
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// List repositories matching the request
    pub async fn list_repositories(&self, request: &ListRequest) -> Result<Vec<RepositoryRecord>> {
        lister::list_repositories(&self.host, request)
            .instrument(self.span.clone())
            .await
    }

    /// Bring every listed repository to the requested feature states
    ///
    /// The first failed update aborts the run; updates already applied stay applied.
    pub async fn update(&self, request: &UpdateRequest) -> Result<ReconciliationResult> {
        self.run_update(request).instrument(self.span.clone()).await
    }

    async fn run_update(&self, request: &UpdateRequest) -> Result<ReconciliationResult> {
        let list_request = ListRequest {
            repo_filter: request.repo_filter,
            name_filter: request.name_filter.clone(),
        };
        let repositories = lister::list_repositories(&self.host, &list_request).await?;

        info!(
            "Reconciling {} feature(s) across {} repositories{}",
            request.features.len(),
            repositories.len(),
            if request.dry_run { " (dry run)" } else { "" }
        );

        let mut changes = Vec::new();

        for repo in &repositories {
            for (feature, status) in request.features.iter() {
                if let Some(change) = self.reconcile_feature(repo, feature, status, request.dry_run).await? {
                    changes.push(change);
                }
            }
        }

        info!(
            "Reconciliation finished: {} change(s) across {} repositories",
            changes.len(),
            repositories.len()
        );

        Ok(ReconciliationResult {
            changes_total: changes.len(),
            repositories,
            changes,
        })
    }

    async fn reconcile_feature(
        &self,
        repo: &RepositoryRecord,
        feature: Feature,
        status: FeatureStatus,
        dry_run: bool,
    ) -> Result<Option<ChangeRecord>> {
        if !status.requires_change(feature.is_enabled(&repo.features)) {
            debug!("No update required for [{}] {}", repo.name, feature);
            return Ok(None);
        }

        if dry_run {
            info!("Would set repository [{}] {}: [{}]", repo.name, feature, status);
        } else {
            info!("Setting repository [{}] {}: [{}]", repo.name, feature, status);
            let patch = FeaturePatch::single(feature, status.enabled());
            debug!(
                "Patching {}: {}={}",
                repo.full_name,
                feature.field(),
                status.enabled()
            );
            self.host
                .update_repository(&repo.owner, &repo.name, &patch)
                .await?;
        }

        Ok(Some(ChangeRecord {
            owner: repo.owner.clone(),
            repo: repo.name.clone(),
            feature,
            status,
        }))
    }
}
