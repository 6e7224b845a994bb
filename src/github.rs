use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use octocrab::{Octocrab, Page};
use serde::Deserialize;
use std::env;
use std::process::Command;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::feature::{FeatureFlags, FeaturePatch};
use crate::provider::{ListQuery, RepoHost, RepositoryRecord};

/// GitHub client wrapper with authentication management
pub struct GitHubClient {
    client: Octocrab,
}

/// GitHub authentication strategies
#[derive(Debug, Clone)]
pub enum AuthStrategy {
    /// Use GitHub CLI authentication
    GitHubCLI,
    /// Use environment variable token
    EnvironmentToken,
}

/// Subset of the GitHub repository object this crate reads
#[derive(Debug, Deserialize)]
struct RepoPayload {
    name: String,
    full_name: Option<String>,
    owner: OwnerPayload,
    #[serde(flatten)]
    features: FeatureFlags,
    #[serde(default)]
    private: bool,
    #[serde(default)]
    fork: bool,
    #[serde(default)]
    archived: bool,
    description: Option<String>,
    html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwnerPayload {
    login: String,
}

impl From<RepoPayload> for RepositoryRecord {
    fn from(payload: RepoPayload) -> Self {
        let full_name = payload
            .full_name
            .unwrap_or_else(|| format!("{}/{}", payload.owner.login, payload.name));

        RepositoryRecord {
            owner: payload.owner.login,
            name: payload.name,
            full_name,
            features: payload.features,
            private: payload.private,
            fork: payload.fork,
            archived: payload.archived,
            description: payload.description,
            html_url: payload.html_url,
        }
    }
}

impl GitHubClient {
    /// Create a new GitHub client with automatic authentication
    pub fn new(config: &Config) -> Result<Self> {
        let (auth_strategy, token) = Self::detect_authentication(config)?;

        info!("Using authentication strategy: {:?}", auth_strategy);

        Self::from_token(token, config.github.api_url.as_deref())
    }

    /// Create a client from an explicit token, optionally against a non-default API endpoint
    pub fn from_token(token: String, api_url: Option<&str>) -> Result<Self> {
        let mut builder = Octocrab::builder();

        if let Some(url) = api_url {
            debug!("Using GitHub API endpoint: {}", url);
            builder = builder
                .base_uri(url)
                .with_context(|| format!("Invalid GitHub API URL: {}", url))?;
        }

        let client = builder
            .personal_token(token)
            .build()
            .context("Failed to create GitHub client")?;

        Ok(Self { client })
    }

    /// Detect and obtain GitHub authentication
    fn detect_authentication(config: &Config) -> Result<(AuthStrategy, String)> {
        match config.github.auth_method.as_str() {
            "auto" => {
                // Try GitHub CLI first, then environment token
                if let Ok(token) = Self::try_github_cli() {
                    Ok((AuthStrategy::GitHubCLI, token))
                } else if let Ok(token) = Self::try_environment_token() {
                    Ok((AuthStrategy::EnvironmentToken, token))
                } else {
                    Err(anyhow!(
                        "No GitHub authentication found. Please either:\n\
                         1. Install and authenticate GitHub CLI: gh auth login\n\
                         2. Set GITHUB_TOKEN environment variable\n\
                         3. Run: repoflags auth setup"
                    ))
                }
            }
            "gh_cli" => {
                let token = Self::try_github_cli()
                    .context("GitHub CLI authentication failed. Run: gh auth login")?;
                Ok((AuthStrategy::GitHubCLI, token))
            }
            "token" => {
                let token = Self::try_environment_token()
                    .context("GITHUB_TOKEN environment variable not found or invalid")?;
                Ok((AuthStrategy::EnvironmentToken, token))
            }
            other => Err(anyhow!("Unknown auth method: {}", other)),
        }
    }

    /// Try to get token from GitHub CLI
    fn try_github_cli() -> Result<String> {
        debug!("Attempting GitHub CLI authentication");

        if !Self::is_command_available("gh") {
            return Err(anyhow!("GitHub CLI (gh) is not installed"));
        }

        let token_output = Command::new("gh")
            .args(["auth", "token"])
            .output()
            .context("Failed to get GitHub CLI token")?;

        if !token_output.status.success() {
            return Err(anyhow!(
                "Failed to retrieve token from GitHub CLI: {}",
                String::from_utf8_lossy(&token_output.stderr)
            ));
        }

        let token = String::from_utf8(token_output.stdout)
            .context("GitHub CLI token is not valid UTF-8")?
            .trim()
            .to_string();

        if token.is_empty() {
            return Err(anyhow!("GitHub CLI returned empty token"));
        }

        debug!("Successfully obtained token from GitHub CLI");
        Ok(token)
    }

    /// Try to get token from environment variable
    fn try_environment_token() -> Result<String> {
        debug!("Attempting environment variable authentication");

        let token = env::var("GITHUB_TOKEN").context("GITHUB_TOKEN environment variable not set")?;

        if token.is_empty() {
            return Err(anyhow!("GITHUB_TOKEN is empty"));
        }

        if !looks_like_github_token(&token) {
            warn!("GITHUB_TOKEN doesn't look like a valid GitHub token (expected a ghp_, gho_, ghs_ or github_pat_ prefix)");
        }

        Ok(token)
    }

    /// Check if a command is available in PATH
    fn is_command_available(command: &str) -> bool {
        Command::new("which")
            .arg(command)
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Login of the user the token belongs to
    pub async fn authenticated_user(&self) -> Result<String> {
        let user = self
            .client
            .current()
            .user()
            .await
            .context("Failed to get current user information. Check your authentication.")?;

        Ok(user.login)
    }
}

fn looks_like_github_token(token: &str) -> bool {
    ["ghp_", "gho_", "ghs_", "ghu_", "github_pat_"]
        .iter()
        .any(|prefix| token.starts_with(prefix))
}

#[async_trait]
impl RepoHost for GitHubClient {
    async fn list_repositories(&self, query: &ListQuery) -> Result<Vec<RepositoryRecord>> {
        debug!(
            "Fetching repositories (type={}, sort={}, per_page={})",
            query.ownership, query.sort, query.per_page
        );

        let first_page: Page<RepoPayload> = self
            .client
            .get("/user/repos", Some(query))
            .await
            .context("Failed to fetch repositories")?;

        let payloads = self
            .client
            .all_pages(first_page)
            .await
            .context("Failed to fetch repository pages")?;

        let repositories: Vec<RepositoryRecord> =
            payloads.into_iter().map(RepositoryRecord::from).collect();

        info!("Found {} repositories", repositories.len());
        Ok(repositories)
    }

    async fn update_repository(&self, owner: &str, repo: &str, patch: &FeaturePatch) -> Result<()> {
        if patch.is_empty() {
            bail!("Refusing to send an empty update for {}/{}", owner, repo);
        }

        let route = format!("/repos/{}/{}", owner, repo);
        let _: serde_json::Value = self
            .client
            .patch(route, Some(patch))
            .await
            .with_context(|| format!("Failed to update repository {}/{}", owner, repo))?;

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "GitHub"
    }
}

/// Utility functions for GitHub authentication setup
pub mod auth_setup {
    use super::*;

    /// Print authentication setup guidance
    pub fn setup_authentication() -> Result<()> {
        println!("🔧 repoflags Authentication Setup");
        println!();

        if GitHubClient::is_command_available("gh") {
            println!("✅ GitHub CLI (gh) is installed");

            if Command::new("gh").args(["auth", "status"]).output()?.status.success() {
                println!("✅ GitHub CLI is already authenticated");
            } else {
                println!("🔄 GitHub CLI needs authentication");
                println!("Run: gh auth login");
            }
            return Ok(());
        }

        println!("❌ GitHub CLI (gh) is not installed");
        println!();
        println!("Recommended setup:");
        println!("1. Install GitHub CLI:");

        #[cfg(target_os = "macos")]
        println!("   brew install gh");

        #[cfg(target_os = "linux")]
        println!("   See: https://github.com/cli/cli/blob/trunk/docs/install_linux.md");

        #[cfg(target_os = "windows")]
        println!("   winget install --id GitHub.cli");

        println!();
        println!("2. Authenticate:");
        println!("   gh auth login");
        println!();
        println!("Alternative: Set GITHUB_TOKEN to a token with the 'repo' scope");
        println!("   export GITHUB_TOKEN=your_token_here");

        Ok(())
    }

    /// Verify the configured credentials against the API
    pub async fn test_authentication(config: &Config) -> Result<()> {
        println!("🔍 Testing GitHub authentication...");

        let client = match GitHubClient::new(config) {
            Ok(client) => client,
            Err(e) => {
                println!("❌ Authentication failed: {}", e);
                println!();
                println!("To fix this, run: repoflags auth setup");
                return Ok(());
            }
        };

        match client.authenticated_user().await {
            Ok(login) => {
                println!("✅ Authentication successful");
                println!("   Username: {}", login);
            }
            Err(e) => {
                println!("❌ Authentication failed: {:#}", e);
            }
        }

        Ok(())
    }
}
