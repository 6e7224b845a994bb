//! Common test utilities and helpers for repoflags tests
#![allow(dead_code)]

use repoflags::GitHubClient;
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const OWNER: &str = "lirantal";

/// Temporary directory holding a config file for CLI runs
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub config_dir: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_dir = temp_dir.path().join("repoflags");
        std::fs::create_dir_all(&config_dir).expect("Failed to create config dir");

        Self {
            temp_dir,
            config_dir,
        }
    }

    pub fn create_test_config(&self, content: &str) -> PathBuf {
        let config_path = self.config_dir.join("config.yml");
        std::fs::write(&config_path, content).expect("Failed to write test config");
        config_path
    }

    /// Token-authenticated config pointing at a mock API server
    pub fn create_config_for(&self, server: &MockServer) -> PathBuf {
        let config_content = format!(
            r#"
github:
  auth_method: "token"
  api_url: "{}"
listing:
  ownership: "owner"
logging:
  level: "warn"
"#,
            server.uri()
        );
        self.create_test_config(&config_content)
    }
}

/// Mock GitHub repository payload builder
#[derive(Debug, Clone)]
pub struct MockRepository {
    pub name: String,
    pub owner: String,
    pub has_issues: bool,
    pub has_wiki: bool,
    pub has_projects: bool,
}

impl MockRepository {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            owner: OWNER.to_string(),
            has_issues: false,
            has_wiki: false,
            has_projects: false,
        }
    }

    pub fn with_issues(mut self) -> Self {
        self.has_issues = true;
        self
    }

    pub fn with_wiki(mut self) -> Self {
        self.has_wiki = true;
        self
    }

    pub fn with_projects(mut self) -> Self {
        self.has_projects = true;
        self
    }

    /// Repository object shaped like the GitHub API's, with the extra fields GitHub sends
    pub fn to_json(&self, id: u64) -> Value {
        json!({
            "id": id,
            "node_id": format!("MDEwOlJlcG9zaXRvcnk{}", id),
            "name": self.name,
            "full_name": format!("{}/{}", self.owner, self.name),
            "private": false,
            "owner": {
                "login": self.owner,
                "id": 316371,
                "type": "User",
                "site_admin": false
            },
            "html_url": format!("https://github.com/{}/{}", self.owner, self.name),
            "description": null,
            "fork": false,
            "archived": false,
            "has_issues": self.has_issues,
            "has_projects": self.has_projects,
            "has_downloads": true,
            "has_wiki": self.has_wiki,
            "has_pages": false,
            "default_branch": "master"
        })
    }
}

/// Test data sets for common scenarios
pub struct TestDataSets;

impl TestDataSets {
    /// Three repositories in full-name order
    pub fn lirantal_repositories() -> Vec<MockRepository> {
        vec![
            MockRepository::new("thinky").with_wiki().with_projects(),
            MockRepository::new("typeform-client").with_issues(),
            MockRepository::new("typeform-export-excel").with_issues(),
        ]
    }

    pub fn as_json(repos: &[MockRepository]) -> Value {
        Value::Array(
            repos
                .iter()
                .enumerate()
                .map(|(index, repo)| repo.to_json(index as u64 + 1))
                .collect(),
        )
    }
}

/// Serve a single-page repository listing for the given ownership type
pub async fn mount_listing(server: &MockServer, ownership: &str, repos: &[MockRepository]) {
    mount_listing_json(server, ownership, TestDataSets::as_json(repos)).await;
}

/// Serve a hand-shaped listing body, for payloads the builder can't express
pub async fn mount_listing_json(server: &MockServer, ownership: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .and(query_param("type", ownership))
        .and(query_param("sort", "full_name"))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Client authenticated with a dummy token against the mock server
pub fn client_for(server: &MockServer) -> GitHubClient {
    GitHubClient::from_token("ghp_test".to_string(), Some(&server.uri()))
        .expect("Failed to build GitHub client")
}

/// Minimal successful response body for a repository update
pub fn updated() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({}))
}
