use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use repoflags::github::auth_setup;
use repoflags::{
    Config, Feature, FeatureReconciler, FeatureRequest, FeatureStatus, GitHubClient, ListRequest,
    OwnershipType, ReconciliationResult, RepoFilter, RepositoryRecord, UpdateRequest,
};

#[derive(Parser)]
#[command(name = "repoflags")]
#[command(about = "Bulk-inspect and bulk-toggle GitHub repository features")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (defaults to XDG config location)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List repositories
    List {
        /// Ownership type to list (defaults to the configured one)
        #[arg(long = "type", value_enum)]
        ownership: Option<OwnershipType>,

        /// Only repositories whose name matches this regular expression
        #[arg(long)]
        filter: Option<String>,

        /// Show repository details
        #[arg(long)]
        details: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Turn repository features on or off where they differ
    Update {
        /// Ownership type to update (defaults to the configured one)
        #[arg(long = "type", value_enum)]
        ownership: Option<OwnershipType>,

        /// Only repositories whose name matches this regular expression
        #[arg(long)]
        filter: Option<String>,

        /// Desired issues state
        #[arg(long, value_parser = parse_status)]
        issues: Option<FeatureStatus>,

        /// Desired wiki state
        #[arg(long, value_parser = parse_status)]
        wiki: Option<FeatureStatus>,

        /// Desired projects state
        #[arg(long, value_parser = parse_status)]
        projects: Option<FeatureStatus>,

        /// Report the changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Manage authentication
    Auth {
        #[command(subcommand)]
        auth_command: AuthCommands,
    },
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Show how to set up authentication
    Setup,

    /// Verify the current credentials against the API
    Status,
}

fn parse_status(value: &str) -> Result<FeatureStatus, String> {
    value.parse().map_err(|e: anyhow::Error| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, created_config) = load_config(cli.config)?;
    init_logging(cli.verbose, &config)?;
    info!("Starting repoflags v{}", env!("CARGO_PKG_VERSION"));

    if let Some(path) = created_config {
        info!("Created default configuration at: {:?}", path);
    }

    match cli.command {
        Commands::List {
            ownership,
            filter,
            details,
            json,
        } => cmd_list(ownership, filter, details, json, &config).await,
        Commands::Update {
            ownership,
            filter,
            issues,
            wiki,
            projects,
            dry_run,
            json,
        } => {
            let features: FeatureRequest = [
                (Feature::Issues, issues),
                (Feature::Wiki, wiki),
                (Feature::Projects, projects),
            ]
            .into_iter()
            .filter_map(|(feature, status)| status.map(|s| (feature, s)))
            .collect();

            cmd_update(ownership, filter, features, dry_run, json, &config).await
        }
        Commands::Auth { auth_command } => cmd_auth(auth_command, &config).await,
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: bool, config: &Config) -> Result<()> {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level))
    };

    // stdout carries command output (including --json), logs go to stderr
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

/// Load configuration from specified path or default location
///
/// Also returns the path of a default config file created on first run, so it
/// can be logged once logging is up.
fn load_config(config_path: Option<PathBuf>) -> Result<(Config, Option<PathBuf>)> {
    match config_path {
        Some(path) => Ok((Config::load(&path)?, None)),
        None => Config::load_or_create(),
    }
}

fn reconciler(config: &Config) -> Result<FeatureReconciler<GitHubClient>> {
    let client = GitHubClient::new(config)?;
    Ok(FeatureReconciler::new(client))
}

/// List repositories
async fn cmd_list(
    ownership: Option<OwnershipType>,
    filter: Option<String>,
    details: bool,
    json: bool,
    config: &Config,
) -> Result<()> {
    let ownership = ownership.unwrap_or(config.listing.ownership);
    info!("Listing {} repositories...", ownership);

    let request = ListRequest {
        repo_filter: RepoFilter::new(ownership),
        name_filter: filter,
    };
    let repositories = reconciler(config)?.list_repositories(&request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&repositories)?);
        return Ok(());
    }

    println!("Repositories ({}): ", repositories.len());

    for repo in &repositories {
        if details {
            print_repository_details(repo);
        } else {
            println!("  📁 {}", repo.full_name);
        }
    }

    Ok(())
}

fn print_repository_details(repo: &RepositoryRecord) {
    fn mark(state: Option<bool>) -> &'static str {
        match state {
            Some(true) => "on",
            Some(false) => "off",
            None => "unknown",
        }
    }

    println!("📁 {}", repo.full_name);
    if let Some(description) = &repo.description {
        println!("   📝 {}", description);
    }
    println!(
        "   ⚙️  issues: {}, wiki: {}, projects: {}",
        mark(repo.features.has_issues),
        mark(repo.features.has_wiki),
        mark(repo.features.has_projects)
    );
    let mut tags = Vec::new();
    if repo.private {
        tags.push("private");
    }
    if repo.fork {
        tags.push("fork");
    }
    if repo.archived {
        tags.push("archived");
    }
    if !tags.is_empty() {
        println!("   🏷️  {}", tags.join(", "));
    }
    if let Some(url) = &repo.html_url {
        println!("   🔗 {}", url);
    }
    println!();
}

/// Reconcile repository features
async fn cmd_update(
    ownership: Option<OwnershipType>,
    filter: Option<String>,
    features: FeatureRequest,
    dry_run: bool,
    json: bool,
    config: &Config,
) -> Result<()> {
    if features.is_empty() {
        bail!("Nothing to update: pass at least one of --issues, --wiki or --projects");
    }

    let request = UpdateRequest {
        repo_filter: RepoFilter::new(ownership.unwrap_or(config.listing.ownership)),
        name_filter: filter,
        features,
        dry_run,
    };

    let result = reconciler(config)?.update(&request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_update_summary(&result, dry_run);
    Ok(())
}

fn print_update_summary(result: &ReconciliationResult, dry_run: bool) {
    if dry_run {
        println!("🔍 Dry run mode - no repositories were modified");
    }

    for change in &result.changes {
        let verb = if dry_run { "would set" } else { "set" };
        println!(
            "   🔄 {}/{}: {} {} {}",
            change.owner, change.repo, verb, change.feature, change.status
        );
    }

    println!();
    println!("📈 Summary:");
    println!("   📊 Repositories checked: {}", result.repositories.len());
    if dry_run {
        println!("   🔄 Changes needed: {}", result.changes_total);
    } else {
        println!("   ✅ Changes applied: {}", result.changes_total);
    }
}

/// Handle authentication commands
async fn cmd_auth(auth_command: AuthCommands, config: &Config) -> Result<()> {
    match auth_command {
        AuthCommands::Setup => auth_setup::setup_authentication(),
        AuthCommands::Status => auth_setup::test_authentication(config).await,
    }
}
