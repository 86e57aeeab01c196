mod commands;
mod config;
mod sources;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use release_sync::{ArtifactSource, SyncOrchestrator, TokioWaiter};
use release_sync_github::{
    ArtifactFetcher, GitHubTagResolver, HeaderSet, HttpTransport, ReleaseClient,
};

use crate::config::{AppConfig, SourceEntry, SourceType};
use crate::sources::{DistributionImageSource, FileSource, GitHubReleaseSource};

#[derive(Parser)]
#[command(name = "release-sync")]
#[command(about = "Mirror the latest release artifacts of upstream projects into a local directory")]
struct Cli {
    /// Path to a sources.toml config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve the current release and download every configured source
    Sync,
    /// List a repository's tags, newest commit first
    Tags {
        /// Repository owner (defaults to the configured release repository)
        #[arg(long)]
        owner: Option<String>,
        /// Repository name (defaults to the configured release repository)
        #[arg(long)]
        repo: Option<String>,
        /// Show at most this many tags
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Download a single URL into the data directory
    Fetch {
        /// URL to download
        url: String,
        /// File name to save as (defaults to the last URL path segment)
        #[arg(long)]
        filename: Option<String>,
    },
}

/// HTTP plumbing shared by the resolver and every source.
struct Clients {
    transport: HttpTransport,
    api_headers: HeaderSet,
    download_headers: HeaderSet,
    fetcher: ArtifactFetcher,
}

impl Clients {
    fn new(config: &AppConfig) -> Result<Self> {
        let transport =
            HttpTransport::new(config.timeout()).context("failed to build HTTP client")?;
        let token = github_token();
        Ok(Self {
            api_headers: HeaderSet::github_api(token.as_deref()),
            download_headers: HeaderSet::browser(&config.user_agent),
            fetcher: ArtifactFetcher::new(transport.clone(), &config.data_dir),
            transport,
        })
    }

    fn tag_resolver(&self, config: &AppConfig) -> GitHubTagResolver {
        GitHubTagResolver::new(
            self.transport.clone(),
            self.api_headers.clone(),
            Arc::new(TokioWaiter),
        )
        .with_delay(config.tag_delay())
    }

    fn release_client(&self) -> ReleaseClient {
        ReleaseClient::new(self.transport.clone(), self.api_headers.clone(), None)
    }
}

/// Token for GitHub API calls: `GITHUB_TOKEN`, then `TOKEN`.
fn github_token() -> Option<String> {
    ["GITHUB_TOKEN", "TOKEN"]
        .into_iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|token| !token.is_empty())
}

fn ensure_data_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create data directory: {}", dir.display()))
}

fn build_source_for(entry: &SourceEntry, clients: &Clients) -> Box<dyn ArtifactSource> {
    match &entry.source_type {
        SourceType::GitHubRelease {
            owner,
            repo,
            assets,
        } => Box::new(GitHubReleaseSource::new(
            &entry.label,
            owner,
            repo,
            assets,
            clients.release_client(),
            clients.fetcher.clone(),
            clients.download_headers.clone(),
        )),
        SourceType::DistributionImages {
            index_url,
            distributions,
            architecture,
        } => Box::new(DistributionImageSource::new(
            &entry.label,
            index_url,
            distributions,
            *architecture,
            clients.transport.clone(),
            clients.fetcher.clone(),
            clients.download_headers.clone(),
        )),
        SourceType::File { url, filename } => Box::new(FileSource::new(
            &entry.label,
            url,
            filename.as_deref(),
            clients.fetcher.clone(),
            clients.download_headers.clone(),
        )),
    }
}

fn build_orchestrator(config: &AppConfig, clients: &Clients) -> SyncOrchestrator {
    let sources = config
        .enabled_sources()
        .map(|entry| build_source_for(entry, clients))
        .collect();

    SyncOrchestrator::new(
        Box::new(clients.tag_resolver(config)),
        &config.release.owner,
        &config.release.repo,
        sources,
    )
    .with_threshold(config.threshold())
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let app_config = config::load_config(cli.config.as_deref())?;
    let clients = Clients::new(&app_config)?;

    match cli.command {
        Command::Sync => {
            ensure_data_dir(&app_config.data_dir)?;
            let orchestrator = build_orchestrator(&app_config, &clients);
            Ok(commands::sync::run(&orchestrator).await)
        }
        Command::Tags { owner, repo, limit } => {
            let owner = owner.unwrap_or_else(|| app_config.release.owner.clone());
            let repo = repo.unwrap_or_else(|| app_config.release.repo.clone());
            let resolver = clients.tag_resolver(&app_config);
            commands::tags::run(&resolver, &owner, &repo, limit).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Fetch { url, filename } => {
            ensure_data_dir(&app_config.data_dir)?;
            commands::fetch::run(
                &clients.fetcher,
                &url,
                filename.as_deref(),
                &clients.download_headers,
            )
            .await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tokio::select! {
        result = run(cli) => match result {
            Ok(code) => code,
            Err(e) => {
                eprintln!("error: {e:#}");
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            eprintln!("interrupted");
            ExitCode::FAILURE
        }
    }
}
