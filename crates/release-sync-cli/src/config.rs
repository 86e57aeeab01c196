use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use release_sync::SyncThreshold;
use release_sync_github::Architecture;
use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Directory artifacts are written to.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Pause between commit lookups while resolving tags.
    #[serde(default = "default_tag_delay_secs")]
    pub tag_delay_secs: u64,
    /// User agent for plain (non-API) downloads.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Minimum number of sources that must succeed. Unset means all of them.
    #[serde(default)]
    pub min_successes: Option<usize>,
    /// Repository whose tags identify the current release.
    #[serde(default = "default_release")]
    pub release: ReleaseRepo,
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReleaseRepo {
    pub owner: String,
    pub repo: String,
}

/// A single source definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceEntry {
    pub label: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(flatten)]
    pub source_type: SourceType,
}

/// The kind of upstream source.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum SourceType {
    /// Assets of a repository's latest GitHub release. Asset names may use
    /// `{tag}` (the release's tag) and `{latest}` (the newest resolved tag).
    #[serde(rename = "github-release")]
    GitHubRelease {
        owner: String,
        repo: String,
        assets: Vec<String>,
    },

    /// Images listed in a distribution index JSON document.
    #[serde(rename = "distribution-images")]
    DistributionImages {
        index_url: String,
        distributions: Vec<String>,
        #[serde(default)]
        architecture: Architecture,
    },

    /// A single file at a fixed URL.
    #[serde(rename = "file")]
    File {
        url: String,
        filename: Option<String>,
    },
}

impl AppConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn tag_delay(&self) -> Duration {
        Duration::from_secs(self.tag_delay_secs)
    }

    pub fn threshold(&self) -> SyncThreshold {
        SyncThreshold::from_min_successes(self.min_successes)
    }

    pub fn enabled_sources(&self) -> impl Iterator<Item = &SourceEntry> {
        self.sources.iter().filter(|s| s.enabled)
    }

    /// Reject configurations whose success threshold can never be
    /// meaningful: nothing to download, or more required successes than
    /// enabled sources.
    pub fn validate(&self) -> Result<()> {
        let enabled = self.enabled_sources().count();
        if enabled == 0 {
            anyhow::bail!("no sources are enabled");
        }

        match self.min_successes {
            Some(0) => anyhow::bail!("min_successes must be at least 1"),
            Some(min) if min > enabled => anyhow::bail!(
                "min_successes is {min} but only {enabled} sources are enabled"
            ),
            _ => Ok(()),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            timeout_secs: default_timeout_secs(),
            tag_delay_secs: default_tag_delay_secs(),
            user_agent: default_user_agent(),
            min_successes: None,
            release: default_release(),
            sources: default_sources(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(release_sync_github::fetcher::DEFAULT_DATA_DIR)
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_tag_delay_secs() -> u64 {
    3
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/142.0.0.0 Safari/537.36 Edg/142.0.0.0".into()
}

fn default_release() -> ReleaseRepo {
    ReleaseRepo {
        owner: "asxez".into(),
        repo: "DockerDesktop-CN".into(),
    }
}

/// Built-in registry of default sources.
pub fn default_sources() -> Vec<SourceEntry> {
    vec![
        SourceEntry {
            label: "docker-desktop".into(),
            enabled: true,
            source_type: SourceType::GitHubRelease {
                owner: "asxez".into(),
                repo: "DockerDesktop-CN".into(),
                assets: vec![
                    "app-Windows-x86.asar".into(),
                    "app-Windows-x86-v2beta.asar".into(),
                    "DockerDesktop-{tag}-Windows-x86.exe".into(),
                ],
            },
        },
        SourceEntry {
            label: "wsl".into(),
            enabled: true,
            source_type: SourceType::GitHubRelease {
                owner: "microsoft".into(),
                repo: "WSL".into(),
                assets: vec!["wsl.{tag}.0.x64.msi".into()],
            },
        },
        SourceEntry {
            label: "wsl-distributions".into(),
            enabled: true,
            source_type: SourceType::DistributionImages {
                index_url: "https://raw.githubusercontent.com/microsoft/WSL/refs/heads/master/distributions/DistributionInfo.json".into(),
                distributions: vec!["Ubuntu".into(), "Debian".into()],
                architecture: Architecture::Amd64,
            },
        },
        SourceEntry {
            label: "docker-install-script".into(),
            enabled: true,
            source_type: SourceType::File {
                url: "https://get.docker.com".into(),
                filename: Some("docker.sh".into()),
            },
        },
    ]
}

/// Config file path: `~/.config/release-sync/sources.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("release-sync").join("sources.toml"))
}

/// Load configuration.
///
/// An explicitly given file must exist, parse and validate. Otherwise the default
/// config file is used if present, falling back to built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config at {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config at {}", path.display()))?;
        return Ok(config);
    }

    if let Some(path) = config_path()
        && let Ok(contents) = std::fs::read_to_string(&path)
    {
        if let Ok(config) = toml::from_str::<AppConfig>(&contents) {
            config
                .validate()
                .with_context(|| format!("invalid config at {}", path.display()))?;
            return Ok(config);
        }
        eprintln!(
            "warning: failed to parse config at {}, using defaults",
            path.display()
        );
    }

    Ok(AppConfig::default())
}
