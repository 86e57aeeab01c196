use release_sync::FetchError;
use serde::Deserialize;

use crate::DEFAULT_API_BASE;
use crate::transport::{HeaderSet, HttpTransport};

/// Response from GitHub's latest-release API.
/// `GET /repos/{owner}/{repo}/releases/latest`
#[derive(Debug, Clone, Deserialize)]
pub struct LatestRelease {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// A downloadable file attached to a release.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
}

impl LatestRelease {
    pub fn asset(&self, name: &str) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|a| a.name == name)
    }
}

/// HTTP client for GitHub release metadata.
#[derive(Debug, Clone)]
pub struct ReleaseClient {
    transport: HttpTransport,
    headers: HeaderSet,
    api_base_url: Option<String>,
}

impl ReleaseClient {
    pub fn new(transport: HttpTransport, headers: HeaderSet, api_base_url: Option<String>) -> Self {
        Self {
            transport,
            headers,
            api_base_url,
        }
    }

    fn api_base(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    /// Fetch the latest published release of `owner/repo`.
    pub async fn latest(&self, owner: &str, repo: &str) -> Result<LatestRelease, FetchError> {
        let url = format!(
            "{}/repos/{}/{}/releases/latest",
            self.api_base(),
            owner,
            repo
        );
        self.transport.get_json(&url, &self.headers).await
    }
}
