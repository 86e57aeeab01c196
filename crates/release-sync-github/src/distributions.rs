use std::collections::HashMap;
use std::fmt;

use release_sync::FetchError;
use serde::{Deserialize, Serialize};

use crate::transport::{HeaderSet, HttpTransport};

/// Published index of installable Linux distribution images.
///
/// Only the fields needed to locate image URLs are modeled.
#[derive(Debug, Clone, Deserialize)]
pub struct DistributionIndex {
    #[serde(rename = "ModernDistributions", default)]
    pub modern_distributions: HashMap<String, Vec<DistributionEntry>>,
}

/// One published version of a distribution.
#[derive(Debug, Clone, Deserialize)]
pub struct DistributionEntry {
    #[serde(rename = "Amd64Url")]
    pub amd64_url: Option<ImageUrl>,
    #[serde(rename = "Arm64Url")]
    pub arm64_url: Option<ImageUrl>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageUrl {
    #[serde(rename = "Url")]
    pub url: String,
}

/// CPU architecture of a distribution image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum Architecture {
    #[default]
    #[serde(alias = "amd64", alias = "x64", alias = "x86_64")]
    Amd64,
    #[serde(alias = "arm64", alias = "aarch64")]
    Arm64,
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amd64 => write!(f, "Amd64"),
            Self::Arm64 => write!(f, "Arm64"),
        }
    }
}

impl DistributionEntry {
    pub fn image(&self, arch: Architecture) -> Option<&ImageUrl> {
        match arch {
            Architecture::Amd64 => self.amd64_url.as_ref(),
            Architecture::Arm64 => self.arm64_url.as_ref(),
        }
    }
}

impl DistributionIndex {
    pub async fn fetch(
        transport: &HttpTransport,
        url: &str,
        headers: &HeaderSet,
    ) -> Result<Self, FetchError> {
        transport.get_json(url, headers).await
    }

    /// URL of the first listed image of `distribution` for `arch`.
    pub fn image_url(&self, distribution: &str, arch: Architecture) -> Result<&str, FetchError> {
        let entry = self
            .modern_distributions
            .get(distribution)
            .and_then(|entries| entries.first())
            .ok_or_else(|| FetchError::Missing(format!("distribution {distribution}")))?;

        entry
            .image(arch)
            .map(|image| image.url.as_str())
            .ok_or_else(|| FetchError::Missing(format!("{arch} image for {distribution}")))
    }
}
