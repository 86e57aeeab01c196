pub mod distributions;
pub mod fetcher;
pub mod release;
pub mod tags;
pub mod transport;

/// Base URL of the public GitHub REST API.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

pub use distributions::{Architecture, DistributionIndex};
pub use fetcher::{ArtifactFetcher, filename_from_url};
pub use release::{LatestRelease, ReleaseAsset, ReleaseClient};
pub use tags::GitHubTagResolver;
pub use transport::{HeaderSet, HttpMethod, HttpTransport};
