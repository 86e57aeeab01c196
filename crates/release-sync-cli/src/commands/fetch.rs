use anyhow::Result;
use release_sync_github::{ArtifactFetcher, HeaderSet};

use super::format::ConsoleFeedback;

/// Download one URL into the data directory.
pub async fn run(
    fetcher: &ArtifactFetcher,
    url: &str,
    filename: Option<&str>,
    headers: &HeaderSet,
) -> Result<()> {
    let path = fetcher
        .download(url, filename, Some(headers), &ConsoleFeedback)
        .await?;
    println!("Saved {}", path.display());
    Ok(())
}
