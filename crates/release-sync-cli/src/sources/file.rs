use std::path::PathBuf;

use release_sync::{ArtifactSource, FeedbackSink, FetchError, SyncContext};
use release_sync_github::{ArtifactFetcher, HeaderSet};

/// A single file at a fixed URL, such as an install script.
pub struct FileSource {
    label: String,
    url: String,
    filename: Option<String>,
    fetcher: ArtifactFetcher,
    headers: HeaderSet,
}

impl FileSource {
    pub fn new(
        label: &str,
        url: &str,
        filename: Option<&str>,
        fetcher: ArtifactFetcher,
        headers: HeaderSet,
    ) -> Self {
        Self {
            label: label.to_owned(),
            url: url.to_owned(),
            filename: filename.map(str::to_owned),
            fetcher,
            headers,
        }
    }
}

#[async_trait::async_trait]
impl ArtifactSource for FileSource {
    fn label(&self) -> &str {
        &self.label
    }

    async fn fetch(
        &self,
        _context: &SyncContext,
        feedback: &dyn FeedbackSink,
    ) -> Result<Vec<PathBuf>, FetchError> {
        let path = self
            .fetcher
            .download(
                &self.url,
                self.filename.as_deref(),
                Some(&self.headers),
                feedback,
            )
            .await?;
        Ok(vec![path])
    }
}
