use std::path::PathBuf;

use release_sync::{ArtifactSource, Feedback, FeedbackSink, FetchError, SyncContext};
use release_sync_github::{
    Architecture, ArtifactFetcher, DistributionIndex, HeaderSet, HttpTransport,
};

/// Mirrors Linux distribution images listed in a JSON index document.
///
/// Every image URL is resolved before anything is downloaded, so an unknown
/// distribution fails the source without partial downloads.
pub struct DistributionImageSource {
    label: String,
    index_url: String,
    distributions: Vec<String>,
    architecture: Architecture,
    transport: HttpTransport,
    fetcher: ArtifactFetcher,
    headers: HeaderSet,
}

impl DistributionImageSource {
    pub fn new(
        label: &str,
        index_url: &str,
        distributions: &[String],
        architecture: Architecture,
        transport: HttpTransport,
        fetcher: ArtifactFetcher,
        headers: HeaderSet,
    ) -> Self {
        Self {
            label: label.to_owned(),
            index_url: index_url.to_owned(),
            distributions: distributions.to_vec(),
            architecture,
            transport,
            fetcher,
            headers,
        }
    }
}

#[async_trait::async_trait]
impl ArtifactSource for DistributionImageSource {
    fn label(&self) -> &str {
        &self.label
    }

    async fn fetch(
        &self,
        _context: &SyncContext,
        feedback: &dyn FeedbackSink,
    ) -> Result<Vec<PathBuf>, FetchError> {
        let index =
            DistributionIndex::fetch(&self.transport, &self.index_url, &self.headers).await?;

        let urls = self
            .distributions
            .iter()
            .map(|name| index.image_url(name, self.architecture))
            .collect::<Result<Vec<_>, _>>()?;

        let mut written = Vec::with_capacity(urls.len());
        for (name, url) in self.distributions.iter().zip(urls) {
            feedback.emit(Feedback::info(format!(
                "{name} {} image: {url}",
                self.architecture
            )));
            let path = self
                .fetcher
                .download(url, None, Some(&self.headers), feedback)
                .await?;
            written.push(path);
        }

        Ok(written)
    }
}
