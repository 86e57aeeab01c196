use std::path::{Path, PathBuf};

use release_sync::{Feedback, FeedbackSink, FetchError, format_size};
use tokio::io::AsyncWriteExt;

use crate::transport::{HeaderSet, HttpMethod, HttpTransport, classify};

/// Size of each write to the destination file.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Directory artifacts are written to unless configured otherwise.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Downloads single artifacts into a data directory.
///
/// The data directory must already exist.
#[derive(Debug, Clone)]
pub struct ArtifactFetcher {
    transport: HttpTransport,
    data_dir: PathBuf,
}

impl ArtifactFetcher {
    pub fn new(transport: HttpTransport, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            transport,
            data_dir: data_dir.into(),
        }
    }

    pub fn destination(&self, filename: &str) -> PathBuf {
        self.data_dir.join(filename)
    }

    /// Download `url` into the data directory and return the written path.
    ///
    /// The file is named `filename`, or after the last path segment of the
    /// URL. An existing file with that name is replaced once the whole body
    /// has arrived.
    pub async fn download(
        &self,
        url: &str,
        filename: Option<&str>,
        headers: Option<&HeaderSet>,
        feedback: &dyn FeedbackSink,
    ) -> Result<PathBuf, FetchError> {
        let filename = match filename {
            Some(name) => validate_filename(name)?.to_owned(),
            None => filename_from_url(url)?.to_owned(),
        };
        let default_headers = HeaderSet::new();
        let headers = headers.unwrap_or(&default_headers);

        match self.stream_to_file(url, &filename, headers, feedback).await {
            Ok(path) => Ok(path),
            Err(e) => {
                feedback.emit(Feedback::error(format!(
                    "download failed for {filename}: {e}"
                )));
                Err(e)
            }
        }
    }

    /// Ask the server for the artifact's size without downloading it.
    ///
    /// Returns 0 when the server does not declare a length or the probe
    /// fails; the size is only used for progress messages.
    pub async fn probe_size(
        &self,
        url: &str,
        headers: &HeaderSet,
        feedback: &dyn FeedbackSink,
    ) -> u64 {
        match self.transport.head(url, headers).await {
            Ok(response) => declared_length(&response).unwrap_or(0),
            Err(e) => {
                feedback.emit(Feedback::warning(format!(
                    "could not determine size of {url}: {e}"
                )));
                0
            }
        }
    }

    async fn stream_to_file(
        &self,
        url: &str,
        filename: &str,
        headers: &HeaderSet,
        feedback: &dyn FeedbackSink,
    ) -> Result<PathBuf, FetchError> {
        let declared = self.probe_size(url, headers, feedback).await;
        feedback.emit(Feedback::info(format!(
            "Downloading {filename} ({})",
            format_size(declared)
        )));

        let mut response = self
            .transport
            .request(HttpMethod::Get, url, headers, None, true)
            .await?;

        let destination = self.destination(filename);
        let staging = staging_path(&destination);

        let written = match write_body(&mut response, url, &staging).await {
            Ok(written) => written,
            Err(e) => {
                let _ = tokio::fs::remove_file(&staging).await;
                return Err(e);
            }
        };

        tokio::fs::rename(&staging, &destination)
            .await
            .map_err(|e| FetchError::io(&destination, e))?;

        feedback.emit(Feedback::info(format!(
            "Downloaded {filename} ({})",
            format_size(written)
        )));

        Ok(destination)
    }
}

/// Derive a filename from the last path segment of `url`, ignoring any
/// query string or fragment.
pub fn filename_from_url(url: &str) -> Result<&str, FetchError> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);

    validate_filename(segment).map_err(|_| {
        FetchError::InvalidFilename(format!("cannot derive a filename from {url}"))
    })
}

fn validate_filename(name: &str) -> Result<&str, FetchError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(FetchError::InvalidFilename(name.to_owned()));
    }
    Ok(name)
}

fn staging_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    destination.with_file_name(name)
}

fn declared_length(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get(reqwest::header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

async fn write_body(
    response: &mut reqwest::Response,
    url: &str,
    path: &Path,
) -> Result<u64, FetchError> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| FetchError::io(path, e))?;

    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await.map_err(|e| classify(&e, url))? {
        if chunk.is_empty() {
            continue;
        }
        for piece in chunk.chunks(CHUNK_SIZE) {
            file.write_all(piece)
                .await
                .map_err(|e| FetchError::io(path, e))?;
            written += piece.len() as u64;
        }
    }

    file.flush().await.map_err(|e| FetchError::io(path, e))?;
    Ok(written)
}
