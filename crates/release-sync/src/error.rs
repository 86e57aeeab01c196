use std::path::PathBuf;

/// Failure of a single HTTP request.
///
/// Every transport failure is reported as one of these variants so callers
/// can handle network problems uniformly. `UnsupportedMethod` is a usage
/// error rather than a network error; see [`DownloadError::is_network`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DownloadError {
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("request timed out: {url}")]
    Timeout { url: String },

    #[error("connection failed: {url}")]
    Connection { url: String },

    #[error("unknown error: {message}")]
    Unknown { message: String },
}

impl DownloadError {
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    /// Returns true for failures that happened on the wire (or at the remote
    /// end), false for caller mistakes.
    pub fn is_network(&self) -> bool {
        !matches!(self, Self::UnsupportedMethod(_))
    }

    /// The HTTP status code, if the server answered with a non-2xx status.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors produced while fetching artifacts for a source.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error("I/O error at {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("not found: {0}")]
    Missing(String),

    #[error("invalid filename: {0:?}")]
    InvalidFilename(String),
}

impl FetchError {
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Errors that abort a whole tag resolution.
///
/// Failures enriching individual tags are not represented here; those tags
/// are dropped from the result instead.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("failed to list tags for {owner}/{repo}: {source}")]
    ListTags {
        owner: String,
        repo: String,
        #[source]
        source: DownloadError,
    },

    #[error("failed to parse tag list for {owner}/{repo}: {message}")]
    Parse {
        owner: String,
        repo: String,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_method_is_not_a_network_error() {
        assert!(!DownloadError::UnsupportedMethod("PATCH".into()).is_network());
        assert!(DownloadError::Timeout { url: "u".into() }.is_network());
        assert!(DownloadError::unknown("boom").is_network());
    }

    #[test]
    fn status_only_for_http_errors() {
        let err = DownloadError::Http {
            status: 404,
            url: "https://example.com/a".into(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "HTTP 404 from https://example.com/a");
        assert_eq!(
            DownloadError::Connection { url: "u".into() }.status(),
            None
        );
    }

    #[test]
    fn fetch_error_is_transparent_over_download_error() {
        let err: FetchError = DownloadError::Timeout {
            url: "https://example.com".into(),
        }
        .into();
        assert_eq!(err.to_string(), "request timed out: https://example.com");
    }

    #[test]
    fn list_failure_message_names_the_repository() {
        let err = ResolveError::ListTags {
            owner: "octo".into(),
            repo: "widgets".into(),
            source: DownloadError::Http {
                status: 403,
                url: "https://api.github.com/repos/octo/widgets/tags".into(),
            },
        };
        let msg = err.to_string();
        assert!(msg.starts_with("failed to list tags for octo/widgets"));
        assert!(msg.contains("HTTP 403"));
    }
}
