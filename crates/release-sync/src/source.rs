use std::path::PathBuf;
use std::sync::Arc;

use crate::error::FetchError;
use crate::feedback::FeedbackSink;

/// Release identity shared with every source during one sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncContext {
    /// Name of the newest resolved tag.
    pub latest_tag: String,
}

impl SyncContext {
    pub fn new(latest_tag: impl Into<String>) -> Self {
        Self {
            latest_tag: latest_tag.into(),
        }
    }
}

/// A named upstream project whose artifacts are mirrored locally.
///
/// A source that downloads several files must fail as a whole if any one of
/// them fails.
#[async_trait::async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Human-readable label identifying this source.
    fn label(&self) -> &str;

    /// Download every artifact of this source, returning the written paths.
    async fn fetch(
        &self,
        context: &SyncContext,
        feedback: &dyn FeedbackSink,
    ) -> Result<Vec<PathBuf>, FetchError>;
}

#[async_trait::async_trait]
impl<T: ArtifactSource + ?Sized> ArtifactSource for Arc<T> {
    fn label(&self) -> &str {
        (**self).label()
    }

    async fn fetch(
        &self,
        context: &SyncContext,
        feedback: &dyn FeedbackSink,
    ) -> Result<Vec<PathBuf>, FetchError> {
        (**self).fetch(context, feedback).await
    }
}
