use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::tag::{CommitRef, ResolvedTag, Tag, TagResolver, parse_commit_date};
use crate::{
    ArtifactSource, DownloadError, FeedbackSink, FetchError, ResolveError, SyncContext, Waiter,
};

/// Build a resolved tag with a placeholder commit.
pub fn resolved_tag(name: &str, commit_date: &str) -> ResolvedTag {
    let tag = Tag {
        name: name.to_owned(),
        commit: CommitRef {
            sha: format!("sha-{name}"),
            url: format!("https://api.example.com/commits/sha-{name}"),
        },
    };
    let date = parse_commit_date(commit_date).expect("test dates are RFC 3339");
    ResolvedTag::from_tag(&tag, date, format!("Release {name}"), "test-author")
}

/// Tag resolver returning a canned result.
pub struct FakeTagResolver {
    result: Result<Vec<ResolvedTag>, DownloadError>,
}

impl FakeTagResolver {
    pub fn with_tags(tags: Vec<ResolvedTag>) -> Self {
        Self { result: Ok(tags) }
    }

    /// Fail as if the tag list request returned `error`.
    pub fn failing(error: DownloadError) -> Self {
        Self { result: Err(error) }
    }
}

#[async_trait::async_trait]
impl TagResolver for FakeTagResolver {
    async fn resolve_ordered_tags(
        &self,
        owner: &str,
        repo: &str,
        _feedback: &dyn FeedbackSink,
    ) -> Result<Vec<ResolvedTag>, ResolveError> {
        self.result.clone().map_err(|source| ResolveError::ListTags {
            owner: owner.to_owned(),
            repo: repo.to_owned(),
            source,
        })
    }
}

/// Source that succeeds or fails on demand and records how it was called.
pub struct FakeSource {
    label: String,
    files: Vec<PathBuf>,
    fails: bool,
    calls: AtomicUsize,
    contexts: Mutex<Vec<SyncContext>>,
}

impl FakeSource {
    pub fn succeeding(label: impl Into<String>, files: &[&str]) -> Self {
        Self {
            label: label.into(),
            files: files.iter().map(PathBuf::from).collect(),
            fails: false,
            calls: AtomicUsize::new(0),
            contexts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(label: impl Into<String>) -> Self {
        Self {
            fails: true,
            ..Self::succeeding(label, &[])
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn contexts(&self) -> Vec<SyncContext> {
        self.contexts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ArtifactSource for FakeSource {
    fn label(&self) -> &str {
        &self.label
    }

    async fn fetch(
        &self,
        context: &SyncContext,
        _feedback: &dyn FeedbackSink,
    ) -> Result<Vec<PathBuf>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.contexts.lock().unwrap().push(context.clone());

        if self.fails {
            return Err(DownloadError::Connection {
                url: format!("https://downloads.example.com/{}", self.label),
            }
            .into());
        }
        Ok(self.files.clone())
    }
}

/// Waiter that returns immediately and remembers every requested delay.
#[derive(Default)]
pub struct RecordingWaiter {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingWaiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.delays.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Waiter for RecordingWaiter {
    async fn wait(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}
