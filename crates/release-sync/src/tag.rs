use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

use crate::error::ResolveError;
use crate::feedback::FeedbackSink;

/// A version tag as listed by the hosting API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Tag {
    pub name: String,
    pub commit: CommitRef,
}

/// Pointer from a tag to the commit it names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommitRef {
    pub sha: String,
    pub url: String,
}

/// A tag enriched with details of the commit it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTag {
    pub name: String,
    pub commit: CommitRef,
    pub commit_date: DateTime<FixedOffset>,
    pub commit_message: String,
    pub author_name: String,
}

impl ResolvedTag {
    /// Derive a resolved tag from a listed one.
    pub fn from_tag(
        tag: &Tag,
        commit_date: DateTime<FixedOffset>,
        commit_message: impl Into<String>,
        author_name: impl Into<String>,
    ) -> Self {
        Self {
            name: tag.name.clone(),
            commit: tag.commit.clone(),
            commit_date,
            commit_message: commit_message.into(),
            author_name: author_name.into(),
        }
    }

    /// ISO-8601 rendering with an explicit offset (`+00:00` rather than `Z`).
    pub fn commit_date_iso(&self) -> String {
        self.commit_date.to_rfc3339()
    }
}

/// Parse a commit timestamp. A trailing `Z` is accepted and normalized to a
/// `+00:00` offset.
pub fn parse_commit_date(raw: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw)
}

/// Order tags newest first. Tags with equal timestamps keep their listing
/// order.
pub fn order_newest_first(tags: &mut [ResolvedTag]) {
    tags.sort_by(|a, b| b.commit_date.cmp(&a.commit_date));
}

/// Produces the ordered tag sequence for a repository.
#[async_trait::async_trait]
pub trait TagResolver: Send + Sync {
    /// List the repository's tags, enrich each with its commit, and return
    /// them newest first.
    ///
    /// Fails only if the tag list itself cannot be fetched. Tags whose commit
    /// cannot be fetched are left out, so `Ok(vec![])` is a valid result.
    async fn resolve_ordered_tags(
        &self,
        owner: &str,
        repo: &str,
        feedback: &dyn FeedbackSink,
    ) -> Result<Vec<ResolvedTag>, ResolveError>;
}

#[async_trait::async_trait]
impl<T: TagResolver + ?Sized> TagResolver for Arc<T> {
    async fn resolve_ordered_tags(
        &self,
        owner: &str,
        repo: &str,
        feedback: &dyn FeedbackSink,
    ) -> Result<Vec<ResolvedTag>, ResolveError> {
        (**self).resolve_ordered_tags(owner, repo, feedback).await
    }
}
