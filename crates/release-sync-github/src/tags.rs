use std::sync::Arc;
use std::time::Duration;

use release_sync::{
    Feedback, FeedbackSink, FetchError, ResolveError, ResolvedTag, Tag, TagResolver, Waiter,
    order_newest_first, parse_commit_date,
};
use serde::Deserialize;

use crate::DEFAULT_API_BASE;
use crate::transport::{HeaderSet, HttpTransport};

/// Pause between consecutive commit lookups.
pub const DEFAULT_TAG_DELAY: Duration = Duration::from_secs(3);

/// Resolves a repository's tags against the GitHub REST API.
///
/// Commit lookups run one at a time with a fixed pause between them to stay
/// under the API's rate limit. Running them concurrently would need real
/// quota accounting instead of the pause.
pub struct GitHubTagResolver {
    transport: HttpTransport,
    headers: HeaderSet,
    api_base_url: Option<String>,
    waiter: Arc<dyn Waiter>,
    delay: Duration,
}

impl GitHubTagResolver {
    pub fn new(transport: HttpTransport, headers: HeaderSet, waiter: Arc<dyn Waiter>) -> Self {
        Self {
            transport,
            headers,
            api_base_url: None,
            waiter,
            delay: DEFAULT_TAG_DELAY,
        }
    }

    pub fn with_api_base(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = Some(api_base_url.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn api_base(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    pub fn tags_url(&self, owner: &str, repo: &str) -> String {
        format!("{}/repos/{}/{}/tags", self.api_base(), owner, repo)
    }

    /// Fetch the raw tag list, in the order the API returns it.
    pub async fn list_tags(&self, owner: &str, repo: &str) -> Result<Vec<Tag>, ResolveError> {
        let url = self.tags_url(owner, repo);

        self.transport
            .get_json::<Vec<Tag>>(&url, &self.headers)
            .await
            .map_err(|e| match e {
                FetchError::Download(source) => ResolveError::ListTags {
                    owner: owner.to_owned(),
                    repo: repo.to_owned(),
                    source,
                },
                other => ResolveError::Parse {
                    owner: owner.to_owned(),
                    repo: repo.to_owned(),
                    message: other.to_string(),
                },
            })
    }

    /// Look up the commit a tag points at and derive a resolved tag from it.
    pub async fn enrich(&self, tag: &Tag) -> Result<ResolvedTag, FetchError> {
        let commit: CommitResponse = self
            .transport
            .get_json(&tag.commit.url, &self.headers)
            .await?;

        let date = parse_commit_date(&commit.commit.author.date).map_err(|e| {
            FetchError::Parse(format!(
                "invalid commit date {:?} for {}: {e}",
                commit.commit.author.date, tag.name
            ))
        })?;

        Ok(ResolvedTag::from_tag(
            tag,
            date,
            commit.commit.message,
            commit.commit.author.name,
        ))
    }
}

#[async_trait::async_trait]
impl TagResolver for GitHubTagResolver {
    async fn resolve_ordered_tags(
        &self,
        owner: &str,
        repo: &str,
        feedback: &dyn FeedbackSink,
    ) -> Result<Vec<ResolvedTag>, ResolveError> {
        let tags = self.list_tags(owner, repo).await?;
        let total = tags.len();
        feedback.emit(Feedback::info(format!(
            "Found {total} tags in {owner}/{repo}"
        )));

        let mut resolved = Vec::with_capacity(total);

        for (i, tag) in tags.iter().enumerate() {
            match self.enrich(tag).await {
                Ok(r) => {
                    feedback.emit(Feedback::info(format!(
                        "[{}/{}] {} - {}",
                        i + 1,
                        total,
                        r.name,
                        r.commit_date.format("%Y-%m-%d %H:%M:%S")
                    )));
                    resolved.push(r);
                }
                Err(e) => {
                    feedback.emit(Feedback::warning(format!(
                        "skipping tag {}: {e}",
                        tag.name
                    )));
                }
            }

            if i + 1 < total {
                self.waiter.wait(self.delay).await;
            }
        }

        order_newest_first(&mut resolved);

        feedback.emit(Feedback::info(format!(
            "Ordered {} of {} tags by commit time",
            resolved.len(),
            total
        )));

        Ok(resolved)
    }
}

/// Response from `GET /repos/{owner}/{repo}/commits/{sha}`.
#[derive(Debug, Deserialize)]
struct CommitResponse {
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    author: CommitAuthor,
    message: String,
}

#[derive(Debug, Deserialize)]
struct CommitAuthor {
    name: String,
    date: String,
}
