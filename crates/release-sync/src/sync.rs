use std::path::PathBuf;

use crate::error::ResolveError;
use crate::feedback::{Feedback, FeedbackSink};
use crate::source::{ArtifactSource, SyncContext};
use crate::tag::{ResolvedTag, TagResolver};

/// Number of resolved tags listed in feedback before summarizing the rest.
pub const TAG_PREVIEW_LIMIT: usize = 10;

/// How many sources must succeed for a run to count as successful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncThreshold {
    /// Every source must succeed.
    #[default]
    All,
    /// At least this many sources must succeed.
    AtLeast(usize),
}

impl SyncThreshold {
    pub fn from_min_successes(min_successes: Option<usize>) -> Self {
        min_successes.map_or(Self::All, Self::AtLeast)
    }

    pub fn is_met(&self, succeeded: usize, attempted: usize) -> bool {
        match self {
            Self::All => succeeded == attempted,
            Self::AtLeast(min) => succeeded >= *min,
        }
    }
}

/// Result of running one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub label: String,
    pub files: Vec<PathBuf>,
    pub error: Option<String>,
}

impl FetchOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate of a sync run that got as far as downloading.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub latest_tag: String,
    pub tags: Vec<ResolvedTag>,
    pub outcomes: Vec<FetchOutcome>,
    pub threshold: SyncThreshold,
}

impl SyncReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn passed(&self) -> bool {
        self.threshold.is_met(self.succeeded(), self.attempted())
    }

    pub fn failed_labels(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| !o.succeeded())
            .map(|o| o.label.as_str())
            .collect()
    }
}

/// Overall outcome of [`SyncOrchestrator::run`].
#[derive(Debug)]
pub enum SyncStatus {
    /// Enough sources succeeded.
    Success(SyncReport),
    /// Downloads ran but too few sources succeeded.
    Insufficient(SyncReport),
    /// The tag list could not be fetched; nothing was downloaded.
    ResolutionFailed(ResolveError),
    /// The repository has no resolvable tags; nothing was downloaded.
    NoTags,
}

impl SyncStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn report(&self) -> Option<&SyncReport> {
        match self {
            Self::Success(report) | Self::Insufficient(report) => Some(report),
            Self::ResolutionFailed(_) | Self::NoTags => None,
        }
    }
}

/// Resolves the current release of one repository, then runs every
/// configured source in order.
///
/// Sources are isolated from each other: a failing source is recorded and
/// the next one still runs.
pub struct SyncOrchestrator {
    resolver: Box<dyn TagResolver>,
    owner: String,
    repo: String,
    sources: Vec<Box<dyn ArtifactSource>>,
    threshold: SyncThreshold,
}

impl SyncOrchestrator {
    pub fn new(
        resolver: Box<dyn TagResolver>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        sources: Vec<Box<dyn ArtifactSource>>,
    ) -> Self {
        Self {
            resolver,
            owner: owner.into(),
            repo: repo.into(),
            sources,
            threshold: SyncThreshold::default(),
        }
    }

    pub fn with_threshold(mut self, threshold: SyncThreshold) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn source_labels(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.label()).collect()
    }

    pub async fn run(&self, feedback: &dyn FeedbackSink) -> SyncStatus {
        feedback.emit(Feedback::info(format!(
            "Resolving tags for {}/{}...",
            self.owner, self.repo
        )));

        let tags = match self
            .resolver
            .resolve_ordered_tags(&self.owner, &self.repo, feedback)
            .await
        {
            Ok(tags) => tags,
            Err(e) => {
                feedback.emit(Feedback::error(e.to_string()));
                return SyncStatus::ResolutionFailed(e);
            }
        };

        let Some(latest) = tags.first() else {
            feedback.emit(Feedback::error(format!(
                "no tags found for {}/{}",
                self.owner, self.repo
            )));
            return SyncStatus::NoTags;
        };

        emit_tag_preview(&tags, feedback);

        let context = SyncContext::new(latest.name.clone());
        feedback.emit(Feedback::info(format!(
            "Latest release: {}",
            context.latest_tag
        )));

        let outcomes = self.fetch_all(&context, feedback).await;

        let report = SyncReport {
            latest_tag: context.latest_tag,
            tags,
            outcomes,
            threshold: self.threshold,
        };

        feedback.emit(Feedback::info(format!(
            "Downloaded {}/{} sources",
            report.succeeded(),
            report.attempted()
        )));

        if report.passed() {
            SyncStatus::Success(report)
        } else {
            feedback.emit(Feedback::warning(format!(
                "not enough sources succeeded (failed: {})",
                report.failed_labels().join(", ")
            )));
            SyncStatus::Insufficient(report)
        }
    }

    /// Run every source once, in order, regardless of earlier failures.
    pub async fn fetch_all(
        &self,
        context: &SyncContext,
        feedback: &dyn FeedbackSink,
    ) -> Vec<FetchOutcome> {
        let mut outcomes = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            feedback.emit(Feedback::info(format!("Fetching [{}]...", source.label())));

            let outcome = match source.fetch(context, feedback).await {
                Ok(files) => FetchOutcome {
                    label: source.label().to_owned(),
                    files,
                    error: None,
                },
                Err(e) => {
                    feedback.emit(Feedback::error(format!(
                        "[{}] failed: {e}",
                        source.label()
                    )));
                    FetchOutcome {
                        label: source.label().to_owned(),
                        files: Vec::new(),
                        error: Some(e.to_string()),
                    }
                }
            };
            outcomes.push(outcome);
        }

        outcomes
    }
}

fn emit_tag_preview(tags: &[ResolvedTag], feedback: &dyn FeedbackSink) {
    feedback.emit(Feedback::info("Tags, newest first:"));
    for (i, tag) in tags.iter().take(TAG_PREVIEW_LIMIT).enumerate() {
        feedback.emit(Feedback::info(format!(
            "{:2}. {:20} {}",
            i + 1,
            tag.name,
            tag.commit_date.format("%Y-%m-%d %H:%M:%S")
        )));
    }
    if tags.len() > TAG_PREVIEW_LIMIT {
        feedback.emit(Feedback::info(format!(
            "    ... and {} more",
            tags.len() - TAG_PREVIEW_LIMIT
        )));
    }
}
