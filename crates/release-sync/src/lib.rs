pub mod error;
pub mod feedback;
pub mod size;
pub mod source;
pub mod sync;
pub mod tag;
pub mod waiter;

pub use error::{DownloadError, FetchError, ResolveError};
pub use feedback::{Feedback, FeedbackLog, FeedbackSink, NullFeedback};
pub use size::format_size;
pub use source::{ArtifactSource, SyncContext};
pub use sync::{FetchOutcome, SyncOrchestrator, SyncReport, SyncStatus, SyncThreshold};
pub use tag::{CommitRef, ResolvedTag, Tag, TagResolver, order_newest_first, parse_commit_date};
pub use waiter::{TokioWaiter, Waiter};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
