use std::sync::Mutex;

/// Structured feedback emitted while resolving tags and fetching artifacts.
///
/// Library code never prints. It hands feedback to a [`FeedbackSink`] and
/// the caller decides how to present it (the CLI prints, tests collect).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    /// Informational message (progress, status updates).
    Info(String),
    /// Warning - operation continued but something noteworthy occurred.
    Warning(String),
    /// Error - something failed (may or may not be fatal depending on context).
    Error(String),
}

impl Feedback {
    pub fn info(msg: impl Into<String>) -> Self {
        Self::Info(msg.into())
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self::Warning(msg.into())
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error(msg.into())
    }

    /// Returns true if this is an error.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Returns true if this is a warning.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Warning(_))
    }

    /// Returns true if this is info.
    pub fn is_info(&self) -> bool {
        matches!(self, Self::Info(_))
    }

    /// Get the message text.
    pub fn message(&self) -> &str {
        match self {
            Self::Info(msg) | Self::Warning(msg) | Self::Error(msg) => msg,
        }
    }
}

impl std::fmt::Display for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info(msg) => write!(f, "{msg}"),
            Self::Warning(msg) => write!(f, "warning: {msg}"),
            Self::Error(msg) => write!(f, "error: {msg}"),
        }
    }
}

/// Receives feedback as it is produced.
pub trait FeedbackSink: Send + Sync {
    fn emit(&self, feedback: Feedback);
}

/// Discards everything.
pub struct NullFeedback;

impl FeedbackSink for NullFeedback {
    fn emit(&self, _feedback: Feedback) {}
}

/// Collects feedback in memory, in emission order.
#[derive(Default)]
pub struct FeedbackLog {
    entries: Mutex<Vec<Feedback>>,
}

impl FeedbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn entries(&self) -> Vec<Feedback> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn warnings(&self) -> Vec<Feedback> {
        self.entries().into_iter().filter(Feedback::is_warning).collect()
    }

    pub fn errors(&self) -> Vec<Feedback> {
        self.entries().into_iter().filter(Feedback::is_error).collect()
    }

    /// Returns true if any entry's message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries().iter().any(|f| f.message().contains(needle))
    }
}

impl FeedbackSink for FeedbackLog {
    fn emit(&self, feedback: Feedback) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(feedback);
        }
    }
}
