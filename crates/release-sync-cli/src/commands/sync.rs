use std::process::ExitCode;

use release_sync::{SyncOrchestrator, SyncStatus};

use super::format::{self, ConsoleFeedback};

/// Resolve the current release, fetch every source, and print a summary.
///
/// Progress goes to stdout and problems to stderr as they happen.
pub async fn run(orchestrator: &SyncOrchestrator) -> ExitCode {
    println!(
        "Syncing {} sources: {}",
        orchestrator.source_labels().len(),
        orchestrator.source_labels().join(", ")
    );

    let status = orchestrator.run(&ConsoleFeedback).await;

    if let Some(report) = status.report() {
        println!("{}", format::summary_line(report));
    }

    ExitCode::from(exit_status(&status))
}

/// Process exit status for a finished run: 0 on success, 1 otherwise.
pub fn exit_status(status: &SyncStatus) -> u8 {
    if status.is_success() { 0 } else { 1 }
}
