use release_sync::{Feedback, FeedbackSink, ResolvedTag, SyncReport};

const MAX_NAME_WIDTH: usize = 30;
const LINE_BUDGET: usize = 100;

/// Prints feedback as it arrives: info to stdout, everything else to stderr.
pub struct ConsoleFeedback;

impl FeedbackSink for ConsoleFeedback {
    fn emit(&self, feedback: Feedback) {
        match feedback {
            Feedback::Info(msg) => println!("{msg}"),
            other => eprintln!("{other}"),
        }
    }
}

pub fn print_tag_table(tags: &[ResolvedTag]) {
    if tags.is_empty() {
        return;
    }

    let name_width = tags
        .iter()
        .map(|t| t.name.chars().count())
        .max()
        .unwrap_or(0)
        .min(MAX_NAME_WIDTH);

    for (i, tag) in tags.iter().enumerate() {
        println!("{}", tag_row(i + 1, tag, name_width));
    }

    println!("\n{} tags", tags.len());
}

fn tag_row(position: usize, tag: &ResolvedTag, name_width: usize) -> String {
    let name = truncate(&tag.name, name_width);
    let date = tag.commit_date_iso();
    let prefix = format!("{position:>3}. {name:<name_width$}  {date}  ");
    let budget = LINE_BUDGET.saturating_sub(prefix.chars().count());
    let subject = tag.commit_message.lines().next().unwrap_or("");
    format!("{prefix}{}", truncate(subject, budget))
}

/// One-line outcome of a sync run.
pub fn summary_line(report: &SyncReport) -> String {
    let failed = report.failed_labels();
    if failed.is_empty() {
        format!(
            "Synced {}/{} sources for {}",
            report.succeeded(),
            report.attempted(),
            report.latest_tag
        )
    } else {
        format!(
            "Synced {}/{} sources for {} (failed: {})",
            report.succeeded(),
            report.attempted(),
            report.latest_tag,
            failed.join(", ")
        )
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_owned()
    } else if max <= 3 {
        s.chars().take(max).collect()
    } else {
        let mut out: String = s.chars().take(max - 3).collect();
        out.push_str("...");
        out
    }
}
