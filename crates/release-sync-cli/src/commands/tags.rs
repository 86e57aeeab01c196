use anyhow::Result;
use release_sync::TagResolver;

use super::format::{self, ConsoleFeedback};

/// Print the tags of `owner/repo`, newest commit first.
pub async fn run(
    resolver: &dyn TagResolver,
    owner: &str,
    repo: &str,
    limit: Option<usize>,
) -> Result<()> {
    let mut tags = resolver
        .resolve_ordered_tags(owner, repo, &ConsoleFeedback)
        .await?;

    if tags.is_empty() {
        anyhow::bail!("no tags found for {owner}/{repo}");
    }

    if let Some(limit) = limit {
        tags.truncate(limit);
    }

    format::print_tag_table(&tags);
    Ok(())
}
