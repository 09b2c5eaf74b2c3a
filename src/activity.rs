//! Recent-activity aggregation across all tracked repositories.
//!
//! For one author: read each repository's latest commits, diff every commit,
//! keep the changed files that match the file filter and add at least one
//! line, then merge everything newest-first into a bounded window.
//!
//! Repositories are queried concurrently; inside one repository the handle
//! serializes git processes. A repository whose log or diff fails is skipped
//! with a warning and the rest still answer. Only a missing repository root
//! fails the whole query.

use std::time::Instant;

use futures::future::{join_all, try_join_all};

use crate::config::FileFilter;
use crate::error::Result;
use crate::git::diff::parse_unified_diff;
use crate::git::RepositoryHandle;
use crate::models::{ActivityItem, CommitRecord};
use crate::state::AppContext;

pub async fn find_activity(ctx: &AppContext, author: &str) -> Result<Vec<ActivityItem>> {
    let started = Instant::now();
    let names = ctx.repositories.list_names().await?;
    let depth = ctx.config.commits_per_repository;

    let per_repository = names.iter().map(|name| async move {
        let handle = ctx.handles.get(name);
        match repository_activity(&handle, author, depth).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!("Skipping repository {} in activity query: {}", name, e);
                Vec::new()
            }
        }
    });

    let found: Vec<ActivityItem> = join_all(per_repository).await.into_iter().flatten().collect();
    let total = found.len();
    let items = select_activity(found, &ctx.config.file_filter, ctx.config.activity_limit);

    tracing::info!(
        "Activity for {:?}: {} repositories, {} changed files, {} returned in {:?}",
        author,
        names.len(),
        total,
        items.len(),
        started.elapsed()
    );

    Ok(items)
}

/// Every changed file of the author's recent commits in one repository, unfiltered.
async fn repository_activity(
    handle: &RepositoryHandle,
    author: &str,
    depth: usize,
) -> Result<Vec<ActivityItem>> {
    let commits = handle.commits_by_author(author, depth).await?;
    let diffs = try_join_all(commits.iter().map(|commit| handle.commit_diff(&commit.hash))).await?;

    Ok(commits
        .into_iter()
        .zip(diffs)
        .flat_map(|(commit, diff)| items_for_commit(commit, &diff))
        .collect())
}

fn items_for_commit(commit: CommitRecord, diff: &str) -> Vec<ActivityItem> {
    let Some(timestamp) = commit.timestamp_millis() else {
        tracing::warn!("Unreadable date {:?} on {} in {}", commit.date, commit.hash, commit.repo);
        return Vec::new();
    };

    parse_unified_diff(diff)
        .into_iter()
        .map(|change| ActivityItem {
            change,
            commit: commit.clone(),
            timestamp,
        })
        .collect()
}

/// Keep files whose new path matches `filter` and that insert at least one line,
/// newest first (stable for equal timestamps), at most `limit` of them.
pub fn select_activity(
    items: Vec<ActivityItem>,
    filter: &FileFilter,
    limit: usize,
) -> Vec<ActivityItem> {
    let mut selected: Vec<ActivityItem> = items
        .into_iter()
        .filter(|item| {
            item.change
                .new_path
                .as_deref()
                .is_some_and(|path| filter.is_match(path))
        })
        .filter(|item| item.change.has_insertions())
        .collect();

    selected.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    selected.truncate(limit);
    selected
}
