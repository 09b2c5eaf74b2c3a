//! Fixture repositories for tests, built with git2 so authors and dates are fixed.

use std::fs;
use std::path::Path;

use git2::{Commit, Oid, Repository, Signature, Time};

use crate::config::{Config, DEFAULT_FILE_FILTER};
use crate::state::AppContext;

pub fn init_repo(path: &Path) -> Repository {
    Repository::init(path).expect("Failed to init repo")
}

pub fn context(root: &Path) -> AppContext {
    let config = Config::new(root, DEFAULT_FILE_FILTER, 20, 20).expect("valid test config");
    AppContext::new(config)
}

fn signature(author: &str, seconds: i64) -> Signature<'static> {
    Signature::new(author, &format!("{}@example.com", author), &Time::new(seconds, 0))
        .expect("Failed to create signature")
}

fn head_commit(repo: &Repository) -> Option<Commit<'_>> {
    repo.head().ok().and_then(|head| head.peel_to_commit().ok())
}

fn stage(repo: &Repository, file: &str) -> Oid {
    let mut index = repo.index().expect("Failed to get index");
    index.add_path(Path::new(file)).expect("Failed to add file");
    index.write().expect("Failed to write index");
    index.write_tree().expect("Failed to write tree")
}

fn write_line(repo: &Repository, file: &str, line: &str) {
    let path = repo.workdir().expect("non-bare repo").join(file);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    let mut contents = fs::read_to_string(&path).unwrap_or_default();
    contents.push_str(line);
    contents.push('\n');
    fs::write(&path, contents).expect("Failed to write file");
}

/// Append `line` to `file` and commit it on HEAD as `author` at `seconds`.
pub fn append_line(
    repo: &Repository,
    author: &str,
    seconds: i64,
    file: &str,
    line: &str,
    message: &str,
) -> Oid {
    write_line(repo, file, line);
    commit_on_head(repo, author, seconds, stage(repo, file), message)
}

/// Replace the whole content of `file` and commit it on HEAD as `author` at `seconds`.
pub fn rewrite_file(
    repo: &Repository,
    author: &str,
    seconds: i64,
    file: &str,
    contents: &str,
    message: &str,
) -> Oid {
    let path = repo.workdir().expect("non-bare repo").join(file);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    fs::write(&path, contents).expect("Failed to write file");
    commit_on_head(repo, author, seconds, stage(repo, file), message)
}

fn commit_on_head(repo: &Repository, author: &str, seconds: i64, tree: Oid, message: &str) -> Oid {
    let tree = repo.find_tree(tree).expect("Failed to find tree");
    let sig = signature(author, seconds);

    let parents: Vec<Commit<'_>> = head_commit(repo).into_iter().collect();
    let parent_refs: Vec<&Commit<'_>> = parents.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
        .expect("Failed to create commit")
}

/// Commit `file` on a detached side commit, then merge it into HEAD.
pub fn merge_side_branch(
    repo: &Repository,
    author: &str,
    seconds: i64,
    file: &str,
    message: &str,
) -> Oid {
    let base = head_commit(repo).expect("merge needs a base commit");

    write_line(repo, file, "side");
    let tree = repo.find_tree(stage(repo, file)).expect("Failed to find tree");

    let side_sig = signature(author, seconds);
    let side_oid = repo
        .commit(None, &side_sig, &side_sig, "side", &tree, &[&base])
        .expect("Failed to create side commit");
    let side = repo.find_commit(side_oid).expect("Failed to find side commit");

    let merge_sig = signature(author, seconds + 1);
    repo.commit(Some("HEAD"), &merge_sig, &merge_sig, message, &tree, &[&base, &side])
        .expect("Failed to create merge commit")
}

/// Remove `file` in a commit on HEAD by `author` at `seconds`.
pub fn delete_file(
    repo: &Repository,
    author: &str,
    seconds: i64,
    file: &str,
    message: &str,
) -> Oid {
    let path = repo.workdir().expect("non-bare repo").join(file);
    fs::remove_file(&path).expect("Failed to remove file");

    let mut index = repo.index().expect("Failed to get index");
    index.remove_path(Path::new(file)).expect("Failed to remove from index");
    index.write().expect("Failed to write index");
    let tree = index.write_tree().expect("Failed to write tree");

    commit_on_head(repo, author, seconds, tree, message)
}
