//! Repository handle cache.
//!
//! Maps repository names to long-lived `RepositoryHandle`s bound to
//! `{root}/{name}`. Handles are created on first use and never evicted, so
//! the cache grows to the number of distinct names ever requested.
//!
//! Owned by `AppContext`; tests build a fresh cache per case.
//! Used by: activity aggregation, fetch-all, delete

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::git::repository::RepositoryHandle;

pub struct HandleCache {
    root: PathBuf,
    handles: Mutex<HashMap<String, Arc<RepositoryHandle>>>,
}

impl HandleCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// Get the handle for `name`, creating it on first access.
    ///
    /// Lookup and insert happen under one lock, so concurrent first calls for
    /// the same name all receive the same handle.
    pub fn get(&self, name: &str) -> Arc<RepositoryHandle> {
        let mut handles = self
            .handles
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        handles
            .entry(name.to_string())
            .or_insert_with(|| {
                tracing::debug!("Creating handle for repository: {}", name);
                Arc::new(RepositoryHandle::new(name, self.root.join(name)))
            })
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_returns_same_handle() {
        let cache = HandleCache::new("/srv/repos");
        let first = cache.get("alpha");
        let second = cache.get("alpha");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.path, PathBuf::from("/srv/repos/alpha"));
        assert_eq!(cache.handles.lock().unwrap().len(), 1);
    }

    #[test]
    fn distinct_names_get_distinct_handles() {
        let cache = HandleCache::new("/srv/repos");
        let alpha = cache.get("alpha");
        let beta = cache.get("beta");

        assert!(!Arc::ptr_eq(&alpha, &beta));
        assert_eq!(beta.name, "beta");
        assert_eq!(cache.handles.lock().unwrap().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_access_creates_one_handle() {
        let cache = Arc::new(HandleCache::new("/srv/repos"));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get("alpha") })
            })
            .collect();

        let mut handles = Vec::new();
        for task in tasks {
            handles.push(task.await.unwrap());
        }

        assert!(handles.iter().all(|h| Arc::ptr_eq(h, &handles[0])));
        assert_eq!(cache.handles.lock().unwrap().len(), 1);
    }
}
