use std::sync::Arc;

use crate::config::Config;
use crate::git::{HandleCache, RepositoryManager};

/// Everything a request handler needs, created once at startup.
pub struct AppContext {
    pub config: Config,
    pub handles: Arc<HandleCache>,
    pub repositories: RepositoryManager,
}

impl AppContext {
    pub fn new(config: Config) -> Self {
        let handles = Arc::new(HandleCache::new(&config.repository_dir));
        let repositories = RepositoryManager::new(&config.repository_dir, handles.clone());

        Self {
            config,
            handles,
            repositories,
        }
    }
}

pub type SharedContext = Arc<AppContext>;
