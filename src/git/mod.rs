pub mod cache;
pub mod diff;
pub mod history;
pub mod lifecycle;
pub mod repository;

pub use cache::HandleCache;
pub use lifecycle::RepositoryManager;
pub use repository::RepositoryHandle;
