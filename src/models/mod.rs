//! Data transfer objects (DTOs) for API responses.
//!
//! These structs are serialized to JSON for API consumers.
//! - `diff`: FileChange, Hunk, LineChange parsed from unified diffs
//! - `commit`: CommitRecord
//! - `activity`: ActivityItem, one entry of the activity feed
//! - `repository`: Create/list/delete request and response bodies

pub mod activity;
pub mod commit;
pub mod diff;
pub mod repository;

pub use activity::*;
pub use commit::*;
pub use diff::*;
pub use repository::*;
