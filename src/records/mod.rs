//! Operations over an in-memory [`Document`](crate::model::Document).
//!
//! Nothing here touches the disk; the IPC handlers wrap these in
//! [`DocumentStore::update`](crate::store::DocumentStore::update) or a
//! plain load for queries.

use chrono::Utc;
use uuid::Uuid;

pub mod assignments;
pub mod attendance;
pub mod auth;
pub mod exams;
pub mod messages;
pub mod students;

/// `<prefix>_<epoch-millis>_<9 random hex chars>`
pub(crate) fn stamped_id(prefix: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", prefix, Utc::now().timestamp_millis(), &suffix[..9])
}
