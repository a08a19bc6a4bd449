pub mod assignments;
pub mod attendance;
pub mod auth;
pub mod backup;
pub mod core;
pub mod exams;
pub mod gpa;
pub mod messages;
pub mod students;
