//! Login, parent registration and student accounts.
//!
//! Passwords are stored and compared in plaintext, exactly as the seeded
//! teacher accounts expect. A salted hash comparison can replace
//! [`authenticate`] without changing its signature.

use crate::model::{seed_teachers, Document, PublicUser, Role, User};

/// Exact username and password match.
pub fn authenticate(doc: &Document, username: &str, password: &str) -> Option<PublicUser> {
    doc.users
        .get(username)
        .filter(|u| u.password == password)
        .map(PublicUser::from)
}

/// Adds a parent account. `None` when the username is already taken by
/// any role.
pub fn register_parent(
    doc: &mut Document,
    username: &str,
    password: &str,
    name: &str,
) -> Option<PublicUser> {
    if doc.users.contains_key(username) {
        return None;
    }
    let user = User {
        username: username.to_string(),
        password: password.to_string(),
        role: Role::Parent,
        name: name.to_string(),
        subject: None,
        student_id: None,
        extra: serde_json::Map::new(),
    };
    let public = PublicUser::from(&user);
    doc.users.insert(username.to_string(), user);
    Some(public)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountRefusal {
    UsernameTaken,
    UnknownStudent,
}

impl AccountRefusal {
    pub fn message(self) -> &'static str {
        match self {
            AccountRefusal::UsernameTaken => "Username already exists",
            AccountRefusal::UnknownStudent => "Student not found",
        }
    }
}

/// Gives a student record its own login and links the two both ways.
/// A login the student already had is replaced.
pub fn create_student_account(
    doc: &mut Document,
    student_id: &str,
    username: &str,
    password: &str,
) -> Result<PublicUser, AccountRefusal> {
    if doc.users.contains_key(username) {
        return Err(AccountRefusal::UsernameTaken);
    }
    let student = doc
        .students
        .get_mut(student_id)
        .ok_or(AccountRefusal::UnknownStudent)?;
    let previous = student.username.replace(username.to_string());
    let user = User {
        username: username.to_string(),
        password: password.to_string(),
        role: Role::Student,
        name: format!("{} {}", student.name, student.surname),
        subject: None,
        student_id: Some(student_id.to_string()),
        extra: serde_json::Map::new(),
    };

    if let Some(old) = previous {
        let owned = doc
            .users
            .get(&old)
            .is_some_and(|u| u.student_id.as_deref() == Some(student_id));
        if owned {
            doc.users.shift_remove(&old);
        }
    }
    let public = PublicUser::from(&user);
    doc.users.insert(username.to_string(), user);
    Ok(public)
}

pub fn users_with_role(doc: &Document, role: Role) -> Vec<PublicUser> {
    doc.users
        .values()
        .filter(|u| u.role == role)
        .map(PublicUser::from)
        .collect()
}

/// Puts the ten seed teachers back and drops every other account.
pub fn reset_users(doc: &mut Document) {
    doc.users = seed_teachers();
}
