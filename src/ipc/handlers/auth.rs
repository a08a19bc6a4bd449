use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::get_required_str;
use crate::ipc::types::{AppState, Request};
use crate::model::Role;
use crate::records::auth;
use serde_json::json;

fn auth_init(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    state.store.update(auth::reset_users)?;
    Ok(json!({ "success": true, "message": "Database initialized" }))
}

fn auth_login(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let username = get_required_str(&req.params, "username")?;
    let password = get_required_str(&req.params, "password")?;
    let doc = state.store.load()?;
    Ok(match auth::authenticate(&doc, &username, &password) {
        Some(user) => json!({ "success": true, "user": user }),
        None => json!({ "success": false, "error": "Invalid credentials" }),
    })
}

fn auth_register(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let username = get_required_str(&req.params, "username")?;
    let password = get_required_str(&req.params, "password")?;
    let name = get_required_str(&req.params, "name")?;
    let registered = state
        .store
        .update(|doc| auth::register_parent(doc, &username, &password, &name))?;
    Ok(match registered {
        Some(user) => json!({ "success": true, "user": user }),
        None => json!({ "success": false, "error": "Username already exists" }),
    })
}

fn auth_create_student_account(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(&req.params, "studentId")?;
    let username = get_required_str(&req.params, "username")?;
    let password = get_required_str(&req.params, "password")?;
    let created = state.store.update(|doc| {
        auth::create_student_account(doc, &student_id, &username, &password)
    })?;
    Ok(match created {
        Ok(user) => json!({ "success": true, "user": user }),
        Err(refusal) => json!({ "success": false, "error": refusal.message() }),
    })
}

fn auth_list(state: &mut AppState, role: Role) -> Result<serde_json::Value, HandlerErr> {
    let doc = state.store.load()?;
    Ok(json!({ "users": auth::users_with_role(&doc, role) }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "auth.init" => auth_init(state),
        "auth.login" => auth_login(state, req),
        "auth.register" => auth_register(state, req),
        "auth.teachers" => auth_list(state, Role::Teacher),
        "auth.parents" => auth_list(state, Role::Parent),
        "auth.students" => auth_list(state, Role::Student),
        "auth.create_student_account" => auth_create_student_account(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
