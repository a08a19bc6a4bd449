use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::{
    get_optional_str, get_required_f64, get_required_parsed, get_required_str, get_required_u32,
};
use crate::ipc::types::{AppState, Request};
use crate::model::Subject;
use crate::records::students;
use serde_json::json;

fn students_init(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    state.store.update(students::reset)?;
    Ok(json!({ "success": true, "message": "Students database initialized" }))
}

fn students_add(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let name = get_required_str(&req.params, "name")?;
    let surname = get_required_str(&req.params, "surname")?;
    let age = get_required_u32(&req.params, "age")?;
    let parent_id = get_optional_str(&req.params, "parentId")?;
    let student = state.store.update(|doc| {
        students::create(doc, &name, &surname, age, parent_id.as_deref())
    })?;
    Ok(json!({ "success": true, "student": student }))
}

fn students_list(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let doc = state.store.load()?;
    Ok(json!({ "success": true, "students": students::list(&doc) }))
}

fn students_by_parent(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let parent = get_required_str(&req.params, "parentId")?;
    let doc = state.store.load()?;
    Ok(json!({ "success": true, "students": students::by_parent(&doc, &parent) }))
}

fn students_get(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_str(&req.params, "studentId")?;
    let doc = state.store.load()?;
    Ok(json!({ "success": true, "student": students::get(&doc, &id) }))
}

fn students_delete(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_str(&req.params, "studentId")?;
    let deleted = state.store.update(|doc| students::delete(doc, &id))?;
    Ok(json!({ "success": true, "deleted": deleted }))
}

fn students_add_grade(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_str(&req.params, "studentId")?;
    let subject: Subject = get_required_parsed(&req.params, "subject")?;
    let grade = get_required_f64(&req.params, "grade")?;
    let teacher = get_required_str(&req.params, "teacher")?;
    let comment = get_optional_str(&req.params, "comment")?;
    let entry = state.store.update(|doc| {
        students::add_grade(doc, &id, subject, grade, &teacher, comment.as_deref())
    })?;
    Ok(json!({ "success": true, "grade": entry }))
}

fn students_get_grades(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_str(&req.params, "studentId")?;
    let doc = state.store.load()?;
    Ok(json!({ "success": true, "grades": students::grades(&doc, &id) }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "students.init" => students_init(state),
        "students.add" => students_add(state, req),
        "students.list" => students_list(state),
        "students.by_parent" => students_by_parent(state, req),
        "students.get" => students_get(state, req),
        "students.delete" => students_delete(state, req),
        "students.add_grade" => students_add_grade(state, req),
        "students.get_grades" => students_get_grades(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
