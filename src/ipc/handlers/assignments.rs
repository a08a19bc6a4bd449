use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::{
    get_optional_f64, get_optional_str, get_required_parsed, get_required_str,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{Subject, SubmissionStatus};
use crate::records::assignments;
use serde_json::json;

fn assignments_create(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let title = get_required_str(&req.params, "title")?;
    let description = get_required_str(&req.params, "description")?;
    let subject: Subject = get_required_parsed(&req.params, "subject")?;
    let due_date = get_required_str(&req.params, "dueDate")?;
    let created_by = get_required_str(&req.params, "createdBy")?;
    let assignment = state.store.update(|doc| {
        assignments::create(doc, &title, &description, subject, &due_date, &created_by)
    })?;
    Ok(json!(assignment))
}

fn assignments_by_subject(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let subject: Subject = get_required_parsed(&req.params, "subject")?;
    let doc = state.store.load()?;
    Ok(json!(assignments::list_by_subject(&doc, subject)))
}

fn assignments_all(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let doc = state.store.load()?;
    Ok(json!(assignments::list_all(&doc)))
}

fn assignments_delete(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_str(&req.params, "assignmentId")?;
    let deleted = state.store.update(|doc| assignments::delete(doc, &id))?;
    Ok(json!({ "deleted": deleted }))
}

fn update_submission(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(&req.params, "studentId")?;
    let assignment_id = get_required_str(&req.params, "assignmentId")?;
    let status: SubmissionStatus = get_required_parsed(&req.params, "status")?;
    let grade = get_optional_f64(&req.params, "grade")?;
    let feedback = get_optional_str(&req.params, "feedback")?.unwrap_or_default();
    let submission = state.store.update(|doc| {
        assignments::upsert_submission(doc, &student_id, &assignment_id, status, grade, &feedback)
    })?;
    Ok(json!(submission))
}

fn get_submissions(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(&req.params, "studentId")?;
    let doc = state.store.load()?;
    Ok(json!(assignments::submissions_for(&doc, &student_id)))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "assignments.create" => assignments_create(state, req),
        "assignments.get_by_subject" => assignments_by_subject(state, req),
        "assignments.get_all" => assignments_all(state),
        "assignments.delete" => assignments_delete(state, req),
        "assignments.update_submission" => update_submission(state, req),
        "assignments.get_submissions" => get_submissions(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
