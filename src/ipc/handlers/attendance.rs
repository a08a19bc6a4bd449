use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::{
    get_optional_parsed, get_optional_str, get_required_parsed, get_required_str,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{AttendanceStatus, Subject};
use crate::records::attendance;
use serde_json::json;

fn attendance_add(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(&req.params, "studentId")?;
    let status: AttendanceStatus = get_required_parsed(&req.params, "status")?;
    let subject: Subject = get_required_parsed(&req.params, "subject")?;
    let teacher = get_required_str(&req.params, "teacher")?;
    let notes = get_optional_str(&req.params, "notes")?.unwrap_or_default();
    let record = state.store.update(|doc| {
        attendance::add_record(doc, &student_id, status, subject, &teacher, &notes)
    })?;
    Ok(json!(record))
}

fn attendance_get(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(&req.params, "studentId")?;
    let doc = state.store.load()?;
    Ok(json!(attendance::records(&doc, &student_id)))
}

fn attendance_stats(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(&req.params, "studentId")?;
    let subject: Option<Subject> = get_optional_parsed(&req.params, "subject")?;
    let doc = state.store.load()?;
    Ok(json!(attendance::stats(&doc, &student_id, subject)))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "attendance.add" => attendance_add(state, req),
        "attendance.get" => attendance_get(state, req),
        "attendance.stats" => attendance_stats(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
