use crate::calc::{self, GpaSummary};
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::{get_required_parsed, get_required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::Subject;
use serde_json::json;

fn gpa_calculate(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_str(&req.params, "studentId")?;
    let doc = state.store.load()?;
    let summary = doc
        .grades
        .get(&id)
        .map(calc::student_gpa)
        .unwrap_or_else(GpaSummary::empty);
    Ok(json!(summary))
}

fn gpa_class_average(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let subject: Subject = get_required_parsed(&req.params, "subject")?;
    let doc = state.store.load()?;
    Ok(json!(calc::class_average(doc.grades.values(), subject)))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "gpa.calculate" => gpa_calculate(state, req),
        "gpa.class_average" => gpa_class_average(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
