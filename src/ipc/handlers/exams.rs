use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::{get_required_parsed, get_required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::Subject;
use crate::records::exams::{self, NewExam};
use serde_json::json;

fn exams_create(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let title = get_required_str(&req.params, "title")?;
    let subject: Subject = get_required_parsed(&req.params, "subject")?;
    let date = get_required_str(&req.params, "date")?;
    let start_time = get_required_str(&req.params, "startTime")?;
    let end_time = get_required_str(&req.params, "endTime")?;
    let created_by = get_required_str(&req.params, "createdBy")?;
    let exam = state.store.update(|doc| {
        exams::create(
            doc,
            NewExam {
                title: &title,
                subject,
                date: &date,
                start_time: &start_time,
                end_time: &end_time,
                created_by: &created_by,
            },
        )
    })?;
    Ok(json!(exam))
}

fn exams_by_subject(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let subject: Subject = get_required_parsed(&req.params, "subject")?;
    let doc = state.store.load()?;
    Ok(json!(exams::list_by_subject(&doc, subject)))
}

fn exams_all(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let doc = state.store.load()?;
    Ok(json!(exams::list_all(&doc)))
}

fn exams_delete(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_str(&req.params, "examId")?;
    let deleted = state.store.update(|doc| exams::delete(doc, &id))?;
    Ok(json!({ "deleted": deleted }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "exams.create" => exams_create(state, req),
        "exams.get_by_subject" => exams_by_subject(state, req),
        "exams.get_all" => exams_all(state),
        "exams.delete" => exams_delete(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
