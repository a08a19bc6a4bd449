use crate::backup;
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::get_required_str;
use crate::ipc::types::{AppState, Request};
use crate::model::Document;
use serde_json::json;
use std::path::PathBuf;

fn backup_err(e: anyhow::Error) -> HandlerErr {
    HandlerErr {
        code: "backup_failed",
        message: format!("{e:#}"),
        details: None,
    }
}

fn backup_export(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let out = PathBuf::from(get_required_str(&req.params, "path")?);
    let doc = state.store.load()?;
    let mut bytes = serde_json::to_vec_pretty(&doc).map_err(crate::error::StoreError::from)?;
    bytes.push(b'\n');
    let summary = backup::export_document_bundle(&bytes, &out).map_err(backup_err)?;
    Ok(json!({
        "bundleFormat": summary.bundle_format,
        "entryCount": summary.entry_count,
        "sha256": summary.sha256,
        "path": out.to_string_lossy(),
    }))
}

fn backup_import(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let input = PathBuf::from(get_required_str(&req.params, "path")?);
    let bundle = backup::read_document_bundle(&input).map_err(backup_err)?;
    let doc: Document = serde_json::from_slice(&bundle.document).map_err(|e| HandlerErr {
        code: "backup_failed",
        message: format!("bundle document is not valid: {e}"),
        details: Some(json!({ "path": input.to_string_lossy() })),
    })?;
    state.store.save(&doc)?;
    Ok(json!({
        "bundleFormatDetected": bundle.bundle_format_detected,
        "students": doc.students.len(),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "backup.export" => backup_export(state, req),
        "backup.import" => backup_import(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
