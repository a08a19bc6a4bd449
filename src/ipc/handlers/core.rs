use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::get_required_str;
use crate::ipc::types::{AppState, Request};
use crate::store::DocumentStore;
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond(
        &req.id,
        Ok(json!({
            "version": env!("CARGO_PKG_VERSION"),
            "dataFile": state.store.path().to_string_lossy(),
        })),
    )
}

/// Points the session at another document; the file is created (seeded)
/// right away so a bad path fails here rather than on the next write.
fn store_select(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let path = PathBuf::from(get_required_str(&req.params, "path")?);
    let store = DocumentStore::new(path.clone(), state.store.lock_timeout());
    store.load()?;
    info!(path = %path.display(), "selected document");
    state.store = store;
    Ok(json!({ "dataFile": path.to_string_lossy() }))
}

fn store_init(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    state.store.init()?;
    Ok(json!({ "success": true, "message": "Database initialized successfully" }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "store.select" => Some(respond(&req.id, store_select(state, req))),
        "store.init" => Some(respond(&req.id, store_init(state))),
        _ => None,
    }
}
