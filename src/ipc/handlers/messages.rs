use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::{get_required_parsed, get_required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::Role;
use crate::records::messages::{self, NewMessage};
use serde_json::json;

fn messages_send(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let from = get_required_str(&req.params, "from")?;
    let from_role: Role = get_required_parsed(&req.params, "fromRole")?;
    let to = get_required_str(&req.params, "to")?;
    let to_role: Role = get_required_parsed(&req.params, "toRole")?;
    let subject = get_required_str(&req.params, "subject")?;
    let content = get_required_str(&req.params, "content")?;
    let message = state.store.update(|doc| {
        messages::send(
            doc,
            NewMessage {
                from: &from,
                from_role,
                to: &to,
                to_role,
                subject: &subject,
                content: &content,
            },
        )
    })?;
    Ok(json!(message))
}

fn messages_reply(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let message_id = get_required_str(&req.params, "messageId")?;
    let from = get_required_str(&req.params, "from")?;
    let from_role: Role = get_required_parsed(&req.params, "fromRole")?;
    let content = get_required_str(&req.params, "content")?;
    let reply = state
        .store
        .update(|doc| messages::reply(doc, &message_id, &from, from_role, &content))?;
    Ok(json!(reply))
}

fn messages_for_user(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let username = get_required_str(&req.params, "username")?;
    let doc = state.store.load()?;
    Ok(json!(messages::for_user(&doc, &username)))
}

fn messages_mark_read(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let message_id = get_required_str(&req.params, "messageId")?;
    let updated = state.store.update(|doc| messages::mark_read(doc, &message_id))?;
    Ok(json!({ "updated": updated }))
}

fn messages_delete(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let message_id = get_required_str(&req.params, "messageId")?;
    let deleted = state.store.update(|doc| messages::delete(doc, &message_id))?;
    Ok(json!({ "deleted": deleted }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "messages.send" => messages_send(state, req),
        "messages.reply" => messages_reply(state, req),
        "messages.list_for_user" => messages_for_user(state, req),
        "messages.mark_read" => messages_mark_read(state, req),
        "messages.delete" => messages_delete(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
