use super::stamped_id;
use crate::model::{now_iso, Document, Message, MessageReply, Role};

pub struct NewMessage<'a> {
    pub from: &'a str,
    pub from_role: Role,
    pub to: &'a str,
    pub to_role: Role,
    pub subject: &'a str,
    pub content: &'a str,
}

pub fn send(doc: &mut Document, new: NewMessage<'_>) -> Message {
    let message = Message {
        id: stamped_id("message"),
        from: new.from.to_string(),
        from_role: new.from_role,
        to: new.to.to_string(),
        to_role: new.to_role,
        subject: new.subject.to_string(),
        content: new.content.to_string(),
        timestamp: now_iso(),
        read: false,
        replies: Vec::new(),
    };
    doc.messages
        .get_or_insert_with(Default::default)
        .insert(message.id.clone(), message.clone());
    message
}

/// Appends to the thread. `None` when the message does not exist.
pub fn reply(
    doc: &mut Document,
    message_id: &str,
    from: &str,
    from_role: Role,
    content: &str,
) -> Option<MessageReply> {
    let message = doc.messages.as_mut()?.get_mut(message_id)?;
    let reply = MessageReply {
        id: stamped_id("reply"),
        from: from.to_string(),
        from_role,
        content: content.to_string(),
        timestamp: now_iso(),
    };
    message.replies.push(reply.clone());
    Some(reply)
}

/// Messages the user sent or received, oldest first.
pub fn for_user(doc: &Document, username: &str) -> Vec<Message> {
    doc.messages
        .iter()
        .flat_map(|m| m.values())
        .filter(|m| m.from == username || m.to == username)
        .cloned()
        .collect()
}

/// Returns whether the message exists.
pub fn mark_read(doc: &mut Document, message_id: &str) -> bool {
    match doc.messages.as_mut().and_then(|m| m.get_mut(message_id)) {
        Some(message) => {
            message.read = true;
            true
        }
        None => false,
    }
}

pub fn delete(doc: &mut Document, message_id: &str) -> bool {
    doc.messages
        .as_mut()
        .and_then(|m| m.shift_remove(message_id))
        .is_some()
}
