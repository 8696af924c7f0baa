//! Loose views over message and conversation documents.
//!
//! LibreChat has stored these fields with different BSON types over time
//! (`user` as string or ObjectId, `isCreatedByUser` as bool, string or int),
//! so they are read from raw documents instead of a strict serde model.

use chrono::{DateTime, Utc};
use mongodb::bson::{Bson, Document};

/// An assistant reply
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantMessage {
    pub user: Option<String>,
    /// Agent id or raw model name
    pub model: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub conversation_id: Option<String>,
    pub parent_message_id: Option<String>,
    pub token_count: i64,
}

/// The message an assistant reply answers
#[derive(Debug, Clone, PartialEq)]
pub struct ParentMessage {
    pub message_id: String,
    pub is_created_by_user: bool,
    pub token_count: i64,
}

impl AssistantMessage {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            user: doc.get("user").and_then(id_string),
            model: doc.get("model").and_then(non_empty_string),
            created_at: doc.get("createdAt").and_then(datetime),
            conversation_id: doc.get("conversationId").and_then(id_string),
            parent_message_id: doc.get("parentMessageId").and_then(non_empty_string),
            token_count: doc.get("tokenCount").map(integer).unwrap_or(0),
        }
    }
}

impl ParentMessage {
    pub fn from_document(doc: &Document) -> Option<Self> {
        Some(Self {
            message_id: doc.get("messageId").and_then(non_empty_string)?,
            is_created_by_user: doc.get("isCreatedByUser").map(truthy).unwrap_or(false),
            token_count: doc.get("tokenCount").map(integer).unwrap_or(0),
        })
    }
}

/// `(conversationId, createdAt)` of a conversation document
pub fn conversation_started(doc: &Document) -> Option<(String, DateTime<Utc>)> {
    let id = doc.get("conversationId").and_then(id_string)?;
    let created_at = doc.get("createdAt").and_then(datetime)?;
    Some((id, created_at))
}

fn non_empty_string(value: &Bson) -> Option<String> {
    match value {
        Bson::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn id_string(value: &Bson) -> Option<String> {
    match value {
        Bson::ObjectId(id) => Some(id.to_hex()),
        other => non_empty_string(other),
    }
}

fn datetime(value: &Bson) -> Option<DateTime<Utc>> {
    match value {
        Bson::DateTime(dt) => Some(dt.to_chrono()),
        Bson::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    }
}

fn integer(value: &Bson) -> i64 {
    match value {
        Bson::Int32(n) => i64::from(*n),
        Bson::Int64(n) => *n,
        Bson::Double(n) => *n as i64,
        Bson::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// `true`, `"true"` (any case) or `1`
fn truthy(value: &Bson) -> bool {
    match value {
        Bson::Boolean(b) => *b,
        Bson::String(s) => s.eq_ignore_ascii_case("true"),
        Bson::Int32(n) => *n == 1,
        Bson::Int64(n) => *n == 1,
        _ => false,
    }
}
