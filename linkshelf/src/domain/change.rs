// linkshelf/src/domain/change.rs
use crate::domain::bookmark::{Bookmark, BookmarkId};
use crate::domain::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Row-level change affecting one user's bookmarks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeNotification {
    Created(Bookmark),
    Updated(Bookmark),
    Deleted(BookmarkId),
}

impl ChangeNotification {
    /// Identifier of the row the change refers to
    pub fn bookmark_id(&self) -> &BookmarkId {
        match self {
            ChangeNotification::Created(b) | ChangeNotification::Updated(b) => &b.id,
            ChangeNotification::Deleted(id) => id,
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            ChangeNotification::Created(_) => ChangeKind::Insert,
            ChangeNotification::Updated(_) => ChangeKind::Update,
            ChangeNotification::Deleted(_) => ChangeKind::Delete,
        }
    }
}

impl fmt::Display for ChangeNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.bookmark_id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Insert => "INSERT",
            ChangeKind::Update => "UPDATE",
            ChangeKind::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// Loosely typed feed payload as emitted by the store:
/// `{"eventType": "INSERT", "new": {...row}, "old": {"id": ...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePayload {
    pub event_type: String,
    #[serde(default)]
    pub new: Value,
    #[serde(default)]
    pub old: Value,
}

impl ChangePayload {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn inserted(row: &Bookmark) -> Self {
        Self {
            event_type: ChangeKind::Insert.to_string(),
            new: serde_json::to_value(row).unwrap_or(Value::Null),
            old: Value::Object(Default::default()),
        }
    }

    pub fn updated(row: &Bookmark) -> Self {
        Self {
            event_type: ChangeKind::Update.to_string(),
            new: serde_json::to_value(row).unwrap_or(Value::Null),
            old: serde_json::json!({ "id": row.id }),
        }
    }

    pub fn deleted(id: &BookmarkId) -> Self {
        Self {
            event_type: ChangeKind::Delete.to_string(),
            new: Value::Object(Default::default()),
            old: serde_json::json!({ "id": id }),
        }
    }
}

impl TryFrom<ChangePayload> for ChangeNotification {
    type Error = DomainError;

    fn try_from(payload: ChangePayload) -> Result<Self, Self::Error> {
        match payload.event_type.to_ascii_uppercase().as_str() {
            "INSERT" => Ok(ChangeNotification::Created(serde_json::from_value(
                payload.new,
            )?)),
            "UPDATE" => Ok(ChangeNotification::Updated(serde_json::from_value(
                payload.new,
            )?)),
            "DELETE" => {
                let id = payload.old.get("id").cloned().ok_or_else(|| {
                    DomainError::MalformedChange("DELETE payload without old.id".to_string())
                })?;
                Ok(ChangeNotification::Deleted(serde_json::from_value(id)?))
            }
            other => Err(DomainError::MalformedChange(format!(
                "unknown event type '{}'",
                other
            ))),
        }
    }
}

impl TryFrom<&str> for ChangeNotification {
    type Error = DomainError;

    fn try_from(raw: &str) -> Result<Self, Self::Error> {
        ChangePayload::parse(raw)?.try_into()
    }
}
