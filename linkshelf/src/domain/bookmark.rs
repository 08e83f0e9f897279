// linkshelf/src/domain/bookmark.rs
use crate::domain::error::{DomainError, ValidationError};
use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use url::Url;

/// Opaque bookmark identifier assigned by the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BookmarkId(String);

impl BookmarkId {
    pub fn new<S: Into<String>>(id: S) -> Result<Self, ValidationError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::InvalidId(id));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookmarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookmarkId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for BookmarkId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<i32> for BookmarkId {
    fn from(id: i32) -> Self {
        Self(id.to_string())
    }
}

// Feed payloads may carry the row id as a number or as text.
impl<'de> Deserialize<'de> for BookmarkId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Text(s) => BookmarkId::new(s).map_err(serde::de::Error::custom),
            RawId::Number(n) => Ok(BookmarkId(n.to_string())),
        }
    }
}

/// Identifier of the owning user, supplied by the authentication boundary
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new<S: Into<String>>(id: S) -> Result<Self, ValidationError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::InvalidId(id));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A saved (title, URL) pair owned by one user.
///
/// `id` and `created_at` are assigned by the store; the row shape matches the
/// store's `{id, user_id, title, url, created_at}`.
#[derive(Builder, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct Bookmark {
    pub id: BookmarkId,
    pub user_id: UserId,
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl Bookmark {
    /// Host part of the URL, used to address the favicon service
    pub fn domain(&self) -> Option<String> {
        Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }

    /// Ordering key: newest first, ties broken by id
    pub(crate) fn is_newer_than(&self, other: &Bookmark) -> bool {
        (self.created_at, &self.id) > (other.created_at, &other.id)
    }
}

impl fmt::Display for Bookmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.id, self.title, self.url)
    }
}

impl From<BookmarkBuilderError> for DomainError {
    fn from(e: BookmarkBuilderError) -> Self {
        DomainError::Other(format!("Incomplete bookmark: {}", e))
    }
}

/// Validated input for a create request; id and timestamp are left to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBookmark {
    pub user_id: UserId,
    pub title: String,
    pub url: String,
}

impl NewBookmark {
    /// Trims and validates title and URL. Nothing leaves the process unless this succeeds.
    pub fn new<S: AsRef<str>>(user_id: UserId, title: S, url: S) -> Result<Self, ValidationError> {
        let title = title.as_ref().trim();
        let url = url.as_ref().trim();

        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if url.is_empty() {
            return Err(ValidationError::EmptyUrl);
        }
        validate_url(url)?;

        Ok(Self {
            user_id,
            title: title.to_string(),
            url: url.to_string(),
        })
    }
}

/// Accepts only well-formed absolute URLs
pub fn validate_url(url: &str) -> Result<Url, ValidationError> {
    Url::parse(url).map_err(|e| ValidationError::MalformedUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
