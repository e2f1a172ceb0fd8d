//! Bookmark domain model.
//!
//! # Responsibility
//! - Define the canonical bookmark record persisted by the store.
//! - Keep the durable JSON shape (`iconUrl` / `customIconData`) separate from
//!   the in-memory icon variant.
//!
//! # Invariants
//! - `id` is assigned once at creation and never rewritten.
//! - A record carries at most one icon source; `Icon` makes this structural.
//! - Field contents are not validated here; that is the form layer's job.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque unique identifier of one bookmark.
///
/// Fresh ids are v4 UUID strings, but ids read back from durable storage are
/// kept verbatim, whatever their shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookmarkId(String);

impl BookmarkId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for BookmarkId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for BookmarkId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for BookmarkId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Icon source attached to a bookmark.
///
/// When `None`, the display layer resolves a favicon from `url1`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Icon {
    #[default]
    None,
    /// External image URL (custom or previously resolved favicon).
    Remote(String),
    /// Inline image payload, usually a `data:` URL.
    Inline(String),
}

impl Icon {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Rebuilds the variant from the two optional wire fields.
    ///
    /// Inline data wins when both are present; empty strings count as absent.
    fn from_wire(icon_url: Option<String>, custom_icon_data: Option<String>) -> Self {
        match (non_empty(icon_url), non_empty(custom_icon_data)) {
            (_, Some(data)) => Self::Inline(data),
            (Some(url), None) => Self::Remote(url),
            (None, None) => Self::None,
        }
    }

    fn into_wire(self) -> (Option<String>, Option<String>) {
        match self {
            Self::None => (None, None),
            Self::Remote(url) => (Some(url), None),
            Self::Inline(data) => (None, Some(data)),
        }
    }
}

/// Bookmark fields supplied by callers before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookmarkDraft {
    pub name: String,
    pub url1: String,
    pub url2: Option<String>,
    pub icon: Icon,
}

impl BookmarkDraft {
    pub fn new(name: impl Into<String>, url1: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url1: url1.into(),
            url2: None,
            icon: Icon::None,
        }
    }
}

/// Canonical bookmark record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BookmarkRecord", into = "BookmarkRecord")]
pub struct Bookmark {
    pub id: BookmarkId,
    /// Display label.
    pub name: String,
    /// Primary link.
    pub url1: String,
    /// Optional secondary link.
    pub url2: Option<String>,
    pub icon: Icon,
}

impl Bookmark {
    pub fn from_draft(id: BookmarkId, draft: BookmarkDraft) -> Self {
        Self {
            id,
            name: draft.name,
            url1: draft.url1,
            url2: draft.url2,
            icon: draft.icon,
        }
    }

    /// Returns the editable fields of this record without its id.
    pub fn to_draft(&self) -> BookmarkDraft {
        BookmarkDraft {
            name: self.name.clone(),
            url1: self.url1.clone(),
            url2: self.url2.clone(),
            icon: self.icon.clone(),
        }
    }
}

/// Durable wire shape of one bookmark.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookmarkRecord {
    id: BookmarkId,
    name: String,
    url1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    custom_icon_data: Option<String>,
}

impl From<BookmarkRecord> for Bookmark {
    fn from(value: BookmarkRecord) -> Self {
        Self {
            id: value.id,
            name: value.name,
            url1: value.url1,
            url2: value.url2,
            icon: Icon::from_wire(value.icon_url, value.custom_icon_data),
        }
    }
}

impl From<Bookmark> for BookmarkRecord {
    fn from(value: Bookmark) -> Self {
        let (icon_url, custom_icon_data) = value.icon.into_wire();
        Self {
            id: value.id,
            name: value.name,
            url1: value.url1,
            url2: value.url2,
            icon_url,
            custom_icon_data,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|inner| !inner.is_empty())
}
