//! Create/edit form model and field validation.
//!
//! # Responsibility
//! - Hold raw user input for one bookmark.
//! - Turn valid input into a `BookmarkDraft` for the store.
//!
//! # Invariants
//! - `name` and `url1` are required after trimming.
//! - Every non-empty URL field starts with `http://` or `https://`.
//! - At most one icon source survives validation; inline data wins.

use bookmarks_core::{Bookmark, BookmarkDraft, Icon};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static HTTP_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://").expect("valid http url regex"));

/// Raw form input. Empty strings mean "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkForm {
    pub name: String,
    pub url1: String,
    pub url2: String,
    pub icon_url: String,
    pub icon_data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    MissingName,
    MissingPrimaryUrl,
    InvalidUrl { field: &'static str, value: String },
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "name is required"),
            Self::MissingPrimaryUrl => write!(f, "primary URL is required"),
            Self::InvalidUrl { field, value } => write!(
                f,
                "{field} must start with http:// or https://, got `{value}`"
            ),
        }
    }
}

impl Error for FormError {}

impl BookmarkForm {
    /// Pre-fills the form for editing an existing bookmark.
    pub fn from_bookmark(bookmark: &Bookmark) -> Self {
        let (icon_url, icon_data) = match &bookmark.icon {
            Icon::None => (String::new(), None),
            Icon::Remote(url) => (url.clone(), None),
            Icon::Inline(data) => (String::new(), Some(data.clone())),
        };
        Self {
            name: bookmark.name.clone(),
            url1: bookmark.url1.clone(),
            url2: bookmark.url2.clone().unwrap_or_default(),
            icon_url,
            icon_data,
        }
    }

    /// Sets a custom icon URL, discarding uploaded icon data.
    pub fn set_icon_url(&mut self, url: impl Into<String>) {
        self.icon_url = url.into();
        self.icon_data = None;
    }

    /// Sets uploaded icon data, discarding the custom icon URL.
    pub fn set_icon_data(&mut self, data: impl Into<String>) {
        self.icon_data = Some(data.into());
        self.icon_url.clear();
    }

    pub fn clear_icon(&mut self) {
        self.icon_url.clear();
        self.icon_data = None;
    }

    pub fn validate(&self) -> Result<BookmarkDraft, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::MissingName);
        }
        let url1 = self.url1.trim();
        if url1.is_empty() {
            return Err(FormError::MissingPrimaryUrl);
        }
        check_url("primary URL", url1)?;
        let url2 = self.url2.trim();
        check_url("secondary URL", url2)?;
        let icon_url = self.icon_url.trim();
        check_url("icon URL", icon_url)?;

        let icon = match self.icon_data.as_deref().filter(|data| !data.is_empty()) {
            Some(data) => Icon::Inline(data.to_string()),
            None if !icon_url.is_empty() => Icon::Remote(icon_url.to_string()),
            None => Icon::None,
        };

        Ok(BookmarkDraft {
            name: name.to_string(),
            url1: url1.to_string(),
            url2: (!url2.is_empty()).then(|| url2.to_string()),
            icon,
        })
    }
}

fn check_url(field: &'static str, value: &str) -> Result<(), FormError> {
    if value.is_empty() || HTTP_URL_RE.is_match(value) {
        return Ok(());
    }
    Err(FormError::InvalidUrl {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{BookmarkForm, FormError};
    use bookmarks_core::{Bookmark, BookmarkId, Icon};

    fn form(name: &str, url1: &str) -> BookmarkForm {
        BookmarkForm {
            name: name.to_string(),
            url1: url1.to_string(),
            ..BookmarkForm::default()
        }
    }

    #[test]
    fn minimal_form_produces_draft_without_optionals() {
        let draft = form("Example", "https://example.com").validate().unwrap();
        assert_eq!(draft.name, "Example");
        assert_eq!(draft.url1, "https://example.com");
        assert_eq!(draft.url2, None);
        assert_eq!(draft.icon, Icon::None);
    }

    #[test]
    fn required_fields_are_enforced() {
        assert_eq!(
            form("  ", "https://example.com").validate().unwrap_err(),
            FormError::MissingName
        );
        assert_eq!(
            form("Example", "").validate().unwrap_err(),
            FormError::MissingPrimaryUrl
        );
    }

    #[test]
    fn url_fields_require_http_scheme() {
        let err = form("Example", "ftp://example.com").validate().unwrap_err();
        assert!(matches!(err, FormError::InvalidUrl { field: "primary URL", .. }));

        let mut with_url2 = form("Example", "http://example.com");
        with_url2.url2 = "example.org".to_string();
        assert!(matches!(
            with_url2.validate().unwrap_err(),
            FormError::InvalidUrl { field: "secondary URL", .. }
        ));

        let mut with_icon = form("Example", "http://example.com");
        with_icon.set_icon_url("javascript:alert(1)");
        assert!(matches!(
            with_icon.validate().unwrap_err(),
            FormError::InvalidUrl { field: "icon URL", .. }
        ));
    }

    #[test]
    fn icon_setters_are_mutually_exclusive() {
        let mut input = form("Example", "https://example.com");
        input.set_icon_url("https://example.com/icon.png");
        input.set_icon_data("data:image/png;base64,AAAA");
        assert!(input.icon_url.is_empty());
        assert_eq!(
            input.validate().unwrap().icon,
            Icon::Inline("data:image/png;base64,AAAA".to_string())
        );

        input.set_icon_url("https://example.com/icon.png");
        assert_eq!(input.icon_data, None);
        assert_eq!(
            input.validate().unwrap().icon,
            Icon::Remote("https://example.com/icon.png".to_string())
        );
    }

    #[test]
    fn from_bookmark_round_trips_through_validate() {
        let bookmark = Bookmark {
            id: BookmarkId::from("id-1"),
            name: "Docs".to_string(),
            url1: "https://docs.example".to_string(),
            url2: Some("https://mirror.docs.example".to_string()),
            icon: Icon::Inline("data:image/png;base64,AAAA".to_string()),
        };

        let draft = BookmarkForm::from_bookmark(&bookmark).validate().unwrap();
        assert_eq!(draft, bookmark.to_draft());
    }
}
