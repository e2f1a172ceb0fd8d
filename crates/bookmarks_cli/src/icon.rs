//! Display-time icon resolution.
//!
//! Pure: builds the icon reference a renderer should show, never fetches it.

use bookmarks_core::{Bookmark, Icon};
use std::fmt::{Display, Formatter};
use url::Url;

const FAVICON_SERVICE: &str = "https://www.google.com/s2/favicons?sz=32&domain=";
pub const PLACEHOLDER_ICON: &str = "/default-icon.png";

/// Icon reference chosen for one bookmark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayIcon<'a> {
    Inline(&'a str),
    Remote(&'a str),
    Favicon(String),
    Placeholder,
}

impl Display for DisplayIcon<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inline(data) => write!(f, "inline ({} bytes)", data.len()),
            Self::Remote(url) => f.write_str(url),
            Self::Favicon(url) => write!(f, "{url} (auto)"),
            Self::Placeholder => f.write_str(PLACEHOLDER_ICON),
        }
    }
}

/// Picks the stored icon, else a favicon for `url1`'s host, else the placeholder.
pub fn display_icon(bookmark: &Bookmark) -> DisplayIcon<'_> {
    match &bookmark.icon {
        Icon::Inline(data) => DisplayIcon::Inline(data),
        Icon::Remote(url) => DisplayIcon::Remote(url),
        Icon::None => match extract_host(&bookmark.url1) {
            Some(host) => DisplayIcon::Favicon(format!("{FAVICON_SERVICE}{host}")),
            None => DisplayIcon::Placeholder,
        },
    }
}

/// Host of an absolute URL as a browser would resolve it.
///
/// Unparseable URLs and URLs without a host yield `None`.
pub fn extract_host(url: &str) -> Option<String> {
    Url::parse(url.trim()).ok()?.host_str().map(str::to_owned)
}
