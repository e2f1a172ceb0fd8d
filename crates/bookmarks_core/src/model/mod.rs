//! Bookmark domain model.
//!
//! # Responsibility
//! - Define the record shape shared by the store and its callers.
//! - Own the durable JSON field naming.
//!
//! # Invariants
//! - Every bookmark is identified by a `BookmarkId` unique in its collection.

pub mod bookmark;
