//! Shared records serialized into template contexts.
//!
//! These are the only structured values templates see besides plain strings;
//! keeping them here keeps the context shape identical for every artifact.

use serde::Serialize;

/// Navigation entry: one per page, in page-list order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavPage {
    pub name: String,
}

/// One row of the post index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexEntry {
    pub title: String,
    /// Published URL path, e.g. `/blog/My-First-Post.html`.
    pub path: String,
    /// Display date, e.g. `Jan 2, 2020`.
    pub date: String,
}
