//! Draft post scaffolding for the `post` verb.
//!
//! Writes `Content/blog/<Y>-<M>-<D>[-<name>].md` with month and day unpadded,
//! pre-filled with a draft header:
//!
//! ```text
//! ---
//! Title: Post title
//! Date: 2024-03-07
//! Draft: true
//! ---
//! ```
//!
//! Existing files are never overwritten.

use crate::content::{BLOG_DIR, CONTENT_DIR};
use crate::front_matter::FrontMatter;
use chrono::{Datelike, NaiveDate};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Title used when no name is given.
pub const DEFAULT_TITLE: &str = "Post title";

#[derive(Error, Debug)]
pub enum PostError {
    #[error("cannot create post at {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("post already exists: {0}")]
    Exists(PathBuf),
}

/// File name for a post created on `date`.
pub fn post_file_name(date: NaiveDate, name: Option<&str>) -> String {
    let stem = format!("{}-{}-{}", date.year(), date.month(), date.day());
    match name {
        Some(name) if !name.is_empty() => format!("{stem}-{name}.md"),
        _ => format!("{stem}.md"),
    }
}

/// Create a draft post under `source`, returning its path.
pub fn new_post(
    source: &Path,
    name: Option<&str>,
    today: NaiveDate,
) -> Result<PathBuf, PostError> {
    let blog_dir = source.join(CONTENT_DIR).join(BLOG_DIR);
    fs::create_dir_all(&blog_dir).map_err(|source| PostError::Io {
        path: blog_dir.clone(),
        source,
    })?;

    let path = blog_dir.join(post_file_name(today, name));
    let header = FrontMatter {
        title: name
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_TITLE)
            .to_string(),
        date: today,
        draft: true,
    }
    .to_header();

    let io_err = |source: io::Error| PostError::Io {
        path: path.clone(),
        source,
    };
    let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            return Err(PostError::Exists(path.clone()));
        }
        Err(err) => return Err(io_err(err)),
    };
    writeln!(file, "{header}").map_err(io_err)?;

    info!(path = %path.display(), "created draft post");
    Ok(path)
}
