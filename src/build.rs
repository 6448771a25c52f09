//! Full site builds.
//!
//! A build is a single pass with no state carried between invocations. Every
//! trigger rebuilds everything:
//!
//! ```text
//! 0. Load      Content/ → pages + parsed posts, Views/ → templates
//! 1. Prepare   delete and recreate output/, create output/blog/
//! 2. Static    copy each Static/ entry to the output root (replacing)
//! 3. Pages     page template → output/<name>.html
//! 4. Posts     post template → output/blog/<slug>.html (drafts skipped)
//! 5. Index     blog template → output/blog/index.html
//! ```
//!
//! Loading happens before the output directory is touched, so a malformed
//! post header or a broken template fails the build without wiping the
//! previous output. After that the first error aborts the remaining steps;
//! there is no partial-success mode.

use crate::config::BuildConfig;
use crate::content::{self, BLOG_DIR, ContentError, SourceTree};
use crate::context;
use crate::render::{RenderError, TemplateRenderer, ViewsRenderer};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

pub const PAGE_TEMPLATE: &str = "page";
pub const POST_TEMPLATE: &str = "post";
pub const INDEX_TEMPLATE: &str = "blog";
const INDEX_FILE: &str = "index.html";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("cannot prepare output directory {path}: {source}")]
    OutputPrep {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("refusing to clear {output}: it contains the source tree {source_root}")]
    UnsafeOutput {
        output: PathBuf,
        source_root: PathBuf,
    },
    #[error("cannot copy static entry {path}: {source}")]
    StaticCopy {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot write {path}: {source}")]
    RenderWrite {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// One rendered output file.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    /// Page name or post title.
    pub title: String,
    /// Path relative to the output root, e.g. `blog/Hello.html`.
    pub output: String,
}

/// Summary of a successful build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub output_dir: PathBuf,
    /// Names of the copied `Static/` entries.
    pub static_entries: Vec<String>,
    pub pages: Vec<Artifact>,
    pub posts: Vec<Artifact>,
    /// File names of posts skipped as drafts.
    pub drafts: Vec<String>,
    pub index: Artifact,
    pub duration: Duration,
}

/// Build the site described by `config`, loading templates from its `Views/`.
pub fn build_site(config: &BuildConfig) -> Result<BuildReport, BuildError> {
    let tree = SourceTree::open(&config.source)?;
    let renderer = ViewsRenderer::load(&tree.views_dir())?;
    build_with(config, &tree, &renderer)
}

/// Build the site with an explicit template renderer.
pub fn build_with<R: TemplateRenderer + ?Sized>(
    config: &BuildConfig,
    tree: &SourceTree,
    renderer: &R,
) -> Result<BuildReport, BuildError> {
    let started = Instant::now();
    let settings = &config.settings;
    let output = config.output.as_path();

    let pages = content::list_pages(tree)?;
    let posts = content::load_posts(tree)?;
    let nav = context::nav_pages(&pages);

    prepare_output(output, tree.root())?;
    let static_entries = copy_static(&tree.static_dir(), output)?;

    let mut page_artifacts = Vec::new();
    for page in &pages {
        let Some(source) = &page.source else {
            continue;
        };
        let raw = fs::read_to_string(source).map_err(|e| ContentError::Io {
            path: source.clone(),
            source: e,
        })?;
        let ctx = context::page_context(&raw, &nav, settings);
        let rel = page.html_file_name();
        write_artifact(output, &rel, &renderer.render(PAGE_TEMPLATE, &ctx)?)?;
        page_artifacts.push(Artifact {
            title: page.name.clone(),
            output: rel,
        });
    }

    let mut post_artifacts = Vec::new();
    let mut drafts = Vec::new();
    for post in &posts {
        let Some(ctx) = context::post_context(post, &nav, settings) else {
            debug!(post = %post.file_name, "skipping draft");
            drafts.push(post.file_name.clone());
            continue;
        };
        let rel = format!("{BLOG_DIR}/{}", post.slug());
        write_artifact(output, &rel, &renderer.render(POST_TEMPLATE, &ctx)?)?;
        post_artifacts.push(Artifact {
            title: post.front_matter.title.clone(),
            output: rel,
        });
    }

    let ctx = context::index_context(&posts, &nav, settings);
    let rel = format!("{BLOG_DIR}/{INDEX_FILE}");
    write_artifact(output, &rel, &renderer.render(INDEX_TEMPLATE, &ctx)?)?;
    let index = Artifact {
        title: settings.blog_title.clone(),
        output: rel,
    };

    Ok(BuildReport {
        output_dir: output.to_path_buf(),
        static_entries,
        pages: page_artifacts,
        posts: post_artifacts,
        drafts,
        index,
        duration: started.elapsed(),
    })
}

/// Delete and recreate the output directory, then create `output/blog`.
///
/// Refuses to delete a directory that is, or contains, the source root.
pub fn prepare_output(output: &Path, source_root: &Path) -> Result<(), BuildError> {
    let prep_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| BuildError::OutputPrep { path, source }
    };

    if output.exists() {
        let output_abs = fs::canonicalize(output).map_err(prep_err(output))?;
        if let Ok(source_abs) = fs::canonicalize(source_root)
            && source_abs.starts_with(&output_abs)
        {
            return Err(BuildError::UnsafeOutput {
                output: output.to_path_buf(),
                source_root: source_root.to_path_buf(),
            });
        }
        fs::remove_dir_all(output).map_err(prep_err(output))?;
    }

    fs::create_dir_all(output).map_err(prep_err(output))?;
    let blog = output.join(BLOG_DIR);
    fs::create_dir_all(&blog).map_err(prep_err(&blog))?;
    Ok(())
}

/// Copy every entry directly under `static_dir` into `output`.
///
/// An existing file or directory of the same name is removed first, so
/// directories are replaced wholesale rather than merged.
pub fn copy_static(static_dir: &Path, output: &Path) -> Result<Vec<String>, BuildError> {
    let copy_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| BuildError::StaticCopy { path, source }
    };

    let mut copied = Vec::new();
    for entry in fs::read_dir(static_dir).map_err(copy_err(static_dir))? {
        let src = entry.map_err(copy_err(static_dir))?.path();
        let Some(name) = src.file_name() else {
            continue;
        };
        let dest = output.join(name);

        if let Ok(meta) = fs::symlink_metadata(&dest) {
            let removed = if meta.is_dir() {
                fs::remove_dir_all(&dest)
            } else {
                fs::remove_file(&dest)
            };
            removed.map_err(copy_err(&dest))?;
        }

        copy_entry(&src, &dest).map_err(copy_err(&src))?;
        copied.push(name.to_string_lossy().to_string());
    }
    Ok(copied)
}

fn copy_entry(src: &Path, dest: &Path) -> std::io::Result<()> {
    if !src.is_dir() {
        fs::copy(src, dest)?;
        return Ok(());
    }
    for entry in WalkDir::new(src) {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(std::io::Error::other)?;
        let target = dest.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

fn write_artifact(output: &Path, rel: &str, bytes: &[u8]) -> Result<(), BuildError> {
    let path = output.join(rel);
    fs::write(&path, bytes).map_err(|source| BuildError::RenderWrite { path, source })
}
