//! Source tree discovery.
//!
//! Finds pages and posts in a source directory and puts them in the order
//! the site presents them.
//!
//! ## Directory Structure
//!
//! ```text
//! site/
//! ├── config.json
//! ├── Content/
//! │   ├── index.md           # Page, always first in navigation
//! │   ├── about.md           # Page
//! │   └── blog/
//! │       ├── Hello.md       # Post (front matter + markdown)
//! │       └── My Draft.md    # Post with `Draft: true`, never published
//! ├── Views/                 # Templates: page, post, blog
//! └── Static/                # Copied verbatim to the output root
//! ```
//!
//! ## Ordering
//!
//! Pages and posts keep directory enumeration order. Nothing is sorted by
//! name or date; the only reordering is for pages, where `index` moves to the
//! front and a synthetic `blog` entry (the post index) is appended.

use crate::front_matter::{self, FrontMatter, FrontMatterError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONTENT_DIR: &str = "Content";
pub const VIEWS_DIR: &str = "Views";
pub const STATIC_DIR: &str = "Static";
pub const BLOG_DIR: &str = "blog";

/// Page that always leads the navigation list when present.
pub const INDEX_PAGE: &str = "index";
/// Synthetic page standing for the post index.
pub const BLOG_PAGE: &str = "blog";

const MARKDOWN_EXTENSION: &str = "md";

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("required directory is missing: {0}")]
    MissingDir(PathBuf),
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    PostHeader {
        path: PathBuf,
        source: FrontMatterError,
    },
}

impl ContentError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A source directory with the fixed `Content`/`Views`/`Static` layout.
#[derive(Debug, Clone)]
pub struct SourceTree {
    root: PathBuf,
}

impl SourceTree {
    /// Open a source tree, failing if any of the three top-level directories is missing.
    pub fn open(root: &Path) -> Result<Self, ContentError> {
        let tree = Self {
            root: root.to_path_buf(),
        };
        for dir in [tree.content_dir(), tree.views_dir(), tree.static_dir()] {
            if !dir.is_dir() {
                return Err(ContentError::MissingDir(dir));
            }
        }
        Ok(tree)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn content_dir(&self) -> PathBuf {
        self.root.join(CONTENT_DIR)
    }

    pub fn blog_dir(&self) -> PathBuf {
        self.content_dir().join(BLOG_DIR)
    }

    pub fn views_dir(&self) -> PathBuf {
        self.root.join(VIEWS_DIR)
    }

    pub fn static_dir(&self) -> PathBuf {
        self.root.join(STATIC_DIR)
    }
}

/// A top-level page. The synthetic `blog` page has no source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub name: String,
    pub source: Option<PathBuf>,
}

impl Page {
    fn synthetic_blog() -> Self {
        Self {
            name: BLOG_PAGE.to_string(),
            source: None,
        }
    }

    /// Output file name, relative to the output root.
    pub fn html_file_name(&self) -> String {
        format!("{}.html", self.name)
    }
}

/// A post file found under `Content/blog`, not yet read.
#[derive(Debug, Clone, PartialEq)]
pub struct PostRef {
    pub path: PathBuf,
    pub file_name: String,
}

/// A post read and parsed for the current build.
#[derive(Debug, Clone)]
pub struct Post {
    pub file_name: String,
    pub front_matter: FrontMatter,
    pub body: String,
}

impl Post {
    /// Read a post from disk and split off its front matter.
    pub fn load(post: &PostRef) -> Result<Self, ContentError> {
        let raw = fs::read_to_string(&post.path).map_err(|e| ContentError::io(&post.path, e))?;
        let (front_matter, body) =
            front_matter::parse(&raw).map_err(|source| ContentError::PostHeader {
                path: post.path.clone(),
                source,
            })?;
        Ok(Self {
            file_name: post.file_name.clone(),
            front_matter,
            body,
        })
    }

    pub fn is_draft(&self) -> bool {
        self.front_matter.draft
    }

    /// Output file name inside `blog/`.
    pub fn slug(&self) -> String {
        html_file_name(&self.file_name)
    }

    /// Published URL path, as linked from the post index.
    pub fn url_path(&self) -> String {
        format!("/{BLOG_DIR}/{}", self.slug())
    }
}

/// Derive a published file name: extension becomes `.html`, spaces become hyphens.
///
/// - `My First Post.md` → `My-First-Post.html`
/// - `2020-1-2-hello.md` → `2020-1-2-hello.html`
pub fn html_file_name(file_name: &str) -> String {
    Path::new(file_name)
        .with_extension("html")
        .to_string_lossy()
        .replace(' ', "-")
}

/// List the pages under `Content`, in presentation order.
pub fn list_pages(tree: &SourceTree) -> Result<Vec<Page>, ContentError> {
    let pages = markdown_files(&tree.content_dir())?
        .into_iter()
        .map(|path| Page {
            name: file_stem(&path),
            source: Some(path),
        })
        .collect();
    Ok(order_pages(pages))
}

/// Move `index` to the front and append the synthetic `blog` page.
///
/// All other pages keep their relative order.
pub fn order_pages(mut pages: Vec<Page>) -> Vec<Page> {
    let index = pages
        .iter()
        .position(|p| p.name == INDEX_PAGE)
        .map(|pos| pages.remove(pos));
    pages.push(Page::synthetic_blog());
    if let Some(index) = index {
        pages.insert(0, index);
    }
    pages
}

/// List the posts under `Content/blog` in enumeration order.
///
/// A source tree without a `blog` directory simply has no posts.
pub fn list_posts(tree: &SourceTree) -> Result<Vec<PostRef>, ContentError> {
    let blog = tree.blog_dir();
    if !blog.is_dir() {
        return Ok(Vec::new());
    }
    Ok(markdown_files(&blog)?
        .into_iter()
        .map(|path| PostRef {
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            path,
        })
        .collect())
}

/// Read and parse every post. The first malformed header aborts the whole load.
pub fn load_posts(tree: &SourceTree) -> Result<Vec<Post>, ContentError> {
    list_posts(tree)?.iter().map(Post::load).collect()
}

/// Non-hidden `*.md` files directly inside `dir`, unsorted.
fn markdown_files(dir: &Path) -> Result<Vec<PathBuf>, ContentError> {
    let entries = fs::read_dir(dir).map_err(|e| ContentError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ContentError::io(dir, e))?.path();
        let hidden = path
            .file_name()
            .map(|n| n.to_string_lossy().starts_with('.'))
            .unwrap_or(true);
        let is_markdown = path
            .extension()
            .map(|e| e == MARKDOWN_EXTENSION)
            .unwrap_or(false);
        if !hidden && is_markdown && path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}
