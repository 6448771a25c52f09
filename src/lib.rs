//! # Taan
//!
//! A small static site generator for a personal site with a blog. Markdown
//! pages and posts are rendered through user-supplied templates, static
//! assets are copied verbatim, and the source tree can be watched so every
//! edit rebuilds the site.
//!
//! # Source Layout
//!
//! ```text
//! site/
//! ├── config.json          # {"title": "...", "blog_title": "..."}
//! ├── Content/
//! │   ├── index.md         # Page → index.html (always first in nav)
//! │   ├── about.md         # Page → about.html
//! │   └── blog/
//! │       └── Hello.md     # Post with a front-matter header → blog/Hello.html
//! ├── Views/
//! │   ├── page.html        # Template for pages
//! │   ├── post.html        # Template for posts
//! │   └── blog.html        # Template for the post index → blog/index.html
//! └── Static/              # Copied to the output root as-is
//! ```
//!
//! # Architecture: One Build, Then Watch
//!
//! ```text
//! 1. Load      config.json, Content/, Views/   (nothing written yet)
//! 2. Prepare   output/ deleted and recreated
//! 3. Copy      Static/* → output/
//! 4. Render    pages, published posts, post index
//! 5. Watch     rebuild on change, re-register the whole tree, repeat
//! ```
//!
//! Template contexts are plain JSON documents, so the build never depends on
//! a particular template engine beyond the [`render::TemplateRenderer`] seam.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `config.json` loading and validation, watch settings |
//! | [`front_matter`] | Post header parsing and writing, fixed date formats |
//! | [`content`] | Source tree checks, page and post enumeration, slugs |
//! | [`context`] | Template contexts for pages, posts, and the index |
//! | [`render`] | Markdown conversion and the `Views/` template renderer |
//! | [`build`] | Build orchestration and the build report |
//! | [`watch`] | Recursive per-path watching and the rebuild loop |
//! | [`post`] | Draft post scaffolding for the `post` command |
//! | [`types`] | Serializable records shared by contexts |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Runtime Templates
//!
//! Templates live in the site's `Views/` directory and are reloaded on every
//! build, so editing a template while watching takes effect immediately.
//! [minijinja](https://docs.rs/minijinja) renders them; `.html` templates
//! auto-escape, and the markdown body is emitted with `{{ body|safe }}`.
//!
//! ## Load Before Delete
//!
//! Every post header is parsed and every template compiled before the output
//! directory is touched. A typo in a header or a template fails the build
//! and leaves the previously generated site in place.
//!
//! ## Whole-Tree Re-registration
//!
//! The watcher holds one non-recursive handle per directory and file. After
//! each rebuild it drops them all and walks the tree again, which keeps the
//! handle set exact when directories are added or removed.
//!
//! ## Locale-Free Dates
//!
//! Post dates are parsed as `YYYY-MM-DD` or `MM/DD/YY` and displayed as
//! `Jan 2, 2020` no matter what locale the machine runs in.

pub mod build;
pub mod config;
pub mod content;
pub mod context;
pub mod front_matter;
pub mod output;
pub mod post;
pub mod render;
pub mod types;
pub mod watch;

#[cfg(test)]
pub(crate) mod test_helpers;
