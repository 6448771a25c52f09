//! Markdown and template rendering.
//!
//! Both collaborators are pure from the build's point of view:
//! [`markdown_to_html`] turns text into HTML, and a [`TemplateRenderer`]
//! turns a template name plus a plain JSON document into bytes.
//!
//! ## Views
//!
//! [`ViewsRenderer`] loads every file directly under `Views/` into a fresh
//! [minijinja](https://docs.rs/minijinja) environment, addressed by file stem:
//!
//! ```text
//! Views/
//! ├── page.html    # rendered as "page"
//! ├── post.html    # rendered as "post"
//! └── blog.html    # rendered as "blog"
//! ```
//!
//! `.html` templates auto-escape their variables, so the pre-rendered
//! markdown body is emitted with `{{ body|safe }}`. Templates with other
//! extensions render unescaped.

use minijinja::Environment;
use pulldown_cmark::{Options, Parser, html as md_html};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("cannot read views from {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("no template named {0:?} in Views")]
    MissingTemplate(String),
    #[error("template {name}: {source}")]
    Template {
        name: String,
        source: minijinja::Error,
    },
}

/// Convert markdown text to an HTML fragment.
pub fn markdown_to_html(markdown: &str) -> String {
    let options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_FOOTNOTES;
    let parser = Parser::new_ext(markdown, options);
    let mut html = String::new();
    md_html::push_html(&mut html, parser);
    html
}

/// Renders a named template against a plain key/value document.
pub trait TemplateRenderer {
    fn render(&self, template: &str, context: &Value) -> Result<Vec<u8>, RenderError>;
}

/// Template renderer backed by the files in a `Views` directory.
pub struct ViewsRenderer {
    env: Environment<'static>,
    /// Template stem → file name registered in `env`.
    files: BTreeMap<String, String>,
}

impl ViewsRenderer {
    /// Load every non-hidden file directly under `dir`.
    ///
    /// When two files share a stem, the first in name order wins.
    pub fn load(dir: &Path) -> Result<Self, RenderError> {
        let io_err = |source| RenderError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(io_err)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.is_file()
                    && !p
                        .file_name()
                        .map(|n| n.to_string_lossy().starts_with('.'))
                        .unwrap_or(true)
            })
            .collect();
        paths.sort();

        let mut env = Environment::new();
        let mut files = BTreeMap::new();
        for path in paths {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            if let Some(existing) = files.get(&stem) {
                warn!(template = %stem, kept = %existing, ignored = %file_name, "duplicate template");
                continue;
            }

            let source = fs::read_to_string(&path).map_err(|source| RenderError::Io {
                path: path.clone(),
                source,
            })?;
            env.add_template_owned(file_name.clone(), source)
                .map_err(|source| RenderError::Template {
                    name: file_name.clone(),
                    source,
                })?;
            debug!(template = %stem, file = %file_name, "loaded view");
            files.insert(stem, file_name);
        }

        Ok(Self { env, files })
    }

    /// Stems of the loaded templates, in name order.
    pub fn template_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}

impl TemplateRenderer for ViewsRenderer {
    fn render(&self, template: &str, context: &Value) -> Result<Vec<u8>, RenderError> {
        let file_name = self
            .files
            .get(template)
            .ok_or_else(|| RenderError::MissingTemplate(template.to_string()))?;
        let template_err = |source| RenderError::Template {
            name: file_name.clone(),
            source,
        };
        let rendered = self
            .env
            .get_template(file_name)
            .map_err(template_err)?
            .render(context)
            .map_err(template_err)?;
        Ok(rendered.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn views(files: &[(&str, &str)]) -> TempDir {
        let tmp = TempDir::new().unwrap();
        for (name, source) in files {
            fs::write(tmp.path().join(name), source).unwrap();
        }
        tmp
    }

    #[test]
    fn markdown_paragraph() {
        assert_eq!(markdown_to_html("Hi"), "<p>Hi</p>\n");
    }

    #[test]
    fn markdown_heading_and_emphasis() {
        let html = markdown_to_html("# Title\n\nsome *text*");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>text</em>"));
    }

    #[test]
    fn markdown_tables_enabled() {
        let html = markdown_to_html("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn renders_by_stem() {
        let dir = views(&[("page.html", "<p>{{ name }}</p>")]);
        let renderer = ViewsRenderer::load(dir.path()).unwrap();

        let out = renderer.render("page", &json!({"name": "x"})).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "<p>x</p>");
    }

    #[test]
    fn html_templates_escape_unless_safe() {
        let dir = views(&[("post.html", "{{ body }}|{{ body|safe }}")]);
        let renderer = ViewsRenderer::load(dir.path()).unwrap();

        let out = renderer.render("post", &json!({"body": "<b>"})).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "&lt;b&gt;|<b>");
    }

    #[test]
    fn non_html_templates_render_raw() {
        let dir = views(&[("post.leaf", "{{ body }}")]);
        let renderer = ViewsRenderer::load(dir.path()).unwrap();

        let out = renderer.render("post", &json!({"body": "<b>"})).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "<b>");
    }

    #[test]
    fn missing_template_is_error() {
        let dir = views(&[("page.html", "x")]);
        let renderer = ViewsRenderer::load(dir.path()).unwrap();

        let result = renderer.render("blog", &json!({}));
        assert!(matches!(result, Err(RenderError::MissingTemplate(name)) if name == "blog"));
    }

    #[test]
    fn syntax_error_reported_at_load() {
        let dir = views(&[("page.html", "{% for %}")]);
        let result = ViewsRenderer::load(dir.path());
        assert!(matches!(result, Err(RenderError::Template { .. })));
    }

    #[test]
    fn hidden_files_ignored() {
        let dir = views(&[("page.html", "x"), (".page.html.swp", "junk")]);
        let renderer = ViewsRenderer::load(dir.path()).unwrap();
        assert_eq!(renderer.template_names().collect::<Vec<_>>(), vec!["page"]);
    }

    #[test]
    fn duplicate_stem_keeps_first_by_name() {
        let dir = views(&[("page.html", "html"), ("page.leaf", "leaf")]);
        let renderer = ViewsRenderer::load(dir.path()).unwrap();

        let out = renderer.render("page", &json!({})).unwrap();
        assert_eq!(out, b"html");
    }

    #[test]
    fn missing_views_dir_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = ViewsRenderer::load(&tmp.path().join("Views"));
        assert!(matches!(result, Err(RenderError::Io { .. })));
    }
}
