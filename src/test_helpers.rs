//! Shared test utilities for the taan test suite.
//!
//! Builds throwaway source trees with the `Content`/`Views`/`Static` layout
//! so module tests don't need checked-in fixtures.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let site = SiteBuilder::new()
//!     .page("about", "Hi")
//!     .post("Hello.md", &post_text("Hello", "01/02/20", false, "World"))
//!     .build();
//! let output = TempDir::new().unwrap();
//! ```

use std::fs;
use std::path::PathBuf;
pub use tempfile::TempDir;

pub const PAGE_VIEW: &str =
    "<nav>{% for p in pages %}[{{ p.name }}]{% endfor %}</nav><main>{{ body|safe }}</main>";
pub const POST_VIEW: &str =
    "<h1>{{ title }}</h1><time>{{ date }}</time><main>{{ body|safe }}</main>";
pub const BLOG_VIEW: &str = "<h1>{{ title }}</h1>\
    {% for post in posts %}<a href=\"{{ post.path }}\">{{ post.title }}</a> {{ post.date }};{% endfor %}";

/// Render a post file with a header block.
pub fn post_text(title: &str, date: &str, draft: bool, body: &str) -> String {
    let draft_line = if draft { "Draft: true\n" } else { "" };
    format!("---\nTitle: {title}\nDate: {date}\n{draft_line}---\n{body}")
}

// =========================================================================
// Source tree builder
// =========================================================================

/// Describes a source tree; `build` writes it to a fresh temp directory.
pub struct SiteBuilder {
    config: String,
    files: Vec<(PathBuf, String)>,
}

impl SiteBuilder {
    /// A site titled "T" with blog title "B" and the three stock views.
    pub fn new() -> Self {
        Self {
            config: r#"{"title": "T", "blog_title": "B"}"#.to_string(),
            files: Vec::new(),
        }
        .view("page.html", PAGE_VIEW)
        .view("post.html", POST_VIEW)
        .view("blog.html", BLOG_VIEW)
    }

    pub fn config(mut self, json: &str) -> Self {
        self.config = json.to_string();
        self
    }

    pub fn page(self, name: &str, body: &str) -> Self {
        self.file(format!("Content/{name}.md"), body)
    }

    pub fn post(self, file_name: &str, text: &str) -> Self {
        self.file(format!("Content/blog/{file_name}"), text)
    }

    pub fn view(self, file_name: &str, template: &str) -> Self {
        self.file(format!("Views/{file_name}"), template)
    }

    pub fn static_file(self, rel: &str, contents: &str) -> Self {
        self.file(format!("Static/{rel}"), contents)
    }

    fn file(mut self, rel: String, contents: &str) -> Self {
        self.files.push((PathBuf::from(rel), contents.to_string()));
        self
    }

    pub fn build(self) -> TempDir {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        for dir in ["Content", "Views", "Static"] {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
        fs::write(root.join("config.json"), &self.config).unwrap();
        for (rel, contents) in &self.files {
            let path = root.join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, contents).unwrap();
        }
        tmp
    }
}

/// Read an output file as a string. Panics with the path on a miss.
pub fn read_output(root: &std::path::Path, rel: &str) -> String {
    let path = root.join(rel);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}
