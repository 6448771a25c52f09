//! Template context assembly.
//!
//! Contexts are plain JSON documents, never types tied to the template engine.
//! Every context carries the full navigation list (`pages`) and the site's
//! `site_title`:
//!
//! | Artifact | Template | Keys |
//! |----------|----------|------|
//! | page     | `page`   | `body`, `pages`, `site_title` |
//! | post     | `post`   | `title`, `date`, `body`, `pages`, `site_title` |
//! | index    | `blog`   | `title` (blog title), `posts`, `pages`, `site_title` |
//!
//! Draft posts never get a context and never appear in the index.

use crate::config::SiteSettings;
use crate::content::{Page, Post};
use crate::render::markdown_to_html;
use crate::types::{IndexEntry, NavPage};
use serde_json::{Value, json};

/// Navigation entries for every page, in page-list order.
pub fn nav_pages(pages: &[Page]) -> Vec<NavPage> {
    pages
        .iter()
        .map(|p| NavPage {
            name: p.name.clone(),
        })
        .collect()
}

/// Context for a top-level page.
pub fn page_context(raw_body: &str, nav: &[NavPage], settings: &SiteSettings) -> Value {
    json!({
        "body": markdown_to_html(raw_body),
        "pages": nav,
        "site_title": settings.title,
    })
}

/// Context for a single post, or `None` for drafts.
pub fn post_context(post: &Post, nav: &[NavPage], settings: &SiteSettings) -> Option<Value> {
    if post.is_draft() {
        return None;
    }
    Some(json!({
        "title": post.front_matter.title,
        "date": post.front_matter.display_date(),
        "body": markdown_to_html(&post.body),
        "pages": nav,
        "site_title": settings.title,
    }))
}

/// Index rows for every published post, in the given order.
pub fn index_entries(posts: &[Post]) -> Vec<IndexEntry> {
    posts
        .iter()
        .filter(|p| !p.is_draft())
        .map(|p| IndexEntry {
            title: p.front_matter.title.clone(),
            path: p.url_path(),
            date: p.front_matter.display_date(),
        })
        .collect()
}

/// Context for the post index.
pub fn index_context(posts: &[Post], nav: &[NavPage], settings: &SiteSettings) -> Value {
    json!({
        "title": settings.blog_title,
        "posts": index_entries(posts),
        "pages": nav,
        "site_title": settings.title,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WatchSettings;
    use crate::front_matter::FrontMatter;
    use chrono::NaiveDate;

    fn settings() -> SiteSettings {
        SiteSettings {
            title: "T".into(),
            blog_title: "B".into(),
            watch: WatchSettings::default(),
        }
    }

    fn post(file_name: &str, title: &str, draft: bool) -> Post {
        Post {
            file_name: file_name.into(),
            front_matter: FrontMatter {
                title: title.into(),
                date: NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
                draft,
            },
            body: "World".into(),
        }
    }

    fn nav() -> Vec<NavPage> {
        nav_pages(&[
            Page {
                name: "about".into(),
                source: None,
            },
            Page {
                name: "blog".into(),
                source: None,
            },
        ])
    }

    #[test]
    fn page_context_renders_markdown() {
        let ctx = page_context("Hi", &nav(), &settings());
        assert_eq!(ctx["body"], "<p>Hi</p>\n");
        assert_eq!(ctx["pages"], json!([{"name": "about"}, {"name": "blog"}]));
        assert_eq!(ctx["site_title"], "T");
    }

    #[test]
    fn post_context_formats_date() {
        let ctx = post_context(&post("Hello.md", "Hello", false), &nav(), &settings()).unwrap();
        assert_eq!(ctx["title"], "Hello");
        assert_eq!(ctx["date"], "Jan 2, 2020");
        assert_eq!(ctx["body"], "<p>World</p>\n");
        assert_eq!(ctx["pages"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn draft_has_no_post_context() {
        assert!(post_context(&post("Draft.md", "D", true), &nav(), &settings()).is_none());
    }

    #[test]
    fn index_skips_drafts_and_keeps_order() {
        let posts = vec![
            post("b.md", "B", false),
            post("draft.md", "D", true),
            post("a.md", "A", false),
        ];
        let titles: Vec<String> = index_entries(&posts).into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["B", "A"]);
    }

    #[test]
    fn index_context_uses_blog_title() {
        let posts = vec![post("My First Post.md", "Hello", false)];
        let ctx = index_context(&posts, &nav(), &settings());
        assert_eq!(ctx["title"], "B");
        assert_eq!(
            ctx["posts"],
            json!([{"title": "Hello", "path": "/blog/My-First-Post.html", "date": "Jan 2, 2020"}])
        );
    }
}
