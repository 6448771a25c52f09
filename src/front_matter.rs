//! Post header parsing.
//!
//! Every post under `Content/blog` starts with a small delimited header:
//!
//! ```text
//! ---
//! Title: Hello
//! Date: 2020-01-02
//! Draft: true
//! ---
//! Body markdown starts on the line after the second delimiter.
//! ```
//!
//! ## Rules
//!
//! - A line exactly equal to `---` is a delimiter. Only the first two count;
//!   scanning stops at the second one.
//! - `Title: ` and `Date: ` are required. `Draft: ` is optional and defaults
//!   to `false`.
//! - The body is every line after the second delimiter, rejoined with `\n`.
//!   Leading blank lines are kept: they are part of the markdown.
//!
//! ## Dates
//!
//! Dates are parsed with fixed formats, never the system locale: ISO-8601
//! (`2020-01-02`) or the short US form (`1/2/20`). New headers are written
//! in ISO-8601; templates receive the display form `Jan 2, 2020`.

use chrono::NaiveDate;
use thiserror::Error;

const DELIMITER: &str = "---";
const TITLE_PREFIX: &str = "Title: ";
const DATE_PREFIX: &str = "Date: ";
const DRAFT_PREFIX: &str = "Draft: ";

/// Format used when writing a header.
pub const STORAGE_DATE_FORMAT: &str = "%Y-%m-%d";
/// Accepted alongside ISO dates for headers written by hand.
pub const SHORT_DATE_FORMAT: &str = "%m/%d/%y";
/// Format handed to templates.
pub const DISPLAY_DATE_FORMAT: &str = "%b %-d, %Y";

#[derive(Error, Debug, PartialEq)]
pub enum FrontMatterError {
    #[error("incomplete post header: {0}")]
    IncompleteHeader(&'static str),
    #[error("unrecognised date {0:?} (expected YYYY-MM-DD or MM/DD/YY)")]
    InvalidDate(String),
    #[error("unrecognised draft flag {0:?} (expected true or false)")]
    InvalidDraft(String),
}

/// Metadata carried by a post header.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontMatter {
    pub title: String,
    pub date: NaiveDate,
    pub draft: bool,
}

impl FrontMatter {
    /// Date as shown to readers, e.g. `Jan 2, 2020`.
    pub fn display_date(&self) -> String {
        self.date.format(DISPLAY_DATE_FORMAT).to_string()
    }

    /// Render the header block, delimiters included, without a trailing newline.
    ///
    /// `Draft:` is only written for drafts.
    pub fn to_header(&self) -> String {
        let mut lines = vec![
            DELIMITER.to_string(),
            format!("{TITLE_PREFIX}{}", self.title),
            format!("{DATE_PREFIX}{}", self.date.format(STORAGE_DATE_FORMAT)),
        ];
        if self.draft {
            lines.push(format!("{DRAFT_PREFIX}true"));
        }
        lines.push(DELIMITER.to_string());
        lines.join("\n")
    }
}

/// Split a post into its header metadata and markdown body.
pub fn parse(raw: &str) -> Result<(FrontMatter, String), FrontMatterError> {
    let lines: Vec<&str> = raw.split('\n').collect();

    let mut delimiters = 0;
    let mut title = None;
    let mut date = None;
    let mut draft = false;
    let mut body_start = None;

    for (idx, raw_line) in lines.iter().enumerate() {
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
        if line == DELIMITER {
            delimiters += 1;
            if delimiters == 2 {
                body_start = Some(idx + 1);
                break;
            }
            continue;
        }
        if let Some(value) = line.strip_prefix(TITLE_PREFIX) {
            title = Some(value.to_string());
        } else if let Some(value) = line.strip_prefix(DATE_PREFIX) {
            date = Some(parse_date(value)?);
        } else if let Some(value) = line.strip_prefix(DRAFT_PREFIX) {
            draft = parse_draft(value)?;
        }
    }

    let body_start =
        body_start.ok_or(FrontMatterError::IncompleteHeader("missing closing `---`"))?;
    let title = title.ok_or(FrontMatterError::IncompleteHeader("missing `Title:`"))?;
    let date = date.ok_or(FrontMatterError::IncompleteHeader("missing `Date:`"))?;

    let body = lines[body_start..].join("\n");

    Ok((FrontMatter { title, date, draft }, body))
}

/// Parse a header date in either accepted format.
pub fn parse_date(value: &str) -> Result<NaiveDate, FrontMatterError> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, STORAGE_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(value, SHORT_DATE_FORMAT))
        .map_err(|_| FrontMatterError::InvalidDate(value.to_string()))
}

fn parse_draft(value: &str) -> Result<bool, FrontMatterError> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(FrontMatterError::InvalidDraft(other.to_string())),
    }
}
