//! Parsing of the `key: value` header block at the top of a source file.
//!
//! ```text
//! title: Hello world
//! date: 2020-01-02 15:04:05
//! tags: rust, blog
//! hidden: no
//!
//! Body starts here...
//! ```
//!
//! The block ends at the first blank line (or end of input). Recognised keys
//! are `title`, `date`, `tags` and `hidden`, case-insensitively; everything
//! else is ignored.

use std::io;

use chrono::NaiveDateTime;

use crate::error::ArticleError;
use crate::models::{TagSet, PUBLISHED_FORMAT};

/// Typed header fields of one article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleHeader {
    pub title: String,
    pub published: NaiveDateTime,
    pub hidden: bool,
    pub tags: TagSet,
}

/// Consume header lines from `lines`, leaving the iterator positioned at the
/// first body line.
pub fn parse_header<I>(lines: &mut I) -> Result<ArticleHeader, ArticleError>
where
    I: Iterator<Item = io::Result<String>>,
{
    let mut title: Option<String> = None;
    let mut published: Option<NaiveDateTime> = None;
    let mut hidden = false;
    let mut tags = TagSet::new();

    for line in lines.by_ref() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            break;
        }

        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| ArticleError::BrokenHeader {
                line: line.to_string(),
            })?;
        let value = value.trim();

        match key.trim().to_lowercase().as_str() {
            "title" => title = Some(value.to_string()),
            "tags" => tags = split_tags(value),
            "date" => published = Some(parse_date(value)?),
            "hidden" => hidden = value.to_lowercase() == "yes",
            _ => {}
        }
    }

    match (title, published) {
        (Some(title), Some(published)) => Ok(ArticleHeader {
            title,
            published,
            hidden,
            tags,
        }),
        _ => Err(ArticleError::MissingMandatoryHeaders),
    }
}

/// Split a comma-separated tag list; pieces are trimmed and empty ones dropped.
pub fn split_tags(value: &str) -> TagSet {
    value
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_date(value: &str) -> Result<NaiveDateTime, ArticleError> {
    NaiveDateTime::parse_from_str(value, PUBLISHED_FORMAT).map_err(|source| {
        ArticleError::DateFormat {
            value: value.to_string(),
            source,
        }
    })
}
