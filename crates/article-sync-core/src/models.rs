//! Core data models used throughout article-sync.
//!
//! An [`Article`] is what the loader produces from one source file. An
//! [`ArticleRow`] is the column set written to storage, with the plain-text
//! projection filled in. A [`StoredArticle`] is what storage hands back.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::plain::strip_tags;

/// Textual timestamp format of the `date` header and of the stored
/// `published` column.
pub const PUBLISHED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Case-sensitive, deduplicated set of tags.
pub type TagSet = BTreeSet<String>;

/// A fully loaded article source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// Filename minus its final extension. Natural key for sync.
    pub slug: String,
    pub published: NaiveDateTime,
    pub hidden: bool,
    pub title: String,
    /// Rendered text before the last split marker, if the body had one.
    pub summary_html: Option<String>,
    /// Rendered body with all split markers removed.
    pub full_html: String,
    pub tags: TagSet,
}

impl Article {
    /// Tag-free, entity-decoded projection of [`Article::full_html`].
    pub fn full_plain(&self) -> String {
        strip_tags(&self.full_html)
    }
}

/// Column values written for one article on insert or update.
///
/// `full_plain` is derived from `full_html` when the row is built and is
/// never taken from anywhere else.
#[derive(Debug, Clone)]
pub struct ArticleRow<'a> {
    pub slug: &'a str,
    pub published: NaiveDateTime,
    pub hidden: bool,
    pub title: &'a str,
    pub summary_html: Option<&'a str>,
    pub full_html: &'a str,
    pub full_plain: String,
}

impl<'a> From<&'a Article> for ArticleRow<'a> {
    fn from(article: &'a Article) -> Self {
        Self {
            slug: &article.slug,
            published: article.published,
            hidden: article.hidden,
            title: &article.title,
            summary_html: article.summary_html.as_deref(),
            full_html: &article.full_html,
            full_plain: article.full_plain(),
        }
    }
}

impl ArticleRow<'_> {
    /// `published` rendered in [`PUBLISHED_FORMAT`].
    pub fn published_text(&self) -> String {
        self.published.format(PUBLISHED_FORMAT).to_string()
    }
}

/// An article as read back from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredArticle {
    pub id: i64,
    pub slug: String,
    pub published: NaiveDateTime,
    pub hidden: bool,
    pub title: String,
    pub summary_html: Option<String>,
    pub full_html: String,
    pub full_plain: String,
    pub tags: Vec<String>,
}
