//! Splitting of the markdown body into summary and full HTML.
//!
//! A line consisting only of `~~more~~` (two or more tildes on each side,
//! `more` in any case, surrounding ASCII whitespace allowed) marks the end of the
//! summary. Marker lines never reach the rendered output.

use std::io;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ArticleError;
use crate::render::Renderer;

/// Only ASCII whitespace may surround the marker; U+00A0 and friends do not count.
static MORE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\t\n\x0C\r ]*~~+(?i:more)~~+[\t\n\x0C\r ]*$").expect("valid marker pattern")
});

/// Rendered body fragments of one article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleBody {
    pub summary_html: Option<String>,
    pub full_html: String,
}

pub fn is_split_marker(line: &str) -> bool {
    MORE_MARKER.is_match(line)
}

/// Consume all remaining lines and render them.
///
/// The buffer is cumulative: at every marker the summary is re-rendered from
/// everything accumulated so far, so with several markers the summary ends
/// at the last one.
pub fn split_body<I>(lines: &mut I, renderer: &dyn Renderer) -> Result<ArticleBody, ArticleError>
where
    I: Iterator<Item = io::Result<String>>,
{
    let mut buf = String::new();
    let mut summary_html = None;

    for line in lines.by_ref() {
        let line = line?;

        if is_split_marker(&line) {
            summary_html = Some(renderer.render(&buf)?);
            continue;
        }

        buf.push_str(&line);
        buf.push('\n');
    }

    let full_html = renderer.render(&buf)?;

    Ok(ArticleBody {
        summary_html,
        full_html,
    })
}
