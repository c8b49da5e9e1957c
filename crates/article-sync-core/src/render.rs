//! Markdown → HTML rendering.
//!
//! The body splitter only sees the [`Renderer`] trait, so tests can swap in
//! a renderer that echoes its input or one that always fails.

use pulldown_cmark::{html, Options, Parser};

use crate::error::RenderError;

/// Converts a markdown document into an HTML fragment.
pub trait Renderer: Send + Sync {
    fn render(&self, markdown: &str) -> Result<String, RenderError>;
}

/// CommonMark renderer backed by `pulldown-cmark`.
///
/// Plain CommonMark only: no tables, footnotes, strikethrough or task
/// lists. Raw HTML in the source is passed through untouched, and fenced
/// code blocks keep their `language-*` class for client-side highlighting.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownRenderer {
    options: Options,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self {
            options: Options::empty(),
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for MarkdownRenderer {
    fn render(&self, markdown: &str) -> Result<String, RenderError> {
        let parser = Parser::new_ext(markdown, self.options);
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        Ok(out)
    }
}
