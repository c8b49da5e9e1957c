//! Assembly of a complete [`Article`] from a source stream.

use std::io::{self, BufRead, Split};
use std::path::Path;

use crate::body::split_body;
use crate::error::ArticleError;
use crate::header::parse_header;
use crate::models::Article;
use crate::render::Renderer;

/// Parse a whole source file: header block, then body.
///
/// Errors from either stage are returned unchanged.
pub fn parse_article<R: BufRead>(
    reader: R,
    slug: String,
    renderer: &dyn Renderer,
) -> Result<Article, ArticleError> {
    let mut lines = source_lines(reader);
    let header = parse_header(&mut lines)?;
    let body = split_body(&mut lines, renderer)?;

    Ok(Article {
        slug,
        published: header.published,
        hidden: header.hidden,
        title: header.title,
        summary_html: body.summary_html,
        full_html: body.full_html,
        tags: header.tags,
    })
}

/// Lines of a source file with `\n` or `\r\n` removed.
///
/// Bytes that are not valid UTF-8 become U+FFFD instead of failing the
/// whole file.
pub struct SourceLines<R> {
    inner: Split<R>,
}

pub fn source_lines<R: BufRead>(reader: R) -> SourceLines<R> {
    SourceLines {
        inner: reader.split(b'\n'),
    }
}

impl<R: BufRead> Iterator for SourceLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = match self.inner.next()? {
            Ok(line) => line,
            Err(e) => return Some(Err(e)),
        };
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(Ok(match String::from_utf8(line) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        }))
    }
}

/// Base filename with its last dot-delimited segment removed.
///
/// `2020-01-02.my-post.md` becomes `2020-01-02.my-post`. A name without any
/// dot has nothing left once its only segment is dropped, so the slug is empty.
pub fn slug_from_path(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();

    match name.rsplit_once('.') {
        Some((stem, _ext)) => stem.to_string(),
        None => String::new(),
    }
}
