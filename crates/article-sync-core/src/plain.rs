//! Plain-text projection of rendered HTML.
//!
//! Used to fill the `full_plain` column that an external search facility
//! indexes. Best effort: malformed markup is tolerated and nothing here
//! can fail.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use quick_xml::escape::resolve_html5_entity;
use regex::{Captures, Regex};

/// `<`, then any run of unquoted non-`>` text or quoted attribute values, then `>`.
static HTML_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<([^>'"]+|'[^']*'|"[^"]*")*>"#).expect("valid tag pattern"));

static HTML_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&[^;]*;").expect("valid entity pattern"));

/// Remove every tag-like token from `html`, then decode character entities.
pub fn strip_tags(html: &str) -> String {
    let without_tags = HTML_TAG.replace_all(html, "");
    HTML_ENTITY
        .replace_all(&without_tags, |caps: &Captures| unescape(&caps[0]))
        .into_owned()
}

/// Named references that HTML5 also accepts without the trailing `;`.
const LEGACY_ENTITIES: &[&str] = &[
    "AElig", "AMP", "Aacute", "Acirc", "Agrave", "Aring", "Atilde", "Auml", "COPY", "Ccedil",
    "ETH", "Eacute", "Ecirc", "Egrave", "Euml", "GT", "Iacute", "Icirc", "Igrave", "Iuml", "LT",
    "Ntilde", "Oacute", "Ocirc", "Ograve", "Oslash", "Otilde", "Ouml", "QUOT", "REG", "THORN",
    "Uacute", "Ucirc", "Ugrave", "Uuml", "Yacute", "aacute", "acirc", "acute", "aelig", "agrave",
    "amp", "aring", "atilde", "auml", "brvbar", "ccedil", "cedil", "cent", "copy", "curren",
    "deg", "divide", "eacute", "ecirc", "egrave", "eth", "euml", "frac12", "frac14", "frac34",
    "gt", "iacute", "icirc", "iexcl", "igrave", "iquest", "iuml", "laquo", "lt", "macr", "micro",
    "middot", "nbsp", "not", "ntilde", "oacute", "ocirc", "ograve", "ordf", "ordm", "oslash",
    "otilde", "ouml", "para", "plusmn", "pound", "quot", "raquo", "reg", "sect", "shy", "sup1",
    "sup2", "sup3", "szlig", "thorn", "times", "uacute", "ucirc", "ugrave", "uml", "uuml",
    "yacute", "yen", "yuml",
];

const LONGEST_LEGACY_ENTITY: usize = 6;

/// Windows-1252 meaning of numeric references in `0x80..=0x9F`.
const C1_REPLACEMENTS: [char; 32] = [
    '\u{20AC}', '\u{0081}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008D}', '\u{017D}', '\u{008F}',
    '\u{0090}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{009D}', '\u{017E}', '\u{0178}',
];

/// Decode every character reference in `text` with HTML5 rules. Anything
/// that is not a reference is copied through unchanged.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let reference = &rest[amp..];
        let consumed = match decode_reference(reference) {
            (Some(decoded), consumed) => {
                out.push_str(&decoded);
                consumed
            }
            (None, consumed) => {
                out.push_str(&reference[..consumed]);
                consumed
            }
        };
        rest = &reference[consumed..];
    }

    out.push_str(rest);
    out
}

/// Decode the reference at the start of `s` (which begins with `&`).
///
/// Returns the replacement, if any, and how many bytes of `s` it stands for.
/// Without a replacement those bytes are kept verbatim.
fn decode_reference(s: &str) -> (Option<Cow<'static, str>>, usize) {
    if s.as_bytes().get(1) == Some(&b'#') {
        return decode_numeric(s);
    }
    decode_named(s)
}

fn decode_numeric(s: &str) -> (Option<Cow<'static, str>>, usize) {
    let bytes = s.as_bytes();
    let mut i = 2;
    let radix = match bytes.get(i) {
        Some(b'x' | b'X') => {
            i += 1;
            16
        }
        _ => 10,
    };

    let mut code: u32 = 0;
    while let Some(digit) = bytes.get(i).and_then(|&b| (b as char).to_digit(radix)) {
        code = code.saturating_mul(radix).saturating_add(digit);
        i += 1;
    }
    if bytes.get(i) == Some(&b';') {
        i += 1;
    }

    // `&#`, `&#x` and a lone digit without `;` are not references.
    if i <= 3 {
        return (None, 1);
    }

    let ch = match code {
        0x80..=0x9F => C1_REPLACEMENTS[(code - 0x80) as usize],
        0 => '\u{FFFD}',
        _ => char::from_u32(code).unwrap_or('\u{FFFD}'),
    };
    (Some(Cow::Owned(ch.to_string())), i)
}

fn decode_named(s: &str) -> (Option<Cow<'static, str>>, usize) {
    let bytes = s.as_bytes();
    let mut i = 1;
    while bytes.get(i).is_some_and(u8::is_ascii_alphanumeric) {
        i += 1;
    }
    let terminated = bytes.get(i) == Some(&b';');
    let name = &s[1..i];
    if terminated {
        i += 1;
    }

    if name.is_empty() {
        return (None, i);
    }

    if terminated || LEGACY_ENTITIES.contains(&name) {
        if let Some(decoded) = resolve_html5_entity(name) {
            return (Some(Cow::Borrowed(decoded)), i);
        }
    }

    // Longest legacy prefix, so `&notit;` reads as `&not` followed by `it;`.
    let longest = (i - 2).min(LONGEST_LEGACY_ENTITY);
    for len in (2..=longest).rev() {
        let prefix = &s[1..=len];
        if LEGACY_ENTITIES.contains(&prefix) {
            if let Some(decoded) = resolve_html5_entity(prefix) {
                return (Some(Cow::Borrowed(decoded)), len + 1);
            }
        }
    }

    (None, i)
}
