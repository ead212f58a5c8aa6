//! Splices resolved citations into a segment as anchor elements.

use std::borrow::Cow;

use crate::matcher::ResolvedCitation;

/// Result of rewriting one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    /// The original text, or an HTML fragment with anchors spliced in.
    pub fragment: String,
    /// Whether any anchor was inserted.
    pub rewritten: bool,
    pub links: usize,
}

impl Rewrite {
    /// A segment passed through untouched.
    pub fn unchanged(text: &str) -> Self {
        Self {
            fragment: text.to_string(),
            rewritten: false,
            links: 0,
        }
    }
}

/// Escape text content so it cannot open or close markup.
pub fn escape_text(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Escape a value for a double-quoted attribute.
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"']) {
        return Cow::Borrowed(s);
    }
    let escaped = escape_text(s);
    Cow::Owned(escaped.replace('"', "&quot;"))
}

/// Wrap matched text in an anchor opening `url` in an isolated new tab.
pub fn wrap(matched: &str, url: &str) -> String {
    format!(
        r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
        escape_attr(url),
        escape_text(matched)
    )
}

/// Replace each citation's span in `text` with its anchor.
///
/// Citations must be ordered by position. Spans that overlap an earlier one
/// or do not fall on character boundaries are skipped. Text outside the
/// spans is copied verbatim.
pub fn rewrite(text: &str, citations: &[ResolvedCitation]) -> Rewrite {
    let mut fragment = String::with_capacity(text.len() + citations.len() * 96);
    let mut cursor = 0;
    let mut links = 0;

    for citation in citations {
        let span = citation.span();
        if span.start < cursor
            || span.start >= span.end
            || span.end > text.len()
            || !text.is_char_boundary(span.start)
            || !text.is_char_boundary(span.end)
        {
            continue;
        }
        fragment.push_str(&text[cursor..span.start]);
        fragment.push_str(&wrap(&text[span.clone()], citation.target_url()));
        cursor = span.end;
        links += 1;
    }

    if links == 0 {
        return Rewrite::unchanged(text);
    }
    fragment.push_str(&text[cursor..]);
    Rewrite {
        fragment,
        rewritten: true,
        links,
    }
}
