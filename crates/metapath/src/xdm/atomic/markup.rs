//! Markdown-backed markup values.
//!
//! `markup-line` admits a single line of inline content only; `markup-multiline`
//! admits any Markdown document.

use super::{AtomicItem, cannot_cast};
use crate::engine::runtime::Error;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, html};

fn options() -> Options {
    Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES
}

fn is_inline(event: &Event<'_>) -> bool {
    match event {
        Event::Start(tag) => matches!(
            tag,
            Tag::Paragraph | Tag::Emphasis | Tag::Strong | Tag::Strikethrough | Tag::Link { .. } | Tag::Image { .. }
        ),
        Event::End(tag) => matches!(
            tag,
            TagEnd::Paragraph | TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link | TagEnd::Image
        ),
        Event::Text(_) | Event::Code(_) | Event::InlineHtml(_) | Event::SoftBreak | Event::HardBreak => true,
        _ => false,
    }
}

pub(crate) fn parse_markup_line(s: &str) -> Result<String, Error> {
    let invalid = || Error::invalid_lexical("markup-line", s);
    if s.contains(['\n', '\r']) {
        return Err(invalid());
    }
    if !Parser::new_ext(s, options()).all(|event| is_inline(&event)) {
        return Err(invalid());
    }
    Ok(s.to_string())
}

pub(crate) fn parse_markup_multiline(s: &str) -> String {
    s.to_string()
}

/// Render to HTML; single lines are not wrapped in a paragraph.
pub(crate) fn to_html(markdown: &str, line: bool) -> String {
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(markdown, options()));
    if line {
        let trimmed = out.trim_end();
        if let Some(inner) = trimmed.strip_prefix("<p>").and_then(|rest| rest.strip_suffix("</p>")) {
            return inner.to_string();
        }
        return trimmed.to_string();
    }
    out
}

pub(crate) fn cast_to_markup_line(item: &AtomicItem) -> Result<String, Error> {
    match item {
        AtomicItem::MarkupLine(s) => Ok(s.clone()),
        AtomicItem::MarkupMultiline(s) => parse_markup_line(s),
        other if other.is_string_like() => parse_markup_line(&other.as_string()),
        other => Err(cannot_cast(other, "markup-line")),
    }
}

pub(crate) fn cast_to_markup_multiline(item: &AtomicItem) -> Result<String, Error> {
    match item {
        AtomicItem::MarkupLine(s) | AtomicItem::MarkupMultiline(s) => Ok(s.clone()),
        other if other.is_string_like() => Ok(parse_markup_multiline(&other.as_string())),
        other => Err(cannot_cast(other, "markup-multiline")),
    }
}

pub(crate) fn cast_to_markup(item: &AtomicItem) -> Result<AtomicItem, Error> {
    match item {
        AtomicItem::MarkupLine(_) | AtomicItem::MarkupMultiline(_) => Ok(item.clone()),
        other => cast_to_markup_multiline(other).map(AtomicItem::MarkupMultiline),
    }
}

impl AtomicItem {
    /// HTML rendering of a markup value.
    pub fn markup_to_html(&self) -> Option<String> {
        match self {
            AtomicItem::MarkupLine(s) => Some(to_html(s, true)),
            AtomicItem::MarkupMultiline(s) => Some(to_html(s, false)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("plain text", true)]
    #[case("some *emphasis* and **strong** with `code`", true)]
    #[case("a [link](http://example.com)", true)]
    #[case("# heading", false)]
    #[case("- item", false)]
    #[case("two\nlines", false)]
    fn markup_line_is_inline_only(#[case] input: &str, #[case] valid: bool) {
        assert_eq!(parse_markup_line(input).is_ok(), valid);
    }

    #[rstest]
    fn renders_html() {
        assert_eq!(to_html("a *b*", true), "a <em>b</em>");
        assert_eq!(to_html("# T\n\ntext", false), "<h1>T</h1>\n<p>text</p>\n");
    }
}
