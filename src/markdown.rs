//! Markdown to styled text blocks.
//!
//! Parses a restricted, line-oriented Markdown subset into an ordered list of
//! [`Block`]s, each carrying inline [`InlineSpan`]s. The converter never
//! fails on syntax: unsupported constructs (deep headings, nested quotes,
//! images) degrade to plain paragraph text. The only error is an input that
//! exceeds [`MAX_MARKDOWN_BYTES`].
//!
//! Supported: `#`/`##` headings, `-`/`*`/`+` and `N.` list items, `>` quotes,
//! fenced and inline code, `|`-delimited table rows, `**bold**`,
//! `*italic*`/`_italic_`, `[text](url)` links, bare URLs, and `:shortcode:`
//! emoji.

use crate::error::{CardError, CardResult};

/// Size ceiling protecting layout from pathological input.
pub const MAX_MARKDOWN_BYTES: usize = 64 * 1024;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SpanStyle {
    Plain,
    Bold,
    Italic,
    Code,
    Link,
}

/// A contiguous run of text sharing one style. `url` is set iff the style is
/// [`SpanStyle::Link`]; `text` is never empty.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct InlineSpan {
    pub text: String,
    pub style: SpanStyle,
    pub url: Option<String>,
}

impl InlineSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::styled(text, SpanStyle::Plain)
    }

    pub fn styled(text: impl Into<String>, style: SpanStyle) -> Self {
        Self {
            text: text.into(),
            style,
            url: None,
        }
    }

    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: SpanStyle::Link,
            url: Some(url.into()),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BlockKind {
    Heading1,
    Heading2,
    Paragraph,
    ListItem,
    Quote,
    CodeLine,
    TableRow,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Block {
    pub kind: BlockKind,
    pub spans: Vec<InlineSpan>,
    pub indent: usize,
}

impl Block {
    fn new(kind: BlockKind, spans: Vec<InlineSpan>) -> Self {
        Self {
            kind,
            spans,
            indent: 0,
        }
    }
}

/// Convert a Markdown document into blocks, preserving document order.
pub fn parse_markdown(input: &str) -> CardResult<Vec<Block>> {
    if input.len() > MAX_MARKDOWN_BYTES {
        return Err(CardError::MarkdownInputTooLarge {
            size: input.len(),
            limit: MAX_MARKDOWN_BYTES,
        });
    }

    // Callers frequently hand over JSON-escaped text; a literal backslash-n
    // is a line break here, as in the original card service.
    let text = input.replace("\\n", "\n");

    let mut blocks = Vec::new();
    let mut in_fence = false;

    for raw in text.lines() {
        let line = raw.trim_end();
        let trimmed = line.trim_start();

        if trimmed.starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            let text = if line.is_empty() { " " } else { line };
            blocks.push(Block::new(
                BlockKind::CodeLine,
                vec![InlineSpan::styled(text, SpanStyle::Code)],
            ));
            continue;
        }
        if trimmed.is_empty() {
            continue;
        }

        let indent = line.len() - trimmed.len();

        if let Some(rest) = trimmed.strip_prefix("## ") {
            push_block(&mut blocks, BlockKind::Heading2, parse_inline(rest), 0);
        } else if let Some(rest) = trimmed.strip_prefix("# ") {
            push_block(&mut blocks, BlockKind::Heading1, parse_inline(rest), 0);
        } else if trimmed.starts_with('#') {
            // Deeper heading levels degrade to a paragraph of their text.
            let rest = trimmed.trim_start_matches('#').trim_start();
            push_block(&mut blocks, BlockKind::Paragraph, parse_inline(rest), 0);
        } else if trimmed.starts_with('|') {
            if let Some(spans) = parse_table_row(trimmed) {
                push_block(&mut blocks, BlockKind::TableRow, spans, 0);
            }
        } else if let Some(rest) = trimmed.strip_prefix('>') {
            let (kind, content) = unquote(rest);
            push_block(&mut blocks, kind, parse_inline(content), 0);
        } else if let Some((marker, rest)) = list_marker(trimmed) {
            let mut spans = vec![InlineSpan::plain(marker)];
            spans.extend(parse_inline(rest));
            push_block(&mut blocks, BlockKind::ListItem, spans, indent / 2);
        } else {
            push_block(&mut blocks, BlockKind::Paragraph, parse_inline(trimmed), 0);
        }
    }

    Ok(blocks)
}

fn push_block(blocks: &mut Vec<Block>, kind: BlockKind, spans: Vec<InlineSpan>, indent: usize) {
    if spans.is_empty() {
        return;
    }
    let mut block = Block::new(kind, spans);
    block.indent = indent;
    blocks.push(block);
}

/// Single-level quotes stay quotes; nested quoting degrades to a paragraph.
fn unquote(after_first: &str) -> (BlockKind, &str) {
    let mut rest = after_first.strip_prefix(' ').unwrap_or(after_first);
    let mut nested = false;
    while let Some(inner) = rest.strip_prefix('>') {
        nested = true;
        rest = inner.strip_prefix(' ').unwrap_or(inner);
    }
    let kind = if nested {
        BlockKind::Paragraph
    } else {
        BlockKind::Quote
    };
    (kind, rest)
}

/// Recognize `- ` / `* ` / `+ ` and `N. ` markers; the returned marker text
/// becomes the item's leading span (`•` or the number).
fn list_marker(trimmed: &str) -> Option<(String, &str)> {
    for bullet in ["- ", "* ", "+ "] {
        if let Some(rest) = trimmed.strip_prefix(bullet) {
            return Some(("• ".to_string(), rest.trim_start()));
        }
    }
    let digits = trimmed.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits > 0 && digits <= 3 {
        if let Some(rest) = trimmed[digits..].strip_prefix(". ") {
            return Some((format!("{} ", &trimmed[..digits + 1]), rest.trim_start()));
        }
    }
    None
}

/// Split a `|`-delimited row into cells joined by plain spacing spans.
/// Returns `None` for alignment separator rows.
fn parse_table_row(trimmed: &str) -> Option<Vec<InlineSpan>> {
    let inner = trimmed.trim_matches('|');
    let cells: Vec<&str> = inner.split('|').map(str::trim).collect();
    let is_separator = cells
        .iter()
        .all(|c| !c.is_empty() && c.chars().all(|ch| matches!(ch, '-' | ':')));
    if is_separator {
        return None;
    }
    let mut spans = Vec::new();
    for cell in cells {
        if cell.is_empty() {
            continue;
        }
        if !spans.is_empty() {
            spans.push(InlineSpan::plain("  "));
        }
        spans.extend(parse_inline(cell));
    }
    Some(spans)
}

/// Inline scanner: emphasis, code, links, images (degraded to alt text),
/// with emoji substitution and bare-URL detection on plain runs.
fn parse_inline(text: &str) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    let mut plain = String::new();
    let mut i = 0;

    while i < text.len() {
        let rest = &text[i..];

        if let Some(end) = delimited(rest, "**", "**") {
            let inner = &rest[2..end];
            flush_plain(&mut spans, &mut plain);
            spans.push(InlineSpan::styled(substitute_emoji(inner), SpanStyle::Bold));
            i += end + 2;
            continue;
        }
        if rest.starts_with("**") {
            // Unmatched double marker stays literal; consuming both stars
            // keeps the second one from opening a phantom italic run.
            plain.push_str("**");
            i += 2;
            continue;
        }
        if let Some(end) = delimited(rest, "*", "*") {
            let inner = &rest[1..end];
            flush_plain(&mut spans, &mut plain);
            spans.push(InlineSpan::styled(
                substitute_emoji(inner),
                SpanStyle::Italic,
            ));
            i += end + 1;
            continue;
        }
        if let Some(end) = delimited(rest, "_", "_") {
            let inner = &rest[1..end];
            flush_plain(&mut spans, &mut plain);
            spans.push(InlineSpan::styled(
                substitute_emoji(inner),
                SpanStyle::Italic,
            ));
            i += end + 1;
            continue;
        }
        if let Some(end) = delimited(rest, "`", "`") {
            flush_plain(&mut spans, &mut plain);
            spans.push(InlineSpan::styled(&rest[1..end], SpanStyle::Code));
            i += end + 1;
            continue;
        }
        if rest.starts_with("![") {
            // Images cannot render on a card; keep the alt text.
            if let Some((label, _url, consumed)) = parse_link_syntax(&rest[1..]) {
                plain.push_str(&label);
                i += 1 + consumed;
                continue;
            }
        }
        if rest.starts_with('[') {
            if let Some((label, url, consumed)) = parse_link_syntax(rest) {
                flush_plain(&mut spans, &mut plain);
                spans.push(InlineSpan::link(substitute_emoji(&label), url));
                i += consumed;
                continue;
            }
        }

        let ch = rest.chars().next().unwrap();
        plain.push(ch);
        i += ch.len_utf8();
    }

    flush_plain(&mut spans, &mut plain);
    spans
}

/// Byte offset of the closing delimiter for `open...close` with non-empty
/// content, or `None` to fall back to literal text.
fn delimited(rest: &str, open: &str, close: &str) -> Option<usize> {
    let inner = rest.strip_prefix(open)?;
    let end = inner.find(close)?;
    if end == 0 {
        return None;
    }
    Some(open.len() + end)
}

/// Parse `[label](url)` starting at `[`; returns (label, url, bytes consumed).
fn parse_link_syntax(rest: &str) -> Option<(String, String, usize)> {
    let close = rest.find("](")?;
    let label = &rest[1..close];
    let after = &rest[close + 2..];
    let end = after.find(')')?;
    let url = &after[..end];
    if label.is_empty() || url.is_empty() {
        return None;
    }
    Some((label.to_string(), url.to_string(), close + 2 + end + 1))
}

fn flush_plain(spans: &mut Vec<InlineSpan>, plain: &mut String) {
    if plain.is_empty() {
        return;
    }
    let text = substitute_emoji(plain);
    plain.clear();
    detect_urls(&text, spans);
}

/// Split a plain run around bare URLs so every URL becomes a link span.
fn detect_urls(text: &str, spans: &mut Vec<InlineSpan>) {
    let mut remaining = text;
    loop {
        let found = ["https://", "http://", "www."]
            .iter()
            .filter_map(|p| remaining.find(p).map(|at| (at, *p)))
            .min_by_key(|(at, _)| *at);
        let Some((at, prefix)) = found else {
            if !remaining.is_empty() {
                spans.push(InlineSpan::plain(remaining));
            }
            return;
        };
        if at > 0 {
            spans.push(InlineSpan::plain(&remaining[..at]));
        }
        let tail = &remaining[at..];
        let mut len = tail
            .find(|c: char| c.is_whitespace() || matches!(c, '<' | '>' | '"'))
            .unwrap_or(tail.len());
        // Trailing sentence punctuation is not part of the URL.
        while len > 0 && matches!(tail.as_bytes()[len - 1], b'.' | b',' | b';' | b':' | b'!' | b'?' | b')') {
            len -= 1;
        }
        // A scheme or `www.` with nothing after it is plain text.
        if len <= prefix.len() {
            spans.push(InlineSpan::plain(&tail[..prefix.len()]));
            remaining = &tail[prefix.len()..];
            continue;
        }
        let url = &tail[..len];
        spans.push(InlineSpan::link(url, url));
        remaining = &tail[len..];
    }
}

/// Recognized `:shortcode:` names and their glyphs. Unrecognized codes pass
/// through literally.
const EMOJI: &[(&str, &str)] = &[
    ("+1", "👍"),
    ("100", "💯"),
    ("bulb", "💡"),
    ("check", "✅"),
    ("eyes", "👀"),
    ("fire", "🔥"),
    ("heart", "❤️"),
    ("link", "🔗"),
    ("memo", "📝"),
    ("rocket", "🚀"),
    ("smile", "😄"),
    ("sparkles", "✨"),
    ("star", "⭐"),
    ("tada", "🎉"),
    ("thinking", "🤔"),
    ("thumbsup", "👍"),
    ("warning", "⚠️"),
    ("wave", "👋"),
    ("white_check_mark", "✅"),
    ("x", "❌"),
];

fn emoji_glyph(name: &str) -> Option<&'static str> {
    EMOJI.iter().find(|(n, _)| *n == name).map(|(_, g)| *g)
}

fn substitute_emoji(text: &str) -> String {
    if !text.contains(':') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(':') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let name_len = tail
            .find(|c: char| !(c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '+' | '-')))
            .unwrap_or(tail.len());
        let closed = tail[name_len..].starts_with(':');
        if closed && name_len > 0 {
            if let Some(glyph) = emoji_glyph(&tail[..name_len]) {
                out.push_str(glyph);
                rest = &tail[name_len + 1..];
                continue;
            }
        }
        // Not a recognized shortcode; keep the colon and rescan after it.
        out.push(':');
        rest = tail;
    }
    out.push_str(rest);
    out
}
