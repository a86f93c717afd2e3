//! Panel layout: wrapping, spacing, degradation, centering.
//!
//! Turns the block sequence into [`LayoutLine`]s with pixel positions
//! relative to the panel's text origin. Overflow is never an error: content
//! first scales down to [`MIN_SCALE`], then truncates with a trailing
//! indicator. Identical inputs always produce identical layouts.

use crate::markdown::{Block, BlockKind, InlineSpan, SpanStyle};

/// Font scale steps tried before truncation, largest first.
pub const MIN_SCALE: f32 = 0.6;
pub const SCALE_STEP: f32 = 0.05;

/// Horizontal shift per list nesting level, in unscaled pixels.
pub const INDENT_STEP: f32 = 40.0;

/// Appended as a final line when content is truncated at minimum scale.
pub const TRUNCATION_INDICATOR: &str = "…";

/// Resolved visual style for measuring and painting a span.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TextStyle {
    Heading1,
    Heading2,
    Body,
    BodyBold,
    BodyItalic,
    Code,
}

/// Deterministic text metrics. Results are unscaled; the layout engine
/// applies its own degradation scale on top.
pub trait FontMetrics {
    fn measure(&self, text: &str, style: TextStyle) -> f32;
    fn line_height(&self, style: TextStyle) -> f32;
}

#[derive(Clone, Debug)]
pub struct PositionedSpan {
    pub span: InlineSpan,
    pub style: TextStyle,
    pub x: f32,
}

#[derive(Clone, Debug)]
pub struct LayoutLine {
    pub spans: Vec<PositionedSpan>,
    pub y: f32,
    pub height: f32,
}

#[derive(Clone, Debug)]
pub struct PanelLayout {
    pub lines: Vec<LayoutLine>,
    pub content_height: f32,
    pub scale: f32,
    pub truncated: bool,
}

/// Vertical gap painted after a block, in unscaled pixels. Headings carry
/// more air than paragraphs; list items and code lines pack tighter.
fn trailing_spacing(kind: BlockKind) -> f32 {
    match kind {
        BlockKind::Heading1 => 32.0,
        BlockKind::Heading2 => 28.0,
        BlockKind::Paragraph => 20.0,
        BlockKind::ListItem => 10.0,
        BlockKind::Quote => 20.0,
        BlockKind::CodeLine => 6.0,
        BlockKind::TableRow => 8.0,
    }
}

/// Style a span takes inside a given block kind. Headings override inline
/// emphasis; code wins everywhere; links measure as body text and only
/// differ in paint color.
fn resolve_style(kind: BlockKind, style: SpanStyle) -> TextStyle {
    match (kind, style) {
        (BlockKind::Heading1, _) => TextStyle::Heading1,
        (BlockKind::Heading2, _) => TextStyle::Heading2,
        (BlockKind::CodeLine, _) | (_, SpanStyle::Code) => TextStyle::Code,
        (_, SpanStyle::Bold) => TextStyle::BodyBold,
        (_, SpanStyle::Italic) => TextStyle::BodyItalic,
        (_, SpanStyle::Plain) | (_, SpanStyle::Link) => TextStyle::Body,
    }
}

/// Lay out blocks into a centered panel of `avail_width` x `avail_height`.
///
/// Degradation chain, in order: scale 1.0 down to [`MIN_SCALE`] in
/// [`SCALE_STEP`] steps, then truncate trailing lines and append
/// [`TRUNCATION_INDICATOR`]. Line `y`s already include the centering offset.
pub fn layout_blocks(
    blocks: &[Block],
    metrics: &dyn FontMetrics,
    avail_width: f32,
    avail_height: f32,
) -> PanelLayout {
    let mut scale = 1.0f32;
    let mut candidate = layout_at_scale(blocks, metrics, avail_width, scale);
    let mut step = 0u32;
    while candidate.content_height > avail_height && scale > MIN_SCALE {
        step += 1;
        scale = (1.0 - step as f32 * SCALE_STEP).max(MIN_SCALE);
        candidate = layout_at_scale(blocks, metrics, avail_width, scale);
    }

    let mut truncated = false;
    if candidate.content_height > avail_height {
        truncated = true;
        truncate_lines(&mut candidate, metrics, avail_height, scale);
    }

    let start_y = ((avail_height - candidate.content_height) / 2.0).max(0.0);
    for line in &mut candidate.lines {
        line.y += start_y;
    }

    PanelLayout {
        lines: candidate.lines,
        content_height: candidate.content_height,
        scale,
        truncated,
    }
}

struct Candidate {
    lines: Vec<LayoutLine>,
    content_height: f32,
}

fn layout_at_scale(
    blocks: &[Block],
    metrics: &dyn FontMetrics,
    avail_width: f32,
    scale: f32,
) -> Candidate {
    let mut lines = Vec::new();
    let mut y = 0.0f32;

    for block in blocks {
        let indent = block.indent as f32 * INDENT_STEP * scale;
        let block_lines = wrap_block(block, metrics, avail_width, indent, scale);
        let count = block_lines.len();
        for mut line in block_lines {
            line.y = y;
            y += line.height;
            lines.push(line);
        }
        if count > 0 {
            y += trailing_spacing(block.kind) * scale;
        }
    }

    Candidate {
        lines,
        content_height: y,
    }
}

/// One wrappable unit: a word (or a whole code line) with its source span's
/// identity and whether a space precedes it.
struct Token<'a> {
    span: &'a InlineSpan,
    style: TextStyle,
    word: String,
    space_before: bool,
}

/// Break a block's spans into tokens. Words inside a span are separated by
/// spaces; across span boundaries a space appears only if either side had
/// one, so `before`+`` `code` `` stays glued. Code lines wrap as whole units
/// to preserve their interior spacing.
fn tokenize<'a>(block: &'a Block) -> Vec<Token<'a>> {
    let mut tokens = Vec::new();
    let mut boundary_space = false;

    for span in &block.spans {
        let style = resolve_style(block.kind, span.style);

        if block.kind == BlockKind::CodeLine {
            tokens.push(Token {
                span,
                style,
                word: span.text.clone(),
                space_before: false,
            });
            boundary_space = false;
            continue;
        }
        if span.text.chars().all(char::is_whitespace) {
            // Literal spacing span (table cell gaps); keep the exact run.
            tokens.push(Token {
                span,
                style,
                word: span.text.clone(),
                space_before: false,
            });
            boundary_space = false;
            continue;
        }

        if span.text.starts_with(char::is_whitespace) {
            boundary_space = true;
        }
        for word in span.text.split_whitespace() {
            tokens.push(Token {
                span,
                style,
                word: word.to_string(),
                space_before: boundary_space,
            });
            boundary_space = true;
        }
        boundary_space = span.text.ends_with(char::is_whitespace);
    }

    tokens
}

/// Word-wrap one block into lines no wider than `avail_width`.
fn wrap_block(
    block: &Block,
    metrics: &dyn FontMetrics,
    avail_width: f32,
    indent: f32,
    scale: f32,
) -> Vec<LayoutLine> {
    const EPS: f32 = 0.01;

    let mut lines: Vec<LayoutLine> = Vec::new();
    let mut current: Vec<PositionedSpan> = Vec::new();
    let mut x = indent;

    let flush = |current: &mut Vec<PositionedSpan>, lines: &mut Vec<LayoutLine>| {
        if current.is_empty() {
            return;
        }
        let height = current
            .iter()
            .map(|p| metrics.line_height(p.style) * scale)
            .fold(0.0f32, f32::max);
        lines.push(LayoutLine {
            spans: std::mem::take(current),
            y: 0.0,
            height,
        });
    };

    let place = |current: &mut Vec<PositionedSpan>, x: &mut f32, tok: &Token<'_>, word: &str| {
        current.push(PositionedSpan {
            span: InlineSpan {
                text: word.to_string(),
                style: tok.span.style,
                url: tok.span.url.clone(),
            },
            style: tok.style,
            x: *x,
        });
        *x += metrics.measure(word, tok.style) * scale;
    };

    for tok in tokenize(block) {
        let mut word = tok.word.clone();
        let mut space = tok.space_before;
        loop {
            let line_used = !current.is_empty();
            let lead = if space && line_used {
                metrics.measure(" ", tok.style) * scale
            } else {
                0.0
            };
            let width = metrics.measure(&word, tok.style) * scale;

            if line_used && x + lead + width > avail_width + EPS {
                flush(&mut current, &mut lines);
                x = indent;
                space = false;
                continue;
            }
            if !line_used && indent + width > avail_width + EPS {
                // Over-wide single word: split at a char boundary.
                let (head, tail) =
                    split_to_fit(&word, metrics, tok.style, scale, avail_width - indent);
                place(&mut current, &mut x, &tok, &head);
                flush(&mut current, &mut lines);
                x = indent;
                space = false;
                word = tail;
                if word.is_empty() {
                    break;
                }
                continue;
            }

            x += lead;
            place(&mut current, &mut x, &tok, &word);
            break;
        }
    }

    flush(&mut current, &mut lines);
    lines
}

/// Longest prefix of `word` that fits `avail_width`, split on a char
/// boundary, plus the remainder.
fn split_to_fit(
    word: &str,
    metrics: &dyn FontMetrics,
    style: TextStyle,
    scale: f32,
    avail_width: f32,
) -> (String, String) {
    let mut end = 0;
    for (idx, ch) in word.char_indices() {
        let next = idx + ch.len_utf8();
        if metrics.measure(&word[..next], style) * scale > avail_width {
            break;
        }
        end = next;
    }
    if end == 0 {
        // Guarantee progress: take one character regardless.
        let first = word.chars().next().map(char::len_utf8).unwrap_or(0);
        end = first;
    }
    (word[..end].to_string(), word[end..].to_string())
}

/// Drop trailing lines until the remainder plus an indicator line fits.
fn truncate_lines(
    candidate: &mut Candidate,
    metrics: &dyn FontMetrics,
    avail_height: f32,
    scale: f32,
) {
    let indicator_height = metrics.line_height(TextStyle::Body) * scale;
    let budget = (avail_height - indicator_height).max(0.0);
    let mut kept = 0;
    let mut bottom = 0.0f32;
    for line in &candidate.lines {
        if line.y + line.height > budget {
            break;
        }
        bottom = line.y + line.height;
        kept += 1;
    }
    candidate.lines.truncate(kept);
    candidate.lines.push(LayoutLine {
        spans: vec![PositionedSpan {
            span: InlineSpan::plain(TRUNCATION_INDICATOR),
            style: TextStyle::Body,
            x: 0.0,
        }],
        y: bottom,
        height: indicator_height,
    });
    candidate.content_height = bottom + indicator_height;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::parse_markdown;

    /// Fixed-advance metrics: every char is 10 px wide (20 for headings),
    /// line heights are flat per style. Keeps layout tests hermetic.
    struct FixedMetrics;

    impl FontMetrics for FixedMetrics {
        fn measure(&self, text: &str, style: TextStyle) -> f32 {
            let per_char = match style {
                TextStyle::Heading1 => 20.0,
                TextStyle::Heading2 => 15.0,
                _ => 10.0,
            };
            text.chars().count() as f32 * per_char
        }

        fn line_height(&self, style: TextStyle) -> f32 {
            match style {
                TextStyle::Heading1 => 40.0,
                TextStyle::Heading2 => 30.0,
                _ => 20.0,
            }
        }
    }

    fn layout(md: &str, width: f32, height: f32) -> PanelLayout {
        let blocks = parse_markdown(md).unwrap();
        layout_blocks(&blocks, &FixedMetrics, width, height)
    }

    #[test]
    fn single_line_is_centered_vertically() {
        let out = layout("hello", 600.0, 400.0);
        assert_eq!(out.lines.len(), 1);
        assert_eq!(out.scale, 1.0);
        assert!(!out.truncated);
        // content = 20 line + 20 trailing; start = (400 - 40) / 2.
        assert!((out.lines[0].y - 180.0).abs() < 0.5);
    }

    #[test]
    fn wrapping_respects_available_width() {
        // 12 chars/word at 10px; width fits two words plus a space.
        let out = layout("aaaa bbbb cccc dddd", 100.0, 1000.0);
        assert!(out.lines.len() >= 2);
        for line in &out.lines {
            let end = line
                .spans
                .iter()
                .map(|p| p.x + FixedMetrics.measure(&p.span.text, p.style))
                .fold(0.0f32, f32::max);
            assert!(end <= 100.0 + 0.5, "line overflows: {end}");
        }
    }

    #[test]
    fn over_wide_word_splits_on_char_boundary() {
        let out = layout("aaaaaaaaaaaaaaaaaaaa", 100.0, 1000.0);
        // 20 chars at 10px over 100px -> two full lines of 10 chars.
        assert_eq!(out.lines.len(), 2);
        assert_eq!(out.lines[0].spans[0].span.text.chars().count(), 10);
        assert_eq!(out.lines[1].spans[0].span.text.chars().count(), 10);
    }

    #[test]
    fn heading_spacing_exceeds_paragraph_spacing() {
        let h = layout("# abc", 600.0, 10_000.0);
        let p = layout("abc", 600.0, 10_000.0);
        // Heights include trailing spacing; compare content heights.
        assert!(h.content_height - 40.0 > p.content_height - 20.0);
    }

    #[test]
    fn overflow_scales_down_before_truncating() {
        let md = "word ".repeat(40);
        let natural = layout(&md, 200.0, 100_000.0);
        let squeezed = layout(&md, 200.0, natural.content_height * 0.8);
        assert!(squeezed.scale < 1.0);
        assert!(!squeezed.truncated);
        assert!(squeezed.content_height <= natural.content_height * 0.8 + 0.5);
    }

    #[test]
    fn extreme_overflow_truncates_with_indicator() {
        let md = "line\n\n".repeat(200);
        let out = layout(&md, 200.0, 300.0);
        assert!(out.truncated);
        assert_eq!(out.scale, MIN_SCALE);
        assert!(out.content_height <= 300.0 + 0.5);
        let last = out.lines.last().unwrap();
        assert_eq!(last.spans[0].span.text, TRUNCATION_INDICATOR);
    }

    #[test]
    fn block_order_survives_degradation() {
        let out = layout("# first\nsecond\n- third", 600.0, 10_000.0);
        let texts: Vec<&str> = out
            .lines
            .iter()
            .flat_map(|l| l.spans.iter())
            .map(|p| p.span.text.as_str())
            .collect();
        let first = texts.iter().position(|t| t.contains("first")).unwrap();
        let second = texts.iter().position(|t| t.contains("second")).unwrap();
        let third = texts.iter().position(|t| t.contains("third")).unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn list_indent_shifts_lines() {
        let out = layout("- top\n  - nested", 600.0, 10_000.0);
        let top_x = out.lines[0].spans[0].x;
        let nested_x = out.lines[1].spans[0].x;
        assert!((nested_x - top_x - INDENT_STEP).abs() < 0.5);
    }

    #[test]
    fn link_spans_keep_their_url_through_layout() {
        let out = layout("see https://example.com now", 600.0, 10_000.0);
        let link = out
            .lines
            .iter()
            .flat_map(|l| l.spans.iter())
            .find(|p| p.span.url.is_some())
            .unwrap();
        assert_eq!(link.span.url.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn identical_input_identical_layout() {
        let a = layout("# T\nbody text here", 300.0, 400.0);
        let b = layout("# T\nbody text here", 300.0, 400.0);
        assert_eq!(a.lines.len(), b.lines.len());
        for (la, lb) in a.lines.iter().zip(&b.lines) {
            assert_eq!(la.y, lb.y);
            for (pa, pb) in la.spans.iter().zip(&lb.spans) {
                assert_eq!(pa.x, pb.x);
                assert_eq!(pa.span.text, pb.span.text);
            }
        }
    }
}
