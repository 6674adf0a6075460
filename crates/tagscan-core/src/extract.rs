//! Span extractor.
//!
//! One scan runs up to three passes over the text, in this order:
//!
//! 1. doc comments (`/** ... */`),
//! 2. generic block comments, one pair of marks at a time,
//! 3. runs of consecutive line comments.
//!
//! Every accepted comment is recorded in a [`ClaimSet`]; later passes skip text that is
//! already claimed. Inside an accepted comment the text is split into [`CommentLine`]s and
//! matched in two tiers: multiline tags first (an opener line plus its indented
//! continuation lines), then line tags on the lines the first tier left alone.
//!
//! Regex matching runs on bytes; the emitted ranges are absolute char offsets.

use crate::cancel::{Cancelled, Checkpoint};
use crate::claims::ClaimSet;
use crate::decorations::{OffsetRange, TagRanges};
use crate::patterns::{
    BlockCommentMatcher, CommentShapes, DocCommentMatcher, LineCommentMatcher, TagMatchers,
};
use crate::plaintext;
use crate::text::{CharIndex, leading_blanks, line_end, trim_end};

/// Scanned text and its char offset inside the document.
pub(crate) struct Source<'a> {
    pub(crate) text: &'a str,
    base: usize,
    index: CharIndex,
}

impl<'a> Source<'a> {
    pub(crate) fn new(text: &'a str, base: usize) -> Self {
        Self {
            text,
            base,
            index: CharIndex::new(text),
        }
    }

    /// Absolute char offset of a byte offset in `text`.
    pub(crate) fn char_at(&self, byte: usize) -> usize {
        self.base + self.index.byte_to_char(byte)
    }

    /// Byte offset in `text` of an absolute char offset.
    fn byte_at(&self, char_offset: usize) -> usize {
        self.index
            .char_to_byte(char_offset.saturating_sub(self.base))
    }

    fn push(&self, out: &mut TagRanges, tag: &str, start: usize, end: usize) {
        out.push(tag, OffsetRange::new(self.char_at(start), self.char_at(end)));
    }

    /// Split `start..end` into physical line segments (without the `\n`).
    pub(crate) fn segments(&self, start: usize, end: usize) -> Vec<(usize, usize)> {
        let mut segments = Vec::new();
        let mut pos = start;
        loop {
            let eol = line_end(self.text, pos).min(end);
            segments.push((pos, eol));
            if eol >= end {
                break;
            }
            pos = eol + 1;
        }
        segments
    }
}

/// One physical line of comment text, with marks and prefixes already stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CommentLine {
    /// Byte offset of the first content char (after indentation).
    pub(crate) start: usize,
    /// Byte offset just past the last non-whitespace content char.
    pub(crate) end: usize,
    /// Blanks between the mark/prefix and the content.
    pub(crate) indent: usize,
    /// Whether a tag may start on this line.
    pub(crate) opener: bool,
}

impl CommentLine {
    /// Build a line from the segment following a mark or prefix.
    pub(crate) fn from_segment(
        text: &str,
        seg_start: usize,
        seg_end: usize,
        opener: impl FnOnce(usize) -> bool,
    ) -> Self {
        let indent = leading_blanks(&text[seg_start..seg_end]);
        let start = seg_start + indent;
        Self {
            start,
            end: trim_end(text, start, seg_end),
            indent,
            opener: opener(indent),
        }
    }

    pub(crate) fn is_blank(&self) -> bool {
        self.start >= self.end
    }
}

/// When a multiline tag's continuation stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Continuation {
    /// While lines are indented deeper than the opener line.
    Indented,
    /// Until a blank line (plain text).
    UntilBlank,
}

fn single_space(indent: usize) -> bool {
    indent == 1
}

fn any_indent(_: usize) -> bool {
    true
}

/// Run both tag tiers over the lines of one comment.
pub(crate) fn scan_lines<C: Checkpoint>(
    src: &Source<'_>,
    lines: &[CommentLine],
    matchers: &TagMatchers,
    continuation: Continuation,
    inline_mark: Option<&str>,
    out: &mut TagRanges,
    checkpoint: &C,
) -> Result<(), Cancelled> {
    let text = src.text;
    let mut line_claimed = vec![false; lines.len()];

    if let Some(multiline) = &matchers.multiline {
        let mut i = 0;
        while i < lines.len() {
            let line = lines[i];
            let tag_len = if line.opener && !line.is_blank() {
                multiline.match_len(&text[line.start..line.end])
            } else {
                None
            };
            let Some(tag_len) = tag_len else {
                i += 1;
                continue;
            };
            checkpoint.checkpoint()?;

            let tag = &text[line.start..line.start + tag_len];
            src.push(out, tag, line.start, line.end);
            line_claimed[i] = true;

            let mut j = i + 1;
            while let Some(next) = lines.get(j) {
                if next.is_blank() {
                    break;
                }
                if continuation == Continuation::Indented && next.indent <= line.indent {
                    break;
                }
                if next.opener && matchers.any_tag_len(&text[next.start..next.end]).is_some() {
                    break;
                }
                src.push(out, tag, next.start, next.end);
                line_claimed[j] = true;
                j += 1;
            }
            i = j;
        }
    }

    for (line, claimed) in lines.iter().zip(&line_claimed) {
        if *claimed || line.is_blank() {
            continue;
        }
        let leading = match &matchers.line {
            Some(line_tags) if line.opener => line_tags
                .match_len(&text[line.start..line.end])
                .map(|len| (line.start, len)),
            _ => None,
        };
        let found = leading.or_else(|| {
            inline_mark.and_then(|mark| inline_tag(text, line, mark, matchers))
        });
        if let Some((start, tag_len)) = found {
            src.push(out, &text[start..start + tag_len], start, line.end);
        }
    }

    Ok(())
}

/// A tag after a later blank-preceded `mark` on a line comment (`// call(); // TODO x`).
///
/// Returns the tag's byte offset and length; the highlight runs to the end of the line.
fn inline_tag(
    text: &str,
    line: &CommentLine,
    mark: &str,
    matchers: &TagMatchers,
) -> Option<(usize, usize)> {
    const BLANKS: &[char] = &[' ', '\t'];
    let mut from = line.start;
    while let Some(found) = text[from..line.end].find(mark) {
        let at = from + found;
        from = at + mark.len();
        if !text[..at].ends_with(BLANKS) {
            continue;
        }
        let Some(rest) = text[from..line.end].strip_prefix(BLANKS) else {
            continue;
        };
        if let Some(tag_len) = matchers.any_tag_len(rest) {
            return Some((line.end - rest.len(), tag_len));
        }
    }
    None
}

fn doc_pass<C: Checkpoint>(
    src: &Source<'_>,
    doc: &DocCommentMatcher,
    matchers: &TagMatchers,
    claims: &mut ClaimSet,
    out: &mut TagRanges,
    checkpoint: &C,
) -> Result<(), Cancelled> {
    let text = src.text;
    let mut pos = 0;
    while let Some(caps) = doc.regex.captures_at(text, pos) {
        checkpoint.checkpoint()?;
        let (Some(open), Some(body), Some(close)) = (caps.get(1), caps.get(2), caps.get(3)) else {
            break;
        };
        let start = src.char_at(open.start());
        let end = src.char_at(close.end());
        if claims.overlaps(start, end) {
            pos = open.end();
            continue;
        }
        claims.claim(start, end);
        pos = close.end();

        let lines: Vec<CommentLine> = src
            .segments(body.start(), body.end())
            .into_iter()
            .enumerate()
            .map(|(i, (seg_start, seg_end))| {
                if i == 0 {
                    return CommentLine::from_segment(text, seg_start, seg_end, single_space);
                }
                let lead = seg_start + leading_blanks(&text[seg_start..seg_end]);
                if text[lead..seg_end].starts_with(DocCommentMatcher::PREFIX) {
                    CommentLine::from_segment(text, lead + 1, seg_end, single_space)
                } else {
                    CommentLine::from_segment(text, seg_start, seg_end, any_indent)
                }
            })
            .collect();

        scan_lines(src, &lines, matchers, Continuation::Indented, None, out, checkpoint)?;
    }
    Ok(())
}

/// Trim repeats of the start mark's last char and of the end mark's first char.
fn trim_block_content(
    text: &str,
    start: usize,
    end: usize,
    lead: Option<char>,
    trail: Option<char>,
) -> (usize, usize) {
    let body = &text[start..end];
    let body = match lead {
        Some(c) => body.trim_start_matches(c),
        None => body,
    };
    let new_start = end - body.len();
    let body = match trail {
        Some(c) => body.trim_end_matches(c),
        None => body,
    };
    (new_start, new_start + body.len())
}

fn block_pass<C: Checkpoint>(
    src: &Source<'_>,
    block: &BlockCommentMatcher,
    matchers: &TagMatchers,
    claims: &mut ClaimSet,
    out: &mut TagRanges,
    checkpoint: &C,
) -> Result<(), Cancelled> {
    let text = src.text;
    let mut pos = 0;
    while let Some(caps) = block.regex.captures_at(text, pos) {
        checkpoint.checkpoint()?;
        let (Some(open), Some(body), Some(close)) = (caps.get(1), caps.get(2), caps.get(3)) else {
            break;
        };
        let start = src.char_at(open.start());
        let end = src.char_at(close.end());
        if claims.overlaps(start, end) {
            pos = open.end();
            continue;
        }
        claims.claim(start, end);
        pos = close.end();

        let (content_start, content_end) =
            trim_block_content(text, body.start(), body.end(), block.lead, block.trail);
        if content_start >= content_end {
            continue;
        }

        let lines: Vec<CommentLine> = src
            .segments(content_start, content_end)
            .into_iter()
            .enumerate()
            .map(|(i, (seg_start, seg_end))| {
                if i == 0 {
                    CommentLine::from_segment(text, seg_start, seg_end, single_space)
                } else {
                    CommentLine::from_segment(text, seg_start, seg_end, any_indent)
                }
            })
            .collect();

        scan_lines(src, &lines, matchers, Continuation::Indented, None, out, checkpoint)?;
    }
    Ok(())
}

/// Byte offset of the exact `mark` opening the line at `line_start`, after blanks.
fn continuation_mark(text: &str, line_start: usize, mark: &str) -> Option<usize> {
    let start = line_start + leading_blanks(&text[line_start..]);
    text[start..].starts_with(mark).then_some(start)
}

fn line_pass<C: Checkpoint>(
    src: &Source<'_>,
    matcher: &LineCommentMatcher,
    matchers: &TagMatchers,
    claims: &mut ClaimSet,
    out: &mut TagRanges,
    checkpoint: &C,
) -> Result<(), Cancelled> {
    let text = src.text;
    let mut pos = 0;
    while let Some(caps) = matcher.opener.captures_at(text, pos) {
        checkpoint.checkpoint()?;
        let Some(first_mark) = caps.iter().skip(1).flatten().next() else {
            break;
        };
        let run_start = src.char_at(first_mark.start());
        if claims.contains(run_start) {
            pos = first_mark.end();
            continue;
        }

        let mark = first_mark.as_str();
        let mut lines = Vec::new();
        let mut run_end = first_mark.start();
        let (mut mark_start, mut mark_end) = (first_mark.start(), first_mark.end());
        let resume = loop {
            let eol = line_end(text, mark_end);
            let cut = claims
                .first_start_within(src.char_at(mark_start), src.char_at(eol))
                .map(|c| src.byte_at(c))
                .unwrap_or(eol);
            // a claim starting inside the mark itself ends the run before this line
            if cut < mark_end {
                break mark_end;
            }
            lines.push(CommentLine::from_segment(text, mark_end, cut, single_space));
            run_end = cut;
            if cut < eol {
                break cut;
            }
            if eol >= text.len() {
                break eol;
            }

            let Some(next_start) = continuation_mark(text, eol + 1, mark) else {
                break eol;
            };
            if claims.contains(src.char_at(next_start)) {
                break eol;
            }
            mark_start = next_start;
            mark_end = next_start + mark.len();
        };

        claims.claim(run_start, src.char_at(run_end));
        pos = resume.max(first_mark.end());

        scan_lines(
            src,
            &lines,
            matchers,
            Continuation::Indented,
            Some(mark),
            out,
            checkpoint,
        )?;
    }
    Ok(())
}

/// Extract tag ranges from `text`, which starts at char offset `offset` of its document.
///
/// `claims` holds absolute char ranges already attributed to comments; it is consulted and
/// extended, so several sub-ranges of one document can share it. The checkpoint is
/// consulted before every outer match; on `Err(Cancelled)` nothing is returned.
pub fn extract<C: Checkpoint>(
    text: &str,
    offset: usize,
    matchers: &TagMatchers,
    claims: &mut ClaimSet,
    checkpoint: &C,
) -> Result<TagRanges, Cancelled> {
    let mut out = TagRanges::new();
    if matchers.is_inert() || text.is_empty() {
        return Ok(out);
    }
    checkpoint.checkpoint()?;

    let src = Source::new(text, offset);
    match matchers.shapes() {
        CommentShapes::Code { doc, blocks, lines } => {
            if let Some(doc) = doc {
                doc_pass(&src, doc, matchers, claims, &mut out, checkpoint)?;
            }
            for block in blocks {
                block_pass(&src, block, matchers, claims, &mut out, checkpoint)?;
            }
            if let Some(lines) = lines {
                line_pass(&src, lines, matchers, claims, &mut out, checkpoint)?;
            }
        }
        CommentShapes::PlainText => {
            plaintext::plain_text_pass(&src, matchers, &mut out, checkpoint)?;
        }
    }

    out.normalize();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::NeverCancel;
    use crate::config::TagConfigEntry;
    use crate::escape::EscapeCache;
    use crate::patterns::MatcherOptions;
    use crate::tags::TagTable;
    use pretty_assertions::assert_eq;
    use tagscan_lang::{CommentRule, CommentRuleSet};

    fn c_matchers(entries: &[TagConfigEntry]) -> TagMatchers {
        let mut cache = EscapeCache::new();
        let tags = TagTable::build(entries, &mut cache);
        let rules = CommentRuleSet::from(&CommentRule::line_and_block("//", "/*", "*/"));
        TagMatchers::build(&tags, &rules, MatcherOptions::default(), &mut cache).unwrap()
    }

    fn span(text: &str, needle: &str) -> OffsetRange {
        let start = text.find(needle).unwrap();
        OffsetRange::new(start, start + needle.len())
    }

    fn run(text: &str, matchers: &TagMatchers) -> TagRanges {
        extract(text, 0, matchers, &mut ClaimSet::new(), &NeverCancel).unwrap()
    }

    #[test]
    fn test_line_tag_covers_rest_of_line() {
        let matchers = c_matchers(&[TagConfigEntry::new("todo", "#FF8C00")]);
        let text = "let a = 1; // TODO: rename  \nlet b = 2;\n";
        let ranges = run(text, &matchers);

        assert_eq!(ranges.get("todo"), &[span(text, "TODO: rename")]);
    }

    #[test]
    fn test_tag_requires_single_space_after_mark() {
        let matchers = c_matchers(&[TagConfigEntry::new("todo", "#FF8C00")]);
        assert!(run("//TODO glued\n//  TODO indented\n", &matchers).is_empty());
    }

    #[test]
    fn test_multiline_line_comment_run() {
        let matchers =
            c_matchers(&[TagConfigEntry::new("todo", "#FF8C00").with_multiline(true)]);
        let text = "// TODO: line one\n//       line two\n//\n// not part of block\n";
        let ranges = run(text, &matchers);

        assert_eq!(
            ranges.get("todo"),
            &[span(text, "TODO: line one"), span(text, "line two")]
        );
    }

    #[test]
    fn test_block_comment_multiline_tag() {
        let matchers = c_matchers(&[
            TagConfigEntry::new("todo", "#FF8C00").with_multiline(true),
            TagConfigEntry::new("!", "#FF2D00"),
        ]);
        let text = "/* TODO first\n     second\n   ! alert\n */\nint x;\n";
        let ranges = run(text, &matchers);

        assert_eq!(
            ranges.get("todo"),
            &[span(text, "TODO first"), span(text, "second")]
        );
        assert_eq!(ranges.get("!"), &[span(text, "! alert")]);
    }

    #[test]
    fn test_doc_comment_prefixed_lines() {
        let matchers = c_matchers(&[
            TagConfigEntry::new("todo", "#FF8C00").with_multiline(true),
            TagConfigEntry::new("*", "#98C379"),
        ]);
        let text = "/**\n * TODO: document\n *   the details\n * plain line\n */\nfn f() {}\n";
        let ranges = run(text, &matchers);

        assert_eq!(
            ranges.get("todo"),
            &[span(text, "TODO: document"), span(text, "the details")]
        );
        assert!(ranges.get("*").is_empty());
    }

    #[test]
    fn test_doc_requires_whitespace_after_opener() {
        let matchers = c_matchers(&[TagConfigEntry::new("todo", "#FF8C00")]);
        let ranges = run("/**/ int x; // TODO after\n", &matchers);
        assert_eq!(ranges.get("todo").len(), 1);
    }

    #[test]
    fn test_string_literal_is_not_a_comment() {
        let matchers = c_matchers(&[TagConfigEntry::new("todo", "#FF8C00")]);
        let text = "const x = \"/* not a comment */ TODO fake\";\n";
        assert!(run(text, &matchers).is_empty());
    }

    #[test]
    fn test_line_comment_inside_block_is_not_rescanned() {
        let matchers = c_matchers(&[TagConfigEntry::new("todo", "#FF8C00")]);
        let text = "/*\n // TODO inside block\n*/\n";
        let mut claims = ClaimSet::new();
        let ranges = extract(text, 0, &matchers, &mut claims, &NeverCancel).unwrap();

        assert!(ranges.is_empty());
        assert_eq!(claims.len(), 1);
    }

    #[test]
    fn test_offset_and_wide_chars() {
        let matchers = c_matchers(&[TagConfigEntry::new("todo", "#FF8C00")]);
        let text = "let s = \"你好\"; // TODO 👋 wave\n";
        let ranges = run(text, &matchers);
        let start = text.chars().position(|c| c == 'T').unwrap();
        let end = start + "TODO 👋 wave".chars().count();
        assert_eq!(ranges.get("todo"), &[OffsetRange::new(start, end)]);

        let shifted = extract(text, 100, &matchers, &mut ClaimSet::new(), &NeverCancel).unwrap();
        assert_eq!(
            shifted.get("todo"),
            &[OffsetRange::new(start + 100, end + 100)]
        );
    }

    #[test]
    fn test_tag_after_later_mark_on_commented_out_code() {
        let matchers = c_matchers(&[TagConfigEntry::new("todo", "#FF8C00")]);
        let text = "// let x = 1; // TODO fix\n// see http://a.b // nothing\n";
        let ranges = run(text, &matchers);

        assert_eq!(ranges.get("todo"), &[span(text, "TODO fix")]);
        assert_eq!(ranges.range_count(), 1);
    }

    #[test]
    fn test_line_comment_resumes_after_claimed_block() {
        let matchers = c_matchers(&[
            TagConfigEntry::new("todo", "#FF8C00"),
            TagConfigEntry::new("!", "#FF2D00"),
        ]);
        let text = "// a /* ! b */ // TODO c\n";
        let mut claims = ClaimSet::new();
        let ranges = extract(text, 0, &matchers, &mut claims, &NeverCancel).unwrap();

        assert_eq!(ranges.get("!"), &[span(text, "! b")]);
        assert_eq!(ranges.get("todo"), &[span(text, "TODO c")]);
        assert_eq!(claims.len(), 3);
    }

    #[test]
    fn test_claim_starting_inside_mark_skips_line() {
        let matchers = c_matchers(&[TagConfigEntry::new("todo", "#FF8C00")]);
        let mut claims = ClaimSet::new();
        claims.claim(1, 3);

        let ranges = extract("// TODO x\n", 0, &matchers, &mut claims, &NeverCancel).unwrap();
        assert!(ranges.is_empty());
        assert_eq!(claims.len(), 1);
    }

    #[test]
    fn test_run_continues_only_with_same_mark() {
        let matchers =
            c_matchers(&[TagConfigEntry::new("todo", "#FF8C00").with_multiline(true)]);
        let text = "/// TODO doc\n//    more\n///   doc more\n";
        let ranges = run(text, &matchers);

        assert_eq!(ranges.get("todo"), &[span(text, "TODO doc")]);
    }

    #[test]
    fn test_trim_block_content() {
        let text = "/*** TODO x ***/";
        let (start, end) = trim_block_content(text, 2, 14, Some('*'), Some('*'));
        assert_eq!(&text[start..end], " TODO x ");
    }
}
