//! Pattern builder: compiled matchers for one `(tag table, comment rules)` pair.
//!
//! Matchers are immutable once built and are shared between scans behind an `Arc`. They are
//! rebuilt wholesale when the configuration or the language definitions change.

use regex::{Regex, RegexBuilder};
use tagscan_lang::CommentRuleSet;

use crate::error::PatternError;
use crate::escape::EscapeCache;
use crate::tags::{TagDefinition, TagTable};

fn compile(pattern: &str, case_insensitive: bool) -> Result<Regex, PatternError> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .multi_line(true)
        .build()
        .map_err(|err| PatternError::compile(pattern, err))
}

/// Case-insensitive alternation of tag names, anchored at the start of the searched slice.
///
/// Longer names come first so that `??` wins over `?` and `todo:` over `todo`.
#[derive(Debug, Clone)]
pub struct TagAlternation {
    regex: Regex,
}

impl TagAlternation {
    /// Build an alternation over `tags`. Returns `Ok(None)` when `tags` is empty.
    pub fn build<'a, I>(tags: I) -> Result<Option<Self>, PatternError>
    where
        I: IntoIterator<Item = &'a TagDefinition>,
    {
        let mut tags: Vec<&TagDefinition> = tags.into_iter().collect();
        if tags.is_empty() {
            return Ok(None);
        }
        tags.sort_by(|a, b| b.name.chars().count().cmp(&a.name.chars().count()));

        let alternation = tags
            .iter()
            .map(|t| &*t.escaped)
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!("^(?:{alternation})");
        Ok(Some(Self {
            regex: compile(&pattern, true)?,
        }))
    }

    /// Byte length of the tag that `text` starts with, if any.
    pub fn match_len(&self, text: &str) -> Option<usize> {
        self.regex
            .find(text)
            .map(|m| m.end())
            .filter(|len| *len > 0)
    }

    /// The compiled pattern source.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// Finds runs of consecutive line comments.
///
/// A run continues onto the next line only when that line starts (after blanks) with the
/// exact mark text that opened the run, so a `///` run does not absorb `//` lines.
#[derive(Debug, Clone)]
pub struct LineCommentMatcher {
    /// One capture group per mark, in mark order.
    pub(crate) opener: Regex,
    marks: Vec<String>,
}

/// Escaped mark followed by any number of repeats of its last character (`//` also
/// matches `///`, `#` matches `##`).
fn repeated_mark(mark: &str, cache: &mut EscapeCache) -> String {
    let escaped = cache.escape(mark);
    match mark.chars().last() {
        Some(last) => {
            let tail = cache.escape(last.encode_utf8(&mut [0u8; 4]));
            format!("{escaped}(?:{tail})*")
        }
        None => escaped.to_string(),
    }
}

impl LineCommentMatcher {
    fn build(marks: &[String], cache: &mut EscapeCache) -> Result<Option<Self>, PatternError> {
        let marks: Vec<&String> = marks.iter().filter(|m| !m.is_empty()).collect();
        if marks.is_empty() {
            return Ok(None);
        }

        let groups: Vec<String> = marks
            .iter()
            .map(|mark| format!("({})", repeated_mark(mark, cache)))
            .collect();

        let pattern = format!(r"(?:^|[ \t])(?:{})", groups.join("|"));
        Ok(Some(Self {
            opener: compile(&pattern, false)?,
            marks: marks.into_iter().cloned().collect(),
        }))
    }

    /// The literal marks, in priority order.
    pub fn marks(&self) -> impl Iterator<Item = &str> {
        self.marks.iter().map(String::as_str)
    }
}

/// Finds one kind of generic block comment.
#[derive(Debug, Clone)]
pub struct BlockCommentMatcher {
    /// Literal start mark.
    pub start: String,
    /// Literal end mark.
    pub end: String,
    /// Groups: 1 = start mark, 2 = content, 3 = end mark.
    pub(crate) regex: Regex,
    /// Repeats of this char are trimmed from the start of the content (`/***`).
    pub(crate) lead: Option<char>,
    /// Repeats of this char are trimmed from the end of the content (`***/`).
    pub(crate) trail: Option<char>,
}

impl BlockCommentMatcher {
    fn build(start: &str, end: &str, cache: &mut EscapeCache) -> Result<Self, PatternError> {
        let pattern = format!(
            r"(?:^|[ \t])({})((?s:.*?))({})",
            cache.escape(start),
            cache.escape(end)
        );
        Ok(Self {
            start: start.to_string(),
            end: end.to_string(),
            regex: compile(&pattern, false)?,
            lead: start.chars().last(),
            trail: end.chars().next(),
        })
    }
}

/// Finds `/** ... */` documentation comments.
///
/// The opening `/**` must be followed by whitespace, so `/**/` is not a doc comment.
#[derive(Debug, Clone)]
pub struct DocCommentMatcher {
    /// Groups: 1 = `/**`, 2 = content, 3 = `*/`.
    pub(crate) regex: Regex,
}

impl DocCommentMatcher {
    /// Start mark of a doc comment.
    pub const START: &'static str = "/**";
    /// End mark of a doc comment.
    pub const END: &'static str = "*/";
    /// Continuation-line prefix.
    pub const PREFIX: char = '*';

    fn build() -> Result<Self, PatternError> {
        let pattern = r"(?:^|[ \t])(/\*\*)([ \t\r\n](?s:.*?))(\*/)";
        Ok(Self {
            regex: compile(pattern, false)?,
        })
    }
}

/// Switches that select which passes are compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatcherOptions {
    /// Build the doc-comment and generic block-comment matchers.
    pub multiline_comments: bool,
    /// Build the doc-comment matcher (when the rules support `/* */`).
    pub doc_comments: bool,
}

impl Default for MatcherOptions {
    fn default() -> Self {
        Self {
            multiline_comments: true,
            doc_comments: true,
        }
    }
}

/// How a scan locates comment text.
#[derive(Debug, Clone)]
pub enum CommentShapes {
    /// Source code: doc, block and line-comment passes.
    Code {
        /// `/** */` matcher, if enabled and supported.
        doc: Option<DocCommentMatcher>,
        /// Generic block-comment matchers, in rule order.
        blocks: Vec<BlockCommentMatcher>,
        /// Line-comment run matcher.
        lines: Option<LineCommentMatcher>,
    },
    /// The whole text is comment content.
    PlainText,
}

/// Every compiled matcher a scan needs.
#[derive(Debug, Clone)]
pub struct TagMatchers {
    /// Multiline tag alternation, `None` when no multiline tags are configured.
    pub(crate) multiline: Option<TagAlternation>,
    /// Line tag alternation, `None` when no line tags are configured.
    pub(crate) line: Option<TagAlternation>,
    pub(crate) shapes: CommentShapes,
}

impl TagMatchers {
    /// Compile matchers for source code with the given comment rules.
    pub fn build(
        tags: &TagTable,
        rules: &CommentRuleSet,
        options: MatcherOptions,
        cache: &mut EscapeCache,
    ) -> Result<Self, PatternError> {
        let doc = if options.multiline_comments
            && options.doc_comments
            && rules.supports_doc_comments()
        {
            Some(DocCommentMatcher::build()?)
        } else {
            None
        };

        let blocks = if options.multiline_comments {
            rules
                .block_comments
                .iter()
                .map(|(start, end)| BlockCommentMatcher::build(start, end, cache))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            Vec::new()
        };

        Ok(Self {
            multiline: TagAlternation::build(tags.multiline_tags())?,
            line: TagAlternation::build(tags.line_tags())?,
            shapes: CommentShapes::Code {
                doc,
                blocks,
                lines: LineCommentMatcher::build(&rules.line_comments, cache)?,
            },
        })
    }

    /// Compile matchers that treat the whole text as comment content.
    pub fn plain_text(tags: &TagTable) -> Result<Self, PatternError> {
        Ok(Self {
            multiline: TagAlternation::build(tags.multiline_tags())?,
            line: TagAlternation::build(tags.line_tags())?,
            shapes: CommentShapes::PlainText,
        })
    }

    /// Returns `true` if a scan with these matchers can never produce a range.
    pub fn is_inert(&self) -> bool {
        if self.multiline.is_none() && self.line.is_none() {
            return true;
        }
        match &self.shapes {
            CommentShapes::Code { doc, blocks, lines } => {
                doc.is_none() && blocks.is_empty() && lines.is_none()
            }
            CommentShapes::PlainText => false,
        }
    }

    /// The comment shapes these matchers scan for.
    pub fn shapes(&self) -> &CommentShapes {
        &self.shapes
    }

    /// Byte length of a tag (either tier) at the start of `text`.
    pub(crate) fn any_tag_len(&self, text: &str) -> Option<usize> {
        self.multiline
            .as_ref()
            .and_then(|m| m.match_len(text))
            .or_else(|| self.line.as_ref().and_then(|m| m.match_len(text)))
    }
}
