//! Plain-text documents: every line is comment content.
//!
//! Tags are matched at the start of a line (after indentation). A multiline tag continues
//! until a blank line or a line that starts with another tag. The engine only routes a
//! document here when `highlightPlainText` is enabled.

use crate::cancel::{Cancelled, Checkpoint};
use crate::decorations::TagRanges;
use crate::extract::{CommentLine, Continuation, Source, scan_lines};
use crate::patterns::TagMatchers;

/// Language id of plain-text documents.
pub const PLAIN_TEXT_LANGUAGE: &str = "plaintext";

/// Returns `true` if `language_id` names a plain-text document.
pub fn is_plain_text(language_id: &str) -> bool {
    language_id == PLAIN_TEXT_LANGUAGE
}

pub(crate) fn plain_text_pass<C: Checkpoint>(
    src: &Source<'_>,
    matchers: &TagMatchers,
    out: &mut TagRanges,
    checkpoint: &C,
) -> Result<(), Cancelled> {
    checkpoint.checkpoint()?;
    let text = src.text;
    let lines: Vec<CommentLine> = src
        .segments(0, text.len())
        .into_iter()
        .map(|(start, end)| CommentLine::from_segment(text, start, end, |_| true))
        .collect();

    scan_lines(src, &lines, matchers, Continuation::UntilBlank, None, out, checkpoint)
}
