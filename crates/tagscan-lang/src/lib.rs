#![warn(missing_docs)]
//! `tagscan-lang` - data-driven comment delimiter rules for `tagscan-core`.
//!
//! This crate intentionally stays lightweight and does **not** know anything about tags,
//! regexes or documents. It answers a single question for the scanner: "which literal
//! marks open a comment in language `X`?", including marks contributed by languages
//! embedded in `X` (e.g. CSS/JS inside HTML).

mod builtin;
mod error;
mod registry;

pub use builtin::builtin_comment_rule;
pub use error::LanguageError;
pub use registry::{LanguageDefinition, LanguageRegistry, load_comment_rule, parse_comment_rule};

/// Comment tokens for a single language, as found in a language-configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentRule {
    /// Line comment token (e.g. `//`, `#`).
    pub line_comment: Option<String>,
    /// Block comment start/end tokens (e.g. `/*`, `*/`).
    pub block_comment: Option<(String, String)>,
}

impl CommentRule {
    /// Create a rule that supports only line comments.
    pub fn line(token: impl Into<String>) -> Self {
        Self {
            line_comment: Some(token.into()),
            block_comment: None,
        }
    }

    /// Create a rule that supports only block comments.
    pub fn block(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            line_comment: None,
            block_comment: Some((start.into(), end.into())),
        }
    }

    /// Create a rule that supports both line and block comments.
    pub fn line_and_block(
        line: impl Into<String>,
        block_start: impl Into<String>,
        block_end: impl Into<String>,
    ) -> Self {
        Self {
            line_comment: Some(line.into()),
            block_comment: Some((block_start.into(), block_end.into())),
        }
    }

    /// Returns `true` if neither a line nor a block token is configured.
    pub fn is_empty(&self) -> bool {
        self.line_comment.as_deref().is_none_or(str::is_empty)
            && self
                .block_comment
                .as_ref()
                .is_none_or(|(start, end)| start.is_empty() || end.is_empty())
    }
}

/// The merged set of comment marks available in a document of some language.
///
/// Marks are literal strings (never regex source). Order is insertion order: the
/// language's own rule first, then each embedded language in registration order.
/// Duplicates are suppressed by literal mark (line) or literal mark pair (block).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentRuleSet {
    /// Line comment marks.
    pub line_comments: Vec<String>,
    /// Block comment `(start, end)` mark pairs.
    pub block_comments: Vec<(String, String)>,
}

impl CommentRuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a line comment mark, ignoring empty and duplicate marks.
    pub fn add_line_comment(&mut self, mark: impl Into<String>) {
        let mark = mark.into();
        if mark.is_empty() || self.line_comments.contains(&mark) {
            return;
        }
        self.line_comments.push(mark);
    }

    /// Add a block comment mark pair, ignoring incomplete and duplicate pairs.
    pub fn add_block_comment(&mut self, start: impl Into<String>, end: impl Into<String>) {
        let pair = (start.into(), end.into());
        if pair.0.is_empty() || pair.1.is_empty() || self.block_comments.contains(&pair) {
            return;
        }
        self.block_comments.push(pair);
    }

    /// Merge a single-language rule into this set.
    pub fn merge_rule(&mut self, rule: &CommentRule) {
        if let Some(line) = &rule.line_comment {
            self.add_line_comment(line.clone());
        }
        if let Some((start, end)) = &rule.block_comment {
            self.add_block_comment(start.clone(), end.clone());
        }
    }

    /// Returns `true` if no marks at all are known.
    pub fn is_empty(&self) -> bool {
        self.line_comments.is_empty() && self.block_comments.is_empty()
    }

    /// Returns `true` if `/** ... */` documentation comments make sense for this set.
    ///
    /// The doc-comment convention is only honored for C-family delimiters.
    pub fn supports_doc_comments(&self) -> bool {
        self.block_comments
            .iter()
            .any(|(start, end)| start == "/*" && end == "*/")
    }
}

impl From<&CommentRule> for CommentRuleSet {
    fn from(rule: &CommentRule) -> Self {
        let mut set = Self::new();
        set.merge_rule(rule);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_set_suppresses_duplicates() {
        let mut set = CommentRuleSet::new();
        set.merge_rule(&CommentRule::line_and_block("//", "/*", "*/"));
        set.merge_rule(&CommentRule::line_and_block("//", "/*", "*/"));
        set.merge_rule(&CommentRule::block("<!--", "-->"));
        set.add_line_comment("");
        set.add_block_comment("/*", "");

        assert_eq!(set.line_comments, vec!["//".to_string()]);
        assert_eq!(
            set.block_comments,
            vec![
                ("/*".to_string(), "*/".to_string()),
                ("<!--".to_string(), "-->".to_string()),
            ]
        );
        assert!(set.supports_doc_comments());
    }

    #[test]
    fn test_rule_emptiness() {
        assert!(CommentRule::default().is_empty());
        assert!(CommentRule::line("").is_empty());
        assert!(!CommentRule::line("#").is_empty());
        assert!(CommentRuleSet::new().is_empty());
        assert!(!CommentRuleSet::from(&CommentRule::block("{-", "-}")).supports_doc_comments());
    }
}
