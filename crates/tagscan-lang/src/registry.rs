use crate::builtin::builtin_comment_rule;
use crate::error::LanguageError;
use crate::{CommentRule, CommentRuleSet};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A language known to the host (typically contributed by an editor extension).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageDefinition {
    /// Language id (e.g. `"typescript"`).
    pub id: String,
    /// Optional path to a language-configuration JSON file containing a `comments` object.
    pub configuration_path: Option<PathBuf>,
    /// Ids of languages embedded in this one (their marks are merged in).
    pub embedded_languages: Vec<String>,
}

impl LanguageDefinition {
    /// Create a definition without a configuration file or embedded languages.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            configuration_path: None,
            embedded_languages: Vec::new(),
        }
    }

    /// Attach a language-configuration file.
    pub fn with_configuration_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.configuration_path = Some(path.into());
        self
    }

    /// Add an embedded language id (duplicates are ignored).
    pub fn with_embedded_language(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        if !self.embedded_languages.contains(&id) {
            self.embedded_languages.push(id);
        }
        self
    }
}

#[derive(Debug, Deserialize)]
struct LanguageConfigurationFile {
    comments: Option<CommentsSection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentsSection {
    line_comment: Option<LineCommentEntry>,
    block_comment: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LineCommentEntry {
    Plain(String),
    Detailed { comment: String },
}

/// Resolves the merged [`CommentRuleSet`] for a language id.
///
/// Lookup order for a single language: its language-configuration file (if registered and
/// readable), then [`builtin_comment_rule`], then "no marks". Results are cached until
/// [`LanguageRegistry::refresh`] is called.
#[derive(Debug, Default)]
pub struct LanguageRegistry {
    languages: HashMap<String, LanguageDefinition>,
    rules: HashMap<String, CommentRule>,
    merged: HashMap<String, Arc<CommentRuleSet>>,
}

impl LanguageRegistry {
    /// Create an empty registry (built-in rules still apply to every id).
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a language definition.
    pub fn register(&mut self, definition: LanguageDefinition) {
        self.languages.insert(definition.id.clone(), definition);
        self.refresh();
    }

    /// Look up a registered language definition.
    pub fn definition(&self, id: &str) -> Option<&LanguageDefinition> {
        self.languages.get(id)
    }

    /// Drop every cached rule; the next lookup re-reads configuration files.
    pub fn refresh(&mut self) {
        self.rules.clear();
        self.merged.clear();
    }

    /// Get the merged comment marks of `id` and its embedded languages.
    pub fn comment_rules(&mut self, id: &str) -> Arc<CommentRuleSet> {
        if let Some(set) = self.merged.get(id) {
            return set.clone();
        }

        let mut set = CommentRuleSet::new();
        let own = self.rule_for(id);
        set.merge_rule(&own);

        let embedded = self
            .languages
            .get(id)
            .map(|def| def.embedded_languages.clone())
            .unwrap_or_default();
        for embedded_id in embedded.iter().filter(|e| e.as_str() != id) {
            let rule = self.rule_for(embedded_id);
            set.merge_rule(&rule);
        }

        if id == "php" {
            set.add_line_comment("#");
        }

        tracing::debug!(
            language = id,
            line = ?set.line_comments,
            block = ?set.block_comments,
            "resolved comment marks"
        );

        let set = Arc::new(set);
        self.merged.insert(id.to_string(), set.clone());
        set
    }

    fn rule_for(&mut self, id: &str) -> CommentRule {
        if let Some(rule) = self.rules.get(id) {
            return rule.clone();
        }

        let from_file = self
            .languages
            .get(id)
            .and_then(|def| def.configuration_path.as_deref())
            .and_then(|path| match load_comment_rule(path) {
                Ok(rule) => rule,
                Err(err) => {
                    tracing::warn!(
                        language = id,
                        path = %path.display(),
                        "failed to load language configuration: {err}"
                    );
                    None
                }
            });

        let rule = from_file
            .filter(|rule| !rule.is_empty())
            .or_else(|| builtin_comment_rule(id))
            .unwrap_or_default();
        self.rules.insert(id.to_string(), rule.clone());
        rule
    }
}

/// Read a language-configuration file and extract its `comments` rule.
///
/// Returns `Ok(None)` if the file has no `comments` object.
pub fn load_comment_rule(path: &Path) -> Result<Option<CommentRule>, LanguageError> {
    let content = std::fs::read_to_string(path)?;
    parse_comment_rule(&content)
}

/// Parse the `comments` object out of a language-configuration JSON document.
pub fn parse_comment_rule(json: &str) -> Result<Option<CommentRule>, LanguageError> {
    let file: LanguageConfigurationFile = serde_json::from_str(json)?;
    let Some(comments) = file.comments else {
        return Ok(None);
    };

    let line_comment = comments.line_comment.map(|entry| match entry {
        LineCommentEntry::Plain(s) => s,
        LineCommentEntry::Detailed { comment } => comment,
    });

    let block_comment = match comments.block_comment {
        None => None,
        Some(pair) => match <[String; 2]>::try_from(pair) {
            Ok([start, end]) => Some((start, end)),
            Err(pair) => return Err(LanguageError::InvalidBlockComment(pair.join(", "))),
        },
    };

    Ok(Some(CommentRule {
        line_comment,
        block_comment,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_comment_rule() {
        let rule = parse_comment_rule(
            r#"{ "comments": { "lineComment": "//", "blockComment": ["/*", "*/"] }, "brackets": [] }"#,
        )
        .unwrap();
        assert_eq!(rule, Some(CommentRule::line_and_block("//", "/*", "*/")));

        let rule =
            parse_comment_rule(r##"{ "comments": { "lineComment": { "comment": "#", "noIndent": true } } }"##)
                .unwrap();
        assert_eq!(rule, Some(CommentRule::line("#")));

        assert_eq!(parse_comment_rule(r#"{ "brackets": [] }"#).unwrap(), None);
    }

    #[test]
    fn test_parse_comment_rule_errors() {
        assert!(matches!(
            parse_comment_rule(r#"{ "comments": { "blockComment": ["/*"] } }"#),
            Err(LanguageError::InvalidBlockComment(_))
        ));
        assert!(matches!(
            parse_comment_rule("{ not json"),
            Err(LanguageError::Json(_))
        ));
    }

    #[test]
    fn test_builtin_fallback_for_unregistered_language() {
        let mut registry = LanguageRegistry::new();
        let set = registry.comment_rules("go");
        assert_eq!(set.line_comments, vec!["//".to_string()]);
        assert!(set.supports_doc_comments());

        assert!(registry.comment_rules("no-such-language").is_empty());
    }

    #[test]
    fn test_embedded_languages_are_merged_in_order() {
        let mut registry = LanguageRegistry::new();
        registry.register(
            LanguageDefinition::new("html")
                .with_embedded_language("css")
                .with_embedded_language("javascript")
                .with_embedded_language("css"),
        );

        let set = registry.comment_rules("html");
        assert_eq!(set.line_comments, vec!["//".to_string()]);
        assert_eq!(
            set.block_comments,
            vec![
                ("<!--".to_string(), "-->".to_string()),
                ("/*".to_string(), "*/".to_string()),
            ]
        );
    }

    #[test]
    fn test_php_accepts_hash_comments() {
        let mut registry = LanguageRegistry::new();
        let set = registry.comment_rules("php");
        assert_eq!(set.line_comments, vec!["//".to_string(), "#".to_string()]);
    }
}
