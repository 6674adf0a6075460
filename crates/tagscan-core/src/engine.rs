//! Engine context: configuration, tag table and compiled matchers.
//!
//! Everything a scan needs is owned by one explicitly constructed [`TagEngine`]. There is no
//! module-level state: hosts call [`TagEngine::refresh`] when the configuration changes and
//! [`TagEngine::refresh_languages`] when language definitions change. Both rebuild
//! wholesale and invalidate scans that are still running.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tagscan_lang::{LanguageDefinition, LanguageRegistry};

use crate::cancel::{Cancelled, Checkpoint, TaskToken, TaskTracker};
use crate::claims::ClaimSet;
use crate::config::ScanConfig;
use crate::decorations::TagRanges;
use crate::document::TextDocument;
use crate::escape::EscapeCache;
use crate::extract::extract;
use crate::patterns::{MatcherOptions, TagMatchers};
use crate::plaintext::is_plain_text;
use crate::tags::TagTable;

/// Owns the scan configuration and every cache derived from it.
#[derive(Debug)]
pub struct TagEngine {
    config: Arc<ScanConfig>,
    tags: Arc<TagTable>,
    escapes: EscapeCache,
    languages: LanguageRegistry,
    /// `None` caches "nothing to scan" (unsupported language, gated plain text, bad pattern).
    matchers: HashMap<String, Option<Arc<TagMatchers>>>,
    warned: HashSet<String>,
    generation: TaskTracker,
}

impl TagEngine {
    /// Build an engine for `config` using `languages` for comment marks.
    pub fn new(config: ScanConfig, languages: LanguageRegistry) -> Self {
        let mut escapes = EscapeCache::new();
        let tags = TagTable::build(&config.tags, &mut escapes);
        tracing::info!(tags = tags.len(), "tag engine built");
        Self {
            config: Arc::new(config),
            tags: Arc::new(tags),
            escapes,
            languages,
            matchers: HashMap::new(),
            warned: HashSet::new(),
            generation: TaskTracker::new(),
        }
    }

    /// Engine with the default configuration and only built-in comment rules.
    pub fn with_defaults() -> Self {
        Self::new(ScanConfig::default(), LanguageRegistry::new())
    }

    /// Current configuration.
    pub fn config(&self) -> &Arc<ScanConfig> {
        &self.config
    }

    /// Current tag table.
    pub fn tags(&self) -> &Arc<TagTable> {
        &self.tags
    }

    /// The language registry.
    pub fn languages(&self) -> &LanguageRegistry {
        &self.languages
    }

    /// Replace the configuration: rebuild the tag table and drop compiled matchers.
    pub fn refresh(&mut self, config: ScanConfig) {
        self.tags = Arc::new(TagTable::build(&config.tags, &mut self.escapes));
        self.config = Arc::new(config);
        self.matchers.clear();
        self.generation.cancel_all();
        tracing::info!(tags = self.tags.len(), "tag engine rebuilt after configuration change");
    }

    /// Register (or replace) a language and drop every language-derived cache.
    pub fn register_language(&mut self, definition: LanguageDefinition) {
        self.languages.register(definition);
        self.refresh_languages();
    }

    /// Re-read language definitions on next use and drop compiled matchers.
    pub fn refresh_languages(&mut self) {
        self.languages.refresh();
        self.matchers.clear();
        self.warned.clear();
        self.generation.cancel_all();
        tracing::info!("tag engine language caches dropped");
    }

    /// A token that goes stale at the next [`refresh`](Self::refresh) or
    /// [`refresh_languages`](Self::refresh_languages).
    pub fn generation(&self) -> TaskToken {
        self.generation.watch()
    }

    /// Compiled matchers for `language_id`, or `None` if documents in that language
    /// produce no ranges.
    pub fn matchers_for(&mut self, language_id: &str) -> Option<Arc<TagMatchers>> {
        if let Some(cached) = self.matchers.get(language_id) {
            return cached.clone();
        }
        let built = self.build_matchers(language_id);
        self.matchers.insert(language_id.to_string(), built.clone());
        built
    }

    fn build_matchers(&mut self, language_id: &str) -> Option<Arc<TagMatchers>> {
        let built = if is_plain_text(language_id) {
            if !self.config.highlight_plain_text {
                return None;
            }
            TagMatchers::plain_text(&self.tags)
        } else {
            let rules = self.languages.comment_rules(language_id);
            if rules.is_empty() {
                if self.warned.insert(language_id.to_string()) {
                    tracing::warn!(language = language_id, "no comment rules for language");
                }
                return None;
            }
            let options = MatcherOptions {
                multiline_comments: self.config.multiline_comments,
                doc_comments: self.config.use_jsdoc_style,
            };
            TagMatchers::build(&self.tags, &rules, options, &mut self.escapes)
        };

        match built {
            Ok(matchers) if matchers.is_inert() => None,
            Ok(matchers) => Some(Arc::new(matchers)),
            Err(err) => {
                tracing::error!(language = language_id, "failed to build tag matchers: {err}");
                None
            }
        }
    }

    /// Scan `text` (starting at char `offset` of a `language_id` document).
    ///
    /// The scan also stops when the engine is refreshed while it runs.
    pub fn scan<C: Checkpoint>(
        &mut self,
        language_id: &str,
        text: &str,
        offset: usize,
        claims: &mut ClaimSet,
        checkpoint: &C,
    ) -> Result<TagRanges, Cancelled> {
        let Some(matchers) = self.matchers_for(language_id) else {
            return Ok(TagRanges::new());
        };
        let guard = Guarded {
            generation: self.generation(),
            inner: checkpoint,
        };
        let ranges = extract(text, offset, &matchers, claims, &guard)?;
        tracing::debug!(
            language = language_id,
            offset,
            bytes = text.len(),
            ranges = ranges.range_count(),
            claims = claims.len(),
            "scan finished"
        );
        Ok(ranges)
    }

    /// Scan a whole document with fresh claims.
    pub fn scan_document<D, C>(
        &mut self,
        document: &D,
        checkpoint: &C,
    ) -> Result<TagRanges, Cancelled>
    where
        D: TextDocument + ?Sized,
        C: Checkpoint,
    {
        let text = document.text();
        let language_id = document.language_id().to_string();
        self.scan(&language_id, &text, 0, &mut ClaimSet::new(), checkpoint)
    }
}

/// Caller's checkpoint plus the engine generation at scan start.
struct Guarded<'a, C> {
    generation: TaskToken,
    inner: &'a C,
}

impl<C: Checkpoint> Checkpoint for Guarded<'_, C> {
    fn checkpoint(&self) -> Result<(), Cancelled> {
        self.generation.checkpoint()?;
        self.inner.checkpoint()
    }
}

impl Default for TagEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::NeverCancel;
    use crate::config::TagConfigEntry;
    use crate::document::SourceDocument;

    #[test]
    fn test_matchers_are_cached_and_dropped_on_refresh() {
        let mut engine = TagEngine::with_defaults();
        let first = engine.matchers_for("rust").unwrap();
        let second = engine.matchers_for("rust").unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        engine.refresh(ScanConfig::default());
        let third = engine.matchers_for("rust").unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[test]
    fn test_unsupported_language_scans_empty() {
        let mut engine = TagEngine::with_defaults();
        let doc = SourceDocument::new("no-such-language", "// TODO nothing\n# TODO\n");
        assert!(engine.matchers_for("no-such-language").is_none());
        assert!(engine.scan_document(&doc, &NeverCancel).unwrap().is_empty());
    }

    #[test]
    fn test_plain_text_is_gated() {
        let mut engine = TagEngine::with_defaults();
        let doc = SourceDocument::new("plaintext", "! hello\n");
        assert!(engine.scan_document(&doc, &NeverCancel).unwrap().is_empty());

        let config = ScanConfig {
            highlight_plain_text: true,
            ..ScanConfig::default()
        };
        engine.refresh(config);
        let ranges = engine.scan_document(&doc, &NeverCancel).unwrap();
        assert_eq!(ranges.get("!").len(), 1);
    }

    #[test]
    fn test_refresh_invalidates_generation_token() {
        let mut engine = TagEngine::with_defaults();
        let token = engine.generation();
        assert!(token.is_current());
        engine.refresh(
            ScanConfig::default().with_tags(vec![TagConfigEntry::new("fixme", "#FF0000")]),
        );
        assert!(!token.is_current());
        assert_eq!(engine.tags().len(), 1);
    }
}
