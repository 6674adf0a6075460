//! Tag table: configured tag entries flattened into one definition per name.

use std::collections::HashSet;
use std::sync::Arc;

use crate::config::{TagConfigEntry, TagStyle};
use crate::escape::EscapeCache;

/// One tag name with its escaped pattern and style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDefinition {
    /// Tag name as configured (e.g. `"TODO"`).
    pub name: String,
    /// Lower-cased name used as the output key.
    pub key: String,
    /// `name` escaped for use inside a regex.
    pub escaped: Arc<str>,
    /// Whether the highlight continues onto indented continuation lines.
    pub multiline: bool,
    /// Base style shared by every alias of the entry.
    pub style: TagStyle,
}

/// Flattened, de-duplicated tag definitions in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagTable {
    tags: Vec<TagDefinition>,
}

impl TagTable {
    /// Flatten `entries`: every alias becomes its own definition.
    ///
    /// Empty names are dropped. When two entries configure the same name (ignoring case),
    /// the first one wins.
    pub fn build(entries: &[TagConfigEntry], cache: &mut EscapeCache) -> Self {
        let mut seen = HashSet::new();
        let mut tags = Vec::new();

        for entry in entries {
            let style = entry.style();
            for name in entry.tag.iter() {
                if name.is_empty() {
                    continue;
                }
                let key = name.to_lowercase();
                if !seen.insert(key.clone()) {
                    tracing::warn!(tag = name, "duplicate tag definition ignored");
                    continue;
                }
                tags.push(TagDefinition {
                    name: name.to_string(),
                    key,
                    escaped: cache.escape(name),
                    multiline: entry.multiline,
                    style: style.clone(),
                });
            }
        }

        Self { tags }
    }

    /// All definitions.
    pub fn iter(&self) -> impl Iterator<Item = &TagDefinition> {
        self.tags.iter()
    }

    /// Definitions whose highlight continues across lines.
    pub fn multiline_tags(&self) -> impl Iterator<Item = &TagDefinition> {
        self.tags.iter().filter(|t| t.multiline)
    }

    /// Definitions confined to their own line.
    pub fn line_tags(&self) -> impl Iterator<Item = &TagDefinition> {
        self.tags.iter().filter(|t| !t.multiline)
    }

    /// Look up a definition by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&TagDefinition> {
        let key = name.to_lowercase();
        self.tags.iter().find(|t| t.key == key)
    }

    /// Output keys of every definition, in configuration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|t| t.key.as_str())
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns `true` if no tags are configured.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_aliases_expand_into_independent_definitions() {
        let entries = vec![
            TagConfigEntry::aliases(["TODO", "FIXME"], "#FF8C00").with_multiline(true),
            TagConfigEntry::new("!", "#FF2D00"),
        ];
        let mut cache = EscapeCache::new();
        let table = TagTable::build(&entries, &mut cache);

        assert_eq!(table.keys().collect::<Vec<_>>(), vec!["todo", "fixme", "!"]);
        assert_eq!(table.multiline_tags().count(), 2);
        assert_eq!(table.line_tags().count(), 1);

        let fixme = table.get("FixMe").unwrap();
        assert_eq!(fixme.name, "FIXME");
        assert_eq!(fixme.style.color.as_deref(), Some("#FF8C00"));
    }

    #[test]
    fn test_duplicates_and_empty_names_are_dropped() {
        let entries = vec![
            TagConfigEntry::new("todo", "#111111"),
            TagConfigEntry::new("TODO", "#222222"),
            TagConfigEntry::new("", "#333333"),
        ];
        let mut cache = EscapeCache::new();
        let table = TagTable::build(&entries, &mut cache);

        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get("todo").and_then(|t| t.style.color.clone()),
            Some("#111111".to_string())
        );
    }

    #[test]
    fn test_escaped_pattern_uses_cache() {
        let entries = vec![TagConfigEntry::new("*", "#98C379")];
        let mut cache = EscapeCache::new();
        let table = TagTable::build(&entries, &mut cache);

        assert_eq!(&*table.get("*").unwrap().escaped, r"\*");
        assert_eq!(cache.len(), 1);
        assert!(TagTable::build(&[], &mut cache).is_empty());
    }
}
