//! Handing scan results to the host.
//!
//! A scan's only side effect is a series of [`DecorationSink::set_decorations`] calls, one
//! per configured tag, each replacing whatever the host showed for that tag before.

use std::collections::BTreeMap;

use crate::decorations::TagRanges;
use crate::document::{TextDocument, TextRange};
use crate::tags::TagTable;

/// Receives the ranges to render for each tag.
pub trait DecorationSink {
    /// Replace every range shown for `tag_name` with `ranges`.
    fn set_decorations(&mut self, tag_name: &str, ranges: &[TextRange]);
}

/// Apply `ranges` to `sink`: one call per configured tag, including tags with no ranges so
/// that stale highlights are cleared.
pub fn apply_decorations<D, S>(tags: &TagTable, document: &D, ranges: &TagRanges, sink: &mut S)
where
    D: TextDocument + ?Sized,
    S: DecorationSink + ?Sized,
{
    for key in tags.keys() {
        let positions: Vec<TextRange> = ranges
            .get(key)
            .iter()
            .map(|r| TextRange::new(document.position_at(r.start), document.position_at(r.end)))
            .collect();
        sink.set_decorations(key, &positions);
    }
}

/// A sink that keeps the latest ranges per tag in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecorationMap {
    ranges: BTreeMap<String, Vec<TextRange>>,
    updates: usize,
}

impl DecorationMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest ranges for `tag_name`.
    pub fn get(&self, tag_name: &str) -> &[TextRange] {
        self.ranges.get(tag_name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Tags that received at least one `set_decorations` call.
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.ranges.keys().map(String::as_str)
    }

    /// Total number of `set_decorations` calls received.
    pub fn updates(&self) -> usize {
        self.updates
    }
}

impl DecorationSink for DecorationMap {
    fn set_decorations(&mut self, tag_name: &str, ranges: &[TextRange]) {
        self.ranges.insert(tag_name.to_string(), ranges.to_vec());
        self.updates += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TagConfigEntry;
    use crate::decorations::OffsetRange;
    use crate::document::{Position, SourceDocument};
    use crate::escape::EscapeCache;

    #[test]
    fn test_every_configured_tag_is_emitted() {
        let tags = TagTable::build(
            &[
                TagConfigEntry::new("todo", "#FF8C00"),
                TagConfigEntry::new("!", "#FF2D00"),
            ],
            &mut EscapeCache::new(),
        );
        let doc = SourceDocument::new("rust", "fn f() {}\n// TODO x\n");
        let mut ranges = TagRanges::new();
        ranges.push("todo", OffsetRange::new(13, 19));

        let mut sink = DecorationMap::new();
        sink.set_decorations("!", &[TextRange::lines(0, 0)]);
        apply_decorations(&tags, &doc, &ranges, &mut sink);

        assert_eq!(
            sink.get("todo"),
            &[TextRange::new(Position::new(1, 3), Position::new(1, 9))]
        );
        assert!(sink.get("!").is_empty());
        assert_eq!(sink.updates(), 3);
    }
}
