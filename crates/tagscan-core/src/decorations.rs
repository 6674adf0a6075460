//! Tag decoration data model.
//!
//! A scan produces [`TagRanges`]: for every tag name (lower-cased) the list of disjoint,
//! half-open character ranges that should be rendered with that tag's style. Ranges are
//! produced fresh on every scan and never mutated afterwards.

use std::collections::BTreeMap;

/// A half-open character-offset range (`start..end`) in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OffsetRange {
    /// Range start offset (inclusive), in Unicode scalar values (`char`) from the start of the document.
    pub start: usize,
    /// Range end offset (exclusive), in Unicode scalar values (`char`) from the start of the document.
    pub end: usize,
}

impl OffsetRange {
    /// Create a new offset range.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if the range is empty.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// A single tagged span, before grouping by tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecorationRange {
    /// Lower-cased tag name (e.g. `"todo"`, `"!"`).
    pub tag_name: String,
    /// Start offset (inclusive), in chars.
    pub start_offset: usize,
    /// End offset (exclusive), in chars.
    pub end_offset: usize,
}

/// Tag name -> ranges mapping produced by one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagRanges {
    ranges: BTreeMap<String, Vec<OffsetRange>>,
}

impl TagRanges {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a range for `tag_name`. Names are lower-cased; empty ranges are dropped.
    pub fn push(&mut self, tag_name: &str, range: OffsetRange) {
        if range.is_empty() {
            return;
        }
        let key = tag_name.to_lowercase();
        self.ranges.entry(key).or_default().push(range);
    }

    /// Ranges recorded for `tag_name` (case-insensitive lookup).
    pub fn get(&self, tag_name: &str) -> &[OffsetRange] {
        self.ranges
            .get(&tag_name.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterate `(tag_name, ranges)` in tag-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[OffsetRange])> {
        self.ranges.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Tag names that have at least one range.
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.ranges.keys().map(String::as_str)
    }

    /// Total number of ranges across all tags.
    pub fn range_count(&self) -> usize {
        self.ranges.values().map(Vec::len).sum()
    }

    /// Returns `true` if no ranges were recorded.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Move every range of `other` into `self`.
    pub fn extend(&mut self, other: TagRanges) {
        for (tag, ranges) in other.ranges {
            self.ranges.entry(tag).or_default().extend(ranges);
        }
    }

    /// Sort each tag's ranges by position and drop exact duplicates.
    pub fn normalize(&mut self) {
        for ranges in self.ranges.values_mut() {
            ranges.sort();
            ranges.dedup();
        }
    }

    /// Flatten into individual [`DecorationRange`] values (tag order, then position).
    pub fn to_decorations(&self) -> Vec<DecorationRange> {
        self.ranges
            .iter()
            .flat_map(|(tag, ranges)| {
                ranges.iter().map(move |r| DecorationRange {
                    tag_name: tag.clone(),
                    start_offset: r.start,
                    end_offset: r.end,
                })
            })
            .collect()
    }
}

impl FromIterator<DecorationRange> for TagRanges {
    fn from_iter<I: IntoIterator<Item = DecorationRange>>(iter: I) -> Self {
        let mut out = Self::new();
        for d in iter {
            out.push(&d.tag_name, OffsetRange::new(d.start_offset, d.end_offset));
        }
        out.normalize();
        out
    }
}
