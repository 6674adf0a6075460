//! Claimed-range tracking.
//!
//! A scan pass records every comment span it accepts so that later passes (and later
//! sub-ranges of the same scan) never re-claim text inside an earlier comment. The set is
//! scoped to a single scan and thrown away afterwards.

/// A half-open `[start, end)` character interval already attributed to a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClaimedRange {
    /// Start offset (inclusive).
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
}

impl ClaimedRange {
    /// Create a new claimed range.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Check if the range contains a specific position
    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }

    /// Check if two ranges overlap
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end
    }
}

/// Sorted collection of claimed ranges.
///
/// Ranges are kept sorted by start together with a prefix maximum of their ends, so point
/// and overlap queries are O(log n + k) even though claims may nest or overlap.
#[derive(Debug, Clone, Default)]
pub struct ClaimSet {
    ranges: Vec<ClaimedRange>,
    /// `prefix_max_end[i] = max(ranges[0..=i].end)`
    prefix_max_end: Vec<usize>,
}

impl ClaimSet {
    /// Create an empty claim set.
    pub fn new() -> Self {
        Self::default()
    }

    fn rebuild_prefix_max_end_from(&mut self, start_idx: usize) {
        if self.prefix_max_end.len() != self.ranges.len() {
            self.prefix_max_end.resize(self.ranges.len(), 0);
        }

        let mut max_end = if start_idx == 0 {
            0
        } else {
            self.prefix_max_end[start_idx - 1]
        };

        for (idx, range) in self.ranges.iter().enumerate().skip(start_idx) {
            max_end = max_end.max(range.end);
            self.prefix_max_end[idx] = max_end;
        }
    }

    /// Record `[start, end)` as claimed. Empty ranges are ignored.
    pub fn claim(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }

        let pos = self
            .ranges
            .binary_search_by_key(&start, |r| r.start)
            .unwrap_or_else(|pos| pos);

        self.ranges.insert(pos, ClaimedRange::new(start, end));
        self.prefix_max_end.insert(pos, 0);
        self.rebuild_prefix_max_end_from(pos);
    }

    /// Index one past the last range whose start is `< bound`.
    fn upper(&self, bound: usize) -> usize {
        self.ranges.partition_point(|r| r.start < bound)
    }

    /// Returns `true` if a single claimed range fully covers `[start, end)`.
    pub fn covers(&self, start: usize, end: usize) -> bool {
        let idx = self.upper(start.saturating_add(1));
        for i in (0..idx).rev() {
            if self.prefix_max_end[i] < end {
                break;
            }
            let range = &self.ranges[i];
            if range.start <= start && end <= range.end {
                return true;
            }
        }
        false
    }

    /// Returns `true` if `pos` lies inside any claimed range.
    pub fn contains(&self, pos: usize) -> bool {
        let idx = self.upper(pos.saturating_add(1));
        for i in (0..idx).rev() {
            if self.prefix_max_end[i] <= pos {
                break;
            }
            if self.ranges[i].contains(pos) {
                return true;
            }
        }
        false
    }

    /// Returns `true` if any claimed range overlaps `[start, end)`.
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        if start >= end {
            return self.contains(start);
        }
        let idx = self.upper(end);
        idx > 0 && self.prefix_max_end[idx - 1] > start
    }

    /// The smallest claimed start offset inside `(start, end)`, if any.
    ///
    /// Used to cut a span short where an earlier-claimed comment begins.
    pub fn first_start_within(&self, start: usize, end: usize) -> Option<usize> {
        let from = self.ranges.partition_point(|r| r.start <= start);
        self.ranges
            .get(from)
            .map(|r| r.start)
            .filter(|s| *s < end)
    }

    /// Iterate claimed ranges in start order.
    pub fn iter(&self) -> impl Iterator<Item = &ClaimedRange> {
        self.ranges.iter()
    }

    /// Get number of claimed ranges
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Forget every claim
    pub fn clear(&mut self) {
        self.ranges.clear();
        self.prefix_max_end.clear();
    }
}
