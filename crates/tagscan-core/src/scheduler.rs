//! Two-phase scan scheduling for one document.
//!
//! The host calls [`ScanScheduler::request`] on every edit, scroll or configuration change and
//! [`ScanScheduler::poll`] from its event loop (or when the deadline from
//! [`ScanScheduler::next_deadline`] expires). Requests are coalesced for `debounce`; the first
//! due poll scans the visible lines (plus `preloadLines` of margin) and applies the result
//! right away, and a poll `updateDelay` later rescans the whole document and replaces it.
//!
//! A new request invalidates the pending and in-flight work. A cancelled pass never reaches
//! the sink.

use std::time::{Duration, Instant};

use crate::cancel::{Cancelled, TaskToken, TaskTracker};
use crate::claims::ClaimSet;
use crate::decorations::TagRanges;
use crate::document::{Position, TextDocument, TextRange};
use crate::engine::TagEngine;
use crate::processing::{DecorationSink, apply_decorations};

/// What a call to [`ScanScheduler::poll`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing was requested.
    Idle,
    /// Work is pending; poll again at the given instant.
    Waiting(Instant),
    /// The viewport pass ran and its ranges were applied.
    ViewportApplied,
    /// The full-document pass ran and its ranges were applied.
    DocumentApplied,
    /// The pass was superseded and applied nothing.
    Cancelled,
}

#[derive(Debug)]
enum Phase {
    Idle,
    Debouncing {
        due: Instant,
    },
    Refining {
        due: Instant,
        task: TaskToken,
        generation: TaskToken,
    },
}

/// Per-document debounce and viewport/full-document refinement state machine.
#[derive(Debug)]
pub struct ScanScheduler {
    tasks: TaskTracker,
    phase: Phase,
}

impl Default for ScanScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanScheduler {
    /// Create an idle scheduler.
    pub fn new() -> Self {
        Self {
            tasks: TaskTracker::new(),
            phase: Phase::Idle,
        }
    }

    /// Ask for a rescan. Supersedes any pending or running pass.
    pub fn request(&mut self, engine: &TagEngine, now: Instant) {
        self.request_after(engine.config().debounce(), now);
    }

    /// Ask for a rescan after an explicit delay (e.g. `0` when a document is first opened).
    pub fn request_after(&mut self, delay: Duration, now: Instant) {
        self.tasks.cancel_all();
        self.phase = Phase::Debouncing { due: now + delay };
    }

    /// Drop pending work without scanning.
    pub fn cancel(&mut self) {
        self.tasks.cancel_all();
        self.phase = Phase::Idle;
    }

    /// When the next poll has work to do, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Debouncing { due } | Phase::Refining { due, .. } => Some(*due),
        }
    }

    /// Returns `true` if no work is pending.
    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    /// Run whatever work is due at `now`.
    pub fn poll<D, S>(
        &mut self,
        now: Instant,
        engine: &mut TagEngine,
        document: &D,
        sink: &mut S,
    ) -> PollOutcome
    where
        D: TextDocument + ?Sized,
        S: DecorationSink + ?Sized,
    {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => PollOutcome::Idle,
            Phase::Debouncing { due } if now < due => {
                self.phase = Phase::Debouncing { due };
                PollOutcome::Waiting(due)
            }
            Phase::Debouncing { .. } => self.viewport_pass(now, engine, document, sink),
            Phase::Refining {
                due,
                task,
                generation,
            } if now < due => {
                self.phase = Phase::Refining {
                    due,
                    task,
                    generation,
                };
                PollOutcome::Waiting(due)
            }
            Phase::Refining {
                task, generation, ..
            } => {
                let guard = (task, generation);
                match engine.scan_document(document, &guard) {
                    Ok(ranges) => {
                        apply_decorations(engine.tags(), document, &ranges, sink);
                        PollOutcome::DocumentApplied
                    }
                    Err(Cancelled) => {
                        tracing::debug!(language = document.language_id(), "full pass cancelled");
                        PollOutcome::Cancelled
                    }
                }
            }
        }
    }

    fn viewport_pass<D, S>(
        &mut self,
        now: Instant,
        engine: &mut TagEngine,
        document: &D,
        sink: &mut S,
    ) -> PollOutcome
    where
        D: TextDocument + ?Sized,
        S: DecorationSink + ?Sized,
    {
        let task = self.tasks.begin();
        let generation = engine.generation();
        let guard = (task.clone(), generation.clone());

        let last_line = document.line_count().saturating_sub(1);
        let mut windows = viewport_windows(
            &document.visible_ranges(),
            engine.config().preload_lines,
            last_line,
        );
        if windows.is_empty() {
            windows.push((0, last_line));
        }
        let covers_document = windows == [(0, last_line)];

        let result = scan_windows(engine, document, &windows, &guard);
        match result {
            Ok(ranges) => {
                apply_decorations(engine.tags(), document, &ranges, sink);
                if !covers_document {
                    self.phase = Phase::Refining {
                        due: now + engine.config().update_delay(),
                        task,
                        generation,
                    };
                }
                PollOutcome::ViewportApplied
            }
            Err(Cancelled) => {
                tracing::debug!(language = document.language_id(), "viewport pass cancelled");
                PollOutcome::Cancelled
            }
        }
    }
}

fn scan_windows<D>(
    engine: &mut TagEngine,
    document: &D,
    windows: &[(usize, usize)],
    guard: &(TaskToken, TaskToken),
) -> Result<TagRanges, Cancelled>
where
    D: TextDocument + ?Sized,
{
    let language_id = document.language_id().to_string();
    let mut claims = ClaimSet::new();
    let mut out = TagRanges::new();
    for &(first, last) in windows {
        let range = TextRange::lines(first, last);
        let text = document.text_in(range);
        let offset = document.offset_at(Position::new(first, 0));
        out.extend(engine.scan(&language_id, &text, offset, &mut claims, guard)?);
    }
    out.normalize();
    Ok(out)
}

/// Visible line ranges grown by `preload` lines each way, clamped and merged.
pub fn viewport_windows(
    visible: &[TextRange],
    preload: usize,
    last_line: usize,
) -> Vec<(usize, usize)> {
    let mut windows: Vec<(usize, usize)> = visible
        .iter()
        .map(|r| {
            let first = r.start.line.min(last_line).saturating_sub(preload);
            let last = r
                .end
                .line
                .max(r.start.line)
                .saturating_add(preload)
                .min(last_line);
            (first, last)
        })
        .collect();
    windows.sort_unstable();

    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(windows.len());
    for (first, last) in windows {
        match merged.last_mut() {
            Some(prev) if first <= prev.1.saturating_add(1) => prev.1 = prev.1.max(last),
            _ => merged.push((first, last)),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_windows_merge_and_clamp() {
        let visible = vec![
            TextRange::lines(50, 60),
            TextRange::lines(0, 5),
            TextRange::lines(58, 70),
        ];
        assert_eq!(
            viewport_windows(&visible, 10, 75),
            vec![(0, 15), (40, 75)]
        );
        assert_eq!(viewport_windows(&visible, 100, 75), vec![(0, 75)]);
        assert!(viewport_windows(&[], 10, 75).is_empty());
    }

    #[test]
    fn test_request_sets_deadline() {
        let engine = TagEngine::with_defaults();
        let mut scheduler = ScanScheduler::new();
        assert!(scheduler.is_idle());

        let now = Instant::now();
        scheduler.request(&engine, now);
        assert_eq!(
            scheduler.next_deadline(),
            Some(now + Duration::from_millis(100))
        );

        scheduler.cancel();
        assert!(scheduler.next_deadline().is_none());
    }
}
