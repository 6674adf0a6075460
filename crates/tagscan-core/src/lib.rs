#![warn(missing_docs)]
//! Tagscan Core - comment-tag extraction engine
//!
//! # Overview
//!
//! `tagscan-core` finds "tagged" comments (`TODO`, `FIXME`, `!`, `?`, `*`, ...) in source
//! documents of any language and produces the character ranges an editor should highlight
//! for each tag. It does not render anything and does not own a text buffer: hosts expose
//! their buffer through [`TextDocument`] and receive results through [`DecorationSink`].
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  ScanScheduler (debounce, viewport → full)  │  ← Host integration
//! ├─────────────────────────────────────────────┤
//! │  TagEngine (config, tag table, caches)      │  ← Engine context
//! ├─────────────────────────────────────────────┤
//! │  Span extractor (doc → block → line)        │  ← Scan algorithm
//! ├─────────────────────────────────────────────┤
//! │  TagMatchers / ClaimSet                     │  ← Patterns & claims
//! ├─────────────────────────────────────────────┤
//! │  tagscan-lang (comment marks per language)  │  ← Delimiter rules
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use tagscan_core::{NeverCancel, SourceDocument, TagEngine};
//!
//! let mut engine = TagEngine::with_defaults();
//! let doc = SourceDocument::new("rust", "fn main() {}\n// TODO: handle errors\n");
//!
//! let ranges = engine.scan_document(&doc, &NeverCancel).unwrap();
//! assert_eq!(ranges.get("todo").len(), 1);
//! ```
//!
//! ## Scheduling scans for an open document
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use tagscan_core::{DecorationMap, PollOutcome, ScanScheduler, SourceDocument, TagEngine};
//!
//! let mut engine = TagEngine::with_defaults();
//! let doc = SourceDocument::new("python", "# ! check this\nx = 1\n");
//! let mut sink = DecorationMap::new();
//! let mut scheduler = ScanScheduler::new();
//!
//! let now = Instant::now();
//! scheduler.request(&engine, now);
//! let later = now + Duration::from_secs(1);
//! assert_eq!(scheduler.poll(later, &mut engine, &doc, &mut sink), PollOutcome::ViewportApplied);
//! assert_eq!(sink.get("!").len(), 1);
//! ```
//!
//! # Module Description
//!
//! - [`config`] - flattened scan configuration (serde)
//! - [`tags`] - tag table built from configuration entries
//! - [`patterns`] - compiled tag and comment matchers
//! - [`extract`] - the span extractor
//! - [`claims`] - claimed-range tracking shared by the passes of one scan
//! - [`plaintext`] - plain-text documents
//! - [`engine`] - engine context and caches
//! - [`scheduler`] - debounce and two-phase refinement
//! - [`processing`] - decoration sinks
//! - [`document`] / [`line_index`] - text document model

pub mod cancel;
pub mod claims;
pub mod config;
pub mod decorations;
pub mod document;
pub mod engine;
pub mod error;
pub mod escape;
pub mod extract;
pub mod line_index;
pub mod patterns;
pub mod plaintext;
pub mod processing;
pub mod scheduler;
pub mod tags;
mod text;

pub use cancel::{Cancelled, Checkpoint, NeverCancel, TaskId, TaskToken, TaskTracker};
pub use claims::{ClaimSet, ClaimedRange};
pub use config::{ScanConfig, TagConfigEntry, TagNames, TagStyle, ThemeKind};
pub use decorations::{DecorationRange, OffsetRange, TagRanges};
pub use document::{Position, SourceDocument, TextDocument, TextRange};
pub use engine::TagEngine;
pub use error::{ConfigError, PatternError};
pub use escape::EscapeCache;
pub use extract::extract;
pub use line_index::LineIndex;
pub use patterns::{CommentShapes, MatcherOptions, TagAlternation, TagMatchers};
pub use plaintext::{PLAIN_TEXT_LANGUAGE, is_plain_text};
pub use processing::{DecorationMap, DecorationSink, apply_decorations};
pub use scheduler::{PollOutcome, ScanScheduler, viewport_windows};
pub use tags::{TagDefinition, TagTable};
pub use tagscan_lang::{CommentRule, CommentRuleSet, LanguageDefinition, LanguageRegistry};
