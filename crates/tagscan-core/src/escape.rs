//! Memoized regex escaping of literal tag names and comment marks.

use std::collections::HashMap;
use std::sync::Arc;

/// Cache of `regex::escape` results keyed by the literal input.
///
/// Many tags and marks share the same symbols (`*`, `//`, `!`), and the cache lives as long
/// as the engine that owns it, so each distinct literal is escaped once.
#[derive(Debug, Default)]
pub struct EscapeCache {
    escaped: HashMap<String, Arc<str>>,
}

impl EscapeCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Escape `literal` for use inside a regex pattern.
    pub fn escape(&mut self, literal: &str) -> Arc<str> {
        if let Some(hit) = self.escaped.get(literal) {
            return Arc::clone(hit);
        }
        let escaped: Arc<str> = Arc::from(regex::escape(literal));
        self.escaped
            .insert(literal.to_string(), Arc::clone(&escaped));
        escaped
    }

    /// Number of cached literals.
    pub fn len(&self) -> usize {
        self.escaped.len()
    }

    /// Returns `true` if nothing has been escaped yet.
    pub fn is_empty(&self) -> bool {
        self.escaped.is_empty()
    }
}
