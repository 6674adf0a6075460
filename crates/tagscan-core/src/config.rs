//! Flattened scan configuration.
//!
//! The host hands the engine one JSON object (camelCase keys). Every field is optional and
//! falls back to the defaults below, so `{}` is a valid configuration.

use serde::Deserialize;
use std::time::Duration;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
/// `tag:` field of a tag entry: one name or a list of aliases.
pub enum TagNames {
    /// A single tag name.
    One(String),
    /// Several aliases sharing one style.
    Many(Vec<String>),
}

impl TagNames {
    /// Iterate the configured names in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let names: &[String] = match self {
            TagNames::One(name) => std::slice::from_ref(name),
            TagNames::Many(names) => names,
        };
        names.iter().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One entry of the `tags` / `tagsLight` / `tagsDark` lists.
///
/// Style fields are optional so that theme entries can override a subset of the base style.
pub struct TagConfigEntry {
    /// Tag name or aliases.
    pub tag: TagNames,

    #[serde(default)]
    /// Foreground color (any CSS color string).
    pub color: Option<String>,

    #[serde(default)]
    /// Background color.
    pub background_color: Option<String>,

    #[serde(default)]
    /// Strike through the highlighted text.
    pub strikethrough: Option<bool>,

    #[serde(default)]
    /// Underline the highlighted text.
    pub underline: Option<bool>,

    #[serde(default)]
    /// Bold font weight.
    pub bold: Option<bool>,

    #[serde(default)]
    /// Italic font style.
    pub italic: Option<bool>,

    #[serde(default)]
    /// Whether the tag's highlight continues onto indented continuation lines.
    pub multiline: bool,
}

impl TagConfigEntry {
    /// Entry with a single name and a foreground color.
    pub fn new(tag: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            tag: TagNames::One(tag.into()),
            color: Some(color.into()),
            background_color: None,
            strikethrough: None,
            underline: None,
            bold: None,
            italic: None,
            multiline: false,
        }
    }

    /// Entry with several aliases sharing one style.
    pub fn aliases<I, S>(tags: I, color: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tag: TagNames::Many(tags.into_iter().map(Into::into).collect()),
            ..Self::new(String::new(), color)
        }
    }

    /// Mark the entry as multiline.
    pub fn with_multiline(mut self, multiline: bool) -> Self {
        self.multiline = multiline;
        self
    }

    /// Set the strikethrough flag.
    pub fn with_strikethrough(mut self, strikethrough: bool) -> Self {
        self.strikethrough = Some(strikethrough);
        self
    }

    /// Returns `true` if this entry configures `name` (case-insensitive).
    pub fn names_tag(&self, name: &str) -> bool {
        self.tag.iter().any(|t| t.eq_ignore_ascii_case(name))
    }

    /// The style described by this entry, with unset fields at their defaults.
    pub fn style(&self) -> TagStyle {
        TagStyle::default().overridden_by(self)
    }
}

/// Light or dark color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeKind {
    /// Light theme (`tagsLight` overrides apply).
    Light,
    /// Dark theme (`tagsDark` overrides apply).
    Dark,
}

/// Resolved rendering style for one tag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagStyle {
    /// Foreground color.
    pub color: Option<String>,
    /// Background color.
    pub background_color: Option<String>,
    /// Strike-through.
    pub strikethrough: bool,
    /// Underline.
    pub underline: bool,
    /// Bold.
    pub bold: bool,
    /// Italic.
    pub italic: bool,
}

impl TagStyle {
    /// Copy every field `entry` sets over this style.
    pub fn overridden_by(mut self, entry: &TagConfigEntry) -> Self {
        if let Some(color) = &entry.color {
            self.color = Some(color.clone());
        }
        if let Some(background) = &entry.background_color {
            self.background_color = Some(background.clone());
        }
        if let Some(v) = entry.strikethrough {
            self.strikethrough = v;
        }
        if let Some(v) = entry.underline {
            self.underline = v;
        }
        if let Some(v) = entry.bold {
            self.bold = v;
        }
        if let Some(v) = entry.italic {
            self.italic = v;
        }
        self
    }

    /// CSS-like `text-decoration` value (`"line-through underline"`, or empty).
    pub fn text_decoration(&self) -> String {
        let mut parts = Vec::new();
        if self.strikethrough {
            parts.push("line-through");
        }
        if self.underline {
            parts.push("underline");
        }
        parts.join(" ")
    }
}

fn default_true() -> bool {
    true
}

fn default_lines() -> usize {
    100
}

fn default_millis() -> u64 {
    100
}

fn default_tags() -> Vec<TagConfigEntry> {
    vec![
        TagConfigEntry::new("!", "#FF2D00"),
        TagConfigEntry::new("?", "#3498DB"),
        TagConfigEntry::new("//", "#474747").with_strikethrough(true),
        TagConfigEntry::new("todo", "#FF8C00"),
        TagConfigEntry::new("*", "#98C379"),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Flattened engine configuration.
pub struct ScanConfig {
    #[serde(default = "default_true")]
    /// Enable the doc-comment and block-comment passes.
    pub multiline_comments: bool,

    #[serde(default = "default_true", rename = "useJSDocStyle")]
    /// Enable the `/** */` doc-comment pass for languages with C-style block comments.
    pub use_jsdoc_style: bool,

    #[serde(default)]
    /// Scan plain-text documents.
    pub highlight_plain_text: bool,

    #[serde(default = "default_tags")]
    /// Tag definitions.
    pub tags: Vec<TagConfigEntry>,

    #[serde(default)]
    /// Light-theme style overrides, matched by tag name.
    pub tags_light: Vec<TagConfigEntry>,

    #[serde(default)]
    /// Dark-theme style overrides, matched by tag name.
    pub tags_dark: Vec<TagConfigEntry>,

    #[serde(default = "default_lines")]
    /// Lines scanned above and below the visible ranges in the viewport pass.
    pub preload_lines: usize,

    #[serde(default = "default_millis")]
    /// Milliseconds between the viewport pass and the full-document pass.
    pub update_delay: u64,

    #[serde(default = "default_millis")]
    /// Milliseconds a scan request waits for further requests before running.
    pub debounce: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            multiline_comments: true,
            use_jsdoc_style: true,
            highlight_plain_text: false,
            tags: default_tags(),
            tags_light: Vec::new(),
            tags_dark: Vec::new(),
            preload_lines: default_lines(),
            update_delay: default_millis(),
            debounce: default_millis(),
        }
    }
}

impl ScanConfig {
    /// Parse a flattened configuration document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse from an already-decoded JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Replace the tag list.
    pub fn with_tags(mut self, tags: Vec<TagConfigEntry>) -> Self {
        self.tags = tags;
        self
    }

    /// Delay between the viewport pass and the full-document pass.
    pub fn update_delay(&self) -> Duration {
        Duration::from_millis(self.update_delay)
    }

    /// Request coalescing delay.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce)
    }

    /// Style for `tag` under `theme`: base entry, then the theme entry field by field.
    ///
    /// Returns `None` when `tag` is not configured in `tags`.
    pub fn style_for(&self, tag: &str, theme: ThemeKind) -> Option<TagStyle> {
        let base = self.tags.iter().find(|e| e.names_tag(tag))?;
        let overrides = match theme {
            ThemeKind::Light => &self.tags_light,
            ThemeKind::Dark => &self.tags_dark,
        };
        let style = base.style();
        Some(match overrides.iter().find(|e| e.names_tag(tag)) {
            Some(entry) => style.overridden_by(entry),
            None => style,
        })
    }
}
