//! Delimiter-based key-value extraction.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::FieldMap;

/// Key prefix for numbered raw-text entries when no pairs are found.
pub const DEFAULT_FALLBACK_PREFIX: &str = "文本";

lazy_static! {
    /// `key: value` with either an ASCII or a full-width colon.
    ///
    /// The key group is lazy, so the first colon on the line is the delimiter
    /// and any later colons stay in the value (`Time: 12:30`).
    pub static ref PAIR_PATTERN: Regex = Regex::new(
        r"^(.*?)[:：]\s*(.*)$"
    ).unwrap();
}

/// Extracts `key: value` pairs line by line, falling back to numbered lines.
#[derive(Debug, Clone)]
pub struct KeyValueExtractor {
    fallback_prefix: String,
}

impl KeyValueExtractor {
    /// Create an extractor with the default fallback prefix.
    pub fn new() -> Self {
        Self {
            fallback_prefix: DEFAULT_FALLBACK_PREFIX.to_string(),
        }
    }

    /// Set the key prefix used for fallback entries.
    pub fn with_fallback_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.fallback_prefix = prefix.into();
        self
    }

    /// Extract fields from recognized text.
    ///
    /// Never fails; returns an empty map when the text has no non-blank lines.
    pub fn extract(&self, text: &str) -> FieldMap {
        let lines: Vec<&str> = text
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let mut fields = FieldMap::new();

        for line in &lines {
            if let Some((key, value)) = split_pair(line) {
                debug!("Found field: {} = {}", key, value);
                fields.insert(key, value);
            }
        }

        if fields.is_empty() && !lines.is_empty() {
            debug!(
                "No key-value pairs found, returning {} raw text lines",
                lines.len()
            );
            for (i, line) in lines.iter().enumerate() {
                fields.insert(format!("{}{}", self.fallback_prefix, i + 1), *line);
            }
        }

        fields
    }
}

impl Default for KeyValueExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract fields using the default extractor.
pub fn extract_fields(text: &str) -> FieldMap {
    KeyValueExtractor::new().extract(text)
}

/// Split a line at its first colon; `None` unless both sides are non-empty.
fn split_pair(line: &str) -> Option<(&str, &str)> {
    let caps = PAIR_PATTERN.captures(line)?;
    let key = caps.get(1)?.as_str().trim();
    let value = caps.get(2)?.as_str().trim();

    if key.is_empty() || value.is_empty() {
        None
    } else {
        Some((key, value))
    }
}
