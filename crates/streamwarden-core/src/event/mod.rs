//! Event types for Streamwarden.
//!
//! Events are the fundamental data unit flowing through the engine. They
//! originate from external ingestion collaborators (mail pollers, calendar
//! notifications, webhook receivers) and are immutable once constructed --
//! the engine never mutates an event.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity level for a matched rule or rendered alert.
///
/// Ordering is significant: `Info < Warning < Critical`. Severity resolution
/// takes the maximum across all fired rules.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational, no action required.
    Info,
    /// Worth reviewing.
    Warning,
    /// Immediate attention recommended.
    Critical,
}

impl Severity {
    /// Lowercase name as it appears in configuration files and alert output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

/// A metadata value attached to an event.
///
/// Metadata carries arbitrary named side-channel fields (sender, subject,
/// thread id) that are not known at rule-authoring time, restricted to a
/// small closed set of scalar kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl MetaValue {
    /// Textual form used for rule matching and template interpolation.
    pub fn as_text(&self) -> String {
        match self {
            MetaValue::Bool(b) => b.to_string(),
            MetaValue::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            MetaValue::String(s) => s.clone(),
        }
    }
}

/// One externally-sourced event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Caller-assigned identifier, carried through to any resulting alert.
    pub id: String,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// Where the event came from (e.g. `"imap-inbox"`, `"calendar"`).
    pub source: String,
    /// Event classification tag (e.g. `"email"`, `"meeting_invite"`).
    #[serde(rename = "type")]
    pub event_type: String,
    /// Free-text content the rule set matches against.
    pub content: String,
    /// Arbitrary scalar side-channel fields, e.g. sender and subject.
    #[serde(default)]
    pub metadata: BTreeMap<String, MetaValue>,
}

impl Event {
    /// Construct an event stamped with a fresh id and the current time.
    pub fn new(source: &str, event_type: &str, content: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            source: source.to_string(),
            event_type: event_type.to_string(),
            content: content.to_string(),
            metadata: BTreeMap::new(),
        }
    }

    /// Throwaway event wrapping ad-hoc text, used by the dry-run surface.
    pub fn ad_hoc(content: &str) -> Self {
        Self::new("dry-run", "test", content)
    }

    /// Attach a metadata field (builder style).
    pub fn with_meta(mut self, key: &str, value: MetaValue) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    /// Look up a metadata field as text.
    pub fn meta_text(&self, key: &str) -> Option<String> {
        self.metadata.get(key).map(MetaValue::as_text)
    }
}

/// Extract the bracketed address from a `"Display Name" <addr>` form.
///
/// Falls back to the raw value (trimmed) when no bracket pair is present,
/// so plain addresses pass through unchanged.
pub fn extract_address(value: &str) -> &str {
    if let Some(start) = value.rfind('<') {
        if let Some(end) = value[start..].find('>') {
            let addr = value[start + 1..start + end].trim();
            if !addr.is_empty() {
                return addr;
            }
        }
    }
    value.trim()
}

/// Extract the display name from a `"Display Name" <addr>` form.
///
/// Returns the trimmed, unquoted name, or `None` when the value carries no
/// name portion.
pub fn extract_display_name(value: &str) -> Option<&str> {
    let start = value.rfind('<')?;
    let name = value[..start].trim().trim_matches('"').trim();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}
