//! Placeholder interpolation for alert and reply templates.

use std::collections::BTreeMap;

use crate::event::{extract_address, extract_display_name, Event};
use crate::rules::MatchResult;

/// Maximum characters of event content carried into the `{content}`
/// placeholder.
const PREVIEW_CHARS: usize = 100;

/// Replace `{name}` tokens in a template with context values.
///
/// An unrecognized placeholder is left verbatim in the output so template
/// typos stay visible instead of being silently deleted.
pub fn interpolate(template: &str, context: &BTreeMap<&str, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start..];
        match after.find('}') {
            Some(end) => {
                let token = &after[1..end];
                match context.get(token) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&after[..=end]),
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(after);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// First `PREVIEW_CHARS` characters of the content, with an ellipsis when
/// truncated.
pub(crate) fn content_preview(content: &str) -> String {
    let mut chars = content.chars();
    let preview: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{preview}...")
    } else {
        preview
    }
}

/// Build the placeholder context shared by alert and reply templates.
///
/// Fields: `sender` (address from metadata `sender`/`from`, fallback event
/// source), `sender_name` (display name, fallback address), `subject`
/// (metadata, fallback event type), `content` (preview), `matched_rule`
/// (highest-severity label), `matched_rules` (comma-joined labels),
/// `severity`, and `timestamp`.
pub fn placeholder_context(event: &Event, result: &MatchResult) -> BTreeMap<&'static str, String> {
    let raw_sender = event
        .meta_text("sender")
        .or_else(|| event.meta_text("from"))
        .unwrap_or_else(|| event.source.clone());
    let sender = extract_address(&raw_sender).to_string();
    let sender_name = extract_display_name(&raw_sender)
        .map(str::to_string)
        .unwrap_or_else(|| sender.clone());

    let subject = event
        .meta_text("subject")
        .unwrap_or_else(|| event.event_type.clone());

    let top_match = result
        .matches
        .iter()
        .max_by_key(|m| m.severity)
        .map(|m| m.label.clone())
        .unwrap_or_default();
    let all_matches = result
        .matches
        .iter()
        .map(|m| m.label.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut context = BTreeMap::new();
    context.insert("sender", sender);
    context.insert("sender_name", sender_name);
    context.insert("subject", subject);
    context.insert("content", content_preview(&event.content));
    context.insert("matched_rule", top_match);
    context.insert("matched_rules", all_matches);
    context.insert(
        "severity",
        result
            .severity
            .map(|s| s.as_str().to_string())
            .unwrap_or_default(),
    );
    context.insert("timestamp", event.timestamp.to_rfc3339());
    context
}
