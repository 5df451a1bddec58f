//! Alert rendering.
//!
//! When a rule set matches an event, the renderer looks up the response
//! template for the resolved severity and interpolates it into a
//! displayable [`Alert`] record. A severity with no template yields no
//! alert -- a configuration gap, not a runtime error.

pub mod template;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::event::{Event, Severity};
use crate::rules::MatchResult;
use template::{interpolate, placeholder_context};

/// What the caller should do with a rendered alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateAction {
    /// Record the alert and move on.
    Log,
    /// Surface the alert prominently.
    Alert,
    /// Escalate to a heavier, model-driven agent.
    ForwardToAi,
    /// Hand off to the reply gatekeeper.
    SendReply,
    /// Append a row to a connected spreadsheet.
    LogToSheets,
}

/// Response template for one severity level. A monitor carries at most one
/// per severity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseTemplate {
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub action: TemplateAction,
}

/// A rendered, displayable alert. Owned by the calling application once
/// created; the engine never reads it back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    /// Id of the event that raised this alert.
    pub event_id: String,
    pub matched_rule_ids: Vec<String>,
    pub timestamp: DateTime<Utc>,
    /// Caller-owned; alerts are always created unacknowledged.
    pub acknowledged: bool,
    pub monitor_id: String,
    /// True when the template action escalates to a model-driven agent.
    pub forwarded_to_ai: bool,
}

/// Render an alert for a matched event.
///
/// Returns `None` when the result did not match or when no template covers
/// the resolved severity.
pub fn render_alert(
    event: &Event,
    result: &MatchResult,
    templates: &[ResponseTemplate],
    monitor_id: &str,
) -> Option<Alert> {
    if !result.matched {
        return None;
    }
    let severity = result.severity?;
    let Some(tpl) = templates.iter().find(|t| t.severity == severity) else {
        debug!(
            severity = severity.as_str(),
            "no response template for severity, skipping alert"
        );
        return None;
    };

    let context = placeholder_context(event, result);
    Some(Alert {
        id: Uuid::new_v4().to_string(),
        severity,
        title: interpolate(&tpl.title, &context),
        message: interpolate(&tpl.message, &context),
        event_id: event.id.clone(),
        matched_rule_ids: result.matches.iter().map(|m| m.rule_id.clone()).collect(),
        timestamp: Utc::now(),
        acknowledged: false,
        monitor_id: monitor_id.to_string(),
        forwarded_to_ai: tpl.action == TemplateAction::ForwardToAi,
    })
}
