//! Automated reply configuration and data contracts.
//!
//! The engine renders replies and decides whether they may fire; actual
//! transmission belongs to an external sender module reached only through
//! the [`ReplySender`] trait. The rate-limit record is caller-owned state:
//! it is passed in, updated functionally, and must be persisted back before
//! the next invocation.

pub mod gatekeeper;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::Severity;

/// Template for the automated reply.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplyTemplate {
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub signature: String,
    /// Quote the original event content below the reply body.
    #[serde(default)]
    pub include_original: bool,
}

/// Conditions gating whether a reply may fire at all.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplyConditions {
    /// Severities that qualify for an automated reply.
    #[serde(default)]
    pub severities: Vec<Severity>,
    /// Recipients containing any of these substrings never receive replies.
    #[serde(default)]
    pub excluded_senders: Vec<String>,
    /// Optional pattern the recipient must match, under the safe regex
    /// engine bounds.
    #[serde(default)]
    pub sender_pattern: Option<String>,
    /// Accepted in configuration but not enforced; enforcement is an
    /// unimplemented hook pending a timezone/calendar policy.
    #[serde(default)]
    pub business_hours_only: bool,
}

fn default_max_replies() -> u32 {
    1
}

fn default_window_minutes() -> i64 {
    60
}

/// Sliding-window rate limit together with its caller-persisted record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimit {
    #[serde(default = "default_max_replies")]
    pub max_replies_per_sender: u32,
    #[serde(default = "default_window_minutes")]
    pub window_minutes: i64,
    /// Recipient -> timestamps of previously sent replies. Updated only via
    /// [`gatekeeper::record_sent_reply`]; the caller persists this map
    /// between invocations and must serialize concurrent updates per
    /// recipient.
    #[serde(default)]
    pub sent: HashMap<String, Vec<DateTime<Utc>>>,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            max_replies_per_sender: default_max_replies(),
            window_minutes: default_window_minutes(),
            sent: HashMap::new(),
        }
    }
}

/// Full auto-reply configuration for one monitor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutoReplyConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub template: ReplyTemplate,
    #[serde(default)]
    pub conditions: ReplyConditions,
    #[serde(default)]
    pub rate_limit: RateLimit,
}

/// Decision from the reply-condition check.
#[derive(Debug, Clone, Serialize)]
pub struct ReplyDecision {
    pub should_send: bool,
    pub reason: String,
}

/// Decision from the rate-limit check.
#[derive(Debug, Clone, Serialize)]
pub struct RateDecision {
    pub allowed: bool,
    pub reason: String,
}

/// Fully rendered reply handed to the delivery collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedReply {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Result reported back by a delivery collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryResult {
    pub success: bool,
    pub error: Option<String>,
}

/// Delivery seam: the engine renders replies, an external sender transmits
/// them.
pub trait ReplySender: Send + Sync {
    fn send(&self, reply: &RenderedReply) -> DeliveryResult;
}

/// Outcome of a full dispatch attempt.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchOutcome {
    pub sent: bool,
    pub reason: String,
    /// Updated rate-limit record when the send succeeded; `None` otherwise,
    /// so failed attempts never consume quota.
    pub rate_limit: Option<RateLimit>,
}
