//! Reply gating: condition checks, sliding-window rate limiting, reply
//! rendering, and dispatch through the delivery seam.
//!
//! All checks are pure functions over caller-supplied state; `now` is an
//! explicit parameter so the window arithmetic is deterministic under test.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use super::{
    AutoReplyConfig, DeliveryResult, DispatchOutcome, RateDecision, RateLimit, RenderedReply,
    ReplyConditions, ReplyDecision, ReplySender,
};
use crate::alert::template::{interpolate, placeholder_context};
use crate::event::{extract_address, Event, Severity};
use crate::rules::matcher::is_match_cached;
use crate::rules::MatchResult;

/// Resolve the reply recipient for an event: the extracted sender address,
/// falling back to the event source tag.
pub fn reply_recipient(event: &Event) -> String {
    let raw = event
        .meta_text("sender")
        .or_else(|| event.meta_text("from"))
        .unwrap_or_else(|| event.source.clone());
    extract_address(&raw).to_string()
}

/// Check the configured reply conditions for one recipient/severity pair.
///
/// `business_hours_only` is accepted in configuration but not enforced.
pub fn should_send_reply(
    recipient: &str,
    severity: Severity,
    conditions: &ReplyConditions,
) -> ReplyDecision {
    if !conditions.severities.contains(&severity) {
        return ReplyDecision {
            should_send: false,
            reason: format!(
                "severity '{}' is not in the reply allow-list",
                severity.as_str()
            ),
        };
    }

    let recipient_lower = recipient.to_lowercase();
    for excluded in &conditions.excluded_senders {
        if !excluded.is_empty() && recipient_lower.contains(&excluded.to_lowercase()) {
            return ReplyDecision {
                should_send: false,
                reason: format!("recipient matches excluded sender '{excluded}'"),
            };
        }
    }

    if let Some(pattern) = &conditions.sender_pattern {
        if !is_match_cached(pattern, recipient) {
            return ReplyDecision {
                should_send: false,
                reason: "recipient does not match the configured sender pattern".to_string(),
            };
        }
    }

    ReplyDecision {
        should_send: true,
        reason: "all reply conditions satisfied".to_string(),
    }
}

/// Timestamps within the trailing window ending at `now`.
fn within_window(
    times: &[DateTime<Utc>],
    window_minutes: i64,
    now: DateTime<Utc>,
) -> Vec<DateTime<Utc>> {
    let cutoff = now - Duration::minutes(window_minutes);
    times.iter().copied().filter(|t| *t >= cutoff).collect()
}

/// Sliding-window rate-limit check for one recipient.
pub fn check_rate_limit(recipient: &str, rate_limit: &RateLimit, now: DateTime<Utc>) -> RateDecision {
    let recent = rate_limit
        .sent
        .get(recipient)
        .map(|t| within_window(t, rate_limit.window_minutes, now))
        .unwrap_or_default();

    if (recent.len() as u32) < rate_limit.max_replies_per_sender {
        RateDecision {
            allowed: true,
            reason: format!(
                "{} of {} replies used in the last {} minutes",
                recent.len(),
                rate_limit.max_replies_per_sender,
                rate_limit.window_minutes
            ),
        }
    } else {
        RateDecision {
            allowed: false,
            reason: format!(
                "rate limit reached: {} replies to this recipient in the last {} minutes",
                recent.len(),
                rate_limit.window_minutes
            ),
        }
    }
}

/// Record a successfully sent reply.
///
/// Functional update: prunes the recipient's window, appends `now`, and
/// returns a new record, leaving the input untouched. The caller persists
/// the returned record before the next invocation.
pub fn record_sent_reply(recipient: &str, rate_limit: &RateLimit, now: DateTime<Utc>) -> RateLimit {
    let mut updated = rate_limit.clone();
    let window = updated.window_minutes;
    let times = updated.sent.entry(recipient.to_string()).or_default();
    *times = within_window(times, window, now);
    times.push(now);
    updated
}

/// Render the reply subject and body for a matched event.
pub fn build_reply(event: &Event, result: &MatchResult, config: &AutoReplyConfig) -> RenderedReply {
    let context = placeholder_context(event, result);
    let subject = interpolate(&config.template.subject, &context);
    let mut body = interpolate(&config.template.body, &context);

    if !config.template.signature.is_empty() {
        body.push_str("\n\n");
        body.push_str(&config.template.signature);
    }
    if config.template.include_original {
        body.push_str("\n\n--- Original message ---\n");
        body.push_str(&event.content);
    }

    RenderedReply {
        recipient: reply_recipient(event),
        subject,
        body,
    }
}

/// Run the full gatekeeper sequence for one matched event: conditions, rate
/// limit, rendering, delivery.
///
/// Quota is consumed only on a successful send; on failure the outcome
/// carries no updated record and the caller's stored record stays as it
/// was.
pub fn dispatch_reply(
    event: &Event,
    result: &MatchResult,
    config: &AutoReplyConfig,
    sender: &dyn ReplySender,
    now: DateTime<Utc>,
) -> DispatchOutcome {
    if !config.enabled {
        return DispatchOutcome {
            sent: false,
            reason: "automated replies are disabled".to_string(),
            rate_limit: None,
        };
    }
    let Some(severity) = result.severity.filter(|_| result.matched) else {
        return DispatchOutcome {
            sent: false,
            reason: "event did not match the rule set".to_string(),
            rate_limit: None,
        };
    };

    let recipient = reply_recipient(event);

    let decision = should_send_reply(&recipient, severity, &config.conditions);
    if !decision.should_send {
        debug!(recipient = %recipient, reason = %decision.reason, "reply suppressed");
        return DispatchOutcome {
            sent: false,
            reason: decision.reason,
            rate_limit: None,
        };
    }

    let rate = check_rate_limit(&recipient, &config.rate_limit, now);
    if !rate.allowed {
        debug!(recipient = %recipient, reason = %rate.reason, "reply rate-limited");
        return DispatchOutcome {
            sent: false,
            reason: rate.reason,
            rate_limit: None,
        };
    }

    let reply = build_reply(event, result, config);
    let delivery: DeliveryResult = sender.send(&reply);
    if delivery.success {
        DispatchOutcome {
            sent: true,
            reason: "reply sent".to_string(),
            rate_limit: Some(record_sent_reply(&recipient, &config.rate_limit, now)),
        }
    } else {
        let reason = delivery
            .error
            .unwrap_or_else(|| "delivery failed".to_string());
        warn!(recipient = %recipient, error = %reason, "reply delivery failed, quota not consumed");
        DispatchOutcome {
            sent: false,
            reason,
            rate_limit: None,
        }
    }
}
