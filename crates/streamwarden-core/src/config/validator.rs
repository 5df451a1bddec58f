//! Pre-save validation of a full monitor configuration.
//!
//! Runs out-of-band whenever configuration changes, independent of any
//! single event. Hard errors block persistence; soft warnings are allowed
//! but surfaced to the user. Validation never panics and never touches the
//! network.

use serde::Serialize;

use super::{IngestConfig, MonitorConfig};
use crate::event::Severity;
use crate::rules::matcher::check_pattern;
use crate::rules::ConditionOperator;
use crate::sanitize::url::validate_webhook_url;

/// Minimum polling interval in seconds.
pub const MIN_POLL_INTERVAL_SECS: u64 = 10;

/// Maximum polling interval in seconds (one day).
pub const MAX_POLL_INTERVAL_SECS: u64 = 86_400;

/// Structured validation outcome: hard errors and soft warnings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// True when the configuration may be saved.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate an entire monitor configuration.
pub fn validate(config: &MonitorConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    if config.name.trim().is_empty() {
        report.errors.push("monitor name must not be empty".to_string());
    }

    for rule in &config.rules.keywords {
        if rule.enabled && rule.keyword.is_empty() {
            report.errors.push(format!(
                "keyword rule '{}' is enabled but has an empty keyword",
                rule.id
            ));
        }
    }

    for rule in &config.rules.patterns {
        if let Err(e) = check_pattern(&rule.pattern) {
            report
                .errors
                .push(format!("pattern rule '{}': {e}", rule.id));
        }
    }

    for rule in &config.rules.conditions {
        if rule.operator == ConditionOperator::Matches {
            if let Err(e) = check_pattern(&rule.value) {
                report
                    .errors
                    .push(format!("condition rule '{}': {e}", rule.id));
            }
        }
    }

    for severity in [Severity::Info, Severity::Warning, Severity::Critical] {
        let count = config
            .templates
            .iter()
            .filter(|t| t.severity == severity)
            .count();
        if count > 1 {
            report.errors.push(format!(
                "more than one response template for severity '{}'",
                severity.as_str()
            ));
        } else if count == 0 {
            report.warnings.push(format!(
                "no response template for severity '{}'; matching events at this severity will raise no alert",
                severity.as_str()
            ));
        }
    }

    match &config.ingest {
        Some(IngestConfig::Polling(polling)) => {
            if polling.source.trim().is_empty() {
                report
                    .errors
                    .push("polling ingest requires a source name".to_string());
            }
            if !(MIN_POLL_INTERVAL_SECS..=MAX_POLL_INTERVAL_SECS)
                .contains(&polling.interval_seconds)
            {
                report.errors.push(format!(
                    "polling interval {}s is outside [{MIN_POLL_INTERVAL_SECS}, {MAX_POLL_INTERVAL_SECS}]",
                    polling.interval_seconds
                ));
            }
        }
        Some(IngestConfig::Webhook(webhook)) => {
            if webhook.secret.as_deref().map_or(true, str::is_empty) {
                report.warnings.push(
                    "webhook ingest has no secret; unauthenticated deliveries will be accepted"
                        .to_string(),
                );
            }
        }
        None => {}
    }

    if let Some(url) = &config.alert_webhook_url {
        if let Err(e) = validate_webhook_url(url) {
            report.errors.push(format!("alert webhook URL: {e}"));
        }
    }

    if config.auto_reply.enabled {
        let limit = &config.auto_reply.rate_limit;
        if limit.max_replies_per_sender == 0 {
            report
                .errors
                .push("auto-reply rate limit must allow at least one reply".to_string());
        }
        if limit.window_minutes < 1 {
            report
                .errors
                .push("auto-reply rate-limit window must be at least one minute".to_string());
        }
        if let Some(pattern) = &config.auto_reply.conditions.sender_pattern {
            if let Err(e) = check_pattern(pattern) {
                report
                    .errors
                    .push(format!("auto-reply sender pattern: {e}"));
            }
        }
        if config.auto_reply.conditions.severities.is_empty() {
            report.warnings.push(
                "auto-reply is enabled but its severity allow-list is empty; no reply will ever fire"
                    .to_string(),
            );
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::{ResponseTemplate, TemplateAction};
    use crate::config::{PollingConfig, WebhookConfig};
    use crate::event::Severity;
    use crate::rules::{ConditionRule, KeywordRule, PatternRule};

    fn template(severity: Severity) -> ResponseTemplate {
        ResponseTemplate {
            severity,
            title: "{subject}".into(),
            message: "{content}".into(),
            action: TemplateAction::Alert,
        }
    }

    fn base_config() -> MonitorConfig {
        MonitorConfig {
            id: "mon-1".into(),
            name: "Invoice watch".into(),
            templates: vec![
                template(Severity::Info),
                template(Severity::Warning),
                template(Severity::Critical),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn valid_config_passes_clean() {
        let report = validate(&base_config());
        assert!(report.is_valid(), "errors: {:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn empty_name_is_an_error() {
        let mut config = base_config();
        config.name = "   ".into();
        let report = validate(&config);
        assert!(!report.is_valid());
        assert!(report.errors[0].contains("name"));
    }

    #[test]
    fn enabled_empty_keyword_is_an_error() {
        let mut config = base_config();
        config.rules.keywords.push(KeywordRule {
            id: "k1".into(),
            keyword: String::new(),
            case_sensitive: false,
            severity: Severity::Info,
            enabled: true,
        });
        assert!(!validate(&config).is_valid());

        // Disabled rules may keep an empty keyword.
        config.rules.keywords[0].enabled = false;
        assert!(validate(&config).is_valid());
    }

    #[test]
    fn bad_pattern_rule_blocks_save() {
        let mut config = base_config();
        config.rules.patterns.push(PatternRule {
            id: "p1".into(),
            name: "broken".into(),
            pattern: "[invalid".into(),
            description: String::new(),
            severity: Severity::Info,
            enabled: true,
        });
        let report = validate(&config);
        assert!(!report.is_valid());
        assert!(report.errors[0].contains("p1"));
    }

    #[test]
    fn bad_matches_condition_blocks_save() {
        let mut config = base_config();
        config.rules.conditions.push(ConditionRule {
            id: "c1".into(),
            field: "from".into(),
            operator: ConditionOperator::Matches,
            value: "[invalid".into(),
            severity: Severity::Info,
            enabled: true,
        });
        assert!(!validate(&config).is_valid());
    }

    #[test]
    fn duplicate_template_severity_is_an_error() {
        let mut config = base_config();
        config.templates.push(template(Severity::Warning));
        let report = validate(&config);
        assert!(!report.is_valid());
        assert!(report.errors[0].contains("warning"));
    }

    #[test]
    fn missing_template_severity_is_a_warning() {
        let mut config = base_config();
        config.templates.retain(|t| t.severity != Severity::Info);
        let report = validate(&config);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("info"));
    }

    #[test]
    fn polling_interval_bounds() {
        let mut config = base_config();
        config.ingest = Some(IngestConfig::Polling(PollingConfig {
            source: "imap-inbox".into(),
            interval_seconds: 5,
        }));
        assert!(!validate(&config).is_valid());

        config.ingest = Some(IngestConfig::Polling(PollingConfig {
            source: "imap-inbox".into(),
            interval_seconds: 90_000,
        }));
        assert!(!validate(&config).is_valid());

        config.ingest = Some(IngestConfig::Polling(PollingConfig {
            source: "imap-inbox".into(),
            interval_seconds: 60,
        }));
        assert!(validate(&config).is_valid());
    }

    #[test]
    fn polling_requires_source() {
        let mut config = base_config();
        config.ingest = Some(IngestConfig::Polling(PollingConfig {
            source: "  ".into(),
            interval_seconds: 60,
        }));
        assert!(!validate(&config).is_valid());
    }

    #[test]
    fn webhook_without_secret_warns_but_saves() {
        let mut config = base_config();
        config.ingest = Some(IngestConfig::Webhook(WebhookConfig { secret: None }));
        let report = validate(&config);
        assert!(report.is_valid());
        assert!(report.warnings.iter().any(|w| w.contains("secret")));

        config.ingest = Some(IngestConfig::Webhook(WebhookConfig {
            secret: Some("s3cret".into()),
        }));
        let report = validate(&config);
        assert!(!report.warnings.iter().any(|w| w.contains("secret")));
    }

    #[test]
    fn bad_alert_webhook_url_is_an_error() {
        let mut config = base_config();
        config.alert_webhook_url = Some("http://insecure.example.com/hook".into());
        let report = validate(&config);
        assert!(!report.is_valid());
        assert!(report.errors[0].contains("https"));
    }

    #[test]
    fn auto_reply_rate_limit_bounds() {
        let mut config = base_config();
        config.auto_reply.enabled = true;
        config.auto_reply.conditions.severities = vec![Severity::Warning];
        config.auto_reply.rate_limit.max_replies_per_sender = 0;
        assert!(!validate(&config).is_valid());

        config.auto_reply.rate_limit.max_replies_per_sender = 1;
        config.auto_reply.rate_limit.window_minutes = 0;
        assert!(!validate(&config).is_valid());

        config.auto_reply.rate_limit.window_minutes = 60;
        assert!(validate(&config).is_valid());
    }

    #[test]
    fn auto_reply_empty_allow_list_warns() {
        let mut config = base_config();
        config.auto_reply.enabled = true;
        let report = validate(&config);
        assert!(report.is_valid());
        assert!(report.warnings.iter().any(|w| w.contains("allow-list")));
    }

    #[test]
    fn auto_reply_bad_sender_pattern_is_an_error() {
        let mut config = base_config();
        config.auto_reply.enabled = true;
        config.auto_reply.conditions.severities = vec![Severity::Warning];
        config.auto_reply.conditions.sender_pattern = Some("[invalid".into());
        assert!(!validate(&config).is_valid());
    }

    #[test]
    fn disabled_auto_reply_skips_reply_checks() {
        let mut config = base_config();
        config.auto_reply.enabled = false;
        config.auto_reply.rate_limit.max_replies_per_sender = 0;
        assert!(validate(&config).is_valid());
    }
}
