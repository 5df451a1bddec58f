//! Rule-set evaluation.
//!
//! [`evaluate`] is a pure function over one event and one immutable rule-set
//! snapshot: no I/O, no shared mutable state, safe to call from any number
//! of threads at once. The three rule kinds run independently; their matches
//! accumulate into one ordered list before the logic mode resolves the
//! overall decision.

use tracing::debug;

use super::matcher::{condition_matches, keyword_matches, pattern_matches};
use super::{LogicMode, MatchResult, RuleKind, RuleMatch, RuleSet};
use crate::event::Event;

/// Evaluate one event against a rule-set snapshot.
pub fn evaluate(event: &Event, rules: &RuleSet) -> MatchResult {
    // Snapshot the enabled-rule count up front so `all` logic can never
    // observe a mixed view of the set.
    let enabled = rules.enabled_count();

    let mut matches = Vec::new();

    for rule in rules.keywords.iter().filter(|r| r.enabled) {
        if keyword_matches(rule, &event.content) {
            debug!(rule = %rule.id, keyword = %rule.keyword, "keyword rule fired");
            matches.push(RuleMatch {
                kind: RuleKind::Keyword,
                rule_id: rule.id.clone(),
                label: rule.keyword.clone(),
                severity: rule.severity,
            });
        }
    }

    for rule in rules.patterns.iter().filter(|r| r.enabled) {
        if pattern_matches(rule, &event.content) {
            debug!(rule = %rule.id, name = %rule.name, "pattern rule fired");
            matches.push(RuleMatch {
                kind: RuleKind::Pattern,
                rule_id: rule.id.clone(),
                label: rule.name.clone(),
                severity: rule.severity,
            });
        }
    }

    for rule in rules.conditions.iter().filter(|r| r.enabled) {
        if condition_matches(rule, event) {
            debug!(rule = %rule.id, field = %rule.field, "condition rule fired");
            matches.push(RuleMatch {
                kind: RuleKind::Condition,
                rule_id: rule.id.clone(),
                label: format!("{} {} {}", rule.field, rule.operator.as_str(), rule.value),
                severity: rule.severity,
            });
        }
    }

    let matched = match rules.logic {
        LogicMode::Any => !matches.is_empty(),
        // An empty enabled set under `all` never matches.
        LogicMode::All => enabled > 0 && matches.len() == enabled,
    };

    let severity = if matched {
        matches.iter().map(|m| m.severity).max()
    } else {
        None
    };

    MatchResult {
        matched,
        severity,
        matches,
    }
}

/// Evaluate ad-hoc text with no side effects, for interactive rule
/// verification.
pub fn test_rules(content: &str, rules: &RuleSet) -> MatchResult {
    let event = Event::ad_hoc(content);
    evaluate(&event, rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{MetaValue, Severity};
    use crate::rules::{ConditionOperator, ConditionRule, KeywordRule, PatternRule};

    fn keyword_rule(id: &str, keyword: &str, severity: Severity) -> KeywordRule {
        KeywordRule {
            id: id.into(),
            keyword: keyword.into(),
            case_sensitive: false,
            severity,
            enabled: true,
        }
    }

    fn pattern_rule(id: &str, pattern: &str, severity: Severity) -> PatternRule {
        PatternRule {
            id: id.into(),
            name: format!("pattern {id}"),
            pattern: pattern.into(),
            description: String::new(),
            severity,
            enabled: true,
        }
    }

    fn condition_rule(
        id: &str,
        field: &str,
        operator: ConditionOperator,
        value: &str,
        severity: Severity,
    ) -> ConditionRule {
        ConditionRule {
            id: id.into(),
            field: field.into(),
            operator,
            value: value.into(),
            severity,
            enabled: true,
        }
    }

    #[test]
    fn keyword_match_reports_rule_and_severity() {
        // Scenario: keyword "invoice" at warning severity.
        let rules = RuleSet {
            keywords: vec![keyword_rule("k1", "invoice", Severity::Warning)],
            ..Default::default()
        };
        let event = Event::ad_hoc("Please pay this invoice now");
        let result = evaluate(&event, &rules);
        assert!(result.matched);
        assert_eq!(result.severity, Some(Severity::Warning));
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].rule_id, "k1");
        assert_eq!(result.matches[0].kind, RuleKind::Keyword);
    }

    #[test]
    fn no_match_yields_null_severity() {
        let rules = RuleSet {
            keywords: vec![keyword_rule("k1", "invoice", Severity::Warning)],
            ..Default::default()
        };
        let result = evaluate(&Event::ad_hoc("weekly report attached"), &rules);
        assert!(!result.matched);
        assert_eq!(result.severity, None);
        assert!(result.matches.is_empty());
    }

    #[test]
    fn disabled_rules_are_skipped() {
        let mut rule = keyword_rule("k1", "invoice", Severity::Warning);
        rule.enabled = false;
        let rules = RuleSet {
            keywords: vec![rule],
            ..Default::default()
        };
        let result = evaluate(&Event::ad_hoc("invoice"), &rules);
        assert!(!result.matched);
    }

    #[test]
    fn severity_resolution_takes_maximum() {
        let rules = RuleSet {
            keywords: vec![
                keyword_rule("k1", "invoice", Severity::Info),
                keyword_rule("k2", "overdue", Severity::Critical),
                keyword_rule("k3", "payment", Severity::Warning),
            ],
            ..Default::default()
        };
        let result = evaluate(&Event::ad_hoc("overdue invoice payment"), &rules);
        assert!(result.matched);
        assert_eq!(result.severity, Some(Severity::Critical));
        assert_eq!(result.matches.len(), 3);
    }

    #[test]
    fn all_logic_requires_every_enabled_rule() {
        // Scenario: two enabled rules, event satisfies only one.
        let rules = RuleSet {
            keywords: vec![
                keyword_rule("k1", "invoice", Severity::Warning),
                keyword_rule("k2", "urgent", Severity::Warning),
            ],
            logic: crate::rules::LogicMode::All,
            ..Default::default()
        };
        let result = evaluate(&Event::ad_hoc("invoice attached"), &rules);
        assert!(!result.matched);
        // The individual match is retained for diagnostics.
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.severity, None);

        let result = evaluate(&Event::ad_hoc("urgent invoice attached"), &rules);
        assert!(result.matched);
        assert_eq!(result.matches.len(), 2);
    }

    #[test]
    fn all_logic_spans_rule_kinds() {
        let rules = RuleSet {
            keywords: vec![keyword_rule("k1", "invoice", Severity::Info)],
            patterns: vec![pattern_rule("p1", r"INV-\d+", Severity::Warning)],
            conditions: vec![condition_rule(
                "c1",
                "from",
                ConditionOperator::EndsWith,
                "@example.com",
                Severity::Critical,
            )],
            logic: crate::rules::LogicMode::All,
        };
        let event = Event::ad_hoc("invoice INV-991 attached")
            .with_meta("from", MetaValue::String("billing@example.com".into()));
        let result = evaluate(&event, &rules);
        assert!(result.matched);
        assert_eq!(result.severity, Some(Severity::Critical));
        assert_eq!(result.matches.len(), 3);
    }

    #[test]
    fn all_logic_with_no_enabled_rules_never_matches() {
        let mut rule = keyword_rule("k1", "invoice", Severity::Info);
        rule.enabled = false;
        let rules = RuleSet {
            keywords: vec![rule],
            logic: crate::rules::LogicMode::All,
            ..Default::default()
        };
        let result = evaluate(&Event::ad_hoc("anything at all"), &rules);
        assert!(!result.matched);
    }

    #[test]
    fn uncompilable_pattern_does_not_abort_siblings() {
        let rules = RuleSet {
            patterns: vec![
                pattern_rule("p1", "[invalid", Severity::Critical),
                pattern_rule("p2", "outage", Severity::Warning),
            ],
            ..Default::default()
        };
        let result = evaluate(&Event::ad_hoc("production outage ongoing"), &rules);
        assert!(result.matched);
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].rule_id, "p2");
    }

    #[test]
    fn matches_accumulate_in_kind_order() {
        let rules = RuleSet {
            keywords: vec![keyword_rule("k1", "deploy", Severity::Info)],
            patterns: vec![pattern_rule("p1", "deploy", Severity::Info)],
            conditions: vec![condition_rule(
                "c1",
                "content",
                ConditionOperator::Contains,
                "deploy",
                Severity::Info,
            )],
            ..Default::default()
        };
        let result = evaluate(&Event::ad_hoc("deploy finished"), &rules);
        let kinds: Vec<RuleKind> = result.matches.iter().map(|m| m.kind).collect();
        assert_eq!(
            kinds,
            vec![RuleKind::Keyword, RuleKind::Pattern, RuleKind::Condition]
        );
    }

    #[test]
    fn test_rules_evaluates_ad_hoc_text() {
        let rules = RuleSet {
            keywords: vec![keyword_rule("k1", "invoice", Severity::Warning)],
            ..Default::default()
        };
        let result = test_rules("an invoice for you", &rules);
        assert!(result.matched);
        assert_eq!(result.severity, Some(Severity::Warning));
    }
}
