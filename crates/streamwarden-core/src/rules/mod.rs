//! Rule types for the Streamwarden matching engine.
//!
//! A monitor owns one [`RuleSet`] holding three independent rule kinds:
//! keyword rules (substring tests), pattern rules (regular expressions under
//! the length-capped linear-time engine), and condition rules (field
//! comparisons). The set's [`LogicMode`] decides how individual matches
//! combine into the overall decision.

pub mod engine;
pub mod matcher;

use serde::{Deserialize, Serialize};

use crate::event::Severity;

fn default_true() -> bool {
    true
}

/// How individual rule matches combine into the overall matched decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicMode {
    /// Any single enabled rule firing raises the alert.
    #[default]
    Any,
    /// Every enabled rule (across all three kinds) must fire.
    All,
}

/// Matches when the keyword occurs as a substring of event content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordRule {
    pub id: String,
    pub keyword: String,
    #[serde(default)]
    pub case_sensitive: bool,
    pub severity: Severity,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Matches event content against a regular expression.
///
/// The pattern is compiled under the safe engine bounds in
/// [`matcher::compile_safe_regex`]; a pattern that fails either bound is
/// permanently non-matching, never a fatal error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternRule {
    pub id: String,
    pub name: String,
    pub pattern: String,
    #[serde(default)]
    pub description: String,
    pub severity: Severity,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Comparison operator for condition rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionOperator {
    /// Case-insensitive string equality.
    Equals,
    /// Substring test.
    #[serde(alias = "includes")]
    Contains,
    /// Case-insensitive prefix test.
    StartsWith,
    /// Case-insensitive suffix test.
    EndsWith,
    /// Numeric comparison via best-effort float parse.
    GreaterThan,
    /// Numeric comparison via best-effort float parse.
    LessThan,
    /// Regular-expression test under the safe engine bounds.
    Matches,
}

impl ConditionOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionOperator::Equals => "equals",
            ConditionOperator::Contains => "contains",
            ConditionOperator::StartsWith => "starts-with",
            ConditionOperator::EndsWith => "ends-with",
            ConditionOperator::GreaterThan => "greater-than",
            ConditionOperator::LessThan => "less-than",
            ConditionOperator::Matches => "matches",
        }
    }
}

/// Compares a named event field against a fixed value.
///
/// The field is one of `content`, `source`, `type`, or an arbitrary metadata
/// key. Address-bearing fields (`from`, `to`, `sender`) are compared against
/// the bracketed address extracted from `"Display Name" <addr>` forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionRule {
    pub id: String,
    pub field: String,
    pub operator: ConditionOperator,
    pub value: String,
    pub severity: Severity,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// The complete, versionable rule set attached to a monitor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub keywords: Vec<KeywordRule>,
    #[serde(default)]
    pub patterns: Vec<PatternRule>,
    #[serde(default)]
    pub conditions: Vec<ConditionRule>,
    #[serde(default)]
    pub logic: LogicMode,
}

impl RuleSet {
    /// Number of enabled rules across all three kinds. `all` logic compares
    /// the fired-rule count against this.
    pub fn enabled_count(&self) -> usize {
        self.keywords.iter().filter(|r| r.enabled).count()
            + self.patterns.iter().filter(|r| r.enabled).count()
            + self.conditions.iter().filter(|r| r.enabled).count()
    }
}

/// Which kind of rule produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Keyword,
    Pattern,
    Condition,
}

/// A single rule that fired during evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleMatch {
    pub kind: RuleKind,
    pub rule_id: String,
    /// Human label shown in alerts: the keyword text, pattern name, or a
    /// rendered condition description.
    pub label: String,
    pub severity: Severity,
}

/// Outcome of evaluating one event against one rule-set snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched: bool,
    /// Maximum severity among fired rules; `None` when not matched.
    pub severity: Option<Severity>,
    /// Every rule that individually fired, in evaluation order. Retained
    /// even when the overall decision is false under `all` logic, for
    /// diagnostics.
    pub matches: Vec<RuleMatch>,
}
