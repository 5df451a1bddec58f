//! Per-kind rule matching and safe regex compilation.
//!
//! Rule patterns come from semi-trusted authors (including one-time model
//! generation), so every regex is compiled through the linear-time `regex`
//! engine with a hard pattern-length cap and a compiled-size limit. A
//! pattern that fails either bound is logged and treated as never matching;
//! it must not abort evaluation of sibling rules.

use regex::{Regex, RegexBuilder};

use super::{ConditionOperator, ConditionRule, KeywordRule, PatternRule};
use crate::event::{extract_address, Event};

/// Maximum accepted pattern length in characters.
pub const MAX_PATTERN_LEN: usize = 500;

/// Maximum compiled regex size (256 KB).
const MAX_REGEX_SIZE: usize = 256 * 1024;

/// Compile a user-supplied pattern under the safety bounds.
///
/// Patterns are case-insensitive. The error string is suitable for
/// configuration-time reporting.
pub fn compile_safe_regex(pattern: &str) -> Result<Regex, String> {
    let len = pattern.chars().count();
    if len > MAX_PATTERN_LEN {
        return Err(format!(
            "pattern is {len} characters, exceeding the {MAX_PATTERN_LEN}-character cap"
        ));
    }
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .size_limit(MAX_REGEX_SIZE)
        .build()
        .map_err(|e| format!("pattern does not compile: {e}"))
}

/// Validate a pattern under the same bounds the matcher applies.
pub fn check_pattern(pattern: &str) -> Result<(), String> {
    compile_safe_regex(pattern).map(|_| ())
}

/// Thread-local cache for compiled patterns to avoid recompilation on every
/// evaluation. Compile failures are cached as never-matching.
mod regex_cache {
    use super::compile_safe_regex;
    use regex::Regex;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use tracing::warn;

    thread_local! {
        static CACHE: RefCell<HashMap<String, Option<Regex>>> = RefCell::new(HashMap::new());
    }

    /// Check if `value` matches `pattern`, using a thread-local cache for
    /// compiled patterns.
    pub fn is_match_cached(pattern: &str, value: &str) -> bool {
        CACHE.with(|cache| {
            let mut cache = cache.borrow_mut();
            let entry = cache.entry(pattern.to_string()).or_insert_with(|| {
                match compile_safe_regex(pattern) {
                    Ok(re) => Some(re),
                    Err(e) => {
                        warn!(error = %e, "degrading pattern to never-matching");
                        None
                    }
                }
            });
            match entry {
                Some(re) => re.is_match(value),
                None => false,
            }
        })
    }
}

pub(crate) use regex_cache::is_match_cached;

/// Keyword match: substring test, case-folded unless case sensitivity is
/// requested.
pub fn keyword_matches(rule: &KeywordRule, content: &str) -> bool {
    if rule.keyword.is_empty() {
        return false;
    }
    if rule.case_sensitive {
        content.contains(&rule.keyword)
    } else {
        content
            .to_lowercase()
            .contains(&rule.keyword.to_lowercase())
    }
}

/// Pattern match under the safe engine. An uncompilable pattern never
/// matches and never aborts sibling rules.
pub fn pattern_matches(rule: &PatternRule, content: &str) -> bool {
    is_match_cached(&rule.pattern, content)
}

/// Fields whose values carry RFC 5322 style addresses and are compared
/// against the extracted address rather than the raw header value.
const ADDRESS_FIELDS: &[&str] = &["from", "to", "sender"];

/// Resolve a condition field from an event.
///
/// `content`, `source`, and `type` map to the event's own fields; anything
/// else is a metadata lookup. Returns `None` when the field is absent.
pub fn resolve_field(event: &Event, field: &str) -> Option<String> {
    let raw = match field {
        "content" => Some(event.content.clone()),
        "source" => Some(event.source.clone()),
        "type" => Some(event.event_type.clone()),
        other => event.meta_text(other),
    }?;
    if ADDRESS_FIELDS.contains(&field) {
        Some(extract_address(&raw).to_string())
    } else {
        Some(raw)
    }
}

/// Condition match: resolve the field, then apply the operator. An absent
/// field never matches.
pub fn condition_matches(rule: &ConditionRule, event: &Event) -> bool {
    let Some(actual) = resolve_field(event, &rule.field) else {
        return false;
    };
    let expected = &rule.value;
    match rule.operator {
        ConditionOperator::Equals => actual.to_lowercase() == expected.to_lowercase(),
        ConditionOperator::Contains => actual.contains(expected.as_str()),
        ConditionOperator::StartsWith => {
            actual.to_lowercase().starts_with(&expected.to_lowercase())
        }
        ConditionOperator::EndsWith => actual.to_lowercase().ends_with(&expected.to_lowercase()),
        ConditionOperator::GreaterThan => match numeric_pair(&actual, expected) {
            Some((a, b)) => a > b,
            None => false,
        },
        ConditionOperator::LessThan => match numeric_pair(&actual, expected) {
            Some((a, b)) => a < b,
            None => false,
        },
        ConditionOperator::Matches => is_match_cached(expected, &actual),
    }
}

/// Best-effort float parse of both sides; `None` when either side is not
/// numeric.
fn numeric_pair(actual: &str, expected: &str) -> Option<(f64, f64)> {
    let a = actual.trim().parse::<f64>().ok()?;
    let b = expected.trim().parse::<f64>().ok()?;
    Some((a, b))
}
