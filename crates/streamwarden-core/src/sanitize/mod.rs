//! Input sanitization for externally-sourced event content.
//!
//! Event content is attacker-influenced: anyone can send the monitored
//! mailbox an email. Before content reaches matching (or, for custom
//! prompts, a one-time rule-generation call), it is length-capped, scanned
//! against a fixed deny-list of injection-style patterns, and stripped of
//! control characters. A deny-list hit fails closed: the content is
//! discarded entirely, never partially redacted.

pub mod url;

use std::sync::LazyLock;

use aho_corasick::AhoCorasick;
use regex::Regex;
use serde::Serialize;
use tracing::warn;

/// Hard cap on event content length in characters.
pub const MAX_EVENT_CONTENT_CHARS: usize = 50_000;

/// Stricter cap for user-authored prompt text bound for rule generation.
pub const MAX_CUSTOM_PROMPT_CHARS: usize = 5_000;

/// Outcome of sanitizing one piece of text.
///
/// Sanitization never fails; callers must check `blocked` before processing
/// further. When `blocked` is true the sanitized text is always empty.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizeResult {
    pub valid: bool,
    pub sanitized: String,
    pub warnings: Vec<String>,
    pub blocked: bool,
    pub reason: Option<String>,
}

struct DenyPattern {
    name: &'static str,
    regex: &'static str,
}

/// Injection-style phrasings that block content outright.
const DENY_PATTERNS: &[DenyPattern] = &[
    DenyPattern {
        name: "instruction_override",
        regex: r"(?i)(ignore|disregard|forget|override)\s+.{0,40}(previous|above|prior|earlier|original|all)\s*.{0,20}(instructions?|prompts?|rules|guidelines|directives)",
    },
    DenyPattern {
        name: "do_not_follow",
        regex: r"(?i)do\s+not\s+follow\s+(your|the)\s+(previous|original|system)",
    },
    DenyPattern {
        name: "role_override_you_are_now",
        regex: r"(?i)\byou\s+are\s+now\b",
    },
    DenyPattern {
        name: "role_override_act_as",
        regex: r"(?i)\b(act\s+as|pretend\s+to\s+be|roleplay\s+as|simulate\s+being)\b",
    },
    DenyPattern {
        name: "role_override_new_role",
        regex: r"(?i)\byour\s+(new\s+)?(role|persona)\s+is\b",
    },
    DenyPattern {
        name: "new_instructions",
        regex: r"(?i)\bnew\s+instructions?\s*[:=]",
    },
    DenyPattern {
        name: "system_prompt_leak",
        regex: r"(?i)(print|output|reveal|show|display|repeat|leak)\s+(your\s+|the\s+)?(system\s+prompt|system\s+message|initial\s+instructions|hidden\s+instructions)",
    },
    DenyPattern {
        name: "chat_control_tokens",
        regex: r"(?i)(<\|im_start\|>|<\|im_end\|>|<\|endoftext\|>|\[INST\]|\[/INST\]|</?system\s*>)",
    },
];

/// Literal fragments for the Aho-Corasick prefilter. Every deny pattern
/// requires at least one of these to appear (case-insensitively) in any
/// text it can match, so a prefilter miss proves the regex pass would find
/// nothing.
const PREFILTER_LITERALS: &[&str] = &[
    "ignore",
    "disregard",
    "forget",
    "override",
    "follow",
    "now",
    "act",
    "pretend",
    "roleplay",
    "simulate",
    "role",
    "persona",
    "instruction",
    "system",
    "im_start",
    "im_end",
    "endoftext",
    "inst",
];

struct CompiledDenySet {
    patterns: Vec<(&'static str, Regex)>,
    /// `None` means the automaton failed to build; the regex pass then runs
    /// unconditionally.
    prefilter: Option<AhoCorasick>,
}

impl CompiledDenySet {
    fn compile() -> Self {
        let patterns = DENY_PATTERNS
            .iter()
            .filter_map(|p| Regex::new(p.regex).ok().map(|re| (p.name, re)))
            .collect();
        let prefilter = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(PREFILTER_LITERALS)
            .ok();
        Self { patterns, prefilter }
    }

    /// Name of the first deny pattern that matches, if any.
    fn first_hit(&self, text: &str) -> Option<&'static str> {
        if let Some(pre) = &self.prefilter {
            if !pre.is_match(text) {
                return None;
            }
        }
        self.patterns
            .iter()
            .find(|(_, re)| re.is_match(text))
            .map(|(name, _)| *name)
    }
}

static DENY_SET: LazyLock<CompiledDenySet> = LazyLock::new(CompiledDenySet::compile);

/// Sanitize raw event content before rule matching.
pub fn sanitize_event_content(text: &str) -> SanitizeResult {
    sanitize_with_cap(text, MAX_EVENT_CONTENT_CHARS)
}

/// Sanitize user-authored free text bound for the one-time rule-generation
/// call. Same contract as [`sanitize_event_content`] with a stricter cap.
pub fn sanitize_custom_prompt(text: &str) -> SanitizeResult {
    sanitize_with_cap(text, MAX_CUSTOM_PROMPT_CHARS)
}

fn sanitize_with_cap(text: &str, cap: usize) -> SanitizeResult {
    let mut warnings = Vec::new();

    // Truncate before scanning so pathological inputs stay bounded.
    let char_count = text.chars().count();
    let text: String = if char_count > cap {
        warnings.push(format!(
            "content truncated from {char_count} to {cap} characters"
        ));
        text.chars().take(cap).collect()
    } else {
        text.to_string()
    };

    // Deny-list scan fails closed: a hit discards everything.
    if let Some(name) = DENY_SET.first_hit(&text) {
        warn!(pattern = name, "sanitizer blocked content");
        return SanitizeResult {
            valid: false,
            sanitized: String::new(),
            warnings,
            blocked: true,
            reason: Some(format!("content matched deny pattern '{name}'")),
        };
    }

    let (stripped, removed) = strip_controls(&text);
    if removed > 0 {
        warnings.push(format!("removed {removed} control characters"));
    }
    let sanitized = collapse_blank_lines(&stripped);

    SanitizeResult {
        valid: true,
        sanitized,
        warnings,
        blocked: false,
        reason: None,
    }
}

/// Remove control characters (keeping newline and tab) and Unicode
/// bidirectional overrides. Returns the cleaned text and how many
/// characters were dropped.
fn strip_controls(text: &str) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut removed = 0usize;
    for ch in text.chars() {
        let keep = match ch {
            '\n' | '\t' => true,
            c if c.is_control() => false,
            c if is_bidi_control(c) => false,
            _ => true,
        };
        if keep {
            out.push(ch);
        } else {
            removed += 1;
        }
    }
    (out, removed)
}

/// Check if a character is a Unicode bidirectional control character.
fn is_bidi_control(ch: char) -> bool {
    matches!(
        ch,
        '\u{202A}' // LEFT-TO-RIGHT EMBEDDING
        | '\u{202B}' // RIGHT-TO-LEFT EMBEDDING
        | '\u{202C}' // POP DIRECTIONAL FORMATTING
        | '\u{202D}' // LEFT-TO-RIGHT OVERRIDE
        | '\u{202E}' // RIGHT-TO-LEFT OVERRIDE
        | '\u{2066}' // LEFT-TO-RIGHT ISOLATE
        | '\u{2067}' // RIGHT-TO-LEFT ISOLATE
        | '\u{2068}' // FIRST STRONG ISOLATE
        | '\u{2069}' // POP DIRECTIONAL ISOLATE
        | '\u{200F}' // RIGHT-TO-LEFT MARK
        | '\u{200E}' // LEFT-TO-RIGHT MARK
    )
}

static BLANK_RUN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(\n[ \t]*){3,}").ok());

/// Collapse runs of three or more (possibly whitespace-only) blank lines
/// down to one blank line, and trim trailing whitespace.
fn collapse_blank_lines(text: &str) -> String {
    let collapsed = match BLANK_RUN.as_ref() {
        Some(re) => re.replace_all(text, "\n\n").into_owned(),
        None => text.to_string(),
    };
    collapsed.trim_end().to_string()
}
