//! # streamwarden-core
//!
//! Core engine for Streamwarden -- rules-based monitoring of externally
//! sourced event streams (inbound mail, calendar notifications, webhook
//! payloads).
//!
//! Given one event and one immutable rule-set snapshot, the engine matches
//! keywords, regular expressions, and field conditions, resolves an alert
//! severity, renders a templated alert, and gates an optional rate-limited
//! automated reply. Evaluation is pure and synchronous: no I/O, no shared
//! mutable state, safe to run for arbitrarily many events in parallel. The
//! only long-lived state is the reply rate-limit record, which callers must
//! persist between invocations.

pub mod alert;
pub mod config;
pub mod event;
pub mod reply;
pub mod rules;
pub mod sanitize;
