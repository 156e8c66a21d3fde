//! The decision function itself.

use std::fmt;

use crate::event::ResponseEvent;

use super::noise::noise_hit;
use super::rules::{Mode, RuleSet};

/// Why a response was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Mime type does not mention json.
    NotJson,
    /// 3xx status.
    Redirect(u16),
    /// 204 or 205.
    NoContent(u16),
    /// Url matched a noise keyword.
    SmartFilter(&'static str),
    /// Url matched a blacklist keyword.
    Blacklisted(String),
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::NotJson => write!(f, "not json"),
            IgnoreReason::Redirect(code) => write!(f, "redirect ({code})"),
            IgnoreReason::NoContent(code) => write!(f, "no content ({code})"),
            IgnoreReason::SmartFilter(k) => write!(f, "smart filter hit: {k}"),
            IgnoreReason::Blacklisted(k) => write!(f, "blacklist hit: {k}"),
        }
    }
}

/// Outcome of filtering one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Ignore(IgnoreReason),
    /// Keep for review in the staging list.
    Stage,
    /// Download right away.
    AutoSave,
}

impl Decision {
    pub fn is_ignore(&self) -> bool {
        matches!(self, Decision::Ignore(_))
    }
}

/// Type/status gate. Runs on response start, before any body is fetched.
pub fn type_gate(response: &ResponseEvent) -> Option<IgnoreReason> {
    if !response.mime_type.contains("json") {
        return Some(IgnoreReason::NotJson);
    }
    match response.status_code {
        code @ 300..=399 => Some(IgnoreReason::Redirect(code)),
        code @ (204 | 205) => Some(IgnoreReason::NoContent(code)),
        _ => None,
    }
}

/// Full decision for `response` under `rules`.
pub fn decide(response: &ResponseEvent, rules: &RuleSet) -> Decision {
    if let Some(reason) = type_gate(response) {
        return Decision::Ignore(reason);
    }

    let url = response.url.as_str();
    if rules.smart_filter {
        if let Some(keyword) = noise_hit(url) {
            return Decision::Ignore(IgnoreReason::SmartFilter(keyword));
        }
    }
    if let Some(keyword) = rules.blacklist_hit(url) {
        return Decision::Ignore(IgnoreReason::Blacklisted(keyword.to_string()));
    }

    match rules.mode {
        Mode::Auto => Decision::AutoSave,
        Mode::Manual if rules.is_whitelisted(url) => Decision::AutoSave,
        Mode::Manual => Decision::Stage,
    }
}
