//! Rule set snapshot consumed by the filter.

use serde::{Deserialize, Serialize};

/// Capture mode.
///
/// `Auto` saves everything that survives the noise and blacklist gates.
/// `Manual` saves only whitelisted urls and stages the rest for review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Auto,
    Manual,
}

/// A whitelist keyword with an optional note.
///
/// Stored settings may hold either a bare string or `{keyword, memo}`; both
/// deserialize into this shape and always serialize as the object form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WhitelistRepr")]
pub struct WhitelistEntry {
    pub keyword: String,
    pub memo: String,
}

impl WhitelistEntry {
    pub fn new(keyword: impl Into<String>, memo: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            memo: memo.into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WhitelistRepr {
    Keyword(String),
    Entry {
        keyword: String,
        #[serde(default)]
        memo: Option<String>,
    },
}

impl From<WhitelistRepr> for WhitelistEntry {
    fn from(repr: WhitelistRepr) -> Self {
        match repr {
            WhitelistRepr::Keyword(keyword) => WhitelistEntry::new(keyword, ""),
            WhitelistRepr::Entry { keyword, memo } => {
                WhitelistEntry::new(keyword, memo.unwrap_or_default())
            }
        }
    }
}

/// Immutable view of the filtering settings for one decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    pub mode: Mode,
    pub smart_filter: bool,
    pub whitelist: Vec<WhitelistEntry>,
    pub blacklist: Vec<String>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            mode: Mode::Auto,
            smart_filter: true,
            whitelist: Vec::new(),
            blacklist: Vec::new(),
        }
    }
}

impl RuleSet {
    /// First blacklist keyword contained in `url`. Empty keywords never match.
    pub fn blacklist_hit(&self, url: &str) -> Option<&str> {
        self.blacklist
            .iter()
            .map(String::as_str)
            .find(|k| !k.is_empty() && url.contains(k))
    }

    pub fn is_whitelisted(&self, url: &str) -> bool {
        self.whitelist
            .iter()
            .any(|w| !w.keyword.is_empty() && url.contains(w.keyword.as_str()))
    }
}
