//! Whitelist/blacklist edits. Keywords stay unique within their own list.

use crate::filter::WhitelistEntry;

/// Keyword derived from a captured url when blocking or allowing it: the path.
///
/// `None` when the url does not parse; callers treat that as a no-op.
pub fn path_keyword(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    Some(parsed.path().to_string())
}

/// Append `keyword` unless present or blank. Returns true if the list changed.
pub fn add_blacklist(blacklist: &mut Vec<String>, keyword: &str) -> bool {
    let keyword = keyword.trim();
    if keyword.is_empty() || blacklist.iter().any(|k| k == keyword) {
        return false;
    }
    blacklist.push(keyword.to_string());
    true
}

/// Append `{keyword, memo}` unless the keyword is present or blank.
pub fn add_whitelist(whitelist: &mut Vec<WhitelistEntry>, keyword: &str, memo: &str) -> bool {
    let keyword = keyword.trim();
    if keyword.is_empty() || whitelist.iter().any(|w| w.keyword == keyword) {
        return false;
    }
    whitelist.push(WhitelistEntry::new(keyword, memo.trim()));
    true
}

pub fn remove_blacklist(blacklist: &mut Vec<String>, keyword: &str) -> bool {
    let before = blacklist.len();
    blacklist.retain(|k| k != keyword);
    blacklist.len() != before
}

pub fn remove_whitelist(whitelist: &mut Vec<WhitelistEntry>, keyword: &str) -> bool {
    let before = whitelist.len();
    whitelist.retain(|w| w.keyword != keyword);
    whitelist.len() != before
}

/// Result of editing a rule in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleEdit {
    Updated,
    /// The new values equal the old ones.
    Unchanged,
    NotFound,
    BlankKeyword,
    /// Another entry in the same list already has the new keyword.
    DuplicateKeyword,
}

impl RuleEdit {
    pub fn changed(self) -> bool {
        self == RuleEdit::Updated
    }
}

/// Rename the entry `keyword` to `new_keyword`, keeping its position.
pub fn edit_blacklist(blacklist: &mut [String], keyword: &str, new_keyword: &str) -> RuleEdit {
    let Some(index) = blacklist.iter().position(|k| k == keyword) else {
        return RuleEdit::NotFound;
    };
    let new_keyword = new_keyword.trim();
    if new_keyword.is_empty() {
        return RuleEdit::BlankKeyword;
    }
    if new_keyword == blacklist[index] {
        return RuleEdit::Unchanged;
    }
    if blacklist.iter().any(|k| k == new_keyword) {
        return RuleEdit::DuplicateKeyword;
    }
    blacklist[index] = new_keyword.to_string();
    RuleEdit::Updated
}

/// Change the keyword and/or memo of the entry `keyword` in place.
/// `None` keeps the current value; an empty memo clears it.
pub fn edit_whitelist(
    whitelist: &mut [WhitelistEntry],
    keyword: &str,
    new_keyword: Option<&str>,
    memo: Option<&str>,
) -> RuleEdit {
    let Some(index) = whitelist.iter().position(|w| w.keyword == keyword) else {
        return RuleEdit::NotFound;
    };
    let next_keyword = match new_keyword.map(str::trim) {
        Some("") => return RuleEdit::BlankKeyword,
        Some(k) => k,
        None => keyword,
    };
    if whitelist
        .iter()
        .enumerate()
        .any(|(i, w)| i != index && w.keyword == next_keyword)
    {
        return RuleEdit::DuplicateKeyword;
    }
    let next = WhitelistEntry::new(
        next_keyword,
        memo.map(str::trim).unwrap_or(whitelist[index].memo.as_str()),
    );
    if next == whitelist[index] {
        return RuleEdit::Unchanged;
    }
    whitelist[index] = next;
    RuleEdit::Updated
}
