//! Rule export/import as a standalone JSON document.
//!
//! Export writes `{whitelist, blacklist, exportedAt}`. Import replaces each
//! list that is present as an array and leaves the other alone; a document
//! with neither is rejected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::{Settings, SettingsPatch};
use crate::filter::WhitelistEntry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesExport {
    pub whitelist: Vec<WhitelistEntry>,
    pub blacklist: Vec<String>,
    pub exported_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("invalid settings document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("settings document has neither a whitelist nor a blacklist")]
    NoRules,
}

pub fn export_rules(settings: &Settings, now: DateTime<Utc>) -> RulesExport {
    RulesExport {
        whitelist: settings.whitelist.clone(),
        blacklist: settings.blacklist.clone(),
        exported_at: now,
    }
}

/// Default export file name, e.g. `jsoncap_settings_2024-01-02.json`.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("jsoncap_settings_{}.json", now.format("%Y-%m-%d"))
}

/// Parse an exported document into the patch that imports it.
pub fn import_patch(json: &str) -> Result<SettingsPatch, TransferError> {
    let doc: Value = serde_json::from_str(json)?;
    let mut patch = SettingsPatch::default();
    if let Some(list @ Value::Array(_)) = doc.get("whitelist") {
        patch.whitelist = Some(serde_json::from_value(list.clone())?);
    }
    if let Some(list @ Value::Array(_)) = doc.get("blacklist") {
        patch.blacklist = Some(serde_json::from_value(list.clone())?);
    }
    if patch.is_empty() {
        return Err(TransferError::NoRules);
    }
    Ok(patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn export_then_import_restores_lists() {
        let settings = Settings {
            whitelist: vec![WhitelistEntry::new("/api", "m")],
            blacklist: vec!["/ads".into()],
            ..Settings::default()
        };
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let doc = serde_json::to_string_pretty(&export_rules(&settings, now)).unwrap();
        assert!(doc.contains("exportedAt"));
        let patch = import_patch(&doc).unwrap();
        assert_eq!(patch.whitelist, Some(settings.whitelist.clone()));
        assert_eq!(patch.blacklist, Some(settings.blacklist.clone()));
        assert!(patch.captured_requests.is_none());
        assert_eq!(export_file_name(now), "jsoncap_settings_2024-01-02.json");
    }

    #[test]
    fn import_single_list_and_legacy_entries() {
        let patch = import_patch(r#"{"whitelist": ["wehago", {"keyword": "/x", "memo": "y"}]}"#)
            .unwrap();
        assert_eq!(
            patch.whitelist.unwrap(),
            vec![WhitelistEntry::new("wehago", ""), WhitelistEntry::new("/x", "y")]
        );
        assert!(patch.blacklist.is_none());
    }

    #[test]
    fn import_rejects_documents_without_lists() {
        assert!(matches!(
            import_patch(r#"{"whitelist": "nope", "other": []}"#),
            Err(TransferError::NoRules)
        ));
        assert!(matches!(import_patch("not json"), Err(TransferError::Parse(_))));
    }
}
