//! Control messages applied to a running coordinator.

use crate::control::{ControlMessage, ControlReply};
use crate::settings::rules::{add_blacklist, add_whitelist, path_keyword};
use crate::settings::{Settings, SettingsPatch};
use crate::staging::StagingList;

use super::coordinator::Coordinator;
use super::notice::Notice;

/// Which rule list a block/allow goes into.
enum RuleTarget<'a> {
    Blacklist,
    Whitelist { memo: &'a str },
}

impl Coordinator {
    pub async fn handle_control(&self, message: ControlMessage) -> ControlReply {
        match message {
            ControlMessage::DownloadAll => self.download_all().await,
            ControlMessage::DownloadOne { index } => self.download_one(index).await,
            ControlMessage::ClearList => self.clear_list().await,
            ControlMessage::BlockUrl { url } => self.add_rule(&url, RuleTarget::Blacklist).await,
            ControlMessage::AllowUrl { url, memo } => {
                self.add_rule(&url, RuleTarget::Whitelist { memo: &memo })
                    .await
            }
            ControlMessage::GetRecordingStatus => ControlReply::RecordingStatus {
                is_recording: self.is_recording(),
            },
        }
    }

    async fn download_one(&self, index: usize) -> ControlReply {
        let mut staging = self.inner.staging.lock().await;
        let item = match staging.get(index) {
            Ok(item) => item.clone(),
            Err(e) => {
                tracing::debug!("download skipped: {}", e);
                return ControlReply::NotFound { index };
            }
        };
        let prefix = match self.prefix().await {
            Ok(prefix) => prefix,
            Err(e) => return ControlReply::Failed { message: e.to_string() },
        };
        if self.save_item(&item, &prefix).await.is_none() {
            return ControlReply::Downloaded { count: 0, failed: 1 };
        }
        // Still at `index`: the list is locked.
        if staging.remove(index).is_ok() {
            self.persist_locked(&mut staging).await;
        }
        ControlReply::Downloaded { count: 1, failed: 0 }
    }

    async fn download_all(&self) -> ControlReply {
        let mut staging = self.inner.staging.lock().await;
        if staging.is_empty() {
            return ControlReply::Downloaded { count: 0, failed: 0 };
        }
        let prefix = match self.prefix().await {
            Ok(prefix) => prefix,
            Err(e) => return ControlReply::Failed { message: e.to_string() },
        };

        let mut remaining = Vec::new();
        let mut count = 0;
        for item in staging.to_vec() {
            match self.save_item(&item, &prefix).await {
                Some(_) => count += 1,
                None => remaining.push(item),
            }
        }
        let failed = remaining.len();
        if count > 0 {
            let capacity = staging.capacity();
            *staging = StagingList::with_items(remaining, capacity);
            self.persist_locked(&mut staging).await;
        }
        tracing::info!(count, failed, "download all finished");
        ControlReply::Downloaded { count, failed }
    }

    async fn clear_list(&self) -> ControlReply {
        let mut staging = self.inner.staging.lock().await;
        let dropped = staging.clear();
        tracing::info!(dropped, "staging list cleared");
        self.persist_locked(&mut staging).await;
        ControlReply::Ok
    }

    /// Block or allow the url's path, then purge staged items that contain it.
    /// Rules and list are written in one patch.
    async fn add_rule(&self, url: &str, target: RuleTarget<'_>) -> ControlReply {
        let Some(keyword) = path_keyword(url) else {
            tracing::warn!(%url, "not a url; rule not added");
            return ControlReply::InvalidUrl {
                url: url.to_string(),
            };
        };

        let mut staging = self.inner.staging.lock().await;
        let settings = match self.inner.store.load().await {
            Ok(settings) => settings,
            Err(e) => return ControlReply::Failed { message: e.to_string() },
        };
        let rules = rules_patch(settings, &keyword, &target);
        let purged = staging.remove_matching(&keyword);
        tracing::info!(%keyword, purged, "rule added");

        let patch = SettingsPatch {
            captured_requests: Some(staging.to_vec()),
            ..rules.clone()
        };
        match self.inner.store.apply(patch).await {
            Ok(()) => {
                self.notify(Notice::ListUpdated(staging.to_vec()));
                ControlReply::Ok
            }
            Err(e) if e.is_quota_exceeded() => {
                // Rules first, then the list through the usual recovery.
                if let Err(e) = self.inner.store.apply(rules).await {
                    tracing::error!("saving rules failed: {}", e);
                    return ControlReply::Failed { message: e.to_string() };
                }
                self.persist_locked(&mut staging).await;
                ControlReply::Ok
            }
            Err(e) => {
                tracing::error!("saving rules failed: {}", e);
                ControlReply::Failed { message: e.to_string() }
            }
        }
    }
}

fn rules_patch(settings: Settings, keyword: &str, target: &RuleTarget<'_>) -> SettingsPatch {
    match target {
        RuleTarget::Blacklist => {
            let mut blacklist = settings.blacklist;
            add_blacklist(&mut blacklist, keyword);
            SettingsPatch {
                blacklist: Some(blacklist),
                ..SettingsPatch::default()
            }
        }
        RuleTarget::Whitelist { memo } => {
            let mut whitelist = settings.whitelist;
            add_whitelist(&mut whitelist, keyword, memo);
            SettingsPatch {
                whitelist: Some(whitelist),
                ..SettingsPatch::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CoordinatorOptions;
    use crate::settings::MemorySettingsStore;
    use crate::sink::{DirDownloadSink, DownloadSink};
    use crate::staging::CapturedItem;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn item(url: &str, content: &str) -> CapturedItem {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        CapturedItem::new(url, content, at)
    }

    async fn seeded(
        items: Vec<CapturedItem>,
    ) -> (Coordinator, Arc<MemorySettingsStore>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemorySettingsStore::new(Settings {
            captured_requests: items,
            ..Settings::default()
        }));
        let sink: Arc<dyn DownloadSink> = Arc::new(DirDownloadSink::new(dir.path()));
        let c = Coordinator::open(store.clone(), sink, CoordinatorOptions::default())
            .await
            .unwrap();
        (c, store, dir)
    }

    #[tokio::test]
    async fn block_url_adds_path_and_purges() {
        let (c, store, _dir) = seeded(vec![
            item("https://x.test/api/foo?a=1", "1"),
            item("https://x.test/api/bar", "2"),
            item("https://y.test/api/foo/deep", "3"),
        ])
        .await;
        let reply = c
            .handle_control(ControlMessage::BlockUrl {
                url: "https://x.test/api/foo?q=2".into(),
            })
            .await;
        assert_eq!(reply, ControlReply::Ok);

        let saved = store.snapshot();
        assert_eq!(saved.blacklist, vec!["/api/foo".to_string()]);
        assert_eq!(saved.captured_requests.len(), 1);
        assert_eq!(saved.captured_requests[0].url, "https://x.test/api/bar");
        assert_eq!(c.staged().await, saved.captured_requests);
    }

    #[tokio::test]
    async fn allow_url_records_memo_once() {
        let (c, store, _dir) = seeded(vec![item("https://x.test/api/foo", "1")]).await;
        for _ in 0..2 {
            c.handle_control(ControlMessage::AllowUrl {
                url: "https://x.test/api/foo".into(),
                memo: "orders".into(),
            })
            .await;
        }
        let saved = store.snapshot();
        assert_eq!(saved.whitelist.len(), 1);
        assert_eq!(saved.whitelist[0].keyword, "/api/foo");
        assert_eq!(saved.whitelist[0].memo, "orders");
        assert!(saved.captured_requests.is_empty());
    }

    #[tokio::test]
    async fn invalid_url_is_a_no_op() {
        let (c, store, _dir) = seeded(vec![item("https://x.test/api/foo", "1")]).await;
        let reply = c
            .handle_control(ControlMessage::BlockUrl {
                url: "not a url".into(),
            })
            .await;
        assert!(matches!(reply, ControlReply::InvalidUrl { .. }));
        assert!(store.snapshot().blacklist.is_empty());
        assert_eq!(c.staged().await.len(), 1);
    }

    #[tokio::test]
    async fn download_one_writes_and_removes() {
        let (c, store, dir) = seeded(vec![
            item("https://x.test/api/a", "{\n  \"a\": 1\n}"),
            item("https://x.test/api/b", "B"),
        ])
        .await;
        assert_eq!(
            c.handle_control(ControlMessage::DownloadOne { index: 5 }).await,
            ControlReply::NotFound { index: 5 }
        );
        assert_eq!(
            c.handle_control(ControlMessage::DownloadOne { index: 0 }).await,
            ControlReply::Downloaded { count: 1, failed: 0 }
        );
        let written = std::fs::read_to_string(dir.path().join("20240102_030405_000_api_a.json"))
            .unwrap();
        assert_eq!(written, "{\n  \"a\": 1\n}");
        let saved = store.snapshot();
        assert_eq!(saved.captured_requests.len(), 1);
        assert_eq!(saved.captured_requests[0].url, "https://x.test/api/b");
    }

    #[tokio::test]
    async fn download_all_empties_the_list() {
        let (c, store, dir) = seeded(vec![
            item("https://x.test/api/a", "A"),
            item("https://x.test/api/a", "A2"),
        ])
        .await;
        assert_eq!(
            c.handle_control(ControlMessage::DownloadAll).await,
            ControlReply::Downloaded { count: 2, failed: 0 }
        );
        assert!(store.snapshot().captured_requests.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn clear_and_status() {
        let (c, store, _dir) = seeded(vec![item("https://x.test/api/a", "A")]).await;
        assert_eq!(c.handle_control(ControlMessage::ClearList).await, ControlReply::Ok);
        assert!(store.snapshot().captured_requests.is_empty());
        assert_eq!(
            c.handle_control(ControlMessage::GetRecordingStatus).await,
            ControlReply::RecordingStatus {
                is_recording: false
            }
        );
    }
}
