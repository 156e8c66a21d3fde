//! Integration test: the capture coordinator against scripted collaborators.
//!
//! Covers the two interleavings that matter (body-ready overtaking the rules
//! lookup, and a session stop overtaking a body fetch) plus the auto/manual
//! routing and the on-disk byte fidelity of staged content.

mod common;

use common::fakes::{json_response, Gate, MapBodies, RecordingSink, ScriptedStore};
use jsoncap_core::capture::{format_body, Coordinator, CoordinatorOptions, Notice, RequestOutcome};
use jsoncap_core::control::{ControlMessage, ControlReply};
use jsoncap_core::event::{NetworkEvent, ResponseEvent};
use jsoncap_core::filter::{IgnoreReason, Mode, WhitelistEntry};
use jsoncap_core::settings::{MemorySettingsStore, Settings, SettingsPatch, SettingsStore};
use jsoncap_core::sink::DirDownloadSink;
use std::sync::Arc;
use tempfile::tempdir;

fn settings(mode: Mode) -> Settings {
    Settings {
        mode,
        ..Settings::default()
    }
}

async fn coordinator(
    store: Arc<MemorySettingsStore>,
) -> (Coordinator, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let c = Coordinator::open(store, sink.clone(), CoordinatorOptions::default())
        .await
        .unwrap();
    (c, sink)
}

#[tokio::test]
async fn body_ready_during_rules_lookup_is_processed() {
    let gate = Arc::new(Gate::default());
    let store = Arc::new(
        ScriptedStore::new(MemorySettingsStore::new(settings(Mode::Manual))).gated(gate.clone()),
    );
    let sink = Arc::new(RecordingSink::default());
    gate.open(1);
    let c = Coordinator::open(store.clone(), sink, CoordinatorOptions::default())
        .await
        .unwrap();
    c.start(Arc::new(MapBodies::new(&[("1", r#"{"a":1}"#)])));

    let started = tokio::spawn({
        let c = c.clone();
        async move { c.handle_event(json_response("1", "https://x.test/api/a")).await }
    });
    let ready = tokio::spawn({
        let c = c.clone();
        async move { c.handle_event(NetworkEvent::body_ready("1")).await }
    });

    // Both tasks are parked on the rules lookup.
    gate.until_waiting(3).await;
    gate.open(2);

    assert_eq!(started.await.unwrap(), RequestOutcome::Pending);
    assert_eq!(ready.await.unwrap(), RequestOutcome::Staged);
    let staged = c.staged().await;
    assert_eq!(staged.len(), 1);
    assert_eq!(staged[0].url, "https://x.test/api/a");
    assert_eq!(store.snapshot().captured_requests, staged);
}

#[tokio::test]
async fn stop_discards_late_body_fetch() {
    let gate = Arc::new(Gate::default());
    let (c, sink) = coordinator(Arc::new(MemorySettingsStore::new(settings(Mode::Auto)))).await;
    c.start(Arc::new(MapBodies::new(&[("1", "{}")]).gated(gate.clone())));

    assert_eq!(
        c.handle_event(json_response("1", "https://x.test/api/a")).await,
        RequestOutcome::Pending
    );
    let ready = tokio::spawn({
        let c = c.clone();
        async move { c.handle_event(NetworkEvent::body_ready("1")).await }
    });
    gate.until_waiting(1).await;

    assert_eq!(c.stop(), 1);
    gate.open(1);

    assert_eq!(ready.await.unwrap(), RequestOutcome::Discarded);
    assert!(sink.saved().is_empty());
    assert!(c.staged().await.is_empty());
    assert_eq!(c.pending_len(), 0);
}

#[tokio::test]
async fn non_json_is_never_queued() {
    let (c, _) = coordinator(Arc::new(MemorySettingsStore::default())).await;
    c.start(Arc::new(MapBodies::default()));
    let outcome = c
        .handle_event(NetworkEvent::ResponseStarted(ResponseEvent::new(
            "1",
            "https://x.test/index.html",
            "text/html",
            200,
        )))
        .await;
    assert_eq!(outcome, RequestOutcome::Ignored(IgnoreReason::NotJson));
    let redirect = c
        .handle_event(NetworkEvent::ResponseStarted(ResponseEvent::new(
            "2",
            "https://x.test/api/a",
            "application/json",
            304,
        )))
        .await;
    assert_eq!(redirect, RequestOutcome::Ignored(IgnoreReason::Redirect(304)));
    assert_eq!(c.pending_len(), 0);
}

#[tokio::test]
async fn auto_mode_saves_with_prefix_and_pretty_body() {
    let store = Arc::new(MemorySettingsStore::new(Settings {
        filename_prefix: "shop".into(),
        ..settings(Mode::Auto)
    }));
    let (c, sink) = coordinator(store).await;
    let mut notices = c.subscribe();
    c.start(Arc::new(MapBodies::new(&[("1", r#"{"z":1,"a":2}"#)])));

    c.handle_event(json_response("1", "https://x.test/api/user/list?x=1"))
        .await;
    let outcome = c.handle_event(NetworkEvent::body_ready("1")).await;
    assert!(matches!(outcome, RequestOutcome::AutoDownloaded(_)));

    let saved = sink.saved();
    assert_eq!(saved.len(), 1);
    let (filename, content) = &saved[0];
    assert!(filename.starts_with("shop_"), "{filename}");
    assert!(filename.ends_with("_api_user_l.json"), "{filename}");
    assert_eq!(content, "{\n  \"z\": 1,\n  \"a\": 2\n}");
    assert!(c.staged().await.is_empty());

    match notices.try_recv().unwrap() {
        Notice::Downloaded { url, .. } => assert_eq!(url, "https://x.test/api/user/list?x=1"),
        other => panic!("expected Downloaded, got {other:?}"),
    }
}

#[tokio::test]
async fn manual_mode_saves_whitelisted_and_stages_the_rest() {
    let store = Arc::new(MemorySettingsStore::new(Settings {
        whitelist: vec![WhitelistEntry::new("/api/orders", "")],
        ..settings(Mode::Manual)
    }));
    let (c, sink) = coordinator(store).await;
    c.start(Arc::new(MapBodies::new(&[("1", "[1]"), ("2", "[2]")])));

    c.handle_event(json_response("1", "https://x.test/api/orders/7")).await;
    c.handle_event(json_response("2", "https://x.test/api/items")).await;
    assert!(matches!(
        c.handle_event(NetworkEvent::body_ready("1")).await,
        RequestOutcome::AutoDownloaded(_)
    ));
    assert_eq!(
        c.handle_event(NetworkEvent::body_ready("2")).await,
        RequestOutcome::Staged
    );
    assert_eq!(sink.saved().len(), 1);
    assert_eq!(c.staged().await[0].url, "https://x.test/api/items");
}

#[tokio::test]
async fn rules_are_read_again_at_body_ready() {
    let store = Arc::new(MemorySettingsStore::new(settings(Mode::Manual)));
    let (c, sink) = coordinator(store.clone()).await;
    c.start(Arc::new(MapBodies::new(&[("1", "{}")])));

    assert_eq!(
        c.handle_event(json_response("1", "https://x.test/api/a")).await,
        RequestOutcome::Pending
    );
    store
        .apply(SettingsPatch {
            blacklist: Some(vec!["/api/a".into()]),
            ..SettingsPatch::default()
        })
        .await
        .unwrap();
    assert_eq!(
        c.handle_event(NetworkEvent::body_ready("1")).await,
        RequestOutcome::Discarded
    );
    assert!(sink.saved().is_empty());
    assert!(c.staged().await.is_empty());
}

#[tokio::test]
async fn failed_auto_save_falls_back_to_staging() {
    let (c, sink) = coordinator(Arc::new(MemorySettingsStore::new(settings(Mode::Auto)))).await;
    sink.refuse_containing("secret");
    c.start(Arc::new(MapBodies::new(&[("1", r#"{"k":"secret"}"#)])));

    c.handle_event(json_response("1", "https://x.test/api/a")).await;
    assert_eq!(
        c.handle_event(NetworkEvent::body_ready("1")).await,
        RequestOutcome::Staged
    );
    let staged = c.staged().await;
    assert_eq!(staged.len(), 1);
    assert_eq!(staged[0].content, "{\n  \"k\": \"secret\"\n}");
}

#[tokio::test]
async fn staged_content_downloads_byte_identical() {
    let dir = tempdir().unwrap();
    let store = Arc::new(MemorySettingsStore::new(settings(Mode::Manual)));
    let c = Coordinator::open(
        store,
        Arc::new(DirDownloadSink::new(dir.path())),
        CoordinatorOptions::default(),
    )
    .await
    .unwrap();
    let raw = r#"{"b":[1,2.5,-0.0,1e300],"a":null,"ü":"é \"q\""}"#;
    c.start(Arc::new(MapBodies::new(&[("1", raw), ("2", "not { json")])));
    for id in ["1", "2"] {
        c.handle_event(json_response(id, &format!("https://x.test/api/{id}")))
            .await;
        c.handle_event(NetworkEvent::body_ready(id)).await;
    }

    let staged = c.staged().await;
    assert_eq!(staged.len(), 2);
    assert_eq!(format_body(&staged[0].content), staged[0].content);
    assert_eq!(staged[1].content, "not { json");

    assert_eq!(
        c.handle_control(ControlMessage::DownloadAll).await,
        ControlReply::Downloaded { count: 2, failed: 0 }
    );
    let mut files: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    files.sort();
    let mut written: Vec<Vec<u8>> = files.iter().map(|p| std::fs::read(p).unwrap()).collect();
    written.sort();
    let mut expected: Vec<Vec<u8>> = staged.iter().map(|i| i.content.clone().into_bytes()).collect();
    expected.sort();
    assert_eq!(written, expected);
    assert!(c.staged().await.is_empty());
}
