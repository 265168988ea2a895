//! End-to-end briefing flow with mocked generation providers, a clocked
//! audio engine and in-memory SQLite history.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bridge_desktop::{ClockedAudioEngine, SqliteSettingsStore, TokioFileSystem};
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::generation::{SpeechProvider, SummaryLength, SummaryProvider};
use bridge_traits::storage::SettingsStore;
use core_playback::{codec, PlayerState};
use core_runtime::config::{AudioSettings, HistorySettings};
use core_runtime::events::{drain, BriefingEvent, CoreEvent, EventBus};
use core_service::{
    BriefingService, CoreDependencies, CoreError, FocusTarget, KeyCode, KeyEvent, Shortcut, Stage,
};
use mockall::{mock, Sequence};

mock! {
    Summary {}

    #[async_trait::async_trait]
    impl SummaryProvider for Summary {
        async fn summarize(&self, article: &str, length: SummaryLength) -> BridgeResult<String>;
    }
}

mock! {
    Speech {}

    #[async_trait::async_trait]
    impl SpeechProvider for Speech {
        async fn synthesize(&self, text: &str) -> BridgeResult<String>;
    }
}

const SUMMARY: &str = "Central bank holds rates; markets calm.";

/// Ten seconds of mono silence at 24 kHz, long enough to stay playing
/// for the duration of a test.
fn long_payload() -> String {
    codec::encode(&vec![0u8; 480_000])
}

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("briefing-{}-{}", name, std::process::id()))
}

struct Harness {
    service: BriefingService,
    settings: Arc<SqliteSettingsStore>,
    engine: Arc<ClockedAudioEngine>,
}

async fn harness(summary: MockSummary, speech: MockSpeech, downloads: PathBuf) -> Harness {
    let settings = Arc::new(SqliteSettingsStore::in_memory().await.unwrap());
    let engine = Arc::new(ClockedAudioEngine::new());
    let deps = CoreDependencies::new(
        Arc::new(summary),
        Arc::new(speech),
        settings.clone(),
        engine.clone(),
        Arc::new(TokioFileSystem::with_download_directory(downloads)),
    );

    let service = BriefingService::start(
        deps,
        AudioSettings::default(),
        HistorySettings::default(),
        EventBus::new(64),
    )
    .await
    .unwrap();

    Harness {
        service,
        settings,
        engine,
    }
}

fn succeeding_providers() -> (MockSummary, MockSpeech) {
    let mut summary = MockSummary::new();
    summary
        .expect_summarize()
        .returning(|_, _| Ok(SUMMARY.to_string()));

    let mut speech = MockSpeech::new();
    speech.expect_synthesize().returning(|_| Ok(long_payload()));

    (summary, speech)
}

async fn wait_for_state(service: &BriefingService, expected: PlayerState) {
    for _ in 0..200 {
        if service.status().await.state == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("player never reached {:?}", expected);
}

// ============================================================================
// Generation
// ============================================================================

#[tokio::test]
async fn test_empty_article_makes_no_requests() {
    let mut summary = MockSummary::new();
    summary.expect_summarize().never();
    let mut speech = MockSpeech::new();
    speech.expect_synthesize().never();

    let h = harness(summary, speech, temp_dir("empty")).await;

    let err = h
        .service
        .generate("   \n\t", SummaryLength::Medium)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::EmptyArticle));
    assert_eq!(err.user_message(), "Please paste an article first.");
}

#[tokio::test]
async fn test_summary_requested_before_speech() {
    let mut seq = Sequence::new();

    let mut summary = MockSummary::new();
    summary
        .expect_summarize()
        .withf(|article, length| article.contains("rates") && *length == SummaryLength::Short)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(SUMMARY.to_string()));

    let mut speech = MockSpeech::new();
    speech
        .expect_synthesize()
        .withf(|text| text == SUMMARY)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(long_payload()));

    let h = harness(summary, speech, temp_dir("order")).await;
    let mut events = h.service.subscribe();

    let entry = h
        .service
        .generate("The central bank left rates unchanged.", SummaryLength::Short)
        .await
        .unwrap();
    assert_eq!(entry.summary_text, SUMMARY);

    let briefing: Vec<BriefingEvent> = drain(&mut events)
        .into_iter()
        .filter_map(|e| match e {
            CoreEvent::Briefing(event) => Some(event),
            _ => None,
        })
        .collect();
    assert!(matches!(briefing[0], BriefingEvent::SummaryRequested { .. }));
    assert!(matches!(briefing[1], BriefingEvent::SummaryReady { .. }));
    assert_eq!(briefing[2], BriefingEvent::SpeechRequested);
    assert!(matches!(briefing[3], BriefingEvent::SpeechReady { .. }));
    assert_eq!(
        briefing[4],
        BriefingEvent::Completed {
            entry_id: entry.id.clone()
        }
    );
}

#[tokio::test]
async fn test_speech_failure_saves_nothing() {
    let mut summary = MockSummary::new();
    summary
        .expect_summarize()
        .returning(|_, _| Ok(SUMMARY.to_string()));
    let mut speech = MockSpeech::new();
    speech
        .expect_synthesize()
        .returning(|_| Err(BridgeError::OperationFailed("No audio data received from API.".into())));

    let h = harness(summary, speech, temp_dir("speech-fail")).await;

    let err = h
        .service
        .generate("Article", SummaryLength::Medium)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Upstream {
            stage: Stage::Speech,
            ..
        }
    ));
    assert_eq!(
        err.user_message(),
        "Failed to generate audio summary. Please try again."
    );

    assert!(h.service.history().is_empty().await);
    assert!(h.service.current().await.is_none());
    assert!(!h.service.status().await.ready);
    assert_eq!(
        h.settings.get("audioSummaryHistory").await.unwrap(),
        None
    );
}

#[tokio::test]
async fn test_failed_regeneration_leaves_nothing_playable() {
    let mut seq = Sequence::new();

    let mut summary = MockSummary::new();
    summary
        .expect_summarize()
        .returning(|_, _| Ok(SUMMARY.to_string()));
    let mut speech = MockSpeech::new();
    speech
        .expect_synthesize()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(long_payload()));
    speech
        .expect_synthesize()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Err(BridgeError::OperationFailed("quota exceeded".into())));

    let h = harness(summary, speech, temp_dir("regenerate-fail")).await;

    h.service
        .generate("First article", SummaryLength::Medium)
        .await
        .unwrap();
    h.service.toggle_playback().await.unwrap();
    wait_for_state(&h.service, PlayerState::Playing).await;

    let err = h
        .service
        .generate("Second article", SummaryLength::Medium)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Upstream {
            stage: Stage::Speech,
            ..
        }
    ));

    let status = h.service.status().await;
    assert_eq!(status.state, PlayerState::Idle);
    assert!(!status.ready);
    assert!(h.service.current().await.is_none());
    assert_eq!(h.engine.active_sessions(), 0);

    // Space has nothing to toggle and the old audio cannot be exported.
    let space = KeyEvent::new(KeyCode::Space, FocusTarget::Body);
    assert_eq!(h.service.handle_key(&space).await.unwrap(), None);
    assert!(h.service.save_audio(None).await.is_err());

    // The earlier briefing is still in history.
    assert_eq!(h.service.history().len().await, 1);
}

#[tokio::test]
async fn test_blank_summary_is_upstream_failure() {
    let mut summary = MockSummary::new();
    summary
        .expect_summarize()
        .returning(|_, _| Ok("  ".to_string()));
    let mut speech = MockSpeech::new();
    speech.expect_synthesize().never();

    let h = harness(summary, speech, temp_dir("blank")).await;

    let err = h
        .service
        .generate("Article", SummaryLength::Long)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Upstream {
            stage: Stage::Summary,
            ..
        }
    ));
    assert!(h.service.history().is_empty().await);
}

#[tokio::test]
async fn test_success_saves_loads_and_plays() {
    let (summary, speech) = succeeding_providers();
    let h = harness(summary, speech, temp_dir("success")).await;

    let entry = h
        .service
        .generate("Article", SummaryLength::Medium)
        .await
        .unwrap();

    assert_eq!(h.service.history().list().await[0].id, entry.id);
    let blob = h
        .settings
        .get("audioSummaryHistory")
        .await
        .unwrap()
        .unwrap();
    assert!(blob.contains(SUMMARY));

    let current = h.service.current().await.unwrap();
    assert_eq!(current.entry_id.as_deref(), Some(entry.id.as_str()));

    let status = h.service.status().await;
    assert!(status.ready);
    assert_eq!(status.state, PlayerState::Idle);

    h.service.toggle_playback().await.unwrap();
    wait_for_state(&h.service, PlayerState::Playing).await;
    assert_eq!(h.engine.active_sessions(), 1);

    h.service.toggle_playback().await.unwrap();
    wait_for_state(&h.service, PlayerState::Idle).await;
    assert_eq!(h.engine.active_sessions(), 0);

    h.service.shutdown().await.unwrap();
    assert!(h.service.commands().is_closed());
}

#[tokio::test]
async fn test_undecodable_audio_keeps_entry() {
    let mut summary = MockSummary::new();
    summary
        .expect_summarize()
        .returning(|_, _| Ok(SUMMARY.to_string()));
    let mut speech = MockSpeech::new();
    speech
        .expect_synthesize()
        .returning(|_| Ok("not base64!".to_string()));

    let h = harness(summary, speech, temp_dir("undecodable")).await;

    let err = h
        .service
        .generate("Article", SummaryLength::Medium)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Playback(_)));
    assert_eq!(err.user_message(), "Could not prepare audio.");

    assert_eq!(h.service.history().len().await, 1);
    assert!(!h.service.status().await.ready);
}

// ============================================================================
// History and sharing
// ============================================================================

#[tokio::test]
async fn test_open_entry_and_missing_entry() {
    let (summary, speech) = succeeding_providers();
    let h = harness(summary, speech, temp_dir("open")).await;

    let entry = h
        .service
        .generate("Article", SummaryLength::Medium)
        .await
        .unwrap();
    let request = h.service.status().await.request;

    let opened = h.service.open_entry(&entry.id).await.unwrap();
    assert_eq!(opened, entry);
    assert_eq!(h.service.status().await.request, request + 1);

    assert!(matches!(
        h.service.open_entry("missing").await,
        Err(CoreError::EntryNotFound(_))
    ));
}

#[tokio::test]
async fn test_share_link_round_trip() {
    let (summary, speech) = succeeding_providers();
    let h = harness(summary, speech, temp_dir("share")).await;

    let entry = h
        .service
        .generate("Article", SummaryLength::Medium)
        .await
        .unwrap();
    let url = h
        .service
        .share_link(&entry.id, "https://brief.example/")
        .await
        .unwrap();
    assert!(url.starts_with("https://brief.example/#share="));

    h.service.clear_history().await;
    let payload = h.service.open_shared(&url).await.unwrap();
    assert_eq!(payload.summary, SUMMARY);

    let current = h.service.current().await.unwrap();
    assert_eq!(current.summary, SUMMARY);
    assert_eq!(current.entry_id, None);
    assert!(h.service.status().await.ready);
    assert!(h.service.history().is_empty().await);

    let err = h.service.open_shared("#share=%%%").await.unwrap_err();
    assert_eq!(err.user_message(), "This share link is invalid.");
}

#[tokio::test]
async fn test_bookmark_and_delete() {
    let (summary, speech) = succeeding_providers();
    let h = harness(summary, speech, temp_dir("bookmark")).await;

    let entry = h
        .service
        .generate("Article", SummaryLength::Medium)
        .await
        .unwrap();

    assert!(h.service.toggle_bookmark(&entry.id).await.unwrap());
    h.service.delete_entry(&entry.id).await.unwrap();
    assert!(matches!(
        h.service.delete_entry(&entry.id).await,
        Err(CoreError::EntryNotFound(_))
    ));
    assert!(matches!(
        h.service.toggle_bookmark(&entry.id).await,
        Err(CoreError::EntryNotFound(_))
    ));
}

// ============================================================================
// Export
// ============================================================================

#[tokio::test]
async fn test_save_audio_writes_wav() {
    let dir = temp_dir("export");
    let (summary, speech) = succeeding_providers();
    let h = harness(summary, speech, dir.clone()).await;

    let err = h.service.save_audio(None).await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::Playback(core_playback::PlaybackError::NoAudioLoaded)
    ));

    h.service
        .generate("Article", SummaryLength::Medium)
        .await
        .unwrap();
    let path = h.service.save_audio(None).await.unwrap();
    assert_eq!(path, dir.join("summary.mp3"));

    let bytes = tokio::fs::read(&path).await.unwrap();
    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(&bytes[8..12], b"WAVE");
    assert_eq!(bytes.len(), 44 + 480_000);

    let _ = tokio::fs::remove_dir_all(&dir).await;
}

// ============================================================================
// Keyboard
// ============================================================================

#[tokio::test]
async fn test_space_toggles_loaded_audio() {
    let (summary, speech) = succeeding_providers();
    let h = harness(summary, speech, temp_dir("space")).await;
    let space = KeyEvent::new(KeyCode::Space, FocusTarget::Body);

    assert_eq!(h.service.handle_key(&space).await.unwrap(), None);

    h.service
        .generate("Article", SummaryLength::Medium)
        .await
        .unwrap();

    let in_text_area = KeyEvent::new(KeyCode::Space, FocusTarget::TextArea);
    assert_eq!(h.service.handle_key(&in_text_area).await.unwrap(), None);

    assert_eq!(
        h.service.handle_key(&space).await.unwrap(),
        Some(Shortcut::TogglePlayback)
    );
    wait_for_state(&h.service, PlayerState::Playing).await;

    h.service.handle_key(&space).await.unwrap();
    wait_for_state(&h.service, PlayerState::Idle).await;
}

#[tokio::test]
async fn test_history_keys_open_focused_entry() {
    let (summary, speech) = succeeding_providers();
    let h = harness(summary, speech, temp_dir("history-keys")).await;

    let older = h
        .service
        .generate("First", SummaryLength::Medium)
        .await
        .unwrap();
    let newer = h
        .service
        .generate("Second", SummaryLength::Medium)
        .await
        .unwrap();
    assert_ne!(older.id, newer.id);

    let key = |code| KeyEvent::new(code, FocusTarget::HistoryList);

    h.service.handle_key(&key(KeyCode::ArrowUp)).await.unwrap();
    assert_eq!(h.service.focused_entry().await, Some(1));

    assert_eq!(
        h.service.handle_key(&key(KeyCode::Enter)).await.unwrap(),
        Some(Shortcut::HistorySelect)
    );
    let current = h.service.current().await.unwrap();
    assert_eq!(current.entry_id.as_deref(), Some(older.id.as_str()));

    h.service.handle_key(&key(KeyCode::ArrowDown)).await.unwrap();
    assert_eq!(h.service.focused_entry().await, Some(0));
}
