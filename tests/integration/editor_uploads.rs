use crate::common::mocks::MockStorage;
use crate::common::{TestContext, draft};
use frontcat::RosterError;
use frontcat::backends::{DocumentStore, MemoryObjectStorage, ObjectStorage};
use frontcat::config::{MediaConfig, PhotoStrategy};
use frontcat::models::{CapturedMedia, PlayerId, VideoChoice};
use frontcat::services::{MediaResolver, MediaSource, PlayerEditor};
use std::sync::Arc;
use std::time::Duration;

fn object_storage_config() -> MediaConfig {
    MediaConfig {
        photo_strategy: PhotoStrategy::ObjectStorage,
        upload_timeout: 1,
        ..Default::default()
    }
}

fn editor_with(
    ctx: &TestContext,
    storage: Arc<dyn ObjectStorage>,
    media: MediaConfig,
) -> PlayerEditor {
    PlayerEditor::new(Arc::new(ctx.store.clone()), Some(storage), media)
}

fn photo() -> CapturedMedia {
    CapturedMedia::new("file:///sdcard/DCIM/coby.jpg", vec![0xff, 0xd8, 0xff, 0xe0])
}

#[tokio::test(start_paused = true)]
async fn test_upload_timeout_keeps_saved_record() {
    let ctx = TestContext::new(Vec::new()).await;
    let storage = MockStorage::stalled(ctx.storage.clone(), Duration::from_secs(600));
    let editor = editor_with(&ctx, Arc::new(storage), object_storage_config());

    let receipt = editor
        .save(&draft("Coby", "25").with_photo(photo()), None)
        .await
        .unwrap();
    let upload = receipt.upload.expect("photo upload should be pending");

    let err = upload.wait().await.unwrap_err();
    assert!(matches!(err, RosterError::UploadTimeout(d) if d == Duration::from_secs(1)));
    assert!(err.is_upload_failure());

    let saved = ctx.store.get(&receipt.id).await.unwrap().unwrap();
    assert_eq!(saved.record.name, "Coby");
    assert_eq!(saved.record.age, 25);
    assert!(saved.record.headshot.is_empty());
    assert!(ctx.storage.keys().await.is_empty());
}

#[tokio::test]
async fn test_failed_upload_can_be_retried() {
    let ctx = TestContext::new(Vec::new()).await;
    let storage = MockStorage::failing(ctx.storage.clone(), 1);
    let editor = editor_with(&ctx, Arc::new(storage.clone()), object_storage_config());

    let receipt = editor
        .save(&draft("Coby", "25").with_photo(photo()), None)
        .await
        .unwrap();
    let err = receipt.upload.unwrap().wait().await.unwrap_err();
    assert!(matches!(err, RosterError::Upload(_)));
    assert!(ctx.store.get(&receipt.id).await.unwrap().is_some());

    let report = editor
        .upload_photo(&receipt.id, photo())
        .unwrap()
        .wait()
        .await
        .unwrap();
    assert_eq!(storage.attempts(), 2);
    assert!(report.url.starts_with("https://storage.test/players/photos/coby_"));

    let saved = ctx.store.get(&receipt.id).await.unwrap().unwrap();
    assert_eq!(saved.record.headshot, report.url);
    assert!(matches!(
        MediaResolver::default().player_photo(&saved),
        MediaSource::RemoteUrl(_)
    ));
}

#[tokio::test]
async fn test_edit_without_identifier_writes_nothing() {
    let ctx = TestContext::new(Vec::new()).await;
    let editor = editor_with(
        &ctx,
        Arc::new(MemoryObjectStorage::default()),
        MediaConfig::default(),
    );

    let err = editor
        .save(&draft("Coby", "25"), Some(&PlayerId::new("  ")))
        .await
        .unwrap_err();
    assert!(matches!(err, RosterError::MissingIdentifier));
    assert!(ctx.store.is_empty().await);
}

#[tokio::test]
async fn test_age_text_is_parsed_on_save() {
    let ctx = TestContext::new(Vec::new()).await;
    let editor = editor_with(
        &ctx,
        Arc::new(MemoryObjectStorage::default()),
        MediaConfig::default(),
    );

    let cases = [
        ("27 años", 27),
        ("abc", 0),
        ("-5", -5),
        ("4294967296", 4_294_967_296),
        (" 31", 31),
        ("", 0),
    ];
    for (input, expected) in cases {
        let id = editor.save(&draft("Coby", input), None).await.unwrap().id;
        let saved = ctx.store.get(&id).await.unwrap().unwrap();
        assert_eq!(saved.record.age, expected, "age input {:?}", input);
    }
}

#[tokio::test]
async fn test_picked_video_is_copied_and_playable() {
    let ctx = TestContext::new(Vec::new()).await;
    let source = ctx.temp_dir.path().join("dunk.mp4");
    std::fs::write(&source, b"mp4 bytes").unwrap();
    let media = MediaConfig {
        videos_dir: Some(ctx.temp_dir.path().join("videos")),
        ..Default::default()
    };
    let editor = editor_with(&ctx, Arc::new(MemoryObjectStorage::default()), media);

    let uri = editor
        .persist_picked_video(&format!("file://{}", source.display()))
        .await;
    assert!(uri.starts_with("file://"));
    assert!(uri.ends_with("_dunk.mp4"));
    assert!(uri.contains("/videos/"));

    let id = editor
        .save(&draft("Coby", "25").with_video(VideoChoice::Picked(uri.clone())), None)
        .await
        .unwrap()
        .id;
    let saved = ctx.store.get(&id).await.unwrap().unwrap();
    assert_eq!(saved.record.video, uri);
    assert_eq!(
        MediaResolver::default().player_video(&saved),
        MediaSource::LocalUri(uri)
    );
}
