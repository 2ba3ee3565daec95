use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use frontcat::catalog::demo_roster;
use frontcat::services::{MediaResolver, MediaSource, extract_hosted_video_id};

#[test]
fn test_inline_photo_takes_precedence() {
    let resolver = MediaResolver::default();
    let inline = STANDARD.encode([0xff, 0xd8, 0xff]);

    for reference in [
        "https://cdn.example.com/photo.png",
        "file:///sdcard/photo.png",
        "White_Coby.png",
        "",
    ] {
        let source = resolver.resolve_photo(&inline, reference);
        assert!(
            matches!(source, MediaSource::Inline { ref mime, .. } if mime == "image/jpeg"),
            "reference {:?} resolved to {}",
            reference,
            source
        );
    }
}

#[test]
fn test_hosted_video_id_extraction() {
    assert_eq!(
        extract_hosted_video_id("https://www.youtube.com/watch?v=ABC123&t=5").as_deref(),
        Some("ABC123")
    );
    assert_eq!(
        extract_hosted_video_id("https://youtu.be/ABC123?t=5").as_deref(),
        Some("ABC123")
    );
}

#[test]
fn test_unknown_bundled_name_is_no_media() {
    let resolver = MediaResolver::default();
    assert_eq!(resolver.resolve_video("unknownfile.mp4"), MediaSource::None);
    assert_eq!(resolver.resolve_video("assets/videos/unknownfile.mp4"), MediaSource::None);
}

#[test]
fn test_demo_roster_media_resolves_to_bundled_assets() {
    let resolver = MediaResolver::default();
    for player in demo_roster() {
        assert!(matches!(
            resolver.player_photo(&player),
            MediaSource::BundledAsset(_)
        ));
        let video = resolver.player_video(&player);
        if player.record.video.is_empty() {
            assert_eq!(video, MediaSource::None);
        } else {
            assert!(matches!(video, MediaSource::BundledAsset(_)));
        }
    }
}
