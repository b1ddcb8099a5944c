use port_bridge::adapters::cache::CacheSnapshot;
use port_bridge::core::replay::{parse_script, replay};
use port_bridge::core::InboundChannel;
use port_bridge::{
    Bridge, BridgeConfig, Collaborators, FileCache, LocalPortTable, MemoryDocument, SimulatedAudio,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn write_config(dir: &TempDir) -> BridgeConfig {
    let track = dir.path().join("intro.ogg");
    std::fs::write(&track, b"OggS").unwrap();

    let config = format!(
        r#"
[audio]
intro_track = "{}"
start_latency_ms = 10
fade_duration_ms = 20
fade_steps = 2

[cache]
path = "{}"

[keyframes]
template = ".tile {{ animation: bounce; --size: ${{tile_size}}px; }}"
"#,
        track.to_str().unwrap().replace('\\', "/"),
        dir.path().join("cache.json").to_str().unwrap().replace('\\', "/"),
    );
    BridgeConfig::from_toml_str(&config).unwrap()
}

#[tokio::test]
async fn test_replay_against_host_adapters() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);
    let cache_path = config.cache_path().unwrap().to_string();

    let document = Arc::new(MemoryDocument::new().with_element(config.style_target_id()));
    let (ports, mut inbound) = LocalPortTable::with_receiver();

    let bridge = Bridge::bind_with_options(
        &ports,
        Collaborators {
            audio: SimulatedAudio::from_current_runtime(config.audio().unwrap()).unwrap(),
            keyframes: config.keyframes().unwrap(),
            cache: FileCache::new(&cache_path),
            document: Arc::clone(&document),
        },
        config.bridge_options(),
    )
    .unwrap();

    let events = parse_script(
        r#"{"channel": "playIntroMusic"}
{"channel": "generateBounceKeyframes", "value": 40}
{"channel": "cacheProgress", "value": {"level": 5}}
{"channel": "cacheLives", "value": 2}"#,
    )
    .unwrap();
    let summary = replay(&ports, events, || document.reload_requested()).await;
    assert_eq!(summary.delivered, 4);

    let message = tokio::time::timeout(Duration::from_secs(2), inbound.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(message.channel, InboundChannel::IntroMusicPlaying);
    assert_eq!(message.value, json!(true));
    assert!(bridge.intro_music().is_playing());

    assert_eq!(
        document.text_content("generated-styles").as_deref(),
        Some(".tile { animation: bounce; --size: 40px; }")
    );

    let snapshot = FileCache::new(&cache_path).load().unwrap();
    assert_eq!(snapshot.progress, Some(json!({"level": 5})));
    assert_eq!(snapshot.lives, Some(json!(2)));

    ports.emit("fadeMusic", json!(null)).unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(!bridge.intro_music().is_playing());
    assert!(inbound.try_recv().is_err());

    ports.emit("clearCache_", json!(null)).unwrap();
    assert!(document.reload_requested());
    assert_eq!(FileCache::new(&cache_path).load().unwrap(), CacheSnapshot::default());
}

#[tokio::test]
async fn test_bind_fails_for_missing_track() {
    let config = BridgeConfig::from_toml_str(
        "[audio]\nintro_track = \"/definitely/not/here/intro.ogg\"\n",
    )
    .unwrap();
    let ports = LocalPortTable::new();

    let result = Bridge::bind(
        &ports,
        Collaborators {
            audio: SimulatedAudio::from_current_runtime(config.audio().unwrap()).unwrap(),
            keyframes: config.keyframes().unwrap(),
            cache: port_bridge::MemoryCache::new(),
            document: MemoryDocument::new(),
        },
    );

    let err = result.err().unwrap();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("intro.ogg"));
    assert!(!ports.is_subscribed("playIntroMusic"));
}
