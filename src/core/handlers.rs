// Per-channel handlers.
//
// Each handler translates one outbound message into collaborator calls in a
// fixed order. The only state shared between invocations is the audio handle
// acquired at bind time and a flag that keeps the missing-style-node warning
// from repeating.

use crate::domain::model::{OutboundChannel, Payload, TileSize};
use crate::domain::ports::{
    AudioSubsystem, CacheStore, HostDocument, InboundPort, KeyframeGenerator, PortHandler,
};
use crate::utils::error::BridgeError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The host-side collaborators a bridge drives.
pub struct Collaborators<A, K, C, H> {
    pub audio: A,
    pub keyframes: K,
    pub cache: C,
    pub document: H,
}

pub struct BridgeContext<A: AudioSubsystem, K, C, H> {
    audio: A,
    intro_music: A::Handle,
    keyframes: K,
    cache: C,
    document: H,
    intro_music_playing: Arc<dyn InboundPort>,
    style_target_id: String,
    style_target_reported: AtomicBool,
}

impl<A, K, C, H> BridgeContext<A, K, C, H>
where
    A: AudioSubsystem,
    K: KeyframeGenerator,
    C: CacheStore,
    H: HostDocument,
{
    pub(crate) fn new(
        collaborators: Collaborators<A, K, C, H>,
        intro_music: A::Handle,
        intro_music_playing: Arc<dyn InboundPort>,
        style_target_id: String,
    ) -> Self {
        let Collaborators {
            audio,
            keyframes,
            cache,
            document,
        } = collaborators;

        Self {
            audio,
            intro_music,
            keyframes,
            cache,
            document,
            intro_music_playing,
            style_target_id,
            style_target_reported: AtomicBool::new(false),
        }
    }

    pub fn intro_music(&self) -> &A::Handle {
        &self.intro_music
    }

    pub fn style_target_id(&self) -> &str {
        &self.style_target_id
    }

    /// Issues a play request and returns without waiting for playback.
    pub fn play_intro_music(&self) {
        tracing::debug!("Requesting intro music playback");
        let playing = Arc::clone(&self.intro_music_playing);
        self.audio.play_track(
            &self.intro_music,
            Box::new(move || {
                tracing::debug!("Intro music audible, notifying application");
                playing.send(Payload::Bool(true));
            }),
        );
    }

    pub fn fade_music(&self) {
        tracing::debug!("Fading intro music");
        self.audio.long_fade(&self.intro_music);
    }

    pub fn generate_bounce_keyframes(&self, payload: &Payload) {
        let tile_size = match TileSize::from_payload(payload) {
            Ok(tile_size) => tile_size,
            Err(e) => {
                tracing::warn!("⚠️ Skipping keyframe generation: {}", e);
                return;
            }
        };

        let css = self.keyframes.generate_keyframes(tile_size);
        tracing::debug!(
            "Generated {} bytes of keyframes for tile size {}",
            css.len(),
            tile_size
        );

        match self.document.set_text_content(&self.style_target_id, &css) {
            Ok(()) => {}
            Err(e @ BridgeError::MissingElement { .. }) => {
                // 只回報一次，之後的遺失以 debug 記錄
                if !self.style_target_reported.swap(true, Ordering::Relaxed) {
                    tracing::warn!("⚠️ {} ({})", e, e.recovery_suggestion());
                } else {
                    tracing::debug!("Style target still missing, keyframes skipped");
                }
            }
            Err(e) => tracing::error!("❌ Failed to write keyframes: {}", e),
        }
    }

    pub fn cache_progress(&self, progress: &Payload) {
        tracing::debug!("Caching progress");
        self.cache.set_progress(progress);
    }

    /// Clears the cache, then reloads the host. Nothing should run afterwards.
    pub fn clear_cache(&self) {
        tracing::info!("Clearing cache and reloading host");
        self.cache.clear();
        self.document.reload();
    }

    pub fn cache_lives(&self, lives: &Payload) {
        tracing::debug!("Caching lives: {}", lives);
        self.cache.set_lives(lives);
    }

    pub fn dispatch(&self, channel: OutboundChannel, payload: Payload) {
        match channel {
            OutboundChannel::PlayIntroMusic => self.play_intro_music(),
            OutboundChannel::FadeMusic => self.fade_music(),
            OutboundChannel::GenerateBounceKeyframes => self.generate_bounce_keyframes(&payload),
            OutboundChannel::CacheProgress => self.cache_progress(&payload),
            OutboundChannel::ClearCache => self.clear_cache(),
            OutboundChannel::CacheLives => self.cache_lives(&payload),
        }
    }
}

/// Builds the subscriber registered on `channel`.
pub fn handler_for<A, K, C, H>(
    context: Arc<BridgeContext<A, K, C, H>>,
    channel: OutboundChannel,
) -> PortHandler
where
    A: AudioSubsystem + 'static,
    K: KeyframeGenerator + 'static,
    C: CacheStore + 'static,
    H: HostDocument + 'static,
{
    Box::new(move |payload| context.dispatch(channel, payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::OnStarted;
    use crate::utils::error::Result;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Calls(Mutex<Vec<String>>);

    impl Calls {
        fn push(&self, call: impl Into<String>) {
            self.0.lock().unwrap().push(call.into());
        }

        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    struct HeldAudio {
        calls: Arc<Calls>,
        pending: Mutex<Vec<OnStarted>>,
    }

    impl AudioSubsystem for HeldAudio {
        type Handle = &'static str;

        fn load(&self) -> Result<Self::Handle> {
            Ok("intro")
        }

        fn play_track(&self, handle: &Self::Handle, on_started: OnStarted) {
            self.calls.push(format!("play:{}", handle));
            self.pending.lock().unwrap().push(on_started);
        }

        fn long_fade(&self, handle: &Self::Handle) {
            self.calls.push(format!("fade:{}", handle));
        }
    }

    struct EchoKeyframes;

    impl KeyframeGenerator for EchoKeyframes {
        fn generate_keyframes(&self, tile_size: TileSize) -> String {
            format!("@keyframes bounce {{ /* {} */ }}", tile_size)
        }
    }

    struct LoggedCache(Arc<Calls>);

    impl CacheStore for LoggedCache {
        fn set_progress(&self, progress: &Payload) {
            self.0.push(format!("progress:{}", progress));
        }

        fn set_lives(&self, lives: &Payload) {
            self.0.push(format!("lives:{}", lives));
        }

        fn clear(&self) {
            self.0.push("clear");
        }
    }

    struct NoStyleNode(Arc<Calls>);

    impl HostDocument for NoStyleNode {
        fn set_text_content(&self, id: &str, _text: &str) -> Result<()> {
            self.0.push(format!("write:{}", id));
            Err(BridgeError::MissingElement { id: id.to_string() })
        }

        fn reload(&self) {
            self.0.push("reload");
        }
    }

    struct Inbox(Mutex<Vec<Payload>>);

    impl InboundPort for Inbox {
        fn send(&self, value: Payload) {
            self.0.lock().unwrap().push(value);
        }
    }

    type TestContext = BridgeContext<Arc<HeldAudio>, EchoKeyframes, LoggedCache, NoStyleNode>;

    fn context() -> (TestContext, Arc<HeldAudio>, Arc<Calls>, Arc<Inbox>) {
        let calls = Arc::new(Calls::default());
        let audio = Arc::new(HeldAudio {
            calls: Arc::clone(&calls),
            pending: Mutex::new(Vec::new()),
        });
        let inbox = Arc::new(Inbox(Mutex::new(Vec::new())));
        let context = BridgeContext::new(
            Collaborators {
                audio: Arc::clone(&audio),
                keyframes: EchoKeyframes,
                cache: LoggedCache(Arc::clone(&calls)),
                document: NoStyleNode(Arc::clone(&calls)),
            },
            "intro",
            inbox.clone(),
            "generated-styles".to_string(),
        );
        (context, audio, calls, inbox)
    }

    #[test]
    fn test_overlapping_play_requests_all_complete() {
        let (context, audio, calls, inbox) = context();

        context.play_intro_music();
        context.play_intro_music();
        assert_eq!(calls.take(), vec!["play:intro", "play:intro"]);
        assert!(inbox.0.lock().unwrap().is_empty());

        let pending: Vec<OnStarted> = std::mem::take(&mut *audio.pending.lock().unwrap());
        for on_started in pending {
            on_started();
        }
        assert_eq!(*inbox.0.lock().unwrap(), vec![json!(true), json!(true)]);
    }

    #[test]
    fn test_missing_style_node_is_skipped_every_time() {
        let (context, _audio, calls, inbox) = context();

        context.generate_bounce_keyframes(&json!(32));
        context.generate_bounce_keyframes(&json!(32));
        context.cache_lives(&json!(2));

        assert!(context.style_target_reported.load(Ordering::Relaxed));
        assert_eq!(
            calls.take(),
            vec!["write:generated-styles", "write:generated-styles", "lives:2"]
        );
        assert!(inbox.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_tile_size_never_reaches_document() {
        let (context, _audio, calls, _inbox) = context();

        context.generate_bounce_keyframes(&json!("big"));
        context.generate_bounce_keyframes(&json!(-1));

        assert!(calls.take().is_empty());
        assert!(!context.style_target_reported.load(Ordering::Relaxed));
    }

    #[test]
    fn test_dispatch_routes_by_channel() {
        let (context, _audio, calls, _inbox) = context();

        context.dispatch(OutboundChannel::FadeMusic, Payload::Null);
        context.dispatch(OutboundChannel::CacheProgress, json!({"level": 4}));
        context.dispatch(OutboundChannel::ClearCache, Payload::Null);

        assert_eq!(
            calls.take(),
            vec!["fade:intro", "progress:{\"level\":4}", "clear", "reload"]
        );
    }
}
