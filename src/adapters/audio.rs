// Simulated audio output driven by tokio timers.
//
// No samples are decoded. A loaded track only records where its file lives
// and tracks playback state so that the "started" notification and the long
// fade behave with realistic timing.

use crate::config::toml_config::AudioConfig;
use crate::domain::ports::{AudioSubsystem, OnStarted};
use crate::utils::error::{BridgeError, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

#[derive(Debug)]
struct TrackState {
    path: PathBuf,
    size_bytes: u64,
    playing: AtomicBool,
    // f32 bits
    volume: AtomicU32,
    plays_requested: AtomicU32,
    generation: AtomicU64,
}

/// A loaded track. Cheap to clone; clones share playback state.
#[derive(Debug, Clone)]
pub struct AudioHandle {
    state: Arc<TrackState>,
}

impl AudioHandle {
    pub fn path(&self) -> &Path {
        &self.state.path
    }

    pub fn size_bytes(&self) -> u64 {
        self.state.size_bytes
    }

    pub fn is_playing(&self) -> bool {
        self.state.playing.load(Ordering::SeqCst)
    }

    pub fn volume(&self) -> f32 {
        f32::from_bits(self.state.volume.load(Ordering::SeqCst))
    }

    pub fn plays_requested(&self) -> u32 {
        self.state.plays_requested.load(Ordering::SeqCst)
    }

    fn set_volume(&self, volume: f32) {
        self.state.volume.store(volume.to_bits(), Ordering::SeqCst);
    }
}

pub struct SimulatedAudio {
    track_path: PathBuf,
    start_latency: Duration,
    fade_duration: Duration,
    fade_steps: u32,
    runtime: Handle,
}

impl SimulatedAudio {
    pub fn new(config: &AudioConfig, runtime: Handle) -> Self {
        Self {
            track_path: PathBuf::from(&config.intro_track),
            start_latency: Duration::from_millis(config.start_latency_ms()),
            fade_duration: Duration::from_millis(config.fade_duration_ms()),
            fade_steps: config.fade_steps().max(1),
            runtime,
        }
    }

    /// Uses the tokio runtime the caller is running on.
    pub fn from_current_runtime(config: &AudioConfig) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| BridgeError::AudioLoad {
            message: format!("no tokio runtime available: {}", e),
        })?;
        Ok(Self::new(config, runtime))
    }
}

impl AudioSubsystem for SimulatedAudio {
    type Handle = AudioHandle;

    fn load(&self) -> Result<AudioHandle> {
        let metadata = std::fs::metadata(&self.track_path).map_err(|e| BridgeError::AudioLoad {
            message: format!("{}: {}", self.track_path.display(), e),
        })?;
        if !metadata.is_file() {
            return Err(BridgeError::AudioLoad {
                message: format!("{} is not a file", self.track_path.display()),
            });
        }

        tracing::debug!(
            "Loaded track {} ({} bytes)",
            self.track_path.display(),
            metadata.len()
        );

        Ok(AudioHandle {
            state: Arc::new(TrackState {
                path: self.track_path.clone(),
                size_bytes: metadata.len(),
                playing: AtomicBool::new(false),
                volume: AtomicU32::new(1.0f32.to_bits()),
                plays_requested: AtomicU32::new(0),
                generation: AtomicU64::new(0),
            }),
        })
    }

    fn play_track(&self, handle: &AudioHandle, on_started: OnStarted) {
        handle.state.plays_requested.fetch_add(1, Ordering::SeqCst);
        // 新的播放會中止進行中的淡出
        handle.state.generation.fetch_add(1, Ordering::SeqCst);
        handle.set_volume(1.0);

        let handle = handle.clone();
        let latency = self.start_latency;
        self.runtime.spawn(async move {
            tokio::time::sleep(latency).await;
            handle.state.playing.store(true, Ordering::SeqCst);
            tracing::debug!("▶️ {} is playing", handle.path().display());
            on_started();
        });
    }

    fn long_fade(&self, handle: &AudioHandle) {
        let generation = handle.state.generation.load(Ordering::SeqCst);
        let handle = handle.clone();
        let steps = self.fade_steps;
        let step_delay = self.fade_duration / steps;

        self.runtime.spawn(async move {
            let start = handle.volume();
            for step in 1..=steps {
                tokio::time::sleep(step_delay).await;
                if handle.state.generation.load(Ordering::SeqCst) != generation {
                    tracing::debug!("Fade interrupted by a new play request");
                    return;
                }
                handle.set_volume(start * (1.0 - step as f32 / steps as f32));
            }
            handle.state.playing.store(false, Ordering::SeqCst);
            tracing::debug!("⏹️ {} faded out", handle.path().display());
        });
    }
}
