use crate::utils::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The value carried on a port. Signals carry `Value::Null`.
pub type Payload = serde_json::Value;

/// Fixed id of the `<style>` node that receives the generated keyframes.
pub const STYLE_TARGET_ID: &str = "generated-styles";

/// Channels the application emits on; the bridge subscribes to each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutboundChannel {
    #[serde(rename = "playIntroMusic")]
    PlayIntroMusic,
    #[serde(rename = "fadeMusic")]
    FadeMusic,
    #[serde(rename = "generateBounceKeyframes")]
    GenerateBounceKeyframes,
    #[serde(rename = "cacheProgress")]
    CacheProgress,
    #[serde(rename = "clearCache_")]
    ClearCache,
    #[serde(rename = "cacheLives")]
    CacheLives,
}

impl OutboundChannel {
    pub const ALL: [OutboundChannel; 6] = [
        OutboundChannel::PlayIntroMusic,
        OutboundChannel::FadeMusic,
        OutboundChannel::GenerateBounceKeyframes,
        OutboundChannel::CacheProgress,
        OutboundChannel::ClearCache,
        OutboundChannel::CacheLives,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OutboundChannel::PlayIntroMusic => "playIntroMusic",
            OutboundChannel::FadeMusic => "fadeMusic",
            OutboundChannel::GenerateBounceKeyframes => "generateBounceKeyframes",
            OutboundChannel::CacheProgress => "cacheProgress",
            OutboundChannel::ClearCache => "clearCache_",
            OutboundChannel::CacheLives => "cacheLives",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|channel| channel.name() == name)
    }

    /// Signals carry no data; their payload is ignored.
    pub fn is_signal(&self) -> bool {
        matches!(
            self,
            OutboundChannel::PlayIntroMusic
                | OutboundChannel::FadeMusic
                | OutboundChannel::ClearCache
        )
    }
}

impl fmt::Display for OutboundChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Channels the bridge sends on; the application subscribes to each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InboundChannel {
    #[serde(rename = "introMusicPlaying")]
    IntroMusicPlaying,
}

impl InboundChannel {
    pub const ALL: [InboundChannel; 1] = [InboundChannel::IntroMusicPlaying];

    pub fn name(&self) -> &'static str {
        match self {
            InboundChannel::IntroMusicPlaying => "introMusicPlaying",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|channel| channel.name() == name)
    }
}

impl fmt::Display for InboundChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value delivered to the application on an inbound channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub channel: InboundChannel,
    pub value: Payload,
}

/// Tile edge length in pixels, as sent on `generateBounceKeyframes`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TileSize(f64);

impl TileSize {
    pub fn new(pixels: f64) -> Result<Self> {
        if !pixels.is_finite() || pixels <= 0.0 {
            return Err(BridgeError::InvalidPayload {
                channel: OutboundChannel::GenerateBounceKeyframes.name().to_string(),
                reason: format!("tile size must be a positive number, got {}", pixels),
            });
        }
        Ok(Self(pixels))
    }

    pub fn from_payload(payload: &Payload) -> Result<Self> {
        let pixels = payload
            .as_f64()
            .ok_or_else(|| BridgeError::InvalidPayload {
                channel: OutboundChannel::GenerateBounceKeyframes.name().to_string(),
                reason: format!("expected a number, got {}", payload),
            })?;
        Self::new(pixels)
    }

    pub fn pixels(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for TileSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
