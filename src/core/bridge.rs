use crate::core::handlers::{handler_for, BridgeContext, Collaborators};
use crate::domain::model::{InboundChannel, OutboundChannel, STYLE_TARGET_ID};
use crate::domain::ports::{
    AudioSubsystem, CacheStore, HostDocument, KeyframeGenerator, OutboundPort, PortTable,
};
use crate::utils::error::{BridgeError, Result};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct BridgeOptions {
    pub style_target_id: String,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            style_target_id: STYLE_TARGET_ID.to_string(),
        }
    }
}

/// A bridge bound to one application's port table.
///
/// Holding a `Bridge` means setup succeeded: every channel was found, the
/// intro track was loaded and each outbound channel has its handler.
pub struct Bridge<A: AudioSubsystem, K, C, H> {
    context: Arc<BridgeContext<A, K, C, H>>,
}

impl<A, K, C, H> Bridge<A, K, C, H>
where
    A: AudioSubsystem + 'static,
    K: KeyframeGenerator + 'static,
    C: CacheStore + 'static,
    H: HostDocument + 'static,
{
    pub fn bind<P>(ports: &P, collaborators: Collaborators<A, K, C, H>) -> Result<Self>
    where
        P: PortTable + ?Sized,
    {
        Self::bind_with_options(ports, collaborators, BridgeOptions::default())
    }

    pub fn bind_with_options<P>(
        ports: &P,
        collaborators: Collaborators<A, K, C, H>,
        options: BridgeOptions,
    ) -> Result<Self>
    where
        P: PortTable + ?Sized,
    {
        // 1. 先解析所有通道，缺少任何一個就不訂閱
        let mut missing = Vec::new();
        let mut outbound: Vec<(OutboundChannel, Arc<dyn OutboundPort>)> = Vec::new();
        for channel in OutboundChannel::ALL {
            match ports.outbound(channel.name()) {
                Some(port) => outbound.push((channel, port)),
                None => missing.push(channel.name().to_string()),
            }
        }

        let intro_music_playing = ports.inbound(InboundChannel::IntroMusicPlaying.name());
        if intro_music_playing.is_none() {
            missing.push(InboundChannel::IntroMusicPlaying.name().to_string());
        }

        let intro_music_playing = match intro_music_playing {
            Some(port) if missing.is_empty() => port,
            _ => {
                tracing::error!("❌ Port table is missing channels: {}", missing.join(", "));
                return Err(BridgeError::MissingChannels { names: missing });
            }
        };
        tracing::debug!("Resolved {} outbound channels", outbound.len());

        // 2. 取得音訊資源
        let intro_music = collaborators.audio.load().map_err(|e| match e {
            e @ BridgeError::AudioLoad { .. } => e,
            other => BridgeError::AudioLoad {
                message: other.to_string(),
            },
        })?;
        tracing::info!("🎵 Intro music loaded");

        let context = Arc::new(BridgeContext::new(
            collaborators,
            intro_music,
            intro_music_playing,
            options.style_target_id,
        ));

        // 3. 每個 outbound 通道註冊一個 handler
        for (channel, port) in outbound {
            port.subscribe(handler_for(Arc::clone(&context), channel))?;
            tracing::debug!("Subscribed to {}", channel);
        }

        tracing::info!("✅ Bridge bound to {} channels", OutboundChannel::ALL.len());
        Ok(Self { context })
    }

    pub fn context(&self) -> &BridgeContext<A, K, C, H> {
        &self.context
    }

    pub fn intro_music(&self) -> &A::Handle {
        self.context.intro_music()
    }
}
