use crate::domain::model::{Payload, TileSize};
use crate::utils::error::Result;
use std::sync::Arc;

/// Subscriber attached to an outbound channel.
pub type PortHandler = Box<dyn FnMut(Payload) + Send + 'static>;

/// Single-shot continuation run by the audio subsystem once playback is audible.
pub type OnStarted = Box<dyn FnOnce() + Send + 'static>;

/// Application → host channel.
pub trait OutboundPort: Send + Sync {
    fn subscribe(&self, handler: PortHandler) -> Result<()>;
}

/// Host → application channel.
pub trait InboundPort: Send + Sync {
    fn send(&self, value: Payload);
}

/// The set of named channels an application exposes.
pub trait PortTable {
    fn outbound(&self, name: &str) -> Option<Arc<dyn OutboundPort>>;
    fn inbound(&self, name: &str) -> Option<Arc<dyn InboundPort>>;
}

pub trait AudioSubsystem: Send + Sync {
    type Handle: Send + Sync + 'static;

    fn load(&self) -> Result<Self::Handle>;
    fn play_track(&self, handle: &Self::Handle, on_started: OnStarted);
    fn long_fade(&self, handle: &Self::Handle);
}

pub trait KeyframeGenerator: Send + Sync {
    fn generate_keyframes(&self, tile_size: TileSize) -> String;
}

/// Persistent progress store. Write failures stay inside the implementation.
pub trait CacheStore: Send + Sync {
    fn set_progress(&self, progress: &Payload);
    fn set_lives(&self, lives: &Payload);
    fn clear(&self);
}

pub trait HostDocument: Send + Sync {
    /// Replaces the text content of the element with `id`.
    fn set_text_content(&self, id: &str, text: &str) -> Result<()>;
    fn reload(&self);
}

impl<T: AudioSubsystem + ?Sized> AudioSubsystem for Arc<T> {
    type Handle = T::Handle;

    fn load(&self) -> Result<Self::Handle> {
        (**self).load()
    }

    fn play_track(&self, handle: &Self::Handle, on_started: OnStarted) {
        (**self).play_track(handle, on_started)
    }

    fn long_fade(&self, handle: &Self::Handle) {
        (**self).long_fade(handle)
    }
}

impl<T: KeyframeGenerator + ?Sized> KeyframeGenerator for Arc<T> {
    fn generate_keyframes(&self, tile_size: TileSize) -> String {
        (**self).generate_keyframes(tile_size)
    }
}

impl<T: CacheStore + ?Sized> CacheStore for Arc<T> {
    fn set_progress(&self, progress: &Payload) {
        (**self).set_progress(progress)
    }

    fn set_lives(&self, lives: &Payload) {
        (**self).set_lives(lives)
    }

    fn clear(&self) {
        (**self).clear()
    }
}

impl<T: HostDocument + ?Sized> HostDocument for Arc<T> {
    fn set_text_content(&self, id: &str, text: &str) -> Result<()> {
        (**self).set_text_content(id, text)
    }

    fn reload(&self) {
        (**self).reload()
    }
}
