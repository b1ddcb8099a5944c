// Adapters layer: concrete host collaborators for running the bridge outside a browser.

pub mod audio;
pub mod cache;
pub mod document;
pub mod keyframes;
pub mod ports;

pub use audio::{AudioHandle, SimulatedAudio};
pub use cache::{CacheSnapshot, FileCache, MemoryCache};
pub use document::MemoryDocument;
pub use keyframes::TemplateKeyframes;
pub use ports::LocalPortTable;
