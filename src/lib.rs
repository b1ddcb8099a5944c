pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use adapters::{FileCache, LocalPortTable, MemoryCache, MemoryDocument, SimulatedAudio, TemplateKeyframes};
pub use config::BridgeConfig;
pub use core::bridge::{Bridge, BridgeOptions};
pub use core::handlers::Collaborators;
pub use utils::error::{BridgeError, Result};
