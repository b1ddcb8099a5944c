pub mod bridge;
pub mod handlers;
pub mod replay;

pub use crate::domain::model::{
    InboundChannel, InboundMessage, OutboundChannel, Payload, TileSize, STYLE_TARGET_ID,
};
pub use crate::domain::ports::{
    AudioSubsystem, CacheStore, HostDocument, InboundPort, KeyframeGenerator, OnStarted,
    OutboundPort, PortHandler, PortTable,
};
pub use crate::utils::error::Result;
