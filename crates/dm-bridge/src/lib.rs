pub mod callbacks;
pub mod context;
pub mod engine;
pub mod events;
pub mod protocol;

pub use context::{BridgeContext, CorrelationIds};
pub use engine::{EngineHandle, EngineSlot, PendingReply, DISCOVERY_TICK_LIMIT};
pub use events::BridgeEvents;
pub use protocol::{
    Completion, CompletionKind, CompletionPayload, EngineRequest, ResourceHandle,
};
