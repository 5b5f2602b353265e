//! Real-time delivery over WebSocket.
//!
//! The gateway upgrades connections onto tournament and match rooms, the
//! registry tracks who is in which room, the broadcaster fans domain
//! events out to rooms with per-subject sequencing and debounce, and the
//! heartbeat monitor tears down silent sessions.

mod broadcaster;
mod gateway;
mod heartbeat;
mod messages;
mod rooms;

pub use broadcaster::EventBroadcaster;
pub use gateway::{gateway_router, GatewayState};
pub use heartbeat::HeartbeatMonitor;
pub use messages::{close, ClientMessage, OutboundFrame, ServerMessage};
pub use rooms::{RoomRegistry, SessionInfo};
