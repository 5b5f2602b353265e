//! Adapters - implementations of the ports.
//!
//! - `memory` - in-process adapters for tests and single-node runs
//! - `redis` - shared counter store for multi-process admission control
//! - `auth` - JWT token verification
//! - `realtime` - the WebSocket edge: gateway, rooms, broadcaster,
//!   heartbeat

pub mod auth;
pub mod memory;
pub mod realtime;
pub mod redis;
