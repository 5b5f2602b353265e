//! Connection and messaging limits.

use serde::Deserialize;

/// Limits the admission controller enforces per connection attempt and per
/// live session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AdmissionLimits {
    /// Concurrent sessions allowed per authenticated user.
    pub max_sessions_per_user: u32,
    /// Concurrent sessions allowed per client address.
    pub max_sessions_per_addr: u32,
    /// Sustained inbound message rate per session, per second.
    pub messages_per_sec: u32,
    /// Burst allowance on top of the sustained rate.
    pub message_burst: u32,
    /// Maximum sessions per room.
    pub room_capacity: u32,
    /// Largest accepted inbound frame, in bytes.
    pub max_payload_bytes: usize,
    /// Protocol violations tolerated before the session is closed.
    pub strike_limit: u32,
}

impl Default for AdmissionLimits {
    fn default() -> Self {
        Self {
            max_sessions_per_user: 3,
            max_sessions_per_addr: 10,
            messages_per_sec: 10,
            message_burst: 20,
            room_capacity: 2000,
            max_payload_bytes: 16 * 1024,
            strike_limit: 3,
        }
    }
}
