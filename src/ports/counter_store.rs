//! CounterStore port.

use async_trait::async_trait;

use super::StorageError;

/// Shared counters and rate buckets backing admission control.
///
/// One instance of this port is the source of truth across processes
/// (Redis in production); a second, process-local instance serves as the
/// degraded fallback when the primary reports `Unavailable`.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically increments `key` unless the counter already sits at
    /// `limit`. Returns whether the increment happened.
    async fn try_increment(&self, key: &str, limit: u32) -> Result<bool, StorageError>;

    /// Decrements `key`, saturating at zero.
    async fn decrement(&self, key: &str) -> Result<(), StorageError>;

    /// Takes one token from the bucket stored under `key`, creating a full
    /// bucket of `burst` tokens on first use. Returns whether a token was
    /// available.
    async fn try_take_token(
        &self,
        key: &str,
        rate_per_sec: u32,
        burst: u32,
    ) -> Result<bool, StorageError>;
}

/// Key layout shared by both store implementations, so a node can fail
/// over between them without re-counting.
pub(crate) mod keys {
    use crate::domain::foundation::{RoomId, UserId};

    pub fn user_sessions(user: &UserId) -> String {
        format!("admission:user:{user}")
    }

    pub fn addr_sessions(addr: &str) -> String {
        format!("admission:addr:{addr}")
    }

    pub fn room_occupancy(room: &RoomId) -> String {
        format!("admission:room:{room}")
    }

    pub fn session_bucket(session: &str) -> String {
        format!("admission:rate:{session}")
    }
}
