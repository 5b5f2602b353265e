//! Room membership registry.
//!
//! Tracks every live session, the room it joined, and when it was last
//! heard from. Broadcasts go through each session's outbound queue; the
//! connection's send task drains that queue onto the socket. Uses
//! `RwLock` since broadcasts vastly outnumber joins and leaves.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, RwLock};

use crate::domain::foundation::{RoomId, SessionId, UserId};

use super::messages::{OutboundFrame, ServerMessage};

/// Identity and placement of one live session, kept for counter release
/// on teardown.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub id: SessionId,
    pub user: UserId,
    pub addr: String,
    pub room: RoomId,
}

struct SessionEntry {
    info: SessionInfo,
    sender: mpsc::UnboundedSender<OutboundFrame>,
    last_seen: Instant,
}

pub struct RoomRegistry {
    sessions: RwLock<HashMap<SessionId, SessionEntry>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Adds a session to its room.
    pub async fn join(&self, info: SessionInfo, sender: mpsc::UnboundedSender<OutboundFrame>) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(
            info.id,
            SessionEntry {
                info,
                sender,
                last_seen: Instant::now(),
            },
        );
    }

    /// Removes a session, returning its placement for counter release.
    pub async fn leave(&self, session: SessionId) -> Option<SessionInfo> {
        self.sessions
            .write()
            .await
            .remove(&session)
            .map(|entry| entry.info)
    }

    /// Marks a session as alive.
    pub async fn touch(&self, session: SessionId) {
        if let Some(entry) = self.sessions.write().await.get_mut(&session) {
            entry.last_seen = Instant::now();
        }
    }

    /// Queues a frame toward every session in a room. A closed queue means
    /// the connection is already going away; it is skipped, not an error.
    pub async fn broadcast(&self, room: &RoomId, message: ServerMessage) {
        let sessions = self.sessions.read().await;
        for entry in sessions.values() {
            if entry.info.room == *room {
                let _ = entry.sender.send(OutboundFrame::Message(message.clone()));
            }
        }
    }

    /// Queues a frame toward one session.
    pub async fn send_to(&self, session: SessionId, frame: OutboundFrame) {
        if let Some(entry) = self.sessions.read().await.get(&session) {
            let _ = entry.sender.send(frame);
        }
    }

    /// Queues a heartbeat probe toward every session.
    pub async fn probe_all(&self) {
        let sessions = self.sessions.read().await;
        for entry in sessions.values() {
            let _ = entry.sender.send(OutboundFrame::Ping);
        }
    }

    /// Sessions silent for longer than `max_idle`.
    pub async fn idle_sessions(&self, max_idle: Duration) -> Vec<SessionId> {
        let sessions = self.sessions.read().await;
        sessions
            .values()
            .filter(|entry| entry.last_seen.elapsed() > max_idle)
            .map(|entry| entry.info.id)
            .collect()
    }

    /// Number of sessions currently in a room.
    pub async fn occupancy(&self, room: &RoomId) -> usize {
        self.sessions
            .read()
            .await
            .values()
            .filter(|entry| entry.info.room == *room)
            .count()
    }

    /// Total live sessions across all rooms.
    pub async fn total_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
