//! Fan-out from the domain event bus to connected clients.
//!
//! Subscribes to every event kind and delivers frames to the rooms each
//! event names. High-frequency kinds are coalesced per subject: the
//! latest payload waits out a short debounce window, one timer task per
//! subject, and only the survivor is delivered. Terminal kinds bypass
//! the window, cancel the pending timer, and flush immediately. Every
//! delivered frame carries a per-subject sequence number; subscribers
//! detect gaps and reordering with it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::domain::foundation::{DomainEvent, EventKind, RoomId};
use crate::ports::{EventHandler, EventSubscriber, HandlerResult};

use super::messages::ServerMessage;
use super::rooms::RoomRegistry;

/// Every kind the broadcaster forwards.
const BROADCAST_KINDS: &[EventKind] = &[
    EventKind::MatchReady,
    EventKind::MatchStarted,
    EventKind::ScoreUpdated,
    EventKind::MatchCompleted,
    EventKind::BracketUpdated,
    EventKind::DisputeCreated,
    EventKind::TournamentCompleted,
];

#[derive(Default)]
struct Subject {
    seq: u64,
    pending: Option<DomainEvent>,
    timer: Option<JoinHandle<()>>,
}

type SubjectMap = Arc<Mutex<HashMap<RoomId, Subject>>>;

pub struct EventBroadcaster {
    rooms: Arc<RoomRegistry>,
    debounce: Duration,
    subjects: SubjectMap,
}

impl EventBroadcaster {
    pub fn new(rooms: Arc<RoomRegistry>, debounce: Duration) -> Self {
        Self {
            rooms,
            debounce,
            subjects: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Registers this broadcaster for every event kind.
    pub fn register(self: &Arc<Self>, subscriber: &impl EventSubscriber) {
        subscriber.subscribe_all(BROADCAST_KINDS, self.clone());
    }

    /// Delivers one sequenced frame to every room the event names. Called
    /// outside the subject lock.
    async fn deliver(rooms: &RoomRegistry, seq: u64, event: DomainEvent) {
        let targets = event.rooms();
        let frame = ServerMessage::Event { seq, event };
        for room in targets {
            rooms.broadcast(&room, frame.clone()).await;
        }
    }

    async fn flush_coalesced(subjects: SubjectMap, rooms: Arc<RoomRegistry>, subject: RoomId) {
        let delivery = {
            let mut subjects = subjects.lock().await;
            let Some(state) = subjects.get_mut(&subject) else {
                return;
            };
            state.timer = None;
            state.pending.take().map(|event| {
                state.seq += 1;
                (state.seq, event)
            })
        };
        if let Some((seq, event)) = delivery {
            Self::deliver(&rooms, seq, event).await;
        }
    }

    async fn handle_coalescable(&self, event: DomainEvent) {
        let subject = event.subject;
        let mut subjects = self.subjects.lock().await;
        let state = subjects.entry(subject).or_default();
        state.pending = Some(event);

        if state.timer.is_none() {
            let subjects = Arc::clone(&self.subjects);
            let rooms = Arc::clone(&self.rooms);
            let debounce = self.debounce;
            state.timer = Some(tokio::spawn(async move {
                tokio::time::sleep(debounce).await;
                Self::flush_coalesced(subjects, rooms, subject).await;
            }));
        }
    }

    async fn handle_immediate(&self, event: DomainEvent) {
        let seq = {
            let mut subjects = self.subjects.lock().await;
            let state = subjects.entry(event.subject).or_default();
            if event.kind.is_terminal() {
                // The terminal frame supersedes any coalesced score still
                // waiting; the pending timer is cancelled under the lock.
                if let Some(timer) = state.timer.take() {
                    timer.abort();
                }
                state.pending = None;
            }
            state.seq += 1;
            state.seq
        };
        Self::deliver(&self.rooms, seq, event).await;
    }
}

#[async_trait]
impl EventHandler for EventBroadcaster {
    async fn handle(&self, event: &DomainEvent) -> HandlerResult {
        if event.kind.is_coalescable() {
            self.handle_coalescable(event.clone()).await;
        } else {
            self.handle_immediate(event.clone()).await;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "event_broadcaster"
    }
}
