//! Heartbeat monitor.
//!
//! Probes every live session on an interval and tears down sessions that
//! stay silent past the timeout. Teardown is the same path a voluntary
//! disconnect takes: room membership and admission counters are released,
//! so a dead client never holds a connection slot.

use std::sync::Arc;
use std::time::Duration;

use crate::application::AdmissionController;

use super::messages::OutboundFrame;
use super::rooms::RoomRegistry;

pub struct HeartbeatMonitor {
    registry: Arc<RoomRegistry>,
    admission: Arc<AdmissionController>,
    probe_interval: Duration,
    timeout: Duration,
}

impl HeartbeatMonitor {
    pub fn new(
        registry: Arc<RoomRegistry>,
        admission: Arc<AdmissionController>,
        probe_interval: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            registry,
            admission,
            probe_interval,
            timeout,
        }
    }

    /// Probes all sessions and evicts the ones silent past the timeout.
    /// Returns how many sessions were torn down.
    pub async fn sweep_once(&self) -> usize {
        self.registry.probe_all().await;

        let stale = self.registry.idle_sessions(self.timeout).await;
        let evicted = stale.len();
        for session in stale {
            self.registry
                .send_to(
                    session,
                    OutboundFrame::Close {
                        code: 1001,
                        reason: "heartbeat timeout".into(),
                    },
                )
                .await;
            if let Some(info) = self.registry.leave(session).await {
                tracing::info!(session = %session, room = %info.room, "evicting silent session");
                self.admission
                    .release(&info.user, &info.addr, &info.room)
                    .await;
            }
        }
        evicted
    }

    /// Runs the probe/sweep loop until the task is aborted.
    pub async fn run(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(self.probe_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.sweep_once().await;
        }
    }
}
