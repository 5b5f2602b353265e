//! Admission control.
//!
//! Every accepted socket consumes three counters (per-user, per-address,
//! per-room) and every inbound frame a rate token. The counters live in
//! the primary store so limits hold across processes; when that store is
//! unreachable the controller degrades to a process-local fallback rather
//! than refusing service, and says so in the decision.

use std::sync::Arc;

use crate::domain::admission::AdmissionLimits;
use crate::domain::foundation::{RoomId, SessionId, UserId};
use crate::ports::{counter_keys, CounterStore, StorageError};

/// Why a connection or frame was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The user already holds the maximum number of sessions.
    UserSessionLimit,
    /// The client address already holds the maximum number of sessions.
    AddrSessionLimit,
    /// The room is at capacity.
    RoomFull,
    /// The session spent its message budget.
    RateLimited,
    /// The frame exceeded the payload cap.
    PayloadTooLarge,
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    /// Admitted. `degraded` is true when the local fallback supplied any
    /// of the counters.
    Admitted { degraded: bool },
    Denied(DenyReason),
}

impl AdmissionDecision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, AdmissionDecision::Admitted { .. })
    }
}

pub struct AdmissionController {
    primary: Arc<dyn CounterStore>,
    fallback: Arc<dyn CounterStore>,
    limits: AdmissionLimits,
}

impl AdmissionController {
    pub fn new(
        primary: Arc<dyn CounterStore>,
        fallback: Arc<dyn CounterStore>,
        limits: AdmissionLimits,
    ) -> Self {
        Self {
            primary,
            fallback,
            limits,
        }
    }

    pub fn limits(&self) -> &AdmissionLimits {
        &self.limits
    }

    /// Admits or refuses a connection attempt into a room.
    ///
    /// Counters taken before a refusal are released again, so a denied
    /// attempt leaves no residue.
    pub async fn admit(
        &self,
        user: &UserId,
        addr: &str,
        room: &RoomId,
    ) -> Result<AdmissionDecision, StorageError> {
        let user_key = counter_keys::user_sessions(user);
        let addr_key = counter_keys::addr_sessions(addr);
        let room_key = counter_keys::room_occupancy(room);

        let mut degraded = false;

        let (allowed, fell_back) = self
            .try_increment(&user_key, self.limits.max_sessions_per_user)
            .await?;
        degraded |= fell_back;
        if !allowed {
            return Ok(AdmissionDecision::Denied(DenyReason::UserSessionLimit));
        }

        let (allowed, fell_back) = self
            .try_increment(&addr_key, self.limits.max_sessions_per_addr)
            .await?;
        degraded |= fell_back;
        if !allowed {
            self.decrement(&user_key).await;
            return Ok(AdmissionDecision::Denied(DenyReason::AddrSessionLimit));
        }

        let (allowed, fell_back) = self
            .try_increment(&room_key, self.limits.room_capacity)
            .await?;
        degraded |= fell_back;
        if !allowed {
            self.decrement(&user_key).await;
            self.decrement(&addr_key).await;
            return Ok(AdmissionDecision::Denied(DenyReason::RoomFull));
        }

        Ok(AdmissionDecision::Admitted { degraded })
    }

    /// Releases the counters a disconnecting session held.
    pub async fn release(&self, user: &UserId, addr: &str, room: &RoomId) {
        self.decrement(&counter_keys::user_sessions(user)).await;
        self.decrement(&counter_keys::addr_sessions(addr)).await;
        self.decrement(&counter_keys::room_occupancy(room)).await;
    }

    /// Checks one inbound frame against the session's rate budget.
    pub async fn allow_message(
        &self,
        session: &SessionId,
    ) -> Result<AdmissionDecision, StorageError> {
        let key = counter_keys::session_bucket(&session.to_string());
        let allowed = match self
            .primary
            .try_take_token(&key, self.limits.messages_per_sec, self.limits.message_burst)
            .await
        {
            Ok(allowed) => return Ok(Self::rate_decision(allowed, false)),
            Err(StorageError::Unavailable(reason)) => {
                tracing::warn!(%reason, "primary counter store unavailable, using local fallback");
                self.fallback
                    .try_take_token(&key, self.limits.messages_per_sec, self.limits.message_burst)
                    .await?
            }
            Err(other) => return Err(other),
        };
        Ok(Self::rate_decision(allowed, true))
    }

    /// Checks an inbound frame size against the payload cap.
    pub fn check_payload(&self, size: usize) -> AdmissionDecision {
        if size > self.limits.max_payload_bytes {
            AdmissionDecision::Denied(DenyReason::PayloadTooLarge)
        } else {
            AdmissionDecision::Admitted { degraded: false }
        }
    }

    fn rate_decision(allowed: bool, degraded: bool) -> AdmissionDecision {
        if allowed {
            AdmissionDecision::Admitted { degraded }
        } else {
            AdmissionDecision::Denied(DenyReason::RateLimited)
        }
    }

    async fn try_increment(&self, key: &str, limit: u32) -> Result<(bool, bool), StorageError> {
        match self.primary.try_increment(key, limit).await {
            Ok(allowed) => Ok((allowed, false)),
            Err(StorageError::Unavailable(reason)) => {
                tracing::warn!(%reason, "primary counter store unavailable, using local fallback");
                Ok((self.fallback.try_increment(key, limit).await?, true))
            }
            Err(other) => Err(other),
        }
    }

    /// Fallback-aware decrement; a store that lost the counter anyway has
    /// nothing to release.
    async fn decrement(&self, key: &str) {
        let result = match self.primary.decrement(key).await {
            Err(StorageError::Unavailable(_)) => self.fallback.decrement(key).await,
            other => other,
        };
        if let Err(error) = result {
            tracing::warn!(%error, key, "failed to release admission counter");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryCounterStore;
    use crate::domain::foundation::TournamentId;

    fn controller(limits: AdmissionLimits) -> (AdmissionController, Arc<InMemoryCounterStore>) {
        let primary = Arc::new(InMemoryCounterStore::new());
        let fallback = Arc::new(InMemoryCounterStore::new());
        (
            AdmissionController::new(primary.clone(), fallback, limits),
            primary,
        )
    }

    fn room() -> RoomId {
        RoomId::Tournament(TournamentId::new())
    }

    #[tokio::test]
    async fn user_session_limit_is_enforced() {
        let (c, _) = controller(AdmissionLimits {
            max_sessions_per_user: 2,
            ..AdmissionLimits::default()
        });
        let user = UserId::new("u-1").unwrap();
        let r = room();

        assert!(c.admit(&user, "10.0.0.1", &r).await.unwrap().is_admitted());
        assert!(c.admit(&user, "10.0.0.2", &r).await.unwrap().is_admitted());
        assert_eq!(
            c.admit(&user, "10.0.0.3", &r).await.unwrap(),
            AdmissionDecision::Denied(DenyReason::UserSessionLimit)
        );

        // Releasing one frees a slot.
        c.release(&user, "10.0.0.1", &r).await;
        assert!(c.admit(&user, "10.0.0.3", &r).await.unwrap().is_admitted());
    }

    #[tokio::test]
    async fn room_capacity_denial_leaves_no_residue() {
        let (c, _) = controller(AdmissionLimits {
            room_capacity: 1,
            max_sessions_per_user: 1,
            ..AdmissionLimits::default()
        });
        let r = room();
        let first = UserId::new("u-1").unwrap();
        let second = UserId::new("u-2").unwrap();

        assert!(c.admit(&first, "10.0.0.1", &r).await.unwrap().is_admitted());
        assert_eq!(
            c.admit(&second, "10.0.0.2", &r).await.unwrap(),
            AdmissionDecision::Denied(DenyReason::RoomFull)
        );

        // The denied attempt released its user counter, so the same user
        // can join another room.
        let other = room();
        assert!(c.admit(&second, "10.0.0.2", &other).await.unwrap().is_admitted());
    }

    #[tokio::test]
    async fn primary_outage_degrades_to_local_counters() {
        let (c, primary) = controller(AdmissionLimits {
            max_sessions_per_user: 1,
            ..AdmissionLimits::default()
        });
        primary.set_unavailable(true);
        let user = UserId::new("u-1").unwrap();
        let r = room();

        assert_eq!(
            c.admit(&user, "10.0.0.1", &r).await.unwrap(),
            AdmissionDecision::Admitted { degraded: true }
        );
        // Limits still hold on the fallback.
        assert_eq!(
            c.admit(&user, "10.0.0.1", &r).await.unwrap(),
            AdmissionDecision::Denied(DenyReason::UserSessionLimit)
        );
    }

    #[tokio::test]
    async fn message_rate_exhausts_and_recovers() {
        let clock = Arc::new(std::sync::atomic::AtomicU64::new(0));
        let clock_handle = clock.clone();
        let primary = Arc::new(InMemoryCounterStore::with_clock(move || {
            clock_handle.load(std::sync::atomic::Ordering::SeqCst)
        }));
        let c = AdmissionController::new(
            primary,
            Arc::new(InMemoryCounterStore::new()),
            AdmissionLimits {
                messages_per_sec: 10,
                message_burst: 3,
                ..AdmissionLimits::default()
            },
        );
        let session = SessionId::new();

        for _ in 0..3 {
            assert!(c.allow_message(&session).await.unwrap().is_admitted());
        }
        assert_eq!(
            c.allow_message(&session).await.unwrap(),
            AdmissionDecision::Denied(DenyReason::RateLimited)
        );

        // 100ms at 10/s refills one token.
        clock.store(100, std::sync::atomic::Ordering::SeqCst);
        assert!(c.allow_message(&session).await.unwrap().is_admitted());
    }

    #[tokio::test]
    async fn payload_cap_is_checked_locally() {
        let (c, _) = controller(AdmissionLimits {
            max_payload_bytes: 8,
            ..AdmissionLimits::default()
        });
        assert!(c.check_payload(8).is_admitted());
        assert_eq!(
            c.check_payload(9),
            AdmissionDecision::Denied(DenyReason::PayloadTooLarge)
        );
    }
}
