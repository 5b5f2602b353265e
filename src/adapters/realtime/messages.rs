//! Wire protocol between the gateway and connected clients.
//!
//! Every frame is a JSON object with a `type` field. Inbound frames
//! deserialize through a tagged `ClientMessage`; outbound frames are built
//! by hand so event frames carry the event kind itself as their `type`.
//! Payloads carry opaque identifiers only, never PII.

use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use crate::application::DenyReason;
use crate::domain::disputes::{DisputeDecision, DisputeReason};
use crate::domain::foundation::{
    AuthError, DisputeId, DomainEvent, MatchId, ParticipantId, RoomId, SessionId, Timestamp,
};
use crate::domain::matches::MatchScore;

/// Application close codes in the 4000 range. The 1000 range stays
/// reserved for protocol-level conditions.
pub mod close {
    pub const AUTH_REQUIRED: u16 = 4001;
    pub const TOKEN_EXPIRED: u16 = 4002;
    pub const TOKEN_INVALID: u16 = 4003;
    pub const RATE_LIMITED: u16 = 4008;
    pub const PAYLOAD_TOO_LARGE: u16 = 4009;
    pub const ROOM_FULL: u16 = 4010;
    pub const CONNECTION_LIMIT: u16 = 4011;

    /// RFC 6455 "try again later", used when a backing service is down.
    pub const TRY_AGAIN_LATER: u16 = 1013;
}

/// Maps an authentication failure to its close code.
pub fn close_code_for_auth(error: &AuthError) -> u16 {
    match error {
        AuthError::MissingCredential => close::AUTH_REQUIRED,
        AuthError::TokenExpired => close::TOKEN_EXPIRED,
        AuthError::TokenInvalid => close::TOKEN_INVALID,
        AuthError::ServiceUnavailable(_) => close::TRY_AGAIN_LATER,
    }
}

/// Maps an admission refusal to its close code.
pub fn close_code_for_denial(reason: DenyReason) -> u16 {
    match reason {
        DenyReason::UserSessionLimit => close::CONNECTION_LIMIT,
        DenyReason::AddrSessionLimit => close::CONNECTION_LIMIT,
        DenyReason::RoomFull => close::ROOM_FULL,
        DenyReason::RateLimited => close::RATE_LIMITED,
        DenyReason::PayloadTooLarge => close::PAYLOAD_TOO_LARGE,
    }
}

/// Frames a client may send. Role gating happens in the gateway, not here.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Ping,
    CheckIn {
        match_id: MatchId,
    },
    StartMatch {
        match_id: MatchId,
    },
    ReportScore {
        match_id: MatchId,
        score: MatchScore,
    },
    SubmitResult {
        match_id: MatchId,
        score: MatchScore,
    },
    ConfirmResult {
        match_id: MatchId,
    },
    CancelMatch {
        match_id: MatchId,
    },
    FileDispute {
        match_id: MatchId,
        reason: DisputeReason,
        detail: String,
    },
    ResolveDispute {
        dispute_id: DisputeId,
        decision: DisputeDecision,
        #[serde(default)]
        final_score: Option<MatchScore>,
        #[serde(default)]
        disqualified: Option<ParticipantId>,
        #[serde(default)]
        note: Option<String>,
    },
}

/// Frames the server sends.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// Sent once after a successful join.
    Connected {
        session_id: SessionId,
        room: RoomId,
    },
    /// A broadcast domain event with its per-subject sequence number.
    Event { seq: u64, event: DomainEvent },
    /// Heartbeat reply to a client `ping`.
    Pong,
    /// An inline rejection of one inbound frame. The connection stays up.
    Error { code: String, message: String },
}

impl ServerMessage {
    /// Renders the frame as its wire JSON.
    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }

    fn to_value(&self) -> JsonValue {
        match self {
            ServerMessage::Connected { session_id, room } => json!({
                "type": "connected",
                "session_id": session_id.to_string(),
                "room": room.to_string(),
                "timestamp": Timestamp::now(),
            }),
            ServerMessage::Event { seq, event } => json!({
                "type": event.kind.as_str(),
                "seq": seq,
                "event_id": event.event_id,
                "tournament_id": event.tournament_id,
                "occurred_at": event.occurred_at,
                "data": event.payload,
            }),
            ServerMessage::Pong => json!({
                "type": "pong",
                "timestamp": Timestamp::now(),
            }),
            ServerMessage::Error { code, message } => json!({
                "type": "error",
                "code": code,
                "message": message,
            }),
        }
    }
}

/// What the registry queues toward one connection's send task.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundFrame {
    Message(ServerMessage),
    /// Protocol-level heartbeat probe.
    Ping,
    /// Orderly teardown with an application close code.
    Close { code: u16, reason: String },
}
