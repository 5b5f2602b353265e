//! WebSocket connection gateway.
//!
//! Handles the HTTP upgrade onto tournament and match rooms. A connection
//! is admitted in stages: credential verification, participant resolution,
//! admission counters, then room join. Failures close the socket with an
//! application close code rather than a bare HTTP error, so clients always
//! learn why they were refused.
//!
//! Inbound frames pass payload-cap, then rate-limit, then parse, then
//! dispatch. Command authorization lives in the application services; the
//! gateway only translates their errors onto the wire.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
        ConnectInfo, Path, Query, State,
    },
    response::Response,
    routing::get,
    Router,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::application::{
    AdmissionController, AdmissionDecision, DisputeWorkflow, MatchLifecycleController,
    ResolveCommand,
};
use crate::domain::foundation::{
    CallerIdentity, MatchId, RoomId, SessionId, Timestamp, TournamentId,
};
use crate::ports::{RoleResolver, TokenVerifier};

use super::messages::{
    close, close_code_for_auth, close_code_for_denial, ClientMessage, OutboundFrame, ServerMessage,
};
use super::rooms::{RoomRegistry, SessionInfo};

/// Everything a connection needs, shared across all handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub verifier: Arc<dyn TokenVerifier>,
    pub resolver: Arc<dyn RoleResolver>,
    pub admission: Arc<AdmissionController>,
    pub registry: Arc<RoomRegistry>,
    pub lifecycle: Arc<MatchLifecycleController>,
    pub disputes: Arc<DisputeWorkflow>,
}

#[derive(Debug, Deserialize)]
struct ConnectQuery {
    #[serde(default)]
    token: Option<String>,
}

/// Builds the live routes.
pub fn gateway_router(state: GatewayState) -> Router {
    Router::new()
        .route("/live/tournaments/:tournament_id", get(tournament_ws))
        .route(
            "/live/tournaments/:tournament_id/matches/:match_id",
            get(match_ws),
        )
        .with_state(state)
}

async fn tournament_ws(
    ws: WebSocketUpgrade,
    Path(tournament_id): Path<TournamentId>,
    Query(query): Query<ConnectQuery>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<GatewayState>,
) -> Response {
    let room = RoomId::Tournament(tournament_id);
    ws.on_upgrade(move |socket| {
        handle_socket(socket, state, tournament_id, room, query.token, addr)
    })
}

async fn match_ws(
    ws: WebSocketUpgrade,
    Path((tournament_id, match_id)): Path<(TournamentId, MatchId)>,
    Query(query): Query<ConnectQuery>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<GatewayState>,
) -> Response {
    let room = RoomId::Match(match_id);
    ws.on_upgrade(move |socket| {
        handle_socket(socket, state, tournament_id, room, query.token, addr)
    })
}

/// Runs one connection from admission to teardown.
async fn handle_socket(
    socket: WebSocket,
    state: GatewayState,
    tournament_id: TournamentId,
    room: RoomId,
    token: Option<String>,
    addr: SocketAddr,
) {
    let (mut sink, mut stream) = socket.split();

    let mut caller = match state.verifier.verify(token.as_deref().unwrap_or("")).await {
        Ok(caller) => caller,
        Err(error) => {
            close_now(&mut sink, close_code_for_auth(&error), &error.to_string()).await;
            return;
        }
    };

    caller.participant_id = match state
        .resolver
        .participant_for(&caller.user_id, tournament_id)
        .await
    {
        Ok(participant) => participant,
        Err(error) => {
            tracing::warn!(%error, "participant resolution failed");
            close_now(&mut sink, close::TRY_AGAIN_LATER, "registration unavailable").await;
            return;
        }
    };

    let client_addr = addr.ip().to_string();
    match state.admission.admit(&caller.user_id, &client_addr, &room).await {
        Ok(AdmissionDecision::Admitted { degraded }) => {
            if degraded {
                tracing::warn!(%room, "session admitted on degraded local counters");
            }
        }
        Ok(AdmissionDecision::Denied(reason)) => {
            close_now(&mut sink, close_code_for_denial(reason), "admission denied").await;
            return;
        }
        Err(error) => {
            tracing::warn!(%error, "admission check failed");
            close_now(&mut sink, close::TRY_AGAIN_LATER, "admission unavailable").await;
            return;
        }
    }

    let session_id = SessionId::new();
    let (tx, rx) = mpsc::unbounded_channel();
    state
        .registry
        .join(
            SessionInfo {
                id: session_id,
                user: caller.user_id.clone(),
                addr: client_addr.clone(),
                room,
            },
            tx.clone(),
        )
        .await;

    let _ = tx.send(OutboundFrame::Message(ServerMessage::Connected {
        session_id,
        room,
    }));

    let send_task = tokio::spawn(drain_outbound(sink, rx));

    let mut session = Session {
        state: &state,
        caller,
        session_id,
        tx,
        strikes: 0,
    };

    while let Some(incoming) = stream.next().await {
        match incoming {
            Ok(Message::Text(text)) => {
                session.state.registry.touch(session_id).await;
                if !session.process(&text).await {
                    break;
                }
            }
            Ok(Message::Pong(_)) | Ok(Message::Ping(_)) => {
                session.state.registry.touch(session_id).await;
            }
            Ok(Message::Binary(_)) => {
                session
                    .send(ServerMessage::Error {
                        code: "invalid".into(),
                        message: "binary frames are not supported".into(),
                    })
                    .await;
            }
            Ok(Message::Close(_)) => break,
            Err(error) => {
                tracing::debug!(%session_id, %error, "receive error");
                break;
            }
        }
    }

    // Teardown: free the room slot and counters, then let the send task
    // drain its queue and exit on channel close.
    if let Some(info) = state.registry.leave(session_id).await {
        state
            .admission
            .release(&info.user, &info.addr, &info.room)
            .await;
    }
    drop(session);
    let _ = send_task.await;
}

/// Per-connection command context.
struct Session<'a> {
    state: &'a GatewayState,
    caller: CallerIdentity,
    session_id: SessionId,
    tx: mpsc::UnboundedSender<OutboundFrame>,
    strikes: u32,
}

impl Session<'_> {
    async fn send(&self, message: ServerMessage) {
        let _ = self.tx.send(OutboundFrame::Message(message));
    }

    fn close(&self, code: u16, reason: &str) {
        let _ = self.tx.send(OutboundFrame::Close {
            code,
            reason: reason.to_string(),
        });
    }

    /// Handles one text frame. Returns false when the connection should
    /// be torn down.
    async fn process(&mut self, text: &str) -> bool {
        if !self.state.admission.check_payload(text.len()).is_admitted() {
            self.close(close::PAYLOAD_TOO_LARGE, "payload exceeds cap");
            return false;
        }

        match self.state.admission.allow_message(&self.session_id).await {
            Ok(AdmissionDecision::Admitted { .. }) => {}
            Ok(AdmissionDecision::Denied(_)) => {
                self.strikes += 1;
                if self.strikes >= self.state.admission.limits().strike_limit {
                    self.close(close::RATE_LIMITED, "message rate exceeded");
                    return false;
                }
                self.send(ServerMessage::Error {
                    code: "rejected".into(),
                    message: "message rate exceeded, slow down".into(),
                })
                .await;
                return true;
            }
            Err(error) => {
                tracing::warn!(%error, "rate check failed");
                self.send(ServerMessage::Error {
                    code: "unavailable".into(),
                    message: "try again later".into(),
                })
                .await;
                return true;
            }
        }

        let message = match serde_json::from_str::<ClientMessage>(text) {
            Ok(message) => message,
            Err(error) => {
                self.send(ServerMessage::Error {
                    code: "invalid".into(),
                    message: format!("malformed frame: {error}"),
                })
                .await;
                return true;
            }
        };

        self.dispatch(message).await;
        true
    }

    async fn dispatch(&self, message: ClientMessage) {
        let now = Timestamp::now();
        let outcome = match message {
            ClientMessage::Ping => {
                self.send(ServerMessage::Pong).await;
                return;
            }
            ClientMessage::CheckIn { match_id } => self
                .state
                .lifecycle
                .check_in(&self.caller, match_id, now)
                .await
                .map(|_| ()),
            ClientMessage::StartMatch { match_id } => {
                self.state.lifecycle.start(&self.caller, match_id, now).await
            }
            ClientMessage::ReportScore { match_id, score } => {
                self.state
                    .lifecycle
                    .report_live_score(&self.caller, match_id, score)
                    .await
            }
            ClientMessage::SubmitResult { match_id, score } => {
                self.state
                    .lifecycle
                    .submit_result(&self.caller, match_id, score)
                    .await
            }
            ClientMessage::ConfirmResult { match_id } => self
                .state
                .lifecycle
                .confirm_result(&self.caller, match_id, now)
                .await
                .map(|_| ()),
            ClientMessage::CancelMatch { match_id } => {
                self.state.lifecycle.cancel(&self.caller, match_id).await
            }
            ClientMessage::FileDispute {
                match_id,
                reason,
                detail,
            } => self
                .state
                .disputes
                .open(&self.caller, match_id, reason, detail, now)
                .await
                .map(|_| ()),
            ClientMessage::ResolveDispute {
                dispute_id,
                decision,
                final_score,
                disqualified,
                note,
            } => self
                .state
                .disputes
                .resolve(
                    &self.caller,
                    dispute_id,
                    ResolveCommand {
                        decision,
                        final_score,
                        disqualified,
                        note,
                    },
                    now,
                )
                .await
                .map(|_| ()),
        };

        if let Err(error) = outcome {
            self.send(ServerMessage::Error {
                code: error.code().to_string(),
                message: error.to_string(),
            })
            .await;
        }
    }
}

/// Forwards queued frames onto the socket until the queue closes or a
/// close frame goes out.
async fn drain_outbound(
    mut sink: SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<OutboundFrame>,
) {
    while let Some(frame) = rx.recv().await {
        let result = match frame {
            OutboundFrame::Message(message) => sink.send(Message::Text(message.to_json())).await,
            OutboundFrame::Ping => sink.send(Message::Ping(Vec::new())).await,
            OutboundFrame::Close { code, reason } => {
                let _ = sink
                    .send(Message::Close(Some(CloseFrame {
                        code,
                        reason: reason.into(),
                    })))
                    .await;
                return;
            }
        };
        if result.is_err() {
            return;
        }
    }
}

async fn close_now(sink: &mut SplitSink<WebSocket, Message>, code: u16, reason: &str) {
    let _ = sink
        .send(Message::Close(Some(CloseFrame {
            code,
            reason: reason.to_string().into(),
        })))
        .await;
}
