//! Per-connection handler: welcome, message routing, and cleanup.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Assign a random participant id → send `welcome`
//!   2. Loop: inbound client messages → coordinator, room events → client
//!   3. On close, error, or idle timeout → leave the current room

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use planpoker_protocol::{ClientMessage, Codec, ParticipantId, RoomId, ServerEvent};
use planpoker_room::{EventSender, RoomError};
use planpoker_transport::{Connection, WebSocketConnection};
use rand::Rng;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::server::ServerState;
use crate::PlanPokerError;

/// Drop guard that takes the participant out of its room when the
/// handler exits, however it exits.
///
/// `Drop` is synchronous, so the leave is sent from a spawned task.
struct Membership<C: Codec> {
    participant_id: ParticipantId,
    room_id: Option<RoomId>,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for Membership<C> {
    fn drop(&mut self) {
        let Some(room_id) = self.room_id.take() else {
            return;
        };
        let participant_id = self.participant_id.clone();
        let coordinator = self.state.coordinator.clone();
        tokio::spawn(async move {
            let _ = coordinator.leave(room_id, participant_id).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), PlanPokerError> {
    let conn_id = conn.id();
    let participant_id = generate_participant_id();
    tracing::info!(
        %conn_id,
        %participant_id,
        peer = %conn.peer_addr(),
        "client connected"
    );

    send_event(
        &conn,
        &state.codec,
        &ServerEvent::Welcome {
            participant_id: participant_id.clone(),
        },
    )
    .await?;

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let mut membership = Membership {
        participant_id,
        room_id: None,
        state: Arc::clone(&state),
    };
    let mut deadline = Instant::now() + state.idle_timeout;

    loop {
        tokio::select! {
            inbound = tokio::time::timeout_at(deadline, conn.recv()) => {
                let data = match inbound {
                    Ok(Ok(Some(data))) => data,
                    Ok(Ok(None)) => {
                        tracing::info!(%conn_id, "client disconnected");
                        break;
                    }
                    Ok(Err(e)) => {
                        tracing::debug!(%conn_id, error = %e, "recv error");
                        break;
                    }
                    Err(_) => {
                        tracing::info!(%conn_id, "connection idle, closing");
                        let _ = conn.close().await;
                        break;
                    }
                };
                deadline = Instant::now() + state.idle_timeout;
                handle_message(&conn, &state, &mut membership, &events_tx, &data).await?;
            }
            Some(event) = events_rx.recv() => {
                send_event(&conn, &state.codec, &event).await?;
            }
        }
    }

    // membership drops here → leave fires.
    Ok(())
}

/// Decodes one client message and applies it.
async fn handle_message<C: Codec>(
    conn: &WebSocketConnection,
    state: &ServerState<C>,
    membership: &mut Membership<C>,
    events_tx: &EventSender,
    data: &[u8],
) -> Result<(), PlanPokerError> {
    let msg: ClientMessage = match state.codec.decode(data) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::debug!(
                participant_id = %membership.participant_id,
                error = %e,
                "failed to decode client message"
            );
            return send_error(conn, &state.codec, 400, &format!("invalid message: {e}")).await;
        }
    };
    if let Err(e) = msg.validate() {
        return send_error(conn, &state.codec, 400, &e.to_string()).await;
    }

    let coordinator = &state.coordinator;
    let participant_id = membership.participant_id.clone();

    match msg {
        ClientMessage::JoinRoom { room_id, username } => {
            let result = coordinator
                .join(room_id.clone(), participant_id.clone(), username, events_tx.clone())
                .await;
            match result {
                Ok(()) => {
                    // One room per connection: the previous room is left only
                    // once the new one has accepted us.
                    let previous = membership.room_id.replace(room_id.clone());
                    if let Some(previous) = previous.filter(|r| *r != room_id) {
                        coordinator.leave(previous, participant_id).await?;
                    }
                }
                Err(e @ RoomError::RoomFull { .. }) => {
                    send_error(conn, &state.codec, 409, &e.to_string()).await?;
                }
                Err(e) => return Err(e.into()),
            }
        }

        ClientMessage::LeaveRoom { room_id } => {
            if membership.room_id.as_ref() == Some(&room_id) {
                membership.room_id = None;
                coordinator.leave(room_id, participant_id).await?;
            } else {
                tracing::debug!(%participant_id, %room_id, "leave for a room not joined");
            }
        }

        ClientMessage::Vote { room_id, value } => {
            coordinator.vote(room_id, participant_id, value).await?;
        }

        ClientMessage::Reset { room_id } => {
            coordinator.reset(room_id).await?;
        }

        ClientMessage::StartTimer { room_id, duration } => {
            coordinator.start_timer(room_id, duration).await?;
        }

        ClientMessage::StopTimer { room_id } => {
            coordinator.stop_timer(room_id).await?;
        }

        ClientMessage::Ping { client_time } => {
            let pong = ServerEvent::Pong {
                client_time,
                server_time: now_millis(),
            };
            send_event(conn, &state.codec, &pong).await?;
        }
    }

    Ok(())
}

/// Encodes and sends one event to this connection only.
async fn send_event(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    event: &ServerEvent,
) -> Result<(), PlanPokerError> {
    let bytes = codec.encode(event)?;
    conn.send(&bytes).await?;
    Ok(())
}

async fn send_error(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    code: u16,
    message: &str,
) -> Result<(), PlanPokerError> {
    let event = ServerEvent::Error {
        code,
        message: message.to_string(),
    };
    send_event(conn, codec, &event).await
}

/// A fresh participant id: 16 random bytes, hex encoded.
fn generate_participant_id() -> ParticipantId {
    let bytes: [u8; 16] = rand::rng().random();
    ParticipantId(bytes.iter().map(|b| format!("{b:02x}")).collect())
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
