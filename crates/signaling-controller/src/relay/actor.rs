//! `RelayActor` - single task owning all room and binding state.
//!
//! Every inbound client message and every disconnect funnels into one
//! mailbox, so room mutations are serialized without locks. The actor owns:
//! - the [`RoomRegistry`] (rooms, participants, capabilities, succession)
//! - the binding map from connection id to `(room, participant)`
//!
//! Handlers never block: outbound delivery goes through unbounded
//! per-connection senders, so a slow client can never stall the mailbox.
//!
//! # Admission flow
//!
//! `room:create` and `room:join` are the only request/response operations.
//! On success the requester receives the `-result` ack, then `room:joined`
//! with the roster and ICE servers, while everyone already in the room gets
//! `room:user-joined`. On failure only the `-result` ack is sent, carrying a
//! client-safe error string.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::errors::SignalingError;
use crate::metrics;
use crate::protocol::{ClientMessage, IceServer, ParticipantUpdates, ServerMessage};
use crate::registry::{CapabilityUpdate, RemovalOutcome, RoomRegistry};

use super::ConnectionRef;

/// Mailbox buffer for the relay actor.
const RELAY_CHANNEL_BUFFER: usize = 500;

/// Messages accepted by the relay mailbox.
enum RelayCommand {
    /// A parsed client frame, tagged with its source connection.
    Inbound {
        connection: ConnectionRef,
        message: ClientMessage,
    },
    /// Transport closed; run the same cleanup as an explicit leave.
    Disconnected { connection_id: String },
    /// Point-in-time counters for readiness and tests.
    GetStats {
        respond_to: oneshot::Sender<RelayStats>,
    },
}

/// Snapshot of relay state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayStats {
    pub rooms: usize,
    pub participants: usize,
    pub bound_connections: usize,
}

/// Where a bound connection lives.
#[derive(Debug, Clone)]
struct Binding {
    room_id: String,
    participant_id: String,
}

/// Handle to the relay actor. Cloned into every connection task.
#[derive(Clone)]
pub struct RelayHandle {
    sender: mpsc::Sender<RelayCommand>,
    cancel_token: CancellationToken,
}

impl RelayHandle {
    /// Spawn the relay actor and return its handle.
    #[must_use]
    pub fn new(ice_servers: Vec<IceServer>) -> Self {
        let (sender, receiver) = mpsc::channel(RELAY_CHANNEL_BUFFER);
        let cancel_token = CancellationToken::new();

        let actor = RelayActor::new(receiver, cancel_token.clone(), ice_servers);
        tokio::spawn(actor.run());

        Self {
            sender,
            cancel_token,
        }
    }

    /// Forward a parsed client frame.
    pub async fn message(
        &self,
        connection: ConnectionRef,
        message: ClientMessage,
    ) -> Result<(), SignalingError> {
        self.sender
            .send(RelayCommand::Inbound {
                connection,
                message,
            })
            .await
            .map_err(|e| SignalingError::Internal(format!("channel send failed: {e}")))
    }

    /// Notify of a transport disconnect.
    pub async fn disconnected(&self, connection_id: String) -> Result<(), SignalingError> {
        self.sender
            .send(RelayCommand::Disconnected { connection_id })
            .await
            .map_err(|e| SignalingError::Internal(format!("channel send failed: {e}")))
    }

    /// Current room and participant counts.
    pub async fn stats(&self) -> Result<RelayStats, SignalingError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(RelayCommand::GetStats { respond_to: tx })
            .await
            .map_err(|e| SignalingError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| SignalingError::Internal(format!("response receive failed: {e}")))
    }

    /// Stop the actor. In-flight mailbox entries are dropped.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

/// The relay actor. Constructed and spawned by [`RelayHandle::new`].
pub struct RelayActor {
    receiver: mpsc::Receiver<RelayCommand>,
    cancel_token: CancellationToken,
    registry: RoomRegistry,
    bindings: HashMap<String, Binding>,
    ice_servers: Vec<IceServer>,
}

impl RelayActor {
    fn new(
        receiver: mpsc::Receiver<RelayCommand>,
        cancel_token: CancellationToken,
        ice_servers: Vec<IceServer>,
    ) -> Self {
        Self {
            receiver,
            cancel_token,
            registry: RoomRegistry::new(),
            bindings: HashMap::new(),
            ice_servers,
        }
    }

    async fn run(mut self) {
        info!(target: "signaling.relay", "Relay actor started");

        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => {
                    info!(
                        target: "signaling.relay",
                        rooms = self.registry.room_count(),
                        "Relay actor shutting down"
                    );
                    break;
                }
                command = self.receiver.recv() => {
                    match command {
                        Some(command) => self.handle_command(command),
                        None => {
                            debug!(target: "signaling.relay", "Relay mailbox closed");
                            break;
                        }
                    }
                }
            }
        }
    }

    fn handle_command(&mut self, command: RelayCommand) {
        match command {
            RelayCommand::Inbound {
                connection,
                message,
            } => self.handle_message(connection, message),
            RelayCommand::Disconnected { connection_id } => {
                self.remove_connection(&connection_id);
            }
            RelayCommand::GetStats { respond_to } => {
                let _ = respond_to.send(RelayStats {
                    rooms: self.registry.room_count(),
                    participants: self.registry.participant_count(),
                    bound_connections: self.bindings.len(),
                });
            }
        }
    }

    #[instrument(skip_all, fields(connection_id = %connection.id))]
    fn handle_message(&mut self, connection: ConnectionRef, message: ClientMessage) {
        match message {
            ClientMessage::RoomCreate { password, username } => {
                self.handle_create(connection, password, username);
            }
            ClientMessage::RoomJoin {
                room_id,
                password,
                username,
            } => self.handle_join(connection, room_id, password, username),
            ClientMessage::RoomLeave => self.remove_connection(&connection.id),
            ClientMessage::Offer { target_id, offer } => {
                self.relay_to_peer(&connection, &target_id, "offer", |from_id| {
                    ServerMessage::Offer {
                        from_id,
                        offer,
                    }
                });
            }
            ClientMessage::Answer { target_id, answer } => {
                self.relay_to_peer(&connection, &target_id, "answer", |from_id| {
                    ServerMessage::Answer {
                        from_id,
                        answer,
                    }
                });
            }
            ClientMessage::IceCandidate {
                target_id,
                candidate,
            } => {
                self.relay_to_peer(&connection, &target_id, "ice-candidate", |from_id| {
                    ServerMessage::IceCandidate {
                        from_id,
                        candidate,
                    }
                });
            }
            ClientMessage::Chat { message } => self.handle_chat(&connection, message),
            ClientMessage::AdminKick { target_id } => self.handle_kick(&connection, &target_id),
            ClientMessage::AdminMute { target_id, muted } => {
                self.handle_capability(
                    &connection,
                    &target_id,
                    CapabilityUpdate {
                        is_muted: Some(muted),
                        ..CapabilityUpdate::default()
                    },
                    ServerMessage::Muted { muted },
                    ParticipantUpdates {
                        is_muted: Some(muted),
                        ..ParticipantUpdates::default()
                    },
                );
            }
            ClientMessage::AdminVideoOff {
                target_id,
                video_off,
            } => {
                self.handle_capability(
                    &connection,
                    &target_id,
                    CapabilityUpdate {
                        is_video_off: Some(video_off),
                        ..CapabilityUpdate::default()
                    },
                    ServerMessage::VideoOff { video_off },
                    ParticipantUpdates {
                        is_video_off: Some(video_off),
                        ..ParticipantUpdates::default()
                    },
                );
            }
            ClientMessage::AdminChatPermission {
                target_id,
                can_chat,
            } => {
                self.handle_capability(
                    &connection,
                    &target_id,
                    CapabilityUpdate {
                        can_chat: Some(can_chat),
                        ..CapabilityUpdate::default()
                    },
                    ServerMessage::ChatPermission { can_chat },
                    ParticipantUpdates {
                        can_chat: Some(can_chat),
                        ..ParticipantUpdates::default()
                    },
                );
            }
            ClientMessage::AdminTransfer { target_id } => {
                self.handle_transfer(&connection, &target_id);
            }
            ClientMessage::AdminSetPriority {
                target_id,
                priority,
            } => self.handle_set_priority(&connection, &target_id, priority),
        }
    }

    fn handle_create(
        &mut self,
        connection: ConnectionRef,
        password: Option<String>,
        username: String,
    ) {
        if let Err(err) = self.check_unbound(&connection.id) {
            connection.send(ServerMessage::CreateResult {
                success: false,
                room_id: None,
                error: Some(err.client_message()),
            });
            return;
        }
        let username = username.trim().to_string();
        if username.is_empty() {
            connection.send(ServerMessage::CreateResult {
                success: false,
                room_id: None,
                error: Some(SignalingError::UsernameRequired.client_message()),
            });
            return;
        }

        let room_id = self.registry.create_room(password);
        let Some(participant) =
            self.registry
                .add_participant(&room_id, connection.clone(), username)
        else {
            // Unreachable in practice; the room was just created.
            self.registry.delete_room(&room_id);
            connection.send(ServerMessage::CreateResult {
                success: false,
                room_id: None,
                error: Some(SignalingError::AdmissionFailed(room_id).client_message()),
            });
            return;
        };

        self.bindings.insert(
            connection.id.clone(),
            Binding {
                room_id: room_id.clone(),
                participant_id: participant.id.clone(),
            },
        );

        metrics::room_opened();
        metrics::participant_joined();
        info!(
            target: "signaling.relay",
            room_id = %room_id,
            participant_id = %participant.id,
            "Room created"
        );

        connection.send(ServerMessage::CreateResult {
            success: true,
            room_id: Some(room_id.clone()),
            error: None,
        });
        connection.send(ServerMessage::Joined {
            user_id: participant.id,
            users: self.registry.participants_public(&room_id),
            ice_servers: self.ice_servers.clone(),
        });
    }

    fn handle_join(
        &mut self,
        connection: ConnectionRef,
        room_id: String,
        password: Option<String>,
        username: String,
    ) {
        let result = self.admit(&connection, &room_id, password.as_deref(), username);
        match result {
            Ok(participant_id) => {
                let users = self.registry.participants_public(&room_id);
                let is_admin = self.registry.is_admin(&room_id, &participant_id);

                info!(
                    target: "signaling.relay",
                    room_id = %room_id,
                    participant_id = %participant_id,
                    "Participant joined"
                );

                connection.send(ServerMessage::JoinResult {
                    success: true,
                    user_id: Some(participant_id.clone()),
                    users: Some(users.clone()),
                    is_admin: Some(is_admin),
                    error: None,
                });
                connection.send(ServerMessage::Joined {
                    user_id: participant_id,
                    users,
                    ice_servers: self.ice_servers.clone(),
                });
            }
            Err(err) => {
                debug!(
                    target: "signaling.relay",
                    room_id = %room_id,
                    error = %err,
                    "Join rejected"
                );
                connection.send(ServerMessage::JoinResult {
                    success: false,
                    user_id: None,
                    users: None,
                    is_admin: None,
                    error: Some(err.client_message()),
                });
            }
        }
    }

    /// Admission gate: unbound connection, room exists, password matches,
    /// username non-empty. Broadcasts `room:user-joined` to the existing
    /// roster before returning.
    fn admit(
        &mut self,
        connection: &ConnectionRef,
        room_id: &str,
        password: Option<&str>,
        username: String,
    ) -> Result<String, SignalingError> {
        self.check_unbound(&connection.id)?;

        if self.registry.room(room_id).is_none() {
            return Err(SignalingError::RoomNotFound(room_id.to_string()));
        }
        if !self.registry.validate_password(room_id, password) {
            return Err(SignalingError::InvalidPassword);
        }
        let username = username.trim().to_string();
        if username.is_empty() {
            return Err(SignalingError::UsernameRequired);
        }

        let participant = self
            .registry
            .add_participant(room_id, connection.clone(), username)
            .ok_or_else(|| SignalingError::AdmissionFailed(room_id.to_string()))?;

        // Everyone already present learns about the newcomer; the newcomer
        // gets the full roster via room:joined instead.
        let summary = participant.summary();
        self.broadcast_except(room_id, &participant.id, ServerMessage::UserJoined {
            user: summary,
        });

        self.bindings.insert(
            connection.id.clone(),
            Binding {
                room_id: room_id.to_string(),
                participant_id: participant.id.clone(),
            },
        );
        metrics::participant_joined();

        Ok(participant.id)
    }

    fn check_unbound(&self, connection_id: &str) -> Result<(), SignalingError> {
        if self.bindings.contains_key(connection_id) {
            return Err(SignalingError::AlreadyBound);
        }
        Ok(())
    }

    /// Shared cleanup for explicit leave and transport disconnect.
    #[instrument(skip_all, fields(connection_id = %connection_id))]
    fn remove_connection(&mut self, connection_id: &str) {
        self.bindings.remove(connection_id);

        // The binding may already be gone (kick path unbinds first), so fall
        // back to a registry scan keyed by connection id.
        let Some((room, participant)) = self.registry.find_by_connection(connection_id) else {
            return;
        };
        let room_id = room.id.clone();
        let participant_id = participant.id.clone();

        self.remove_participant(&room_id, &participant_id);
    }

    /// Remove from the registry, then broadcast `room:user-left` and handle
    /// succession or room deletion.
    fn remove_participant(&mut self, room_id: &str, participant_id: &str) {
        match self.registry.remove_participant(room_id, participant_id) {
            RemovalOutcome::NotFound => {}
            RemovalOutcome::RoomDeleted => {
                metrics::participant_left();
                metrics::room_closed();
                info!(
                    target: "signaling.relay",
                    room_id = %room_id,
                    "Room closed (last participant left)"
                );
            }
            RemovalOutcome::Removed { promoted } => {
                metrics::participant_left();
                self.broadcast(room_id, ServerMessage::UserLeft {
                    user_id: participant_id.to_string(),
                });

                if let Some(new_admin) = promoted {
                    info!(
                        target: "signaling.relay",
                        room_id = %room_id,
                        participant_id = %new_admin,
                        "Admin succession"
                    );
                    self.notify_promoted(room_id, &new_admin);
                }
            }
        }
    }

    /// Tell the new admin directly, then the whole room via `user-updated`.
    fn notify_promoted(&self, room_id: &str, participant_id: &str) {
        if let Some(participant) = self.registry.participant(room_id, participant_id) {
            participant.connection.send(ServerMessage::Promoted);
        }
        self.broadcast(room_id, ServerMessage::UserUpdated {
            user_id: participant_id.to_string(),
            updates: ParticipantUpdates {
                is_admin: Some(true),
                ..ParticipantUpdates::default()
            },
        });
    }

    /// Route a WebRTC payload to one peer in the sender's room. Unbound
    /// senders and unknown targets are dropped silently; media negotiation
    /// retries on its own.
    fn relay_to_peer(
        &self,
        connection: &ConnectionRef,
        target_id: &str,
        kind: &'static str,
        build: impl FnOnce(String) -> ServerMessage,
    ) {
        let Some(binding) = self.bindings.get(&connection.id) else {
            debug!(
                target: "signaling.relay",
                kind,
                "Dropping relay from unbound connection"
            );
            return;
        };
        let Some(target) = self.registry.participant(&binding.room_id, target_id) else {
            debug!(
                target: "signaling.relay",
                room_id = %binding.room_id,
                target_id = %target_id,
                kind,
                "Dropping relay to unknown target"
            );
            return;
        };

        metrics::message_relayed(kind);
        target
            .connection
            .send(build(binding.participant_id.clone()));
    }

    /// Chat broadcast, sender included. `can_chat` is re-checked on every
    /// message so a revocation takes effect immediately.
    fn handle_chat(&self, connection: &ConnectionRef, message: String) {
        let Some(binding) = self.bindings.get(&connection.id) else {
            return;
        };
        let Some(sender) = self
            .registry
            .participant(&binding.room_id, &binding.participant_id)
        else {
            return;
        };
        if !sender.can_chat {
            debug!(
                target: "signaling.relay",
                room_id = %binding.room_id,
                participant_id = %sender.id,
                "Dropping chat from muted-chat participant"
            );
            return;
        }

        metrics::chat_broadcast();
        self.broadcast(&binding.room_id, ServerMessage::Chat {
            from_id: sender.id.clone(),
            username: sender.username.clone(),
            message,
            timestamp: Utc::now().timestamp_millis(),
        });
    }

    /// Resolve the sender's binding if and only if they are the room admin.
    /// Non-admin attempts are logged and ignored; no error goes back.
    fn admin_binding(&self, connection: &ConnectionRef, action: &'static str) -> Option<Binding> {
        let binding = self.bindings.get(&connection.id)?;
        if !self
            .registry
            .is_admin(&binding.room_id, &binding.participant_id)
        {
            warn!(
                target: "signaling.relay",
                room_id = %binding.room_id,
                participant_id = %binding.participant_id,
                action,
                "Ignoring admin action from non-admin"
            );
            return None;
        }
        Some(binding.clone())
    }

    fn handle_kick(&mut self, connection: &ConnectionRef, target_id: &str) {
        let Some(binding) = self.admin_binding(connection, "kick") else {
            return;
        };
        // Admins cannot be kicked, which also rules out self-kick.
        if self.registry.is_admin(&binding.room_id, target_id) {
            warn!(
                target: "signaling.relay",
                room_id = %binding.room_id,
                target_id = %target_id,
                "Refusing to kick the room admin"
            );
            return;
        }
        let Some(target) = self.registry.participant(&binding.room_id, target_id) else {
            return;
        };
        let target_connection_id = target.connection.id.clone();

        info!(
            target: "signaling.relay",
            room_id = %binding.room_id,
            target_id = %target_id,
            "Participant kicked"
        );

        // Notify the target before removal so the event still has a route,
        // then unbind so a follow-up disconnect is a no-op.
        target.connection.send(ServerMessage::Kicked);
        self.bindings.remove(&target_connection_id);
        self.remove_participant(&binding.room_id, target_id);
    }

    /// Shared path for mute, video-off and chat-permission: update the
    /// registry, notify the target directly, broadcast the change.
    fn handle_capability(
        &mut self,
        connection: &ConnectionRef,
        target_id: &str,
        update: CapabilityUpdate,
        target_event: ServerMessage,
        updates: ParticipantUpdates,
    ) {
        let Some(binding) = self.admin_binding(connection, "capability") else {
            return;
        };
        if self
            .registry
            .update_participant(&binding.room_id, target_id, update)
            .is_none()
        {
            debug!(
                target: "signaling.relay",
                room_id = %binding.room_id,
                target_id = %target_id,
                "Capability update for unknown participant"
            );
            return;
        }

        if let Some(target) = self.registry.participant(&binding.room_id, target_id) {
            target.connection.send(target_event);
        }
        self.broadcast(&binding.room_id, ServerMessage::UserUpdated {
            user_id: target_id.to_string(),
            updates,
        });
    }

    fn handle_transfer(&mut self, connection: &ConnectionRef, target_id: &str) {
        let Some(binding) = self.admin_binding(connection, "transfer") else {
            return;
        };
        if !self
            .registry
            .transfer_admin(&binding.room_id, &binding.participant_id, target_id)
        {
            debug!(
                target: "signaling.relay",
                room_id = %binding.room_id,
                target_id = %target_id,
                "Admin transfer failed"
            );
            return;
        }

        info!(
            target: "signaling.relay",
            room_id = %binding.room_id,
            from_id = %binding.participant_id,
            to_id = %target_id,
            "Admin transferred"
        );

        self.notify_promoted(&binding.room_id, target_id);
        self.broadcast(&binding.room_id, ServerMessage::UserUpdated {
            user_id: binding.participant_id.clone(),
            updates: ParticipantUpdates {
                is_admin: Some(false),
                ..ParticipantUpdates::default()
            },
        });
    }

    fn handle_set_priority(&mut self, connection: &ConnectionRef, target_id: &str, priority: i64) {
        let Some(binding) = self.admin_binding(connection, "set-priority") else {
            return;
        };
        if !self
            .registry
            .set_priority(&binding.room_id, target_id, priority)
        {
            return;
        }

        self.broadcast(&binding.room_id, ServerMessage::UserUpdated {
            user_id: target_id.to_string(),
            updates: ParticipantUpdates {
                admin_priority: Some(priority),
                ..ParticipantUpdates::default()
            },
        });
    }

    fn broadcast(&self, room_id: &str, message: ServerMessage) {
        let Some(room) = self.registry.room(room_id) else {
            return;
        };
        for participant in room.participants.values() {
            participant.connection.send(message.clone());
        }
    }

    fn broadcast_except(&self, room_id: &str, except_id: &str, message: ServerMessage) {
        let Some(room) = self.registry.room(room_id) else {
            return;
        };
        for participant in room.participants.values() {
            if participant.id != except_id {
                participant.connection.send(message.clone());
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn test_ice_servers() -> Vec<IceServer> {
        vec![IceServer {
            urls: "stun:stun.example.org:3478".to_string(),
            username: None,
            credential: None,
        }]
    }

    fn test_client() -> (ConnectionRef, UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ConnectionRef::new(tx), rx)
    }

    async fn recv(rx: &mut UnboundedReceiver<ServerMessage>) -> ServerMessage {
        tokio::time::timeout(std::time::Duration::from_secs(1), rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("channel closed")
    }

    async fn create_room(
        relay: &RelayHandle,
        conn: &ConnectionRef,
        rx: &mut UnboundedReceiver<ServerMessage>,
        username: &str,
    ) -> (String, String) {
        relay
            .message(
                conn.clone(),
                ClientMessage::RoomCreate {
                    password: None,
                    username: username.to_string(),
                },
            )
            .await
            .unwrap();

        let room_id = match recv(rx).await {
            ServerMessage::CreateResult {
                success: true,
                room_id: Some(room_id),
                ..
            } => room_id,
            other => panic!("unexpected reply: {other:?}"),
        };
        let user_id = match recv(rx).await {
            ServerMessage::Joined { user_id, .. } => user_id,
            other => panic!("unexpected reply: {other:?}"),
        };
        (room_id, user_id)
    }

    #[tokio::test]
    async fn test_create_replies_with_ack_then_joined() {
        let relay = RelayHandle::new(test_ice_servers());
        let (conn, mut rx) = test_client();

        relay
            .message(
                conn.clone(),
                ClientMessage::RoomCreate {
                    password: Some("pw".to_string()),
                    username: "alice".to_string(),
                },
            )
            .await
            .unwrap();

        match recv(&mut rx).await {
            ServerMessage::CreateResult {
                success: true,
                room_id: Some(room_id),
                error: None,
            } => assert_eq!(room_id.len(), 12),
            other => panic!("unexpected reply: {other:?}"),
        }
        match recv(&mut rx).await {
            ServerMessage::Joined {
                users, ice_servers, ..
            } => {
                assert_eq!(users.len(), 1);
                assert!(users[0].is_admin);
                assert_eq!(ice_servers, test_ice_servers());
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_requires_username() {
        let relay = RelayHandle::new(test_ice_servers());
        let (conn, mut rx) = test_client();

        relay
            .message(
                conn.clone(),
                ClientMessage::RoomCreate {
                    password: None,
                    username: "   ".to_string(),
                },
            )
            .await
            .unwrap();

        match recv(&mut rx).await {
            ServerMessage::CreateResult {
                success: false,
                error: Some(error),
                ..
            } => assert_eq!(error, "Username is required"),
            other => panic!("unexpected reply: {other:?}"),
        }

        let stats = relay.stats().await.unwrap();
        assert_eq!(stats.rooms, 0);
    }

    #[tokio::test]
    async fn test_bound_connection_cannot_create_again() {
        let relay = RelayHandle::new(test_ice_servers());
        let (conn, mut rx) = test_client();
        create_room(&relay, &conn, &mut rx, "alice").await;

        relay
            .message(
                conn.clone(),
                ClientMessage::RoomCreate {
                    password: None,
                    username: "alice".to_string(),
                },
            )
            .await
            .unwrap();

        match recv(&mut rx).await {
            ServerMessage::CreateResult {
                success: false,
                error: Some(error),
                ..
            } => assert_eq!(error, "Already in a room"),
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_join_unknown_room_rejected() {
        let relay = RelayHandle::new(test_ice_servers());
        let (conn, mut rx) = test_client();

        relay
            .message(
                conn.clone(),
                ClientMessage::RoomJoin {
                    room_id: "nope00000000".to_string(),
                    password: None,
                    username: "bob".to_string(),
                },
            )
            .await
            .unwrap();

        match recv(&mut rx).await {
            ServerMessage::JoinResult {
                success: false,
                error: Some(error),
                ..
            } => assert_eq!(error, "Room not found"),
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stats_track_rooms_and_bindings() {
        let relay = RelayHandle::new(test_ice_servers());
        let (conn, mut rx) = test_client();
        create_room(&relay, &conn, &mut rx, "alice").await;

        let stats = relay.stats().await.unwrap();
        assert_eq!(
            stats,
            RelayStats {
                rooms: 1,
                participants: 1,
                bound_connections: 1,
            }
        );

        relay.message(conn.clone(), ClientMessage::RoomLeave).await.unwrap();

        let stats = relay.stats().await.unwrap();
        assert_eq!(stats.rooms, 0);
        assert_eq!(stats.bound_connections, 0);
    }
}
