//! Wire protocol for the signaling WebSocket.
//!
//! Every frame is a JSON object with a `type` field selecting the message.
//! Field names are camelCase on the wire. WebRTC payloads (`offer`, `answer`,
//! `candidate`) are opaque [`serde_json::Value`]s relayed verbatim between
//! peers; the controller never inspects them.
//!
//! The transport has no acknowledgement channel, so the two request/response
//! operations (`room:create`, `room:join`) get correlated reply events
//! (`room:create-result`, `room:join-result`). Everything else is
//! fire-and-forget in both directions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messages a client may send to the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Create a new room and join it as the first participant (admin).
    #[serde(rename = "room:create", rename_all = "camelCase")]
    RoomCreate {
        #[serde(default)]
        password: Option<String>,
        username: String,
    },

    /// Join an existing room.
    #[serde(rename = "room:join", rename_all = "camelCase")]
    RoomJoin {
        room_id: String,
        #[serde(default)]
        password: Option<String>,
        username: String,
    },

    /// Leave the current room. Equivalent to a transport disconnect, except
    /// the connection survives and may create or join again.
    #[serde(rename = "room:leave")]
    RoomLeave,

    /// Relay a WebRTC offer to one peer in the same room.
    #[serde(rename = "webrtc:offer", rename_all = "camelCase")]
    Offer { target_id: String, offer: Value },

    /// Relay a WebRTC answer to one peer in the same room.
    #[serde(rename = "webrtc:answer", rename_all = "camelCase")]
    Answer { target_id: String, answer: Value },

    /// Relay an ICE candidate to one peer in the same room.
    #[serde(rename = "webrtc:ice-candidate", rename_all = "camelCase")]
    IceCandidate { target_id: String, candidate: Value },

    /// Broadcast a chat message to the room (sender included).
    #[serde(rename = "chat:message")]
    Chat { message: String },

    /// Admin: remove a non-admin participant from the room.
    #[serde(rename = "admin:kick", rename_all = "camelCase")]
    AdminKick { target_id: String },

    /// Admin: set a participant's enforced mute flag.
    #[serde(rename = "admin:mute", rename_all = "camelCase")]
    AdminMute { target_id: String, muted: bool },

    /// Admin: set a participant's enforced video-off flag.
    #[serde(rename = "admin:video-off", rename_all = "camelCase")]
    AdminVideoOff { target_id: String, video_off: bool },

    /// Admin: grant or revoke a participant's chat capability.
    #[serde(rename = "admin:chat-permission", rename_all = "camelCase")]
    AdminChatPermission { target_id: String, can_chat: bool },

    /// Admin: hand the admin role to another participant.
    #[serde(rename = "admin:transfer", rename_all = "camelCase")]
    AdminTransfer { target_id: String },

    /// Admin: overwrite a participant's succession priority (lower wins).
    #[serde(rename = "admin:set-priority", rename_all = "camelCase")]
    AdminSetPriority { target_id: String, priority: i64 },
}

/// Events the controller sends to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Reply to `room:create`.
    #[serde(rename = "room:create-result", rename_all = "camelCase")]
    CreateResult {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// Reply to `room:join`.
    #[serde(rename = "room:join-result", rename_all = "camelCase")]
    JoinResult {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        users: Option<Vec<ParticipantSummary>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        is_admin: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// Sent to a participant right after a successful create or join.
    #[serde(rename = "room:joined", rename_all = "camelCase")]
    Joined {
        user_id: String,
        users: Vec<ParticipantSummary>,
        ice_servers: Vec<IceServer>,
    },

    /// A new participant entered the room (sent to everyone else).
    #[serde(rename = "room:user-joined")]
    UserJoined { user: ParticipantSummary },

    /// A participant left the room.
    #[serde(rename = "room:user-left", rename_all = "camelCase")]
    UserLeft { user_id: String },

    /// Protocol-level error notification (e.g. malformed frame).
    #[serde(rename = "room:error")]
    RoomError { message: String },

    #[serde(rename = "webrtc:offer", rename_all = "camelCase")]
    Offer { from_id: String, offer: Value },

    #[serde(rename = "webrtc:answer", rename_all = "camelCase")]
    Answer { from_id: String, answer: Value },

    #[serde(rename = "webrtc:ice-candidate", rename_all = "camelCase")]
    IceCandidate { from_id: String, candidate: Value },

    /// Chat broadcast. `timestamp` is server-assigned, milliseconds since epoch.
    #[serde(rename = "chat:message", rename_all = "camelCase")]
    Chat {
        from_id: String,
        username: String,
        message: String,
        timestamp: i64,
    },

    /// Sent to a participant who was kicked, immediately before removal.
    #[serde(rename = "admin:kicked")]
    Kicked,

    /// Sent to the target of an `admin:mute`.
    #[serde(rename = "admin:muted")]
    Muted { muted: bool },

    /// Sent to the target of an `admin:video-off`.
    #[serde(rename = "admin:video-off", rename_all = "camelCase")]
    VideoOff { video_off: bool },

    /// Sent to the target of an `admin:chat-permission`.
    #[serde(rename = "admin:chat-permission", rename_all = "camelCase")]
    ChatPermission { can_chat: bool },

    /// Room-wide notification that a participant's flags changed.
    #[serde(rename = "admin:user-updated", rename_all = "camelCase")]
    UserUpdated {
        user_id: String,
        updates: ParticipantUpdates,
    },

    /// Sent to a participant who just became admin (succession or transfer).
    #[serde(rename = "admin:promoted")]
    Promoted,
}

/// Public view of a participant. Never carries the connection handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantSummary {
    pub id: String,
    pub username: String,
    pub is_admin: bool,
    pub can_chat: bool,
    pub is_muted: bool,
    pub is_video_off: bool,
    pub admin_priority: i64,
}

/// Partial participant update carried by `admin:user-updated`.
/// Only the fields that changed are present on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParticipantUpdates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_chat: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_muted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_video_off: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_priority: Option<i64>,
}

/// One ICE server entry handed to clients on join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceServer {
    pub urls: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

/// Response body of `GET /ice-servers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceServersResponse {
    pub ice_servers: Vec<IceServer>,
}
