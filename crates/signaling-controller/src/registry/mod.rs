//! Room registry and participant lifecycle.
//!
//! [`RoomRegistry`] owns the room-id → room mapping and everything inside it:
//! admission, removal with admin succession, capability updates, admin
//! transfer and priority overrides. It is a plain synchronous structure with
//! no interior locking - the relay actor owns one instance exclusively, which
//! serializes every mutation by construction.
//!
//! Invariants upheld here:
//! - A room with zero participants is deleted immediately.
//! - Whenever a room is non-empty, `admin_id` names a present participant and
//!   exactly that participant has `is_admin = true`.
//! - The first admitted participant becomes admin with priority 0; later
//!   joiners get priority = current room size.
//! - When the admin leaves, the remaining participant with the lowest
//!   `admin_priority` is promoted; ties break on the lower participant id so
//!   succession is deterministic.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::protocol::ParticipantSummary;
use crate::relay::ConnectionRef;

/// Length of a room id in hex chars (48 bits of entropy).
const ROOM_ID_LEN: usize = 12;

/// One connected user within a room.
#[derive(Debug, Clone)]
pub struct Participant {
    pub id: String,
    /// Transport handle for targeted delivery. Never exposed in summaries.
    pub connection: ConnectionRef,
    pub username: String,
    pub room_id: String,
    pub is_admin: bool,
    pub can_chat: bool,
    pub is_muted: bool,
    pub is_video_off: bool,
    /// Succession rank; lower wins. Defaults to join order, admin-mutable.
    pub admin_priority: i64,
}

impl Participant {
    /// Public view without the connection handle.
    #[must_use]
    pub fn summary(&self) -> ParticipantSummary {
        ParticipantSummary {
            id: self.id.clone(),
            username: self.username.clone(),
            is_admin: self.is_admin,
            can_chat: self.can_chat,
            is_muted: self.is_muted,
            is_video_off: self.is_video_off,
            admin_priority: self.admin_priority,
        }
    }
}

/// An isolated meeting session.
#[derive(Debug)]
pub struct Room {
    pub id: String,
    /// `None` means open room; compared exactly, case-sensitive.
    pub password: Option<String>,
    /// Empty only while the room has no participants (transiently).
    pub admin_id: String,
    pub participants: HashMap<String, Participant>,
    /// Informational only.
    pub created_at: DateTime<Utc>,
}

/// Partial capability update; only set fields change.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapabilityUpdate {
    pub can_chat: Option<bool>,
    pub is_muted: Option<bool>,
    pub is_video_off: Option<bool>,
}

/// Result of [`RoomRegistry::remove_participant`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// Room or participant did not exist; nothing changed.
    NotFound,
    /// Last participant removed; the room was deleted.
    RoomDeleted,
    /// Participant removed. If the admin left, `promoted` names the
    /// successor.
    Removed { promoted: Option<String> },
}

/// In-memory registry of all live rooms. State is ephemeral; nothing
/// survives a process restart.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<String, Room>,
}

impl RoomRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty room and return its id. Always succeeds.
    pub fn create_room(&mut self, password: Option<String>) -> String {
        let mut id = new_room_id();
        // 48-bit ids make collisions vanishingly rare, but regeneration is
        // cheap and keeps the id unique within the process lifetime.
        while self.rooms.contains_key(&id) {
            id = new_room_id();
        }

        let room = Room {
            id: id.clone(),
            password: password.filter(|p| !p.is_empty()),
            admin_id: String::new(),
            participants: HashMap::new(),
            created_at: Utc::now(),
        };
        self.rooms.insert(id.clone(), room);
        id
    }

    #[must_use]
    pub fn room(&self, room_id: &str) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    /// Idempotent removal; unknown ids are a no-op.
    pub fn delete_room(&mut self, room_id: &str) {
        self.rooms.remove(room_id);
    }

    #[must_use]
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    #[must_use]
    pub fn participant_count(&self) -> usize {
        self.rooms.values().map(|r| r.participants.len()).sum()
    }

    /// True if the room has no password, or the supplied value matches
    /// exactly. Unknown rooms fail the gate.
    #[must_use]
    pub fn validate_password(&self, room_id: &str, supplied: Option<&str>) -> bool {
        let Some(room) = self.rooms.get(room_id) else {
            return false;
        };
        match room.password.as_deref() {
            None => true,
            Some(expected) => supplied == Some(expected),
        }
    }

    /// Admit a participant into an existing room.
    ///
    /// The first participant becomes admin with priority 0; everyone after
    /// joins at the back of the succession queue (priority = room size).
    /// Returns `None` if the room does not exist.
    pub fn add_participant(
        &mut self,
        room_id: &str,
        connection: ConnectionRef,
        username: String,
    ) -> Option<Participant> {
        let room = self.rooms.get_mut(room_id)?;

        let is_first = room.participants.is_empty();
        let participant = Participant {
            id: Uuid::new_v4().simple().to_string(),
            connection,
            username,
            room_id: room_id.to_string(),
            is_admin: is_first,
            can_chat: true,
            is_muted: false,
            is_video_off: false,
            admin_priority: i64::try_from(room.participants.len()).unwrap_or(i64::MAX),
        };

        if is_first {
            room.admin_id.clone_from(&participant.id);
        }

        room.participants
            .insert(participant.id.clone(), participant.clone());
        Some(participant)
    }

    /// Remove a participant; delete the room if it becomes empty, otherwise
    /// run admin succession if the admin left.
    pub fn remove_participant(&mut self, room_id: &str, participant_id: &str) -> RemovalOutcome {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return RemovalOutcome::NotFound;
        };
        if room.participants.remove(participant_id).is_none() {
            return RemovalOutcome::NotFound;
        }

        if room.participants.is_empty() {
            self.rooms.remove(room_id);
            return RemovalOutcome::RoomDeleted;
        }

        if room.admin_id != participant_id {
            return RemovalOutcome::Removed { promoted: None };
        }

        // Succession: lowest priority wins, lower id breaks ties.
        let successor = room
            .participants
            .values()
            .min_by_key(|p| (p.admin_priority, p.id.clone()))
            .map(|p| p.id.clone());

        match successor {
            Some(next_id) => {
                if let Some(next) = room.participants.get_mut(&next_id) {
                    next.is_admin = true;
                }
                room.admin_id.clone_from(&next_id);
                RemovalOutcome::Removed {
                    promoted: Some(next_id),
                }
            }
            None => RemovalOutcome::Removed { promoted: None },
        }
    }

    #[must_use]
    pub fn participant(&self, room_id: &str, participant_id: &str) -> Option<&Participant> {
        self.rooms.get(room_id)?.participants.get(participant_id)
    }

    /// Reverse lookup by connection id, scanning all rooms. O(total
    /// participants), used on the disconnect path only.
    #[must_use]
    pub fn find_by_connection(&self, connection_id: &str) -> Option<(&Room, &Participant)> {
        self.rooms.values().find_map(|room| {
            room.participants
                .values()
                .find(|p| p.connection.id == connection_id)
                .map(|p| (room, p))
        })
    }

    /// Public participant list, ordered by `(admin_priority, id)` for a
    /// stable display order. Empty for unknown rooms.
    #[must_use]
    pub fn participants_public(&self, room_id: &str) -> Vec<ParticipantSummary> {
        let Some(room) = self.rooms.get(room_id) else {
            return Vec::new();
        };
        let mut summaries: Vec<ParticipantSummary> =
            room.participants.values().map(Participant::summary).collect();
        summaries.sort_by(|a, b| (a.admin_priority, &a.id).cmp(&(b.admin_priority, &b.id)));
        summaries
    }

    /// Partial capability update; only the provided fields change.
    pub fn update_participant(
        &mut self,
        room_id: &str,
        participant_id: &str,
        updates: CapabilityUpdate,
    ) -> Option<ParticipantSummary> {
        let room = self.rooms.get_mut(room_id)?;
        let participant = room.participants.get_mut(participant_id)?;

        if let Some(can_chat) = updates.can_chat {
            participant.can_chat = can_chat;
        }
        if let Some(is_muted) = updates.is_muted {
            participant.is_muted = is_muted;
        }
        if let Some(is_video_off) = updates.is_video_off {
            participant.is_video_off = is_video_off;
        }
        Some(participant.summary())
    }

    #[must_use]
    pub fn is_admin(&self, room_id: &str, participant_id: &str) -> bool {
        self.rooms
            .get(room_id)
            .is_some_and(|room| room.admin_id == participant_id)
    }

    /// Transfer the admin role. Succeeds only if `from_id` is the current
    /// admin and both participants exist; no partial state change on failure.
    pub fn transfer_admin(&mut self, room_id: &str, from_id: &str, to_id: &str) -> bool {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return false;
        };
        if room.admin_id != from_id
            || !room.participants.contains_key(from_id)
            || !room.participants.contains_key(to_id)
        {
            return false;
        }

        if let Some(from) = room.participants.get_mut(from_id) {
            from.is_admin = false;
        }
        if let Some(to) = room.participants.get_mut(to_id) {
            to.is_admin = true;
        }
        room.admin_id = to_id.to_string();
        true
    }

    /// Overwrite a participant's succession priority. Negative values are
    /// accepted; callers clamp if they care.
    pub fn set_priority(&mut self, room_id: &str, participant_id: &str, priority: i64) -> bool {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return false;
        };
        let Some(participant) = room.participants.get_mut(participant_id) else {
            return false;
        };
        participant.admin_priority = priority;
        true
    }
}

fn new_room_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    id.get(..ROOM_ID_LEN).unwrap_or(&id).to_string()
}
