//! Metrics definitions for the signaling controller.
//!
//! All metrics follow Prometheus naming conventions:
//! - `signaling_` prefix
//! - `_total` suffix for counters
//!
//! # Cardinality
//!
//! The only label is `kind` on the relay counter, bounded by the three
//! WebRTC message types.

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Initialize the Prometheus metrics recorder and return the handle for
/// serving metrics via HTTP.
///
/// # Errors
///
/// Returns an error if a recorder is already installed for this process.
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus metrics recorder: {e}"))
}

/// A room was created.
///
/// Metric: `signaling_rooms_active`
pub fn room_opened() {
    gauge!("signaling_rooms_active").increment(1.0);
}

/// A room was deleted (last participant left).
pub fn room_closed() {
    gauge!("signaling_rooms_active").decrement(1.0);
}

/// A participant was admitted to a room.
///
/// Metrics: `signaling_participants_active`, `signaling_participants_total`
pub fn participant_joined() {
    gauge!("signaling_participants_active").increment(1.0);
    counter!("signaling_participants_total").increment(1);
}

/// A participant left, disconnected or was kicked.
pub fn participant_left() {
    gauge!("signaling_participants_active").decrement(1.0);
}

/// A WebRTC payload was relayed to a peer.
///
/// Metric: `signaling_messages_relayed_total`
/// Labels: `kind` (offer, answer, ice-candidate)
pub fn message_relayed(kind: &'static str) {
    counter!("signaling_messages_relayed_total", "kind" => kind).increment(1);
}

/// A chat message was broadcast to a room.
///
/// Metric: `signaling_chat_messages_total`
pub fn chat_broadcast() {
    counter!("signaling_chat_messages_total").increment(1);
}
