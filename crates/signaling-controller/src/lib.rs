//! Signaling controller library.
//!
//! Room and session coordination for peer-to-peer video conferencing:
//! rooms with optional passwords, admin roles with succession, WebRTC
//! signaling relay, chat with per-participant permissions, and admin
//! moderation. Media flows peer to peer; this service only coordinates.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod errors;
pub mod ice;
pub mod metrics;
pub mod protocol;
pub mod registry;
pub mod relay;
pub mod server;
