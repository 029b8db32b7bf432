//! Slack integration - Socket Mode bot interface
//!
//! This crate provides the Slack surface for drover:
//! - **Socket Mode** (`socket`) - WebSocket ingress loop with reconnection
//! - **Events** (`events`) - inbound message envelopes and dispatch
//! - **Outbound** (`outbound`) - text and attachment-card sending
//! - **Identity** (`identity`) - `users.info` display-name lookup
//! - **Responder** (`responder`) - canned single-turn replies
//! - **Sessions** (`sessions`) - trigger routing plus in-flight
//!   conversation instances keyed by (channel, user)
//!
//! # Architecture
//!
//! ```text
//! Slack Envelopes → EventDispatcher → SessionService ─┬→ Static responder
//!                                                     └→ Flow engine → Search
//!                                         ↓
//!                                     ChatSender → chat.postMessage
//! ```

pub mod events;
pub mod identity;
pub mod outbound;
pub mod responder;
pub mod sessions;
pub mod socket;
