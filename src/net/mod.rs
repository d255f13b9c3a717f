//! Networking module
//!
//! This module handles the per-connection side of the server:
//! - Packet buffers with the Bedrock primitive encodings
//! - Outbound connections
//! - Entity runtime ID bookkeeping
//! - Session management

pub mod buffer;
pub mod connection;
pub mod registry;
pub mod session;
