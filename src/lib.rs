//! Bedrock Session Library
//!
//! The per-connection session layer of a Bedrock edition game server. A
//! session translates server-side state (position, inventory, skin, game mode)
//! into packets for its client and keeps the client's view of other players
//! consistent.
//!
//! ## Modules
//!
//! - `config` - Session configuration management
//! - `error` - Error types and result definitions
//! - `game` - Players, inventories, skins and chunk loading
//! - `logging` - Tracing subscriber setup
//! - `net` - Buffers, connections and session management
//! - `protocol` - Bedrock packets and wire types

pub mod config;
pub mod error;
pub mod game;
pub mod logging;
pub mod net;
pub mod protocol;

// Re-export commonly used types
pub use config::SessionConfig;
pub use error::{Result, SessionError};
pub use game::gamemode::GameMode;
pub use net::session::{ClientData, Session, SessionManager};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
