//! Game module
//!
//! The server-side state a session translates for its client:
//! - Players and the `Controllable` capability
//! - Inventories, items and skins
//! - Game modes
//! - Chunk loading around a moving viewer

pub mod gamemode;
pub mod inventory;
pub mod item;
pub mod player;
pub mod skin;
pub mod world;
