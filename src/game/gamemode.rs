//! Game modes
//!
//! A closed set of game modes with an explicit table of the ability flags and
//! game type ID the client needs for each.

use serde::{Deserialize, Serialize};

use crate::protocol::types::{AdventureFlags, GameType};

/// Game mode of a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Survival,
    Creative,
    Adventure,
    Spectator,
}

impl GameMode {
    /// Ability flags that make up this game mode on the client
    pub fn flags(self) -> AdventureFlags {
        match self {
            GameMode::Survival => AdventureFlags::empty(),
            GameMode::Creative => AdventureFlags::ALLOW_FLIGHT,
            GameMode::Adventure => AdventureFlags::WORLD_IMMUTABLE,
            GameMode::Spectator => {
                AdventureFlags::WORLD_IMMUTABLE
                    | AdventureFlags::ALLOW_FLIGHT
                    | AdventureFlags::MUTED
                    | AdventureFlags::NO_CLIP
                    | AdventureFlags::NO_PVP
            }
        }
    }

    /// Game type ID sent with the set player game type packet
    pub fn game_type(self) -> GameType {
        match self {
            GameMode::Survival => GameType::Survival,
            GameMode::Creative => GameType::Creative,
            GameMode::Adventure => GameType::Adventure,
            GameMode::Spectator => GameType::CreativeSpectator,
        }
    }

    /// Map a numeric ID (0-3) to a game mode; anything else is survival
    pub fn from_id(id: i32) -> Self {
        match id {
            1 => GameMode::Creative,
            2 => GameMode::Adventure,
            3 => GameMode::Spectator,
            _ => GameMode::Survival,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GameMode::Survival => "survival",
            GameMode::Creative => "creative",
            GameMode::Adventure => "adventure",
            GameMode::Spectator => "spectator",
        }
    }
}

impl std::fmt::Display for GameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
