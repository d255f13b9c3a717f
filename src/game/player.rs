//! Player module
//!
//! The entity a session controls on behalf of its client:
//! - Identity (UUID, name, XUID)
//! - Position and rotation
//! - Skin and game mode

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;
use uuid::Uuid;

use crate::game::gamemode::GameMode;
use crate::game::skin::Skin;
use crate::protocol::types::Vec3;

/// An entity that can be driven by a client session
pub trait Controllable: Send + Sync {
    /// Stable identity of the entity
    fn uuid(&self) -> Uuid;

    /// Display name
    fn name(&self) -> String;

    /// Xbox user ID, empty when offline
    fn xuid(&self) -> String;

    /// Current position
    fn position(&self) -> Vec3;

    /// Current yaw in degrees
    fn yaw(&self) -> f32;

    /// Current pitch in degrees
    fn pitch(&self) -> f32;

    /// Move by a relative offset
    fn move_by(&self, delta: Vec3);

    /// Rotate by relative yaw and pitch
    fn rotate(&self, yaw: f32, pitch: f32);

    /// Skin shown to other players
    fn skin(&self) -> Arc<Skin>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Rotation {
    yaw: f32,
    pitch: f32,
}

/// A player entity
pub struct Player {
    uuid: Uuid,
    name: String,
    xuid: String,
    position: RwLock<Vec3>,
    rotation: RwLock<Rotation>,
    skin: RwLock<Arc<Skin>>,
    game_mode: RwLock<GameMode>,
}

impl Player {
    /// Create a new player at the origin
    pub fn new(name: impl Into<String>, xuid: impl Into<String>, skin: Skin) -> Self {
        Self::with_uuid(Uuid::new_v4(), name, xuid, skin)
    }

    /// Create a player with a known UUID
    pub fn with_uuid(
        uuid: Uuid,
        name: impl Into<String>,
        xuid: impl Into<String>,
        skin: Skin,
    ) -> Self {
        Self {
            uuid,
            name: name.into(),
            xuid: xuid.into(),
            position: RwLock::new(Vec3::ZERO),
            rotation: RwLock::new(Rotation::default()),
            skin: RwLock::new(Arc::new(skin)),
            game_mode: RwLock::new(GameMode::default()),
        }
    }

    /// Place the player at an absolute position
    pub fn teleport(&self, position: Vec3) {
        *self.position.write() = position;
    }

    /// Replace the skin
    pub fn set_skin(&self, skin: Skin) {
        *self.skin.write() = Arc::new(skin);
    }

    pub fn game_mode(&self) -> GameMode {
        *self.game_mode.read()
    }

    pub fn set_game_mode(&self, mode: GameMode) {
        *self.game_mode.write() = mode;
    }
}

impl Controllable for Player {
    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn xuid(&self) -> String {
        self.xuid.clone()
    }

    fn position(&self) -> Vec3 {
        *self.position.read()
    }

    fn yaw(&self) -> f32 {
        self.rotation.read().yaw
    }

    fn pitch(&self) -> f32 {
        self.rotation.read().pitch
    }

    fn move_by(&self, delta: Vec3) {
        let mut position = self.position.write();
        *position = *position + delta;
        trace!(player = %self.name, position = %*position, "Player moved");
    }

    fn rotate(&self, yaw: f32, pitch: f32) {
        let mut rotation = self.rotation.write();
        rotation.yaw += yaw;
        rotation.pitch += pitch;
    }

    fn skin(&self) -> Arc<Skin> {
        self.skin.read().clone()
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("uuid", &self.uuid)
            .field("name", &self.name)
            .field("position", &self.position())
            .field("game_mode", &self.game_mode())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steve() -> Player {
        Player::new("Steve", "2535400000000000", Skin::default())
    }

    #[test]
    fn test_player_creation() {
        let player = steve();
        assert_eq!(player.name(), "Steve");
        assert_eq!(player.xuid(), "2535400000000000");
        assert_eq!(player.position(), Vec3::ZERO);
        assert_eq!(player.game_mode(), GameMode::Survival);
    }

    #[test]
    fn test_move_by_is_relative() {
        let player = steve();
        player.teleport(Vec3::new(10.0, 20.0, 30.0));
        player.move_by(Vec3::new(2.0, 0.0, 3.0));
        player.move_by(Vec3::new(-1.0, 1.0, 0.0));

        assert_eq!(player.position(), Vec3::new(11.0, 21.0, 33.0));
    }

    #[test]
    fn test_rotate_is_relative() {
        let player = steve();
        player.rotate(90.0, 10.0);
        player.rotate(-30.0, 5.0);

        assert_eq!(player.yaw(), 60.0);
        assert_eq!(player.pitch(), 15.0);
    }

    #[test]
    fn test_skin_is_shared() {
        let player = steve();
        let before = player.skin();
        player.set_skin(Skin::default());

        assert!(!Arc::ptr_eq(&before, &player.skin()));
    }

    #[test]
    fn test_uuids_are_unique() {
        assert_ne!(steve().uuid(), steve().uuid());
    }
}
