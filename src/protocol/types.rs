//! Shared protocol types
//!
//! Wire-level records and constants embedded in several packets: positions,
//! window IDs, ability flags, item stacks and serialized skins.

use std::ops::{Add, Sub};

use bitflags::bitflags;
use uuid::Uuid;

use crate::net::buffer::PacketBuffer;

/// A position or direction in world space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Truncate each component towards zero to get the containing block
    pub fn to_block_pos(self) -> BlockPos {
        BlockPos::new(self.x as i32, self.y as i32, self.z as i32)
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::fmt::Display for Vec3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

/// Integer block coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Encode as varint x, varuint y, varint z
    pub fn encode(&self, buffer: &mut PacketBuffer) {
        buffer.write_varint32(self.x);
        buffer.write_varuint32(self.y as u32);
        buffer.write_varint32(self.z);
    }
}

/// Identifies which on-screen container an inventory update targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum WindowId {
    Inventory = 0,
    OffHand = 119,
}

impl WindowId {
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

bitflags! {
    /// Ability flags sent in the adventure settings packet
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AdventureFlags: u32 {
        const WORLD_IMMUTABLE = 1 << 0;
        const NO_PVP = 1 << 1;
        const AUTO_JUMP = 1 << 5;
        const ALLOW_FLIGHT = 1 << 6;
        const NO_CLIP = 1 << 7;
        const WORLD_BUILDER = 1 << 8;
        const FLYING = 1 << 9;
        const MUTED = 1 << 10;
    }
}

bitflags! {
    /// Actions a player is permitted to perform in the world
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ActionPermissions: u32 {
        const BUILD_AND_MINE = 1 << 0;
        const DOORS_AND_SWITCHES = 1 << 1;
        const OPEN_CONTAINERS = 1 << 2;
        const ATTACK_PLAYERS = 1 << 3;
        const ATTACK_MOBS = 1 << 4;
        const OPERATOR = 1 << 5;
        const TELEPORT = 1 << 7;
    }
}

impl ActionPermissions {
    /// Everything a regular member may do
    pub fn member() -> Self {
        Self::BUILD_AND_MINE
            | Self::DOORS_AND_SWITCHES
            | Self::OPEN_CONTAINERS
            | Self::ATTACK_PLAYERS
            | Self::ATTACK_MOBS
    }
}

/// Player permission level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum PermissionLevel {
    Visitor = 0,
    #[default]
    Member = 1,
    Operator = 2,
    Custom = 3,
}

/// Command permission level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum CommandPermissionLevel {
    #[default]
    Normal = 0,
    Operator = 1,
    Host = 2,
    Automation = 3,
    Admin = 4,
}

/// Discrete game type IDs understood by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum GameType {
    #[default]
    Survival = 0,
    Creative = 1,
    Adventure = 2,
    SurvivalSpectator = 3,
    CreativeSpectator = 4,
}

impl GameType {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// Wire representation of an item type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NetworkItemType {
    pub network_id: i32,
    pub metadata_value: i16,
}

/// Wire representation of an item stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NetworkItemStack {
    pub item_type: NetworkItemType,
    pub count: i16,
}

impl NetworkItemStack {
    /// Encode the stack. Air (network ID 0) is a single zero varint.
    pub fn encode(&self, buffer: &mut PacketBuffer) {
        buffer.write_varint32(self.item_type.network_id);
        if self.item_type.network_id == 0 {
            return;
        }
        let aux = ((self.item_type.metadata_value as i32) << 8) | (self.count as i32 & 0xff);
        buffer.write_varint32(aux);
        // No NBT, no can-place-on, no can-break
        buffer.write_i16_le(0);
        buffer.write_varint32(0);
        buffer.write_varint32(0);
    }
}

/// Kind of a skin animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum SkinAnimationType {
    #[default]
    None = 0,
    Head = 1,
    Body32x32 = 2,
    Body128x128 = 3,
}

/// Serialized skin animation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SerializedAnimation {
    pub image_width: u32,
    pub image_height: u32,
    pub image_data: Vec<u8>,
    pub animation_type: SkinAnimationType,
    pub frame_count: f32,
}

impl SerializedAnimation {
    pub fn encode(&self, buffer: &mut PacketBuffer) {
        buffer.write_u32_le(self.image_width);
        buffer.write_u32_le(self.image_height);
        buffer.write_byte_slice(&self.image_data);
        buffer.write_u32_le(self.animation_type as u32);
        buffer.write_f32_le(self.frame_count);
    }
}

/// Serialized skin as carried in player list entries
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SerializedSkin {
    pub skin_id: String,
    pub skin_resource_patch: Vec<u8>,
    pub skin_image_width: u32,
    pub skin_image_height: u32,
    pub skin_data: Vec<u8>,
    pub animations: Vec<SerializedAnimation>,
    pub cape_image_width: u32,
    pub cape_image_height: u32,
    pub cape_data: Vec<u8>,
    pub skin_geometry: Vec<u8>,
    pub animation_data: Vec<u8>,
    pub premium_skin: bool,
    pub persona_skin: bool,
    pub persona_cape_on_classic_skin: bool,
    pub cape_id: String,
    pub full_skin_id: String,
}

impl SerializedSkin {
    pub fn encode(&self, buffer: &mut PacketBuffer) {
        buffer.write_string(&self.skin_id);
        buffer.write_byte_slice(&self.skin_resource_patch);
        buffer.write_u32_le(self.skin_image_width);
        buffer.write_u32_le(self.skin_image_height);
        buffer.write_byte_slice(&self.skin_data);
        buffer.write_u32_le(self.animations.len() as u32);
        for animation in &self.animations {
            animation.encode(buffer);
        }
        buffer.write_u32_le(self.cape_image_width);
        buffer.write_u32_le(self.cape_image_height);
        buffer.write_byte_slice(&self.cape_data);
        buffer.write_byte_slice(&self.skin_geometry);
        buffer.write_byte_slice(&self.animation_data);
        buffer.write_bool(self.premium_skin);
        buffer.write_bool(self.persona_skin);
        buffer.write_bool(self.persona_cape_on_classic_skin);
        buffer.write_string(&self.cape_id);
        buffer.write_string(&self.full_skin_id);
    }
}

/// Player list action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PlayerListAction {
    Add = 0,
    Remove = 1,
}

/// One row of the client's player list
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerListEntry {
    pub uuid: Uuid,
    pub entity_unique_id: i64,
    pub username: String,
    pub xuid: String,
    pub platform_chat_id: String,
    pub build_platform: i32,
    pub skin: SerializedSkin,
    /// Education edition instructor flag
    pub is_instructor: bool,
    pub host: bool,
}

impl PlayerListEntry {
    /// Entry carrying only the UUID, as used by remove records
    pub fn removal(uuid: Uuid) -> Self {
        Self {
            uuid,
            ..Default::default()
        }
    }

    /// Encode the entry for the given action
    pub fn encode(&self, action: PlayerListAction, buffer: &mut PacketBuffer) {
        buffer.write_uuid(&self.uuid);
        if action == PlayerListAction::Remove {
            return;
        }
        buffer.write_varint64(self.entity_unique_id);
        buffer.write_string(&self.username);
        buffer.write_string(&self.xuid);
        buffer.write_string(&self.platform_chat_id);
        buffer.write_i32_le(self.build_platform);
        self.skin.encode(buffer);
        buffer.write_bool(self.is_instructor);
        buffer.write_bool(self.host);
    }
}
