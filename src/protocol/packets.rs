//! Packet definitions module
//!
//! Defines packet IDs, the encode/decode traits and every packet the session
//! layer sends or receives. A frame on the wire is the varuint32 packet ID
//! followed by the packet body.

use std::collections::HashMap;
use std::sync::OnceLock;

use uuid::Uuid;

use crate::net::buffer::PacketBuffer;
use crate::protocol::types::{
    ActionPermissions, AdventureFlags, BlockPos, CommandPermissionLevel, GameType,
    NetworkItemStack, PermissionLevel, PlayerListAction, PlayerListEntry, Vec3,
};

/// Bedrock packet IDs used by the session layer
pub mod id {
    pub const DISCONNECT: u32 = 0x05;
    pub const MOVE_PLAYER: u32 = 0x13;
    pub const INVENTORY_SLOT: u32 = 0x32;
    pub const ADVENTURE_SETTINGS: u32 = 0x37;
    pub const SET_PLAYER_GAME_TYPE: u32 = 0x3e;
    pub const PLAYER_LIST: u32 = 0x3f;
    pub const TRANSFER: u32 = 0x55;
    pub const NETWORK_CHUNK_PUBLISHER_UPDATE: u32 = 0x79;
}

/// Incoming packet trait
pub trait IncomingPacket: Sized {
    /// The packet ID
    const ID: u32;

    /// Decode the packet body from a buffer
    fn decode(buffer: &mut PacketBuffer) -> Result<Self, PacketDecodeError>;
}

/// Outgoing packet trait
pub trait OutgoingPacket {
    /// The packet ID
    const ID: u32;

    /// Encode the packet body to a buffer
    fn encode(&self, buffer: &mut PacketBuffer);

    /// Encode to a new buffer (body only)
    fn to_buffer(&self) -> PacketBuffer {
        let mut buffer = PacketBuffer::with_capacity(256);
        self.encode(&mut buffer);
        buffer
    }

    /// Encode to a complete frame (ID header and body)
    fn to_frame(&self) -> PacketBuffer {
        let mut buffer = PacketBuffer::with_capacity(256);
        buffer.write_varuint32(Self::ID);
        self.encode(&mut buffer);
        buffer
    }
}

/// Packet decode error
#[derive(Debug, Clone, PartialEq)]
pub enum PacketDecodeError {
    /// Not enough data in buffer
    InsufficientData { expected: usize, actual: usize },
    /// Invalid field value
    InvalidValue { field: String, value: String },
    /// Malformed packet structure
    Malformed(String),
    /// Packet ID the session does not handle
    UnknownPacket(u32),
}

impl std::fmt::Display for PacketDecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PacketDecodeError::InsufficientData { expected, actual } => {
                write!(
                    f,
                    "Insufficient data: expected {} bytes, got {}",
                    expected, actual
                )
            }
            PacketDecodeError::InvalidValue { field, value } => {
                write!(f, "Invalid value for field '{}': {}", field, value)
            }
            PacketDecodeError::Malformed(msg) => {
                write!(f, "Malformed packet: {}", msg)
            }
            PacketDecodeError::UnknownPacket(id) => {
                write!(f, "Unknown packet ID: {:#x}", id)
            }
        }
    }
}

impl std::error::Error for PacketDecodeError {}

// ============ Incoming Packets ============

/// Movement mode reported with a move player packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum MoveMode {
    #[default]
    Normal = 0,
    Reset = 1,
    Teleport = 2,
    Rotation = 3,
}

impl MoveMode {
    fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(MoveMode::Normal),
            1 => Some(MoveMode::Reset),
            2 => Some(MoveMode::Teleport),
            3 => Some(MoveMode::Rotation),
            _ => None,
        }
    }
}

/// Client-reported player movement (0x13)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MovePlayer {
    pub entity_runtime_id: u64,
    pub position: Vec3,
    pub pitch: f32,
    pub yaw: f32,
    pub head_yaw: f32,
    pub mode: MoveMode,
    pub on_ground: bool,
    pub ridden_entity_runtime_id: u64,
    pub teleport_cause: i32,
    pub teleport_source_entity_type: i32,
}

impl IncomingPacket for MovePlayer {
    const ID: u32 = id::MOVE_PLAYER;

    fn decode(buffer: &mut PacketBuffer) -> Result<Self, PacketDecodeError> {
        let entity_runtime_id = buffer.read_varuint64()?;
        let position = buffer.read_vec3()?;
        let pitch = buffer.read_f32_le()?;
        let yaw = buffer.read_f32_le()?;
        let head_yaw = buffer.read_f32_le()?;
        let raw_mode = buffer.read_u8()?;
        let mode = MoveMode::from_u8(raw_mode).ok_or_else(|| PacketDecodeError::InvalidValue {
            field: "mode".to_string(),
            value: raw_mode.to_string(),
        })?;
        let on_ground = buffer.read_bool()?;
        let ridden_entity_runtime_id = buffer.read_varuint64()?;

        let (teleport_cause, teleport_source_entity_type) = if mode == MoveMode::Teleport {
            (buffer.read_i32_le()?, buffer.read_i32_le()?)
        } else {
            (0, 0)
        };

        Ok(Self {
            entity_runtime_id,
            position,
            pitch,
            yaw,
            head_yaw,
            mode,
            on_ground,
            ridden_entity_runtime_id,
            teleport_cause,
            teleport_source_entity_type,
        })
    }
}

impl MovePlayer {
    /// Encode the body the way a client would send it
    pub fn encode(&self, buffer: &mut PacketBuffer) {
        buffer.write_varuint64(self.entity_runtime_id);
        buffer.write_vec3(self.position);
        buffer.write_f32_le(self.pitch);
        buffer.write_f32_le(self.yaw);
        buffer.write_f32_le(self.head_yaw);
        buffer.write_u8(self.mode as u8);
        buffer.write_bool(self.on_ground);
        buffer.write_varuint64(self.ridden_entity_runtime_id);
        if self.mode == MoveMode::Teleport {
            buffer.write_i32_le(self.teleport_cause);
            buffer.write_i32_le(self.teleport_source_entity_type);
        }
    }
}

/// Packets a client may send to the session layer
#[derive(Debug, Clone, PartialEq)]
pub enum ClientPacket {
    MovePlayer(MovePlayer),
}

impl ClientPacket {
    /// Decode a complete frame (ID header and body)
    pub fn decode(buffer: &mut PacketBuffer) -> Result<Self, PacketDecodeError> {
        let packet_id = buffer.read_varuint32()?;
        match packet_id {
            id::MOVE_PLAYER => Ok(ClientPacket::MovePlayer(MovePlayer::decode(buffer)?)),
            other => Err(PacketDecodeError::UnknownPacket(other)),
        }
    }

    /// Get the packet ID
    pub fn id(&self) -> u32 {
        match self {
            ClientPacket::MovePlayer(_) => MovePlayer::ID,
        }
    }
}

// ============ Outgoing Packets ============

/// Re-centres the area of chunks the client keeps loaded (0x79)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkChunkPublisherUpdate {
    pub position: BlockPos,
    /// Radius in blocks
    pub radius: u32,
}

impl OutgoingPacket for NetworkChunkPublisherUpdate {
    const ID: u32 = id::NETWORK_CHUNK_PUBLISHER_UPDATE;

    fn encode(&self, buffer: &mut PacketBuffer) {
        self.position.encode(buffer);
        buffer.write_varuint32(self.radius);
    }
}

/// Disconnects the client (0x05)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disconnect {
    pub hide_disconnection_screen: bool,
    pub message: String,
}

impl OutgoingPacket for Disconnect {
    const ID: u32 = id::DISCONNECT;

    fn encode(&self, buffer: &mut PacketBuffer) {
        buffer.write_bool(self.hide_disconnection_screen);
        buffer.write_string(&self.message);
    }
}

impl Disconnect {
    /// An empty message hides the disconnection screen
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            hide_disconnection_screen: message.is_empty(),
            message,
        }
    }
}

/// Sends the client to another server (0x55)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub address: String,
    pub port: u16,
}

impl OutgoingPacket for Transfer {
    const ID: u32 = id::TRANSFER;

    fn encode(&self, buffer: &mut PacketBuffer) {
        buffer.write_string(&self.address);
        buffer.write_u16_le(self.port);
    }
}

/// Ability flags and permissions of the player (0x37)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdventureSettings {
    pub flags: AdventureFlags,
    pub command_permission_level: CommandPermissionLevel,
    pub action_permissions: ActionPermissions,
    pub permission_level: PermissionLevel,
    pub custom_stored_permissions: u32,
    pub player_unique_id: i64,
}

impl OutgoingPacket for AdventureSettings {
    const ID: u32 = id::ADVENTURE_SETTINGS;

    fn encode(&self, buffer: &mut PacketBuffer) {
        buffer.write_varuint32(self.flags.bits());
        buffer.write_varuint32(self.command_permission_level as u32);
        buffer.write_varuint32(self.action_permissions.bits());
        buffer.write_varuint32(self.permission_level as u32);
        buffer.write_varuint32(self.custom_stored_permissions);
        buffer.write_i64_le(self.player_unique_id);
    }
}

/// Changes the game type of the player (0x3e)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetPlayerGameType {
    pub game_type: GameType,
}

impl OutgoingPacket for SetPlayerGameType {
    const ID: u32 = id::SET_PLAYER_GAME_TYPE;

    fn encode(&self, buffer: &mut PacketBuffer) {
        buffer.write_varint32(self.game_type.as_i32());
    }
}

/// Adds or removes rows of the player list (0x3f)
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerList {
    pub action: PlayerListAction,
    pub entries: Vec<PlayerListEntry>,
}

impl OutgoingPacket for PlayerList {
    const ID: u32 = id::PLAYER_LIST;

    fn encode(&self, buffer: &mut PacketBuffer) {
        buffer.write_u8(self.action as u8);
        buffer.write_varuint32(self.entries.len() as u32);
        for entry in &self.entries {
            entry.encode(self.action, buffer);
        }
        if self.action == PlayerListAction::Add {
            // Trusted skin flag per entry
            for _ in &self.entries {
                buffer.write_bool(true);
            }
        }
    }
}

impl PlayerList {
    pub fn add(entries: Vec<PlayerListEntry>) -> Self {
        Self {
            action: PlayerListAction::Add,
            entries,
        }
    }

    pub fn remove(uuid: Uuid) -> Self {
        Self {
            action: PlayerListAction::Remove,
            entries: vec![PlayerListEntry::removal(uuid)],
        }
    }
}

/// Sets the content of a single container slot (0x32)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventorySlot {
    pub window_id: u32,
    pub slot: u32,
    pub new_item: NetworkItemStack,
}

impl OutgoingPacket for InventorySlot {
    const ID: u32 = id::INVENTORY_SLOT;

    fn encode(&self, buffer: &mut PacketBuffer) {
        buffer.write_varuint32(self.window_id);
        buffer.write_varuint32(self.slot);
        self.new_item.encode(buffer);
    }
}

macro_rules! server_packets {
    ($($variant:ident),* $(,)?) => {
        /// Packets the session layer writes to a client
        #[derive(Debug, Clone, PartialEq)]
        pub enum ServerPacket {
            $($variant($variant),)*
        }

        impl ServerPacket {
            /// Get the packet ID
            pub fn id(&self) -> u32 {
                match self {
                    $(ServerPacket::$variant(_) => <$variant as OutgoingPacket>::ID,)*
                }
            }

            /// Encode to a complete frame (ID header and body)
            pub fn to_frame(&self) -> PacketBuffer {
                match self {
                    $(ServerPacket::$variant(pk) => pk.to_frame(),)*
                }
            }

            /// Get a short name for logging
            pub fn name(&self) -> &'static str {
                match self {
                    $(ServerPacket::$variant(_) => stringify!($variant),)*
                }
            }
        }

        $(
            impl From<$variant> for ServerPacket {
                fn from(packet: $variant) -> Self {
                    ServerPacket::$variant(packet)
                }
            }
        )*
    };
}

server_packets!(
    NetworkChunkPublisherUpdate,
    Disconnect,
    Transfer,
    AdventureSettings,
    SetPlayerGameType,
    PlayerList,
    InventorySlot,
);

// ============ Packet Registry ============

/// Static registry of packet names by ID
static PACKET_NAMES: OnceLock<HashMap<u32, &'static str>> = OnceLock::new();

/// Get the packet name registry
pub fn packet_names() -> &'static HashMap<u32, &'static str> {
    PACKET_NAMES.get_or_init(|| {
        let mut map = HashMap::new();

        map.insert(id::DISCONNECT, "Disconnect");
        map.insert(id::MOVE_PLAYER, "MovePlayer");
        map.insert(id::INVENTORY_SLOT, "InventorySlot");
        map.insert(id::ADVENTURE_SETTINGS, "AdventureSettings");
        map.insert(id::SET_PLAYER_GAME_TYPE, "SetPlayerGameType");
        map.insert(id::PLAYER_LIST, "PlayerList");
        map.insert(id::TRANSFER, "Transfer");
        map.insert(
            id::NETWORK_CHUNK_PUBLISHER_UPDATE,
            "NetworkChunkPublisherUpdate",
        );

        map
    })
}
