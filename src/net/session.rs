//! Session management module
//!
//! Manages client sessions including:
//! - Relaying client movement to the controlled entity and chunk loader
//! - Keeping the client's player list and entity runtime IDs in sync
//! - Announcing game modes, inventory slots, disconnects and transfers
//! - Thread-safe tracking of all live sessions

use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::error::{NetworkError, ProtocolError, Result};
use crate::game::gamemode::GameMode;
use crate::game::inventory::{Inventory, SlotObserver, MAIN_INVENTORY_SIZE, OFF_HAND_SIZE};
use crate::game::item::ItemStack;
use crate::game::player::{Controllable, Player};
use crate::game::skin::{AnimationType, Skin};
use crate::game::world::{ChunkLoader, NopLoader, RadiusLoader, CHUNK_SIZE};
use crate::net::buffer::{PacketBuffer, MAX_PACKET_SIZE};
use crate::net::connection::{ChannelConnection, Connection};
use crate::net::registry::{EntityRegistry, SELF_RUNTIME_ID};
use crate::protocol::packets::{
    packet_names, AdventureSettings, ClientPacket, Disconnect, InventorySlot, MovePlayer,
    NetworkChunkPublisherUpdate, PlayerList, ServerPacket, SetPlayerGameType, Transfer,
};
use crate::protocol::types::{
    ActionPermissions, CommandPermissionLevel, PermissionLevel, PlayerListEntry,
    SerializedAnimation, SerializedSkin, SkinAnimationType, WindowId,
};

/// Unique session identifier
pub type SessionId = u64;

/// Default chunk radius of new sessions
pub const DEFAULT_CHUNK_RADIUS: u32 = 8;

/// Largest chunk radius a session accepts
pub const MAX_CHUNK_RADIUS: u32 = 32;

/// Session state in the connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Spawned and exchanging game packets
    Playing,
    /// Disconnect sent, connection closed
    Disconnected,
}

impl SessionState {
    /// Get a human-readable name for the state
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Playing => "Playing",
            SessionState::Disconnected => "Disconnected",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Client information sent during login
#[derive(Debug, Clone, Default)]
pub struct ClientData {
    /// Whether the skin was made with the persona editor
    pub persona_skin: bool,
    /// Game version of the client, e.g. `1.16.100`
    pub game_version: String,
    /// Device operating system ID
    pub device_os: i32,
    pub device_model: String,
    pub language_code: String,
}

/// A connected client session
pub struct Session {
    /// Unique session identifier
    pub id: SessionId,
    /// Outbound connection; `None` for the no-op session
    conn: Option<Arc<dyn Connection>>,
    /// Entity the client controls
    controllable: Arc<dyn Controllable>,
    chunk_loader: RwLock<Arc<dyn ChunkLoader>>,
    /// Set once a loader other than the default was installed
    custom_loader: AtomicBool,
    chunk_radius: u32,
    client_data: ClientData,
    /// Runtime IDs of the entities this client knows about
    entity_runtime_ids: EntityRegistry,
    /// Hotbar slot the client holds, shared with game logic
    held_slot: Arc<AtomicU32>,
    state: RwLock<SessionState>,
    /// Time of session creation
    pub created_at: Instant,
}

impl Session {
    /// Create a new session
    pub fn new(
        id: SessionId,
        conn: Arc<dyn Connection>,
        controllable: Arc<dyn Controllable>,
        client_data: ClientData,
    ) -> Self {
        Self {
            id,
            conn: Some(conn),
            controllable,
            chunk_loader: RwLock::new(radius_loader(DEFAULT_CHUNK_RADIUS)),
            custom_loader: AtomicBool::new(false),
            chunk_radius: DEFAULT_CHUNK_RADIUS,
            client_data,
            entity_runtime_ids: EntityRegistry::new(),
            held_slot: Arc::new(AtomicU32::new(0)),
            state: RwLock::new(SessionState::Playing),
            created_at: Instant::now(),
        }
    }

    /// A session without a connection. Every operation is accepted and
    /// nothing is ever written.
    pub fn nop() -> Self {
        Self {
            id: 0,
            conn: None,
            controllable: Arc::new(Player::new("", "", Skin::default())),
            chunk_loader: RwLock::new(Arc::new(NopLoader) as Arc<dyn ChunkLoader>),
            custom_loader: AtomicBool::new(true),
            chunk_radius: DEFAULT_CHUNK_RADIUS,
            client_data: ClientData::default(),
            entity_runtime_ids: EntityRegistry::new(),
            held_slot: Arc::new(AtomicU32::new(0)),
            state: RwLock::new(SessionState::Playing),
            created_at: Instant::now(),
        }
    }

    /// Set the chunk radius, clamped to `1..=MAX_CHUNK_RADIUS`. The default
    /// loader is re-created to match; a custom loader is kept.
    pub fn with_chunk_radius(mut self, radius: u32) -> Self {
        self.chunk_radius = radius.clamp(1, MAX_CHUNK_RADIUS);
        if !self.custom_loader.load(Ordering::SeqCst) {
            self.chunk_loader = RwLock::new(radius_loader(self.chunk_radius));
        }
        self
    }

    /// Use a specific chunk loader
    pub fn with_chunk_loader(self, loader: Arc<dyn ChunkLoader>) -> Self {
        self.set_chunk_loader(loader);
        self
    }

    /// Replace the chunk loader, e.g. when the player changes world
    pub fn set_chunk_loader(&self, loader: Arc<dyn ChunkLoader>) {
        self.custom_loader.store(true, Ordering::SeqCst);
        *self.chunk_loader.write() = loader;
    }

    pub fn controllable(&self) -> &Arc<dyn Controllable> {
        &self.controllable
    }

    pub fn client_data(&self) -> &ClientData {
        &self.client_data
    }

    /// Chunk radius in chunks
    pub fn chunk_radius(&self) -> u32 {
        self.chunk_radius
    }

    /// Check if this is the no-op session
    pub fn is_nop(&self) -> bool {
        self.conn.is_none()
    }

    /// Get the current session state
    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    /// Held hotbar slot indicator shared with game logic
    pub fn held_slot(&self) -> Arc<AtomicU32> {
        self.held_slot.clone()
    }

    /// Runtime ID this client uses for an entity
    pub fn entity_runtime_id(&self, uuid: &Uuid) -> Option<u64> {
        self.entity_runtime_ids.runtime_id(uuid)
    }

    /// Write a packet, logging failures. The connection owns I/O errors.
    fn write_packet(&self, packet: impl Into<ServerPacket>) {
        if let Some(conn) = &self.conn {
            write_logged(conn.as_ref(), self.id, packet.into());
        }
    }

    // ============ Inbound ============

    /// Handle one decoded client packet
    pub fn handle_packet(&self, packet: &ClientPacket) -> Result<()> {
        trace!(
            session_id = self.id,
            packet = packet_names().get(&packet.id()).copied().unwrap_or("Unknown"),
            "Handling packet"
        );
        match packet {
            ClientPacket::MovePlayer(pk) => self.handle_move_player(pk),
        }
    }

    /// Decode a raw frame (ID header and body) and handle it
    pub fn handle_raw(&self, frame: &[u8]) -> Result<()> {
        if frame.len() > MAX_PACKET_SIZE {
            return Err(ProtocolError::PacketTooLarge {
                size: frame.len(),
                max: MAX_PACKET_SIZE,
            }
            .into());
        }
        let mut buffer = PacketBuffer::from_bytes(frame);
        let packet = ClientPacket::decode(&mut buffer)?;
        self.handle_packet(&packet)
    }

    /// Apply a movement reported by the client to the controlled entity and
    /// move the chunk loader along with it.
    pub fn handle_move_player(&self, pk: &MovePlayer) -> Result<()> {
        if pk.entity_runtime_id != SELF_RUNTIME_ID {
            return Err(ProtocolError::RuntimeIdMismatch {
                reported: pk.entity_runtime_id,
                expected: SELF_RUNTIME_ID,
            }
            .into());
        }

        let c = &self.controllable;
        c.move_by(pk.position - c.position());
        c.rotate(pk.yaw - c.yaw(), pk.pitch - c.pitch());

        let loader = self.chunk_loader.read().clone();
        loader.move_to(pk.position);

        self.write_packet(NetworkChunkPublisherUpdate {
            position: pk.position.to_block_pos(),
            radius: self.chunk_radius.saturating_mul(CHUNK_SIZE as u32),
        });
        Ok(())
    }

    // ============ Player list ============

    /// Give the player of another session a runtime ID and add it to this
    /// client's player list. Registering the own session yields ID 1.
    pub fn register_player(&self, peer: &Session) {
        let uuid = peer.controllable.uuid();
        let runtime_id = self
            .entity_runtime_ids
            .register(uuid, std::ptr::eq(peer, self));

        debug!(
            session_id = self.id,
            peer = %uuid,
            runtime_id = runtime_id,
            "Player registered"
        );

        self.write_packet(PlayerList::add(vec![player_list_entry(peer, runtime_id)]));
    }

    /// Remove the player of another session from this client's player list
    pub fn unregister_player(&self, peer: &Session) {
        let uuid = peer.controllable.uuid();
        let removed = self.entity_runtime_ids.unregister(&uuid);

        debug!(
            session_id = self.id,
            peer = %uuid,
            runtime_id = ?removed,
            "Player unregistered"
        );

        self.write_packet(PlayerList::remove(uuid));
    }

    // ============ Game mode ============

    /// Tell the client which game mode its player is in
    pub fn send_game_mode(&self, mode: GameMode) {
        self.write_packet(AdventureSettings {
            flags: mode.flags(),
            command_permission_level: CommandPermissionLevel::default(),
            action_permissions: ActionPermissions::member(),
            permission_level: PermissionLevel::Member,
            custom_stored_permissions: 0,
            player_unique_id: SELF_RUNTIME_ID as i64,
        });
        self.write_packet(SetPlayerGameType {
            game_type: mode.game_type(),
        });
    }

    // ============ Inventory ============

    /// Create the main and off-hand inventories of the player. Every change
    /// to either is sent to the client as it happens.
    pub fn handle_inventories(&self) -> (Inventory, Inventory, Arc<AtomicU32>) {
        let inventory = Inventory::new(MAIN_INVENTORY_SIZE, self.slot_writer(WindowId::Inventory));
        let off_hand = Inventory::new(OFF_HAND_SIZE, self.slot_writer(WindowId::OffHand));
        (inventory, off_hand, self.held_slot.clone())
    }

    fn slot_writer(&self, window: WindowId) -> SlotWriter {
        SlotWriter {
            session_id: self.id,
            conn: self.conn.clone(),
            window,
        }
    }

    // ============ Lifecycle ============

    /// Disconnect the client with a message. An empty message hides the
    /// disconnection screen.
    pub fn disconnect(&self, message: &str) {
        self.write_packet(Disconnect::new(message));
        *self.state.write() = SessionState::Disconnected;

        if let Some(conn) = &self.conn {
            if let Err(e) = conn.flush() {
                warn!(session_id = self.id, error = %e, "Failed to flush connection");
            }
            if let Err(e) = conn.close() {
                warn!(session_id = self.id, error = %e, "Failed to close connection");
            }
            info!(session_id = self.id, message = %message, "Session disconnected");
        }
    }

    /// Send the client to another server. The connection stays open.
    pub fn transfer(&self, address: IpAddr, port: u16) {
        info!(session_id = self.id, address = %address, port = port, "Transferring session");
        self.write_packet(Transfer {
            address: address.to_string(),
            port,
        });
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("player", &self.controllable.name())
            .field("state", &self.state())
            .field("chunk_radius", &self.chunk_radius)
            .field("known_entities", &self.entity_runtime_ids.len())
            .field("created_at", &self.created_at)
            .finish()
    }
}

fn radius_loader(radius: u32) -> Arc<dyn ChunkLoader> {
    Arc::new(RadiusLoader::new(radius.min(MAX_CHUNK_RADIUS) as i32))
}

fn write_logged(conn: &dyn Connection, session_id: SessionId, packet: ServerPacket) {
    let name = packet.name();
    if let Err(e) = conn.write_packet(packet) {
        warn!(session_id = session_id, packet = name, error = %e, "Failed to write packet");
    }
}

/// Writes inventory slot changes of one window to the client
struct SlotWriter {
    session_id: SessionId,
    conn: Option<Arc<dyn Connection>>,
    window: WindowId,
}

impl SlotObserver for SlotWriter {
    fn slot_changed(&self, slot: usize, stack: &ItemStack) {
        if let Some(conn) = &self.conn {
            let packet = InventorySlot {
                window_id: self.window.as_u32(),
                slot: slot as u32,
                new_item: stack.to_network(),
            };
            write_logged(conn.as_ref(), self.session_id, packet.into());
        }
    }
}

/// Build the player list row of a session's player
fn player_list_entry(peer: &Session, runtime_id: u64) -> PlayerListEntry {
    let c = &peer.controllable;
    PlayerListEntry {
        uuid: c.uuid(),
        entity_unique_id: runtime_id as i64,
        username: c.name(),
        xuid: c.xuid(),
        skin: serialize_skin(&c.skin(), peer.client_data.persona_skin),
        ..Default::default()
    }
}

fn serialize_skin(skin: &Skin, persona: bool) -> SerializedSkin {
    SerializedSkin {
        skin_id: Uuid::new_v4().to_string(),
        skin_resource_patch: skin.model_config.encode(),
        skin_image_width: skin.image.width,
        skin_image_height: skin.image.height,
        skin_data: skin.image.pix.clone(),
        animations: skin
            .animations
            .iter()
            .map(|animation| SerializedAnimation {
                image_width: animation.image.width,
                image_height: animation.image.height,
                image_data: animation.image.pix.clone(),
                animation_type: match animation.kind {
                    AnimationType::Head => SkinAnimationType::Head,
                    AnimationType::Body32x32 => SkinAnimationType::Body32x32,
                    AnimationType::Body128x128 => SkinAnimationType::Body128x128,
                    AnimationType::None => SkinAnimationType::None,
                },
                frame_count: animation.frame_count as f32,
            })
            .collect(),
        cape_image_width: skin.cape.width,
        cape_image_height: skin.cape.height,
        cape_data: skin.cape.pix.clone(),
        skin_geometry: skin.model.clone(),
        animation_data: Vec::new(),
        premium_skin: false,
        persona_skin: persona,
        persona_cape_on_classic_skin: false,
        cape_id: Uuid::new_v4().to_string(),
        full_skin_id: Uuid::new_v4().to_string(),
    }
}

/// Thread-safe session manager
pub struct SessionManager {
    /// Map of session ID to session
    sessions: DashMap<SessionId, Arc<Session>>,
    /// Serializes joins and leaves so every pair of live sessions is
    /// registered with each other exactly once
    membership: Mutex<()>,
    /// Next session ID to assign
    next_id: AtomicU64,
    /// Chunk radius of new sessions
    chunk_radius: u32,
    /// Capacity of the frame queue of channel connections
    outbound_queue_size: usize,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new() -> Self {
        Self::with_chunk_radius(DEFAULT_CHUNK_RADIUS)
    }

    pub fn with_chunk_radius(chunk_radius: u32) -> Self {
        Self {
            sessions: DashMap::new(),
            membership: Mutex::new(()),
            next_id: AtomicU64::new(1),
            chunk_radius: chunk_radius.clamp(1, MAX_CHUNK_RADIUS),
            outbound_queue_size: 1024,
        }
    }

    /// Create a session manager from a loaded configuration
    pub fn from_config(config: &SessionConfig) -> Self {
        let requested = i32::try_from(config.chunk_radius).unwrap_or(i32::MAX);
        let mut manager = Self::with_chunk_radius(config.clamp_chunk_radius(requested));
        manager.outbound_queue_size = config.outbound_queue_size.max(1);
        manager
    }

    /// Chunk radius given to new sessions
    pub fn chunk_radius(&self) -> u32 {
        self.chunk_radius
    }

    /// Create a session for a freshly spawned player and add it
    pub fn create(
        &self,
        conn: Arc<dyn Connection>,
        controllable: Arc<dyn Controllable>,
        client_data: ClientData,
    ) -> Arc<Session> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let session = Session::new(id, conn, controllable, client_data)
            .with_chunk_radius(self.chunk_radius);
        self.add(session)
    }

    /// Create a session writing to a new channel connection. The receiver
    /// yields the encoded frames for the socket task.
    pub fn connect(
        &self,
        controllable: Arc<dyn Controllable>,
        client_data: ClientData,
    ) -> (Arc<Session>, mpsc::Receiver<Vec<u8>>) {
        let (conn, rx) = ChannelConnection::new(self.outbound_queue_size);
        (self.create(Arc::new(conn), controllable, client_data), rx)
    }

    /// Track a session. Its client learns about itself and every player
    /// already online, and every other client learns about it. A session
    /// already tracked under the same ID is removed first.
    pub fn add(&self, session: Session) -> Arc<Session> {
        let session = Arc::new(session);
        let _membership = self.membership.lock();

        if self.sessions.contains_key(&session.id) {
            warn!(session_id = session.id, "Replacing session with duplicate ID");
            self.remove_locked(session.id);
        }

        session.register_player(&session);
        let others: Vec<Arc<Session>> = self.sessions.iter().map(|r| r.value().clone()).collect();
        for other in &others {
            session.register_player(other);
            other.register_player(&session);
        }
        self.sessions.insert(session.id, session.clone());

        info!(
            session_id = session.id,
            player = %session.controllable.name(),
            online = self.sessions.len(),
            "Session added"
        );

        session
    }

    /// Get a session by ID
    pub fn get(&self, id: SessionId) -> Option<Arc<Session>> {
        self.sessions.get(&id).map(|r| r.clone())
    }

    /// Stop tracking a session and remove its player from every other
    /// client's player list
    pub fn remove(&self, id: SessionId) -> Option<Arc<Session>> {
        let _membership = self.membership.lock();
        self.remove_locked(id)
    }

    fn remove_locked(&self, id: SessionId) -> Option<Arc<Session>> {
        let (_, session) = self.sessions.remove(&id)?;

        let others: Vec<Arc<Session>> = self.sessions.iter().map(|r| r.value().clone()).collect();
        for other in &others {
            other.unregister_player(&session);
        }

        info!(
            session_id = id,
            player = %session.controllable.name(),
            "Session removed"
        );

        Some(session)
    }

    /// Disconnect a session and remove it
    pub fn disconnect(&self, id: SessionId, message: &str) -> Result<()> {
        let session = self.remove(id).ok_or(NetworkError::SessionNotFound(id))?;
        session.disconnect(message);
        Ok(())
    }

    /// Disconnect all sessions
    pub fn disconnect_all(&self, message: &str) {
        for id in self.session_ids() {
            // A concurrent leave may have removed it already
            let _ = self.disconnect(id, message);
        }
    }

    /// Get the count of active sessions
    pub fn count(&self) -> usize {
        self.sessions.len()
    }

    /// Get list of all session IDs
    pub fn session_ids(&self) -> Vec<SessionId> {
        self.sessions.iter().map(|r| *r.key()).collect()
    }

    /// Find the session controlling an entity
    pub fn get_by_uuid(&self, uuid: &Uuid) -> Option<Arc<Session>> {
        self.sessions
            .iter()
            .find(|r| r.controllable.uuid() == *uuid)
            .map(|r| r.value().clone())
    }

    /// Iterate over all sessions
    pub fn for_each<F>(&self, f: F)
    where
        F: Fn(&Session),
    {
        for session in self.sessions.iter() {
            f(&session);
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
