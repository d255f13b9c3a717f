//! Integration tests for the session layer
//!
//! These tests drive sessions through their public API and inspect the
//! packets written to an in-memory connection:
//! - Runtime ID assignment and the player list
//! - Movement relay and chunk publisher updates
//! - Game mode, inventory, disconnect and transfer packets

use std::sync::Arc;

use bedrock_session::game::item::{Item, ItemStack};
use bedrock_session::game::player::{Controllable, Player};
use bedrock_session::game::skin::Skin;
use bedrock_session::net::buffer::PacketBuffer;
use bedrock_session::net::connection::{ChannelConnection, Connection, MemoryConnection};
use bedrock_session::protocol::packets::{
    ClientPacket, Disconnect, InventorySlot, MoveMode, MovePlayer, NetworkChunkPublisherUpdate,
    ServerPacket, SetPlayerGameType,
};
use bedrock_session::protocol::types::{AdventureFlags, BlockPos, GameType, Vec3, WindowId};
use bedrock_session::{ClientData, GameMode, Session, SessionConfig, SessionManager};
use pretty_assertions::assert_eq;

fn new_session(id: u64, name: &str) -> (Session, Arc<Player>, Arc<MemoryConnection>) {
    let player = Arc::new(Player::new(name, "", Skin::default()));
    let conn = Arc::new(MemoryConnection::new());
    let session = Session::new(id, conn.clone(), player.clone(), ClientData::default());
    (session, player, conn)
}

/// The own player always gets runtime ID 1
#[test]
fn test_own_player_is_runtime_id_one() {
    let (session, player, conn) = new_session(1, "Steve");
    session.register_player(&session);

    assert_eq!(session.entity_runtime_id(&player.uuid()), Some(1));
    assert_eq!(conn.packets().len(), 1);
}

/// Peer IDs are distinct and increase in registration order
#[test]
fn test_peer_ids_increase() {
    let (session, _, _) = new_session(1, "Steve");
    session.register_player(&session);

    let peers: Vec<_> = (0..5)
        .map(|i| new_session(100 + i, &format!("peer{}", i)))
        .collect();
    let ids: Vec<u64> = peers
        .iter()
        .map(|(peer, player, _)| {
            session.register_player(peer);
            session.entity_runtime_id(&player.uuid()).unwrap()
        })
        .collect();

    assert!(ids.iter().all(|&id| id != 1));
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

/// Unregistering and registering a peer again yields a fresh ID
#[test]
fn test_reregister_yields_fresh_id() {
    let (session, _, _) = new_session(1, "Steve");
    let (peer, peer_player, _) = new_session(2, "Alex");

    session.register_player(&peer);
    let first = session.entity_runtime_id(&peer_player.uuid()).unwrap();
    session.unregister_player(&peer);
    assert_eq!(session.entity_runtime_id(&peer_player.uuid()), None);

    session.register_player(&peer);
    let second = session.entity_runtime_id(&peer_player.uuid()).unwrap();
    assert!(second > first);
}

/// Game mode mapping
#[test]
fn test_game_mode_mapping() {
    let spectator = GameMode::Spectator;
    assert_eq!(
        spectator.flags(),
        AdventureFlags::ALLOW_FLIGHT
            | AdventureFlags::WORLD_IMMUTABLE
            | AdventureFlags::MUTED
            | AdventureFlags::NO_CLIP
            | AdventureFlags::NO_PVP
    );
    assert_eq!(spectator.game_type(), GameType::CreativeSpectator);

    for mode in [GameMode::Survival, GameMode::from_id(99)] {
        assert_eq!(mode.flags(), AdventureFlags::empty());
        assert_eq!(mode.game_type(), GameType::Survival);
    }
}

/// Game mode packets are written in order
#[test]
fn test_send_game_mode_sequence() {
    let (session, _, conn) = new_session(1, "Steve");
    session.send_game_mode(GameMode::Spectator);

    let packets = conn.packets();
    assert_eq!(packets.len(), 2);
    assert!(matches!(&packets[0], ServerPacket::AdventureSettings(pk) if pk.player_unique_id == 1));
    assert_eq!(
        packets[1],
        ServerPacket::SetPlayerGameType(SetPlayerGameType {
            game_type: GameType::CreativeSpectator,
        })
    );
}

/// Movement from (10,20,30) to (12,20,33) with yaw 0 -> 90
#[test]
fn test_movement_relay() {
    let (session, player, conn) = new_session(1, "Steve");
    player.teleport(Vec3::new(10.0, 20.0, 30.0));

    let pk = MovePlayer {
        entity_runtime_id: 1,
        position: Vec3::new(12.0, 20.0, 33.0),
        yaw: 90.0,
        pitch: 0.0,
        mode: MoveMode::Normal,
        ..Default::default()
    };
    session.handle_packet(&ClientPacket::MovePlayer(pk)).unwrap();

    assert_eq!(player.position(), Vec3::new(12.0, 20.0, 33.0));
    assert_eq!(player.yaw(), 90.0);
    assert_eq!(player.pitch(), 0.0);
    assert_eq!(
        conn.packets(),
        vec![ServerPacket::NetworkChunkPublisherUpdate(
            NetworkChunkPublisherUpdate {
                position: BlockPos::new(12, 20, 33),
                radius: session.chunk_radius() * 16,
            }
        )]
    );
}

/// Movement for another entity is rejected and changes nothing
#[test]
fn test_movement_of_other_entity_rejected() {
    let (session, player, conn) = new_session(1, "Steve");
    let pk = MovePlayer {
        entity_runtime_id: 5,
        position: Vec3::new(1.0, 1.0, 1.0),
        ..Default::default()
    };

    let err = session.handle_move_player(&pk).unwrap_err();
    assert!(err.to_string().contains("runtime ID must be equal to 1"));
    assert_eq!(player.position(), Vec3::ZERO);
    assert!(conn.packets().is_empty());
}

/// Raw frames are decoded before dispatch
#[test]
fn test_raw_movement_frame() {
    let (session, player, _) = new_session(1, "Steve");
    let pk = MovePlayer {
        entity_runtime_id: 1,
        position: Vec3::new(0.5, 70.0, -3.0),
        ..Default::default()
    };
    let mut frame = PacketBuffer::new();
    frame.write_varuint32(0x13);
    pk.encode(&mut frame);

    session.handle_raw(frame.as_bytes()).unwrap();
    assert_eq!(player.position(), Vec3::new(0.5, 70.0, -3.0));

    assert!(session.handle_raw(&frame.as_bytes()[..4]).is_err());
}

/// Slot changes of both inventories become inventory slot packets
#[test]
fn test_inventory_bridge() {
    let (session, _, conn) = new_session(1, "Steve");
    let (inventory, off_hand, _held) = session.handle_inventories();
    let stack = ItemStack::new(Item::new("minecraft:diamond_sword", 276, 0), 1);

    inventory.set_item(5, stack.clone()).unwrap();
    assert_eq!(
        conn.take_packets(),
        vec![ServerPacket::InventorySlot(InventorySlot {
            window_id: WindowId::Inventory.as_u32(),
            slot: 5,
            new_item: stack.to_network(),
        })]
    );

    off_hand.set_item(0, stack.clone()).unwrap();
    assert_eq!(
        conn.take_packets(),
        vec![ServerPacket::InventorySlot(InventorySlot {
            window_id: WindowId::OffHand.as_u32(),
            slot: 0,
            new_item: stack.to_network(),
        })]
    );
}

/// Empty disconnect messages hide the disconnection screen
#[test]
fn test_disconnect_messages() {
    let (session, _, conn) = new_session(1, "Steve");
    session.disconnect("");
    assert_eq!(
        conn.packets(),
        vec![ServerPacket::Disconnect(Disconnect {
            hide_disconnection_screen: true,
            message: String::new(),
        })]
    );
    assert!(conn.is_closed());

    let (session, _, conn) = new_session(2, "Alex");
    session.disconnect("bye");
    assert_eq!(
        conn.packets(),
        vec![ServerPacket::Disconnect(Disconnect {
            hide_disconnection_screen: false,
            message: "bye".to_string(),
        })]
    );
}

/// Players joining and leaving through the manager
#[test]
fn test_manager_join_and_leave() {
    let manager = SessionManager::new();
    let conns: Vec<Arc<MemoryConnection>> = (0..3).map(|_| Arc::new(MemoryConnection::new())).collect();
    let sessions: Vec<Arc<Session>> = conns
        .iter()
        .enumerate()
        .map(|(i, conn)| {
            let player = Arc::new(Player::new(format!("player{}", i), "", Skin::default()));
            manager.create(conn.clone(), player, ClientData::default())
        })
        .collect();

    // Every client knows every player, itself as 1
    for session in &sessions {
        for other in &sessions {
            let id = session.entity_runtime_id(&other.controllable().uuid());
            if session.id == other.id {
                assert_eq!(id, Some(1));
            } else {
                assert!(id.unwrap() > 1);
            }
        }
    }

    let leaving = sessions[1].controllable().uuid();
    manager.disconnect(sessions[1].id, "").unwrap();
    assert_eq!(manager.count(), 2);
    assert_eq!(sessions[0].entity_runtime_id(&leaving), None);
    assert_eq!(sessions[2].entity_runtime_id(&leaving), None);
    assert!(conns[1].is_closed());
}

/// Frames queued on a channel connection reach the socket side
#[test]
fn test_channel_connection_end_to_end() {
    let (conn, mut rx) = ChannelConnection::new(16);
    let conn: Arc<dyn Connection> = Arc::new(conn);
    let player = Arc::new(Player::new("Steve", "", Skin::default()));
    let session = Session::new(1, conn, player, ClientData::default());

    session.transfer("192.168.1.10".parse().unwrap(), 19133);
    session.disconnect("bye");

    let frames = tokio_test::block_on(async {
        let mut frames = Vec::new();
        while let Some(frame) = rx.recv().await {
            frames.push(frame);
        }
        frames
    });

    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0][0], 0x55);
    assert_eq!(frames[1][0], 0x05);
}

/// Configured chunk radius and queue size flow into new sessions
#[test]
fn test_config_chunk_radius() {
    let config = SessionConfig {
        chunk_radius: 4,
        outbound_queue_size: 8,
        ..Default::default()
    };
    let manager = SessionManager::from_config(&config);
    let (session, mut rx) = manager.connect(
        Arc::new(Player::new("Steve", "", Skin::default())),
        ClientData::default(),
    );
    assert_eq!(session.chunk_radius(), 4);

    let pk = MovePlayer {
        entity_runtime_id: 1,
        position: Vec3::new(0.0, 64.0, 0.0),
        ..Default::default()
    };
    session.handle_move_player(&pk).unwrap();
    session.disconnect("");

    let frames = tokio_test::block_on(async {
        let mut frames = Vec::new();
        while let Some(frame) = rx.recv().await {
            frames.push(frame);
        }
        frames
    });
    // Own player list row, chunk publisher update, disconnect
    assert_eq!(frames.len(), 3);

    let mut update = PacketBuffer::from_bytes(&frames[1]);
    assert_eq!(update.read_varuint32().unwrap(), 0x79);
    update.read_varint32().unwrap();
    update.read_varuint32().unwrap();
    update.read_varint32().unwrap();
    assert_eq!(update.read_varuint32().unwrap(), 4 * 16);
}
