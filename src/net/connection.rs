//! Connection module
//!
//! The outbound side of a client connection as the session sees it. Writers
//! hand over whole packets; framing and transport belong to the
//! implementation.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::error::{NetworkError, Result};
use crate::protocol::packets::ServerPacket;

/// Outbound packet sink of one client
pub trait Connection: Send + Sync {
    /// Queue a packet for the client
    fn write_packet(&self, packet: ServerPacket) -> Result<()>;

    /// Push everything queued so far towards the client
    fn flush(&self) -> Result<()>;

    /// Close the connection. Later writes fail.
    fn close(&self) -> Result<()>;
}

/// Connection backed by a bounded channel of encoded frames, drained by the
/// task that owns the socket
pub struct ChannelConnection {
    outbound_tx: Mutex<Option<mpsc::Sender<Vec<u8>>>>,
    closed: AtomicBool,
}

impl ChannelConnection {
    /// Create a connection and the receiving end of its frame queue
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Vec<u8>>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::from_sender(tx), rx)
    }

    /// Wrap an existing sender
    pub fn from_sender(outbound_tx: mpsc::Sender<Vec<u8>>) -> Self {
        Self {
            outbound_tx: Mutex::new(Some(outbound_tx)),
            closed: AtomicBool::new(false),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Connection for ChannelConnection {
    fn write_packet(&self, packet: ServerPacket) -> Result<()> {
        let guard = self.outbound_tx.lock();
        let tx = guard.as_ref().ok_or(NetworkError::ConnectionClosed)?;
        let frame = packet.to_frame().into_vec();
        trace!(packet = packet.name(), size = frame.len(), "Queueing packet");
        tx.try_send(frame).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => NetworkError::WriteBufferFull,
            mpsc::error::TrySendError::Closed(_) => NetworkError::ConnectionClosed,
        })?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        // Frames are handed to the socket task as soon as they are queued
        if self.is_closed() {
            return Err(NetworkError::ConnectionClosed.into());
        }
        Ok(())
    }

    fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        // Dropping the sender ends the receiver once it has drained
        self.outbound_tx.lock().take();
        debug!("Connection closed");
        Ok(())
    }
}

impl std::fmt::Debug for ChannelConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelConnection")
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Connection that keeps written packets in memory
#[derive(Debug, Default)]
pub struct MemoryConnection {
    packets: Mutex<Vec<ServerPacket>>,
    flushes: AtomicUsize,
    closed: AtomicBool,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Packets written so far, oldest first
    pub fn packets(&self) -> Vec<ServerPacket> {
        self.packets.lock().clone()
    }

    /// Drain the written packets
    pub fn take_packets(&self) -> Vec<ServerPacket> {
        std::mem::take(&mut *self.packets.lock())
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Connection for MemoryConnection {
    fn write_packet(&self, packet: ServerPacket) -> Result<()> {
        if self.is_closed() {
            return Err(NetworkError::ConnectionClosed.into());
        }
        self.packets.lock().push(packet);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SessionError;
    use crate::protocol::packets::{id, Disconnect, Transfer};

    fn transfer() -> ServerPacket {
        Transfer {
            address: "10.0.0.1".to_string(),
            port: 19132,
        }
        .into()
    }

    #[tokio::test]
    async fn test_channel_connection_sends_frames() {
        let (conn, mut rx) = ChannelConnection::new(4);
        conn.write_packet(transfer()).unwrap();

        let frame = rx.recv().await.unwrap();
        assert_eq!(frame[0] as u32, id::TRANSFER);
    }

    #[test]
    fn test_channel_connection_full() {
        let (conn, _rx) = ChannelConnection::new(1);
        conn.write_packet(transfer()).unwrap();

        let err = conn.write_packet(transfer()).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Network(NetworkError::WriteBufferFull)
        ));
    }

    #[tokio::test]
    async fn test_channel_connection_close() {
        let (conn, mut rx) = ChannelConnection::new(4);
        conn.write_packet(Disconnect::new("bye").into()).unwrap();
        conn.close().unwrap();

        assert!(conn.is_closed());
        assert!(conn.write_packet(transfer()).is_err());
        assert!(conn.flush().is_err());
        // Queued frames are still delivered before the channel ends
        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_channel_connection_receiver_dropped() {
        let (conn, rx) = ChannelConnection::new(4);
        drop(rx);

        let err = conn.write_packet(transfer()).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Network(NetworkError::ConnectionClosed)
        ));
    }

    #[test]
    fn test_memory_connection_records() {
        let conn = MemoryConnection::new();
        conn.write_packet(transfer()).unwrap();
        conn.flush().unwrap();

        assert_eq!(conn.packets(), vec![transfer()]);
        assert_eq!(conn.flush_count(), 1);
        assert_eq!(conn.take_packets().len(), 1);
        assert!(conn.packets().is_empty());

        conn.close().unwrap();
        assert!(conn.write_packet(transfer()).is_err());
    }
}
