//! World module
//!
//! Chunk streaming as seen from a session. The session only tells its loader
//! where the player is; what gets loaded and sent is up to the loader.

use parking_lot::RwLock;
use tracing::trace;

use crate::protocol::types::Vec3;

/// Width of a chunk in blocks
pub const CHUNK_SIZE: i32 = 16;

/// Column coordinates of a chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk containing a world position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            x: (position.x.floor() as i32) >> 4,
            z: (position.z.floor() as i32) >> 4,
        }
    }

    /// Chebyshev distance to another chunk
    pub fn distance(&self, other: &ChunkPos) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }
}

impl std::fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.x, self.z)
    }
}

/// Streams chunks around a moving viewer
pub trait ChunkLoader: Send + Sync {
    /// Re-centre the loader on an absolute position. May block.
    fn move_to(&self, position: Vec3);
}

/// Loader that tracks the centre chunk and which chunks are in range
#[derive(Debug)]
pub struct RadiusLoader {
    radius: i32,
    centre: RwLock<ChunkPos>,
}

impl RadiusLoader {
    pub fn new(radius: i32) -> Self {
        Self {
            radius,
            centre: RwLock::new(ChunkPos::default()),
        }
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// Chunk the loader is currently centred on
    pub fn centre(&self) -> ChunkPos {
        *self.centre.read()
    }

    /// Check if a chunk is within the loaded radius
    pub fn in_range(&self, pos: &ChunkPos) -> bool {
        self.centre().distance(pos) <= self.radius
    }
}

impl ChunkLoader for RadiusLoader {
    fn move_to(&self, position: Vec3) {
        let chunk = ChunkPos::from_position(position);
        let mut centre = self.centre.write();
        if *centre != chunk {
            trace!(from = %*centre, to = %chunk, "Chunk loader re-centred");
            *centre = chunk;
        }
    }
}

/// Loader that ignores movement
#[derive(Debug, Default, Clone, Copy)]
pub struct NopLoader;

impl ChunkLoader for NopLoader {
    fn move_to(&self, _position: Vec3) {}
}
