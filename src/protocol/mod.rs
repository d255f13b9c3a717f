//! Protocol module
//!
//! Bedrock packet definitions and the wire types they carry.

pub mod packets;
pub mod types;
