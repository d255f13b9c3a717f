//! Skin module
//!
//! The decoded appearance of a player: skin image, cape, geometry and
//! animations. Images are raw RGBA pixel buffers.

use serde::{Deserialize, Serialize};

/// An RGBA image with its dimensions
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    /// RGBA pixels, row by row
    pub pix: Vec<u8>,
}

impl Image {
    /// Create an image, checking the pixel buffer matches the dimensions
    pub fn new(width: u32, height: u32, pix: Vec<u8>) -> Option<Self> {
        if pix.len() != (width as usize) * (height as usize) * 4 {
            return None;
        }
        Some(Self { width, height, pix })
    }

    /// Fully transparent image
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pix: vec![0; (width as usize) * (height as usize) * 4],
        }
    }
}

/// Kind of an animation, determined by the part of the model it applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnimationType {
    #[default]
    None,
    Head,
    Body32x32,
    Body128x128,
}

/// An animated overlay of the skin
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub image: Image,
    pub kind: AnimationType,
    pub frame_count: u32,
}

impl Animation {
    pub fn new(image: Image, kind: AnimationType, frame_count: u32) -> Self {
        Self {
            image,
            kind,
            frame_count,
        }
    }
}

/// Geometry names of the skin model
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Geometry used for the body
    pub default: String,
    /// Geometry used for the animated face, if any
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub animated_face: String,
}

#[derive(Serialize)]
struct ResourcePatch<'a> {
    geometry: &'a ModelConfig,
}

impl ModelConfig {
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
            animated_face: String::new(),
        }
    }

    /// Encode as the skin resource patch JSON sent to clients
    pub fn encode(&self) -> Vec<u8> {
        // Serializing a struct of strings cannot fail
        serde_json::to_vec(&ResourcePatch { geometry: self }).unwrap_or_default()
    }
}

/// A player skin
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Skin {
    pub image: Image,
    pub cape: Image,
    pub model_config: ModelConfig,
    /// Raw geometry JSON
    pub model: Vec<u8>,
    pub animations: Vec<Animation>,
}

impl Skin {
    /// Classic 64x64 skin with the default humanoid geometry
    pub fn classic(image: Image) -> Self {
        Self {
            image,
            cape: Image::default(),
            model_config: ModelConfig::new("geometry.humanoid.custom"),
            model: Vec::new(),
            animations: Vec::new(),
        }
    }
}
