use std::fmt::{self, Debug};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    RGB,
    RGBA,
    BGR,
    BGRA,
}

impl ColorSpace {
    pub const fn bytes_per_pixel(&self) -> usize {
        match self {
            ColorSpace::RGB | ColorSpace::BGR => 3,
            ColorSpace::BGRA | ColorSpace::RGBA => 4,
        }
    }

    pub const fn has_alpha(&self) -> bool {
        matches!(self, Self::RGBA | Self::BGRA)
    }
}

#[derive(Clone)]
pub struct ColorFrame {
    pub color_space: ColorSpace,
    pub width: usize,
    pub height: usize,
    pub buffer: Vec<u8>,

    pub sequence: u32,
    pub timestamp: u32,
}

impl Debug for ColorFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorFrame")
            .field("color_space", &self.color_space)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("buffer_length", &self.buffer.len())
            .field("sequence", &self.sequence)
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

/// Depth image, one distance per pixel in millimeter (0 when unknown).
#[derive(Clone)]
pub struct DepthFrame {
    pub width: usize,
    pub height: usize,
    pub buffer: Vec<f32>,

    pub sequence: u32,
    pub timestamp: u32,
}

impl Debug for DepthFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DepthFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("buffer_length", &self.buffer.len())
            .field("sequence", &self.sequence)
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

/// Color and depth captured together.
#[derive(Debug, Clone)]
pub struct FramePair {
    pub color: ColorFrame,
    pub depth: DepthFrame,
}
