//! Pixel and block value types shared by every kernel and the assembler.

use bytemuck::{Pod, Zeroable};

/// A single decoded RGBA8 pixel.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct ColorRgba32 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ColorRgba32 {
    pub const BLACK_OPAQUE: Self = Self::new(0, 0, 0, 255);
    pub const BLACK_TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// The 16 pixels decoded from one 4x4 compressed block, in row-major order
/// (index `y * 4 + x`).
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawBlock4x4(pub [ColorRgba32; 16]);

impl RawBlock4x4 {
    pub const fn filled(color: ColorRgba32) -> Self {
        Self([color; 16])
    }

    pub fn get(&self, x: usize, y: usize) -> ColorRgba32 {
        self.0[y * 4 + x]
    }

    pub fn set(&mut self, x: usize, y: usize, color: ColorRgba32) {
        self.0[y * 4 + x] = color;
    }

    pub fn as_slice(&self) -> &[ColorRgba32; 16] {
        &self.0
    }
}

impl Default for RawBlock4x4 {
    fn default() -> Self {
        Self::filled(ColorRgba32::default())
    }
}
