//! Reassembling a flat sequence of decoded 4x4 blocks into a row-major
//! pixel buffer, and the owning/borrowing output types callers see.

use crate::color::{ColorRgba32, RawBlock4x4};

/// The decoded pixels of one mipmap level, owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pixels: Vec<ColorRgba32>,
}

impl DecodedImage {
    pub fn new(width: u32, height: u32, pixels: Vec<ColorRgba32>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize);
        Self { width, height, pixels }
    }

    pub fn pixels(&self) -> &[ColorRgba32] {
        &self.pixels
    }

    /// Reinterprets the pixel buffer as tightly packed `R,G,B,A` bytes,
    /// without copying.
    pub fn as_rgba8(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn as_view(&self) -> Image2DView<'_> {
        Image2DView {
            width: self.width,
            height: self.height,
            stride: self.width,
            pixels: &self.pixels,
        }
    }
}

/// A non-owning logical 2-D view over a pixel slice. `stride` is the number
/// of pixels between the start of consecutive rows, which for
/// [`DecodedImage::as_view`] always equals `width`.
#[derive(Debug, Clone, Copy)]
pub struct Image2DView<'a> {
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pixels: &'a [ColorRgba32],
}

impl<'a> Image2DView<'a> {
    pub fn row(&self, y: u32) -> &'a [ColorRgba32] {
        let start = (y * self.stride) as usize;
        &self.pixels[start..start + self.width as usize]
    }

    pub fn get(&self, x: u32, y: u32) -> ColorRgba32 {
        self.row(y)[x as usize]
    }
}

/// Reassembles `blocks` (in block-major row-major order, `ceil(W/4)` per
/// row) into a row-major `width x height` pixel buffer, clipping blocks
/// that overhang the right or bottom edge.
pub fn assemble_blocks(blocks: &[RawBlock4x4], width: u32, height: u32) -> Vec<ColorRgba32> {
    let width = width as usize;
    let height = height as usize;
    let block_cols = (width + 3) / 4;

    let mut out = vec![ColorRgba32::default(); width * height];
    for (block_index, block) in blocks.iter().enumerate() {
        let bx = (block_index % block_cols) * 4;
        let by = (block_index / block_cols) * 4;

        let cols = 4.min(width - bx);
        let rows = 4.min(height - by);
        for row in 0..rows {
            let dst_start = (by + row) * width + bx;
            let src_start = row * 4;
            out[dst_start..dst_start + cols]
                .copy_from_slice(&block.as_slice()[src_start..src_start + cols]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_4x4_block_fills_exactly() {
        let block = RawBlock4x4::filled(ColorRgba32::new(1, 1, 1, 1));
        let out = assemble_blocks(&[block], 4, 4);
        assert_eq!(out, vec![ColorRgba32::new(1, 1, 1, 1); 16]);
    }

    #[test]
    fn clips_blocks_overhanging_a_5x5_image() {
        let a = RawBlock4x4::filled(ColorRgba32::new(1, 1, 1, 1));
        let b = RawBlock4x4::filled(ColorRgba32::new(2, 2, 2, 2));
        let c = RawBlock4x4::filled(ColorRgba32::new(3, 3, 3, 3));
        let d = RawBlock4x4::filled(ColorRgba32::new(4, 4, 4, 4));
        let out = assemble_blocks(&[a, b, c, d], 5, 5);

        let one = ColorRgba32::new(1, 1, 1, 1);
        let two = ColorRgba32::new(2, 2, 2, 2);
        let three = ColorRgba32::new(3, 3, 3, 3);
        let four = ColorRgba32::new(4, 4, 4, 4);

        // row 0: block A (cols 0-3), block B (col 4 only)
        assert_eq!(&out[0..5], &[one, one, one, one, two]);
        // row 4: block C (cols 0-3), block D (col 4 only)
        assert_eq!(&out[20..25], &[three, three, three, three, four]);
    }
}
