use crate::color::{ColorRgba32, RawBlock4x4};
use crate::options::DecoderOptions;

use super::bc1::expand_565;
use super::bc4::interpolate_channel;
use super::private;

/// AMD's ATC colour block: structurally a BC1 endpoint-plus-index pair,
/// but with a different two-endpoint palette rule and no punch-through
/// alpha mode of its own.
pub struct Atc {}

/// ATC colour block plus a BC2-style explicit 4-bit alpha grid.
pub struct AtcExplicitAlpha {}

/// ATC colour block plus a BC3-style interpolated alpha block.
pub struct AtcInterpolatedAlpha {}

impl private::Format for Atc {
    const BLOCK_SIZE: usize = 8;
}

impl private::Format for AtcExplicitAlpha {
    const BLOCK_SIZE: usize = 16;
}

impl private::Format for AtcInterpolatedAlpha {
    const BLOCK_SIZE: usize = 16;
}

impl private::Decoder for Atc {
    fn decompress_block(block: &[u8], _options: &DecoderOptions) -> RawBlock4x4 {
        decode_color_block(block)
    }
}

impl private::Decoder for AtcExplicitAlpha {
    fn decompress_block(block: &[u8], _options: &DecoderOptions) -> RawBlock4x4 {
        let mut out = decode_color_block(&block[8..16]);
        for y in 0..4 {
            let row = u16::from_le_bytes([block[y * 2], block[y * 2 + 1]]);
            for x in 0..4 {
                let nibble = (row >> (4 * x)) & 0x0F;
                let mut px = out.get(x, y);
                px.a = (nibble * 17) as u8;
                out.set(x, y, px);
            }
        }
        out
    }
}

impl private::Decoder for AtcInterpolatedAlpha {
    fn decompress_block(block: &[u8], _options: &DecoderOptions) -> RawBlock4x4 {
        let mut out = decode_color_block(&block[8..16]);
        let alpha = interpolate_channel(&block[0..8]);
        for y in 0..4 {
            for x in 0..4 {
                let mut px = out.get(x, y);
                px.a = alpha[y * 4 + x];
                out.set(x, y, px);
            }
        }
        out
    }
}

/// ATC's endpoint/index layout is identical to BC1's, but the palette rule
/// is chosen by the high bit of `c0` instead of by comparing `c0` and `c1`.
fn decode_color_block(block: &[u8]) -> RawBlock4x4 {
    let c0 = u16::from_le_bytes([block[0], block[1]]);
    let c1 = u16::from_le_bytes([block[2], block[3]]);

    let (r0, g0, b0) = expand_565(c0);
    let (r1, g1, b1) = expand_565(c1);

    let mut palette = [ColorRgba32::BLACK_OPAQUE; 4];

    // Bit 15 of c0 (the RGB565 red field's MSB) selects the "opaque black"
    // endpoint mode rather than the "common" one.
    if c0 & 0x8000 == 0 {
        palette[0] = ColorRgba32::new(r0, g0, b0, 255);
        palette[1] = lerp8(r0, g0, b0, r1, g1, b1, 5, 3);
        palette[2] = lerp8(r0, g0, b0, r1, g1, b1, 3, 5);
        palette[3] = ColorRgba32::new(r1, g1, b1, 255);
    } else {
        palette[0] = ColorRgba32::new(0, 0, 0, 255);
        palette[1] = ColorRgba32::new(r0, g0, b0, 255);
        palette[2] = lerp8(r0, g0, b0, r1, g1, b1, 3, 5);
        palette[3] = ColorRgba32::new(r1, g1, b1, 255);
    }

    let mut indices = u32::from_le_bytes([block[4], block[5], block[6], block[7]]);
    let mut out = RawBlock4x4::default();
    for y in 0..4 {
        for x in 0..4 {
            let idx = (indices & 0x3) as usize;
            out.set(x, y, palette[idx]);
            indices >>= 2;
        }
    }
    out
}

fn lerp8(r0: u8, g0: u8, b0: u8, r1: u8, g1: u8, b1: u8, w0: u32, w1: u32) -> ColorRgba32 {
    let r = (w0 * r0 as u32 + w1 * r1 as u32 + 4) / 8;
    let g = (w0 * g0 as u32 + w1 * g1 as u32 + 4) / 8;
    let b = (w0 * b0 as u32 + w1 * b1 as u32 + 4) / 8;
    ColorRgba32::new(r as u8, g as u8, b as u8, 255)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::BlockDecoder;

    #[test]
    fn common_mode_endpoints_survive_at_index_0_and_3() {
        let mut block = [0u8; 8];
        // c0 with high bit clear, c1 arbitrary
        block[0..2].copy_from_slice(&0x07E0u16.to_le_bytes()); // pure green
        block[2..4].copy_from_slice(&0xF800u16.to_le_bytes()); // pure red
        // texel 0 -> index 0, texel 1 -> index 3
        block[4] = 0b1100; // bits 0-1 = 00 (index 0), bits 2-3 = 11 (index 3)
        let decoded = Atc::decode_block(&block, &DecoderOptions::default()).unwrap();
        assert_eq!(decoded.get(0, 0), ColorRgba32::new(0, 255, 0, 255));
        assert_eq!(decoded.get(1, 0), ColorRgba32::new(255, 0, 0, 255));
    }

    #[test]
    fn opaque_black_mode_puts_black_at_index_0() {
        let mut block = [0u8; 8];
        block[0..2].copy_from_slice(&0x8000u16.to_le_bytes()); // high bit set
        let decoded = Atc::decode_block(&block, &DecoderOptions::default()).unwrap();
        assert_eq!(decoded.get(0, 0), ColorRgba32::new(0, 0, 0, 255));
    }
}
