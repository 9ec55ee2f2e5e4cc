use crate::color::RawBlock4x4;
use crate::options::DecoderOptions;

use super::bc1::decode_color_block;
use super::private;

/// DXT3: a colour block identical to BC1's four-colour mode, plus an
/// explicit 4-bit-per-texel alpha plane.
pub struct Bc2 {}

impl private::Format for Bc2 {
    const BLOCK_SIZE: usize = 16;
}

impl private::Decoder for Bc2 {
    fn decompress_block(block: &[u8], _options: &DecoderOptions) -> RawBlock4x4 {
        let mut out = decode_color_block(&block[8..16], true);
        for y in 0..4 {
            let row = u16::from_le_bytes([block[y * 2], block[y * 2 + 1]]);
            for x in 0..4 {
                let nibble = (row >> (4 * x)) & 0x0F;
                let mut px = out.get(x, y);
                px.a = (nibble * 17) as u8; // 0..15 -> 0..255
                out.set(x, y, px);
            }
        }
        out
    }
}
