use crate::color::RawBlock4x4;
use crate::options::DecoderOptions;

use super::bc1::decode_color_block;
use super::bc4::interpolate_channel;
use super::private;

/// DXT5: a four-colour block plus a 7-step interpolated alpha plane, rather
/// than BC2's explicit per-texel alpha.
pub struct Bc3 {}

impl private::Format for Bc3 {
    const BLOCK_SIZE: usize = 16;
}

impl private::Decoder for Bc3 {
    fn decompress_block(block: &[u8], _options: &DecoderOptions) -> RawBlock4x4 {
        let mut out = decode_color_block(&block[8..16], true);
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
