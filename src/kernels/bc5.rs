use crate::color::{ColorRgba32, RawBlock4x4};
use crate::options::DecoderOptions;

use super::bc4::interpolate_channel;
use super::private;

/// Two-channel interpolated block (RGTC2 / ATI2), typically used for
/// tangent-space normal maps: red and green each get their own independent
/// BC4-style endpoint pair. Blue and alpha are left at their defaults.
pub struct Bc5 {}

impl private::Format for Bc5 {
    const BLOCK_SIZE: usize = 16;
}

impl private::Decoder for Bc5 {
    fn decompress_block(block: &[u8], _options: &DecoderOptions) -> RawBlock4x4 {
        let red = interpolate_channel(&block[0..8]);
        let green = interpolate_channel(&block[8..16]);
        let mut out = RawBlock4x4::default();
        for y in 0..4 {
            for x in 0..4 {
                let i = y * 4 + x;
                out.set(x, y, ColorRgba32::new(red[i], green[i], 0, 255));
            }
        }
        out
    }
}
