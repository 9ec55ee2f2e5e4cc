use crate::color::{ColorRgba32, RawBlock4x4};
use crate::options::DecoderOptions;

use super::private;

/// Single-channel interpolated block (RGTC1 / ATI1). Decodes into red, with
/// green and blue mirroring red when [`DecoderOptions::red_as_luminance`]
/// is set so the result reads as grayscale instead of a red tint.
pub struct Bc4 {}

impl private::Format for Bc4 {
    const BLOCK_SIZE: usize = 8;
}

impl private::Decoder for Bc4 {
    fn decompress_block(block: &[u8], options: &DecoderOptions) -> RawBlock4x4 {
        let channel = interpolate_channel(block);
        let mut out = RawBlock4x4::default();
        for y in 0..4 {
            for x in 0..4 {
                let v = channel[y * 4 + x];
                let (g, b) = if options.red_as_luminance { (v, v) } else { (0, 0) };
                out.set(x, y, ColorRgba32::new(v, g, b, 255));
            }
        }
        out
    }
}

/// Decodes one 8-byte interpolated-alpha/red block into 16 values in
/// row-major order. Shared by BC3's alpha plane, BC4, and BC5's two
/// channels, all of which use the same endpoint-plus-7-step-interpolation
/// scheme, just over a different destination channel.
pub(crate) fn interpolate_channel(block: &[u8]) -> [u8; 16] {
    let v0 = block[0] as u32;
    let v1 = block[1] as u32;

    let mut table = [0u32; 8];
    table[0] = v0;
    table[1] = v1;
    if v0 > v1 {
        table[2] = (6 * v0 + v1 + 1) / 7;
        table[3] = (5 * v0 + 2 * v1 + 1) / 7;
        table[4] = (4 * v0 + 3 * v1 + 1) / 7;
        table[5] = (3 * v0 + 4 * v1 + 1) / 7;
        table[6] = (2 * v0 + 5 * v1 + 1) / 7;
        table[7] = (v0 + 6 * v1 + 1) / 7;
    } else {
        table[2] = (4 * v0 + v1 + 1) / 5;
        table[3] = (3 * v0 + 2 * v1 + 1) / 5;
        table[4] = (2 * v0 + 3 * v1 + 1) / 5;
        table[5] = (v0 + 4 * v1 + 1) / 5;
        table[6] = 0x00;
        table[7] = 0xFF;
    }

    let mut bits = u64::from_le_bytes(block[0..8].try_into().unwrap()) >> 16;
    let mut out = [0u8; 16];
    for slot in out.iter_mut() {
        *slot = table[(bits & 0x7) as usize] as u8;
        bits >>= 3;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::BlockDecoder;

    #[test]
    fn eight_step_table_used_when_v0_greater() {
        // all indices zero selects table[0] == v0 unconditionally.
        let block = [255u8, 0, 0, 0, 0, 0, 0, 0];
        let channel = interpolate_channel(&block);
        assert!(channel.iter().all(|&v| v == 255));
    }

    #[test]
    fn five_step_table_used_when_v1_greater_or_equal() {
        // all-ones index bits select index 7 regardless of 3-bit grouping;
        // under the 5-step table (v0 <= v1) that is the hardcoded 0xFF.
        let block = [0u8, 255, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        let channel = interpolate_channel(&block);
        assert!(channel.iter().all(|&v| v == 0xFF));
    }

    #[test]
    fn red_as_luminance_mirrors_into_green_and_blue() {
        let mut options = DecoderOptions::default();
        options.red_as_luminance = true;
        let block = [200u8, 200, 0, 0, 0, 0, 0, 0];
        let decoded = Bc4::decode_block(&block, &options).unwrap();
        let px = decoded.get(0, 0);
        assert_eq!((px.r, px.g, px.b), (200, 200, 200));
    }

    #[test]
    fn default_options_leave_green_and_blue_zero() {
        let block = [200u8, 200, 0, 0, 0, 0, 0, 0];
        let decoded = Bc4::decode_block(&block, &DecoderOptions::default()).unwrap();
        let px = decoded.get(0, 0);
        assert_eq!((px.g, px.b), (0, 0));
    }
}
