use crate::color::{ColorRgba32, RawBlock4x4};
use crate::options::DecoderOptions;

use super::private;

/// DXT1 with no alpha channel: the four-colour interpolation branch is used
/// unconditionally, so blocks encoded with `color0 <= color1` still decode
/// to four opaque colours rather than a punch-through black.
pub struct Bc1 {}

/// DXT1 with 1-bit alpha (sometimes called DXT1A): when `color0 <= color1`,
/// the fourth palette entry is transparent black instead of an interpolated
/// colour.
pub struct Bc1WithAlpha {}

impl private::Format for Bc1 {
    const BLOCK_SIZE: usize = 8;
}

impl private::Format for Bc1WithAlpha {
    const BLOCK_SIZE: usize = 8;
}

impl private::Decoder for Bc1 {
    fn decompress_block(block: &[u8], _options: &DecoderOptions) -> RawBlock4x4 {
        decode_color_block(block, true)
    }
}

impl private::Decoder for Bc1WithAlpha {
    fn decompress_block(block: &[u8], _options: &DecoderOptions) -> RawBlock4x4 {
        decode_color_block(block, false)
    }
}

/// Shared BC1/BC2/BC3 colour-plane decoder. `force_four_color` is set by
/// BC1's no-alpha variant and always by BC2/BC3, whose colour block never
/// carries the punch-through mode.
pub(crate) fn decode_color_block(block: &[u8], force_four_color: bool) -> RawBlock4x4 {
    let c0 = u16::from_le_bytes([block[0], block[1]]);
    let c1 = u16::from_le_bytes([block[2], block[3]]);

    let (r0, g0, b0) = expand_565(c0);
    let (r1, g1, b1) = expand_565(c1);

    let mut palette = [ColorRgba32::BLACK_OPAQUE; 4];
    palette[0] = ColorRgba32::new(r0, g0, b0, 255);
    palette[1] = ColorRgba32::new(r1, g1, b1, 255);

    if c0 > c1 || force_four_color {
        palette[2] = lerp_color(r0, g0, b0, r1, g1, b1, 2, 1, 3);
        palette[3] = lerp_color(r0, g0, b0, r1, g1, b1, 1, 2, 3);
    } else {
        palette[2] = lerp_color(r0, g0, b0, r1, g1, b1, 1, 1, 2);
        palette[3] = ColorRgba32::BLACK_TRANSPARENT;
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

/// Expands a 5:6:5 packed colour to 8 bits per channel by replicating the
/// high bits into the newly freed low bits, the same scaling libsquish and
/// bcdec both use (`* 527 + 23 >> 6` for 5-bit, `* 259 + 33 >> 6` for 6-bit).
pub(crate) fn expand_565(c: u16) -> (u8, u8, u8) {
    let r = (((c >> 11) & 0x1F) as u32 * 527 + 23) >> 6;
    let g = (((c >> 5) & 0x3F) as u32 * 259 + 33) >> 6;
    let b = ((c & 0x1F) as u32 * 527 + 23) >> 6;
    (r as u8, g as u8, b as u8)
}

fn lerp_color(r0: u8, g0: u8, b0: u8, r1: u8, g1: u8, b1: u8, w0: u32, w1: u32, div: u32) -> ColorRgba32 {
    let r = (w0 * r0 as u32 + w1 * r1 as u32 + div / 2) / div;
    let g = (w0 * g0 as u32 + w1 * g1 as u32 + div / 2) / div;
    let b = (w0 * b0 as u32 + w1 * b1 as u32 + div / 2) / div;
    ColorRgba32::new(r as u8, g as u8, b as u8, 255)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::BlockDecoder;

    // Gray-scale checkerboard, 0xFF in the top-left, middle four pixels at
    // 0x7F. Produced with AMD Compressonator v4.1.5083.
    const ENCODED_GRAY: [u8; 8] = [0x00, 0x00, 0xFF, 0xFF, 0x11, 0x68, 0x29, 0x44];

    fn gray_expected() -> [u8; 16] {
        [
            0xFF, 0x00, 0xFF, 0x00, //
            0x00, 0x7F, 0x7F, 0xFF, //
            0xFF, 0x7F, 0x7F, 0x00, //
            0x00, 0xFF, 0x00, 0xFF,
        ]
    }

    #[test]
    fn decodes_gray_checkerboard() {
        let block = Bc1::decode_block(&ENCODED_GRAY, &DecoderOptions::default()).unwrap();
        let expected = gray_expected();
        for (i, gray) in expected.iter().enumerate() {
            let px = block.as_slice()[i];
            assert_eq!((px.r, px.g, px.b, px.a), (*gray, *gray, *gray, 255));
        }
    }

    #[test]
    fn rejects_wrong_length() {
        let err = Bc1::decode_block(&[0u8; 7], &DecoderOptions::default()).unwrap_err();
        assert!(matches!(err, crate::error::DecodeError::LengthMismatch { .. }));
    }

    #[test]
    fn alpha_variant_picks_punch_through_black() {
        // c0 <= c1 forces the 3-color + transparent-black branch.
        let block: [u8; 8] = [0x00, 0x00, 0x01, 0x00, 0xFF, 0xFF, 0xFF, 0xFF];
        let decoded = Bc1WithAlpha::decode_block(&block, &DecoderOptions::default()).unwrap();
        // index 3 used by every texel here, which must land on the
        // transparent entry.
        assert_eq!(decoded.get(0, 0).a, 0);
    }

    #[test]
    fn no_alpha_variant_never_produces_transparent_texels() {
        let block: [u8; 8] = [0x00, 0x00, 0x01, 0x00, 0xFF, 0xFF, 0xFF, 0xFF];
        let decoded = Bc1::decode_block(&block, &DecoderOptions::default()).unwrap();
        for px in decoded.as_slice() {
            assert_eq!(px.a, 255);
        }
    }
}
