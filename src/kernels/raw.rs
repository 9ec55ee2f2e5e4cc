use crate::color::ColorRgba32;
use crate::format::CompressionFormat;
use crate::options::{DecoderOptions, OperationContext};

use super::RawDecoder;

pub struct R {}
pub struct Rg {}
pub struct Rgb {}
pub struct Rgba {}
pub struct Bgra {}

impl RawDecoder for R {
    const PIXEL_SIZE: usize = 1;

    fn decode_pixel(pixel: &[u8], options: &DecoderOptions) -> ColorRgba32 {
        let v = pixel[0];
        if options.red_as_luminance {
            ColorRgba32::new(v, v, v, 255)
        } else {
            ColorRgba32::new(v, 0, 0, 255)
        }
    }
}

impl RawDecoder for Rg {
    const PIXEL_SIZE: usize = 2;

    fn decode_pixel(pixel: &[u8], _options: &DecoderOptions) -> ColorRgba32 {
        ColorRgba32::new(pixel[0], pixel[1], 0, 255)
    }
}

impl RawDecoder for Rgb {
    const PIXEL_SIZE: usize = 3;

    fn decode_pixel(pixel: &[u8], _options: &DecoderOptions) -> ColorRgba32 {
        ColorRgba32::new(pixel[0], pixel[1], pixel[2], 255)
    }
}

impl RawDecoder for Rgba {
    const PIXEL_SIZE: usize = 4;

    fn decode_pixel(pixel: &[u8], _options: &DecoderOptions) -> ColorRgba32 {
        ColorRgba32::new(pixel[0], pixel[1], pixel[2], pixel[3])
    }
}

impl RawDecoder for Bgra {
    const PIXEL_SIZE: usize = 4;

    fn decode_pixel(pixel: &[u8], _options: &DecoderOptions) -> ColorRgba32 {
        ColorRgba32::new(pixel[2], pixel[1], pixel[0], pixel[3])
    }
}

/// Decodes a raw (uncompressed) payload into a row-major RGBA buffer. This
/// bypasses the block assembler entirely: raw layouts are already pixel
/// row-major, so there is nothing to clip or reassemble.
pub fn decode_raw_many(
    format: CompressionFormat,
    data: &[u8],
    out: &mut [ColorRgba32],
    options: &DecoderOptions,
    ctx: &OperationContext,
) -> crate::error::Result<()> {
    use crate::error::DecodeError;
    match format {
        CompressionFormat::R => R::decode_many(data, out, options, ctx),
        CompressionFormat::Rg => Rg::decode_many(data, out, options, ctx),
        CompressionFormat::Rgb => Rgb::decode_many(data, out, options, ctx),
        CompressionFormat::Rgba => Rgba::decode_many(data, out, options, ctx),
        CompressionFormat::Bgra => Bgra::decode_many(data, out, options, ctx),
        compressed => Err(DecodeError::UnsupportedFormat(format!(
            "{compressed:?} is a compressed block format, not a raw layout"
        ))),
    }
}
