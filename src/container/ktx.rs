//! A minimal KTX v1 structural reader: magic-byte validation, the
//! fixed 13-`u32` header, key/value metadata skipped by length, and a
//! per-mip `(image_size, width, height, data)` walk that keeps only
//! face 0 when a cubemap is present.

use log::trace;

use super::{ContainerTexture, MipDescriptor};
use crate::error::{DecodeError, Result};
use crate::format::{from_gl_internal_format, CompressionFormat};

const IDENTIFIER: [u8; 12] = [
    0xAB, 0x4B, 0x54, 0x58, 0x20, 0x31, 0x31, 0xBB, 0x0D, 0x0A, 0x1A, 0x0A,
];

/// A parsed KTX v1 texture. Mip payloads are owned (copied out of the
/// source buffer during parsing) so the whole value is `Send + 'static`,
/// which the `async` feature's thread-dispatched entry points require.
#[derive(Debug)]
pub struct KtxFile {
    format: CompressionFormat,
    base_width: u32,
    base_height: u32,
    mips: Vec<(u32, u32, Vec<u8>)>,
}

impl KtxFile {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 12 + 13 * 4 || bytes[0..12] != IDENTIFIER {
            return Err(DecodeError::MalformedContainer(
                "missing or invalid KTX identifier".into(),
            ));
        }

        let endianness = read_u32(bytes, 12);
        if endianness != 0x0403_0201 {
            return Err(DecodeError::MalformedContainer(
                "big-endian KTX files are not supported".into(),
            ));
        }

        let gl_internal_format = read_u32(bytes, 12 + 4 * 4);
        let pixel_width = read_u32(bytes, 12 + 4 * 6);
        let pixel_height = read_u32(bytes, 12 + 4 * 7);
        let number_of_faces = read_u32(bytes, 12 + 4 * 10).max(1);
        let number_of_mipmap_levels = read_u32(bytes, 12 + 4 * 11).max(1);
        let bytes_of_key_value_data = read_u32(bytes, 12 + 4 * 12) as usize;

        if pixel_width == 0 || pixel_height == 0 {
            return Err(DecodeError::MalformedContainer(
                "KTX base level has zero width or height".into(),
            ));
        }

        let format = from_gl_internal_format(gl_internal_format)?;
        trace!(
            "KTX: {pixel_width}x{pixel_height}, format {format:?}, {number_of_mipmap_levels} mip level(s), {number_of_faces} face(s)"
        );

        let header_end = 12 + 13 * 4;
        let mut offset = header_end + bytes_of_key_value_data;

        let mut mips = Vec::with_capacity(number_of_mipmap_levels as usize);
        for level in 0..number_of_mipmap_levels {
            let image_size = read_u32(bytes, offset) as usize;
            offset += 4;

            let level_width = (pixel_width >> level).max(1);
            let level_height = (pixel_height >> level).max(1);

            // Only face 0 is kept; later faces are skipped but still
            // consume their byte ranges so later mip levels stay aligned.
            let mut face0 = Vec::new();
            for face in 0..number_of_faces {
                let end = offset
                    .checked_add(image_size)
                    .ok_or_else(|| DecodeError::MalformedContainer("KTX image size overflow".into()))?;
                let chunk = bytes.get(offset..end).ok_or_else(|| {
                    DecodeError::MalformedContainer("KTX mip data runs past end of file".into())
                })?;
                if face == 0 {
                    face0 = chunk.to_vec();
                }
                offset = end;
                offset += cube_padding(image_size);
            }
            mips.push((level_width, level_height, face0));
            offset += mip_padding(image_size);
        }

        Ok(Self {
            format,
            base_width: pixel_width,
            base_height: pixel_height,
            mips,
        })
    }
}

impl ContainerTexture for KtxFile {
    fn format(&self) -> CompressionFormat {
        self.format
    }

    fn base_width(&self) -> u32 {
        self.base_width
    }

    fn base_height(&self) -> u32 {
        self.base_height
    }

    fn mip_count(&self) -> u32 {
        self.mips.len() as u32
    }

    fn mip(&self, level: u32) -> MipDescriptor<'_> {
        let (width, height, data) = &self.mips[level as usize];
        MipDescriptor { width: *width, height: *height, data }
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
}

/// KTX pads each cube face to a 4-byte boundary.
fn cube_padding(image_size: usize) -> usize {
    (4 - (image_size % 4)) % 4
}

/// And pads the whole mip level the same way.
fn mip_padding(image_size: usize) -> usize {
    (4 - (image_size % 4)) % 4
}
