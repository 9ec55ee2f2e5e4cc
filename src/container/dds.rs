//! A minimal DDS structural reader: `"DDS "` magic, the fixed 124-byte
//! header, and an optional DX10 extension header keyed on the `"DX10"`
//! FourCC, followed by a walk of each mip level's byte range.

use log::trace;

use super::{ContainerTexture, MipDescriptor};
use crate::error::{DecodeError, Result};
use crate::format::{from_dxgi_format, from_four_cc, CompressionFormat};

const MAGIC: [u8; 4] = *b"DDS ";
const HEADER_SIZE: usize = 124;
const PIXEL_FORMAT_OFFSET: usize = 4 + 4 + 4 + 4 + 4 + 4 + 4 + 44; // within the header, after size/flags/height/width/pitch/depth/mipcount/reserved1
const DDPF_ALPHAPIXELS: u32 = 0x1;
const DDPF_FOURCC: u32 = 0x4;

/// A parsed DDS texture. As with [`super::ktx::KtxFile`], mip payloads are
/// owned copies so the value is `Send + 'static`.
#[derive(Debug)]
pub struct DdsFile {
    format: CompressionFormat,
    base_width: u32,
    base_height: u32,
    mips: Vec<(u32, u32, Vec<u8>)>,
}

impl DdsFile {
    pub fn parse(bytes: &[u8], dds_bc1_expect_alpha: bool) -> Result<Self> {
        if bytes.len() < 4 + HEADER_SIZE || bytes[0..4] != MAGIC {
            return Err(DecodeError::MalformedContainer("missing DDS magic".into()));
        }

        let header = &bytes[4..4 + HEADER_SIZE];
        let declared_size = read_u32(header, 0) as usize;
        if declared_size != HEADER_SIZE {
            return Err(DecodeError::MalformedContainer(format!(
                "unexpected DDS header size {declared_size}"
            )));
        }

        let height = read_u32(header, 8);
        let width = read_u32(header, 12);
        let mip_map_count = read_u32(header, 24).max(1);
        if width == 0 || height == 0 {
            return Err(DecodeError::MalformedContainer(
                "DDS base level has zero width or height".into(),
            ));
        }

        let pf = &header[PIXEL_FORMAT_OFFSET..PIXEL_FORMAT_OFFSET + 32];
        let pf_flags = read_u32(pf, 4);
        let four_cc: [u8; 4] = pf[8..12].try_into().unwrap();
        let has_alpha_flag = pf_flags & DDPF_ALPHAPIXELS != 0;

        let mut cursor = 4 + HEADER_SIZE;
        let format = if pf_flags & DDPF_FOURCC != 0 && &four_cc == b"DX10" {
            let dx10 = bytes.get(cursor..cursor + 20).ok_or_else(|| {
                DecodeError::MalformedContainer("DX10 header runs past end of file".into())
            })?;
            cursor += 20;
            from_dxgi_format(read_u32(dx10, 0))?
        } else if pf_flags & DDPF_FOURCC != 0 {
            from_four_cc(four_cc)?
        } else {
            return Err(DecodeError::MalformedContainer(
                "DDS files without a FourCC (raw RGB masks) are not supported".into(),
            ));
        };

        let format = resolve_bc1_alpha(format, has_alpha_flag, dds_bc1_expect_alpha);
        trace!("DDS: {width}x{height}, format {format:?}, {mip_map_count} mip level(s)");

        let mut mips = Vec::with_capacity(mip_map_count as usize);
        for level in 0..mip_map_count {
            let level_width = (width >> level).max(1);
            let level_height = (height >> level).max(1);
            let size = crate::format::get_buffer_size(format, level_width, level_height);
            let end = cursor
                .checked_add(size)
                .ok_or_else(|| DecodeError::MalformedContainer("DDS mip size overflow".into()))?;
            let chunk = bytes
                .get(cursor..end)
                .ok_or_else(|| DecodeError::MalformedContainer("DDS mip data runs past end of file".into()))?;
            mips.push((level_width, level_height, chunk.to_vec()));
            cursor = end;
        }

        Ok(Self {
            format,
            base_width: width,
            base_height: height,
            mips,
        })
    }
}

/// Deciding between `Bc1` and `Bc1WithAlpha` happens once here, following
/// invariant (v): the container's alpha flag wins, then the caller's
/// override, then plain `Bc1`.
fn resolve_bc1_alpha(format: CompressionFormat, has_alpha_flag: bool, expect_alpha: bool) -> CompressionFormat {
    if format == CompressionFormat::Bc1 && (has_alpha_flag || expect_alpha) {
        CompressionFormat::Bc1WithAlpha
    } else {
        format
    }
}

impl ContainerTexture for DdsFile {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn build_minimal_dds(width: u32, height: u32, four_cc: &[u8; 4], flags: u32, payload: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&(HEADER_SIZE as u32).to_le_bytes()); // size
        bytes.extend_from_slice(&0u32.to_le_bytes()); // header flags
        bytes.extend_from_slice(&height.to_le_bytes());
        bytes.extend_from_slice(&width.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes()); // pitch
        bytes.extend_from_slice(&0u32.to_le_bytes()); // depth
        bytes.extend_from_slice(&1u32.to_le_bytes()); // mip count
        bytes.extend_from_slice(&[0u8; 44]); // reserved1
        // pixel format (32 bytes)
        bytes.extend_from_slice(&32u32.to_le_bytes()); // pf size
        bytes.extend_from_slice(&(flags | DDPF_FOURCC).to_le_bytes()); // pf flags
        bytes.extend_from_slice(four_cc);
        bytes.extend_from_slice(&[0u8; 20]); // rgb_bit_count + 4 masks
        bytes.extend_from_slice(&0u32.to_le_bytes()); // caps
        bytes.extend_from_slice(&0u32.to_le_bytes()); // caps2
        bytes.extend_from_slice(&0u32.to_le_bytes()); // caps3
        bytes.extend_from_slice(&0u32.to_le_bytes()); // caps4
        bytes.extend_from_slice(&0u32.to_le_bytes()); // reserved2
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn rejects_missing_magic() {
        let err = DdsFile::parse(&[0u8; 200], false).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedContainer(_)));
    }

    #[test]
    fn bc1_without_alpha_flag_stays_bc1() {
        let payload = vec![0u8; 8];
        let bytes = build_minimal_dds(4, 4, b"DXT1", 0, &payload);
        let dds = DdsFile::parse(&bytes, false).unwrap();
        assert_eq!(dds.format(), CompressionFormat::Bc1);
    }

    #[test]
    fn bc1_with_alpha_flag_upgrades_to_bc1_with_alpha() {
        let payload = vec![0u8; 8];
        let bytes = build_minimal_dds(4, 4, b"DXT1", DDPF_ALPHAPIXELS, &payload);
        let dds = DdsFile::parse(&bytes, false).unwrap();
        assert_eq!(dds.format(), CompressionFormat::Bc1WithAlpha);
    }

    #[test]
    fn dds_bc1_expect_alpha_option_upgrades_even_without_the_flag() {
        let payload = vec![0u8; 8];
        let bytes = build_minimal_dds(4, 4, b"DXT1", 0, &payload);
        let dds = DdsFile::parse(&bytes, true).unwrap();
        assert_eq!(dds.format(), CompressionFormat::Bc1WithAlpha);
    }
}
