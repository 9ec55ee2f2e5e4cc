//! The format registry: the single source of truth mapping a
//! [`CompressionFormat`] to its block geometry and byte layout. Container
//! adapters (`container::ktx`, `container::dds`) translate their own format
//! identifiers into this neutral tag before anything else in the crate runs.

use crate::error::{DecodeError, Result};

/// Neutral tag identifying the kind of an encoded payload.
///
/// `Bc1` and `Bc1WithAlpha` are kept as distinct variants (rather than a
/// flag on one `Bc1` variant) because the choice between them is made once,
/// at container-resolution time, and must not be re-derived per block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionFormat {
    R,
    Rg,
    Rgb,
    Rgba,
    Bgra,
    Bc1,
    Bc1WithAlpha,
    Bc2,
    Bc3,
    Bc4,
    Bc5,
    Bc7,
    Atc,
    AtcExplicitAlpha,
    AtcInterpolatedAlpha,
}

impl CompressionFormat {
    /// Whether this format is a 4x4 block format, as opposed to a
    /// per-pixel raw layout.
    pub const fn is_compressed(self) -> bool {
        !matches!(
            self,
            Self::R | Self::Rg | Self::Rgb | Self::Rgba | Self::Bgra
        )
    }

    /// The size in bytes of one compressed block, or of one raw pixel.
    pub const fn block_byte_size(self) -> usize {
        match self {
            Self::R => 1,
            Self::Rg => 2,
            Self::Rgb => 3,
            Self::Rgba | Self::Bgra => 4,
            Self::Bc1 | Self::Bc1WithAlpha | Self::Bc4 | Self::Atc => 8,
            Self::Bc2
            | Self::Bc3
            | Self::Bc5
            | Self::Bc7
            | Self::AtcExplicitAlpha
            | Self::AtcInterpolatedAlpha => 16,
        }
    }

    /// The pixel extent of one block: 4x4 for every compressed format,
    /// 1x1 for raw layouts.
    pub const fn block_extent(self) -> (u32, u32) {
        if self.is_compressed() {
            (4, 4)
        } else {
            (1, 1)
        }
    }
}

/// Number of 4x4 blocks needed to cover a `width x height` image, rounding
/// up on both axes. This is a pure dimension query and does not depend on
/// the format: raw formats simply never consult it.
pub const fn block_count(width: u32, height: u32) -> usize {
    let bw = (width as usize + 3) / 4;
    let bh = (height as usize + 3) / 4;
    bw * bh
}

/// The number of bytes an encoded (or raw) payload of the given format and
/// dimensions must occupy.
pub const fn get_buffer_size(format: CompressionFormat, width: u32, height: u32) -> usize {
    if format.is_compressed() {
        format.block_byte_size() * block_count(width, height)
    } else {
        format.block_byte_size() * width as usize * height as usize
    }
}

/// Validates that `len` is an exact multiple of `format`'s block size and
/// returns the block count, or fails with [`DecodeError::LengthMismatch`].
pub fn validate_block_aligned(format: CompressionFormat, len: usize) -> Result<usize> {
    let block_size = format.block_byte_size();
    if len % block_size != 0 {
        return Err(DecodeError::LengthMismatch {
            expected: ((len / block_size) + 1) * block_size,
            actual: len,
        });
    }
    Ok(len / block_size)
}

/// Resolves a GL internal format (as found in a KTX header) to a
/// [`CompressionFormat`]. See the Khronos Data Format registry for the
/// numeric constants.
pub fn from_gl_internal_format(value: u32) -> Result<CompressionFormat> {
    use CompressionFormat::*;
    Ok(match value {
        0x8229 => R,              // GL_R8
        0x822B => Rg,             // GL_RG8
        0x8051 => Rgb,            // GL_RGB8
        0x8058 => Rgba,           // GL_RGBA8
        0x80E1 => Bgra,           // GL_BGRA
        0x83F0 => Bc1,            // GL_COMPRESSED_RGB_S3TC_DXT1_EXT
        0x83F1 => Bc1WithAlpha,   // GL_COMPRESSED_RGBA_S3TC_DXT1_EXT
        0x83F2 => Bc2,            // GL_COMPRESSED_RGBA_S3TC_DXT3_EXT
        0x83F3 => Bc3,            // GL_COMPRESSED_RGBA_S3TC_DXT5_EXT
        0x8DBB => Bc4,            // GL_COMPRESSED_RED_RGTC1
        0x8DBD => Bc5,            // GL_COMPRESSED_RG_RGTC2
        0x8E8C => Bc7,            // GL_COMPRESSED_RGBA_BPTC_UNORM
        0x8C92 => Atc,            // GL_ATC_RGB_AMD
        0x8C93 => AtcExplicitAlpha, // GL_ATC_RGBA_EXPLICIT_ALPHA_AMD
        0x87EE => AtcInterpolatedAlpha, // GL_ATC_RGBA_INTERPOLATED_ALPHA_AMD
        other => {
            return Err(DecodeError::UnsupportedFormat(format!(
                "GL internal format 0x{other:04X}"
            )))
        }
    })
}

/// Resolves a DXGI format (as found in a DDS DX10 header) to a
/// [`CompressionFormat`]. BC1's alpha variant is not determined here; the
/// DDS adapter re-resolves it using the `DDPF_ALPHAPIXELS` flag and
/// [`crate::options::DecoderOptions::dds_bc1_expect_alpha`].
pub fn from_dxgi_format(value: u32) -> Result<CompressionFormat> {
    use CompressionFormat::*;
    Ok(match value {
        28 | 29 => Rgba, // DXGI_FORMAT_R8G8B8A8_UNORM[_SRGB]
        87 | 91 => Bgra, // DXGI_FORMAT_B8G8R8A8_UNORM[_SRGB]
        61 => R,         // DXGI_FORMAT_R8_UNORM
        49 => Rg,        // DXGI_FORMAT_R8G8_UNORM
        70 | 71 | 72 => Bc1, // DXGI_FORMAT_BC1_*
        73 | 74 | 75 => Bc2,
        76 | 77 | 78 => Bc3,
        79 | 80 | 81 | 82 => Bc4,
        83 | 84 | 85 | 86 => Bc5,
        97 | 98 | 99 => Bc7,
        other => {
            return Err(DecodeError::UnsupportedFormat(format!(
                "DXGI format {other}"
            )))
        }
    })
}

/// Resolves a legacy DDS FourCC code to a [`CompressionFormat`]. As with
/// [`from_dxgi_format`], the BC1 alpha variant is re-resolved by the DDS
/// adapter.
pub fn from_four_cc(four_cc: [u8; 4]) -> Result<CompressionFormat> {
    use CompressionFormat::*;
    Ok(match &four_cc {
        b"DXT1" => Bc1,
        b"DXT2" | b"DXT3" => Bc2,
        b"DXT4" | b"DXT5" => Bc3,
        b"ATI1" | b"BC4U" => Bc4,
        b"ATI2" | b"BC5U" => Bc5,
        b"ATC " => Atc,
        b"ATCA" => AtcExplicitAlpha,
        b"ATCI" => AtcInterpolatedAlpha,
        other => {
            return Err(DecodeError::UnsupportedFormat(format!(
                "FourCC {:?}",
                String::from_utf8_lossy(other)
            )))
        }
    })
}
