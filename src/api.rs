//! The public surface: synchronous entry points for raw buffers, streams,
//! parsed containers, and single blocks.

use std::io::Read;

use crate::assemble::DecodedImage;
use crate::color::{ColorRgba32, RawBlock4x4};
use crate::container::ContainerTexture;
use crate::error::{DecodeError, Result};
use crate::format::{get_buffer_size, CompressionFormat};
use crate::kernels::{self, BlockDecoder};
use crate::options::{CancellationHandle, DecoderOptions, OperationContext};
use crate::orchestrator::{decode_mip, decode_mip_chain};

/// Decodes a single raw (non-container) payload of known dimensions and
/// format. Fails with [`DecodeError::LengthMismatch`] if `bytes` is not
/// exactly [`get_buffer_size`] long.
pub fn decode_raw(
    bytes: &[u8],
    width: u32,
    height: u32,
    format: CompressionFormat,
    options: &DecoderOptions,
) -> Result<DecodedImage> {
    decode_raw_cancellable(bytes, width, height, format, options, CancellationHandle::new())
}

/// As [`decode_raw`], but the caller supplies the cancellation handle
/// rather than one created fresh for the call.
pub fn decode_raw_cancellable(
    bytes: &[u8],
    width: u32,
    height: u32,
    format: CompressionFormat,
    options: &DecoderOptions,
    cancellation: CancellationHandle,
) -> Result<DecodedImage> {
    let total_blocks = if format.is_compressed() {
        crate::format::block_count(width, height) as u64
    } else {
        width as u64 * height as u64
    };
    let ctx = OperationContext::new(options, cancellation, total_blocks);
    let image = decode_mip(format, bytes, width, height, options, &ctx)?;
    ctx.progress.finish();
    Ok(image)
}

/// Reads exactly [`get_buffer_size`] bytes from `reader` and decodes them.
/// A short read fails with [`DecodeError::Truncated`].
pub fn decode_raw_stream<R: Read>(
    reader: &mut R,
    width: u32,
    height: u32,
    format: CompressionFormat,
    options: &DecoderOptions,
) -> Result<DecodedImage> {
    let expected = get_buffer_size(format, width, height);
    let mut buf = vec![0u8; expected];
    let read = read_as_much_as_possible(reader, &mut buf)?;
    if read != expected {
        return Err(DecodeError::Truncated {
            expected,
            actual: read,
        });
    }
    decode_raw(&buf, width, height, format, options)
}

/// Decodes only the base mip level of a parsed container.
pub fn decode(container: &impl ContainerTexture, options: &DecoderOptions) -> Result<DecodedImage> {
    let mut images = decode_all_or_base(container, options, false)?;
    Ok(images.remove(0))
}

/// Decodes every mip level of a parsed container, base level first.
pub fn decode_all_mipmaps(
    container: &impl ContainerTexture,
    options: &DecoderOptions,
) -> Result<Vec<DecodedImage>> {
    decode_all_or_base(container, options, true)
}

fn decode_all_or_base(
    container: &impl ContainerTexture,
    options: &DecoderOptions,
    all_mipmaps: bool,
) -> Result<Vec<DecodedImage>> {
    let mips: Vec<_> = (0..container.mip_count()).map(|level| container.mip(level)).collect();
    decode_mip_chain(container.format(), &mips, options, CancellationHandle::new(), all_mipmaps)
}

/// Like [`decode_raw`], but intended for callers who only want the logical
/// 2-D shape: call [`DecodedImage::as_view`] on the result to get a
/// non-owning [`crate::assemble::Image2DView`] without copying the pixel
/// buffer.
pub fn decode_2d(
    bytes: &[u8],
    width: u32,
    height: u32,
    format: CompressionFormat,
    options: &DecoderOptions,
) -> Result<DecodedImage> {
    decode_raw(bytes, width, height, format, options)
}

/// Decodes a single compressed block using default options. Fails with
/// [`DecodeError::UnsupportedFormat`] if `format` is a raw layout, or
/// [`DecodeError::LengthMismatch`] if `block` is the wrong length.
pub fn decode_block(block: &[u8], format: CompressionFormat) -> Result<RawBlock4x4> {
    let options = DecoderOptions::default();
    match format {
        CompressionFormat::Bc1 => kernels::bc1::Bc1::decode_block(block, &options),
        CompressionFormat::Bc1WithAlpha => kernels::bc1::Bc1WithAlpha::decode_block(block, &options),
        CompressionFormat::Bc2 => kernels::bc2::Bc2::decode_block(block, &options),
        CompressionFormat::Bc3 => kernels::bc3::Bc3::decode_block(block, &options),
        CompressionFormat::Bc4 => kernels::bc4::Bc4::decode_block(block, &options),
        CompressionFormat::Bc5 => kernels::bc5::Bc5::decode_block(block, &options),
        CompressionFormat::Bc7 => kernels::bc7::Bc7::decode_block(block, &options),
        CompressionFormat::Atc => kernels::atc::Atc::decode_block(block, &options),
        CompressionFormat::AtcExplicitAlpha => kernels::atc::AtcExplicitAlpha::decode_block(block, &options),
        CompressionFormat::AtcInterpolatedAlpha => {
            kernels::atc::AtcInterpolatedAlpha::decode_block(block, &options)
        }
        raw => Err(DecodeError::UnsupportedFormat(format!(
            "{raw:?} has no single-block decode; it is a raw per-pixel layout"
        ))),
    }
}

/// Reads and decodes one block from `reader`. Returns `Ok(0)` on a clean
/// EOF (no bytes read at all), `Ok(block_size)` on success, and fails
/// [`DecodeError::Truncated`] on a partial read or
/// [`DecodeError::InvalidShape`] if `out` is not 16 pixels (a 4x4 grid).
pub fn decode_block_stream<R: Read>(
    reader: &mut R,
    format: CompressionFormat,
    out: &mut [ColorRgba32],
) -> Result<usize> {
    if out.len() != 16 {
        return Err(DecodeError::InvalidShape { len: out.len() });
    }
    let block_size = format.block_byte_size();
    let mut buf = vec![0u8; block_size];
    let read = read_as_much_as_possible(reader, &mut buf)?;
    if read == 0 {
        return Ok(0);
    }
    if read != block_size {
        return Err(DecodeError::Truncated {
            expected: block_size,
            actual: read,
        });
    }
    let block = decode_block(&buf, format)?;
    out.copy_from_slice(block.as_slice());
    Ok(block_size)
}

/// Block byte size for `format`. Mirrors
/// [`CompressionFormat::block_byte_size`] as a free function for callers
/// who only import `crate::api`.
pub fn block_size(format: CompressionFormat) -> usize {
    format.block_byte_size()
}

pub use crate::format::block_count;

fn read_as_much_as_possible<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(DecodeError::Io(e)),
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_raw_rejects_short_buffers() {
        let err = decode_raw(&[0u8; 3], 4, 4, CompressionFormat::Rgba, &DecoderOptions::default())
            .unwrap_err();
        assert!(matches!(err, DecodeError::LengthMismatch { .. }));
    }

    #[test]
    fn decode_raw_stream_reports_truncation() {
        let mut reader: &[u8] = &[0u8; 3];
        let err = decode_raw_stream(&mut reader, 4, 4, CompressionFormat::Rgba, &DecoderOptions::default())
            .unwrap_err();
        assert!(matches!(err, DecodeError::Truncated { .. }));
    }

    #[test]
    fn decode_block_stream_returns_zero_on_clean_eof() {
        let mut reader: &[u8] = &[];
        let mut out = [ColorRgba32::default(); 16];
        let n = decode_block_stream(&mut reader, CompressionFormat::Bc1, &mut out).unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn decode_block_rejects_raw_formats() {
        let err = decode_block(&[0u8; 4], CompressionFormat::Rgba).unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedFormat(_)));
    }
}
