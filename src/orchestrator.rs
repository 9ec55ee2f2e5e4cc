//! Walks a mipmap chain, dispatching each level to its kernel and the
//! assembler in turn, reporting progress and honoring cancellation between
//! levels.

use log::{debug, trace};

use crate::assemble::{assemble_blocks, DecodedImage};
use crate::container::MipDescriptor;
use crate::error::Result;
use crate::format::{block_count, get_buffer_size, CompressionFormat};
use crate::kernels::{decode_blocks, raw};
use crate::options::{CancellationHandle, DecoderOptions, OperationContext};

/// Dimensions of mip level `level` given the base level's dimensions, per
/// the standard `max(1, floor(base / 2^level))` halving rule.
pub fn mip_dimensions(base_width: u32, base_height: u32, level: u32) -> (u32, u32) {
    let width = (base_width >> level).max(1);
    let height = (base_height >> level).max(1);
    (width, height)
}

/// Decodes a single mip level's encoded payload into its pixel buffer.
pub fn decode_mip(
    format: CompressionFormat,
    data: &[u8],
    width: u32,
    height: u32,
    options: &DecoderOptions,
    ctx: &OperationContext,
) -> Result<DecodedImage> {
    let expected = get_buffer_size(format, width, height);
    if data.len() != expected {
        return Err(crate::error::DecodeError::LengthMismatch {
            expected,
            actual: data.len(),
        });
    }

    if format.is_compressed() {
        let blocks = decode_blocks(format, data, width, height, options, ctx)?;
        let pixels = assemble_blocks(&blocks, width, height);
        Ok(DecodedImage::new(width, height, pixels))
    } else {
        let n = width as usize * height as usize;
        let mut pixels = vec![crate::color::ColorRgba32::default(); n];
        raw::decode_raw_many(format, data, &mut pixels, options, ctx)?;
        Ok(DecodedImage::new(width, height, pixels))
    }
}

/// Decodes every requested mip in `mips`, in level order, advancing a
/// single shared progress counter across the whole chain and checking
/// cancellation between levels.
pub fn decode_mip_chain(
    format: CompressionFormat,
    mips: &[MipDescriptor<'_>],
    options: &DecoderOptions,
    cancellation: CancellationHandle,
    all_mipmaps: bool,
) -> Result<Vec<DecodedImage>> {
    let levels: &[MipDescriptor<'_>] = if all_mipmaps { mips } else { &mips[..mips.len().min(1)] };

    let total_blocks: u64 = levels
        .iter()
        .map(|mip| {
            if format.is_compressed() {
                block_count(mip.width, mip.height) as u64
            } else {
                mip.width as u64 * mip.height as u64
            }
        })
        .sum();

    let ctx = OperationContext::new(options, cancellation, total_blocks);
    debug!(
        "decoding {} mip level(s) of format {:?}, {} blocks total",
        levels.len(),
        format,
        total_blocks
    );

    let mut results = Vec::with_capacity(levels.len());
    for (level, mip) in levels.iter().enumerate() {
        ctx.check_cancelled()?;
        trace!("mip {level}: {}x{}, {} bytes", mip.width, mip.height, mip.data.len());
        let image = decode_mip(format, mip.data, mip.width, mip.height, options, &ctx)?;
        results.push(image);
    }
    ctx.progress.finish();
    Ok(results)
}
