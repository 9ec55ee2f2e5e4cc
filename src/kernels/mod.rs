//! Kernel dispatch. Each compressed format implements [`private::Format`]
//! and [`private::BlockDecoder`] in its own module; [`BlockDecoder`] is the
//! public trait callers reach for, with default methods that fan a payload
//! out across blocks, sequentially or via rayon, and check cancellation at
//! every chunk boundary.

pub mod atc;
pub mod bc1;
pub mod bc2;
pub mod bc3;
pub mod bc4;
pub mod bc5;
pub mod bc7;
pub mod raw;

use crate::color::{ColorRgba32, RawBlock4x4};
use crate::error::{DecodeError, Result};
use crate::format::{block_count, CompressionFormat};
use crate::options::{DecoderOptions, OperationContext};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Sealed so only the kernels in this module can name a format's block
/// geometry; callers go through [`CompressionFormat`] instead.
pub(crate) mod private {
    pub trait Format {
        const BLOCK_SIZE: usize;
    }

    pub trait Decoder: Format {
        fn decompress_block(block: &[u8], options: &super::DecoderOptions) -> super::RawBlock4x4;
    }
}

/// Implemented by every compressed-format kernel. The default methods
/// handle length validation and parallel fan-out; kernels only need to
/// supply [`private::Decoder::decompress_block`].
pub trait BlockDecoder: private::Decoder {
    /// Decodes exactly one block. Fails with [`DecodeError::LengthMismatch`]
    /// if `block` is not exactly `Self::BLOCK_SIZE` bytes.
    fn decode_block(block: &[u8], options: &DecoderOptions) -> Result<RawBlock4x4> {
        if block.len() != Self::BLOCK_SIZE {
            return Err(DecodeError::LengthMismatch {
                expected: Self::BLOCK_SIZE,
                actual: block.len(),
            });
        }
        Ok(Self::decompress_block(block, options))
    }

    /// Decodes every block in `data` into `out`, one [`RawBlock4x4`] per
    /// block in storage order. `data` must be an exact multiple of
    /// `Self::BLOCK_SIZE`; `out` must have exactly that many slots.
    ///
    /// Dispatches to rayon's `par_chunks` when the `parallel` feature is
    /// enabled and `ctx.is_parallel`, otherwise walks `data` sequentially.
    /// Either way, cancellation is polled once per chunk, never mid-block.
    fn decode_many(
        data: &[u8],
        out: &mut [RawBlock4x4],
        options: &DecoderOptions,
        ctx: &OperationContext,
    ) -> Result<()> {
        let block_size = Self::BLOCK_SIZE;
        if data.len() % block_size != 0 {
            return Err(DecodeError::LengthMismatch {
                expected: (data.len() / block_size + 1) * block_size,
                actual: data.len(),
            });
        }
        let n = data.len() / block_size;
        if out.len() != n {
            return Err(DecodeError::InvalidShape { len: out.len() });
        }

        #[cfg(feature = "parallel")]
        if ctx.is_parallel {
            ctx.check_cancelled()?;
            let chunk_blocks = chunk_block_count(n, ctx.task_count);
            let cancelled = std::sync::atomic::AtomicBool::new(false);
            out.par_chunks_mut(chunk_blocks)
                .zip(data.par_chunks(chunk_blocks * block_size))
                .for_each(|(out_chunk, data_chunk)| {
                    if ctx.cancellation.is_cancelled() {
                        cancelled.store(true, std::sync::atomic::Ordering::Relaxed);
                        return;
                    }
                    for (slot, block) in out_chunk.iter_mut().zip(data_chunk.chunks(block_size)) {
                        *slot = Self::decompress_block(block, options);
                    }
                    ctx.progress.advance(out_chunk.len() as u64);
                });
            return if cancelled.load(std::sync::atomic::Ordering::Relaxed) {
                Err(DecodeError::Cancelled)
            } else {
                Ok(())
            };
        }

        for (i, (slot, block)) in out.iter_mut().zip(data.chunks(block_size)).enumerate() {
            if i % 4096 == 0 {
                ctx.check_cancelled()?;
            }
            *slot = Self::decompress_block(block, options);
            ctx.progress.advance(1);
        }
        Ok(())
    }
}

impl<T: private::Decoder> BlockDecoder for T {}

/// Number of blocks per parallel chunk. `requested == 0` defers to rayon's
/// thread count; the result is always at least 1 so an empty payload never
/// divides by zero upstream.
fn chunk_block_count(total_blocks: usize, requested: u32) -> usize {
    let tasks = if requested == 0 {
        #[cfg(feature = "parallel")]
        {
            rayon::current_num_threads().max(1)
        }
        #[cfg(not(feature = "parallel"))]
        {
            1
        }
    } else {
        requested as usize
    };
    (total_blocks / tasks).max(1)
}

/// Per-pixel raw-format kernel, the non-block analogue of
/// [`BlockDecoder`]. Raw layouts decode element-by-element rather than
/// 4x4-block-by-block, so they get their own trait instead of synthesizing
/// degenerate 1x1 "blocks".
pub trait RawDecoder {
    const PIXEL_SIZE: usize;

    fn decode_pixel(pixel: &[u8], options: &DecoderOptions) -> ColorRgba32;

    fn decode_many(
        data: &[u8],
        out: &mut [ColorRgba32],
        options: &DecoderOptions,
        ctx: &OperationContext,
    ) -> Result<()> {
        let pixel_size = Self::PIXEL_SIZE;
        if data.len() % pixel_size != 0 {
            return Err(DecodeError::LengthMismatch {
                expected: (data.len() / pixel_size + 1) * pixel_size,
                actual: data.len(),
            });
        }
        if out.len() != data.len() / pixel_size {
            return Err(DecodeError::InvalidShape { len: out.len() });
        }

        #[cfg(feature = "parallel")]
        if ctx.is_parallel {
            ctx.check_cancelled()?;
            let chunk_pixels = chunk_block_count(out.len(), ctx.task_count);
            out.par_chunks_mut(chunk_pixels)
                .zip(data.par_chunks(chunk_pixels * pixel_size))
                .for_each(|(out_chunk, data_chunk)| {
                    for (slot, pixel) in out_chunk.iter_mut().zip(data_chunk.chunks(pixel_size)) {
                        *slot = Self::decode_pixel(pixel, options);
                    }
                    ctx.progress.advance(out_chunk.len() as u64);
                });
            return Ok(());
        }

        for (i, (slot, pixel)) in out.iter_mut().zip(data.chunks(pixel_size)).enumerate() {
            if i % 4096 == 0 {
                ctx.check_cancelled()?;
            }
            *slot = Self::decode_pixel(pixel, options);
            ctx.progress.advance(1);
        }
        Ok(())
    }
}

/// Decodes every block of `data` for `format` into row-major
/// [`RawBlock4x4`] storage order, dispatching to the matching kernel.
/// `format` must satisfy `format.is_compressed()`; raw formats go through
/// [`raw::decode_raw_many`] instead.
pub fn decode_blocks(
    format: CompressionFormat,
    data: &[u8],
    width: u32,
    height: u32,
    options: &DecoderOptions,
    ctx: &OperationContext,
) -> Result<Vec<RawBlock4x4>> {
    let n = block_count(width, height);
    let mut out = vec![RawBlock4x4::default(); n];
    match format {
        CompressionFormat::Bc1 => bc1::Bc1::decode_many(data, &mut out, options, ctx)?,
        CompressionFormat::Bc1WithAlpha => {
            bc1::Bc1WithAlpha::decode_many(data, &mut out, options, ctx)?
        }
        CompressionFormat::Bc2 => bc2::Bc2::decode_many(data, &mut out, options, ctx)?,
        CompressionFormat::Bc3 => bc3::Bc3::decode_many(data, &mut out, options, ctx)?,
        CompressionFormat::Bc4 => bc4::Bc4::decode_many(data, &mut out, options, ctx)?,
        CompressionFormat::Bc5 => bc5::Bc5::decode_many(data, &mut out, options, ctx)?,
        CompressionFormat::Bc7 => bc7::Bc7::decode_many(data, &mut out, options, ctx)?,
        CompressionFormat::Atc => atc::Atc::decode_many(data, &mut out, options, ctx)?,
        CompressionFormat::AtcExplicitAlpha => {
            atc::AtcExplicitAlpha::decode_many(data, &mut out, options, ctx)?
        }
        CompressionFormat::AtcInterpolatedAlpha => {
            atc::AtcInterpolatedAlpha::decode_many(data, &mut out, options, ctx)?
        }
        raw => {
            return Err(DecodeError::UnsupportedFormat(format!(
                "{raw:?} is a raw layout, not a block format"
            )))
        }
    }
    Ok(out)
}
