//! Thread-dispatched async wrappers. No external async runtime: each
//! operation is just the synchronous computation moved onto a
//! [`std::thread::spawn`]ed worker, joined when the returned handle is
//! awaited for its result.

use std::thread::JoinHandle;

use crate::assemble::DecodedImage;
use crate::color::RawBlock4x4;
use crate::container::{dds::DdsFile, ktx::KtxFile};
use crate::error::{DecodeError, Result};
use crate::format::CompressionFormat;
use crate::options::{CancellationHandle, DecoderOptions};

/// A join-style handle over a decode running on a dedicated thread.
pub struct DecodeTask<T> {
    handle: JoinHandle<Result<T>>,
}

impl<T> DecodeTask<T> {
    /// Blocks until the worker thread finishes and returns its result.
    /// Fails with [`DecodeError::MalformedContainer`] only if the worker
    /// thread itself panicked (the panic message is not otherwise
    /// recoverable across the thread boundary).
    pub fn join(self) -> Result<T> {
        self.handle.join().unwrap_or_else(|_| {
            Err(DecodeError::MalformedContainer(
                "decode worker thread panicked".into(),
            ))
        })
    }
}

/// Spawns [`crate::api::decode_raw`] on a worker thread.
pub fn decode_raw_async(
    bytes: Vec<u8>,
    width: u32,
    height: u32,
    format: CompressionFormat,
    options: DecoderOptions,
    cancellation: CancellationHandle,
) -> DecodeTask<DecodedImage> {
    let handle = std::thread::spawn(move || {
        crate::api::decode_raw_cancellable(&bytes, width, height, format, &options, cancellation)
    });
    DecodeTask { handle }
}

/// Spawns [`crate::api::decode_block`] on a worker thread.
pub fn decode_block_async(block: Vec<u8>, format: CompressionFormat) -> DecodeTask<RawBlock4x4> {
    let handle = std::thread::spawn(move || crate::api::decode_block(&block, format));
    DecodeTask { handle }
}

/// Parses and decodes a KTX file's base mip on a worker thread.
pub fn decode_ktx_async(bytes: Vec<u8>, options: DecoderOptions) -> DecodeTask<DecodedImage> {
    let handle = std::thread::spawn(move || {
        let ktx = KtxFile::parse(&bytes)?;
        crate::api::decode(&ktx, &options)
    });
    DecodeTask { handle }
}

/// Parses and decodes every mip of a DDS file on a worker thread.
pub fn decode_dds_all_mipmaps_async(
    bytes: Vec<u8>,
    options: DecoderOptions,
) -> DecodeTask<Vec<DecodedImage>> {
    let handle = std::thread::spawn(move || {
        let dds = DdsFile::parse(&bytes, options.dds_bc1_expect_alpha)?;
        crate::api::decode_all_mipmaps(&dds, &options)
    });
    DecodeTask { handle }
}
