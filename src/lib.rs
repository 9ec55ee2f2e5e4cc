// Copyright (c) 2006 Simon Brown <si@sjbrown.co.uk>
// Copyright (c) 2018-2021 Jan Solanti <jhs@psonet.com>
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to	deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be included
// in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS
// OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.
// IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY
// CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT,
// TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE
// SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! A pure Rust decoder for GPU block-compressed textures.
//!
//! Covers the BCn family (BC1 through BC5, BC7), AMD's ATC family (plain,
//! explicit-alpha, interpolated-alpha), and uncompressed raw pixel layouts
//! (R, RG, RGB, RGBA, BGRA). KTX v1 and DDS containers are read structurally
//! so a whole mipmap chain can be decoded from a single file, but this crate
//! never writes encoded data and never touches BC6H's floating-point blocks.
//!
//! The block kernels in [`kernels`] are pure and independent of everything
//! else; [`orchestrator`] is what walks a mip chain and fans work out to
//! them, optionally across a `rayon` pool (feature `parallel`, on by
//! default). See [`api`] for the public entry points most callers want.

pub mod api;
pub mod assemble;
pub mod color;
pub mod container;
pub mod error;
pub mod format;
pub mod kernels;
pub mod options;
pub mod orchestrator;

#[cfg(feature = "async")]
pub mod async_api;

pub use assemble::{DecodedImage, Image2DView};
pub use color::{ColorRgba32, RawBlock4x4};
pub use error::{DecodeError, Result};
pub use format::CompressionFormat;
pub use options::{CancellationHandle, DecoderOptions};

pub use api::{
    block_count, block_size, decode, decode_2d, decode_all_mipmaps, decode_block,
    decode_block_stream, decode_raw, decode_raw_cancellable, decode_raw_stream,
};

#[cfg(feature = "async")]
pub use async_api::DecodeTask;
