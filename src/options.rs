//! Per-decoder tunables and per-call control: [`DecoderOptions`] is
//! constructed once and reused across calls; [`OperationContext`] is built
//! fresh for each decode and carries the cancellation handle and progress
//! sink that call needs.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{DecodeError, Result};

/// A progress callback. Must be reentrant: it may be invoked from any
/// worker thread, including concurrently with itself.
pub type ProgressCallback = Arc<dyn Fn(f64) + Send + Sync>;

/// Tunables constructed once per decoder and reused across calls.
#[derive(Clone)]
pub struct DecoderOptions {
    /// When decoding a single-channel raw or BC4 payload, also write the
    /// red component into green and blue so the result reads as grayscale
    /// rather than a pure-red tint.
    pub red_as_luminance: bool,
    /// When a DDS container gives no other signal about BC1 alpha (no
    /// `DDPF_ALPHAPIXELS` flag, no DX10 header), assume the 1-bit alpha
    /// variant anyway.
    pub dds_bc1_expect_alpha: bool,
    /// Decode blocks across a worker pool instead of on the caller's
    /// thread. Has no effect unless the `parallel` feature is enabled.
    pub is_parallel: bool,
    /// Number of chunks to partition parallel work into. `0` means "let
    /// the worker pool decide" (`rayon::current_num_threads()`).
    pub task_count: u32,
    /// Invoked with a monotonically increasing value in `[0, 1]` as blocks
    /// are decoded.
    pub progress: Option<ProgressCallback>,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            red_as_luminance: false,
            dds_bc1_expect_alpha: false,
            is_parallel: true,
            task_count: 0,
            progress: None,
        }
    }
}

/// A cooperative, cloneable cancellation flag shared between the caller and
/// an in-flight decode. Tripping it is observed at mip and chunk
/// boundaries, never mid-block.
#[derive(Clone, Default)]
pub struct CancellationHandle(Arc<AtomicBool>);

impl CancellationHandle {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn trip(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A monotone block counter backing the user-visible progress fraction.
pub struct OperationProgress {
    total: u64,
    processed: AtomicU64,
    callback: Option<ProgressCallback>,
}

impl OperationProgress {
    pub fn new(total: u64, callback: Option<ProgressCallback>) -> Self {
        Self {
            total,
            processed: AtomicU64::new(0),
            callback,
        }
    }

    /// Advances the counter by `delta` and reports the new fraction. Safe
    /// to call concurrently from multiple worker threads.
    pub fn advance(&self, delta: u64) {
        let processed = self.processed.fetch_add(delta, Ordering::Release) + delta;
        self.report(processed);
    }

    fn report(&self, processed: u64) {
        if let Some(cb) = &self.callback {
            let fraction = if self.total == 0 {
                1.0
            } else {
                (processed as f64 / self.total as f64).min(1.0)
            };
            cb(fraction);
        }
    }

    /// Forces a final `1.0` report. Called once by the orchestrator after
    /// every mip has been processed successfully, so rounding in
    /// `advance` can never leave the sequence short of `1.0`.
    pub fn finish(&self) {
        self.report(self.total);
    }
}

/// Per-call control bundle threaded through the orchestrator and into each
/// kernel's `decode_many`.
pub struct OperationContext {
    pub cancellation: CancellationHandle,
    pub is_parallel: bool,
    pub task_count: u32,
    pub progress: Arc<OperationProgress>,
}

impl OperationContext {
    pub fn new(options: &DecoderOptions, cancellation: CancellationHandle, total_blocks: u64) -> Self {
        Self {
            cancellation,
            is_parallel: options.is_parallel,
            task_count: options.task_count,
            progress: Arc::new(OperationProgress::new(total_blocks, options.progress.clone())),
        }
    }

    /// Returns `Err(Cancelled)` without writing any output if the handle
    /// has been tripped. Call at every suspension point named in the
    /// concurrency model: between mips, and at each parallel chunk
    /// boundary.
    pub fn check_cancelled(&self) -> Result<()> {
        if self.cancellation.is_cancelled() {
            Err(DecodeError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn progress_is_monotonic_and_reaches_one() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let progress = OperationProgress::new(
            4,
            Some(Arc::new(move |f| seen_clone.lock().unwrap().push(f))),
        );
        progress.advance(1);
        progress.advance(2);
        progress.finish();

        let values = seen.lock().unwrap();
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*values.last().unwrap(), 1.0);
    }

    #[test]
    fn cancellation_handle_is_observed_after_trip() {
        let handle = CancellationHandle::new();
        assert!(!handle.is_cancelled());
        handle.trip();
        assert!(handle.is_cancelled());
        let cloned = handle.clone();
        assert!(cloned.is_cancelled());
    }

    #[test]
    fn context_reports_cancelled_error() {
        let handle = CancellationHandle::new();
        handle.trip();
        let ctx = OperationContext::new(&DecoderOptions::default(), handle, 10);
        assert!(matches!(ctx.check_cancelled(), Err(DecodeError::Cancelled)));
    }
}
