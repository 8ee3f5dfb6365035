//! # Audio Source Boundary
//!
//! The detector does not capture audio itself. Anything that can deliver
//! mono `f32` chunks at a fixed sample rate implements [`AudioSource`]:
//! a microphone backend, a file reader, or a test double.

use thiserror::Error;

/// Receives each captured chunk on the source's delivery thread.
pub type ChunkCallback = Box<dyn FnMut(&[f32]) + Send + 'static>;
/// Receives failures reported by a running source.
pub type ErrorCallback = Box<dyn FnMut(SourceError) + Send + 'static>;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SourceError {
    /// Access to the input device was refused. Not retried; the caller
    /// must start again once access has been granted.
    #[error("microphone access was denied")]
    PermissionDenied,
    /// The device or stream could not be configured or started.
    #[error("audio source failed to start: {0}")]
    SourceInitializationFailure(String),
    /// A running stream failed (e.g. the device was disconnected).
    #[error("audio stream failed: {0}")]
    StreamFailure(String),
}

/// A push-style provider of mono PCM chunks.
pub trait AudioSource {
    /// Starts delivering chunks at `sample_rate` to `on_chunk`.
    ///
    /// Must fail rather than deliver audio at a different rate.
    fn start(
        &mut self,
        sample_rate: u32,
        on_chunk: ChunkCallback,
        on_error: ErrorCallback,
    ) -> Result<(), SourceError>;

    /// Stops delivery and drops both callbacks. Calling it while stopped
    /// is a no-op.
    fn stop(&mut self);
}
