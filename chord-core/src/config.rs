//! # Pipeline Configuration
//!
//! Session-level parameters for the analysis pipeline. Every field has a
//! default, so a partially specified configuration file is valid. The
//! analysis thresholds themselves are fixed constants in their modules.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Nominal input sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
/// Analysis frame size in samples (~93ms at 44.1kHz).
pub const DEFAULT_FRAME_SIZE: usize = 4096;
/// Samples to advance between frames (50% overlap).
pub const DEFAULT_HOP_SIZE: usize = 2048;
/// Minimum spacing between two emitted results.
pub const DEFAULT_EMIT_INTERVAL_MS: u64 = 120;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("sample rate must be greater than zero")]
    ZeroSampleRate,
    #[error("frame size must be an even number of at least 2 samples, got {0}")]
    InvalidFrameSize(usize),
    #[error("hop size must be between 1 and the frame size ({frame_size}), got {hop_size}")]
    InvalidHopSize { hop_size: usize, frame_size: usize },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub sample_rate: u32,
    pub frame_size: usize,
    pub hop_size: usize,
    pub emit_interval_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            frame_size: DEFAULT_FRAME_SIZE,
            hop_size: DEFAULT_HOP_SIZE,
            emit_interval_ms: DEFAULT_EMIT_INTERVAL_MS,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        if self.frame_size < 2 || self.frame_size % 2 != 0 {
            return Err(ConfigError::InvalidFrameSize(self.frame_size));
        }
        if self.hop_size == 0 || self.hop_size > self.frame_size {
            return Err(ConfigError::InvalidHopSize {
                hop_size: self.hop_size,
                frame_size: self.frame_size,
            });
        }
        Ok(())
    }

    pub fn emit_interval(&self) -> Duration {
        Duration::from_millis(self.emit_interval_ms)
    }
}
