//! # Audio Capture Module
//!
//! This module handles real-time audio capture using CPAL (Cross-Platform Audio Library)
//! and exposes it to the detector as an [`AudioSource`].
//!
//! ## Features
//! - Automatic default input device selection
//! - Prefers a mono 32-bit float configuration at the requested rate
//! - Down-mixes multi-channel input to mono inside the callback
//! - Maps backend failures onto [`SourceError`]

use chord_core::source::{AudioSource, ChunkCallback, ErrorCallback, SourceError};
use cpal::SupportedStreamConfigRange;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

/// Input from the default device of the default host.
#[derive(Default)]
pub struct CpalSource {
    stream: Option<cpal::Stream>,
}

impl CpalSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioSource for CpalSource {
    /// Starts audio capture from the default input device.
    ///
    /// This function:
    /// 1. Selects the default audio input device
    /// 2. Picks an f32 configuration whose range covers `sample_rate`
    /// 3. Builds a stream whose callback forwards mono chunks to `on_chunk`
    fn start(
        &mut self,
        sample_rate: u32,
        mut on_chunk: ChunkCallback,
        mut on_error: ErrorCallback,
    ) -> Result<(), SourceError> {
        self.stop();

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| SourceError::SourceInitializationFailure("no input device available".into()))?;

        match device.name() {
            Ok(name) => log::info!("Using audio input device: {}", name),
            Err(e) => log::warn!("Could not read input device name: {}", e),
        }

        let configs = device
            .supported_input_configs()
            .map_err(|e| classify(e.to_string()))?
            .collect::<Vec<_>>();
        let supported_config = find_supported_config(configs, sample_rate).ok_or_else(|| {
            SourceError::SourceInitializationFailure(format!(
                "no f32 input format supports {} Hz",
                sample_rate
            ))
        })?;

        let channels = supported_config.channels() as usize;
        let config: cpal::StreamConfig = supported_config
            .with_sample_rate(cpal::SampleRate(sample_rate))
            .into();

        log::info!("Selected {} Hz, {} channel(s)", sample_rate, channels);

        // Reused across callbacks so down-mixing does not allocate once warm.
        let mut mono: Vec<f32> = Vec::new();

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if channels == 1 {
                        on_chunk(data);
                        return;
                    }
                    mono.clear();
                    mono.extend(
                        data.chunks_exact(channels)
                            .map(|frame| frame.iter().sum::<f32>() / channels as f32),
                    );
                    on_chunk(&mono);
                },
                move |err| on_error(SourceError::StreamFailure(err.to_string())),
                None,
            )
            .map_err(|e| classify(e.to_string()))?;

        stream.play().map_err(|e| classify(e.to_string()))?;

        self.stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            // Properly stop the stream before dropping it
            if let Err(e) = stream.pause() {
                log::warn!("Error pausing stream: {}", e);
            }
            drop(stream);
        }
    }
}

/// Maps a backend error message onto the error taxonomy.
///
/// Backends report access refusal as free-form text, so this is a
/// keyword match.
fn classify(message: String) -> SourceError {
    let lower = message.to_lowercase();
    if lower.contains("permission") || lower.contains("access denied") || lower.contains("not authorized") {
        SourceError::PermissionDenied
    } else {
        SourceError::SourceInitializationFailure(message)
    }
}

/// Finds the best supported audio configuration for the target sample rate.
///
/// Only 32-bit float configurations whose rate range contains `target_rate`
/// qualify. Among those, fewer channels win, so a mono configuration is
/// picked whenever the device offers one.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.sample_format() == cpal::SampleFormat::F32 && c.channels() > 0)
        .filter(|c| c.min_sample_rate().0 <= target_rate && target_rate <= c.max_sample_rate().0)
        .min_by_key(|c| c.channels())
}
