//! # Analysis Pipeline
//!
//! Runs the full chain for every frame produced from incoming audio:
//!
//! raw samples -> frame buffer -> (noise gate, spectrum) -> chroma ->
//! pitch-class tracker -> chord identifier -> stabilizer -> throttled emit
//!
//! The chain always runs so smoothing and hysteresis advance at frame rate;
//! only the hand-off to consumers is throttled.

use std::time::{Duration, Instant};

use crate::channel::LatestSender;
use crate::config::PipelineConfig;
use crate::fft::SpectralAnalyzer;
use crate::frame_buffer::FrameBuffer;
use crate::noise_gate::NoiseGate;
use crate::stabilizer::Stabilizer;
use crate::tracker::PitchClassTracker;
use crate::{DetectionResult, chord, chroma};

/// All mutable per-session analysis state.
///
/// Created at session start and dropped on stop, so every session begins
/// from silence.
#[derive(Debug, Clone)]
pub struct PipelineState {
    pub frames: FrameBuffer,
    pub noise_gate: NoiseGate,
    pub tracker: PitchClassTracker,
    pub stabilizer: Stabilizer,
    pub last_emit: Option<Instant>,
}

impl PipelineState {
    pub fn new(config: &PipelineConfig, now: Instant) -> Self {
        Self {
            frames: FrameBuffer::new(config.frame_size, config.hop_size),
            noise_gate: NoiseGate::new(),
            tracker: PitchClassTracker::new(),
            stabilizer: Stabilizer::new(now),
            last_emit: None,
        }
    }
}

/// Per-frame analysis engine for one session.
pub struct Pipeline {
    sample_rate: u32,
    frame_size: usize,
    emit_interval: Duration,
    analyzer: SpectralAnalyzer,
    state: PipelineState,
    latest: Option<DetectionResult>,
    sink: LatestSender<DetectionResult>,
}

impl Pipeline {
    /// Builds a pipeline that publishes emitted results to `sink`.
    ///
    /// The configuration is expected to be validated.
    pub fn new(config: &PipelineConfig, sink: LatestSender<DetectionResult>) -> Self {
        Self::new_at(config, sink, Instant::now())
    }

    pub fn new_at(config: &PipelineConfig, sink: LatestSender<DetectionResult>, now: Instant) -> Self {
        Self {
            sample_rate: config.sample_rate,
            frame_size: config.frame_size,
            emit_interval: config.emit_interval(),
            analyzer: SpectralAnalyzer::new(config.frame_size),
            state: PipelineState::new(config, now),
            latest: None,
            sink,
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// The most recent stabilized result, emitted or not.
    pub fn latest(&self) -> Option<&DetectionResult> {
        self.latest.as_ref()
    }

    /// Feeds a chunk of mono samples, timestamped now.
    pub fn push(&mut self, samples: &[f32]) -> usize {
        self.push_at(samples, Instant::now())
    }

    /// Feeds a chunk of mono samples observed at `now`.
    ///
    /// Returns the number of frames analysed.
    pub fn push_at(&mut self, samples: &[f32], now: Instant) -> usize {
        let Self {
            sample_rate,
            frame_size,
            emit_interval,
            analyzer,
            state,
            latest,
            sink,
        } = self;
        let PipelineState {
            frames,
            noise_gate,
            tracker,
            stabilizer,
            last_emit,
        } = state;

        frames.push(samples, |frame| {
            let has_signal = noise_gate.evaluate(frame);
            let magnitudes = analyzer.analyze(frame);
            let chroma = chroma::extract(magnitudes, *sample_rate, *frame_size);
            let active = tracker.update(&chroma, has_signal);
            let raw = chord::identify(&active);
            log::trace!(
                "frame: signal={} active={} raw={} ({:.2})",
                has_signal,
                active,
                raw.chord_name,
                raw.confidence
            );
            let stable = stabilizer.update(raw, now);

            let due = last_emit.is_none_or(|at| now.saturating_duration_since(at) > *emit_interval);
            if due {
                *last_emit = Some(now);
                sink.publish(stable.clone());
            }
            *latest = Some(stable);
        })
    }

    /// Returns every piece of session state to its start-of-session value.
    pub fn reset(&mut self, config: &PipelineConfig, now: Instant) {
        self.state = PipelineState::new(config, now);
        self.latest = None;
    }
}
