//! # Fast Fourier Transform (FFT) Module
//!
//! This module turns one analysis frame into a magnitude spectrum.
//! The Hann window, the real-input FFT plan and every working buffer are
//! allocated once per session, so analysing a frame does not allocate.
//!
//! ## Features
//! - Real-to-complex FFT using RealFFT (built on RustFFT)
//! - Hann windowing for reduced spectral leakage
//! - Magnitudes for the first `frame_size / 2` bins

use std::sync::Arc;

use realfft::{RealFftPlanner, RealToComplex};
use rustfft::num_complex::Complex;

/// Computes the symmetric Hann window coefficients for `len` samples.
///
/// The Hann window tapers the frame to zero at the edges, which keeps the
/// energy of a partial concentrated in a few neighbouring bins.
pub fn hann_window(len: usize) -> Vec<f32> {
    if len < 2 {
        return vec![1.0; len];
    }
    let n_minus_1 = (len - 1) as f32;
    (0..len)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / n_minus_1).cos()))
        .collect()
}

/// Windowed real FFT with cached plan and buffers.
pub struct SpectralAnalyzer {
    frame_size: usize,
    window: Vec<f32>,
    fft: Arc<dyn RealToComplex<f32>>,
    input: Vec<f32>,
    spectrum: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    magnitudes: Vec<f32>,
}

impl SpectralAnalyzer {
    pub fn new(frame_size: usize) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(frame_size);
        let input = fft.make_input_vec();
        let spectrum = fft.make_output_vec();
        let scratch = fft.make_scratch_vec();

        Self {
            frame_size,
            window: hann_window(frame_size),
            fft,
            input,
            spectrum,
            scratch,
            magnitudes: vec![0.0; frame_size / 2],
        }
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Windows `frame` and returns its magnitude spectrum.
    ///
    /// The returned slice has `frame_size / 2` bins; bin `b` is centred on
    /// `b * sample_rate / frame_size` Hz. A short frame is zero-padded.
    pub fn analyze(&mut self, frame: &[f32]) -> &[f32] {
        debug_assert_eq!(frame.len(), self.frame_size);

        for (i, slot) in self.input.iter_mut().enumerate() {
            let sample = frame.get(i).copied().unwrap_or(0.0);
            *slot = sample * self.window[i];
        }

        // The input buffer is used as scratch space by the transform.
        if let Err(e) =
            self.fft
                .process_with_scratch(&mut self.input, &mut self.spectrum, &mut self.scratch)
        {
            log::warn!("FFT failed, reporting an empty spectrum: {}", e);
            self.magnitudes.fill(0.0);
            return &self.magnitudes;
        }

        for (magnitude, bin) in self.magnitudes.iter_mut().zip(self.spectrum.iter()) {
            *magnitude = bin.norm(); // .norm() is sqrt(re^2 + im^2)
        }
        &self.magnitudes
    }
}
