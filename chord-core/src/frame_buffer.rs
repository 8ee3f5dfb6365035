//! # Frame Buffer
//!
//! Accumulates arbitrary-length sample chunks and yields fixed-size,
//! overlapping analysis frames.

/// Overlap-preserving accumulator.
///
/// After each frame is handed out, `hop_size` samples are dropped from the
/// front, leaving `frame_size - hop_size` samples as overlap for the next
/// frame.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    frame_size: usize,
    hop_size: usize,
    samples: Vec<f32>,
}

impl FrameBuffer {
    pub fn new(frame_size: usize, hop_size: usize) -> Self {
        debug_assert!(hop_size > 0 && hop_size <= frame_size);
        Self {
            frame_size,
            hop_size,
            samples: Vec::with_capacity(frame_size * 2),
        }
    }

    /// Appends a chunk and calls `on_frame` once per complete frame.
    ///
    /// Returns the number of frames produced.
    pub fn push(&mut self, chunk: &[f32], mut on_frame: impl FnMut(&[f32])) -> usize {
        self.samples.extend_from_slice(chunk);

        let mut frames = 0;
        while self.samples.len() >= self.frame_size {
            on_frame(&self.samples[..self.frame_size]);
            self.samples.drain(..self.hop_size);
            frames += 1;
        }
        frames
    }

    /// Number of samples waiting for the next frame.
    pub fn buffered(&self) -> usize {
        self.samples.len()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(start: usize, len: usize) -> Vec<f32> {
        (start..start + len).map(|i| i as f32).collect()
    }

    #[test]
    fn small_chunks_accumulate_until_a_frame_is_ready() {
        let mut buffer = FrameBuffer::new(8, 4);
        let mut frames = Vec::new();

        assert_eq!(buffer.push(&ramp(0, 3), |f| frames.push(f.to_vec())), 0);
        assert_eq!(buffer.push(&ramp(3, 3), |f| frames.push(f.to_vec())), 0);
        assert_eq!(buffer.push(&ramp(6, 3), |f| frames.push(f.to_vec())), 1);

        assert_eq!(frames, vec![ramp(0, 8)]);
        // 9 pushed, 4 dropped by the hop.
        assert_eq!(buffer.buffered(), 5);
    }

    #[test]
    fn large_chunk_yields_overlapping_frames() {
        let mut buffer = FrameBuffer::new(8, 4);
        let mut frames = Vec::new();

        let produced = buffer.push(&ramp(0, 20), |f| frames.push(f.to_vec()));

        assert_eq!(produced, 4);
        assert_eq!(frames[0], ramp(0, 8));
        assert_eq!(frames[1], ramp(4, 8));
        assert_eq!(frames[3], ramp(12, 8));
        assert_eq!(buffer.buffered(), 4);
    }

    #[test]
    fn clear_discards_overlap() {
        let mut buffer = FrameBuffer::new(8, 4);
        buffer.push(&ramp(0, 10), |_| {});
        buffer.clear();
        assert_eq!(buffer.buffered(), 0);
        assert_eq!(buffer.push(&ramp(0, 7), |_| {}), 0);
    }
}
