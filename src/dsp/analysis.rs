//! Host-side magnitude analysis.
//!
//! Turns a sample stream into the fixed-size magnitude frames the extractor
//! consumes: Hann window, forward FFT, `win_size / 2 + 1` magnitudes per hop.
//! Phase is discarded; there is no inverse path.

use crate::dsp::utils::make_hann_window;
use ringbuf::{Consumer, Producer, RingBuffer};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

// Minimum allowed window size.
const WIN_SIZE_MIN: usize = 16;
// Ring buffer capacity multiplier relative to window size.
const RINGBUF_CAP_MULT: usize = 2;

pub struct MagnitudeAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    win_size: usize,
    hop_size: usize,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    fft_scratch: Vec<Complex<f32>>,
    magnitudes: Vec<f32>,
    input_producer: Producer<f32>,
    input_consumer: Consumer<f32>,
}

impl MagnitudeAnalyzer {
    pub fn new(win_size: usize, hop_size: usize) -> Self {
        assert!(win_size >= WIN_SIZE_MIN, "win_size too small");
        assert!(hop_size > 0 && hop_size <= win_size, "invalid hop_size");

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(win_size);
        let scratch_len = fft.get_inplace_scratch_len();
        let (in_prod, in_cons) = RingBuffer::<f32>::new(win_size * RINGBUF_CAP_MULT).split();

        Self {
            fft,
            win_size,
            hop_size,
            window: make_hann_window(win_size),
            scratch: vec![Complex::new(0.0, 0.0); win_size],
            fft_scratch: vec![Complex::new(0.0, 0.0); scratch_len],
            magnitudes: vec![0.0; win_size / 2 + 1],
            input_producer: in_prod,
            input_consumer: in_cons,
        }
    }

    /// Bins per magnitude frame.
    pub fn num_bins(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Push one sample. Returns a fresh magnitude frame every `hop_size`
    /// samples once a full window has been buffered, `None` otherwise.
    pub fn push_sample(&mut self, x: f32) -> Option<&mut [f32]> {
        let _ = self.input_producer.push(x);
        if self.input_consumer.len() < self.win_size {
            return None;
        }

        for (i, val) in self
            .input_consumer
            .iter()
            .take(self.win_size)
            .enumerate()
        {
            self.scratch[i] = Complex::new(*val * self.window[i], 0.0);
        }
        self.fft
            .process_with_scratch(&mut self.scratch, &mut self.fft_scratch);

        for (mag, bin) in self.magnitudes.iter_mut().zip(self.scratch.iter()) {
            *mag = bin.norm();
        }
        self.input_consumer.discard(self.hop_size);

        Some(self.magnitudes.as_mut_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_cadence() {
        let mut analyzer = MagnitudeAnalyzer::new(64, 16);
        assert_eq!(analyzer.num_bins(), 33);
        let mut frames = 0;
        for i in 0..256 {
            if analyzer.push_sample((i as f32 * 0.1).sin()).is_some() {
                frames += 1;
            }
        }
        // First frame at sample 64, then one per hop
        assert_eq!(frames, 1 + (256 - 64) / 16);
    }

    #[test]
    fn test_dc_lands_in_bin_zero() {
        let mut analyzer = MagnitudeAnalyzer::new(64, 64);
        let mut last = Vec::new();
        for _ in 0..64 {
            if let Some(frame) = analyzer.push_sample(1.0) {
                last = frame.to_vec();
            }
        }
        assert_eq!(last.len(), 33);
        // Periodic Hann sums to N / 2
        assert!((last[0] - 32.0).abs() < 1e-3);
        assert!(last[2..].iter().all(|&m| m < 1e-3));
    }

    #[test]
    fn test_silence_gives_zero_magnitudes() {
        let mut analyzer = MagnitudeAnalyzer::new(32, 8);
        let mut seen = false;
        for _ in 0..64 {
            if let Some(frame) = analyzer.push_sample(0.0) {
                assert!(frame.iter().all(|&m| m == 0.0));
                seen = true;
            }
        }
        assert!(seen);
    }
}
