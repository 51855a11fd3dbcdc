//! History Store
//!
//! Two per-bin rings shared by the rest of the extractor:
//! - **Short-term**: the last `I` raw magnitude frames.
//! - **Average** ("little omega"): the last `J` means of the short-term ring.
//!
//! Both rings overwrite their oldest slot in place; nothing is shifted.
//! Storage is slot-major (`slot * num_bins + bin`) so one slot is one
//! contiguous slice.
//!
//! ## Audio Thread Safety
//! - Sized once in `new()`
//! - `record()` and `advance()` never allocate

use super::utils::ring_next;

pub struct HistoryStore {
    num_bins: usize,
    history_depth: usize,
    omega_depth: usize,
    short_term: Vec<f32>,
    averages: Vec<f32>,
    history_idx: usize,
    omega_idx: usize,
}

impl HistoryStore {
    pub fn new(history_depth: usize, omega_depth: usize, num_bins: usize) -> Self {
        assert!(history_depth > 0, "history depth must be > 0");
        assert!(omega_depth > 0, "omega depth must be > 0");
        Self {
            num_bins,
            history_depth,
            omega_depth,
            short_term: vec![0.0; history_depth * num_bins],
            averages: vec![0.0; omega_depth * num_bins],
            history_idx: 0,
            omega_idx: 0,
        }
    }

    /// Write `frame[cutoff..]` into the current short-term slot, then store the
    /// per-bin mean of all short-term slots into the current average slot.
    /// Bins below `cutoff` are left untouched in both rings.
    pub fn record(&mut self, frame: &[f32], cutoff: usize) {
        debug_assert_eq!(frame.len(), self.num_bins, "History frame size mismatch");
        let n = self.num_bins;
        let cutoff = cutoff.min(n);

        let row = self.history_idx * n;
        self.short_term[row + cutoff..row + n].copy_from_slice(&frame[cutoff..]);

        let depth = self.history_depth as f32;
        let out_row = self.omega_idx * n;
        for k in cutoff..n {
            let mut sum = 0.0f32;
            for slot in 0..self.history_depth {
                sum += self.short_term[slot * n + k];
            }
            self.averages[out_row + k] = sum / depth;
        }
    }

    /// Step both rings to their next slot. Called once per frame, after every
    /// stage has read the current indices.
    pub fn advance(&mut self) {
        self.history_idx = ring_next(self.history_idx, self.history_depth);
        self.omega_idx = ring_next(self.omega_idx, self.omega_depth);
    }

    #[inline]
    pub fn average(&self, slot: usize, bin: usize) -> f32 {
        self.averages[slot * self.num_bins + bin]
    }

    pub fn average_slot(&self, slot: usize) -> &[f32] {
        let row = slot * self.num_bins;
        &self.averages[row..row + self.num_bins]
    }

    pub fn short_term_slot(&self, slot: usize) -> &[f32] {
        let row = slot * self.num_bins;
        &self.short_term[row..row + self.num_bins]
    }

    pub fn history_index(&self) -> usize {
        self.history_idx
    }

    pub fn omega_index(&self) -> usize {
        self.omega_idx
    }

    pub fn omega_depth(&self) -> usize {
        self.omega_depth
    }

    pub fn num_bins(&self) -> usize {
        self.num_bins
    }

    pub fn reset(&mut self) {
        self.short_term.fill(0.0);
        self.averages.fill(0.0);
        self.history_idx = 0;
        self.omega_idx = 0;
    }
}
