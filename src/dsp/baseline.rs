//! Baseline Estimator ("big omega")
//!
//! Per-bin floor: the minimum of the short-term averages in every slot except
//! the one written this frame. The current frame's own mean must not lower the
//! floor it is about to be tested against.
//!
//! With a single average slot there is nothing to compare against; the floor
//! is `+inf` and no bin can exceed it.

use super::history::HistoryStore;

/// Floor reported when no historical slot is available.
pub const DEGENERATE_BASELINE: f32 = f32::INFINITY;

pub struct BaselineEstimator {
    floor: Vec<f32>,
}

impl BaselineEstimator {
    pub fn new(num_bins: usize) -> Self {
        Self {
            floor: vec![0.0; num_bins],
        }
    }

    /// Minimum over all average slots except `history.omega_index()`.
    #[inline]
    pub fn baseline(history: &HistoryStore, bin: usize) -> f32 {
        let current = history.omega_index();
        let mut floor = DEGENERATE_BASELINE;
        for slot in 0..history.omega_depth() {
            if slot == current {
                continue;
            }
            let v = history.average(slot, bin);
            if v < floor {
                floor = v;
            }
        }
        floor
    }

    /// Recompute the scratch floor for `cutoff..num_bins`. Bins below the cutoff keep 0.
    pub fn update(&mut self, history: &HistoryStore, cutoff: usize) {
        for k in cutoff.min(self.floor.len())..self.floor.len() {
            self.floor[k] = Self::baseline(history, k);
        }
    }

    pub fn floor(&self) -> &[f32] {
        &self.floor
    }

    pub fn reset(&mut self) {
        self.floor.fill(0.0);
    }
}
