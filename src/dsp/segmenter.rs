//! Transient Segmenter
//!
//! Scans bins upward from the low cut and flags contiguous runs whose
//! magnitude exceeds `threshold * baseline`. A run is only flagged once it
//! closes (a bin at or below the threshold) and only if it spans at least
//! `min_run_length` bins. Flags are rebuilt from scratch every frame.
//!
//! A run that is still open at the top bin is dropped under
//! [`RunEndPolicy::DropOpenRun`]; [`RunEndPolicy::FlushAtEnd`] treats the end of
//! the range as a closing bin instead.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunEndPolicy {
    /// Open run at the top bin is not flagged.
    #[default]
    DropOpenRun,
    /// Top of the bin range closes the open run.
    FlushAtEnd,
}

pub struct TransientSegmenter {
    flags: Vec<bool>,
    flagged: usize,
}

impl TransientSegmenter {
    pub fn new(num_bins: usize) -> Self {
        Self {
            flags: vec![false; num_bins],
            flagged: 0,
        }
    }

    /// Rebuild the flags for one frame. Returns the number of flagged bins.
    ///
    /// `min_run_length == 0` degenerates to per-bin thresholding: each bin
    /// above threshold is flagged as soon as it is scanned.
    pub fn segment(
        &mut self,
        magnitudes: &[f32],
        floor: &[f32],
        cutoff: usize,
        threshold: f32,
        min_run_length: usize,
        policy: RunEndPolicy,
    ) -> usize {
        let n = self.flags.len();
        debug_assert_eq!(magnitudes.len(), n, "Segmenter frame size mismatch");
        debug_assert_eq!(floor.len(), n, "Segmenter floor size mismatch");

        self.flags.fill(false);
        self.flagged = 0;

        let mut run_len = 0usize;
        for k in cutoff.min(n)..n {
            if magnitudes[k] > threshold * floor[k] {
                run_len += 1;
                if min_run_length == 0 {
                    self.flags[k] = true;
                    self.flagged += 1;
                }
            } else {
                if min_run_length > 0 && run_len >= min_run_length {
                    self.mark(k - run_len, k);
                }
                run_len = 0;
            }
        }

        if policy == RunEndPolicy::FlushAtEnd && min_run_length > 0 && run_len >= min_run_length {
            self.mark(n - run_len, n);
        }

        self.flagged
    }

    fn mark(&mut self, start: usize, end: usize) {
        for flag in &mut self.flags[start..end] {
            *flag = true;
        }
        self.flagged += end - start;
    }

    #[inline]
    pub fn is_transient(&self, bin: usize) -> bool {
        self.flags[bin]
    }

    pub fn flags(&self) -> &[bool] {
        &self.flags
    }

    pub fn flagged(&self) -> usize {
        self.flagged
    }

    pub fn reset(&mut self) {
        self.flags.fill(false);
        self.flagged = 0;
    }
}
