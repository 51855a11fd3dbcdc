//! Extractor configuration.
//!
//! Immutable once handed to [`TransientExtractor`](crate::TransientExtractor).
//! The only value the engine may override is the low cut bin, and only when it
//! turns out to exceed the bin count of the first frame.

use crate::dsp::segmenter::RunEndPolicy;
use crate::error::TransientError;
use serde::{Deserialize, Serialize};

// Defaults tuned for 1024-point frames of percussive material.
const DEFAULT_HISTORY_DEPTH: usize = 3;
const DEFAULT_OMEGA_DEPTH: usize = 8;
const DEFAULT_MIN_RUN_LENGTH: usize = 3;
const DEFAULT_THRESHOLD: f32 = 2.0;
const DEFAULT_RELEASE_DECAY: f32 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Frames averaged into each short-term mean (I).
    pub history_depth: usize,
    /// Short-term means searched for the baseline minimum (J).
    pub omega_depth: usize,
    /// Consecutive above-threshold bins required to flag a run (D).
    pub min_run_length: usize,
    /// Multiplier applied to the baseline before comparison (alpha).
    pub threshold: f32,
    /// Per-frame decay of the release envelope (beta).
    pub release_decay: f32,
    /// Bins below this index are never analysed.
    pub low_freq_cut_bin: usize,
    /// `true` keeps transients, `false` keeps the steady-state residual.
    pub extract: bool,
    pub run_end_policy: RunEndPolicy,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            history_depth: DEFAULT_HISTORY_DEPTH,
            omega_depth: DEFAULT_OMEGA_DEPTH,
            min_run_length: DEFAULT_MIN_RUN_LENGTH,
            threshold: DEFAULT_THRESHOLD,
            release_decay: DEFAULT_RELEASE_DECAY,
            low_freq_cut_bin: 0,
            extract: true,
            run_end_policy: RunEndPolicy::DropOpenRun,
        }
    }
}

impl ExtractorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history_depth(mut self, depth: usize) -> Self {
        self.history_depth = depth;
        self
    }

    pub fn with_omega_depth(mut self, depth: usize) -> Self {
        self.omega_depth = depth;
        self
    }

    pub fn with_min_run_length(mut self, len: usize) -> Self {
        self.min_run_length = len;
        self
    }

    pub fn with_threshold(mut self, alpha: f32) -> Self {
        self.threshold = alpha;
        self
    }

    pub fn with_release_decay(mut self, beta: f32) -> Self {
        self.release_decay = beta;
        self
    }

    pub fn with_low_freq_cut_bin(mut self, bin: usize) -> Self {
        self.low_freq_cut_bin = bin;
        self
    }

    pub fn with_extract(mut self, extract: bool) -> Self {
        self.extract = extract;
        self
    }

    pub fn with_run_end_policy(mut self, policy: RunEndPolicy) -> Self {
        self.run_end_policy = policy;
        self
    }

    /// Parse a (possibly partial) JSON document; missing fields take defaults.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), TransientError> {
        if self.history_depth == 0 {
            return Err(TransientError::InvalidConfig {
                field: "history_depth",
                reason: "must be at least 1",
            });
        }
        if self.omega_depth == 0 {
            return Err(TransientError::InvalidConfig {
                field: "omega_depth",
                reason: "must be at least 1",
            });
        }
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(TransientError::InvalidConfig {
                field: "threshold",
                reason: "must be finite and > 0",
            });
        }
        if !(self.release_decay > 0.0 && self.release_decay <= 1.0) {
            return Err(TransientError::InvalidConfig {
                field: "release_decay",
                reason: "must lie in (0, 1]",
            });
        }
        Ok(())
    }

    /// A single short-term slot leaves the baseline nothing to compare against,
    /// so no bin is ever flagged.
    pub fn is_degenerate(&self) -> bool {
        self.omega_depth < 2
    }
}
