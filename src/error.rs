//! Error taxonomy for the transient extractor.
//!
//! Every error here is local to one call. None of them poisons the engine:
//! after an `Err` the next frame of the captured size is processed normally.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransientError {
    /// Rejected at construction time.
    #[error("invalid configuration: {field} {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },

    /// The frame does not match the bin count captured from the first frame.
    /// The frame is left untouched and no state advances.
    #[error("frame size mismatch: engine holds {expected} bins, frame has {actual}")]
    FrameSizeMismatch { expected: usize, actual: usize },
}

/// Reported (not raised) when the configured low cut exceeds the captured bin count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutoffCorrection {
    pub requested: usize,
    pub num_bins: usize,
}
