//! Streaming Spectral Transient Extractor
//!
//! Consumes one magnitude spectrum per analysis frame and rewrites it in place,
//! keeping either the transient energy (extract mode) or the steady-state
//! residual. Phase is never seen here; the host carries it unchanged.
//!
//! # Per-frame pipeline
//! 1. **History**: push the frame into the short-term ring, store its mean.
//! 2. **Baseline**: per-bin minimum of the older means.
//! 3. **Segmenter**: flag runs of bins above `threshold * baseline`.
//! 4. **Release**: update the per-bin envelope and apply the gain.
//! 5. Advance both ring indices.
//!
//! # Lifecycle
//! - **Uninitialized**: no bin count known, no buffers allocated.
//! - **Ready**: bin count captured from the first frame, every buffer sized once.
//!   Later frames of another size are rejected without touching state.
//!
//! ## Audio Thread Safety
//! - The first frame allocates (transition to Ready)
//! - Every later frame runs inside `assert_no_alloc` in debug builds
//! - Diagnostics raised per frame go to the engine's own trace queue; the
//!   host formats them when it drains (see [`crate::debug`])

use super::baseline::BaselineEstimator;
use super::history::HistoryStore;
use super::release::ReleaseShaper;
use super::segmenter::TransientSegmenter;
use crate::config::ExtractorConfig;
use crate::debug::{trace_channel, TraceDrain, TraceEvent, TraceSink, TRACE_CAPACITY};
use crate::error::{CutoffCorrection, TransientError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Ready,
}

/// Outcome of one processed frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    /// Bins flagged transient this frame.
    pub transient_bins: usize,
    /// Set on the frame where an out-of-range low cut was replaced by 0.
    pub cutoff_corrected: Option<CutoffCorrection>,
}

struct ReadyState {
    num_bins: usize,
    cutoff: usize,
    history: HistoryStore,
    baseline: BaselineEstimator,
    segmenter: TransientSegmenter,
    shaper: ReleaseShaper,
}

impl ReadyState {
    fn new(cfg: &ExtractorConfig, num_bins: usize, cutoff: usize) -> Self {
        Self {
            num_bins,
            cutoff,
            history: HistoryStore::new(cfg.history_depth, cfg.omega_depth, num_bins),
            baseline: BaselineEstimator::new(num_bins),
            segmenter: TransientSegmenter::new(num_bins),
            shaper: ReleaseShaper::new(num_bins),
        }
    }

    fn run(&mut self, frame: &mut [f32], cfg: &ExtractorConfig) -> usize {
        self.history.record(frame, self.cutoff);
        self.baseline.update(&self.history, self.cutoff);
        let flagged = self.segmenter.segment(
            frame,
            self.baseline.floor(),
            self.cutoff,
            cfg.threshold,
            cfg.min_run_length,
            cfg.run_end_policy,
        );
        self.shaper.apply(
            frame,
            &self.segmenter,
            &self.history,
            self.cutoff,
            cfg.release_decay,
            cfg.extract,
        );
        self.history.advance();
        flagged
    }

    fn reset(&mut self) {
        self.history.reset();
        self.baseline.reset();
        self.segmenter.reset();
        self.shaper.reset();
    }
}

enum Stage {
    Uninitialized,
    Ready(ReadyState),
}

pub struct TransientExtractor {
    config: ExtractorConfig,
    stage: Stage,
    frames_processed: u64,
    trace: TraceSink,
    trace_drain: Option<TraceDrain>,
}

impl TransientExtractor {
    pub fn new(config: ExtractorConfig) -> Result<Self, TransientError> {
        config.validate()?;
        if config.is_degenerate() {
            log::warn!(
                "omega depth {} leaves no historical slot; transient detection is disabled",
                config.omega_depth
            );
        }
        let (trace, trace_drain) = trace_channel(TRACE_CAPACITY);
        Ok(Self {
            config,
            stage: Stage::Uninitialized,
            frames_processed: 0,
            trace,
            trace_drain: Some(trace_drain),
        })
    }

    /// Process one magnitude frame in place.
    ///
    /// The first call fixes the bin count. A later frame of a different length
    /// returns [`TransientError::FrameSizeMismatch`] and is left untouched.
    pub fn process_frame(&mut self, frame: &mut [f32]) -> Result<FrameReport, TransientError> {
        let mut cutoff_corrected = None;
        if matches!(self.stage, Stage::Uninitialized) {
            cutoff_corrected = self.initialize(frame.len());
        }

        let Stage::Ready(ready) = &mut self.stage else {
            return Ok(FrameReport::default());
        };

        if frame.len() != ready.num_bins {
            self.trace.push(TraceEvent::FrameSizeMismatch {
                expected: ready.num_bins,
                actual: frame.len(),
            });
            return Err(TransientError::FrameSizeMismatch {
                expected: ready.num_bins,
                actual: frame.len(),
            });
        }

        let cfg = &self.config;
        #[cfg(debug_assertions)]
        let transient_bins = assert_no_alloc::assert_no_alloc(|| ready.run(frame, cfg));
        #[cfg(not(debug_assertions))]
        let transient_bins = ready.run(frame, cfg);

        self.frames_processed += 1;
        #[cfg(feature = "debug")]
        self.trace.push(TraceEvent::Frame {
            index: self.frames_processed,
            transient_bins,
        });

        Ok(FrameReport {
            transient_bins,
            cutoff_corrected,
        })
    }

    /// Process a frame if the upstream analysis produced one; `None` is a no-op.
    pub fn process_chain(
        &mut self,
        frame: Option<&mut [f32]>,
    ) -> Result<Option<FrameReport>, TransientError> {
        match frame {
            Some(frame) => self.process_frame(frame).map(Some),
            None => Ok(None),
        }
    }

    fn initialize(&mut self, num_bins: usize) -> Option<CutoffCorrection> {
        let mut cutoff = self.config.low_freq_cut_bin;
        let mut correction = None;
        if cutoff > num_bins {
            log::warn!(
                "low cut bin {} exceeds bin count {}; low cut set to 0",
                cutoff,
                num_bins
            );
            correction = Some(CutoffCorrection {
                requested: cutoff,
                num_bins,
            });
            cutoff = 0;
        }

        log::debug!(
            "transient extractor ready: bins={} I={} J={} D={} alpha={} beta={} cut={} extract={} policy={:?}",
            num_bins,
            self.config.history_depth,
            self.config.omega_depth,
            self.config.min_run_length,
            self.config.threshold,
            self.config.release_decay,
            cutoff,
            self.config.extract,
            self.config.run_end_policy,
        );

        self.stage = Stage::Ready(ReadyState::new(&self.config, num_bins, cutoff));
        correction
    }

    /// Return every buffer to its initial value. The captured bin count is kept
    /// and nothing is reallocated.
    pub fn reset(&mut self) {
        if let Stage::Ready(ready) = &mut self.stage {
            ready.reset();
        }
        self.frames_processed = 0;
    }

    /// Hand the consumer half of this engine's trace queue to the host.
    /// Returns `None` after the first call.
    pub fn take_trace(&mut self) -> Option<TraceDrain> {
        self.trace_drain.take()
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn state(&self) -> EngineState {
        match self.stage {
            Stage::Uninitialized => EngineState::Uninitialized,
            Stage::Ready(_) => EngineState::Ready,
        }
    }

    pub fn num_bins(&self) -> Option<usize> {
        match &self.stage {
            Stage::Ready(ready) => Some(ready.num_bins),
            Stage::Uninitialized => None,
        }
    }

    /// Effective low cut: the configured value until the first frame, then the
    /// (possibly corrected) value in use.
    pub fn cutoff(&self) -> usize {
        match &self.stage {
            Stage::Ready(ready) => ready.cutoff,
            Stage::Uninitialized => self.config.low_freq_cut_bin,
        }
    }

    pub fn history_index(&self) -> usize {
        match &self.stage {
            Stage::Ready(ready) => ready.history.history_index(),
            Stage::Uninitialized => 0,
        }
    }

    pub fn omega_index(&self) -> usize {
        match &self.stage {
            Stage::Ready(ready) => ready.history.omega_index(),
            Stage::Uninitialized => 0,
        }
    }

    /// Flags from the most recent frame.
    pub fn transient_flags(&self) -> &[bool] {
        match &self.stage {
            Stage::Ready(ready) => ready.segmenter.flags(),
            Stage::Uninitialized => &[],
        }
    }

    pub fn release_envelope(&self) -> &[f32] {
        match &self.stage {
            Stage::Ready(ready) => ready.shaper.envelope(),
            Stage::Uninitialized => &[],
        }
    }

    /// Baseline used by the most recent frame.
    pub fn baseline(&self) -> &[f32] {
        match &self.stage {
            Stage::Ready(ready) => ready.baseline.floor(),
            Stage::Uninitialized => &[],
        }
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }
}
