//! Streaming spectral transient extraction.
//!
//! [`TransientExtractor`] classifies each bin of a magnitude spectrum as
//! transient or steady against a running per-bin baseline, then rescales the
//! frame in place to keep either the transient part or the steady residual.
//! One call per analysis frame, no allocation after the first frame.

pub mod config;
pub mod debug;
pub mod dsp;
pub mod error;
pub mod presets;

pub use config::ExtractorConfig;
pub use debug::{TraceDrain, TraceEvent};
pub use dsp::{EngineState, FrameReport, MagnitudeAnalyzer, RunEndPolicy, TransientExtractor};
pub use error::{CutoffCorrection, TransientError};
pub use presets::PresetManager;
