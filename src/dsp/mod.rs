pub mod analysis;
pub mod baseline;
pub mod extractor;
pub mod history;
pub mod release;
pub mod segmenter;
pub mod utils;

pub use analysis::MagnitudeAnalyzer;
pub use baseline::BaselineEstimator;
pub use extractor::{EngineState, FrameReport, TransientExtractor};
pub use history::HistoryStore;
pub use release::ReleaseShaper;
pub use segmenter::{RunEndPolicy, TransientSegmenter};
