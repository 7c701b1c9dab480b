pub mod aligner;
pub mod currency;
pub mod features;
pub mod loader;
pub mod normalizer;
pub mod pipeline;
pub mod store;

pub use features::{build_features, discover_sources, FeatureStats};
pub use pipeline::{CleaningPipeline, PipelineContext};
