pub mod cancel;
pub mod collector;
pub mod config;
pub mod discovery;
pub mod error;
pub mod pipeline;
pub mod plugin;
pub mod project;
pub mod scoring;
pub mod types;

pub use cancel::CancellationToken;
pub use config::Config;
pub use error::AnalysisError;
pub use pipeline::AnalysisPipeline;
pub use plugin::{MarkerRule, TechnologyPlugin};
pub use types::*;
