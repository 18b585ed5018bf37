// src/drivers/mod.rs
pub mod averager;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod fft;
pub mod pipeline;
pub mod plot;
pub mod source;
pub use config::AnalysisConfig;
pub use error::TraceError;
pub use fft::{NoiseAnalysis, Spectrum};
pub use pipeline::{ArtifactNames, NoisePipeline};
pub use plot::PlotStyle;
pub use source::{Channel, Trace};
