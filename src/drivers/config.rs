use std::path::Path;
use serde::Deserialize;
use crate::drivers::TraceError;
/// Tunables for one analysis run. Every field falls back to its default when
/// missing from a config file.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Leading samples ignored by the peak-to-peak statistic (startup transient).
    pub transient_skip: usize,
    /// Lowest retained spectrum bins dropped as switching/base ripple.
    pub low_bin_trim: usize,
    /// Samples folded into one mean by the block averager.
    pub block_size: usize,
    /// Leading averaged samples dropped before the time-domain overlay.
    pub averaged_skip: usize,
    pub dpi: u32,
    pub figure_width_in: f64,
    pub figure_height_in: f64,
    /// `None` sizes the worker pool to the host's available parallelism.
    pub worker_threads: Option<usize>,
    /// Relative deviation of the time step above which the trace is reported as non-uniform.
    pub uniform_step_tolerance: f64,
}
impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            transient_skip: 1000,
            low_bin_trim: 35,
            block_size: 10,
            averaged_skip: 1000,
            // Matches matplotlib's default 6.4 x 4.8 inch figure saved at 1200 DPI.
            dpi: 1200,
            figure_width_in: 6.4,
            figure_height_in: 4.8,
            worker_threads: None,
            uniform_step_tolerance: 1e-6,
        }
    }
}
impl AnalysisConfig {
    pub fn from_json_str(text: &str) -> Result<Self, TraceError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
    pub fn from_json_file(path: &Path) -> Result<Self, TraceError> {
        let text = std::fs::read_to_string(path).map_err(|source| TraceError::FileLoad {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }
    pub fn validate(&self) -> Result<(), TraceError> {
        if self.block_size == 0 {
            return Err(TraceError::InvalidArgument(
                "block size must be at least 1".into(),
            ));
        }
        if self.dpi == 0 {
            return Err(TraceError::InvalidArgument("dpi must be at least 1".into()));
        }
        if !(self.figure_width_in > 0.0 && self.figure_height_in > 0.0) {
            return Err(TraceError::InvalidArgument(
                "figure dimensions must be positive".into(),
            ));
        }
        if self.worker_threads == Some(0) {
            return Err(TraceError::InvalidArgument(
                "worker thread count must be at least 1".into(),
            ));
        }
        Ok(())
    }
    /// Shortest channel the spectral analyzer accepts.
    pub fn minimum_samples(&self) -> usize {
        (self.transient_skip + self.low_bin_trim + 1).max(2 * (self.low_bin_trim + 2) + 1)
    }
    /// Figure size in pixels at the configured DPI.
    pub fn figure_pixels(&self) -> (u32, u32) {
        let dpi = self.dpi as f64;
        (
            (self.figure_width_in * dpi).round().max(1.0) as u32,
            (self.figure_height_in * dpi).round().max(1.0) as u32,
        )
    }
}
