use std::path::{Path, PathBuf};
use log::{info, warn};
use crate::drivers::averager::{block_average, skip_settling};
use crate::drivers::dispatch::{job, Job, WorkerPool};
use crate::drivers::error::TraceError;
use crate::drivers::fft::{NoiseAnalysis, SpectralAnalyzer};
use crate::drivers::plot::{render_panels_png, render_spectrum_png, Panel, PlotStyle};
use crate::drivers::source::{Channel, Trace};
use crate::drivers::AnalysisConfig;
/// Channels that get a noise report, in report order.
pub const NOISE_CHANNELS: [Channel; 2] = [Channel::VIn, Channel::VOut];
/// Submission order of the averaging round.
pub const AVERAGED_CHANNELS: [Channel; 5] = [
    Channel::VIn,
    Channel::VOut,
    Channel::I1,
    Channel::IBat,
    Channel::Time,
];
/// Block-averaged copy of every trace channel.
#[derive(Clone, Debug)]
pub struct AveragedTrace {
    channels: Vec<(Channel, Vec<f64>)>,
}
impl AveragedTrace {
    pub fn channel(&self, channel: Channel) -> &[f64] {
        self.channels
            .iter()
            .find(|(c, _)| *c == channel)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }
    pub fn len(&self) -> usize {
        self.channel(Channel::Time).len()
    }
}
/// Runs both analysis rounds of a trace on a shared worker pool.
pub struct NoisePipeline {
    config: AnalysisConfig,
    pool: WorkerPool,
}
impl NoisePipeline {
    pub fn new(config: AnalysisConfig) -> Result<Self, TraceError> {
        config.validate()?;
        let pool = WorkerPool::new(config.worker_threads)?;
        Ok(Self { config, pool })
    }
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }
    pub fn worker_threads(&self) -> usize {
        self.pool.threads()
    }
    /// Round one: spectral analysis of the voltage channels.
    pub fn analyze_noise(&self, trace: &Trace) -> Result<Vec<(Channel, NoiseAnalysis)>, TraceError> {
        let sample_rate_hz = trace.sampling_rate()?;
        let irregularity = trace.step_irregularity();
        if irregularity > self.config.uniform_step_tolerance {
            warn!(
                "time step varies by up to {:.3}% of the first step; sample rate {sample_rate_hz:.3} Hz is approximate",
                irregularity * 100.0
            );
        }
        info!(
            "analysing {} channels at {sample_rate_hz:.3} Hz on {} workers",
            NOISE_CHANNELS.len(),
            self.pool.threads()
        );
        let analyzer = SpectralAnalyzer::new(&self.config);
        let analyzer = &analyzer;
        let jobs: Vec<(Channel, Job<'_, NoiseAnalysis>)> = NOISE_CHANNELS
            .iter()
            .map(|&channel| {
                let samples = trace.channel(channel);
                (channel, job(move || analyzer.analyze(samples, sample_rate_hz)))
            })
            .collect();
        self.pool.join_all(jobs)
    }
    /// Round two: block averaging of every channel.
    pub fn average_channels(&self, trace: &Trace) -> Result<AveragedTrace, TraceError> {
        let block_size = self.config.block_size;
        info!(
            "averaging {} channels in blocks of {block_size}",
            AVERAGED_CHANNELS.len()
        );
        let jobs: Vec<(Channel, Job<'_, Vec<f64>>)> = AVERAGED_CHANNELS
            .iter()
            .map(|&channel| {
                let samples = trace.channel(channel);
                (channel, job(move || block_average(samples, block_size)))
            })
            .collect();
        Ok(AveragedTrace {
            channels: self.pool.join_all(jobs)?,
        })
    }
    /// Renders one channel's spectrum, reconciling its sequences first.
    pub fn render_spectrum(
        &self,
        channel: Channel,
        analysis: &mut NoiseAnalysis,
        style: &PlotStyle,
    ) -> Result<Vec<u8>, TraceError> {
        if let Some(mismatch) = analysis.spectrum.reconcile() {
            warn!("{channel}: {mismatch}; truncated to {} bins", analysis.spectrum.len());
        }
        render_spectrum_png(&format!("{channel} Frequency Domain Data"), &analysis.spectrum, style)
    }
    /// Two-panel voltage/current overlay of the averaged trace, settling region removed.
    pub fn render_overlay(&self, averaged: &AveragedTrace, style: &PlotStyle) -> Result<Vec<u8>, TraceError> {
        let skip = self.config.averaged_skip;
        let settled = move |channel: Channel| skip_settling(averaged.channel(channel), skip);
        let time = settled(Channel::Time)?;
        let panels = [
            Panel {
                title: "V_in and V_out vs Time",
                y_label: "Voltage",
                series: vec![
                    (Channel::VIn.label(), settled(Channel::VIn)?),
                    (Channel::VOut.label(), settled(Channel::VOut)?),
                ],
            },
            Panel {
                title: "I_1 and I_Bat vs Time",
                y_label: "Current",
                series: vec![
                    (Channel::I1.label(), settled(Channel::I1)?),
                    (Channel::IBat.label(), settled(Channel::IBat)?),
                ],
            },
        ];
        render_panels_png(time, &panels, style)
    }
}
/// Output file names derived from the input trace path.
#[derive(Clone, Debug)]
pub struct ArtifactNames {
    output_dir: PathBuf,
    base: String,
}
impl ArtifactNames {
    pub fn new(input: &Path, output_dir: &Path) -> Result<Self, TraceError> {
        let base = input
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| {
                TraceError::InvalidArgument(format!(
                    "cannot derive an artifact name from {}",
                    input.display()
                ))
            })?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            base: base.to_string(),
        })
    }
    pub fn spectrum(&self, channel: Channel) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}_frequency_domain.png", self.base, channel.label()))
    }
    pub fn overlay(&self) -> PathBuf {
        self.output_dir.join(format!("{}_Plot.png", self.base))
    }
}
