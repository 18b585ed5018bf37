// src/main.rs
mod drivers;
mod report;
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use drivers::{AnalysisConfig, ArtifactNames, NoisePipeline, PlotStyle, Trace};
/// Noise characterisation of a tab-separated simulator trace.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Trace export with columns time, V_in, V_out, I_1, I_Bat (first row is a header)
    #[arg(default_value = "./LTSpice/LTC3204-3.3_1.txt")]
    input: PathBuf,
    /// JSON file overriding the analysis defaults
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Directory the PNG artifacts are written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
    /// Samples per block for the time-domain overlay
    #[arg(long)]
    block_size: Option<usize>,
    /// Worker threads (defaults to the host's available parallelism)
    #[arg(long)]
    threads: Option<usize>,
    /// Resolution of the saved figures
    #[arg(long)]
    dpi: Option<u32>,
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}
impl Cli {
    fn load_config(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => AnalysisConfig::default(),
        };
        if let Some(block_size) = self.block_size {
            config.block_size = block_size;
        }
        if self.threads.is_some() {
            config.worker_threads = self.threads;
        }
        if let Some(dpi) = self.dpi {
            config.dpi = dpi;
        }
        config.validate().context("invalid analysis settings")?;
        Ok(config)
    }
}
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // RUST_LOG, when set, overrides the flag-derived level.
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
fn write_artifact(path: &Path, png: &[u8]) -> Result<()> {
    fs::write(path, png).with_context(|| format!("writing {}", path.display()))?;
    info!("wrote {} ({} bytes)", path.display(), png.len());
    Ok(())
}
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = cli.load_config()?;
    let trace = Trace::from_path(&cli.input)
        .with_context(|| format!("loading trace {}", cli.input.display()))?;
    info!("loaded {} samples from {}", trace.len(), cli.input.display());
    let names = ArtifactNames::new(&cli.input, &cli.output_dir)?;
    fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("creating {}", cli.output_dir.display()))?;
    let pipeline = NoisePipeline::new(config)?;
    let style = PlotStyle::from_config(pipeline.config());
    info!("worker pool ready with {} threads", pipeline.worker_threads());
    let analyses = pipeline
        .analyze_noise(&trace)
        .context("frequency-domain analysis")?;
    for (channel, mut analysis) in analyses {
        print!("{}", report::channel_report(channel, &analysis));
        let png = pipeline
            .render_spectrum(channel, &mut analysis, &style)
            .with_context(|| format!("plotting {channel} spectrum"))?;
        write_artifact(&names.spectrum(channel), &png)?;
    }
    let averaged = pipeline
        .average_channels(&trace)
        .context("block averaging")?;
    info!("averaged trace holds {} points per channel", averaged.len());
    let png = pipeline
        .render_overlay(&averaged, &style)
        .context("plotting averaged trace")?;
    write_artifact(&names.overlay(), &png)?;
    Ok(())
}
