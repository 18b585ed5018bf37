use log::{debug, warn};
use rustfft::{num_complex::Complex64, FftPlanner};
use crate::drivers::{AnalysisConfig, TraceError};
/// Single-sided amplitude spectrum after the low-bin trim.
///
/// The two sequences are derived independently and may differ in length by one;
/// call [`Spectrum::reconcile`] before pairing them up.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Spectrum {
    pub frequencies_hz: Vec<f64>,
    pub amplitudes: Vec<f64>,
}
impl Spectrum {
    pub fn check_aligned(&self) -> Result<(), TraceError> {
        if self.frequencies_hz.len() == self.amplitudes.len() {
            Ok(())
        } else {
            Err(TraceError::SpectrumLengthMismatch {
                frequencies: self.frequencies_hz.len(),
                amplitudes: self.amplitudes.len(),
            })
        }
    }
    /// Truncates the longer sequence to the shorter one. Returns the mismatch
    /// that was repaired, if any.
    pub fn reconcile(&mut self) -> Option<TraceError> {
        let mismatch = self.check_aligned().err()?;
        let len = self.frequencies_hz.len().min(self.amplitudes.len());
        self.frequencies_hz.truncate(len);
        self.amplitudes.truncate(len);
        Some(mismatch)
    }
    pub fn len(&self) -> usize {
        self.frequencies_hz.len().min(self.amplitudes.len())
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.frequencies_hz
            .iter()
            .copied()
            .zip(self.amplitudes.iter().copied())
    }
}
/// Per-channel noise figures.
#[derive(Clone, Debug, PartialEq)]
pub struct NoiseAnalysis {
    pub peak_to_peak: f64,
    pub noise_frequency_hz: f64,
    pub noise_amplitude: f64,
    pub spectrum: Spectrum,
}
/// Amplitudes are reported in thousandths of the input unit (mV for a volt trace).
pub const AMPLITUDE_SCALE: f64 = 1000.0;
/// Computes the magnitude spectrum of a whole channel and picks out its dominant noise peak.
pub struct SpectralAnalyzer {
    transient_skip: usize,
    low_bin_trim: usize,
    minimum_samples: usize,
}
impl SpectralAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            transient_skip: config.transient_skip,
            low_bin_trim: config.low_bin_trim,
            minimum_samples: config.minimum_samples(),
        }
    }
    pub fn analyze(&self, samples: &[f64], sample_rate_hz: f64) -> Result<NoiseAnalysis, TraceError> {
        if !(sample_rate_hz > 0.0) || !sample_rate_hz.is_finite() {
            return Err(TraceError::InvalidSampleRate);
        }
        let n = samples.len();
        if n < self.minimum_samples {
            return Err(TraceError::InsufficientSamples {
                required: self.minimum_samples,
                actual: n,
            });
        }
        // The transient skip applies to the swing only; the transform sees every sample.
        let peak_to_peak = peak_to_peak(&samples[self.transient_skip..]);
        let spectrum = self.spectrum(samples, sample_rate_hz);
        debug!(
            "spectrum of {n} samples: {} frequencies, {} amplitudes",
            spectrum.frequencies_hz.len(),
            spectrum.amplitudes.len()
        );
        let peak = dominant_bin(&spectrum).ok_or(TraceError::InsufficientSamples {
            required: self.minimum_samples,
            actual: n,
        })?;
        // On even lengths the last amplitude bin has no matching frequency; it is the
        // Nyquist bin under the same one-bin offset as the rest of the sequence.
        let noise_frequency_hz = match spectrum.frequencies_hz.get(peak) {
            Some(&freq) => freq,
            None => {
                let freq = (peak + 1 + self.low_bin_trim) as f64 * sample_rate_hz / n as f64;
                warn!(
                    "dominant amplitude sits on the last bin, past {} frequencies; reporting {freq:.5} Hz",
                    spectrum.frequencies_hz.len()
                );
                freq
            }
        };
        Ok(NoiseAnalysis {
            peak_to_peak,
            noise_frequency_hz,
            noise_amplitude: spectrum.amplitudes[peak].abs(),
            spectrum,
        })
    }
    fn spectrum(&self, samples: &[f64], sample_rate_hz: f64) -> Spectrum {
        let n = samples.len();
        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(n);
        let mut buffer: Vec<Complex64> = samples.iter().map(|&v| Complex64::new(v, 0.0)).collect();
        fft.process(&mut buffer);
        // Strictly positive bins of the conventional layout: 1 ..= (n - 1) / 2.
        let bin_width = sample_rate_hz / n as f64;
        let frequencies_hz = (1..=(n - 1) / 2)
            .map(|k| k as f64 * bin_width)
            .skip(self.low_bin_trim)
            .collect();
        // First half of the transform, DC included.
        let scale = 2.0 / n as f64 * AMPLITUDE_SCALE;
        let amplitudes = buffer[..n / 2]
            .iter()
            .map(|c| c.norm() * scale)
            .skip(self.low_bin_trim)
            .collect();
        Spectrum {
            frequencies_hz,
            amplitudes,
        }
    }
}
/// Index of the largest amplitude, ignoring index 0. Ties keep the lowest index.
fn dominant_bin(spectrum: &Spectrum) -> Option<usize> {
    let amplitudes = &spectrum.amplitudes;
    if amplitudes.len() < 2 || spectrum.frequencies_hz.len() < 2 {
        return None;
    }
    let mut best = 1;
    for idx in 2..amplitudes.len() {
        if amplitudes[idx].abs() > amplitudes[best].abs() {
            best = idx;
        }
    }
    Some(best)
}
fn peak_to_peak(samples: &[f64]) -> f64 {
    let (min, max) = samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    max - min
}
