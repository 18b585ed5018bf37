// src/report.rs
use std::fmt::Write;
use crate::drivers::{Channel, NoiseAnalysis};
/// Console block for one channel: a centred header and three figures to five decimals.
pub fn channel_report(channel: Channel, analysis: &NoiseAnalysis) -> String {
    let key = channel.label();
    let mut out = String::new();
    writeln!(out, "{key:^25}").ok();
    writeln!(out, "{key} Peak to Peak Voltage: {:.5}", analysis.peak_to_peak).ok();
    writeln!(out, "{key} Noise Frequency:      {:.5}", analysis.noise_frequency_hz).ok();
    writeln!(out, "{key} Noise Amplitude:      {:.5}", analysis.noise_amplitude).ok();
    out
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::Spectrum;
    #[test]
    fn report_layout_matches_console_table() {
        let analysis = NoiseAnalysis {
            peak_to_peak: 0.0123456,
            noise_frequency_hz: 1_250_000.0,
            noise_amplitude: 3.5,
            spectrum: Spectrum::default(),
        };
        let report = channel_report(Channel::VOut, &analysis);
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], format!("{:^25}", "V_out"));
        assert_eq!(lines[0].len(), 25);
        assert_eq!(lines[1], "V_out Peak to Peak Voltage: 0.01235");
        assert_eq!(lines[2], "V_out Noise Frequency:      1250000.00000");
        assert_eq!(lines[3], "V_out Noise Amplitude:      3.50000");
    }
}
