use std::io::Cursor;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::prelude::LineSeries;
use plotters::prelude::*;
use crate::drivers::error::TraceError;
use crate::drivers::fft::Spectrum;
use crate::drivers::AnalysisConfig;
#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    /// Caption size in pixels; tick labels use two thirds of it.
    pub font_px: u32,
    pub line_width: u32,
    pub background: RGBColor,
    pub foreground: RGBColor,
    pub palette: Vec<RGBColor>,
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 900,
            height: 400,
            font_px: 20,
            line_width: 1,
            background: WHITE,
            foreground: BLACK,
            palette: vec![BLUE, RED, GREEN, CYAN, MAGENTA, YELLOW],
        }
    }
}
impl PlotStyle {
    /// Sizes the canvas and type from the figure size and DPI (12 pt captions).
    pub fn from_config(config: &AnalysisConfig) -> Self {
        let (width, height) = config.figure_pixels();
        let points = config.dpi as f64 / 72.0;
        Self {
            width,
            height,
            font_px: (12.0 * points).round().max(8.0) as u32,
            line_width: (1.5 * points).round().max(1.0) as u32,
            ..Self::default()
        }
    }
    fn caption_font(&self) -> TextStyle<'static> {
        ("sans-serif", self.font_px as f64)
            .into_font()
            .color(&self.foreground)
    }
    fn tick_font(&self) -> TextStyle<'static> {
        ("sans-serif", (self.font_px * 2 / 3).max(6) as f64)
            .into_font()
            .color(&self.foreground)
    }
    fn color(&self, idx: usize) -> RGBColor {
        self.palette[idx % self.palette.len()]
    }
}
/// One stacked sub-plot of a time-domain figure.
pub struct Panel<'a> {
    pub title: &'a str,
    pub y_label: &'a str,
    pub series: Vec<(&'a str, &'a [f64])>,
}
/// Frequency-domain plot with a logarithmic frequency axis.
///
/// The spectrum must already be reconciled.
pub fn render_spectrum_png(
    title: &str,
    spectrum: &Spectrum,
    style: &PlotStyle,
) -> Result<Vec<u8>, TraceError> {
    spectrum.check_aligned()?;
    if spectrum.is_empty() {
        return Err(TraceError::Plot("spectrum has no bins".into()));
    }
    let (f_lo, f_hi) = log_bounds(&spectrum.frequencies_hz)?;
    let a_hi = spectrum
        .amplitudes
        .iter()
        .copied()
        .fold(0.0f64, f64::max)
        .max(1e-3);
    let mut buffer = vec![0u8; (style.width as usize) * (style.height as usize) * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let mut chart = ChartBuilder::on(&root)
            .margin(style.font_px)
            .caption(title, style.caption_font())
            .set_label_area_size(LabelAreaPosition::Left, style.font_px * 4)
            .set_label_area_size(LabelAreaPosition::Bottom, style.font_px * 3)
            .build_cartesian_2d((f_lo..f_hi).log_scale(), 0f64..a_hi)?;
        chart
            .configure_mesh()
            .x_desc("Frequency (Hz)")
            .y_desc("Amplitude")
            .label_style(style.tick_font())
            .axis_desc_style(style.tick_font())
            .light_line_style(&style.foreground.mix(0.05))
            .draw()?;
        let color = style.color(0);
        let width = style.line_width;
        let span = style.font_px as i32;
        chart
            .draw_series(LineSeries::new(spectrum.points(), color.stroke_width(width)))?
            .label("Real Part")
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + span, y)], color.stroke_width(width))
            });
        chart
            .configure_series_labels()
            .label_font(style.tick_font())
            .border_style(&style.foreground.mix(0.2))
            .background_style(&style.background)
            .draw()?;
        root.present()?;
    }
    encode_png(buffer, style.width, style.height)
}
/// Stacks `panels` vertically, all sharing the `time` axis.
pub fn render_panels_png(
    time: &[f64],
    panels: &[Panel<'_>],
    style: &PlotStyle,
) -> Result<Vec<u8>, TraceError> {
    if time.is_empty() || panels.is_empty() {
        return Err(TraceError::Plot("time-series figure has no samples".into()));
    }
    for panel in panels {
        if let Some((label, _)) = panel.series.iter().find(|(_, s)| s.len() != time.len()) {
            return Err(TraceError::Plot(format!(
                "series {label} does not match the time axis length"
            )));
        }
    }
    let t_bounds = axis_bounds(time.iter().copied());
    let mut buffer = vec![0u8; (style.width as usize) * (style.height as usize) * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let areas = root.split_evenly((panels.len(), 1));
        for (area, panel) in areas.iter().zip(panels) {
            let y_bounds = axis_bounds(panel.series.iter().flat_map(|(_, s)| s.iter().copied()));
            let mut chart = ChartBuilder::on(area)
                .margin(style.font_px / 2)
                .caption(panel.title, style.caption_font())
                .set_label_area_size(LabelAreaPosition::Left, style.font_px * 4)
                .set_label_area_size(LabelAreaPosition::Bottom, style.font_px * 3)
                .build_cartesian_2d(t_bounds.0..t_bounds.1, y_bounds.0..y_bounds.1)?;
            chart
                .configure_mesh()
                .x_desc("Time")
                .y_desc(panel.y_label)
                .label_style(style.tick_font())
                .axis_desc_style(style.tick_font())
                .light_line_style(&style.foreground.mix(0.05))
                .draw()?;
            for (idx, (label, values)) in panel.series.iter().enumerate() {
                let color = style.color(idx);
                let width = style.line_width;
                let span = style.font_px as i32;
                let series = time.iter().copied().zip(values.iter().copied());
                chart
                    .draw_series(LineSeries::new(series, color.stroke_width(width)))?
                    .label(*label)
                    .legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + span, y)], color.stroke_width(width))
                    });
            }
            chart
                .configure_series_labels()
                .label_font(style.tick_font())
                .border_style(&style.foreground.mix(0.2))
                .background_style(&style.background)
                .draw()?;
        }
        root.present()?;
    }
    encode_png(buffer, style.width, style.height)
}
/// Min/max of `values`, widened when the range collapses.
fn axis_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !(lo <= hi) {
        return (-1.0, 1.0);
    }
    if (hi - lo).abs() < f64::EPSILON * hi.abs().max(1.0) {
        let pad = if lo == 0.0 { 1.0 } else { lo.abs() * 0.1 };
        return (lo - pad, hi + pad);
    }
    (lo, hi)
}
/// Frequency range for a log axis; every frequency must be positive.
fn log_bounds(frequencies: &[f64]) -> Result<(f64, f64), TraceError> {
    let (lo, hi) = axis_bounds(frequencies.iter().copied());
    if !(lo > 0.0) {
        return Err(TraceError::Plot(
            "log frequency axis needs positive frequencies".into(),
        ));
    }
    if hi <= lo {
        return Ok((lo, lo * 10.0));
    }
    Ok((lo, hi))
}
fn encode_png(buffer: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>, TraceError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer)
        .ok_or_else(|| TraceError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
#[cfg(test)]
mod tests {
    use super::*;
    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    #[test]
    fn style_scales_with_dpi() {
        let config = AnalysisConfig {
            dpi: 72,
            ..AnalysisConfig::default()
        };
        let style = PlotStyle::from_config(&config);
        assert_eq!((style.width, style.height), (461, 346));
        assert_eq!(style.font_px, 12);
        let hi_res = PlotStyle::from_config(&AnalysisConfig::default());
        assert_eq!((hi_res.width, hi_res.height), (7680, 5760));
        assert_eq!(hi_res.font_px, 200);
        assert_eq!(hi_res.line_width, 25);
    }
    #[test]
    fn collapsed_ranges_are_widened() {
        assert_eq!(axis_bounds([2.0, 5.0, 3.0].into_iter()), (2.0, 5.0));
        assert_eq!(axis_bounds([0.0, 0.0].into_iter()), (-1.0, 1.0));
        let (lo, hi) = axis_bounds([4.0].into_iter());
        assert!(lo < 4.0 && hi > 4.0);
        assert_eq!(axis_bounds(std::iter::empty()), (-1.0, 1.0));
        assert_eq!(axis_bounds([f64::NAN, 1.0, 2.0].into_iter()), (1.0, 2.0));
    }
    #[test]
    fn log_axis_rejects_non_positive_frequencies() {
        assert!(log_bounds(&[0.0, 10.0]).is_err());
        assert_eq!(log_bounds(&[10.0, 1000.0]).unwrap(), (10.0, 1000.0));
    }
    #[test]
    fn unreconciled_spectrum_is_refused() {
        let spectrum = Spectrum {
            frequencies_hz: vec![1.0, 2.0],
            amplitudes: vec![0.5],
        };
        assert!(matches!(
            render_spectrum_png("V_in", &spectrum, &PlotStyle::default()),
            Err(TraceError::SpectrumLengthMismatch { .. })
        ));
    }
    #[test]
    fn panels_must_match_time_axis() {
        let time = [0.0, 1.0, 2.0];
        let short = [1.0, 2.0];
        let panels = [Panel {
            title: "V_in and V_out vs Time",
            y_label: "Voltage",
            series: vec![("V_in", &short[..])],
        }];
        assert!(matches!(
            render_panels_png(&time, &panels, &PlotStyle::default()),
            Err(TraceError::Plot(_))
        ));
    }
    #[test]
    #[ignore = "needs a system sans-serif font"]
    fn plotting_helpers_return_png() {
        let spectrum = Spectrum {
            frequencies_hz: (1..=64).map(|k| k as f64 * 10.0).collect(),
            amplitudes: (1..=64).map(|k| 1.0 / k as f64).collect(),
        };
        let png_fft = render_spectrum_png("V_out Frequency Domain Data", &spectrum, &PlotStyle::default())
            .unwrap();
        let time: Vec<f64> = (0..32).map(|t| t as f64 * 1e-6).collect();
        let wave: Vec<f64> = time.iter().map(|t| (t * 1e5).sin()).collect();
        let panels = [
            Panel {
                title: "V_in and V_out vs Time",
                y_label: "Voltage",
                series: vec![("V_in", &wave[..]), ("V_out", &wave[..])],
            },
            Panel {
                title: "I_1 and I_Bat vs Time",
                y_label: "Current",
                series: vec![("I_1", &wave[..])],
            },
        ];
        let png_wave = render_panels_png(&time, &panels, &PlotStyle::default()).unwrap();
        assert!(png_fft.starts_with(&PNG_MAGIC));
        assert!(png_wave.starts_with(&PNG_MAGIC));
    }
}
