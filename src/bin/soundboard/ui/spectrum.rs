//! Spectrum widget
//!
//! Hann-windowed FFT of the scope buffer, averaged into log-spaced bands so
//! sweeps like the skip whoosh read as a moving slope.

use std::sync::Arc;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Bands drawn between LOW_HZ and HIGH_HZ
const BANDS: usize = 40;
const LOW_HZ: f32 = 50.0;
const HIGH_HZ: f32 = 16_000.0;
/// Floor of the dB axis
const FLOOR_DB: f64 = -90.0;

pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    /// FFT bin range [start, end) averaged into each band
    bands: Vec<(usize, usize)>,
    /// (log10 Hz, dB) per band
    points: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    pub fn new(fft_len: usize, sample_rate: f32) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(fft_len);

        let window = (0..fft_len)
            .map(|i| {
                let phase = i as f32 / fft_len.saturating_sub(1).max(1) as f32;
                0.5 * (1.0 - (std::f32::consts::TAU * phase).cos())
            })
            .collect();

        let half = (fft_len / 2).max(1);
        let high = HIGH_HZ.min(sample_rate / 2.0);
        let hz_per_bin = sample_rate / fft_len as f32;
        let edge = |i: usize| LOW_HZ * (high / LOW_HZ).powf(i as f32 / BANDS as f32);

        let mut bands = Vec::with_capacity(BANDS);
        let mut points = Vec::with_capacity(BANDS);
        for i in 0..BANDS {
            let (lo, hi) = (edge(i), edge(i + 1));
            let start = ((lo / hz_per_bin) as usize).min(half - 1);
            let end = ((hi / hz_per_bin).ceil() as usize).clamp(start + 1, half);
            bands.push((start, end));
            points.push((((lo * hi).sqrt() as f64).log10(), FLOOR_DB));
        }

        Self {
            fft,
            window,
            scratch: vec![Complex::new(0.0, 0.0); fft_len],
            bands,
            points,
        }
    }

    /// Recompute from the newest `fft_len` samples of `buffer`
    pub fn update(&mut self, buffer: &[f32]) {
        let n = self.window.len();
        if buffer.len() < n {
            return;
        }
        let recent = &buffer[buffer.len() - n..];

        for ((slot, &sample), &w) in self.scratch.iter_mut().zip(recent).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        let scale = 2.0 / n as f32;
        for ((start, end), point) in self.bands.iter().zip(self.points.iter_mut()) {
            let bins = &self.scratch[*start..*end];
            let power = bins
                .iter()
                .map(|c| (c.norm() * scale).powi(2))
                .sum::<f32>()
                / bins.len() as f32;
            point.1 = (10.0 * (power.max(1e-12) as f64).log10()).max(FLOOR_DB);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.points
    }
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, points: &[(f64, f64)]) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(points);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([(LOW_HZ as f64).log10(), (HIGH_HZ as f64).log10()])
                .labels(vec!["50", "16k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, 0.0])
                .labels(vec!["-90", "-45", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
