//! TUI module for soundboard
//!
//! Layout: status bar, the sound list, oscilloscope beside spectrum, and a
//! help line.

mod sounds;
mod spectrum;
mod status;
mod waveform;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use sfx_synth::{binding::ControlsSnapshot, SoundEventId};

pub use spectrum::SpectrumAnalyzer;

use sounds::render_sounds;
use spectrum::render_spectrum;
use status::render_status;
use waveform::render_waveform;

/// Everything one frame needs
pub struct View<'a> {
    pub controls: ControlsSnapshot,
    pub sample_rate: Option<f32>,
    pub selected: usize,
    /// Sound played within the last moment, if any
    pub flashing: Option<SoundEventId>,
    pub scope: &'a [f32],
    pub spectrum: &'a [(f64, f64)],
}

pub fn render(frame: &mut Frame, view: &View) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Status bar
            Constraint::Min(9),    // Sound list
            Constraint::Length(8), // Waveform + spectrum
            Constraint::Length(1), // Help bar
        ])
        .split(frame.area());

    render_status(frame, chunks[0], view);
    render_sounds(frame, chunks[1], view);

    let scopes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    render_waveform(frame, scopes[0], view.scope);
    render_spectrum(frame, scopes[1], view.spectrum);

    let help = Paragraph::new(" [1-7/Enter] Play  [↑↓] Select  [+/-] Volume  [M] Mute  [Q] Quit")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[3]);
}
