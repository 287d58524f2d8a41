//! Status bar widget - volume, mute, output readiness and scope levels

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::View;

/// Levels of the scope buffer
struct Levels {
    peak: f32,
    rms: f32,
}

impl Levels {
    fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

pub fn render_status(frame: &mut Frame, area: Rect, view: &View) {
    let block = Block::default().title(" soundboard ").borders(Borders::ALL);
    let controls = &view.controls;
    let levels = Levels::from_buffer(view.scope);

    let (output, output_color) = match (controls.initialized, view.sample_rate) {
        (true, Some(rate)) => (format!("● {:.1}kHz  ", rate / 1000.0), Color::Green),
        _ => ("○ no output  ".to_string(), Color::Red),
    };

    let volume_color = if controls.muted {
        Color::DarkGray
    } else {
        Color::Cyan
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" Volume: {:>3.0}%  ", controls.volume * 100.0),
            Style::default().fg(volume_color),
        ),
        Span::styled(
            if controls.muted { "MUTED  " } else { "       " },
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(output, Style::default().fg(output_color)),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", levels.peak, levels.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}
