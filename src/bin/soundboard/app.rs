//! Soundboard - event loop and key handling

use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;
use rtrb::Consumer;

use sfx_synth::{binding::SoundControls, SoundEventId};

use super::ui::{self, SpectrumAnalyzer, View};

/// Samples kept for the oscilloscope
const VIS_BUFFER_SIZE: usize = 1024;
/// Volume change per key press
const VOLUME_STEP: f32 = 0.05;
/// How long the "last played" marker stays lit
const HIGHLIGHT: Duration = Duration::from_millis(600);

pub struct Soundboard {
    controls: SoundControls,
    scope_rx: Consumer<f32>,
    scope: Vec<f32>,
    analyzer: SpectrumAnalyzer,
    selected: usize,
    last_played: Option<(SoundEventId, Instant)>,
    should_quit: bool,
}

impl Soundboard {
    pub fn new(controls: SoundControls, scope_rx: Consumer<f32>) -> Self {
        let sample_rate = controls.engine().sample_rate().unwrap_or(48_000.0);
        Self {
            controls,
            scope_rx,
            scope: vec![0.0; VIS_BUFFER_SIZE],
            analyzer: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, sample_rate),
            selected: 0,
            last_played: None,
            should_quit: false,
        }
    }

    pub fn run(mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_scope();

            terminal.draw(|frame| ui::render(frame, &self.view()))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    /// Drain the scope tap, keeping the newest VIS_BUFFER_SIZE samples
    fn poll_scope(&mut self) {
        while let Ok(sample) = self.scope_rx.pop() {
            self.scope.push(sample);
        }
        if self.scope.len() > VIS_BUFFER_SIZE {
            let excess = self.scope.len() - VIS_BUFFER_SIZE;
            self.scope.drain(..excess);
        }
        self.analyzer.update(&self.scope);
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                if let Some(&id) = SoundEventId::ALL.get(index) {
                    self.selected = index;
                    self.play(id);
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.play(SoundEventId::ALL[self.selected]);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = (self.selected + 1).min(SoundEventId::ALL.len() - 1);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                let volume = self.controls.volume() + VOLUME_STEP;
                self.controls.set_volume(volume);
            }
            KeyCode::Char('-') => {
                let volume = self.controls.volume() - VOLUME_STEP;
                self.controls.set_volume(volume);
            }
            KeyCode::Char('m') | KeyCode::Char('M') => {
                self.controls.toggle_mute();
            }
            _ => {}
        }
    }

    fn play(&mut self, id: SoundEventId) {
        self.controls.play(id);
        self.last_played = Some((id, Instant::now()));
    }

    fn view(&self) -> View<'_> {
        View {
            controls: self.controls.snapshot(),
            sample_rate: self.controls.engine().sample_rate(),
            selected: self.selected,
            flashing: self
                .last_played
                .filter(|(_, at)| at.elapsed() < HIGHLIGHT)
                .map(|(id, _)| id),
            scope: &self.scope,
            spectrum: self.analyzer.data(),
        }
    }
}
