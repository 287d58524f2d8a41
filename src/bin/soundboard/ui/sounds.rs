//! Sound list widget - one row per catalog entry

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use sfx_synth::{catalog, SoundEventId};

use super::View;

pub fn render_sounds(frame: &mut Frame, area: Rect, view: &View) {
    let block = Block::default().title(" Sounds ").borders(Borders::ALL);

    let items: Vec<ListItem> = SoundEventId::ALL
        .iter()
        .enumerate()
        .map(|(i, &id)| {
            let recipe = catalog::recipe(id);
            let name_style = if view.flashing == Some(id) {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(format!("{:<14}", id.name()), name_style),
                Span::styled(
                    format!("{:>5.2}s  ", recipe.duration),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(id.description()),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("▶ ");

    let mut state = ListState::default().with_selected(Some(view.selected));
    frame.render_stateful_widget(list, area, &mut state);
}
