//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::app::App;
use crate::catalog::Catalog;
use crate::config::{ControlsSettings, UiSettings};
use crate::player::{ControllerState, PlayerPhase};

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    [
        "[j/k] up/down".to_string(),
        "[h/l] prev/next song".to_string(),
        format!("[H/L] scrub -/+{}s", scrub_seconds),
        "[enter] play selected song".to_string(),
        "[space/p] play/pause".to_string(),
        "[s] stop".to_string(),
        "[gg/G] top/bottom".to_string(),
        "[zz] jump to playing".to_string(),
        "[q] quit".to_string(),
    ]
    .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Elapsed / total, with the total left out while unknown.
fn time_text(position: Duration, duration: Duration) -> String {
    if duration.is_zero() {
        format_mmss(position)
    } else {
        format!("{} / {}", format_mmss(position), format_mmss(duration))
    }
}

fn status_text(app: &App, catalog: &Catalog, state: &ControllerState) -> String {
    let mut parts: Vec<String> = Vec::new();

    if app.follow_playback {
        parts.push(" CURSOR: Follow".to_string());
    } else {
        parts.push(" CURSOR: Free-roam".to_string());
    }

    match state.current_index.and_then(|i| catalog.get(i)) {
        Some(track) if state.phase == PlayerPhase::Loading => {
            parts.push(format!("Loading: {}", track.display_name));
        }
        Some(track) => {
            parts.push(format!(
                "Song: {} [{}]",
                track.display_name,
                time_text(state.position, state.duration)
            ));
            parts.push(state.phase.label().to_string());
        }
        None => parts.push(state.phase.label().to_string()),
    }

    parts.push(format!("Tracks: {}", catalog.len()));

    if let Some(dir) = &app.current_dir {
        parts.push(format!("Dir: {}", dir));
    }

    if let Some(err) = state.last_error.as_ref().or(app.notice.as_ref()) {
        parts.push(format!("! {}", err));
    }

    parts.join(" • ")
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    catalog: &Catalog,
    state: &ControllerState,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" tapedeck ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status_par = Paragraph::new(status_text(app, catalog, state))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    // Main list
    {
        // Center the selected item when possible; only build ListItems for the visible window.
        let total = catalog.len();
        let list_height = chunks[2].height.saturating_sub(2) as usize;
        let sel_pos = app.selected.min(total.saturating_sub(1));
        let (start, end) = if total <= list_height || list_height == 0 {
            (0, total)
        } else {
            let half = list_height / 2;
            let mut start = sel_pos.saturating_sub(half);
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height)
        };

        let visible_items: Vec<ListItem> = catalog
            .iter()
            .enumerate()
            .skip(start)
            .take(end - start)
            .map(|(i, track)| {
                let name = &track.display_name;
                if state.current_index == Some(i) {
                    ListItem::new(format!("♪ {}", name))
                        .style(Style::default().add_modifier(Modifier::BOLD))
                } else {
                    ListItem::new(format!("  {}", name))
                }
            })
            .collect();

        let list = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(" tracks "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut list_state = ratatui::widgets::ListState::default();
        if total > 0 {
            list_state.select(Some(sel_pos - start));
        }
        frame.render_stateful_widget(list, chunks[2], &mut list_state);
    }

    let footer = Paragraph::new(controls_text(controls_settings.scrub_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[3]);
}
