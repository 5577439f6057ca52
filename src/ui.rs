//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`. It
//! only reads the shared now-playing snapshot; every action goes through
//! the engine channel.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::config::{ControlsSettings, TimeField, UiSettings};
use crate::deck::DeckState;
use crate::engine::NowPlaying;
use crate::library::CartridgeFile;

/// Everything the renderer needs for one frame.
pub struct UiView<'a> {
    pub shelf: &'a [CartridgeFile],
    pub selected: usize,
    pub shelf_dir: &'a str,
    pub now: &'a NowPlaying,
}

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(controls: &ControlsSettings) -> String {
    [
        "[j/k] shelf up/down".to_string(),
        "[enter] load cartridge".to_string(),
        "[space/p] play/pause".to_string(),
        "[h/l] prev/next track".to_string(),
        format!("[H/L] scrub -/+{}s", controls.scrub_seconds),
        "[s] stop".to_string(),
        "[-/+] volume".to_string(),
        "[q] quit".to_string(),
    ]
    .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Build the now-playing time text (elapsed/total/remaining) per `UiSettings`.
fn now_playing_time_text(
    elapsed: Duration,
    total: Option<Duration>,
    ui: &UiSettings,
) -> Option<String> {
    if ui.now_playing_time_fields.is_empty() {
        return None;
    }

    let mut parts: Vec<String> = Vec::new();
    for f in &ui.now_playing_time_fields {
        match f {
            TimeField::Elapsed => parts.push(format_mmss(elapsed)),
            TimeField::Total => {
                if let Some(t) = total {
                    parts.push(format_mmss(t));
                }
            }
            TimeField::Remaining => {
                if let Some(t) = total {
                    let rem = t.saturating_sub(elapsed);
                    parts.push(format!("-{}", format_mmss(rem)));
                }
            }
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&ui.now_playing_time_separator))
    }
}

fn state_text(state: DeckState) -> &'static str {
    match state {
        DeckState::Idle => "Stopped",
        DeckState::Loading => "Loading",
        DeckState::Playing => "Playing",
        DeckState::Paused => "Paused",
        DeckState::Ended => "Stopped",
        DeckState::Error => "Error",
    }
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    view: &UiView,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" attacca ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box
    let status = {
        let now = view.now;
        let mut parts: Vec<String> = Vec::new();

        parts.push(state_text(now.state).to_string());

        if let Some(track) = &now.track {
            let song = format!("{} - {}", track.artist, track.title);
            let time = now_playing_time_text(now.position, now.duration, ui_settings);
            if let Some(time) = time {
                parts.push(format!("Song: {} [{}]", song, time));
            } else {
                parts.push(format!("Song: {}", song));
            }
        }

        if let Some(album) = &now.album_title {
            let cover = if now.cover_art.is_some() { " ◩" } else { "" };
            parts.push(format!("Album: {}{}", album, cover));
        }

        parts.push(format!("Vol: {:3.0}%", now.volume * 100.0));

        if now.awaiting_user_start {
            parts.push("press play to start".to_string());
        }
        if let Some(message) = &now.message {
            parts.push(message.clone());
        }

        parts.push(format!("Shelf: {}", view.shelf_dir));

        parts.join(" • ")
    };

    let status_par = Paragraph::new(status)
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

    // Main area: shelf on the left, queue on the right.
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(chunks[2]);

    {
        let items: Vec<ListItem> = view
            .shelf
            .iter()
            .map(|c| ListItem::new(c.name.as_str()))
            .collect();
        let empty = items.is_empty();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(" cartridges "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if !empty {
            state.select(Some(view.selected.min(view.shelf.len() - 1)));
        }
        frame.render_stateful_widget(list, columns[0], &mut state);
    }

    {
        let items: Vec<ListItem> = view
            .now
            .queue
            .iter()
            .map(|t| {
                let number = t.number.map(|n| format!("{n:02}")).unwrap_or_default();
                ListItem::new(format!("{} {}", number, t.title))
            })
            .collect();
        let empty = items.is_empty();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(" queue "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("♪ ");
        let mut state = ratatui::widgets::ListState::default();
        if !empty {
            state.select(view.now.cursor);
        }
        frame.render_stateful_widget(list, columns[1], &mut state);
    }

    // Footer
    let footer = Paragraph::new(controls_text(controls_settings))
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
