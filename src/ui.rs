//! UI rendering helpers for the terminal user interface.
//!
//! This module renders the controller's observable fields using `ratatui`.
//! It never mutates playback state.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::App;
use crate::config::{ControlsSettings, TimeField, TrackDisplayField, UiSettings};
use crate::controller::{PlaybackController, TransportPhase};
use crate::engine::PlaybackEngine;
use crate::playlist::{Track, display_from_fields};

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("enter", "play selected");
    map.insert("space/p", "play/pause");
    map.insert("h/l", "prev/next");
    // H/L is filled dynamically from config.
    map.insert("+/-", "volume");
    map.insert("0-9", "seek to 0%-90%");
    map.insert("r", "repeat");
    map.insert("K", "details");
    map.insert("q", "quit");
    map
});

/// Render the controls help text, incorporating skip seconds.
fn controls_text(skip_seconds: f64) -> String {
    // Keep the rendered order stable and human-friendly.
    let order = [
        "space/p", "h/l", "H/L", "+/-", "0-9", "r", "j/k", "enter", "K", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] skip -/+{}s", skip_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format seconds as `MM:SS`.
fn format_mmss(seconds: f64) -> String {
    let secs = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Build the elapsed/total/remaining text per `UiSettings`.
fn time_text(current: f64, total: f64, ui: &UiSettings) -> String {
    ui.time_fields
        .iter()
        .map(|f| match f {
            TimeField::Elapsed => format_mmss(current),
            TimeField::Total => format_mmss(total),
            TimeField::Remaining => format!("-{}", format_mmss((total - current).max(0.0))),
        })
        .collect::<Vec<String>>()
        .join(&ui.time_separator)
}

/// Fraction of the track played, in `[0, 1]`.
fn progress_ratio(current: f64, total: f64) -> f64 {
    if total > 0.0 {
        (current / total).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn phase_text(phase: TransportPhase, is_playing: bool) -> &'static str {
    match phase {
        TransportPhase::Idle => "Idle",
        TransportPhase::Loading(_) if is_playing => "Loading (will play)",
        TransportPhase::Loading(_) => "Loading",
        TransportPhase::Ready => "Ready",
        TransportPhase::Playing => "Playing",
        TransportPhase::Paused => "Paused",
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn details_text(track: &Track) -> String {
    format!(
        "Title: {}\nArtist: {}\nAlbum: {}\nYear: {}\nUrl: {}\nImage: {}",
        track.title,
        track.artist.as_deref().unwrap_or("-"),
        track.album.as_deref().unwrap_or("-"),
        track.year.as_deref().unwrap_or("-"),
        track.url,
        track.image.as_deref().unwrap_or("-"),
    )
}

/// Album, artist and year lines below the headline, minus fields the headline already shows.
fn extra_detail_lines(track: &Track, headline: &[TrackDisplayField]) -> Vec<String> {
    let mut lines = Vec::new();
    let candidates = [
        (TrackDisplayField::Album, &track.album),
        (TrackDisplayField::Artist, &track.artist),
        (TrackDisplayField::Year, &track.year),
    ];
    for (field, value) in candidates {
        if headline.contains(&field) {
            continue;
        }
        lines.push(value.clone().unwrap_or_default());
    }
    if let Some(image) = &track.image {
        lines.push(format!("Cover: {}", image));
    }
    lines
}

fn left_padded(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

/// Render the entire UI into the provided `frame`.
pub fn draw<E: PlaybackEngine>(
    frame: &mut Frame,
    app: &App,
    controller: &PlaybackController<E>,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(7),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" spindle ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Now playing
    let track = controller.current_track();
    let current_time = controller.current_time();
    let total_time = controller.total_time();
    {
        let mut lines = vec![display_from_fields(
            track,
            &ui_settings.now_playing_fields,
            &ui_settings.now_playing_separator,
        )];
        lines.extend(extra_detail_lines(track, &ui_settings.now_playing_fields));
        let status = format!(
            "{} • Repeat {}",
            phase_text(controller.phase(), controller.is_playing()),
            if controller.repeat() { "ON" } else { "OFF" }
        );
        let title = format!(
            " now playing [{}/{}] ",
            controller.current_index() + 1,
            controller.playlist().len()
        );
        let now_playing = Paragraph::new(lines.join("\n"))
            .block(left_padded(&title).title_bottom(format!(" {} ", status)))
            .wrap(Wrap { trim: true });
        frame.render_widget(now_playing, chunks[1]);
    }

    // Position
    let position_label = format!("Current: {:.2}s / Total: {:.2}s", current_time, total_time);
    let position = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", time_text(current_time, total_time, ui_settings))),
        )
        .gauge_style(Style::default().add_modifier(Modifier::BOLD))
        .ratio(progress_ratio(current_time, total_time))
        .label(position_label);
    frame.render_widget(position, chunks[2]);

    // Volume
    let volume = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" volume "))
        .ratio(f64::from(controller.volume()).clamp(0.0, 1.0))
        .label(format!("Volume: {:.2}", controller.volume()));
    frame.render_widget(volume, chunks[3]);

    // Track list
    {
        let current_index = controller.current_index();
        let items: Vec<ListItem> = controller
            .playlist()
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let marker = if i == current_index { "♪ " } else { "  " };
                let label = format!("{}{}", marker, t.title);
                if i == current_index {
                    ListItem::new(label).bold()
                } else {
                    ListItem::new(label)
                }
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(" choose a song "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut list_state = ListState::default();
        list_state.select(Some(app.cursor));
        frame.render_stateful_widget(list, chunks[4], &mut list_state);
    }

    // Overlay details popup over the track list.
    if app.details_window {
        let popup_area = centered_rect_sized(72, 8, chunks[4]);
        frame.render_widget(Clear, popup_area);

        let text = controller
            .playlist()
            .get(app.cursor)
            .map(details_text)
            .unwrap_or_else(|| "No track selected".to_string());
        let details = Paragraph::new(text)
            .block(left_padded(" details (K closes) "))
            .wrap(Wrap { trim: true });
        frame.render_widget(details, popup_area);
    }

    let footer = Paragraph::new(controls_text(controls_settings.skip_seconds))
        .block(left_padded(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[5]);
}
