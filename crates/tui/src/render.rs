use arcade_core::{
    input::Control,
    layout::CardPlacement,
    AppState, DisplayState, Item, ViewMode,
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::UiState;

const CARD_WIDTH: u16 = 30;
const CARD_HEIGHT: u16 = 7;

struct Theme {
    accent: Color,
    accent_alt: Color,
    muted: Color,
    selection_bg: Color,
    selection_fg: Color,
    success: Color,
    warning: Color,
    danger: Color,
    on_accent: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Cyan,
            accent_alt: Color::Magenta,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            selection_fg: Color::White,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
            on_accent: Color::Black,
        }
    }
}

pub(crate) fn draw(frame: &mut Frame, state: &AppState, ui: &mut UiState, prompt: Option<&str>) {
    let theme = Theme::default();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(4),
        ])
        .split(frame.size());

    render_tabs(frame, state, &theme, chunks[0]);
    match state.display() {
        DisplayState::Loading => render_loading(frame, &theme, chunks[1]),
        DisplayState::Error(err) => render_error(frame, &theme, chunks[1], err),
        DisplayState::Ready => match state.view().current() {
            ViewMode::Grid => render_grid(frame, state, ui, &theme, chunks[1]),
            ViewMode::Scroll => render_scroll(frame, state, &theme, chunks[1]),
            ViewMode::Arcade => render_arcade(frame, state, &theme, chunks[1]),
        },
    }
    render_status(frame, state, ui, chunks[2]);

    if let Some(message) = prompt {
        render_prompt(frame, &theme, message);
    }
}

fn render_tabs(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect) {
    let titles: Vec<Line> = ViewMode::ALL
        .iter()
        .enumerate()
        .map(|(idx, mode)| Line::from(format!("{} {}", idx + 1, mode.label())))
        .collect();
    let tabs = Tabs::new(titles)
        .select(state.view().active_tab())
        .block(Block::default().borders(Borders::ALL).title("Arcade"))
        .style(Style::default().fg(theme.muted))
        .highlight_style(
            Style::default()
                .fg(theme.on_accent)
                .bg(theme.accent)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn render_loading(frame: &mut Frame, theme: &Theme, area: Rect) {
    let paragraph = Paragraph::new(Line::from(Span::styled(
        "Loading games…",
        Style::default().fg(theme.accent),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(paragraph, centered_rect(area.width, 1, area));
}

fn render_error(frame: &mut Frame, theme: &Theme, area: Rect, err: &str) {
    let lines = vec![
        Line::from(Span::styled(
            "Error Loading Games",
            Style::default().fg(theme.danger).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Please restart the app and try again."),
        Line::from(Span::styled(err.to_string(), Style::default().fg(theme.muted))),
    ];
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, centered_rect(60, 6, area));
}

fn render_grid(frame: &mut Frame, state: &AppState, ui: &mut UiState, theme: &Theme, area: Rect) {
    let grid = state.grid();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Games · {} ({})", grid.filter, grid.items.len()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let columns = (inner.width / CARD_WIDTH).max(1) as usize;
    let visible_rows = (inner.height / CARD_HEIGHT).max(1) as usize;
    let total_rows = grid.items.len().div_ceil(columns);
    ui.grid_columns = columns;
    ui.grid_visible_rows = visible_rows;
    ui.grid_max_offset = total_rows.saturating_sub(visible_rows);
    ui.grid_cursor = ui.grid_cursor.min(grid.items.len().saturating_sub(1));

    if grid.is_empty() {
        let lines = vec![
            Line::from("No games found for this filter."),
            Line::from(Span::styled(
                "Try selecting a different category.",
                Style::default().fg(theme.muted),
            )),
        ];
        let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
        frame.render_widget(paragraph, centered_rect(inner.width, 2, inner));
        return;
    }

    let offset = state.view().page().scroll_offset.min(ui.grid_max_offset);
    for (idx, item) in grid.items.iter().enumerate() {
        let row = idx / columns;
        if row < offset || row >= offset + visible_rows {
            continue;
        }
        let column = idx % columns;
        let rect = Rect::new(
            inner.x + column as u16 * CARD_WIDTH,
            inner.y + (row - offset) as u16 * CARD_HEIGHT,
            CARD_WIDTH.min(inner.width),
            CARD_HEIGHT,
        )
        .intersection(inner);
        render_grid_card(frame, item, idx == ui.grid_cursor, theme, rect);
    }
}

fn render_grid_card(frame: &mut Frame, item: &Item, focused: bool, theme: &Theme, area: Rect) {
    let border = if focused {
        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.muted)
    };
    let mut lines = vec![Line::from(item.description.clone())];
    if !item.tags.is_empty() {
        lines.push(Line::from(Span::styled(
            item.tags.join(" · "),
            Style::default().fg(theme.accent_alt),
        )));
    }
    if let Some(author) = item.author.as_deref() {
        lines.push(Line::from(Span::styled(
            format!("by {author}"),
            Style::default().fg(theme.muted),
        )));
    }
    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(item.display_name()),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_scroll(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let mut rows: Vec<_> = state
        .scroll_layout()
        .iter()
        .filter(|placement| !placement.hidden)
        .collect();
    rows.sort_by_key(|placement| placement.distance);

    let lines: Vec<Line> = rows
        .iter()
        .filter_map(|placement| {
            let item = state.catalogue().get(placement.index)?;
            let line = if placement.selected {
                Line::from(Span::styled(
                    format!("▶ {}", item.display_name()),
                    Style::default()
                        .fg(theme.selection_fg)
                        .bg(theme.selection_bg)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                let style = if placement.distance.unsigned_abs() > 1 {
                    Style::default().fg(theme.muted)
                } else {
                    Style::default()
                };
                Line::from(vec![
                    Span::styled(format!("  {}", item.display_name()), style),
                    Span::styled(
                        format!("  {}", item.subtitle_or_description()),
                        Style::default().fg(theme.muted),
                    ),
                ])
            };
            Some(line)
        })
        .collect();
    let list_area = chunks[0];
    let list = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Games"));
    frame.render_widget(list, list_area);

    render_preview(frame, state.current_item(), theme, chunks[1]);
}

fn render_preview(frame: &mut Frame, item: Option<&Item>, theme: &Theme, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Preview");
    let Some(item) = item else {
        frame.render_widget(block, area);
        return;
    };
    let mut lines = vec![
        Line::from(Span::styled(
            item.display_name(),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(item.subtitle_or_description().to_string()),
        Line::from(""),
    ];
    if !item.preview.is_empty() {
        lines.push(Line::from(Span::styled(
            item.preview.clone(),
            Style::default().fg(theme.muted),
        )));
        lines.push(Line::from(""));
    }
    if let Some(author) = item.author.as_deref() {
        lines.push(Line::from(format!("Author: {author}")));
    }
    if !item.tags.is_empty() {
        lines.push(Line::from(format!("Tags: {}", item.tags.join(", "))));
    }
    match item.url.as_deref() {
        Some(url) => lines.push(Line::from(format!("Link: {url}"))),
        None => lines.push(Line::from(Span::styled(
            "No launch link",
            Style::default().fg(theme.warning),
        ))),
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "o play · j/k move",
        Style::default().fg(theme.muted),
    )));
    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_arcade(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect) {
    let economy = state.economy();
    let border = if economy.powered() {
        Style::default().fg(theme.accent_alt)
    } else {
        Style::default().fg(theme.muted)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title("Cabinet");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    render_marquee(frame, state, theme, chunks[0]);
    render_stage(frame, state, theme, chunks[1]);
    render_controls(frame, state, theme, chunks[2]);
    let hint = Paragraph::new(Line::from(Span::styled(
        "←/→ move · Enter/Space play · c coin · p power",
        Style::default().fg(theme.muted),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(hint, chunks[3]);
}

fn render_marquee(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect) {
    let economy = state.economy();
    let credits_style = if economy.credits_glow() {
        Style::default()
            .fg(theme.on_accent)
            .bg(theme.warning)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.warning)
    };
    let coin_style = if economy.needs_coin() {
        Style::default()
            .fg(theme.warning)
            .add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK)
    } else {
        Style::default().fg(theme.muted)
    };
    let power = if economy.powered() {
        Span::styled("● ON", Style::default().fg(theme.success))
    } else {
        Span::styled("○ OFF", Style::default().fg(theme.danger))
    };
    let line = Line::from(vec![
        Span::styled(format!(" CREDITS: {} ", economy.credits()), credits_style),
        Span::raw("   "),
        Span::styled("[ INSERT COIN ]", coin_style),
        Span::raw("   "),
        power,
    ]);
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_stage(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect) {
    if !state.economy().powered() {
        let off = Paragraph::new(Line::from(Span::styled(
            "POWERED OFF",
            Style::default().fg(theme.muted).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(off, centered_rect(area.width, 1, area));
        return;
    }

    let mut cards: Vec<&CardPlacement> = state.card_layout().iter().collect();
    cards.sort_by_key(|placement| placement.z_index);

    let width = (state.stride().max(0) as u16).saturating_sub(2).max(8);
    let center = area.x as isize + area.width as isize / 2;
    for placement in cards {
        let Some(item) = state.catalogue().get(placement.index) else {
            continue;
        };
        let height = ((area.height as f32) * placement.scale).round().max(3.0) as u16;
        let left = center + placement.offset - width as isize / 2;
        let right = left + width as isize;
        if right <= area.x as isize || left >= (area.x + area.width) as isize {
            continue;
        }
        let x = left.max(area.x as isize) as u16;
        let visible_width = (right.min((area.x + area.width) as isize) - x as isize) as u16;
        let y = area.y + area.height.saturating_sub(height) / 2;
        let rect = Rect::new(x, y, visible_width, height.min(area.height)).intersection(area);
        render_card(frame, item, placement.selected, theme, rect);
    }
}

fn render_card(frame: &mut Frame, item: &Item, selected: bool, theme: &Theme, area: Rect) {
    let (border, title_style) = if selected {
        (
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        )
    } else {
        (Style::default().fg(theme.muted), Style::default().fg(theme.muted))
    };
    let mut lines = vec![Line::from(Span::styled(item.display_name(), title_style))];
    if selected {
        lines.push(Line::from(""));
        lines.push(Line::from(item.subtitle_or_description().to_string()));
    }
    frame.render_widget(Clear, area);
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(border))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_controls(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect) {
    let enabled = state.economy().controls_enabled();
    let style_for = |control: Control| {
        if !enabled {
            Style::default().fg(theme.muted).add_modifier(Modifier::DIM)
        } else if state.is_pressed(control) {
            Style::default()
                .fg(theme.on_accent)
                .bg(theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.accent)
        }
    };
    let line = Line::from(vec![
        Span::styled("[ ◀ ]", style_for(Control::Left)),
        Span::raw("  "),
        Span::styled("[ PLAY ]", style_for(Control::Play)),
        Span::raw("  "),
        Span::styled("[ ▶ ]", style_for(Control::Right)),
    ]);
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_status(frame: &mut Frame, state: &AppState, ui: &UiState, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Status");
    let help = match state.view().current() {
        ViewMode::Grid => "1/2/3 view · f filter · h/j/k/l move · o play · q quit",
        ViewMode::Scroll => "1/2/3 view · j/k move · o play · q quit",
        ViewMode::Arcade => "1/2/3 view · q quit",
    };
    let mut primary = vec![Span::raw(ui.status.clone())];
    if state.is_ready() {
        primary.push(Span::raw(format!(
            "  · Catalogue loaded {}",
            state.catalogue().loaded_at().format("%H:%M:%S UTC")
        )));
    }
    let paragraph = Paragraph::new(vec![Line::from(primary), Line::from(help)])
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_prompt(frame: &mut Frame, theme: &Theme, message: &str) {
    let area = centered_rect(40, 5, frame.size());
    frame.render_widget(Clear, area);
    let paragraph = Paragraph::new(vec![
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(theme.warning).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Press any key",
            Style::default().fg(theme.muted),
        )),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).title("Cabinet"));
    frame.render_widget(paragraph, area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use arcade_core::{config::AppConfig, Controller, LoadError};
    use parking_lot::Mutex;
    use rand::{rngs::StdRng, SeedableRng};
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;
    use crate::collaborators::{BrowserLauncher, ModalPrompter};

    fn controller() -> Controller {
        Controller::new(
            &AppConfig::default(),
            Box::new(BrowserLauncher::new(Arc::new(Mutex::new(None)))),
            Box::new(ModalPrompter::new(Arc::new(Mutex::new(None)))),
        )
    }

    fn screen(controller: &Controller, prompt: Option<&str>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let mut ui = UiState::default();
        terminal
            .draw(|frame| draw(frame, controller.state(), &mut ui, prompt))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn failed_load_shows_error_screen() {
        let mut controller = controller();
        let mut rng = StdRng::seed_from_u64(1);
        controller.finish_load(
            Err(LoadError::Unreachable("offline".into())),
            &mut rng,
            Duration::ZERO,
        );
        let text = screen(&controller, None);
        assert!(text.contains("Error Loading Games"));
        assert!(text.contains("Please restart the app and try again."));
    }

    #[test]
    fn empty_filter_explains_itself() {
        let mut controller = controller();
        let mut rng = StdRng::seed_from_u64(1);
        let item = pong();
        controller.finish_load(Ok(vec![item]), &mut rng, Duration::ZERO);
        controller.set_filter("puzzle");
        let text = screen(&controller, None);
        assert!(text.contains("No games found for this filter."));
        assert!(text.contains("Try selecting a different category."));
    }

    #[test]
    fn status_line_shows_load_time() {
        let mut controller = controller();
        assert!(!screen(&controller, None).contains("Catalogue loaded"));

        let mut rng = StdRng::seed_from_u64(1);
        controller.finish_load(Ok(vec![pong()]), &mut rng, Duration::ZERO);
        let stamp = controller
            .state()
            .catalogue()
            .loaded_at()
            .format("%H:%M:%S UTC")
            .to_string();
        assert!(screen(&controller, None).contains(&format!("Catalogue loaded {stamp}")));
    }

    #[test]
    fn prompt_overlays_the_view() {
        let mut controller = controller();
        let mut rng = StdRng::seed_from_u64(1);
        controller.finish_load(Ok(vec![pong()]), &mut rng, Duration::ZERO);
        let text = screen(&controller, Some("Insert coin to play!"));
        assert!(text.contains("Insert coin to play!"));
        assert!(text.contains("Press any key"));
    }

    fn pong() -> Item {
        Item {
            id: "pong".into(),
            name: "Pong".into(),
            description: "Bat and ball".into(),
            subtitle: None,
            emoji: None,
            author: None,
            preview: String::new(),
            url: Some("https://games.example/pong".into()),
            tags: vec!["arcade".into()],
        }
    }
}
