use std::{
    io,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use arcade_core::{
    config::AppConfig,
    input::{Action, Key},
    selection::Direction,
    CatalogueSource, Controller, DisplayState, Item, LoadError, PlayError, PlayOutcome, ViewMode,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use parking_lot::Mutex;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::{spawn, sync::mpsc, time::timeout};
use tracing::{debug, info};

use crate::{
    collaborators::{BrowserLauncher, ModalPrompter, Shared},
    render,
};

const TICK_RATE: Duration = Duration::from_millis(50);

enum AppEvent {
    Input(Event),
    Tick,
    CatalogueLoaded(Result<Vec<Item>, LoadError>),
}

/// Terminal front end: feeds input and time into the controller and draws
/// whatever state it ends up in.
pub struct ArcadeApp {
    controller: Controller,
    source: CatalogueSource,
    prompt: Shared<String>,
    last_launch: Shared<String>,
    ui: UiState,
    started: Instant,
}

/// View-local state that the core does not own.
pub(crate) struct UiState {
    pub(crate) grid_cursor: usize,
    pub(crate) grid_columns: usize,
    pub(crate) grid_visible_rows: usize,
    pub(crate) grid_max_offset: usize,
    pub(crate) status: String,
    pub(crate) should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            grid_cursor: 0,
            grid_columns: 1,
            grid_visible_rows: 1,
            grid_max_offset: 0,
            status: "Loading games…".to_string(),
            should_quit: false,
        }
    }
}

impl ArcadeApp {
    pub fn new(config: &AppConfig) -> Self {
        let prompt: Shared<String> = Arc::new(Mutex::new(None));
        let last_launch: Shared<String> = Arc::new(Mutex::new(None));
        let controller = Controller::new(
            config,
            Box::new(BrowserLauncher::new(last_launch.clone())),
            Box::new(ModalPrompter::new(prompt.clone())),
        );
        Self {
            controller,
            source: CatalogueSource::parse(&config.catalogue),
            prompt,
            last_launch,
            ui: UiState::default(),
            started: Instant::now(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let size = terminal.size()?;
        self.controller.resize(size.width, size.height, self.now());

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx.clone());
        spawn_catalogue_load(self.source.clone(), event_tx);

        loop {
            self.controller.advance(self.now());
            let prompt = self.prompt.lock().clone();
            terminal.draw(|frame| {
                render::draw(frame, self.controller.state(), &mut self.ui, prompt.as_deref())
            })?;
            if self.ui.should_quit {
                break;
            }

            let wait = next_wait(self.controller.next_deadline(), self.now());
            match timeout(wait, event_rx.recv()).await {
                Ok(Some(event)) => self.process_app_event(event),
                Ok(None) => break,
                Err(_) => {}
            }
        }

        restore_terminal(&mut terminal)?;
        Ok(())
    }

    fn now(&self) -> Duration {
        self.started.elapsed()
    }

    fn process_app_event(&mut self, event: AppEvent) {
        let now = self.now();
        match event {
            AppEvent::Input(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                self.handle_key(key, now);
            }
            AppEvent::Input(Event::Resize(width, height)) => {
                self.controller.resize(width, height, now);
            }
            AppEvent::Input(_) | AppEvent::Tick => {}
            AppEvent::CatalogueLoaded(result) => {
                let mut rng = rand::rng();
                self.controller.finish_load(result, &mut rng, now);
                self.ui.status = match self.controller.state().display() {
                    DisplayState::Ready => format!(
                        "Loaded {} games",
                        self.controller.state().catalogue().len()
                    ),
                    DisplayState::Error(err) => format!("Error: {err}"),
                    DisplayState::Loading => self.ui.status.clone(),
                };
            }
        }
        if let Some(notice) = self.last_launch.lock().take() {
            self.ui.status = notice;
        }
    }

    fn handle_key(&mut self, key: KeyEvent, now: Duration) {
        if self.prompt.lock().take().is_some() {
            debug!("prompt dismissed");
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.ui.should_quit = true;
            return;
        }

        if let Some(core_key) = core_key(&key) {
            if let Some(route) = self.controller.handle_key(core_key, now) {
                self.report_action(route.action);
                if route.suppress_default {
                    return;
                }
            }
        }

        self.handle_local_key(key, now);
    }

    fn report_action(&mut self, action: Action) {
        let economy = self.controller.state().economy();
        match action {
            Action::AddCoin if economy.powered() => {
                self.ui.status = format!("Coin inserted · Credits: {}", economy.credits());
            }
            Action::TogglePower => {
                self.ui.status = if economy.powered() {
                    "Cabinet powered on".to_string()
                } else {
                    "Cabinet powered off".to_string()
                };
            }
            Action::AddCoin | Action::Move(_) | Action::Play => {}
        }
    }

    fn handle_local_key(&mut self, key: KeyEvent, now: Duration) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.ui.should_quit = true,
            KeyCode::Char('1') => self.show_view(ViewMode::Grid, now),
            KeyCode::Char('2') => self.show_view(ViewMode::Scroll, now),
            KeyCode::Char('3') => self.show_view(ViewMode::Arcade, now),
            KeyCode::Tab => self.cycle_view(1, now),
            KeyCode::BackTab => self.cycle_view(-1, now),
            KeyCode::Char('f') => self.cycle_filter(),
            KeyCode::PageDown => {
                let rows = self.ui.grid_visible_rows as isize;
                self.controller.scroll_page(rows, self.ui.grid_max_offset);
            }
            KeyCode::PageUp => {
                let rows = self.ui.grid_visible_rows as isize;
                self.controller.scroll_page(-rows, self.ui.grid_max_offset);
            }
            _ => match self.controller.state().view().current() {
                ViewMode::Grid => self.handle_grid_key(key, now),
                ViewMode::Scroll => self.handle_scroll_key(key, now),
                ViewMode::Arcade => {}
            },
        }
    }

    fn handle_grid_key(&mut self, key: KeyEvent, now: Duration) {
        let columns = self.ui.grid_columns.max(1) as isize;
        match key.code {
            KeyCode::Char('h') => self.move_grid_cursor(-1),
            KeyCode::Char('l') => self.move_grid_cursor(1),
            KeyCode::Char('k') => self.move_grid_cursor(-columns),
            KeyCode::Char('j') => self.move_grid_cursor(columns),
            KeyCode::Char('o') => {
                let id = self
                    .controller
                    .state()
                    .grid()
                    .items
                    .get(self.ui.grid_cursor)
                    .map(|item| item.id.clone());
                if let Some(id) = id {
                    let result = self.controller.activate_grid_item(&id, now);
                    self.report_play(result);
                }
            }
            _ => {}
        }
    }

    fn handle_scroll_key(&mut self, key: KeyEvent, now: Duration) {
        match key.code {
            KeyCode::Char('k') => {
                self.controller.move_selection(Direction::Prev, now);
            }
            KeyCode::Char('j') => {
                self.controller.move_selection(Direction::Next, now);
            }
            KeyCode::Char('o') => {
                let result = self.controller.play_current(now);
                self.report_play(result);
            }
            _ => {}
        }
    }

    fn report_play(&mut self, result: Result<Option<PlayOutcome>, PlayError>) {
        match result {
            Ok(Some(outcome)) if !outcome.launched => {
                self.ui.status = format!("{} has no launch link", outcome.item_id);
            }
            Ok(_) => {}
            Err(err) => self.ui.status = err.to_string(),
        }
    }

    fn show_view(&mut self, mode: ViewMode, now: Duration) {
        if self.controller.show_view(mode, now).is_some() {
            info!(%mode, "view changed");
            self.ui.status = format!("{mode} view");
        }
    }

    fn cycle_view(&mut self, delta: isize, now: Duration) {
        let current = self.controller.state().view().active_tab() as isize;
        let len = ViewMode::ALL.len() as isize;
        let next = ((current + delta) % len + len) % len;
        self.show_view(ViewMode::ALL[next as usize], now);
    }

    fn cycle_filter(&mut self) {
        let subset = self.controller.cycle_filter();
        self.ui.status = format!("Filter: {} ({} games)", subset.filter, subset.items.len());
        self.ui.grid_cursor = 0;
    }

    fn move_grid_cursor(&mut self, delta: isize) {
        let len = self.controller.state().grid().items.len();
        if len == 0 {
            return;
        }
        let target = (self.ui.grid_cursor as isize + delta).clamp(0, len as isize - 1) as usize;
        self.ui.grid_cursor = target;

        let columns = self.ui.grid_columns.max(1);
        let visible = self.ui.grid_visible_rows.max(1);
        let row = target / columns;
        let offset = self.controller.state().view().page().scroll_offset;
        let delta = if row < offset {
            row as isize - offset as isize
        } else if row >= offset + visible {
            (row + 1 - visible) as isize - offset as isize
        } else {
            0
        };
        if delta != 0 {
            self.controller.scroll_page(delta, self.ui.grid_max_offset);
        }
    }
}

/// How long the loop may block on input before the next scheduled task is due.
fn next_wait(deadline: Option<Duration>, now: Duration) -> Duration {
    match deadline {
        Some(deadline) => deadline.saturating_sub(now).min(TICK_RATE),
        None => TICK_RATE,
    }
}

fn core_key(key: &KeyEvent) -> Option<Key> {
    if !(key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT) {
        return None;
    }
    let mapped = match key.code {
        KeyCode::Up => Key::ArrowUp,
        KeyCode::Down => Key::ArrowDown,
        KeyCode::Left => Key::ArrowLeft,
        KeyCode::Right => Key::ArrowRight,
        KeyCode::Enter => Key::Enter,
        KeyCode::Char(' ') => Key::Space,
        KeyCode::Char(c) => Key::Char(c),
        _ => return None,
    };
    Some(mapped)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

fn spawn_catalogue_load(source: CatalogueSource, sender: mpsc::Sender<AppEvent>) {
    spawn(async move {
        let result = source.fetch().await;
        let _ = sender.send(AppEvent::CatalogueLoaded(result)).await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_shrinks_to_the_next_deadline() {
        let now = Duration::from_millis(1_000);
        assert_eq!(next_wait(None, now), TICK_RATE);
        assert_eq!(
            next_wait(Some(now + Duration::from_millis(16)), now),
            Duration::from_millis(16)
        );
        assert_eq!(next_wait(Some(now - Duration::from_millis(5)), now), Duration::ZERO);
        assert_eq!(next_wait(Some(now + Duration::from_secs(2)), now), TICK_RATE);
    }

    #[test]
    fn maps_contract_keys() {
        let press = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(core_key(&press(KeyCode::Left)), Some(Key::ArrowLeft));
        assert_eq!(core_key(&press(KeyCode::Enter)), Some(Key::Enter));
        assert_eq!(core_key(&press(KeyCode::Char(' '))), Some(Key::Space));
        assert_eq!(
            core_key(&KeyEvent::new(KeyCode::Char('C'), KeyModifiers::SHIFT)),
            Some(Key::Char('C'))
        );
        assert_eq!(
            core_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            None
        );
        assert_eq!(core_key(&press(KeyCode::F(1))), None);
    }
}
