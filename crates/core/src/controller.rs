//! Top-level controller: owns [`AppState`] and the outward collaborators,
//! and is the only place engine operations are sequenced.
//!
//! Every operation takes `now`, the caller's monotonic clock, so cool-downs,
//! debounces and pulses are reproducible in tests.

use std::time::Duration;

use rand::Rng;
use tracing::{debug, error, info, warn};

use crate::{
    catalog::Catalogue,
    config::{AppConfig, LayoutConfig, TimingConfig},
    economy::EconomyStateMachine,
    error::{LoadError, PlayError},
    filter::FilteredSubset,
    input::{self, Action, Control, Key, Route},
    layout,
    models::Item,
    scheduler::Task,
    selection::{Direction, SelectionEngine},
    state::{AppState, DisplayState, Viewport},
    view::{Transition, ViewMode, ViewStateMachine},
};

/// Message shown by the blocking prompt when the cabinet is out of credits.
pub const INSERT_COIN_MESSAGE: &str = "Insert coin to play!";

/// Opens an item's URL in an independent browsing context. Fire-and-forget.
pub trait Launcher {
    fn launch(&mut self, url: &str);
}

/// Blocking, modal notification to the user.
pub trait Prompter {
    fn alert(&mut self, message: &str);
}

/// Successful play attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayOutcome {
    pub item_id: String,
    /// A credit was consumed.
    pub charged: bool,
    /// The launcher was invoked. Items without a URL play as a no-op.
    pub launched: bool,
}

pub struct Controller {
    state: AppState,
    timings: TimingConfig,
    layout: LayoutConfig,
    launcher: Box<dyn Launcher>,
    prompter: Box<dyn Prompter>,
}

impl Controller {
    /// Controller in the [`DisplayState::Loading`] state.
    pub fn new(
        config: &AppConfig,
        launcher: Box<dyn Launcher>,
        prompter: Box<dyn Prompter>,
    ) -> Self {
        let timings = config.timings.clone();
        let layout = config.layout.clone();
        let economy = EconomyStateMachine::new(
            config.economy.starts_powered,
            config.economy.starting_credits,
            timings.economy(),
        );
        let state = AppState::new(
            SelectionEngine::new(0, timings.selection_cooldown()),
            ViewStateMachine::new(timings.frame()),
            economy,
            layout::stride_for_width(Viewport::default().width, layout.min_card_stride),
        );
        Self {
            state,
            timings,
            layout,
            launcher,
            prompter,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Accept the catalogue source's answer. Failure is terminal.
    pub fn finish_load<R: Rng + ?Sized>(
        &mut self,
        result: Result<Vec<Item>, LoadError>,
        rng: &mut R,
        now: Duration,
    ) {
        if self.state.display != DisplayState::Loading {
            warn!("catalogue delivered twice; ignoring");
            return;
        }
        let catalogue = match result.and_then(|items| Catalogue::load(items, rng)) {
            Ok(catalogue) => catalogue,
            Err(err) => {
                error!(%err, "failed to load games");
                self.state.display = DisplayState::Error(err.to_string());
                return;
            }
        };

        info!(total = catalogue.len(), "games loaded");
        self.state.selection = SelectionEngine::new(catalogue.len(), self.timings.selection_cooldown());
        self.state.tags = catalogue.tags();
        self.state.grid = self.state.filter.subset(catalogue.master());
        self.state.catalogue = catalogue;
        self.state.display = DisplayState::Ready;
        self.state
            .economy
            .pulse_credits(&mut self.state.scheduler, now);
        self.select(0, now);
    }

    /// Route a key through the fixed contract. Returns the route taken, so the
    /// frontend knows whether to skip its own handling.
    pub fn handle_key(&mut self, key: Key, now: Duration) -> Option<Route> {
        if !self.state.is_ready() {
            return None;
        }
        let route = input::route(key)?;
        if let Some(control) = route.press {
            self.press(control, now);
        }
        match route.action {
            Action::Move(direction) => {
                self.arcade_move(direction, now);
            }
            Action::Play => {
                let _ = self.arcade_play(now);
            }
            Action::AddCoin => {
                self.add_coin(now);
            }
            Action::TogglePower => {
                self.toggle_power(now);
            }
        }
        Some(route)
    }

    /// Select a working-order index. Out-of-range or mid-cool-down calls are dropped.
    pub fn select(&mut self, index: usize, now: Duration) -> bool {
        let accepted = self
            .state
            .selection
            .select(index, &mut self.state.scheduler, now);
        if accepted {
            self.position_cards();
            self.position_scroll_items();
        }
        accepted
    }

    /// Step the selection around the ring, regardless of cabinet power.
    /// This is what the scroll view's own navigation buttons do.
    pub fn move_selection(&mut self, direction: Direction, now: Duration) -> bool {
        match self.state.selection.neighbour(direction) {
            Some(target) => self.select(target, now),
            None => false,
        }
    }

    /// Cabinet joystick: moves only while powered.
    pub fn arcade_move(&mut self, direction: Direction, now: Duration) -> bool {
        if !self.state.economy.controls_enabled() {
            return false;
        }
        self.move_selection(direction, now)
    }

    /// Cabinet play button: plays only while powered. Outside the arcade
    /// view an unpowered cabinet simply ignores the press.
    pub fn arcade_play(&mut self, now: Duration) -> Result<Option<PlayOutcome>, PlayError> {
        if !self.state.economy.controls_enabled() {
            return match self.state.view.current() {
                ViewMode::Arcade => Err(PlayError::PoweredOff),
                ViewMode::Grid | ViewMode::Scroll => Ok(None),
            };
        }
        self.play_current(now)
    }

    /// Play the selected item. `Ok(None)` when nothing is selected.
    pub fn play_current(&mut self, now: Duration) -> Result<Option<PlayOutcome>, PlayError> {
        match self.state.current_item().cloned() {
            Some(item) => self.play(&item, now).map(Some),
            None => Ok(None),
        }
    }

    /// Activate an arcade card: the selected card plays, any other becomes selected.
    pub fn activate_card(&mut self, index: usize, now: Duration) -> Result<Option<PlayOutcome>, PlayError> {
        if self.state.selection.index() == Some(index) {
            return self.play_current(now);
        }
        self.select(index, now);
        Ok(None)
    }

    /// Activate a scroll-list row. Rows outside the visible window ignore input.
    pub fn activate_scroll_item(&mut self, index: usize, now: Duration) -> bool {
        let visible = self
            .state
            .scroll_layout
            .get(index)
            .map(|placement| !placement.hidden)
            .unwrap_or(false);
        visible && self.select(index, now)
    }

    /// Activate a grid card. Grid cards carry ids because the grid shows a
    /// filtered subset in master order, not the working order.
    pub fn activate_grid_item(&mut self, id: &str, now: Duration) -> Result<Option<PlayOutcome>, PlayError> {
        match self.state.catalogue.lookup_by_id(id).cloned() {
            Some(item) => self.play(&item, now).map(Some),
            None => {
                debug!(id, "grid activation for unknown id");
                Ok(None)
            }
        }
    }

    pub fn add_coin(&mut self, now: Duration) -> bool {
        if !self.state.is_ready() {
            return false;
        }
        self.state.economy.add_coin(&mut self.state.scheduler, now)
    }

    pub fn toggle_power(&mut self, now: Duration) -> bool {
        if !self.state.is_ready() {
            return self.state.economy.powered();
        }
        let powered = self
            .state
            .economy
            .toggle_power(&mut self.state.scheduler, now);
        if !powered {
            self.state.pressed.clear();
            self.state
                .scheduler
                .cancel_where(|task| matches!(task, Task::ReleaseControl(_)));
        }
        powered
    }

    /// Pulse a cabinet control. Disabled controls do not react.
    pub fn press(&mut self, control: Control, now: Duration) -> bool {
        if !self.state.economy.controls_enabled() {
            return false;
        }
        self.state.pressed.insert(control);
        self.state
            .scheduler
            .cancel_where(|task| *task == Task::ReleaseControl(control));
        self.state
            .scheduler
            .schedule(now, self.timings.button_pulse(), Task::ReleaseControl(control));
        true
    }

    pub fn show_view(&mut self, mode: ViewMode, now: Duration) -> Option<Transition> {
        let transition = self.state.view.show(mode, &mut self.state.scheduler, now)?;
        match transition.to {
            ViewMode::Arcade => self.position_cards(),
            ViewMode::Scroll => self.position_scroll_items(),
            ViewMode::Grid => {}
        }
        Some(transition)
    }

    /// Switch view by name; unknown names are ignored.
    pub fn show_view_named(&mut self, name: &str, now: Duration) -> Option<Transition> {
        let mode = name.parse::<ViewMode>().ok()?;
        self.show_view(mode, now)
    }

    /// Apply a tag filter to the grid. The other views are unaffected.
    pub fn set_filter(&mut self, tag: &str) -> &FilteredSubset {
        self.state.grid = self
            .state
            .filter
            .set_filter(tag, self.state.catalogue.master());
        debug!(filter = %self.state.grid.filter, matches = self.state.grid.items.len(), "grid filter applied");
        &self.state.grid
    }

    /// Advance to the next filter choice.
    pub fn cycle_filter(&mut self) -> &FilteredSubset {
        self.state.grid = self
            .state
            .filter
            .cycle(&self.state.tags, self.state.catalogue.master());
        &self.state.grid
    }

    /// Scroll the page; ignored while the arcade view locks it.
    pub fn scroll_page(&mut self, delta: isize, max_offset: usize) -> bool {
        self.state.view.scroll_page(delta, max_offset)
    }

    /// Record a viewport size change. Bursts collapse into one relayout once
    /// the debounce window passes without another resize.
    pub fn resize(&mut self, width: u16, height: u16, now: Duration) {
        self.state.pending_viewport = Some(Viewport { width, height });
        self.state
            .scheduler
            .cancel_where(|task| *task == Task::Relayout);
        self.state
            .scheduler
            .schedule(now, self.timings.resize_debounce(), Task::Relayout);
    }

    /// Fire every scheduled task due at `now`. Returns how many fired.
    pub fn advance(&mut self, now: Duration) -> usize {
        let mut fired = 0;
        loop {
            let due = self.state.scheduler.drain_due(now);
            if due.is_empty() {
                break;
            }
            fired += due.len();
            for task in due {
                self.apply(task);
            }
        }
        fired
    }

    /// Deadline of the next scheduled task, for sizing the frontend's wait.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.state.scheduler.next_deadline()
    }

    fn apply(&mut self, task: Task) {
        match task {
            Task::SelectionCooldown { version } => {
                self.state.selection.finish_cooldown(version);
            }
            Task::CoinNudge => {
                if self.state.economy.fire_nudge() {
                    debug!("coin slot nudged");
                }
            }
            Task::Relayout => self.relayout(),
            Task::ReleaseControl(control) => {
                self.state.pressed.remove(&control);
            }
            Task::CreditsGlowEnd => self.state.economy.end_credits_glow(),
            Task::ScrollToTop => {
                if self.state.view.current() != ViewMode::Arcade {
                    self.state.view.apply_scroll_to_top();
                }
            }
        }
    }

    fn relayout(&mut self) {
        if let Some(viewport) = self.state.pending_viewport.take() {
            self.state.viewport = viewport;
            self.state.stride = layout::stride_for_width(viewport.width, self.layout.min_card_stride);
        }
        match self.state.view.current() {
            ViewMode::Arcade => self.position_cards(),
            ViewMode::Scroll => self.position_scroll_items(),
            ViewMode::Grid => {}
        }
        debug!(mode = %self.state.view.current(), width = self.state.viewport.width, "relayout");
    }

    fn position_cards(&mut self) {
        self.state.card_layout = layout::card_placements(&self.state.selection, self.state.stride);
    }

    fn position_scroll_items(&mut self) {
        self.state.scroll_layout =
            layout::scroll_placements(&self.state.selection, self.layout.visible_window);
    }

    fn play(&mut self, item: &Item, now: Duration) -> Result<PlayOutcome, PlayError> {
        let mode = self.state.view.current();
        let receipt = match self
            .state
            .economy
            .attempt_play(mode, &mut self.state.scheduler, now)
        {
            Ok(receipt) => receipt,
            Err(PlayError::NoCredits) => {
                info!(item = %item.id, "play refused: no credits");
                self.prompter.alert(INSERT_COIN_MESSAGE);
                return Err(PlayError::NoCredits);
            }
            Err(err) => {
                debug!(item = %item.id, %err, "play refused");
                return Err(err);
            }
        };

        let launched = match item.url.as_deref() {
            Some(url) => {
                info!(item = %item.id, %url, %mode, charged = receipt.charged, "launching game");
                self.launcher.launch(url);
                true
            }
            None => false,
        };
        Ok(PlayOutcome {
            item_id: item.id.clone(),
            charged: receipt.charged,
            launched,
        })
    }
}
