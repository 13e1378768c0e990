//! Which presentation mode is active, and the page-level side effects of
//! switching between them.

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::scheduler::{Scheduler, Task};

/// The three mutually exclusive presentation modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Grid,
    Scroll,
    Arcade,
}

impl ViewMode {
    /// Tab order.
    pub const ALL: [ViewMode; 3] = [ViewMode::Grid, ViewMode::Scroll, ViewMode::Arcade];

    pub fn label(self) -> &'static str {
        match self {
            Self::Grid => "Grid",
            Self::Scroll => "Scroll",
            Self::Arcade => "Arcade",
        }
    }

    /// Layout container the mode renders into.
    pub fn container(self) -> Container {
        match self {
            Self::Arcade => Container::Flex,
            Self::Grid | Self::Scroll => Container::Block,
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ViewMode {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "grid" => Ok(Self::Grid),
            "scroll" => Ok(Self::Scroll),
            "arcade" => Ok(Self::Arcade),
            _ => Err(()),
        }
    }
}

/// Layout container kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Block,
    Flex,
}

/// The page the grid and scroll views live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub scroll_offset: usize,
    pub scroll_locked: bool,
    pub container: Container,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            scroll_offset: 0,
            scroll_locked: false,
            container: Container::Block,
        }
    }
}

/// Outcome of an accepted [`ViewStateMachine::show`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ViewMode,
    pub to: ViewMode,
    /// A deferred scroll-to-top was queued.
    pub scroll_to_top: bool,
}

#[derive(Debug, Clone)]
pub struct ViewStateMachine {
    current: ViewMode,
    page: PageState,
    frame: Duration,
}

impl ViewStateMachine {
    /// Starts in [`ViewMode::Grid`]. `frame` is how long the deferred
    /// scroll-to-top waits so the new layout settles before it is measured.
    pub fn new(frame: Duration) -> Self {
        Self {
            current: ViewMode::Grid,
            page: PageState::default(),
            frame,
        }
    }

    pub fn current(&self) -> ViewMode {
        self.current
    }

    pub fn page(&self) -> PageState {
        self.page
    }

    pub fn is_visible(&self, mode: ViewMode) -> bool {
        self.current == mode
    }

    /// Tab highlight, derived from the current mode.
    pub fn tab_active(&self, mode: ViewMode) -> bool {
        self.current == mode
    }

    /// Index of the highlighted tab within [`ViewMode::ALL`].
    pub fn active_tab(&self) -> usize {
        ViewMode::ALL
            .iter()
            .position(|mode| *mode == self.current)
            .unwrap_or(0)
    }

    /// Switch to `mode`. Re-showing the current mode does nothing.
    pub fn show(
        &mut self,
        mode: ViewMode,
        scheduler: &mut Scheduler,
        now: Duration,
    ) -> Option<Transition> {
        if mode == self.current {
            return None;
        }
        let from = self.current;
        self.current = mode;
        self.page.container = mode.container();
        self.page.scroll_locked = mode == ViewMode::Arcade;

        let scroll_to_top = mode != ViewMode::Arcade;
        if scroll_to_top {
            scheduler.cancel_where(|task| *task == Task::ScrollToTop);
            scheduler.schedule(now, self.frame, Task::ScrollToTop);
        }
        debug!(%from, to = %mode, "view switched");
        Some(Transition {
            from,
            to: mode,
            scroll_to_top,
        })
    }

    /// Switch by name; unknown names are ignored.
    pub fn show_named(
        &mut self,
        name: &str,
        scheduler: &mut Scheduler,
        now: Duration,
    ) -> Option<Transition> {
        let mode = name.parse::<ViewMode>().ok()?;
        self.show(mode, scheduler, now)
    }

    /// Deferred scroll-to-top. Only lands if the page is still scrollable.
    pub fn apply_scroll_to_top(&mut self) -> bool {
        if self.page.scroll_locked {
            return false;
        }
        self.page.scroll_offset = 0;
        true
    }

    /// Scroll the page by `delta` rows, clamped to `[0, max_offset]`.
    /// Ignored while the page is locked.
    pub fn scroll_page(&mut self, delta: isize, max_offset: usize) -> bool {
        if self.page.scroll_locked {
            return false;
        }
        let target = (self.page.scroll_offset as isize + delta).max(0) as usize;
        self.page.scroll_offset = target.min(max_offset);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(16);

    #[test]
    fn starts_in_grid_with_free_scrolling() {
        let view = ViewStateMachine::new(FRAME);
        assert_eq!(view.current(), ViewMode::Grid);
        assert!(view.tab_active(ViewMode::Grid));
        assert!(!view.page().scroll_locked);
        assert_eq!(view.page().container, Container::Block);
    }

    #[test]
    fn reshowing_current_mode_is_a_no_op() {
        let mut scheduler = Scheduler::new();
        let mut view = ViewStateMachine::new(FRAME);
        assert!(view.show(ViewMode::Grid, &mut scheduler, Duration::ZERO).is_none());
        assert!(scheduler.is_empty());
    }

    #[test]
    fn arcade_locks_scrolling_without_scroll_to_top() {
        let mut scheduler = Scheduler::new();
        let mut view = ViewStateMachine::new(FRAME);
        let transition = view
            .show(ViewMode::Arcade, &mut scheduler, Duration::ZERO)
            .expect("transition");
        assert!(!transition.scroll_to_top);
        assert!(scheduler.is_empty());
        assert!(view.page().scroll_locked);
        assert_eq!(view.page().container, Container::Flex);
        assert_eq!(view.active_tab(), 2);
        assert!(!view.scroll_page(3, 10));
    }

    #[test]
    fn leaving_arcade_restores_scrolling_and_defers_scroll_to_top() {
        let mut scheduler = Scheduler::new();
        let mut view = ViewStateMachine::new(FRAME);
        view.show(ViewMode::Arcade, &mut scheduler, Duration::ZERO);
        let transition = view
            .show(ViewMode::Scroll, &mut scheduler, Duration::from_millis(5))
            .expect("transition");
        assert!(transition.scroll_to_top);
        assert!(!view.page().scroll_locked);
        assert!(view.is_visible(ViewMode::Scroll));
        assert!(scheduler.drain_due(Duration::from_millis(5)).is_empty());
        assert_eq!(
            scheduler.drain_due(Duration::from_millis(21)),
            vec![Task::ScrollToTop]
        );
    }

    #[test]
    fn unknown_names_are_ignored() {
        let mut scheduler = Scheduler::new();
        let mut view = ViewStateMachine::new(FRAME);
        assert!(view
            .show_named("carousel", &mut scheduler, Duration::ZERO)
            .is_none());
        assert!(view
            .show_named("ARCADE", &mut scheduler, Duration::ZERO)
            .is_some());
        assert_eq!(view.current(), ViewMode::Arcade);
    }

    #[test]
    fn page_scroll_clamps_and_resets() {
        let mut view = ViewStateMachine::new(FRAME);
        assert!(view.scroll_page(8, 5));
        assert_eq!(view.page().scroll_offset, 5);
        assert!(view.scroll_page(-20, 5));
        assert_eq!(view.page().scroll_offset, 0);
        view.scroll_page(3, 5);
        assert!(view.apply_scroll_to_top());
        assert_eq!(view.page().scroll_offset, 0);
    }
}
