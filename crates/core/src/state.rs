//! The single application-state struct. Every field has exactly one writer:
//! the engine that owns it, driven by [`crate::controller::Controller`].

use std::collections::HashSet;

use crate::{
    catalog::Catalogue,
    economy::EconomyStateMachine,
    filter::{FilterEngine, FilteredSubset, TagFilter},
    input::Control,
    layout::{CardPlacement, ScrollPlacement},
    models::Item,
    scheduler::Scheduler,
    selection::SelectionEngine,
    view::ViewStateMachine,
};

/// What the presentation layer should show overall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayState {
    /// Waiting for the catalogue source.
    Loading,
    Ready,
    /// The catalogue could not be loaded. Terminal for the session.
    Error(String),
}

/// Size of the drawable area, in renderer units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
        }
    }
}

pub struct AppState {
    pub(crate) display: DisplayState,
    pub(crate) catalogue: Catalogue,
    pub(crate) selection: SelectionEngine,
    pub(crate) view: ViewStateMachine,
    pub(crate) filter: FilterEngine,
    pub(crate) grid: FilteredSubset,
    pub(crate) tags: Vec<String>,
    pub(crate) economy: EconomyStateMachine,
    pub(crate) scheduler: Scheduler,
    pub(crate) viewport: Viewport,
    pub(crate) pending_viewport: Option<Viewport>,
    pub(crate) stride: isize,
    pub(crate) scroll_layout: Vec<ScrollPlacement>,
    pub(crate) card_layout: Vec<CardPlacement>,
    pub(crate) pressed: HashSet<Control>,
}

impl AppState {
    pub(crate) fn new(
        selection: SelectionEngine,
        view: ViewStateMachine,
        economy: EconomyStateMachine,
        stride: isize,
    ) -> Self {
        Self {
            display: DisplayState::Loading,
            catalogue: Catalogue::default(),
            selection,
            view,
            filter: FilterEngine::new(),
            grid: FilteredSubset {
                filter: TagFilter::All,
                items: Vec::new(),
            },
            tags: Vec::new(),
            economy,
            scheduler: Scheduler::new(),
            viewport: Viewport::default(),
            pending_viewport: None,
            stride,
            scroll_layout: Vec::new(),
            card_layout: Vec::new(),
            pressed: HashSet::new(),
        }
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn is_ready(&self) -> bool {
        self.display == DisplayState::Ready
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn selection(&self) -> &SelectionEngine {
        &self.selection
    }

    /// The item every view agrees is selected.
    pub fn current_item(&self) -> Option<&Item> {
        self.selection
            .index()
            .and_then(|index| self.catalogue.get(index))
    }

    pub fn view(&self) -> &ViewStateMachine {
        &self.view
    }

    pub fn filter(&self) -> &TagFilter {
        self.filter.active()
    }

    /// Items the grid shows under the active filter.
    pub fn grid(&self) -> &FilteredSubset {
        &self.grid
    }

    /// Filter choices besides "all".
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn economy(&self) -> &EconomyStateMachine {
        &self.economy
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Carousel stride applied at the last relayout.
    pub fn stride(&self) -> isize {
        self.stride
    }

    pub fn scroll_layout(&self) -> &[ScrollPlacement] {
        &self.scroll_layout
    }

    pub fn card_layout(&self) -> &[CardPlacement] {
        &self.card_layout
    }

    /// The control is mid press-pulse.
    pub fn is_pressed(&self, control: Control) -> bool {
        self.pressed.contains(&control)
    }
}
