//! Logical placement values handed to the scroll and arcade renderers.
//!
//! No drawing happens here: a renderer receives one placement per item and
//! decides how an offset, scale or stacking order translates to its medium.

use crate::selection::SelectionEngine;

/// Scale of the selected arcade card.
pub const SELECTED_SCALE: f32 = 1.0;
/// Scale of every other arcade card.
pub const UNSELECTED_SCALE: f32 = 0.85;
/// Stacking order of the selected arcade card.
pub const SELECTED_Z: u8 = 10;

/// Placement of one row in the scroll list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollPlacement {
    pub index: usize,
    /// Signed circular distance from the selection.
    pub distance: isize,
    /// Outside the visible window: fully transparent and not clickable.
    pub hidden: bool,
    pub selected: bool,
}

/// Placement of one card on the arcade carousel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardPlacement {
    pub index: usize,
    pub distance: isize,
    /// Horizontal offset from the centre slot, in renderer units.
    pub offset: isize,
    pub scale: f32,
    pub z_index: u8,
    pub selected: bool,
}

/// Scroll-list placements for every item. `visible_window` is the number of
/// rows shown around the selection; rows further than half of it are hidden.
pub fn scroll_placements(selection: &SelectionEngine, visible_window: usize) -> Vec<ScrollPlacement> {
    let Some(selected) = selection.index() else {
        return Vec::new();
    };
    let half_visible = (visible_window / 2) as isize;
    (0..selection.len())
        .map(|index| {
            let distance = selection.distance_to(index);
            ScrollPlacement {
                index,
                distance,
                hidden: distance.abs() > half_visible,
                selected: index == selected,
            }
        })
        .collect()
}

/// Carousel placements for every item, `stride` units apart.
pub fn card_placements(selection: &SelectionEngine, stride: isize) -> Vec<CardPlacement> {
    let Some(selected) = selection.index() else {
        return Vec::new();
    };
    (0..selection.len())
        .map(|index| {
            let distance = selection.distance_to(index);
            let is_selected = index == selected;
            CardPlacement {
                index,
                distance,
                offset: distance * stride,
                scale: if is_selected {
                    SELECTED_SCALE
                } else {
                    UNSELECTED_SCALE
                },
                z_index: if is_selected {
                    SELECTED_Z
                } else {
                    (5 - distance.abs()).max(0) as u8
                },
                selected: is_selected,
            }
        })
        .collect()
}

/// Carousel stride for a viewport `width` cells wide: five cards across,
/// never narrower than `min_stride`.
pub fn stride_for_width(width: u16, min_stride: u16) -> isize {
    (width / 5).max(min_stride) as isize
}
