//! The single authoritative selection over the working catalogue order.

use std::time::Duration;

use tracing::trace;

use crate::scheduler::{Scheduler, Task};

/// Step direction around the catalogue ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

/// Selected index plus the cool-down guard that keeps layout recomputation
/// from being re-entered mid-transition.
#[derive(Debug, Clone)]
pub struct SelectionEngine {
    len: usize,
    index: usize,
    transitioning: bool,
    version: u64,
    cooldown: Duration,
}

impl SelectionEngine {
    /// Engine over a ring of `len` items, starting at index 0.
    pub fn new(len: usize, cooldown: Duration) -> Self {
        Self {
            len,
            index: 0,
            transitioning: false,
            version: 0,
            cooldown,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Currently selected index, `None` for an empty catalogue.
    pub fn index(&self) -> Option<usize> {
        (self.len > 0).then_some(self.index)
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    /// Bumped on every accepted selection.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Select `index`. Out-of-range indices and calls made during the
    /// cool-down are dropped without touching state.
    pub fn select(&mut self, index: usize, scheduler: &mut Scheduler, now: Duration) -> bool {
        if index >= self.len || self.transitioning {
            trace!(index, transitioning = self.transitioning, "selection dropped");
            return false;
        }
        self.index = index;
        self.transitioning = true;
        self.version += 1;
        scheduler.schedule(
            now,
            self.cooldown,
            Task::SelectionCooldown {
                version: self.version,
            },
        );
        true
    }

    /// Step one place around the ring, wrapping at both ends.
    pub fn step(&mut self, direction: Direction, scheduler: &mut Scheduler, now: Duration) -> bool {
        match self.neighbour(direction) {
            Some(target) => self.select(target, scheduler, now),
            None => false,
        }
    }

    /// Index one step away in `direction`.
    pub fn neighbour(&self, direction: Direction) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        let delta = match direction {
            Direction::Prev => -1,
            Direction::Next => 1,
        };
        Some(circular_index(self.index as isize + delta, self.len))
    }

    /// Cool-down completion. Stale versions are ignored.
    pub fn finish_cooldown(&mut self, version: u64) -> bool {
        if version != self.version {
            return false;
        }
        self.transitioning = false;
        true
    }

    /// Signed shortest hop from the selection to `index`.
    pub fn distance_to(&self, index: usize) -> isize {
        circular_distance(self.index, index, self.len)
    }
}

/// Wrap any integer position onto `[0, len)`. `len` must be non-zero.
pub fn circular_index(position: isize, len: usize) -> usize {
    let len = len as isize;
    (((position % len) + len) % len) as usize
}

/// Signed circular distance from `anchor` to `target` on a ring of `len`.
///
/// The raw difference is mirrored only when it lies strictly beyond half the
/// ring, so an exact half (even `len`) keeps its sign: `+len/2` stays
/// positive and `-len/2` stays negative.
pub fn circular_distance(anchor: usize, target: usize, len: usize) -> isize {
    if len == 0 {
        return 0;
    }
    let len = len as isize;
    let mut distance = target as isize - anchor as isize;
    if 2 * distance > len {
        distance -= len;
    }
    if 2 * distance < -len {
        distance += len;
    }
    distance
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const COOLDOWN: Duration = Duration::from_millis(100);

    fn settle(engine: &mut SelectionEngine, scheduler: &mut Scheduler, now: Duration) {
        for task in scheduler.drain_due(now + COOLDOWN) {
            if let Task::SelectionCooldown { version } = task {
                engine.finish_cooldown(version);
            }
        }
    }

    #[test]
    fn seven_item_wrap_scenario() {
        let mut scheduler = Scheduler::new();
        let mut engine = SelectionEngine::new(7, COOLDOWN);
        assert_eq!(engine.index(), Some(0));

        assert!(engine.step(Direction::Prev, &mut scheduler, Duration::ZERO));
        assert_eq!(engine.index(), Some(6));
        assert_eq!(engine.distance_to(2), 3);
    }

    #[test]
    fn select_during_cooldown_is_dropped() {
        let mut scheduler = Scheduler::new();
        let mut engine = SelectionEngine::new(5, COOLDOWN);

        assert!(engine.select(2, &mut scheduler, Duration::ZERO));
        assert!(!engine.select(3, &mut scheduler, Duration::from_millis(50)));
        assert_eq!(engine.index(), Some(2));

        settle(&mut engine, &mut scheduler, Duration::ZERO);
        assert!(!engine.is_transitioning());
        assert!(engine.select(3, &mut scheduler, Duration::from_millis(120)));
        assert_eq!(engine.index(), Some(3));
    }

    #[test]
    fn stale_cooldown_is_ignored() {
        let mut scheduler = Scheduler::new();
        let mut engine = SelectionEngine::new(3, COOLDOWN);
        engine.select(1, &mut scheduler, Duration::ZERO);
        let stale = engine.version() - 1;
        assert!(!engine.finish_cooldown(stale));
        assert!(engine.is_transitioning());
    }

    #[test]
    fn out_of_range_select_is_a_no_op() {
        let mut scheduler = Scheduler::new();
        let mut engine = SelectionEngine::new(4, COOLDOWN);
        assert!(!engine.select(4, &mut scheduler, Duration::ZERO));
        assert_eq!(engine.index(), Some(0));
        assert!(!engine.is_transitioning());
        assert!(scheduler.is_empty());
    }

    #[test]
    fn empty_ring_is_inert() {
        let mut scheduler = Scheduler::new();
        let mut engine = SelectionEngine::new(0, COOLDOWN);
        assert_eq!(engine.index(), None);
        assert!(!engine.step(Direction::Next, &mut scheduler, Duration::ZERO));
        assert!(!engine.select(0, &mut scheduler, Duration::ZERO));
        assert_eq!(engine.distance_to(3), 0);
    }

    #[test]
    fn exact_half_keeps_its_sign() {
        assert_eq!(circular_distance(0, 3, 6), 3);
        assert_eq!(circular_distance(3, 0, 6), -3);
        assert_eq!(circular_distance(0, 4, 6), -2);
        assert_eq!(circular_distance(5, 1, 6), 2);
        assert_eq!(circular_distance(0, 4, 8), 4);
        assert_eq!(circular_distance(4, 0, 8), -4);
    }

    #[test]
    fn single_item_ring() {
        let mut scheduler = Scheduler::new();
        let mut engine = SelectionEngine::new(1, COOLDOWN);
        assert!(engine.step(Direction::Next, &mut scheduler, Duration::ZERO));
        assert_eq!(engine.index(), Some(0));
        assert_eq!(engine.distance_to(0), 0);
    }

    proptest! {
        #[test]
        fn stepping_len_times_returns_home(len in 1usize..40, start_seed in 0usize..1000) {
            let start = start_seed % len;
            let mut scheduler = Scheduler::new();
            let mut engine = SelectionEngine::new(len, COOLDOWN);
            let mut now = Duration::ZERO;
            engine.select(start, &mut scheduler, now);
            for _ in 0..len {
                settle(&mut engine, &mut scheduler, now);
                now += COOLDOWN;
                prop_assert!(engine.step(Direction::Next, &mut scheduler, now));
                let index = engine.index().expect("non-empty");
                prop_assert!(index < len);
            }
            prop_assert_eq!(engine.index(), Some(start));
        }

        #[test]
        fn distance_is_antisymmetric_and_bounded(len in 1usize..60, a in 0usize..1000, b in 0usize..1000) {
            let (a, b) = (a % len, b % len);
            let forward = circular_distance(a, b, len);
            let backward = circular_distance(b, a, len);
            prop_assert_eq!(forward, -backward);
            prop_assert!(2 * forward.unsigned_abs() <= len);
            prop_assert_eq!(circular_index(a as isize + forward, len), b);
        }
    }
}
