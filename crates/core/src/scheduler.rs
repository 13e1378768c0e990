//! Deterministic delayed-task queue.
//!
//! Time is whatever monotonic clock the caller feeds in (the terminal
//! frontend uses the elapsed time since start-up, tests use literal
//! durations). Nothing fires on its own: [`Scheduler::drain_due`] hands back
//! every task whose deadline has passed, in deadline order.

use std::{collections::BTreeMap, collections::HashMap, time::Duration};

use crate::input::Control;

/// Work the controller can defer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// End of the selection cool-down started by the selection with this version.
    SelectionCooldown {
        /// Selection version that scheduled the completion.
        version: u64,
    },
    /// Raise the "needs coin" flag if the cabinet is still empty.
    CoinNudge,
    /// Trailing edge of the resize debounce.
    Relayout,
    /// Release the pressed look of an arcade control.
    ReleaseControl(Control),
    /// Stop highlighting the credits display.
    CreditsGlowEnd,
    /// Scroll the page back to its top after a view switch.
    ScrollToTop,
}

/// Handle returned by [`Scheduler::schedule`], usable for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// Cancellable queue of [`Task`]s keyed by deadline.
#[derive(Debug, Default)]
pub struct Scheduler {
    next_id: u64,
    queue: BTreeMap<(Duration, TaskId), Task>,
    deadlines: HashMap<TaskId, Duration>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` to fire `delay` after `now`.
    pub fn schedule(&mut self, now: Duration, delay: Duration, task: Task) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let due = now.saturating_add(delay);
        self.queue.insert((due, id), task);
        self.deadlines.insert(id, due);
        id
    }

    /// Drop a queued task. Returns `false` when it already fired or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        match self.deadlines.remove(&id) {
            Some(due) => self.queue.remove(&(due, id)).is_some(),
            None => false,
        }
    }

    /// Drop every queued task matching `predicate`, returning how many were removed.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&Task) -> bool) -> usize {
        let doomed: Vec<(Duration, TaskId)> = self
            .queue
            .iter()
            .filter(|(_, task)| predicate(task))
            .map(|(key, _)| *key)
            .collect();
        for key in &doomed {
            self.queue.remove(key);
            self.deadlines.remove(&key.1);
        }
        doomed.len()
    }

    /// Remove and return every task due at or before `now`, earliest first.
    /// Tasks sharing a deadline come back in scheduling order.
    pub fn drain_due(&mut self, now: Duration) -> Vec<Task> {
        let mut due = Vec::new();
        while let Some(entry) = self.queue.first_entry() {
            if entry.key().0 > now {
                break;
            }
            let ((_, id), task) = entry.remove_entry();
            self.deadlines.remove(&id);
            due.push(task);
        }
        due
    }

    /// Deadline of the earliest queued task.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    /// Whether any queued task matches `predicate`.
    pub fn is_pending(&self, mut predicate: impl FnMut(&Task) -> bool) -> bool {
        self.queue.values().any(|task| predicate(task))
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn drains_in_deadline_then_schedule_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(0), ms(150), Task::Relayout);
        scheduler.schedule(ms(0), ms(100), Task::CoinNudge);
        scheduler.schedule(ms(0), ms(100), Task::CreditsGlowEnd);

        assert!(scheduler.drain_due(ms(99)).is_empty());
        assert_eq!(
            scheduler.drain_due(ms(100)),
            vec![Task::CoinNudge, Task::CreditsGlowEnd]
        );
        assert_eq!(scheduler.next_deadline(), Some(ms(150)));
        assert_eq!(scheduler.drain_due(ms(1_000)), vec![Task::Relayout]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn cancelled_tasks_never_fire() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.schedule(ms(10), ms(5), Task::ScrollToTop);
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        assert!(scheduler.drain_due(ms(100)).is_empty());
    }

    #[test]
    fn cancel_where_removes_matching_only() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(0), ms(150), Task::ReleaseControl(Control::Left));
        scheduler.schedule(ms(0), ms(150), Task::ReleaseControl(Control::Play));
        scheduler.schedule(ms(0), ms(150), Task::Relayout);

        let removed = scheduler.cancel_where(|task| {
            matches!(task, Task::ReleaseControl(Control::Left) | Task::Relayout)
        });
        assert_eq!(removed, 2);
        assert_eq!(scheduler.len(), 1);
        assert!(scheduler.is_pending(|task| *task == Task::ReleaseControl(Control::Play)));
    }
}
