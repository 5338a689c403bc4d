//! Virtual clock and timer queue standing in for the page's event loop.

use sp_core::Millis;
use std::collections::BTreeMap;
use std::collections::HashMap;

/// Handle returned by [`TimerQueue::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Deadline-ordered task queue. Tasks sharing a deadline run in scheduling order.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    now: Millis,
    next_id: u64,
    queue: BTreeMap<(Millis, u64), T>,
    deadlines: HashMap<TimerId, Millis>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            now: 0,
            next_id: 1,
            queue: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn now(&self) -> Millis {
        self.now
    }

    /// Queues `task` to run `delay` ms from now. A zero delay runs on the next turn.
    pub fn schedule(&mut self, delay: Millis, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        let deadline = self.now.saturating_add(delay);
        self.queue.insert((deadline, id.0), task);
        self.deadlines.insert(id, deadline);
        id
    }

    /// Drops a pending task. Returns false when it already ran or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let Some(deadline) = self.deadlines.remove(&id) else {
            return false;
        };
        self.queue.remove(&(deadline, id.0)).is_some()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Pops the earliest task due at or before `limit`, moving the clock to its deadline.
    pub fn pop_due(&mut self, limit: Millis) -> Option<(TimerId, T)> {
        let (&(deadline, raw_id), _) = self.queue.iter().next()?;
        if deadline > limit {
            return None;
        }
        let task = self.queue.remove(&(deadline, raw_id))?;
        let id = TimerId(raw_id);
        self.deadlines.remove(&id);
        self.now = self.now.max(deadline);
        Some((id, task))
    }

    /// Moves the clock forward without running anything. Never moves it backwards.
    pub fn advance_clock_to(&mut self, time: Millis) {
        self.now = self.now.max(time);
    }
}

#[cfg(test)]
mod tests {
    use super::TimerQueue;

    #[test]
    fn runs_tasks_in_deadline_then_schedule_order() {
        let mut queue = TimerQueue::default();
        queue.schedule(2000, "revert");
        queue.schedule(0, "settle-a");
        queue.schedule(0, "settle-b");

        let mut ran = Vec::new();
        while let Some((_, task)) = queue.pop_due(5000) {
            ran.push((queue.now(), task));
        }
        assert_eq!(
            ran,
            vec![(0, "settle-a"), (0, "settle-b"), (2000, "revert")]
        );
    }

    #[test]
    fn respects_limit_and_cancellation() {
        let mut queue = TimerQueue::default();
        let first = queue.schedule(100, 1);
        let second = queue.schedule(200, 2);

        assert!(queue.cancel(first));
        assert!(!queue.cancel(first));
        assert!(!queue.is_pending(first));
        assert!(queue.is_pending(second));

        assert_eq!(queue.pop_due(199), None);
        queue.advance_clock_to(199);
        assert_eq!(queue.now(), 199);
        assert_eq!(queue.pop_due(200).map(|(_, task)| task), Some(2));
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn clock_never_moves_backwards() {
        let mut queue: TimerQueue<()> = TimerQueue::default();
        queue.advance_clock_to(50);
        queue.advance_clock_to(10);
        assert_eq!(queue.now(), 50);
    }
}
