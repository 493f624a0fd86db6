/// Delayed-task scheduler driven by a simulated millisecond clock.
///
/// Tasks are records `(expiry_ms, seq, task)` in a min-heap. The clock
/// only moves when `advance()` is called; the wall clock is never read.
///
/// Ordering: smallest expiry first; equal expiries fire in registration
/// order (`seq`). A task popped by `pop_due` comes with its own expiry so
/// follow-up work can be scheduled relative to when it was due rather
/// than to the end of the (possibly long) frame that found it.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

struct Entry<T> {
    expiry_ms: u64,
    seq: u64,
    task: T,
}

// Reversed so BinaryHeap (a max-heap) yields the earliest entry.
impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.expiry_ms.cmp(&self.expiry_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.expiry_ms == other.expiry_ms && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

pub struct Scheduler<T> {
    now_ms: u64,
    next_seq: u64,
    queue: BinaryHeap<Entry<T>>,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Scheduler { now_ms: 0, next_seq: 0, queue: BinaryHeap::new() }
    }

    /// Current simulated time.
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    /// Run `task` once `delay_ms` has elapsed from now.
    /// Returns the absolute expiry time.
    pub fn schedule(&mut self, delay_ms: u64, task: T) -> u64 {
        self.schedule_at(self.now_ms.saturating_add(delay_ms), task)
    }

    /// Run `task` at absolute time `expiry_ms`. A time already in the past
    /// fires on the next `pop_due`.
    pub fn schedule_at(&mut self, expiry_ms: u64, task: T) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Entry { expiry_ms, seq, task });
        expiry_ms
    }

    pub fn advance(&mut self, dt_ms: u64) {
        self.now_ms = self.now_ms.saturating_add(dt_ms);
    }

    /// Next task whose expiry has passed, with that expiry.
    pub fn pop_due(&mut self) -> Option<(u64, T)> {
        match self.queue.peek() {
            Some(e) if e.expiry_ms <= self.now_ms => self.queue.pop().map(|e| (e.expiry_ms, e.task)),
            _ => None,
        }
    }

    /// Number of tasks not yet fired.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain<T>(s: &mut Scheduler<T>) -> Vec<T> {
        std::iter::from_fn(|| s.pop_due().map(|(_, t)| t)).collect()
    }

    #[test]
    fn nothing_fires_before_expiry() {
        let mut s = Scheduler::new();
        s.schedule(1000, "hide");
        s.advance(999);
        assert_eq!(s.pop_due(), None);
        s.advance(1);
        assert_eq!(s.pop_due(), Some((1000, "hide")));
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn fires_by_expiry_not_registration() {
        let mut s = Scheduler::new();
        s.schedule(3000, "message");
        s.schedule(1000, "antagonist");
        s.schedule(200, "tween");
        s.advance(5000);
        assert_eq!(drain(&mut s), vec!["tween", "antagonist", "message"]);
    }

    #[test]
    fn equal_expiry_keeps_registration_order() {
        let mut s = Scheduler::new();
        s.schedule(100, 1);
        s.schedule(100, 2);
        s.schedule(100, 3);
        s.advance(100);
        assert_eq!(drain(&mut s), vec![1, 2, 3]);
    }

    #[test]
    fn delay_is_relative_to_current_time() {
        let mut s = Scheduler::new();
        s.advance(500);
        assert_eq!(s.schedule(250, ()), 750);
        s.advance(249);
        assert!(s.pop_due().is_none());
        s.advance(1);
        assert_eq!(s.pop_due(), Some((750, ())));
    }

    #[test]
    fn due_task_reports_its_own_expiry() {
        let mut s = Scheduler::new();
        s.schedule(200, "exit");
        s.advance(1000);
        let (at, task) = s.pop_due().unwrap();
        assert_eq!((at, task), (200, "exit"));
        // Follow-up chained from the expiry, not from now
        s.schedule_at(at + 200, "return");
        assert_eq!(s.pop_due(), Some((400, "return")));
    }
}
