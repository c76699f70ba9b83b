//! Tick scheduling
//!
//! Games ask for "run the next tick after `delay`" and may cancel that
//! request. The controller owns the scheduler and pulls due ticks from it,
//! so nothing fires behind its back and a cancelled tick can never run.

use std::time::Duration;

/// Identifies one scheduled tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickHandle(u64);

pub trait Scheduler {
    /// Current time on this scheduler's clock
    fn now(&self) -> Duration;

    /// Request a tick `delay` from now.
    fn schedule(&mut self, delay: Duration) -> TickHandle;

    /// Drop a pending tick; unknown handles are ignored.
    fn cancel(&mut self, handle: TickHandle);

    /// Remove and return the earliest tick due at or before `until`,
    /// moving the clock to its deadline.
    fn pop_due(&mut self, until: Duration) -> Option<TickHandle>;

    /// Move the clock forward to `to` (never backward).
    fn advance_to(&mut self, to: Duration);

    fn pending(&self) -> usize;
}

/// Virtual-clock scheduler; time only moves when the owner says so.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    /// (deadline, handle), unsorted
    queue: Vec<(Duration, TickHandle)>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Duration {
        self.now
    }

    fn schedule(&mut self, delay: Duration) -> TickHandle {
        let handle = TickHandle(self.next_id);
        self.next_id += 1;
        self.queue.push((self.now + delay, handle));
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        self.queue.retain(|&(_, h)| h != handle);
    }

    fn pop_due(&mut self, until: Duration) -> Option<TickHandle> {
        let (idx, &(deadline, handle)) = self
            .queue
            .iter()
            .enumerate()
            .filter(|(_, (deadline, _))| *deadline <= until)
            .min_by_key(|(_, (deadline, handle))| (*deadline, *handle))?;
        self.queue.swap_remove(idx);
        self.now = self.now.max(deadline);
        Some(handle)
    }

    fn advance_to(&mut self, to: Duration) {
        self.now = self.now.max(to);
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_pops_in_deadline_order() {
        let mut s = ManualScheduler::new();
        let late = s.schedule(ms(30));
        let early = s.schedule(ms(10));
        assert_eq!(s.pop_due(ms(100)), Some(early));
        assert_eq!(s.now(), ms(10));
        assert_eq!(s.pop_due(ms(100)), Some(late));
        assert_eq!(s.now(), ms(30));
        assert_eq!(s.pop_due(ms(100)), None);
    }

    #[test]
    fn test_nothing_due_before_deadline() {
        let mut s = ManualScheduler::new();
        s.schedule(ms(50));
        assert_eq!(s.pop_due(ms(49)), None);
        assert_eq!(s.pending(), 1);
    }

    #[test]
    fn test_cancelled_tick_never_fires() {
        let mut s = ManualScheduler::new();
        let h = s.schedule(ms(5));
        s.cancel(h);
        assert_eq!(s.pop_due(ms(1000)), None);
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn test_clock_only_moves_forward() {
        let mut s = ManualScheduler::new();
        s.advance_to(ms(20));
        s.advance_to(ms(10));
        assert_eq!(s.now(), ms(20));
        let h = s.schedule(ms(5));
        assert_eq!(s.pop_due(ms(25)), Some(h));
    }
}
