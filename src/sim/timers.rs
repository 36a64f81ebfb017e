//! Real-time timers
//!
//! Second-granularity countdowns and fixed delays, independent of animation
//! frames. Timers fire in due order (ties by scheduling order) and report the
//! time they were due so follow-ups can be chained without drift.

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// One second of the active countdown elapsed
    CountdownTick,
    /// "START!" beat after the pre-round countdown
    StartBeat,
    /// Outcome text expires
    ClearInfoText,
    /// Life reached zero a moment ago
    LifeWatcher,
}

#[derive(Debug, Clone)]
struct Timer {
    /// Scheduling order, breaks ties between equal due times
    seq: u64,
    due_ms: f64,
    event: TimerEvent,
}

#[derive(Debug, Clone, Default)]
pub struct Timers {
    next_seq: u64,
    pending: Vec<Timer>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: f64, delay_ms: f64, event: TimerEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Timer {
            seq,
            due_ms: now + delay_ms,
            event,
        });
    }

    /// Cancel every pending timer of one kind
    pub fn cancel_event(&mut self, event: TimerEvent) {
        self.pending.retain(|t| t.event != event);
    }

    pub fn is_pending(&self, event: TimerEvent) -> bool {
        self.pending.iter().any(|t| t.event == event)
    }

    /// Remove and return the earliest timer due at or before `now`
    pub fn pop_due(&mut self, now: f64) -> Option<(f64, TimerEvent)> {
        let (index, _) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= now)
            .min_by(|(_, a), (_, b)| {
                a.due_ms
                    .partial_cmp(&b.due_ms)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.seq.cmp(&b.seq))
            })?;
        let timer = self.pending.remove(index);
        Some((timer.due_ms, timer.event))
    }

    /// Drop everything (teardown)
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
