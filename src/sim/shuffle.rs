//! Cup shuffling
//!
//! A shuffle is a plain loop of `iterations` swaps. Each swap picks two of the
//! three cups uniformly at random and runs a swap tween; the next swap only
//! begins once the previous one has settled.

use rand::Rng;

use super::state::{Cup, CupId};
use super::tween::{Progress, Tween};

/// Pick two distinct cups, uniformly over the three possible pairs.
/// The same pair may come up several times in a row.
pub fn pick_pair<R: Rng + ?Sized>(rng: &mut R) -> (CupId, CupId) {
    let left_out = rng.random_range(0..CupId::ALL.len());
    let mut picked = CupId::ALL
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != left_out)
        .map(|(_, id)| *id);
    match (picked.next(), picked.next()) {
        (Some(a), Some(b)) => (a, b),
        // Three cups always leave two
        _ => (CupId::Cup1, CupId::Cup2),
    }
}

/// Result of driving a shuffle for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShuffleStatus {
    Running,
    Done,
}

/// In-progress shuffle
#[derive(Debug, Clone)]
pub struct Shuffle {
    remaining: u32,
    speed_ms: f64,
    swaps_done: u32,
    current: Option<(CupId, CupId, Tween)>,
}

impl Shuffle {
    pub fn new(iterations: u32, speed_ms: f64) -> Self {
        Self {
            remaining: iterations,
            speed_ms,
            swaps_done: 0,
            current: None,
        }
    }

    pub fn swaps_done(&self) -> u32 {
        self.swaps_done
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// True while a swap tween is in flight
    pub fn is_swapping(&self) -> bool {
        self.current.is_some()
    }

    /// The in-flight swap, if any
    pub fn current_pair(&self) -> Option<(CupId, CupId)> {
        self.current.as_ref().map(|(a, b, _)| (*a, *b))
    }

    pub fn current_tween_mut(&mut self) -> Option<&mut Tween> {
        self.current.as_mut().map(|(_, _, tween)| tween)
    }

    /// Advance one frame. Starts the next swap if none is in flight.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        now: f64,
        cups: &mut [Cup; 3],
        rng: &mut R,
    ) -> ShuffleStatus {
        if self.current.is_none() {
            if self.remaining == 0 {
                return ShuffleStatus::Done;
            }
            let (a, b) = pick_pair(rng);
            let tween = Tween::swap(&cups[a.index()], &cups[b.index()], self.speed_ms);
            log::debug!(
                "Swap {} of {}: {:?} <-> {:?}",
                self.swaps_done + 1,
                self.swaps_done + self.remaining,
                a,
                b
            );
            self.current = Some((a, b, tween));
        }

        let Some((a, b, tween)) = self.current.as_mut() else {
            return ShuffleStatus::Running;
        };
        if tween.advance(now, cups) == Progress::Settled {
            let (ia, ib) = (a.index(), b.index());
            let anchor_a = cups[ia].anchor;
            cups[ia].anchor = cups[ib].anchor;
            cups[ib].anchor = anchor_a;

            self.current = None;
            self.remaining -= 1;
            self.swaps_done += 1;
        }

        if self.remaining == 0 && self.current.is_none() {
            ShuffleStatus::Done
        } else {
            ShuffleStatus::Running
        }
    }
}
