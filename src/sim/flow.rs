//! Round-flow choreography
//!
//! One round is a strictly ordered list of steps. The engine drives the front
//! step each frame and only moves on once it completes, so no two tweens or
//! holds ever overlap.

use std::collections::VecDeque;

use super::shuffle::Shuffle;
use super::tween::Tween;
use crate::config::{GameConfig, RoundTier};
use crate::consts::{ROTATE_MAX, ROTATE_MIN};

/// One step of a round, carrying its own runtime state once started
#[derive(Debug, Clone)]
pub enum Step {
    /// Clear hover/click latches and close interaction
    Prepare,
    /// Rotate the ball cup to `target` degrees
    Rotate {
        target: f32,
        duration_ms: f64,
        tween: Option<Tween>,
    },
    /// Wait in real time
    Hold { ms: f64, until: Option<f64> },
    Shuffle(Shuffle),
    /// Open interaction and start the pick countdown
    OpenWindow { seconds: u32 },
    /// Wait for the pick countdown to run out
    AwaitWindow,
    CloseWindow,
    /// Decide the outcome and move the state machine on
    Evaluate,
}

impl Step {
    fn rotate(target: f32, duration_ms: f64) -> Self {
        Step::Rotate {
            target,
            duration_ms,
            tween: None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Step::Prepare => "prepare",
            Step::Rotate { .. } => "rotate",
            Step::Hold { .. } => "hold",
            Step::Shuffle(_) => "shuffle",
            Step::OpenWindow { .. } => "open-window",
            Step::AwaitWindow => "await-window",
            Step::CloseWindow => "close-window",
            Step::Evaluate => "evaluate",
        }
    }

    /// The tween this step is driving, if any
    pub fn tween_mut(&mut self) -> Option<&mut Tween> {
        match self {
            Step::Rotate { tween, .. } => tween.as_mut(),
            Step::Shuffle(shuffle) => shuffle.current_tween_mut(),
            _ => None,
        }
    }
}

/// The remaining steps of the round in progress
#[derive(Debug, Clone)]
pub struct RoundFlow {
    steps: VecDeque<Step>,
    stalled: bool,
}

impl RoundFlow {
    /// reveal, hold, hide, shuffle, pick window, reveal, evaluate
    pub fn plan(tier: RoundTier, config: &GameConfig) -> Self {
        let reveal_ms = config.reveal_ms as f64;
        let steps = VecDeque::from(vec![
            Step::Prepare,
            Step::rotate(ROTATE_MAX, reveal_ms),
            Step::Hold {
                ms: config.reveal_hold_ms as f64,
                until: None,
            },
            Step::rotate(ROTATE_MIN, reveal_ms),
            Step::Shuffle(Shuffle::new(tier.shuffle_count, tier.speed_ms as f64)),
            Step::OpenWindow {
                seconds: config.pick_window_secs,
            },
            Step::AwaitWindow,
            Step::CloseWindow,
            Step::rotate(ROTATE_MAX, reveal_ms),
            Step::Evaluate,
        ]);
        Self {
            steps,
            stalled: false,
        }
    }

    pub fn current(&self) -> Option<&Step> {
        self.steps.front()
    }

    pub fn current_mut(&mut self) -> Option<&mut Step> {
        self.steps.front_mut()
    }

    /// Drop the finished front step
    pub fn complete_current(&mut self) -> Option<Step> {
        self.steps.pop_front()
    }

    pub fn is_finished(&self) -> bool {
        self.steps.is_empty()
    }

    /// True while a swap tween is mid-flight
    pub fn is_mid_swap(&self) -> bool {
        matches!(self.current(), Some(Step::Shuffle(s)) if s.is_swapping())
    }

    /// Freeze for good: the in-flight tween never settles
    pub fn stall(&mut self) {
        if let Some(tween) = self.current_mut().and_then(Step::tween_mut) {
            tween.stall();
        }
        self.stalled = true;
    }

    pub fn is_stalled(&self) -> bool {
        self.stalled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_order() {
        let config = GameConfig::default();
        let flow = RoundFlow::plan(RoundTier::new(4, 300), &config);
        let names: Vec<_> = flow.steps.iter().map(Step::name).collect();
        assert_eq!(
            names,
            vec![
                "prepare",
                "rotate",
                "hold",
                "rotate",
                "shuffle",
                "open-window",
                "await-window",
                "close-window",
                "rotate",
                "evaluate",
            ]
        );
        match &flow.steps[1] {
            Step::Rotate { target, .. } => assert_eq!(*target, ROTATE_MAX),
            other => panic!("unexpected {:?}", other),
        }
        match &flow.steps[3] {
            Step::Rotate { target, .. } => assert_eq!(*target, ROTATE_MIN),
            other => panic!("unexpected {:?}", other),
        }
        match &flow.steps[4] {
            Step::Shuffle(s) => assert_eq!(s.remaining(), 4),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_complete_walks_forward() {
        let config = GameConfig::default();
        let mut flow = RoundFlow::plan(RoundTier::new(1, 100), &config);
        let total = flow.steps.len();
        for _ in 0..total {
            assert!(!flow.is_finished());
            flow.complete_current();
        }
        assert!(flow.is_finished());
        assert!(flow.complete_current().is_none());
    }
}
