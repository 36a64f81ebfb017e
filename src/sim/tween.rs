//! Frame-driven tweens
//!
//! A tween interpolates one or more cup poses from an immutable snapshot
//! (`Track::from`) to a target over a fixed duration. The start time is
//! captured on the first frame it sees, and it settles exactly once, on the
//! frame where the elapsed fraction first reaches 1.

use super::state::{Cup, CupId, Pose};
use crate::{lerp, round_hundredths};

/// Which part of a pose a track drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// x and y
    Position,
    /// rotation, rounded to hundredths
    Rotation,
}

/// Snapshot of one cup's start and target pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Track {
    pub cup: CupId,
    pub from: Pose,
    pub to: Pose,
    pub channel: Channel,
}

impl Track {
    /// Pose at `fraction`, leaving the undriven channel at its snapshot value
    pub fn sample(&self, fraction: f32) -> Pose {
        if fraction >= 1.0 {
            return match self.channel {
                Channel::Position => Pose {
                    pos: self.to.pos,
                    rotate: self.from.rotate,
                },
                Channel::Rotation => Pose {
                    pos: self.from.pos,
                    rotate: self.to.rotate,
                },
            };
        }
        match self.channel {
            Channel::Position => Pose {
                pos: self.from.pos + (self.to.pos - self.from.pos) * fraction,
                rotate: self.from.rotate,
            },
            Channel::Rotation => Pose {
                pos: self.from.pos,
                rotate: round_hundredths(lerp(self.from.rotate, self.to.rotate, fraction)),
            },
        }
    }

    fn apply(&self, fraction: f32, cup: &mut Cup) {
        let pose = self.sample(fraction);
        match self.channel {
            Channel::Position => cup.pose.pos = pose.pos,
            Channel::Rotation => cup.pose.rotate = pose.rotate,
        }
    }
}

/// Lifecycle of a tween
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenState {
    /// No frame seen yet
    Pending,
    Running,
    /// Reached its target; never advances again
    Settled,
    /// Lost its surface; never advances or settles
    Stalled,
}

/// Result of advancing a tween by one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Poses were updated, more frames needed
    Running,
    /// Poses reached their targets on this frame. Reported once.
    Settled,
    /// Already settled or stalled, nothing changed
    Idle,
}

#[derive(Debug, Clone)]
pub struct Tween {
    tracks: Vec<Track>,
    duration_ms: f64,
    t0: Option<f64>,
    state: TweenState,
}

impl Tween {
    pub fn new(tracks: Vec<Track>, duration_ms: f64) -> Self {
        Self {
            tracks,
            duration_ms,
            t0: None,
            state: TweenState::Pending,
        }
    }

    /// Exchange the positions of two cups
    pub fn swap(a: &Cup, b: &Cup, duration_ms: f64) -> Self {
        let tracks = vec![
            Track {
                cup: a.id,
                from: a.pose,
                to: Pose {
                    pos: b.pose.pos,
                    rotate: a.pose.rotate,
                },
                channel: Channel::Position,
            },
            Track {
                cup: b.id,
                from: b.pose,
                to: Pose {
                    pos: a.pose.pos,
                    rotate: b.pose.rotate,
                },
                channel: Channel::Position,
            },
        ];
        Self::new(tracks, duration_ms)
    }

    /// Rotate one cup to `target` degrees
    pub fn rotate(cup: &Cup, target: f32, duration_ms: f64) -> Self {
        let track = Track {
            cup: cup.id,
            from: cup.pose,
            to: Pose {
                pos: cup.pose.pos,
                rotate: target,
            },
            channel: Channel::Rotation,
        };
        Self::new(vec![track], duration_ms)
    }

    pub fn state(&self) -> TweenState {
        self.state
    }

    pub fn is_settled(&self) -> bool {
        self.state == TweenState::Settled
    }

    /// Elapsed fraction at `now`, in [0, 1]. Zero before the first frame.
    pub fn fraction(&self, now: f64) -> f32 {
        let Some(t0) = self.t0 else {
            return 0.0;
        };
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now - t0) / self.duration_ms).clamp(0.0, 1.0) as f32
    }

    /// Advance to `now` and write the interpolated poses into `cups`
    pub fn advance(&mut self, now: f64, cups: &mut [Cup; 3]) -> Progress {
        match self.state {
            TweenState::Settled | TweenState::Stalled => return Progress::Idle,
            TweenState::Pending => {
                self.t0 = Some(now);
                self.state = TweenState::Running;
            }
            TweenState::Running => {}
        }

        let fraction = self.fraction(now);
        for track in &self.tracks {
            track.apply(fraction, &mut cups[track.cup.index()]);
        }

        if fraction >= 1.0 {
            self.state = TweenState::Settled;
            Progress::Settled
        } else {
            Progress::Running
        }
    }

    /// Stop for good without settling (the surface went away)
    pub fn stall(&mut self) {
        if self.state != TweenState::Settled {
            self.state = TweenState::Stalled;
        }
    }
}
