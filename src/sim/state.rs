//! Slot, layout and round state
//!
//! Everything the presentation shell reads lives here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Identity of one of the three cups. Identities never move; only their
/// coordinates and anchors do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CupId {
    Cup1,
    Cup2,
    Cup3,
}

impl CupId {
    pub const ALL: [CupId; 3] = [CupId::Cup1, CupId::Cup2, CupId::Cup3];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            CupId::Cup1 => 0,
            CupId::Cup2 => 1,
            CupId::Cup3 => 2,
        }
    }

    /// Anchor the cup starts every game on
    pub fn home_anchor(self) -> Anchor {
        match self {
            CupId::Cup1 => Anchor::TopLeft,
            CupId::Cup2 => Anchor::TopRight,
            CupId::Cup3 => Anchor::Bottom,
        }
    }
}

/// Fixed table positions a cup can rest on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Anchor {
    TopLeft,
    TopRight,
    Bottom,
}

/// Canvas dimensions in CSS pixels plus the device pixel ratio
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
    pub scale: f32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            scale: 1.0,
        }
    }
}

impl Layout {
    pub fn new(width: f32, height: f32, scale: f32) -> Self {
        Self {
            width,
            height,
            scale,
        }
    }

    /// Zero-sized canvases can't host a layout yet
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Bottom-left corner of a cup resting on `anchor`.
    /// Degenerate canvases lay everything out at the origin.
    pub fn anchor_position(&self, anchor: Anchor) -> Vec2 {
        if self.is_degenerate() {
            return Vec2::ZERO;
        }
        let (w, h) = (self.width, self.height);
        match anchor {
            Anchor::TopLeft => Vec2::new(w / 7.0 * 2.0 - CUP_BOTTOM_WIDTH / 2.0, h / 5.0 * 2.0),
            Anchor::TopRight => Vec2::new(w / 7.0 * 5.0 - CUP_BOTTOM_WIDTH / 2.0, h / 5.0 * 2.0),
            Anchor::Bottom => Vec2::new((w - CUP_BOTTOM_WIDTH) / 2.0, h / 5.0 * 4.0),
        }
    }
}

/// The tweened part of a cup
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub pos: Vec2,
    /// Degrees
    pub rotate: f32,
}

/// One cup slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cup {
    pub id: CupId,
    /// Anchor the cup rests on (or is travelling to, mid-swap it is the origin)
    pub anchor: Anchor,
    pub pose: Pose,
    pub is_hovered: bool,
    /// Latched on click during the pick window; cleared at the next round
    pub is_clicked: bool,
}

impl Cup {
    pub fn new(id: CupId) -> Self {
        Self {
            id,
            anchor: id.home_anchor(),
            pose: Pose::default(),
            is_hovered: false,
            is_clicked: false,
        }
    }

    pub fn clear_flags(&mut self) {
        self.is_hovered = false;
        self.is_clicked = false;
    }
}

/// A fresh set of three cups at the origin
pub fn new_cups() -> [Cup; 3] {
    CupId::ALL.map(Cup::new)
}

/// Discrete game state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GamePhase {
    /// Instructions panel, waiting for the player to start
    Welcome,
    /// 3-2-1 countdown before a round
    Countdown,
    /// Round flow running (reveal, shuffle, pick, reveal)
    GameStart,
    /// Round lost, life remains; waiting for "next round"
    LosingRound,
    /// Round won, waiting for "next round"
    WinningRound,
    /// Final round won
    Victory,
    /// Out of lives
    GameOver,
    /// Transient: counters reset, moves straight on to Countdown
    ResetGame,
}

/// Outcome text shown briefly after a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfoText {
    NothingClicked,
    FoundBall,
    WrongCup,
}

impl InfoText {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoText::NothingClicked => "You didn't click anything!",
            InfoText::FoundBall => "You found the ball!",
            InfoText::WrongCup => "Wrong cup!",
        }
    }
}

/// Taunts for the game over panel
pub const GAME_OVER_MESSAGES: [&str; 10] = [
    "Whoopsie-daisy!",
    "Nice try, butterfingers!",
    "So close, yet so far!",
    "Better luck next time, champ!",
    "Oops! Ball: 1, You: 0",
    "Aww, snap!",
    "Not your day, huh?",
    "Gotcha! (The ball, not you)",
    "Swing and a miss!",
    "Tough cookies!",
];

/// Things the shell may want to react to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged { from: GamePhase, to: GamePhase },
    RoundResolved {
        round: u32,
        won: bool,
        picked: Option<CupId>,
    },
    /// Victory countdown elapsed
    CloseModal,
}

/// Round, life and countdown bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundState {
    /// 1-based
    pub round: u32,
    pub max_round: u32,
    pub life: u32,
    pub max_life: u32,
    /// Seconds remaining, `None` when no countdown runs
    pub countdown: Option<u32>,
    pub phase: GamePhase,
    pub info_text: Option<InfoText>,
}

impl RoundState {
    pub fn new(max_round: u32, max_life: u32) -> Self {
        Self {
            round: 1,
            max_round,
            life: max_life,
            max_life,
            countdown: None,
            phase: GamePhase::Welcome,
            info_text: None,
        }
    }

    /// One bool per life point, filled from the left
    pub fn heart_states(&self) -> Vec<bool> {
        (0..self.max_life).map(|i| i < self.life).collect()
    }

    /// Returns false if already full
    pub fn add_life(&mut self) -> bool {
        if self.life < self.max_life {
            self.life += 1;
            true
        } else {
            false
        }
    }

    /// Returns false if already empty
    pub fn lose_life(&mut self) -> bool {
        if self.life > 0 {
            self.life -= 1;
            true
        } else {
            false
        }
    }

    /// Returns false at the round ceiling
    pub fn advance_round(&mut self) -> bool {
        if self.round < self.max_round {
            self.round += 1;
            true
        } else {
            false
        }
    }

    pub fn is_final_round(&self) -> bool {
        self.round >= self.max_round
    }

    /// Back to full life at round 1
    pub fn reset(&mut self) {
        self.round = 1;
        self.life = self.max_life;
        self.countdown = None;
        self.info_text = None;
    }
}
