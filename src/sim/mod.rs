//! Game simulation module
//!
//! All gameplay logic lives here. Time only enters through `Engine::tick`,
//! randomness only through the engine's seeded RNG, and drawing only through
//! the `Surface` trait, so a whole game replays identically in tests.

pub mod engine;
pub mod flow;
pub mod hit;
pub mod shuffle;
pub mod state;
pub mod timers;
pub mod tween;

pub use engine::{Engine, LOSING_ROUND_FLOOR};
pub use flow::{RoundFlow, Step};
pub use hit::is_point_in_shape;
pub use shuffle::{Shuffle, ShuffleStatus, pick_pair};
pub use state::{
    Anchor, Cup, CupId, GAME_OVER_MESSAGES, GameEvent, GamePhase, InfoText, Layout, Pose,
    RoundState, new_cups,
};
pub use timers::{TimerEvent, Timers};
pub use tween::{Channel, Progress, Track, Tween, TweenState};
