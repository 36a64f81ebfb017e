//! Game configuration
//!
//! Nothing here is persisted. The only runtime source is the page query string
//! (`?cheater=transparent,easy`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::CupId;

/// Swap count used by the `easy` cheat, regardless of round
pub const EASY_SHUFFLE_COUNT: u32 = 1;
/// Swap duration used by the `easy` cheat
pub const EASY_SPEED_MS: u32 = 800;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("max_round must be at least 1")]
    ZeroMaxRound,
    #[error("max_life must be at least 1")]
    ZeroMaxLife,
    #[error("round tier table is empty")]
    EmptyTierTable,
    #[error("round {round} has a zero swap speed")]
    ZeroSpeed { round: u32 },
    #[error("pick window must last at least one second")]
    ZeroWindow,
}

/// Shuffle difficulty for one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTier {
    /// Number of pairwise swaps
    pub shuffle_count: u32,
    /// Duration of a single swap (ms)
    pub speed_ms: u32,
}

impl RoundTier {
    pub const fn new(shuffle_count: u32, speed_ms: u32) -> Self {
        Self {
            shuffle_count,
            speed_ms,
        }
    }
}

/// Default tier table, indexed by round - 1. The last entry is the "crazy" tier.
pub const DEFAULT_TIERS: [RoundTier; 4] = [
    RoundTier::new(5, 400),
    RoundTier::new(8, 300),
    RoundTier::new(12, 200),
    RoundTier::new(20, 120),
];

/// Debug switches read from the page URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CheatModes {
    /// Render cups see-through so the ball stays visible
    pub transparent: bool,
    /// One slow swap per round
    pub easy: bool,
}

impl CheatModes {
    /// Parse a location search string such as `?cheater=transparent,easy`
    pub fn from_query(search: &str) -> Self {
        let mut modes = Self::default();
        let search = search.trim_start_matches('?');
        for pair in search.split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            if key != "cheater" {
                continue;
            }
            for mode in value.split(',') {
                match mode.trim() {
                    "transparent" => modes.transparent = true,
                    "easy" => modes.easy = true,
                    "" => {}
                    other => log::warn!("Unknown cheater mode: {}", other),
                }
            }
        }
        modes
    }

    pub fn any(&self) -> bool {
        self.transparent || self.easy
    }
}

/// Everything that shapes a game instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub max_round: u32,
    pub max_life: u32,
    /// Shuffle tiers, `tiers[round - 1]`. Independent of `max_round`.
    pub tiers: Vec<RoundTier>,
    /// Which cup hides the ball
    pub ball_cup: CupId,

    // === Timings ===
    /// Lift/lower rotation tween (ms)
    pub reveal_ms: u32,
    /// Pause with the ball shown before shuffling (ms)
    pub reveal_hold_ms: u32,
    /// Pre-round countdown (seconds)
    pub countdown_secs: u32,
    /// "START!" beat after the countdown hits zero (ms)
    pub start_beat_ms: u32,
    /// Interactive pick window (seconds)
    pub pick_window_secs: u32,
    /// How long the outcome text stays up (ms)
    pub info_text_ms: u32,
    /// Delay between life hitting zero and game over (ms)
    pub game_over_delay_ms: u32,
    /// Victory screen countdown before the modal closes (seconds)
    pub victory_close_secs: u32,

    pub cheats: CheatModes,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_round: 3,
            max_life: 3,
            tiers: DEFAULT_TIERS.to_vec(),
            ball_cup: CupId::Cup3,

            reveal_ms: 500,
            reveal_hold_ms: 1000,
            countdown_secs: 3,
            start_beat_ms: 500,
            pick_window_secs: 3,
            info_text_ms: 1000,
            game_over_delay_ms: 500,
            victory_close_secs: 10,

            cheats: CheatModes::default(),
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_cheats(mut self, cheats: CheatModes) -> Self {
        self.cheats = cheats;
        self
    }

    /// Check hard limits; log the soft ones
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_round == 0 {
            return Err(ConfigError::ZeroMaxRound);
        }
        if self.max_life == 0 {
            return Err(ConfigError::ZeroMaxLife);
        }
        if self.tiers.is_empty() {
            return Err(ConfigError::EmptyTierTable);
        }
        if let Some(i) = self.tiers.iter().position(|t| t.speed_ms == 0) {
            return Err(ConfigError::ZeroSpeed { round: i as u32 + 1 });
        }
        if self.pick_window_secs == 0 {
            return Err(ConfigError::ZeroWindow);
        }

        let table_len = self.tiers.len() as u32;
        if self.max_round > table_len {
            log::warn!(
                "max_round {} exceeds tier table ({} entries); rounds past it will not start",
                self.max_round,
                table_len
            );
        } else if table_len > self.max_round {
            log::warn!(
                "{} tier(s) unreachable with max_round {}",
                table_len - self.max_round,
                self.max_round
            );
        }
        Ok(())
    }

    /// Shuffle tier for a 1-based round, with cheats applied.
    /// `None` when the round is outside the table.
    pub fn tier_for(&self, round: u32) -> Option<RoundTier> {
        let index = round.checked_sub(1)? as usize;
        let tier = *self.tiers.get(index)?;
        if self.cheats.easy {
            return Some(RoundTier::new(EASY_SHUFFLE_COUNT, EASY_SPEED_MS));
        }
        Some(tier)
    }

    /// Load config for the current page (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let search = crate::platform::location_search().unwrap_or_default();
        let cheats = CheatModes::from_query(&search);
        if cheats.any() {
            log::info!("Cheater modes active: {:?}", cheats);
        }
        Self::default().with_cheats(cheats)
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
