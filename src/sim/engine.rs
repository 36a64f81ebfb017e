//! The shell-game engine
//!
//! One `Engine` per minigame mount. It owns the cups, the round/life state,
//! the interactivity gate, the last hit-test paths and every timer, so nothing
//! leaks between instances.
//!
//! Time comes in through [`Engine::tick`], once per display frame. Real-time
//! timers (countdowns, holds, the life watcher) fire first, then the round
//! flow advances, then the surface is repainted if anything moved.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::flow::{RoundFlow, Step};
use super::hit::is_point_in_shape;
use super::shuffle::ShuffleStatus;
use super::state::{
    Cup, CupId, GAME_OVER_MESSAGES, GameEvent, GamePhase, InfoText, Layout, RoundState, new_cups,
};
use super::timers::{TimerEvent, Timers};
use super::tween::{Progress, Tween};
use crate::config::{ConfigError, GameConfig};
use crate::consts::BACKGROUND_ALPHA;
use crate::renderer::{CupFlags, Paint, Path, Surface, colors, draw_cup_set};

/// A losing round only shows the "next round" panel while the life before the
/// loss was above this. At the floor, the life watcher takes the game over.
pub const LOSING_ROUND_FLOOR: u32 = 1;

/// What the shared countdown is counting for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CountdownKind {
    /// 3-2-1 before a round
    PreRound,
    /// Interactive pick window
    PickWindow,
    /// Victory screen, closes the modal at zero
    Victory,
}

enum StepResult {
    Done,
    Blocked,
    Stall,
}

pub struct Engine {
    config: GameConfig,
    rng: Pcg32,
    cups: [Cup; 3],
    layout: Layout,
    layout_dirty: bool,
    state: RoundState,
    /// Clicks and hovers only count while this is set
    interactive: bool,
    /// Last rendered cup outlines, by cup index
    hit_paths: [Option<Path>; 3],
    flow: Option<RoundFlow>,
    timers: Timers,
    countdown_kind: Option<CountdownKind>,
    events: Vec<GameEvent>,
    close_modal: Option<Box<dyn FnMut()>>,
    game_over_message: Option<&'static str>,
    now: f64,
    needs_repaint: bool,
    torn_down: bool,
}

impl Engine {
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = RoundState::new(config.max_round, config.max_life);
        Ok(Self {
            config,
            rng: Pcg32::seed_from_u64(seed),
            cups: new_cups(),
            layout: Layout::default(),
            layout_dirty: false,
            state,
            interactive: false,
            hit_paths: [None, None, None],
            flow: None,
            timers: Timers::new(),
            countdown_kind: None,
            events: Vec::new(),
            close_modal: None,
            game_over_message: None,
            now: 0.0,
            needs_repaint: true,
            torn_down: false,
        })
    }

    /// Called when the victory countdown runs out
    pub fn set_close_modal(&mut self, callback: impl FnMut() + 'static) {
        self.close_modal = Some(Box::new(callback));
    }

    // === Observables ===

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn round(&self) -> u32 {
        self.state.round
    }

    pub fn max_round(&self) -> u32 {
        self.state.max_round
    }

    pub fn life(&self) -> u32 {
        self.state.life
    }

    pub fn max_life(&self) -> u32 {
        self.state.max_life
    }

    pub fn heart_states(&self) -> Vec<bool> {
        self.state.heart_states()
    }

    /// Seconds left on whichever countdown is running
    pub fn countdown(&self) -> Option<u32> {
        self.state.countdown
    }

    pub fn info_text(&self) -> Option<&'static str> {
        self.state.info_text.map(|t| t.as_str())
    }

    pub fn game_over_message(&self) -> Option<&'static str> {
        self.game_over_message
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn cups(&self) -> &[Cup; 3] {
        &self.cups
    }

    pub fn cup(&self, id: CupId) -> &Cup {
        &self.cups[id.index()]
    }

    pub fn ball_cup(&self) -> CupId {
        self.config.ball_cup
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Whether a round flow is in progress (possibly stalled)
    pub fn is_round_running(&self) -> bool {
        self.flow.is_some()
    }

    /// Name of the round-flow step in progress
    pub fn current_step(&self) -> Option<&'static str> {
        self.flow.as_ref().and_then(|f| f.current()).map(Step::name)
    }

    pub fn is_stalled(&self) -> bool {
        self.flow.as_ref().is_some_and(RoundFlow::is_stalled)
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Take queued events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Topmost cup under a point, against the last rendered outlines
    pub fn hit_test(&self, x: f32, y: f32) -> Option<CupId> {
        (0..self.cups.len())
            .rev()
            .find(|&i| is_point_in_shape(x, y, self.hit_paths[i].as_ref()))
            .map(|i| self.cups[i].id)
    }

    // === Intents from the presentation shell ===

    /// Dismiss the welcome panel
    pub fn start_game(&mut self) -> bool {
        if self.torn_down || self.state.phase != GamePhase::Welcome {
            return false;
        }
        log::info!("Game started");
        self.enter_countdown();
        true
    }

    /// Latch a pick. Ignored outside the pick window and after the first pick.
    pub fn on_cup_click(&mut self, x: f32, y: f32) -> Option<CupId> {
        if self.torn_down || !self.interactive {
            return None;
        }
        if self.cups.iter().any(|c| c.is_clicked) {
            return None;
        }
        let id = self.hit_test(x, y)?;
        self.cups[id.index()].is_clicked = true;
        self.needs_repaint = true;
        log::debug!("Picked {:?}", id);
        Some(id)
    }

    /// Update hover highlights. Never touches the click latch.
    pub fn on_cup_hover(&mut self, x: f32, y: f32) {
        if self.torn_down || !self.interactive {
            return;
        }
        let hovered = self.hit_test(x, y);
        for cup in &mut self.cups {
            let is_hovered = hovered == Some(cup.id);
            if cup.is_hovered != is_hovered {
                cup.is_hovered = is_hovered;
                self.needs_repaint = true;
            }
        }
    }

    pub fn request_next_round(&mut self) -> bool {
        if self.torn_down
            || !matches!(
                self.state.phase,
                GamePhase::LosingRound | GamePhase::WinningRound
            )
        {
            return false;
        }
        self.enter_countdown();
        true
    }

    /// "Try again" from the game over or victory panel
    pub fn request_retry(&mut self) -> bool {
        if self.torn_down
            || !matches!(self.state.phase, GamePhase::GameOver | GamePhase::Victory)
        {
            return false;
        }
        self.reset_game();
        true
    }

    /// Start over from any point after the welcome panel
    pub fn request_reset(&mut self) -> bool {
        if self.torn_down || self.state.phase == GamePhase::Welcome {
            return false;
        }
        self.reset_game();
        true
    }

    /// New canvas size. Rescales the surface; cups re-snap to their anchors as
    /// soon as no swap is in flight.
    pub fn resize(&mut self, width: f32, height: f32, scale: f32, surface: Option<&mut dyn Surface>) {
        if self.torn_down {
            return;
        }
        self.layout = Layout::new(width, height, scale);
        if let Some(surface) = surface {
            surface.resize(width, height, scale);
        }
        if self.layout.is_degenerate() {
            log::debug!("Degenerate canvas {}x{}, deferring layout", width, height);
        }
        self.layout_dirty = true;
        self.needs_repaint = true;
        self.apply_layout();
    }

    /// The minigame is going away. Cancels every timer and the round flow.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.timers.clear();
        self.flow = None;
        self.interactive = false;
        self.countdown_kind = None;
        self.state.countdown = None;
        self.close_modal = None;
        log::info!("Minigame torn down");
    }

    // === Frame driver ===

    /// Advance to `now` (ms). `None` means the surface is unavailable this
    /// frame: a tween that needs it stalls for good.
    pub fn tick(&mut self, now: f64, surface: Option<&mut dyn Surface>) {
        if self.torn_down {
            return;
        }
        self.run_timers(now);
        self.now = now;
        self.apply_layout();

        match surface {
            Some(surface) => {
                self.advance_flow(now, true);
                if self.needs_repaint {
                    self.paint(surface);
                }
            }
            None => self.advance_flow(now, false),
        }
    }

    fn run_timers(&mut self, now: f64) {
        while let Some((at, event)) = self.timers.pop_due(now) {
            // Chain follow-ups from the due time, not the frame time
            self.now = at;
            self.on_timer(event);
        }
    }

    fn on_timer(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::CountdownTick => {
                let Some(kind) = self.countdown_kind else {
                    return;
                };
                let remaining = self.state.countdown.unwrap_or(0).saturating_sub(1);
                self.state.countdown = Some(remaining);
                if remaining > 0 {
                    self.timers.schedule(self.now, 1000.0, TimerEvent::CountdownTick);
                } else {
                    self.countdown_finished(kind);
                }
            }
            TimerEvent::StartBeat => {
                if self.state.phase != GamePhase::Countdown {
                    return;
                }
                self.state.countdown = None;
                self.set_phase(GamePhase::GameStart);
                self.begin_round();
            }
            TimerEvent::ClearInfoText => self.state.info_text = None,
            TimerEvent::LifeWatcher => {
                if self.state.life != 0 || self.state.phase == GamePhase::GameOver {
                    return;
                }
                let message = GAME_OVER_MESSAGES[self.rng.random_range(0..GAME_OVER_MESSAGES.len())];
                self.game_over_message = Some(message);
                self.flow = None;
                self.interactive = false;
                self.set_phase(GamePhase::GameOver);
                log::info!("Game over on round {}", self.state.round);
            }
        }
    }

    fn start_countdown(&mut self, kind: CountdownKind, seconds: u32) {
        self.timers.cancel_event(TimerEvent::CountdownTick);
        self.countdown_kind = Some(kind);
        self.state.countdown = Some(seconds);
        if seconds == 0 {
            self.countdown_finished(kind);
        } else {
            self.timers.schedule(self.now, 1000.0, TimerEvent::CountdownTick);
        }
    }

    fn countdown_finished(&mut self, kind: CountdownKind) {
        self.countdown_kind = None;
        match kind {
            CountdownKind::PreRound => {
                // Zero stays up as "START!" for a beat
                self.timers
                    .schedule(self.now, self.config.start_beat_ms as f64, TimerEvent::StartBeat);
            }
            CountdownKind::PickWindow => {
                self.state.countdown = None;
                self.interactive = false;
            }
            CountdownKind::Victory => {
                self.state.countdown = None;
                self.events.push(GameEvent::CloseModal);
                log::info!("Victory countdown elapsed, closing");
                if let Some(close) = self.close_modal.as_mut() {
                    close();
                }
            }
        }
    }

    fn enter_countdown(&mut self) {
        self.timers.cancel_event(TimerEvent::StartBeat);
        self.set_phase(GamePhase::Countdown);
        self.start_countdown(CountdownKind::PreRound, self.config.countdown_secs);
    }

    fn begin_round(&mut self) {
        let round = self.state.round;
        let Some(tier) = self.config.tier_for(round) else {
            log::error!(
                "No shuffle tier for round {} ({} configured); round not started",
                round,
                self.config.tiers.len()
            );
            return;
        };
        log::info!(
            "Round {} of {}: {} swaps at {} ms",
            round,
            self.state.max_round,
            tier.shuffle_count,
            tier.speed_ms
        );
        self.flow = Some(RoundFlow::plan(tier, &self.config));
    }

    fn advance_flow(&mut self, now: f64, surface_ready: bool) {
        let Some(mut flow) = self.flow.take() else {
            return;
        };
        if flow.is_stalled() {
            self.flow = Some(flow);
            return;
        }

        loop {
            let Some(step) = flow.current_mut() else {
                break;
            };
            let result = match step {
                Step::Prepare => {
                    for cup in &mut self.cups {
                        cup.clear_flags();
                    }
                    self.interactive = false;
                    self.needs_repaint = true;
                    StepResult::Done
                }
                Step::Rotate {
                    target,
                    duration_ms,
                    tween,
                } => {
                    if !surface_ready {
                        StepResult::Stall
                    } else {
                        let ball = &self.cups[self.config.ball_cup.index()];
                        let tween =
                            tween.get_or_insert_with(|| Tween::rotate(ball, *target, *duration_ms));
                        self.needs_repaint = true;
                        match tween.advance(now, &mut self.cups) {
                            Progress::Running => StepResult::Blocked,
                            Progress::Settled | Progress::Idle => StepResult::Done,
                        }
                    }
                }
                Step::Hold { ms, until } => {
                    let until = *until.get_or_insert(now + *ms);
                    if now >= until {
                        StepResult::Done
                    } else {
                        StepResult::Blocked
                    }
                }
                Step::Shuffle(shuffle) => {
                    if !surface_ready {
                        StepResult::Stall
                    } else {
                        if !shuffle.is_swapping() {
                            self.ensure_positions();
                        }
                        self.needs_repaint = true;
                        match shuffle.step(now, &mut self.cups, &mut self.rng) {
                            ShuffleStatus::Running => StepResult::Blocked,
                            ShuffleStatus::Done => StepResult::Done,
                        }
                    }
                }
                Step::OpenWindow { seconds } => {
                    let seconds = *seconds;
                    self.interactive = true;
                    self.start_countdown(CountdownKind::PickWindow, seconds);
                    StepResult::Done
                }
                Step::AwaitWindow => {
                    if self.countdown_kind == Some(CountdownKind::PickWindow) {
                        StepResult::Blocked
                    } else {
                        StepResult::Done
                    }
                }
                Step::CloseWindow => {
                    self.interactive = false;
                    for cup in &mut self.cups {
                        cup.is_hovered = false;
                    }
                    self.needs_repaint = true;
                    StepResult::Done
                }
                Step::Evaluate => {
                    self.evaluate();
                    StepResult::Done
                }
            };

            match result {
                StepResult::Done => {
                    flow.complete_current();
                }
                StepResult::Blocked => break,
                StepResult::Stall => {
                    log::debug!("Surface unavailable; round flow stalled");
                    flow.stall();
                    break;
                }
            }
        }

        if !flow.is_finished() {
            self.flow = Some(flow);
        }
    }

    fn evaluate(&mut self) {
        let ball = self.config.ball_cup;
        let picked = self.cups.iter().find(|c| c.is_clicked).map(|c| c.id);
        let won = self.cups[ball.index()].is_clicked;
        let info = match picked {
            None => InfoText::NothingClicked,
            Some(_) if won => InfoText::FoundBall,
            Some(_) => InfoText::WrongCup,
        };
        self.show_info(info);

        let round = self.state.round;
        log::info!("Round {}: {} (picked {:?})", round, info.as_str(), picked);
        self.events.push(GameEvent::RoundResolved { round, won, picked });

        if !won {
            let life_before = self.state.life;
            self.lose_life();
            if life_before > LOSING_ROUND_FLOOR {
                self.set_phase(GamePhase::LosingRound);
            }
        } else if self.state.is_final_round() {
            self.set_phase(GamePhase::Victory);
            self.start_countdown(CountdownKind::Victory, self.config.victory_close_secs);
        } else {
            self.state.advance_round();
            self.set_phase(GamePhase::WinningRound);
        }
    }

    fn lose_life(&mut self) {
        if self.state.lose_life()
            && self.state.life == 0
            && !self.timers.is_pending(TimerEvent::LifeWatcher)
        {
            self.timers.schedule(
                self.now,
                self.config.game_over_delay_ms as f64,
                TimerEvent::LifeWatcher,
            );
        }
    }

    fn show_info(&mut self, info: InfoText) {
        self.state.info_text = Some(info);
        self.timers.cancel_event(TimerEvent::ClearInfoText);
        self.timers
            .schedule(self.now, self.config.info_text_ms as f64, TimerEvent::ClearInfoText);
    }

    fn set_phase(&mut self, to: GamePhase) {
        let from = self.state.phase;
        if from == to {
            return;
        }
        log::debug!("Phase {:?} -> {:?}", from, to);
        self.state.phase = to;
        self.events.push(GameEvent::PhaseChanged { from, to });
    }

    fn reset_game(&mut self) {
        self.timers.clear();
        self.flow = None;
        self.countdown_kind = None;
        self.interactive = false;
        self.game_over_message = None;

        self.set_phase(GamePhase::ResetGame);
        self.state.reset();
        for cup in &mut self.cups {
            cup.clear_flags();
            cup.anchor = cup.id.home_anchor();
            cup.pose.rotate = 0.0;
        }
        self.layout_dirty = true;
        self.needs_repaint = true;
        log::info!("Game reset");

        self.enter_countdown();
    }

    /// Place cups on their anchors if they were never placed
    fn ensure_positions(&mut self) {
        if self.cups.iter().all(|c| c.pose.pos == Vec2::ZERO) {
            for cup in &mut self.cups {
                cup.pose.pos = self.layout.anchor_position(cup.anchor);
            }
        }
    }

    fn apply_layout(&mut self) {
        if !self.layout_dirty || self.flow.as_ref().is_some_and(RoundFlow::is_mid_swap) {
            return;
        }
        for cup in &mut self.cups {
            cup.pose.pos = self.layout.anchor_position(cup.anchor);
        }
        self.layout_dirty = false;
        self.needs_repaint = true;
    }

    fn paint(&mut self, surface: &mut dyn Surface) {
        let Layout { width, height, .. } = self.layout;
        surface.clear(width, height);
        surface.fill(
            &Path::rect(Vec2::ZERO, Vec2::new(width, height)),
            Paint::new(colors::BACKGROUND, BACKGROUND_ALPHA),
        );

        for cup in &self.cups {
            let flags = CupFlags {
                has_ball: cup.id == self.config.ball_cup,
                hovered: cup.is_hovered,
                picked: cup.is_clicked,
                see_through: self.config.cheats.transparent,
            };
            let outline = draw_cup_set(surface, cup.pose.pos, cup.pose.rotate, flags);
            self.hit_paths[cup.id.index()] = Some(outline);
        }
        self.needs_repaint = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CheatModes, RoundTier};
    use crate::renderer::RecordingSurface;
    use crate::sim::state::Anchor;
    use std::cell::Cell;
    use std::rc::Rc;

    const FRAME_MS: f64 = 16.0;
    const LIMIT_MS: f64 = 120_000.0;

    #[derive(Clone, Copy)]
    enum Pick {
        Ball,
        Wrong,
        Nothing,
    }

    struct Harness {
        engine: Engine,
        surface: RecordingSurface,
        now: f64,
    }

    impl Harness {
        fn new(config: GameConfig) -> Self {
            let mut engine = Engine::new(config, 42).unwrap();
            let mut surface = RecordingSurface::new();
            engine.resize(700.0, 500.0, 1.0, Some(&mut surface));
            engine.tick(0.0, Some(&mut surface));
            Self {
                engine,
                surface,
                now: 0.0,
            }
        }

        fn frame(&mut self) {
            self.now += FRAME_MS;
            self.engine.tick(self.now, Some(&mut self.surface));
        }

        fn advance(&mut self, ms: f64) {
            let end = self.now + ms;
            while self.now < end {
                self.frame();
            }
        }

        fn drain_then_advance(&mut self, ms: f64) {
            self.engine.drain_events();
            self.advance(ms);
        }

        fn run_until(&mut self, pred: impl Fn(&Engine) -> bool) -> bool {
            let end = self.now + LIMIT_MS;
            while self.now < end {
                if pred(&self.engine) {
                    return true;
                }
                self.frame();
            }
            pred(&self.engine)
        }

        /// Somewhere inside a resting cup's body
        fn cup_center(&self, id: CupId) -> Vec2 {
            self.engine.cup(id).pose.pos + Vec2::new(50.0, -60.0)
        }

        /// From a countdown, play one round to its evaluation
        fn play_round(&mut self, pick: Pick) {
            assert!(self.run_until(Engine::is_interactive), "pick window never opened");
            let ball = self.engine.ball_cup();
            let target = match pick {
                Pick::Ball => Some(ball),
                Pick::Wrong => CupId::ALL.into_iter().find(|&id| id != ball),
                Pick::Nothing => None,
            };
            if let Some(id) = target {
                let p = self.cup_center(id);
                assert_eq!(self.engine.on_cup_click(p.x, p.y), Some(id));
            }
            assert!(self.run_until(|e| !e.is_round_running()), "round never resolved");
        }
    }

    fn phases(events: &[GameEvent]) -> Vec<GamePhase> {
        events
            .iter()
            .filter_map(|e| match e {
                GameEvent::PhaseChanged { to, .. } => Some(*to),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_starts_at_welcome() {
        let h = Harness::new(GameConfig::default());
        assert_eq!(h.engine.phase(), GamePhase::Welcome);
        assert_eq!(h.engine.round(), 1);
        assert_eq!(h.engine.life(), 3);
        assert_eq!(h.engine.heart_states(), vec![true, true, true]);
        assert!(!h.engine.is_interactive());
        assert!(h.engine.countdown().is_none());
    }

    #[test]
    fn test_countdown_then_start_beat() {
        let mut h = Harness::new(GameConfig::default());
        assert!(h.engine.start_game());
        assert!(!h.engine.start_game());
        assert_eq!(h.engine.phase(), GamePhase::Countdown);
        assert_eq!(h.engine.countdown(), Some(3));

        h.advance(1000.0);
        assert_eq!(h.engine.countdown(), Some(2));
        h.advance(2000.0);
        // "START!" beat
        assert_eq!(h.engine.countdown(), Some(0));
        assert_eq!(h.engine.phase(), GamePhase::Countdown);

        h.advance(500.0);
        assert_eq!(h.engine.phase(), GamePhase::GameStart);
        assert!(h.engine.countdown().is_none());
        assert!(h.engine.is_round_running());
    }

    #[test]
    fn test_clicks_ignored_until_pick_window() {
        let mut h = Harness::new(GameConfig::default());
        h.engine.start_game();
        while !h.engine.is_interactive() {
            for id in CupId::ALL {
                let p = h.cup_center(id);
                assert_eq!(h.engine.on_cup_click(p.x, p.y), None);
                h.engine.on_cup_hover(p.x, p.y);
            }
            assert!(h.engine.cups().iter().all(|c| !c.is_clicked && !c.is_hovered));
            h.frame();
            assert!(h.now < LIMIT_MS);
        }
        assert_eq!(h.engine.current_step(), Some("await-window"));
        assert_eq!(h.engine.countdown(), Some(3));
    }

    #[test]
    fn test_first_click_latches() {
        let mut h = Harness::new(GameConfig::default());
        h.engine.start_game();
        assert!(h.run_until(Engine::is_interactive));

        let ball = h.engine.ball_cup();
        let other = CupId::ALL.into_iter().find(|&id| id != ball).unwrap();
        let p = h.cup_center(other);
        assert_eq!(h.engine.on_cup_click(p.x, p.y), Some(other));
        let q = h.cup_center(ball);
        assert_eq!(h.engine.on_cup_click(q.x, q.y), None);

        // Hover moves, the pick stays
        h.engine.on_cup_hover(q.x, q.y);
        assert!(h.engine.cup(ball).is_hovered);
        assert!(!h.engine.cup(other).is_hovered);
        assert!(h.engine.cup(other).is_clicked);
        assert!(!h.engine.cup(ball).is_clicked);

        assert!(h.run_until(|e| !e.is_round_running()));
        assert_eq!(h.engine.info_text(), Some(InfoText::WrongCup.as_str()));
        assert_eq!(h.engine.life(), 2);
    }

    #[test]
    fn test_pick_window_closes() {
        let mut h = Harness::new(GameConfig::default());
        h.engine.start_game();
        assert!(h.run_until(Engine::is_interactive));
        let opened = h.now;
        assert!(h.run_until(|e| !e.is_interactive()));
        assert!(h.now - opened >= 3000.0 - FRAME_MS);
        assert!(h.now - opened <= 3000.0 + 2.0 * FRAME_MS);

        let p = h.cup_center(h.engine.ball_cup());
        assert_eq!(h.engine.on_cup_click(p.x, p.y), None);
    }

    #[test]
    fn test_losing_all_lives_ends_game() {
        let mut h = Harness::new(GameConfig::default());
        h.engine.start_game();

        h.play_round(Pick::Wrong);
        assert_eq!(h.engine.life(), 2);
        assert_eq!(h.engine.phase(), GamePhase::LosingRound);
        assert!(h.engine.request_next_round());

        h.play_round(Pick::Nothing);
        assert_eq!(h.engine.info_text(), Some(InfoText::NothingClicked.as_str()));
        assert_eq!(h.engine.life(), 1);
        assert_eq!(h.engine.phase(), GamePhase::LosingRound);
        assert_eq!(h.engine.round(), 1);
        assert!(h.engine.request_next_round());

        h.play_round(Pick::Wrong);
        assert_eq!(h.engine.life(), 0);
        assert_eq!(h.engine.heart_states(), vec![false, false, false]);
        // No losing panel; the life watcher takes over
        assert_eq!(h.engine.phase(), GamePhase::GameStart);
        assert!(!h.engine.request_next_round());

        h.advance(400.0);
        assert_eq!(h.engine.phase(), GamePhase::GameStart);
        h.advance(200.0);
        assert_eq!(h.engine.phase(), GamePhase::GameOver);
        let message = h.engine.game_over_message().unwrap();
        assert!(GAME_OVER_MESSAGES.contains(&message));
    }

    #[test]
    fn test_winning_every_round_is_victory() {
        let mut h = Harness::new(GameConfig::default());
        let closed = Rc::new(Cell::new(0));
        let counter = closed.clone();
        h.engine.set_close_modal(move || counter.set(counter.get() + 1));
        h.engine.start_game();

        h.play_round(Pick::Ball);
        assert_eq!(h.engine.info_text(), Some(InfoText::FoundBall.as_str()));
        assert_eq!(h.engine.phase(), GamePhase::WinningRound);
        assert_eq!(h.engine.round(), 2);
        h.engine.request_next_round();

        h.play_round(Pick::Ball);
        assert_eq!(h.engine.phase(), GamePhase::WinningRound);
        assert_eq!(h.engine.round(), 3);
        h.engine.request_next_round();

        h.play_round(Pick::Ball);
        assert_eq!(h.engine.phase(), GamePhase::Victory);
        assert_eq!(h.engine.round(), 3);
        assert_eq!(h.engine.life(), 3);
        assert_eq!(h.engine.countdown(), Some(10));

        h.drain_then_advance(9_000.0);
        assert_eq!(closed.get(), 0);
        h.advance(1_100.0);
        assert_eq!(closed.get(), 1);
        assert!(h.engine.drain_events().contains(&GameEvent::CloseModal));
    }

    #[test]
    fn test_round_events_reported() {
        let mut h = Harness::new(GameConfig::default());
        h.engine.start_game();
        h.play_round(Pick::Ball);
        let events = h.engine.drain_events();
        assert!(events.contains(&GameEvent::RoundResolved {
            round: 1,
            won: true,
            picked: Some(CupId::Cup3),
        }));
        assert_eq!(
            phases(&events),
            vec![GamePhase::Countdown, GamePhase::GameStart, GamePhase::WinningRound]
        );
    }

    #[test]
    fn test_fourth_round_reachable() {
        let mut config = GameConfig::default();
        config.max_round = 4;
        let mut h = Harness::new(config);
        h.engine.start_game();
        for round in 1..=3 {
            h.play_round(Pick::Ball);
            assert_eq!(h.engine.round(), round + 1);
            h.engine.request_next_round();
        }
        assert!(h.run_until(|e| e.current_step() == Some("shuffle")));
        h.play_round(Pick::Ball);
        assert_eq!(h.engine.phase(), GamePhase::Victory);
    }

    #[test]
    fn test_round_outside_tier_table_does_not_start() {
        let mut config = GameConfig::default();
        config.max_round = 2;
        config.tiers = vec![RoundTier::new(2, 100)];
        let mut h = Harness::new(config);
        h.engine.start_game();
        h.play_round(Pick::Ball);
        assert_eq!(h.engine.round(), 2);
        h.engine.request_next_round();

        assert!(h.run_until(|e| e.phase() == GamePhase::GameStart));
        assert!(!h.engine.is_round_running());
        h.advance(5_000.0);
        assert_eq!(h.engine.phase(), GamePhase::GameStart);
        assert!(!h.engine.is_interactive());
    }

    #[test]
    fn test_easy_cheat_single_swap() {
        let config = GameConfig::default().with_cheats(CheatModes {
            easy: true,
            transparent: true,
        });
        let mut h = Harness::new(config);
        h.engine.start_game();
        assert!(h.run_until(|e| e.current_step() == Some("shuffle")));
        let start = h.now;
        assert!(h.run_until(Engine::is_interactive));
        // One 800 ms swap
        assert!(h.now - start >= 800.0 - FRAME_MS);
        assert!(h.now - start <= 800.0 + 2.0 * FRAME_MS);
    }

    #[test]
    fn test_retry_after_game_over() {
        let mut config = GameConfig::default();
        config.max_life = 1;
        let mut h = Harness::new(config);
        h.engine.start_game();
        h.play_round(Pick::Wrong);
        assert!(h.run_until(|e| e.phase() == GamePhase::GameOver));
        h.engine.drain_events();

        assert!(h.engine.request_retry());
        assert_eq!(h.engine.phase(), GamePhase::Countdown);
        assert_eq!(h.engine.life(), 1);
        assert_eq!(h.engine.round(), 1);
        assert!(h.engine.game_over_message().is_none());
        assert_eq!(
            phases(&h.engine.drain_events()),
            vec![GamePhase::ResetGame, GamePhase::Countdown]
        );
        assert!(h.run_until(|e| e.phase() == GamePhase::GameStart));
    }

    #[test]
    fn test_reset_mid_round_cancels_flow() {
        let mut h = Harness::new(GameConfig::default());
        assert!(!h.engine.request_reset());
        h.engine.start_game();
        assert!(h.run_until(|e| e.current_step() == Some("shuffle")));
        h.advance(100.0);

        assert!(h.engine.request_reset());
        assert!(!h.engine.is_round_running());
        assert_eq!(h.engine.phase(), GamePhase::Countdown);
        assert_eq!(h.engine.countdown(), Some(3));
        // Cups go back on their anchors once nothing is in flight
        h.frame();
        let layout = h.engine.layout();
        for cup in h.engine.cups() {
            assert_eq!(cup.pose.pos, layout.anchor_position(cup.anchor));
            assert_eq!(cup.pose.rotate, 0.0);
        }
    }

    fn home_anchors() -> Vec<Anchor> {
        CupId::ALL.into_iter().map(CupId::home_anchor).collect()
    }

    fn anchors(engine: &Engine) -> Vec<Anchor> {
        engine.cups().iter().map(|c| c.anchor).collect()
    }

    #[test]
    fn test_reset_restores_home_anchors() {
        let mut h = Harness::new(GameConfig::default());
        h.engine.start_game();
        h.play_round(Pick::Ball);
        assert_eq!(h.engine.phase(), GamePhase::WinningRound);

        assert!(h.engine.request_reset());
        h.frame();
        assert_eq!(anchors(&h.engine), home_anchors());
        let layout = h.engine.layout();
        for cup in h.engine.cups() {
            assert_eq!(cup.pose.pos, layout.anchor_position(cup.id.home_anchor()));
        }
    }

    #[test]
    fn test_retry_restores_home_anchors() {
        let mut config = GameConfig::default();
        config.max_life = 1;
        let mut h = Harness::new(config);
        h.engine.start_game();
        h.play_round(Pick::Wrong);
        assert!(h.run_until(|e| e.phase() == GamePhase::GameOver));

        assert!(h.engine.request_retry());
        h.frame();
        assert_eq!(anchors(&h.engine), home_anchors());
        let ball = h.engine.ball_cup();
        assert_eq!(h.engine.cup(ball).anchor, Anchor::Bottom);
    }

    #[test]
    fn test_hover_cleared_when_window_closes() {
        let mut h = Harness::new(GameConfig::default());
        h.engine.start_game();
        assert!(h.run_until(Engine::is_interactive));

        let p = h.cup_center(CupId::Cup1);
        h.engine.on_cup_hover(p.x, p.y);
        assert!(h.engine.cup(CupId::Cup1).is_hovered);

        assert!(h.run_until(|e| !e.is_interactive()));
        h.frame();
        assert!(h.engine.cups().iter().all(|c| !c.is_hovered));
        assert!(h.surface.fills().iter().all(|f| f.paint.color != colors::CUP_HOVER));
    }

    #[test]
    fn test_info_text_clears() {
        let mut h = Harness::new(GameConfig::default());
        h.engine.start_game();
        h.play_round(Pick::Nothing);
        assert!(h.engine.info_text().is_some());
        h.advance(1_100.0);
        assert!(h.engine.info_text().is_none());
    }

    #[test]
    fn test_teardown_freezes_everything() {
        let mut h = Harness::new(GameConfig::default());
        let closed = Rc::new(Cell::new(false));
        let flag = closed.clone();
        h.engine.set_close_modal(move || flag.set(true));
        h.engine.start_game();
        h.advance(1000.0);
        h.engine.teardown();

        let frames = h.surface.frames;
        h.advance(30_000.0);
        assert_eq!(h.engine.phase(), GamePhase::Countdown);
        assert!(!h.engine.is_round_running());
        assert_eq!(h.surface.frames, frames);
        assert!(!h.engine.start_game());
        assert!(!h.engine.request_reset());
        assert!(!closed.get());
    }

    #[test]
    fn test_missing_surface_stalls_round() {
        let mut h = Harness::new(GameConfig::default());
        h.engine.start_game();
        assert!(h.run_until(|e| e.current_step() == Some("rotate")));
        let before = h.engine.cup(h.engine.ball_cup()).pose;

        h.now += FRAME_MS;
        h.engine.tick(h.now, None);
        assert!(h.engine.is_stalled());

        h.advance(10_000.0);
        assert!(h.engine.is_stalled());
        assert_eq!(h.engine.current_step(), Some("rotate"));
        assert_eq!(h.engine.cup(h.engine.ball_cup()).pose, before);
        assert!(!h.engine.is_interactive());
    }

    #[test]
    fn test_hit_test_before_render_misses() {
        let mut engine = Engine::new(GameConfig::default(), 1).unwrap();
        engine.resize(700.0, 500.0, 1.0, None);
        let p = engine.cup(CupId::Cup3).pose.pos + Vec2::new(50.0, -60.0);
        assert_eq!(engine.hit_test(p.x, p.y), None);
    }

    #[test]
    fn test_resize_scales_backing_store() {
        let mut h = Harness::new(GameConfig::default());
        h.engine.resize(350.0, 250.0, 2.0, Some(&mut h.surface));
        assert_eq!(h.surface.backing_size, (700, 500));
        h.frame();
        let layout = h.engine.layout();
        for cup in h.engine.cups() {
            assert_eq!(cup.pose.pos, layout.anchor_position(cup.anchor));
        }
        // Background, a shadow and a body per cup, the ball and its shadow
        assert_eq!(h.surface.fills().len(), 1 + 3 * 2 + 2);
        let center = h.cup_center(CupId::Cup1);
        assert_eq!(h.engine.hit_test(center.x, center.y), Some(CupId::Cup1));
    }

    #[test]
    fn test_zero_size_canvas_is_safe() {
        let mut engine = Engine::new(GameConfig::default(), 3).unwrap();
        let mut surface = RecordingSurface::new();
        engine.resize(0.0, 0.0, 1.0, Some(&mut surface));
        engine.tick(16.0, Some(&mut surface));
        for cup in engine.cups() {
            assert!(cup.pose.pos.is_finite());
        }
    }

    #[test]
    fn test_same_seed_same_game() {
        let run = || {
            let mut h = Harness::new(GameConfig::default());
            h.engine.start_game();
            assert!(h.run_until(Engine::is_interactive));
            h.engine.cups().iter().map(|c| c.anchor).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = GameConfig::default();
        config.max_life = 0;
        assert!(matches!(
            Engine::new(config, 0),
            Err(ConfigError::ZeroMaxLife)
        ));
    }
}
