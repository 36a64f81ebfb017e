//! Cookie Cups entry point
//!
//! On the web this mounts the minigame on `#canvas` and drives it from
//! `requestAnimationFrame`. Natively it plays one scripted game headless.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, MouseEvent};

    use cookie_cups::platform::{self, hearts_text};
    use cookie_cups::renderer::{CanvasSurface, Surface};
    use cookie_cups::sim::{Engine, GameEvent, GamePhase};
    use cookie_cups::GameConfig;

    /// Panel shown for each phase
    const PANELS: [(&str, GamePhase); 6] = [
        ("welcome", GamePhase::Welcome),
        ("countdown", GamePhase::Countdown),
        ("round-lost", GamePhase::LosingRound),
        ("round-won", GamePhase::WinningRound),
        ("victory", GamePhase::Victory),
        ("game-over", GamePhase::GameOver),
    ];

    /// Minigame instance: the engine plus its canvas
    struct Game {
        engine: Engine,
        surface: Option<CanvasSurface>,
    }

    impl Game {
        fn new(engine: Engine, surface: Option<CanvasSurface>) -> Self {
            Self { engine, surface }
        }

        /// Match the canvas element's CSS size
        fn resize(&mut self) {
            let Some(surface) = self.surface.as_mut() else {
                return;
            };
            let canvas = surface.canvas();
            let w = canvas.client_width() as f32;
            let h = canvas.client_height() as f32;
            let dpr = platform::device_pixel_ratio();
            self.engine.resize(w, h, dpr, Some(surface as &mut dyn Surface));
        }

        /// One display frame
        fn frame(&mut self, time: f64) {
            let surface = self
                .surface
                .as_mut()
                .filter(|s| s.is_connected())
                .map(|s| s as &mut dyn Surface);
            self.engine.tick(time, surface);

            for event in self.engine.drain_events() {
                match event {
                    GameEvent::PhaseChanged { to, .. } => self.show_panel(to),
                    GameEvent::RoundResolved { round, won, .. } => {
                        log::info!("Round {} {}", round, if won { "won" } else { "lost" });
                    }
                    GameEvent::CloseModal => {
                        platform::set_hidden("cookie-modal", true);
                        self.engine.teardown();
                    }
                }
            }
            self.update_hud();
        }

        fn show_panel(&self, phase: GamePhase) {
            for (id, panel_phase) in PANELS {
                platform::set_hidden(id, panel_phase != phase);
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let e = &self.engine;
            platform::set_text("hud-hearts", &hearts_text(&e.heart_states()));
            platform::set_text("hud-round", &format!("{}/{}", e.round(), e.max_round()));

            let countdown = match (e.phase(), e.countdown()) {
                (GamePhase::Countdown, Some(0)) => "START!".to_string(),
                (_, Some(n)) => n.to_string(),
                (_, None) => String::new(),
            };
            platform::set_text("hud-countdown", &countdown);
            platform::set_text("hud-info", e.info_text().unwrap_or(""));
            platform::set_text("game-over-message", e.game_over_message().unwrap_or(""));
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Cookie Cups starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document");
            return;
        };

        let canvas: Option<HtmlCanvasElement> = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into().ok());
        let surface = canvas.clone().and_then(CanvasSurface::new);
        if surface.is_none() {
            log::warn!("No 2D canvas; the round flow will stall");
        }

        let seed = platform::now_ms() as u64;
        let engine = match Engine::new(GameConfig::load(), seed) {
            Ok(engine) => engine,
            Err(e) => {
                log::error!("Invalid game config: {}", e);
                return;
            }
        };
        log::info!("Game initialized with seed: {}", seed);

        let game = Rc::new(RefCell::new(Game::new(engine, surface)));
        {
            let mut g = game.borrow_mut();
            g.engine.set_close_modal(|| log::info!("Consent modal closed"));
            g.resize();
            g.show_panel(GamePhase::Welcome);
        }

        if let Some(canvas) = canvas.as_ref() {
            setup_input_handlers(canvas, game.clone());
        }
        setup_buttons(game.clone());
        setup_resize(game.clone());

        request_animation_frame(game);

        log::info!("Cookie Cups running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Hover
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                game.borrow_mut()
                    .engine
                    .on_cup_hover(event.offset_x() as f32, event.offset_y() as f32);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pick
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                game.borrow_mut()
                    .engine
                    .on_cup_click(event.offset_x() as f32, event.offset_y() as f32);
            });
            let _ = canvas
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn on_click(id: &str, game: Rc<RefCell<Game>>, action: fn(&mut Engine) -> bool) {
        let Some(btn) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        else {
            return;
        };
        let name = id.to_string();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            if !action(&mut game.borrow_mut().engine) {
                log::debug!("{} ignored", name);
            }
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        on_click("start-btn", game.clone(), Engine::start_game);
        on_click("next-round-lost-btn", game.clone(), Engine::request_next_round);
        on_click("next-round-won-btn", game.clone(), Engine::request_next_round);
        on_click("retry-btn", game.clone(), Engine::request_retry);
        on_click("victory-retry-btn", game.clone(), Engine::request_retry);
        on_click("reset-btn", game, Engine::request_reset);
    }

    fn setup_resize(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.borrow_mut().resize();
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let running = {
            let mut g = game.borrow_mut();
            g.frame(time);
            !g.engine.is_torn_down()
        };

        if running {
            request_animation_frame(game);
        } else {
            log::info!("Game loop stopped");
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Cookie Cups (native) starting...");
    log::info!("Native mode plays headless - build for wasm32 to play in a browser");

    if let Err(e) = headless::play() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// A scripted player on an in-memory surface
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use cookie_cups::renderer::RecordingSurface;
    use cookie_cups::sim::{Engine, GameEvent, GamePhase};
    use cookie_cups::{ConfigError, GameConfig};
    use glam::Vec2;

    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Give up after ten simulated minutes
    const MAX_FRAMES: u32 = 60 * 60 * 10;

    pub fn play() -> Result<(), ConfigError> {
        let seed = cookie_cups::platform::now_ms() as u64;
        let mut engine = Engine::new(GameConfig::load(), seed)?;
        let mut surface = RecordingSurface::new();
        engine.resize(700.0, 500.0, 1.0, Some(&mut surface));
        engine.set_close_modal(|| log::info!("Consent modal closed"));
        engine.start_game();

        let mut now = 0.0;
        let mut picked_this_round = false;
        let mut missed = false;
        for _ in 0..MAX_FRAMES {
            now += FRAME_MS;
            engine.tick(now, Some(&mut surface));

            if engine.is_interactive() && !picked_this_round {
                // Misses the first try at round 2, finds the ball otherwise
                let miss = engine.round() == 2 && !missed;
                let ball = engine.ball_cup();
                let target = engine
                    .cups()
                    .iter()
                    .find(|c| (c.id == ball) != miss)
                    .map(|c| c.pose.pos + Vec2::new(50.0, -60.0));
                if let Some(p) = target {
                    engine.on_cup_click(p.x, p.y);
                }
                missed |= miss;
                picked_this_round = true;
            }

            let mut closed = false;
            for event in engine.drain_events() {
                log::info!("{:?}", event);
                if event == GameEvent::CloseModal {
                    closed = true;
                }
            }

            match engine.phase() {
                GamePhase::LosingRound | GamePhase::WinningRound => {
                    picked_this_round = false;
                    engine.request_next_round();
                }
                GamePhase::GameOver => {
                    log::info!(
                        "Game over on round {}: {}",
                        engine.round(),
                        engine.game_over_message().unwrap_or_default()
                    );
                    break;
                }
                _ => {}
            }
            if closed {
                log::info!("Victory with {}/{} lives", engine.life(), engine.max_life());
                break;
            }
        }

        engine.teardown();
        log::info!("{} frames painted", surface.frames);
        Ok(())
    }
}
