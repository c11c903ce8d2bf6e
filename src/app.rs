use color_eyre::Result;
use glam::Vec2;
use log::{debug, info, warn};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
    layout::Rect,
};
use std::time::{Duration, Instant};

use crate::arena::{Arena, ArenaEvent, SimState};
use crate::audio::AudioManager;
use crate::config::ArenaConfig;
use crate::input::{InputAction, InputManager};
use crate::renderer::{GameRenderer, RenderView, ScreenLayout};

/// What the screen is showing, combining the simulation state with the
/// app-level pause flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    Paused,
    ChoosingUpgrade,
    GameOver,
}

impl Phase {
    pub fn of(state: &SimState, paused: bool) -> Self {
        match state {
            SimState::Ended => Phase::GameOver,
            SimState::AwaitingUpgradeChoice { .. } => Phase::ChoosingUpgrade,
            SimState::Running if paused => Phase::Paused,
            SimState::Running => Phase::Playing,
        }
    }
}

/// The main application which holds the state and logic of the application.
pub struct App {
    running: bool,
    paused: bool,
    arena: Arena,
    config: ArenaConfig,
    player_name: String,
    seed: Option<u64>,
    /// Frames info
    last_frame_time: Instant,
    fps: u32,
    /// Game timers
    game_start_time: Instant,
    final_time_secs: Option<u64>,
    /// internal components
    input_manager: InputManager,
    renderer: GameRenderer,
    audio_manager: AudioManager,
}

impl App {
    /// Construct a new instance of [`App`].
    ///
    /// `reports_release` tells the input layer whether the terminal sends
    /// key release events.
    pub fn new(
        config: ArenaConfig,
        player_name: impl Into<String>,
        seed: Option<u64>,
        reports_release: bool,
    ) -> Self {
        let player_name = player_name.into();
        let arena = Arena::with_seed(config.clone(), &player_name, seed);
        let audio_manager = AudioManager::new(&config.audio);
        let now = Instant::now();

        Self {
            running: true,
            paused: false,
            arena,
            config,
            player_name,
            seed,
            last_frame_time: now,
            fps: 0,
            game_start_time: now,
            final_time_secs: None,
            input_manager: InputManager::new(reports_release),
            renderer: GameRenderer::new(),
            audio_manager,
        }
    }

    pub fn phase(&self) -> Phase {
        Phase::of(self.arena.state(), self.paused)
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// World units covered by one terminal cell
    fn cell_size(&self) -> Vec2 {
        Vec2::new(self.config.render.cell_width, self.config.render.cell_height)
    }

    /// Run the application's main loop.
    pub fn run(mut self, terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
        let frame_delay = Duration::from_millis(self.config.render.frame_millis);

        while self.running {
            let now = Instant::now();
            let frame_time = now.duration_since(self.last_frame_time);
            self.last_frame_time = now;
            if frame_time.as_micros() > 0 {
                self.fps = (1_000_000 / frame_time.as_micros()) as u32;
            }

            self.input_manager.poll_events(self.phase())?;
            let actions = self.input_manager.get_actions().to_vec();
            self.step(terminal, &actions)?;

            std::thread::sleep(frame_delay);
        }
        Ok(())
    }

    /// Applies one frame of input, advances the arena and draws the result.
    fn step<B: Backend>(&mut self, terminal: &mut Terminal<B>, actions: &[InputAction]) -> Result<()> {
        // The visible world follows the terminal size
        let size = terminal.size()?;
        let screen = ScreenLayout::new(
            Rect::new(0, 0, size.width, size.height),
            self.config.render.minimap_size,
        );
        self.resize_view(screen.world);

        self.process_actions(actions);
        if self.phase() == Phase::Playing {
            let input = self.input_manager.frame_input(screen.world, self.cell_size());
            self.arena.tick(&input);
            self.handle_events();
        }

        terminal.draw(|frame| {
            let elapsed_time_secs = self
                .final_time_secs
                .unwrap_or_else(|| self.game_start_time.elapsed().as_secs());
            let view = RenderView {
                phase: self.phase(),
                arena: &self.arena,
                area: frame.area(),
                fps: self.fps,
                elapsed_time_secs,
            };
            self.renderer.render(frame, &view);
        })?;
        Ok(())
    }

    fn resize_view(&mut self, world: Rect) {
        let cell = self.cell_size();
        self.arena
            .set_view_size(world.width as f32 * cell.x, world.height as f32 * cell.y);
    }

    /// Process input actions and update game state accordingly
    fn process_actions(&mut self, actions: &[InputAction]) {
        for action in actions {
            match action {
                InputAction::Quit => {
                    self.running = false;
                }
                InputAction::Pause => {
                    self.paused = true;
                }
                InputAction::Resume => {
                    self.paused = false;
                }
                InputAction::Restart => {
                    self.restart();
                }
                InputAction::ChooseUpgrade(index) => match self.arena.choose_upgrade(*index) {
                    Ok(upgrade) => debug!("applied {upgrade:?}"),
                    Err(err) => warn!("ignored upgrade choice: {err}"),
                },
            }
        }
    }

    /// Starts a fresh session with the same name, config and seed
    fn restart(&mut self) {
        let view = self.arena.view_size();
        self.arena = Arena::with_seed(self.config.clone(), &self.player_name, self.seed);
        self.arena.set_view_size(view.x, view.y);
        self.paused = false;
        self.game_start_time = Instant::now();
        self.final_time_secs = None;
        info!("session restarted");
    }

    /// Forwards this frame's arena events to audio and the log
    fn handle_events(&mut self) {
        for event in self.arena.drain_events() {
            match &event {
                ArenaEvent::Kill { by_player, victim } if *by_player => {
                    info!("{} destroyed {victim}", self.player_name);
                }
                ArenaEvent::PlayerDied { score } => {
                    self.final_time_secs = Some(self.game_start_time.elapsed().as_secs());
                    info!("game over with score {score}");
                }
                _ => {}
            }
            self.audio_manager.play_event(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn app() -> App {
        let mut config = ArenaConfig::default();
        config.audio.enabled = false;
        config.spawning.enabled = false;
        App::new(config, "Tester", Some(7), true)
    }

    #[test]
    fn test_phase_mapping() {
        assert_eq!(Phase::of(&SimState::Running, false), Phase::Playing);
        assert_eq!(Phase::of(&SimState::Running, true), Phase::Paused);
        assert_eq!(Phase::of(&SimState::Ended, true), Phase::GameOver);
        let choosing = SimState::AwaitingUpgradeChoice {
            offers: vec![],
            queued: 0,
        };
        assert_eq!(Phase::of(&choosing, false), Phase::ChoosingUpgrade);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut app = app();
        app.process_actions(&[InputAction::Pause]);
        assert_eq!(app.phase(), Phase::Paused);
        app.process_actions(&[InputAction::Resume]);
        assert_eq!(app.phase(), Phase::Playing);
    }

    #[test]
    fn test_quit_stops_loop() {
        let mut app = app();
        app.process_actions(&[InputAction::Quit]);
        assert!(!app.running);
    }

    #[test]
    fn test_upgrade_choice_resumes_play() {
        let mut app = app();
        app.arena.player_mut().xp = 100;
        app.arena.tick(&Default::default());
        assert_eq!(app.phase(), Phase::ChoosingUpgrade);

        // Out of range picks are ignored
        app.process_actions(&[InputAction::ChooseUpgrade(7)]);
        assert_eq!(app.phase(), Phase::ChoosingUpgrade);

        app.process_actions(&[InputAction::ChooseUpgrade(0)]);
        assert_eq!(app.phase(), Phase::Playing);
    }

    #[test]
    fn test_step_draws_the_frame_it_simulated() {
        let mut app = app();
        app.arena.add_orb(Vec2::new(2020.0, 2000.0), 10);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

        app.step(&mut terminal, &[]).unwrap();
        assert_eq!(app.arena().frame(), 1);
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("Score: 10"));
    }

    #[test]
    fn test_step_skips_tick_while_paused() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        app.step(&mut terminal, &[InputAction::Pause]).unwrap();
        assert_eq!(app.arena().frame(), 0);
        assert_eq!(app.phase(), Phase::Paused);
    }

    #[test]
    fn test_restart_keeps_name_and_view() {
        let mut app = app();
        app.resize_view(Rect::new(0, 0, 50, 20));
        app.arena.player_mut().hp = 0.0;
        app.arena.player_mut().body.dead = true;
        app.arena.tick(&Default::default());
        app.handle_events();
        assert_eq!(app.phase(), Phase::GameOver);
        assert!(app.final_time_secs.is_some());

        app.process_actions(&[InputAction::Restart]);
        assert_eq!(app.phase(), Phase::Playing);
        assert_eq!(app.arena().player().name, "Tester");
        assert_eq!(app.arena().view_size(), Vec2::new(800.0, 640.0));
        assert!(app.final_time_secs.is_none());
    }
}
