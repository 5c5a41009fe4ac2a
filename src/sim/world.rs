//! World tick scheduler
//!
//! [`World`] owns the simulation state, the command inbox and the AI
//! pipeline. `tick` is the only entry point that mutates anything.

use glam::Vec2;

use super::ai::AiPipeline;
use super::command::{Command, InputState};
use super::state::{
    Enemy, EnemyProjectile, Player, RunPhase, SimState, Stats, WeaponDrop, XpOrb,
};
use super::tick;
use crate::consts;
use crate::jobs::{DEFAULT_QUEUE_DEPTH, default_worker_count};
use crate::persistence;
use crate::render::RenderView;
use crate::settings::Settings;
use crate::telemetry::{NoopTelemetry, Telemetry, TelemetryEvent};
use crate::tuning::Config;

pub struct World {
    pub(crate) state: SimState,
    inbox: Vec<Command>,
    pub(crate) ai: AiPipeline,
    /// An Input command moved the player during the current inbox pass
    pub(crate) input_applied: bool,
    telemetry: Box<dyn Telemetry>,
}

impl World {
    /// Default balance, default seed, pooled AI
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_config(width, height, Config::default(), consts::DEFAULT_SEED)
    }

    pub fn with_config(width: f32, height: f32, config: Config, seed: u64) -> Self {
        Self::build(
            SimState::new(width, height, config, seed),
            default_worker_count(),
            DEFAULT_QUEUE_DEPTH,
            Box::new(NoopTelemetry),
        )
    }

    pub fn from_settings(settings: &Settings, config: Config, telemetry: Box<dyn Telemetry>) -> Self {
        Self::build(
            SimState::new(
                settings.world_width,
                settings.world_height,
                config,
                settings.seed,
            ),
            settings.ai_workers,
            settings.ai_queue_depth,
            telemetry,
        )
    }

    fn build(
        state: SimState,
        workers: usize,
        queue_depth: usize,
        telemetry: Box<dyn Telemetry>,
    ) -> Self {
        log::info!(
            "world {}x{} seed {} ({} AI workers)",
            state.width,
            state.height,
            state.rng.seed(),
            workers
        );
        Self {
            state,
            inbox: Vec::new(),
            ai: AiPipeline::new(workers, queue_depth),
            input_applied: false,
            telemetry,
        }
    }

    /// Replace the telemetry sink
    pub fn with_telemetry(mut self, telemetry: Box<dyn Telemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Run every tick on the synchronous fallback path
    pub fn disable_ai_workers(&mut self) {
        self.ai.disable_workers();
    }

    /// Queue a command for the next tick
    pub fn enqueue(&mut self, cmd: Command) {
        self.inbox.push(cmd);
    }

    /// Advance one fixed step
    pub fn tick(&mut self, dt: f32) {
        for cmd in std::mem::take(&mut self.inbox) {
            self.apply_command(cmd, dt);
        }

        let input_applied = std::mem::take(&mut self.input_applied);

        self.ai.drain();
        self.telemetry.record(TelemetryEvent::Frame(dt));

        // Paused, upgrade menu and game over freeze the world
        if !self.state.is_running() {
            return;
        }
        if !input_applied {
            self.state.player.moving = false;
        }

        let intents = self.ai.advance();
        for event in tick::step(&mut self.state, &intents, dt) {
            self.telemetry.record(event);
        }

        self.ai.submit(&self.state);
        self.ai.prune();
    }

    fn apply_command(&mut self, cmd: Command, dt: f32) {
        match cmd {
            Command::Input(input) => {
                if self.state.is_running() {
                    self.apply_input(dt, input);
                }
            }
            Command::ChooseUpgrade(choice) => {
                if !self.state.game_over {
                    let s = &mut self.state;
                    if let Some(kind) = s.upgrade.choose(choice, &mut s.player, &s.config, &mut s.rng)
                    {
                        log::debug!("upgrade chosen: {kind:?}");
                    }
                }
            }
            Command::Restart => {
                if self.state.paused || self.state.game_over {
                    self.restart();
                }
            }
            Command::TogglePause => {
                if !self.state.game_over && !self.state.upgrade.active {
                    self.state.paused = !self.state.paused;
                }
            }
            Command::SaveSnapshot { path, reply } => {
                let res = persistence::save_snapshot(self, &path);
                // Caller may have dropped its slot
                let _ = reply.try_send(res);
            }
            Command::LoadSnapshot { path, reply } => {
                let res = persistence::load_snapshot(self, &path);
                let _ = reply.try_send(res);
            }
        }
    }

    fn apply_input(&mut self, dt: f32, input: InputState) {
        let dir = input.axis().normalize_or_zero();
        let bounds = self.state.bounds();
        let player = &mut self.state.player;
        player.moving = dir != Vec2::ZERO;
        self.input_applied = true;
        if !player.moving {
            return;
        }
        let moved = player.pos + dir * player.speed * dt;
        player.pos = bounds.clamp(moved);
    }

    /// Fresh run with the same size, balance and seed
    fn restart(&mut self) {
        let s = &self.state;
        let fresh = SimState::new(s.width, s.height, s.config.clone(), s.rng.seed());
        self.state = fresh;
        self.ai.reset(0);
        self.input_applied = false;
        log::info!("run restarted");
    }

    // ========================================================================
    // Read-only access
    // ========================================================================

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.state.config
    }

    pub fn player(&self) -> &Player {
        &self.state.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.state.enemies
    }

    pub fn orbs(&self) -> &[XpOrb] {
        &self.state.orbs
    }

    pub fn drops(&self) -> &[WeaponDrop] {
        &self.state.drops
    }

    pub fn shots(&self) -> &[EnemyProjectile] {
        &self.state.shots
    }

    pub fn stats(&self) -> &Stats {
        &self.state.stats
    }

    pub fn phase(&self) -> RunPhase {
        self.state.phase()
    }

    pub fn ai_tick(&self) -> u64 {
        self.ai.ai_tick()
    }

    pub fn render_view(&self) -> RenderView<'_> {
        RenderView::new(&self.state)
    }
}
