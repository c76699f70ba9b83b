//! Breakout: paddle, balls, bricks and falling power-ups
//!
//! Positions are in arena pixels with y growing downward; velocities are in
//! pixels per second and advanced with a fixed timestep.

use std::time::Duration;

use super::{Outcome, Simulation, Step};
use crate::rng::RandomSource;

pub mod collision;
pub mod levels;
pub mod state;
pub mod tick;

pub use collision::{Rect, paddle_bounce};
pub use levels::{Pattern, generate_level, power_up_chance};
pub use state::{
    Ball, BreakoutCommand, BreakoutState, Brick, BrickLayout, GameEvent, Paddle, PaddleInput,
    PowerUp, PowerUpKind,
};
pub use tick::{TickInput, TickReport, tick};

/// Breakout tuning constants
pub mod consts {
    use std::f32::consts::PI;
    use std::time::Duration;

    /// Fixed simulation timestep (one frame at 60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    pub const FRAME: Duration = Duration::from_nanos(16_666_667);

    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 600.0;

    pub const PADDLE_WIDTH: f32 = 100.0;
    pub const PADDLE_STRETCH_WIDTH: f32 = 160.0;
    pub const PADDLE_HEIGHT: f32 = 12.0;
    /// Gap between the paddle's bottom edge and the arena floor
    pub const PADDLE_FLOOR_GAP: f32 = 30.0;
    /// Keyboard paddle speed (px/s)
    pub const PADDLE_SPEED: f32 = 540.0;
    /// How long a stretch lasts before easing back (seconds)
    pub const STRETCH_DURATION: f32 = 10.0;
    /// Width easing rate (px/s)
    pub const STRETCH_EASE_SPEED: f32 = 240.0;

    pub const BALL_RADIUS: f32 = 8.0;
    /// Level 1 ball speed (px/s)
    pub const BALL_BASE_SPEED: f32 = 300.0;
    pub const BALL_SPEED_PER_LEVEL: f32 = 30.0;
    /// Level speeds stop growing here (px/s)
    pub const BALL_MAX_LEVEL_SPEED: f32 = 900.0;
    /// Longest distance a ball moves between collision checks (px)
    pub const MAX_BALL_STEP: f32 = BALL_RADIUS;
    /// Speed gained per destroyed brick (px/s)
    pub const BALL_SPEED_INCREMENT: f32 = 6.0;
    /// Cap relative to the level's initial speed
    pub const MAX_SPEED_FACTOR: f32 = 2.0;
    /// Ticks during which a ball ignores bricks after a brick hit
    pub const COLLISION_COOLDOWN_TICKS: u32 = 4;
    /// Steepest paddle rebound, measured from vertical
    pub const MAX_BOUNCE_ANGLE: f32 = PI / 3.0;
    /// Launch cone half-angle, measured from vertical
    pub const LAUNCH_CONE: f32 = PI / 6.0;
    /// Multiball divergence range (radians)
    pub const MULTIBALL_SPREAD_MIN: f32 = 0.15;
    pub const MULTIBALL_SPREAD_MAX: f32 = 0.35;

    pub const BRICK_COLUMNS: usize = 10;
    pub const BRICK_ROWS: usize = 6;
    pub const BRICK_WIDTH: f32 = 70.0;
    pub const BRICK_HEIGHT: f32 = 22.0;
    pub const BRICK_PADDING: f32 = 8.0;
    pub const BRICK_OFFSET_TOP: f32 = 60.0;
    pub const BRICK_OFFSET_LEFT: f32 = 14.0;
    /// Score per brick is this times the level
    pub const POINTS_PER_BRICK: u64 = 10;

    pub const POWER_UP_SIZE: f32 = 20.0;
    pub const POWER_UP_FALL_SPEED: f32 = 150.0;

    pub const STARTING_LIVES: u8 = 3;
}

/// Initial ball speed for a level
pub fn level_speed(level: u32) -> f32 {
    let extra = consts::BALL_SPEED_PER_LEVEL * level.saturating_sub(1) as f32;
    let speed = consts::BALL_BASE_SPEED + extra;
    speed.min(consts::BALL_MAX_LEVEL_SPEED)
}

impl Simulation for BreakoutState {
    type Command = BreakoutCommand;

    const NAME: &'static str = "breakout";

    fn initialize(&mut self, level: u32, rng: &mut dyn RandomSource) {
        *self = BreakoutState::new(level, self.starting_lives, rng);
        log::info!("Breakout level {} ready, {} lives", self.level, self.lives);
    }

    fn next_level(&mut self, level: u32, rng: &mut dyn RandomSource) {
        self.load_level(level, rng);
        log::info!("Breakout advanced to level {} with score {}", level, self.score);
    }

    fn command(&mut self, command: BreakoutCommand, _rng: &mut dyn RandomSource) -> Option<Outcome> {
        self.input.apply(command);
        None
    }

    /// Key releases must land even while paused, or a held flag outlives
    /// the key.
    fn accepts_while_idle(command: &BreakoutCommand) -> bool {
        matches!(
            command,
            BreakoutCommand::Left(false) | BreakoutCommand::Right(false)
        )
    }

    fn step(&mut self, rng: &mut dyn RandomSource) -> Step {
        let input = self.input.take_tick_input();
        let report = tick(self, &input, rng, consts::SIM_DT);
        self.last_events = report.events;
        Step {
            outcome: report.outcome,
            next_delay: Some(consts::FRAME),
        }
    }

    fn first_delay(&self) -> Option<Duration> {
        Some(consts::FRAME)
    }

    fn score(&self) -> u64 {
        self.score
    }
}
