//! Breakout state and entity types
//!
//! Everything a renderer needs lives in [`BreakoutState`]; cloning it is the
//! snapshot handed to the adapter.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::consts::*;
use super::levels::generate_level;
use super::level_speed;
use super::tick::TickInput;
use crate::rng::RandomSource;

/// A ball entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Scalar speed; `vel` always has this length once launched
    pub speed: f32,
    /// Ticks before bricks can be hit again
    pub cooldown: u32,
}

impl Ball {
    pub fn new(pos: Vec2, speed: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius: BALL_RADIUS,
            speed,
            cooldown: 0,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.pos.is_finite() && self.vel.is_finite()
    }

    pub fn bounds(&self) -> Rect {
        Rect::around(self.pos, self.radius)
    }

    /// Raise speed by `increment`, never beyond `cap`, keeping direction.
    pub fn accelerate(&mut self, increment: f32, cap: f32) {
        self.speed = (self.speed + increment).min(cap);
        self.vel = self.vel.normalize_or_zero() * self.speed;
    }

    /// Sit on top of the paddle, centered
    pub fn pin_to(&mut self, paddle: &Paddle) {
        self.pos = Vec2::new(paddle.center_x(), paddle.y - self.radius - 1.0);
        self.vel = Vec2::ZERO;
    }

    /// Fire upward at `angle` radians from vertical
    pub fn launch(&mut self, angle: f32) {
        self.vel = Vec2::new(angle.sin(), -angle.cos()) * self.speed;
    }
}

/// The player's paddle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Width the paddle is easing toward
    pub target_width: f32,
    /// Seconds left before a stretch starts easing back
    pub stretch_remaining: f32,
}

impl Default for Paddle {
    fn default() -> Self {
        Self {
            x: (ARENA_WIDTH - PADDLE_WIDTH) / 2.0,
            y: ARENA_HEIGHT - PADDLE_FLOOR_GAP - PADDLE_HEIGHT,
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
            target_width: PADDLE_WIDTH,
            stretch_remaining: 0.0,
        }
    }
}

impl Paddle {
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Keep the paddle inside `[0, arena_width - width]`
    pub fn clamp_to(&mut self, arena_width: f32) {
        self.x = self.x.clamp(0.0, (arena_width - self.width).max(0.0));
    }

    /// Begin (or restart) a stretch; any pending shrink is cancelled.
    pub fn start_stretch(&mut self) {
        self.target_width = PADDLE_STRETCH_WIDTH;
        self.stretch_remaining = STRETCH_DURATION;
    }

    pub fn is_stretched(&self) -> bool {
        self.stretch_remaining > 0.0
    }

    /// Count down the stretch and ease width toward its target,
    /// keeping the paddle centered.
    pub fn update_stretch(&mut self, dt: f32) {
        if self.stretch_remaining > 0.0 {
            self.stretch_remaining = (self.stretch_remaining - dt).max(0.0);
            if self.stretch_remaining == 0.0 {
                self.target_width = PADDLE_WIDTH;
            }
        }

        let delta = self.target_width - self.width;
        if delta != 0.0 {
            let step = STRETCH_EASE_SPEED * dt;
            let center = self.center_x();
            if delta.abs() <= step {
                self.width = self.target_width;
            } else {
                self.width += step * delta.signum();
            }
            self.x = center - self.width / 2.0;
        }
    }
}

/// A brick in the layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brick {
    pub rect: Rect,
    /// False once destroyed
    pub alive: bool,
    /// Display color (0xRRGGBB)
    pub color: u32,
    pub power_up: Option<PowerUpKind>,
    /// Steel bricks bounce balls but never break
    pub steel: bool,
}

impl Brick {
    /// Must be destroyed to clear the board
    pub fn counts_for_clear(&self) -> bool {
        !self.steel
    }
}

/// Bricks indexed `[column][row]`, `None` where the pattern leaves a gap
pub type BrickLayout = Vec<Vec<Option<Brick>>>;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    MultiBall,
    StretchPaddle,
}

/// A falling pickup; `pos` is the top-left corner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub size: f32,
    pub fall_speed: f32,
}

impl PowerUp {
    /// Spawn centered on `center`
    pub fn spawn(kind: PowerUpKind, center: Vec2) -> Self {
        Self {
            kind,
            pos: center - Vec2::splat(POWER_UP_SIZE / 2.0),
            size: POWER_UP_SIZE,
            fall_speed: POWER_UP_FALL_SPEED,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size, self.size)
    }
}

/// Things that happened during a tick, for sound/effects in the adapter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Launched,
    PaddleHit,
    BrickDestroyed {
        column: usize,
        row: usize,
        points: u64,
        power_up: Option<PowerUpKind>,
    },
    SteelHit {
        column: usize,
        row: usize,
    },
    PowerUpCollected(PowerUpKind),
    BallLost,
    LifeLost {
        lives_left: u8,
    },
}

/// Breakout input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BreakoutCommand {
    /// Left key pressed/released
    Left(bool),
    /// Right key pressed/released
    Right(bool),
    /// Pointer moved to this arena x (paddle centers on it)
    Pointer(f32),
    Launch,
}

/// Input latched between ticks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaddleInput {
    pub left: bool,
    pub right: bool,
    pub pointer_x: Option<f32>,
    pub launch: bool,
}

impl PaddleInput {
    pub fn apply(&mut self, command: BreakoutCommand) {
        match command {
            BreakoutCommand::Left(held) => self.left = held,
            BreakoutCommand::Right(held) => self.right = held,
            BreakoutCommand::Pointer(x) => self.pointer_x = Some(x),
            BreakoutCommand::Launch => self.launch = true,
        }
    }

    /// Input for the next tick; one-shot parts (pointer, launch) are consumed
    pub fn take_tick_input(&mut self) -> TickInput {
        TickInput {
            left: self.left,
            right: self.right,
            pointer_x: self.pointer_x.take(),
            launch: std::mem::take(&mut self.launch),
        }
    }
}

/// Complete breakout state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakoutState {
    pub level: u32,
    pub lives: u8,
    /// Lives granted on a new game
    pub starting_lives: u8,
    pub score: u64,
    /// Whether the current life's ball has left the paddle
    pub launched: bool,
    /// Ball speed at the start of each life on this level
    pub initial_speed: f32,
    pub paddle: Paddle,
    pub balls: Vec<Ball>,
    pub bricks: BrickLayout,
    pub power_ups: Vec<PowerUp>,
    pub input: PaddleInput,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events from the most recent tick
    #[serde(default)]
    pub last_events: Vec<GameEvent>,
}

impl BreakoutState {
    /// Create a new game starting at `level`
    pub fn new(level: u32, starting_lives: u8, rng: &mut dyn RandomSource) -> Self {
        let mut state = Self {
            level,
            lives: starting_lives,
            starting_lives,
            score: 0,
            launched: false,
            initial_speed: level_speed(level),
            paddle: Paddle::default(),
            balls: Vec::new(),
            bricks: Vec::new(),
            power_ups: Vec::new(),
            input: PaddleInput::default(),
            time_ticks: 0,
            last_events: Vec::new(),
        };
        state.load_level(level, rng);
        state
    }

    /// Replace the board for `level` and re-serve; score and lives carry over.
    pub fn load_level(&mut self, level: u32, rng: &mut dyn RandomSource) {
        self.level = level;
        self.initial_speed = level_speed(level);
        self.bricks = generate_level(level, rng);
        self.paddle = Paddle::default();
        self.power_ups.clear();
        self.input = PaddleInput::default();
        self.last_events.clear();
        self.serve();
    }

    /// Put a single un-launched ball on the paddle
    pub fn serve(&mut self) {
        self.launched = false;
        let mut ball = Ball::new(Vec2::ZERO, self.initial_speed);
        ball.pin_to(&self.paddle);
        self.balls.clear();
        self.balls.push(ball);
    }

    /// Top speed for this level
    pub fn speed_cap(&self) -> f32 {
        self.initial_speed * MAX_SPEED_FACTOR
    }

    pub fn bricks(&self) -> impl Iterator<Item = &Brick> {
        self.bricks.iter().flatten().flatten()
    }

    /// True once every non-steel brick is destroyed
    pub fn all_cleared(&self) -> bool {
        self.bricks()
            .filter(|b| b.counts_for_clear())
            .all(|b| !b.alive)
    }

    pub fn bricks_remaining(&self) -> usize {
        self.bricks()
            .filter(|b| b.counts_for_clear() && b.alive)
            .count()
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededRandom;
    use proptest::prelude::*;

    #[test]
    fn test_new_state_serves_one_ball() {
        let mut rng = SeededRandom::new(5);
        let state = BreakoutState::new(1, STARTING_LIVES, &mut rng);
        assert_eq!(state.balls.len(), 1);
        assert!(!state.launched);
        assert_eq!(state.balls[0].pos.x, state.paddle.center_x());
        assert!(state.balls[0].pos.y < state.paddle.y);
        assert!(!state.all_cleared());
    }

    #[test]
    fn test_stretch_eases_out_and_back() {
        let mut paddle = Paddle::default();
        let center = paddle.center_x();
        paddle.start_stretch();
        for _ in 0..60 {
            paddle.update_stretch(SIM_DT);
        }
        assert_eq!(paddle.width, PADDLE_STRETCH_WIDTH);
        assert!((paddle.center_x() - center).abs() < 1e-3);

        let ticks = (STRETCH_DURATION / SIM_DT) as usize + 60;
        for _ in 0..ticks {
            paddle.update_stretch(SIM_DT);
        }
        assert_eq!(paddle.width, PADDLE_WIDTH);
        assert!(!paddle.is_stretched());
    }

    #[test]
    fn test_new_stretch_cancels_pending_shrink() {
        let mut paddle = Paddle::default();
        paddle.start_stretch();
        for _ in 0..((STRETCH_DURATION / SIM_DT) as usize - 5) {
            paddle.update_stretch(SIM_DT);
        }
        paddle.start_stretch();
        for _ in 0..30 {
            paddle.update_stretch(SIM_DT);
        }
        assert_eq!(paddle.target_width, PADDLE_STRETCH_WIDTH);
        assert_eq!(paddle.width, PADDLE_STRETCH_WIDTH);
    }

    #[test]
    fn test_take_tick_input_consumes_one_shots() {
        let mut input = PaddleInput::default();
        input.apply(BreakoutCommand::Left(true));
        input.apply(BreakoutCommand::Pointer(120.0));
        input.apply(BreakoutCommand::Launch);

        let first = input.take_tick_input();
        assert!(first.left && first.launch);
        assert_eq!(first.pointer_x, Some(120.0));

        let second = input.take_tick_input();
        assert!(second.left);
        assert!(!second.launch);
        assert_eq!(second.pointer_x, None);
    }

    proptest! {
        #[test]
        fn prop_speed_never_exceeds_cap(hits in 0usize..500, initial in 100.0f32..600.0) {
            let mut ball = Ball::new(Vec2::ZERO, initial);
            ball.launch(0.3);
            let cap = initial * MAX_SPEED_FACTOR;
            let mut last = ball.speed;
            for _ in 0..hits {
                ball.accelerate(BALL_SPEED_INCREMENT, cap);
                prop_assert!(ball.speed <= cap);
                prop_assert!(ball.speed >= last);
                last = ball.speed;
            }
            prop_assert!((ball.vel.length() - ball.speed).abs() <= ball.speed * 1e-4);
        }
    }
}
