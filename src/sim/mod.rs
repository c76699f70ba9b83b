//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Randomness only through an injected [`RandomSource`]
//! - Stable iteration order
//! - No rendering, timing or platform dependencies
//!
//! Simulations never see the lifecycle state. They report an [`Outcome`]
//! and the controller decides what it means.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::rng::RandomSource;

pub mod breakout;
pub mod snake;
pub mod tiles;

pub use breakout::{BreakoutCommand, BreakoutState};
pub use snake::{SnakeCommand, SnakeState};
pub use tiles::{TileCommand, TileGame, TileGrid};

/// Cardinal direction on a grid (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Unit step as (dx, dy)
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Terminal or milestone results a simulation can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Breakout: last ball lost with no lives left
    LostAllBalls,
    /// Puzzle: no empty cell and no equal neighbours
    NoMovesPossible,
    /// Puzzle: target tile reached for the first time
    ReachedTargetTile,
    /// Snake: head left the grid or hit the body
    SelfOrWallCollision,
    /// Breakout: every destructible brick is gone
    BoardCleared,
}

/// Result of advancing a simulation by one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Step {
    pub outcome: Option<Outcome>,
    /// Delay until the next tick, `None` for event-driven games
    pub next_delay: Option<Duration>,
}

/// Contract between a game and the lifecycle controller
pub trait Simulation: Clone {
    /// Game-specific user intent (direction, launch, ...)
    type Command: Clone + std::fmt::Debug;

    /// Stable identifier, used for score keys and logging
    const NAME: &'static str;

    /// Rebuild all state for a fresh game at `level`.
    fn initialize(&mut self, level: u32, rng: &mut dyn RandomSource);

    /// Rebuild state for the following level, keeping run-wide progress.
    fn next_level(&mut self, level: u32, rng: &mut dyn RandomSource) {
        self.initialize(level, rng);
    }

    /// Apply a user command. Only called while playing unless
    /// [`Simulation::accepts_while_idle`] allows it.
    fn command(&mut self, command: Self::Command, rng: &mut dyn RandomSource) -> Option<Outcome>;

    /// Commands that are settings rather than moves (e.g. speed level)
    fn accepts_while_idle(_command: &Self::Command) -> bool {
        false
    }

    /// Advance one tick.
    fn step(&mut self, rng: &mut dyn RandomSource) -> Step;

    /// Delay before the first tick after (re)starting, `None` if the game
    /// is purely event-driven.
    fn first_delay(&self) -> Option<Duration>;

    fn score(&self) -> u64;

    /// Called when the player chooses to keep playing after a win.
    fn continue_after_win(&mut self) {}
}
