//! Grid snake
//!
//! The snake advances one cell per tick. Growth falls out of the update
//! order: the new head is always pushed, and the tail is only popped when
//! nothing was eaten.

use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{Direction, Outcome, Simulation, Step};
use crate::error::InitError;
use crate::rng::RandomSource;

pub const GRID_WIDTH: i32 = 20;
pub const GRID_HEIGHT: i32 = 20;
pub const START_LENGTH: usize = 3;

/// Points for regular food
pub const FOOD_POINTS: u64 = 10;
/// Points for bonus food
pub const BONUS_POINTS: u64 = 50;
/// Chance to spawn bonus food after eating, if none is active
pub const BONUS_SPAWN_CHANCE: f64 = 0.2;
/// Ticks before an uneaten bonus disappears
pub const BONUS_LIFETIME_TICKS: u32 = 40;

/// Tick interval at score 0 (neutral speed level)
pub const BASE_INTERVAL_MS: u64 = 150;
/// Fastest interval the score can reach (neutral speed level)
pub const MIN_INTERVAL_MS: u64 = 60;
/// Interval shaved off per `POINTS_PER_SPEEDUP` points
pub const SPEEDUP_STEP_MS: u64 = 5;
pub const POINTS_PER_SPEEDUP: u64 = 50;

/// Interval multipliers for speed levels 1 (slowest) to 5 (fastest)
const SPEED_MULTIPLIERS: [f64; 5] = [1.6, 1.3, 1.0, 0.75, 0.5];

/// A grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn is_adjacent(self, other: Cell) -> bool {
        (self.x - other.x).abs() + (self.y - other.y).abs() == 1
    }
}

/// User-adjustable speed, 1..=5 with 3 as neutral
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedLevel(u8);

impl SpeedLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    pub const NEUTRAL: SpeedLevel = SpeedLevel(3);

    pub fn new(level: u8) -> Result<Self, InitError> {
        if (Self::MIN..=Self::MAX).contains(&level) {
            Ok(Self(level))
        } else {
            Err(InitError::SpeedLevel(level))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn multiplier(self) -> f64 {
        SPEED_MULTIPLIERS[usize::from(self.0 - Self::MIN)]
    }

    pub fn faster(self) -> Self {
        Self((self.0 + 1).min(Self::MAX))
    }

    pub fn slower(self) -> Self {
        Self(self.0.saturating_sub(1).max(Self::MIN))
    }
}

impl Default for SpeedLevel {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Delay between ticks for the given score and speed level
pub fn tick_interval(score: u64, level: SpeedLevel) -> Duration {
    let reduction = (score / POINTS_PER_SPEEDUP) * SPEEDUP_STEP_MS;
    let base = BASE_INTERVAL_MS.saturating_sub(reduction).max(MIN_INTERVAL_MS);
    Duration::from_millis((base as f64 * level.multiplier()).round() as u64)
}

/// Bonus food with a countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusFood {
    pub cell: Cell,
    pub ticks_left: u32,
}

/// Snake input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnakeCommand {
    Turn(Direction),
    SetSpeedLevel(SpeedLevel),
    SpeedUp,
    SlowDown,
}

/// What the head ran into this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eaten {
    Food,
    Bonus,
}

/// Result of one snake tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnakeTick {
    Moved { eaten: Option<Eaten> },
    Collision,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnakeState {
    pub width: i32,
    pub height: i32,
    /// Head first
    pub body: VecDeque<Cell>,
    /// Direction of the last completed move
    pub direction: Direction,
    /// Buffered direction for the next move
    pub next_direction: Direction,
    pub food: Option<Cell>,
    pub bonus: Option<BonusFood>,
    pub score: u64,
    pub speed_level: SpeedLevel,
    pub ticks: u64,
}

impl SnakeState {
    /// A new game on the standard grid
    pub fn new(speed_level: SpeedLevel, rng: &mut dyn RandomSource) -> Self {
        let mut state = Self {
            width: GRID_WIDTH,
            height: GRID_HEIGHT,
            body: VecDeque::new(),
            direction: Direction::Right,
            next_direction: Direction::Right,
            food: None,
            bonus: None,
            score: 0,
            speed_level,
            ticks: 0,
        };
        state.reset(rng);
        state
    }

    /// Build a snake from explicit cells (head first), with no food placed.
    pub fn with_body(
        cells: Vec<Cell>,
        direction: Direction,
        speed_level: SpeedLevel,
    ) -> Result<Self, InitError> {
        if cells.is_empty() {
            return Err(InitError::EmptySnake);
        }
        for (i, cell) in cells.iter().enumerate() {
            if !(0..GRID_WIDTH).contains(&cell.x) || !(0..GRID_HEIGHT).contains(&cell.y) {
                return Err(InitError::SnakeOutOfBounds(i));
            }
            if cells[..i].contains(cell) {
                return Err(InitError::SnakeOverlap(i));
            }
        }
        for (i, pair) in cells.windows(2).enumerate() {
            if !pair[0].is_adjacent(pair[1]) {
                return Err(InitError::DetachedSnake(i, i + 1));
            }
        }
        Ok(Self {
            width: GRID_WIDTH,
            height: GRID_HEIGHT,
            body: cells.into(),
            direction,
            next_direction: direction,
            food: None,
            bonus: None,
            score: 0,
            speed_level,
            ticks: 0,
        })
    }

    fn reset(&mut self, rng: &mut dyn RandomSource) {
        let mid = Cell::new(self.width / 2, self.height / 2);
        self.body = (0..START_LENGTH as i32)
            .map(|i| Cell::new(mid.x - i, mid.y))
            .collect();
        self.direction = Direction::Right;
        self.next_direction = Direction::Right;
        self.bonus = None;
        self.score = 0;
        self.ticks = 0;
        self.food = None;
        self.food = self.free_cell(rng);
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn interval(&self) -> Duration {
        tick_interval(self.score, self.speed_level)
    }

    fn in_bounds(&self, cell: Cell) -> bool {
        (0..self.width).contains(&cell.x) && (0..self.height).contains(&cell.y)
    }

    /// Buffer a turn; only a straight reversal is refused.
    pub fn turn(&mut self, dir: Direction) {
        if dir == self.direction.opposite() {
            log::debug!("Ignoring reversal {:?} while heading {:?}", dir, self.direction);
            return;
        }
        self.next_direction = dir;
    }

    /// Uniformly chosen cell free of snake, food and bonus
    fn free_cell(&self, rng: &mut dyn RandomSource) -> Option<Cell> {
        let bonus = self.bonus.map(|b| b.cell);
        let free: Vec<Cell> = (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| Cell::new(x, y)))
            .filter(|c| !self.body.contains(c) && Some(*c) != self.food && Some(*c) != bonus)
            .collect();
        if free.is_empty() {
            None
        } else {
            Some(free[rng.next_index(free.len())])
        }
    }

    /// Advance the snake by one cell.
    pub fn advance(&mut self, rng: &mut dyn RandomSource) -> SnakeTick {
        self.direction = self.next_direction;
        let head = self.head().step(self.direction);
        if !self.in_bounds(head) || self.body.contains(&head) {
            return SnakeTick::Collision;
        }

        self.body.push_front(head);
        self.ticks += 1;

        let mut eaten = None;
        let mut bonus_spawned = false;
        if self.food == Some(head) {
            self.score += FOOD_POINTS;
            eaten = Some(Eaten::Food);
            self.food = None;
            self.food = self.free_cell(rng);
            if self.bonus.is_none() && rng.chance(BONUS_SPAWN_CHANCE) {
                self.bonus = self.free_cell(rng).map(|cell| BonusFood {
                    cell,
                    ticks_left: BONUS_LIFETIME_TICKS,
                });
                bonus_spawned = self.bonus.is_some();
            }
        } else if self.bonus.is_some_and(|b| b.cell == head) {
            self.score += BONUS_POINTS;
            eaten = Some(Eaten::Bonus);
            self.bonus = None;
        } else {
            self.body.pop_back();
        }

        if !bonus_spawned {
            if let Some(bonus) = self.bonus.as_mut() {
                bonus.ticks_left = bonus.ticks_left.saturating_sub(1);
                if bonus.ticks_left == 0 {
                    self.bonus = None;
                }
            }
        }

        SnakeTick::Moved { eaten }
    }
}

impl Simulation for SnakeState {
    type Command = SnakeCommand;

    const NAME: &'static str = "snake";

    fn initialize(&mut self, _level: u32, rng: &mut dyn RandomSource) {
        self.reset(rng);
        log::info!("Snake reset at speed level {}", self.speed_level.get());
    }

    fn command(&mut self, command: SnakeCommand, _rng: &mut dyn RandomSource) -> Option<Outcome> {
        match command {
            SnakeCommand::Turn(dir) => self.turn(dir),
            SnakeCommand::SetSpeedLevel(level) => self.speed_level = level,
            SnakeCommand::SpeedUp => self.speed_level = self.speed_level.faster(),
            SnakeCommand::SlowDown => self.speed_level = self.speed_level.slower(),
        }
        None
    }

    fn accepts_while_idle(command: &SnakeCommand) -> bool {
        !matches!(command, SnakeCommand::Turn(_))
    }

    fn step(&mut self, rng: &mut dyn RandomSource) -> Step {
        match self.advance(rng) {
            SnakeTick::Collision => Step {
                outcome: Some(Outcome::SelfOrWallCollision),
                next_delay: None,
            },
            SnakeTick::Moved { .. } => Step {
                outcome: None,
                next_delay: Some(self.interval()),
            },
        }
    }

    fn first_delay(&self) -> Option<Duration> {
        Some(self.interval())
    }

    fn score(&self) -> u64 {
        self.score
    }
}
