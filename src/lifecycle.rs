//! Game lifecycle state machine
//!
//! One controller type drives any [`Simulation`]. It owns the lifecycle
//! state, validates inputs against it, schedules ticks and turns the
//! outcomes simulations report into state transitions.
//!
//! ```text
//! Start ──start──▶ Playing ◀──pause toggle──▶ Paused
//!                   │  ▲
//!     loss outcome  │  │ continue / next level
//!                   ▼  │
//!         GameOver   Won   LevelComplete
//! ```
//!
//! Restart and main menu return to `Start` from any state.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::highscores::HighScores;
use crate::persistence::ScoreStore;
use crate::rng::RandomSource;
use crate::scheduler::{ManualScheduler, Scheduler, TickHandle};
use crate::sim::{BreakoutState, Outcome, Simulation, SnakeState, TileGame};

/// Lifecycle phase of one game instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    /// Waiting for the player to start
    Start,
    Playing,
    Paused,
    GameOver,
    /// Puzzle target reached; the player may keep going
    Won,
    /// Breakout board cleared; waiting for the next level
    LevelComplete,
}

impl LifecycleState {
    /// States in which ticks run
    pub fn is_running(self) -> bool {
        self == LifecycleState::Playing
    }
}

/// Everything the player can ask a controller to do
#[derive(Debug, Clone, PartialEq)]
pub enum Input<C> {
    Start,
    TogglePause,
    /// Keep playing after a win
    Continue,
    NextLevel,
    Restart,
    MainMenu,
    /// Game-specific command (direction, launch, speed, ...)
    Game(C),
}

/// Per-game reactions to lifecycle milestones
pub trait LifecycleHooks<S> {
    fn on_win(&mut self, _sim: &S) {}
    fn on_game_over(&mut self, _sim: &S) {}
    fn on_level_complete(&mut self, _sim: &S, _level: u32) {}
}

/// Hooks that do nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl<S> LifecycleHooks<S> for NoHooks {}

/// Immutable view of a game handed to renderers
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<S> {
    pub state: LifecycleState,
    pub level: u32,
    pub score: u64,
    pub best_score: Option<u64>,
    pub sim: S,
}

pub struct GameController<S: Simulation> {
    sim: S,
    state: LifecycleState,
    level: u32,
    rng: Box<dyn RandomSource>,
    scheduler: Box<dyn Scheduler>,
    /// The only tick allowed to fire; anything else popped is stale
    pending: Option<TickHandle>,
    high_scores: HighScores,
    hooks: Box<dyn LifecycleHooks<S>>,
}

impl<S: Simulation + 'static> GameController<S> {
    /// Wrap a ready-built simulation at level 1, in the `Start` state.
    pub fn new(sim: S, rng: Box<dyn RandomSource>, store: Box<dyn ScoreStore>) -> Self {
        Self {
            sim,
            state: LifecycleState::Start,
            level: 1,
            rng,
            scheduler: Box::new(ManualScheduler::new()),
            pending: None,
            high_scores: HighScores::load(S::NAME, store),
            hooks: Box::new(NoHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: impl LifecycleHooks<S> + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    pub fn with_scheduler(mut self, scheduler: impl Scheduler + 'static) -> Self {
        self.scheduler = Box::new(scheduler);
        self
    }
}

impl<S: Simulation> GameController<S> {
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score(&self) -> u64 {
        self.sim.score()
    }

    pub fn best_score(&self) -> Option<u64> {
        self.high_scores.best()
    }

    pub fn sim(&self) -> &S {
        &self.sim
    }

    /// Time on the controller's clock
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn snapshot(&self) -> Snapshot<S> {
        Snapshot {
            state: self.state,
            level: self.level,
            score: self.sim.score(),
            best_score: self.high_scores.best(),
            sim: self.sim.clone(),
        }
    }

    /// Apply one input. Returns false, changing nothing, if the input makes
    /// no sense in the current state.
    pub fn apply_input(&mut self, input: Input<S::Command>) -> bool {
        use LifecycleState::*;

        match (input, self.state) {
            (Input::Start, Start) => {
                self.enter_playing();
                log::info!("{}: started level {}", S::NAME, self.level);
            }
            (Input::TogglePause, Playing) => {
                self.cancel_pending();
                self.state = Paused;
                log::info!("{}: paused", S::NAME);
            }
            (Input::TogglePause, Paused) => {
                self.enter_playing();
                log::info!("{}: resumed", S::NAME);
            }
            (Input::Continue, Won) => {
                self.sim.continue_after_win();
                self.enter_playing();
                log::info!("{}: continuing after win", S::NAME);
            }
            (Input::NextLevel, LevelComplete) => {
                self.level += 1;
                self.sim.next_level(self.level, self.rng.as_mut());
                self.enter_playing();
            }
            (Input::Restart | Input::MainMenu, _) => self.reset(),
            (Input::Game(command), state) => {
                if !state.is_running() && !S::accepts_while_idle(&command) {
                    log::debug!("{}: ignoring {:?} while {:?}", S::NAME, command, state);
                    return false;
                }
                let outcome = self.sim.command(command, self.rng.as_mut());
                if let Some(outcome) = outcome {
                    if self.state.is_running() {
                        self.finish(outcome);
                    }
                }
            }
            (input, state) => {
                log::debug!("{}: ignoring {:?} while {:?}", S::NAME, input_name(&input), state);
                return false;
            }
        }
        true
    }

    /// Let `elapsed` pass on the virtual clock, running every tick that
    /// comes due, and return the resulting snapshot.
    pub fn advance(&mut self, elapsed: Duration) -> Snapshot<S> {
        let until = self.scheduler.now() + elapsed;
        while let Some(handle) = self.scheduler.pop_due(until) {
            self.fire(handle);
        }
        self.scheduler.advance_to(until);
        self.snapshot()
    }

    /// Run one tick right now, replacing any pending one.
    pub fn tick(&mut self) -> Snapshot<S> {
        if self.state.is_running() {
            self.cancel_pending();
            self.run_tick();
        }
        self.snapshot()
    }

    fn fire(&mut self, handle: TickHandle) {
        if self.pending != Some(handle) {
            log::debug!("{}: stale tick {:?} ignored", S::NAME, handle);
            return;
        }
        self.pending = None;
        if self.state.is_running() {
            self.run_tick();
        }
    }

    fn run_tick(&mut self) {
        let step = self.sim.step(self.rng.as_mut());
        if let Some(outcome) = step.outcome {
            self.finish(outcome);
        } else if let Some(delay) = step.next_delay {
            self.pending = Some(self.scheduler.schedule(delay));
        }
    }

    fn enter_playing(&mut self) {
        self.state = LifecycleState::Playing;
        self.cancel_pending();
        if let Some(delay) = self.sim.first_delay() {
            self.pending = Some(self.scheduler.schedule(delay));
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        self.cancel_pending();
        let score = self.sim.score();
        self.high_scores.submit(score);
        self.state = match outcome {
            Outcome::ReachedTargetTile => {
                self.hooks.on_win(&self.sim);
                LifecycleState::Won
            }
            Outcome::BoardCleared => {
                self.hooks.on_level_complete(&self.sim, self.level);
                LifecycleState::LevelComplete
            }
            Outcome::LostAllBalls | Outcome::NoMovesPossible | Outcome::SelfOrWallCollision => {
                self.hooks.on_game_over(&self.sim);
                LifecycleState::GameOver
            }
        };
        log::info!(
            "{}: {:?} -> {:?} (score {})",
            S::NAME,
            outcome,
            self.state,
            score
        );
    }

    fn reset(&mut self) {
        self.cancel_pending();
        self.high_scores.submit(self.sim.score());
        self.level = 1;
        self.sim.initialize(self.level, self.rng.as_mut());
        self.state = LifecycleState::Start;
        log::info!("{}: back to start", S::NAME);
    }
}

fn input_name<C>(input: &Input<C>) -> &'static str {
    match input {
        Input::Start => "Start",
        Input::TogglePause => "TogglePause",
        Input::Continue => "Continue",
        Input::NextLevel => "NextLevel",
        Input::Restart => "Restart",
        Input::MainMenu => "MainMenu",
        Input::Game(_) => "Game",
    }
}

impl GameController<TileGame> {
    pub fn highest_tile(&self) -> u32 {
        self.sim.highest_tile()
    }

    pub fn empty_cell_count(&self) -> usize {
        self.sim.grid.empty_cells().len()
    }
}

impl GameController<SnakeState> {
    pub fn snake_length(&self) -> usize {
        self.sim.len()
    }
}

impl GameController<BreakoutState> {
    pub fn lives(&self) -> u8 {
        self.sim.lives()
    }
}
