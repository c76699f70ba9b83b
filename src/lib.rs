//! Arcade Trio - breakout, a sliding-tile puzzle and snake
//!
//! Core modules:
//! - `sim`: Deterministic simulations (breakout physics, tile merging, snake)
//! - `lifecycle`: Generic start/play/pause/game-over state machine
//! - `scheduler`: Cancellable tick scheduling on a virtual clock
//! - `rng`: Injectable randomness
//! - `persistence` / `highscores`: Best score per game
//! - `settings`: Player preferences loaded from JSON

pub mod error;
pub mod highscores;
pub mod lifecycle;
pub mod persistence;
pub mod rng;
pub mod scheduler;
pub mod settings;
pub mod sim;

pub use error::InitError;
pub use highscores::HighScores;
pub use lifecycle::{GameController, Input, LifecycleHooks, LifecycleState, NoHooks, Snapshot};
pub use persistence::{JsonFileStore, MemoryStore, ScoreStore};
pub use rng::{RandomSource, ScriptedRandom, SeededRandom};
pub use scheduler::{ManualScheduler, Scheduler, TickHandle};
pub use settings::Settings;
pub use sim::{Direction, Outcome, Simulation, Step};
