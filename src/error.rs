//! Precondition failures raised while building simulation state

use thiserror::Error;

/// A simulation could not be initialized from the supplied data.
///
/// These only come out of constructors; a running simulation never fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
    #[error("tile grid must be {expected}x{expected}, got {rows} rows")]
    GridShape { expected: usize, rows: usize },
    #[error("tile grid row {row} must have {expected} cells, got {len}")]
    RowLength { row: usize, expected: usize, len: usize },
    #[error("tile value {0} is not a power of two")]
    TileValue(u32),
    #[error("snake body must not be empty")]
    EmptySnake,
    #[error("snake cells {0} and {1} are not adjacent")]
    DetachedSnake(usize, usize),
    #[error("snake cell {0} lies outside the grid")]
    SnakeOutOfBounds(usize),
    #[error("snake cell {0} overlaps another segment")]
    SnakeOverlap(usize),
    #[error("speed level {0} is outside 1..=5")]
    SpeedLevel(u8),
}
