//! Sliding-tile merge puzzle
//!
//! Every move is expressed as "slide left": the grid is rotated so the
//! requested direction points left, each row is compacted and merged, and
//! the result is rotated back.

use serde::{Deserialize, Serialize};

use super::{Direction, Outcome, Simulation, Step};
use crate::error::InitError;
use crate::rng::RandomSource;

/// Width and height of the board
pub const GRID_SIZE: usize = 4;
/// Reaching this tile wins the game
pub const TARGET_TILE: u32 = 1024;
/// Probability that a spawned tile is a 2 (otherwise 4)
pub const SPAWN_TWO_CHANCE: f64 = 0.9;
/// Tiles placed on an empty board
pub const STARTING_TILES: usize = 2;
/// Largest representable tile; two of these never merge
pub const MAX_TILE: u32 = 1 << 31;

pub type Cells = [[u32; GRID_SIZE]; GRID_SIZE];

/// The 4×4 board; `0` is an empty cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TileGrid {
    cells: Cells,
}

impl TileGrid {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a grid from rows, validating shape and tile values.
    pub fn from_rows(rows: &[Vec<u32>]) -> Result<Self, InitError> {
        if rows.len() != GRID_SIZE {
            return Err(InitError::GridShape {
                expected: GRID_SIZE,
                rows: rows.len(),
            });
        }
        let mut cells = [[0; GRID_SIZE]; GRID_SIZE];
        for (r, row) in rows.iter().enumerate() {
            if row.len() != GRID_SIZE {
                return Err(InitError::RowLength {
                    row: r,
                    expected: GRID_SIZE,
                    len: row.len(),
                });
            }
            cells[r].copy_from_slice(row);
        }
        Self::from_cells(cells)
    }

    pub fn from_cells(cells: Cells) -> Result<Self, InitError> {
        if let Some(&bad) = cells
            .iter()
            .flatten()
            .find(|&&v| v != 0 && !v.is_power_of_two())
        {
            return Err(InitError::TileValue(bad));
        }
        Ok(Self { cells })
    }

    pub fn cells(&self) -> &Cells {
        &self.cells
    }

    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.cells[row][col]
    }

    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        let mut empty = Vec::new();
        for (r, row) in self.cells.iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                if v == 0 {
                    empty.push((r, c));
                }
            }
        }
        empty
    }

    pub fn highest_tile(&self) -> u32 {
        self.cells.iter().flatten().copied().max().unwrap_or(0)
    }

    /// True if any empty cell exists or two orthogonal neighbours match
    pub fn can_move(&self) -> bool {
        for r in 0..GRID_SIZE {
            for c in 0..GRID_SIZE {
                let v = self.cells[r][c];
                if v == 0 {
                    return true;
                }
                if c + 1 < GRID_SIZE && can_merge(v, self.cells[r][c + 1]) {
                    return true;
                }
                if r + 1 < GRID_SIZE && can_merge(v, self.cells[r + 1][c]) {
                    return true;
                }
            }
        }
        false
    }

    pub fn has_won(&self, target: u32) -> bool {
        self.cells.iter().flatten().any(|&v| v >= target)
    }

    /// Rotate clockwise by `turns` quarter turns
    fn rotated(&self, turns: usize) -> Self {
        let mut out = *self;
        for _ in 0..turns % 4 {
            let src = out.cells;
            for (r, row) in out.cells.iter_mut().enumerate() {
                for (c, cell) in row.iter_mut().enumerate() {
                    *cell = src[GRID_SIZE - 1 - c][r];
                }
            }
        }
        out
    }
}

fn can_merge(a: u32, b: u32) -> bool {
    a != 0 && a == b && a < MAX_TILE
}

/// Quarter turns that bring `dir` onto "slide left"
fn turns_for(dir: Direction) -> usize {
    match dir {
        Direction::Left => 0,
        Direction::Down => 1,
        Direction::Right => 2,
        Direction::Up => 3,
    }
}

/// Result of sliding a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideResult {
    pub grid: TileGrid,
    /// Sum of all tiles produced by merges
    pub score: u64,
    /// Whether the grid changed
    pub moved: bool,
}

/// Slide and merge every row toward `dir`.
pub fn slide(grid: &TileGrid, dir: Direction) -> SlideResult {
    let turns = turns_for(dir);
    let mut rotated = grid.rotated(turns);
    let mut score = 0;
    for row in rotated.cells.iter_mut() {
        let (merged, gained) = slide_row_left(*row);
        *row = merged;
        score += gained;
    }
    let result = rotated.rotated((4 - turns) % 4);
    SlideResult {
        grid: result,
        score,
        moved: result != *grid,
    }
}

/// Compact a row to the left, merging each equal pair once.
fn slide_row_left(row: [u32; GRID_SIZE]) -> ([u32; GRID_SIZE], u64) {
    let tiles: Vec<u32> = row.iter().copied().filter(|&v| v != 0).collect();
    let mut out = [0; GRID_SIZE];
    let mut gained = 0;
    let mut write = 0;
    let mut i = 0;
    while i < tiles.len() {
        if i + 1 < tiles.len() && can_merge(tiles[i], tiles[i + 1]) {
            let merged = tiles[i] * 2;
            out[write] = merged;
            gained += u64::from(merged);
            i += 2;
        } else {
            out[write] = tiles[i];
            i += 1;
        }
        write += 1;
    }
    (out, gained)
}

/// Place a 2 (90%) or 4 (10%) on a uniformly chosen empty cell.
///
/// Returns the cell that was filled, or `None` if the grid is full.
pub fn add_random_tile(grid: &mut TileGrid, rng: &mut dyn RandomSource) -> Option<(usize, usize)> {
    let empty = grid.empty_cells();
    if empty.is_empty() {
        return None;
    }
    let (r, c) = empty[rng.next_index(empty.len())];
    grid.cells[r][c] = if rng.chance(SPAWN_TWO_CHANCE) { 2 } else { 4 };
    Some((r, c))
}

/// Puzzle input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileCommand {
    Move(Direction),
}

/// What a single move did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveReport {
    pub moved: bool,
    pub gained: u64,
    pub spawned: Option<(usize, usize)>,
    pub outcome: Option<Outcome>,
}

/// Full puzzle state: board, running score and the continue-after-win flag
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TileGame {
    pub grid: TileGrid,
    pub score: u64,
    /// Set once the player continues past the target; suppresses repeat wins
    pub already_won: bool,
    pub moves: u32,
}

impl TileGame {
    /// A fresh board with two starting tiles
    pub fn new(rng: &mut dyn RandomSource) -> Self {
        let mut game = Self::default();
        game.reset(rng);
        game
    }

    /// Resume from an existing board (no tiles are added)
    pub fn from_grid(grid: TileGrid) -> Self {
        Self {
            grid,
            ..Self::default()
        }
    }

    fn reset(&mut self, rng: &mut dyn RandomSource) {
        *self = Self::default();
        for _ in 0..STARTING_TILES {
            add_random_tile(&mut self.grid, rng);
        }
    }

    /// Slide, spawn and evaluate as one atomic step.
    ///
    /// A move that leaves the grid unchanged spawns nothing and is not
    /// re-evaluated.
    pub fn apply_move(&mut self, dir: Direction, rng: &mut dyn RandomSource) -> MoveReport {
        let result = slide(&self.grid, dir);
        if !result.moved {
            return MoveReport::default();
        }
        self.grid = result.grid;
        self.score += result.score;
        self.moves += 1;
        let spawned = add_random_tile(&mut self.grid, rng);
        MoveReport {
            moved: true,
            gained: result.score,
            spawned,
            outcome: self.evaluate(),
        }
    }

    /// A first-time win beats a game over on the same move.
    pub fn evaluate(&self) -> Option<Outcome> {
        if !self.already_won && self.grid.has_won(TARGET_TILE) {
            Some(Outcome::ReachedTargetTile)
        } else if !self.grid.can_move() {
            Some(Outcome::NoMovesPossible)
        } else {
            None
        }
    }

    pub fn highest_tile(&self) -> u32 {
        self.grid.highest_tile()
    }
}

impl Simulation for TileGame {
    type Command = TileCommand;

    const NAME: &'static str = "tiles";

    fn initialize(&mut self, _level: u32, rng: &mut dyn RandomSource) {
        self.reset(rng);
        log::info!("Tile puzzle reset, highest tile {}", self.highest_tile());
    }

    fn command(&mut self, command: TileCommand, rng: &mut dyn RandomSource) -> Option<Outcome> {
        match command {
            TileCommand::Move(dir) => self.apply_move(dir, rng).outcome,
        }
    }

    fn step(&mut self, _rng: &mut dyn RandomSource) -> Step {
        Step::default()
    }

    fn first_delay(&self) -> Option<std::time::Duration> {
        None
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn continue_after_win(&mut self) {
        self.already_won = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRandom;
    use proptest::prelude::*;

    fn grid(rows: [[u32; 4]; 4]) -> TileGrid {
        TileGrid::from_cells(rows).unwrap()
    }

    fn single_row(row: [u32; 4]) -> TileGrid {
        grid([row, [0; 4], [0; 4], [0; 4]])
    }

    #[test]
    fn test_merge_pair_left() {
        let result = slide(&single_row([2, 2, 0, 0]), Direction::Left);
        assert_eq!(result.grid.cells()[0], [4, 0, 0, 0]);
        assert_eq!(result.score, 4);
        assert!(result.moved);
    }

    #[test]
    fn test_unmergeable_row_does_not_move() {
        let result = slide(&single_row([2, 4, 8, 16]), Direction::Left);
        assert_eq!(result.grid.cells()[0], [2, 4, 8, 16]);
        assert_eq!(result.score, 0);
        assert!(!result.moved);
    }

    #[test]
    fn test_no_double_merge() {
        let result = slide(&single_row([2, 2, 2, 0]), Direction::Left);
        assert_eq!(result.grid.cells()[0], [4, 2, 0, 0]);

        let result = slide(&single_row([2, 2, 2, 2]), Direction::Left);
        assert_eq!(result.grid.cells()[0], [4, 4, 0, 0]);
        assert_eq!(result.score, 8);

        let result = slide(&single_row([4, 4, 8, 0]), Direction::Left);
        assert_eq!(result.grid.cells()[0], [8, 8, 0, 0]);
    }

    #[test]
    fn test_slide_right() {
        let result = slide(&single_row([2, 2, 2, 0]), Direction::Right);
        assert_eq!(result.grid.cells()[0], [0, 0, 2, 4]);
    }

    #[test]
    fn test_slide_up_and_down() {
        let g = grid([[2, 0, 0, 0], [2, 0, 0, 0], [0, 0, 0, 0], [4, 0, 0, 0]]);
        let up = slide(&g, Direction::Up);
        assert_eq!(up.grid.get(0, 0), 4);
        assert_eq!(up.grid.get(1, 0), 4);
        assert_eq!(up.grid.get(2, 0), 0);
        assert_eq!(up.score, 4);

        let down = slide(&g, Direction::Down);
        assert_eq!(down.grid.get(3, 0), 4);
        assert_eq!(down.grid.get(2, 0), 4);
        assert_eq!(down.grid.get(1, 0), 0);
    }

    #[test]
    fn test_can_move() {
        let locked = grid([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        assert!(!locked.can_move());

        let with_hole = grid([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 0, 4], [4, 2, 4, 2]]);
        assert!(with_hole.can_move());

        let vertical_pair = grid([[2, 4, 2, 4], [2, 8, 4, 2], [8, 4, 2, 4], [4, 2, 4, 2]]);
        assert!(vertical_pair.can_move());
    }

    #[test]
    fn test_add_random_tile() {
        let mut g = TileGrid::empty();
        // first sample picks the cell, second decides 2 vs 4
        let mut rng = ScriptedRandom::new(vec![0.0, 0.95]);
        assert_eq!(add_random_tile(&mut g, &mut rng), Some((0, 0)));
        assert_eq!(g.get(0, 0), 4);

        let mut full = grid([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        let before = full;
        assert_eq!(add_random_tile(&mut full, &mut rng), None);
        assert_eq!(full, before);
    }

    #[test]
    fn test_rejects_bad_grids() {
        assert!(matches!(
            TileGrid::from_rows(&vec![vec![0; 4]; 3]),
            Err(InitError::GridShape { rows: 3, .. })
        ));
        assert!(matches!(
            TileGrid::from_rows(&[vec![0, 0, 0, 0], vec![0, 3, 0, 0], vec![0; 4], vec![0; 4]]),
            Err(InitError::TileValue(3))
        ));
        assert_eq!(
            TileGrid::from_rows(&[vec![0; 4], vec![0; 4], vec![0; 3], vec![0; 4]]),
            Err(InitError::RowLength {
                row: 2,
                expected: 4,
                len: 3
            })
        );
    }

    #[test]
    fn test_largest_tiles_do_not_merge() {
        let g = single_row([MAX_TILE, MAX_TILE, 0, 0]);
        let result = slide(&g, Direction::Left);
        assert!(!result.moved);
        assert_eq!(result.score, 0);

        let full = grid([
            [MAX_TILE, MAX_TILE, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 4],
            [4, 2, 4, 2],
        ]);
        assert!(!full.can_move());
    }

    #[test]
    fn test_score_does_not_wrap() {
        let half = MAX_TILE / 2;
        let result = slide(&single_row([half, half, half, half]), Direction::Left);
        assert_eq!(result.grid.cells()[0], [MAX_TILE, MAX_TILE, 0, 0]);
        assert_eq!(result.score, 2 * u64::from(MAX_TILE));
    }

    #[test]
    fn test_win_reported_once() {
        let mut rng = ScriptedRandom::constant(0.0);
        let mut game = TileGame::from_grid(single_row([512, 512, 0, 0]));
        let report = game.apply_move(Direction::Left, &mut rng);
        assert_eq!(report.outcome, Some(Outcome::ReachedTargetTile));
        assert_eq!(game.score, 1024);

        game.continue_after_win();
        assert_eq!(game.evaluate(), None);
    }

    #[test]
    fn test_win_beats_game_over() {
        let game = TileGame::from_grid(grid([
            [1024, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 4],
            [4, 2, 4, 2],
        ]));
        assert_eq!(game.evaluate(), Some(Outcome::ReachedTargetTile));

        let mut continued = game.clone();
        continued.continue_after_win();
        assert_eq!(continued.evaluate(), Some(Outcome::NoMovesPossible));
    }

    #[test]
    fn test_noop_move_spawns_nothing() {
        let mut rng = ScriptedRandom::constant(0.5);
        let mut game = TileGame::from_grid(single_row([2, 4, 8, 16]));
        let before = game.clone();
        let report = game.apply_move(Direction::Left, &mut rng);
        assert!(!report.moved);
        assert_eq!(game, before);
    }

    #[test]
    fn test_new_game_has_two_tiles() {
        let mut rng = crate::rng::SeededRandom::new(3);
        let game = TileGame::new(&mut rng);
        assert_eq!(game.grid.empty_cells().len(), GRID_SIZE * GRID_SIZE - 2);
        assert_eq!(game.score, 0);
    }

    fn tile() -> impl Strategy<Value = u32> {
        prop_oneof![Just(0u32), (1u32..11).prop_map(|e| 1u32 << e)]
    }

    fn any_grid() -> impl Strategy<Value = TileGrid> {
        prop::array::uniform4(prop::array::uniform4(tile()))
            .prop_map(|cells| TileGrid::from_cells(cells).unwrap())
    }

    fn any_direction() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::Up),
            Just(Direction::Down),
            Just(Direction::Left),
            Just(Direction::Right),
        ]
    }

    proptest! {
        #[test]
        fn prop_slide_preserves_tile_sum(g in any_grid(), dir in any_direction()) {
            let before: u32 = g.cells().iter().flatten().sum();
            let result = slide(&g, dir);
            let after: u32 = result.grid.cells().iter().flatten().sum();
            prop_assert_eq!(before, after);
        }

        #[test]
        fn prop_moved_iff_changed(g in any_grid(), dir in any_direction()) {
            let result = slide(&g, dir);
            prop_assert_eq!(result.moved, result.grid != g);
        }

        #[test]
        fn prop_rotation_round_trips(g in any_grid(), turns in 0usize..4) {
            prop_assert_eq!(g.rotated(turns).rotated((4 - turns) % 4), g);
        }

        #[test]
        fn prop_slide_is_idempotent_without_merges(g in any_grid(), dir in any_direction()) {
            let once = slide(&g, dir);
            if once.score == 0 {
                prop_assert!(!slide(&once.grid, dir).moved);
            }
        }
    }
}
