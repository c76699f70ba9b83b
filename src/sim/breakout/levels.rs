//! Brick layouts per level
//!
//! Levels cycle through a fixed set of patterns. Steel bricks start showing
//! up on level 3, and the chance that a brick carries a power-up rises with
//! the level.

use glam::Vec2;

use super::collision::Rect;
use super::consts::*;
use super::state::{Brick, BrickLayout, PowerUpKind};
use crate::rng::RandomSource;

/// First level that places steel bricks
pub const STEEL_FROM_LEVEL: u32 = 3;

/// Row colors, top to bottom
const ROW_COLORS: [u32; BRICK_ROWS] = [0xE53935, 0xFB8C00, 0xFDD835, 0x43A047, 0x1E88E5, 0x8E24AA];
const STEEL_COLOR: u32 = 0x9E9E9E;

/// Layout shapes, chosen by `(level - 1) % 5`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    Wall,
    Checker,
    Pyramid,
    Stripes,
    Fortress,
}

impl Pattern {
    const CYCLE: [Pattern; 5] = [
        Pattern::Wall,
        Pattern::Checker,
        Pattern::Pyramid,
        Pattern::Stripes,
        Pattern::Fortress,
    ];

    pub fn for_level(level: u32) -> Self {
        Self::CYCLE[(level.saturating_sub(1) as usize) % Self::CYCLE.len()]
    }

    /// Whether the pattern places a brick at this slot
    pub fn has_brick(self, col: usize, row: usize) -> bool {
        match self {
            Pattern::Wall | Pattern::Fortress => true,
            Pattern::Checker => (col + row) % 2 == 0,
            Pattern::Pyramid => {
                let dist = (2 * col + 1).abs_diff(BRICK_COLUMNS);
                dist <= 2 * (row + 1)
            }
            Pattern::Stripes => row % 2 == 0 || col % 3 == 0,
        }
    }

    /// Whether a placed brick is steel (only from [`STEEL_FROM_LEVEL`])
    pub fn is_steel(self, level: u32, col: usize, row: usize) -> bool {
        if level < STEEL_FROM_LEVEL {
            return false;
        }
        let last_row = BRICK_ROWS - 1;
        match self {
            Pattern::Wall => row == last_row && col % 3 == 1,
            Pattern::Checker => row == last_row && col % 4 == 1,
            Pattern::Pyramid => row == last_row && (col == 0 || col == BRICK_COLUMNS - 1),
            Pattern::Stripes => row % 2 == 1,
            Pattern::Fortress => row == 0 || col == 0 || col == BRICK_COLUMNS - 1,
        }
    }
}

/// Chance that a non-steel brick carries a power-up
pub fn power_up_chance(level: u32) -> f64 {
    match level {
        0..=1 => 0.10,
        2..=3 => 0.15,
        4..=6 => 0.20,
        _ => 0.25,
    }
}

/// Top-left corner of the brick slot
pub fn brick_origin(col: usize, row: usize) -> Vec2 {
    Vec2::new(
        BRICK_OFFSET_LEFT + col as f32 * (BRICK_WIDTH + BRICK_PADDING),
        BRICK_OFFSET_TOP + row as f32 * (BRICK_HEIGHT + BRICK_PADDING),
    )
}

/// Build the full `[column][row]` layout for a level
pub fn generate_level(level: u32, rng: &mut dyn RandomSource) -> BrickLayout {
    let pattern = Pattern::for_level(level);
    let chance = power_up_chance(level);

    let mut layout: BrickLayout = Vec::with_capacity(BRICK_COLUMNS);
    for col in 0..BRICK_COLUMNS {
        let mut column = Vec::with_capacity(BRICK_ROWS);
        for row in 0..BRICK_ROWS {
            if !pattern.has_brick(col, row) {
                column.push(None);
                continue;
            }
            let steel = pattern.is_steel(level, col, row);
            let power_up = if !steel && rng.chance(chance) {
                Some(if rng.chance(0.5) {
                    PowerUpKind::MultiBall
                } else {
                    PowerUpKind::StretchPaddle
                })
            } else {
                None
            };
            let origin = brick_origin(col, row);
            column.push(Some(Brick {
                rect: Rect::new(origin.x, origin.y, BRICK_WIDTH, BRICK_HEIGHT),
                alive: true,
                color: if steel { STEEL_COLOR } else { ROW_COLORS[row] },
                power_up,
                steel,
            }));
        }
        layout.push(column);
    }

    let total = layout.iter().flatten().flatten().count();
    let steel = layout.iter().flatten().flatten().filter(|b| b.steel).count();
    log::info!(
        "Level {}: {:?} pattern, {} bricks ({} steel)",
        level,
        pattern,
        total,
        steel
    );
    layout
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{ScriptedRandom, SeededRandom};

    #[test]
    fn test_layout_shape() {
        let mut rng = SeededRandom::new(11);
        for level in 1..=10 {
            let layout = generate_level(level, &mut rng);
            assert_eq!(layout.len(), BRICK_COLUMNS);
            assert!(layout.iter().all(|col| col.len() == BRICK_ROWS));
            let breakable = layout
                .iter()
                .flatten()
                .flatten()
                .filter(|b| !b.steel)
                .count();
            assert!(breakable > 0, "level {level} has nothing to break");
        }
    }

    #[test]
    fn test_no_steel_before_level_three() {
        let mut rng = SeededRandom::new(2);
        for level in 1..STEEL_FROM_LEVEL {
            let layout = generate_level(level, &mut rng);
            assert!(layout.iter().flatten().flatten().all(|b| !b.steel));
        }
        let layout = generate_level(4, &mut rng);
        assert!(layout.iter().flatten().flatten().any(|b| b.steel));
    }

    #[test]
    fn test_steel_never_carries_power_up() {
        let mut rng = ScriptedRandom::constant(0.0);
        let layout = generate_level(5, &mut rng);
        for brick in layout.iter().flatten().flatten() {
            assert_eq!(brick.steel, brick.power_up.is_none());
        }
    }

    #[test]
    fn test_power_up_chance_curve() {
        assert_eq!(power_up_chance(1), 0.10);
        assert_eq!(power_up_chance(3), 0.15);
        assert_eq!(power_up_chance(6), 0.20);
        assert_eq!(power_up_chance(7), 0.25);
        assert_eq!(power_up_chance(40), 0.25);
    }

    #[test]
    fn test_pyramid_widens_downward() {
        let p = Pattern::Pyramid;
        let widths: Vec<usize> = (0..BRICK_ROWS)
            .map(|row| (0..BRICK_COLUMNS).filter(|&c| p.has_brick(c, row)).count())
            .collect();
        assert_eq!(widths, vec![2, 4, 6, 8, 10, 10]);
    }

    #[test]
    fn test_bricks_fit_in_arena() {
        let last = brick_origin(BRICK_COLUMNS - 1, BRICK_ROWS - 1);
        assert!(last.x + BRICK_WIDTH <= ARENA_WIDTH);
        assert!(last.y + BRICK_HEIGHT < ARENA_HEIGHT - PADDLE_FLOOR_GAP - PADDLE_HEIGHT);
    }
}
