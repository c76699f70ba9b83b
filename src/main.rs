//! Headless demo: plays each game with a simple autopilot on a virtual clock
//!
//! Usage: `arcade-trio [settings.json]`

use std::path::Path;
use std::time::Duration;

use arcade_trio::sim::breakout::consts::FRAME;
use arcade_trio::sim::tiles::slide;
use arcade_trio::sim::{
    BreakoutCommand, BreakoutState, Direction, SnakeCommand, SnakeState, TileCommand, TileGame,
};
use arcade_trio::{
    GameController, InitError, Input, JsonFileStore, LifecycleState, MemoryStore, ScoreStore,
    SeededRandom, Settings,
};

/// Game time each demo may use before it is cut off
const DEMO_LIMIT: Duration = Duration::from_secs(120);
const MAX_BREAKOUT_LEVEL: u32 = 3;
const MAX_TILE_MOVES: u32 = 5_000;

fn main() -> Result<(), InitError> {
    env_logger::init();

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(Path::new(&path)),
        None => Settings::default(),
    };
    let seed = settings.seed.unwrap_or_else(rand::random);
    log::info!("Arcade Trio demo starting (seed {seed})");

    let breakout = play_breakout(&settings, seed);
    let tiles = play_tiles(&settings, seed);
    let snake = play_snake(&settings, seed)?;

    println!("breakout: {breakout}");
    println!("tiles:    {tiles}");
    println!("snake:    {snake}");
    Ok(())
}

fn open_store(settings: &Settings) -> Box<dyn ScoreStore> {
    match &settings.scores_path {
        Some(path) => Box::new(JsonFileStore::new(path)),
        None => Box::new(MemoryStore::new()),
    }
}

fn summary(state: LifecycleState, score: u64, best: Option<u64>) -> String {
    match best {
        Some(best) => format!("{state:?}, score {score} (best {best})"),
        None => format!("{state:?}, score {score}"),
    }
}

fn play_breakout(settings: &Settings, seed: u64) -> String {
    let mut rng = SeededRandom::new(seed);
    let state = BreakoutState::new(1, settings.lives(), &mut rng);
    let mut game = GameController::new(state, Box::new(rng), open_store(settings));

    game.apply_input(Input::Start);
    while game.now() < DEMO_LIMIT {
        match game.state() {
            LifecycleState::Playing => {}
            LifecycleState::LevelComplete if game.level() < MAX_BREAKOUT_LEVEL => {
                game.apply_input(Input::NextLevel);
            }
            _ => break,
        }
        let sim = game.sim();
        if !sim.launched {
            game.apply_input(Input::Game(BreakoutCommand::Launch));
        } else if let Some(ball) = sim.balls.iter().max_by(|a, b| a.pos.y.total_cmp(&b.pos.y)) {
            // Hit slightly off-center so the ball does not bounce straight up
            let aim = ball.pos.x - sim.paddle.width * 0.2;
            game.apply_input(Input::Game(BreakoutCommand::Pointer(aim)));
        }
        game.advance(FRAME);
    }

    log::info!(
        "Breakout stopped on level {} with {} lives",
        game.level(),
        game.lives()
    );
    summary(game.state(), game.score(), game.best_score())
}

fn play_tiles(settings: &Settings, seed: u64) -> String {
    let mut rng = SeededRandom::new(seed.wrapping_add(1));
    let puzzle = TileGame::new(&mut rng);
    let mut game = GameController::new(puzzle, Box::new(rng), open_store(settings));

    game.apply_input(Input::Start);
    for _ in 0..MAX_TILE_MOVES {
        match game.state() {
            LifecycleState::Playing => {}
            LifecycleState::Won => {
                game.apply_input(Input::Continue);
                continue;
            }
            _ => break,
        }
        // Greedy: the legal move that scores most, preferring the order below
        let grid = game.sim().grid;
        let best = [Direction::Left, Direction::Down, Direction::Right, Direction::Up]
            .into_iter()
            .map(|dir| (dir, slide(&grid, dir)))
            .filter(|(_, result)| result.moved)
            .max_by_key(|(_, result)| result.score);
        match best {
            Some((dir, _)) => {
                game.apply_input(Input::Game(TileCommand::Move(dir)));
            }
            None => break,
        }
    }

    log::info!("Puzzle reached tile {}", game.highest_tile());
    summary(game.state(), game.score(), game.best_score())
}

fn play_snake(settings: &Settings, seed: u64) -> Result<String, InitError> {
    let speed = settings.speed_level()?;
    let mut rng = SeededRandom::new(seed.wrapping_add(2));
    let snake = SnakeState::new(speed, &mut rng);
    let mut game = GameController::new(snake, Box::new(rng), open_store(settings));

    game.apply_input(Input::Start);
    while game.state() == LifecycleState::Playing && game.now() < DEMO_LIMIT {
        if let Some(dir) = choose_snake_turn(game.sim()) {
            game.apply_input(Input::Game(SnakeCommand::Turn(dir)));
        }
        let interval = game.sim().interval();
        game.advance(interval);
    }

    log::info!("Snake ended with length {}", game.snake_length());
    Ok(summary(game.state(), game.score(), game.best_score()))
}

/// Safe direction that gets closest to the food, if any is safe
fn choose_snake_turn(snake: &SnakeState) -> Option<Direction> {
    let head = snake.head();
    let target = snake.bonus.map(|b| b.cell).or(snake.food)?;
    Direction::ALL
        .into_iter()
        .filter(|&dir| dir != snake.direction.opposite())
        .filter(|&dir| {
            let next = head.step(dir);
            (0..snake.width).contains(&next.x)
                && (0..snake.height).contains(&next.y)
                && !snake.body.contains(&next)
        })
        .min_by_key(|&dir| {
            let next = head.step(dir);
            (next.x - target.x).abs() + (next.y - target.y).abs()
        })
}
