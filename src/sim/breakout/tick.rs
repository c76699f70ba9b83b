//! Fixed timestep breakout tick
//!
//! Order of work each tick:
//! 1. drop corrupt balls
//! 2. move the paddle
//! 3. pin or launch the served ball
//! 4. move balls, bounce off walls, paddle and bricks
//! 5. spawn, move and collect power-ups
//! 6. settle lives and check for a cleared board

use glam::Vec2;

use super::collision::{bounce_walls, paddle_bounce, resolve_ball_rect};
use super::consts::*;
use super::state::{Ball, BreakoutState, GameEvent, PowerUp, PowerUpKind};
use crate::rng::RandomSource;
use crate::sim::Outcome;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Left key held
    pub left: bool,
    /// Right key held
    pub right: bool,
    /// Pointer x to center the paddle on
    pub pointer_x: Option<f32>,
    /// Launch the served ball
    pub launch: bool,
}

/// What happened during a tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub events: Vec<GameEvent>,
    pub outcome: Option<Outcome>,
}

/// Advance the game state by one fixed timestep
pub fn tick(
    state: &mut BreakoutState,
    input: &TickInput,
    rng: &mut dyn RandomSource,
    dt: f32,
) -> TickReport {
    let mut report = TickReport::default();
    state.time_ticks += 1;

    let before = state.balls.len();
    state.balls.retain(Ball::is_finite);
    if state.balls.len() != before {
        log::warn!("Dropped {} ball(s) with invalid coordinates", before - state.balls.len());
    }

    move_paddle(state, input, dt);

    if !state.launched {
        if state.balls.is_empty() {
            state.serve();
        }
        let paddle = state.paddle.clone();
        for ball in &mut state.balls {
            ball.pin_to(&paddle);
        }
        if input.launch {
            let angle = rng.range(-f64::from(LAUNCH_CONE), f64::from(LAUNCH_CONE)) as f32;
            for ball in &mut state.balls {
                ball.launch(angle);
            }
            state.launched = true;
            report.events.push(GameEvent::Launched);
        }
        // Launched balls start moving next tick
        return report;
    }

    let spawned = move_balls(state, dt, &mut report);
    state.power_ups.extend(spawned);

    update_power_ups(state, rng, dt, &mut report);

    if state.all_cleared() {
        report.outcome = Some(Outcome::BoardCleared);
        return report;
    }

    if state.balls.is_empty() {
        state.lives = state.lives.saturating_sub(1);
        report.events.push(GameEvent::LifeLost {
            lives_left: state.lives,
        });
        if state.lives == 0 {
            report.outcome = Some(Outcome::LostAllBalls);
        } else {
            state.power_ups.clear();
            state.serve();
        }
    }

    report
}

fn move_paddle(state: &mut BreakoutState, input: &TickInput, dt: f32) {
    let paddle = &mut state.paddle;
    if let Some(x) = input.pointer_x {
        paddle.x = x - paddle.width / 2.0;
    }
    let mut dx = 0.0;
    if input.left {
        dx -= PADDLE_SPEED * dt;
    }
    if input.right {
        dx += PADDLE_SPEED * dt;
    }
    paddle.x += dx;
    paddle.update_stretch(dt);
    paddle.clamp_to(ARENA_WIDTH);
}

/// Move every launched ball and resolve its collisions.
///
/// Fast balls are advanced in substeps of at most [`MAX_BALL_STEP`] so they
/// cannot jump over the paddle or a brick between checks. Returns power-ups
/// released by destroyed bricks.
fn move_balls(state: &mut BreakoutState, dt: f32, report: &mut TickReport) -> Vec<PowerUp> {
    let paddle_rect = state.paddle.rect();
    let paddle_center = state.paddle.center_x();
    let half_width = state.paddle.width / 2.0;
    let cap = state.speed_cap();
    let points = POINTS_PER_BRICK * u64::from(state.level);
    let mut spawned = Vec::new();

    let mut i = 0;
    while i < state.balls.len() {
        let ball = &mut state.balls[i];
        if ball.cooldown > 0 {
            ball.cooldown -= 1;
        }

        let steps = substeps(ball.vel.length() * dt);
        let step_dt = dt / steps as f32;
        let mut lost = false;
        for _ in 0..steps {
            ball.pos += ball.vel * step_dt;

            if bounce_walls(ball, ARENA_WIDTH, ARENA_HEIGHT) {
                lost = true;
                break;
            }

            if ball.vel.y > 0.0 && ball.bounds().overlaps(&paddle_rect) {
                let offset = (ball.pos.x - paddle_center) / half_width;
                ball.vel = paddle_bounce(offset, ball.speed);
                ball.pos.y = paddle_rect.top() - ball.radius;
                report.events.push(GameEvent::PaddleHit);
            }

            if ball.cooldown > 0 {
                continue;
            }
            'bricks: for (column, bricks) in state.bricks.iter_mut().enumerate() {
                for (row, slot) in bricks.iter_mut().enumerate() {
                    let Some(brick) = slot else { continue };
                    if !brick.alive || resolve_ball_rect(ball, &brick.rect).is_none() {
                        continue;
                    }
                    ball.cooldown = COLLISION_COOLDOWN_TICKS;
                    if brick.steel {
                        report.events.push(GameEvent::SteelHit { column, row });
                    } else {
                        brick.alive = false;
                        state.score += points;
                        ball.accelerate(BALL_SPEED_INCREMENT, cap);
                        if let Some(kind) = brick.power_up {
                            spawned.push(PowerUp::spawn(kind, brick.rect.center()));
                        }
                        report.events.push(GameEvent::BrickDestroyed {
                            column,
                            row,
                            points,
                            power_up: brick.power_up,
                        });
                    }
                    break 'bricks;
                }
            }
        }

        if lost {
            state.balls.remove(i);
            report.events.push(GameEvent::BallLost);
            continue;
        }
        i += 1;
    }

    spawned
}

/// Number of equal substeps that keeps each one within [`MAX_BALL_STEP`]
fn substeps(distance: f32) -> u32 {
    (distance / MAX_BALL_STEP).ceil().max(1.0) as u32
}

fn update_power_ups(
    state: &mut BreakoutState,
    rng: &mut dyn RandomSource,
    dt: f32,
    report: &mut TickReport,
) {
    let paddle_rect = state.paddle.rect();
    let mut collected = Vec::new();
    state.power_ups.retain_mut(|p| {
        p.pos.y += p.fall_speed * dt;
        if p.rect().overlaps(&paddle_rect) {
            collected.push(p.kind);
            return false;
        }
        p.pos.y <= ARENA_HEIGHT
    });

    for kind in collected {
        report.events.push(GameEvent::PowerUpCollected(kind));
        match kind {
            PowerUpKind::MultiBall => spawn_multiball(state, rng),
            PowerUpKind::StretchPaddle => state.paddle.start_stretch(),
        }
    }
}

/// Add two copies of the first ball, each turned slightly away from it.
fn spawn_multiball(state: &mut BreakoutState, rng: &mut dyn RandomSource) {
    if !state.launched {
        return;
    }
    let Some(source) = state.balls.first().cloned() else {
        return;
    };
    for side in [-1.0f32, 1.0] {
        let spread = rng.range(
            f64::from(MULTIBALL_SPREAD_MIN),
            f64::from(MULTIBALL_SPREAD_MAX),
        ) as f32;
        let mut copy = source.clone();
        copy.vel = Vec2::from_angle(side * spread).rotate(source.vel);
        state.balls.push(copy);
    }
}
