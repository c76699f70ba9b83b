//! Axis-aligned collision detection and response
//!
//! Everything in breakout is a rectangle except the ball, which is treated
//! as its bounding box for overlap tests.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::consts::MAX_BOUNCE_ANGLE;
use super::state::Ball;

/// Small push so a resolved ball ends strictly outside the brick
const SEPARATION: f32 = 0.01;

/// Axis-aligned rectangle, `pos` is the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Bounding box of a circle
    pub fn around(center: Vec2, radius: f32) -> Self {
        Self {
            pos: center - Vec2::splat(radius),
            size: Vec2::splat(radius * 2.0),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Strict overlap; touching edges do not count
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

/// Axis along which a bounce was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Bounce a ball off a rectangle it overlaps.
///
/// The axis with the smaller penetration is the bounce axis: that velocity
/// component is reflected and the ball is moved just outside the rectangle
/// on that axis. Returns `None` if there is no overlap.
pub fn resolve_ball_rect(ball: &mut Ball, rect: &Rect) -> Option<Axis> {
    let bounds = ball.bounds();
    if !bounds.overlaps(rect) {
        return None;
    }

    let overlap_x = (bounds.right() - rect.left()).min(rect.right() - bounds.left());
    let overlap_y = (bounds.bottom() - rect.top()).min(rect.bottom() - bounds.top());
    let center = rect.center();

    if overlap_x < overlap_y {
        ball.vel.x = -ball.vel.x;
        ball.pos.x = if ball.pos.x < center.x {
            rect.left() - ball.radius - SEPARATION
        } else {
            rect.right() + ball.radius + SEPARATION
        };
        Some(Axis::X)
    } else {
        ball.vel.y = -ball.vel.y;
        ball.pos.y = if ball.pos.y < center.y {
            rect.top() - ball.radius - SEPARATION
        } else {
            rect.bottom() + ball.radius + SEPARATION
        };
        Some(Axis::Y)
    }
}

/// Keep a ball inside the side and top walls.
///
/// Returns true once the ball has fully left through the bottom.
pub fn bounce_walls(ball: &mut Ball, width: f32, height: f32) -> bool {
    let r = ball.radius;
    if ball.pos.x - r < 0.0 {
        ball.pos.x = r;
        ball.vel.x = ball.vel.x.abs();
    } else if ball.pos.x + r > width {
        ball.pos.x = width - r;
        ball.vel.x = -ball.vel.x.abs();
    }
    if ball.pos.y - r < 0.0 {
        ball.pos.y = r;
        ball.vel.y = ball.vel.y.abs();
    }
    ball.pos.y - r > height
}

/// Rebound velocity for a paddle hit.
///
/// `offset` is the impact position relative to the paddle center as a
/// fraction of half its width. It is clamped to [-1, 1] and mapped into a
/// cone of ±[`MAX_BOUNCE_ANGLE`] around straight up, so the ball always
/// leaves moving upward.
pub fn paddle_bounce(offset: f32, speed: f32) -> Vec2 {
    let angle = offset.clamp(-1.0, 1.0) * MAX_BOUNCE_ANGLE;
    Vec2::new(speed * angle.sin(), -speed * angle.cos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ball_at(x: f32, y: f32, vx: f32, vy: f32) -> Ball {
        let mut ball = Ball::new(Vec2::new(x, y), 300.0);
        ball.vel = Vec2::new(vx, vy);
        ball
    }

    #[test]
    fn test_rect_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(0.0, 20.0, 10.0, 10.0)));
    }

    #[test]
    fn test_ball_hits_brick_from_below() {
        let brick = Rect::new(100.0, 100.0, 70.0, 22.0);
        // Ball center 3px under the brick's bottom edge, moving up
        let mut ball = ball_at(135.0, 125.0, 50.0, -200.0);
        let axis = resolve_ball_rect(&mut ball, &brick);
        assert_eq!(axis, Some(Axis::Y));
        assert_eq!(ball.vel, Vec2::new(50.0, 200.0));
        assert!(ball.pos.y - ball.radius > brick.bottom());
        assert!(!ball.bounds().overlaps(&brick));
    }

    #[test]
    fn test_ball_hits_brick_side() {
        let brick = Rect::new(100.0, 100.0, 70.0, 22.0);
        let mut ball = ball_at(95.0, 111.0, 200.0, -50.0);
        let axis = resolve_ball_rect(&mut ball, &brick);
        assert_eq!(axis, Some(Axis::X));
        assert_eq!(ball.vel, Vec2::new(-200.0, -50.0));
        assert!(ball.pos.x + ball.radius < brick.left());
    }

    #[test]
    fn test_ball_misses_brick() {
        let brick = Rect::new(100.0, 100.0, 70.0, 22.0);
        let mut ball = ball_at(50.0, 50.0, 10.0, 10.0);
        let before = ball.clone();
        assert_eq!(resolve_ball_rect(&mut ball, &brick), None);
        assert_eq!(ball, before);
    }

    #[test]
    fn test_wall_bounces() {
        let mut ball = ball_at(3.0, 300.0, -100.0, 100.0);
        assert!(!bounce_walls(&mut ball, 800.0, 600.0));
        assert_eq!(ball.pos.x, ball.radius);
        assert!(ball.vel.x > 0.0);

        let mut ball = ball_at(798.0, 300.0, 100.0, 100.0);
        bounce_walls(&mut ball, 800.0, 600.0);
        assert!(ball.vel.x < 0.0);

        let mut ball = ball_at(400.0, 2.0, 0.0, -100.0);
        bounce_walls(&mut ball, 800.0, 600.0);
        assert!(ball.vel.y > 0.0);
        assert_eq!(ball.pos.y, ball.radius);
    }

    #[test]
    fn test_ball_lost_below_floor() {
        let mut ball = ball_at(400.0, 605.0, 0.0, 100.0);
        assert!(!bounce_walls(&mut ball, 800.0, 600.0));
        let mut ball = ball_at(400.0, 609.0, 0.0, 100.0);
        assert!(bounce_walls(&mut ball, 800.0, 600.0));
    }

    #[test]
    fn test_paddle_bounce_center_goes_straight_up() {
        let v = paddle_bounce(0.0, 300.0);
        assert!(v.x.abs() < 1e-4);
        assert!((v.y + 300.0).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn prop_paddle_bounce_bounds(offset in -1.0f32..=1.0, speed in 1.0f32..1000.0) {
            let v = paddle_bounce(offset, speed);
            prop_assert!(v.y < 0.0);
            if offset > 0.0 {
                prop_assert!(v.x > 0.0);
            } else if offset < 0.0 {
                prop_assert!(v.x < 0.0);
            } else {
                prop_assert_eq!(v.x, 0.0);
            }
            prop_assert!((v.length() - speed).abs() <= speed * 1e-4);
        }

        #[test]
        fn prop_offset_is_clamped(offset in -50.0f32..50.0) {
            let v = paddle_bounce(offset, 100.0);
            let edge = paddle_bounce(offset.signum(), 100.0);
            if offset.abs() >= 1.0 {
                prop_assert!((v - edge).length() < 1e-3);
            }
            prop_assert!(v.y < 0.0);
        }
    }
}
