//! What the operator sees: the whiteboard surface, the login view and a
//! one-line status.
//!
//! The machine only talks to an [`OperatorView`]; pixels are someone else's
//! problem.

use crate::geometry::{Point, Policy, Stroke, Verdict};

pub const ACCEPTED_COLOR: &str = "green";
pub const REJECTED_COLOR: &str = "red";
pub const TARGET_COLOR: &str = "green";
pub const OBSTACLE_COLORS: [&str; 2] = ["pink", "blue"];

/// Line width for zone outlines.
pub const ZONE_OUTLINE_WIDTH: f64 = 4.0;

pub trait OperatorView: Send + 'static {
    fn show_whiteboard(&mut self);
    fn hide_whiteboard(&mut self);
    fn show_login(&mut self);
    fn set_status(&mut self, message: &str);
    fn clear_status(&mut self);
    /// Draw a polyline through `points` in order.
    fn draw(&mut self, points: &[Point], width: f64, color: &'static str);
    fn clear_surface(&mut self);
}

pub fn verdict_color(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Valid => ACCEPTED_COLOR,
        Verdict::Invalid => REJECTED_COLOR,
    }
}

/// Rejected strokes are drawn too, in their own colour.
pub fn draw_stroke<V: OperatorView + ?Sized>(view: &mut V, stroke: &Stroke, verdict: Verdict) {
    view.draw(&stroke.points, stroke.width, verdict_color(verdict));
}

/// Outline every zone: targets in the target colour, obstacles alternating.
pub fn draw_policy_overlay<V: OperatorView + ?Sized>(view: &mut V, policy: &Policy) {
    let targets = policy.targets();
    for target in [&targets.first, &targets.second] {
        view.draw(&target.outline(), ZONE_OUTLINE_WIDTH, TARGET_COLOR);
    }

    for (index, obstacle) in policy.obstacles().iter().enumerate() {
        let color = OBSTACLE_COLORS[index % OBSTACLE_COLORS.len()];
        view.draw(&obstacle.outline(), ZONE_OUTLINE_WIDTH, color);
    }
}
