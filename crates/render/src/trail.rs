use avian3d::prelude::{LinearVelocity, Position};
use bevy::prelude::*;
use dash::{DashTrail, TrailPreview, DEADZONE};

const TRAIL_LENGTH: f32 = 2.0;

/// Dash streak and charge-time path preview, drawn with gizmos.
#[derive(Component, Clone, Debug)]
pub struct DashTrailFx {
    pub trail_duration: f32,
    pub trail_color: Color,
    pub ghost_points: usize,
    pub ghost_distance: f32,
    /// Pseudo-gravity: the path sinks `ghost_droop * d²` after distance `d`.
    pub ghost_droop: f32,
    pub ghost_color: Color,
    trail_remaining: f32,
    trail_power: f32,
    trail_direction: Dir3,
    ghost_path: Vec<Vec3>,
}

impl Default for DashTrailFx {
    fn default() -> Self {
        Self {
            trail_duration: 0.5,
            trail_color: Color::srgb(0.2, 0.9, 1.0),
            ghost_points: 20,
            ghost_distance: 10.0,
            ghost_droop: 0.05,
            ghost_color: Color::srgba(1.0, 1.0, 1.0, 0.6),
            trail_remaining: 0.0,
            trail_power: 0.0,
            trail_direction: Dir3::Z,
            ghost_path: Vec::new(),
        }
    }
}

impl DashTrailFx {
    pub fn is_trail_playing(&self) -> bool {
        self.trail_remaining > 0.0
    }

    pub fn trail_remaining(&self) -> f32 {
        self.trail_remaining
    }

    /// Direction the streak extends from the ball: against the motion, or against the dash
    /// direction when the ball is nearly still.
    pub fn trail_heading(&self, velocity: Vec3) -> Vec3 {
        if velocity.length() > DEADZONE {
            -velocity.normalize()
        } else {
            -self.trail_direction.as_vec3()
        }
    }

    pub fn ghost_path(&self) -> &[Vec3] {
        &self.ghost_path
    }

    pub fn tick(&mut self, dt: f32) {
        self.trail_remaining = (self.trail_remaining - dt).max(0.0);
    }
}

impl DashTrail for DashTrailFx {
    fn play_trail(&mut self, direction: Dir3, power: f32) {
        self.trail_remaining = self.trail_duration;
        self.trail_power = power;
        self.trail_direction = direction;
    }

    fn show_preview(&mut self, preview: &TrailPreview) {
        self.ghost_path = ghost_trail_points(
            preview,
            self.ghost_points,
            self.ghost_distance,
            self.ghost_droop,
        );
    }

    fn hide_preview(&mut self) {
        self.ghost_path.clear();
    }
}

/// Evenly spaced points along the predicted dash path, starting at the ball.
pub fn ghost_trail_points(
    preview: &TrailPreview,
    count: usize,
    distance: f32,
    droop: f32,
) -> Vec<Vec3> {
    let heading = (preview.velocity + preview.impulse * preview.power).normalize_or_zero();
    let length = distance * preview.power;
    let last = count.saturating_sub(1).max(1) as f32;
    (0..count)
        .map(|i| {
            let d = i as f32 / last * length;
            let mut point = preview.origin + heading * d;
            point.y -= droop * d * d;
            point
        })
        .collect()
}

pub(crate) fn tick_dash_trails(time: Res<Time>, mut trail_query: Query<&mut DashTrailFx>) {
    let dt = time.delta_secs();
    for mut trail in &mut trail_query {
        if trail.is_trail_playing() {
            trail.tick(dt);
        }
    }
}

pub(crate) fn draw_dash_trails(
    mut gizmos: Gizmos,
    trail_query: Query<(&DashTrailFx, &Position, &LinearVelocity)>,
) {
    for (trail, position, velocity) in &trail_query {
        if trail.is_trail_playing() {
            let fade = trail.trail_remaining / trail.trail_duration.max(f32::EPSILON);
            let back = trail.trail_heading(velocity.0);
            let length = TRAIL_LENGTH * (0.5 + trail.trail_power);
            gizmos.line_gradient(
                **position,
                **position + back * length,
                trail.trail_color.with_alpha(fade),
                trail.trail_color.with_alpha(0.0),
            );
        }

        if trail.ghost_path.len() > 1 {
            let last = (trail.ghost_path.len() - 1) as f32;
            gizmos.linestrip_gradient(trail.ghost_path.iter().enumerate().map(|(i, point)| {
                let alpha = trail.ghost_color.alpha() * (1.0 - i as f32 / last);
                (*point, trail.ghost_color.with_alpha(alpha))
            }));
        }
    }
}
