use avian3d::prelude::Position;
use bevy::math::StableInterpolate;
use bevy::prelude::*;
use dash::{CameraEffects, DashCamera, LocalBall};
use rand::Rng;

/// Follow camera with dash zoom and shake.
#[derive(Component, Clone, Debug)]
pub struct DashCameraRig {
    pub normal_fov_degrees: f32,
    pub dash_fov_degrees: f32,
    /// Exponential decay rate towards the target FOV, per second.
    pub fov_transition_speed: f32,
    pub shake_enabled: bool,
    pub shake_magnitude: f32,
    pub shake_duration: f32,
    pub follow_offset: Vec3,
    zoomed: bool,
    shake_remaining: f32,
    shake_offset: Vec3,
}

impl Default for DashCameraRig {
    fn default() -> Self {
        Self {
            normal_fov_degrees: 60.0,
            dash_fov_degrees: 75.0,
            fov_transition_speed: 10.0,
            shake_enabled: true,
            shake_magnitude: 0.3,
            shake_duration: 0.2,
            follow_offset: Vec3::new(0.0, 5.0, -10.0),
            zoomed: false,
            shake_remaining: 0.0,
            shake_offset: Vec3::ZERO,
        }
    }
}

impl DashCameraRig {
    pub fn is_zoomed(&self) -> bool {
        self.zoomed
    }

    pub fn target_fov_degrees(&self) -> f32 {
        if self.zoomed {
            self.dash_fov_degrees
        } else {
            self.normal_fov_degrees
        }
    }

    pub fn is_shaking(&self) -> bool {
        self.shake_remaining > 0.0
    }

    pub fn shake_remaining(&self) -> f32 {
        self.shake_remaining
    }
}

impl CameraEffects for DashCameraRig {
    fn start_zoom(&mut self) {
        self.zoomed = true;
    }

    fn end_zoom(&mut self) {
        self.zoomed = false;
    }

    fn shake(&mut self) {
        if self.shake_enabled {
            self.shake_remaining = self.shake_duration;
        }
    }
}

pub(crate) fn setup_camera(mut commands: Commands) {
    let rig = DashCameraRig::default();
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: rig.normal_fov_degrees.to_radians(),
            ..default()
        }),
        Transform::from_translation(rig.follow_offset).looking_at(Vec3::ZERO, Dir3::Y),
        DashCamera,
        rig,
    ));
}

pub(crate) fn follow_ball(
    ball_query: Query<&Position, With<LocalBall>>,
    mut camera_query: Query<(&DashCameraRig, &mut Transform)>,
) {
    let Ok(ball_pos) = ball_query.single() else {
        return;
    };
    for (rig, mut camera_transform) in &mut camera_query {
        camera_transform.translation = **ball_pos + rig.follow_offset;
        camera_transform.look_at(**ball_pos, Dir3::Y);
    }
}

pub(crate) fn animate_camera_fov(
    time: Res<Time>,
    mut camera_query: Query<(&DashCameraRig, &mut Projection)>,
) {
    let dt = time.delta_secs();
    for (rig, mut projection) in &mut camera_query {
        let Projection::Perspective(perspective) = &mut *projection else {
            continue;
        };
        let target = rig.target_fov_degrees().to_radians();
        if (perspective.fov - target).abs() > 1e-4 {
            perspective
                .fov
                .smooth_nudge(&target, rig.fov_transition_speed, dt);
        }
    }
}

/// Undoes last frame's shake so followers and shake start from the unshaken pose.
pub(crate) fn clear_camera_shake(mut camera_query: Query<(&mut DashCameraRig, &mut Transform)>) {
    for (mut rig, mut transform) in &mut camera_query {
        if rig.shake_offset != Vec3::ZERO {
            transform.translation -= rig.shake_offset;
            rig.shake_offset = Vec3::ZERO;
        }
    }
}

pub(crate) fn apply_camera_shake(
    time: Res<Time>,
    mut camera_query: Query<(&mut DashCameraRig, &mut Transform)>,
) {
    let dt = time.delta_secs();
    let mut rng = rand::thread_rng();
    for (mut rig, mut transform) in &mut camera_query {
        if !rig.is_shaking() {
            continue;
        }
        rig.shake_remaining = (rig.shake_remaining - dt).max(0.0);
        let offset = random_in_unit_sphere(&mut rng) * rig.shake_magnitude;
        transform.translation += offset;
        rig.shake_offset = offset;
    }
}

fn random_in_unit_sphere(rng: &mut impl Rng) -> Vec3 {
    loop {
        let candidate = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        if candidate.length_squared() <= 1.0 {
            return candidate;
        }
    }
}
