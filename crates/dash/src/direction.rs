use bevy::prelude::*;

use crate::DEADZONE;

/// Horizontal forward of a camera rotated `yaw` radians about +Y. Yaw `0` faces +Z.
pub fn camera_forward(yaw: f32) -> Dir3 {
    let yaw = if yaw.is_finite() { yaw } else { 0.0 };
    Quat::from_rotation_y(yaw) * Dir3::Z
}

/// Yaw of a camera transform, measured the same way as [`camera_forward`].
///
/// A camera looking straight up or down has no horizontal heading and yields `0`.
pub fn camera_yaw(transform: &Transform) -> f32 {
    let forward = transform.forward();
    let flat = Vec2::new(forward.x, forward.z);
    if flat.length_squared() < f32::EPSILON {
        return 0.0;
    }
    forward.x.atan2(forward.z)
}

/// Camera-relative dash direction for a movement stick reading.
///
/// Stick `+y` is camera forward and stick `+x` is camera right (`-X` at yaw `0`). Readings
/// under [`DEADZONE`] or with non-finite components dash straight ahead of the camera.
pub fn lock_direction(movement: Vec2, camera_yaw: f32) -> Dir3 {
    let fallback = camera_forward(camera_yaw);
    if !movement.is_finite() {
        return fallback;
    }
    let yaw = if camera_yaw.is_finite() { camera_yaw } else { 0.0 };
    let composite = Quat::from_rotation_y(yaw) * Vec3::new(-movement.x, 0.0, movement.y);
    if composite.length() < DEADZONE {
        return fallback;
    }
    Dir3::new(composite).unwrap_or(fallback)
}
