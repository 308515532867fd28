use bevy::prelude::*;

use crate::config::DashConfig;
use crate::DEADZONE;

/// A dash impulse split into the parts it was built from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DashImpulse {
    pub direction: Dir3,
    pub power: f32,
    /// Velocity change cancelling motion against `direction`. Applied before `impulse`.
    pub corrective: Option<Vec3>,
    pub base: Vec3,
    pub boost: Vec3,
    /// `base + boost`.
    pub impulse: Vec3,
    /// Velocity along `direction` once the corrective change is applied.
    pub velocity_along: f32,
}

/// Builds the impulse for a dash of `power` along `direction` from a body moving at `velocity`.
///
/// Non-finite velocity is treated as rest.
pub fn compose_impulse(
    direction: Dir3,
    power: f32,
    velocity: Vec3,
    config: &DashConfig,
) -> DashImpulse {
    let power = if power.is_finite() {
        power.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let velocity = if velocity.is_finite() {
        velocity
    } else {
        warn!("Non-finite velocity {velocity} while composing a dash, treating it as zero");
        Vec3::ZERO
    };
    let dir = direction.as_vec3();

    let mut velocity_along = velocity.dot(dir);
    let mut corrective = None;
    if config.cancel_opposing_velocity && velocity_along < 0.0 {
        corrective = Some(-dir * velocity_along);
        velocity_along = 0.0;
    }

    let base = dir * config.dash_force_multiplier * power;
    let speed = velocity.length();
    let boost = if speed > DEADZONE {
        dir * speed * config.velocity_scale_multiplier * power
    } else {
        Vec3::ZERO
    };

    DashImpulse {
        direction,
        power,
        corrective,
        base,
        boost,
        impulse: base + boost,
        velocity_along,
    }
}

/// Velocity change that lifts the speed along `direction` to `floor`, if it falls short.
///
/// Components orthogonal to `direction` are left alone. A non-positive floor never corrects.
pub fn minimum_speed_correction(direction: Dir3, floor: f32, velocity: Vec3) -> Option<Vec3> {
    if !(floor > 0.0) || !velocity.is_finite() {
        return None;
    }
    let along = velocity.dot(*direction);
    (along < floor).then(|| *direction * (floor - along))
}
