use avian3d::prelude::*;
use bevy::prelude::*;
use dash::*;
use leafwing_input_manager::prelude::*;

pub struct ClientGameplayPlugin;

impl Plugin for ClientGameplayPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(InputManagerPlugin::<DashAction>::default());
        app.init_resource::<BallSettings>();
        app.add_systems(Startup, spawn_arena);
        app.add_systems(FixedUpdate, roll_ball);
    }
}

/// Rolling controls for the local ball.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct BallSettings {
    /// Ground acceleration from tilting the stick fully.
    pub tilt_acceleration: f32,
    /// Rolling stops pushing past this ground speed. Dashes are not capped.
    pub max_speed: f32,
}

impl Default for BallSettings {
    fn default() -> Self {
        Self {
            tilt_acceleration: 5.0,
            max_speed: 8.0,
        }
    }
}

fn spawn_arena(mut commands: Commands) {
    commands.spawn((
        Name::new("Floor"),
        FloorMarker,
        RigidBody::Static,
        Collider::cuboid(FLOOR_WIDTH, FLOOR_HEIGHT, FLOOR_WIDTH),
        Position(Vec3::new(0.0, -FLOOR_HEIGHT / 2.0, 0.0)),
    ));

    let ball = commands
        .spawn((
            Name::new("Ball"),
            LocalBall,
            DashAbility::default(),
            RigidBody::Dynamic,
            Collider::sphere(BALL_RADIUS),
            Position(Vec3::new(0.0, BALL_RADIUS, 0.0)),
            LinearVelocity::default(),
            InputMap::new([(DashAction::Dash, KeyCode::Space)])
                .with(DashAction::Dash, GamepadButton::South)
                .with_dual_axis(DashAction::Move, GamepadStick::LEFT)
                .with_dual_axis(DashAction::Move, VirtualDPad::wasd()),
        ))
        .id();
    info!(?ball, "Spawned local ball");
}

/// Force that rolls a ball of `mass` towards the camera-relative stick heading.
///
/// Input under [`DEADZONE`] and ground speeds at or above `max_speed` yield no force.
pub fn rolling_force(
    movement: Vec2,
    camera_yaw: f32,
    velocity: Vec3,
    mass: f32,
    settings: &BallSettings,
) -> Vec3 {
    let movement = movement.clamp_length_max(1.0);
    if !movement.is_finite() || movement.length() < DEADZONE {
        return Vec3::ZERO;
    }
    let ground_speed = Vec2::new(velocity.x, velocity.z).length();
    if ground_speed >= settings.max_speed {
        return Vec3::ZERO;
    }
    let heading = lock_direction(movement, camera_yaw);
    heading * movement.length() * settings.tilt_acceleration * mass
}

fn roll_ball(
    settings: Res<BallSettings>,
    camera: Query<&Transform, With<DashCamera>>,
    mut balls: Query<(&ActionState<DashAction>, &ComputedMass, Forces), With<LocalBall>>,
) {
    let yaw = camera.single().map_or(0.0, camera_yaw);
    for (action_state, mass, mut forces) in &mut balls {
        let force = rolling_force(
            action_state.axis_pair(&DashAction::Move),
            yaw,
            forces.linear_velocity(),
            mass.value(),
            &settings,
        );
        if force != Vec3::ZERO {
            forces.apply_force(force);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_force_past_max_speed() {
        let settings = BallSettings::default();
        let force = rolling_force(Vec2::Y, 0.0, Vec3::new(0.0, 0.0, 9.0), 1.0, &settings);
        assert_eq!(force, Vec3::ZERO);
    }

    #[test]
    fn idle_stick_rolls_nowhere() {
        let settings = BallSettings::default();
        assert_eq!(
            rolling_force(Vec2::splat(0.01), 0.0, Vec3::ZERO, 1.0, &settings),
            Vec3::ZERO
        );
    }
}
