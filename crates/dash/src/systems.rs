use avian3d::prelude::*;
use bevy::prelude::*;
use leafwing_input_manager::prelude::ActionState;

use crate::ability::{BodySnapshot, DashAbility, DashBody, DashEvent, DashInput, DashState};
use crate::config::DashConfig;
use crate::direction::camera_yaw;
use crate::{DashAction, DashCamera, LocalBall};

/// A [`DashEvent`] raised by `actor`'s [`DashAbility`].
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct DashFeedbackMessage {
    pub actor: Entity,
    /// Whether `actor` was the [`LocalBall`] when the event was raised.
    pub local: bool,
    pub event: DashEvent,
}

/// [`DashBody`] over an avian3d body's velocity.
pub struct AvianBody<'a> {
    pub position: Vec3,
    pub velocity: &'a mut Vec3,
    pub inverse_mass: f32,
}

impl DashBody for AvianBody<'_> {
    fn velocity(&self) -> Vec3 {
        *self.velocity
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn apply_impulse(&mut self, impulse: Vec3) {
        *self.velocity += impulse * self.inverse_mass;
    }

    fn add_velocity(&mut self, delta: Vec3) {
        *self.velocity += delta;
    }
}

pub(crate) fn update_dash_abilities(
    time: Res<Time>,
    config: Res<DashConfig>,
    camera: Query<&Transform, With<DashCamera>>,
    mut actors: Query<(
        Entity,
        &mut DashAbility,
        &ActionState<DashAction>,
        &Position,
        &LinearVelocity,
        Has<LocalBall>,
    )>,
    mut feedback: MessageWriter<DashFeedbackMessage>,
) {
    let yaw = match camera.single() {
        Ok(transform) => camera_yaw(transform),
        Err(_) => {
            warn_once!("No single DashCamera found, dash directions use world forward");
            0.0
        }
    };
    let dt = time.delta_secs();

    for (entity, mut ability, action_state, position, velocity, local) in &mut actors {
        let input = DashInput {
            pressed: action_state.just_pressed(&DashAction::Dash),
            released: action_state.just_released(&DashAction::Dash),
            movement: action_state.axis_pair(&DashAction::Move),
            camera_yaw: yaw,
        };
        let body = BodySnapshot {
            position: position.0,
            velocity: velocity.0,
        };
        let dormant = ability.state() == DashState::Idle && ability.scheduler().is_empty();
        if dormant && !input.pressed && !input.released {
            continue;
        }
        ability.update(dt, &input, body, &config);
        for event in ability.drain_events() {
            feedback.write(DashFeedbackMessage {
                actor: entity,
                local,
                event,
            });
        }
    }
}

pub(crate) fn apply_dash_physics(
    mut actors: Query<(
        &mut DashAbility,
        &Position,
        &mut LinearVelocity,
        Option<&ComputedMass>,
    )>,
) {
    for (mut ability, position, mut velocity, mass) in &mut actors {
        if !ability.needs_physics_step() {
            continue;
        }
        let mut body = AvianBody {
            position: position.0,
            velocity: &mut velocity.0,
            inverse_mass: mass.map_or(1.0, |mass| mass.inverse()),
        };
        ability.physics_step(&mut body);
    }
}

/// Removing [`DashAbility`] from an actor tears its dash down and flushes the cleanup feedback.
pub(crate) fn dispose_dash_ability(
    trigger: On<Remove, DashAbility>,
    mut abilities: Query<(&mut DashAbility, Has<LocalBall>)>,
    mut feedback: MessageWriter<DashFeedbackMessage>,
) {
    let entity = trigger.entity;
    let Ok((mut ability, local)) = abilities.get_mut(entity) else {
        return;
    };
    ability.dispose();
    for event in ability.drain_events() {
        feedback.write(DashFeedbackMessage {
            actor: entity,
            local,
            event,
        });
    }
}
