use bevy::prelude::*;
use leafwing_input_manager::prelude::*;
use serde::{Deserialize, Serialize};

pub mod ability;
pub mod app_state;
pub mod config;
pub mod direction;
pub mod feedback;
pub mod force;
pub mod oscillator;
pub mod schedule;
pub mod systems;

pub use ability::{
    BodySnapshot, ChargeSession, CooldownSession, DashAbility, DashBody, DashEvent, DashInput,
    DashPhase, DashState,
};
pub use app_state::{AppState, AppStatePlugin, TrackedAssets};
pub use config::{DashConfig, DashConfigError, DashConfigPlugin, ZoomOverlap};
pub use direction::{camera_forward, camera_yaw, lock_direction};
pub use feedback::{
    CameraEffects, ChargeLight, DashTrail, FeedbackChannels, FeedbackOrchestrator,
    FeedbackPalette, FeedbackSettings, PowerMeterDisplay, TrailPreview,
};
pub use force::{compose_impulse, minimum_speed_correction, DashImpulse};
pub use oscillator::power;
pub use schedule::{DashScheduler, Deadline, DeferredAction, ScheduleHandle};
pub use systems::{AvianBody, DashFeedbackMessage};

pub const FIXED_TIMESTEP_HZ: f64 = 64.0;

/// Magnitude below which movement input and velocity count as zero.
pub const DEADZONE: f32 = 0.1;

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Hash, Reflect)]
pub enum DashAction {
    Move,
    Dash,
}

impl Actionlike for DashAction {
    fn input_control_kind(&self) -> InputControlKind {
        match self {
            Self::Move => InputControlKind::DualAxis,
            Self::Dash => InputControlKind::Button,
        }
    }
}

pub const BALL_RADIUS: f32 = 0.5;
pub const FLOOR_WIDTH: f32 = 40.0;
pub const FLOOR_HEIGHT: f32 = 1.0;

/// The ball driven by this client's input. Feedback is only shown for it.
#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct LocalBall;

#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct FloorMarker;

/// Camera whose yaw orients dash directions.
#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct DashCamera;

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DashSystems {
    /// Press/release handling, charge and cooldown timers.
    Simulate,
    /// Routing of [`DashEvent`]s to feedback collaborators.
    Feedback,
    /// Feedback collaborators animating their own state.
    Present,
}

pub struct DashPlugin;

impl Plugin for DashPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<DashFeedbackMessage>();

        app.configure_sets(
            Update,
            (
                DashSystems::Simulate,
                DashSystems::Feedback,
                DashSystems::Present,
            )
                .chain(),
        );

        app.add_systems(
            Update,
            systems::update_dash_abilities
                .in_set(DashSystems::Simulate)
                .run_if(resource_exists::<DashConfig>),
        );
        app.add_systems(FixedUpdate, systems::apply_dash_physics);
        app.add_observer(systems::dispose_dash_ability);
    }
}
