use bevy::prelude::*;
use dash::*;
use render::{ChargeLightFx, DashCameraRig, DashTrailFx};
use ui::PowerMeter;

/// Routes the local ball's [`DashFeedbackMessage`]s to the HUD meter, the ball's light
/// and trail, and the dash camera.
pub struct FeedbackDispatchPlugin;

impl Plugin for FeedbackDispatchPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                sync_feedback_settings
                    .run_if(resource_exists_and_changed::<DashConfig>)
                    .before(DashSystems::Simulate),
                dispatch_dash_feedback.in_set(DashSystems::Feedback),
            ),
        );
    }
}

fn sync_feedback_settings(mut commands: Commands, config: Res<DashConfig>) {
    debug!(settings = ?config.feedback, "Applying feedback settings");
    commands.insert_resource(FeedbackOrchestrator::new(config.feedback));
}

fn dispatch_dash_feedback(
    orchestrator: Option<Res<FeedbackOrchestrator>>,
    mut messages: MessageReader<DashFeedbackMessage>,
    mut meters: Query<&mut PowerMeter>,
    mut lights: Query<(&mut ChargeLightFx, &ChildOf)>,
    mut cameras: Query<&mut DashCameraRig>,
    mut trails: Query<&mut DashTrailFx>,
) {
    let Some(orchestrator) = orchestrator else {
        messages.clear();
        return;
    };

    for message in messages.read() {
        // Only the local ball drives the HUD and camera.
        if !message.local {
            continue;
        }
        let actor = message.actor;

        let mut meter = meters.single_mut().ok();
        let mut light = lights
            .iter_mut()
            .find(|(_, child_of)| child_of.parent() == actor)
            .map(|(light, _)| light);
        let mut camera = cameras.single_mut().ok();
        let mut trail = trails.get_mut(actor).ok();

        let mut channels = FeedbackChannels {
            meter: meter
                .as_deref_mut()
                .map(|meter| meter as &mut dyn PowerMeterDisplay),
            light: light.as_deref_mut().map(|light| light as &mut dyn ChargeLight),
            camera: camera
                .as_deref_mut()
                .map(|camera| camera as &mut dyn CameraEffects),
            trail: trail.as_deref_mut().map(|trail| trail as &mut dyn DashTrail),
        };
        orchestrator.dispatch(&message.event, &mut channels);
    }
}
