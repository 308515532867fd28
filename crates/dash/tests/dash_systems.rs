use avian3d::prelude::{LinearVelocity, Position};
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use dash::*;
use leafwing_input_manager::prelude::ActionState;
use std::time::Duration;

#[derive(Resource, Default)]
struct Recorded(Vec<DashFeedbackMessage>);

fn record_feedback(mut reader: MessageReader<DashFeedbackMessage>, mut recorded: ResMut<Recorded>) {
    recorded.0.extend(reader.read().copied());
}

fn test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)));
    app.insert_resource(DashConfig::default());
    app.add_plugins(DashPlugin);
    app.init_resource::<Recorded>();
    app.add_systems(Update, record_feedback.in_set(DashSystems::Feedback));
    // First frame has a zero delta.
    app.update();
    app
}

fn spawn_ball(world: &mut World) -> Entity {
    world
        .spawn((
            LocalBall,
            DashAbility::default(),
            ActionState::<DashAction>::default(),
            Position(Vec3::ZERO),
            LinearVelocity(Vec3::ZERO),
        ))
        .id()
}

fn actions(app: &mut App, entity: Entity) -> Mut<'_, ActionState<DashAction>> {
    app.world_mut()
        .get_mut::<ActionState<DashAction>>(entity)
        .unwrap()
}

fn count(app: &App, wanted: DashEvent) -> usize {
    app.world()
        .resource::<Recorded>()
        .0
        .iter()
        .filter(|message| message.event == wanted)
        .count()
}

#[test]
fn press_starts_charging() {
    let mut app = test_app();
    let ball = spawn_ball(app.world_mut());

    actions(&mut app, ball).press(&DashAction::Dash);
    app.update();

    let ability = app.world().get::<DashAbility>(ball).unwrap();
    assert_eq!(ability.state(), DashState::Charging);
    assert_eq!(count(&app, DashEvent::StartCharging), 1);
}

#[test]
fn release_dashes_on_next_physics_tick() {
    let mut app = test_app();
    let ball = spawn_ball(app.world_mut());

    actions(&mut app, ball).press(&DashAction::Dash);
    app.update();
    app.update();
    actions(&mut app, ball).release(&DashAction::Dash);
    app.update();

    let ability = app.world().get::<DashAbility>(ball).unwrap();
    assert_eq!(ability.state(), DashState::Cooldown);
    assert_eq!(count(&app, DashEvent::StartCameraZoom), 1);

    app.world_mut().run_schedule(FixedUpdate);
    let velocity = app.world().get::<LinearVelocity>(ball).unwrap();
    assert!(
        velocity.z > 1.0,
        "dash should push the ball forward, got {:?}",
        velocity.0
    );
    assert!(velocity.x.abs() < 1e-5 && velocity.y.abs() < 1e-5);
}

#[test]
fn cooldown_expires_with_one_ready_signal() {
    let mut app = test_app();
    let ball = spawn_ball(app.world_mut());

    actions(&mut app, ball).press(&DashAction::Dash);
    app.update();
    actions(&mut app, ball).release(&DashAction::Dash);
    app.update();

    for _ in 0..30 {
        app.update();
    }

    let ability = app.world().get::<DashAbility>(ball).unwrap();
    assert_eq!(ability.state(), DashState::Idle);
    assert_eq!(count(&app, DashEvent::ShowReady), 1);
    assert_eq!(count(&app, DashEvent::EndCameraZoom), 1);
}

#[test]
fn camera_yaw_orients_dash() {
    let mut app = test_app();
    app.world_mut().spawn((
        DashCamera,
        Transform::from_xyz(0.0, 5.0, 0.0).looking_to(Vec3::X, Vec3::Y),
    ));
    let ball = spawn_ball(app.world_mut());

    actions(&mut app, ball).press(&DashAction::Dash);
    app.update();

    let ability = app.world().get::<DashAbility>(ball).unwrap();
    let direction = ability.locked_direction().unwrap();
    assert!(
        direction.abs_diff_eq(Vec3::X, 1e-5),
        "expected +X, got {direction:?}"
    );
}

#[test]
fn removing_ability_flushes_cleanup_feedback() {
    let mut app = test_app();
    let ball = spawn_ball(app.world_mut());

    actions(&mut app, ball).press(&DashAction::Dash);
    app.update();
    app.world_mut().entity_mut(ball).remove::<DashAbility>();
    app.update();

    assert_eq!(count(&app, DashEvent::StopCharging), 1);
}

#[test]
fn idle_balls_are_left_alone() {
    let mut app = test_app();
    let ball = spawn_ball(app.world_mut());
    app.update();
    app.update();

    assert!(app.world().resource::<Recorded>().0.is_empty());
    let ability = app.world().get::<DashAbility>(ball).unwrap();
    assert_eq!(ability.state(), DashState::Idle);
}

#[test]
fn messages_remember_local_actor_after_despawn() {
    let mut app = test_app();
    let local = spawn_ball(app.world_mut());
    let remote = spawn_ball(app.world_mut());
    app.world_mut().entity_mut(remote).remove::<LocalBall>();

    for ball in [local, remote] {
        actions(&mut app, ball).press(&DashAction::Dash);
    }
    app.update();
    for ball in [local, remote] {
        actions(&mut app, ball).release(&DashAction::Dash);
    }
    app.update();
    app.world_mut().entity_mut(remote).despawn();
    app.update();

    let recorded = &app.world().resource::<Recorded>().0;
    assert!(recorded
        .iter()
        .filter(|message| message.actor == local)
        .all(|message| message.local));
    let remote_cleanup: Vec<_> = recorded
        .iter()
        .filter(|message| message.actor == remote && message.event == DashEvent::EndCameraZoom)
        .collect();
    assert_eq!(remote_cleanup.len(), 1);
    assert!(!remote_cleanup[0].local);
}
