use bevy::gizmos::GizmoPlugin;
use bevy::prelude::*;
use dash::*;

pub mod camera;
pub mod light;
pub mod trail;

pub use camera::DashCameraRig;
pub use light::{ChargeLightFx, LightMode};
pub use trail::{ghost_trail_points, DashTrailFx};

pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().is_resource_added::<Assets<Mesh>>() {
            app.init_resource::<Assets<Mesh>>();
        }
        if !app.world().is_resource_added::<Assets<StandardMaterial>>() {
            app.init_resource::<Assets<StandardMaterial>>();
        }

        app.add_systems(Startup, (camera::setup_camera, setup_lighting));
        app.add_systems(Update, (add_ball_cosmetics, add_floor_cosmetics));
        app.add_systems(
            Update,
            (
                (
                    camera::clear_camera_shake,
                    camera::follow_ball,
                    camera::apply_camera_shake,
                )
                    .chain(),
                camera::animate_camera_fov,
                light::animate_charge_light,
                trail::tick_dash_trails,
            )
                .in_set(DashSystems::Present),
        );

        if app.is_plugin_added::<GizmoPlugin>() {
            app.add_systems(
                Update,
                trail::draw_dash_trails
                    .in_set(DashSystems::Present)
                    .after(trail::tick_dash_trails),
            );
        }
    }
}

fn setup_lighting(mut commands: Commands) {
    commands.spawn((
        PointLight {
            shadows_enabled: true,
            intensity: 4_000_000.0,
            range: 60.0,
            ..default()
        },
        Transform::from_xyz(4.0, 12.0, 4.0),
    ));
}

/// Gives a newly spawned ball its mesh, its trail and a charge light child.
fn add_ball_cosmetics(
    mut commands: Commands,
    ball_query: Query<Entity, Added<LocalBall>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for entity in &ball_query {
        info!(?entity, "Adding cosmetics to ball");
        let light = ChargeLightFx::default();
        commands
            .entity(entity)
            .insert((
                Mesh3d(meshes.add(Sphere::new(BALL_RADIUS))),
                MeshMaterial3d(materials.add(Color::srgb(0.85, 0.85, 0.9))),
                DashTrailFx::default(),
            ))
            .with_child((
                PointLight {
                    intensity: 0.0,
                    color: light.charging_color,
                    range: 8.0,
                    ..default()
                },
                Transform::default(),
                light,
            ));
    }
}

fn add_floor_cosmetics(
    mut commands: Commands,
    floor_query: Query<Entity, Added<FloorMarker>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for entity in &floor_query {
        info!(?entity, "Adding cosmetics to floor");
        commands.entity(entity).insert((
            Mesh3d(meshes.add(Cuboid::new(FLOOR_WIDTH, FLOOR_HEIGHT, FLOOR_WIDTH))),
            MeshMaterial3d(materials.add(Color::srgb(0.3, 0.5, 0.3))),
        ));
    }
}
