pub mod components;
pub mod meter;

use bevy::prelude::*;
use dash::{AppState, DashSystems};
pub use components::*;
pub use meter::{MeterMode, PowerMeter};

const METER_WIDTH: f32 = 400.0;
const METER_HEIGHT: f32 = 36.0;

/// Plugin that shows the loading screen and the dash power meter HUD
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<AppState>();

        app.add_systems(OnEnter(AppState::Loading), setup_loading_screen);
        app.add_systems(OnEnter(AppState::Ready), setup_power_meter);
        app.add_systems(
            Update,
            (animate_power_meter, sync_power_meter)
                .chain()
                .in_set(DashSystems::Present)
                .run_if(in_state(AppState::Ready)),
        );

        info!("UiPlugin initialized");
    }
}

fn setup_loading_screen(mut commands: Commands) {
    commands.spawn((
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            align_items: AlignItems::Center,
            justify_content: JustifyContent::Center,
            ..default()
        },
        BackgroundColor(Color::srgb(0.1, 0.1, 0.1)),
        DespawnOnExit(AppState::Loading),
        children![(
            LoadingText,
            Text::new("Loading..."),
            TextFont {
                font_size: 40.0,
                ..default()
            },
            TextColor(Color::WHITE),
        )],
    ));
}

fn setup_power_meter(mut commands: Commands) {
    info!("Setting up power meter HUD");
    let meter = PowerMeter::default();
    let color = Color::from(meter.color());
    let outline = Color::from(meter.outline_color());
    let label = meter.label();

    commands
        .spawn((
            PowerMeterRoot,
            Node {
                width: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                bottom: Val::Px(40.0),
                justify_content: JustifyContent::Center,
                ..default()
            },
        ))
        .with_children(|parent| {
            parent
                .spawn((
                    PowerMeterFrame,
                    Node {
                        width: Val::Px(METER_WIDTH),
                        height: Val::Px(METER_HEIGHT),
                        justify_content: JustifyContent::Start,
                        ..default()
                    },
                    BackgroundColor(Color::srgba(0.1, 0.1, 0.1, 0.8)),
                    Outline::new(Val::Px(3.0), Val::ZERO, outline),
                ))
                .with_children(|frame| {
                    frame.spawn((
                        Node {
                            width: Val::Percent(meter.fill() * 100.0),
                            height: Val::Percent(100.0),
                            ..default()
                        },
                        BackgroundColor(color),
                        meter,
                    ));
                    frame.spawn((
                        PowerMeterLabel,
                        Node {
                            position_type: PositionType::Absolute,
                            width: Val::Percent(100.0),
                            height: Val::Percent(100.0),
                            justify_content: JustifyContent::Center,
                            align_items: AlignItems::Center,
                            ..default()
                        },
                        Text::new(label),
                        TextFont {
                            font_size: 24.0,
                            ..default()
                        },
                        TextColor(Color::WHITE),
                    ));
                });
        });
}

fn animate_power_meter(time: Res<Time>, mut meter_query: Query<&mut PowerMeter>) {
    let dt = time.delta_secs();
    for mut meter in &mut meter_query {
        if meter.is_animating() {
            meter.tick(dt);
        }
    }
}

/// Writes changed meter state into the fill, frame outline and label nodes.
fn sync_power_meter(
    mut meter_query: Query<(&PowerMeter, &mut Node, &mut BackgroundColor), Changed<PowerMeter>>,
    mut frame_query: Query<&mut Outline, With<PowerMeterFrame>>,
    mut label_query: Query<&mut Text, With<PowerMeterLabel>>,
) {
    let Ok((meter, mut node, mut background)) = meter_query.single_mut() else {
        return;
    };
    node.width = Val::Percent(meter.fill() * 100.0);
    background.0 = meter.color().into();
    for mut outline in &mut frame_query {
        outline.color = meter.outline_color().into();
    }
    let label = meter.label();
    for mut text in &mut label_query {
        if text.0 != label {
            text.0 = label.clone();
        }
    }
}
