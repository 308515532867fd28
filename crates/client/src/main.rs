use avian3d::prelude::*;
use bevy::prelude::*;
use client::{ClientGameplayPlugin, FeedbackDispatchPlugin};
use dash::config::DEFAULT_CONFIG_PATH;
use dash::*;
use render::RenderPlugin;
use std::time::Duration;
use ui::UiPlugin;

fn main() -> anyhow::Result<()> {
    let config_path = parse_config_path()?;

    App::new()
        .add_plugins(DefaultPlugins)
        .insert_resource(Time::<Fixed>::from_duration(Duration::from_secs_f64(
            1.0 / FIXED_TIMESTEP_HZ,
        )))
        .add_plugins(PhysicsPlugins::default())
        .add_plugins(DashConfigPlugin { path: config_path })
        .add_plugins(DashPlugin)
        .add_plugins(ClientGameplayPlugin)
        .add_plugins(FeedbackDispatchPlugin)
        .add_plugins(RenderPlugin)
        .add_plugins(UiPlugin)
        .run();
    Ok(())
}

/// `--config <path>` picks a dash config relative to the asset folder.
fn parse_config_path() -> anyhow::Result<String> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "-c" || arg == "--config" {
            return args
                .next()
                .ok_or_else(|| anyhow::anyhow!("{arg} expects a config path"));
        }
    }
    Ok(DEFAULT_CONFIG_PATH.to_string())
}
