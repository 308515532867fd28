use bevy::asset::LoadState;
use bevy::prelude::*;
use bevy_common_assets::ron::RonAssetPlugin;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app_state::{AppStatePlugin, TrackedAssets};
use crate::feedback::FeedbackSettings;

pub const DEFAULT_CONFIG_PATH: &str = "dash.config.ron";

/// What a second dash does to the first dash's pending zoom-out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Reflect)]
pub enum ZoomOverlap {
    /// Cancel the pending zoom-out and schedule a fresh one.
    #[default]
    Restart,
    /// Keep every zoom-out; the earliest one ends the zoom.
    Stack,
}

/// Tuning for a dash-capable actor. Read-only once inserted as a resource.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Reflect, Asset, Resource)]
#[serde(default)]
pub struct DashConfig {
    pub dash_force_multiplier: f32,
    pub velocity_scale_multiplier: f32,
    pub cancel_opposing_velocity: bool,
    /// Speed floor along the dash direction at full power. `0` disables the floor.
    pub minimum_dash_speed: f32,
    pub cooldown_duration: f32,
    pub power_meter_cycle_duration: f32,
    pub initial_drop: bool,
    pub initial_drop_duration: f32,
    /// Seconds between a dash and the camera zooming back out.
    pub end_zoom_delay: f32,
    pub zoom_overlap: ZoomOverlap,
    pub feedback: FeedbackSettings,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            dash_force_multiplier: 20.0,
            velocity_scale_multiplier: 1.5,
            cancel_opposing_velocity: true,
            minimum_dash_speed: 8.0,
            cooldown_duration: 2.0,
            power_meter_cycle_duration: 1.5,
            initial_drop: false,
            initial_drop_duration: 0.2,
            end_zoom_delay: 0.5,
            zoom_overlap: ZoomOverlap::Restart,
            feedback: FeedbackSettings::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DashConfigError {
    #[error("`{field}` must be a finite, non-negative number (got {value})")]
    Negative { field: &'static str, value: f32 },
    #[error("`{field}` must be greater than zero (got {value})")]
    NotPositive { field: &'static str, value: f32 },
    #[error("could not parse dash config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

impl DashConfig {
    pub fn from_ron(source: &str) -> Result<Self, DashConfigError> {
        let config: Self = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DashConfigError> {
        non_negative("dash_force_multiplier", self.dash_force_multiplier)?;
        non_negative("velocity_scale_multiplier", self.velocity_scale_multiplier)?;
        non_negative("minimum_dash_speed", self.minimum_dash_speed)?;
        non_negative("cooldown_duration", self.cooldown_duration)?;
        positive("power_meter_cycle_duration", self.power_meter_cycle_duration)?;
        non_negative("end_zoom_delay", self.end_zoom_delay)?;
        if self.initial_drop {
            positive("initial_drop_duration", self.initial_drop_duration)?;
        } else {
            non_negative("initial_drop_duration", self.initial_drop_duration)?;
        }
        Ok(())
    }

    pub fn minimum_speed_enabled(&self) -> bool {
        self.minimum_dash_speed > 0.0
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), DashConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(DashConfigError::Negative { field, value })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), DashConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DashConfigError::NotPositive { field, value })
    }
}

/// Loads [`DashConfig`] from a RON asset and inserts it as a resource once it settles.
///
/// A missing or invalid asset falls back to [`DashConfig::default`].
pub struct DashConfigPlugin {
    pub path: String,
}

impl Default for DashConfigPlugin {
    fn default() -> Self {
        Self {
            path: DEFAULT_CONFIG_PATH.to_string(),
        }
    }
}

#[derive(Resource, Clone, Debug)]
struct DashConfigSource(String);

#[derive(Resource)]
struct DashConfigHandle(Handle<DashConfig>);

impl Plugin for DashConfigPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<AppStatePlugin>() {
            app.add_plugins(AppStatePlugin);
        }
        app.add_plugins(RonAssetPlugin::<DashConfig>::new(&["config.ron"]));
        app.insert_resource(DashConfigSource(self.path.clone()));
        app.add_systems(Startup, load_dash_config);
        app.add_systems(
            Update,
            insert_dash_config.run_if(not(resource_exists::<DashConfig>)),
        );
    }
}

fn load_dash_config(
    mut commands: Commands,
    source: Res<DashConfigSource>,
    asset_server: Res<AssetServer>,
    mut tracked: ResMut<TrackedAssets>,
) {
    let handle = asset_server.load::<DashConfig>(source.0.clone());
    tracked.add(handle.clone());
    commands.insert_resource(DashConfigHandle(handle));
}

fn insert_dash_config(
    mut commands: Commands,
    handle: Option<Res<DashConfigHandle>>,
    configs: Res<Assets<DashConfig>>,
    asset_server: Res<AssetServer>,
    source: Res<DashConfigSource>,
) {
    let Some(handle) = handle else {
        return;
    };
    if let LoadState::Failed(err) = asset_server.load_state(&handle.0) {
        warn!("Failed to load dash config {:?}, using defaults: {err}", source.0);
        commands.insert_resource(DashConfig::default());
        return;
    }
    let Some(config) = configs.get(&handle.0) else {
        return;
    };
    let config = match config.validate() {
        Ok(()) => config.clone(),
        Err(err) => {
            warn!("Invalid dash config {:?}, using defaults: {err}", source.0);
            DashConfig::default()
        }
    };
    info!("Loaded dash config from {:?}", source.0);
    debug!(?config);
    commands.insert_resource(config);
}
