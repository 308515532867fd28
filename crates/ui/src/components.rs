use bevy::prelude::*;

/// Root node of the power meter HUD
#[derive(Component)]
pub struct PowerMeterRoot;

/// Bar frame holding the fill; carries the outline
#[derive(Component)]
pub struct PowerMeterFrame;

/// Text over the bar: "Ready", charge percentage or "Recharging..."
#[derive(Component)]
pub struct PowerMeterLabel;

/// Shown while the dash config loads
#[derive(Component)]
pub struct LoadingText;
