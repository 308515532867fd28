use bevy::color::{Mix, Srgba};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ability::DashEvent;

/// Charge meter and cooldown bar.
pub trait PowerMeterDisplay {
    fn show_power(&mut self, power: f32, color: Srgba);
    /// Timed shrink from the released power to an empty cooldown bar.
    fn begin_cooldown_transition(&mut self, from_power: f32, from_color: Srgba, to_color: Srgba);
    fn show_cooldown(&mut self, progress: f32, color: Srgba);
    /// Timed cross-fade into the ready colour. Repeated calls while ready are no-ops.
    fn show_ready(&mut self, from_color: Srgba, ready_color: Srgba);
}

pub trait ChargeLight {
    fn start_charging(&mut self);
    fn set_charge_level(&mut self, power: f32);
    fn stop_charging(&mut self);
    fn start_cooldown(&mut self);
    fn set_cooldown_level(&mut self, progress: f32);
    fn start_ready_pulse(&mut self);
}

pub trait CameraEffects {
    fn start_zoom(&mut self);
    fn end_zoom(&mut self);
    fn shake(&mut self);
}

pub trait DashTrail {
    fn play_trail(&mut self, direction: Dir3, power: f32);
    fn show_preview(&mut self, preview: &TrailPreview);
    fn hide_preview(&mut self);
}

/// Inputs of the predicted path drawn while charging.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailPreview {
    pub origin: Vec3,
    pub velocity: Vec3,
    pub impulse: Vec3,
    pub power: f32,
}

/// Which feedback channels are wanted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct FeedbackSettings {
    pub power_meter: bool,
    pub charge_light: bool,
    pub dash_trail: bool,
    pub ghost_trail: bool,
    pub camera_zoom: bool,
    pub camera_shake: bool,
}

impl Default for FeedbackSettings {
    fn default() -> Self {
        Self {
            power_meter: true,
            charge_light: true,
            dash_trail: true,
            ghost_trail: true,
            camera_zoom: true,
            camera_shake: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeedbackPalette {
    pub weak: Srgba,
    pub good: Srgba,
    pub optimal: Srgba,
    pub cooldown_start: Srgba,
    pub cooldown_mid: Srgba,
    pub cooldown_end: Srgba,
    pub ready: Srgba,
}

impl Default for FeedbackPalette {
    fn default() -> Self {
        Self {
            weak: Srgba::rgb(1.0, 0.1, 0.1),
            good: Srgba::rgb(1.0, 0.95, 0.1),
            optimal: Srgba::rgb(0.1, 1.0, 0.3),
            cooldown_start: Srgba::rgb(0.4, 0.4, 0.45),
            cooldown_mid: Srgba::rgb(0.3, 0.5, 0.9),
            cooldown_end: Srgba::rgb(0.2, 0.9, 1.0),
            ready: Srgba::rgb(0.0, 1.0, 0.2),
        }
    }
}

impl FeedbackPalette {
    /// Red to yellow over `[0, 0.5]`, yellow to green over `[0.5, 1]`.
    pub fn power_color(&self, power: f32) -> Srgba {
        ramp(self.weak, self.good, self.optimal, power)
    }

    /// Gray to blue to cyan.
    pub fn cooldown_color(&self, progress: f32) -> Srgba {
        ramp(self.cooldown_start, self.cooldown_mid, self.cooldown_end, progress)
    }

    /// Bar outline: the fill lightened 60% toward white.
    pub fn outline_color(color: Srgba) -> Srgba {
        color.mix(&Srgba::WHITE, 0.6)
    }
}

fn ramp(low: Srgba, mid: Srgba, high: Srgba, t: f32) -> Srgba {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    if t < 0.5 {
        low.mix(&mid, t / 0.5)
    } else {
        mid.mix(&high, (t - 0.5) / 0.5)
    }
}

/// Borrowed feedback collaborators for one dispatch. Absent channels are skipped.
#[derive(Default)]
pub struct FeedbackChannels<'a> {
    pub meter: Option<&'a mut dyn PowerMeterDisplay>,
    pub light: Option<&'a mut dyn ChargeLight>,
    pub camera: Option<&'a mut dyn CameraEffects>,
    pub trail: Option<&'a mut dyn DashTrail>,
}

impl<'a> FeedbackChannels<'a> {
    fn meter(&mut self) -> Option<&mut (dyn PowerMeterDisplay + 'a)> {
        if self.meter.is_none() {
            warn_once!("No power meter to show dash feedback on");
        }
        self.meter.as_deref_mut()
    }

    fn light(&mut self) -> Option<&mut (dyn ChargeLight + 'a)> {
        if self.light.is_none() {
            warn_once!("No charge light to show dash feedback on");
        }
        self.light.as_deref_mut()
    }

    fn camera(&mut self) -> Option<&mut (dyn CameraEffects + 'a)> {
        if self.camera.is_none() {
            warn_once!("No camera effects to show dash feedback on");
        }
        self.camera.as_deref_mut()
    }

    fn trail(&mut self) -> Option<&mut (dyn DashTrail + 'a)> {
        if self.trail.is_none() {
            warn_once!("No dash trail to show dash feedback on");
        }
        self.trail.as_deref_mut()
    }
}

/// Maps [`DashEvent`]s onto feedback collaborator calls. Holds no per-dash state.
#[derive(Resource, Clone, Debug, Default, PartialEq)]
pub struct FeedbackOrchestrator {
    pub palette: FeedbackPalette,
    pub settings: FeedbackSettings,
}

impl FeedbackOrchestrator {
    pub fn new(settings: FeedbackSettings) -> Self {
        Self {
            palette: FeedbackPalette::default(),
            settings,
        }
    }

    pub fn dispatch(&self, event: &DashEvent, channels: &mut FeedbackChannels) {
        let palette = &self.palette;
        let settings = &self.settings;
        match *event {
            DashEvent::StartCharging => {
                if settings.power_meter {
                    if let Some(meter) = channels.meter() {
                        meter.show_power(1.0, palette.power_color(1.0));
                    }
                }
                if settings.charge_light {
                    if let Some(light) = channels.light() {
                        light.start_charging();
                    }
                }
            }
            DashEvent::UpdatePowerMeter { power } => {
                if settings.power_meter {
                    if let Some(meter) = channels.meter() {
                        meter.show_power(power, palette.power_color(power));
                    }
                }
            }
            DashEvent::UpdateChargeLight { power } => {
                if settings.charge_light {
                    if let Some(light) = channels.light() {
                        light.set_charge_level(power);
                    }
                }
            }
            DashEvent::UpdateGhostTrailPreview {
                origin,
                velocity,
                impulse,
                power,
            } => {
                if settings.ghost_trail {
                    if let Some(trail) = channels.trail() {
                        trail.show_preview(&TrailPreview {
                            origin,
                            velocity,
                            impulse,
                            power,
                        });
                    }
                }
            }
            DashEvent::StopCharging => {
                if settings.charge_light {
                    if let Some(light) = channels.light() {
                        light.stop_charging();
                    }
                }
                if settings.ghost_trail {
                    if let Some(trail) = channels.trail() {
                        trail.hide_preview();
                    }
                }
            }
            DashEvent::PlayDashTrail { direction, power } => {
                if settings.dash_trail {
                    if let Some(trail) = channels.trail() {
                        trail.play_trail(direction, power);
                    }
                }
            }
            DashEvent::StartCooldownVisual { from_power } => {
                if settings.power_meter {
                    if let Some(meter) = channels.meter() {
                        meter.begin_cooldown_transition(
                            from_power,
                            palette.power_color(from_power),
                            palette.cooldown_start,
                        );
                    }
                }
                if settings.charge_light {
                    if let Some(light) = channels.light() {
                        light.start_cooldown();
                    }
                }
            }
            DashEvent::TriggerCameraShake => {
                if settings.camera_shake {
                    if let Some(camera) = channels.camera() {
                        camera.shake();
                    }
                }
            }
            DashEvent::StartCameraZoom => {
                if settings.camera_zoom {
                    if let Some(camera) = channels.camera() {
                        camera.start_zoom();
                    }
                }
            }
            DashEvent::UpdateCooldownVisual { progress } => {
                if settings.power_meter {
                    if let Some(meter) = channels.meter() {
                        meter.show_cooldown(progress, palette.cooldown_color(progress));
                    }
                }
                if settings.charge_light {
                    if let Some(light) = channels.light() {
                        light.set_cooldown_level(progress);
                    }
                }
            }
            DashEvent::ShowReady => {
                if settings.power_meter {
                    if let Some(meter) = channels.meter() {
                        meter.show_ready(palette.cooldown_end, palette.ready);
                    }
                }
                if settings.charge_light {
                    if let Some(light) = channels.light() {
                        light.start_ready_pulse();
                    }
                }
            }
            DashEvent::EndCameraZoom => {
                if settings.camera_zoom {
                    if let Some(camera) = channels.camera() {
                        camera.end_zoom();
                    }
                }
            }
        }
    }
}
