use std::f32::consts::PI;

use bevy::prelude::*;
use dash::ChargeLight;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LightMode {
    #[default]
    Off,
    Charging,
    Cooldown,
    ReadyPulse,
}

/// Point light on the ball tracking charge power, cooldown and readiness.
#[derive(Component, Clone, Debug)]
pub struct ChargeLightFx {
    pub max_intensity: f32,
    pub charging_color: Color,
    pub ready_color: Color,
    pub pulse_count: u32,
    pub pulse_speed: f32,
    mode: LightMode,
    level: f32,
    pulse_timer: f32,
    pulses_done: u32,
}

impl Default for ChargeLightFx {
    fn default() -> Self {
        Self {
            max_intensity: 400_000.0,
            charging_color: Color::srgb(0.0, 1.0, 1.0),
            ready_color: Color::srgb(0.0, 1.0, 0.2),
            pulse_count: 3,
            pulse_speed: 4.0,
            mode: LightMode::Off,
            level: 0.0,
            pulse_timer: 0.0,
            pulses_done: 0,
        }
    }
}

impl ChargeLightFx {
    pub fn mode(&self) -> LightMode {
        self.mode
    }

    /// Brightness in `[0, 1]`.
    pub fn level(&self) -> f32 {
        match self.mode {
            LightMode::Off => 0.0,
            LightMode::Charging | LightMode::Cooldown => self.level,
            LightMode::ReadyPulse => (self.pulse_timer * self.pulse_speed).sin().abs(),
        }
    }

    pub fn intensity(&self) -> f32 {
        self.level() * self.max_intensity
    }

    pub fn color(&self) -> Color {
        match self.mode {
            LightMode::ReadyPulse => self.ready_color,
            _ => self.charging_color,
        }
    }

    pub fn tick(&mut self, dt: f32) {
        if self.mode != LightMode::ReadyPulse {
            return;
        }
        let pulse_length = if self.pulse_speed > 0.0 {
            PI / self.pulse_speed
        } else {
            0.0
        };
        self.pulse_timer += dt;
        while self.mode == LightMode::ReadyPulse && self.pulse_timer >= pulse_length {
            self.pulse_timer -= pulse_length;
            self.pulses_done += 1;
            if self.pulses_done >= self.pulse_count {
                self.mode = LightMode::Off;
                self.pulse_timer = 0.0;
            }
        }
    }
}

impl ChargeLight for ChargeLightFx {
    fn start_charging(&mut self) {
        self.mode = LightMode::Charging;
        self.level = 1.0;
    }

    fn set_charge_level(&mut self, power: f32) {
        if self.mode == LightMode::Charging {
            self.level = power.clamp(0.0, 1.0);
        }
    }

    fn stop_charging(&mut self) {
        self.mode = LightMode::Off;
        self.level = 0.0;
    }

    fn start_cooldown(&mut self) {
        self.mode = LightMode::Cooldown;
        self.level = 0.0;
    }

    fn set_cooldown_level(&mut self, progress: f32) {
        if self.mode == LightMode::Cooldown {
            self.level = progress.clamp(0.0, 1.0);
        }
    }

    fn start_ready_pulse(&mut self) {
        self.mode = LightMode::ReadyPulse;
        self.pulse_timer = 0.0;
        self.pulses_done = 0;
    }
}

pub(crate) fn animate_charge_light(
    time: Res<Time>,
    mut light_query: Query<(&mut ChargeLightFx, &mut PointLight)>,
) {
    let dt = time.delta_secs();
    for (mut fx, mut light) in &mut light_query {
        fx.tick(dt);
        let intensity = fx.intensity();
        if light.intensity != intensity {
            light.intensity = intensity;
        }
        light.color = fx.color();
    }
}
