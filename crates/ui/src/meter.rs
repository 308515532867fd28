use bevy::color::{Mix, Srgba};
use bevy::prelude::*;
use dash::{FeedbackPalette, PowerMeterDisplay};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MeterMode {
    Ready,
    Charging,
    /// Shrinking from the released power to an empty cooldown bar.
    ToCooldown {
        elapsed: f32,
        from_power: f32,
        from_color: Srgba,
        to_color: Srgba,
    },
    Cooldown,
    /// Cross-fading into the ready colour.
    ToReady {
        elapsed: f32,
        from_color: Srgba,
        to_color: Srgba,
    },
}

/// Dash power meter state; lives on the fill node.
#[derive(Component, Clone, Debug)]
pub struct PowerMeter {
    pub cooldown_transition_secs: f32,
    pub ready_transition_secs: f32,
    mode: MeterMode,
    fill: f32,
    color: Srgba,
}

impl Default for PowerMeter {
    fn default() -> Self {
        Self::new(FeedbackPalette::default().ready)
    }
}

impl PowerMeter {
    /// A full bar in `ready_color`.
    pub fn new(ready_color: Srgba) -> Self {
        Self {
            cooldown_transition_secs: 0.4,
            ready_transition_secs: 0.3,
            mode: MeterMode::Ready,
            fill: 1.0,
            color: ready_color,
        }
    }

    pub fn mode(&self) -> MeterMode {
        self.mode
    }

    /// Bar fill in `[0, 1]`.
    pub fn fill(&self) -> f32 {
        self.fill
    }

    pub fn color(&self) -> Srgba {
        self.color
    }

    pub fn outline_color(&self) -> Srgba {
        FeedbackPalette::outline_color(self.color)
    }

    pub fn label(&self) -> String {
        match self.mode {
            MeterMode::Ready => "Ready".to_string(),
            MeterMode::Charging => format!("{}%", (self.fill * 100.0).round() as u32),
            MeterMode::ToCooldown { .. } | MeterMode::Cooldown | MeterMode::ToReady { .. } => {
                "Recharging...".to_string()
            }
        }
    }

    pub fn is_animating(&self) -> bool {
        matches!(
            self.mode,
            MeterMode::ToCooldown { .. } | MeterMode::ToReady { .. }
        )
    }

    pub fn tick(&mut self, dt: f32) {
        match &mut self.mode {
            MeterMode::ToCooldown {
                elapsed,
                from_power,
                from_color,
                to_color,
            } => {
                *elapsed += dt;
                let t = transition_progress(*elapsed, self.cooldown_transition_secs);
                self.fill = *from_power * (1.0 - t);
                self.color = from_color.mix(to_color, t);
                if t >= 1.0 {
                    self.mode = MeterMode::Cooldown;
                }
            }
            MeterMode::ToReady {
                elapsed,
                from_color,
                to_color,
            } => {
                *elapsed += dt;
                let t = transition_progress(*elapsed, self.ready_transition_secs);
                self.color = from_color.mix(to_color, t);
                if t >= 1.0 {
                    self.mode = MeterMode::Ready;
                }
            }
            MeterMode::Ready | MeterMode::Charging | MeterMode::Cooldown => {}
        }
    }
}

fn transition_progress(elapsed: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        1.0
    } else {
        (elapsed / duration).clamp(0.0, 1.0)
    }
}

impl PowerMeterDisplay for PowerMeter {
    fn show_power(&mut self, power: f32, color: Srgba) {
        self.mode = MeterMode::Charging;
        self.fill = power.clamp(0.0, 1.0);
        self.color = color;
    }

    fn begin_cooldown_transition(&mut self, from_power: f32, from_color: Srgba, to_color: Srgba) {
        let from_power = from_power.clamp(0.0, 1.0);
        self.mode = MeterMode::ToCooldown {
            elapsed: 0.0,
            from_power,
            from_color,
            to_color,
        };
        self.fill = from_power;
        self.color = from_color;
    }

    fn show_cooldown(&mut self, progress: f32, color: Srgba) {
        if matches!(self.mode, MeterMode::ToCooldown { .. }) {
            return;
        }
        self.mode = MeterMode::Cooldown;
        self.fill = progress.clamp(0.0, 1.0);
        self.color = color;
    }

    fn show_ready(&mut self, from_color: Srgba, ready_color: Srgba) {
        if matches!(self.mode, MeterMode::Ready | MeterMode::ToReady { .. }) {
            return;
        }
        self.mode = MeterMode::ToReady {
            elapsed: 0.0,
            from_color,
            to_color: ready_color,
        };
        self.fill = 1.0;
        self.color = from_color;
    }
}
