use bevy::prelude::*;

use crate::config::{DashConfig, ZoomOverlap};
use crate::direction::lock_direction;
use crate::force::{compose_impulse, minimum_speed_correction, DashImpulse};
use crate::oscillator;
use crate::schedule::{DashScheduler, Deadline, DeferredAction, ScheduleHandle};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub enum DashState {
    #[default]
    Idle,
    Charging,
    Cooldown,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChargeSession {
    pub locked_direction: Dir3,
    pub elapsed: f32,
    pub initial_drop_active: bool,
}

impl ChargeSession {
    pub fn power(&self, config: &DashConfig) -> f32 {
        oscillator::power(
            self.elapsed,
            config.power_meter_cycle_duration,
            self.initial_drop_active,
            config.initial_drop_duration,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CooldownSession {
    pub remaining: f32,
    pub duration: f32,
}

impl CooldownSession {
    /// Fraction of the cooldown already served, in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (1.0 - self.remaining / self.duration).clamp(0.0, 1.0)
    }
}

/// The ability's state together with the session that belongs to it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DashPhase {
    #[default]
    Idle,
    Charging(ChargeSession),
    Cooldown(CooldownSession),
}

impl DashPhase {
    pub fn state(&self) -> DashState {
        match self {
            Self::Idle => DashState::Idle,
            Self::Charging(_) => DashState::Charging,
            Self::Cooldown(_) => DashState::Cooldown,
        }
    }
}

/// One presentation tick's worth of input.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DashInput {
    pub pressed: bool,
    pub released: bool,
    pub movement: Vec2,
    pub camera_yaw: f32,
}

/// Where the body is and how fast it moves, as seen by the presentation tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BodySnapshot {
    pub position: Vec3,
    pub velocity: Vec3,
}

/// The rigid body a dash acts on.
pub trait DashBody {
    fn velocity(&self) -> Vec3;
    fn position(&self) -> Vec3;
    /// Instantaneous impulse, scaled by the body's inverse mass.
    fn apply_impulse(&mut self, impulse: Vec3);
    /// Direct velocity change, independent of mass.
    fn add_velocity(&mut self, delta: Vec3);

    fn snapshot(&self) -> BodySnapshot {
        BodySnapshot {
            position: self.position(),
            velocity: self.velocity(),
        }
    }
}

/// Feedback cues emitted by a [`DashAbility`], in the order they should be presented.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DashEvent {
    StartCharging,
    UpdatePowerMeter {
        power: f32,
    },
    UpdateChargeLight {
        power: f32,
    },
    UpdateGhostTrailPreview {
        origin: Vec3,
        velocity: Vec3,
        impulse: Vec3,
        power: f32,
    },
    StopCharging,
    PlayDashTrail {
        direction: Dir3,
        power: f32,
    },
    StartCooldownVisual {
        from_power: f32,
    },
    TriggerCameraShake,
    StartCameraZoom,
    UpdateCooldownVisual {
        progress: f32,
    },
    ShowReady,
    EndCameraZoom,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct QueuedDash {
    impulse: DashImpulse,
    minimum_speed: f32,
}

/// Charge, release and cooldown of one actor's dash.
///
/// Presentation ticks drive [`DashAbility::update`], physics ticks drive
/// [`DashAbility::physics_step`]. Feedback is collected in an outbox and drained with
/// [`DashAbility::drain_events`].
#[derive(Component, Clone, Debug, Default)]
pub struct DashAbility {
    phase: DashPhase,
    queued: Vec<QueuedDash>,
    scheduler: DashScheduler,
    end_zoom: Option<ScheduleHandle>,
    outbox: Vec<DashEvent>,
}

impl DashAbility {
    pub fn phase(&self) -> &DashPhase {
        &self.phase
    }

    pub fn state(&self) -> DashState {
        self.phase.state()
    }

    pub fn charge(&self) -> Option<&ChargeSession> {
        match &self.phase {
            DashPhase::Charging(session) => Some(session),
            _ => None,
        }
    }

    pub fn cooldown(&self) -> Option<&CooldownSession> {
        match &self.phase {
            DashPhase::Cooldown(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_on_cooldown(&self) -> bool {
        self.cooldown().is_some()
    }

    pub fn cooldown_remaining(&self) -> f32 {
        self.cooldown().map_or(0.0, |session| session.remaining)
    }

    /// Current charge power, or `None` when not charging.
    pub fn power(&self, config: &DashConfig) -> Option<f32> {
        self.charge().map(|session| session.power(config))
    }

    pub fn locked_direction(&self) -> Option<Dir3> {
        self.charge().map(|session| session.locked_direction)
    }

    pub fn scheduler(&self) -> &DashScheduler {
        &self.scheduler
    }

    /// Whether [`DashAbility::physics_step`] has anything to do.
    pub fn needs_physics_step(&self) -> bool {
        !self.queued.is_empty() || self.scheduler.has_physics_work()
    }

    pub fn pending_events(&self) -> &[DashEvent] {
        &self.outbox
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = DashEvent> + '_ {
        self.outbox.drain(..)
    }

    /// Starts charging. Ignored unless idle; returns whether charging started.
    pub fn press(&mut self, input: &DashInput, config: &DashConfig) -> bool {
        if self.phase != DashPhase::Idle {
            debug!("Dash press ignored in {:?}", self.state());
            return false;
        }
        self.phase = DashPhase::Charging(ChargeSession {
            locked_direction: lock_direction(input.movement, input.camera_yaw),
            elapsed: 0.0,
            initial_drop_active: config.initial_drop,
        });
        self.outbox.push(DashEvent::StartCharging);
        debug!("Dash charging started");
        true
    }

    /// Fires the charged dash and starts the cooldown. Ignored unless charging.
    ///
    /// The returned impulse is queued for the next [`DashAbility::physics_step`].
    pub fn release(&mut self, body: BodySnapshot, config: &DashConfig) -> Option<DashImpulse> {
        let DashPhase::Charging(session) = self.phase else {
            return None;
        };
        let power = session.power(config);
        let impulse = compose_impulse(session.locked_direction, power, body.velocity, config);
        let minimum_speed = if config.minimum_speed_enabled() {
            config.minimum_dash_speed * power
        } else {
            0.0
        };
        self.queued.push(QueuedDash {
            impulse,
            minimum_speed,
        });

        let duration = config.cooldown_duration.max(0.0);
        self.phase = DashPhase::Cooldown(CooldownSession {
            remaining: duration,
            duration,
        });

        self.outbox.extend([
            DashEvent::StopCharging,
            DashEvent::PlayDashTrail {
                direction: session.locked_direction,
                power,
            },
            DashEvent::StartCooldownVisual { from_power: power },
            DashEvent::TriggerCameraShake,
            DashEvent::StartCameraZoom,
        ]);
        self.schedule_end_zoom(config);

        info!(
            "Dash released: power {:.2}, velocity along {:.2}, base {:.2}, boost {:.2}, total {:.2}",
            power,
            impulse.velocity_along,
            impulse.base.length(),
            impulse.boost.length(),
            impulse.impulse.length(),
        );
        Some(impulse)
    }

    /// Discards a charge in progress without dashing. Returns whether a charge was discarded.
    pub fn interrupt(&mut self) -> bool {
        if !matches!(self.phase, DashPhase::Charging(_)) {
            return false;
        }
        self.phase = DashPhase::Idle;
        self.outbox.push(DashEvent::StopCharging);
        debug!("Dash charge interrupted");
        true
    }

    /// Tears the ability down: interrupts charging, drops queued impulses and cancels every
    /// deferred action. A pending zoom-out is emitted right away so the camera is not left
    /// zoomed in.
    pub fn dispose(&mut self) {
        self.interrupt();
        self.queued.clear();
        self.end_zoom = None;
        let cancelled = self.scheduler.cancel_all();
        if cancelled.contains(&DeferredAction::EndCameraZoom) {
            self.outbox.push(DashEvent::EndCameraZoom);
        }
    }

    /// One presentation tick: press/release edges, then timers and deferred actions.
    pub fn update(&mut self, dt: f32, input: &DashInput, body: BodySnapshot, config: &DashConfig) {
        if input.pressed {
            self.press(input, config);
        }
        if input.released && self.release(body, config).is_some() {
            // This tick's time passed before the release was seen.
            if let Some(handle) = self.end_zoom {
                if dt.is_finite() && dt > 0.0 {
                    self.scheduler.postpone(handle, dt);
                }
            }
        }
        self.advance(dt, input, body, config);
    }

    /// Advances the charge or cooldown session by `dt` seconds and fires due deferred actions.
    pub fn advance(&mut self, dt: f32, input: &DashInput, body: BodySnapshot, config: &DashConfig) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        match &mut self.phase {
            DashPhase::Idle => {}
            DashPhase::Charging(session) => {
                session.elapsed += dt;
                session.locked_direction = lock_direction(input.movement, input.camera_yaw);
                let power = session.power(config);
                let preview = compose_impulse(session.locked_direction, power, body.velocity, config);
                self.outbox.extend([
                    DashEvent::UpdatePowerMeter { power },
                    DashEvent::UpdateChargeLight { power },
                    DashEvent::UpdateGhostTrailPreview {
                        origin: body.position,
                        velocity: body.velocity,
                        impulse: preview.impulse,
                        power,
                    },
                ]);
            }
            DashPhase::Cooldown(session) => {
                session.remaining -= dt;
                let progress = session.progress();
                let finished = session.remaining <= 0.0;
                self.outbox
                    .push(DashEvent::UpdateCooldownVisual { progress });
                if finished {
                    self.phase = DashPhase::Idle;
                    self.outbox.push(DashEvent::ShowReady);
                    debug!("Dash ready");
                }
            }
        }

        for action in self.scheduler.advance_time(dt) {
            match action {
                DeferredAction::EndCameraZoom => {
                    self.outbox.push(DashEvent::EndCameraZoom);
                }
                DeferredAction::EnforceMinimumSpeed { .. } => {}
            }
        }
        if self
            .end_zoom
            .is_some_and(|handle| !self.scheduler.is_pending(handle))
        {
            self.end_zoom = None;
        }
    }

    /// One physics tick: runs due minimum-speed checks, then applies queued dashes.
    pub fn physics_step(&mut self, body: &mut dyn DashBody) {
        for action in self.scheduler.advance_physics_tick() {
            if let DeferredAction::EnforceMinimumSpeed { direction, floor } = action {
                if let Some(delta) = minimum_speed_correction(direction, floor, body.velocity()) {
                    debug!("Enforcing minimum dash speed {floor:.2}: adding {delta}");
                    body.add_velocity(delta);
                }
            }
        }

        for queued in std::mem::take(&mut self.queued) {
            let dash = queued.impulse;
            if let Some(corrective) = dash.corrective {
                debug!("Cancelling opposing velocity: adding {corrective}");
                body.add_velocity(corrective);
            }
            body.apply_impulse(dash.impulse);
            if queued.minimum_speed > 0.0 {
                self.scheduler.schedule(
                    Deadline::PhysicsTicks(1),
                    DeferredAction::EnforceMinimumSpeed {
                        direction: dash.direction,
                        floor: queued.minimum_speed,
                    },
                );
            }
        }
    }

    fn schedule_end_zoom(&mut self, config: &DashConfig) {
        if config.zoom_overlap == ZoomOverlap::Restart {
            if let Some(previous) = self.end_zoom.take() {
                self.scheduler.cancel(previous);
            }
        }
        self.end_zoom = Some(self.scheduler.schedule(
            Deadline::Seconds(config.end_zoom_delay.max(0.0)),
            DeferredAction::EndCameraZoom,
        ));
    }
}
