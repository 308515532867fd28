use approx::assert_abs_diff_eq;
use bevy::prelude::*;
use dash::*;

struct TestBody {
    position: Vec3,
    velocity: Vec3,
    inverse_mass: f32,
}

impl TestBody {
    fn at_rest() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            inverse_mass: 1.0,
        }
    }

    fn moving(velocity: Vec3) -> Self {
        Self {
            velocity,
            ..Self::at_rest()
        }
    }
}

impl DashBody for TestBody {
    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn apply_impulse(&mut self, impulse: Vec3) {
        self.velocity += impulse * self.inverse_mass;
    }

    fn add_velocity(&mut self, delta: Vec3) {
        self.velocity += delta;
    }
}

#[track_caller]
fn assert_vec3_near(actual: Vec3, expected: Vec3, epsilon: f32) {
    assert!(
        actual.abs_diff_eq(expected, epsilon),
        "expected {expected}, got {actual}"
    );
}

fn idle_input() -> DashInput {
    DashInput::default()
}

fn forward_input() -> DashInput {
    DashInput {
        movement: Vec2::Y,
        ..default()
    }
}

/// Presses, charges for `hold` seconds and releases against `body`.
fn charge_and_release(
    ability: &mut DashAbility,
    body: &TestBody,
    input: &DashInput,
    hold: f32,
    config: &DashConfig,
) -> DashImpulse {
    assert!(ability.press(input, config), "press should start charging");
    ability.advance(hold, input, body.snapshot(), config);
    ability
        .release(body.snapshot(), config)
        .expect("release while charging should dash")
}

fn drain(ability: &mut DashAbility) -> Vec<DashEvent> {
    ability.drain_events().collect()
}

#[test]
fn power_is_periodic() {
    for i in 0..200 {
        let elapsed = i as f32 * 0.0731;
        for cycle in [0.4, 1.0, 1.5, 3.2] {
            assert_abs_diff_eq!(
                power(elapsed, cycle, false, 0.0),
                power(elapsed + cycle, cycle, false, 0.0),
                epsilon = 1e-4
            );
        }
    }
}

#[test]
fn power_stays_in_unit_range() {
    for i in 0..500 {
        let elapsed = i as f32 * 0.0173;
        for (cycle, drop) in [(1.5, false), (0.3, true), (2.0, true)] {
            let value = power(elapsed, cycle, drop, 0.2);
            assert!((0.0..=1.0).contains(&value), "power {value} out of range");
        }
    }
}

#[test]
fn initial_drop_falls_then_oscillates() {
    assert_abs_diff_eq!(power(0.1, 1.5, true, 0.2), 0.5, epsilon = 1e-5);
    assert_abs_diff_eq!(power(0.2 + 0.75, 1.5, true, 0.2), 1.0, epsilon = 1e-5);
    assert_abs_diff_eq!(power(0.2 + 0.375, 1.5, true, 0.2), 0.5, epsilon = 1e-5);
}

#[test]
fn locked_direction_is_unit_length() {
    for x in -10..=10 {
        for y in -10..=10 {
            let input = Vec2::new(x as f32 * 0.1, y as f32 * 0.1);
            for yaw in [0.0, 0.7, -2.1, 3.0] {
                let direction = lock_direction(input, yaw);
                assert_abs_diff_eq!(direction.length(), 1.0, epsilon = 1e-5);
            }
        }
    }
}

#[test]
fn small_input_locks_camera_forward() {
    let direction = lock_direction(Vec2::new(0.05, 0.05), 0.0);
    assert_vec3_near(direction.as_vec3(), Vec3::Z, 1e-6);

    let turned = lock_direction(Vec2::ZERO, std::f32::consts::FRAC_PI_2);
    assert_vec3_near(turned.as_vec3(), Vec3::X, 1e-6);
}

#[test]
fn non_finite_input_locks_camera_forward() {
    let direction = lock_direction(Vec2::new(f32::NAN, 1.0), 0.0);
    assert_vec3_near(direction.as_vec3(), Vec3::Z, 1e-6);
}

#[test]
fn stick_right_is_camera_right() {
    let direction = lock_direction(Vec2::X, 0.0);
    assert_vec3_near(direction.as_vec3(), Vec3::NEG_X, 1e-6);
}

#[test]
fn full_power_dash_from_rest() {
    let config = DashConfig::default();
    let mut ability = DashAbility::default();
    let mut body = TestBody::at_rest();

    let impulse = charge_and_release(&mut ability, &body, &idle_input(), 0.75, &config);
    assert_abs_diff_eq!(impulse.power, 1.0, epsilon = 1e-5);
    assert_vec3_near(impulse.impulse, Vec3::new(0.0, 0.0, 20.0), 1e-4);
    assert_eq!(impulse.corrective, None);
    assert_eq!(ability.state(), DashState::Cooldown);

    ability.physics_step(&mut body);
    assert_vec3_near(body.velocity, Vec3::new(0.0, 0.0, 20.0), 1e-4);

    ability.physics_step(&mut body);
    assert_vec3_near(
        body.velocity,
        Vec3::new(0.0, 0.0, 20.0),
        1e-4
    );
}

#[test]
fn quarter_cycle_gives_half_power() {
    let config = DashConfig::default();
    let mut ability = DashAbility::default();
    ability.press(&idle_input(), &config);
    ability.advance(0.375, &idle_input(), BodySnapshot::default(), &config);
    assert_abs_diff_eq!(ability.power(&config).unwrap(), 0.5, epsilon = 1e-5);
    ability.advance(0.75, &idle_input(), BodySnapshot::default(), &config);
    assert_abs_diff_eq!(ability.power(&config).unwrap(), 0.5, epsilon = 1e-5);
}

#[test]
fn opposing_velocity_is_cancelled_before_impulse() {
    let config = DashConfig::default();
    let mut ability = DashAbility::default();
    let mut body = TestBody::moving(Vec3::new(0.0, 0.0, -5.0));

    let impulse = charge_and_release(&mut ability, &body, &forward_input(), 0.75, &config);
    let corrective = impulse.corrective.expect("opposing motion should be cancelled");
    assert_vec3_near(corrective, Vec3::new(0.0, 0.0, 5.0), 1e-5);
    assert_abs_diff_eq!(impulse.velocity_along, 0.0);
    assert_vec3_near(impulse.base, Vec3::new(0.0, 0.0, 20.0), 1e-4);
    assert_vec3_near(impulse.boost, Vec3::new(0.0, 0.0, 7.5), 1e-4);

    ability.physics_step(&mut body);
    assert_vec3_near(body.velocity, Vec3::new(0.0, 0.0, 27.5), 1e-4);
}

#[test]
fn opposing_velocity_kept_when_cancellation_disabled() {
    let config = DashConfig {
        cancel_opposing_velocity: false,
        ..default()
    };
    let impulse = compose_impulse(Dir3::Z, 1.0, Vec3::new(0.0, 0.0, -5.0), &config);
    assert_eq!(impulse.corrective, None);
    assert_abs_diff_eq!(impulse.velocity_along, -5.0);
}

#[test]
fn slow_motion_gets_no_velocity_boost() {
    let config = DashConfig::default();
    let impulse = compose_impulse(Dir3::Z, 1.0, Vec3::new(0.05, 0.0, 0.0), &config);
    assert_eq!(impulse.boost, Vec3::ZERO);
}

#[test]
fn non_finite_velocity_composes_as_rest() {
    let config = DashConfig::default();
    let impulse = compose_impulse(Dir3::Z, 1.0, Vec3::new(f32::NAN, 0.0, 0.0), &config);
    assert_vec3_near(impulse.impulse, Vec3::new(0.0, 0.0, 20.0), 1e-5);
    assert!(impulse.impulse.is_finite());
}

#[test]
fn minimum_speed_enforced_one_tick_later() {
    let config = DashConfig::default();
    let mut ability = DashAbility::default();
    let mut body = TestBody {
        inverse_mass: 0.2,
        ..TestBody::at_rest()
    };

    let impulse = charge_and_release(&mut ability, &body, &idle_input(), 0.375, &config);
    assert_abs_diff_eq!(impulse.power, 0.5, epsilon = 1e-5);

    ability.physics_step(&mut body);
    assert_abs_diff_eq!(body.velocity.z, 2.0, epsilon = 1e-4);
    assert!(ability.needs_physics_step());

    body.velocity.x = 3.0;
    ability.physics_step(&mut body);
    assert_vec3_near(body.velocity, Vec3::new(3.0, 0.0, 4.0), 1e-4);

    body.velocity.z = 1.0;
    ability.physics_step(&mut body);
    assert_abs_diff_eq!(body.velocity.z, 1.0, epsilon = 1e-6);
    assert!(!ability.needs_physics_step());
}

#[test]
fn minimum_speed_floor_disabled_at_zero() {
    let config = DashConfig {
        minimum_dash_speed: 0.0,
        ..default()
    };
    let mut ability = DashAbility::default();
    let mut body = TestBody {
        inverse_mass: 0.2,
        ..TestBody::at_rest()
    };
    charge_and_release(&mut ability, &body, &idle_input(), 0.375, &config);
    ability.physics_step(&mut body);
    ability.physics_step(&mut body);
    assert_abs_diff_eq!(body.velocity.z, 2.0, epsilon = 1e-4);
}

#[test]
fn press_during_cooldown_is_ignored() {
    let config = DashConfig::default();
    let mut ability = DashAbility::default();
    let body = TestBody::at_rest();
    charge_and_release(&mut ability, &body, &idle_input(), 0.5, &config);
    ability.advance(1.0, &idle_input(), body.snapshot(), &config);
    drain(&mut ability);

    assert!(!ability.press(&idle_input(), &config));
    assert_eq!(ability.state(), DashState::Cooldown);
    assert_abs_diff_eq!(ability.cooldown_remaining(), 1.0, epsilon = 1e-5);
    assert!(drain(&mut ability).is_empty());
}

#[test]
fn press_while_charging_is_ignored() {
    let config = DashConfig::default();
    let mut ability = DashAbility::default();
    ability.press(&idle_input(), &config);
    ability.advance(0.3, &idle_input(), BodySnapshot::default(), &config);
    assert!(!ability.press(&idle_input(), &config));
    assert_abs_diff_eq!(ability.charge().unwrap().elapsed, 0.3);
}

#[test]
fn release_emits_feedback_in_order() {
    let config = DashConfig::default();
    let mut ability = DashAbility::default();
    let body = TestBody::at_rest();
    ability.press(&idle_input(), &config);
    assert_eq!(drain(&mut ability), vec![DashEvent::StartCharging]);

    ability.advance(0.75, &idle_input(), body.snapshot(), &config);
    let charging = drain(&mut ability);
    assert!(matches!(charging[0], DashEvent::UpdatePowerMeter { .. }));
    assert!(matches!(charging[1], DashEvent::UpdateChargeLight { .. }));
    assert!(matches!(
        charging[2],
        DashEvent::UpdateGhostTrailPreview { .. }
    ));

    ability.release(body.snapshot(), &config);
    assert_eq!(ability.pending_events().len(), 5);
    let released = drain(&mut ability);
    assert_eq!(released.len(), 5);
    assert!(ability.pending_events().is_empty());
    assert_eq!(released[0], DashEvent::StopCharging);
    let DashEvent::PlayDashTrail { direction, power } = released[1] else {
        panic!("expected PlayDashTrail, got {:?}", released[1]);
    };
    assert_vec3_near(direction.as_vec3(), Vec3::Z, 1e-6);
    assert_abs_diff_eq!(power, 1.0, epsilon = 1e-5);
    assert!(matches!(
        released[2],
        DashEvent::StartCooldownVisual { .. }
    ));
    assert_eq!(released[3], DashEvent::TriggerCameraShake);
    assert_eq!(released[4], DashEvent::StartCameraZoom);
}

#[test]
fn release_while_idle_does_nothing() {
    let config = DashConfig::default();
    let mut ability = DashAbility::default();
    assert!(ability.release(BodySnapshot::default(), &config).is_none());
    assert_eq!(ability.state(), DashState::Idle);
    assert!(!ability.needs_physics_step());
}

#[test]
fn direction_follows_input_while_charging() {
    let config = DashConfig::default();
    let mut ability = DashAbility::default();
    ability.press(&forward_input(), &config);
    assert_vec3_near(
        ability.locked_direction().unwrap().as_vec3(),
        Vec3::Z,
        1e-6
    );

    let right = DashInput {
        movement: Vec2::X,
        ..default()
    };
    ability.advance(0.1, &right, BodySnapshot::default(), &config);
    assert_vec3_near(
        ability.locked_direction().unwrap().as_vec3(),
        Vec3::NEG_X,
        1e-6
    );
}

#[test]
fn ghost_preview_uses_current_velocity() {
    let config = DashConfig::default();
    let mut ability = DashAbility::default();
    let body = BodySnapshot {
        position: Vec3::new(1.0, 0.5, 2.0),
        velocity: Vec3::new(0.0, 0.0, 4.0),
    };
    ability.press(&idle_input(), &config);
    drain(&mut ability);
    ability.advance(0.75, &idle_input(), body, &config);
    let events = drain(&mut ability);
    let DashEvent::UpdateGhostTrailPreview {
        origin,
        velocity,
        impulse,
        power,
    } = events[2]
    else {
        panic!("expected a ghost trail preview, got {:?}", events[2]);
    };
    assert_eq!(origin, body.position);
    assert_eq!(velocity, body.velocity);
    assert_abs_diff_eq!(power, 1.0, epsilon = 1e-5);
    assert_vec3_near(impulse, Vec3::new(0.0, 0.0, 26.0), 1e-3);
    assert!(!ability.needs_physics_step(), "previews are never applied");
}

#[test]
fn cooldown_counts_down_and_ends_on_crossing_tick() {
    let config = DashConfig::default();
    let mut ability = DashAbility::default();
    let body = TestBody::at_rest();
    charge_and_release(&mut ability, &body, &idle_input(), 0.5, &config);
    drain(&mut ability);

    let mut last_remaining = ability.cooldown_remaining();
    let mut ready_events = 0;
    let mut ticks = 0;
    while ability.is_on_cooldown() {
        ability.advance(0.3, &idle_input(), body.snapshot(), &config);
        ticks += 1;
        if let Some(session) = ability.cooldown() {
            assert!(session.remaining < last_remaining);
            assert!(session.remaining >= 0.0);
            last_remaining = session.remaining;
        }
        ready_events += drain(&mut ability)
            .iter()
            .filter(|event| **event == DashEvent::ShowReady)
            .count();
    }
    assert_eq!(ticks, 7);
    assert_eq!(ready_events, 1);

    for _ in 0..5 {
        ability.advance(0.3, &idle_input(), body.snapshot(), &config);
    }
    assert!(!drain(&mut ability).contains(&DashEvent::ShowReady));
    assert_eq!(ability.state(), DashState::Idle);
}

#[test]
fn cooldown_progress_is_reported() {
    let config = DashConfig::default();
    let mut ability = DashAbility::default();
    let body = TestBody::at_rest();
    charge_and_release(&mut ability, &body, &idle_input(), 0.5, &config);
    drain(&mut ability);

    ability.advance(0.5, &idle_input(), body.snapshot(), &config);
    let events = drain(&mut ability);
    let Some(DashEvent::UpdateCooldownVisual { progress }) = events.first().copied() else {
        panic!("expected cooldown progress, got {events:?}");
    };
    assert_abs_diff_eq!(progress, 0.25, epsilon = 1e-5);
}

#[test]
fn state_always_matches_session() {
    let config = DashConfig::default();
    let mut ability = DashAbility::default();
    let mut body = TestBody::at_rest();
    let script = [
        (true, false, 0.2),
        (false, false, 0.3),
        (true, false, 0.1),
        (false, true, 0.1),
        (true, false, 0.5),
        (false, false, 1.0),
        (false, true, 0.6),
        (true, true, 0.1),
        (false, false, 3.0),
    ];
    for (pressed, released, dt) in script {
        let input = DashInput {
            pressed,
            released,
            ..forward_input()
        };
        ability.update(dt, &input, body.snapshot(), &config);
        ability.physics_step(&mut body);
        assert_eq!(ability.phase().state(), ability.state());
        match ability.state() {
            DashState::Idle => assert!(ability.charge().is_none() && ability.cooldown().is_none()),
            DashState::Charging => {
                assert!(ability.charge().is_some() && ability.cooldown().is_none())
            }
            DashState::Cooldown => {
                assert!(ability.charge().is_none() && ability.cooldown().is_some())
            }
        }
    }
}

#[test]
fn camera_zoom_ends_after_delay() {
    let config = DashConfig::default();
    let mut ability = DashAbility::default();
    let body = TestBody::at_rest();
    charge_and_release(&mut ability, &body, &idle_input(), 0.5, &config);
    drain(&mut ability);

    ability.advance(0.3, &idle_input(), body.snapshot(), &config);
    assert!(!drain(&mut ability).contains(&DashEvent::EndCameraZoom));
    ability.advance(0.3, &idle_input(), body.snapshot(), &config);
    assert!(drain(&mut ability).contains(&DashEvent::EndCameraZoom));
}

#[test]
fn zoom_delay_counts_from_release_tick() {
    let config = DashConfig::default();
    let mut ability = DashAbility::default();
    let body = TestBody::at_rest();
    let press = DashInput {
        pressed: true,
        ..idle_input()
    };
    let release = DashInput {
        released: true,
        ..idle_input()
    };
    ability.update(0.1, &press, body.snapshot(), &config);
    ability.update(0.1, &release, body.snapshot(), &config);
    assert_eq!(ability.state(), DashState::Cooldown);
    drain(&mut ability);

    for _ in 0..3 {
        ability.update(0.15, &idle_input(), body.snapshot(), &config);
    }
    assert!(
        !drain(&mut ability).contains(&DashEvent::EndCameraZoom),
        "zoom should still be on 0.45 s after release"
    );
    ability.update(0.1, &idle_input(), body.snapshot(), &config);
    assert!(drain(&mut ability).contains(&DashEvent::EndCameraZoom));
}

fn zoom_ends_after_back_to_back_dashes(zoom_overlap: ZoomOverlap) -> Vec<usize> {
    let config = DashConfig {
        cooldown_duration: 0.1,
        zoom_overlap,
        ..default()
    };
    let mut ability = DashAbility::default();
    let body = TestBody::at_rest();
    charge_and_release(&mut ability, &body, &idle_input(), 0.5, &config);
    ability.advance(0.3, &idle_input(), body.snapshot(), &config);
    assert_eq!(ability.state(), DashState::Idle);
    assert!(ability.press(&idle_input(), &config));
    ability.release(body.snapshot(), &config);
    drain(&mut ability);

    (0..3)
        .map(|_| {
            ability.advance(0.3, &idle_input(), body.snapshot(), &config);
            drain(&mut ability)
                .iter()
                .filter(|event| **event == DashEvent::EndCameraZoom)
                .count()
        })
        .collect()
}

#[test]
fn second_dash_restarts_zoom_out() {
    assert_eq!(zoom_ends_after_back_to_back_dashes(ZoomOverlap::Restart), vec![0, 1, 0]);
}

#[test]
fn stacked_zoom_outs_all_fire() {
    assert_eq!(zoom_ends_after_back_to_back_dashes(ZoomOverlap::Stack), vec![1, 1, 0]);
}

#[test]
fn interrupt_discards_charge() {
    let config = DashConfig::default();
    let mut ability = DashAbility::default();
    ability.press(&idle_input(), &config);
    drain(&mut ability);

    assert!(ability.interrupt());
    assert_eq!(ability.state(), DashState::Idle);
    assert_eq!(drain(&mut ability), vec![DashEvent::StopCharging]);
    assert!(!ability.interrupt());
    assert!(ability.press(&idle_input(), &config));
}

#[test]
fn dispose_cancels_deferred_work() {
    let config = DashConfig::default();
    let mut ability = DashAbility::default();
    let mut body = TestBody::at_rest();
    charge_and_release(&mut ability, &body, &idle_input(), 0.5, &config);
    ability.physics_step(&mut body);
    drain(&mut ability);
    assert!(ability.needs_physics_step());

    ability.dispose();
    assert_eq!(drain(&mut ability), vec![DashEvent::EndCameraZoom]);
    assert!(ability.scheduler().is_empty());
    assert!(!ability.needs_physics_step());

    ability.advance(1.0, &idle_input(), body.snapshot(), &config);
    assert!(!drain(&mut ability).contains(&DashEvent::EndCameraZoom));
}

#[test]
fn initial_drop_starts_at_full_power() {
    let config = DashConfig {
        initial_drop: true,
        ..default()
    };
    let mut ability = DashAbility::default();
    ability.press(&idle_input(), &config);
    assert_abs_diff_eq!(ability.power(&config).unwrap(), 1.0);
    ability.advance(0.1, &idle_input(), BodySnapshot::default(), &config);
    assert_abs_diff_eq!(ability.power(&config).unwrap(), 0.5, epsilon = 1e-5);
}
