//! Charge power as a function of time spent charging.

/// Power in `[0, 1]` after `elapsed` seconds of charging.
///
/// With `drop_active`, the first `drop_duration` seconds fall linearly from full power to
/// zero and the triangle wave starts at the end of the drop. Otherwise the triangle wave
/// rises from zero to full power over half a cycle and falls back over the other half.
pub fn power(elapsed: f32, cycle_duration: f32, drop_active: bool, drop_duration: f32) -> f32 {
    if !elapsed.is_finite() {
        return 0.0;
    }
    let elapsed = elapsed.max(0.0);
    if drop_active && drop_duration > 0.0 {
        if elapsed < drop_duration {
            return (1.0 - elapsed / drop_duration).clamp(0.0, 1.0);
        }
        return triangle(elapsed - drop_duration, cycle_duration);
    }
    triangle(elapsed, cycle_duration)
}

fn triangle(time: f32, period: f32) -> f32 {
    if !(period > 0.0) || !period.is_finite() {
        return 0.0;
    }
    let phase = time.rem_euclid(period) / period;
    let value = if phase < 0.5 {
        2.0 * phase
    } else {
        2.0 * (1.0 - phase)
    };
    value.clamp(0.0, 1.0)
}
