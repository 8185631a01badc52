//! Idle yaw sway for preview subjects

use bevy::prelude::*;

/// Angular frequency of the sway in rad/s
pub const IDLE_FREQUENCY: f32 = 0.2;

/// Peak yaw of the sway in radians
pub const IDLE_AMPLITUDE: f32 = 0.1;

/// Yaw at elapsed time `t` seconds: `sin(0.2 t) * 0.1`
pub fn idle_yaw(t: f32) -> f32 {
    (t * IDLE_FREQUENCY).sin() * IDLE_AMPLITUDE
}

/// Entities that sway around Y while idle.
///
/// `base` is the rotation the sway is applied on top of.
#[derive(Component, Debug, Clone, Copy)]
pub struct IdleSpin {
    pub base: Quat,
}

impl Default for IdleSpin {
    fn default() -> Self {
        Self {
            base: Quat::IDENTITY,
        }
    }
}

pub struct IdleAnimationPlugin;

impl Plugin for IdleAnimationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, apply_idle_spin);
    }
}

fn apply_idle_spin(time: Res<Time>, mut query: Query<(&IdleSpin, &mut Transform)>) {
    let yaw = idle_yaw(time.elapsed_secs());
    for (spin, mut transform) in query.iter_mut() {
        transform.rotation = spin.base * Quat::from_rotation_y(yaw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    #[test]
    fn test_idle_yaw_bounded() {
        for i in 0..2000 {
            let yaw = idle_yaw(i as f32 * 0.37);
            assert!((-0.1..=0.1).contains(&yaw), "{yaw} out of range");
        }
    }

    #[test]
    fn test_idle_yaw_periodic() {
        let period = TAU / IDLE_FREQUENCY;
        for t in [0.0, 1.3, 7.9, 20.0] {
            assert!((idle_yaw(t) - idle_yaw(t + period)).abs() < 1e-4);
        }
    }

    #[test]
    fn test_idle_yaw_peaks() {
        assert_eq!(idle_yaw(0.0), 0.0);
        let quarter = TAU / IDLE_FREQUENCY / 4.0;
        assert!((idle_yaw(quarter) - 0.1).abs() < 1e-6);
    }
}
