//! Orbit camera controller
//!
//! Controls:
//! - Left mouse drag: Orbit around target
//! - Right mouse drag: Pan
//! - Scroll wheel: Dolly (zoom)
//!
//! Distance and polar angle limits come from the parameter store and update
//! live. With damping enabled, orbit input is spread over following frames.

use std::f32::consts::FRAC_PI_2;

use bevy::input::mouse::{MouseButton, MouseMotion, MouseWheel};
use bevy::prelude::*;
use swatch_ipc::CameraLimits;

use crate::store::ParamStore;

/// Smallest polar angle from +Y, keeps the camera off the pole
pub const MIN_POLAR_ANGLE: f32 = 0.01;

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Set while the pointer is over UI so drags and scrolls are not camera input
#[derive(Resource, Debug, Default)]
pub struct CameraInputBlocked(pub bool);

/// Camera orbit controller state
#[derive(Component, Debug, Clone)]
pub struct OrbitCamera {
    /// Point the camera orbits around
    pub target: Vec3,
    /// Distance from target
    pub distance: f32,
    /// Horizontal angle (yaw) in radians
    pub yaw: f32,
    /// Vertical angle (pitch) above the horizon in radians
    pub pitch: f32,
    /// Orbit sensitivity (radians per pixel)
    pub orbit_sensitivity: f32,
    /// Pan sensitivity (units per pixel, scaled by distance)
    pub pan_sensitivity: f32,
    /// Zoom sensitivity (distance units per scroll line)
    pub zoom_sensitivity: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Largest angle between +Y and the view offset
    pub max_polar_angle: f32,
    /// Fraction of pending orbit applied per frame; `None` applies it at once
    pub damping: Option<f32>,
    /// Orbit input (yaw, pitch) not yet applied
    pending: Vec2,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::from_position(Vec3::new(5.0, 5.0, 5.0), Vec3::ZERO)
    }
}

impl OrbitCamera {
    /// Orbit state that places the camera at `position` looking at `target`
    pub fn from_position(position: Vec3, target: Vec3) -> Self {
        let offset = position - target;
        let distance = offset.length().max(f32::EPSILON);
        let limits = CameraLimits::free();
        Self {
            target,
            distance,
            yaw: offset.x.atan2(offset.z),
            pitch: (offset.y / distance).clamp(-1.0, 1.0).asin(),
            orbit_sensitivity: 0.005,
            pan_sensitivity: 0.002,
            zoom_sensitivity: 1.0,
            min_distance: limits.min_distance,
            max_distance: limits.max_distance,
            max_polar_angle: limits.max_polar_angle,
            damping: None,
            pending: Vec2::ZERO,
        }
    }

    /// Calculate camera position from orbit parameters
    pub fn calculate_position(&self) -> Vec3 {
        // Spherical to Cartesian conversion
        // Note: pitch is angle from horizontal, yaw is angle around Y axis
        let horizontal_distance = self.distance * self.pitch.cos();
        let y = self.distance * self.pitch.sin();
        let x = horizontal_distance * self.yaw.sin();
        let z = horizontal_distance * self.yaw.cos();

        self.target + Vec3::new(x, y, z)
    }

    /// Angle between +Y and the camera offset
    pub fn polar_angle(&self) -> f32 {
        FRAC_PI_2 - self.pitch
    }

    /// Adopt new limits and pull the current state inside them
    pub fn set_limits(&mut self, limits: &CameraLimits) {
        self.min_distance = limits.min_distance.max(f32::EPSILON);
        self.max_distance = limits.max_distance.max(self.min_distance);
        self.max_polar_angle = limits.max_polar_angle.max(MIN_POLAR_ANGLE);
        self.damping = limits.damping.filter(|d| *d > 0.0 && *d < 1.0);
        self.clamp_to_limits();
    }

    pub fn clamp_to_limits(&mut self) {
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
        let polar = self.polar_angle().clamp(MIN_POLAR_ANGLE, self.max_polar_angle);
        self.pitch = FRAC_PI_2 - polar;
    }

    /// Queue orbit input from a pointer delta in pixels
    pub fn orbit(&mut self, delta: Vec2) {
        self.pending += Vec2::new(-delta.x, -delta.y) * self.orbit_sensitivity;
    }

    /// Apply queued orbit input for one frame
    pub fn integrate(&mut self) {
        let step = match self.damping {
            Some(factor) => {
                let step = self.pending * factor;
                self.pending -= step;
                if self.pending.length_squared() < 1e-10 {
                    self.pending = Vec2::ZERO;
                }
                step
            }
            None => std::mem::take(&mut self.pending),
        };
        self.yaw += step.x;
        self.pitch += step.y;
        self.clamp_to_limits();
    }

    pub fn is_settling(&self) -> bool {
        self.pending != Vec2::ZERO
    }

    /// Dolly by scroll lines, scaled by the current distance
    pub fn zoom(&mut self, scroll: f32) {
        let zoom_amount = scroll * self.zoom_sensitivity * (self.distance * 0.1);
        self.distance = (self.distance - zoom_amount).clamp(self.min_distance, self.max_distance);
    }
}

/// Plugin for the orbit camera
pub struct CameraControllerPlugin;

impl Plugin for CameraControllerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraInputBlocked>();
        // orbit and pan both read MouseMotion, so they run sequentially
        app.add_systems(
            Update,
            (
                sync_camera_limits,
                camera_orbit_system,
                camera_pan_system.after(camera_orbit_system),
                camera_zoom_system,
                update_camera_transform
                    .after(sync_camera_limits)
                    .after(camera_orbit_system)
                    .after(camera_pan_system)
                    .after(camera_zoom_system),
            ),
        );
    }
}

fn sync_camera_limits(store: Res<ParamStore>, mut camera_query: Query<&mut OrbitCamera>) {
    if !store.is_changed() {
        return;
    }
    for mut orbit in camera_query.iter_mut() {
        orbit.set_limits(&store.params().camera);
    }
}

/// Handle orbit (left mouse drag)
fn camera_orbit_system(
    mouse_button: Res<ButtonInput<MouseButton>>,
    blocked: Res<CameraInputBlocked>,
    mut motion_events: MessageReader<MouseMotion>,
    mut camera_query: Query<&mut OrbitCamera>,
) {
    if blocked.0 || !mouse_button.pressed(MouseButton::Left) {
        motion_events.clear();
        return;
    }

    let mut delta = Vec2::ZERO;
    for event in motion_events.read() {
        delta += event.delta;
    }

    if delta == Vec2::ZERO {
        return;
    }

    for mut orbit in camera_query.iter_mut() {
        orbit.orbit(delta);
    }
}

/// Handle pan (right mouse drag)
fn camera_pan_system(
    mouse_button: Res<ButtonInput<MouseButton>>,
    blocked: Res<CameraInputBlocked>,
    mut motion_events: MessageReader<MouseMotion>,
    mut camera_query: Query<(&mut OrbitCamera, &Transform)>,
) {
    if blocked.0 || !mouse_button.pressed(MouseButton::Right) {
        motion_events.clear();
        return;
    }

    let mut delta = Vec2::ZERO;
    for event in motion_events.read() {
        delta += event.delta;
    }

    if delta == Vec2::ZERO {
        return;
    }

    for (mut orbit, transform) in camera_query.iter_mut() {
        // Pan in camera's local XY plane
        let right = transform.rotation * Vec3::X;
        let up = transform.rotation * Vec3::Y;

        // Scale pan by distance so it feels consistent at different zoom levels
        let pan_scale = orbit.pan_sensitivity * orbit.distance;

        // Move target (negative to feel like dragging the scene)
        let pan_offset = (-right * delta.x + up * delta.y) * pan_scale;
        orbit.target += pan_offset;
    }
}

/// Handle zoom (scroll wheel)
fn camera_zoom_system(
    blocked: Res<CameraInputBlocked>,
    mut scroll_events: MessageReader<MouseWheel>,
    mut camera_query: Query<&mut OrbitCamera>,
) {
    if blocked.0 {
        scroll_events.clear();
        return;
    }

    let mut scroll_delta = 0.0;
    for event in scroll_events.read() {
        scroll_delta += event.y;
    }

    if scroll_delta == 0.0 {
        return;
    }

    for mut orbit in camera_query.iter_mut() {
        orbit.zoom(scroll_delta);
    }
}

/// Update camera transform from orbit state
fn update_camera_transform(
    mut camera_query: Query<(&mut OrbitCamera, &mut Transform), With<MainCamera>>,
) {
    for (mut orbit, mut transform) in camera_query.iter_mut() {
        orbit.integrate();
        let position = orbit.calculate_position();
        *transform = Transform::from_translation(position).looking_at(orbit.target, Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_from_position_round_trips() {
        let position = Vec3::new(7.0, 7.0, 5.0);
        let orbit = OrbitCamera::from_position(position, Vec3::ZERO);
        assert!(orbit.calculate_position().distance(position) < 1e-4);

        let offset_target = Vec3::new(1.0, 0.5, -2.0);
        let orbit = OrbitCamera::from_position(Vec3::new(0.0, 0.0, 15.0), offset_target);
        assert!(orbit.calculate_position().distance(Vec3::new(0.0, 0.0, 15.0)) < 1e-4);
    }

    #[test]
    fn test_limits_clamp_distance_and_polar() {
        let mut orbit = OrbitCamera::from_position(Vec3::new(0.0, 1.0, 20.0), Vec3::ZERO);
        orbit.set_limits(&CameraLimits::default());
        assert_eq!(orbit.distance, 10.0);

        // Drag far below the horizon
        orbit.orbit(Vec2::new(0.0, 2000.0));
        orbit.integrate();
        assert!((orbit.polar_angle() - PI / 2.2).abs() < 1e-5);

        // And far over the top
        orbit.orbit(Vec2::new(0.0, -4000.0));
        orbit.integrate();
        assert!((orbit.polar_angle() - MIN_POLAR_ANGLE).abs() < 1e-5);
    }

    #[test]
    fn test_zoom_respects_limits() {
        let mut orbit = OrbitCamera::from_position(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        orbit.set_limits(&CameraLimits::default());
        for _ in 0..100 {
            orbit.zoom(1.0);
        }
        assert_eq!(orbit.distance, 2.0);
        for _ in 0..100 {
            orbit.zoom(-1.0);
        }
        assert_eq!(orbit.distance, 10.0);
    }

    #[test]
    fn test_without_damping_orbit_applies_at_once() {
        let mut orbit = OrbitCamera::default();
        let yaw = orbit.yaw;
        orbit.orbit(Vec2::new(-100.0, 0.0));
        orbit.integrate();
        assert!((orbit.yaw - (yaw + 0.5)).abs() < 1e-6);
        assert!(!orbit.is_settling());
    }

    #[test]
    fn test_damping_spreads_orbit_over_frames() {
        let mut orbit = OrbitCamera::default();
        orbit.set_limits(&CameraLimits {
            damping: Some(0.05),
            ..CameraLimits::free()
        });
        let yaw = orbit.yaw;
        orbit.orbit(Vec2::new(-100.0, 0.0));

        orbit.integrate();
        assert!((orbit.yaw - (yaw + 0.025)).abs() < 1e-6);
        assert!(orbit.is_settling());

        for _ in 0..1000 {
            orbit.integrate();
        }
        assert!((orbit.yaw - (yaw + 0.5)).abs() < 1e-3);
    }
}
