/// Orbit state for interactive camera control
use nalgebra::{Point3, Vector3};

/// Keeps the orbit away from the poles where `look_at` degenerates.
const POLAR_LIMIT: f32 = 0.05;
pub const MIN_RADIUS: f32 = 0.5;
pub const MAX_RADIUS: f32 = 40.0;

/// Camera position in spherical coordinates about a target (radians).
///
/// `azimuth` is measured in the xz-plane from +z towards +x, `polar` from +y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitState {
    pub azimuth: f32,
    pub polar: f32,
    pub radius: f32,
}

impl OrbitState {
    pub fn new(azimuth: f32, polar: f32, radius: f32) -> Self {
        let mut state = Self {
            azimuth,
            polar,
            radius,
        };
        state.clamp();
        state
    }

    /// Orbit that reproduces `eye` looking at `target`.
    pub fn from_camera(eye: Point3<f32>, target: Point3<f32>) -> Self {
        let offset = eye - target;
        let radius = offset.norm();
        if radius < f32::EPSILON {
            return Self::new(0.0, std::f32::consts::FRAC_PI_2, MIN_RADIUS);
        }
        let polar = (offset.y / radius).clamp(-1.0, 1.0).acos();
        let azimuth = offset.x.atan2(offset.z);
        Self::new(azimuth, polar, radius)
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, d_azimuth: f32, d_polar: f32) {
        self.azimuth = (self.azimuth + d_azimuth).rem_euclid(std::f32::consts::TAU);
        self.polar += d_polar;
        self.clamp();
    }

    /// Scale the orbit radius; factors below 1 move closer.
    pub fn zoom(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.radius *= factor;
            self.clamp();
        }
    }

    pub fn eye(&self, target: Point3<f32>) -> Point3<f32> {
        let (sin_p, cos_p) = self.polar.sin_cos();
        let (sin_a, cos_a) = self.azimuth.sin_cos();
        target + Vector3::new(sin_p * sin_a, cos_p, sin_p * cos_a) * self.radius
    }

    fn clamp(&mut self) {
        self.polar = self
            .polar
            .clamp(POLAR_LIMIT, std::f32::consts::PI - POLAR_LIMIT);
        self.radius = self.radius.clamp(MIN_RADIUS, MAX_RADIUS);
    }
}
