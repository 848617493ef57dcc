/// Camera and projection utilities
use nalgebra::{Matrix4, Point2, Point3, Vector3};

use crate::scene::CameraConfig;

/// A world point after projection: screen position plus view depth.
///
/// `screen` is in normalized device units with y pointing down (top-left
/// origin once mapped to an image); `depth` is the distance along the view
/// axis, larger meaning farther from the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    pub screen: Point2<f32>,
    pub depth: f32,
}

/// Perspective look-at camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
}

impl Camera {
    pub fn new(position: Point3<f32>, target: Point3<f32>, fov_degrees: f32) -> Self {
        Self {
            position,
            target,
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: fov_degrees.to_radians(),
            aspect: 1.0,
            near: 0.01,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new(config.position, config.target, config.fov_degrees())
    }

    /// Up vector that is never parallel to the view direction.
    fn stable_up(&self) -> Vector3<f32> {
        let forward = self.target - self.position;
        if forward.cross(&self.up).norm() < 1e-6 * forward.norm().max(1.0) {
            Vector3::new(0.0, 0.0, -1.0)
        } else {
            self.up
        }
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.stable_up())
    }

    fn focal(&self) -> f32 {
        1.0 / (self.fov / 2.0).tan()
    }

    /// Project a world point to screen space plus depth.
    ///
    /// Points at or behind the camera plane are divided by `near` instead of
    /// their depth so the result is always finite. Such points are not
    /// drawable; use the `clip_*` helpers for shapes that may cross the
    /// near plane.
    pub fn project(&self, point: &Point3<f32>) -> ProjectedPoint {
        self.project_with(&self.view_matrix(), point)
    }

    /// [`Camera::project`] with a precomputed view matrix.
    pub fn project_with(&self, view: &Matrix4<f32>, point: &Point3<f32>) -> ProjectedPoint {
        let v = view.transform_point(point);
        ProjectedPoint {
            screen: self.screen_of(&v.coords),
            depth: -v.z,
        }
    }

    fn screen_of(&self, v: &Vector3<f32>) -> Point2<f32> {
        let divisor = (-v.z).max(self.near);
        let f = self.focal();
        Point2::new(v.x * f / (self.aspect * divisor), -(v.y * f / divisor))
    }

    /// View-space position a projected point came from.
    fn view_of(&self, p: &ProjectedPoint) -> Vector3<f32> {
        let divisor = p.depth.max(self.near);
        let f = self.focal();
        Vector3::new(
            p.screen.x * self.aspect * divisor / f,
            -p.screen.y * divisor / f,
            -p.depth,
        )
    }

    pub fn is_visible(&self, p: &ProjectedPoint) -> bool {
        p.depth >= self.near
    }

    /// Screen point where the segment `a`-`b` crosses the near plane.
    ///
    /// Only meaningful when exactly one end is visible.
    fn near_crossing(&self, a: &ProjectedPoint, b: &ProjectedPoint) -> Point2<f32> {
        let t = (self.near - a.depth) / (b.depth - a.depth);
        self.screen_of(&self.view_of(a).lerp(&self.view_of(b), t))
    }

    /// Segment clipped to the near plane; `None` when it lies wholly behind.
    pub fn clip_segment(
        &self,
        a: &ProjectedPoint,
        b: &ProjectedPoint,
    ) -> Option<(Point2<f32>, Point2<f32>)> {
        match (self.is_visible(a), self.is_visible(b)) {
            (true, true) => Some((a.screen, b.screen)),
            (false, false) => None,
            (true, false) => Some((a.screen, self.near_crossing(a, b))),
            (false, true) => Some((self.near_crossing(a, b), b.screen)),
        }
    }

    /// Closed polygon clipped to the near plane; empty when nothing is left.
    pub fn clip_polygon(&self, corners: &[ProjectedPoint]) -> Vec<Point2<f32>> {
        let mut out = Vec::with_capacity(corners.len() + 1);
        for (i, a) in corners.iter().enumerate() {
            let b = &corners[(i + 1) % corners.len()];
            let (a_in, b_in) = (self.is_visible(a), self.is_visible(b));
            if a_in {
                out.push(a.screen);
            }
            if a_in != b_in {
                out.push(self.near_crossing(a, b));
            }
        }
        if out.len() < 3 {
            out.clear();
        }
        out
    }

    /// Open polyline split into the runs that lie in front of the near plane.
    pub fn clip_polyline(&self, points: &[ProjectedPoint]) -> Vec<Vec<Point2<f32>>> {
        let mut runs = Vec::new();
        let mut run: Vec<Point2<f32>> = Vec::new();
        for (i, p) in points.iter().enumerate() {
            let visible = self.is_visible(p);
            if let Some(prev) = i.checked_sub(1).map(|j| &points[j]) {
                if self.is_visible(prev) != visible {
                    run.push(self.near_crossing(prev, p));
                }
            }
            if visible {
                run.push(p.screen);
            } else if !run.is_empty() {
                runs.push(std::mem::take(&mut run));
            }
        }
        if !run.is_empty() {
            runs.push(run);
        }
        runs.retain(|r| r.len() >= 2);
        runs
    }

    /// World-space ray through a screen point, as `(origin, unit direction)`.
    pub fn ray_through(&self, screen: Point2<f32>) -> (Point3<f32>, Vector3<f32>) {
        let forward = (self.target - self.position).normalize();
        let right = forward.cross(&self.stable_up()).normalize();
        let up = right.cross(&forward);
        let f = self.focal();
        let direction = forward + right * (screen.x * self.aspect / f) - up * (screen.y / f);
        (self.position, direction.normalize())
    }

    /// Unit vector from the camera towards the target.
    pub fn forward(&self) -> Vector3<f32> {
        (self.target - self.position).normalize()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

/// Project a point through a camera.
pub fn project(point: &Point3<f32>, camera: &Camera) -> ProjectedPoint {
    camera.project(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_projects_to_center() {
        let camera = Camera::default();
        let p = camera.project(&camera.target);
        assert!(p.screen.coords.norm() < 1e-5);
        assert!((p.depth - (camera.position - camera.target).norm()).abs() < 1e-4);
    }

    #[test]
    fn test_projection_is_deterministic() {
        let camera = Camera::default();
        let point = Point3::new(0.3, -0.2, 0.9);
        let a = project(&point, &camera);
        let b = project(&point, &camera);
        assert_eq!(a, b);
    }

    #[test]
    fn test_screen_y_points_down() {
        let camera = Camera::new(Point3::new(0.0, 0.0, 5.0), Point3::origin(), 45.0);
        let above = camera.project(&Point3::new(0.0, 1.0, 0.0));
        let right = camera.project(&Point3::new(1.0, 0.0, 0.0));
        assert!(above.screen.y < 0.0);
        assert!(right.screen.x > 0.0);
    }

    #[test]
    fn test_depth_grows_away_from_camera() {
        let camera = Camera::new(Point3::new(0.0, 0.0, 5.0), Point3::origin(), 45.0);
        let near = camera.project(&Point3::new(0.0, 0.0, 1.0));
        let far = camera.project(&Point3::new(0.0, 0.0, -1.0));
        assert!((near.depth - 4.0).abs() < 1e-5);
        assert!((far.depth - 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_point_behind_camera_is_finite() {
        let camera = Camera::new(Point3::new(0.0, 0.0, 5.0), Point3::origin(), 45.0);
        let p = camera.project(&Point3::new(1.0, 1.0, 6.0));
        assert!(p.screen.x.is_finite() && p.screen.y.is_finite());
        assert!(p.depth < 0.0);
    }

    #[test]
    fn test_ray_through_inverts_projection() {
        let camera = Camera::default();
        let point = Point3::new(0.4, 0.1, -0.3);
        let projected = camera.project(&point);
        let (origin, direction) = camera.ray_through(projected.screen);
        let to_point = (point - origin).normalize();
        assert!((to_point - direction).norm() < 1e-4);
    }

    #[test]
    fn test_top_down_camera_is_finite() {
        let camera = Camera::new(Point3::new(0.0, 5.0, 0.0), Point3::origin(), 45.0);
        let p = camera.project(&Point3::new(0.5, 0.0, 0.5));
        assert!(p.screen.x.is_finite() && p.screen.y.is_finite());
    }

    fn behind_camera() -> Camera {
        Camera::new(Point3::new(0.0, 0.0, 5.0), Point3::origin(), 45.0)
    }

    #[test]
    fn test_clip_segment_cuts_at_near_plane() {
        let camera = behind_camera();
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 6.0);
        let (from, to) = camera
            .clip_segment(&camera.project(&a), &camera.project(&b))
            .unwrap();
        assert_eq!(from, camera.project(&a).screen);

        // The world point on the segment that sits exactly on the near plane.
        let s = (5.0 - camera.near) / 6.0;
        let expected = camera.project(&a.lerp(&b, s)).screen;
        assert!((to - expected).norm() < 1e-3 * expected.coords.norm().max(1.0));
        assert!(to.x > 0.0);
    }

    #[test]
    fn test_clip_segment_drops_hidden_segments() {
        let camera = behind_camera();
        let a = camera.project(&Point3::new(0.0, 0.0, 6.0));
        let b = camera.project(&Point3::new(1.0, 0.0, 7.0));
        assert!(camera.clip_segment(&a, &b).is_none());

        let c = camera.project(&Point3::new(0.0, 0.0, 1.0));
        let d = camera.project(&Point3::new(1.0, 0.0, 0.0));
        assert_eq!(camera.clip_segment(&c, &d), Some((c.screen, d.screen)));
    }

    #[test]
    fn test_clip_polygon_with_one_corner_behind() {
        let camera = behind_camera();
        let corners = [
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 6.0),
            Point3::new(-1.0, 0.0, 3.0),
        ]
        .map(|c| camera.project(&c));
        let clipped = camera.clip_polygon(&corners);
        assert_eq!(clipped.len(), 5);
        assert!(clipped.iter().all(|p| p.x.is_finite() && p.y.is_finite()));

        let hidden = [Point3::new(0.0, 0.0, 6.0), Point3::new(1.0, 0.0, 6.0), Point3::new(0.0, 1.0, 6.0)]
            .map(|c| camera.project(&c));
        assert!(camera.clip_polygon(&hidden).is_empty());
    }

    #[test]
    fn test_clip_polyline_splits_runs() {
        let camera = behind_camera();
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 8.0),
            Point3::new(1.0, 0.0, 0.0),
        ]
        .map(|p| camera.project(&p));
        let runs = camera.clip_polyline(&points);
        assert_eq!(runs.len(), 2);
        assert!(runs.iter().all(|r| r.len() == 2));
        assert_eq!(runs[0][0], points[0].screen);
        assert_eq!(runs[1][1], points[2].screen);
    }
}
