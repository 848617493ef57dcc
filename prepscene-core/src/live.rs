/// Per-instance state of an interactive view
///
/// A front-end creates one [`LiveView`] per mounted scene, forwards input and
/// frame ticks to it, and draws whatever [`LiveView::frame`] returns. Nothing
/// here is shared between views.
use nalgebra::{Point2, Point3, Vector2};

use crate::compose::{compose, ComposeOptions, Drawing, LayerKind, Shape};
use crate::path::{smoothstep, MotionCurve};
use crate::projection::Camera;
use crate::scene::{CameraConfig, SceneConfig};
use crate::transform::OrbitState;

/// Fraction of orbit velocity kept per 1/60 s after the pointer is released.
pub const ORBIT_DAMPING: f32 = 0.88;
/// Radians of orbit per pixel of pointer travel.
pub const ORBIT_SENSITIVITY: f32 = 0.008;
/// Radius factor per zoom step.
pub const ZOOM_STEP: f32 = 1.1;
/// The ball is grabbable slightly outside its drawn disk.
const GRAB_SLOP: f32 = 1.25;
const MIN_VELOCITY: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Playback {
    Idle,
    Playing { started_at: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    Default,
    UserOrbiting,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Drag {
    Orbit { last: Point2<f32> },
    Ball,
}

#[derive(Debug, Clone)]
pub struct LiveView {
    scene: SceneConfig,
    camera_config: CameraConfig,
    orbit: OrbitState,
    velocity: Vector2<f32>,
    mode: CameraMode,
    playback: Playback,
    curve: Option<MotionCurve>,
    duration: f64,
    looped: bool,
    rest: Point3<f32>,
    ball: Point3<f32>,
    drag: Option<Drag>,
    width: f32,
    height: f32,
    last_tick: Option<f64>,
}

impl LiveView {
    pub fn new(scene: SceneConfig, width: f32, height: f32) -> Self {
        let (camera_config, curve, duration, looped, rest) = match &scene {
            SceneConfig::Cube(cube) => {
                let animation = cube.animation.as_ref();
                (
                    cube.camera.clone(),
                    animation.and_then(|a| MotionCurve::from_animation(a, 1.0)),
                    animation.map_or(0.0, |a| f64::from(a.duration_secs())),
                    animation.is_some_and(|a| a.looped),
                    cube.ball.position,
                )
            }
            SceneConfig::TimeAxis(_) => (CameraConfig::default(), None, 0.0, false, Point3::origin()),
        };
        let orbit = OrbitState::from_camera(camera_config.position, camera_config.target);
        Self {
            scene,
            camera_config,
            orbit,
            velocity: Vector2::zeros(),
            mode: CameraMode::Default,
            playback: Playback::Idle,
            curve,
            duration,
            looped,
            rest,
            ball: rest,
            drag: None,
            width: width.max(1.0),
            height: height.max(1.0),
            last_tick: None,
        }
    }

    pub fn scene(&self) -> &SceneConfig {
        &self.scene
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn playback(&self) -> Playback {
        self.playback
    }

    pub fn ball_position(&self) -> Point3<f32> {
        self.ball
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn camera(&self) -> Camera {
        let target = self.camera_config.target;
        let mut camera = Camera::new(
            self.orbit.eye(target),
            target,
            self.camera_config.fov_degrees(),
        );
        camera.aspect = self.width / self.height;
        camera
    }

    /// Return the camera to the scene's default pose.
    pub fn reset(&mut self) {
        self.orbit = OrbitState::from_camera(self.camera_config.position, self.camera_config.target);
        self.velocity = Vector2::zeros();
        self.mode = CameraMode::Default;
        if matches!(self.drag, Some(Drag::Orbit { .. })) {
            self.drag = None;
        }
    }

    /// Restart the motion from the beginning of its path.
    pub fn play_animation(&mut self, now: f64) {
        match &self.curve {
            Some(curve) => {
                self.ball = curve.start();
                self.playback = Playback::Playing { started_at: now };
            }
            None => tracing::debug!("scene has no motion path, nothing to play"),
        }
    }

    /// Advance playback and orbit inertia to `now` (seconds).
    pub fn tick(&mut self, now: f64) {
        let dt = self.last_tick.map_or(0.0, |last| (now - last).max(0.0)) as f32;
        self.last_tick = Some(now);

        if self.drag.is_none() && self.velocity.norm() > MIN_VELOCITY {
            let frames = dt * 60.0;
            self.orbit
                .rotate(self.velocity.x * frames, self.velocity.y * frames);
            self.velocity *= ORBIT_DAMPING.powf(frames);
        }

        if let (Playback::Playing { started_at }, Some(curve)) = (self.playback, &self.curve) {
            let duration = self.duration.max(f64::EPSILON);
            let mut elapsed = (now - started_at) / duration;
            if elapsed >= 1.0 {
                if self.looped {
                    let laps = elapsed.floor();
                    self.playback = Playback::Playing {
                        started_at: started_at + laps * duration,
                    };
                    elapsed -= laps;
                } else {
                    self.playback = Playback::Idle;
                    self.ball = self.rest;
                    return;
                }
            }
            self.ball = curve.point_at(smoothstep(elapsed as f32));
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
    }

    /// Scroll zoom; positive steps move away.
    pub fn zoom(&mut self, steps: f32) {
        self.orbit.zoom(ZOOM_STEP.powf(steps));
        self.mode = CameraMode::UserOrbiting;
    }

    /// Start a drag at a viewport pixel: on the ball it moves the ball,
    /// anywhere else it orbits.
    pub fn pointer_down(&mut self, x: f32, y: f32) {
        let at = Point2::new(x, y);
        if self.hits_ball(at) {
            self.playback = Playback::Idle;
            self.drag = Some(Drag::Ball);
        } else {
            self.velocity = Vector2::zeros();
            self.drag = Some(Drag::Orbit { last: at });
        }
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        let at = Point2::new(x, y);
        match self.drag {
            Some(Drag::Orbit { last }) => {
                let delta = (at - last) * -ORBIT_SENSITIVITY;
                self.orbit.rotate(delta.x, delta.y);
                self.velocity = delta;
                self.mode = CameraMode::UserOrbiting;
                self.drag = Some(Drag::Orbit { last: at });
            }
            Some(Drag::Ball) => {
                if let Some(position) = self.floor_point(at) {
                    self.ball = position;
                }
            }
            None => {}
        }
    }

    pub fn pointer_up(&mut self) {
        self.drag = None;
    }

    pub fn is_dragging_ball(&self) -> bool {
        self.drag == Some(Drag::Ball)
    }

    pub fn frame(&self) -> Drawing {
        let options = ComposeOptions {
            camera: Some(self.camera()),
            ball_position: Some(self.ball),
            ..ComposeOptions::viewport(self.width, self.height)
        };
        compose(&self.scene, &options)
    }

    fn hits_ball(&self, at: Point2<f32>) -> bool {
        let frame = self.frame();
        let Some(layer) = frame.layer(LayerKind::Ball) else {
            return false;
        };
        layer.shapes.iter().any(|shape| match shape {
            Shape::Circle { center, radius } => (at - center).norm() <= radius * GRAB_SLOP,
            _ => false,
        })
    }

    /// Intersect the pointer ray with the horizontal plane through the resting ball.
    fn floor_point(&self, at: Point2<f32>) -> Option<Point3<f32>> {
        let screen = Point2::new(at.x / self.width * 2.0 - 1.0, at.y / self.height * 2.0 - 1.0);
        let (origin, direction) = self.camera().ray_through(screen);
        if direction.y.abs() < 1e-5 {
            return None;
        }
        let t = (self.rest.y - origin.y) / direction.y;
        (t > 0.0).then(|| origin + direction * t)
    }
}
