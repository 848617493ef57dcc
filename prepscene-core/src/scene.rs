/// Declarative scene description
///
/// A scene is either a cube diagram (cube(s), ball, camera, optional motion
/// path) or a time axis. The two strategies are variants of one tagged enum so
/// renderers match on them exhaustively.
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SceneResult;

/// Default camera pose: slightly above and to the right of the scene so no
/// cube face is ever seen exactly edge-on.
pub const DEFAULT_CAMERA_POSITION: [f32; 3] = [2.6, 2.0, 3.4];
pub const DEFAULT_FOV_DEGREES: f32 = 40.0;
pub const DEFAULT_BALL_RADIUS: f32 = 0.22;

/// Offset of the synthesized approach path for dynamic scenes.
const APPROACH_OFFSET: [f32; 3] = [0.0, 0.0, 1.4];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SceneConfig {
    Cube(CubeScene),
    TimeAxis(TimeAxis),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CubeScene {
    #[serde(default)]
    pub cube: CubeConfig,
    #[serde(default)]
    pub ball: BallConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub render: RenderOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CubeConfig {
    #[serde(default = "default_cube_size")]
    pub size: f32,
    #[serde(default = "origin")]
    pub position: Point3<f32>,
    #[serde(default)]
    pub variant: CubeVariant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ring_count: Option<usize>,
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            size: default_cube_size(),
            position: origin(),
            variant: CubeVariant::SingleCube,
            ring_count: None,
        }
    }
}

/// How many cube instances a scene shows and where they sit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CubeVariant {
    #[default]
    SingleCube,
    TwoCubes,
    RingCubes,
}

impl CubeVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SingleCube => "singleCube",
            Self::TwoCubes => "twoCubes",
            Self::RingCubes => "ringCubes",
        }
    }

    /// Unknown names fall back to a single cube.
    pub fn from_name(name: &str) -> Self {
        match name {
            "singleCube" => Self::SingleCube,
            "twoCubes" => Self::TwoCubes,
            "ringCubes" => Self::RingCubes,
            other => {
                tracing::warn!(variant = other, "unknown cube variant, using singleCube");
                Self::SingleCube
            }
        }
    }
}

impl Serialize for CubeVariant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CubeVariant {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallConfig {
    #[serde(default = "default_ball_radius")]
    pub radius: f32,
    #[serde(default = "origin")]
    pub position: Point3<f32>,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_BALL_RADIUS,
            position: origin(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraConfig {
    #[serde(default = "default_camera_position")]
    pub position: Point3<f32>,
    #[serde(default = "origin")]
    pub target: Point3<f32>,
    /// Vertical field of view in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fov: Option<f32>,
}

impl CameraConfig {
    pub fn fov_degrees(&self) -> f32 {
        self.fov
            .filter(|fov| fov.is_finite() && *fov > 1.0 && *fov < 179.0)
            .unwrap_or(DEFAULT_FOV_DEGREES)
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: default_camera_position(),
            target: origin(),
            fov: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    #[serde(default)]
    pub show_ground_plane: bool,
    #[serde(default)]
    pub wireframe: WireframeStyle,
    /// Localized caption drawn on the front face of the first cube.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WireframeStyle {
    #[default]
    Edges,
    #[serde(alias = "edges+faces")]
    EdgesFaces,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animation {
    #[serde(rename = "type", default)]
    pub kind: AnimationKind,
    /// Seconds for one traversal of the path.
    #[serde(default = "default_duration")]
    pub duration: f32,
    #[serde(flatten)]
    pub path: PathSpec,
    #[serde(default)]
    pub closed: bool,
    #[serde(rename = "loop", default)]
    pub looped: bool,
}

impl Animation {
    pub fn segment(from: Point3<f32>, to: Point3<f32>, duration: f32) -> Self {
        Self {
            kind: AnimationKind::Path,
            duration,
            path: PathSpec::segment(from, to),
            closed: false,
            looped: false,
        }
    }

    pub fn control_points(&self) -> Vec<Point3<f32>> {
        self.path.control_points()
    }

    /// Playback duration, never zero or negative.
    pub fn duration_secs(&self) -> f32 {
        if self.duration.is_finite() && self.duration > 0.0 {
            self.duration
        } else {
            default_duration()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnimationKind {
    #[default]
    Path,
}

/// Control points of a motion path: a `path` polyline, or a `from`/`to` pair.
///
/// Every field is optional so an incomplete path still parses; it simply
/// yields no control points.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Point3<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Point3<f32>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<Point3<f32>>,
}

impl PathSpec {
    pub fn segment(from: Point3<f32>, to: Point3<f32>) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            path: Vec::new(),
        }
    }

    pub fn polyline(path: Vec<Point3<f32>>) -> Self {
        Self {
            path,
            ..Self::default()
        }
    }

    /// The polyline when given, else both endpoints, else nothing.
    pub fn control_points(&self) -> Vec<Point3<f32>> {
        if !self.path.is_empty() {
            return self.path.clone();
        }
        match (self.from, self.to) {
            (Some(from), Some(to)) => vec![from, to],
            _ => Vec::new(),
        }
    }
}

/// A 1-D number line used for temporal prepositions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeAxis {
    #[serde(default = "default_range")]
    pub range: [f32; 2],
    /// Number of tick intervals along the axis.
    #[serde(default = "default_ticks")]
    pub ticks: u32,
    /// A single moment ("at").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<f32>,
    /// A highlighted interval ("during", "for").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<[f32; 2]>,
    /// A directed interval drawn as an arrow ("since", "until").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion: Option<[f32; 2]>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<AxisLabel>,
}

impl Default for TimeAxis {
    fn default() -> Self {
        Self {
            range: default_range(),
            ticks: default_ticks(),
            marker: None,
            span: None,
            motion: None,
            labels: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisLabel {
    pub at: f32,
    pub text: String,
}

/// Learning category a scene is presented under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Space,
    Time,
    Dynamic,
}

impl SceneConfig {
    pub fn from_json(json: &str) -> SceneResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn cube() -> Self {
        Self::Cube(CubeScene::default())
    }

    pub fn as_cube(&self) -> Option<&CubeScene> {
        match self {
            Self::Cube(scene) => Some(scene),
            Self::TimeAxis(_) => None,
        }
    }

    /// Adapt a catalog scene to the category it is shown under.
    pub fn adapt(&self, category: Category) -> SceneConfig {
        match (self, category) {
            (Self::Cube(scene), Category::Space) => Self::Cube(CubeScene {
                animation: None,
                ..scene.clone()
            }),
            (Self::Cube(scene), Category::Dynamic) => {
                let mut scene = scene.clone();
                if scene.animation.is_none() {
                    let to = scene.ball.position;
                    let from = to + Vector3::from(APPROACH_OFFSET);
                    let mut animation = Animation::segment(from, to, default_duration());
                    animation.looped = true;
                    scene.animation = Some(animation);
                }
                Self::Cube(scene)
            }
            (Self::Cube(_), Category::Time) => {
                let axis = TimeAxis::default();
                let mid = (axis.range[0] + axis.range[1]) / 2.0;
                Self::TimeAxis(TimeAxis {
                    marker: Some(mid),
                    ..axis
                })
            }
            (Self::TimeAxis(axis), Category::Dynamic) => {
                let mut axis = axis.clone();
                if let (None, Some(marker)) = (axis.motion, axis.marker) {
                    axis.motion = Some([axis.range[0], marker]);
                }
                Self::TimeAxis(axis)
            }
            (Self::TimeAxis(_), Category::Space | Category::Time) => self.clone(),
        }
    }

    /// Move the camera of a cube scene; time axes have no camera.
    pub fn with_camera_position(mut self, position: Point3<f32>) -> Self {
        match &mut self {
            Self::Cube(scene) => scene.camera.position = position,
            Self::TimeAxis(_) => tracing::warn!("time axis scenes have no camera, ignoring override"),
        }
        self
    }

    /// Replace the motion path of a cube scene, keeping its timing.
    pub fn with_motion_path(mut self, points: Vec<Point3<f32>>) -> Self {
        match &mut self {
            Self::Cube(scene) => {
                let path = PathSpec::polyline(points);
                match &mut scene.animation {
                    Some(animation) => animation.path = path,
                    None => {
                        scene.animation = Some(Animation {
                            kind: AnimationKind::Path,
                            duration: default_duration(),
                            path,
                            closed: false,
                            looped: false,
                        })
                    }
                }
            }
            Self::TimeAxis(_) => {
                tracing::warn!("time axis scenes have no motion path, ignoring override")
            }
        }
        self
    }
}

fn origin() -> Point3<f32> {
    Point3::origin()
}

fn default_cube_size() -> f32 {
    1.0
}

fn default_ball_radius() -> f32 {
    DEFAULT_BALL_RADIUS
}

fn default_camera_position() -> Point3<f32> {
    Point3::from(DEFAULT_CAMERA_POSITION)
}

fn default_duration() -> f32 {
    2.0
}

fn default_range() -> [f32; 2] {
    [0.0, 10.0]
}

fn default_ticks() -> u32 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_scene_from_json() {
        let json = r#"{
            "kind": "cube",
            "cube": { "size": 1.0, "variant": "twoCubes" },
            "ball": { "radius": 0.3, "position": [0.0, 0.5, 0.0] },
            "render": { "showGroundPlane": true, "wireframe": "edges+faces" },
            "animation": { "type": "path", "duration": 2.0, "from": [0, 0, 1.4], "to": [0, 0, 0.1] }
        }"#;
        let scene: SceneConfig = serde_json::from_str(json).unwrap();
        let cube = scene.as_cube().unwrap();
        assert_eq!(cube.cube.variant, CubeVariant::TwoCubes);
        assert!((cube.ball.radius - 0.3).abs() < 1e-6);
        assert_eq!(cube.render.wireframe, WireframeStyle::EdgesFaces);
        assert!(cube.render.show_ground_plane);
        let animation = cube.animation.as_ref().unwrap();
        assert_eq!(
            animation.control_points(),
            vec![Point3::new(0.0, 0.0, 1.4), Point3::new(0.0, 0.0, 0.1)]
        );
        assert_eq!(cube.camera, CameraConfig::default());
    }

    #[test]
    fn test_polyline_animation_from_json() {
        let json = r#"{
            "kind": "cube",
            "animation": { "type": "path", "path": [[1,0,0],[0,0,1],[-1,0,0],[1,0,0]], "loop": true }
        }"#;
        let scene: SceneConfig = serde_json::from_str(json).unwrap();
        let animation = scene.as_cube().unwrap().animation.clone().unwrap();
        assert!(animation.looped);
        assert!(!animation.closed);
        assert_eq!(animation.control_points().len(), 4);
    }

    #[test]
    fn test_incomplete_animation_path_parses_empty() {
        for json in [
            r#"{"kind": "cube", "animation": {"type": "path", "duration": 2}}"#,
            r#"{"kind": "cube", "animation": {"type": "path", "from": [0, 0, 1]}}"#,
            r#"{"kind": "cube", "animation": {"type": "path", "path": []}}"#,
        ] {
            let scene = SceneConfig::from_json(json).unwrap();
            let animation = scene.as_cube().unwrap().animation.clone().unwrap();
            assert!(animation.control_points().is_empty(), "{json}");

            let drawing = crate::compose::compose_thumbnail(&scene);
            assert!(drawing.layer(crate::compose::LayerKind::MotionPath).is_none());
            assert!(drawing.layer(crate::compose::LayerKind::Ball).is_some());
            assert!(drawing.layers.iter().any(|l| l.kind.is_front_edges()));
        }
    }

    #[test]
    fn test_polyline_takes_precedence_over_endpoints() {
        let points = PathSpec {
            path: vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0)],
            ..PathSpec::segment(Point3::new(5.0, 0.0, 0.0), Point3::new(6.0, 0.0, 0.0))
        };
        assert_eq!(points.control_points().len(), 3);
    }

    #[test]
    fn test_unknown_variant_falls_back_to_single_cube() {
        let json = r#"{ "kind": "cube", "cube": { "variant": "pyramidOfCubes" } }"#;
        let scene: SceneConfig = serde_json::from_str(json).unwrap();
        assert_eq!(scene.as_cube().unwrap().cube.variant, CubeVariant::SingleCube);
    }

    #[test]
    fn test_time_axis_from_json() {
        let json = r#"{ "kind": "timeAxis", "marker": 3.0, "labels": [{ "at": 3.0, "text": "3 pm" }] }"#;
        let scene: SceneConfig = serde_json::from_str(json).unwrap();
        match scene {
            SceneConfig::TimeAxis(axis) => {
                assert_eq!(axis.range, [0.0, 10.0]);
                assert_eq!(axis.marker, Some(3.0));
                assert_eq!(axis.labels[0].text, "3 pm");
            }
            SceneConfig::Cube(_) => panic!("expected a time axis"),
        }
    }

    #[test]
    fn test_space_adaptation_strips_animation() {
        let mut scene = CubeScene::default();
        scene.animation = Some(Animation::segment(Point3::origin(), Point3::new(1.0, 0.0, 0.0), 1.0));
        let adapted = SceneConfig::Cube(scene).adapt(Category::Space);
        assert!(adapted.as_cube().unwrap().animation.is_none());
    }

    #[test]
    fn test_dynamic_adaptation_adds_approach_path() {
        let adapted = SceneConfig::cube().adapt(Category::Dynamic);
        let animation = adapted.as_cube().unwrap().animation.clone().unwrap();
        assert!(animation.looped);
        assert_eq!(
            animation.control_points(),
            vec![Point3::new(0.0, 0.0, 1.4), Point3::origin()]
        );
    }

    #[test]
    fn test_time_adaptation_replaces_cube_geometry() {
        let adapted = SceneConfig::cube().adapt(Category::Time);
        assert!(adapted.as_cube().is_none());
        match adapted {
            SceneConfig::TimeAxis(axis) => assert_eq!(axis.marker, Some(5.0)),
            SceneConfig::Cube(_) => unreachable!(),
        }
    }

    #[test]
    fn test_adaptation_is_pure() {
        let scene = SceneConfig::cube();
        let before = scene.clone();
        let _ = scene.adapt(Category::Dynamic);
        assert_eq!(scene, before);
    }

    #[test]
    fn test_invalid_fov_uses_default() {
        let camera = CameraConfig {
            fov: Some(0.0),
            ..CameraConfig::default()
        };
        assert_eq!(camera.fov_degrees(), DEFAULT_FOV_DEGREES);
    }

    #[test]
    fn test_overrides() {
        let eye = Point3::new(0.0, 5.0, 0.1);
        let path = vec![Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 0.0, 0.0)];
        let scene = SceneConfig::cube()
            .with_camera_position(eye)
            .with_motion_path(path.clone());
        let cube = scene.as_cube().unwrap();
        assert_eq!(cube.camera.position, eye);
        let animation = cube.animation.as_ref().unwrap();
        assert_eq!(animation.control_points(), path);
        assert_eq!(animation.duration, 2.0);

        let axis = SceneConfig::TimeAxis(TimeAxis::default());
        assert_eq!(axis.clone().with_camera_position(eye), axis);
    }

    #[test]
    fn test_from_json_reports_catalog_error() {
        assert!(SceneConfig::from_json(r#"{"kind": "cube"}"#).is_ok());
        let err = SceneConfig::from_json(r#"{"kind": "sphere"}"#).unwrap_err();
        assert!(err.to_string().starts_with("catalog error:"));
    }
}
