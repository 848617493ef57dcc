/// Prepscene Core Library - Shared scene projection and composition logic
///
/// This library provides the stateless pipeline that turns a small 3-D scene
/// (cubes, a ball and a motion path) into a 2-D drawing: geometry, perspective
/// projection, edge visibility, path sampling, layer composition and SVG
/// output. It also holds the per-view state machine that the live front-ends
/// drive, plus catalog loading.

pub mod catalog;
pub mod compose;
pub mod error;
pub mod geometry;
pub mod live;
pub mod parse;
pub mod path;
pub mod projection;
pub mod scene;
pub mod svg;
pub mod transform;
pub mod visibility;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogEntry, LabelSet};
pub use compose::{compose, compose_thumbnail, ComposeOptions, Drawing, Fit, Layer, LayerKind, Shape, Style};
pub use error::{SceneError, SceneResult};
pub use geometry::{cube_instances, CubeInstance};
pub use live::{CameraMode, LiveView, Playback};
pub use path::{sample_curve, MotionCurve};
pub use projection::{project, Camera, ProjectedPoint};
pub use scene::{Animation, Category, CubeScene, CubeVariant, SceneConfig, TimeAxis};
pub use svg::{render_thumbnail_svg, to_svg};
pub use transform::OrbitState;
pub use visibility::{resolve, Visibility};
