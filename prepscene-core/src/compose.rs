/// Image composer: scene -> ordered drawing primitives
///
/// Every renderer (SVG serializer, terminal rasterizer, browser canvas)
/// consumes the same [`Drawing`]: a list of layers already sorted back to
/// front, each with one style and its shapes in canvas coordinates.
use nalgebra::{Point2, Point3, Vector2, Vector3};

use crate::geometry::{cube_instances, CubeInstance, FRONT_FACE};
use crate::path::{MotionCurve, THUMBNAIL_LOOP_PORTION};
use crate::projection::Camera;
use crate::scene::{CubeScene, SceneConfig, TimeAxis, WireframeStyle};
use crate::visibility::{self, Facing, Pass, Placement, DRAW_ORDER};

pub const THUMBNAIL_SIZE: f32 = 120.0;
pub const THUMBNAIL_PADDING: f32 = 10.0;

/// Length of the time axis in composer units before fitting.
const AXIS_LENGTH: f32 = 100.0;
/// Margin of the ground plane around the cubes, relative to cube size.
const GROUND_MARGIN: f32 = 0.6;

/// Hex color understood by SVG and canvas alike.
pub type Color = &'static str;

/// How projected points are mapped onto the output surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fit {
    /// Scale and center everything into a square canvas (offline thumbnails).
    Bounds { size: f32, padding: f32 },
    /// Fixed mapping of the camera frustum onto a viewport (live views), so
    /// zooming and orbiting are visible instead of being fitted away.
    Viewport { width: f32, height: f32 },
}

impl Fit {
    pub fn dimensions(&self) -> (f32, f32) {
        match *self {
            Self::Bounds { size, .. } => (size, size),
            Self::Viewport { width, height } => (width, height),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComposeOptions {
    pub fit: Fit,
    /// Overrides the scene camera (live orbiting).
    pub camera: Option<Camera>,
    /// Overrides the resting ball position (playback, dragging).
    pub ball_position: Option<Point3<f32>>,
    /// Portion of a closed motion loop to draw.
    pub path_portion: f32,
    pub show_motion_path: bool,
}

impl ComposeOptions {
    pub fn thumbnail() -> Self {
        Self {
            fit: Fit::Bounds {
                size: THUMBNAIL_SIZE,
                padding: THUMBNAIL_PADDING,
            },
            camera: None,
            ball_position: None,
            path_portion: THUMBNAIL_LOOP_PORTION,
            show_motion_path: true,
        }
    }

    pub fn viewport(width: f32, height: f32) -> Self {
        Self {
            fit: Fit::Viewport {
                width: width.max(1.0),
                height: height.max(1.0),
            },
            path_portion: 1.0,
            ..Self::thumbnail()
        }
    }
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self::thumbnail()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    GroundPlane,
    BackEdgesBehind,
    FacesBehind,
    FrontEdgesBehind,
    MotionPath,
    Ball,
    BackEdgesInFront,
    FacesInFront,
    FrontEdgesInFront,
    FrontLabel,
    Axis,
    AxisSpan,
    AxisMotion,
    AxisMarker,
    AxisLabels,
}

impl LayerKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::GroundPlane => "ground-plane",
            Self::BackEdgesBehind => "back-edges-behind",
            Self::FacesBehind => "faces-behind",
            Self::FrontEdgesBehind => "front-edges-behind",
            Self::MotionPath => "motion-path",
            Self::Ball => "ball",
            Self::BackEdgesInFront => "back-edges-in-front",
            Self::FacesInFront => "faces-in-front",
            Self::FrontEdgesInFront => "front-edges-in-front",
            Self::FrontLabel => "front-label",
            Self::Axis => "axis",
            Self::AxisSpan => "axis-span",
            Self::AxisMotion => "axis-motion",
            Self::AxisMarker => "axis-marker",
            Self::AxisLabels => "axis-labels",
        }
    }

    pub fn is_back_edges(self) -> bool {
        matches!(self, Self::BackEdgesBehind | Self::BackEdgesInFront)
    }

    pub fn is_front_edges(self) -> bool {
        matches!(self, Self::FrontEdgesBehind | Self::FrontEdgesInFront)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub stroke: Option<Color>,
    pub stroke_width: f32,
    pub stroke_opacity: f32,
    pub fill: Option<Color>,
    pub fill_opacity: f32,
    /// Dash and gap lengths.
    pub dash: Option<[f32; 2]>,
    pub font_size: f32,
}

impl Style {
    fn stroke(color: Color, width: f32, opacity: f32) -> Self {
        Self {
            stroke: Some(color),
            stroke_width: width,
            stroke_opacity: opacity,
            fill: None,
            fill_opacity: 1.0,
            dash: None,
            font_size: 0.0,
        }
    }

    fn fill(color: Color, opacity: f32) -> Self {
        Self {
            stroke: None,
            stroke_width: 0.0,
            stroke_opacity: 1.0,
            fill: Some(color),
            fill_opacity: opacity,
            dash: None,
            font_size: 0.0,
        }
    }

    fn text(color: Color, font_size: f32) -> Self {
        Self {
            font_size,
            ..Self::fill(color, 1.0)
        }
    }

    /// Style of a layer, with lengths scaled by `unit` (1.0 for a 120 unit canvas).
    pub fn for_layer(kind: LayerKind, unit: f32) -> Self {
        match kind {
            LayerKind::GroundPlane => Self::fill("#e2e8f0", 0.6),
            LayerKind::BackEdgesBehind | LayerKind::BackEdgesInFront => {
                Self::stroke("#94a3b8", 1.0 * unit, 0.55)
            }
            LayerKind::FacesBehind | LayerKind::FacesInFront => Self::fill("#cbd5e1", 0.35),
            LayerKind::FrontEdgesBehind | LayerKind::FrontEdgesInFront => {
                Self::stroke("#1f2937", 1.6 * unit, 1.0)
            }
            LayerKind::MotionPath | LayerKind::AxisMotion => Self {
                dash: Some([4.0 * unit, 3.0 * unit]),
                ..Self::stroke("#2563eb", 1.4 * unit, 1.0)
            },
            LayerKind::Ball | LayerKind::AxisMarker => Self::fill("#f97316", 1.0),
            LayerKind::FrontLabel | LayerKind::AxisLabels => Self::text("#334155", 9.0 * unit),
            LayerKind::Axis => Self::stroke("#1f2937", 1.4 * unit, 1.0),
            LayerKind::AxisSpan => Self::fill("#93c5fd", 0.6),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Line { from: Point2<f32>, to: Point2<f32> },
    Polygon { points: Vec<Point2<f32>> },
    Circle { center: Point2<f32>, radius: f32 },
    Polyline { points: Vec<Point2<f32>>, arrow: bool },
    Text { at: Point2<f32>, text: String },
}

impl Shape {
    pub fn points(&self) -> Vec<Point2<f32>> {
        match self {
            Self::Line { from, to } => vec![*from, *to],
            Self::Polygon { points } | Self::Polyline { points, .. } => points.clone(),
            Self::Circle { center, .. } => vec![*center],
            Self::Text { at, .. } => vec![*at],
        }
    }

    fn points_mut(&mut self) -> Vec<&mut Point2<f32>> {
        match self {
            Self::Line { from, to } => vec![from, to],
            Self::Polygon { points } | Self::Polyline { points, .. } => points.iter_mut().collect(),
            Self::Circle { center, .. } => vec![center],
            Self::Text { at, .. } => vec![at],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub kind: LayerKind,
    pub style: Style,
    pub shapes: Vec<Shape>,
}

/// Ordered drawing primitives for one frame or thumbnail.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawing {
    pub width: f32,
    pub height: f32,
    /// Back to front.
    pub layers: Vec<Layer>,
}

impl Drawing {
    pub fn layer(&self, kind: LayerKind) -> Option<&Layer> {
        self.layers.iter().find(|l| l.kind == kind)
    }

    pub fn kinds(&self) -> Vec<LayerKind> {
        self.layers.iter().map(|l| l.kind).collect()
    }

    pub fn has_arrows(&self) -> bool {
        self.layers.iter().flat_map(|l| &l.shapes).any(|s| {
            matches!(s, Shape::Polyline { arrow: true, points } if points.len() >= 2)
        })
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

/// Arrowhead triangle `[tip, left, right]` at the end of a polyline.
pub fn arrowhead(points: &[Point2<f32>], size: f32) -> Option<[Point2<f32>; 3]> {
    let tip = *points.last()?;
    let base = points
        .iter()
        .rev()
        .skip(1)
        .find(|p| (tip - **p).norm() > 1e-4)?;
    let dir = (tip - base).normalize();
    let normal = Vector2::new(-dir.y, dir.x);
    let back = tip - dir * size;
    Some([tip, back + normal * (size * 0.5), back - normal * (size * 0.5)])
}

/// Compose a scene into ordered primitives.
pub fn compose(scene: &SceneConfig, options: &ComposeOptions) -> Drawing {
    match scene {
        SceneConfig::Cube(cube) => compose_cube(cube, options),
        SceneConfig::TimeAxis(axis) => compose_time_axis(axis, options),
    }
}

/// Affine map from projected coordinates to the output surface.
#[derive(Debug, Clone, Copy)]
struct Mapping {
    scale: Vector2<f32>,
    offset: Vector2<f32>,
}

impl Mapping {
    fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        Point2::new(p.x * self.scale.x, p.y * self.scale.y) + self.offset
    }

    /// Uniform scale that fits `points` into a `width` x `height` rectangle.
    fn fit(points: &[Point2<f32>], width: f32, height: f32, padding: f32) -> Self {
        let mut min = Point2::new(f32::INFINITY, f32::INFINITY);
        let mut max = Point2::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for p in points.iter().filter(|p| p.x.is_finite() && p.y.is_finite()) {
            min = Point2::new(min.x.min(p.x), min.y.min(p.y));
            max = Point2::new(max.x.max(p.x), max.y.max(p.y));
        }
        if min.x > max.x {
            return Self {
                scale: Vector2::new(1.0, 1.0),
                offset: Vector2::new(width / 2.0, height / 2.0),
            };
        }
        let extent = Vector2::new(max.x - min.x, max.y - min.y);
        let avail_w = (width - 2.0 * padding).max(1.0);
        let avail_h = (height - 2.0 * padding).max(1.0);
        let scale = match (extent.x > 1e-6, extent.y > 1e-6) {
            (true, true) => (avail_w / extent.x).min(avail_h / extent.y),
            (true, false) => avail_w / extent.x,
            (false, true) => avail_h / extent.y,
            (false, false) => 1.0,
        };
        let center = nalgebra::center(&min, &max);
        Self {
            scale: Vector2::new(scale, scale),
            offset: Vector2::new(width / 2.0 - center.x * scale, height / 2.0 - center.y * scale),
        }
    }

    /// Normalized device coordinates onto a viewport.
    fn viewport(width: f32, height: f32) -> Self {
        Self {
            scale: Vector2::new(width / 2.0, height / 2.0),
            offset: Vector2::new(width / 2.0, height / 2.0),
        }
    }
}

/// Accumulates layers in projected coordinates before mapping.
struct Builder {
    layers: Vec<Layer>,
    unit: f32,
}

impl Builder {
    fn new(fit: &Fit) -> Self {
        let (w, h) = fit.dimensions();
        Self {
            layers: Vec::new(),
            unit: w.min(h) / THUMBNAIL_SIZE,
        }
    }

    fn push(&mut self, kind: LayerKind, shapes: Vec<Shape>) {
        if !shapes.is_empty() {
            self.layers.push(Layer {
                kind,
                style: Style::for_layer(kind, self.unit),
                shapes,
            });
        }
    }

    fn points(&self) -> Vec<Point2<f32>> {
        self.layers
            .iter()
            .flat_map(|l| &l.shapes)
            .flat_map(Shape::points)
            .collect()
    }

    fn finish(mut self, mapping: Mapping, width: f32, height: f32) -> Drawing {
        for layer in &mut self.layers {
            for shape in &mut layer.shapes {
                for p in shape.points_mut() {
                    *p = mapping.apply(*p);
                }
                if let Shape::Circle { radius, .. } = shape {
                    *radius *= mapping.scale.y;
                }
            }
        }
        Drawing {
            width,
            height,
            layers: self.layers,
        }
    }
}

struct BallProjection {
    center: Point2<f32>,
    /// Projected radius in the same units as `center`.
    radius: f32,
    depth: f32,
}

/// Project the ball; the radius is the largest screen offset of the six
/// points `center ± radius` along the world axes.
fn project_ball(camera: &Camera, center: Point3<f32>, radius: f32) -> Option<BallProjection> {
    if !(radius.is_finite() && radius > 0.0) {
        return None;
    }
    let projected = camera.project(&center);
    let axes = [Vector3::x(), Vector3::y(), Vector3::z()];
    let mut screen_radius: f32 = 0.0;
    for axis in axes {
        for sign in [1.0, -1.0] {
            let p = camera.project(&(center + axis * (radius * sign)));
            let mut offset = p.screen - projected.screen;
            offset.x *= camera.aspect;
            screen_radius = screen_radius.max(offset.norm());
        }
    }
    Some(BallProjection {
        center: projected.screen,
        radius: screen_radius,
        depth: projected.depth,
    })
}

fn ground_plane(cubes: &[CubeInstance], ball: Point3<f32>, ball_radius: f32) -> [Point3<f32>; 4] {
    let (y, min, max) = if cubes.is_empty() {
        let r = ball_radius.max(0.25) * 3.0;
        (
            ball.y - ball_radius.max(0.0),
            Vector2::new(ball.x - r, ball.z - r),
            Vector2::new(ball.x + r, ball.z + r),
        )
    } else {
        let mut y = f32::INFINITY;
        let mut min = Vector2::new(f32::INFINITY, f32::INFINITY);
        let mut max = Vector2::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for cube in cubes {
            let reach = cube.size * (0.5 + GROUND_MARGIN);
            y = y.min(cube.floor_y());
            min = Vector2::new(min.x.min(cube.center.x - reach), min.y.min(cube.center.z - reach));
            max = Vector2::new(max.x.max(cube.center.x + reach), max.y.max(cube.center.z + reach));
        }
        (y, min, max)
    };
    [
        Point3::new(min.x, y, min.y),
        Point3::new(max.x, y, min.y),
        Point3::new(max.x, y, max.y),
        Point3::new(min.x, y, max.y),
    ]
}

fn compose_cube(scene: &CubeScene, options: &ComposeOptions) -> Drawing {
    let (width, height) = options.fit.dimensions();
    let mut camera = options
        .camera
        .unwrap_or_else(|| Camera::from_config(&scene.camera));
    camera.aspect = match options.fit {
        Fit::Bounds { .. } => 1.0,
        Fit::Viewport { width, height } => width / height,
    };

    let cubes = cube_instances(&scene.cube);
    let ball_position = options.ball_position.unwrap_or(scene.ball.position);
    let ball = project_ball(&camera, ball_position, scene.ball.radius);
    let resolved = visibility::resolve(&cubes, &camera, ball.as_ref().map(|b| b.depth));

    let mut builder = Builder::new(&options.fit);

    if scene.render.show_ground_plane {
        let corners = ground_plane(&cubes, scene.ball.position, scene.ball.radius);
        let points = camera.clip_polygon(&corners.map(|c| camera.project(&c)));
        if !points.is_empty() {
            builder.push(LayerKind::GroundPlane, vec![Shape::Polygon { points }]);
        }
    }

    let motion = scene
        .animation
        .as_ref()
        .filter(|_| options.show_motion_path)
        .and_then(|animation| MotionCurve::from_animation(animation, options.path_portion));
    let with_faces = scene.render.wireframe == WireframeStyle::EdgesFaces;

    for pass in DRAW_ORDER {
        match pass {
            Pass::MotionPath => {
                if let Some(curve) = &motion {
                    let projected: Vec<_> = curve.points.iter().map(|p| camera.project(p)).collect();
                    let ends_visible = projected.last().is_some_and(|p| camera.is_visible(p));
                    let runs = camera.clip_polyline(&projected);
                    let last = runs.len().saturating_sub(1);
                    let shapes = runs
                        .into_iter()
                        .enumerate()
                        .map(|(i, points)| Shape::Polyline {
                            points,
                            arrow: ends_visible && i == last,
                        })
                        .collect();
                    builder.push(LayerKind::MotionPath, shapes);
                }
            }
            Pass::Ball => {
                if let Some(ball) = ball.as_ref().filter(|b| b.depth >= camera.near) {
                    builder.push(
                        LayerKind::Ball,
                        vec![Shape::Circle {
                            center: ball.center,
                            radius: ball.radius,
                        }],
                    );
                }
            }
            _ => {
                let Some((facing, placement)) = pass.edge_class() else {
                    continue;
                };
                if with_faces && facing == Facing::Front {
                    let faces = resolved
                        .faces_in(Facing::Front, placement)
                        .map(|f| camera.clip_polygon(&f.corners))
                        .filter(|points| !points.is_empty())
                        .map(|points| Shape::Polygon { points })
                        .collect();
                    let kind = match placement {
                        Placement::BehindBall => LayerKind::FacesBehind,
                        Placement::InFrontOfBall => LayerKind::FacesInFront,
                    };
                    builder.push(kind, faces);
                }
                let edges = resolved
                    .edges_in(facing, placement)
                    .filter_map(|e| camera.clip_segment(&e.start, &e.end))
                    .map(|(from, to)| Shape::Line { from, to })
                    .collect();
                builder.push(edge_layer(facing, placement), edges);
            }
        }
    }

    if let (Some(text), Some(cube)) = (&scene.render.front_label, cubes.first()) {
        if visibility::face_facing(cube, FRONT_FACE, &camera) == Facing::Front {
            let at = camera.project(&cube.face_centroid(FRONT_FACE));
            if camera.is_visible(&at) {
                builder.push(
                    LayerKind::FrontLabel,
                    vec![Shape::Text {
                        at: at.screen,
                        text: text.clone(),
                    }],
                );
            }
        }
    }

    let mapping = match options.fit {
        Fit::Bounds { size, padding } => {
            let mut points = builder.points();
            if let Some(ball) = &ball {
                let r = ball.radius;
                points.extend([
                    ball.center + Vector2::new(r, r),
                    ball.center - Vector2::new(r, r),
                ]);
            }
            Mapping::fit(&points, size, size, padding)
        }
        Fit::Viewport { width, height } => Mapping::viewport(width, height),
    };
    builder.finish(mapping, width, height)
}

fn edge_layer(facing: Facing, placement: Placement) -> LayerKind {
    match (facing, placement) {
        (Facing::Back, Placement::BehindBall) => LayerKind::BackEdgesBehind,
        (Facing::Front, Placement::BehindBall) => LayerKind::FrontEdgesBehind,
        (Facing::Back, Placement::InFrontOfBall) => LayerKind::BackEdgesInFront,
        (Facing::Front, Placement::InFrontOfBall) => LayerKind::FrontEdgesInFront,
    }
}

fn compose_time_axis(axis: &TimeAxis, options: &ComposeOptions) -> Drawing {
    let (width, height) = options.fit.dimensions();
    let [start, end] = axis.range;
    let span = if (end - start).abs() > f32::EPSILON {
        end - start
    } else {
        1.0
    };
    let x = |value: f32| (value - start) / span * AXIS_LENGTH;

    let mut builder = Builder::new(&options.fit);

    if let Some([a, b]) = axis.span {
        let (x0, x1) = (x(a), x(b));
        builder.push(
            LayerKind::AxisSpan,
            vec![Shape::Polygon {
                points: vec![
                    Point2::new(x0, -3.0),
                    Point2::new(x1, -3.0),
                    Point2::new(x1, 3.0),
                    Point2::new(x0, 3.0),
                ],
            }],
        );
    }

    let ticks = axis.ticks.max(1);
    let mut shapes = vec![Shape::Polyline {
        points: vec![Point2::new(0.0, 0.0), Point2::new(AXIS_LENGTH + 6.0, 0.0)],
        arrow: true,
    }];
    shapes.extend((0..=ticks).map(|i| {
        let tx = AXIS_LENGTH * i as f32 / ticks as f32;
        Shape::Line {
            from: Point2::new(tx, -2.0),
            to: Point2::new(tx, 2.0),
        }
    }));
    builder.push(LayerKind::Axis, shapes);

    if let Some([from, to]) = axis.motion {
        if (to - from).abs() > f32::EPSILON {
            builder.push(
                LayerKind::AxisMotion,
                vec![Shape::Polyline {
                    points: vec![Point2::new(x(from), -8.0), Point2::new(x(to), -8.0)],
                    arrow: true,
                }],
            );
        }
    }

    if let Some(marker) = axis.marker {
        builder.push(
            LayerKind::AxisMarker,
            vec![Shape::Circle {
                center: Point2::new(x(marker), 0.0),
                radius: 3.5,
            }],
        );
    }

    let labels = axis
        .labels
        .iter()
        .map(|label| Shape::Text {
            at: Point2::new(x(label.at), 14.0),
            text: label.text.clone(),
        })
        .collect();
    builder.push(LayerKind::AxisLabels, labels);

    let mut points = builder.points();
    points.extend([Point2::new(0.0, -12.0), Point2::new(AXIS_LENGTH + 6.0, 18.0)]);
    let padding = match options.fit {
        Fit::Bounds { padding, .. } => padding,
        Fit::Viewport { width, height } => width.min(height) * 0.08,
    };
    let mapping = Mapping::fit(&points, width, height, padding);
    builder.finish(mapping, width, height)
}

/// Offline thumbnail drawing with default camera and loop portion.
pub fn compose_thumbnail(scene: &SceneConfig) -> Drawing {
    compose(scene, &ComposeOptions::thumbnail())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Animation, AxisLabel, CubeVariant, RenderOptions};

    fn scene_with_path() -> SceneConfig {
        SceneConfig::Cube(CubeScene {
            animation: Some(Animation::segment(
                Point3::new(0.0, 0.0, 1.4),
                Point3::new(0.0, 0.0, 0.1),
                2.0,
            )),
            ..CubeScene::default()
        })
    }

    fn all_points(drawing: &Drawing) -> Vec<Point2<f32>> {
        drawing
            .layers
            .iter()
            .flat_map(|l| &l.shapes)
            .flat_map(Shape::points)
            .collect()
    }

    #[test]
    fn test_thumbnail_fits_canvas() {
        let drawing = compose_thumbnail(&scene_with_path());
        assert_eq!((drawing.width, drawing.height), (THUMBNAIL_SIZE, THUMBNAIL_SIZE));
        for p in all_points(&drawing) {
            assert!(p.x >= THUMBNAIL_PADDING - 1e-3 && p.x <= THUMBNAIL_SIZE - THUMBNAIL_PADDING + 1e-3);
            assert!(p.y >= THUMBNAIL_PADDING - 1e-3 && p.y <= THUMBNAIL_SIZE - THUMBNAIL_PADDING + 1e-3);
        }
    }

    #[test]
    fn test_fit_touches_padding_on_the_long_axis() {
        let drawing = compose_thumbnail(&SceneConfig::cube());
        let points = all_points(&drawing);
        let min_x = points.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        let max_x = points.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
        let min_y = points.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let max_y = points.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
        let inner = THUMBNAIL_SIZE - 2.0 * THUMBNAIL_PADDING;
        let longest = (max_x - min_x).max(max_y - min_y);
        assert!((longest - inner).abs() < 0.05, "longest side {longest}");
    }

    #[test]
    fn test_layer_order_places_ball_between_groups() {
        let drawing = compose_thumbnail(&scene_with_path());
        let kinds = drawing.kinds();
        let ball = kinds.iter().position(|k| *k == LayerKind::Ball).unwrap();
        let path = kinds.iter().position(|k| *k == LayerKind::MotionPath).unwrap();
        assert!(path < ball);
        for (i, kind) in kinds.iter().enumerate() {
            match kind {
                LayerKind::BackEdgesBehind | LayerKind::FrontEdgesBehind => assert!(i < path),
                LayerKind::BackEdgesInFront | LayerKind::FrontEdgesInFront => assert!(i > ball),
                _ => {}
            }
        }
    }

    #[test]
    fn test_edges_total_twelve_per_cube() {
        let scene = SceneConfig::Cube(CubeScene {
            cube: crate::scene::CubeConfig {
                variant: CubeVariant::RingCubes,
                ..Default::default()
            },
            ..CubeScene::default()
        });
        let drawing = compose_thumbnail(&scene);
        let edges: usize = drawing
            .layers
            .iter()
            .filter(|l| l.kind.is_back_edges() || l.kind.is_front_edges())
            .map(|l| l.shapes.len())
            .sum();
        assert_eq!(edges, 48);
    }

    #[test]
    fn test_degenerate_path_is_omitted() {
        let scene = SceneConfig::Cube(CubeScene {
            animation: Some(Animation {
                path: crate::scene::PathSpec::polyline(vec![Point3::origin()]),
                ..Animation::segment(Point3::origin(), Point3::origin(), 1.0)
            }),
            ..CubeScene::default()
        });
        let drawing = compose_thumbnail(&scene);
        assert!(drawing.layer(LayerKind::MotionPath).is_none());
        assert!(drawing.layer(LayerKind::Ball).is_some());
        assert!(!drawing.has_arrows());
    }

    #[test]
    fn test_camera_inside_cube_clips_edges() {
        let scene = SceneConfig::cube();
        let options = ComposeOptions {
            camera: Some(Camera::new(Point3::new(0.0, 0.0, 0.3), Point3::origin(), 40.0)),
            ..ComposeOptions::viewport(200.0, 200.0)
        };
        let drawing = compose(&scene, &options);
        let lines: Vec<_> = drawing
            .layers
            .iter()
            .filter(|l| l.kind.is_back_edges() || l.kind.is_front_edges())
            .flat_map(|l| &l.shapes)
            .collect();
        // The face at z = 0.5 sits behind the camera; the four edges leaving
        // it are cut at the near plane.
        assert_eq!(lines.len(), 8);
        assert!(lines
            .iter()
            .flat_map(|s| s.points())
            .all(|p| p.x.is_finite() && p.y.is_finite()));
        assert!(drawing.layer(LayerKind::Ball).is_some());
    }

    #[test]
    fn test_zero_size_cube_still_draws_ball() {
        let scene = SceneConfig::Cube(CubeScene {
            cube: crate::scene::CubeConfig {
                size: -1.0,
                ..Default::default()
            },
            ..CubeScene::default()
        });
        let drawing = compose_thumbnail(&scene);
        assert_eq!(drawing.kinds(), vec![LayerKind::Ball]);
    }

    #[test]
    fn test_faces_and_ground_plane() {
        let scene = SceneConfig::Cube(CubeScene {
            render: RenderOptions {
                show_ground_plane: true,
                wireframe: WireframeStyle::EdgesFaces,
                front_label: Some("in".to_string()),
            },
            ball: crate::scene::BallConfig {
                position: Point3::new(0.0, 0.0, 3.0),
                ..Default::default()
            },
            ..CubeScene::default()
        });
        let drawing = compose_thumbnail(&scene);
        let kinds = drawing.kinds();
        assert_eq!(kinds[0], LayerKind::GroundPlane);
        assert_eq!(*kinds.last().unwrap(), LayerKind::FrontLabel);
        let faces = drawing.layer(LayerKind::FacesBehind).unwrap();
        assert_eq!(faces.shapes.len(), 3);
    }

    #[test]
    fn test_viewport_keeps_target_centered() {
        let options = ComposeOptions::viewport(200.0, 100.0);
        let drawing = compose(&SceneConfig::cube(), &options);
        let ball = drawing.layer(LayerKind::Ball).unwrap();
        match &ball.shapes[0] {
            Shape::Circle { center, radius } => {
                assert!((center.x - 100.0).abs() < 1e-3);
                assert!((center.y - 50.0).abs() < 1e-3);
                assert!(*radius > 0.0);
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_time_axis_layers() {
        let scene = SceneConfig::TimeAxis(TimeAxis {
            marker: Some(3.0),
            span: Some([2.0, 6.0]),
            motion: Some([0.0, 3.0]),
            labels: vec![AxisLabel {
                at: 3.0,
                text: "at 3".to_string(),
            }],
            ..TimeAxis::default()
        });
        let drawing = compose_thumbnail(&scene);
        assert_eq!(
            drawing.kinds(),
            vec![
                LayerKind::AxisSpan,
                LayerKind::Axis,
                LayerKind::AxisMotion,
                LayerKind::AxisMarker,
                LayerKind::AxisLabels
            ]
        );
        assert!(drawing.layer(LayerKind::Ball).is_none());
        assert!(drawing.layer(LayerKind::FrontEdgesBehind).is_none());
    }

    #[test]
    fn test_arrowhead_points_along_last_segment() {
        let points = [Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), Point2::new(10.0, 0.0)];
        let [tip, left, right] = arrowhead(&points, 4.0).unwrap();
        assert_eq!(tip, Point2::new(10.0, 0.0));
        assert!((left.x - 6.0).abs() < 1e-5 && (right.x - 6.0).abs() < 1e-5);
        assert!((left.y + right.y).abs() < 1e-5);
        assert!(arrowhead(&[Point2::new(1.0, 1.0)], 4.0).is_none());
    }
}
