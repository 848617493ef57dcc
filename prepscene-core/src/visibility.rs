/// Front/back classification of cube edges and their ordering against the ball
///
/// This is a painter's ordering, not a depth buffer. It is correct for convex
/// axis-aligned cubes and one sphere that do not intersect; when the ball
/// penetrates a cube the in-front/behind split can be visibly wrong.
use crate::geometry::{edge_faces, CubeInstance, CUBE_EDGES, CUBE_FACES};
use crate::projection::{Camera, ProjectedPoint};

/// Margin an edge must be nearer than the ball to count as in front of it.
pub const DEPTH_EPSILON: f32 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facing {
    Front,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    BehindBall,
    InFrontOfBall,
}

/// Drawing passes, back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    BackEdgesBehind,
    FrontEdgesBehind,
    MotionPath,
    Ball,
    BackEdgesInFront,
    FrontEdgesInFront,
}

pub const DRAW_ORDER: [Pass; 6] = [
    Pass::BackEdgesBehind,
    Pass::FrontEdgesBehind,
    Pass::MotionPath,
    Pass::Ball,
    Pass::BackEdgesInFront,
    Pass::FrontEdgesInFront,
];

impl Pass {
    /// The edge class drawn in this pass, if it is an edge pass.
    pub fn edge_class(self) -> Option<(Facing, Placement)> {
        match self {
            Self::BackEdgesBehind => Some((Facing::Back, Placement::BehindBall)),
            Self::FrontEdgesBehind => Some((Facing::Front, Placement::BehindBall)),
            Self::BackEdgesInFront => Some((Facing::Back, Placement::InFrontOfBall)),
            Self::FrontEdgesInFront => Some((Facing::Front, Placement::InFrontOfBall)),
            Self::MotionPath | Self::Ball => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifiedEdge {
    pub cube: usize,
    /// Index into [`CUBE_EDGES`].
    pub edge: usize,
    pub start: ProjectedPoint,
    pub end: ProjectedPoint,
    pub facing: Facing,
    pub depth: f32,
    pub placement: Placement,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifiedFace {
    pub cube: usize,
    /// Index into [`CUBE_FACES`].
    pub face: usize,
    pub corners: [ProjectedPoint; 4],
    pub facing: Facing,
    pub depth: f32,
    pub placement: Placement,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Visibility {
    pub edges: Vec<ClassifiedEdge>,
    pub faces: Vec<ClassifiedFace>,
}

impl Visibility {
    pub fn edges_in(
        &self,
        facing: Facing,
        placement: Placement,
    ) -> impl Iterator<Item = &ClassifiedEdge> + '_ {
        self.edges
            .iter()
            .filter(move |e| e.facing == facing && e.placement == placement)
    }

    pub fn faces_in(
        &self,
        facing: Facing,
        placement: Placement,
    ) -> impl Iterator<Item = &ClassifiedFace> + '_ {
        self.faces
            .iter()
            .filter(move |f| f.facing == facing && f.placement == placement)
    }

    pub fn count(&self, facing: Facing) -> usize {
        self.edges.iter().filter(|e| e.facing == facing).count()
    }
}

/// A face is front-facing when its outward normal points towards the camera.
pub fn face_facing(cube: &CubeInstance, face: usize, camera: &Camera) -> Facing {
    let to_camera = camera.position - cube.face_centroid(face);
    if cube.face_normal(face).dot(&to_camera) > 0.0 {
        Facing::Front
    } else {
        Facing::Back
    }
}

/// Split by depth against the ball; exact ties at the margin stay behind.
pub fn placement(depth: f32, ball_depth: Option<f32>) -> Placement {
    match ball_depth {
        Some(ball) if depth < ball - DEPTH_EPSILON => Placement::InFrontOfBall,
        _ => Placement::BehindBall,
    }
}

/// Classify every edge and face of every cube instance.
///
/// Each cube is classified on its own geometry only.
pub fn resolve(cubes: &[CubeInstance], camera: &Camera, ball_depth: Option<f32>) -> Visibility {
    let view = camera.view_matrix();
    let adjacency = edge_faces();
    let mut visibility = Visibility {
        edges: Vec::with_capacity(cubes.len() * CUBE_EDGES.len()),
        faces: Vec::with_capacity(cubes.len() * CUBE_FACES.len()),
    };

    for (index, cube) in cubes.iter().enumerate() {
        let projected = cube.vertices.map(|v| camera.project_with(&view, &v));
        let facings: [Facing; 6] = std::array::from_fn(|face| face_facing(cube, face, camera));

        for (face, corners) in CUBE_FACES.iter().enumerate() {
            let corners = corners.map(|i| projected[i]);
            let depth = corners.iter().map(|c| c.depth).sum::<f32>() / 4.0;
            visibility.faces.push(ClassifiedFace {
                cube: index,
                face,
                corners,
                facing: facings[face],
                depth,
                placement: placement(depth, ball_depth),
            });
        }

        for (edge, [a, b]) in CUBE_EDGES.iter().enumerate() {
            let [f0, f1] = adjacency[edge];
            let facing = if facings[f0] == Facing::Front || facings[f1] == Facing::Front {
                Facing::Front
            } else {
                Facing::Back
            };
            let (start, end) = (projected[*a], projected[*b]);
            let depth = (start.depth + end.depth) / 2.0;
            visibility.edges.push(ClassifiedEdge {
                cube: index,
                edge,
                start,
                end,
                facing,
                depth,
                placement: placement(depth, ball_depth),
            });
        }
    }

    tracing::trace!(
        cubes = cubes.len(),
        front = visibility.count(Facing::Front),
        back = visibility.count(Facing::Back),
        "classified cube edges"
    );
    visibility
}
