/// Cube geometry for scene diagrams
use nalgebra::{Point3, Vector3};

use crate::scene::{CubeConfig, CubeVariant};

/// Distance between the two cube centers of a `twoCubes` scene.
pub const TWO_CUBE_SPACING: f32 = 1.6;
/// Radius of the horizontal circle `ringCubes` instances sit on.
pub const RING_RADIUS: f32 = 1.6;
pub const DEFAULT_RING_COUNT: usize = 4;

/// Vertex index pairs of the 12 cube edges.
pub const CUBE_EDGES: [[usize; 2]; 12] = [
    [0, 1],
    [1, 2],
    [2, 3],
    [3, 0],
    [4, 5],
    [5, 6],
    [6, 7],
    [7, 4],
    [0, 4],
    [1, 5],
    [2, 6],
    [3, 7],
];

/// Faces as vertex indices, counter-clockwise seen from outside the cube.
/// Order: back (-z), front (+z), bottom (-y), top (+y), left (-x), right (+x).
pub const CUBE_FACES: [[usize; 4]; 6] = [
    [0, 3, 2, 1],
    [4, 5, 6, 7],
    [0, 1, 5, 4],
    [3, 7, 6, 2],
    [0, 4, 7, 3],
    [1, 2, 6, 5],
];

/// Index of the +z face in [`CUBE_FACES`].
pub const FRONT_FACE: usize = 1;

/// Corners of an axis-aligned cube.
///
/// The order is fixed: `(-,-,-) (+,-,-) (+,+,-) (-,+,-) (-,-,+) (+,-,+) (+,+,+) (-,+,+)`,
/// which [`CUBE_EDGES`] and [`CUBE_FACES`] rely on.
pub fn cube_vertices(center: Point3<f32>, size: f32) -> [Point3<f32>; 8] {
    let h = size / 2.0;
    [
        Point3::new(center.x - h, center.y - h, center.z - h),
        Point3::new(center.x + h, center.y - h, center.z - h),
        Point3::new(center.x + h, center.y + h, center.z - h),
        Point3::new(center.x - h, center.y + h, center.z - h),
        Point3::new(center.x - h, center.y - h, center.z + h),
        Point3::new(center.x + h, center.y - h, center.z + h),
        Point3::new(center.x + h, center.y + h, center.z + h),
        Point3::new(center.x - h, center.y + h, center.z + h),
    ]
}

/// Center offsets of the cube instances for a variant.
pub fn build_cube_offsets(variant: CubeVariant) -> Vec<Vector3<f32>> {
    match variant {
        CubeVariant::SingleCube => vec![Vector3::zeros()],
        CubeVariant::TwoCubes => {
            let half = TWO_CUBE_SPACING / 2.0;
            vec![Vector3::new(-half, 0.0, 0.0), Vector3::new(half, 0.0, 0.0)]
        }
        CubeVariant::RingCubes => ring_offsets(DEFAULT_RING_COUNT),
    }
}

/// `count` offsets evenly spaced on the ring, starting on the +x axis.
pub fn ring_offsets(count: usize) -> Vec<Vector3<f32>> {
    let count = count.max(1);
    (0..count)
        .map(|i| {
            let angle = std::f32::consts::TAU * i as f32 / count as f32;
            Vector3::new(RING_RADIUS * angle.cos(), 0.0, RING_RADIUS * angle.sin())
        })
        .collect()
}

/// One placed cube of a scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeInstance {
    pub center: Point3<f32>,
    pub size: f32,
    pub vertices: [Point3<f32>; 8],
}

impl CubeInstance {
    pub fn new(center: Point3<f32>, size: f32) -> Self {
        Self {
            center,
            size,
            vertices: cube_vertices(center, size),
        }
    }

    pub fn face_corners(&self, face: usize) -> [Point3<f32>; 4] {
        CUBE_FACES[face].map(|i| self.vertices[i])
    }

    pub fn face_centroid(&self, face: usize) -> Point3<f32> {
        let corners = self.face_corners(face);
        let sum = corners
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Point3::from(sum / 4.0)
    }

    /// Outward face normal computed from three of the four corners.
    ///
    /// If the winding of the face table ever produces an inward normal the
    /// result is flipped so it points away from the cube center.
    pub fn face_normal(&self, face: usize) -> Vector3<f32> {
        let [a, b, c, _] = self.face_corners(face);
        let normal = (b - a).cross(&(c - a));
        let normal = normal.try_normalize(f32::EPSILON).unwrap_or(normal);
        let outward = self.face_centroid(face) - self.center;
        if normal.dot(&outward) < 0.0 {
            tracing::warn!(face, "cube face winding points inward, flipping normal");
            -normal
        } else {
            normal
        }
    }

    /// Bottom of the cube on the y axis.
    pub fn floor_y(&self) -> f32 {
        self.center.y - self.size / 2.0
    }
}

/// Place every cube instance of a scene; a non-positive size yields none.
pub fn cube_instances(config: &CubeConfig) -> Vec<CubeInstance> {
    if !(config.size.is_finite() && config.size > 0.0) {
        tracing::debug!(size = config.size, "degenerate cube size, omitting cube geometry");
        return Vec::new();
    }
    let offsets = match (config.variant, config.ring_count) {
        (CubeVariant::RingCubes, Some(count)) => ring_offsets(count),
        (variant, _) => build_cube_offsets(variant),
    };
    offsets
        .into_iter()
        .map(|offset| CubeInstance::new(config.position + offset, config.size))
        .collect()
}

/// The two faces adjacent to each edge, as indices into [`CUBE_FACES`].
pub fn edge_faces() -> [[usize; 2]; 12] {
    let mut adjacency = [[usize::MAX; 2]; 12];
    for (e, [a, b]) in CUBE_EDGES.iter().enumerate() {
        let mut found = 0;
        for (f, face) in CUBE_FACES.iter().enumerate() {
            let has_edge = (0..4).any(|k| {
                let (u, v) = (face[k], face[(k + 1) % 4]);
                (u == *a && v == *b) || (u == *b && v == *a)
            });
            if has_edge && found < 2 {
                adjacency[e][found] = f;
                found += 1;
            }
        }
    }
    adjacency
}
