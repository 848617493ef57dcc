/// Motion path sampling
///
/// Designer-authored paths are sparse control points. They are turned into a
/// centripetal Catmull-Rom curve (alpha = 0.5, which avoids cusps and
/// self-intersections on unevenly spaced points) and resampled at even
/// arc-length steps.
use nalgebra::{Point3, Vector3};

use crate::scene::Animation;

/// Endpoints closer than this make a path a loop.
pub const CLOSE_EPSILON: f32 = 1e-3;
pub const DEFAULT_SAMPLES: usize = 64;
/// Fraction of a closed loop drawn in a static thumbnail, so the arrowhead
/// lands mid-loop instead of on the start point.
pub const THUMBNAIL_LOOP_PORTION: f32 = 0.7;

const ALPHA: f32 = 0.5;
const DENSE_PER_SEGMENT: usize = 24;
const KNOT_EPSILON: f32 = 1e-4;

/// Sample a control polygon into an evenly spaced curve.
///
/// * fewer than two points: empty
/// * closed (explicitly or by coincident endpoints): the loop, sampled over
///   the first `portion` of its arc length
/// * two open points: the straight segment, returned as those two points
/// * three or more open points: simplified, then the full curve
pub fn sample_curve(
    points: &[Point3<f32>],
    closed: bool,
    portion: f32,
    samples: usize,
) -> Vec<Point3<f32>> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Vec::new();
    };
    if points.len() < 2 {
        tracing::debug!("motion path has fewer than two points, omitting it");
        return Vec::new();
    }

    let coincident = (first - last).norm() < CLOSE_EPSILON;
    if closed || coincident {
        let ring = if coincident {
            &points[..points.len() - 1]
        } else {
            points
        };
        if ring.len() < 2 {
            tracing::debug!("closed motion path collapses to a point, omitting it");
            return Vec::new();
        }
        let dense = closed_spline(ring);
        let portion = if portion.is_finite() { portion.clamp(0.0, 1.0) } else { 1.0 };
        return resample(&dense, portion, samples);
    }

    if points.len() == 2 {
        return points.to_vec();
    }

    let simplified = simplify(points);
    if simplified.len() <= 2 {
        return simplified;
    }
    resample(&open_spline(&simplified), 1.0, samples)
}

/// Keep the prefix that moves monotonically away from the origin.
///
/// Points up to the farthest one from `points[0]` are kept only when they
/// extend the farthest reach so far and do not repeat the last kept point;
/// everything after the farthest point is dropped.
pub fn simplify(points: &[Point3<f32>]) -> Vec<Point3<f32>> {
    let Some(origin) = points.first().copied() else {
        return Vec::new();
    };
    let distances: Vec<f32> = points.iter().map(|p| (p - origin).norm()).collect();
    let farthest = distances
        .iter()
        .enumerate()
        .fold(0, |best, (i, d)| if *d > distances[best] { i } else { best });

    let mut kept = vec![origin];
    let mut reach = 0.0;
    for (point, distance) in points.iter().zip(&distances).take(farthest + 1).skip(1) {
        let repeats = kept
            .last()
            .is_some_and(|last| (point - last).norm() < CLOSE_EPSILON);
        if *distance >= reach && !repeats {
            reach = *distance;
            kept.push(*point);
        }
    }
    kept
}

/// Smoothstep ease on a clamped parameter.
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn next_knot(t: f32, a: &Vector3<f32>, b: &Vector3<f32>) -> f32 {
    t + (b - a).norm().powf(ALPHA).max(KNOT_EPSILON)
}

/// One centripetal Catmull-Rom segment between `p[1]` and `p[2]` at `u` in [0, 1].
fn segment_point(p: [Vector3<f32>; 4], u: f32) -> Vector3<f32> {
    let t0 = 0.0;
    let t1 = next_knot(t0, &p[0], &p[1]);
    let t2 = next_knot(t1, &p[1], &p[2]);
    let t3 = next_knot(t2, &p[2], &p[3]);
    let t = t1 + (t2 - t1) * u;

    let a1 = p[0] * ((t1 - t) / (t1 - t0)) + p[1] * ((t - t0) / (t1 - t0));
    let a2 = p[1] * ((t2 - t) / (t2 - t1)) + p[2] * ((t - t1) / (t2 - t1));
    let a3 = p[2] * ((t3 - t) / (t3 - t2)) + p[3] * ((t - t2) / (t3 - t2));
    let b1 = a1 * ((t2 - t) / (t2 - t0)) + a2 * ((t - t0) / (t2 - t0));
    let b2 = a2 * ((t3 - t) / (t3 - t1)) + a3 * ((t - t1) / (t3 - t1));
    b1 * ((t2 - t) / (t2 - t1)) + b2 * ((t - t1) / (t2 - t1))
}

fn push_segment(out: &mut Vec<Point3<f32>>, p: [Vector3<f32>; 4]) {
    for step in 1..DENSE_PER_SEGMENT {
        let u = step as f32 / DENSE_PER_SEGMENT as f32;
        out.push(Point3::from(segment_point(p, u)));
    }
    out.push(Point3::from(p[2]));
}

fn open_spline(points: &[Point3<f32>]) -> Vec<Point3<f32>> {
    let n = points.len();
    let v: Vec<Vector3<f32>> = points.iter().map(|p| p.coords).collect();
    let before = v[0] * 2.0 - v[1];
    let after = v[n - 1] * 2.0 - v[n - 2];
    let at = |i: isize| -> Vector3<f32> {
        if i < 0 {
            before
        } else if i as usize >= n {
            after
        } else {
            v[i as usize]
        }
    };

    let mut out = vec![points[0]];
    for i in 0..(n as isize - 1) {
        push_segment(&mut out, [at(i - 1), at(i), at(i + 1), at(i + 2)]);
    }
    out
}

/// Dense loop through `ring`, ending back on `ring[0]`.
fn closed_spline(ring: &[Point3<f32>]) -> Vec<Point3<f32>> {
    let n = ring.len();
    let at = |i: usize| ring[i % n].coords;
    let mut out = vec![ring[0]];
    for i in 0..n {
        push_segment(&mut out, [at(i + n - 1), at(i), at(i + 1), at(i + 2)]);
    }
    out
}

fn cumulative_lengths(points: &[Point3<f32>]) -> Vec<f32> {
    let mut lengths = Vec::with_capacity(points.len());
    let mut total = 0.0;
    lengths.push(0.0);
    for pair in points.windows(2) {
        total += (pair[1] - pair[0]).norm();
        lengths.push(total);
    }
    lengths
}

fn point_at_length(points: &[Point3<f32>], lengths: &[f32], target: f32) -> Point3<f32> {
    let idx = lengths.partition_point(|l| *l < target);
    if idx == 0 {
        return points[0];
    }
    if idx >= points.len() {
        return points[points.len() - 1];
    }
    let (l0, l1) = (lengths[idx - 1], lengths[idx]);
    let span = l1 - l0;
    if span <= f32::EPSILON {
        return points[idx];
    }
    points[idx - 1].lerp(&points[idx], (target - l0) / span)
}

/// `samples` points at even arc-length steps over the first `portion` of the curve.
fn resample(dense: &[Point3<f32>], portion: f32, samples: usize) -> Vec<Point3<f32>> {
    let lengths = cumulative_lengths(dense);
    let total = lengths.last().copied().unwrap_or(0.0);
    if total <= f32::EPSILON {
        tracing::debug!("motion path has zero length, omitting it");
        return Vec::new();
    }
    let samples = samples.max(2);
    let end = total * portion;
    (0..samples)
        .map(|k| {
            let target = end * k as f32 / (samples - 1) as f32;
            point_at_length(dense, &lengths, target)
        })
        .collect()
}

/// A sampled motion path, addressable by normalized arc length.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionCurve {
    pub points: Vec<Point3<f32>>,
    pub closed: bool,
    lengths: Vec<f32>,
}

impl MotionCurve {
    /// `None` when fewer than two points remain.
    pub fn new(points: Vec<Point3<f32>>, closed: bool) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let lengths = cumulative_lengths(&points);
        Some(Self {
            points,
            closed,
            lengths,
        })
    }

    /// Sample an animation's path, drawing `portion` of it when it loops.
    pub fn from_animation(animation: &Animation, portion: f32) -> Option<Self> {
        let control = animation.control_points();
        let coincident = match (control.first(), control.last()) {
            (Some(a), Some(b)) => control.len() > 2 && (a - b).norm() < CLOSE_EPSILON,
            _ => false,
        };
        let closed = animation.closed || coincident;
        let points = sample_curve(&control, animation.closed, portion, DEFAULT_SAMPLES);
        Self::new(points, closed)
    }

    pub fn length(&self) -> f32 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    pub fn start(&self) -> Point3<f32> {
        self.points[0]
    }

    pub fn end(&self) -> Point3<f32> {
        self.points[self.points.len() - 1]
    }

    /// Point at normalized arc length `t` in [0, 1].
    pub fn point_at(&self, t: f32) -> Point3<f32> {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        point_at_length(&self.points, &self.lengths, t * self.length())
    }
}
