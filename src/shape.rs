use std::f64::consts::TAU;
use std::fmt;

use geo::orient::Direction;
use geo::{Area, Centroid, Coord, IsConvex, LineString, Orient, Polygon, Rect};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{DockError, Result};
use crate::geometry::{self, Pose};

/// Upper bound on the number of segments of a circle approximation
pub const MAX_CIRCLE_SEGMENTS: usize = 4096;

/// Landmark label. Only equality matters for pairing.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub String);

impl Color {
    pub fn new(label: impl Into<String>) -> Self {
        Color(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Color {
    fn from(label: &str) -> Self {
        Color(label.to_string())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Landmark {
    pub color: Color,
    pub position: Coord<f64>,
}

impl Landmark {
    pub fn new(color: impl Into<Color>, position: impl Into<Coord<f64>>) -> Self {
        Landmark {
            color: color.into(),
            position: position.into(),
        }
    }
}

/// Rigid polygonal template with labeled landmarks, defined in its local frame.
/// The exterior is validated and stored counter-clockwise.
#[derive(Clone, Debug)]
pub struct Shape {
    pub polygon: Polygon<f64>,
    pub landmarks: Vec<Landmark>,
    pub area: f64,
    pub bbox: Rect<f64>,
    pub convex: bool,
}

impl Shape {
    pub fn new(vertices: Vec<Coord<f64>>, landmarks: Vec<Landmark>) -> Result<Self> {
        let polygon = normalize_boundary(vertices)?;

        if let Some(lm) = landmarks.iter().find(|lm| !geometry::is_finite(lm.position)) {
            return Err(DockError::InvalidGeometry(format!(
                "landmark '{}' has a non-finite position {:?}",
                lm.color, lm.position
            )));
        }

        Ok(Shape {
            area: polygon.unsigned_area(),
            bbox: geometry::bounding_rect(&polygon),
            convex: polygon.exterior().is_convex(),
            polygon,
            landmarks,
        })
    }

    pub fn from_coords(vertices: &[(f64, f64)], landmarks: &[(&str, (f64, f64))]) -> Result<Self> {
        Shape::new(
            vertices.iter().map(|&v| Coord::from(v)).collect(),
            landmarks
                .iter()
                .map(|&(label, position)| Landmark::new(label, position))
                .collect(),
        )
    }

    /// Regular polygon with `n_segments` vertices approximating a circle
    pub fn circle(center: Coord<f64>, radius: f64, n_segments: usize, landmarks: Vec<Landmark>) -> Result<Self> {
        if !(radius > 0.0) || !radius.is_finite() {
            return Err(DockError::InvalidGeometry(format!(
                "circle radius must be positive and finite, got {radius}"
            )));
        }
        if n_segments > MAX_CIRCLE_SEGMENTS {
            return Err(DockError::InvalidGeometry(format!(
                "circle has {n_segments} segments, at most {MAX_CIRCLE_SEGMENTS} are supported"
            )));
        }
        let vertices = (0..n_segments)
            .map(|i| {
                let (sin, cos) = (TAU * i as f64 / n_segments as f64).sin_cos();
                Coord { x: center.x + radius * cos, y: center.y + radius * sin }
            })
            .collect();
        Shape::new(vertices, landmarks)
    }

    /// Vertices of the exterior without the closing coordinate
    pub fn vertices(&self) -> &[Coord<f64>] {
        geometry::open_ring(&self.polygon)
    }

    pub fn centroid(&self) -> Coord<f64> {
        self.polygon.centroid().map(|p| p.0).unwrap_or_default()
    }

    /// Same shape moved so that its area centroid lies on the origin
    pub fn centered(&self) -> Shape {
        let c = self.centroid();
        let posed = self.transform(&Pose::new(-c.x, -c.y, 0.0));
        Shape {
            polygon: posed.polygon,
            landmarks: posed.landmarks,
            area: self.area,
            bbox: posed.bbox,
            convex: self.convex,
        }
    }
}

/// Strips consecutive duplicates and a repeated closing vertex, then checks the ring and orients it counter-clockwise
fn normalize_boundary(vertices: Vec<Coord<f64>>) -> Result<Polygon<f64>> {
    if let Some(c) = vertices.iter().find(|&&c| !geometry::is_finite(c)) {
        return Err(DockError::InvalidGeometry(format!(
            "boundary vertex {c:?} is not finite"
        )));
    }

    let mut ring = vertices.into_iter().dedup().collect_vec();
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }

    if ring.len() < 3 {
        return Err(DockError::InvalidGeometry(format!(
            "boundary needs at least 3 distinct vertices, got {}",
            ring.len()
        )));
    }

    let polygon = Polygon::new(LineString::from(ring), vec![]);
    if polygon.unsigned_area() <= geometry::COLLINEAR_EPSILON {
        return Err(DockError::InvalidGeometry("boundary has zero area".to_string()));
    }
    if !geometry::is_simple(polygon.exterior()) {
        return Err(DockError::InvalidGeometry(
            "boundary is self-intersecting".to_string(),
        ));
    }
    Ok(polygon.orient(Direction::Default))
}

/// A shape mapped into the global frame by a pose. Recomputed for every evaluation.
#[derive(Clone, Debug)]
pub struct PosedShape {
    pub polygon: Polygon<f64>,
    pub landmarks: Vec<Landmark>,
    pub area: f64,
    pub bbox: Rect<f64>,
    pub convex: bool,
}

impl PosedShape {
    pub fn vertices(&self) -> &[Coord<f64>] {
        geometry::open_ring(&self.polygon)
    }
}

/// Anything that can be placed by a rigid pose
pub trait Posable {
    fn polygon(&self) -> &Polygon<f64>;
    fn landmarks(&self) -> &[Landmark];
    fn area(&self) -> f64;
    fn convex(&self) -> bool;

    fn transform(&self, pose: &Pose) -> PosedShape {
        let polygon = pose.apply_polygon(self.polygon());
        let landmarks = self
            .landmarks()
            .iter()
            .map(|lm| Landmark {
                color: lm.color.clone(),
                position: pose.apply(lm.position),
            })
            .collect_vec();
        PosedShape {
            bbox: geometry::bounding_rect(&polygon),
            polygon,
            landmarks,
            area: self.area(),
            convex: self.convex(),
        }
    }
}

impl Posable for Shape {
    fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    fn area(&self) -> f64 {
        self.area
    }

    fn convex(&self) -> bool {
        self.convex
    }
}

impl Posable for PosedShape {
    fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    fn area(&self) -> f64 {
        self.area
    }

    fn convex(&self) -> bool {
        self.convex
    }
}

pub fn transform(shape: &Shape, pose: &Pose) -> PosedShape {
    shape.transform(pose)
}

/// Poses every shape with the pose at the same index
pub fn transform_all(shapes: &[Shape], configuration: &[Pose]) -> Vec<PosedShape> {
    debug_assert_eq!(shapes.len(), configuration.len());
    shapes
        .iter()
        .zip(configuration.iter())
        .map(|(shape, pose)| shape.transform(pose))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn unit_square() -> Shape {
        Shape::from_coords(
            &[(-50.0, -50.0), (50.0, -50.0), (50.0, 50.0), (-50.0, 50.0)],
            &[("red", (30.0, 30.0)), ("blue", (30.0, -30.0))],
        )
        .unwrap()
    }

    #[test]
    fn clockwise_boundary_is_reoriented() {
        let shape = Shape::from_coords(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)], &[]).unwrap();
        assert_eq!(shape.area, 1.0);
        assert!(shape.polygon.signed_area() > 0.0);
        assert!(geometry::ring_area(shape.vertices()) > 0.0);
    }

    #[test]
    fn closing_vertex_is_stripped() {
        let shape =
            Shape::from_coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)], &[]).unwrap();
        assert_eq!(shape.vertices().len(), 3);
        assert_eq!(shape.area, 0.5);
    }

    #[test]
    fn rejects_too_few_vertices() {
        let res = Shape::from_coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 0.0)], &[]);
        assert!(matches!(res, Err(DockError::InvalidGeometry(_))));
    }

    #[test]
    fn rejects_self_intersection() {
        let res = Shape::from_coords(&[(0.0, 0.0), (1.0, 1.0), (1.0, 0.0), (0.0, 1.0)], &[]);
        assert!(matches!(res, Err(DockError::InvalidGeometry(_))));
    }

    #[test]
    fn rejects_non_finite_input() {
        let res = Shape::from_coords(&[(0.0, 0.0), (f64::NAN, 0.0), (1.0, 1.0)], &[]);
        assert!(matches!(res, Err(DockError::InvalidGeometry(_))));
        let res = Shape::from_coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)], &[("red", (f64::INFINITY, 0.0))]);
        assert!(matches!(res, Err(DockError::InvalidGeometry(_))));
    }

    #[test]
    fn circle_approximation() {
        let origin = Coord { x: 0.0, y: 0.0 };
        let circle = Shape::circle(origin, 10.0, 256, vec![]).unwrap();
        assert!(circle.convex);
        assert!((circle.area - PI * 100.0).abs() / (PI * 100.0) < 1e-3);
        assert!(Shape::circle(origin, 0.0, 16, vec![]).is_err());
    }

    #[test]
    fn circle_segments_are_capped() {
        let origin = Coord { x: 0.0, y: 0.0 };
        assert!(Shape::circle(origin, 1.0, MAX_CIRCLE_SEGMENTS, vec![]).is_ok());
        let res = Shape::circle(origin, 1.0, 1_000_000, vec![]);
        assert!(matches!(res, Err(DockError::InvalidGeometry(_))));
    }

    #[test]
    fn transform_rotates_then_translates() {
        let posed = transform(&unit_square(), &Pose::new(100.0, 0.0, FRAC_PI_2));
        let red = posed.landmarks[0].position;
        //(30, 30) rotated a quarter turn is (-30, 30)
        assert!(geometry::sq_distance(red, Coord { x: 70.0, y: 30.0 }) < 1e-18);
        assert!((posed.bbox.min().x - 50.0).abs() < 1e-9);
        assert!((posed.bbox.max().x - 150.0).abs() < 1e-9);
        assert_eq!(posed.area, 10000.0);
    }

    #[test]
    fn inverse_pose_restores_shape() {
        let shape = Shape::from_coords(
            &[(0.0, 0.0), (40.0, 0.0), (40.0, 20.0), (20.0, 20.0), (20.0, 40.0), (0.0, 40.0)],
            &[("red", (30.0, 10.0)), ("blue", (-5.0, 60.0))],
        )
        .unwrap();
        let pose = Pose::new(-123.5, 47.25, 2.6);
        let restored = transform(&shape, &pose).transform(&pose.inverse());

        assert_eq!(restored.vertices().len(), shape.vertices().len());
        for (a, b) in restored.vertices().iter().zip(shape.vertices()) {
            assert!(geometry::sq_distance(*a, *b) < 1e-18, "{a:?} vs {b:?}");
        }
        for (a, b) in restored.landmarks.iter().zip(&shape.landmarks) {
            assert_eq!(a.color, b.color);
            assert!(geometry::sq_distance(a.position, b.position) < 1e-18);
        }
        assert!((restored.bbox.min().x - shape.bbox.min().x).abs() < 1e-9);
        assert!((restored.bbox.max().y - shape.bbox.max().y).abs() < 1e-9);
        assert_eq!(restored.area, shape.area);
        assert_eq!(restored.convex, shape.convex);
    }

    #[test]
    fn landmarks_outside_boundary_are_allowed() {
        let shape = Shape::from_coords(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)], &[("red", (5.0, 5.0))]);
        assert!(shape.is_ok());
    }

    #[test]
    fn centered_shape() {
        let shape = Shape::from_coords(&[(0.0, 0.0), (40.0, 0.0), (40.0, 100.0), (0.0, 100.0)], &[("red", (38.0, 85.0))])
            .unwrap()
            .centered();
        let c = shape.centroid();
        assert!(c.x.abs() < 1e-9 && c.y.abs() < 1e-9);
        assert!(geometry::sq_distance(shape.landmarks[0].position, Coord { x: 18.0, y: 35.0 }) < 1e-18);
    }
}
