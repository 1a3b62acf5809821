use std::time::Instant;

use geo::Coord;
use rayon::prelude::*;

use crate::error::{DockError, Result};
use crate::io::json_instance::{JsonInstance, JsonLandmark, JsonShape};
use crate::shape::{Landmark, Shape};

/// Number of vertices of the regular polygon standing in for a circle when none is given
pub const DEFAULT_CIRCLE_SEGMENTS: usize = 64;

/// Turns a [`JsonInstance`] into validated shapes
#[derive(Debug, Clone, Copy)]
pub struct DockParse {
    center_shapes: bool,
}

impl DockParse {
    pub fn new(center_shapes: bool) -> DockParse {
        DockParse { center_shapes }
    }

    pub fn parse(&self, json_instance: &JsonInstance) -> Result<Vec<Shape>> {
        let start_time = Instant::now();
        let shapes = json_instance
            .shapes
            .par_iter()
            .enumerate()
            .map(|(shape_id, json_shape)| self.parse_shape(json_shape, shape_id))
            .collect::<Result<Vec<Shape>>>()?;

        log::info!(
            "[PARSE] {} shapes, {} landmarks parsed in {:?}",
            shapes.len(),
            shapes.iter().map(|s| s.landmarks.len()).sum::<usize>(),
            start_time.elapsed()
        );
        Ok(shapes)
    }

    fn parse_shape(&self, json_shape: &JsonShape, shape_id: usize) -> Result<Shape> {
        let shape = match json_shape {
            JsonShape::Polygon { vertices, landmarks } => Shape::new(
                vertices.iter().map(|&v| Coord::from(v)).collect(),
                convert_landmarks(landmarks),
            ),
            JsonShape::Circle {
                center,
                radius,
                segments,
                landmarks,
            } => Shape::circle(
                Coord::from(*center),
                *radius,
                segments.unwrap_or(DEFAULT_CIRCLE_SEGMENTS),
                convert_landmarks(landmarks),
            ),
        }
        .map_err(|e| match e {
            DockError::InvalidGeometry(msg) => DockError::InvalidGeometry(format!("shape {shape_id}: {msg}")),
            other => other,
        })?;

        Ok(match self.center_shapes {
            false => shape,
            true => shape.centered(),
        })
    }
}

fn convert_landmarks(landmarks: &[JsonLandmark]) -> Vec<Landmark> {
    landmarks
        .iter()
        .map(|lm| Landmark::new(lm.color.as_str(), lm.position))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(json: &str) -> JsonInstance {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parses_polygons_and_circles_in_order() {
        let json_instance = instance(
            r#"{"shapes": [
                {"type": "polygon", "vertices": [[0, 0], [0, 2], [2, 2], [2, 0]], "landmarks": [{"color": "red", "position": [1, 1]}]},
                {"type": "circle", "center": [0, 0], "radius": 1, "segments": 12}
            ]}"#,
        );
        let shapes = DockParse::new(false).parse(&json_instance).unwrap();
        assert_eq!(shapes.len(), 2);
        //clockwise input is reoriented
        assert!(almost::equal(shapes[0].area, 4.0));
        assert_eq!(shapes[0].landmarks[0].color.as_str(), "red");
        assert_eq!(shapes[1].vertices().len(), 12);
        assert!(shapes[1].convex);
    }

    #[test]
    fn centering_moves_centroid_and_landmarks() {
        let json_instance = instance(
            r#"{"shapes": [
                {"type": "polygon", "vertices": [[10, 10], [14, 10], [14, 12], [10, 12]], "landmarks": [{"color": "red", "position": [12, 11]}]}
            ]}"#,
        );
        let shapes = DockParse::new(true).parse(&json_instance).unwrap();
        let c = shapes[0].centroid();
        assert!(c.x.abs() < 1e-9 && c.y.abs() < 1e-9);
        assert!(crate::geometry::sq_distance(shapes[0].landmarks[0].position, Coord { x: 0.0, y: 0.0 }) < 1e-12);
    }

    #[test]
    fn oversized_circle_is_rejected() {
        let json_instance = instance(
            r#"{"shapes": [{"type": "circle", "center": [0, 0], "radius": 1, "segments": 1000000}]}"#,
        );
        match DockParse::new(false).parse(&json_instance) {
            Err(DockError::InvalidGeometry(msg)) => assert!(msg.starts_with("shape 0"), "{msg}"),
            other => panic!("expected invalid geometry, got {other:?}"),
        }
    }

    #[test]
    fn invalid_shape_names_its_index() {
        let json_instance = instance(
            r#"{"shapes": [
                {"type": "polygon", "vertices": [[0, 0], [1, 0], [1, 1]]},
                {"type": "polygon", "vertices": [[0, 0], [1, 1], [1, 0], [0, 1]]}
            ]}"#,
        );
        match DockParse::new(false).parse(&json_instance) {
            Err(DockError::InvalidGeometry(msg)) => assert!(msg.starts_with("shape 1"), "{msg}"),
            other => panic!("expected invalid geometry, got {other:?}"),
        }
    }
}
