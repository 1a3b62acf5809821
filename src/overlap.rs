use itertools::Itertools;

use crate::geometry;
use crate::shape::{PosedShape, Shape};

/// Sum of intersection areas over every pair `(i, j)` with `i <= j`, self-pairs included
pub fn overlap(posed: &[PosedShape]) -> f64 {
    self_overlap(posed) + cross_overlap(posed)
}

pub fn self_overlap(posed: &[PosedShape]) -> f64 {
    posed.iter().map(|s| s.area).sum()
}

pub fn self_overlap_baseline(shapes: &[Shape]) -> f64 {
    shapes.iter().map(|s| s.area).sum()
}

/// Sum of intersection areas over distinct pairs `i < j`
pub fn cross_overlap(posed: &[PosedShape]) -> f64 {
    posed
        .iter()
        .tuple_combinations()
        .map(|(a, b)| pair_overlap(a, b))
        .sum()
}

/// Intersection area of two posed shapes, pruned on their cached bounding boxes
pub fn pair_overlap(a: &PosedShape, b: &PosedShape) -> f64 {
    match geometry::rects_collide(&a.bbox, &b.bbox) {
        false => 0.0,
        true => geometry::intersection_area(&a.polygon, a.convex, &b.polygon, b.convex),
    }
}
