use geo::{AffineOps, AffineTransform, Area, BooleanOps, BoundingRect, Coord, Intersects, Line, LineString, Polygon, Rect};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Cross products below this magnitude are treated as collinear when validating boundaries
pub const COLLINEAR_EPSILON: f64 = 1e-12;

/// Rigid planar transformation: rotation by `theta` radians about the origin, followed by a translation of `(x, y)`
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Pose { x, y, theta }
    }

    pub fn identity() -> Self {
        Pose::default()
    }

    pub fn is_identity(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.theta == 0.0
    }

    pub fn inverse(&self) -> Pose {
        let (sin, cos) = (-self.theta).sin_cos();
        Pose::new(-(cos * self.x - sin * self.y), -(sin * self.x + cos * self.y), -self.theta)
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.x, self.y, self.theta]
    }

    pub fn affine(&self) -> AffineTransform<f64> {
        let (sin, cos) = self.theta.sin_cos();
        AffineTransform::new(cos, -sin, self.x, sin, cos, self.y)
    }

    pub fn apply(&self, c: Coord<f64>) -> Coord<f64> {
        self.affine().apply(c)
    }

    pub fn apply_polygon(&self, polygon: &Polygon<f64>) -> Polygon<f64> {
        polygon.affine_transform(&self.affine())
    }
}

impl From<(f64, f64, f64)> for Pose {
    fn from((x, y, theta): (f64, f64, f64)) -> Self {
        Pose::new(x, y, theta)
    }
}

pub fn sq_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let d = a - b;
    d.x * d.x + d.y * d.y
}

pub fn distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    sq_distance(a, b).sqrt()
}

pub fn is_finite(c: Coord<f64>) -> bool {
    c.x.is_finite() && c.y.is_finite()
}

/// z-component of `(a - o) x (b - o)`, positive when `o -> a -> b` turns counter-clockwise
pub fn cross(o: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Vertices of the exterior without the repeated closing coordinate
pub fn open_ring(polygon: &Polygon<f64>) -> &[Coord<f64>] {
    let coords = &polygon.exterior().0;
    match coords.len() > 1 && coords.first() == coords.last() {
        true => &coords[..coords.len() - 1],
        false => &coords[..],
    }
}

pub fn bounding_rect(polygon: &Polygon<f64>) -> Rect<f64> {
    polygon.bounding_rect().unwrap_or_else(|| {
        let origin = Coord { x: 0.0, y: 0.0 };
        Rect::new(origin, origin)
    })
}

/// True if the interiors can intersect. Boxes that only touch along an edge do not collide.
pub fn rects_collide(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    a.min().x < b.max().x && b.min().x < a.max().x && a.min().y < b.max().y && b.min().y < a.max().y
}

pub fn rect_union(a: &Rect<f64>, b: &Rect<f64>) -> Rect<f64> {
    Rect::new(
        Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
        Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
    )
}

/// Checks that no two edges of the closed ring intersect, apart from neighbouring edges meeting at their shared vertex.
/// Edges are swept by their x extent, so only edges with overlapping x ranges are tested against each other.
pub fn is_simple(ring: &LineString<f64>) -> bool {
    let edges = ring.lines().collect_vec();
    let n = edges.len();
    if n < 3 {
        return false;
    }
    let x_range = |l: &Line<f64>| (l.start.x.min(l.end.x), l.start.x.max(l.end.x));
    let order = (0..n).sorted_by(|&a, &b| x_range(&edges[a]).0.total_cmp(&x_range(&edges[b]).0)).collect_vec();

    for (k, &i) in order.iter().enumerate() {
        let (_, i_max) = x_range(&edges[i]);
        for &j in order[k + 1..].iter().take_while(|&&j| x_range(&edges[j]).0 <= i_max) {
            let (lo, hi) = (i.min(j), i.max(j));
            if hi == lo + 1 || (lo == 0 && hi == n - 1) {
                //neighbouring edges may only fail by folding back onto each other
                let (a, b) = (&edges[lo], &edges[hi]);
                let (shared, p, q) = match hi == lo + 1 {
                    true => (a.end, a.start, b.end),
                    false => (a.start, a.end, b.start),
                };
                let (dp, dq) = (p - shared, q - shared);
                if cross(shared, p, q).abs() <= COLLINEAR_EPSILON && dp.x * dq.x + dp.y * dq.y > 0.0 {
                    return false;
                }
            } else if edges[i].intersects(&edges[j]) {
                return false;
            }
        }
    }
    true
}

/// Sutherland–Hodgman: clips `subject` against the convex, counter-clockwise `clip` ring. Both rings are open.
pub fn clip_convex(subject: &[Coord<f64>], clip: &[Coord<f64>]) -> Vec<Coord<f64>> {
    let mut output = subject.to_vec();
    for (&c1, &c2) in clip.iter().circular_tuple_windows() {
        if output.len() < 3 {
            return Vec::new();
        }
        let input = std::mem::take(&mut output);
        for (&s, &e) in input.iter().circular_tuple_windows() {
            let s_side = cross(c1, c2, s);
            let e_side = cross(c1, c2, e);
            if e_side >= 0.0 {
                if s_side < 0.0 {
                    output.push(edge_crossing(s, e, s_side, e_side));
                }
                output.push(e);
            } else if s_side >= 0.0 {
                output.push(edge_crossing(s, e, s_side, e_side));
            }
        }
    }
    match output.len() < 3 {
        true => Vec::new(),
        false => output,
    }
}

fn edge_crossing(s: Coord<f64>, e: Coord<f64>, s_side: f64, e_side: f64) -> Coord<f64> {
    let t = s_side / (s_side - e_side);
    s + (e - s) * t
}

/// Shoelace area of an open ring, positive when counter-clockwise
pub fn ring_area(ring: &[Coord<f64>]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    ring.iter()
        .circular_tuple_windows()
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum::<f64>()
        * 0.5
}

/// Intersection area of two simple counter-clockwise polygons whose convexity is known.
/// Convex pairs are clipped directly, anything else goes through the boolean intersection.
pub fn intersection_area(a: &Polygon<f64>, a_convex: bool, b: &Polygon<f64>, b_convex: bool) -> f64 {
    match a_convex && b_convex {
        true => ring_area(&clip_convex(open_ring(a), open_ring(b))).max(0.0),
        false => a.intersection(b).unsigned_area(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn polygon(coords: &[(f64, f64)]) -> Polygon<f64> {
        Polygon::new(LineString::from(coords.to_vec()), vec![])
    }

    fn square(x: f64, y: f64, side: f64) -> Polygon<f64> {
        polygon(&[(x, y), (x + side, y), (x + side, y + side), (x, y + side)])
    }

    fn l_shape() -> Polygon<f64> {
        polygon(&[(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0), (1.0, 2.0), (0.0, 2.0)])
    }

    fn area(a: &Polygon<f64>, b: &Polygon<f64>) -> f64 {
        use geo::IsConvex;
        intersection_area(a, a.exterior().is_convex(), b, b.exterior().is_convex())
    }

    #[test]
    fn rotation_is_counter_clockwise() {
        let p = Pose::new(0.0, 0.0, FRAC_PI_2).apply(Coord { x: 1.0, y: 0.0 });
        assert!(p.x.abs() < 1e-12);
        assert!((p.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pose_inverse_restores_point() {
        let pose = Pose::new(12.0, -7.5, 2.3);
        let p = Coord { x: 3.0, y: 4.0 };
        let back = pose.inverse().apply(pose.apply(p));
        assert!(sq_distance(back, p) < 1e-20);
    }

    #[test]
    fn open_ring_drops_closing_vertex() {
        let sq = square(0.0, 0.0, 2.0);
        assert_eq!(sq.exterior().0.len(), 5);
        assert_eq!(open_ring(&sq).len(), 4);
        assert_eq!(ring_area(open_ring(&sq)), 4.0);
        let rev = open_ring(&sq).iter().rev().copied().collect_vec();
        assert_eq!(ring_area(&rev), -4.0);
    }

    #[test]
    fn simple_polygons() {
        assert!(is_simple(square(0.0, 0.0, 1.0).exterior()));
        assert!(is_simple(l_shape().exterior()));
        let bowtie = polygon(&[(0.0, 0.0), (1.0, 1.0), (1.0, 0.0), (0.0, 1.0)]);
        assert!(!is_simple(bowtie.exterior()));
        let folded = polygon(&[(0.0, 0.0), (2.0, 0.0), (1.0, 0.0)]);
        assert!(!is_simple(folded.exterior()));
        //the vertex (2, 0) touches the bottom edge
        let pinched = polygon(&[(0.0, 0.0), (4.0, 0.0), (4.0, 2.0), (2.0, 1.0), (2.0, 0.0), (1.0, 2.0)]);
        assert!(!is_simple(pinched.exterior()));
    }

    #[test]
    fn clip_overlapping_squares() {
        let clipped = clip_convex(open_ring(&square(0.0, 0.0, 2.0)), open_ring(&square(1.0, 1.0, 2.0)));
        assert!((ring_area(&clipped) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn clip_disjoint_squares() {
        assert!(clip_convex(open_ring(&square(0.0, 0.0, 1.0)), open_ring(&square(5.0, 5.0, 1.0))).is_empty());
    }

    #[test]
    fn touching_squares_do_not_intersect() {
        assert_eq!(area(&square(0.0, 0.0, 1.0), &square(1.0, 0.0, 1.0)), 0.0);
        assert!(!rects_collide(&bounding_rect(&square(0.0, 0.0, 1.0)), &bounding_rect(&square(1.0, 0.0, 1.0))));
    }

    #[test]
    fn convex_intersection_with_rotation() {
        //a unit square rotated by 45 degrees around its center, against itself unrotated
        let sq = square(-0.5, -0.5, 1.0);
        let rotated = Pose::new(0.0, 0.0, PI / 4.0).apply_polygon(&sq);
        let area = area(&sq, &rotated);
        //regular octagon inscribed between both squares
        let expected = 2.0 * (2.0f64.sqrt() - 1.0);
        assert!((area - expected).abs() < 1e-9, "{area} vs {expected}");
    }

    #[test]
    fn non_convex_intersection() {
        let l = l_shape();
        //covers the notch of the L, only its lower-left corner lies inside the L
        let notch = square(0.5, 0.5, 1.0);
        assert!((area(&l, &notch) - 0.75).abs() < 1e-6);
        assert!((area(&notch, &l) - 0.75).abs() < 1e-6);
        assert!((area(&l, &l) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn non_convex_against_non_convex() {
        let l = l_shape();
        let shifted = Pose::new(1.0, 1.0, 0.0).apply_polygon(&l);
        //the shifted L only reaches into the first L's notch, leaving nothing but the boundary in common
        assert!(area(&l, &shifted).abs() < 1e-6);
        let half = Pose::new(0.5, 0.0, 0.0).apply_polygon(&l);
        //bottom arm: [0.5,2]x[0,1], vertical arm: [0.5,1]x[1,2]
        assert!((area(&l, &half) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn rect_union_covers_both() {
        let u = rect_union(&bounding_rect(&square(0.0, 0.0, 1.0)), &bounding_rect(&square(3.0, -2.0, 1.0)));
        assert_eq!((u.min().x, u.min().y, u.max().x, u.max().y), (0.0, -2.0, 4.0, 1.0));
    }
}
