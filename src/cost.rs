use itertools::Itertools;

use crate::geometry::{self, Pose};
use crate::shape::{transform_all, PosedShape, Shape};

/// Reference to a landmark: (shape index, landmark index)
pub type LandmarkRef = (usize, usize);

/// Every pair of same-label landmarks that live on different shapes
#[derive(Clone, Debug, Default)]
pub struct LandmarkPairing {
    pub pairs: Vec<(LandmarkRef, LandmarkRef)>,
}

impl LandmarkPairing {
    pub fn new(shapes: &[Shape]) -> Self {
        let pairs = Self::pairs_by_label(
            shapes
                .iter()
                .enumerate()
                .flat_map(|(i, s)| s.landmarks.iter().enumerate().map(move |(j, lm)| (&lm.color, (i, j)))),
        );
        LandmarkPairing { pairs }
    }

    pub fn from_posed(posed: &[PosedShape]) -> Self {
        let pairs = Self::pairs_by_label(
            posed
                .iter()
                .enumerate()
                .flat_map(|(i, s)| s.landmarks.iter().enumerate().map(move |(j, lm)| (&lm.color, (i, j)))),
        );
        LandmarkPairing { pairs }
    }

    fn pairs_by_label<K, I>(landmarks: I) -> Vec<(LandmarkRef, LandmarkRef)>
    where
        K: std::hash::Hash + Eq + Ord,
        I: Iterator<Item = (K, LandmarkRef)>,
    {
        landmarks
            .into_group_map()
            .into_iter()
            .sorted_by(|(a, _), (b, _)| a.cmp(b))
            .flat_map(|(_, bucket)| {
                bucket
                    .into_iter()
                    .tuple_combinations()
                    .filter(|((i, _), (k, _))| i != k)
                    .collect_vec()
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn evaluate(&self, posed: &[PosedShape]) -> f64 {
        self.pairs
            .iter()
            .map(|&((i, a), (k, b))| {
                geometry::sq_distance(posed[i].landmarks[a].position, posed[k].landmarks[b].position)
            })
            .sum()
    }

    /// Same as [`LandmarkPairing::evaluate`], posing only the landmarks involved
    pub fn evaluate_configuration(&self, shapes: &[Shape], configuration: &[Pose]) -> f64 {
        self.pairs
            .iter()
            .map(|&((i, a), (k, b))| {
                let pa = configuration[i].apply(shapes[i].landmarks[a].position);
                let pb = configuration[k].apply(shapes[k].landmarks[b].position);
                geometry::sq_distance(pa, pb)
            })
            .sum()
    }
}

/// Sum of squared distances between same-label landmarks on different shapes
pub fn cost(shapes: &[Shape], configuration: &[Pose]) -> f64 {
    debug_assert_eq!(shapes.len(), configuration.len());
    cost_posed(&transform_all(shapes, configuration))
}

pub fn cost_posed(posed: &[PosedShape]) -> f64 {
    LandmarkPairing::from_posed(posed).evaluate(posed)
}
