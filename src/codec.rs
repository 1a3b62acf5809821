use crate::error::{DockError, Result};
use crate::geometry::Pose;

/// One pose per shape, index 0 always the identity
pub type Configuration = Vec<Pose>;

pub fn identity(n_shapes: usize) -> Configuration {
    vec![Pose::identity(); n_shapes]
}

pub fn flat_len(n_shapes: usize) -> usize {
    3 * n_shapes.saturating_sub(1)
}

pub fn pack(configuration: &[Pose]) -> Vec<f64> {
    configuration
        .iter()
        .skip(1)
        .flat_map(|pose| pose.as_array())
        .collect()
}

pub fn unpack(flat: &[f64]) -> Result<Configuration> {
    if flat.len() % 3 != 0 {
        return Err(DockError::DimensionMismatch {
            expected: flat.len() - flat.len() % 3,
            actual: flat.len(),
        });
    }
    let mut configuration = Vec::with_capacity(flat.len() / 3 + 1);
    configuration.push(Pose::identity());
    configuration.extend(flat.chunks_exact(3).map(|c| Pose::new(c[0], c[1], c[2])));
    Ok(configuration)
}

/// Like [`unpack`], but also checks the vector holds exactly the free poses of `n_shapes`
pub fn unpack_for(flat: &[f64], n_shapes: usize) -> Result<Configuration> {
    let expected = flat_len(n_shapes);
    if flat.len() != expected {
        return Err(DockError::DimensionMismatch {
            expected,
            actual: flat.len(),
        });
    }
    unpack(flat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(1; "anchor only")]
    #[test_case(2; "pair")]
    #[test_case(5; "five shapes")]
    fn inverse_law(n_shapes: usize) {
        let flat = (0..flat_len(n_shapes)).map(|i| i as f64 * 1.5 - 4.0).collect::<Vec<_>>();
        let configuration = unpack_for(&flat, n_shapes).unwrap();
        assert_eq!(configuration.len(), n_shapes);
        assert!(configuration[0].is_identity());
        assert_eq!(pack(&configuration), flat);
    }

    #[test]
    fn anchor_is_dropped_when_packing() {
        let configuration = vec![Pose::new(9.0, 9.0, 9.0), Pose::new(1.0, 2.0, 3.0)];
        assert_eq!(pack(&configuration), vec![1.0, 2.0, 3.0]);
        assert!(unpack(&pack(&configuration)).unwrap()[0].is_identity());
    }

    #[test]
    fn length_not_multiple_of_three() {
        match unpack(&[1.0, 2.0, 3.0, 4.0]) {
            Err(DockError::DimensionMismatch { expected, actual }) => {
                assert_eq!(expected, 3);
                assert_eq!(actual, 4);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn length_not_matching_shape_count() {
        assert!(matches!(
            unpack_for(&[0.0; 6], 2),
            Err(DockError::DimensionMismatch { expected: 3, actual: 6 })
        ));
    }
}
