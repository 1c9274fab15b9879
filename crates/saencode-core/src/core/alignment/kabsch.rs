use crate::core::utils::geometry::centroid;
use nalgebra::{Matrix3, Point3};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum AlignError {
    #[error("Cannot superpose point sets of different sizes ({reference} vs {target} points)")]
    ShapeMismatch { reference: usize, target: usize },
    #[error("Cannot superpose empty point sets")]
    Empty,
}

/// RMSD between two point sets after optimal rigid superposition (Kabsch).
///
/// Both sets are centered on their own centroid, the rotation minimising the
/// squared deviation is derived from the SVD of the cross-covariance matrix
/// `H = Pᵀ Q`, and the RMSD between the centered `reference` and the rotated,
/// centered `target` is returned. Reflections are excluded through the sign
/// correction on the last singular direction.
///
/// Nearly collinear or coincident inputs make the rotation ill-defined; the
/// result is still finite but may be numerically unstable.
///
/// # Errors
///
/// Returns [`AlignError::ShapeMismatch`] if the point counts differ and
/// [`AlignError::Empty`] if both are empty.
pub fn align(reference: &[Point3<f64>], target: &[Point3<f64>]) -> Result<f64, AlignError> {
    if reference.len() != target.len() {
        return Err(AlignError::ShapeMismatch {
            reference: reference.len(),
            target: target.len(),
        });
    }
    let (Some(p_centroid), Some(q_centroid)) = (centroid(reference), centroid(target)) else {
        return Err(AlignError::Empty);
    };

    let h = reference
        .iter()
        .zip(target)
        .fold(Matrix3::zeros(), |acc, (p, q)| {
            acc + (p - p_centroid) * (q - q_centroid).transpose()
        });

    let rotation = optimal_rotation(h);

    let squared_dist_sum: f64 = reference
        .iter()
        .zip(target)
        .map(|(p, q)| ((p - p_centroid) - rotation * (q - q_centroid)).norm_squared())
        .sum();

    Ok((squared_dist_sum / reference.len() as f64).sqrt())
}

/// Proper rotation `M` maximising `tr(M Hᵀ)`, applied to target vectors as `M q`.
///
/// With `H = U Σ Vᵀ` this is `U E Vᵀ`, where `E = diag(1, 1, d)` and
/// `d = sign(det(V Uᵀ))`; equivalently the row-vector rotation `R = V E Uᵀ`.
fn optimal_rotation(h: Matrix3<f64>) -> Matrix3<f64> {
    let svd = h.svd(true, true);
    let (Some(u), Some(v_t)) = (svd.u, svd.v_t) else {
        return Matrix3::identity();
    };

    let d = (v_t.transpose() * u.transpose()).determinant();
    let mut correction = Matrix3::identity();
    if d < 0.0 {
        correction[(2, 2)] = -1.0;
    }

    u * correction * v_t
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Rotation3, Vector3};

    const TOLERANCE: f64 = 1e-9;

    fn scalene_tetrahedron() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(0.0, 0.0, 3.0),
        ]
    }

    fn helical_fragment() -> Vec<Point3<f64>> {
        (0..4)
            .map(|i| {
                let t = i as f64 * 100f64.to_radians();
                Point3::new(2.3 * t.cos(), 2.3 * t.sin(), 1.5 * i as f64)
            })
            .collect()
    }

    fn transform(points: &[Point3<f64>], rotation: &Rotation3<f64>, shift: Vector3<f64>) -> Vec<Point3<f64>> {
        points.iter().map(|p| rotation * p + shift).collect()
    }

    #[test]
    fn aligning_a_fragment_with_itself_gives_zero() {
        let p = helical_fragment();
        assert!(align(&p, &p).unwrap().abs() < TOLERANCE);
    }

    #[test]
    fn rigid_motion_is_removed_completely() {
        let p = scalene_tetrahedron();
        let rotation = Rotation3::from_euler_angles(0.3, -1.2, 2.5);
        let moved = transform(&p, &rotation, Vector3::new(5.0, -7.0, 11.0));

        assert!(align(&moved, &p).unwrap() < TOLERANCE);
        assert!(align(&p, &moved).unwrap() < TOLERANCE);
    }

    #[test]
    fn alignment_is_symmetric() {
        let p = scalene_tetrahedron();
        let q = helical_fragment();
        let pq = align(&p, &q).unwrap();
        let qp = align(&q, &p).unwrap();
        assert!(pq > 0.1);
        assert!((pq - qp).abs() < TOLERANCE);
    }

    #[test]
    fn scaled_regular_tetrahedron_has_known_rmsd() {
        let p = vec![
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(1.0, -1.0, -1.0),
            Point3::new(-1.0, 1.0, -1.0),
            Point3::new(-1.0, -1.0, 1.0),
        ];
        let q: Vec<_> = p.iter().map(|x| Point3::from(x.coords * 2.0)).collect();
        let rmsd = align(&p, &q).unwrap();
        assert!((rmsd - 3f64.sqrt()).abs() < TOLERANCE);
    }

    #[test]
    fn mirror_image_is_not_superimposed() {
        let p = scalene_tetrahedron();
        let mirrored: Vec<_> = p.iter().map(|x| Point3::new(-x.x, x.y, x.z)).collect();
        assert!(align(&p, &mirrored).unwrap() > 1e-3);
    }

    #[test]
    fn mismatched_point_counts_are_rejected() {
        let p = scalene_tetrahedron();
        assert_eq!(
            align(&p, &p[..3]),
            Err(AlignError::ShapeMismatch {
                reference: 4,
                target: 3
            })
        );
    }

    #[test]
    fn empty_point_sets_are_rejected() {
        assert_eq!(align(&[], &[]), Err(AlignError::Empty));
    }

    #[test]
    fn collinear_points_still_produce_a_finite_value() {
        let line: Vec<_> = (0..4).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect();
        let rmsd = align(&line, &line).unwrap();
        assert!(rmsd.is_finite());
        assert!(rmsd < 1e-6);
    }
}
