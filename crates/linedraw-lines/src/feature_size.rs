//! Characteristic length of a mesh, used to make thresholds scale-free.

use linedraw_mesh::{CurvatureMesh, MeshError};
use tracing::debug;

use crate::error::{LineError, Result};

/// Percentile of `|k1 k2|` that sets the feature size.
const PERCENTILE: f64 = 0.1;

/// Upper bound on the feature size, as a fraction of the bounding radius.
const MAX_RADIUS_FRACTION: f64 = 0.05;

/// Feature size of `mesh`: `0.01 / sqrt(p)` with `p` the 10th percentile
/// of `|k1 k2|` over all vertices, capped at 5% of the bounding radius.
///
/// A mesh that is flat in at least a tenth of its vertices gets the cap.
/// For a sphere of radius `R` this is `0.01 R`.
pub fn feature_size(mesh: &CurvatureMesh) -> Result<f64> {
    let n = mesh.vertex_count();
    if n == 0 {
        return Err(LineError::EmptyMesh);
    }
    for (attribute, found) in [("curv1", mesh.curv1.len()), ("curv2", mesh.curv2.len())] {
        if found != n {
            return Err(MeshError::LengthMismatch {
                attribute,
                expected: n,
                found,
            }
            .into());
        }
    }

    let mut gaussian: Vec<f64> = mesh
        .curv1
        .iter()
        .zip(&mesh.curv2)
        .map(|(k1, k2)| (k1 * k2).abs())
        .collect();
    let nth = ((n as f64 * PERCENTILE) as usize).min(n - 1);
    let (_, &mut percentile, _) = gaussian.select_nth_unstable_by(nth, f64::total_cmp);

    let radius = mesh.bounding_sphere().map_or(0.0, |s| s.radius);
    let cap = MAX_RADIUS_FRACTION * radius;
    let size = if percentile > 0.0 && percentile.is_finite() {
        (0.01 / percentile.sqrt()).min(cap)
    } else {
        cap
    };

    debug!(percentile, radius, feature_size = size, "Computed feature size");
    if size > 0.0 && size.is_finite() {
        Ok(size)
    } else {
        Err(LineError::EmptyMesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use linedraw_mesh::generators;

    #[test]
    fn test_sphere() {
        for r in [0.5, 1.0, 4.0] {
            let mesh = generators::uv_sphere(r, 8, 16);
            assert_relative_eq!(feature_size(&mesh).unwrap(), 0.01 * r, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_flat_patch_uses_cap() {
        let mesh = generators::flat_patch(2.0, 4);
        let radius = mesh.bounding_sphere().unwrap().radius;
        assert_relative_eq!(feature_size(&mesh).unwrap(), 0.05 * radius, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_mesh() {
        assert_eq!(
            feature_size(&CurvatureMesh::new()),
            Err(LineError::EmptyMesh)
        );
    }

    #[test]
    fn test_curvature_length_mismatch() {
        let mut mesh = generators::uv_sphere(1.0, 6, 12);
        mesh.curv1.truncate(3);
        assert!(matches!(
            feature_size(&mesh),
            Err(LineError::Mesh(MeshError::LengthMismatch {
                attribute: "curv1",
                found: 3,
                ..
            }))
        ));
    }

    #[test]
    fn test_torus_is_bounded_by_cap() {
        // Parabolic circles make |K| small near the top and bottom.
        let mesh = generators::torus(2.0, 0.5, 32, 32);
        let fs = feature_size(&mesh).unwrap();
        let radius = mesh.bounding_sphere().unwrap().radius;
        assert!(fs > 0.0 && fs <= 0.05 * radius + 1e-12);
    }
}
