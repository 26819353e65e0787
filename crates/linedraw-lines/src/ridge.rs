//! Ridges and valleys: extrema of principal curvature along its own
//! principal direction (Ohtake, Belyaev and Seidel).
//!
//! Each vertex carries `tmax`, the principal direction flipped to point
//! towards increasing `|k|`. A face edge contains an extremum when the
//! `tmax` at its ends point against each other. The same crossing rules,
//! with other per-vertex inputs, drive apparent ridges and principal
//! highlights.

use linedraw_math::{Point3, Vec3};
use linedraw_mesh::CurvatureMesh;
use tracing::debug;

use crate::types::LinePiece;
use crate::zero::{lerp, lerp_point};

/// Which principal curvature extremum to trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RidgeFlavor {
    /// Maxima of `k1 > 0` along `pdir1`.
    Ridge,
    /// Minima of `k2 < 0` along `pdir2`.
    Valley,
}

impl RidgeFlavor {
    fn sign(&self) -> f64 {
        match self {
            RidgeFlavor::Ridge => 1.0,
            RidgeFlavor::Valley => -1.0,
        }
    }

    /// Crossing inputs of vertex `v`, straight from the mesh.
    pub fn vertex(&self, mesh: &CurvatureMesh, v: usize) -> RidgeVertex {
        let (k, e, dir) = match self {
            RidgeFlavor::Ridge => (mesh.curv1[v], mesh.dcurv[v][0], mesh.pdir1[v]),
            RidgeFlavor::Valley => (mesh.curv2[v], mesh.dcurv[v][3], mesh.pdir2[v]),
        };
        RidgeVertex {
            k,
            e,
            tmax: dir * (self.sign() * e),
        }
    }
}

/// Per-vertex inputs of the ridge crossing test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RidgeVertex {
    /// Curvature being traced.
    pub k: f64,
    /// Its derivative along its principal direction.
    pub e: f64,
    /// Principal direction oriented towards increasing `|k|`.
    pub tmax: Vec3,
}

/// Ridge and valley inputs for every vertex.
///
/// Ridges and valleys do not depend on the view, so an interactive caller
/// can build this once per mesh. Extraction through the cache gives the
/// same segments as reading the mesh directly.
#[derive(Debug, Clone, Default)]
pub struct RidgeCache {
    ridge: Vec<RidgeVertex>,
    valley: Vec<RidgeVertex>,
}

impl RidgeCache {
    /// Precompute both flavors.
    pub fn build(mesh: &CurvatureMesh) -> Self {
        let n = mesh.vertex_count();
        let ridge = (0..n).map(|v| RidgeFlavor::Ridge.vertex(mesh, v)).collect();
        let valley = (0..n).map(|v| RidgeFlavor::Valley.vertex(mesh, v)).collect();
        debug!(vertices = n, "Built ridge cache");
        Self { ridge, valley }
    }

    /// Cached inputs of vertex `v`.
    pub fn vertex(&self, flavor: RidgeFlavor, v: usize) -> RidgeVertex {
        match flavor {
            RidgeFlavor::Ridge => self.ridge[v],
            RidgeFlavor::Valley => self.valley[v],
        }
    }

    /// Number of vertices covered.
    pub fn vertex_count(&self) -> usize {
        self.ridge.len()
    }
}

/// Threshold and style of ridge-like lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RidgeParams {
    /// Minimum `|k|`, already scaled by the feature size.
    pub thresh: f64,
    /// Require the extremum test.
    pub test: bool,
    /// Fade as `k/(k + thresh)`.
    pub fade: bool,
}

/// Ridge or valley segment of one triangle.
///
/// Ridges need `k1 > 0` and valleys `k2 < 0` at all three corners.
pub fn ridge_face(
    p: &[Point3; 3],
    verts: &[RidgeVertex; 3],
    flavor: RidgeFlavor,
    params: &RidgeParams,
    emit: &mut impl FnMut(LinePiece),
) {
    let sign = flavor.sign();
    if verts.iter().any(|v| sign * v.k <= 0.0) {
        return;
    }

    let t = verts.map(|v| v.tmax);
    let mut z = [
        t[0].dot(&t[1]) <= 0.0,
        t[1].dot(&t[2]) <= 0.0,
        t[2].dot(&t[0]) <= 0.0,
    ];
    if params.test {
        // Both ends must point towards the crossing.
        for (edge, zz) in z.iter_mut().enumerate() {
            let (a, b) = (edge, (edge + 1) % 3);
            *zz &= t[a].dot(&(p[b] - p[a])) >= 0.0 || t[b].dot(&(p[a] - p[b])) >= 0.0;
        }
    }

    let e = verts.map(|v| v.e);
    let k = verts.map(|v| v.k);
    emit_crossings(p, &e, &k, z, params, emit);
}

/// Connect the edges flagged in `z` (edge `j` joins corners `j` and
/// `j + 1`). Two crossings are joined directly, three meet at the
/// centroid, fewer give nothing.
pub(crate) fn emit_crossings(
    p: &[Point3; 3],
    e: &[f64; 3],
    k: &[f64; 3],
    z: [bool; 3],
    params: &RidgeParams,
    emit: &mut impl FnMut(LinePiece),
) {
    let mut segment = |order: [usize; 3], to_center: bool| {
        if let Some(piece) = crossing_segment(p, e, k, order, to_center, params) {
            emit(piece);
        }
    };
    match z {
        [false, true, true] => segment([1, 2, 0], false),
        [true, false, true] => segment([2, 0, 1], false),
        [true, true, false] => segment([0, 1, 2], false),
        [true, true, true] => {
            segment([0, 1, 2], true);
            segment([1, 2, 0], true);
            segment([2, 0, 1], true);
        }
        _ => {}
    }
}

/// From the crossing on edge `v0–v1` to the one on `v1–v2`, or to the
/// centroid.
fn crossing_segment(
    p: &[Point3; 3],
    e: &[f64; 3],
    k: &[f64; 3],
    [v0, v1, v2]: [usize; 3],
    to_center: bool,
    params: &RidgeParams,
) -> Option<LinePiece> {
    let w01 = weight(e[v0], e[v1]);
    let start = lerp_point(&p[v0], &p[v1], w01);
    let k_start = lerp(k[v0], k[v1], w01).abs();

    let (end, k_end) = if to_center {
        let centroid = Point3::from((p[0].coords + p[1].coords + p[2].coords) / 3.0);
        (centroid, (k[0] + k[1] + k[2]).abs() / 3.0)
    } else {
        let w12 = weight(e[v1], e[v2]);
        (
            lerp_point(&p[v1], &p[v2], w12),
            lerp(k[v1], k[v2], w12).abs(),
        )
    };

    let strength_start = (k_start - params.thresh).max(0.0);
    let strength_end = (k_end - params.thresh).max(0.0);
    if strength_start == 0.0 && strength_end == 0.0 {
        return None;
    }

    let alpha = if params.fade {
        [strength_start, strength_end].map(|s| s / (s + params.thresh))
    } else {
        [1.0, 1.0]
    };
    Some(LinePiece {
        alpha,
        ..LinePiece::visible(start, end)
    })
}

/// Position of the zero of `e` between two ends, from magnitudes only.
#[inline]
fn weight(ea: f64, eb: f64) -> f64 {
    let (a, b) = (ea.abs(), eb.abs());
    if a + b > 0.0 {
        a / (a + b)
    } else {
        0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use linedraw_mesh::generators;

    fn tri() -> [Point3; 3] {
        [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    fn collect(verts: &[RidgeVertex; 3], flavor: RidgeFlavor, params: &RidgeParams) -> Vec<LinePiece> {
        let mut out = Vec::new();
        ridge_face(&tri(), verts, flavor, params, &mut |p| out.push(p));
        out
    }

    /// Derivative `-8 (x - 0.3)`: a maximum at x = 0.3, unit curvature.
    fn ridge_across_x() -> [RidgeVertex; 3] {
        tri().map(|p| {
            let e = -8.0 * (p.x - 0.3);
            RidgeVertex {
                k: 1.0,
                e,
                tmax: Vec3::x() * e,
            }
        })
    }

    #[test]
    fn test_ridge_crossing_position() {
        let params = RidgeParams {
            thresh: 0.0,
            test: true,
            fade: false,
        };
        let pieces = collect(&ridge_across_x(), RidgeFlavor::Ridge, &params);
        assert_eq!(pieces.len(), 1);
        for p in [pieces[0].p0, pieces[0].p1] {
            assert_relative_eq!(p.x, 0.3, epsilon = 1e-12);
        }
        assert_eq!(pieces[0].alpha, [1.0, 1.0]);
    }

    #[test]
    fn test_below_threshold_emits_nothing() {
        let params = RidgeParams {
            thresh: 1.5,
            test: true,
            fade: true,
        };
        assert!(collect(&ridge_across_x(), RidgeFlavor::Ridge, &params).is_empty());
    }

    #[test]
    fn test_fade_alpha() {
        let params = RidgeParams {
            thresh: 0.5,
            test: true,
            fade: true,
        };
        let pieces = collect(&ridge_across_x(), RidgeFlavor::Ridge, &params);
        assert_eq!(pieces.len(), 1);
        // k = 1 at the crossing: (1 - 0.5) / (0.5 + 0.5).
        assert_relative_eq!(pieces[0].alpha[0], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_minimum_is_not_a_ridge() {
        // tmax pointing away from the crossing on both sides.
        let verts = ridge_across_x().map(|v| RidgeVertex {
            tmax: -v.tmax,
            ..v
        });
        let params = RidgeParams {
            thresh: 0.0,
            test: true,
            fade: false,
        };
        assert!(collect(&verts, RidgeFlavor::Ridge, &params).is_empty());
        let untested = RidgeParams {
            test: false,
            ..params
        };
        assert_eq!(collect(&verts, RidgeFlavor::Ridge, &untested).len(), 1);
    }

    #[test]
    fn test_ridge_needs_positive_curvature() {
        let verts = ridge_across_x().map(|v| RidgeVertex { k: -v.k, ..v });
        let params = RidgeParams {
            thresh: 0.0,
            test: false,
            fade: false,
        };
        assert!(collect(&verts, RidgeFlavor::Ridge, &params).is_empty());
        // The same corners with negative curvature qualify as a valley.
        assert_eq!(collect(&verts, RidgeFlavor::Valley, &params).len(), 1);
    }

    #[test]
    fn test_three_crossings_meet_at_centroid() {
        let p = tri();
        let z = [true, true, true];
        let params = RidgeParams {
            thresh: 0.0,
            test: false,
            fade: false,
        };
        let mut out = Vec::new();
        emit_crossings(&p, &[1.0, -1.0, 1.0], &[1.0; 3], z, &params, &mut |s| out.push(s));
        assert_eq!(out.len(), 3);
        let centroid = Point3::new(1.0 / 3.0, 1.0 / 3.0, 0.0);
        for s in out {
            assert_relative_eq!(s.p1, centroid, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_cache_matches_mesh() {
        let mesh = generators::torus(2.0, 0.5, 12, 8);
        let cache = RidgeCache::build(&mesh);
        assert_eq!(cache.vertex_count(), mesh.vertex_count());
        for v in 0..mesh.vertex_count() {
            for flavor in [RidgeFlavor::Ridge, RidgeFlavor::Valley] {
                assert_eq!(cache.vertex(flavor, v), flavor.vertex(&mesh, v));
            }
        }
    }

    #[test]
    fn test_valley_tmax_points_downhill() {
        let mesh = generators::torus(2.0, 0.5, 12, 8);
        for v in 0..mesh.vertex_count() {
            let rv = RidgeFlavor::Valley.vertex(&mesh, v);
            assert_relative_eq!(rv.tmax, -mesh.pdir2[v] * mesh.dcurv[v][3], epsilon = 1e-15);
        }
    }
}
