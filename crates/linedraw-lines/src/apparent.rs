//! Apparent ridges (Judd, Durand and Adelson): maxima of the
//! view-dependent curvature `q1` along its own direction `t1`.

use linedraw_math::{Point3, Vec3};

use crate::gradient::face_gradient;
use crate::ridge::{emit_crossings, RidgeParams};
use crate::types::LinePiece;

/// Per-corner inputs of an apparent ridge face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApparentVertex {
    /// Signed maximum view-dependent curvature.
    pub q1: f64,
    /// Its direction in object space.
    pub t1: Vec3,
    /// Derivative of `q1` along `t1`.
    pub dt1q1: f64,
}

/// Apparent ridge segment of one triangle.
///
/// `t1` is a line field, so the sign of `dt1q1` is only meaningful
/// relative to the orientation of `t1`: on an edge whose `t1` agree the
/// derivative must change sign, on one whose `t1` disagree it must not.
/// With `params.test` set, the segment is kept only where `|q1|` is a
/// maximum, i.e. where the derivative decreases along `t1` for `q1 > 0`
/// and increases for `q1 < 0`.
pub fn apparent_ridge_face(
    p: &[Point3; 3],
    verts: &[ApparentVertex; 3],
    params: &RidgeParams,
    emit: &mut impl FnMut(LinePiece),
) {
    if verts.iter().all(|v| v.q1.abs() < params.thresh) {
        return;
    }

    let crosses = |a: usize, b: usize| {
        let (va, vb) = (&verts[a], &verts[b]);
        if va.t1.dot(&vb.t1) >= 0.0 {
            va.dt1q1 * vb.dt1q1 <= 0.0
        } else {
            va.dt1q1 * vb.dt1q1 >= 0.0
        }
    };
    let z = [crosses(0, 1), crosses(1, 2), crosses(2, 0)];
    if z.iter().filter(|&&c| c).count() < 2 {
        return;
    }

    // Orient every corner against corner 0.
    let mut t = verts.map(|v| v.t1);
    let mut e = verts.map(|v| v.dt1q1);
    for i in 1..3 {
        if t[i].dot(&t[0]) < 0.0 {
            t[i] = -t[i];
            e[i] = -e[i];
        }
    }

    if params.test {
        let Some(grad) = face_gradient(p, e) else {
            return;
        };
        let direction = t[0] + t[1] + t[2];
        let q_mean = verts.iter().map(|v| v.q1).sum::<f64>() / 3.0;
        if q_mean * grad.dot(&direction) >= 0.0 {
            return;
        }
    }

    let q = verts.map(|v| v.q1);
    emit_crossings(p, &e, &q, z, params, emit);
}
