//! Principal highlights: lines where the view direction is perpendicular
//! to the direction of maximum view-dependent curvature.
//!
//! On a glossy surface lit from the eye these are where highlights
//! stretch along the surface. The ridge flavor lies on convex (`q1 > 0`)
//! regions, the valley flavor on concave ones.

use std::f64::consts::FRAC_1_SQRT_2;

use linedraw_math::{Point3, Vec3};

use crate::ridge::{emit_crossings, RidgeParams};
use crate::types::LinePiece;

/// Convex or concave principal highlights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightFlavor {
    /// `q1 > 0`.
    Ridge,
    /// `q1 < 0`.
    Valley,
}

/// Per-corner inputs of a principal highlight face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightVertex {
    /// Signed maximum view-dependent curvature.
    pub q1: f64,
    /// Its direction in object space (unit).
    pub t1: Vec3,
    /// Unit vector towards the viewer.
    pub view: Vec3,
}

/// Principal highlight segment of one triangle.
///
/// The `t1` of every corner is flipped to agree with the corner of largest
/// `|q1|`; a face whose directions still differ by more than 45° is too
/// twisted to interpolate and is skipped.
pub fn principal_highlight_face(
    p: &[Point3; 3],
    verts: &[HighlightVertex; 3],
    flavor: HighlightFlavor,
    params: &RidgeParams,
    emit: &mut impl FnMut(LinePiece),
) {
    if params.test {
        let wrong_side = |q: f64| match flavor {
            HighlightFlavor::Ridge => q <= 0.0,
            HighlightFlavor::Valley => q >= 0.0,
        };
        if verts.iter().any(|v| wrong_side(v.q1)) {
            return;
        }
    }
    if verts.iter().all(|v| v.q1.abs() < params.thresh) {
        return;
    }

    let reference = (0..3)
        .max_by(|&a, &b| verts[a].q1.abs().total_cmp(&verts[b].q1.abs()))
        .unwrap_or(0);
    let t_ref = verts[reference].t1;

    let mut dot = [0.0; 3];
    for (i, v) in verts.iter().enumerate() {
        let mut t = v.t1;
        if t.dot(&t_ref) < 0.0 {
            t = -t;
        }
        if t.dot(&t_ref) < FRAC_1_SQRT_2 {
            return;
        }
        dot[i] = v.view.dot(&t);
    }

    let z = [
        dot[0] * dot[1] <= 0.0,
        dot[1] * dot[2] <= 0.0,
        dot[2] * dot[0] <= 0.0,
    ];
    let q = verts.map(|v| v.q1);
    emit_crossings(p, &dot, &q, z, params, emit);
}
