//! Silhouette: the `n·v = 0` outline, drawn wide and untested.
//!
//! Emitted before everything else so a renderer drawing the mesh afterwards
//! lets the surface hide the inner half of the stroke.

use linedraw_math::Point3;

use crate::isoline::Isoline;
use crate::types::LinePiece;

/// Silhouette segment of one triangle.
pub fn silhouette_face(
    positions: &[Point3],
    ndotv: &[f64],
    tri: [usize; 3],
    emit: &mut impl FnMut(LinePiece),
) {
    Isoline::new(ndotv, 0.0).extract_face(positions, tri, emit);
}
