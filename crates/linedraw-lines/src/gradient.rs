//! Gradient of `kr·sin²θ` for Hermite interpolation.

use linedraw_math::{Point3, Tolerance, Vec3};
use linedraw_mesh::{CurvatureMesh, MeshTopology};
use rayon::prelude::*;

use crate::perview::{PerViewFields, ViewFrame};

/// Gradient of a linear field over a triangle.
///
/// `None` for degenerate (zero-area) triangles.
pub fn face_gradient(p: &[Point3; 3], vals: [f64; 3]) -> Option<Vec3> {
    let normal = (p[1] - p[0]).cross(&(p[2] - p[0]));
    let area2 = normal.norm();
    if Tolerance::DEFAULT.is_zero_length(area2) {
        return None;
    }
    let n = normal / area2;
    // Edge opposite each corner, counter-clockwise.
    let edges = [p[2] - p[1], p[0] - p[2], p[1] - p[0]];
    let grad = (0..3).fold(Vec3::zeros(), |acc, i| acc + n.cross(&edges[i]) * vals[i]);
    Some(grad / area2)
}

/// Gradient of `kr·sin²θ` at vertex `i`, in object space.
///
/// Uses the curvature derivatives and the view geometry in closed form.
/// That form divides by `sin θ`; a vertex seen along its normal instead
/// gets the area-weighted mean of the face gradients of `fields.kr` over
/// its incident triangles.
pub fn gradkr(
    mesh: &CurvatureMesh,
    topology: &MeshTopology,
    viewpos: &Point3,
    fields: &PerViewFields,
    i: usize,
) -> Vec3 {
    let tol = Tolerance::DEFAULT;
    let view = ViewFrame::new(mesh, i, viewpos);
    let dist = (viewpos - mesh.positions[i]).norm();
    let sin2 = view.sin2theta();
    if sin2 < tol.sin2theta || tol.is_zero_length(dist) {
        return averaged_face_gradient(mesh, topology, &fields.kr, i);
    }

    let ndotv = view.ndotv;
    let sintheta = sin2.sqrt();
    let csc = 1.0 / sintheta;
    let rlen = 1.0 / dist;
    let u = view.u * csc;
    let v = view.v * csc;
    let (k1, k2) = (mesh.curv1[i], mesh.curv2[i]);
    let [c0, c1, c2, c3] = mesh.dcurv[i];
    let (pdir1, pdir2) = (mesh.pdir1[i], mesh.pdir2[i]);

    let kr = k1 * u * u + k2 * v * v;
    let tr = u * v * (k2 - k1);
    let kt = k1 * (1.0 - u * u) + k2 * (1.0 - v * v);
    let w = pdir1 * u + pdir2 * v;
    let wperp = pdir2 * u - pdir1 * v;

    let mut g = pdir1 * (u * u * c0 + 2.0 * u * v * c1 + v * v * c2)
        + pdir2 * (u * u * c1 + 2.0 * u * v * c2 + v * v * c3)
        - (wperp * rlen + (w * tr + wperp * kt) * ndotv) * (2.0 * csc * tr);
    g *= sin2;
    g -= (w * kr + wperp * tr) * (2.0 * kr * sintheta * ndotv);
    g
}

/// [`gradkr`] for every vertex.
pub fn gradkr_all(
    mesh: &CurvatureMesh,
    topology: &MeshTopology,
    fields: &PerViewFields,
) -> Vec<Vec3> {
    let viewpos = fields.view_position();
    (0..mesh.vertex_count())
        .into_par_iter()
        .map(|i| gradkr(mesh, topology, &viewpos, fields, i))
        .collect()
}

fn averaged_face_gradient(
    mesh: &CurvatureMesh,
    topology: &MeshTopology,
    field: &[f64],
    i: usize,
) -> Vec3 {
    let mut sum = Vec3::zeros();
    let mut total_area = 0.0;
    for &f in &topology.adjacent_faces[i] {
        let f = f as usize;
        let tri = mesh.face(f);
        let p = mesh.face_positions(f);
        let Some(grad) = face_gradient(&p, tri.map(|v| field[v])) else {
            continue;
        };
        let area = 0.5 * mesh.face_normal(f).norm();
        sum += grad * area;
        total_area += area;
    }
    if total_area > 0.0 {
        sum / total_area
    } else {
        Vec3::zeros()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perview::FieldOptions;
    use approx::assert_relative_eq;
    use linedraw_mesh::generators;

    #[test]
    fn test_face_gradient_of_linear_field() {
        let p = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        // f = 3x - y + 1
        let f = |q: &Point3| 3.0 * q.x - q.y + 1.0;
        let g = face_gradient(&p, [f(&p[0]), f(&p[1]), f(&p[2])]).unwrap();
        assert_relative_eq!(g, Vec3::new(3.0, -1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_face_gradient_degenerate() {
        let p = [Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)];
        assert!(face_gradient(&p, [0.0, 1.0, 2.0]).is_none());
    }

    #[test]
    fn test_flat_patch_has_zero_gradient() {
        let mesh = generators::flat_patch(1.0, 3);
        let topo = MeshTopology::build(&mesh);
        let fields =
            PerViewFields::compute(&mesh, &topo, Point3::new(1.0, 2.0, 3.0), &FieldOptions::default());
        for g in gradkr_all(&mesh, &topo, &fields) {
            assert_relative_eq!(g.norm(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_sphere_gradient_points_along_view() {
        // Umbilic, no curvature derivatives: only the sin²θ term survives,
        // -2 k² sinθ (n·v) w.
        let mesh = generators::uv_sphere(1.0, 8, 16);
        let topo = MeshTopology::build(&mesh);
        let viewpos = Point3::new(0.0, 0.0, 1e6);
        let fields = PerViewFields::compute(&mesh, &topo, viewpos, &FieldOptions::default());
        for i in 1..mesh.vertex_count() - 1 {
            let view = ViewFrame::new(&mesh, i, &viewpos);
            let sintheta = view.sin2theta().sqrt();
            let w = (mesh.pdir1[i] * view.u + mesh.pdir2[i] * view.v) / sintheta;
            let expected = w * (-2.0 * sintheta * view.ndotv);
            let g = gradkr(&mesh, &topo, &viewpos, &fields, i);
            assert_relative_eq!(g, expected, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_head_on_vertex_uses_face_average() {
        let mesh = generators::uv_sphere(1.0, 8, 16);
        let topo = MeshTopology::build(&mesh);
        let viewpos = Point3::new(0.0, 0.0, 5.0);
        let fields = PerViewFields::compute(&mesh, &topo, viewpos, &FieldOptions::default());
        // The north pole looks straight at the viewer; the fan around it
        // is symmetric so the averaged gradient has no sideways component.
        let g = gradkr(&mesh, &topo, &viewpos, &fields, 0);
        assert!(g.iter().all(|c| c.is_finite()));
        assert!(g.x.abs() < 1e-9 && g.y.abs() < 1e-9);
    }
}
