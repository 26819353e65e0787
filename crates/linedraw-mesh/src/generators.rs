//! Analytic surfaces with exact differential quantities.
//!
//! Each generator fills positions, normals, principal curvatures,
//! principal directions and curvature derivatives from the closed-form
//! geometry of the surface, so line extraction can be checked against
//! known answers without a curvature estimator in the loop.
//!
//! Curvature sign convention: convex regions (w.r.t. the outward normal)
//! are positive. A sphere of radius `R` has `k1 = k2 = 1/R`.

use std::f64::consts::PI;

use linedraw_math::{Point3, Vec3};

use crate::{CurvatureMesh, VertexFrame};

/// UV sphere centered at the origin.
///
/// `stacks` latitude bands (at least 2) and `slices` longitude segments
/// (at least 3). The poles are single vertices.
pub fn uv_sphere(radius: f64, stacks: usize, slices: usize) -> CurvatureMesh {
    let stacks = stacks.max(2);
    let slices = slices.max(3);
    let k = 1.0 / radius;
    let ring_count = stacks - 1;
    let mut mesh = CurvatureMesh::with_capacity(2 + ring_count * slices, 2 * stacks * slices);

    let north = mesh.push_vertex(VertexFrame {
        position: Point3::new(0.0, 0.0, radius),
        normal: Vec3::z(),
        k1: k,
        k2: k,
        pdir1: Vec3::x(),
        pdir2: Vec3::y(),
        dcurv: [0.0; 4],
    });

    for i in 1..stacks {
        let theta = PI * i as f64 / stacks as f64;
        let (st, ct) = theta.sin_cos();
        for j in 0..slices {
            let phi = 2.0 * PI * j as f64 / slices as f64;
            let (sp, cp) = phi.sin_cos();
            let normal = Vec3::new(st * cp, st * sp, ct);
            mesh.push_vertex(VertexFrame {
                position: Point3::from(normal * radius),
                normal,
                k1: k,
                k2: k,
                // theta-hat x phi-hat = r-hat
                pdir1: Vec3::new(ct * cp, ct * sp, -st),
                pdir2: Vec3::new(-sp, cp, 0.0),
                dcurv: [0.0; 4],
            });
        }
    }

    let south = mesh.push_vertex(VertexFrame {
        position: Point3::new(0.0, 0.0, -radius),
        normal: -Vec3::z(),
        k1: k,
        k2: k,
        pdir1: Vec3::x(),
        pdir2: -Vec3::y(),
        dcurv: [0.0; 4],
    });

    let ring = |i: usize, j: usize| (1 + i * slices + j % slices) as u32;

    for j in 0..slices {
        mesh.push_face(north, ring(0, j), ring(0, j + 1));
    }
    for i in 0..ring_count.saturating_sub(1) {
        for j in 0..slices {
            let (a0, a1) = (ring(i, j), ring(i, j + 1));
            let (b0, b1) = (ring(i + 1, j), ring(i + 1, j + 1));
            mesh.push_face(a0, b0, b1);
            mesh.push_face(a0, b1, a1);
        }
    }
    let last = ring_count - 1;
    for j in 0..slices {
        mesh.push_face(ring(last, j), south, ring(last, j + 1));
    }

    mesh
}

/// Torus around the z axis.
///
/// `major` is the distance from the axis to the tube center, `minor` the
/// tube radius (`minor < major`). `rings` segments around the axis, `sides`
/// segments around the tube.
///
/// The tube curvature `1/minor` is always the larger one; the parallel
/// curvature `cos v / (major + minor cos v)` changes sign between the outer
/// and inner equator, which gives the torus parabolic lines at the top and
/// bottom circles.
pub fn torus(major: f64, minor: f64, rings: usize, sides: usize) -> CurvatureMesh {
    let rings = rings.max(3);
    let sides = sides.max(3);
    let mut mesh = CurvatureMesh::with_capacity(rings * sides, 2 * rings * sides);

    for i in 0..rings {
        let u = 2.0 * PI * i as f64 / rings as f64;
        let (su, cu) = u.sin_cos();
        for j in 0..sides {
            let v = 2.0 * PI * j as f64 / sides as f64;
            let (sv, cv) = v.sin_cos();
            let rho = major + minor * cv;
            // d k2 / d s along the meridian (s = minor * v).
            let dk2 = -major * sv / (minor * rho * rho);
            mesh.push_vertex(VertexFrame {
                position: Point3::new(rho * cu, rho * su, minor * sv),
                normal: Vec3::new(cv * cu, cv * su, sv),
                k1: 1.0 / minor,
                k2: cv / rho,
                pdir1: Vec3::new(-sv * cu, -sv * su, cv),
                pdir2: Vec3::new(su, -cu, 0.0),
                dcurv: [0.0, 0.0, dk2, 0.0],
            });
        }
    }

    let idx = |i: usize, j: usize| ((i % rings) * sides + j % sides) as u32;
    for i in 0..rings {
        for j in 0..sides {
            let (a, b, c, d) = (idx(i, j), idx(i + 1, j), idx(i + 1, j + 1), idx(i, j + 1));
            mesh.push_face(a, b, c);
            mesh.push_face(a, c, d);
        }
    }

    mesh
}

/// Flat square patch in the XY plane facing `+z`.
///
/// Spans `[-size/2, size/2]²` with `n × n` quads split along the
/// `(i, j)–(i+1, j+1)` diagonal. All curvature quantities are zero.
pub fn flat_patch(size: f64, n: usize) -> CurvatureMesh {
    let n = n.max(1);
    let verts = n + 1;
    let mut mesh = CurvatureMesh::with_capacity(verts * verts, 2 * n * n);
    let half = size / 2.0;

    for j in 0..verts {
        for i in 0..verts {
            let x = -half + size * i as f64 / n as f64;
            let y = -half + size * j as f64 / n as f64;
            mesh.push_vertex(VertexFrame {
                position: Point3::new(x, y, 0.0),
                normal: Vec3::z(),
                k1: 0.0,
                k2: 0.0,
                pdir1: Vec3::x(),
                pdir2: Vec3::y(),
                dcurv: [0.0; 4],
            });
        }
    }

    let idx = |i: usize, j: usize| (j * verts + i) as u32;
    for j in 0..n {
        for i in 0..n {
            mesh.push_face(idx(i, j), idx(i + 1, j), idx(i + 1, j + 1));
            mesh.push_face(idx(i, j), idx(i + 1, j + 1), idx(i, j + 1));
        }
    }

    mesh
}
