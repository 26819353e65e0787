//! Per-vertex view-dependent fields.
//!
//! Everything a frame's extractors read that depends on the viewer lives in
//! [`PerViewFields`]: `n·v`, radial curvature, the suggestive contour and
//! highlight tests, and the view-dependent curvature of apparent ridges.
//! The buffer is meant to be kept across frames and refilled with
//! [`PerViewFields::compute_into`], which only reallocates when the vertex
//! count changes.
//!
//! Each array is filled in parallel; every worker writes its own element
//! and reads only the mesh.

use linedraw_math::{try_normalize, Point3, Tolerance, Vec2, Vec3};
use linedraw_mesh::{CurvatureMesh, MeshTopology};
use rayon::prelude::*;
use tracing::debug;

/// Optional field groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldNeeds {
    /// `sctest_num`, `sctest_den`, `shtest_num`.
    pub suggestive: bool,
    /// `q1`, `t1`, `dt1q1`.
    pub apparent: bool,
}

impl FieldNeeds {
    /// Every group.
    pub const ALL: Self = Self {
        suggestive: true,
        apparent: true,
    };

    /// Whether `self` covers every group of `other`.
    pub fn covers(&self, other: &FieldNeeds) -> bool {
        (self.suggestive || !other.suggestive) && (self.apparent || !other.apparent)
    }
}

/// Inputs of a field computation besides the mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldOptions {
    /// Groups to compute.
    pub needs: FieldNeeds,
    /// Suggestive contour threshold, already divided by `fs²`.
    pub sc_thresh: f64,
    /// Suggestive highlight threshold, already divided by `fs²`.
    pub sh_thresh: f64,
    /// Multiply the suggestive numerator by `sin²θ`.
    pub extra_sin2theta: bool,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            needs: FieldNeeds::default(),
            sc_thresh: 0.0,
            sh_thresh: 0.0,
            extra_sin2theta: false,
        }
    }
}

/// Frame-scoped per-vertex fields, indexed by vertex id.
#[derive(Debug, Clone)]
pub struct PerViewFields {
    /// `n·v` with `v` the unit vector towards the viewer.
    pub ndotv: Vec<f64>,
    /// Radial curvature times `sin²θ`: `k1 u² + k2 v²`.
    pub kr: Vec<f64>,
    /// Suggestive contour test numerator, threshold subtracted.
    pub sctest_num: Vec<f64>,
    /// Denominator shared by the suggestive contour and highlight tests.
    pub sctest_den: Vec<f64>,
    /// Suggestive highlight test numerator, threshold subtracted.
    pub shtest_num: Vec<f64>,
    /// Signed maximum view-dependent curvature.
    pub q1: Vec<f64>,
    /// Direction of `q1` in the `(pdir1, pdir2)` basis.
    pub t1: Vec<Vec2>,
    /// Derivative of `q1` along `t1`, projected to the image plane.
    pub dt1q1: Vec<f64>,
    viewpos: Point3,
    computed: FieldNeeds,
}

impl Default for PerViewFields {
    fn default() -> Self {
        Self {
            ndotv: Vec::new(),
            kr: Vec::new(),
            sctest_num: Vec::new(),
            sctest_den: Vec::new(),
            shtest_num: Vec::new(),
            q1: Vec::new(),
            t1: Vec::new(),
            dt1q1: Vec::new(),
            viewpos: Point3::origin(),
            computed: FieldNeeds::default(),
        }
    }
}

impl PerViewFields {
    /// Empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute fields for a fresh buffer.
    pub fn compute(
        mesh: &CurvatureMesh,
        topology: &MeshTopology,
        viewpos: Point3,
        options: &FieldOptions,
    ) -> Self {
        let mut fields = Self::new();
        fields.compute_into(mesh, topology, viewpos, options);
        fields
    }

    /// Recompute in place, reusing allocations.
    ///
    /// Groups not requested are cleared and reported missing by
    /// [`computed`](Self::computed).
    pub fn compute_into(
        &mut self,
        mesh: &CurvatureMesh,
        topology: &MeshTopology,
        viewpos: Point3,
        options: &FieldOptions,
    ) {
        let n = mesh.vertex_count();
        self.viewpos = viewpos;
        self.computed = options.needs;

        self.ndotv.resize(n, 0.0);
        self.kr.resize(n, 0.0);
        self.ndotv
            .par_iter_mut()
            .zip(self.kr.par_iter_mut())
            .enumerate()
            .for_each(|(i, (ndotv, kr))| {
                let view = ViewFrame::new(mesh, i, &viewpos);
                *ndotv = view.ndotv;
                *kr = mesh.curv1[i] * view.u * view.u + mesh.curv2[i] * view.v * view.v;
            });

        if options.needs.suggestive {
            self.sctest_num.resize(n, 0.0);
            self.sctest_den.resize(n, 0.0);
            self.shtest_num.resize(n, 0.0);
            self.sctest_num
                .par_iter_mut()
                .zip(self.sctest_den.par_iter_mut())
                .zip(self.shtest_num.par_iter_mut())
                .enumerate()
                .for_each(|(i, ((sc_num, den), sh_num))| {
                    let view = ViewFrame::new(mesh, i, &viewpos);
                    let test = suggestive_test(mesh, i, &view, options);
                    *sc_num = test.sc_num;
                    *den = test.den;
                    *sh_num = test.sh_num;
                });
        } else {
            self.sctest_num.clear();
            self.sctest_den.clear();
            self.shtest_num.clear();
        }

        if options.needs.apparent {
            self.q1.resize(n, 0.0);
            self.t1.resize(n, Vec2::zeros());
            self.q1
                .par_iter_mut()
                .zip(self.t1.par_iter_mut())
                .enumerate()
                .for_each(|(i, (q1, t1))| {
                    let view = ViewFrame::new(mesh, i, &viewpos);
                    (*q1, *t1) = view_dependent_curvature(mesh.curv1[i], mesh.curv2[i], &view);
                });

            self.dt1q1.resize(n, 0.0);
            let (q1, t1, ndotv) = (&self.q1, &self.t1, &self.ndotv);
            self.dt1q1.par_iter_mut().enumerate().for_each(|(i, d)| {
                *d = dt1q1_at(mesh, topology, q1, t1, ndotv, i);
            });
        } else {
            self.q1.clear();
            self.t1.clear();
            self.dt1q1.clear();
        }

        debug!(
            vertices = n,
            suggestive = options.needs.suggestive,
            apparent = options.needs.apparent,
            "Computed per-view fields"
        );
    }

    /// Groups filled by the last computation.
    pub fn computed(&self) -> FieldNeeds {
        self.computed
    }

    /// Viewer position of the last computation.
    pub fn view_position(&self) -> Point3 {
        self.viewpos
    }

    /// Number of vertices covered.
    pub fn vertex_count(&self) -> usize {
        self.ndotv.len()
    }
}

/// View vector of one vertex decomposed in its principal frame.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ViewFrame {
    /// Unit vector towards the viewer.
    pub w: Vec3,
    pub ndotv: f64,
    /// `w·pdir1`.
    pub u: f64,
    /// `w·pdir2`.
    pub v: f64,
}

impl ViewFrame {
    /// A viewer sitting on the vertex looks along the normal.
    pub fn new(mesh: &CurvatureMesh, i: usize, viewpos: &Point3) -> Self {
        let normal = mesh.normals[i];
        let w = try_normalize(&(viewpos - mesh.positions[i])).unwrap_or(normal);
        Self {
            w,
            ndotv: normal.dot(&w),
            u: w.dot(&mesh.pdir1[i]),
            v: w.dot(&mesh.pdir2[i]),
        }
    }

    /// `u² + v²`, the squared length of the projected view vector.
    pub fn sin2theta(&self) -> f64 {
        self.u * self.u + self.v * self.v
    }
}

struct SuggestiveTest {
    sc_num: f64,
    den: f64,
    sh_num: f64,
}

/// Directional derivative of radial curvature along the projected view
/// direction, minus the view-dependent torsion term.
///
/// A vertex seen along its normal has no projected view direction; its
/// numerators are zero so the test fails there.
fn suggestive_test(
    mesh: &CurvatureMesh,
    i: usize,
    view: &ViewFrame,
    options: &FieldOptions,
) -> SuggestiveTest {
    let den = view.ndotv;
    let sin2 = view.sin2theta();
    if sin2 < Tolerance::DEFAULT.sin2theta {
        return SuggestiveTest {
            sc_num: 0.0,
            den,
            sh_num: 0.0,
        };
    }

    let (u, v) = (view.u, view.v);
    let (u2, v2) = (u * u, v * v);
    let csc2 = 1.0 / sin2;
    let [c0, c1, c2, c3] = mesh.dcurv[i];

    let mut num = csc2 * (u2 * (u * c0 + 3.0 * v * c1) + v2 * (3.0 * u * c2 + v * c3));
    let tr = (mesh.curv2[i] - mesh.curv1[i]) * u * v * csc2;
    num -= 2.0 * view.ndotv * tr * tr;
    if options.extra_sin2theta {
        num *= sin2;
    }

    SuggestiveTest {
        sc_num: num - options.sc_thresh * den,
        den,
        sh_num: -num - options.sh_thresh * den,
    }
}

/// Largest view-dependent curvature and its direction.
///
/// The view-dependent shape operator is `Q = S P⁻¹`, with `P` the
/// projection of the tangent plane onto the image plane. `|q1|` is the
/// largest singular value of `Q`, `t1` the matching right singular vector
/// in the `(pdir1, pdir2)` basis, and `q1` carries the sign of `t1ᵀ Q t1`.
///
/// When `QᵀQ` is isotropic every direction is an eigenvector; `t1` falls
/// back to `pdir1` and `q1` to the Rayleigh quotient along it.
pub(crate) fn view_dependent_curvature(k1: f64, k2: f64, view: &ViewFrame) -> (f64, Vec2) {
    let tol = Tolerance::DEFAULT;
    let sin2 = view.sin2theta();
    let (u2, uv, v2) = if sin2 > tol.sin2theta {
        let csc2 = 1.0 / sin2;
        (view.u * view.u * csc2, view.u * view.v * csc2, view.v * view.v * csc2)
    } else {
        (1.0, 0.0, 0.0)
    };

    let sec_minus_1 = 1.0 / view.ndotv.abs().max(tol.ndotv) - 1.0;
    let q11 = k1 * (1.0 + sec_minus_1 * u2);
    let q12 = k1 * sec_minus_1 * uv;
    let q21 = k2 * sec_minus_1 * uv;
    let q22 = k2 * (1.0 + sec_minus_1 * v2);

    let qtq11 = q11 * q11 + q21 * q21;
    let qtq12 = q11 * q12 + q21 * q22;
    let qtq22 = q12 * q12 + q22 * q22;

    let mean = 0.5 * (qtq11 + qtq22);
    let half_diff = 0.5 * (qtq11 - qtq22);
    let radius = (half_diff * half_diff + qtq12 * qtq12).sqrt();
    let lambda = mean + radius;

    let rayleigh = |t: &Vec2| t.x * (q11 * t.x + q12 * t.y) + t.y * (q21 * t.x + q22 * t.y);

    if radius <= 1e-12 * mean.abs().max(f64::MIN_POSITIVE) {
        let t1 = Vec2::new(1.0, 0.0);
        return (rayleigh(&t1), t1);
    }

    // Eigenvector of the larger eigenvalue from whichever row is better
    // conditioned.
    let raw = if qtq11 >= qtq22 {
        Vec2::new(lambda - qtq22, qtq12)
    } else {
        Vec2::new(qtq12, lambda - qtq11)
    };
    let len = raw.norm();
    let t1 = if len > 0.0 { raw / len } else { Vec2::new(1.0, 0.0) };

    let magnitude = lambda.max(0.0).sqrt();
    let q1 = if rayleigh(&t1) < 0.0 { -magnitude } else { magnitude };
    (q1, t1)
}

/// World-space `t1` of vertex `i`.
#[inline]
pub(crate) fn world_t1(mesh: &CurvatureMesh, t1: &[Vec2], i: usize) -> Vec3 {
    mesh.pdir1[i] * t1[i].x + mesh.pdir2[i] * t1[i].y
}

/// Derivative of `q1` along `t1` at vertex `i`.
///
/// In each incident face, the line through the vertex along `t1` meets the
/// opposite edge; `q1` interpolated there gives a finite difference. The
/// distance is foreshortened by `|n·v|` so the derivative is measured in
/// the image plane. The first two estimates are averaged; a vertex with
/// none (e.g. `t1` points off a boundary) gets 0.
fn dt1q1_at(
    mesh: &CurvatureMesh,
    topology: &MeshTopology,
    q1: &[f64],
    t1: &[Vec2],
    ndotv: &[f64],
    i: usize,
) -> f64 {
    let v0 = mesh.positions[i];
    let this_t1 = world_t1(mesh, t1, i);
    let t2 = mesh.normals[i].cross(&this_t1);
    let foreshortening = ndotv[i].abs();

    let mut sum = 0.0;
    let mut count = 0;
    // Adjacency of another mesh yields no estimate instead of reading out of range.
    let faces = topology.adjacent_faces.get(i).map_or(&[][..], Vec::as_slice);
    for &f in faces {
        if f as usize >= mesh.face_count() {
            continue;
        }
        let tri = mesh.face(f as usize);
        let Some(corner) = tri.iter().position(|&v| v == i) else {
            continue;
        };
        let i1 = tri[(corner + 1) % 3];
        let i2 = tri[(corner + 2) % 3];
        let v1 = mesh.positions[i1];
        let v2 = mesh.positions[i2];

        // Where does the t1 line cross the opposite edge?
        let d0 = v0.coords.dot(&t2);
        let d1 = v1.coords.dot(&t2);
        let d2 = v2.coords.dot(&t2);
        let w1 = (d2 - d0) / (d2 - d1);
        if !w1.is_finite() || !(0.0..1.0).contains(&w1) {
            continue;
        }

        let p = Point3::from(v1.coords * w1 + v2.coords * (1.0 - w1));
        let opposite = w1 * q1[i1] + (1.0 - w1) * q1[i2];
        let dist = (p - v0).dot(&this_t1) * foreshortening;
        if dist.abs() < Tolerance::DEFAULT.linear {
            continue;
        }

        sum += (opposite - q1[i]) / dist;
        count += 1;
        if count == 2 {
            break;
        }
    }

    match count {
        0 => 0.0,
        n => sum / n as f64,
    }
}
