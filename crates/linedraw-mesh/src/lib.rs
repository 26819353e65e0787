#![warn(missing_docs)]

//! Curvature-annotated triangle meshes for the linedraw feature-line extractor.
//!
//! The line extractors never estimate curvature themselves. They consume a
//! [`CurvatureMesh`] whose vertices already carry a unit normal, the two
//! principal curvatures, the principal directions and the derivatives of
//! curvature. This crate holds that layout, the adjacency queries built on
//! top of it ([`MeshTopology`]) and a few analytic surfaces with exact
//! differential quantities ([`generators`]).
//!
//! # Example
//!
//! ```
//! use linedraw_mesh::{generators, MeshTopology};
//!
//! let mesh = generators::uv_sphere(1.0, 16, 32);
//! mesh.validate().unwrap();
//! let topo = MeshTopology::build(&mesh);
//! assert_eq!(topo.boundary_edges(&mesh).count(), 0);
//! ```

pub mod error;
pub mod generators;
pub mod topology;

pub use error::{MeshError, Result};
pub use topology::MeshTopology;

use linedraw_math::{Point3, Vec3};

/// Differential quantities of a single vertex.
///
/// Convenience record for building a [`CurvatureMesh`] vertex by vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexFrame {
    /// Position.
    pub position: Point3,
    /// Unit outward normal.
    pub normal: Vec3,
    /// Maximum principal curvature.
    pub k1: f64,
    /// Minimum principal curvature.
    pub k2: f64,
    /// Direction of `k1`.
    pub pdir1: Vec3,
    /// Direction of `k2`; `pdir1 × pdir2 == normal`.
    pub pdir2: Vec3,
    /// Curvature derivative tensor `(C111, C112, C122, C222)` in the
    /// `(pdir1, pdir2)` basis.
    pub dcurv: [f64; 4],
}

impl VertexFrame {
    /// Reorder so that `k1 >= k2`.
    ///
    /// Swapping rotates the tangent frame by 90° (`pdir1' = pdir2`,
    /// `pdir2' = -pdir1`), which keeps it right-handed and permutes the
    /// derivative tensor accordingly.
    pub fn sorted(self) -> Self {
        if self.k1 >= self.k2 {
            return self;
        }
        let [c111, c112, c122, c222] = self.dcurv;
        Self {
            k1: self.k2,
            k2: self.k1,
            pdir1: self.pdir2,
            pdir2: -self.pdir1,
            dcurv: [c222, -c122, c112, -c111],
            ..self
        }
    }
}

/// A triangle mesh with per-vertex curvature information.
///
/// All per-vertex arrays are parallel and indexed by vertex id. Faces are
/// counter-clockwise when seen from the side the normals point to.
#[derive(Debug, Clone, Default)]
pub struct CurvatureMesh {
    /// Vertex positions.
    pub positions: Vec<Point3>,
    /// Unit vertex normals.
    pub normals: Vec<Vec3>,
    /// Maximum principal curvature per vertex.
    pub curv1: Vec<f64>,
    /// Minimum principal curvature per vertex (`curv2[i] <= curv1[i]`).
    pub curv2: Vec<f64>,
    /// Principal direction of `curv1`.
    pub pdir1: Vec<Vec3>,
    /// Principal direction of `curv2`.
    pub pdir2: Vec<Vec3>,
    /// Curvature derivatives `(C111, C112, C122, C222)`.
    pub dcurv: Vec<[f64; 4]>,
    /// Triangle vertex indices.
    pub faces: Vec<[u32; 3]>,
}

impl CurvatureMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty mesh with room for the given element counts.
    pub fn with_capacity(vertices: usize, faces: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
            curv1: Vec::with_capacity(vertices),
            curv2: Vec::with_capacity(vertices),
            pdir1: Vec::with_capacity(vertices),
            pdir2: Vec::with_capacity(vertices),
            dcurv: Vec::with_capacity(vertices),
            faces: Vec::with_capacity(faces),
        }
    }

    /// Append a vertex, returning its index.
    pub fn push_vertex(&mut self, v: VertexFrame) -> u32 {
        let v = v.sorted();
        let index = self.positions.len() as u32;
        self.positions.push(v.position);
        self.normals.push(v.normal);
        self.curv1.push(v.k1);
        self.curv2.push(v.k2);
        self.pdir1.push(v.pdir1);
        self.pdir2.push(v.pdir2);
        self.dcurv.push(v.dcurv);
        index
    }

    /// Append a face.
    pub fn push_face(&mut self, a: u32, b: u32, c: u32) {
        self.faces.push([a, b, c]);
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of faces.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Vertex indices of face `f` as `usize`.
    #[inline]
    pub fn face(&self, f: usize) -> [usize; 3] {
        let [a, b, c] = self.faces[f];
        [a as usize, b as usize, c as usize]
    }

    /// Corner positions of face `f`.
    pub fn face_positions(&self, f: usize) -> [Point3; 3] {
        self.face(f).map(|v| self.positions[v])
    }

    /// Unnormalized face normal (twice the area, oriented by winding).
    pub fn face_normal(&self, f: usize) -> Vec3 {
        let [p0, p1, p2] = self.face_positions(f);
        (p1 - p0).cross(&(p2 - p0))
    }

    /// Check that all arrays agree in length and all face indices are valid.
    pub fn validate(&self) -> Result<()> {
        let n = self.positions.len();
        if n == 0 || self.faces.is_empty() {
            return Err(MeshError::Empty);
        }
        let lengths = [
            ("normals", self.normals.len()),
            ("curv1", self.curv1.len()),
            ("curv2", self.curv2.len()),
            ("pdir1", self.pdir1.len()),
            ("pdir2", self.pdir2.len()),
            ("dcurv", self.dcurv.len()),
        ];
        for (attribute, found) in lengths {
            if found != n {
                return Err(MeshError::LengthMismatch {
                    attribute,
                    expected: n,
                    found,
                });
            }
        }
        for (face, tri) in self.faces.iter().enumerate() {
            if let Some(&vertex) = tri.iter().find(|&&v| v as usize >= n) {
                return Err(MeshError::IndexOutOfRange {
                    face,
                    vertex,
                    vertex_count: n,
                });
            }
        }
        Ok(())
    }

    /// Axis-aligned bounds, or `None` for an empty mesh.
    pub fn bounding_box(&self) -> Option<(Point3, Point3)> {
        let first = *self.positions.first()?;
        let (min, max) = self
            .positions
            .iter()
            .fold((first, first), |(lo, hi), p| (lo.inf(p), hi.sup(p)));
        Some((min, max))
    }

    /// Bounding sphere centered on the bounding-box center.
    pub fn bounding_sphere(&self) -> Option<BoundingSphere> {
        let (min, max) = self.bounding_box()?;
        let center = midpoint(&min, &max);
        let radius = self
            .positions
            .iter()
            .map(|p| (p - center).norm())
            .fold(0.0, f64::max);
        Some(BoundingSphere { center, radius })
    }
}

fn midpoint(min: &Point3, max: &Point3) -> Point3 {
    Point3::from((min.coords + max.coords) * 0.5)
}

/// A sphere enclosing every vertex of a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// Center point.
    pub center: Point3,
    /// Radius.
    pub radius: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn frame(k1: f64, k2: f64) -> VertexFrame {
        VertexFrame {
            position: Point3::origin(),
            normal: Vec3::z(),
            k1,
            k2,
            pdir1: Vec3::x(),
            pdir2: Vec3::y(),
            dcurv: [1.0, 2.0, 3.0, 4.0],
        }
    }

    #[test]
    fn test_sorted_keeps_ordered_frame() {
        let f = frame(2.0, 1.0);
        assert_eq!(f.sorted(), f);
    }

    #[test]
    fn test_sorted_swaps_and_stays_right_handed() {
        let f = frame(-1.0, 3.0).sorted();
        assert_eq!(f.k1, 3.0);
        assert_eq!(f.k2, -1.0);
        assert_relative_eq!((f.pdir1.cross(&f.pdir2) - f.normal).norm(), 0.0);
        // dk1/de1 of the new frame is the old dk2/de2.
        assert_eq!(f.dcurv, [4.0, -3.0, 2.0, -1.0]);
    }

    #[test]
    fn test_validate_reports_length_mismatch() {
        let mut mesh = generators::flat_patch(1.0, 2);
        mesh.curv2.pop();
        assert!(matches!(
            mesh.validate(),
            Err(MeshError::LengthMismatch { attribute: "curv2", .. })
        ));
    }

    #[test]
    fn test_validate_reports_bad_index() {
        let mut mesh = generators::flat_patch(1.0, 2);
        mesh.push_face(0, 1, 99);
        assert!(matches!(
            mesh.validate(),
            Err(MeshError::IndexOutOfRange { vertex: 99, .. })
        ));
    }

    #[test]
    fn test_validate_empty() {
        assert_eq!(CurvatureMesh::new().validate(), Err(MeshError::Empty));
    }

    #[test]
    fn test_bounding_sphere_of_unit_sphere() {
        let mesh = generators::uv_sphere(1.0, 8, 16);
        let bs = mesh.bounding_sphere().unwrap();
        assert!(bs.center.coords.norm() < 1e-9);
        assert_relative_eq!(bs.radius, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_face_normal_is_outward_on_sphere() {
        let mesh = generators::uv_sphere(2.0, 8, 16);
        for f in 0..mesh.face_count() {
            let [a, b, c] = mesh.face_positions(f);
            let centroid = (a.coords + b.coords + c.coords) / 3.0;
            assert!(mesh.face_normal(f).dot(&centroid) > 0.0, "face {f} is inverted");
        }
    }
}
