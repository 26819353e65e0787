#![warn(missing_docs)]

//! Math types for the linedraw feature-line extractor.
//!
//! Thin wrappers around nalgebra: points, vectors, the camera/model
//! transform used to place the viewer, and the numeric tolerances shared
//! by the line extraction code.

use nalgebra::{Matrix4, Vector2, Vector3, Vector4};

/// A point in 3D object space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D object space.
pub type Vec3 = Vector3<f64>;

/// A vector in a 2D tangent basis (e.g. the principal directions).
pub type Vec2 = Vector2<f64>;

/// A 4x4 affine transformation matrix.
///
/// Plays the role of the model-view transform: it maps object space into
/// eye space, where the viewer sits at the origin looking down `-z`.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Model-view transform for a camera at `eye` looking at `target`.
    ///
    /// Returns `None` when `eye == target` or `up` is parallel to the
    /// viewing direction.
    pub fn look_at(eye: &Point3, target: &Point3, up: &Vec3) -> Option<Self> {
        let forward = target - eye;
        let f_len = forward.norm();
        if f_len < Tolerance::DEFAULT.linear {
            return None;
        }
        let f = forward / f_len;
        let side = f.cross(up);
        let s_len = side.norm();
        if s_len < Tolerance::DEFAULT.linear {
            return None;
        }
        let s = side / s_len;
        let u = s.cross(&f);

        let mut m = Matrix4::identity();
        for (col, (a, b, c)) in [(s.x, u.x, -f.x), (s.y, u.y, -f.y), (s.z, u.z, -f.z)]
            .into_iter()
            .enumerate()
        {
            m[(0, col)] = a;
            m[(1, col)] = b;
            m[(2, col)] = c;
        }
        let e = eye.coords;
        m[(0, 3)] = -s.dot(&e);
        m[(1, 3)] = -u.dot(&e);
        m[(2, 3)] = f.dot(&e);
        Some(Self { matrix: m })
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }

    /// Inverse of this transform, if it exists.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }

    /// Position of the viewer in object space.
    ///
    /// The eye sits at the eye-space origin, so this is the inverse
    /// transform applied to the origin. `None` for singular transforms.
    pub fn view_position(&self) -> Option<Point3> {
        self.inverse().map(|inv| inv.apply_point(&Point3::origin()))
    }
}

/// Numeric tolerances used by the line extractors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Lengths (edges, view vectors) below this are treated as degenerate.
    pub linear: f64,
    /// `|n·v|` is clamped to at least this before taking `1/|n·v|`.
    pub ndotv: f64,
    /// `sin²θ` below this means the view is along the normal.
    pub sin2theta: f64,
}

impl Tolerance {
    /// Default tolerances for double-precision meshes.
    pub const DEFAULT: Self = Self {
        linear: 1e-12,
        ndotv: 1e-4,
        sin2theta: 1e-10,
    };

    /// Check if a length is effectively zero.
    pub fn is_zero_length(&self, d: f64) -> bool {
        d.abs() < self.linear
    }
}

/// Normalize `v`, returning `None` for (near) zero-length input.
pub fn try_normalize(v: &Vec3) -> Option<Vec3> {
    let len = v.norm();
    if Tolerance::DEFAULT.is_zero_length(len) {
        None
    } else {
        Some(v / len)
    }
}
