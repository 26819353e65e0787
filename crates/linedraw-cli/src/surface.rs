//! Built-in test surfaces and command-line value parsers.

use clap::ValueEnum;
use linedraw_math::Point3;
use linedraw_mesh::{generators, CurvatureMesh};

/// Analytic surface to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Surface {
    /// Unit sphere.
    Sphere,
    /// Torus with major radius 2 and tube radius 0.6.
    Torus,
    /// Flat 2x2 patch facing +z.
    Plane,
}

impl Surface {
    /// Tessellate the surface. `resolution` is the number of segments
    /// along the coarser parameter direction.
    pub fn build(self, resolution: usize) -> CurvatureMesh {
        let n = resolution.max(4);
        match self {
            Surface::Sphere => generators::uv_sphere(1.0, n, 2 * n),
            Surface::Torus => generators::torus(2.0, 0.6, 2 * n, n),
            Surface::Plane => generators::flat_patch(2.0, n),
        }
    }

    /// Default camera target.
    pub fn center(self) -> Point3 {
        Point3::origin()
    }
}

/// Parse `x,y,z` into a point.
pub fn parse_point(s: &str) -> Result<Point3, String> {
    let coords: Vec<f64> = s
        .split(',')
        .map(|c| c.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid coordinate in '{s}': {e}"))?;
    match coords.as_slice() {
        [x, y, z] if coords.iter().all(|c| c.is_finite()) => Ok(Point3::new(*x, *y, *z)),
        [_, _, _] => Err(format!("non-finite coordinate in '{s}'")),
        _ => Err(format!("expected x,y,z but got {} values", coords.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        let p = parse_point("1, -2.5,3").unwrap();
        assert_eq!(p, Point3::new(1.0, -2.5, 3.0));
    }

    #[test]
    fn test_parse_point_rejects_bad_input() {
        assert!(parse_point("1,2").is_err());
        assert!(parse_point("1,2,x").is_err());
        assert!(parse_point("1,2,inf").is_err());
    }

    #[test]
    fn test_surfaces_validate() {
        for surface in [Surface::Sphere, Surface::Torus, Surface::Plane] {
            surface.build(8).validate().unwrap();
        }
    }

    #[test]
    fn test_resolution_is_clamped() {
        let mesh = Surface::Plane.build(1);
        assert_eq!(mesh.face_count(), 2 * 4 * 4);
    }
}
