//! Perspective projection of feature segments and SVG export.

use std::fmt::Write;

use linedraw_lines::{Segment, Visibility};
use linedraw_math::{Point3, Transform, Vec3};

/// Eye-space depth in front of which points are dropped.
const NEAR: f64 = 1e-6;

/// A pinhole camera looking from `eye` toward a target.
#[derive(Debug, Clone)]
pub struct Camera {
    model_view: Transform,
    focal: f64,
}

impl Camera {
    /// Camera at `eye` looking at `target` with the given vertical field of
    /// view in degrees. `None` when `eye == target`.
    pub fn new(eye: &Point3, target: &Point3, fov_degrees: f64) -> Option<Self> {
        let model_view = Transform::look_at(eye, target, &Vec3::z())
            .or_else(|| Transform::look_at(eye, target, &Vec3::y()))?;
        let focal = 1.0 / (fov_degrees.to_radians() / 2.0).tan();
        Some(Self { model_view, focal })
    }

    /// The model-view transform of this camera.
    pub fn model_view(&self) -> &Transform {
        &self.model_view
    }

    /// Project onto the image plane (`+y` up). `None` behind the eye.
    pub fn project(&self, p: &Point3) -> Option<[f64; 2]> {
        let q = self.model_view.apply_point(p);
        if q.z > -NEAR {
            return None;
        }
        let s = self.focal / -q.z;
        Some([q.x * s, q.y * s])
    }
}

/// Parameters for SVG export.
#[derive(Debug, Clone)]
pub struct SvgParams {
    /// Width of the SVG in pixels.
    pub width: u32,
    /// Height of the SVG in pixels.
    pub height: u32,
    /// Padding around the drawing in pixels.
    pub padding: u32,
    /// Background color.
    pub background_color: String,
    /// Multiplier on each segment's width.
    pub width_scale: f64,
}

impl Default for SvgParams {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            padding: 20,
            background_color: "#ffffff".to_string(),
            width_scale: 1.0,
        }
    }
}

struct Projected<'a> {
    a: [f64; 2],
    b: [f64; 2],
    segment: &'a Segment,
}

/// Render segments as an SVG document.
///
/// The drawing is fit to the viewport. Hidden segments are dashed. Opacity
/// is the mean of the two endpoint alphas.
pub fn export_svg(segments: &[Segment], camera: &Camera, params: &SvgParams) -> String {
    let projected: Vec<Projected> = segments
        .iter()
        .filter_map(|segment| {
            Some(Projected {
                a: camera.project(&segment.p0)?,
                b: camera.project(&segment.p1)?,
                segment,
            })
        })
        .collect();

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
  <rect width="100%" height="100%" fill="{}"/>
"#,
        params.width, params.height, params.width, params.height, params.background_color
    );

    if let Some((min, max)) = bounds(&projected) {
        let padding = f64::from(params.padding);
        let available_width = f64::from(params.width) - 2.0 * padding;
        let available_height = f64::from(params.height) - 2.0 * padding;
        let (w, h) = (max[0] - min[0], max[1] - min[1]);
        let scale = if w > 0.0 && h > 0.0 {
            (available_width / w).min(available_height / h)
        } else if w > 0.0 {
            available_width / w
        } else if h > 0.0 {
            available_height / h
        } else {
            1.0
        };
        let offset_x = padding + (available_width - w * scale) / 2.0;
        let offset_y = padding + (available_height - h * scale) / 2.0;
        // SVG y points down.
        let to_px = |p: [f64; 2]| {
            (
                offset_x + (p[0] - min[0]) * scale,
                offset_y + (max[1] - p[1]) * scale,
            )
        };

        for item in &projected {
            let s = item.segment;
            let (x1, y1) = to_px(item.a);
            let (x2, y2) = to_px(item.b);
            let opacity = ((s.alpha[0] + s.alpha[1]) / 2.0).clamp(0.0, 1.0);
            let dash = match s.visibility {
                Visibility::Visible => "",
                Visibility::Hidden => r#" stroke-dasharray="4 3""#,
            };
            let _ = writeln!(
                svg,
                r#"  <line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}" stroke="{}" stroke-width="{:.2}" stroke-opacity="{opacity:.3}" stroke-linecap="round" class="{}"{dash}/>"#,
                s.color.to_hex(),
                f64::from(s.width) * params.width_scale,
                s.kind.name(),
            );
        }
    }

    svg.push_str("</svg>\n");
    svg
}

fn bounds(projected: &[Projected]) -> Option<([f64; 2], [f64; 2])> {
    let mut points = projected.iter().flat_map(|p| [p.a, p.b]);
    let first = points.next()?;
    Some(points.fold((first, first), |(lo, hi), p| {
        (
            [lo[0].min(p[0]), lo[1].min(p[1])],
            [hi[0].max(p[0]), hi[1].max(p[1])],
        )
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use linedraw_lines::{FeatureKind, LinePiece};

    fn segment(p0: Point3, p1: Point3) -> Segment {
        let kind = FeatureKind::Contour;
        Segment::from_piece(LinePiece::visible(p0, p1), kind, kind.style(false))
    }

    #[test]
    fn test_project_center_and_behind() {
        let camera = Camera::new(&Point3::new(0.0, -5.0, 0.0), &Point3::origin(), 90.0).unwrap();
        let c = camera.project(&Point3::origin()).unwrap();
        assert_relative_eq!(c[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(c[1], 0.0, epsilon = 1e-12);
        assert!(camera.project(&Point3::new(0.0, -6.0, 0.0)).is_none());
    }

    #[test]
    fn test_project_up_is_positive_y() {
        let camera = Camera::new(&Point3::new(0.0, -5.0, 0.0), &Point3::origin(), 90.0).unwrap();
        let p = camera.project(&Point3::new(0.0, 0.0, 1.0)).unwrap();
        // 90° field of view: focal length 1, so z = 1 at depth 5 maps to 0.2.
        assert_relative_eq!(p[1], 0.2, epsilon = 1e-9);
    }

    #[test]
    fn test_camera_looking_down_z() {
        let camera = Camera::new(&Point3::new(0.0, 0.0, 5.0), &Point3::origin(), 60.0);
        assert!(camera.is_some());
    }

    #[test]
    fn test_export_svg_lines() {
        let camera = Camera::new(&Point3::new(0.0, -5.0, 0.0), &Point3::origin(), 60.0).unwrap();
        let segments = [
            segment(Point3::new(-1.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)),
            segment(Point3::new(0.0, 0.0, -1.0), Point3::new(0.0, 0.0, 1.0)),
        ];
        let svg = export_svg(&segments, &camera, &SvgParams::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<line").count(), 2);
        assert!(svg.contains(r#"class="contour""#));
        assert!(!svg.contains("stroke-dasharray"));
    }

    #[test]
    fn test_export_svg_hidden_dashed() {
        let camera = Camera::new(&Point3::new(0.0, -5.0, 0.0), &Point3::origin(), 60.0).unwrap();
        let kind = FeatureKind::Boundary;
        let piece = LinePiece::hidden(Point3::new(-1.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0));
        let segments = [Segment::from_piece(piece, kind, kind.style(false))];
        let svg = export_svg(&segments, &camera, &SvgParams::default());
        assert!(svg.contains("stroke-dasharray"));
    }

    #[test]
    fn test_export_svg_empty() {
        let camera = Camera::new(&Point3::new(0.0, -5.0, 0.0), &Point3::origin(), 60.0).unwrap();
        let svg = export_svg(&[], &camera, &SvgParams::default());
        assert!(svg.contains("<rect"));
        assert!(!svg.contains("<line"));
    }
}
