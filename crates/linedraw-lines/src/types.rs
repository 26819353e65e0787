//! Output types: segments, colors, feature kinds.

use linedraw_math::Point3;
use serde::{Deserialize, Serialize};

/// An RGB color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
}

impl Rgb {
    /// Black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);

    /// Create a color.
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Neutral gray of the given intensity.
    pub const fn gray(v: f32) -> Self {
        Self::new(v, v, v)
    }

    /// `#rrggbb` form.
    pub fn to_hex(&self) -> String {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", c(self.r), c(self.g), c(self.b))
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::BLACK
    }
}

/// The feature family a segment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// Thick `n·v = 0` outline drawn behind the mesh.
    Silhouette,
    /// Mesh edge with a single incident face.
    Boundary,
    /// `n·v = 0` where the radial curvature test passes.
    Contour,
    /// Zero of radial curvature with a positive directional derivative.
    SuggestiveContour,
    /// Zero of radial curvature with a negative directional derivative.
    SuggestiveHighlight,
    /// Maximum of `k1` along its principal direction.
    Ridge,
    /// Minimum of `k2` along its principal direction.
    Valley,
    /// Maximum of view-dependent curvature along its direction.
    ApparentRidge,
    /// View-dependent highlight where `q1 > 0`.
    PrincipalHighlightRidge,
    /// View-dependent highlight where `q1 < 0`.
    PrincipalHighlightValley,
    /// Line of constant `n·l`.
    Isophote,
    /// Line of constant height.
    TopoLine,
    /// Zero of Gaussian curvature.
    Parabolic,
    /// Zero of mean curvature.
    MeanCurvatureZero,
    /// Directional derivative of radial curvature equal to its threshold.
    DwKr,
}

impl FeatureKind {
    /// Every kind, in draw order.
    pub const ALL: [FeatureKind; 15] = [
        FeatureKind::Silhouette,
        FeatureKind::Boundary,
        FeatureKind::Contour,
        FeatureKind::SuggestiveContour,
        FeatureKind::SuggestiveHighlight,
        FeatureKind::Ridge,
        FeatureKind::Valley,
        FeatureKind::ApparentRidge,
        FeatureKind::PrincipalHighlightRidge,
        FeatureKind::PrincipalHighlightValley,
        FeatureKind::Isophote,
        FeatureKind::TopoLine,
        FeatureKind::Parabolic,
        FeatureKind::MeanCurvatureZero,
        FeatureKind::DwKr,
    ];

    /// Snake-case name, as used in the configuration and JSON output.
    pub fn name(&self) -> &'static str {
        match self {
            FeatureKind::Silhouette => "silhouette",
            FeatureKind::Boundary => "boundary",
            FeatureKind::Contour => "contour",
            FeatureKind::SuggestiveContour => "suggestive_contour",
            FeatureKind::SuggestiveHighlight => "suggestive_highlight",
            FeatureKind::Ridge => "ridge",
            FeatureKind::Valley => "valley",
            FeatureKind::ApparentRidge => "apparent_ridge",
            FeatureKind::PrincipalHighlightRidge => "principal_highlight_ridge",
            FeatureKind::PrincipalHighlightValley => "principal_highlight_valley",
            FeatureKind::Isophote => "isophote",
            FeatureKind::TopoLine => "topo_line",
            FeatureKind::Parabolic => "parabolic",
            FeatureKind::MeanCurvatureZero => "mean_curvature_zero",
            FeatureKind::DwKr => "dwkr",
        }
    }

    /// Line style of a visible segment.
    ///
    /// `colored` selects the per-family palette; otherwise every line is
    /// black except the lighter isophotes and topo lines.
    pub fn style(&self, colored: bool) -> LineStyle {
        use FeatureKind::*;
        let (color, palette, width) = match self {
            Silhouette => (Rgb::BLACK, Rgb::BLACK, 6.0),
            Boundary => (Rgb::gray(0.1), Rgb::gray(0.1), 2.5),
            Contour => (Rgb::BLACK, Rgb::BLACK, 2.5),
            SuggestiveContour => (Rgb::BLACK, Rgb::new(0.5, 0.0, 0.5), 1.5),
            SuggestiveHighlight => (Rgb::BLACK, Rgb::new(0.5, 0.5, 0.5), 1.5),
            Ridge => (Rgb::BLACK, Rgb::new(0.3, 0.0, 0.0), 2.0),
            Valley => (Rgb::BLACK, Rgb::new(0.0, 0.0, 0.3), 2.0),
            ApparentRidge => (Rgb::BLACK, Rgb::new(0.0, 0.25, 0.0), 2.0),
            PrincipalHighlightRidge => (Rgb::BLACK, Rgb::new(0.6, 0.3, 0.0), 2.0),
            PrincipalHighlightValley => (Rgb::BLACK, Rgb::new(0.0, 0.3, 0.6), 2.0),
            Isophote => (Rgb::gray(0.4), Rgb::new(0.4, 0.4, 0.0), 1.0),
            TopoLine => (Rgb::gray(0.4), Rgb::new(0.0, 0.4, 0.4), 1.0),
            Parabolic => (Rgb::BLACK, Rgb::new(0.0, 0.5, 0.5), 1.5),
            MeanCurvatureZero => (Rgb::BLACK, Rgb::new(0.5, 0.5, 0.0), 1.5),
            DwKr => (Rgb::BLACK, Rgb::new(0.0, 0.0, 0.6), 1.5),
        };
        LineStyle {
            color: if colored { palette } else { color },
            width,
        }
    }
}

/// Color and width of emitted segments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    /// Line color.
    pub color: Rgb,
    /// Line width in pixels.
    pub width: f32,
}

impl LineStyle {
    /// Style of hidden (culled or test-failing) pieces.
    pub const HIDDEN: Self = Self {
        color: Rgb::gray(0.6),
        width: 1.5,
    };
}

/// Whether a segment passed the visibility tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Passed every test.
    #[default]
    Visible,
    /// Failed a test or lies on a back-facing face; only emitted when
    /// hidden lines are requested.
    Hidden,
}

/// Opacity of hidden pieces.
pub const HIDDEN_ALPHA: f64 = 0.4;

/// Geometry produced by a face extractor, before styling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePiece {
    /// Start point.
    pub p0: Point3,
    /// End point.
    pub p1: Point3,
    /// Opacity at `p0` and `p1`.
    pub alpha: [f64; 2],
    /// Visibility of the piece.
    pub visibility: Visibility,
}

impl LinePiece {
    /// Fully opaque visible piece.
    pub fn visible(p0: Point3, p1: Point3) -> Self {
        Self {
            p0,
            p1,
            alpha: [1.0, 1.0],
            visibility: Visibility::Visible,
        }
    }

    /// Hidden piece with [`HIDDEN_ALPHA`] at both ends.
    pub fn hidden(p0: Point3, p1: Point3) -> Self {
        Self {
            p0,
            p1,
            alpha: [HIDDEN_ALPHA; 2],
            visibility: Visibility::Hidden,
        }
    }

    /// Demote to hidden, scaling opacity.
    pub fn into_hidden(self) -> Self {
        Self {
            alpha: self.alpha.map(|a| a * HIDDEN_ALPHA),
            visibility: Visibility::Hidden,
            ..self
        }
    }
}

/// A styled line segment: the output of line extraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start point in object space.
    pub p0: Point3,
    /// End point in object space.
    pub p1: Point3,
    /// Line color.
    pub color: Rgb,
    /// Opacity at `p0` and `p1`.
    pub alpha: [f64; 2],
    /// Line width in pixels.
    pub width: f32,
    /// Feature family.
    pub kind: FeatureKind,
    /// Visibility.
    pub visibility: Visibility,
}

impl Segment {
    /// Style a piece. Hidden pieces take [`LineStyle::HIDDEN`].
    pub fn from_piece(piece: LinePiece, kind: FeatureKind, style: LineStyle) -> Self {
        let style = match piece.visibility {
            Visibility::Visible => style,
            Visibility::Hidden => LineStyle::HIDDEN,
        };
        Self {
            p0: piece.p0,
            p1: piece.p1,
            color: style.color,
            alpha: piece.alpha,
            width: style.width,
            kind,
            visibility: piece.visibility,
        }
    }

    /// Segment length.
    pub fn length(&self) -> f64 {
        (self.p1 - self.p0).norm()
    }

    /// Whether the segment is visible.
    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }
}

/// A chain of segments of one kind joined end to end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    /// Feature family of every segment in the chain.
    pub kind: FeatureKind,
    /// Visibility shared by every segment in the chain.
    pub visibility: Visibility,
    /// Ordered vertices.
    pub points: Vec<Point3>,
    /// First and last vertex coincide.
    pub closed: bool,
}

impl Polyline {
    /// Sum of edge lengths.
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_hex() {
        assert_eq!(Rgb::BLACK.to_hex(), "#000000");
        assert_eq!(Rgb::new(1.0, 0.5, 0.0).to_hex(), "#ff8000");
        assert_eq!(Rgb::new(2.0, -1.0, 1.0).to_hex(), "#ff00ff");
    }

    #[test]
    fn test_feature_kind_names_are_unique() {
        let mut names: Vec<_> = FeatureKind::ALL.iter().map(|k| k.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FeatureKind::ALL.len());
    }

    #[test]
    fn test_feature_kind_serde_matches_name() {
        for kind in FeatureKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.name()));
        }
    }

    #[test]
    fn test_uncolored_style_is_dark() {
        assert_eq!(FeatureKind::Ridge.style(false).color, Rgb::BLACK);
        assert_ne!(FeatureKind::Ridge.style(true).color, Rgb::BLACK);
        assert_eq!(FeatureKind::Silhouette.style(false).width, 6.0);
    }

    #[test]
    fn test_hidden_piece_takes_hidden_style() {
        let piece = LinePiece::visible(Point3::origin(), Point3::new(1.0, 0.0, 0.0)).into_hidden();
        let seg = Segment::from_piece(piece, FeatureKind::Contour, FeatureKind::Contour.style(false));
        assert_eq!(seg.visibility, Visibility::Hidden);
        assert_eq!(seg.color, LineStyle::HIDDEN.color);
        assert_eq!(seg.alpha, [HIDDEN_ALPHA; 2]);
        assert!(!seg.is_visible());
        assert!((seg.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_polyline_length() {
        let line = Polyline {
            kind: FeatureKind::Contour,
            visibility: Visibility::Visible,
            points: vec![
                Point3::origin(),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 2.0, 0.0),
            ],
            closed: false,
        };
        assert!((line.length() - 3.0).abs() < 1e-12);
    }
}
