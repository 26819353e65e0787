//! Line drawing configuration.

use serde::{Deserialize, Serialize};

use crate::error::{LineError, Result};
use crate::perview::FieldNeeds;

/// Every switch and threshold of a frame, in one immutable record.
///
/// Thresholds are dimensionless: the drawer rescales them by the mesh
/// feature size before use. Missing keys in a serialized config take their
/// default value.
///
/// `boundary` is accepted as a key for [`boundaries`](Self::boundaries).
/// Principal highlights are toggled per flavor; with
/// `test_principal_highlights` off the flavors trace the same lines and are
/// drawn once, as ridges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineConfig {
    // Feature toggles
    /// Thick `n·v = 0` outline drawn behind the mesh.
    pub silhouette: bool,
    /// Mesh boundary edges.
    #[serde(alias = "boundary")]
    pub boundaries: bool,
    /// Occluding contours.
    pub contours: bool,
    /// Suggestive contours.
    pub suggestive_contours: bool,
    /// Suggestive highlights.
    pub suggestive_highlights: bool,
    /// Ridges (maxima of `k1`).
    pub ridges: bool,
    /// Valleys (minima of `k2`).
    pub valleys: bool,
    /// Apparent ridges.
    pub apparent_ridges: bool,
    /// Principal highlights where `q1 > 0`.
    pub principal_highlight_ridges: bool,
    /// Principal highlights where `q1 < 0`.
    pub principal_highlight_valleys: bool,
    /// Isophotes.
    pub isophotes: bool,
    /// Topographic lines.
    pub topo_lines: bool,
    /// Zeros of Gaussian curvature.
    pub parabolic_lines: bool,
    /// Zeros of mean curvature.
    pub mean_curvature_zero_lines: bool,
    /// `DwKr = threshold` lines.
    pub dwkr_lines: bool,

    // Tests
    /// Require `kr > 0` on contours.
    pub test_contours: bool,
    /// Require the derivative test on suggestive contours.
    pub test_suggestive_contours: bool,
    /// Require the derivative test on suggestive highlights.
    pub test_suggestive_highlights: bool,
    /// Require the extremum test on ridges and valleys.
    pub test_ridges_valleys: bool,
    /// Require the maximum test on apparent ridges.
    pub test_apparent_ridges: bool,
    /// Require the sign test on principal highlights.
    pub test_principal_highlights: bool,

    // Thresholds
    /// Suggestive contour threshold, scaled by `1/fs²`.
    pub sug_thresh: f64,
    /// Suggestive highlight threshold, scaled by `1/fs²`.
    pub sh_thresh: f64,
    /// Principal highlight threshold, scaled by `1/fs`.
    pub ph_thresh: f64,
    /// Ridge/valley threshold, scaled by `1/fs`.
    pub rv_thresh: f64,
    /// Apparent ridge threshold, scaled by `1/fs`.
    pub ar_thresh: f64,

    // Style
    /// Skip faces whose majority of vertices face away from the viewer.
    pub backface_cull: bool,
    /// Locate suggestive crossings with cubic Hermite interpolation.
    pub hermite_interpolation: bool,
    /// Emit culled and test-failing pieces as hidden segments.
    pub draw_hidden: bool,
    /// Fade lines out as their test approaches its limit.
    pub fade: bool,
    /// Per-family colors instead of black.
    pub colored_lines: bool,
    /// Multiply the suggestive contour numerator by `sin²θ`.
    pub extra_sin2theta: bool,

    // Isophotes and topo lines
    /// Number of isophote bands.
    pub isophote_count: usize,
    /// Light direction for isophotes; `None` uses the view direction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isophote_light: Option<[f64; 3]>,
    /// Number of topo line bands.
    pub topo_count: usize,
    /// Fractional offset of the topo lines within a band, in `[0, 1)`.
    pub topo_offset: f64,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            silhouette: false,
            boundaries: false,
            contours: true,
            suggestive_contours: false,
            suggestive_highlights: false,
            ridges: false,
            valleys: false,
            apparent_ridges: false,
            principal_highlight_ridges: false,
            principal_highlight_valleys: false,
            isophotes: false,
            topo_lines: false,
            parabolic_lines: false,
            mean_curvature_zero_lines: false,
            dwkr_lines: false,
            test_contours: true,
            test_suggestive_contours: true,
            test_suggestive_highlights: true,
            test_ridges_valleys: true,
            test_apparent_ridges: true,
            test_principal_highlights: true,
            sug_thresh: 0.01,
            sh_thresh: 0.02,
            ph_thresh: 0.04,
            rv_thresh: 0.1,
            ar_thresh: 0.1,
            backface_cull: true,
            hermite_interpolation: false,
            draw_hidden: false,
            fade: true,
            colored_lines: false,
            extra_sin2theta: false,
            isophote_count: 20,
            isophote_light: None,
            topo_count: 20,
            topo_offset: 0.0,
        }
    }
}

impl LineConfig {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        let thresholds = [
            ("sug_thresh", self.sug_thresh),
            ("sh_thresh", self.sh_thresh),
            ("ph_thresh", self.ph_thresh),
            ("rv_thresh", self.rv_thresh),
            ("ar_thresh", self.ar_thresh),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(LineError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if !(0.0..1.0).contains(&self.topo_offset) {
            return Err(LineError::InvalidConfig(format!(
                "topo_offset must be in [0, 1), got {}",
                self.topo_offset
            )));
        }
        if self.isophotes && self.isophote_count == 0 {
            return Err(LineError::InvalidConfig(
                "isophote_count must be positive".into(),
            ));
        }
        if self.topo_lines && self.topo_count == 0 {
            return Err(LineError::InvalidConfig("topo_count must be positive".into()));
        }
        if let Some(light) = self.isophote_light {
            let len2: f64 = light.iter().map(|c| c * c).sum();
            if !len2.is_finite() || len2 == 0.0 {
                return Err(LineError::InvalidConfig(
                    "isophote_light must be a finite non-zero vector".into(),
                ));
            }
        }
        Ok(())
    }

    /// Optional per-view field groups the enabled features read.
    pub fn needs(&self) -> FieldNeeds {
        FieldNeeds {
            suggestive: self.suggestive_contours
                || self.suggestive_highlights
                || self.dwkr_lines,
            apparent: self.apparent_ridges
                || self.principal_highlight_ridges
                || self.principal_highlight_valleys,
        }
    }

    /// Enable everything that depends only on the mesh and the view
    /// direction, with default thresholds. Handy for smoke tests.
    pub fn all_features() -> Self {
        Self {
            silhouette: true,
            boundaries: true,
            contours: true,
            suggestive_contours: true,
            suggestive_highlights: true,
            ridges: true,
            valleys: true,
            apparent_ridges: true,
            principal_highlight_ridges: true,
            principal_highlight_valleys: true,
            isophotes: true,
            topo_lines: true,
            parabolic_lines: true,
            mean_curvature_zero_lines: true,
            dwkr_lines: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let cfg = LineConfig::default();
        cfg.validate().unwrap();
        assert!(cfg.contours);
        assert!(cfg.fade);
        assert!(!cfg.hermite_interpolation);
        assert_eq!(cfg.needs(), FieldNeeds::default());
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let cfg = LineConfig {
            rv_thresh: -0.1,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(LineError::InvalidConfig(_))));
    }

    #[test]
    fn test_nan_threshold_rejected() {
        let cfg = LineConfig {
            sug_thresh: f64::NAN,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_zero_light_rejected() {
        let cfg = LineConfig {
            isophote_light: Some([0.0; 3]),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_needs_follow_features() {
        let cfg = LineConfig {
            suggestive_contours: true,
            ..Default::default()
        };
        assert!(cfg.needs().suggestive);
        assert!(!cfg.needs().apparent);

        let cfg = LineConfig {
            principal_highlight_valleys: true,
            ..Default::default()
        };
        assert!(cfg.needs().apparent);

        let all = LineConfig::all_features().needs();
        assert!(all.suggestive && all.apparent);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let cfg: LineConfig = toml::from_str("ridges = true\nrv_thresh = 0.5\n").unwrap();
        assert!(cfg.ridges);
        assert_eq!(cfg.rv_thresh, 0.5);
        assert!(cfg.contours);
        assert_eq!(cfg.isophote_count, 20);
    }

    #[test]
    fn test_boundary_key_alias() {
        let cfg: LineConfig = toml::from_str("boundary = true\n").unwrap();
        assert!(cfg.boundaries);
    }

    #[test]
    fn test_toml_round_trip() {
        let cfg = LineConfig::all_features();
        let text = toml::to_string(&cfg).unwrap();
        let back: LineConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, cfg);
    }
}
