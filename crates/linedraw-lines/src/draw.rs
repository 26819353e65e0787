//! Mesh-level drivers: run every enabled feature family over the mesh.

use linedraw_math::{try_normalize, Point3, Transform, Vec3};
use linedraw_mesh::{CurvatureMesh, MeshError, MeshTopology};
use tracing::{debug, info};

use crate::apparent::{apparent_ridge_face, ApparentVertex};
use crate::boundary::boundary_pieces;
use crate::config::LineConfig;
use crate::error::{LineError, Result};
use crate::feature_size::feature_size;
use crate::gradient::gradkr_all;
use crate::highlight::{principal_highlight_face, HighlightFlavor, HighlightVertex};
use crate::isoline::{Interpolation, Isoline};
use crate::perview::{world_t1, FieldOptions, PerViewFields};
use crate::ridge::{ridge_face, RidgeCache, RidgeFlavor, RidgeParams};
use crate::silhouette::silhouette_face;
use crate::types::{FeatureKind, LinePiece, Segment};

/// Fade factor of suggestive lines, scaled by `1/fs²`.
const SUGGESTIVE_FADE: f64 = 0.03;

/// Extracts feature lines from one mesh.
///
/// Holds the mesh, its topology, the feature size and optionally the
/// view-independent ridge inputs. Everything per frame is passed to
/// [`draw`](Self::draw).
///
/// # Example
///
/// ```
/// use linedraw_lines::{LineConfig, LineDrawer};
/// use linedraw_math::Point3;
/// use linedraw_mesh::{generators, MeshTopology};
///
/// let mesh = generators::uv_sphere(1.0, 24, 48);
/// let topology = MeshTopology::build(&mesh);
/// let drawer = LineDrawer::for_mesh(&mesh, &topology).unwrap();
/// let segments = drawer
///     .render_view(Point3::new(0.0, 0.0, 5.0), &LineConfig::default())
///     .unwrap();
/// assert!(!segments.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct LineDrawer<'a> {
    mesh: &'a CurvatureMesh,
    topology: &'a MeshTopology,
    feature_size: f64,
    ridge_cache: Option<RidgeCache>,
}

/// Read-only state of one frame.
struct Frame<'f> {
    fields: &'f PerViewFields,
    config: &'f LineConfig,
}

impl<'a> LineDrawer<'a> {
    /// Drawer with a known feature size.
    pub fn new(mesh: &'a CurvatureMesh, topology: &'a MeshTopology, feature_size: f64) -> Self {
        Self {
            mesh,
            topology,
            feature_size,
            ridge_cache: None,
        }
    }

    /// Validate the mesh and compute its feature size.
    pub fn for_mesh(mesh: &'a CurvatureMesh, topology: &'a MeshTopology) -> Result<Self> {
        mesh.validate().map_err(|e| match e {
            MeshError::Empty => LineError::EmptyMesh,
            e => LineError::Mesh(e),
        })?;
        check_topology(mesh, topology)?;
        let size = feature_size(mesh)?;
        info!(
            vertices = mesh.vertex_count(),
            faces = mesh.face_count(),
            feature_size = size,
            "Prepared line drawer"
        );
        Ok(Self::new(mesh, topology, size))
    }

    /// Precompute ridge and valley inputs once instead of every frame.
    pub fn with_ridge_cache(mut self) -> Self {
        self.ridge_cache = Some(RidgeCache::build(self.mesh));
        self
    }

    /// Feature size used to scale thresholds.
    pub fn feature_size(&self) -> f64 {
        self.feature_size
    }

    /// Field computation options for `config`, with thresholds scaled.
    pub fn field_options(&self, config: &LineConfig) -> FieldOptions {
        let fs2 = self.feature_size * self.feature_size;
        FieldOptions {
            needs: config.needs(),
            sc_thresh: config.sug_thresh / fs2,
            sh_thresh: config.sh_thresh / fs2,
            extra_sin2theta: config.extra_sin2theta,
        }
    }

    /// Fields for a viewer at `viewpos`.
    pub fn compute_fields(&self, viewpos: Point3, config: &LineConfig) -> PerViewFields {
        PerViewFields::compute(self.mesh, self.topology, viewpos, &self.field_options(config))
    }

    /// Refill `fields` for a new view, reusing its buffers.
    pub fn update_fields(&self, fields: &mut PerViewFields, viewpos: Point3, config: &LineConfig) {
        fields.compute_into(self.mesh, self.topology, viewpos, &self.field_options(config));
    }

    /// Compute fields and draw in one call.
    pub fn render_view(&self, viewpos: Point3, config: &LineConfig) -> Result<Vec<Segment>> {
        config.validate()?;
        check_topology(self.mesh, self.topology)?;
        let fields = self.compute_fields(viewpos, config);
        self.draw(&fields, config)
    }

    /// [`render_view`](Self::render_view) for a model-view transform.
    pub fn render_transform(&self, model_view: &Transform, config: &LineConfig) -> Result<Vec<Segment>> {
        let viewpos = model_view
            .view_position()
            .ok_or(LineError::SingularTransform)?;
        self.render_view(viewpos, config)
    }

    /// Extract every enabled feature family from precomputed fields.
    ///
    /// Preconditions are checked up front: a bad config, topology or fields
    /// of another mesh, or a field group an enabled feature needs but that was not
    /// computed reject the frame. After that, faces that yield nothing are
    /// skipped silently.
    ///
    /// Families come out in a fixed order: silhouette, boundaries,
    /// contours, suggestive contours, suggestive highlights, ridges,
    /// valleys, apparent ridges, principal highlights, isophotes, topo
    /// lines, then the curvature zero sets.
    pub fn draw(&self, fields: &PerViewFields, config: &LineConfig) -> Result<Vec<Segment>> {
        self.check(fields, config)?;
        let frame = Frame { fields, config };
        let mut out = Vec::new();

        if config.silhouette {
            self.extract(&frame, FeatureKind::Silhouette, false, &mut out, |_, tri, mut emit| {
                silhouette_face(&self.mesh.positions, &fields.ndotv, tri, &mut emit)
            });
        }
        if config.boundaries {
            self.draw_boundaries(&frame, &mut out);
        }
        if config.contours {
            self.draw_contours(&frame, &mut out);
        }
        if config.suggestive_contours || config.suggestive_highlights {
            self.draw_suggestive(&frame, &mut out);
        }
        if config.ridges {
            self.draw_ridges(&frame, RidgeFlavor::Ridge, &mut out);
        }
        if config.valleys {
            self.draw_ridges(&frame, RidgeFlavor::Valley, &mut out);
        }
        if config.apparent_ridges {
            self.draw_apparent_ridges(&frame, &mut out);
        }
        if config.principal_highlight_ridges {
            self.draw_principal_highlights(&frame, HighlightFlavor::Ridge, &mut out);
        }
        // Without the sign test both flavors trace the same lines.
        if config.principal_highlight_valleys
            && (config.test_principal_highlights || !config.principal_highlight_ridges)
        {
            self.draw_principal_highlights(&frame, HighlightFlavor::Valley, &mut out);
        }
        if config.isophotes {
            self.draw_isophotes(&frame, &mut out);
        }
        if config.topo_lines {
            self.draw_topo_lines(&frame, &mut out);
        }
        self.draw_curvature_zeros(&frame, &mut out);

        debug!(segments = out.len(), "Drew feature lines");
        Ok(out)
    }

    fn check(&self, fields: &PerViewFields, config: &LineConfig) -> Result<()> {
        config.validate()?;
        if self.mesh.vertex_count() == 0 || self.mesh.face_count() == 0 {
            return Err(LineError::EmptyMesh);
        }
        check_topology(self.mesh, self.topology)?;
        if fields.vertex_count() != self.mesh.vertex_count() {
            return Err(LineError::FieldLength {
                expected: self.mesh.vertex_count(),
                found: fields.vertex_count(),
            });
        }

        let computed = fields.computed();
        let requirements = [
            (config.suggestive_contours, "suggestive_contours", computed.suggestive, "sctest"),
            (config.suggestive_highlights, "suggestive_highlights", computed.suggestive, "shtest"),
            (config.dwkr_lines, "dwkr_lines", computed.suggestive, "sctest"),
            (config.apparent_ridges, "apparent_ridges", computed.apparent, "q1"),
            (
                config.principal_highlight_ridges,
                "principal_highlight_ridges",
                computed.apparent,
                "q1",
            ),
            (
                config.principal_highlight_valleys,
                "principal_highlight_valleys",
                computed.apparent,
                "q1",
            ),
        ];
        for (enabled, feature, present, field) in requirements {
            if enabled && !present {
                return Err(LineError::MissingField { feature, field });
            }
        }
        Ok(())
    }

    /// Run `face_fn` over every face, styling what it emits.
    ///
    /// With `cull`, back-facing faces are skipped, or demoted to hidden
    /// when hidden lines are requested.
    fn extract<F>(&self, frame: &Frame, kind: FeatureKind, cull: bool, out: &mut Vec<Segment>, mut face_fn: F)
    where
        F: FnMut(usize, [usize; 3], &mut dyn FnMut(LinePiece)),
    {
        let style = kind.style(frame.config.colored_lines);
        let cull = cull && frame.config.backface_cull;
        let before = out.len();

        for f in 0..self.mesh.face_count() {
            let tri = self.mesh.face(f);
            let hidden = cull && is_backfacing(&frame.fields.ndotv, tri);
            if hidden && !frame.config.draw_hidden {
                continue;
            }
            face_fn(f, tri, &mut |piece: LinePiece| {
                let piece = if hidden { piece.into_hidden() } else { piece };
                out.push(Segment::from_piece(piece, kind, style));
            });
        }

        debug!(kind = kind.name(), segments = out.len() - before, "Extracted feature lines");
    }

    /// Contours are never culled: every face they cross has vertices on
    /// both sides of `n·v = 0`.
    fn draw_contours(&self, frame: &Frame, out: &mut Vec<Segment>) {
        let fields = frame.fields;
        let mut iso = Isoline::new(&fields.ndotv, 0.0);
        if frame.config.test_contours {
            iso = iso.with_test(&fields.kr, None);
        }
        iso.keep_failed = frame.config.draw_hidden;
        self.extract(frame, FeatureKind::Contour, false, out, |_, tri, mut emit| {
            iso.extract_face(&self.mesh.positions, tri, &mut emit)
        });
    }

    fn draw_boundaries(&self, frame: &Frame, out: &mut Vec<Segment>) {
        let kind = FeatureKind::Boundary;
        let style = kind.style(frame.config.colored_lines);
        let before = out.len();
        boundary_pieces(self.mesh, self.topology, frame.config.draw_hidden, &mut |piece| {
            out.push(Segment::from_piece(piece, kind, style))
        });
        debug!(kind = kind.name(), segments = out.len() - before, "Extracted feature lines");
    }

    fn draw_suggestive(&self, frame: &Frame, out: &mut Vec<Segment>) {
        let config = frame.config;
        let fields = frame.fields;
        let gradients = config
            .hermite_interpolation
            .then(|| gradkr_all(self.mesh, self.topology, fields));
        let interpolation = match &gradients {
            Some(g) => Interpolation::Hermite { gradients: g },
            None => Interpolation::Linear,
        };
        let fade = if config.fade {
            SUGGESTIVE_FADE / (self.feature_size * self.feature_size)
        } else {
            0.0
        };

        let families = [
            (
                config.suggestive_contours,
                FeatureKind::SuggestiveContour,
                config.test_suggestive_contours,
                &fields.sctest_num,
            ),
            (
                config.suggestive_highlights,
                FeatureKind::SuggestiveHighlight,
                config.test_suggestive_highlights,
                &fields.shtest_num,
            ),
        ];
        for (enabled, kind, test, num) in families {
            if !enabled {
                continue;
            }
            let mut iso = Isoline::new(&fields.kr, 0.0);
            if test {
                iso = iso.with_test(num, Some(fields.sctest_den.as_slice()));
                iso.fade = fade;
            }
            iso.interpolation = interpolation;
            iso.keep_failed = config.draw_hidden;
            self.extract(frame, kind, true, out, |_, tri, mut emit| {
                iso.extract_face(&self.mesh.positions, tri, &mut emit)
            });
        }
    }

    fn draw_ridges(&self, frame: &Frame, flavor: RidgeFlavor, out: &mut Vec<Segment>) {
        let params = RidgeParams {
            thresh: frame.config.rv_thresh / self.feature_size,
            test: frame.config.test_ridges_valleys,
            fade: frame.config.fade,
        };
        let kind = match flavor {
            RidgeFlavor::Ridge => FeatureKind::Ridge,
            RidgeFlavor::Valley => FeatureKind::Valley,
        };
        let vertex = |v: usize| match &self.ridge_cache {
            Some(cache) => cache.vertex(flavor, v),
            None => flavor.vertex(self.mesh, v),
        };
        self.extract(frame, kind, false, out, |f, tri, mut emit| {
            let verts = tri.map(vertex);
            ridge_face(&self.mesh.face_positions(f), &verts, flavor, &params, &mut emit)
        });
    }

    fn draw_apparent_ridges(&self, frame: &Frame, out: &mut Vec<Segment>) {
        let fields = frame.fields;
        let params = RidgeParams {
            thresh: frame.config.ar_thresh / self.feature_size,
            test: frame.config.test_apparent_ridges,
            fade: frame.config.fade,
        };
        self.extract(frame, FeatureKind::ApparentRidge, true, out, |f, tri, mut emit| {
            let verts = tri.map(|v| ApparentVertex {
                q1: fields.q1[v],
                t1: world_t1(self.mesh, &fields.t1, v),
                dt1q1: fields.dt1q1[v],
            });
            apparent_ridge_face(&self.mesh.face_positions(f), &verts, &params, &mut emit)
        });
    }

    fn draw_principal_highlights(&self, frame: &Frame, flavor: HighlightFlavor, out: &mut Vec<Segment>) {
        let fields = frame.fields;
        let viewpos = fields.view_position();
        let params = RidgeParams {
            thresh: frame.config.ph_thresh / self.feature_size,
            test: frame.config.test_principal_highlights,
            fade: frame.config.fade,
        };
        let kind = match flavor {
            HighlightFlavor::Ridge => FeatureKind::PrincipalHighlightRidge,
            HighlightFlavor::Valley => FeatureKind::PrincipalHighlightValley,
        };
        self.extract(frame, kind, true, out, |f, tri, mut emit| {
            let verts = tri.map(|v| HighlightVertex {
                q1: fields.q1[v],
                t1: world_t1(self.mesh, &fields.t1, v),
                view: try_normalize(&(viewpos - self.mesh.positions[v]))
                    .unwrap_or(self.mesh.normals[v]),
            });
            principal_highlight_face(&self.mesh.face_positions(f), &verts, flavor, &params, &mut emit)
        });
    }

    /// Lines of constant `n·l`, at the centers of `isophote_count` equal
    /// bands of `[0, 1]`. Without a light direction the viewer is the light.
    fn draw_isophotes(&self, frame: &Frame, out: &mut Vec<Segment>) {
        let config = frame.config;
        let ndotl: Vec<f64>;
        let field: &[f64] = match config.isophote_light {
            Some([x, y, z]) => {
                let light = try_normalize(&Vec3::new(x, y, z)).unwrap_or_else(Vec3::z);
                ndotl = self.mesh.normals.iter().map(|n| n.dot(&light)).collect();
                &ndotl
            }
            None => &frame.fields.ndotv,
        };
        let count = config.isophote_count;
        let levels = (0..count).map(|k| (k as f64 + 0.5) / count as f64);
        self.draw_levels(frame, FeatureKind::Isophote, field, levels, out);
    }

    /// Lines of constant height `z`, `topo_count` per bounding-box height.
    fn draw_topo_lines(&self, frame: &Frame, out: &mut Vec<Segment>) {
        let Some((min, max)) = self.mesh.bounding_box() else {
            return;
        };
        let heights: Vec<f64> = self.mesh.positions.iter().map(|p| p.z).collect();
        let count = frame.config.topo_count;
        let offset = frame.config.topo_offset;
        let levels = (0..count).map(|k| min.z + (max.z - min.z) * (k as f64 + offset) / count as f64);
        self.draw_levels(frame, FeatureKind::TopoLine, &heights, levels, out);
    }

    fn draw_levels(
        &self,
        frame: &Frame,
        kind: FeatureKind,
        field: &[f64],
        levels: impl Iterator<Item = f64>,
        out: &mut Vec<Segment>,
    ) {
        let levels: Vec<f64> = levels.collect();
        self.extract(frame, kind, true, out, |_, tri, mut emit| {
            for &level in &levels {
                Isoline::new(field, level).extract_face(&self.mesh.positions, tri, &mut emit);
            }
        });
    }

    fn draw_curvature_zeros(&self, frame: &Frame, out: &mut Vec<Segment>) {
        let config = frame.config;
        let mesh = self.mesh;
        if config.parabolic_lines {
            let gaussian: Vec<f64> = mesh.curv1.iter().zip(&mesh.curv2).map(|(a, b)| a * b).collect();
            self.draw_levels(frame, FeatureKind::Parabolic, &gaussian, [0.0].into_iter(), out);
        }
        if config.mean_curvature_zero_lines {
            let mean: Vec<f64> = mesh
                .curv1
                .iter()
                .zip(&mesh.curv2)
                .map(|(a, b)| 0.5 * (a + b))
                .collect();
            self.draw_levels(frame, FeatureKind::MeanCurvatureZero, &mean, [0.0].into_iter(), out);
        }
        if config.dwkr_lines {
            let field = &frame.fields.sctest_num;
            self.draw_levels(frame, FeatureKind::DwKr, field, [0.0].into_iter(), out);
        }
    }
}

/// A face is back-facing when at least two corners face away.
#[inline]
fn is_backfacing(ndotv: &[f64], tri: [usize; 3]) -> bool {
    tri.iter().filter(|&&v| ndotv[v] <= 0.0).count() >= 2
}

fn check_topology(mesh: &CurvatureMesh, topology: &MeshTopology) -> Result<()> {
    if topology.covers(mesh) {
        return Ok(());
    }
    Err(LineError::TopologyMismatch {
        mesh_vertices: mesh.vertex_count(),
        mesh_faces: mesh.face_count(),
        topology_vertices: topology.adjacent_faces.len(),
        topology_faces: topology.across_edge.len(),
    })
}
