#![warn(missing_docs)]

//! Feature lines of curvature-annotated triangle meshes.
//!
//! Given a [`CurvatureMesh`](linedraw_mesh::CurvatureMesh) and a viewer
//! position, this crate extracts the line drawing of the surface as a list
//! of styled 3D [`Segment`]s: occluding contours, suggestive contours and
//! highlights, ridges and valleys, apparent ridges, principal highlights,
//! isophotes, topographic lines, silhouettes and boundaries. It does not
//! rasterize; a renderer consumes the segments.
//!
//! A frame has two steps. [`PerViewFields`] computes the view-dependent
//! per-vertex quantities in parallel; [`LineDrawer::draw`] then walks the
//! faces for every feature enabled in the [`LineConfig`]. Thresholds in the
//! config are scale-free and rescaled by the mesh
//! [feature size](feature_size::feature_size).
//!
//! # Example
//!
//! ```
//! use linedraw_lines::{FeatureKind, LineConfig, LineDrawer};
//! use linedraw_math::Point3;
//! use linedraw_mesh::{generators, MeshTopology};
//!
//! let mesh = generators::torus(2.0, 0.6, 48, 24);
//! let topology = MeshTopology::build(&mesh);
//! let drawer = LineDrawer::for_mesh(&mesh, &topology)?;
//!
//! let config = LineConfig {
//!     suggestive_contours: true,
//!     ..Default::default()
//! };
//! let mut fields = drawer.compute_fields(Point3::new(5.0, 0.0, 3.0), &config);
//! let segments = drawer.draw(&fields, &config)?;
//! assert!(segments.iter().any(|s| s.kind == FeatureKind::Contour));
//!
//! // Next frame: reuse the field buffers.
//! drawer.update_fields(&mut fields, Point3::new(4.0, 2.0, 3.0), &config);
//! let next = drawer.draw(&fields, &config)?;
//! assert!(!next.is_empty());
//! # Ok::<(), linedraw_lines::LineError>(())
//! ```

pub mod apparent;
pub mod boundary;
pub mod chain;
pub mod config;
pub mod draw;
pub mod error;
pub mod feature_size;
pub mod gradient;
pub mod highlight;
pub mod isoline;
pub mod perview;
pub mod ridge;
pub mod silhouette;
pub mod types;
pub mod zero;

pub use chain::chain_segments;
pub use config::LineConfig;
pub use draw::LineDrawer;
pub use error::{LineError, Result};
pub use feature_size::feature_size;
pub use gradient::gradkr;
pub use isoline::{Interpolation, Isoline, TestField};
pub use perview::{FieldNeeds, FieldOptions, PerViewFields};
pub use ridge::{RidgeCache, RidgeFlavor, RidgeParams};
pub use types::{FeatureKind, LinePiece, LineStyle, Polyline, Rgb, Segment, Visibility};
pub use zero::{find_zero_hermite, find_zero_linear};
