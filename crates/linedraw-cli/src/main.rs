//! linedraw CLI - feature-line drawings of analytic surfaces
//!
//! Builds a curvature-annotated test surface, extracts its feature lines
//! for a viewer position and writes them as SVG or JSON.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use linedraw_lines::{chain_segments, FeatureKind, LineConfig, LineDrawer, Segment};
use linedraw_math::Point3;
use linedraw_mesh::MeshTopology;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod surface;
mod svg;

use surface::{parse_point, Surface};
use svg::{export_svg, Camera, SvgParams};

/// Endpoints closer than this are joined when chaining.
const CHAIN_TOLERANCE: f64 = 1e-9;

#[derive(Parser)]
#[command(name = "linedraw")]
#[command(about = "Feature-line drawings of curvature-annotated surfaces", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract feature lines and write them out
    Draw {
        /// Surface to draw
        #[arg(long, value_enum, default_value_t = Surface::Torus)]
        surface: Surface,
        /// Tessellation resolution
        #[arg(long, default_value_t = 48)]
        resolution: usize,
        /// Viewer position as x,y,z
        #[arg(long, value_parser = parse_point, default_value = "5,0,3")]
        view: Point3,
        /// TOML line configuration (defaults apply to missing keys)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Svg)]
        format: OutputFormat,
        /// Join segments into polylines (JSON output only)
        #[arg(long)]
        chain: bool,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Vertical field of view in degrees for SVG projection
        #[arg(long, default_value_t = 40.0)]
        fov: f64,
    },
    /// Print mesh statistics and the feature size
    Info {
        /// Surface to inspect
        #[arg(long, value_enum, default_value_t = Surface::Torus)]
        surface: Surface,
        /// Tessellation resolution
        #[arg(long, default_value_t = 48)]
        resolution: usize,
    },
    /// Print the default line configuration as TOML
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Svg,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Draw {
            surface,
            resolution,
            view,
            config,
            format,
            chain,
            output,
            fov,
        } => {
            let config = load_config(config.as_deref())?;
            let rendered = draw(surface, resolution, view, &config, format, chain, fov)?;
            write_output(output.as_deref(), &rendered)?;
        }
        Commands::Info {
            surface,
            resolution,
        } => {
            show_info(surface, resolution)?;
        }
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&LineConfig::default())?);
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<LineConfig> {
    let config = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => LineConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn draw(
    surface: Surface,
    resolution: usize,
    view: Point3,
    config: &LineConfig,
    format: OutputFormat,
    chain: bool,
    fov: f64,
) -> Result<String> {
    let mesh = surface.build(resolution);
    let topology = MeshTopology::build(&mesh);
    let drawer = LineDrawer::for_mesh(&mesh, &topology)?;

    let camera = Camera::new(&view, &surface.center(), fov)
        .context("viewer position coincides with the surface center")?;
    let segments = drawer.render_transform(camera.model_view(), config)?;
    log_counts(&segments);

    let rendered = match format {
        OutputFormat::Svg => export_svg(&segments, &camera, &SvgParams::default()),
        OutputFormat::Json if chain => {
            serde_json::to_string_pretty(&chain_segments(&segments, CHAIN_TOLERANCE))?
        }
        OutputFormat::Json => serde_json::to_string_pretty(&segments)?,
    };
    Ok(rendered)
}

fn log_counts(segments: &[Segment]) {
    for kind in FeatureKind::ALL {
        let count = segments.iter().filter(|s| s.kind == kind).count();
        if count > 0 {
            info!(kind = kind.name(), count, "Extracted feature lines");
        }
    }
}

fn write_output(path: Option<&Path>, rendered: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, rendered).with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn show_info(surface: Surface, resolution: usize) -> Result<()> {
    let mesh = surface.build(resolution);
    let topology = MeshTopology::build(&mesh);
    let drawer = LineDrawer::for_mesh(&mesh, &topology)?;

    println!("Surface: {surface:?}");
    println!("Vertices: {}", mesh.vertex_count());
    println!("Faces: {}", mesh.face_count());
    println!("Boundary edges: {}", topology.boundary_edges(&mesh).count());
    if let Some(sphere) = mesh.bounding_sphere() {
        println!(
            "Bounding sphere: center ({:.3}, {:.3}, {:.3}), radius {:.4}",
            sphere.center.x, sphere.center.y, sphere.center.z, sphere.radius
        );
    }
    println!("Feature size: {:.6}", drawer.feature_size());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_draw() {
        let cli = Cli::try_parse_from([
            "linedraw", "draw", "--surface", "sphere", "--view", "0,0,4", "--format", "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Draw {
                surface,
                view,
                format,
                ..
            } => {
                assert_eq!(surface, Surface::Sphere);
                assert_eq!(view, Point3::new(0.0, 0.0, 4.0));
                assert_eq!(format, OutputFormat::Json);
            }
            _ => panic!("expected draw"),
        }
    }

    #[test]
    fn test_draw_json_segments() {
        let config = LineConfig::default();
        let json = draw(
            Surface::Sphere,
            16,
            Point3::new(0.0, 0.0, 4.0),
            &config,
            OutputFormat::Json,
            false,
            40.0,
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let segments = value.as_array().unwrap();
        assert!(!segments.is_empty());
        assert!(segments.iter().all(|s| s["kind"] == "contour"));
    }

    #[test]
    fn test_draw_svg() {
        let config = LineConfig {
            ridges: true,
            valleys: true,
            ..Default::default()
        };
        let svg = draw(
            Surface::Torus,
            16,
            Point3::new(5.0, 0.0, 3.0),
            &config,
            OutputFormat::Svg,
            false,
            40.0,
        )
        .unwrap();
        assert!(svg.contains("<line"));
    }

    #[test]
    fn test_draw_chained_sphere_contour_is_one_loop() {
        let json = draw(
            Surface::Sphere,
            24,
            Point3::new(0.0, 0.0, 4.0),
            &LineConfig::default(),
            OutputFormat::Json,
            true,
            40.0,
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let polylines = value.as_array().unwrap();
        assert_eq!(polylines.len(), 1);
        assert_eq!(polylines[0]["closed"], true);
    }

    #[test]
    fn test_draw_rejects_view_at_center() {
        let result = draw(
            Surface::Sphere,
            8,
            Point3::origin(),
            &LineConfig::default(),
            OutputFormat::Svg,
            false,
            40.0,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_default_config_toml_round_trips() {
        let text = toml::to_string_pretty(&LineConfig::default()).unwrap();
        let parsed: LineConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, LineConfig::default());
    }
}
