//! Mesh boundary edges.

use linedraw_mesh::{CurvatureMesh, MeshTopology};

use crate::types::LinePiece;

/// Pieces for every boundary edge.
///
/// With `draw_hidden` each edge is emitted twice, once visible and once
/// hidden, so a depth-testing renderer can show the occluded part in the
/// hidden style.
pub fn boundary_pieces(
    mesh: &CurvatureMesh,
    topology: &MeshTopology,
    draw_hidden: bool,
    emit: &mut impl FnMut(LinePiece),
) {
    let edges: Vec<_> = topology.boundary_edges(mesh).collect();
    for edge in &edges {
        let [a, b] = edge.map(|v| mesh.positions[v as usize]);
        emit(LinePiece::visible(a, b));
    }
    if draw_hidden {
        for edge in &edges {
            let [a, b] = edge.map(|v| mesh.positions[v as usize]);
            emit(LinePiece::hidden(a, b));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Visibility;
    use linedraw_mesh::generators;

    #[test]
    fn test_patch_boundary() {
        let mesh = generators::flat_patch(2.0, 3);
        let topo = MeshTopology::build(&mesh);
        let mut out = Vec::new();
        boundary_pieces(&mesh, &topo, false, &mut |p| out.push(p));
        assert_eq!(out.len(), 12);
        let perimeter: f64 = out.iter().map(|p| (p.p1 - p.p0).norm()).sum();
        assert!((perimeter - 8.0).abs() < 1e-9);
        for p in &out {
            let on_edge = |c: f64| (c.abs() - 1.0).abs() < 1e-12;
            assert!(on_edge(p.p0.x) || on_edge(p.p0.y));
        }
    }

    #[test]
    fn test_hidden_pass() {
        let mesh = generators::flat_patch(1.0, 2);
        let topo = MeshTopology::build(&mesh);
        let mut out = Vec::new();
        boundary_pieces(&mesh, &topo, true, &mut |p| out.push(p));
        assert_eq!(out.len(), 16);
        assert_eq!(
            out.iter().filter(|p| p.visibility == Visibility::Hidden).count(),
            8
        );
    }

    #[test]
    fn test_closed_mesh_has_no_boundary() {
        let mesh = generators::torus(2.0, 0.5, 8, 6);
        let topo = MeshTopology::build(&mesh);
        let mut count = 0;
        boundary_pieces(&mesh, &topo, true, &mut |_| count += 1);
        assert_eq!(count, 0);
    }
}
