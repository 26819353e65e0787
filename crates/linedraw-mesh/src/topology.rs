//! Adjacency queries over a [`CurvatureMesh`].
//!
//! Built once per mesh and shared read-only by every frame. The view-dependent
//! curvature derivative walks the faces around a vertex, and the boundary
//! extractor needs to know which face edges have no neighbor.

use std::collections::HashMap;

use tracing::debug;

use crate::CurvatureMesh;

/// Precomputed adjacency for a triangle mesh.
#[derive(Debug, Clone, Default)]
pub struct MeshTopology {
    /// For each vertex, the faces that contain it.
    pub adjacent_faces: Vec<Vec<u32>>,

    /// For each face, the face across each of its edges.
    ///
    /// Edge `j` is the edge opposite corner `j`, i.e. the one joining
    /// corners `(j + 1) % 3` and `(j + 2) % 3`. `None` marks a boundary edge.
    pub across_edge: Vec<[Option<u32>; 3]>,
}

impl MeshTopology {
    /// Build adjacency from the face list.
    pub fn build(mesh: &CurvatureMesh) -> Self {
        let mut adjacent_faces: Vec<Vec<u32>> = vec![Vec::new(); mesh.vertex_count()];
        for (f, tri) in mesh.faces.iter().enumerate() {
            for &v in tri {
                if let Some(list) = adjacent_faces.get_mut(v as usize) {
                    list.push(f as u32);
                }
            }
        }

        // Undirected edge -> faces using it.
        let mut edge_faces: HashMap<(u32, u32), Vec<u32>> = HashMap::new();
        for (f, &[a, b, c]) in mesh.faces.iter().enumerate() {
            for (v0, v1) in [(b, c), (c, a), (a, b)] {
                edge_faces.entry(edge_key(v0, v1)).or_default().push(f as u32);
            }
        }

        let across_edge: Vec<[Option<u32>; 3]> = mesh
            .faces
            .iter()
            .enumerate()
            .map(|(f, tri)| {
                std::array::from_fn(|j| {
                    let key = edge_key(tri[(j + 1) % 3], tri[(j + 2) % 3]);
                    edge_faces
                        .get(&key)
                        .and_then(|faces| faces.iter().copied().find(|&g| g != f as u32))
                })
            })
            .collect();

        let non_manifold = edge_faces.values().filter(|faces| faces.len() > 2).count();
        debug!(
            vertices = mesh.vertex_count(),
            faces = mesh.face_count(),
            edges = edge_faces.len(),
            non_manifold,
            "Built mesh topology"
        );

        Self {
            adjacent_faces,
            across_edge,
        }
    }

    /// Whether this adjacency was built for a mesh of `mesh`'s size.
    pub fn covers(&self, mesh: &CurvatureMesh) -> bool {
        self.adjacent_faces.len() == mesh.vertex_count()
            && self.across_edge.len() == mesh.face_count()
    }

    /// Endpoints of every edge with a single incident face, in face
    /// winding order.
    pub fn boundary_edges<'a>(
        &'a self,
        mesh: &'a CurvatureMesh,
    ) -> impl Iterator<Item = [u32; 2]> + 'a {
        self.across_edge
            .iter()
            .zip(&mesh.faces)
            .flat_map(|(across, tri)| {
                (0..3)
                    .filter(move |&j| across[j].is_none())
                    .map(move |j| [tri[(j + 1) % 3], tri[(j + 2) % 3]])
            })
    }
}

fn edge_key(v0: u32, v1: u32) -> (u32, u32) {
    if v0 < v1 {
        (v0, v1)
    } else {
        (v1, v0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators;

    #[test]
    fn test_closed_sphere_has_no_boundary() {
        let mesh = generators::uv_sphere(1.0, 6, 12);
        let topo = MeshTopology::build(&mesh);
        assert_eq!(topo.boundary_edges(&mesh).count(), 0);
        assert!(topo.across_edge.iter().all(|a| a.iter().all(Option::is_some)));
    }

    #[test]
    fn test_flat_patch_boundary() {
        // n x n quads: 4n boundary edges.
        let n = 4;
        let mesh = generators::flat_patch(2.0, n);
        let topo = MeshTopology::build(&mesh);
        assert_eq!(topo.boundary_edges(&mesh).count(), 4 * n);

        // The center vertex of the grid is on no boundary edge.
        let center = ((n / 2) * (n + 1) + n / 2) as u32;
        assert!(topo.boundary_edges(&mesh).all(|e| !e.contains(&center)));
        assert!(topo.boundary_edges(&mesh).any(|e| e.contains(&0)));
    }

    #[test]
    fn test_covers_only_its_own_mesh() {
        let patch = generators::flat_patch(1.0, 2);
        let sphere = generators::uv_sphere(1.0, 6, 12);
        let topo = MeshTopology::build(&patch);
        assert!(topo.covers(&patch));
        assert!(!topo.covers(&sphere));
        assert!(!MeshTopology::default().covers(&patch));
    }

    #[test]
    fn test_adjacent_faces_of_interior_grid_vertex() {
        let n = 4;
        let mesh = generators::flat_patch(2.0, n);
        let topo = MeshTopology::build(&mesh);
        let center = (n / 2) * (n + 1) + n / 2;
        assert_eq!(topo.adjacent_faces[center].len(), 6);
    }

    #[test]
    fn test_across_edge_is_symmetric() {
        let mesh = generators::torus(2.0, 0.5, 12, 8);
        let topo = MeshTopology::build(&mesh);
        for (f, across) in topo.across_edge.iter().enumerate() {
            for g in across.iter().flatten() {
                assert!(topo.across_edge[*g as usize].contains(&Some(f as u32)));
            }
        }
    }
}
