use log::trace;
use nalgebra::{Point2, Point3};

/// Texture coordinate of each quad corner, in corner order.
pub const QUAD_TEXCOORDS: [[f32; 2]; 4] = [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]];
/// Two triangles sharing the 0-2 diagonal.
pub const QUAD_TRIANGLES: [[u16; 3]; 2] = [[0, 1, 2], [0, 2, 3]];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshVertex {
    pub position: Point3<f32>,
    pub texcoord: Point2<f32>,
}

/// Four ordered scene space corners with their fixed texture coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneQuad {
    pub vertices: [MeshVertex; 4],
}

impl SceneQuad {
    /// `None` unless there are exactly four points.
    pub fn from_points(points: &[Point3<f32>]) -> Option<Self> {
        let [a, b, c, d] = points else {
            return None;
        };

        let corners = [*a, *b, *c, *d];

        Some(Self {
            vertices: std::array::from_fn(|index| MeshVertex {
                position: corners[index],
                texcoord: Point2::from(QUAD_TEXCOORDS[index]),
            }),
        })
    }
}

/// Render engine mesh whose geometry is rewritten at runtime.
///
/// Vertices and triangles are only emitted between `begin_update` and `end_update`.
pub trait DynamicMesh {
    fn begin_update(&mut self);

    fn vertex(&mut self, vertex: &MeshVertex);

    fn triangle(&mut self, a: u16, b: u16, c: u16);

    fn end_update(&mut self);
}

/// Writes a [`SceneQuad`] into a [`DynamicMesh`].
#[derive(Debug, Default, Clone, Copy)]
pub struct MeshUpdater;

impl MeshUpdater {
    pub fn new() -> Self {
        Self
    }

    /// Rewrites the mesh with `points` when there are exactly four of them.
    /// Returns whether the mesh was written; otherwise it is left untouched.
    pub fn update<D: DynamicMesh + ?Sized>(&self, mesh: &mut D, points: &[Point3<f32>]) -> bool {
        let Some(quad) = SceneQuad::from_points(points) else {
            trace!("Skipping mesh update with {} points", points.len());
            return false;
        };

        self.write(mesh, &quad);

        true
    }

    pub fn write<D: DynamicMesh + ?Sized>(&self, mesh: &mut D, quad: &SceneQuad) {
        mesh.begin_update();

        for vertex in &quad.vertices {
            mesh.vertex(vertex);
        }

        for [a, b, c] in QUAD_TRIANGLES {
            mesh.triangle(a, b, c);
        }

        mesh.end_update();
    }
}

/// In-memory [`DynamicMesh`] holding the geometry of the last completed update.
#[derive(Debug, Default, Clone)]
pub struct VertexBufferMesh {
    vertices: Vec<MeshVertex>,
    indices: Vec<u16>,
    staged_vertices: Vec<MeshVertex>,
    staged_indices: Vec<u16>,
    updating: bool,
    updates: u64,
}

impl VertexBufferMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertices(&self) -> &[MeshVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// Number of completed updates
    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn quad(&self) -> Option<SceneQuad> {
        let positions: Vec<_> = self.vertices.iter().map(|vertex| vertex.position).collect();

        SceneQuad::from_points(&positions)
    }
}

impl DynamicMesh for VertexBufferMesh {
    fn begin_update(&mut self) {
        self.staged_vertices.clear();
        self.staged_indices.clear();
        self.updating = true;
    }

    fn vertex(&mut self, vertex: &MeshVertex) {
        if self.updating {
            self.staged_vertices.push(*vertex);
        }
    }

    fn triangle(&mut self, a: u16, b: u16, c: u16) {
        if self.updating {
            self.staged_indices.extend([a, b, c]);
        }
    }

    fn end_update(&mut self) {
        if !self.updating {
            return;
        }

        std::mem::swap(&mut self.vertices, &mut self.staged_vertices);
        std::mem::swap(&mut self.indices, &mut self.staged_indices);
        self.updating = false;
        self.updates += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(count: usize) -> Vec<Point3<f32>> {
        (0..count).map(|index| Point3::new(index as f32, 0.5, -1.0)).collect()
    }

    #[test]
    fn only_four_points_write_the_mesh() {
        let updater = MeshUpdater::new();
        let mut mesh = VertexBufferMesh::new();

        for count in [0, 1, 2, 3, 5, 6, 9] {
            assert!(!updater.update(&mut mesh, &points(count)));
        }

        assert_eq!(mesh.updates(), 0);
        assert!(mesh.vertices().is_empty());

        assert!(updater.update(&mut mesh, &points(4)));
        assert_eq!(mesh.updates(), 1);
    }

    #[test]
    fn vertices_carry_fixed_texcoords() {
        let mut mesh = VertexBufferMesh::new();
        MeshUpdater::new().update(&mut mesh, &points(4));

        let texcoords: Vec<_> = mesh.vertices().iter().map(|vertex| vertex.texcoord).collect();

        assert_eq!(
            texcoords,
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(0.0, 1.0),
                Point2::new(1.0, 1.0),
                Point2::new(1.0, 0.0)
            ]
        );
        assert_eq!(mesh.vertices()[2].position, Point3::new(2.0, 0.5, -1.0));
        assert_eq!(mesh.indices(), &[0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn rejected_update_keeps_previous_quad() {
        let updater = MeshUpdater::new();
        let mut mesh = VertexBufferMesh::new();
        updater.update(&mut mesh, &points(4));

        let previous = mesh.quad();
        updater.update(&mut mesh, &points(3));

        assert_eq!(mesh.quad(), previous);
        assert_eq!(mesh.updates(), 1);
    }

    #[test]
    fn emission_outside_an_update_is_ignored() {
        let mut mesh = VertexBufferMesh::new();
        mesh.vertex(&MeshVertex {
            position: Point3::origin(),
            texcoord: Point2::origin(),
        });
        mesh.end_update();

        assert!(mesh.vertices().is_empty());
        assert_eq!(mesh.updates(), 0);
    }
}
