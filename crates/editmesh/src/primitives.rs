//! Small meshes used by tools and tests.
//!
//! Every builder returns the mesh together with its vertices in creation
//! order, so callers can address elements by position.

use glam::Vec3;

use super::types::VertId;
use super::EditMesh;

fn build(positions: &[Vec3], polygons: &[Vec<usize>]) -> (EditMesh, Vec<VertId>) {
    let mut mesh = EditMesh::new();
    let verts: Vec<VertId> = positions.iter().map(|&co| mesh.create_vert(co)).collect();
    for polygon in polygons {
        let face: Vec<VertId> = polygon.iter().map(|&i| verts[i]).collect();
        // Fixed inputs below are always valid polygons
        let _ = mesh.create_face(&face, None);
    }
    mesh.recalculate_vert_normals();
    (mesh, verts)
}

/// Closed tetrahedron with outward facing triangles
pub fn tetrahedron() -> (EditMesh, Vec<VertId>) {
    build(
        &[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.5, 1.0, 0.0),
            Vec3::new(0.5, 0.4, 1.0),
        ],
        &[vec![0, 2, 1], vec![0, 1, 3], vec![1, 2, 3], vec![2, 0, 3]],
    )
}

/// Planar grid of `nx` by `ny` unit quads in the XY plane, facing +Z.
///
/// Vertices are row-major: index `j * (nx + 1) + i` sits at `(i, j, 0)`.
pub fn quad_grid(nx: usize, ny: usize) -> (EditMesh, Vec<VertId>) {
    let row = nx + 1;
    let positions: Vec<Vec3> = (0..=ny)
        .flat_map(|j| (0..=nx).map(move |i| Vec3::new(i as f32, j as f32, 0.0)))
        .collect();
    let polygons: Vec<Vec<usize>> = (0..ny)
        .flat_map(|j| {
            (0..nx).map(move |i| {
                let a = j * row + i;
                vec![a, a + 1, a + 1 + row, a + row]
            })
        })
        .collect();
    build(&positions, &polygons)
}

/// One unit quad in the XY plane, facing +Z
pub fn single_quad() -> (EditMesh, Vec<VertId>) {
    quad_grid(1, 1)
}

/// Two triangles meeting only at vertex 0 (a bow-tie)
pub fn bowtie() -> (EditMesh, Vec<VertId>) {
    build(
        &[
            Vec3::ZERO,
            Vec3::new(-1.0, 1.0, 0.0),
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        ],
        &[vec![0, 1, 2], vec![0, 3, 4]],
    )
}

/// Axis aligned unit cube with outward facing quads
pub fn cube() -> (EditMesh, Vec<VertId>) {
    build(
        &[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(0.0, 1.0, 1.0),
        ],
        &[
            vec![0, 3, 2, 1],
            vec![4, 5, 6, 7],
            vec![0, 1, 5, 4],
            vec![1, 2, 6, 5],
            vec![2, 3, 7, 6],
            vec![3, 0, 4, 7],
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_counts() {
        let (tet, _) = tetrahedron();
        assert_eq!((tet.vert_count(), tet.edge_count(), tet.face_count()), (4, 6, 4));

        let (grid, _) = quad_grid(2, 2);
        assert_eq!((grid.vert_count(), grid.edge_count(), grid.face_count()), (9, 12, 4));

        let (cube, _) = cube();
        assert_eq!((cube.vert_count(), cube.edge_count(), cube.face_count()), (8, 12, 6));

        let (bowtie, verts) = bowtie();
        assert_eq!(bowtie.edge_count(), 6);
        assert!(!bowtie.vert_is_manifold_region(verts[0]));
    }

    #[test]
    fn test_closed_primitives_are_manifold() {
        for (mesh, _) in [tetrahedron(), cube()] {
            assert!(mesh.validate().is_ok());
            assert!(mesh.edges().all(|(e, _)| mesh.edge_is_manifold(e)));
        }
    }

    #[test]
    fn test_tetrahedron_faces_point_outward() {
        let (mesh, _) = tetrahedron();
        let centroid: Vec3 = mesh.verts().map(|(_, v)| v.co).sum::<Vec3>() / 4.0;
        for (f, _) in mesh.faces() {
            let outward = mesh.face_center(f) - centroid;
            assert!(mesh.face_normal(f).dot(outward) > 0.0);
        }
    }
}
