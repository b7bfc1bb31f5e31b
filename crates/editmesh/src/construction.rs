//! Construction methods for EditMesh.

use glam::Vec3;
use tracing::debug;

use super::types::{EditMeshError, VertId};
use super::EditMesh;

impl EditMesh {
    /// Build an edit mesh from positions and polygons given as vertex indices.
    ///
    /// Polygons keep their winding. Shared edges are created once.
    pub fn from_polygons(
        positions: &[Vec3],
        polygons: &[Vec<usize>],
    ) -> Result<Self, EditMeshError> {
        let mut mesh = Self::new();
        let verts: Vec<VertId> = positions.iter().map(|&co| mesh.create_vert(co)).collect();

        for polygon in polygons {
            let face_verts = polygon
                .iter()
                .map(|&index| {
                    verts
                        .get(index)
                        .copied()
                        .ok_or(EditMeshError::VertexIndexOutOfRange {
                            index,
                            count: verts.len(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            mesh.create_face(&face_verts, None)?;
        }

        mesh.recalculate_vert_normals();
        debug!(
            "from_polygons: {} verts, {} edges, {} faces",
            mesh.vert_count(),
            mesh.edge_count(),
            mesh.face_count()
        );
        Ok(mesh)
    }
}

#[cfg(feature = "bevy")]
mod bevy_mesh {
    use bevy::asset::RenderAssetUsages;
    use bevy::mesh::{Indices, PrimitiveTopology, VertexAttributeValues};
    use bevy::prelude::Mesh;
    use glam::{Vec2, Vec3};
    use std::collections::HashMap;

    use crate::types::{EditMeshError, VertId};
    use crate::EditMesh;

    impl EditMesh {
        /// Build an edit mesh from a triangle-list Bevy mesh.
        ///
        /// Positionally identical vertices are welded so UV seams do not turn
        /// into boundaries. UVs move onto face corners.
        pub fn from_bevy_mesh(mesh: &Mesh) -> Result<Self, EditMeshError> {
            let positions = mesh
                .attribute(Mesh::ATTRIBUTE_POSITION)
                .and_then(|attr| attr.as_float3())
                .ok_or(EditMeshError::NoPositions)?;

            let uvs: Option<Vec<[f32; 2]>> =
                mesh.attribute(Mesh::ATTRIBUTE_UV_0)
                    .and_then(|attr| match attr {
                        VertexAttributeValues::Float32x2(v) => Some(v.clone()),
                        _ => None,
                    });

            let indices: Vec<usize> = match mesh.indices() {
                Some(Indices::U16(idx)) => idx.iter().map(|&i| i as usize).collect(),
                Some(Indices::U32(idx)) => idx.iter().map(|&i| i as usize).collect(),
                None => return Err(EditMeshError::NoIndices),
            };

            if indices.len() % 3 != 0 {
                return Err(EditMeshError::InvalidTopology(
                    "Index count not divisible by 3".to_string(),
                ));
            }

            // === Vertex Welding ===
            let quantize = |p: &[f32; 3]| -> [i64; 3] {
                [
                    (p[0] * 1_000_000.0) as i64,
                    (p[1] * 1_000_000.0) as i64,
                    (p[2] * 1_000_000.0) as i64,
                ]
            };

            let mut edit = EditMesh::new();
            let mut position_to_vert: HashMap<[i64; 3], VertId> = HashMap::new();
            let welded: Vec<VertId> = positions
                .iter()
                .map(|pos| {
                    *position_to_vert
                        .entry(quantize(pos))
                        .or_insert_with(|| edit.create_vert(Vec3::from_array(*pos)))
                })
                .collect();

            if position_to_vert.len() < positions.len() {
                tracing::debug!(
                    "from_bevy_mesh: welded {} duplicate vertices ({} unique of {} total)",
                    positions.len() - position_to_vert.len(),
                    position_to_vert.len(),
                    positions.len()
                );
            }

            for tri in indices.chunks(3) {
                if let Some(&index) = tri.iter().find(|&&i| i >= welded.len()) {
                    return Err(EditMeshError::VertexIndexOutOfRange {
                        index,
                        count: welded.len(),
                    });
                }
                let verts = [welded[tri[0]], welded[tri[1]], welded[tri[2]]];
                // Collapsed by welding, or repeated in the source
                if verts[0] == verts[1] || verts[1] == verts[2] || verts[0] == verts[2] {
                    continue;
                }
                let f = match edit.create_face(&verts, None) {
                    Ok(f) => f,
                    Err(EditMeshError::DuplicateFace) => continue,
                    Err(err) => return Err(err),
                };
                if let Some(uvs) = &uvs {
                    for (l, &index) in edit.face_loops(f).into_iter().zip(tri) {
                        edit.loops[l].uv = uvs.get(index).map(|uv| Vec2::from_array(*uv));
                    }
                }
            }

            edit.recalculate_vert_normals();
            Ok(edit)
        }

        /// Convert to a triangle-list Bevy mesh.
        ///
        /// Every face emits its own corners so per-corner UVs survive. Flat
        /// faces use the face normal, smooth faces the vertex normals.
        pub fn to_bevy_mesh(&self) -> Mesh {
            let mut positions: Vec<[f32; 3]> = Vec::new();
            let mut normals: Vec<[f32; 3]> = Vec::new();
            let mut uvs: Vec<[f32; 2]> = Vec::new();
            let mut indices: Vec<u32> = Vec::new();

            for (f, face) in self.faces() {
                let loops = self.face_loops(f);
                if loops.len() < 3 {
                    continue;
                }
                let face_normal = self.face_normal(f);

                let base_idx = positions.len() as u32;
                for l in &loops {
                    let lp = &self.loops[*l];
                    let Some(vert) = self.vert(lp.v) else {
                        continue;
                    };
                    let normal = if face.smooth { vert.normal } else { face_normal };
                    positions.push(vert.co.to_array());
                    normals.push(normal.to_array());
                    uvs.push(lp.uv.unwrap_or(Vec2::ZERO).to_array());
                }

                // Fan triangulation
                for i in 1..(loops.len() - 1) {
                    indices.push(base_idx);
                    indices.push(base_idx + i as u32);
                    indices.push(base_idx + i as u32 + 1);
                }
            }

            let mut mesh = Mesh::new(
                PrimitiveTopology::TriangleList,
                RenderAssetUsages::default(),
            );
            mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
            mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
            mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
            mesh.insert_indices(Indices::U32(indices));
            mesh
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn create_two_triangle_mesh() -> Mesh {
            let mut mesh = Mesh::new(
                PrimitiveTopology::TriangleList,
                RenderAssetUsages::default(),
            );
            // second triangle repeats two positions, as at a UV seam
            mesh.insert_attribute(
                Mesh::ATTRIBUTE_POSITION,
                vec![
                    [0.0, 0.0, 0.0],
                    [1.0, 0.0, 0.0],
                    [1.0, 1.0, 0.0],
                    [0.0, 0.0, 0.0],
                    [1.0, 1.0, 0.0],
                    [0.0, 1.0, 0.0],
                ],
            );
            mesh.insert_attribute(
                Mesh::ATTRIBUTE_UV_0,
                vec![
                    [0.0, 0.0],
                    [1.0, 0.0],
                    [1.0, 1.0],
                    [0.5, 0.0],
                    [1.0, 1.0],
                    [0.0, 1.0],
                ],
            );
            mesh.insert_indices(Indices::U32(vec![0, 1, 2, 3, 4, 5]));
            mesh
        }

        #[test]
        fn test_from_bevy_mesh_welds_seams() {
            let edit = EditMesh::from_bevy_mesh(&create_two_triangle_mesh()).unwrap();

            assert_eq!(edit.vert_count(), 4);
            assert_eq!(edit.edge_count(), 5);
            assert_eq!(edit.face_count(), 2);
            assert!(edit.validate().is_ok());
        }

        #[test]
        fn test_from_bevy_mesh_keeps_corner_uvs() {
            let edit = EditMesh::from_bevy_mesh(&create_two_triangle_mesh()).unwrap();
            let origin_uvs: Vec<Vec2> = edit
                .verts()
                .filter(|(_, v)| v.co == Vec3::ZERO)
                .flat_map(|(v, _)| edit.vert_loops(v))
                .filter_map(|l| edit.get_loop(l).and_then(|lp| lp.uv))
                .collect();

            assert_eq!(origin_uvs.len(), 2);
            assert!(origin_uvs.contains(&Vec2::new(0.5, 0.0)));
        }

        #[test]
        fn test_to_bevy_mesh_triangulates() {
            let (edit, _) = crate::primitives::single_quad();
            let mesh = edit.to_bevy_mesh();

            assert_eq!(mesh.count_vertices(), 4);
            match mesh.indices() {
                Some(Indices::U32(idx)) => assert_eq!(idx.len(), 6),
                other => panic!("unexpected indices {:?}", other.map(|i| i.len())),
            }
        }
    }
}
