//! Element creation and merging for EditMesh.

use glam::Vec3;
use smallvec::SmallVec;
use tracing::trace;

use super::types::{
    EditMeshError, ElemFlags, Edge, EdgeId, Face, FaceId, Loop, LoopId, SelectHistoryElem, Vert,
    VertId,
};
use super::EditMesh;

impl EditMesh {
    /// Add a loose vertex
    pub fn create_vert(&mut self, co: Vec3) -> VertId {
        self.verts.insert(Vert {
            co,
            normal: Vec3::ZERO,
            flags: ElemFlags::empty(),
            edges: SmallVec::new(),
        })
    }

    /// Add a vertex copying position, normal and header flags of `example`
    /// (the operator tag is not copied).
    pub(crate) fn create_vert_from(&mut self, example: VertId) -> Result<VertId, EditMeshError> {
        let src = self.vert(example).ok_or(EditMeshError::InvalidVert(example))?;
        let vert = Vert {
            co: src.co,
            normal: src.normal,
            flags: src.flags - ElemFlags::TAG,
            edges: SmallVec::new(),
        };
        Ok(self.verts.insert(vert))
    }

    /// Create an edge between two vertices, returning the existing edge if
    /// they are already connected.
    pub fn create_edge(&mut self, v1: VertId, v2: VertId) -> Result<EdgeId, EditMeshError> {
        if v1 == v2 {
            return Err(EditMeshError::DegenerateEdge);
        }
        if self.vert(v1).is_none() {
            return Err(EditMeshError::InvalidVert(v1));
        }
        if self.vert(v2).is_none() {
            return Err(EditMeshError::InvalidVert(v2));
        }
        if let Some(existing) = self.edge_exists(v1, v2) {
            return Ok(existing);
        }
        Ok(self.insert_edge(v1, v2, ElemFlags::empty()))
    }

    /// Insert an edge without checking for an existing one
    pub(crate) fn insert_edge(&mut self, v1: VertId, v2: VertId, flags: ElemFlags) -> EdgeId {
        let e = self.edges.insert(Edge {
            v1,
            v2,
            flags,
            loops: SmallVec::new(),
        });
        self.disk_append(v1, e);
        self.disk_append(v2, e);
        e
    }

    /// Create a face from an ordered vertex list.
    ///
    /// Missing edges are created. Fails if the polygon is degenerate or a face
    /// with the same vertices already exists. Face attributes (material,
    /// shading) are copied from `example` when given.
    pub fn create_face(
        &mut self,
        verts: &[VertId],
        example: Option<FaceId>,
    ) -> Result<FaceId, EditMeshError> {
        if verts.len() < 3 {
            return Err(EditMeshError::DegenerateFace(verts.len()));
        }
        for (i, &v) in verts.iter().enumerate() {
            if self.vert(v).is_none() {
                return Err(EditMeshError::InvalidVert(v));
            }
            if verts[..i].contains(&v) {
                return Err(EditMeshError::DegenerateFace(verts.len()));
            }
        }
        if self.face_exists(verts).is_some() {
            return Err(EditMeshError::DuplicateFace);
        }

        let mut edges = Vec::with_capacity(verts.len());
        for i in 0..verts.len() {
            edges.push(self.create_edge(verts[i], verts[(i + 1) % verts.len()])?);
        }

        let (material_index, smooth) = example
            .and_then(|f| self.face(f))
            .map_or((0, false), |f| (f.material_index, f.smooth));

        let f = self.faces.insert(Face {
            first: LoopId::default(),
            len: verts.len(),
            material_index,
            smooth,
            flags: ElemFlags::empty(),
        });

        let loop_ids: Vec<LoopId> = verts
            .iter()
            .zip(&edges)
            .map(|(&v, &e)| {
                self.loops.insert(Loop {
                    v,
                    e,
                    f,
                    next: LoopId::default(),
                    prev: LoopId::default(),
                    uv: None,
                })
            })
            .collect();

        let n = loop_ids.len();
        for (i, &l) in loop_ids.iter().enumerate() {
            let lp = &mut self.loops[l];
            lp.next = loop_ids[(i + 1) % n];
            lp.prev = loop_ids[(i + n - 1) % n];
            self.edges[edges[i]].loops.push(l);
        }
        self.faces[f].first = loop_ids[0];

        trace!("create_face: {:?} with {} corners", f, n);
        Ok(f)
    }

    /// Merge `v_src` into `v_dst`, moving all of its edges and corners.
    ///
    /// The two vertices must not share an edge.
    pub fn vert_splice(&mut self, v_dst: VertId, v_src: VertId) -> Result<(), EditMeshError> {
        if self.vert(v_dst).is_none() {
            return Err(EditMeshError::InvalidVert(v_dst));
        }
        if self.vert(v_src).is_none() {
            return Err(EditMeshError::InvalidVert(v_src));
        }
        if v_dst == v_src || self.edge_exists(v_dst, v_src).is_some() {
            return Err(EditMeshError::SpliceConnected);
        }

        for l in self.vert_loops(v_src) {
            self.loops[l].v = v_dst;
        }
        for e in self.vert_edges(v_src) {
            self.edge_replace_vert(e, v_src, v_dst);
        }

        self.verts.remove(v_src);
        self.select_history
            .retain(|elem| *elem != SelectHistoryElem::Vert(v_src));
        trace!("vert_splice: {:?} into {:?}", v_src, v_dst);
        Ok(())
    }

    /// Recalculate vertex normals from adjacent face normals
    pub fn recalculate_vert_normals(&mut self) {
        for v in self.vert_ids() {
            let normal: Vec3 = self
                .vert_faces(v)
                .into_iter()
                .map(|f| self.face_normal(f))
                .sum();
            if let Some(vert) = self.vert_mut(v) {
                vert.normal = normal.normalize_or_zero();
            }
        }
    }

    // ========================================================================
    // Disk / radial bookkeeping
    // ========================================================================

    pub(crate) fn disk_append(&mut self, v: VertId, e: EdgeId) {
        if let Some(vert) = self.verts.get_mut(v) {
            if !vert.edges.contains(&e) {
                vert.edges.push(e);
            }
        }
    }

    pub(crate) fn disk_remove(&mut self, v: VertId, e: EdgeId) {
        if let Some(vert) = self.verts.get_mut(v) {
            vert.edges.retain(|x| *x != e);
        }
    }

    /// Swap one endpoint of an edge, keeping both disk cycles consistent
    pub(crate) fn edge_replace_vert(&mut self, e: EdgeId, v_old: VertId, v_new: VertId) {
        let Some(edge) = self.edges.get_mut(e) else {
            return;
        };
        if edge.v1 == v_old {
            edge.v1 = v_new;
        } else if edge.v2 == v_old {
            edge.v2 = v_new;
        } else {
            return;
        }
        self.disk_remove(v_old, e);
        self.disk_append(v_new, e);
    }

    /// Move a loop from its edge's radial cycle onto `e_new`
    pub(crate) fn loop_move_to_edge(&mut self, l: LoopId, e_new: EdgeId) {
        let Some(e_old) = self.loops.get(l).map(|lp| lp.e) else {
            return;
        };
        if let Some(edge) = self.edges.get_mut(e_old) {
            edge.loops.retain(|x| *x != l);
        }
        if let Some(edge) = self.edges.get_mut(e_new) {
            edge.loops.push(l);
        }
        self.loops[l].e = e_new;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives;

    #[test]
    fn test_create_face_builds_edges() {
        let mut mesh = EditMesh::new();
        let a = mesh.create_vert(Vec3::ZERO);
        let b = mesh.create_vert(Vec3::X);
        let c = mesh.create_vert(Vec3::Y);

        let f = mesh.create_face(&[a, b, c], None).unwrap();

        assert_eq!(mesh.edge_count(), 3);
        assert_eq!(mesh.face_verts(f), vec![a, b, c]);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_create_face_rejects_duplicate() {
        let (mut mesh, verts) = primitives::single_quad();
        let result = mesh.create_face(&[verts[1], verts[2], verts[3], verts[0]], None);

        assert_eq!(result, Err(EditMeshError::DuplicateFace));
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn test_create_face_rejects_repeated_vertex() {
        let (mut mesh, verts) = primitives::single_quad();
        let result = mesh.create_face(&[verts[0], verts[1], verts[0]], None);
        assert!(matches!(result, Err(EditMeshError::DegenerateFace(3))));
    }

    #[test]
    fn test_create_edge_returns_existing() {
        let (mut mesh, verts) = primitives::single_quad();
        let existing = mesh.edge_exists(verts[0], verts[1]).unwrap();

        assert_eq!(mesh.create_edge(verts[1], verts[0]), Ok(existing));
        assert_eq!(mesh.edge_count(), 4);
    }

    #[test]
    fn test_splice_merges_loose_vertices() {
        let mut mesh = EditMesh::new();
        let a = mesh.create_vert(Vec3::ZERO);
        let b = mesh.create_vert(Vec3::X);
        let c = mesh.create_vert(Vec3::ZERO);
        let d = mesh.create_vert(Vec3::Y);
        mesh.create_edge(a, b).unwrap();
        mesh.create_edge(c, d).unwrap();

        mesh.vert_splice(a, c).unwrap();

        assert_eq!(mesh.vert_count(), 3);
        assert_eq!(mesh.vert_edge_count(a), 2);
        assert!(mesh.edge_exists(a, d).is_some());
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_splice_rejects_connected() {
        let (mut mesh, verts) = primitives::single_quad();
        assert_eq!(
            mesh.vert_splice(verts[0], verts[1]),
            Err(EditMeshError::SpliceConnected)
        );
    }

    #[test]
    fn test_recalculate_vert_normals() {
        let (mut mesh, verts) = primitives::single_quad();
        mesh.recalculate_vert_normals();
        for v in verts {
            assert!((mesh.vert(v).unwrap().normal - Vec3::Z).length() < 1e-5);
        }
    }
}
