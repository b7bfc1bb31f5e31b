//! Structural validation for EditMesh.
//!
//! Checks that disk cycles, radial cycles and face loops agree with each
//! other. Used by tests and debug assertions after topology changes.

use super::types::{EdgeId, FaceId, LoopId, VertId};
use super::EditMesh;

/// A broken invariant found by [`EditMesh::validate`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Vertex {vert:?} lists missing or unrelated edge {edge:?}")]
    DiskEdge { vert: VertId, edge: EdgeId },
    #[error("Edge {0:?} missing from the disk of one of its vertices")]
    DiskMissing(EdgeId),
    #[error("Edge {0:?} connects a vertex to itself or to a missing vertex")]
    EdgeVerts(EdgeId),
    #[error("Edge {edge:?} lists loop {l:?} which does not use it")]
    RadialLoop { edge: EdgeId, l: LoopId },
    #[error("Loop {0:?} is not in the radial list of its edge")]
    RadialMissing(LoopId),
    #[error("Loop {0:?} edge does not connect its vertex to the next corner")]
    LoopEdge(LoopId),
    #[error("Face {0:?} loop cycle is broken")]
    FaceCycle(FaceId),
    #[error("Face {0:?} has fewer than 3 corners")]
    FaceDegenerate(FaceId),
    #[error("{0} loops are not reachable from any face")]
    OrphanLoops(usize),
}

impl EditMesh {
    /// Validate mesh connectivity
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (v, vert) in self.verts() {
            for (i, &e) in vert.edges.iter().enumerate() {
                let ok = self.edge(e).is_some_and(|edge| edge.has_vert(v))
                    && !vert.edges[..i].contains(&e);
                if !ok {
                    return Err(ValidationError::DiskEdge { vert: v, edge: e });
                }
            }
        }

        for (e, edge) in self.edges() {
            if edge.v1 == edge.v2 || self.vert(edge.v1).is_none() || self.vert(edge.v2).is_none() {
                return Err(ValidationError::EdgeVerts(e));
            }
            if !self.verts[edge.v1].edges.contains(&e) || !self.verts[edge.v2].edges.contains(&e) {
                return Err(ValidationError::DiskMissing(e));
            }
            for &l in &edge.loops {
                if self.get_loop(l).is_none_or(|lp| lp.e != e) {
                    return Err(ValidationError::RadialLoop { edge: e, l });
                }
            }
        }

        let mut reachable = 0;
        for (f, face) in self.faces() {
            if face.len < 3 {
                return Err(ValidationError::FaceDegenerate(f));
            }
            let mut l = face.first;
            for _ in 0..face.len {
                let lp = self.get_loop(l).ok_or(ValidationError::FaceCycle(f))?;
                let next = self.get_loop(lp.next).ok_or(ValidationError::FaceCycle(f))?;
                if lp.f != f || next.prev != l {
                    return Err(ValidationError::FaceCycle(f));
                }
                let edge = self.edge(lp.e).ok_or(ValidationError::LoopEdge(l))?;
                if !edge.has_vert(lp.v) || edge.other_vert(lp.v) != Some(next.v) {
                    return Err(ValidationError::LoopEdge(l));
                }
                if !edge.loops.contains(&l) {
                    return Err(ValidationError::RadialMissing(l));
                }
                reachable += 1;
                l = lp.next;
            }
            if l != face.first {
                return Err(ValidationError::FaceCycle(f));
            }
        }

        if reachable != self.loop_count() {
            return Err(ValidationError::OrphanLoops(self.loop_count() - reachable));
        }
        Ok(())
    }
}
