//! Optional faces bridging the gap a rip opens.
//!
//! Before the split, every tagged edge records the two loops on either side
//! of it. The loops move with their faces during the split, so afterwards
//! each recorded pair spans the gap and can be closed with a triangle (the
//! two new edges still share a vertex) or a quad.

use bitflags::bitflags;
use editmesh::{EdgeId, EditMesh, EditMeshError, FaceId, LoopId, VertId};
use tracing::{debug, trace};

bitflags! {
    /// Orientation of the loops of an [`UnorderedLoopPair`] relative to the
    /// edge they were captured on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PairFlags: u8 {
        /// First loop runs against the edge direction
        const FLIP_0 = 1 << 0;
        /// Second loop runs along the edge direction
        const FLIP_1 = 1 << 1;
    }
}

/// The loops straddling one tagged edge, captured before splitting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnorderedLoopPair {
    pub loops: [Option<LoopId>; 2],
    pub flags: PairFlags,
}

/// Record loop pairs for every tagged edge. Call directly before splitting.
///
/// Edges that are not manifold are recorded without loops and never filled.
pub fn capture_fill_pairs(mesh: &EditMesh) -> Vec<UnorderedLoopPair> {
    mesh.edges()
        .filter(|(e, _)| mesh.edge_is_tagged(*e))
        .map(|(e, edge)| match mesh.edge_loop_pair(e) {
            Some((l1, l2)) => {
                let v_cmp = edge.v1;
                let mut flags = PairFlags::empty();
                if mesh.get_loop(l1).is_some_and(|lp| lp.v != v_cmp) {
                    flags |= PairFlags::FLIP_0;
                }
                if mesh.get_loop(l2).is_some_and(|lp| lp.v == v_cmp) {
                    flags |= PairFlags::FLIP_1;
                }
                UnorderedLoopPair {
                    loops: [Some(l1), Some(l2)],
                    flags,
                }
            }
            None => UnorderedLoopPair {
                loops: [None, None],
                flags: PairFlags::empty(),
            },
        })
        .collect()
}

/// Face verts for one pair, with the edge each new corner copies from
fn fill_face_verts(
    mesh: &EditMesh,
    pair: &UnorderedLoopPair,
) -> Option<(Vec<VertId>, Vec<EdgeId>, FaceId)> {
    let [Some(l0), Some(l1)] = pair.loops else {
        return None;
    };
    let lp0 = mesh.get_loop(l0)?;
    let lp1 = mesh.get_loop(l1)?;
    if lp0.e == lp1.e {
        // never split
        return None;
    }
    let e0 = mesh.edge(lp0.e)?;
    let e1 = mesh.edge(lp1.e)?;

    match mesh.edge_share_vert(lp0.e, lp1.e) {
        None => {
            let mut verts = vec![e0.v1, e1.v1, e1.v2, e0.v2];
            if pair.flags.contains(PairFlags::FLIP_0) {
                verts.swap(0, 3);
            }
            if pair.flags.contains(PairFlags::FLIP_1) {
                verts.swap(1, 2);
            }
            Some((verts, vec![lp0.e, lp1.e, lp1.e, lp0.e], lp0.f))
        }
        Some(shared) => {
            let mut verts = vec![shared, e0.other_vert(shared)?, e1.other_vert(shared)?];
            if shared == lp0.v {
                verts.swap(0, 1);
            }
            Some((verts, vec![lp0.e, lp0.e, lp1.e], lp0.f))
        }
    }
}

/// Build the faces recorded by [`capture_fill_pairs`]. Faces that already
/// exist are skipped, so running this twice creates nothing the second time.
///
/// Returns the number of faces created.
pub fn build_fill_faces(
    mesh: &mut EditMesh,
    pairs: &[UnorderedLoopPair],
) -> Result<usize, EditMeshError> {
    let mut created = 0;
    for pair in pairs {
        let Some((verts, sources, example)) = fill_face_verts(mesh, pair) else {
            continue;
        };
        if mesh.face_exists(&verts).is_some() {
            continue;
        }
        let f = match mesh.create_face(&verts, Some(example)) {
            Ok(f) => f,
            Err(EditMeshError::DegenerateFace(_)) => {
                trace!("build_fill_faces: skipping degenerate gap {:?}", verts);
                continue;
            }
            Err(err) => return Err(err),
        };

        for (l, e) in mesh.face_loops(f).into_iter().zip(sources) {
            let uv = mesh
                .edge_other_loop(e, l)
                .and_then(|src| mesh.get_loop(src))
                .and_then(|src| src.uv);
            if let Some(lp) = mesh.get_loop_mut(l) {
                lp.uv = uv;
            }
        }
        created += 1;
    }
    debug!("build_fill_faces: {} faces from {} pairs", created, pairs.len());
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use editmesh::primitives;
    use glam::Vec2;

    fn seam_mesh() -> (EditMesh, EdgeId) {
        let (mut mesh, verts) = primitives::quad_grid(2, 1);
        let seam = mesh.edge_exists(verts[1], verts[4]).unwrap();
        mesh.set_edge_tag(seam, true);
        (mesh, seam)
    }

    #[test]
    fn test_capture_flags_follow_edge_direction() {
        let (mesh, seam) = seam_mesh();
        let pairs = capture_fill_pairs(&mesh);

        assert_eq!(pairs.len(), 1);
        let [Some(l1), Some(l2)] = pairs[0].loops else {
            panic!("seam is manifold");
        };
        let v1 = mesh.edge(seam).unwrap().v1;
        assert_eq!(
            pairs[0].flags.contains(PairFlags::FLIP_0),
            mesh.get_loop(l1).unwrap().v != v1
        );
        assert_eq!(
            pairs[0].flags.contains(PairFlags::FLIP_1),
            mesh.get_loop(l2).unwrap().v == v1
        );
    }

    #[test]
    fn test_boundary_edge_captured_without_loops() {
        let (mut mesh, verts) = primitives::single_quad();
        let e = mesh.edge_exists(verts[0], verts[1]).unwrap();
        mesh.set_edge_tag(e, true);

        let pairs = capture_fill_pairs(&mesh);

        assert_eq!(pairs[0].loops, [None, None]);
        assert_eq!(build_fill_faces(&mut mesh, &pairs), Ok(0));
    }

    #[test]
    fn test_unsplit_edge_is_not_filled() {
        let (mut mesh, _) = seam_mesh();
        let pairs = capture_fill_pairs(&mesh);
        assert_eq!(build_fill_faces(&mut mesh, &pairs), Ok(0));
        assert_eq!(mesh.face_count(), 2);
    }

    #[test]
    fn test_fill_closes_split_seam_with_quad() {
        let (mut mesh, _) = seam_mesh();
        let pairs = capture_fill_pairs(&mesh);
        mesh.split_tagged_edges().unwrap();
        assert_eq!(mesh.edge_count(), 8);

        assert_eq!(build_fill_faces(&mut mesh, &pairs), Ok(1));

        assert_eq!(mesh.face_count(), 3);
        assert_eq!(mesh.edge_count(), 10);
        assert!(mesh.validate().is_ok());
        let (f_new, face) = mesh.faces().last().unwrap();
        assert_eq!(face.len(), 4);
        assert_eq!(mesh.face_verts(f_new).len(), 4);
    }

    #[test]
    fn test_fill_twice_creates_nothing_more() {
        let (mut mesh, _) = seam_mesh();
        let pairs = capture_fill_pairs(&mesh);
        mesh.split_tagged_edges().unwrap();

        assert_eq!(build_fill_faces(&mut mesh, &pairs), Ok(1));
        assert_eq!(build_fill_faces(&mut mesh, &pairs), Ok(0));
        assert_eq!(mesh.face_count(), 3);
    }

    #[test]
    fn test_fill_copies_corner_uvs() {
        let (mut mesh, _) = seam_mesh();
        let loop_ids: Vec<LoopId> = mesh
            .face_ids()
            .into_iter()
            .flat_map(|f| mesh.face_loops(f))
            .collect();
        for l in loop_ids {
            let co = mesh.vert(mesh.get_loop(l).unwrap().v).unwrap().co;
            mesh.get_loop_mut(l).unwrap().uv = Some(Vec2::new(co.x, co.y));
        }
        let pairs = capture_fill_pairs(&mesh);
        mesh.split_tagged_edges().unwrap();
        build_fill_faces(&mut mesh, &pairs).unwrap();

        let (f_new, _) = mesh.faces().last().unwrap();
        for l in mesh.face_loops(f_new) {
            let lp = mesh.get_loop(l).unwrap();
            let co = mesh.vert(lp.v).unwrap().co;
            assert_eq!(lp.uv, Some(Vec2::new(co.x, co.y)));
        }
    }
}
