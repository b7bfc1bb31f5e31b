//! Ordering of tagged edge runs before they are split.
//!
//! Each run ("island") of tagged manifold edges gets consecutive ids on the
//! loops along it. The loops survive the split, so after it both new sides
//! of a run can be walked again by following ids downward.

use editmesh::{EdgeId, EditMesh, LoopId, VertId};
use slotmap::SecondaryMap;
use tracing::trace;

/// Both loops of the highest-id edge of one island
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeLoopPair {
    pub l_a: LoopId,
    pub l_b: LoopId,
}

/// Synthetic sequence ids of loops along tagged edge runs.
///
/// Loops without an entry were never visited.
#[derive(Debug, Clone, Default)]
pub struct LoopUids {
    uids: SecondaryMap<LoopId, i64>,
}

impl LoopUids {
    pub fn get(&self, l: LoopId) -> Option<i64> {
        self.uids.get(l).copied()
    }

    /// Id of an edge, read from its first loop
    pub fn edge_uid(&self, mesh: &EditMesh, e: EdgeId) -> Option<i64> {
        self.get(mesh.edge(e)?.first_loop()?)
    }

    fn is_visited(&self, mesh: &EditMesh, e: EdgeId) -> bool {
        self.edge_uid(mesh, e).is_some()
    }

    /// Step from `e` across its vertex opposite `v_prev` to the edge whose id
    /// is one lower. Updates `v_prev` on success.
    pub fn step_down(&self, mesh: &EditMesh, e: EdgeId, v_prev: &mut VertId) -> Option<EdgeId> {
        let v = mesh.edge_other_vert(e, *v_prev)?;
        let uid_cmp = self.edge_uid(mesh, e)? - 1;
        let found = mesh
            .vert_edges(v)
            .into_iter()
            .find(|&other| self.edge_uid(mesh, other) == Some(uid_cmp))?;
        *v_prev = v;
        Some(found)
    }
}

/// Result of [`tag_loops`]
#[derive(Debug, Clone, Default)]
pub struct LoopTags {
    pub uids: LoopUids,
    pub pairs: Vec<EdgeLoopPair>,
}

fn is_visit_possible(mesh: &EditMesh, e: EdgeId) -> bool {
    mesh.edge_is_manifold(e) && mesh.edge_is_tagged(e)
}

/// Mark the first unvisited tagged manifold edge at `v` with `uid`
fn mark_step(mesh: &EditMesh, uids: &mut LoopUids, v: VertId, uid: i64) -> Option<EdgeId> {
    let e = mesh
        .vert_edges(v)
        .into_iter()
        .find(|&e| is_visit_possible(mesh, e) && !uids.is_visited(mesh, e))?;
    let (l_a, l_b) = mesh.edge_loop_pair(e)?;
    uids.uids.insert(l_a, uid);
    uids.uids.insert(l_b, uid);
    Some(e)
}

/// Assign ordered ids to the loops of every run of tagged manifold edges.
///
/// Runs are grown from a seed in both directions: upward from the seed's
/// first vertex, then downward from the same vertex. Id ranges of separate
/// islands are spaced by the edge count so they never meet.
pub fn tag_loops(mesh: &EditMesh) -> LoopTags {
    let stride = mesh.edge_count() as i64;
    let mut uids = LoopUids::default();
    let mut pairs = Vec::new();
    let mut uid = stride;

    loop {
        let Some(e_first) = mesh
            .edge_ids()
            .into_iter()
            .find(|&e| is_visit_possible(mesh, e) && !uids.is_visited(mesh, e))
        else {
            break;
        };
        let Some(v_first) = mesh.edge(e_first).map(|edge| edge.v1) else {
            break;
        };

        let uid_start = uid;
        let mut v_step = v_first;
        let mut e_last = None;
        while let Some(e) = mark_step(mesh, &mut uids, v_step, uid) {
            e_last = Some(e);
            let Some(v_next) = mesh.edge_other_vert(e, v_step) else {
                break;
            };
            v_step = v_next;
            uid += 1;
        }

        let uid_end = uid - 1;
        uid = uid_start - 1;

        v_step = v_first;
        while let Some(e) = mark_step(mesh, &mut uids, v_step, uid) {
            let Some(v_next) = mesh.edge_other_vert(e, v_step) else {
                break;
            };
            v_step = v_next;
            uid -= 1;
        }

        trace!(
            "tag_loops: island of {} edges, ids {}..={}",
            uid_end - uid,
            uid + 1,
            uid_end
        );
        uid = uid_end + stride;

        let Some((l_a, l_b)) = e_last.and_then(|e| mesh.edge_loop_pair(e)) else {
            break;
        };
        pairs.push(EdgeLoopPair { l_a, l_b });
    }

    LoopTags { uids, pairs }
}

#[cfg(test)]
mod tests {
    use super::*;
    use editmesh::primitives;

    /// 4x2 grid with the inner horizontal edges at x in 1..3 tagged
    fn tagged_line() -> (EditMesh, Vec<VertId>, Vec<EdgeId>) {
        let (mut mesh, verts) = primitives::quad_grid(4, 2);
        let line = vec![
            mesh.edge_exists(verts[6], verts[7]).unwrap(),
            mesh.edge_exists(verts[7], verts[8]).unwrap(),
        ];
        for &e in &line {
            mesh.set_edge_tag(e, true);
        }
        (mesh, verts, line)
    }

    #[test]
    fn test_single_island_gets_consecutive_ids() {
        let (mesh, _, line) = tagged_line();
        let tags = tag_loops(&mesh);

        assert_eq!(tags.pairs.len(), 1);
        let mut ids: Vec<i64> = line
            .iter()
            .map(|&e| tags.uids.edge_uid(&mesh, e).unwrap())
            .collect();
        ids.sort();
        assert_eq!(ids[1] - ids[0], 1);

        // Both loops of an edge share the id
        for &e in &line {
            let (la, lb) = mesh.edge_loop_pair(e).unwrap();
            assert_eq!(tags.uids.get(la), tags.uids.get(lb));
        }
    }

    #[test]
    fn test_pair_is_on_highest_id_edge() {
        let (mesh, _, line) = tagged_line();
        let tags = tag_loops(&mesh);
        let pair = tags.pairs[0];
        let top = line
            .iter()
            .copied()
            .max_by_key(|&e| tags.uids.edge_uid(&mesh, e))
            .unwrap();

        assert_eq!(mesh.get_loop(pair.l_a).unwrap().e, top);
        assert_eq!(mesh.get_loop(pair.l_b).unwrap().e, top);
    }

    #[test]
    fn test_step_down_walks_the_run() {
        let (mesh, _, line) = tagged_line();
        let tags = tag_loops(&mesh);
        let top = tags.pairs[0];
        let e_top = mesh.get_loop(top.l_a).unwrap().e;

        let edge = mesh.edge(e_top).unwrap();
        let mut v_prev = edge.v1;
        let first = tags.uids.step_down(&mesh, e_top, &mut v_prev);
        let mut v_prev_other = edge.v2;
        let second = tags.uids.step_down(&mesh, e_top, &mut v_prev_other);

        // exactly one direction leads down the run
        assert!(first.is_some() != second.is_some());
        let next = first.or(second).unwrap();
        assert!(line.contains(&next));
        assert_ne!(next, e_top);
    }

    #[test]
    fn test_untagged_and_boundary_edges_are_skipped() {
        let (mut mesh, verts) = primitives::quad_grid(2, 1);
        let boundary = mesh.edge_exists(verts[0], verts[1]).unwrap();
        mesh.set_edge_tag(boundary, true);

        let tags = tag_loops(&mesh);

        assert!(tags.pairs.is_empty());
        assert_eq!(tags.uids.edge_uid(&mesh, boundary), None);
    }

    #[test]
    fn test_separate_islands_do_not_overlap() {
        let (mut mesh, verts) = primitives::quad_grid(4, 4);
        // Two horizontal runs far apart
        let a = mesh.edge_exists(verts[6], verts[7]).unwrap();
        let b = mesh.edge_exists(verts[18], verts[17]).unwrap();
        mesh.set_edge_tag(a, true);
        mesh.set_edge_tag(b, true);

        let tags = tag_loops(&mesh);

        assert_eq!(tags.pairs.len(), 2);
        let ua = tags.uids.edge_uid(&mesh, a).unwrap();
        let ub = tags.uids.edge_uid(&mesh, b).unwrap();
        assert!((ua - ub).abs() >= mesh.edge_count() as i64 - 1);
    }
}
