//! After an edge rip each tagged run exists twice. Keep the copy on the
//! cursor's side selected and drop the other.

use editmesh::{EdgeId, EditMesh, VertId};
use tracing::trace;

use crate::loop_tag::{LoopTags, LoopUids};
use crate::scorer::RipView;

/// Vertex to walk down from: `v1` when stepping away from it succeeds
fn side_start_vert(mesh: &EditMesh, uids: &LoopUids, e: EdgeId) -> Option<VertId> {
    let edge = mesh.edge(e)?;
    let mut v_test = edge.v1;
    Some(if uids.step_down(mesh, e, &mut v_test).is_some() {
        edge.v1
    } else {
        edge.v2
    })
}

/// Edges of one side, from the top of the run downward
pub(crate) fn walk_side(mesh: &EditMesh, uids: &LoopUids, e_top: EdgeId) -> Vec<EdgeId> {
    let mut edges = Vec::new();
    let Some(mut v_prev) = side_start_vert(mesh, uids, e_top) else {
        return edges;
    };
    let mut e = Some(e_top);
    while let Some(e_cur) = e {
        edges.push(e_cur);
        e = uids.step_down(mesh, e_cur, &mut v_prev);
    }
    edges
}

fn side_total(mesh: &EditMesh, view: &RipView<'_>, edges: &[EdgeId]) -> f32 {
    edges
        .iter()
        .filter_map(|&e| {
            let l = mesh.edge(e)?.first_loop()?;
            Some(view.side_score(mesh, e, l))
        })
        .sum()
}

/// Deselect the side of every island facing away from the cursor.
///
/// Returns the number of edges deselected.
pub fn deselect_far_sides(mesh: &mut EditMesh, tags: &LoopTags, view: &RipView<'_>) -> usize {
    let mut deselected = 0;
    for pair in &tags.pairs {
        let (Some(la), Some(lb)) = (mesh.get_loop(pair.l_a), mesh.get_loop(pair.l_b)) else {
            continue;
        };
        let side_a = walk_side(mesh, &tags.uids, la.e);
        let side_b = walk_side(mesh, &tags.uids, lb.e);

        let score_a = side_total(mesh, view, &side_a);
        let score_b = side_total(mesh, view, &side_b);
        trace!(
            "deselect_far_sides: scores {:.3} / {:.3} over {} / {} edges",
            score_a,
            score_b,
            side_a.len(),
            side_b.len()
        );

        let far = if score_a < score_b { side_a } else { side_b };
        for e in far {
            mesh.edge_select_set(e, false);
            deselected += 1;
        }
    }
    deselected
}
