//! Rip along selected edges.
//!
//! Selected edges are tagged before this runs. Runs of them are ordered by
//! the loop tagger, single-edge ends are extended by one edge so the cut
//! reaches past the last selected vertex, then every tagged edge is split
//! and the copy facing away from the cursor is deselected.

use editmesh::{EdgeId, EditMesh, EditMeshError, VertId};
use tracing::{debug, trace};

use crate::fill;
use crate::loop_tag::tag_loops;
use crate::operator::RipStatus;
use crate::scorer::RipView;
use crate::side_select::deselect_far_sides;

/// Edge to tag so a cut ending at `v` on the selected edge `e_sel` carries on.
///
/// `totedge_manifold` counts the visible face-using edges at `v`. With three
/// or four of them (or a fan broken by boundaries) the extension follows the
/// face on the cursor side; otherwise it takes the disk edge opposite `e_sel`.
fn extension_edge(
    mesh: &EditMesh,
    view: &RipView<'_>,
    v: VertId,
    e_sel: EdgeId,
    totedge_manifold: usize,
    all_manifold: bool,
) -> Option<EdgeId> {
    if totedge_manifold == 3 || totedge_manifold == 4 || !all_manifold {
        let l_a = mesh.edge(e_sel)?.first_loop()?;
        let l_b = mesh.radial_next(l_a)?;
        let l = if view.side_score(mesh, e_sel, l_a) > view.side_score(mesh, e_sel, l_b) {
            l_a
        } else {
            l_b
        };

        let l = mesh.loop_other_edge_loop(l, v)?;
        let e = mesh.get_loop(l)?.e;
        // stepping onto a boundary would only re-split the same fan
        if !mesh.edge_is_manifold(e) {
            return None;
        }
        let mut l = mesh.radial_next(l)?;
        if totedge_manifold != 3 {
            l = mesh.loop_other_edge_loop(l, v)?;
        }
        Some(mesh.get_loop(l)?.e)
    } else {
        mesh.vert_other_disk_edge(v, e_sel)
    }
}

/// Tag the endpoints of selected edges and extend single-edge ends.
///
/// Returns the number of edges tagged by extension.
fn expand_tagged_edges(mesh: &mut EditMesh, view: &RipView<'_>) -> usize {
    let mut extended = 0;
    for v in mesh.vert_ids() {
        let mut e_sel = None;
        let mut totedge_sel = 0;
        let mut totedge_manifold = 0;
        let mut all_manifold = true;

        for e in mesh.vert_edges(v) {
            // hidden and wire edges still break the fan
            if !mesh.edge_is_manifold(e) {
                all_manifold = false;
            }
            if mesh.edge_is_wire(e) || mesh.edge_is_hidden(e) {
                continue;
            }
            if mesh.edge_is_selected(e) {
                e_sel = Some(e);
                totedge_sel += 1;
                if let Some(edge) = mesh.edge(e) {
                    let (v1, v2) = (edge.v1, edge.v2);
                    mesh.set_vert_tag(v1, true);
                    mesh.set_vert_tag(v2, true);
                }
            }
            // counts boundary edges too
            totedge_manifold += 1;
        }

        let Some(e_sel) = e_sel.filter(|_| totedge_sel == 1) else {
            continue;
        };
        if let Some(e) = extension_edge(mesh, view, v, e_sel, totedge_manifold, all_manifold) {
            trace!("expand_tagged_edges: {:?} extends {:?} at {:?}", e, e_sel, v);
            mesh.set_edge_tag(e, true);
            extended += 1;
        }
    }
    extended
}

/// Rip every tagged edge, keeping the cursor side selected.
pub fn rip_edges(
    mesh: &mut EditMesh,
    view: &RipView<'_>,
    use_fill: bool,
) -> Result<RipStatus, EditMeshError> {
    let totvert_orig = mesh.vert_count();
    let totedge_orig = mesh.edge_count();

    // ===== PHASE 1: ORDER RUNS =====
    // Must see the selection before extension tags more edges
    let tags = tag_loops(mesh);

    // ===== PHASE 2: EXTEND =====
    let extended = expand_tagged_edges(mesh, view);

    // ===== PHASE 3: SPLIT =====
    let fill_pairs = use_fill.then(|| fill::capture_fill_pairs(mesh));
    let created = mesh.split_tagged_edges()?;

    // ===== PHASE 4: SIDES =====
    let deselected = deselect_far_sides(mesh, &tags, view);
    mesh.select_flush_from_edges();

    let filled = match fill_pairs {
        Some(pairs) => fill::build_fill_faces(mesh, &pairs)?,
        None => 0,
    };

    debug!(
        "rip_edges: {} islands, {} extended, {} verts created, {} deselected, {} filled",
        tags.pairs.len(),
        extended,
        created,
        deselected,
        filled
    );

    if mesh.vert_count() == totvert_orig && mesh.edge_count() == totedge_orig {
        return Ok(RipStatus::Cancelled);
    }
    mesh.history_validate();
    Ok(RipStatus::Finished)
}
