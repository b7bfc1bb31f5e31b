//! Rip with a single selected vertex.
//!
//! The vertex is split so the faces nearest the cursor get a vertex of their
//! own, which is left selected for dragging.

use editmesh::{EdgeId, EditMesh, EditMeshError, LoopId, SelectHistoryElem, VertId};
use glam::Vec3;
use tracing::{debug, trace};

use crate::fill;
use crate::operator::RipStatus;
use crate::scorer::{RipView, edge_vert_cos, loop_corner_co};

fn vert_co(mesh: &EditMesh, v: VertId) -> Vec3 {
    mesh.vert(v).map_or(Vec3::ZERO, |vert| vert.co)
}

/// Rip the active (or first selected) vertex.
pub fn rip_vert(
    mesh: &mut EditMesh,
    view: &RipView<'_>,
    use_fill: bool,
) -> Result<RipStatus, EditMeshError> {
    let totvert_orig = mesh.vert_count();

    // ===== PHASE 1: PICK VERTEX =====
    let history_vert = match mesh.history_active() {
        Some(SelectHistoryElem::Vert(v)) => Some(v),
        _ => None,
    };
    let Some(v) = history_vert.or_else(|| mesh.selected_verts().first().copied()) else {
        return Ok(RipStatus::Cancelled);
    };
    if mesh.vert_edge_count(v) == 0 {
        return Ok(RipStatus::Cancelled);
    }

    let is_wire = mesh.vert_is_wire(v);
    let is_manifold_region = mesh.vert_is_manifold_region(v);

    // ===== PHASE 2: CLOSEST EDGE =====
    let mut e_best: Option<EdgeId> = None;
    let mut dist_sq = f32::MAX;
    let mut totboundary_edge = 0;
    for e in mesh.vert_edges(v) {
        // wire counts as boundary, so faces can be pulled off a wire
        if mesh.edge_is_boundary(e) || mesh.edge_is_wire(e) {
            totboundary_edge += 1;
        }
        if mesh.edge_is_hidden(e) || (is_manifold_region && !mesh.edge_is_manifold(e)) {
            continue;
        }
        let Some((co1, co2)) = edge_vert_cos(mesh, e) else {
            continue;
        };
        let d = view.dist_squared(co1, co2);
        if e_best.is_none() || d < dist_sq {
            dist_sq = d;
            e_best = Some(e);
        }
    }

    // ===== PHASE 3: SEPARATE FAN =====
    if !is_manifold_region {
        if let Some(l_first) = e_best.and_then(|e| mesh.edge(e)?.first_loop()) {
            return rip_fan(mesh, v, l_first, history_vert.is_some(), use_fill);
        }
    }

    if mesh.vert_face_count(v) == 3 && mesh.vert_edge_count(v) == 3 {
        let e_all = mesh.vert_edges(v);
        let v_co = vert_co(mesh, v);
        for l in mesh.vert_loops(v) {
            let d = view.dist_squared(v_co, loop_corner_co(mesh, l));
            if e_best.is_none() || d < dist_sq {
                dist_sq = d;
                e_best = e_all.iter().copied().find(|&e| !mesh.edge_in_loop(e, l));
            }
        }
    }

    if (!is_wire && totboundary_edge > 2) || (is_wire && totboundary_edge > 1) {
        return rip_pieces(mesh, view, v, history_vert.is_some(), use_fill);
    }

    let Some(e_best) = e_best else {
        return Ok(RipStatus::Cancelled);
    };

    // ===== PHASE 4: LOCAL SPLIT =====
    let mut larr = Vec::with_capacity(2);
    if mesh.edge_is_boundary(e_best) || mesh.vert_face_count(v) == 2 {
        let Some(l_first) = mesh.edge(e_best).and_then(|edge| edge.first_loop()) else {
            return Ok(RipStatus::Cancelled);
        };
        let l = mesh
            .edge_vert_share_loop(l_first, v)
            .ok_or(EditMeshError::InvalidLoop(l_first))?;
        larr.push(l);

        // tags only feed the fill
        if mesh.edge_is_boundary(e_best) {
            mesh.set_edge_tag(e_best, true);
        } else {
            let lp = mesh.get_loop(l).ok_or(EditMeshError::InvalidLoop(l))?;
            let (e, prev) = (lp.e, lp.prev);
            mesh.set_edge_tag(e, true);
            if let Some(prev_e) = mesh.get_loop(prev).map(|p| p.e) {
                mesh.set_edge_tag(prev_e, true);
            }
        }
    } else if mesh.edge_is_manifold(e_best) {
        let radial = mesh
            .edge(e_best)
            .map(|edge| edge.loops().to_vec())
            .unwrap_or_default();
        for l_iter in radial {
            let corner = mesh
                .edge_vert_share_loop(l_iter, v)
                .ok_or(EditMeshError::InvalidLoop(l_iter))?;
            if use_fill {
                // the best edge itself stays whole
                let lp = mesh.get_loop(corner).ok_or(EditMeshError::InvalidLoop(corner))?;
                let tag = if lp.e == e_best {
                    mesh.get_loop(lp.prev).map(|p| p.e)
                } else {
                    Some(lp.e)
                };
                if let Some(tag) = tag {
                    mesh.set_edge_tag(tag, true);
                }
            }
            larr.push(corner);
        }
    }

    let fill_pairs = use_fill.then(|| fill::capture_fill_pairs(mesh));

    if larr.is_empty() {
        return Ok(RipStatus::Cancelled);
    }
    let v_rip = mesh.face_loop_separate_multi(&larr)?;
    mesh.vert_select_set(v_rip, true);
    trace!("rip_vert: {} corners moved to {:?}", larr.len(), v_rip);

    // ===== PHASE 5: RESELECT =====
    let mut v_best = None;
    let mut dist_sq = f32::MAX;
    for v_sel in mesh.selected_verts() {
        mesh.vert_select_set(v_sel, false);
        mesh.history_remove(SelectHistoryElem::Vert(v_sel));

        let v_co = vert_co(mesh, v_sel);
        for l in mesh.vert_loops(v_sel) {
            let d = view.dist_squared(v_co, loop_corner_co(mesh, l));
            if v_best.is_none() || d < dist_sq {
                v_best = Some(v_sel);
                dist_sq = d;
            }
        }
    }
    if let Some(v_best) = v_best {
        mesh.vert_select_set(v_best, true);
        if history_vert.is_some() {
            mesh.history_store(SelectHistoryElem::Vert(v_best));
        }
    }

    if let Some(pairs) = fill_pairs {
        fill::build_fill_faces(mesh, &pairs)?;
    }

    if mesh.vert_count() == totvert_orig {
        return Ok(RipStatus::Cancelled);
    }
    debug!(
        "rip_vert: {} -> {} verts",
        totvert_orig,
        mesh.vert_count()
    );
    Ok(RipStatus::Finished)
}

/// Peel the fan of `l_first`'s corner at `v` off a vertex shared by several
/// fans.
fn rip_fan(
    mesh: &mut EditMesh,
    v: VertId,
    l_first: LoopId,
    from_history: bool,
    use_fill: bool,
) -> Result<RipStatus, EditMeshError> {
    let lp = mesh.get_loop(l_first).ok_or(EditMeshError::InvalidLoop(l_first))?;
    let l_sep = if lp.v == v { l_first } else { lp.next };

    let v_new = mesh.face_loop_separate_isolated(l_sep)?;
    if v_new == v {
        return Ok(RipStatus::Cancelled);
    }

    mesh.vert_select_set(v, false);
    mesh.history_remove(SelectHistoryElem::Vert(v));
    mesh.vert_select_set(v_new, true);
    if from_history {
        mesh.history_store(SelectHistoryElem::Vert(v_new));
    }

    if use_fill {
        mesh.create_edge(v, v_new)?;
    }
    debug!("rip_vert: fan split off {:?} into {:?}", v, v_new);
    Ok(RipStatus::Finished)
}

/// Split `v` into all of its fans and wire pieces, keep the one nearest the
/// cursor apart and glue the rest back together.
fn rip_pieces(
    mesh: &mut EditMesh,
    view: &RipView<'_>,
    v: VertId,
    from_history: bool,
    use_fill: bool,
) -> Result<RipStatus, EditMeshError> {
    mesh.vert_select_set(v, false);
    let mut vout = mesh.vert_separate(v)?;
    if vout.len() < 2 {
        // avoid an active but unselected vertex
        mesh.vert_select_set(v, true);
        return Ok(RipStatus::Cancelled);
    }
    if from_history {
        mesh.history_remove(SelectHistoryElem::Vert(v));
    }

    let v_co = vert_co(mesh, v);
    let mut vi_best = 0;
    let mut dist_sq = f32::MAX;
    for (i, &piece) in vout.iter().enumerate() {
        if !mesh.vert_is_wire(piece) {
            for l in mesh.vert_loops(piece) {
                let hidden = mesh
                    .get_loop(l)
                    .is_some_and(|lp| mesh.face_is_hidden(lp.f));
                if hidden {
                    continue;
                }
                let d = view.dist_squared(v_co, loop_corner_co(mesh, l));
                if d < dist_sq {
                    dist_sq = d;
                    vi_best = i;
                }
            }
        } else {
            for e in mesh.vert_edges(piece) {
                if mesh.edge_is_hidden(e) {
                    continue;
                }
                let Some((co1, co2)) = edge_vert_cos(mesh, e) else {
                    continue;
                };
                let d = view.dist_squared(v_co, (co1 + co2) * 0.5);
                if d < dist_sq {
                    dist_sq = d;
                    vi_best = i;
                }
            }
        }
    }

    // vout[0] is kept apart, vout[1] is the glue for the rest
    vout.swap(0, vi_best);
    let v_keep = vout[0];
    mesh.vert_select_set(v_keep, true);
    if from_history {
        mesh.history_store(SelectHistoryElem::Vert(v_keep));
    }

    let glue = vout[1];
    for &piece in &vout[2..] {
        mesh.vert_splice(glue, piece)?;
    }

    if use_fill {
        mesh.create_edge(glue, v_keep)?;
    }
    debug!("rip_vert: {} pieces, kept {:?}", vout.len(), v_keep);
    Ok(RipStatus::Finished)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::tests::view_at;
    use editmesh::primitives;
    use glam::Vec2;

    #[test]
    fn test_interior_vertex_gains_one_vertex() {
        let (mut mesh, verts) = primitives::quad_grid(2, 2);
        let center = verts[4];
        mesh.vert_select_set(center, true);

        let status = rip_vert(&mut mesh, &view_at(Vec2::new(150.0, 110.0)), false).unwrap();

        assert_eq!(status, RipStatus::Finished);
        assert_eq!(mesh.vert_count(), 10);
        assert_eq!(mesh.edge_count(), 14);
        assert_eq!(mesh.face_count(), 4);
        assert!(mesh.validate().is_ok());

        let selected = mesh.selected_verts();
        assert_eq!(selected.len(), 1);
        assert_ne!(selected[0], center);
        // the new vertex carries the two faces right of the cursor edge
        for f in mesh.vert_faces(selected[0]) {
            assert!(mesh.face_center(f).x > 1.0);
        }
    }

    #[test]
    fn test_tetrahedron_apex() {
        let (mut mesh, verts) = primitives::tetrahedron();
        let apex = verts[3];
        mesh.vert_select_set(apex, true);

        let status = rip_vert(&mut mesh, &view_at(Vec2::new(80.0, 30.0)), false).unwrap();

        assert_eq!(status, RipStatus::Finished);
        assert_eq!(mesh.vert_count(), 5);
        assert_eq!(mesh.edge_count(), 8);
        assert_eq!(mesh.face_count(), 4);
        assert!(mesh.validate().is_ok());

        let selected = mesh.selected_verts();
        assert_eq!(selected.len(), 1);
        assert!((mesh.vert(selected[0]).unwrap().co - Vec3::new(0.5, 0.4, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_tetrahedron_apex_with_fill_stays_closed() {
        let (mut mesh, verts) = primitives::tetrahedron();
        mesh.vert_select_set(verts[3], true);

        let status = rip_vert(&mut mesh, &view_at(Vec2::new(80.0, 30.0)), true).unwrap();

        assert_eq!(status, RipStatus::Finished);
        assert_eq!(mesh.vert_count(), 5);
        assert_eq!(mesh.edge_count(), 9);
        assert_eq!(mesh.face_count(), 6);
        assert!(mesh.validate().is_ok());
        assert!(mesh.edges().all(|(e, _)| mesh.edge_is_manifold(e)));
    }

    #[test]
    fn test_history_vertex_is_preferred_and_moved() {
        let (mut mesh, verts) = primitives::quad_grid(2, 2);
        let center = verts[4];
        mesh.vert_select_set(center, true);
        mesh.history_store(SelectHistoryElem::Vert(center));

        rip_vert(&mut mesh, &view_at(Vec2::new(150.0, 110.0)), false).unwrap();

        let selected = mesh.selected_verts();
        assert_eq!(mesh.history_active(), Some(SelectHistoryElem::Vert(selected[0])));
        assert_eq!(mesh.history().len(), 1);
    }

    #[test]
    fn test_bowtie_fan_is_peeled() {
        let (mut mesh, verts) = primitives::bowtie();
        let hub = verts[0];
        mesh.vert_select_set(hub, true);

        // cursor over the right triangle
        let status = rip_vert(&mut mesh, &view_at(Vec2::new(80.0, 10.0)), true).unwrap();

        assert_eq!(status, RipStatus::Finished);
        assert_eq!(mesh.vert_count(), 6);
        // bridging wire edge
        assert_eq!(mesh.edge_count(), 7);
        assert!(!mesh.vert_is_selected(hub));
        let selected = mesh.selected_verts();
        assert_eq!(selected.len(), 1);
        assert_eq!(mesh.vert_face_count(selected[0]), 1);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_quad_corner_with_wire_edge_splits_pieces() {
        let (mut mesh, verts) = primitives::single_quad();
        let loose = mesh.create_vert(Vec3::new(-1.0, -1.0, 0.0));
        mesh.create_edge(verts[0], loose).unwrap();
        mesh.vert_select_set(verts[0], true);

        let status = rip_vert(&mut mesh, &view_at(Vec2::new(-50.0, -60.0)), false).unwrap();

        assert_eq!(status, RipStatus::Finished);
        assert_eq!(mesh.vert_count(), 6);
        assert_eq!(mesh.edge_count(), 5);
        let selected = mesh.selected_verts();
        assert_eq!(selected.len(), 1);
        assert!(mesh.vert_is_wire(selected[0]));
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_hidden_edge_is_not_a_candidate() {
        let (mut mesh, verts) = primitives::quad_grid(2, 2);
        let center = verts[4];
        let nearest = mesh.edge_exists(center, verts[5]).unwrap();
        mesh.edge_hide_set(nearest, true);
        mesh.vert_select_set(center, true);

        let status = rip_vert(&mut mesh, &view_at(Vec2::new(150.0, 110.0)), false).unwrap();

        assert_eq!(status, RipStatus::Finished);
        assert_eq!(mesh.vert_count(), 10);
        assert!(mesh.validate().is_ok());
        // the upward edge won, so the new vertex owns the two upper faces
        let selected = mesh.selected_verts();
        assert_eq!(selected.len(), 1);
        assert_ne!(selected[0], center);
        for f in mesh.vert_faces(selected[0]) {
            assert!(mesh.face_center(f).y > 1.0);
        }
    }

    #[test]
    fn test_boundary_vertex_with_fill_closes_corner() {
        let (mut mesh, verts) = primitives::quad_grid(2, 1);
        mesh.vert_select_set(verts[1], true);

        let status = rip_vert(&mut mesh, &view_at(Vec2::new(80.0, 40.0)), true).unwrap();

        assert_eq!(status, RipStatus::Finished);
        assert_eq!(mesh.vert_count(), 7);
        // one spoke copy plus the bridge between the two corners
        assert_eq!(mesh.edge_count(), 9);
        assert_eq!(mesh.face_count(), 3);
        assert!(mesh.validate().is_ok());
        assert_eq!(mesh.selected_vert_count(), 1);
    }

    #[test]
    fn test_pieces_with_fill_bridge_kept_vertex() {
        let (mut mesh, verts) = primitives::single_quad();
        let loose = mesh.create_vert(Vec3::new(-1.0, -1.0, 0.0));
        mesh.create_edge(verts[0], loose).unwrap();
        mesh.vert_select_set(verts[0], true);

        let status = rip_vert(&mut mesh, &view_at(Vec2::new(-50.0, -60.0)), true).unwrap();

        assert_eq!(status, RipStatus::Finished);
        assert_eq!(mesh.vert_count(), 6);
        assert_eq!(mesh.edge_count(), 6);
        let kept = mesh.selected_verts()[0];
        assert!(mesh.edge_exists(verts[0], kept).is_some());
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_loose_vertex_is_cancelled() {
        let mut mesh = EditMesh::new();
        let v = mesh.create_vert(Vec3::ZERO);
        mesh.vert_select_set(v, true);

        let status = rip_vert(&mut mesh, &view_at(Vec2::ZERO), false).unwrap();
        assert_eq!(status, RipStatus::Cancelled);
    }

    #[test]
    fn test_quad_corner_is_cancelled() {
        let (mut mesh, verts) = primitives::single_quad();
        mesh.vert_select_set(verts[0], true);

        let status = rip_vert(&mut mesh, &view_at(Vec2::new(50.0, 10.0)), false).unwrap();

        assert_eq!(status, RipStatus::Cancelled);
        assert_eq!(mesh.vert_count(), 4);
    }
}
