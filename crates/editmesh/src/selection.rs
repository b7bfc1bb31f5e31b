//! Selection state, selection history and operator tags.

use std::collections::HashSet;

use super::types::{ElemFlags, EdgeId, FaceId, SelectHistoryElem, VertId};
use super::EditMesh;

/// Selection captured before an operator runs, restored on cancel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSnapshot {
    verts: HashSet<VertId>,
    edges: HashSet<EdgeId>,
    faces: HashSet<FaceId>,
    history: Vec<SelectHistoryElem>,
}

impl EditMesh {
    // ========================================================================
    // Flag tests
    // ========================================================================

    pub fn vert_is_selected(&self, v: VertId) -> bool {
        self.vert(v)
            .is_some_and(|x| x.flags.contains(ElemFlags::SELECT))
    }

    pub fn edge_is_selected(&self, e: EdgeId) -> bool {
        self.edge(e)
            .is_some_and(|x| x.flags.contains(ElemFlags::SELECT))
    }

    pub fn face_is_selected(&self, f: FaceId) -> bool {
        self.face(f)
            .is_some_and(|x| x.flags.contains(ElemFlags::SELECT))
    }

    pub fn vert_is_hidden(&self, v: VertId) -> bool {
        self.vert(v)
            .is_some_and(|x| x.flags.contains(ElemFlags::HIDDEN))
    }

    pub fn edge_is_hidden(&self, e: EdgeId) -> bool {
        self.edge(e)
            .is_some_and(|x| x.flags.contains(ElemFlags::HIDDEN))
    }

    pub fn face_is_hidden(&self, f: FaceId) -> bool {
        self.face(f)
            .is_some_and(|x| x.flags.contains(ElemFlags::HIDDEN))
    }

    pub fn vert_is_tagged(&self, v: VertId) -> bool {
        self.vert(v).is_some_and(|x| x.flags.contains(ElemFlags::TAG))
    }

    pub fn edge_is_tagged(&self, e: EdgeId) -> bool {
        self.edge(e).is_some_and(|x| x.flags.contains(ElemFlags::TAG))
    }

    pub fn set_vert_tag(&mut self, v: VertId, tag: bool) {
        if let Some(vert) = self.vert_mut(v) {
            vert.flags.set(ElemFlags::TAG, tag);
        }
    }

    pub fn set_edge_tag(&mut self, e: EdgeId, tag: bool) {
        if let Some(edge) = self.edge_mut(e) {
            edge.flags.set(ElemFlags::TAG, tag);
        }
    }

    /// Clear the operator tag from every element
    pub fn clear_tags(&mut self) {
        for vert in self.verts.values_mut() {
            vert.flags.remove(ElemFlags::TAG);
        }
        for edge in self.edges.values_mut() {
            edge.flags.remove(ElemFlags::TAG);
        }
        for face in self.faces.values_mut() {
            face.flags.remove(ElemFlags::TAG);
        }
    }

    /// Hide or reveal a vertex. Hidden elements are also deselected.
    pub fn vert_hide_set(&mut self, v: VertId, hide: bool) {
        if let Some(vert) = self.vert_mut(v) {
            vert.flags.set(ElemFlags::HIDDEN, hide);
            if hide {
                vert.flags.remove(ElemFlags::SELECT);
            }
        }
    }

    /// Hide or reveal an edge. Hidden elements are also deselected.
    pub fn edge_hide_set(&mut self, e: EdgeId, hide: bool) {
        if let Some(edge) = self.edge_mut(e) {
            edge.flags.set(ElemFlags::HIDDEN, hide);
            if hide {
                edge.flags.remove(ElemFlags::SELECT);
            }
        }
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn vert_select_set(&mut self, v: VertId, select: bool) {
        if let Some(vert) = self.vert_mut(v) {
            if vert.flags.contains(ElemFlags::HIDDEN) && select {
                return;
            }
            vert.flags.set(ElemFlags::SELECT, select);
        }
    }

    /// Select or deselect an edge.
    ///
    /// Selecting also selects both vertices. Deselecting also deselects any
    /// vertex no longer used by another selected edge.
    pub fn edge_select_set(&mut self, e: EdgeId, select: bool) {
        let Some(edge) = self.edge_mut(e) else {
            return;
        };
        if edge.flags.contains(ElemFlags::HIDDEN) && select {
            return;
        }
        edge.flags.set(ElemFlags::SELECT, select);
        let (v1, v2) = (edge.v1, edge.v2);

        for v in [v1, v2] {
            let keep = select
                || self
                    .vert_edges(v)
                    .into_iter()
                    .any(|other| other != e && self.edge_is_selected(other));
            self.vert_select_set(v, keep);
        }
    }

    /// Select or deselect a face together with its edges and vertices
    pub fn face_select_set(&mut self, f: FaceId, select: bool) {
        let Some(face) = self.face_mut(f) else {
            return;
        };
        face.flags.set(ElemFlags::SELECT, select);
        for l in self.face_loops(f) {
            let lp = &self.loops[l];
            let (e, v) = (lp.e, lp.v);
            if select {
                self.edge_select_set(e, true);
                self.vert_select_set(v, true);
            } else if !self.edge_has_selected_face(e) {
                self.edge_select_set(e, false);
            }
        }
    }

    fn edge_has_selected_face(&self, e: EdgeId) -> bool {
        self.edge(e).is_some_and(|edge| {
            edge.loops
                .iter()
                .any(|&l| self.face_is_selected(self.loops[l].f))
        })
    }

    /// Deselect everything and clear the history
    pub fn deselect_all(&mut self) {
        for vert in self.verts.values_mut() {
            vert.flags.remove(ElemFlags::SELECT);
        }
        for edge in self.edges.values_mut() {
            edge.flags.remove(ElemFlags::SELECT);
        }
        for face in self.faces.values_mut() {
            face.flags.remove(ElemFlags::SELECT);
        }
        self.select_history.clear();
    }

    pub fn selected_vert_count(&self) -> usize {
        self.verts
            .values()
            .filter(|x| x.flags.contains(ElemFlags::SELECT))
            .count()
    }

    pub fn selected_edge_count(&self) -> usize {
        self.edges
            .values()
            .filter(|x| x.flags.contains(ElemFlags::SELECT))
            .count()
    }

    pub fn selected_face_count(&self) -> usize {
        self.faces
            .values()
            .filter(|x| x.flags.contains(ElemFlags::SELECT))
            .count()
    }

    pub fn selected_verts(&self) -> Vec<VertId> {
        self.verts()
            .filter(|(_, x)| x.flags.contains(ElemFlags::SELECT))
            .map(|(v, _)| v)
            .collect()
    }

    pub fn selected_edges(&self) -> Vec<EdgeId> {
        self.edges()
            .filter(|(_, x)| x.flags.contains(ElemFlags::SELECT))
            .map(|(e, _)| e)
            .collect()
    }

    /// Make vertex and face selection follow the edge selection.
    ///
    /// A vertex is selected iff a visible selected edge uses it. A face is
    /// selected iff all of its edges are.
    pub fn select_flush_from_edges(&mut self) {
        let mut used: HashSet<VertId> = HashSet::new();
        for edge in self.edges.values() {
            if edge.flags.contains(ElemFlags::SELECT) && !edge.flags.contains(ElemFlags::HIDDEN) {
                used.insert(edge.v1);
                used.insert(edge.v2);
            }
        }
        for (v, vert) in self.verts.iter_mut() {
            vert.flags.set(ElemFlags::SELECT, used.contains(&v));
        }

        for f in self.face_ids() {
            let all = self.face_loops(f).into_iter().all(|l| {
                self.edges[self.loops[l].e]
                    .flags
                    .contains(ElemFlags::SELECT)
            });
            self.faces[f].flags.set(ElemFlags::SELECT, all);
        }
    }

    // ========================================================================
    // Selection history
    // ========================================================================

    /// Active element (last history entry)
    pub fn history_active(&self) -> Option<SelectHistoryElem> {
        self.select_history.last().copied()
    }

    pub fn history(&self) -> &[SelectHistoryElem] {
        &self.select_history
    }

    /// Push an element to the end of the history, removing earlier entries
    pub fn history_store(&mut self, elem: SelectHistoryElem) {
        self.select_history.retain(|x| *x != elem);
        self.select_history.push(elem);
    }

    pub fn history_remove(&mut self, elem: SelectHistoryElem) {
        self.select_history.retain(|x| *x != elem);
    }

    /// Drop history entries that are removed or no longer selected
    pub fn history_validate(&mut self) {
        let history = std::mem::take(&mut self.select_history);
        self.select_history = history
            .into_iter()
            .filter(|elem| match *elem {
                SelectHistoryElem::Vert(v) => self.vert_is_selected(v),
                SelectHistoryElem::Edge(e) => self.edge_is_selected(e),
                SelectHistoryElem::Face(f) => self.face_is_selected(f),
            })
            .collect();
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    pub fn snapshot_selection(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            verts: self.selected_verts().into_iter().collect(),
            edges: self.selected_edges().into_iter().collect(),
            faces: self
                .faces()
                .filter(|(_, x)| x.flags.contains(ElemFlags::SELECT))
                .map(|(f, _)| f)
                .collect(),
            history: self.select_history.clone(),
        }
    }

    /// Restore a snapshot. Elements created since are deselected, removed
    /// ones are skipped.
    pub fn restore_selection(&mut self, snapshot: &SelectionSnapshot) {
        for (v, vert) in self.verts.iter_mut() {
            vert.flags
                .set(ElemFlags::SELECT, snapshot.verts.contains(&v));
        }
        for (e, edge) in self.edges.iter_mut() {
            edge.flags
                .set(ElemFlags::SELECT, snapshot.edges.contains(&e));
        }
        for (f, face) in self.faces.iter_mut() {
            face.flags
                .set(ElemFlags::SELECT, snapshot.faces.contains(&f));
        }
        self.select_history = snapshot.history.clone();
        self.history_validate();
    }
}

#[cfg(test)]
mod tests {
    use crate::primitives;
    use crate::types::SelectHistoryElem;

    #[test]
    fn test_edge_deselect_keeps_shared_vertex() {
        let (mut mesh, verts) = primitives::single_quad();
        let a = mesh.edge_exists(verts[0], verts[1]).unwrap();
        let b = mesh.edge_exists(verts[1], verts[3]).unwrap();
        mesh.edge_select_set(a, true);
        mesh.edge_select_set(b, true);

        mesh.edge_select_set(a, false);

        assert!(!mesh.vert_is_selected(verts[0]));
        assert!(mesh.vert_is_selected(verts[1]));
    }

    #[test]
    fn test_flush_from_edges_selects_face() {
        let (mut mesh, _) = primitives::single_quad();
        for e in mesh.edge_ids() {
            mesh.edge_select_set(e, true);
        }
        mesh.select_flush_from_edges();
        assert_eq!(mesh.selected_face_count(), 1);

        let e = mesh.edge_ids()[0];
        mesh.edge_select_set(e, false);
        mesh.select_flush_from_edges();
        assert_eq!(mesh.selected_face_count(), 0);
        assert_eq!(mesh.selected_vert_count(), 4);
    }

    #[test]
    fn test_hidden_edge_cannot_be_selected() {
        let (mut mesh, _) = primitives::single_quad();
        let e = mesh.edge_ids()[0];
        mesh.edge_hide_set(e, true);
        mesh.edge_select_set(e, true);
        assert!(!mesh.edge_is_selected(e));
    }

    #[test]
    fn test_history_validate_drops_deselected() {
        let (mut mesh, verts) = primitives::single_quad();
        mesh.vert_select_set(verts[0], true);
        mesh.vert_select_set(verts[1], true);
        mesh.history_store(SelectHistoryElem::Vert(verts[0]));
        mesh.history_store(SelectHistoryElem::Vert(verts[1]));
        mesh.history_store(SelectHistoryElem::Vert(verts[0]));

        assert_eq!(mesh.history().len(), 2);
        assert_eq!(mesh.history_active(), Some(SelectHistoryElem::Vert(verts[0])));

        mesh.vert_select_set(verts[0], false);
        mesh.history_validate();
        assert_eq!(mesh.history(), &[SelectHistoryElem::Vert(verts[1])]);
    }

    #[test]
    fn test_snapshot_restore() {
        let (mut mesh, verts) = primitives::quad_grid(1, 1);
        mesh.vert_select_set(verts[2], true);
        mesh.history_store(SelectHistoryElem::Vert(verts[2]));
        let snapshot = mesh.snapshot_selection();

        mesh.deselect_all();
        mesh.vert_select_set(verts[0], true);
        mesh.restore_selection(&snapshot);

        assert_eq!(mesh.selected_verts(), vec![verts[2]]);
        assert_eq!(mesh.history_active(), Some(SelectHistoryElem::Vert(verts[2])));
    }

    #[test]
    fn test_clear_tags() {
        let (mut mesh, verts) = primitives::single_quad();
        let e = mesh.edge_ids()[0];
        mesh.set_vert_tag(verts[0], true);
        mesh.set_edge_tag(e, true);

        mesh.clear_tags();

        assert!(!mesh.vert_is_tagged(verts[0]));
        assert!(!mesh.edge_is_tagged(e));
    }
}
