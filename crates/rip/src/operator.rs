//! Entry point: rip every object of an edit session.

use editmesh::EditMesh;
use editmesh_config::RipSettings;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::edge_rip::rip_edges;
use crate::error::RipError;
use crate::scorer::{RipView, ScreenProjector};
use crate::vert_rip::rip_vert;

/// Outcome of a rip that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RipStatus {
    /// Topology changed, the ripped geometry is selected for dragging
    Finished,
    /// Nothing changed
    Cancelled,
}

/// One object of the session with its own view projection
pub struct RipTarget<'a> {
    pub mesh: &'a mut EditMesh,
    pub projector: &'a dyn ScreenProjector,
}

/// Failure flags, cleared as soon as one object gets past the matching check
struct ErrorFlags {
    faces_selected: bool,
    disconnected_vertices: bool,
    failed: bool,
}

impl ErrorFlags {
    fn report(&self) -> Option<RipError> {
        if self.faces_selected {
            Some(RipError::FacesSelected)
        } else if self.disconnected_vertices {
            Some(RipError::DisconnectedVertices)
        } else if self.failed {
            Some(RipError::Failed)
        } else {
            None
        }
    }
}

/// Rip one mesh. Tags are cleared before and after; a cancelled or failed
/// attempt leaves the selection as it was.
fn rip_object(mesh: &mut EditMesh, view: &RipView<'_>, use_fill: bool) -> RipStatus {
    let singlesel = mesh.selected_vert_count() == 1
        && mesh.selected_edge_count() == 0
        && mesh.selected_face_count() == 0;
    let snapshot = mesh.snapshot_selection();

    // edges to split are tagged, the selection is only read for sides
    mesh.clear_tags();
    for e in mesh.edge_ids() {
        let selected = mesh.edge_is_selected(e);
        mesh.set_edge_tag(e, selected);
    }

    let result = if singlesel {
        rip_vert(mesh, view, use_fill)
    } else {
        rip_edges(mesh, view, use_fill)
    };
    mesh.clear_tags();

    let status = match result {
        Ok(status) => status,
        Err(err) => {
            warn!("rip: kernel error, cancelling object: {}", err);
            RipStatus::Cancelled
        }
    };
    match status {
        RipStatus::Finished => mesh.recalculate_vert_normals(),
        RipStatus::Cancelled => mesh.restore_selection(&snapshot),
    }
    status
}

/// Rip the selection of every target around `cursor` (region pixels).
///
/// Objects are processed independently. Returns `Ok(Cancelled)` when no
/// object has a selected vertex, and an error when no object could be
/// ripped.
pub fn rip(
    targets: &mut [RipTarget<'_>],
    cursor: Vec2,
    settings: &RipSettings,
) -> Result<RipStatus, RipError> {
    let mut flags = ErrorFlags {
        faces_selected: true,
        disconnected_vertices: true,
        failed: true,
    };
    let mut any_selected = false;

    for (index, target) in targets.iter_mut().enumerate() {
        let mesh = &mut *target.mesh;
        if mesh.selected_vert_count() == 0 {
            continue;
        }
        any_selected = true;

        if mesh.selected_face_count() > 0 {
            debug!("rip: object {} has faces selected, skipping", index);
            continue;
        }
        flags.faces_selected = false;

        if mesh.selected_vert_count() > 1 && mesh.selected_edge_count() == 0 {
            debug!("rip: object {} has disconnected vertices, skipping", index);
            continue;
        }
        flags.disconnected_vertices = false;

        let view = RipView {
            projector: target.projector,
            cursor,
            edge_inset: settings.edge_inset,
            side_nudge: settings.side_nudge,
        };
        if rip_object(mesh, &view, settings.use_fill) == RipStatus::Cancelled {
            continue;
        }
        if mesh.selected_vert_count() == 0 {
            continue;
        }
        flags.failed = false;
        debug!(
            "rip: object {} ripped, {} verts {} edges {} faces",
            index,
            mesh.vert_count(),
            mesh.edge_count(),
            mesh.face_count()
        );
    }

    if !any_selected {
        return Ok(RipStatus::Cancelled);
    }
    match flags.report() {
        Some(err) => Err(err),
        None => Ok(RipStatus::Finished),
    }
}

/// [`rip`] for a single mesh
pub fn rip_mesh(
    mesh: &mut EditMesh,
    projector: &dyn ScreenProjector,
    cursor: Vec2,
    settings: &RipSettings,
) -> Result<RipStatus, RipError> {
    rip(&mut [RipTarget { mesh, projector }], cursor, settings)
}
