//! Boundary-representation edit mesh for interactive topology tools
//!
//! Unlike a half-edge mesh, edges keep a radial list of every face corner
//! using them, so non-manifold edges (three or more faces) and wire edges
//! (no faces) are representable. This is what tools such as rip need: they
//! deliberately turn one edge into two boundaries and must cope with
//! whatever topology the user selected.
//!
//! - [`types`] - element structs, generational handles and flags
//! - [`primitives`] - small meshes for tools and tests

mod construction;
mod modification;
pub mod primitives;
mod selection;
mod separation;
mod topology;
pub mod types;
mod validation;

use slotmap::SlotMap;

pub use selection::SelectionSnapshot;
pub use types::{
    EditMeshError, ElemFlags, Edge, EdgeId, Face, FaceId, Loop, LoopId, SelectHistoryElem, Vert,
    VertId,
};
pub use validation::ValidationError;

/// Edit mesh
///
/// Elements live in generational arenas: removing an element frees its slot
/// for reuse and bumps the slot generation, so handles kept across a
/// topology change resolve to `None` instead of aliasing new elements.
#[derive(Debug, Clone, Default)]
pub struct EditMesh {
    pub(crate) verts: SlotMap<VertId, Vert>,
    pub(crate) edges: SlotMap<EdgeId, Edge>,
    pub(crate) loops: SlotMap<LoopId, Loop>,
    pub(crate) faces: SlotMap<FaceId, Face>,
    /// Selection history, last entry is active
    pub(crate) select_history: Vec<SelectHistoryElem>,
}

impl EditMesh {
    pub fn new() -> Self {
        Self::default()
    }
}
