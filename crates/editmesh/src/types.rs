//! Type definitions for the edit-mesh data structure.

use bitflags::bitflags;
use glam::{Vec2, Vec3};
use smallvec::SmallVec;

slotmap::new_key_type! {
    /// Generational vertex handle
    pub struct VertId;
    /// Generational edge handle
    pub struct EdgeId;
    /// Generational loop (face corner) handle
    pub struct LoopId;
    /// Generational face handle
    pub struct FaceId;
}

bitflags! {
    /// Header flags shared by vertices, edges and faces.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ElemFlags: u8 {
        /// Element is part of the user selection
        const SELECT = 1 << 0;
        /// Element is hidden and ignored by interactive tools
        const HIDDEN = 1 << 1;
        /// Scratch flag owned by the running operator
        const TAG = 1 << 2;
    }
}

/// A vertex in the edit mesh
#[derive(Debug, Clone)]
pub struct Vert {
    pub co: Vec3,
    pub normal: Vec3,
    pub flags: ElemFlags,
    /// Disk cycle: every edge using this vertex, in insertion order
    pub(crate) edges: SmallVec<[EdgeId; 6]>,
}

/// An edge between two vertices
///
/// The radial list holds one loop per face using the edge. Zero loops makes a
/// wire edge, one a boundary edge, two a manifold edge.
#[derive(Debug, Clone)]
pub struct Edge {
    pub v1: VertId,
    pub v2: VertId,
    pub flags: ElemFlags,
    pub(crate) loops: SmallVec<[LoopId; 2]>,
}

/// One corner of a face.
///
/// `e` runs from `v` to the vertex of `next`.
#[derive(Debug, Clone)]
pub struct Loop {
    pub v: VertId,
    pub e: EdgeId,
    pub f: FaceId,
    pub next: LoopId,
    pub prev: LoopId,
    /// Per-corner texture coordinate
    pub uv: Option<Vec2>,
}

/// A polygon
#[derive(Debug, Clone)]
pub struct Face {
    pub(crate) first: LoopId,
    pub(crate) len: usize,
    pub material_index: u16,
    pub smooth: bool,
    pub flags: ElemFlags,
}

impl Vert {
    /// Incident edges in disk order
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }
}

impl Edge {
    /// Loops using this edge in radial order
    pub fn loops(&self) -> &[LoopId] {
        &self.loops
    }

    /// First radial loop, `None` for wire edges
    pub fn first_loop(&self) -> Option<LoopId> {
        self.loops.first().copied()
    }

    pub fn has_vert(&self, v: VertId) -> bool {
        self.v1 == v || self.v2 == v
    }

    /// The endpoint that is not `v`
    pub fn other_vert(&self, v: VertId) -> Option<VertId> {
        if self.v1 == v {
            Some(self.v2)
        } else if self.v2 == v {
            Some(self.v1)
        } else {
            None
        }
    }
}

impl Face {
    pub fn first_loop(&self) -> LoopId {
        self.first
    }

    /// Number of corners
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Entry in the selection history. The last entry is the active element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectHistoryElem {
    Vert(VertId),
    Edge(EdgeId),
    Face(FaceId),
}

/// Errors raised by edit-mesh construction and mutation primitives
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditMeshError {
    #[error("Mesh has no position attribute")]
    NoPositions,
    #[error("Mesh has no indices")]
    NoIndices,
    #[error("Vertex index {index} out of range ({count} vertices)")]
    VertexIndexOutOfRange { index: usize, count: usize },
    #[error("Stale or unknown vertex handle {0:?}")]
    InvalidVert(VertId),
    #[error("Stale or unknown edge handle {0:?}")]
    InvalidEdge(EdgeId),
    #[error("Stale or unknown loop handle {0:?}")]
    InvalidLoop(LoopId),
    #[error("Stale or unknown face handle {0:?}")]
    InvalidFace(FaceId),
    #[error("A face needs at least 3 distinct vertices, got {0}")]
    DegenerateFace(usize),
    #[error("Face already exists")]
    DuplicateFace,
    #[error("Cannot create an edge from a vertex to itself")]
    DegenerateEdge,
    #[error("Cannot splice vertices that share an edge")]
    SpliceConnected,
    #[error("Loops passed to a separation must share a single vertex")]
    MixedSeparationVerts,
    #[error("Invalid mesh topology: {0}")]
    InvalidTopology(String),
}
