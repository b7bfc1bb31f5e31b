//! Rip operator for edit meshes.
//!
//! Ripping disconnects the selected vertices or edges from their neighbours
//! and leaves the half nearest the cursor selected, ready to be dragged
//! apart. The gap can optionally be bridged with new faces.
//!
//! # Architecture
//!
//! - **Scorer**: screen-space distances and side tests against the cursor
//! - **Loop tagger**: orders runs of edges so both halves can be walked
//!   again after splitting
//! - **Vertex rip / edge rip**: the topology change for one selected vertex
//!   or for selected edges
//! - **Side selector**: keeps the half of each run facing the cursor
//! - **Fill**: triangles and quads across the opened gap
//! - **Operator**: per-object orchestration, selection restore and error
//!   reporting

pub mod edge_rip;
pub mod error;
pub mod fill;
pub mod loop_tag;
pub mod operator;
pub mod scorer;
pub mod side_select;
pub mod vert_rip;

pub use error::RipError;
pub use operator::{RipStatus, RipTarget, rip, rip_mesh};
pub use scorer::{ScreenProjector, ViewProjection};

pub use editmesh_config::RipSettings;
