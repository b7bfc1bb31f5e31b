use thiserror::Error;

/// Reasons a rip invocation reports failure.
///
/// Variants are listed in reporting priority: when several objects fail for
/// different reasons only the first applicable one is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RipError {
    #[error("Cannot rip selected faces")]
    FacesSelected,
    #[error("Cannot rip multiple disconnected vertices")]
    DisconnectedVertices,
    #[error("Rip failed")]
    Failed,
}
