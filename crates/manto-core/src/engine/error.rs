use crate::core::math::matrix::MatrixError;
use crate::engine::projection::ProjectionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalcError {
    #[error("molecule has no surface points assigned")]
    MissingSurface,

    #[error("no orientations supplied for an orientation-searching descriptor")]
    NoOrientations,

    #[error("value map is empty, nothing to reduce")]
    EmptyValueMap,

    #[error("projection failed: {source}")]
    Projection {
        #[from]
        source: ProjectionError,
    },

    #[error("matrix operation failed: {source}")]
    Matrix {
        #[from]
        source: MatrixError,
    },

    #[error("observation count {observations} does not match molecule count {molecules}")]
    ObservationMoleculeMismatch {
        observations: usize,
        molecules: usize,
    },

    #[error("no descriptor sets configured")]
    NoDescriptorSets,

    #[error("surface provider failed: {0}")]
    SurfaceProvider(String),

    #[error("checkpoint store failed: {0}")]
    Checkpoint(String),
}
