use mantoqsar::core::io::pqr::PqrError;
use mantoqsar::engine::error::CalcError;
use mantoqsar::engine::regression::ModelError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("structure import failed: {0}")]
    Pqr(#[from] PqrError),

    #[error(transparent)]
    Calc(#[from] CalcError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("{0}")]
    Other(String),
}
