use gh_certificate::{CertError, ExportError};
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Could not export certificate: {0}")]
    ExportError(#[from] ExportError),

    #[error(transparent)]
    IoError(#[from] io::Error),

    #[error(transparent)]
    CertError(#[from] CertError),
}
