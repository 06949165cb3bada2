use thiserror::Error;

pub type Result<T> = std::result::Result<T, CertError>;

/// Failures of the directory service. The `Display` text is what the
/// certificate shows inline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Username is missing.")]
    MissingUsername,
    #[error("GitHub profile not found")]
    NotFound,
    #[error("{0}")]
    Transport(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Could not capture avatar {url}: {reason}")]
    Avatar { url: String, reason: String },
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Failed to parse certificate layout: {0}")]
    Layout(String),
    #[error("Cannot create a {width}x{height} canvas")]
    Canvas { width: u32, height: u32 },
    #[error("PNG encoding failed: {0}")]
    Encode(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum CertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}
