use thiserror::Error;

/// everything that can go wrong between opening a file and printing it
///
/// every variant names the resource it failed on so the cli can
/// print a useful line without extra context
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("unreadable resource {path}: {source}")]
    UnreadableResource {
        path: String,
        source: std::io::Error,
    },

    #[error("unrecognized format {path}: {reason}")]
    UnrecognizedFormat { path: String, reason: String },

    #[error("truncated header {path}: need {need} bytes, have {have}")]
    TruncatedHeader {
        path: String,
        need: usize,
        have: usize,
    },

    #[error("corrupt payload {path}: {message}")]
    CorruptPayload { path: String, message: String },

    #[error("resource closed {path}")]
    ResourceClosed { path: String },

    #[error("export failed {path}: {source}")]
    Export {
        path: String,
        source: image::ImageError,
    },
}

impl ImageError {
    /// stable name of the error kind, handy for matching in logs
    pub fn kind(&self) -> &'static str {
        match self {
            ImageError::UnreadableResource { .. } => "UnreadableResource",
            ImageError::UnrecognizedFormat { .. } => "UnrecognizedFormat",
            ImageError::TruncatedHeader { .. } => "TruncatedHeader",
            ImageError::CorruptPayload { .. } => "CorruptPayload",
            ImageError::ResourceClosed { .. } => "ResourceClosed",
            ImageError::Export { .. } => "Export",
        }
    }
}

pub type Result<T> = std::result::Result<T, ImageError>;
