use thiserror::Error;

#[derive(Error, Debug)]
pub enum TessviewError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Invalid scene file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid image shape: {0}")]
    Shape(String),

    #[error("No matching source kind: {0}")]
    UnsupportedSource(String),

    #[error("Unsupported orientation '{0}' (only 'horizontal' is supported)")]
    UnsupportedOrientation(String),

    #[error("Unknown coordinate frame '{0}'")]
    UnknownFrame(String),

    #[error("Unknown panel '{0}'")]
    UnknownPanel(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid FITS file: {0}")]
    Fits(String),

    #[error("No movie writer available: {0}")]
    WriterUnavailable(String),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("Encoding error: {0}")]
    Encode(String),
}

pub type Result<T> = std::result::Result<T, TessviewError>;
