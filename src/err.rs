use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("No training files matching '{pattern}'")]
    NoTrainingFiles { pattern: String },

    #[error("Invalid search pattern : {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Couldn't load image {path:?} : {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Couldn't decode png {path:?} : {source}")]
    Png {
        path: PathBuf,
        #[source]
        source: png::DecodingError,
    },

    #[error("Couldn't decode tiff {path:?} : {source}")]
    Tiff {
        path: PathBuf,
        #[source]
        source: tiff::TiffError,
    },

    #[error("Decoded buffer doesn't fit its shape : {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Wrong arguments : {0}")]
    WrongArg(String),

    #[error("Invalid config : {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProviderError>;

impl From<serde_yaml::Error> for ProviderError {
    fn from(e: serde_yaml::Error) -> Self {
        ProviderError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Config(e.to_string())
    }
}
