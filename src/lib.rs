/// Folder
pub mod util;
pub mod provider;

/// Files
pub mod config;
pub mod err;

pub mod prelude {
    pub use crate::config::ProviderConfig;
    pub use crate::err::{ProviderError, Result};
    pub use crate::provider::{DataProvider, ImageDataProvider, ImageDecoder, FileImageDecoder};
    pub use crate::util::{ClipRange, Element, ImageArray, MaskArray, WithParams};
}
