pub mod provider;
pub mod discovery;
pub mod decoder;
pub mod image_provider;

pub use provider::*;
pub use discovery::*;
pub use decoder::*;
pub use image_provider::*;
