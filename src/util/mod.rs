mod util;
mod clip;
pub mod array_helpers;
pub mod with_params;

pub use util::*;
pub use clip::*;
pub use with_params::*;
