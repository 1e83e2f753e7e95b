use std::collections::HashMap;
use crate::util::*;

/// Reports the parameters an object was set up with
pub trait WithParams {
    fn cfg(&self) -> HashMap<String, Variant> { HashMap::new() }
}
