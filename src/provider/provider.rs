use std::path::Path;

use ndarray::ArrayD;

use crate::err::Result;
use crate::util::{ClipRange, Element, ImageArray, MaskArray};

/// Source of (image, mask) training pairs.
///
/// Implementors carry the clipping bounds handed to them at construction and
/// know how to turn a file into an array of any [`Element`] type.
pub trait DataProvider {
    fn clip_range(&self) -> &ClipRange;

    fn load_file<T: Element>(&self, path: &Path) -> Result<ArrayD<T>>
    where
        Self: Sized;

    fn next_data(&mut self) -> Result<(ImageArray, MaskArray)>;

    fn reset(&mut self) { }
    fn len(&self) -> Option< usize > { None }
    fn pos(&self) -> Option< usize > { None }
}
