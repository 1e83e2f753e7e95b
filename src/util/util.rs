use serde::{Deserialize, Serialize};

use ndarray::ArrayD;

pub type Float = f32;
/// Pixel values straight out of the decoder, `[h, w]` or `[h, w, c]`
pub type RawImage = ArrayD<Float>;
pub type ImageArray = ArrayD<Float>;
pub type MaskArray = ArrayD<bool>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Variant {
    Int(i32),
    Float(f32),
    String(String),
    Bool(bool),
}

/// Element type a decoded image can be materialized as.
///
/// Conversion from raw pixel values follows numeric casting, out of range
/// values saturate. `bool` is true for every non-zero pixel, so a mask loads
/// the same way whether it was stored as 0/1, 0/255 or 16-bit.
pub trait Element: Copy + Default + std::fmt::Debug {
    fn from_pixel(val: Float) -> Self;
}

impl Element for f32 {
    fn from_pixel(val: Float) -> Self {
        val
    }
}

impl Element for f64 {
    fn from_pixel(val: Float) -> Self {
        val as f64
    }
}

impl Element for u8 {
    fn from_pixel(val: Float) -> Self {
        val as u8
    }
}

impl Element for u16 {
    fn from_pixel(val: Float) -> Self {
        val as u16
    }
}

impl Element for i32 {
    fn from_pixel(val: Float) -> Self {
        val as i32
    }
}

impl Element for bool {
    fn from_pixel(val: Float) -> Self {
        val != 0.0
    }
}

/// Coerces a decoded image to the requested element type
pub fn cast_image<T: Element>(raw: &RawImage) -> ArrayD<T> {
    raw.mapv(T::from_pixel)
}
