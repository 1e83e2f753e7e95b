use ndarray::{ArrayD, Dimension, ArrayBase, Data};
use ndarray_stats::QuantileExt;

use crate::util::Float;

/// (min, max) of the array, `None` for an empty array
pub fn value_range<S, D>(arr: &ArrayBase<S, D>) -> Option<(Float, Float)>
where
    S: Data<Elem = Float>,
    D: Dimension,
{
    if arr.is_empty() {
        return None;
    }

    Some((*arr.min_skipnan(), *arr.max_skipnan()))
}

pub fn count_positive(mask: &ArrayD<bool>) -> usize {
    mask.iter().filter(|v| **v).count()
}
