use ndarray::{Array, Dimension, Zip};
use serde::{Deserialize, Serialize};

use crate::err::{ProviderError, Result};
use crate::util::Float;

/// Value clipping bounds, an absent bound leaves that side open
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct ClipRange {
    pub a_min: Option<Float>,
    pub a_max: Option<Float>,
}

impl ClipRange {
    pub fn new(a_min: Option<Float>, a_max: Option<Float>) -> Result<Self> {
        if let (Some(min), Some(max)) = (a_min, a_max) {
            if min > max {
                return Err(ProviderError::WrongArg(format!(
                    "a_min ({}) is greater than a_max ({})",
                    min, max
                )));
            }
        }

        Ok(Self { a_min, a_max })
    }

    pub fn is_unbounded(&self) -> bool {
        self.a_min.is_none() && self.a_max.is_none()
    }

    pub fn clip_val(&self, val: Float) -> Float {
        let mut out = val;

        if let Some(min) = self.a_min {
            if out < min {
                out = min;
            }
        }

        if let Some(max) = self.a_max {
            if out > max {
                out = max;
            }
        }

        out
    }

    pub fn apply<D>(&self, data: &mut Array<Float, D>)
    where
        D: Dimension,
    {
        if self.is_unbounded() {
            return;
        }

        Zip::from(data).for_each(|el| {
            *el = self.clip_val(*el);
        });
    }
}
