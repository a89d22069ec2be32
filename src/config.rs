//! Options for a backward pass.

use crate::engine::ValueType;
use crate::error::{Error, Result};

/// Closed interval every accumulated gradient is clamped into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradClip {
    min: ValueType,
    max: ValueType,
}

impl GradClip {
    pub fn new(min: ValueType, max: ValueType) -> Result<Self> {
        if min.is_nan() || max.is_nan() || min > max {
            return Err(Error::InvalidClipRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> ValueType {
        self.min
    }

    pub fn max(&self) -> ValueType {
        self.max
    }

    pub fn apply(&self, grad: ValueType) -> ValueType {
        grad.clamp(self.min, self.max)
    }
}

/// Controls how [`Value::backward_with`](crate::engine::Value::backward_with)
/// treats gradients already present in the graph.
///
/// The default accumulates into existing gradients and does not clip, which is
/// what [`Value::backward`](crate::engine::Value::backward) uses.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BackwardConfig {
    /// Zero every reachable gradient before seeding the root.
    pub zero_grad: bool,
    /// Clamp each operand gradient after every contribution.
    pub grad_clip: Option<GradClip>,
}

impl BackwardConfig {
    pub fn with_zero_grad(mut self, zero_grad: bool) -> Self {
        self.zero_grad = zero_grad;
        self
    }

    pub fn with_grad_clip(mut self, grad_clip: GradClip) -> Self {
        self.grad_clip = Some(grad_clip);
        self
    }
}
