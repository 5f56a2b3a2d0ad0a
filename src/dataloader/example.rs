use crate::err::{NetError, NetResult};
use crate::util::{Activation, DataVec, Float};

/// One labeled image, pixels flattened row by row and normalized into 0..1
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Example {
    pub pixels: DataVec,
    pub label: usize,
}

impl Example {
    pub fn new(pixels: Vec<Float>, label: usize) -> Self {
        Self {
            pixels: DataVec::from(pixels),
            label,
        }
    }
}

/// One-hot target levels. The "on" and "off" values must lie inside the
/// output range of the activation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetEncoding {
    pub on: Float,
    pub off: Float,
}

impl TargetEncoding {
    /// Soft targets for sigmoid, which only reaches 0 and 1 asymptotically
    pub fn for_activation(activation: Activation) -> Self {
        match activation {
            Activation::Sigmoid => Self { on: 0.99, off: 0.01 },
            Activation::Tanh | Activation::Gelu => Self { on: 1.0, off: 0.0 },
        }
    }

    pub fn encode(&self, label: usize, category_count: usize) -> NetResult<DataVec> {
        if label >= category_count {
            return Err(NetError::Dataset(format!(
                "label {} is out of range for {} categories",
                label, category_count
            )));
        }

        let mut target = DataVec::from_elem(category_count, self.off);
        target[label] = self.on;

        Ok(target)
    }
}
