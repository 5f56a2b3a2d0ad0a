mod model_helper;
mod sequential;
pub mod pb;

use std::path::Path;

use ndarray::ArrayView1;

pub use sequential::*;

use crate::err::NetResult;
use crate::util::{DataVec, Float};

pub trait Model {
    /// Output of the last layer for one example
    fn feedforward(&self, input: ArrayView1<Float>) -> NetResult<DataVec>;

    /// Index of the highest output, the first one on ties
    fn classify(&self, input: ArrayView1<Float>) -> NetResult<usize>;

    /// One online gradient descent step, returns the loss `0.5 * sum(err^2)`
    /// measured before the update
    fn train(&mut self, input: ArrayView1<Float>, target: ArrayView1<Float>) -> NetResult<Float>;

    fn layers_count(&self) -> usize;
    fn input_size(&self) -> usize;
    fn output_size(&self) -> usize;

    fn model_type(&self) -> &str;

    /// Parameter folder, see `params_io`
    fn save_parameters(&self, dir: &Path) -> NetResult<()>;

    /// Protobuf snapshot of the whole model
    fn save_state(&self, filepath: &Path) -> NetResult<()>;
    fn load_state(&mut self, filepath: &Path) -> NetResult<()>;
}
