use ndarray::{Array1, Array2, ArrayView1};
use ndarray_stats::QuantileExt;

use crate::err::{NetError, NetResult};

pub type Float = f32;
pub type DataVec = Array1<Float>;
pub type Array1D = Array1<Float>;
pub type Array2D = Array2<Float>;
pub type WsMat = Array2<Float>;

/// Index of the highest value, the first one on ties.
/// Fails when a NaN makes the order undefined.
pub fn argmax_first(vals: ArrayView1<Float>) -> NetResult<usize> {
    vals.argmax().map_err(|_| NetError::UndefinedOutput)
}
