use std::path::Path;

use crate::cpu_params::CpuParams;
use crate::err::{NetError, NetResult};
use crate::layers::FcLayer;
use crate::models::pb::{PbBuf, PbFcLayer};
use crate::util::{Array1D, Array2D};

pub fn convert_buf_2d_to_pb(buf: &Array2D) -> PbBuf {
    PbBuf {
        vals: buf.iter().copied().collect(),
        shape: buf.shape().iter().map(|s| *s as i32).collect(),
    }
}

pub fn convert_buf_1d_to_pb(buf: &Array1D) -> PbBuf {
    PbBuf {
        vals: buf.to_vec(),
        shape: vec![buf.len() as i32],
    }
}

pub fn convert_layer_to_pb(l: &FcLayer) -> PbFcLayer {
    PbFcLayer {
        weights: Some(convert_buf_2d_to_pb(l.weights())),
        bias: Some(convert_buf_1d_to_pb(l.biases())),
        activation: l.activation().name().to_owned(),
    }
}

/// We take the message by value to move the float buffers out without copying
pub fn convert_pb_to_params(path: &Path, pb_layer: PbFcLayer) -> NetResult<CpuParams> {
    let pb_ws = pb_layer
        .weights
        .ok_or_else(|| NetError::param_io(path, "layer without weights"))?;
    let pb_bias = pb_layer
        .bias
        .ok_or_else(|| NetError::param_io(path, "layer without bias"))?;

    if pb_ws.shape.len() != 2 || pb_bias.shape.len() != 1 {
        return Err(NetError::param_io(path, "invalid buffer rank"));
    }

    let ws = Array2D::from_shape_vec(
        (pb_ws.shape[0] as usize, pb_ws.shape[1] as usize),
        pb_ws.vals,
    )
    .map_err(|e| NetError::param_io(path, e))?;
    let bias = Array1D::from_shape_vec(pb_bias.shape[0] as usize, pb_bias.vals)
        .map_err(|e| NetError::param_io(path, e))?;

    CpuParams::from_parts(ws, bias)
}
