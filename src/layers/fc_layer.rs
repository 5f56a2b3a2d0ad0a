use log::debug;

use ndarray::{ArrayView1, Zip};

use super::pass::{LayerGrad, LayerPass};
use crate::cpu_params::CpuParams;
use crate::err::{NetError, NetResult};
use crate::util::{Activation, Array1D, DataVec, Float, WsMat};

/// Fully-connected layer, maps `prev_size` inputs to `size` neurons.
///
/// The layer holds no per-example state. One training step threads the
/// records through the calls:
/// `feed_forward -> LayerPass -> back_propagate -> LayerGrad -> update`.
#[derive(Clone, Debug, PartialEq)]
pub struct FcLayer {
    params: CpuParams,
    activation: Activation,
}

impl FcLayer {
    pub fn new(params: CpuParams, activation: Activation) -> Self {
        Self { params, activation }
    }

    pub fn size(&self) -> usize {
        self.params.size()
    }

    pub fn prev_size(&self) -> usize {
        self.params.prev_size()
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn weights(&self) -> &WsMat {
        &self.params.ws
    }

    pub fn biases(&self) -> &Array1D {
        &self.params.bias
    }

    pub fn params(&self) -> &CpuParams {
        &self.params
    }

    /// Replaces weights and biases keeping the layer shape
    pub fn set_params(&mut self, params: CpuParams) -> NetResult<()> {
        if params.size() != self.size() || params.prev_size() != self.prev_size() {
            return Err(NetError::ShapeMismatch(format!(
                "layer is {}x{}, given params are {}x{}",
                self.size(),
                self.prev_size(),
                params.size(),
                params.prev_size()
            )));
        }

        self.params = params;
        Ok(())
    }

    /// output[n] = act(bias[n] + sum_k ws[n][k] * input[k])
    pub fn feed_forward(&self, input: ArrayView1<Float>) -> NetResult<LayerPass> {
        check_len("layer input", input.len(), self.prev_size())?;

        let pre_activation = self.params.ws.dot(&input) + &self.params.bias;
        let output = pre_activation.mapv(|v| self.activation.forward(v));

        Ok(LayerPass {
            input: input.to_owned(),
            pre_activation,
            output,
        })
    }

    /// Turns the error at the layer output into the neuron deltas and
    /// returns them with the error at the layer input, `ws^T * delta`.
    pub fn back_propagate(
        &self,
        pass: LayerPass,
        output_err: ArrayView1<Float>,
    ) -> NetResult<(LayerGrad, DataVec)> {
        check_len("output error", output_err.len(), self.size())?;
        check_len("cached output", pass.output.len(), self.size())?;
        check_len("cached input", pass.input.len(), self.prev_size())?;

        let act = self.activation;
        let delta = Zip::from(&pass.pre_activation)
            .and(&pass.output)
            .and(&output_err)
            .map_collect(|pre, out, err| act.derivative(*pre, *out) * err);

        let input_err = self.params.ws.t().dot(&delta);

        debug!("[ok] FcLayer back_propagate()");

        Ok((
            LayerGrad {
                input: pass.input,
                delta,
            },
            input_err,
        ))
    }

    /// Plain gradient descent step for one example, the bias acts as a
    /// weight with constant input 1.
    pub fn update(&mut self, grad: &LayerGrad, learn_rate: Float) -> NetResult<()> {
        check_len("delta", grad.delta.len(), self.size())?;
        check_len("update input", grad.input.len(), self.prev_size())?;

        Zip::from(self.params.ws.rows_mut())
            .and(&grad.delta)
            .for_each(|mut ws_row, delta| {
                ws_row.scaled_add(-learn_rate * delta, &grad.input);
            });

        self.params.bias.scaled_add(-learn_rate, &grad.delta);

        Ok(())
    }
}

fn check_len(what: &str, got: usize, expected: usize) -> NetResult<()> {
    if got != expected {
        return Err(NetError::ShapeMismatch(format!(
            "{} has length {}, expected {}",
            what, got, expected
        )));
    }
    Ok(())
}
