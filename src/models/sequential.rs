use std::fs::{self, File};
use std::io::prelude::*;
use std::path::Path;

use log::{debug, info};

use ndarray::ArrayView1;
use prost::Message;
use rand::Rng;

use super::model_helper;
use super::pb::PbSequentialModel;
use super::Model;
use crate::err::{NetError, NetResult};
use crate::layer_fabric::{self, ParamSource};
use crate::layers::{FcLayer, LayerPass};
use crate::params_io;
use crate::util::{argmax_first, Activation, DataVec, Float};

/// Stack of fully-connected layers sharing one learning rate
#[derive(Clone, Debug)]
pub struct Sequential {
    ls: Vec<FcLayer>,
    learn_rate: Float,
}

impl Sequential {
    pub fn new(learn_rate: Float) -> Self {
        Self {
            ls: Vec::new(),
            learn_rate,
        }
    }

    /// `layer_sizes` starts with the input width, every next entry adds a layer
    pub fn build<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        activation: Activation,
        learn_rate: Float,
        source: &ParamSource,
        rng: &mut R,
    ) -> NetResult<Self> {
        if layer_sizes.len() < 2 {
            return Err(NetError::config(
                "layer_sizes",
                "need an input size and at least one layer",
            ));
        }

        if let Some(pos) = layer_sizes.iter().position(|s| *s == 0) {
            return Err(NetError::config(
                &format!("layer_sizes[{}]", pos),
                "layer size must be positive",
            ));
        }

        let mut seq = Sequential::new(learn_rate);

        for (idx, pair) in layer_sizes.windows(2).enumerate() {
            let l = layer_fabric::create_layer(idx, pair[0], pair[1], activation, source, rng)?;
            seq.add_layer(l)?;
        }

        match source {
            ParamSource::Random { .. } => info!("Parameters are initialized randomly"),
            ParamSource::Folder(dir) => {
                info!("Parameters are initialized from folder : {}", dir.display())
            }
        }

        Ok(seq)
    }

    pub fn from_layers(layers: Vec<FcLayer>, learn_rate: Float) -> NetResult<Self> {
        let mut seq = Sequential::new(learn_rate);
        for l in layers {
            seq.add_layer(l)?;
        }
        Ok(seq)
    }

    /// Appends a layer, its input must match the output of the current last layer
    pub fn add_layer(&mut self, l: FcLayer) -> NetResult<()> {
        if let Some(last) = self.ls.last() {
            if last.size() != l.prev_size() {
                return Err(NetError::ShapeMismatch(format!(
                    "layer #{} outputs {} values, next layer expects {}",
                    self.ls.len() - 1,
                    last.size(),
                    l.prev_size()
                )));
            }
        }

        self.ls.push(l);
        Ok(())
    }

    pub fn layers(&self) -> &[FcLayer] {
        &self.ls
    }

    pub fn learn_rate(&self) -> Float {
        self.learn_rate
    }

    pub fn set_learn_rate(&mut self, learn_rate: Float) {
        self.learn_rate = learn_rate;
    }

    /// Loads a snapshot written by `save_state` as a new network
    pub fn from_state(filepath: &Path) -> NetResult<Self> {
        let pb_model = Self::read_pb(filepath)?;
        let mut seq = Sequential::new(pb_model.learn_rate);

        for pb_layer in pb_model.layers {
            let activation: Activation = pb_layer.activation.parse()?;
            let params = model_helper::convert_pb_to_params(filepath, pb_layer)?;
            seq.add_layer(FcLayer::new(params, activation))?;
        }

        Ok(seq)
    }

    fn read_pb(filepath: &Path) -> NetResult<PbSequentialModel> {
        let buf = fs::read(filepath).map_err(|e| NetError::param_io(filepath, e))?;
        PbSequentialModel::decode(buf.as_slice()).map_err(|e| NetError::param_io(filepath, e))
    }

    fn forward_passes(&self, input: ArrayView1<Float>) -> NetResult<Vec<LayerPass>> {
        if self.ls.is_empty() {
            return Err(NetError::ShapeMismatch("network has no layers".to_owned()));
        }

        let mut passes: Vec<LayerPass> = Vec::with_capacity(self.ls.len());

        for l in self.ls.iter() {
            let pass = match passes.last() {
                Some(prev) => l.feed_forward(prev.output.view())?,
                None => l.feed_forward(input)?,
            };
            passes.push(pass);
        }

        Ok(passes)
    }
}

impl Model for Sequential {
    fn feedforward(&self, input: ArrayView1<Float>) -> NetResult<DataVec> {
        let mut passes = self.forward_passes(input)?;
        let last = passes
            .pop()
            .ok_or_else(|| NetError::ShapeMismatch("network has no layers".to_owned()))?;
        Ok(last.output)
    }

    fn classify(&self, input: ArrayView1<Float>) -> NetResult<usize> {
        let out = self.feedforward(input)?;
        argmax_first(out.view())
    }

    fn train(&mut self, input: ArrayView1<Float>, target: ArrayView1<Float>) -> NetResult<Float> {
        let passes = self.forward_passes(input)?;

        let output = match passes.last() {
            Some(pass) => &pass.output,
            None => return Err(NetError::ShapeMismatch("network has no layers".to_owned())),
        };

        if output.len() != target.len() {
            return Err(NetError::ShapeMismatch(format!(
                "target has length {}, network outputs {}",
                target.len(),
                output.len()
            )));
        }

        let err = output - &target;
        let loss = 0.5 * err.dot(&err);

        // backward sweep reads pre-update weights of every layer
        let mut grads = Vec::with_capacity(self.ls.len());
        let mut running_err = err;

        for (l, pass) in self.ls.iter().zip(passes).rev() {
            let (grad, input_err) = l.back_propagate(pass, running_err.view())?;
            grads.push(grad);
            running_err = input_err;
        }

        grads.reverse();

        for (l, grad) in self.ls.iter_mut().zip(grads.iter()) {
            l.update(grad, self.learn_rate)?;
        }

        debug!("[ok] Sequential train(), loss {}", loss);

        Ok(loss)
    }

    fn layers_count(&self) -> usize {
        self.ls.len()
    }

    fn input_size(&self) -> usize {
        self.ls.first().map(|l| l.prev_size()).unwrap_or(0)
    }

    fn output_size(&self) -> usize {
        self.ls.last().map(|l| l.size()).unwrap_or(0)
    }

    fn model_type(&self) -> &str {
        "Sequential"
    }

    fn save_parameters(&self, dir: &Path) -> NetResult<()> {
        params_io::save_layers(dir, &self.ls)
    }

    fn save_state(&self, filepath: &Path) -> NetResult<()> {
        let pb_model = PbSequentialModel {
            layers: self.ls.iter().map(model_helper::convert_layer_to_pb).collect(),
            learn_rate: self.learn_rate,
        };

        let mut file = File::create(filepath).map_err(|e| NetError::param_io(filepath, e))?;
        file.write_all(pb_model.encode_to_vec().as_slice())
            .map_err(|e| NetError::param_io(filepath, e))?;

        info!("Saved model state to {}", filepath.display());

        Ok(())
    }

    /// Architecture of the snapshot must match this network
    fn load_state(&mut self, filepath: &Path) -> NetResult<()> {
        let pb_model = Self::read_pb(filepath)?;

        if pb_model.layers.len() != self.ls.len() {
            return Err(NetError::ShapeMismatch(format!(
                "snapshot has {} layers, network has {}",
                pb_model.layers.len(),
                self.ls.len()
            )));
        }

        let mut loaded = Vec::with_capacity(self.ls.len());
        for pb_layer in pb_model.layers {
            let activation: Activation = pb_layer.activation.parse()?;
            loaded.push((model_helper::convert_pb_to_params(filepath, pb_layer)?, activation));
        }

        // validate every layer before touching any of them
        for (idx, (l, (params, activation))) in self.ls.iter().zip(loaded.iter()).enumerate() {
            if l.activation() != *activation {
                return Err(NetError::config(
                    "activation",
                    format!(
                        "snapshot layer #{} uses {}, network layer uses {}",
                        idx,
                        activation,
                        l.activation()
                    ),
                ));
            }
            if l.size() != params.size() || l.prev_size() != params.prev_size() {
                return Err(NetError::ShapeMismatch(format!(
                    "snapshot layer is {}x{}, network layer is {}x{}",
                    params.size(),
                    params.prev_size(),
                    l.size(),
                    l.prev_size()
                )));
            }
        }

        for (l, (params, _)) in self.ls.iter_mut().zip(loaded) {
            l.set_params(params)?;
        }

        self.learn_rate = pb_model.learn_rate;

        Ok(())
    }
}
