use std::path::{Path, PathBuf};

use log::debug;

use rand::Rng;

use crate::cpu_params::CpuParams;
use crate::err::NetResult;
use crate::layers::FcLayer;
use crate::params_io;
use crate::util::{Activation, Float};

/// Where the weights and biases of a freshly built network come from
#[derive(Clone, Debug, PartialEq)]
pub enum ParamSource {
    /// Uniform over `[-range, range]`
    Random { range: Float },
    /// Folder written by `params_io::save_layers`
    Folder(PathBuf),
}

impl ParamSource {
    pub fn folder(dir: impl AsRef<Path>) -> Self {
        ParamSource::Folder(dir.as_ref().to_path_buf())
    }
}

/// Fabric used to create the fully-connected layer `layer_idx`
pub fn create_layer<R: Rng + ?Sized>(
    layer_idx: usize,
    prev_size: usize,
    size: usize,
    activation: Activation,
    source: &ParamSource,
    rng: &mut R,
) -> NetResult<FcLayer> {
    let params = match source {
        ParamSource::Random { range } => CpuParams::new_random(size, prev_size, *range, rng)?,
        ParamSource::Folder(dir) => params_io::read_layer_params(dir, layer_idx, size, prev_size)?,
    };

    debug!(
        "Created layer #{} : {} -> {}, activation {}",
        layer_idx, prev_size, size, activation
    );

    Ok(FcLayer::new(params, activation))
}
