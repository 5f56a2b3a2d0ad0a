//! Parameter files of a trained network.
//!
//! Each layer `i` is stored as two raw files inside one folder:
//! `layer.<i>.w.dat` holds `size * prev_size` weights in row-major order
//! (neuron by neuron), `layer.<i>.b.dat` holds `size` biases. Values are
//! 32-bit floats in big-endian byte order, without any header.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;

use crate::cpu_params::CpuParams;
use crate::err::{NetError, NetResult};
use crate::layers::FcLayer;
use crate::util::{Array1D, Float, WsMat};

const FLOAT_BYTES: usize = std::mem::size_of::<Float>();

pub fn weight_file_path(dir: &Path, layer_idx: usize) -> PathBuf {
    dir.join(format!("layer.{}.w.dat", layer_idx))
}

pub fn bias_file_path(dir: &Path, layer_idx: usize) -> PathBuf {
    dir.join(format!("layer.{}.b.dat", layer_idx))
}

pub fn write_floats<'a, I>(path: &Path, vals: I) -> NetResult<()>
where
    I: IntoIterator<Item = &'a Float>,
{
    let file = File::create(path).map_err(|e| NetError::param_io(path, e))?;
    let mut out = BufWriter::new(file);

    for v in vals {
        out.write_all(&v.to_be_bytes())
            .map_err(|e| NetError::param_io(path, e))?;
    }

    out.flush().map_err(|e| NetError::param_io(path, e))
}

/// Reads exactly `count` floats, any other file length is an error
pub fn read_floats(path: &Path, count: usize) -> NetResult<Vec<Float>> {
    let buf = fs::read(path).map_err(|e| NetError::param_io(path, e))?;

    if buf.len() != count * FLOAT_BYTES {
        return Err(NetError::param_io(
            path,
            format!(
                "expected {} values ({} bytes), file has {} bytes",
                count,
                count * FLOAT_BYTES,
                buf.len()
            ),
        ));
    }

    let vals = buf
        .chunks_exact(FLOAT_BYTES)
        .map(|c| Float::from_be_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    Ok(vals)
}

/// Logical iteration order of ndarray is row-major whatever the memory layout
pub fn write_weights(path: &Path, ws: &WsMat) -> NetResult<()> {
    write_floats(path, ws.iter())
}

pub fn read_weights(path: &Path, size: usize, prev_size: usize) -> NetResult<WsMat> {
    let vals = read_floats(path, size * prev_size)?;
    WsMat::from_shape_vec((size, prev_size), vals).map_err(|e| NetError::param_io(path, e))
}

pub fn write_biases(path: &Path, bias: &Array1D) -> NetResult<()> {
    write_floats(path, bias.iter())
}

pub fn read_biases(path: &Path, size: usize) -> NetResult<Array1D> {
    Ok(Array1D::from(read_floats(path, size)?))
}

pub fn read_layer_params(
    dir: &Path,
    layer_idx: usize,
    size: usize,
    prev_size: usize,
) -> NetResult<CpuParams> {
    let ws = read_weights(&weight_file_path(dir, layer_idx), size, prev_size)?;
    let bias = read_biases(&bias_file_path(dir, layer_idx), size)?;

    CpuParams::from_parts(ws, bias)
}

/// Writes all layers into `dir`, creating it when needed
pub fn save_layers(dir: &Path, layers: &[FcLayer]) -> NetResult<()> {
    fs::create_dir_all(dir).map_err(|e| NetError::param_io(dir, e))?;

    for (idx, l) in layers.iter().enumerate() {
        write_weights(&weight_file_path(dir, idx), l.weights())?;
        write_biases(&bias_file_path(dir, idx), l.biases())?;
    }

    info!("Saved parameters of {} layers to {}", layers.len(), dir.display());

    Ok(())
}
