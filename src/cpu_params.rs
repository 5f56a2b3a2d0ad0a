use log::debug;

use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;

use crate::err::{NetError, NetResult};
use crate::util::{Array1D, Float, WsMat};

/// Default half-width of the uniform weight initialization range
pub const DEFAULT_INIT_RANGE: Float = 0.5;

/// Trainable buffers of one fully-connected layer.
/// `ws` has one row per neuron and one column per input, `bias` one entry per neuron.
#[derive(Clone, Debug, PartialEq)]
pub struct CpuParams {
    pub ws: WsMat,
    pub bias: Array1D,
}

impl CpuParams {
    /// Weights and biases drawn from `U[-range, range]`
    pub fn new_random<R: Rng + ?Sized>(
        size: usize,
        prev_size: usize,
        range: Float,
        rng: &mut R,
    ) -> NetResult<Self> {
        if !(range.is_finite() && range > 0.0) {
            return Err(NetError::config(
                "init_range",
                format!("must be a positive number, got {}", range),
            ));
        }

        let distr = Uniform::new_inclusive(-range, range);
        let ws = WsMat::random_using((size, prev_size), distr, rng);
        let bias = Array1D::random_using(size, distr, rng);

        debug!("Random params {}x{} in [-{}, {}]", size, prev_size, range, range);

        Ok(Self { ws, bias })
    }

    pub fn zeros(size: usize, prev_size: usize) -> Self {
        Self {
            ws: WsMat::zeros((size, prev_size)),
            bias: Array1D::zeros(size),
        }
    }

    pub fn from_parts(ws: WsMat, bias: Array1D) -> NetResult<Self> {
        if ws.nrows() != bias.len() {
            return Err(NetError::ShapeMismatch(format!(
                "weight matrix has {} rows but bias vector has {} entries",
                ws.nrows(),
                bias.len()
            )));
        }

        Ok(Self { ws, bias })
    }

    /// Neuron count
    pub fn size(&self) -> usize {
        self.ws.nrows()
    }

    /// Input count
    pub fn prev_size(&self) -> usize {
        self.ws.ncols()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn random_params_are_symmetric_and_seeded() {
        let mut rng = StdRng::seed_from_u64(7);
        let p = CpuParams::new_random(8, 20, 0.5, &mut rng).unwrap();

        assert_eq!(p.ws.dim(), (8, 20));
        assert_eq!(p.bias.len(), 8);
        assert!(p.ws.iter().chain(p.bias.iter()).all(|v| v.abs() <= 0.5));
        assert!(p.ws.iter().any(|v| *v > 0.0) && p.ws.iter().any(|v| *v < 0.0));

        let mut rng = StdRng::seed_from_u64(7);
        let same = CpuParams::new_random(8, 20, 0.5, &mut rng).unwrap();
        assert_eq!(p, same);
    }

    #[test]
    fn rejects_bad_range() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(CpuParams::new_random(2, 2, 0.0, &mut rng).is_err());
        assert!(CpuParams::new_random(2, 2, Float::NAN, &mut rng).is_err());
    }

    #[test]
    fn from_parts_checks_bias_len() {
        let ws = array![[1.0, 2.0], [3.0, 4.0]];
        assert!(CpuParams::from_parts(ws.clone(), array![0.0, 0.0]).is_ok());
        assert!(matches!(
            CpuParams::from_parts(ws, array![0.0]),
            Err(NetError::ShapeMismatch(_))
        ));
    }
}
