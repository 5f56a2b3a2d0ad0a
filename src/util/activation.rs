use std::fmt;
use std::str::FromStr;

use crate::err::NetError;

use super::util::Float;

/// sqrt(2 / pi)
const GELU_C: Float = 0.797_884_6;
const GELU_K: Float = 0.044715;

pub fn sigmoid(val: Float) -> Float {
    return 1.0 / (1.0 + (-val).exp());
}

/// Takes the sigmoid output, not its input
pub fn sigmoid_deriv(out: Float) -> Float {
    return (1.0 - out) * out;
}

/// Hyperbolic tangent scaled to half slope, tanh(x / 2)
pub fn tanh(val: Float) -> Float {
    return (0.5 * val).tanh();
}

/// Takes the tanh output, not its input
pub fn tanh_deriv(out: Float) -> Float {
    return 0.5 * (1.0 - out * out);
}

/// Tanh based approximation of the Gaussian error linear unit
pub fn gelu(val: Float) -> Float {
    let u = GELU_C * (val + GELU_K * val * val * val);
    return 0.5 * val * (1.0 + u.tanh());
}

/// Exact derivative of [`gelu`], takes the pre-activation value
pub fn gelu_deriv(val: Float) -> Float {
    let t = (GELU_C * (val + GELU_K * val * val * val)).tanh();
    let du = GELU_C * (1.0 + 3.0 * GELU_K * val * val);

    return 0.5 * (1.0 + t) + 0.5 * val * (1.0 - t * t) * du;
}

/// Which value of a neuron the activation derivative is written in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GradientInput {
    Output,
    PreActivation,
}

/// Closed set of activation functions selectable by name
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activation {
    Sigmoid,
    Tanh,
    Gelu,
}

impl Activation {
    pub fn forward(self, val: Float) -> Float {
        match self {
            Activation::Sigmoid => sigmoid(val),
            Activation::Tanh => tanh(val),
            Activation::Gelu => gelu(val),
        }
    }

    /// Local derivative of a neuron. Both the pre-activation sum and the
    /// already computed output are passed, each variant reads the one given
    /// by [`Activation::gradient_input`].
    pub fn derivative(self, pre_activation: Float, output: Float) -> Float {
        match self {
            Activation::Sigmoid => sigmoid_deriv(output),
            Activation::Tanh => tanh_deriv(output),
            Activation::Gelu => gelu_deriv(pre_activation),
        }
    }

    pub fn gradient_input(self) -> GradientInput {
        match self {
            Activation::Sigmoid | Activation::Tanh => GradientInput::Output,
            Activation::Gelu => GradientInput::PreActivation,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Activation::Sigmoid => "SIGMOID",
            Activation::Tanh => "TANH",
            Activation::Gelu => "GELU",
        }
    }
}

impl FromStr for Activation {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SIGMOID" => Ok(Activation::Sigmoid),
            "TANH" => Ok(Activation::Tanh),
            "GELU" => Ok(Activation::Gelu),
            _ => Err(NetError::UnknownActivation(s.to_owned())),
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    const ALL: [Activation; 3] = [Activation::Sigmoid, Activation::Tanh, Activation::Gelu];

    fn central_difference(act: Activation, x: Float) -> Float {
        let h = 1e-2;
        (act.forward(x + h) - act.forward(x - h)) / (2.0 * h)
    }

    #[test]
    fn derivative_matches_finite_difference() {
        for act in ALL {
            for i in -30..=30 {
                let x = i as Float * 0.2;
                let analytic = act.derivative(x, act.forward(x));
                let numeric = central_difference(act, x);

                assert_abs_diff_eq!(analytic, numeric, epsilon = 1e-3);
            }
        }
    }

    #[test]
    fn forward_at_zero() {
        assert_relative_eq!(Activation::Sigmoid.forward(0.0), 0.5);
        assert_abs_diff_eq!(Activation::Tanh.forward(0.0), 0.0);
        assert_abs_diff_eq!(Activation::Gelu.forward(0.0), 0.0);
    }

    #[test]
    fn bounded_outputs_stay_finite() {
        for x in [-1e4, -50.0, 50.0, 1e4] {
            let s = Activation::Sigmoid.forward(x);
            let t = Activation::Tanh.forward(x);

            assert!(s.is_finite() && (0.0..=1.0).contains(&s));
            assert!(t.is_finite() && (-1.0..=1.0).contains(&t));
        }

        assert!(Activation::Gelu.forward(50.0) > 49.0);
        assert_abs_diff_eq!(Activation::Gelu.forward(-50.0), 0.0);
    }

    #[test]
    fn gelu_reads_pre_activation() {
        assert_eq!(Activation::Gelu.gradient_input(), GradientInput::PreActivation);
        assert_eq!(Activation::Sigmoid.gradient_input(), GradientInput::Output);

        // the output argument must be ignored
        let d = Activation::Gelu.derivative(1.5, 123.0);
        assert_relative_eq!(d, gelu_deriv(1.5));
    }

    #[test]
    fn parse_by_name() {
        assert_eq!("sigmoid".parse::<Activation>().unwrap(), Activation::Sigmoid);
        assert_eq!(" TANH ".parse::<Activation>().unwrap(), Activation::Tanh);
        assert_eq!("Gelu".parse::<Activation>().unwrap(), Activation::Gelu);

        match "relu".parse::<Activation>() {
            Err(NetError::UnknownActivation(name)) => assert_eq!(name, "relu"),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
