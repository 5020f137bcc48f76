use std::fmt;

use thiserror::Error;

use crate::math::curve::nonparametriccurve::piecewisepolynomial::InterpolationError;

const CONVERGENCE_MESSAGE: &str = "Error: The polynomial applied by the squeeze morph has \
resulted in a grid that is no longer strictly increasing, likely due to a convergence issue. \
A strictly increasing grid is required to compute the morphed function through cubic spline \
interpolation. Here are some suggested methods to resolve this:\n\
(1) Please decrease the order of your polynomial and try again.\n\
(2) If you are using initial guesses of all 0, please ensure your objective function only \
requires a small polynomial squeeze to match your reference. (In other words, there is good \
agreement between the two functions.)\n\
(3) If you expect a large polynomial squeeze to be needed, please ensure your initial \
parameters for the polynomial morph result in good agreement between your reference and \
objective functions. One way to obtain such parameters is to first apply a horizontal shift \
and a stretch morph. Then, use the hshift parameter for a0 and the stretch parameter for a1.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveRole {
    Morph,
    Target,
    SqueezedMorph,
}

impl fmt::Display for CurveRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurveRole::Morph => write!(f, "morph"),
            CurveRole::Target => write!(f, "target"),
            CurveRole::SqueezedMorph => write!(f, "squeezed morph"),
        }
    }
}

/// Fatal conditions of a single morph invocation.
///
/// Non-fatal conditions are reported as
/// [`MorphWarning`](crate::morph::morphwarning::MorphWarning)s on the result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MorphError {
    #[error("{curve} curve is empty")]
    EmptyCurve { curve: CurveRole },

    #[error("{curve} curve has {x_len} x values but {y_len} y values")]
    LengthMismatch { curve: CurveRole, x_len: usize, y_len: usize },

    #[error("{curve} curve has a non-finite grid value at index {index}")]
    NonFiniteGrid { curve: CurveRole, index: usize },

    #[error("parameter {name} = {value} is out of range: {reason}")]
    InvalidParameter { name: &'static str, value: f64, reason: &'static str },

    #[error("squeezed morph grid [{morph_min}, {morph_max}] does not overlap target grid [{target_min}, {target_max}]")]
    NoOverlap { morph_min: f64, morph_max: f64, target_min: f64, target_max: f64 },

    #[error(transparent)]
    Interpolation(#[from] InterpolationError),

    #[error("{}", CONVERGENCE_MESSAGE)]
    Convergence,
}

impl MorphError {
    pub fn is_convergence_error(&self) -> bool {
        matches!(self, MorphError::Convergence)
    }

    /// Process exit status for command-line callers.
    pub fn exit_code(&self) -> i32 {
        match self {
            MorphError::EmptyCurve { .. }
            | MorphError::LengthMismatch { .. }
            | MorphError::NonFiniteGrid { .. }
            | MorphError::InvalidParameter { .. }
            | MorphError::NoOverlap { .. } => 2,
            MorphError::Convergence => 3,
            MorphError::Interpolation(_) => 4,
        }
    }
}
