use crate::math::curve::curve::Curve;

/// Power-basis polynomial `P(x) = a0 + a1*x + ... + an*x^n`.
///
/// Coefficients are stored in ascending order, so `coefs()[i]` multiplies
/// `x^i` and the order is `coefs().len() - 1`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polynomial {
    coefs: Vec<f64>,
}

impl Polynomial {
    pub fn new(coefs: Vec<f64>) -> Polynomial {
        Polynomial { coefs }
    }

    pub fn coefs(&self) -> &[f64] {
        &self.coefs
    }

    /// `None` for an empty coefficient list.
    pub fn order(&self) -> Option<usize> {
        self.coefs.len().checked_sub(1)
    }

    /// Empty or all-zero coefficients.
    pub fn is_zero(&self) -> bool {
        self.coefs.iter().all(|&a| a == 0.0)
    }
}

impl Curve for Polynomial {
    fn value(&self, x: f64) -> f64 {
        self.coefs
            .iter()
            .rev()
            .fold(0.0, |acc, &a| f64::mul_add(acc, x, a))
    }

    fn derivative(&self, x: f64) -> f64 {
        self.coefs
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .fold(0.0, |acc, (i, &a)| f64::mul_add(acc, x, i as f64 * a))
    }
}
