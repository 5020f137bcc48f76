use nalgebra::DVector;
use thiserror::Error;

use crate::math::curve::curve::Curve;
use crate::math::curve::nonparametriccurve::nonparametriccurve::{
    NonparametricCurve,
    Point2D
};
use crate::math::tridiagonal::solve_tridiagonal;

// ─────────────────────────────────────────────
// InterpolationError
// ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpolationError {
    #[error("interpolation requires at least {required} distinct knots, got {given}")]
    TooFewPoints { required: usize, given: usize },
    #[error("x and y knots differ in length ({x_len} vs {y_len})")]
    LengthMismatch { x_len: usize, y_len: usize },
    #[error("knot x values must be finite and strictly increasing (violated at index {index})")]
    NotStrictlyIncreasing { index: usize },
    #[error("spline moment system could not be solved")]
    SingularSystem,
}

// ─────────────────────────────────────────────
// Subpolynomial
// ─────────────────────────────────────────────

struct Subpolynomial {
    /// 由高次到低次，以 `lhs_x` 為展開點
    coefs: Vec<f64>,
    lhs_x: f64,
}

impl Subpolynomial {
    fn new(coefs: Vec<f64>, lhs_x: f64) -> Subpolynomial {
        Subpolynomial { coefs, lhs_x }
    }

    fn value(&self, x: f64) -> f64 {
        let x_diff = x - self.lhs_x;
        let mut result = self.coefs[0];
        for &beta in &self.coefs[1..] {
            result = f64::mul_add(result, x_diff, beta);
        }
        result
    }

    fn derivative(&self, x: f64) -> f64 {
        let x_diff = x - self.lhs_x;
        let order = self.coefs.len() - 1;
        let mut result = 0.0;
        for (i, &beta) in self.coefs[..order].iter().enumerate() {
            result = f64::mul_add(result, x_diff, (order - i) as f64 * beta);
        }
        result
    }
}

// ─────────────────────────────────────────────
// Linear
// ─────────────────────────────────────────────

fn generate_linear_coef_list(points: &[Point2D]) -> Vec<Vec<f64>> {
    (0..(points.len() - 1))
        .map(|i| vec![
            Point2D::slope(&points[i], &points[i + 1]),
            points[i].y(),
        ])
        .collect()
}

// ─────────────────────────────────────────────
// 共用輔助函數
// ─────────────────────────────────────────────

fn knot_spacing(points: &[Point2D]) -> Vec<f64> {
    points
        .windows(2)
        .map(|pair| pair[1].x() - pair[0].x())
        .collect()
}

/// 從各節點的二階導數（moments）m[0..=n] 計算各區間的三次多項式係數。
///
/// 每段多項式以 Horner 形式存成 [d, c, b, a]，對應：
///   S_i(x) = a + b*(x-x_i) + c*(x-x_i)^2 + d*(x-x_i)^3
fn cubic_coefs_from_moments(points: &[Point2D], h: &[f64], m: &[f64]) -> Vec<Vec<f64>> {
    (0..h.len())
        .map(|i| {
            let d = (m[i + 1] - m[i]) / (6.0 * h[i]);
            let c = m[i] / 2.0;
            let b = (points[i + 1].y() - points[i].y()) / h[i]
                  - h[i] * (2.0 * m[i] + m[i + 1]) / 6.0;
            let a = points[i].y();
            vec![d, c, b, a]
        })
        .collect()
}

/// C² 連續性導出的第 i 列右手項：
///   6*( (y[i+1]-y[i])/h[i] - (y[i]-y[i-1])/h[i-1] )
fn moment_rhs(points: &[Point2D], h: &[f64], i: usize) -> f64 {
    6.0 * (
        (points[i + 1].y() - points[i].y()) / h[i]
      - (points[i].y()     - points[i - 1].y()) / h[i - 1]
    )
}

// ─────────────────────────────────────────────
// CubicSpline（Natural / NotAKnot）
// ─────────────────────────────────────────────
//
// 內部方程式：
//   h[i-1]*m[i-1] + 2*(h[i-1]+h[i])*m[i] + h[i]*m[i+1] = rhs[i]
// 未知數只取內部節點 m[1..n-1]，系統維持三對角，以 Thomas 演算法求解。

/// Natural：端點的二階導數為 0（m[0] = m[n] = 0）
fn generate_natural_cubic_coef_list(points: &[Point2D]) -> Result<Vec<Vec<f64>>, InterpolationError> {
    let n = points.len() - 1;
    let h = knot_spacing(points);
    let mut m = vec![0.0; n + 1];

    if n > 1 {
        let size = n - 1;
        let mut sub = DVector::<f64>::zeros(size);
        let mut diag = DVector::<f64>::zeros(size);
        let mut sup = DVector::<f64>::zeros(size);
        let mut rhs = DVector::<f64>::zeros(size);
        for row in 0..size {
            let i = row + 1;
            sub[row] = h[i - 1];
            diag[row] = 2.0 * (h[i - 1] + h[i]);
            sup[row] = h[i];
            rhs[row] = moment_rhs(points, &h, i);
        }
        let interior = solve_tridiagonal(&sub, &diag, &sup, &rhs)
            .ok_or(InterpolationError::SingularSystem)?;
        m[1..n].copy_from_slice(interior.as_slice());
    }

    Ok(cubic_coefs_from_moments(points, &h, &m))
}

/// Not-a-knot：第三導數在 x[1] 與 x[n-1] 處連續。
///
///   m[0] = m[1] + h[0]/h[1] * (m[1] - m[2])
///   m[n] = m[n-1] + h[n-1]/h[n-2] * (m[n-1] - m[n-2])
///
/// 代入第 1 列與第 n-1 列後消去 m[0]、m[n]，系統仍為三對角。
///
/// 退化情形：2 個點為直線，3 個點為通過三點的拋物線。
///
/// Conditioning: the end moments scale the interior moment differences by
/// `h[0]/h[1]` and `h[n-1]/h[n-2]`. A narrow interior interval next to a wide
/// end interval magnifies rounding in `y` by that ratio squared, so such
/// spacing only reproduces data whose slopes are themselves computed exactly.
fn generate_not_a_knot_cubic_coef_list(points: &[Point2D]) -> Result<Vec<Vec<f64>>, InterpolationError> {
    let n = points.len() - 1;
    let h = knot_spacing(points);

    let m = match n {
        1 => vec![0.0; 2],
        2 => {
            let s0 = (points[1].y() - points[0].y()) / h[0];
            let s1 = (points[2].y() - points[1].y()) / h[1];
            let curvature = 2.0 * (s1 - s0) / (h[0] + h[1]);
            vec![curvature; 3]
        }
        _ => {
            let size = n - 1;
            let mut sub = DVector::<f64>::zeros(size);
            let mut diag = DVector::<f64>::zeros(size);
            let mut sup = DVector::<f64>::zeros(size);
            let mut rhs = DVector::<f64>::zeros(size);
            for row in 0..size {
                let i = row + 1;
                sub[row] = h[i - 1];
                diag[row] = 2.0 * (h[i - 1] + h[i]);
                sup[row] = h[i];
                rhs[row] = moment_rhs(points, &h, i);
            }

            // 左端（消去 m[0]）
            diag[0] = (h[0] + h[1]) * (h[0] + 2.0 * h[1]) / h[1];
            sup[0] = (h[1] * h[1] - h[0] * h[0]) / h[1];

            // 右端（消去 m[n]）
            let last = size - 1;
            sub[last] = (h[n - 2] * h[n - 2] - h[n - 1] * h[n - 1]) / h[n - 2];
            diag[last] = (h[n - 2] + h[n - 1]) * (2.0 * h[n - 2] + h[n - 1]) / h[n - 2];

            let interior = solve_tridiagonal(&sub, &diag, &sup, &rhs)
                .ok_or(InterpolationError::SingularSystem)?;

            let mut m = vec![0.0; n + 1];
            m[1..n].copy_from_slice(interior.as_slice());
            m[0] = m[1] + h[0] / h[1] * (m[1] - m[2]);
            m[n] = m[n - 1] + h[n - 1] / h[n - 2] * (m[n - 1] - m[n - 2]);
            m
        }
    };

    Ok(cubic_coefs_from_moments(points, &h, &m))
}

// ─────────────────────────────────────────────
// PolynomialType
// ─────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PolynomialType {
    Linear,
    NaturalCubic,
    /// MorphSqueeze 預設使用的邊界條件
    NotAKnotCubic,
}

/// 2 點時三種型別都退化為線性
const NECESSARY_POINTS: usize = 2;

// ─────────────────────────────────────────────
// PiecewisePolynomial
// ─────────────────────────────────────────────

/// Piecewise polynomial interpolant over strictly increasing knots.
///
/// Outside `[min_x, max_x]` the first or last piece is continued, so cubic
/// types extrapolate with their end polynomials.
pub struct PiecewisePolynomial {
    max_x: f64,
    polynomial_type: PolynomialType,
    subpolynomial_list: Vec<Subpolynomial>,
}

impl PiecewisePolynomial {
    pub fn new(
        polynomial_type: PolynomialType,
        points: Vec<Point2D>,
    ) -> Result<PiecewisePolynomial, InterpolationError> {
        let required = NECESSARY_POINTS;
        if points.len() < required {
            return Err(InterpolationError::TooFewPoints { required, given: points.len() });
        }
        if let Some(index) = Self::first_unordered_knot(&points) {
            return Err(InterpolationError::NotStrictlyIncreasing { index });
        }

        let coef_list = match polynomial_type {
            PolynomialType::Linear        => generate_linear_coef_list(&points),
            PolynomialType::NaturalCubic  => generate_natural_cubic_coef_list(&points)?,
            PolynomialType::NotAKnotCubic => generate_not_a_knot_cubic_coef_list(&points)?,
        };

        let max_x = points[points.len() - 1].x();
        let subpolynomial_list = coef_list
            .into_iter()
            .zip(points.iter())
            .map(|(coefs, pt)| Subpolynomial::new(coefs, pt.x()))
            .collect();

        Ok(PiecewisePolynomial {
            max_x,
            polynomial_type,
            subpolynomial_list,
        })
    }

    pub fn from_xy(
        polynomial_type: PolynomialType,
        x: &[f64],
        y: &[f64],
    ) -> Result<PiecewisePolynomial, InterpolationError> {
        let points = Point2D::zip(x, y).ok_or(InterpolationError::LengthMismatch {
            x_len: x.len(),
            y_len: y.len(),
        })?;
        Self::new(polynomial_type, points)
    }

    pub fn polynomial_type(&self) -> PolynomialType {
        self.polynomial_type
    }

    fn first_unordered_knot(points: &[Point2D]) -> Option<usize> {
        if let Some(index) = points.iter().position(|pt| !pt.x().is_finite()) {
            return Some(index);
        }
        points
            .windows(2)
            .position(|pair| pair[1].x() <= pair[0].x())
            .map(|i| i + 1)
    }

    fn find_segment(&self, x: f64) -> usize {
        if x <= self.min_x() {
            0
        } else if x >= self.max_x {
            self.subpolynomial_list.len() - 1
        } else {
            self.subpolynomial_list
                .partition_point(|s| s.lhs_x <= x) - 1
        }
    }
}

// ─────────────────────────────────────────────
// Trait 實作
// ─────────────────────────────────────────────

impl NonparametricCurve for PiecewisePolynomial {
    fn points(&self) -> Vec<Point2D> {
        let mut pts: Vec<Point2D> = self
            .subpolynomial_list
            .iter()
            .map(|s| Point2D::new(s.lhs_x, s.value(s.lhs_x)))
            .collect();
        if let Some(last) = self.subpolynomial_list.last() {
            pts.push(Point2D::new(self.max_x, last.value(self.max_x)));
        }
        pts
    }

    fn min_x(&self) -> f64 {
        self.subpolynomial_list[0].lhs_x
    }

    fn max_x(&self) -> f64 {
        self.max_x
    }
}

impl Curve for PiecewisePolynomial {
    fn value(&self, x: f64) -> f64 {
        let i = self.find_segment(x);
        self.subpolynomial_list[i].value(x)
    }

    fn derivative(&self, x: f64) -> f64 {
        let i = self.find_segment(x);
        self.subpolynomial_list[i].derivative(x)
    }
}
