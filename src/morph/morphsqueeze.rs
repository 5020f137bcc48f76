use serde::Deserialize;
use tracing::{debug, trace};

use crate::math::curve::curve::Curve;
use crate::math::curve::nonparametriccurve::nonparametriccurve::NonparametricCurve;
use crate::math::curve::nonparametriccurve::piecewisepolynomial::{
    PiecewisePolynomial,
    PolynomialType
};
use crate::math::grid;
use crate::math::polynomial::Polynomial;
use crate::morph::morph::{
    ExtrapolationInfo,
    Morph,
    MorphCurves,
    MorphResult,
    MorphState,
    SqueezeInfo
};
use crate::morph::morpherror::{
    CurveRole,
    MorphError
};
use crate::morph::morphwarning::MorphWarning;

/// Grid the squeezed morph is resampled onto.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResamplePolicy {
    /// Back onto the unsqueezed morph grid; the target passes through.
    #[default]
    MorphGrid,
    /// Onto the part of the target grid covered by the squeezed morph; both
    /// output curves share that trimmed grid.
    TargetOverlap,
}

/// End condition of the resampling cubic spline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplineBoundary {
    #[default]
    NotAKnot,
    Natural,
}

impl SplineBoundary {
    pub fn polynomial_type(&self) -> PolynomialType {
        match self {
            SplineBoundary::NotAKnot => PolynomialType::NotAKnotCubic,
            SplineBoundary::Natural => PolynomialType::NaturalCubic,
        }
    }
}

/// Squeezes the morph curve with the polynomial remap `x' = x + P(x)`.
///
/// The squeezed samples are sorted and de-duplicated when needed, then
/// resampled with a cubic spline according to the [`ResamplePolicy`].
///
/// ```
/// use curvemorph::math::grid::linspace;
/// use curvemorph::morph::morph::{Morph, MorphCurves};
/// use curvemorph::morph::morphsqueeze::MorphSqueeze;
///
/// let x = linspace(0.0, 10.0, 101);
/// let y: Vec<f64> = x.iter().map(|&v| (v + 0.1).sin()).collect();
/// let mut morph = MorphSqueeze::new(vec![0.1]);
/// let result = morph
///     .morph(MorphCurves::new(x.clone(), y, x.clone(), x.iter().map(|v| v.sin()).collect()))
///     .unwrap();
/// assert_eq!(result.extrapolation().low(), Some(0));
/// ```
#[derive(Debug, Default)]
pub struct MorphSqueeze {
    squeeze: Polynomial,
    check_increase: bool,
    resample_policy: ResamplePolicy,
    spline_boundary: SplineBoundary,
    state: MorphState,
}

impl MorphSqueeze {
    /// `coefs[i]` multiplies `x^i`.
    pub fn new(coefs: Vec<f64>) -> MorphSqueeze {
        MorphSqueeze {
            squeeze: Polynomial::new(coefs),
            ..MorphSqueeze::default()
        }
    }

    pub fn with_check_increase(mut self, check_increase: bool) -> MorphSqueeze {
        self.check_increase = check_increase;
        self
    }

    pub fn with_resample_policy(mut self, resample_policy: ResamplePolicy) -> MorphSqueeze {
        self.resample_policy = resample_policy;
        self
    }

    pub fn with_spline_boundary(mut self, spline_boundary: SplineBoundary) -> MorphSqueeze {
        self.spline_boundary = spline_boundary;
        self
    }

    pub fn squeeze(&self) -> &Polynomial {
        &self.squeeze
    }

    /// Replaces the coefficients between invocations, e.g. from an optimizer.
    pub fn set_squeeze(&mut self, coefs: Vec<f64>) {
        self.squeeze = Polynomial::new(coefs);
    }

    pub fn check_increase(&self) -> bool {
        self.check_increase
    }

    pub fn set_check_increase(&mut self, check_increase: bool) {
        self.check_increase = check_increase;
    }

    pub fn resample_policy(&self) -> ResamplePolicy {
        self.resample_policy
    }

    pub fn set_resample_policy(&mut self, resample_policy: ResamplePolicy) {
        self.resample_policy = resample_policy;
    }

    pub fn spline_boundary(&self) -> SplineBoundary {
        self.spline_boundary
    }

    pub fn set_spline_boundary(&mut self, spline_boundary: SplineBoundary) {
        self.spline_boundary = spline_boundary;
    }

    fn squeeze_grid(&self, x: &[f64]) -> Result<Vec<f64>, MorphError> {
        let x_squeezed: Vec<f64> = x.iter().map(|&v| v + self.squeeze.value(v)).collect();
        match x_squeezed.iter().position(|v| !v.is_finite()) {
            Some(index) => Err(MorphError::NonFiniteGrid { curve: CurveRole::SqueezedMorph, index }),
            None => Ok(x_squeezed),
        }
    }

    /// 單調性檢查；非單調時依 `check_increase` 決定報錯或記錄重疊區段。
    fn inspect_monotonicity(&self, x_squeezed: &[f64]) -> Result<SqueezeInfo, MorphError> {
        if grid::is_non_decreasing(x_squeezed) {
            return Ok(SqueezeInfo::monotonic());
        }
        if self.check_increase {
            return Err(MorphError::Convergence);
        }
        let regions = grid::overlapping_regions(x_squeezed);
        debug!(regions = regions.len(), "squeezed grid is not monotonic, sorting before interpolation");
        Ok(SqueezeInfo::overlapping(regions))
    }

    fn resample_on_morph_grid(
        curves: &MorphCurves,
        spline: &PiecewisePolynomial,
    ) -> (MorphCurves, ExtrapolationInfo) {
        let y_morph_out = spline.values(&curves.x_morph);
        let extrapolation = ExtrapolationInfo::detect(spline.min_x(), spline.max_x(), &curves.x_morph);
        let curves_out = MorphCurves::new(
            curves.x_morph.clone(),
            y_morph_out,
            curves.x_target.clone(),
            curves.y_target.clone(),
        );
        (curves_out, extrapolation)
    }

    fn resample_on_target_overlap(
        curves: &MorphCurves,
        x_knots: &[f64],
        spline: &PiecewisePolynomial,
    ) -> Result<MorphCurves, MorphError> {
        let no_overlap = || MorphError::NoOverlap {
            morph_min: spline.min_x(),
            morph_max: spline.max_x(),
            target_min: curves.x_target[0],
            target_max: curves.x_target[curves.x_target.len() - 1],
        };
        let (x_min, x_max) = grid::overlap_range(&curves.x_target, x_knots).ok_or_else(no_overlap)?;
        let range = grid::slice_within(&curves.x_target, x_min, x_max).ok_or_else(no_overlap)?;
        trace!(x_min, x_max, start = range.start, end = range.end, "trimmed target to overlap");

        let x_target_out = curves.x_target[range.clone()].to_vec();
        let y_target_out = curves.y_target[range].to_vec();
        let y_morph_out = spline.values(&x_target_out);
        Ok(MorphCurves::new(x_target_out.clone(), y_morph_out, x_target_out, y_target_out))
    }
}

impl Morph for MorphSqueeze {
    fn summary(&self) -> &'static str {
        "Squeeze morph by polynomial shift"
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["squeeze"]
    }

    fn state(&self) -> &MorphState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut MorphState {
        &mut self.state
    }

    fn transform(&self, curves: &MorphCurves) -> Result<MorphResult, MorphError> {
        if self.squeeze.is_zero() {
            return Ok(MorphResult::new(curves.clone()).with_squeeze_info(SqueezeInfo::monotonic()));
        }

        let x_squeezed = self.squeeze_grid(&curves.x_morph)?;
        let squeeze_info = self.inspect_monotonicity(&x_squeezed)?;

        let (x_sorted, y_sorted) = if squeeze_info.monotonic {
            (x_squeezed, curves.y_morph.clone())
        } else {
            grid::sort_by_x(&x_squeezed, &curves.y_morph)
        };
        let (x_knots, y_knots) = grid::collapse_duplicates(&x_sorted, &y_sorted);
        if x_knots.len() < x_sorted.len() {
            trace!(merged = x_sorted.len() - x_knots.len(), "averaged duplicated squeezed grid values");
        }

        let spline = PiecewisePolynomial::from_xy(
            self.spline_boundary.polynomial_type(),
            &x_knots,
            &y_knots,
        )?;

        let mut result = match self.resample_policy {
            ResamplePolicy::MorphGrid => {
                let (curves_out, extrapolation) = Self::resample_on_morph_grid(curves, &spline);
                MorphResult::new(curves_out).with_extrapolation(extrapolation)
            }
            ResamplePolicy::TargetOverlap => {
                MorphResult::new(Self::resample_on_target_overlap(curves, &x_knots, &spline)?)
            }
        };

        if let Some(regions) = &squeeze_info.overlapping_regions {
            result = result.with_warning(MorphWarning::NonMonotonic {
                overlapping_regions: regions.clone(),
            });
        }
        Ok(result.with_squeeze_info(squeeze_info))
    }
}
