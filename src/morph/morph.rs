use std::ops::Range;

use tracing::{debug, warn};

use crate::math::curve::curve::Curve;
use crate::math::curve::nonparametriccurve::piecewisepolynomial::{
    PiecewisePolynomial,
    PolynomialType
};
use crate::math::grid;
use crate::morph::morpherror::{
    CurveRole,
    MorphError
};
use crate::morph::morphwarning::MorphWarning;

// ─────────────────────────────────────────────────────────────────────────────
// MorphCurves
// ─────────────────────────────────────────────────────────────────────────────

/// The four sequences every morph consumes and produces:
/// `(x_morph, y_morph, x_target, y_target)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MorphCurves {
    pub x_morph: Vec<f64>,
    pub y_morph: Vec<f64>,
    pub x_target: Vec<f64>,
    pub y_target: Vec<f64>,
}

impl MorphCurves {
    pub fn new(x_morph: Vec<f64>, y_morph: Vec<f64>, x_target: Vec<f64>, y_target: Vec<f64>) -> MorphCurves {
        MorphCurves {
            x_morph,
            y_morph,
            x_target,
            y_target
        }
    }

    pub fn xyall(&self) -> (&[f64], &[f64], &[f64], &[f64]) {
        (&self.x_morph, &self.y_morph, &self.x_target, &self.y_target)
    }

    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
        (self.x_morph, self.y_morph, self.x_target, self.y_target)
    }

    /// Shape checks shared by every morph. Ordering of the target grid is the
    /// caller's responsibility and is not checked here.
    pub fn validate(&self) -> Result<(), MorphError> {
        Self::validate_curve(CurveRole::Morph, &self.x_morph, &self.y_morph)?;
        Self::validate_curve(CurveRole::Target, &self.x_target, &self.y_target)
    }

    fn validate_curve(curve: CurveRole, x: &[f64], y: &[f64]) -> Result<(), MorphError> {
        if x.len() != y.len() {
            return Err(MorphError::LengthMismatch { curve, x_len: x.len(), y_len: y.len() });
        }
        if x.is_empty() {
            return Err(MorphError::EmptyCurve { curve });
        }
        match x.iter().position(|v| !v.is_finite()) {
            Some(index) => Err(MorphError::NonFiniteGrid { curve, index }),
            None => Ok(()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ExtrapolationInfo / SqueezeInfo
// ─────────────────────────────────────────────────────────────────────────────

/// Where evaluation on the output grid left the interpolation range.
///
/// `low` is the last index before the interpolation region and `high` the
/// first index after it. The cutoffs are the range bounds that were crossed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExtrapolationInfo {
    low: Option<usize>,
    high: Option<usize>,
    cutoff_low: Option<f64>,
    cutoff_high: Option<f64>,
}

impl ExtrapolationInfo {
    /// Compares every point of `x_eval` with the interpolation range
    /// `[x_min, x_max]`.
    pub fn detect(x_min: f64, x_max: f64, x_eval: &[f64]) -> ExtrapolationInfo {
        let (low, high) = grid::extrapolation_indices(x_eval, x_min, x_max);
        ExtrapolationInfo {
            low,
            high,
            cutoff_low: low.map(|_| x_min),
            cutoff_high: high.map(|_| x_max),
        }
    }

    pub fn low(&self) -> Option<usize> {
        self.low
    }

    pub fn high(&self) -> Option<usize> {
        self.high
    }

    pub fn cutoff_low(&self) -> Option<f64> {
        self.cutoff_low
    }

    pub fn cutoff_high(&self) -> Option<f64> {
        self.cutoff_high
    }

    pub fn is_extrapolated(&self) -> bool {
        self.low.is_some() || self.high.is_some()
    }

    /// Indices of a grid of length `len` evaluated by interpolation.
    pub fn interpolated_range(&self, len: usize) -> Range<usize> {
        let start = self.low.map_or(0, |i| i + 1);
        let end = self.high.unwrap_or(len);
        start..end.max(start)
    }

    /// Re-expresses the cutoffs through `to_output`, for morphs that evaluate
    /// a source grid but return values on a transformed one. `to_output` must
    /// be increasing so `low`/`high` keep their meaning.
    pub(crate) fn map_cutoffs(self, to_output: impl Fn(f64) -> f64) -> ExtrapolationInfo {
        ExtrapolationInfo {
            cutoff_low: self.cutoff_low.map(&to_output),
            cutoff_high: self.cutoff_high.map(&to_output),
            ..self
        }
    }

    pub fn warning(&self) -> Option<MorphWarning> {
        MorphWarning::extrapolation(self.cutoff_low, self.cutoff_high)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqueezeInfo {
    pub monotonic: bool,
    pub overlapping_regions: Option<Vec<(f64, f64)>>,
}

impl SqueezeInfo {
    pub fn monotonic() -> SqueezeInfo {
        SqueezeInfo { monotonic: true, overlapping_regions: None }
    }

    pub fn overlapping(regions: Vec<(f64, f64)>) -> SqueezeInfo {
        SqueezeInfo { monotonic: false, overlapping_regions: Some(regions) }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MorphResult
// ─────────────────────────────────────────────────────────────────────────────

/// Output curves of one invocation together with its diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct MorphResult {
    curves: MorphCurves,
    extrapolation: ExtrapolationInfo,
    squeeze_info: Option<SqueezeInfo>,
    warnings: Vec<MorphWarning>,
}

impl MorphResult {
    pub fn new(curves: MorphCurves) -> MorphResult {
        MorphResult {
            curves,
            extrapolation: ExtrapolationInfo::default(),
            squeeze_info: None,
            warnings: Vec::new(),
        }
    }

    /// Records the extrapolation info and, when points were extrapolated, its
    /// warning.
    pub fn with_extrapolation(mut self, extrapolation: ExtrapolationInfo) -> MorphResult {
        self.extrapolation = extrapolation;
        if let Some(warning) = extrapolation.warning() {
            self.warnings.push(warning);
        }
        self
    }

    pub fn with_squeeze_info(mut self, squeeze_info: SqueezeInfo) -> MorphResult {
        self.squeeze_info = Some(squeeze_info);
        self
    }

    pub fn with_warning(mut self, warning: MorphWarning) -> MorphResult {
        self.warnings.push(warning);
        self
    }

    pub fn curves(&self) -> &MorphCurves {
        &self.curves
    }

    pub fn into_curves(self) -> MorphCurves {
        self.curves
    }

    pub fn xyallout(&self) -> (&[f64], &[f64], &[f64], &[f64]) {
        self.curves.xyall()
    }

    pub fn extrapolation(&self) -> &ExtrapolationInfo {
        &self.extrapolation
    }

    pub fn squeeze_info(&self) -> Option<&SqueezeInfo> {
        self.squeeze_info.as_ref()
    }

    pub fn warnings(&self) -> &[MorphWarning] {
        &self.warnings
    }

    /// Forwards the attached warnings to `tracing` at `WARN` level.
    pub fn log_warnings(&self, summary: &str) {
        for warning in &self.warnings {
            warn!(morph = summary, "{}", warning);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MorphState
// ─────────────────────────────────────────────────────────────────────────────

/// Curves most recently seen by a morph instance. Overwritten on every call.
#[derive(Debug, Clone, Default)]
pub struct MorphState {
    input: MorphCurves,
    output: Option<MorphCurves>,
    extrapolation: ExtrapolationInfo,
}

impl MorphState {
    pub fn input(&self) -> &MorphCurves {
        &self.input
    }

    /// `None` before the first call and after a failed call.
    pub fn output(&self) -> Option<&MorphCurves> {
        self.output.as_ref()
    }

    pub fn extrapolation(&self) -> &ExtrapolationInfo {
        &self.extrapolation
    }

    fn record_input(&mut self, curves: MorphCurves) {
        self.input = curves;
        self.output = None;
        self.extrapolation = ExtrapolationInfo::default();
    }

    fn record_output(&mut self, result: &MorphResult) {
        self.output = Some(result.curves().clone());
        self.extrapolation = *result.extrapolation();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Morph
// ─────────────────────────────────────────────────────────────────────────────

/// Uniform calling convention of every curve transformation.
///
/// Implementors override [`Morph::transform`]; callers use [`Morph::morph`],
/// which records the inputs, validates them and caches the outputs.
pub trait Morph: Send + Sync {
    fn summary(&self) -> &'static str;

    /// Names of the configuration values this morph reads.
    fn parameter_names(&self) -> &'static [&'static str];

    fn state(&self) -> &MorphState;

    fn state_mut(&mut self) -> &mut MorphState;

    /// Identity unless overridden.
    fn transform(&self, curves: &MorphCurves) -> Result<MorphResult, MorphError> {
        Ok(MorphResult::new(curves.clone()))
    }

    fn morph(&mut self, curves: MorphCurves) -> Result<MorphResult, MorphError> {
        self.state_mut().record_input(curves);
        let outcome = {
            let input = self.state().input();
            input.validate().and_then(|_| self.transform(input))
        };
        match outcome {
            Ok(result) => {
                debug!(
                    morph = self.summary(),
                    warnings = result.warnings().len(),
                    "morph applied"
                );
                self.state_mut().record_output(&result);
                Ok(result)
            }
            Err(error) => {
                debug!(morph = self.summary(), %error, "morph failed");
                Err(error)
            }
        }
    }
}

/// Morph that leaves both curves untouched.
#[derive(Debug, Default)]
pub struct MorphIdentity {
    state: MorphState,
}

impl MorphIdentity {
    pub fn new() -> MorphIdentity {
        MorphIdentity::default()
    }
}

impl Morph for MorphIdentity {
    fn summary(&self) -> &'static str {
        "Identity morph"
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &[]
    }

    fn state(&self) -> &MorphState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut MorphState {
        &mut self.state
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// 線性重取樣（shift / stretch 共用）
// ─────────────────────────────────────────────────────────────────────────────

/// Linearly interpolates `(x, y)` at `x_eval`, holding the boundary values
/// outside the data range. Also reports which points of `x_eval` fell
/// outside it; the cutoffs are in the coordinates of `x`.
pub(crate) fn resample_linear(
    x: &[f64],
    y: &[f64],
    x_eval: &[f64],
) -> Result<(Vec<f64>, ExtrapolationInfo), MorphError> {
    let (x_min, x_max) = (x[0], x[x.len() - 1]);
    let extrapolation = ExtrapolationInfo::detect(x_min, x_max, x_eval);

    if x.len() == 1 {
        return Ok((vec![y[0]; x_eval.len()], extrapolation));
    }

    let interpolant = PiecewisePolynomial::from_xy(PolynomialType::Linear, x, y)?;
    let values = x_eval
        .iter()
        .map(|&t| interpolant.value(t.clamp(x_min, x_max)))
        .collect();
    Ok((values, extrapolation))
}
