use crate::morph::morph::{
    resample_linear,
    Morph,
    MorphCurves,
    MorphResult,
    MorphState
};
use crate::morph::morpherror::MorphError;

/// Stretches the morph grid by `1 + stretch` and resamples onto the original
/// grid: `y_out(x) = y(x / (1 + stretch))`.
#[derive(Debug, Default)]
pub struct MorphStretch {
    stretch: f64,
    state: MorphState,
}

impl MorphStretch {
    pub fn new(stretch: f64) -> MorphStretch {
        MorphStretch {
            stretch,
            state: MorphState::default()
        }
    }

    pub fn stretch(&self) -> f64 {
        self.stretch
    }

    pub fn set_stretch(&mut self, stretch: f64) {
        self.stretch = stretch;
    }
}

impl Morph for MorphStretch {
    fn summary(&self) -> &'static str {
        "Stretch data by specified amount"
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["stretch"]
    }

    fn state(&self) -> &MorphState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut MorphState {
        &mut self.state
    }

    fn transform(&self, curves: &MorphCurves) -> Result<MorphResult, MorphError> {
        if self.stretch == 0.0 {
            return Ok(MorphResult::new(curves.clone()));
        }
        if self.stretch <= -1.0 || !self.stretch.is_finite() {
            return Err(MorphError::InvalidParameter {
                name: "stretch",
                value: self.stretch,
                reason: "must be finite and greater than -1",
            });
        }

        let x_source: Vec<f64> = curves.x_morph.iter().map(|&x| x / (1.0 + self.stretch)).collect();
        let (y_stretched, extrapolation) = resample_linear(&curves.x_morph, &curves.y_morph, &x_source)?;
        let mut curves_out = curves.clone();
        curves_out.y_morph = y_stretched;
        let extrapolation = extrapolation.map_cutoffs(|cutoff| cutoff * (1.0 + self.stretch));
        Ok(MorphResult::new(curves_out).with_extrapolation(extrapolation))
    }
}
