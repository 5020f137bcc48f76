use crate::morph::morph::{
    Morph,
    MorphCurves,
    MorphResult,
    MorphState
};
use crate::morph::morpherror::MorphError;

/// Multiplies the morph ordinate by `scale`. Grids are untouched.
#[derive(Debug)]
pub struct MorphScale {
    scale: f64,
    state: MorphState,
}

impl MorphScale {
    pub fn new(scale: f64) -> MorphScale {
        MorphScale {
            scale,
            state: MorphState::default()
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }
}

impl Default for MorphScale {
    fn default() -> Self {
        MorphScale::new(1.0)
    }
}

impl Morph for MorphScale {
    fn summary(&self) -> &'static str {
        "Scale the morph by specified amount"
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["scale"]
    }

    fn state(&self) -> &MorphState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut MorphState {
        &mut self.state
    }

    fn transform(&self, curves: &MorphCurves) -> Result<MorphResult, MorphError> {
        let mut curves_out = curves.clone();
        curves_out.y_morph.iter_mut().for_each(|y| *y *= self.scale);
        Ok(MorphResult::new(curves_out))
    }
}
