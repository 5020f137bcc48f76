use crate::morph::morph::{
    resample_linear,
    Morph,
    MorphCurves,
    MorphResult,
    MorphState
};
use crate::morph::morpherror::MorphError;

/// Shifts the morph curve right by `hshift` and up by `vshift`, keeping it on
/// its own grid.
///
/// The horizontal shift resamples `y(x - hshift)` by linear interpolation;
/// grid points whose source lies outside the data are extrapolated and
/// recorded as such.
#[derive(Debug, Default)]
pub struct MorphShift {
    hshift: f64,
    vshift: f64,
    state: MorphState,
}

impl MorphShift {
    pub fn new(hshift: f64, vshift: f64) -> MorphShift {
        MorphShift {
            hshift,
            vshift,
            state: MorphState::default()
        }
    }

    pub fn hshift(&self) -> f64 {
        self.hshift
    }

    pub fn vshift(&self) -> f64 {
        self.vshift
    }

    pub fn set_shifts(&mut self, hshift: f64, vshift: f64) {
        self.hshift = hshift;
        self.vshift = vshift;
    }
}

impl Morph for MorphShift {
    fn summary(&self) -> &'static str {
        "Shift the morph by specified amount"
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["hshift", "vshift"]
    }

    fn state(&self) -> &MorphState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut MorphState {
        &mut self.state
    }

    fn transform(&self, curves: &MorphCurves) -> Result<MorphResult, MorphError> {
        let mut curves_out = curves.clone();
        if self.hshift == 0.0 {
            curves_out.y_morph.iter_mut().for_each(|y| *y += self.vshift);
            return Ok(MorphResult::new(curves_out));
        }

        let x_source: Vec<f64> = curves.x_morph.iter().map(|&x| x - self.hshift).collect();
        let (y_shifted, extrapolation) = resample_linear(&curves.x_morph, &curves.y_morph, &x_source)?;
        curves_out.y_morph = y_shifted.into_iter().map(|y| y + self.vshift).collect();
        // 截斷點換算回輸出網格：來源 x 對應輸出 x + hshift
        let extrapolation = extrapolation.map_cutoffs(|cutoff| cutoff + self.hshift);
        Ok(MorphResult::new(curves_out).with_extrapolation(extrapolation))
    }
}
