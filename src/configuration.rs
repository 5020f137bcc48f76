use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{
    Deserialize,
    Deserializer
};
use thiserror::Error;
use tracing::debug;

use crate::morph::morph::Morph;
use crate::morph::morphscale::MorphScale;
use crate::morph::morphshift::MorphShift;
use crate::morph::morphsqueeze::{
    MorphSqueeze,
    ResamplePolicy,
    SplineBoundary
};
use crate::morph::morphstretch::MorphStretch;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error(transparent)]
    JsonParseError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqueezeKeyError {
    #[error("squeeze coefficient key '{0}' is not of the form a0, a1, ...")]
    InvalidKey(String),
    #[error("squeeze coefficient a{0} is missing")]
    MissingCoefficient(usize),
}

// ─────────────────────────────────────────────────────────────────────────────
// SqueezeCoefficients
// ─────────────────────────────────────────────────────────────────────────────

/// JSON 可寫成 `[a0, a1, ...]` 或 `{"a0": .., "a1": ..}`
#[derive(Deserialize)]
#[serde(untagged)]
enum SqueezeCoefficientsJsonProp {
    List(Vec<f64>),
    Map(BTreeMap<String, f64>),
}

/// Squeeze polynomial coefficients in ascending order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqueezeCoefficients(Vec<f64>);

impl SqueezeCoefficients {
    pub fn new(coefs: Vec<f64>) -> SqueezeCoefficients {
        SqueezeCoefficients(coefs)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }

    fn parse_key(key: &str) -> Result<usize, SqueezeKeyError> {
        let index: usize = key
            .strip_prefix('a')
            .and_then(|digits| digits.parse().ok())
            .ok_or_else(|| SqueezeKeyError::InvalidKey(key.to_owned()))?;
        // "a01" 之類的寫法不接受
        if format!("a{index}") != key {
            return Err(SqueezeKeyError::InvalidKey(key.to_owned()));
        }
        Ok(index)
    }

    fn from_json_prop(prop: SqueezeCoefficientsJsonProp) -> Result<SqueezeCoefficients, SqueezeKeyError> {
        match prop {
            SqueezeCoefficientsJsonProp::List(coefs) => Ok(SqueezeCoefficients(coefs)),
            SqueezeCoefficientsJsonProp::Map(map) => {
                let mut slots: Vec<Option<f64>> = vec![None; map.len()];
                for (key, value) in &map {
                    let index = Self::parse_key(key)?;
                    if index >= slots.len() {
                        // 鍵值不連續時，必定有較小的索引缺漏
                        let missing = slots.iter().position(Option::is_none).unwrap_or(index);
                        return Err(SqueezeKeyError::MissingCoefficient(missing));
                    }
                    slots[index] = Some(*value);
                }
                slots
                    .into_iter()
                    .enumerate()
                    .map(|(i, slot)| slot.ok_or(SqueezeKeyError::MissingCoefficient(i)))
                    .collect::<Result<Vec<f64>, _>>()
                    .map(SqueezeCoefficients)
            }
        }
    }
}

impl<'de> Deserialize<'de> for SqueezeCoefficients {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let prop = SqueezeCoefficientsJsonProp::deserialize(deserializer)?;
        SqueezeCoefficients::from_json_prop(prop).map_err(serde::de::Error::custom)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MorphConfiguration
// ─────────────────────────────────────────────────────────────────────────────

/// Named parameters of the morphs, as supplied by the caller.
///
/// Every key is optional; a morph whose parameters are absent is not built.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MorphConfiguration {
    #[serde(default)]
    scale: Option<f64>,
    #[serde(default)]
    stretch: Option<f64>,
    #[serde(default)]
    hshift: Option<f64>,
    #[serde(default)]
    vshift: Option<f64>,
    #[serde(default)]
    squeeze: Option<SqueezeCoefficients>,
    #[serde(default)]
    check_increase: bool,
    #[serde(default)]
    resample: ResamplePolicy,
    #[serde(default)]
    spline: SplineBoundary,
}

impl MorphConfiguration {
    pub fn new() -> MorphConfiguration {
        MorphConfiguration::default()
    }

    pub fn from_reader<P: AsRef<Path>>(file_path: P) -> Result<MorphConfiguration, ConfigurationError> {
        let file = File::open(file_path.as_ref())?;
        let reader = BufReader::new(file);
        let configuration: MorphConfiguration = serde_json::from_reader(reader)?;
        debug!(path = %file_path.as_ref().display(), "loaded morph configuration");
        Ok(configuration)
    }

    pub fn from_json_str(json: &str) -> Result<MorphConfiguration, ConfigurationError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn scale(&self) -> Option<f64> {
        self.scale
    }

    pub fn stretch(&self) -> Option<f64> {
        self.stretch
    }

    pub fn hshift(&self) -> Option<f64> {
        self.hshift
    }

    pub fn vshift(&self) -> Option<f64> {
        self.vshift
    }

    pub fn squeeze(&self) -> Option<&SqueezeCoefficients> {
        self.squeeze.as_ref()
    }

    pub fn check_increase(&self) -> bool {
        self.check_increase
    }

    pub fn resample(&self) -> ResamplePolicy {
        self.resample
    }

    pub fn spline(&self) -> SplineBoundary {
        self.spline
    }

    pub fn set_squeeze(&mut self, coefs: Vec<f64>) {
        self.squeeze = Some(SqueezeCoefficients::new(coefs));
    }

    pub fn set_check_increase(&mut self, check_increase: bool) {
        self.check_increase = check_increase;
    }

    pub fn squeeze_morph(&self) -> Option<MorphSqueeze> {
        self.squeeze.as_ref().map(|coefs| {
            MorphSqueeze::new(coefs.as_slice().to_vec())
                .with_check_increase(self.check_increase)
                .with_resample_policy(self.resample)
                .with_spline_boundary(self.spline)
        })
    }

    /// Morph instances for every configured parameter group, in the order
    /// scale, stretch, shift, squeeze.
    pub fn build_morphs(&self) -> Vec<Box<dyn Morph>> {
        let mut morphs: Vec<Box<dyn Morph>> = Vec::new();
        if let Some(scale) = self.scale {
            morphs.push(Box::new(MorphScale::new(scale)));
        }
        if let Some(stretch) = self.stretch {
            morphs.push(Box::new(MorphStretch::new(stretch)));
        }
        if self.hshift.is_some() || self.vshift.is_some() {
            morphs.push(Box::new(MorphShift::new(
                self.hshift.unwrap_or(0.0),
                self.vshift.unwrap_or(0.0),
            )));
        }
        if let Some(squeeze) = self.squeeze_morph() {
            morphs.push(Box::new(squeeze));
        }
        morphs
    }
}
