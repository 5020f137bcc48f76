use std::fmt;

/// Non-fatal diagnostics attached to a single morph result.
#[derive(Debug, Clone, PartialEq)]
pub enum MorphWarning {
    /// Grid values outside the interpolation range were evaluated by
    /// extrapolation. `below`/`above` hold the boundary values crossed.
    Extrapolation { below: Option<f64>, above: Option<f64> },
    /// The squeezed grid was not monotonic and had to be sorted.
    NonMonotonic { overlapping_regions: Vec<(f64, f64)> },
}

impl MorphWarning {
    pub fn extrapolation(below: Option<f64>, above: Option<f64>) -> Option<MorphWarning> {
        if below.is_none() && above.is_none() {
            None
        } else {
            Some(MorphWarning::Extrapolation { below, above })
        }
    }

    pub fn is_extrapolation(&self) -> bool {
        matches!(self, MorphWarning::Extrapolation { .. })
    }

    pub fn is_non_monotonic(&self) -> bool {
        matches!(self, MorphWarning::NonMonotonic { .. })
    }
}

impl fmt::Display for MorphWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MorphWarning::Extrapolation { below, above } => match (below, above) {
                (Some(low), Some(high)) => write!(
                    f,
                    "Warning: points with grid value below {low} and above {high} will be extrapolated."
                ),
                (Some(low), None) => write!(
                    f,
                    "Warning: points with grid value below {low} will be extrapolated."
                ),
                (None, Some(high)) => write!(
                    f,
                    "Warning: points with grid value above {high} will be extrapolated."
                ),
                (None, None) => write!(f, "Warning: no points will be extrapolated."),
            },
            MorphWarning::NonMonotonic { overlapping_regions } => {
                write!(
                    f,
                    "Warning: The squeeze morph has interpolated your morphed function from a \
                     non-monotonically increasing grid. This may not be an issue, but please \
                     check your squeeze parameters. Overlapping regions:"
                )?;
                if overlapping_regions.is_empty() {
                    write!(f, " none")
                } else {
                    for (lo, hi) in overlapping_regions {
                        write!(f, " [{lo}, {hi}]")?;
                    }
                    Ok(())
                }
            }
        }
    }
}
