use crate::foundation::error::{CutawayError, CutawayResult};

/// What to do with inputs outside the input range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extrapolate {
    /// Clip progress to `[0, 1]`.
    #[default]
    Clamp,
    /// Keep mapping linearly past the range ends.
    Extend,
}

/// Map `value` from `input` range onto `output` range.
///
/// Fails with [`CutawayError::DegenerateRange`] when the input range has zero width.
pub fn interpolate(
    value: f64,
    input: [f64; 2],
    output: [f64; 2],
    mode: Extrapolate,
) -> CutawayResult<f64> {
    let [in_min, in_max] = input;
    let [out_min, out_max] = output;
    if in_max == in_min {
        return Err(CutawayError::DegenerateRange { in_min, in_max });
    }

    let mut progress = (value - in_min) / (in_max - in_min);
    if mode == Extrapolate::Clamp {
        progress = progress.clamp(0.0, 1.0);
    }
    Ok(out_min + progress * (out_max - out_min))
}

#[cfg(test)]
#[path = "../../tests/unit/animation/interpolate.rs"]
mod tests;
