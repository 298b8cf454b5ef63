use serde::Deserialize;

use crate::my_types::*;

/// Raw reading of one touch slot in a single sample
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct TouchObservation {
    #[serde(default, deserialize_with = "crate::dataset::lenient_f64")]
    pub position: Option<Angle>,
    #[serde(default, deserialize_with = "crate::dataset::lenient_f64")]
    pub pressure: Option<f64>,
    /// Channel span of the touch
    #[serde(default, rename = "channel", deserialize_with = "crate::dataset::lenient_f64")]
    pub width: Option<f64>,
}

impl TouchObservation {
    pub fn new(position: Angle, pressure: f64, width: f64) -> Self {
        TouchObservation {
            position: Some(position),
            pressure: Some(pressure),
            width: Some(width),
        }
    }

    /// An observation without a slot contact
    pub fn absent() -> Self {
        TouchObservation::default()
    }

    /// The position if the slot reports a contact
    pub fn valid_position(&self) -> Option<Angle> {
        self.position.filter(|p| !p.is_nan())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackedTouch {
    pub id: TouchId,
    pub position: Angle,
    pub pressure: Option<f64>,
    pub width: Option<f64>,
}

impl TrackedTouch {
    pub fn new(id: TouchId, position: Angle, observation: &TouchObservation) -> Self {
        TrackedTouch {
            id,
            position,
            pressure: observation.pressure,
            width: observation.width,
        }
    }

    /// Pressure and width, when both are usable for drawing
    pub fn pressure_and_width(&self) -> Option<(f64, f64)> {
        match (self.pressure, self.width) {
            (Some(p), Some(w)) if !p.is_nan() && !w.is_nan() => Some((p, w)),
            _ => None,
        }
    }
}
