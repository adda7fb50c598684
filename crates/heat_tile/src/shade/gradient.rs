use std::fmt;

use super::color::Hsl;
use super::scale::HeatScale;

/// Two-stop vertical gradient painted behind a tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientDescriptor {
    pub top: Hsl,
    pub bottom: Hsl,
    /// Normalized magnitude in `[0, 1]` that produced the stops.
    pub intensity: f64,
}

impl fmt::Display for GradientDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "linear-gradient(180deg, {} 0%, {} 100%)", self.top, self.bottom)
    }
}

/// Gradient for `change` on the default heat scale.
pub fn gradient_for_change(change: f64) -> GradientDescriptor {
    HeatScale::default().gradient_for_change(change)
}
