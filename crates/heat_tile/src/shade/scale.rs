use std::fs;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use super::clamp::clamp;
use super::color::Hsl;
use super::gradient::GradientDescriptor;
use crate::HeatTileError;

/// Constants of the change-to-gradient mapping.
///
/// Any change at or beyond `cap` percentage points renders at full intensity.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeatScale {
    pub cap: f64,
    pub positive_hue: f64,
    pub negative_hue: f64,
    pub saturation: f64,
    /// Top-stop lightness at zero intensity.
    pub base_lightness: f64,
    /// Top-stop lightness at full intensity.
    pub min_lightness: f64,
    /// How much darker the bottom stop is than the top stop.
    pub bottom_offset: f64,
    /// Lowest lightness the bottom stop may reach.
    pub bottom_floor: f64,
}

impl Default for HeatScale {
    fn default() -> Self {
        Self {
            cap: 8.0,
            positive_hue: 140.0,
            negative_hue: 0.0,
            saturation: 70.0,
            base_lightness: 60.0,
            min_lightness: 16.0,
            bottom_offset: 8.0,
            bottom_floor: 8.0,
        }
    }
}

impl HeatScale {
    pub fn from_toml_str(source: &str) -> Result<Self, HeatTileError> {
        let scale: Self = toml::from_str(source)?;
        scale.validate()?;
        Ok(scale)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, HeatTileError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        let scale = Self::from_toml_str(&source)?;
        debug!("loaded heat scale from {}: {scale:?}", path.display());
        Ok(scale)
    }

    pub fn validate(&self) -> Result<(), HeatTileError> {
        if !self.cap.is_finite() || self.cap <= 0.0 {
            return Err(HeatTileError::InvalidScale(format!(
                "cap must be a positive number, got {}",
                self.cap
            )));
        }

        let percentages = [
            ("saturation", self.saturation),
            ("base_lightness", self.base_lightness),
            ("min_lightness", self.min_lightness),
            ("bottom_offset", self.bottom_offset),
            ("bottom_floor", self.bottom_floor),
        ];
        for (name, value) in percentages {
            if !(0.0..=100.0).contains(&value) {
                return Err(HeatTileError::InvalidScale(format!(
                    "{name} must be within 0..=100, got {value}"
                )));
            }
        }

        if self.min_lightness > self.base_lightness {
            return Err(HeatTileError::InvalidScale(format!(
                "min_lightness ({}) exceeds base_lightness ({})",
                self.min_lightness, self.base_lightness
            )));
        }

        if !self.positive_hue.is_finite() || !self.negative_hue.is_finite() {
            return Err(HeatTileError::InvalidScale("hues must be finite".into()));
        }

        Ok(())
    }

    /// Normalized magnitude of `change` in `[0, 1]`.
    ///
    /// Non-finite changes count as zero.
    pub fn intensity(&self, change: f64) -> f64 {
        self.clamped(change).abs() / self.cap
    }

    /// Zero and negative zero are treated as gains.
    pub fn hue_for(&self, change: f64) -> f64 {
        if self.clamped(change) >= 0.0 {
            self.positive_hue
        } else {
            self.negative_hue
        }
    }

    pub fn gradient_for_change(&self, change: f64) -> GradientDescriptor {
        let intensity = self.intensity(change);
        let hue = self.hue_for(change);

        let top = self.base_lightness - (self.base_lightness - self.min_lightness) * intensity;
        let bottom = (top - self.bottom_offset).max(self.bottom_floor);

        GradientDescriptor {
            top: Hsl::new(hue, self.saturation, top),
            bottom: Hsl::new(hue, self.saturation, bottom),
            intensity,
        }
    }

    fn clamped(&self, change: f64) -> f64 {
        let change = if change.is_finite() { change } else { 0.0 };
        clamp(change, -self.cap, self.cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hue_follows_sign() {
        let scale = HeatScale::default();
        for change in [0.0, -0.0, 0.01, 3.5, 8.0, 42.0] {
            assert_eq!(scale.hue_for(change), 140.0, "change {change}");
        }
        for change in [-0.01, -3.5, -8.0, -42.0] {
            assert_eq!(scale.hue_for(change), 0.0, "change {change}");
        }
    }

    #[test]
    fn saturates_at_cap() {
        let scale = HeatScale::default();
        for change in [8.0, 9.5, 100.0, -8.0, -1e6] {
            let gradient = scale.gradient_for_change(change);
            assert_eq!(gradient.intensity, 1.0);
            assert_eq!(gradient.top.lightness, 16.0);
            assert_eq!(gradient.bottom.lightness, 8.0);
        }
    }

    #[test]
    fn zero_change() {
        let gradient = HeatScale::default().gradient_for_change(0.0);
        assert_eq!(gradient.intensity, 0.0);
        assert_eq!(gradient.top, Hsl::new(140.0, 70.0, 60.0));
        assert_eq!(gradient.bottom, Hsl::new(140.0, 70.0, 52.0));
    }

    #[test]
    fn full_loss() {
        let gradient = HeatScale::default().gradient_for_change(-8.0);
        assert_eq!(gradient.top, Hsl::new(0.0, 70.0, 16.0));
        assert_eq!(gradient.bottom, Hsl::new(0.0, 70.0, 8.0));
    }

    #[test]
    fn partial_gain() {
        let gradient = HeatScale::default().gradient_for_change(3.5);
        assert_eq!(gradient.intensity, 0.4375);
        assert_eq!(gradient.top.lightness, 40.75);
        assert_eq!(gradient.bottom.lightness, 32.75);
        assert_eq!(gradient.top.hue, 140.0);
    }

    #[test]
    fn lightness_stays_in_range() {
        let scale = HeatScale::default();
        let mut change = -12.0;
        while change <= 12.0 {
            let gradient = scale.gradient_for_change(change);
            assert!((16.0..=60.0).contains(&gradient.top.lightness));
            assert!((8.0..=52.0).contains(&gradient.bottom.lightness));
            change += 0.25;
        }
    }

    #[test]
    fn non_finite_is_zero() {
        let scale = HeatScale::default();
        let zero = scale.gradient_for_change(0.0);
        assert_eq!(scale.gradient_for_change(f64::NAN), zero);
        assert_eq!(scale.gradient_for_change(f64::INFINITY), zero);
        assert_eq!(scale.gradient_for_change(f64::NEG_INFINITY), zero);
    }

    #[test]
    fn bottom_floor_applies() {
        let scale = HeatScale { min_lightness: 10.0, ..HeatScale::default() };
        let gradient = scale.gradient_for_change(8.0);
        assert_eq!(gradient.top.lightness, 10.0);
        assert_eq!(gradient.bottom.lightness, 8.0);
    }

    #[test]
    fn toml_overrides_defaults() {
        let scale = HeatScale::from_toml_str("cap = 5.0\npositive_hue = 120.0\n").unwrap();
        assert_eq!(scale.cap, 5.0);
        assert_eq!(scale.positive_hue, 120.0);
        assert_eq!(scale.saturation, 70.0);
        assert_eq!(scale.gradient_for_change(5.0).intensity, 1.0);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(HeatScale::from_toml_str("").unwrap(), HeatScale::default());
    }

    #[test]
    fn rejects_invalid_scales() {
        assert!(matches!(
            HeatScale::from_toml_str("cap = 0.0"),
            Err(HeatTileError::InvalidScale(_))
        ));
        assert!(matches!(
            HeatScale::from_toml_str("min_lightness = 70.0"),
            Err(HeatTileError::InvalidScale(_))
        ));
        assert!(matches!(
            HeatScale::from_toml_str("saturation = 140.0"),
            Err(HeatTileError::InvalidScale(_))
        ));
        assert!(matches!(HeatScale::from_toml_str("unknown = 1"), Err(HeatTileError::Config(_))));
    }
}
