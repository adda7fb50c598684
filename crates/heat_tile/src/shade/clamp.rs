/// Restrict `value` to the closed range `[min, max]`.
///
/// Evaluated as `min(max, max(min, value))`, so an inverted range (`min > max`) always yields
/// `max` and a NaN `value` yields `min`. Unlike [`f64::clamp`] this never panics.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    max.min(min.max(value))
}
