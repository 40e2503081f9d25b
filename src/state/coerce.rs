//! Numeric coercion rules shared by every client payload.
//!
//! Clients send loosely typed numbers; instead of rejecting them the server
//! maps each value onto the nearest valid one.

/// Drop NaN and infinities.
pub fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Missing, non-finite and negative values all become `0`.
pub fn non_negative(value: Option<f64>) -> f64 {
    match finite(value) {
        Some(v) if v > 0.0 => v,
        _ => 0.0,
    }
}

/// Round to the nearest whole number, never below `min`; garbage becomes `min`.
pub fn whole_at_least(value: Option<f64>, min: f64) -> f64 {
    finite(value).map_or(min, |v| v.round().max(min))
}

/// Round to the nearest integer inside `[min, max]`; garbage becomes `min`.
pub fn clamp_round(value: Option<f64>, min: u8, max: u8) -> u8 {
    finite(value).map_or(min, |v| v.round().clamp(f64::from(min), f64::from(max)) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_negative_rejects_garbage() {
        assert_eq!(non_negative(None), 0.0);
        assert_eq!(non_negative(Some(f64::NAN)), 0.0);
        assert_eq!(non_negative(Some(f64::INFINITY)), 0.0);
        assert_eq!(non_negative(Some(-3.0)), 0.0);
        assert_eq!(non_negative(Some(4.5)), 4.5);
    }

    #[test]
    fn whole_at_least_rounds_then_floors_at_min() {
        assert_eq!(whole_at_least(Some(2.6), 1.0), 3.0);
        assert_eq!(whole_at_least(Some(0.2), 1.0), 1.0);
        assert_eq!(whole_at_least(None, 0.0), 0.0);
    }

    #[test]
    fn clamp_round_stays_in_range() {
        assert_eq!(clamp_round(Some(3.0), 6, 64), 6);
        assert_eq!(clamp_round(Some(1e9), 6, 64), 64);
        assert_eq!(clamp_round(Some(9.5), 6, 64), 10);
        assert_eq!(clamp_round(Some(f64::NAN), 1, 16), 1);
    }
}
