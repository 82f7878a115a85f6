//! Numeric helpers shared by the scoring and reduction stages.

/// Round `value` to `decimals` decimal places (half away from zero).
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(75.29999, 2), 75.3);
        assert_eq!(round_to(12.345, 1), 12.3);
        assert_eq!(round_to(0.05, 1), 0.1);
        assert_eq!(round_to(100.0, 2), 100.0);
    }
}
