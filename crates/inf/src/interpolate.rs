use num::{Float, NumCast};

/// Maps `value` linearly from the `[min, max]` range to `[0, 1]`.
/// Values outside of the range are clamped, an empty range maps everything up to `min` to 0 and the rest to 1.
#[inline]
pub fn linear_map_to_float<T, TFloat>(value: T, min: T, max: T) -> TFloat
where
    T: Float,
    TFloat: Float,
{
    debug_assert!(min <= max);

    if min > max || value <= min {
        return TFloat::zero();
    } else if value >= max {
        return TFloat::one();
    }

    let offset: TFloat = NumCast::from(value - min).unwrap_or(TFloat::zero());
    let range_width: TFloat = NumCast::from(max - min).unwrap_or(TFloat::one());
    offset / range_width
}

/// Linear interpolation between `start` and `end` at fraction `t`
#[inline]
pub fn lerp<T: Float>(start: T, end: T, t: T) -> T {
    start + (end - start) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_range() {
        assert_eq!(linear_map_to_float::<f32, f32>(-1.2, -1.2, 1.2), 0.0);
        assert_eq!(linear_map_to_float::<f32, f32>(0.0, -1.2, 1.2), 0.5);
        assert_eq!(linear_map_to_float::<f32, f32>(1.2, -1.2, 1.2), 1.0);
    }

    #[test]
    fn values_outside_range() {
        assert_eq!(linear_map_to_float::<f64, f32>(-2.0, -1.0, 1.0), 0.0);
        assert_eq!(linear_map_to_float::<f64, f32>(2.0, -1.0, 1.0), 1.0);
    }

    #[test]
    fn zero_range() {
        assert_eq!(linear_map_to_float::<f32, f32>(0.0, 1.0, 1.0), 0.0);
        assert_eq!(linear_map_to_float::<f32, f32>(1.0, 1.0, 1.0), 0.0);
        assert_eq!(linear_map_to_float::<f32, f32>(2.0, 1.0, 1.0), 1.0);
    }

    #[test]
    fn lerp_fraction() {
        assert_eq!(lerp(10.0, 20.0, 0.25), 12.5);
    }
}
