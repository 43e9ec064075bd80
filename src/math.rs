/*
 * Vector Math Module
 *
 * Small helpers on top of glam's Vec2 used by the rules and the agent update.
 * Every helper treats the zero vector as a fixed point: normalizing or rescaling
 * a zero (or non-finite) vector yields zero, never NaN.
 */

use glam::Vec2;

// Offset used to keep divisions away from zero
pub const EPSILON: f32 = 1e-5;

// Unit vector in the direction of `v`, or zero if `v` has no usable direction.
// Infinite components keep their sign so a diverging force still points somewhere.
#[inline]
pub fn unit_or_zero(v: Vec2) -> Vec2 {
    if v.is_nan() {
        return Vec2::ZERO;
    }
    if !v.is_finite() {
        let direction = Vec2::new(infinite_sign(v.x), infinite_sign(v.y));
        return direction / direction.length();
    }

    // Divide by the largest component first so tiny vectors don't underflow
    let scale = v.x.abs().max(v.y.abs());
    if scale == 0.0 {
        return Vec2::ZERO;
    }
    let scaled = v / scale;
    scaled / scaled.length()
}

#[inline]
fn infinite_sign(component: f32) -> f32 {
    if component.is_infinite() {
        component.signum()
    } else {
        0.0
    }
}

// Rescale `v` down to `max` if it is longer, keeping its direction (NaN collapses to zero)
#[inline]
pub fn limit(v: Vec2, max: f32) -> Vec2 {
    if !(v.length() <= max) {
        unit_or_zero(v) * max
    } else {
        v
    }
}

// Rescale `v` to exactly `magnitude`; zero stays zero
#[inline]
pub fn with_magnitude(v: Vec2, magnitude: f32) -> Vec2 {
    unit_or_zero(v) * magnitude
}

// Heading angle of `v` in radians
#[inline]
pub fn yaw(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn unit_or_zero_handles_zero_vector() {
        assert_eq!(unit_or_zero(Vec2::ZERO), Vec2::ZERO);
        assert_eq!(unit_or_zero(Vec2::new(f32::NAN, 1.0)), Vec2::ZERO);
    }

    #[test]
    fn unit_or_zero_returns_unit_length() {
        let v = unit_or_zero(Vec2::new(3.0, -4.0));
        assert_relative_eq!(v.length(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(v.x, 0.6, epsilon = 1e-6);
        assert_relative_eq!(v.y, -0.8, epsilon = 1e-6);
    }

    #[test]
    fn unit_or_zero_survives_tiny_and_infinite_input() {
        let tiny = unit_or_zero(Vec2::new(1e-30, 1e-30));
        assert_relative_eq!(tiny.length(), 1.0, epsilon = 1e-6);

        let diverging = unit_or_zero(Vec2::new(f32::INFINITY, 2.0));
        assert_eq!(diverging, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn limit_only_shrinks_long_vectors() {
        assert_eq!(limit(Vec2::new(1.0, 0.0), 2.0), Vec2::new(1.0, 0.0));
        let clamped = limit(Vec2::new(0.0, 10.0), 2.0);
        assert_relative_eq!(clamped.y, 2.0, epsilon = 1e-6);
        assert_eq!(clamped.x, 0.0);
    }

    #[test]
    fn with_magnitude_keeps_zero() {
        assert_eq!(with_magnitude(Vec2::ZERO, 30.0), Vec2::ZERO);
        assert_relative_eq!(with_magnitude(Vec2::new(-2.0, 0.0), 30.0).x, -30.0, epsilon = 1e-5);
    }

    #[test]
    fn yaw_follows_atan2() {
        assert_relative_eq!(yaw(Vec2::new(0.0, 1.0)), std::f32::consts::FRAC_PI_2, epsilon = 1e-6);
        assert_eq!(yaw(Vec2::new(1.0, 0.0)), 0.0);
    }
}
