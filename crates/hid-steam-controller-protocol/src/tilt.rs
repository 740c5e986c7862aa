//! Integer tilt angle estimation from accelerometer samples.
//!
//! Angles are in centidegrees. The arctangent is approximated on the first
//! octant as `4500·z + 1564·z·(1 − z)` for `z = min/max ∈ [0, 1]` in Q15,
//! which stays within about 0.3° of the true value, and then mirrored into
//! the remaining octants. No floating point, no division by zero.

/// Angles lie in `-ANGLE_RANGE..=ANGLE_RANGE`.
pub const ANGLE_RANGE: i32 = 18_000;

const QUARTER: i32 = 9_000;
const OCTANT: u64 = 4_500;
const CURVE: u64 = 1_564;
const Q15_ONE: u64 = 1 << 15;

/// Angle of the vector `(horizontal, vertical)` measured from the positive
/// vertical axis, positive towards positive `horizontal`.
///
/// `(0, 0)` yields 0.
pub fn tilt_angle(horizontal: i16, vertical: i16) -> i32 {
    let h = horizontal.unsigned_abs();
    let v = vertical.unsigned_abs();
    if h == 0 && v == 0 {
        return 0;
    }

    // Angle from the vertical axis within the first quadrant.
    let quadrant = if h <= v {
        octant_angle(h, v)
    } else {
        QUARTER - octant_angle(v, h)
    };

    match (vertical >= 0, horizontal >= 0) {
        (true, true) => quadrant,
        (true, false) => -quadrant,
        (false, true) => ANGLE_RANGE - quadrant,
        (false, false) => quadrant - ANGLE_RANGE,
    }
}

/// `atan(num / den)` in centidegrees for `num <= den`, `den > 0`.
fn octant_angle(num: u16, den: u16) -> i32 {
    if den == 0 {
        return 0;
    }
    let z = (u64::from(num) << 15) / u64::from(den);
    let one_minus_z = Q15_ONE.saturating_sub(z);
    let linear = OCTANT * z;
    let correction = CURVE * z * one_minus_z / Q15_ONE;
    let angle = (linear + correction + Q15_ONE / 2) / Q15_ONE;
    i32::try_from(angle).unwrap_or(QUARTER / 2)
}

/// Tilt about the two horizontal axes: `[x against z, y against z]`.
pub fn tilt_angles(accel: [i16; 3]) -> [i32; 2] {
    let [x, y, z] = accel;
    [tilt_angle(x, z), tilt_angle(y, z)]
}

#[cfg(test)]
mod tests {
    use super::*;

    const G: i16 = 0x4000;

    #[test]
    fn cardinal_directions() {
        assert_eq!(tilt_angle(0, G), 0);
        assert_eq!(tilt_angle(G, 0), 9_000);
        assert_eq!(tilt_angle(-G, 0), -9_000);
        assert_eq!(tilt_angle(0, -G), 18_000);
        assert_eq!(tilt_angle(0, 0), 0);
    }

    #[test]
    fn diagonals_are_exact() {
        assert_eq!(tilt_angle(G, G), 4_500);
        assert_eq!(tilt_angle(-G, G), -4_500);
        assert_eq!(tilt_angle(G, -G), 13_500);
        assert_eq!(tilt_angle(-G, -G), -13_500);
    }

    #[test]
    fn half_slope_is_close_to_atan() {
        // atan(0.5) = 26.565°
        let angle = tilt_angle(G / 2, G);
        assert!((angle - 2_657).abs() <= 30, "got {angle}");
    }

    #[test]
    fn extreme_inputs_do_not_overflow() {
        assert_eq!(tilt_angle(i16::MIN, 0), -9_000);
        assert_eq!(tilt_angle(0, i16::MIN), 18_000);
        assert_eq!(tilt_angle(i16::MIN, i16::MIN), -13_500);
        assert_eq!(tilt_angle(i16::MAX, i16::MAX), 4_500);
    }

    #[test]
    fn flat_controller_reads_level() {
        assert_eq!(tilt_angles([0, 0, G]), [0, 0]);
        assert_eq!(tilt_angles([G, 0, 0]), [9_000, 0]);
    }
}
