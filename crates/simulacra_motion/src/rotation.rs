//! # Rotation Engine
//!
//! Euler channels to unit quaternions.
//!
//! Each axis angle becomes a single-axis quaternion from its half-angle
//! sin/cos pair. The three are multiplied in the joint's declared channel
//! order, leftmost outermost: `"zxy"` composes as `qz * qx * qy`.
//!
//! Capture files are right-handed; the avatar engine is left-handed. One
//! global correction, [`to_engine_handedness`], negates `y` and `z` after
//! composition. It is never applied per bone.

use std::fmt;
use std::str::FromStr;

use simulacra_shared::{Quaternion, Vec3};

/// A rotation axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// X axis.
    X,
    /// Y axis.
    Y,
    /// Z axis.
    Z,
}

impl Axis {
    /// Parses `x`, `y` or `z` in either case.
    #[must_use]
    pub const fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'x' | 'X' => Some(Self::X),
            'y' | 'Y' => Some(Self::Y),
            'z' | 'Z' => Some(Self::Z),
            _ => None,
        }
    }

    const fn letter(self) -> char {
        match self {
            Self::X => 'x',
            Self::Y => 'y',
            Self::Z => 'z',
        }
    }
}

/// Order in which a joint's three axis rotations are composed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum RotationOrder {
    /// `qx * qy * qz`
    Xyz,
    /// `qx * qz * qy`
    Xzy,
    /// `qy * qx * qz`
    Yxz,
    /// `qy * qz * qx`
    Yzx,
    /// `qz * qx * qy`, the most common order in capture files.
    #[default]
    Zxy,
    /// `qz * qy * qx`
    Zyx,
}

impl RotationOrder {
    /// All six permutations.
    pub const ALL: [Self; 6] = [Self::Xyz, Self::Xzy, Self::Yxz, Self::Yzx, Self::Zxy, Self::Zyx];

    /// Axes in composition order.
    #[must_use]
    pub const fn axes(self) -> [Axis; 3] {
        use Axis::{X, Y, Z};
        match self {
            Self::Xyz => [X, Y, Z],
            Self::Xzy => [X, Z, Y],
            Self::Yxz => [Y, X, Z],
            Self::Yzx => [Y, Z, X],
            Self::Zxy => [Z, X, Y],
            Self::Zyx => [Z, Y, X],
        }
    }

    /// Builds an order from the rotation axes a joint declared.
    ///
    /// Declared axes keep their relative order; axes the joint never
    /// declared are appended in `x, y, z` order. An undeclared axis always
    /// carries 0°, so where it lands does not change the result. Nothing
    /// declared yields the default order.
    #[must_use]
    pub fn from_declared(declared: &[Axis]) -> Self {
        if declared.is_empty() {
            return Self::default();
        }
        let mut axes: Vec<Axis> = Vec::with_capacity(3);
        for axis in declared.iter().chain(&[Axis::X, Axis::Y, Axis::Z]) {
            if !axes.contains(axis) {
                axes.push(*axis);
            }
        }
        Self::from_axes([axes[0], axes[1], axes[2]])
    }

    const fn from_axes(axes: [Axis; 3]) -> Self {
        use Axis::{X, Y, Z};
        match axes {
            [X, Y, _] => Self::Xyz,
            [X, Z, _] => Self::Xzy,
            [Y, X, _] => Self::Yxz,
            [Y, Z, _] => Self::Yzx,
            [Z, X, _] => Self::Zxy,
            _ => Self::Zyx,
        }
    }
}

impl fmt::Display for RotationOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for axis in self.axes() {
            write!(f, "{}", axis.letter())?;
        }
        Ok(())
    }
}

/// A string that is not a permutation of `xyz`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a rotation order: {0:?}")]
pub struct InvalidRotationOrder(pub String);

impl FromStr for RotationOrder {
    type Err = InvalidRotationOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let axes: Option<Vec<Axis>> = s.chars().map(Axis::from_letter).collect();
        match axes.as_deref() {
            Some(&[a, b, c]) if a != b && b != c && a != c => Ok(Self::from_axes([a, b, c])),
            _ => Err(InvalidRotationOrder(s.to_owned())),
        }
    }
}

/// Converts Euler angles in degrees to a unit quaternion.
///
/// `degrees.x` is the X-axis angle, and so on; `order` decides composition.
/// Zero angles give the identity. The result is renormalized so
/// `|q| = 1 ± 1e-5` holds for every finite input.
#[must_use]
pub fn euler_to_quaternion(degrees: Vec3, order: RotationOrder) -> Quaternion {
    let single = |axis: Axis| match axis {
        Axis::X => Quaternion::from_rotation_x(degrees.x.to_radians()),
        Axis::Y => Quaternion::from_rotation_y(degrees.y.to_radians()),
        Axis::Z => Quaternion::from_rotation_z(degrees.z.to_radians()),
    };
    let [a, b, c] = order.axes();
    (single(a) * single(b) * single(c)).normalize()
}

/// Converts a capture-space rotation to the engine's handedness.
#[inline]
#[must_use]
pub const fn to_engine_handedness(q: Quaternion) -> Quaternion {
    Quaternion::new(q.x, -q.y, -q.z, q.w)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Quaternion, b: Quaternion) -> bool {
        let d = [a.x - b.x, a.y - b.y, a.z - b.z, a.w - b.w];
        d.iter().all(|v| v.abs() < 1e-5)
    }

    #[test]
    fn test_zero_angles_give_identity() {
        for order in RotationOrder::ALL {
            assert_eq!(euler_to_quaternion(Vec3::ZERO, order), Quaternion::IDENTITY);
        }
    }

    #[test]
    fn test_unit_norm_all_orders() {
        let samples = [-720.0, -181.5, -90.0, -33.3, 0.0, 12.5, 45.0, 90.0, 179.9, 360.0, 10_000.0];
        for order in RotationOrder::ALL {
            for &x in &samples {
                for &y in &samples {
                    for &z in &samples {
                        let q = euler_to_quaternion(Vec3::new(x, y, z), order);
                        assert!(
                            (q.norm() - 1.0).abs() < 1e-5,
                            "norm {} for {order} ({x}, {y}, {z})",
                            q.norm()
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_single_axis_matches_half_angle() {
        let q = euler_to_quaternion(Vec3::new(0.0, 90.0, 0.0), RotationOrder::Zxy);
        let h = std::f32::consts::FRAC_PI_4;
        assert!(approx(q, Quaternion::new(0.0, h.sin(), 0.0, h.cos())));
    }

    #[test]
    fn test_order_changes_composition() {
        let angles = Vec3::new(30.0, 45.0, 60.0);
        let zxy = euler_to_quaternion(angles, RotationOrder::Zxy);
        let xyz = euler_to_quaternion(angles, RotationOrder::Xyz);
        assert!(!approx(zxy, xyz));

        let rx = Quaternion::from_rotation_x(30f32.to_radians());
        let ry = Quaternion::from_rotation_y(45f32.to_radians());
        let rz = Quaternion::from_rotation_z(60f32.to_radians());
        assert!(approx(zxy, rz * rx * ry));
        assert!(approx(xyz, rx * ry * rz));
    }

    #[test]
    fn test_handedness_negates_y_and_z() {
        let q = Quaternion::new(0.1, 0.2, 0.3, 0.9);
        assert_eq!(to_engine_handedness(q), Quaternion::new(0.1, -0.2, -0.3, 0.9));
    }

    #[test]
    fn test_order_parsing() {
        assert_eq!("zxy".parse::<RotationOrder>(), Ok(RotationOrder::Zxy));
        assert_eq!("YZX".parse::<RotationOrder>(), Ok(RotationOrder::Yzx));
        assert!("zzy".parse::<RotationOrder>().is_err());
        assert!("xy".parse::<RotationOrder>().is_err());
        for order in RotationOrder::ALL {
            assert_eq!(order.to_string().parse::<RotationOrder>(), Ok(order));
        }
    }

    #[test]
    fn test_from_declared_fills_missing_axes() {
        assert_eq!(RotationOrder::from_declared(&[Axis::Z, Axis::X, Axis::Y]), RotationOrder::Zxy);
        assert_eq!(RotationOrder::from_declared(&[Axis::Y]), RotationOrder::Yxz);
        assert_eq!(RotationOrder::from_declared(&[Axis::Z, Axis::Y]), RotationOrder::Zyx);
        assert_eq!(RotationOrder::from_declared(&[]), RotationOrder::Zxy);
    }
}
