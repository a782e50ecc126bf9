//! Mathematical types shared between the motion pipeline and the encoders.
//!
//! These are the canonical representations used in both wire protocols.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 3D Vector - root position, channel triples
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
}

impl Vec3 {
    /// Creates a new Vec3
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Converts to array
    #[must_use]
    pub const fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// Dot product
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Length
    #[must_use]
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }
}

impl std::ops::Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Quaternion for rotations, stored `(x, y, z, w)`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Quaternion {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
    /// W component
    pub w: f32,
}

impl Quaternion {
    /// Creates a new quaternion
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Identity rotation
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Rotation of `radians` about the X axis.
    #[must_use]
    pub fn from_rotation_x(radians: f32) -> Self {
        let (s, c) = (radians * 0.5).sin_cos();
        Self::new(s, 0.0, 0.0, c)
    }

    /// Rotation of `radians` about the Y axis.
    #[must_use]
    pub fn from_rotation_y(radians: f32) -> Self {
        let (s, c) = (radians * 0.5).sin_cos();
        Self::new(0.0, s, 0.0, c)
    }

    /// Rotation of `radians` about the Z axis.
    #[must_use]
    pub fn from_rotation_z(radians: f32) -> Self {
        let (s, c) = (radians * 0.5).sin_cos();
        Self::new(0.0, 0.0, s, c)
    }

    /// Euclidean norm.
    #[must_use]
    pub fn norm(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    /// Returns the unit quaternion, or identity for a degenerate input.
    #[must_use]
    pub fn normalize(self) -> Self {
        let n = self.norm();
        if n <= f32::EPSILON || !n.is_finite() {
            return Self::IDENTITY;
        }
        Self::new(self.x / n, self.y / n, self.z / n, self.w / n)
    }

    /// Converts to `[x, y, z, w]`.
    #[must_use]
    pub const fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Hamilton product; `a * b` applies `b` first, then `a`.
impl std::ops::Mul for Quaternion {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        let (x1, y1, z1, w1) = (self.x, self.y, self.z, self.w);
        let (x2, y2, z2, w2) = (rhs.x, rhs.y, rhs.z, rhs.w);
        Self::new(
            w1 * x2 + x1 * w2 + y1 * z2 - z1 * y2,
            w1 * y2 - x1 * z2 + y1 * w2 + z1 * x2,
            w1 * z2 + x1 * y2 - y1 * x2 + z1 * w2,
            w1 * w2 - x1 * x2 - y1 * y2 - z1 * z2,
        )
    }
}

/// Bone transform as it travels on the binary wire.
///
/// Layout is fixed: `qx, qy, qz, qw, px, py, pz`, 28 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Transform {
    /// Rotation
    pub rotation: Quaternion,
    /// Position
    pub position: Vec3,
}

impl Transform {
    /// Size on the wire in bytes.
    pub const SIZE: usize = 28;

    /// Creates a new transform
    #[must_use]
    pub const fn new(rotation: Quaternion, position: Vec3) -> Self {
        Self { rotation, position }
    }

    /// Identity transform
    pub const IDENTITY: Self = Self::new(Quaternion::IDENTITY, Vec3::ZERO);
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_length() {
        let v = Vec3::new(3.0, 4.0, 0.0);
        assert_eq!(v.length(), 5.0);
        assert_eq!((v * 0.5).to_array(), [1.5, 2.0, 0.0]);
    }

    #[test]
    fn test_quaternion_identity_product() {
        let q = Quaternion::from_rotation_y(0.7);
        assert_eq!(Quaternion::IDENTITY * q, q);
        assert_eq!(q * Quaternion::IDENTITY, q);
    }

    #[test]
    fn test_quaternion_composes_same_axis() {
        let a = Quaternion::from_rotation_z(0.25);
        let b = Quaternion::from_rotation_z(0.5);
        let c = Quaternion::from_rotation_z(0.75);
        let ab = a * b;
        assert!((ab.z - c.z).abs() < 1e-6);
        assert!((ab.w - c.w).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_degenerate_is_identity() {
        assert_eq!(Quaternion::new(0.0, 0.0, 0.0, 0.0).normalize(), Quaternion::IDENTITY);
        let q = Quaternion::new(0.0, 0.0, 0.0, 2.0).normalize();
        assert_eq!(q, Quaternion::IDENTITY);
    }

    #[test]
    fn test_transform_bytemuck() {
        let t = Transform::IDENTITY;
        let bytes: &[u8] = bytemuck::bytes_of(&t);
        assert_eq!(bytes.len(), Transform::SIZE);
        assert_eq!(&bytes[12..16], &1.0f32.to_le_bytes());
    }
}
