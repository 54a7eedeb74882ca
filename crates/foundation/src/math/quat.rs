//! Unit quaternions for camera orientation.
//!
//! Storage order is `[x, y, z, w]`, matching the layout animation backends
//! expect for quaternion keyframe tracks.

use serde::{Deserialize, Serialize};

use super::Vec3;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Quat {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<[f64; 4]> for Quat {
    fn from(q: [f64; 4]) -> Self {
        Self::new(q[0], q[1], q[2], q[3])
    }
}

impl From<Quat> for [f64; 4] {
    fn from(q: Quat) -> Self {
        q.to_array()
    }
}

impl Quat {
    pub const IDENTITY: Quat = Quat {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.x, self.y, self.z, self.w]
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Quaternion multiplication: `self * other`.
    pub fn mul(self, b: Self) -> Self {
        let a = self;
        Self::new(
            a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
            a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
            a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
            a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
        )
    }

    pub fn normalize(self) -> Self {
        let n = self.dot(self).sqrt();
        if n > 1e-10 {
            Self::new(self.x / n, self.y / n, self.z / n, self.w / n)
        } else {
            Self::IDENTITY
        }
    }

    /// Inverse for unit quaternions.
    pub fn conjugate(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Rotate a vector by a unit quaternion.
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let qv = Vec3::new(self.x, self.y, self.z);
        let t = qv.cross(v) * 2.0;
        v + t * self.w + qv.cross(t)
    }

    /// Rotation angle in radians.
    pub fn angle(self) -> f64 {
        2.0 * self.w.clamp(-1.0, 1.0).abs().acos()
    }

    /// Spherical linear interpolation along the shorter arc.
    pub fn slerp(self, other: Self, t: f64) -> Self {
        let a = self;
        let mut b = other;
        let mut dot = a.dot(b);

        if dot < 0.0 {
            b = Self::new(-b.x, -b.y, -b.z, -b.w);
            dot = -dot;
        }

        // Nearly parallel: fall back to normalized lerp.
        if dot > 0.9995 {
            return Self::new(
                a.x + t * (b.x - a.x),
                a.y + t * (b.y - a.y),
                a.z + t * (b.z - a.z),
                a.w + t * (b.w - a.w),
            )
            .normalize();
        }

        let theta_0 = dot.clamp(-1.0, 1.0).acos();
        let theta = theta_0 * t;
        let sin_theta = theta.sin();
        let sin_theta_0 = theta_0.sin();

        let s0 = theta.cos() - dot * sin_theta / sin_theta_0;
        let s1 = sin_theta / sin_theta_0;

        Self::new(
            s0 * a.x + s1 * b.x,
            s0 * a.y + s1 * b.y,
            s0 * a.z + s1 * b.z,
            s0 * a.w + s1 * b.w,
        )
    }

    /// Quaternion rotating unit vector `a` onto unit vector `b`.
    pub fn from_unit_vectors(a: Vec3, b: Vec3) -> Self {
        let dot = a.dot(b).clamp(-1.0, 1.0);

        if dot < -0.999999 {
            let mut axis = Vec3::new(1.0, 0.0, 0.0).cross(a);
            if axis.length_squared() < 1e-12 {
                axis = Vec3::new(0.0, 1.0, 0.0).cross(a);
            }
            let axis = axis.normalize_or_zero();
            return Self::new(axis.x, axis.y, axis.z, 0.0);
        }

        if dot > 0.999999 {
            return Self::IDENTITY;
        }

        let axis = a.cross(b);
        Self::new(axis.x, axis.y, axis.z, 1.0 + dot).normalize()
    }

    /// Orientation from an orthonormal basis given as matrix columns.
    pub fn from_basis(x_axis: Vec3, y_axis: Vec3, z_axis: Vec3) -> Self {
        let (m00, m01, m02) = (x_axis.x, y_axis.x, z_axis.x);
        let (m10, m11, m12) = (x_axis.y, y_axis.y, z_axis.y);
        let (m20, m21, m22) = (x_axis.z, y_axis.z, z_axis.z);

        let trace = m00 + m11 + m22;
        let q = if trace > 0.0 {
            let s = 0.5 / (trace + 1.0).sqrt();
            Self::new((m21 - m12) * s, (m02 - m20) * s, (m10 - m01) * s, 0.25 / s)
        } else if m00 > m11 && m00 > m22 {
            let s = 2.0 * (1.0 + m00 - m11 - m22).sqrt();
            Self::new(0.25 * s, (m01 + m10) / s, (m02 + m20) / s, (m21 - m12) / s)
        } else if m11 > m22 {
            let s = 2.0 * (1.0 + m11 - m00 - m22).sqrt();
            Self::new((m01 + m10) / s, 0.25 * s, (m12 + m21) / s, (m02 - m20) / s)
        } else {
            let s = 2.0 * (1.0 + m22 - m00 - m11).sqrt();
            Self::new((m02 + m20) / s, (m12 + m21) / s, 0.25 * s, (m10 - m01) / s)
        };
        q.normalize()
    }

    /// Camera orientation looking from `eye` toward `target`.
    ///
    /// The camera looks down its local -Z axis, so `rotate(-Z)` points at the
    /// target. Degenerate inputs (eye == target, forward parallel to `up`) are
    /// nudged the same way common scene graphs do it rather than producing NaN.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let z = (eye - target).normalize().unwrap_or(Vec3::new(0.0, 0.0, 1.0));

        let mut x = up.cross(z);
        if x.length_squared() < 1e-24 {
            let nudged = if up.z.abs() > 0.999_999 {
                Vec3::new(z.x + 1e-4, z.y, z.z)
            } else {
                Vec3::new(z.x, z.y, z.z + 1e-4)
            };
            x = up.cross(nudged.normalize_or_zero());
        }
        let x = x.normalize_or_zero();
        let y = z.cross(x);

        Self::from_basis(x, y, z)
    }

    /// The direction the camera looks at (local -Z rotated into world space).
    pub fn forward(self) -> Vec3 {
        self.rotate(Vec3::new(0.0, 0.0, -1.0))
    }
}
