//! Column-major 4x4 matrix helpers (WGSL layout, right-handed, depth in [0, 1]).
//!
//! Matrices are produced as `f32` because they are handed straight to the
//! renderer; all inputs stay `f64` until the final cast.

use super::{Quat, Vec3};

pub type Mat4 = [[f32; 4]; 4];

pub const MAT4_IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Column-major matrix multiply: `a * b`.
pub fn mat4_mul(a: Mat4, b: Mat4) -> Mat4 {
    let mut c = [[0.0f32; 4]; 4];
    for col in 0..4 {
        for row in 0..4 {
            c[col][row] = a[0][row] * b[col][0]
                + a[1][row] * b[col][1]
                + a[2][row] * b[col][2]
                + a[3][row] * b[col][3];
        }
    }
    c
}

pub fn mat4_perspective_rh_z0(fov_y_rad: f64, aspect: f64, near: f64, far: f64) -> Mat4 {
    let f = 1.0 / (0.5 * fov_y_rad).tan();
    let m00 = (f / aspect) as f32;
    let m11 = f as f32;
    let m22 = (far / (near - far)) as f32;
    let m23 = ((near * far) / (near - far)) as f32;

    [
        [m00, 0.0, 0.0, 0.0],
        [0.0, m11, 0.0, 0.0],
        [0.0, 0.0, m22, -1.0],
        [0.0, 0.0, m23, 0.0],
    ]
}

/// View matrix for a camera at `eye` looking at `target`.
///
/// The basis comes from [`Quat::look_at`], so the straight-down case gets the
/// same nudge as the camera orientation instead of collapsing to zero.
pub fn mat4_look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let q = Quat::look_at(eye, target, up);
    let s = q.rotate(Vec3::new(1.0, 0.0, 0.0));
    let u = q.rotate(Vec3::new(0.0, 1.0, 0.0));
    let f = q.forward();

    let ex = -s.dot(eye);
    let ey = -u.dot(eye);
    let ez = f.dot(eye);

    [
        [s.x as f32, u.x as f32, (-f.x) as f32, 0.0],
        [s.y as f32, u.y as f32, (-f.y) as f32, 0.0],
        [s.z as f32, u.z as f32, (-f.z) as f32, 0.0],
        [ex as f32, ey as f32, ez as f32, 1.0],
    ]
}

/// Transform a point (w = 1) and return clip-space `[x, y, z, w]`.
pub fn mat4_transform_point(m: Mat4, p: Vec3) -> [f64; 4] {
    let mut out = [0.0f64; 4];
    for (row, o) in out.iter_mut().enumerate() {
        *o = m[0][row] as f64 * p.x + m[1][row] as f64 * p.y + m[2][row] as f64 * p.z
            + m[3][row] as f64;
    }
    out
}
