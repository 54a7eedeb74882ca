use catalog::CameraPose;
use foundation::math::{Mat4, Quat, Vec2, Vec3, mat4_look_at_rh, mat4_mul, mat4_perspective_rh_z0};

use crate::picking::Ray;

/// Canvas size in CSS pixels. Pixel `(0, 0)` is the top-left corner.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width_px: f64,
    pub height_px: f64,
}

impl Viewport {
    pub fn new(width_px: f64, height_px: f64) -> Self {
        Self {
            width_px,
            height_px,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.width_px.is_finite() && self.height_px.is_finite() && self.width_px > 0.0 && self.height_px > 0.0
    }

    pub fn aspect(&self) -> f64 {
        self.width_px / self.height_px
    }

    /// Clamp a pointer position into the canvas.
    pub fn clamp(&self, px: Vec2) -> Vec2 {
        Vec2::new(px.x.clamp(0.0, self.width_px), px.y.clamp(0.0, self.height_px))
    }

    pub fn contains(&self, px: Vec2) -> bool {
        (0.0..=self.width_px).contains(&px.x) && (0.0..=self.height_px).contains(&px.y)
    }
}

/// Perspective camera looking from `pose.position` at `pose.target`, +Y up.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub pose: CameraPose,
    pub fov_y_rad: f64,
    pub near: f64,
    pub far: f64,
    pub viewport: Viewport,
}

/// Camera frame vectors in world space.
#[derive(Debug, Copy, Clone)]
struct Basis {
    right: Vec3,
    up: Vec3,
    forward: Vec3,
}

impl Camera {
    pub fn new(pose: CameraPose, fov_y_deg: f64, near: f64, far: f64, viewport: Viewport) -> Self {
        Self {
            pose,
            fov_y_rad: fov_y_deg.to_radians(),
            near,
            far,
            viewport,
        }
    }

    /// A camera can project only with a usable viewport, frustum and a pose
    /// whose eye and target differ.
    pub fn has_valid_projection(&self) -> bool {
        self.viewport.is_valid()
            && self.pose.is_finite()
            && self.pose.distance() > 1e-9
            && self.fov_y_rad > 0.0
            && self.fov_y_rad < std::f64::consts::PI
            && self.near > 0.0
            && self.far > self.near
    }

    pub fn orientation(&self) -> Quat {
        self.pose.orientation()
    }

    fn basis(&self) -> Basis {
        let q = self.orientation();
        Basis {
            right: q.rotate(Vec3::new(1.0, 0.0, 0.0)),
            up: q.rotate(Vec3::new(0.0, 1.0, 0.0)),
            forward: q.forward(),
        }
    }

    fn tan_half_fov(&self) -> f64 {
        (0.5 * self.fov_y_rad).tan()
    }

    pub fn view_proj(&self) -> Mat4 {
        let view = mat4_look_at_rh(self.pose.position, self.pose.target, Vec3::UP);
        let proj = mat4_perspective_rh_z0(self.fov_y_rad, self.viewport.aspect(), self.near, self.far);
        mat4_mul(proj, view)
    }

    /// Screen position of a world point, or `None` when it lies behind the
    /// near plane (or the camera cannot project at all).
    pub fn project(&self, world: Vec3) -> Option<Vec2> {
        if !self.has_valid_projection() {
            return None;
        }
        let b = self.basis();
        let d = world - self.pose.position;
        let depth = d.dot(b.forward);
        if depth < self.near {
            return None;
        }
        let t = self.tan_half_fov();
        let ndc_x = d.dot(b.right) / (depth * t * self.viewport.aspect());
        let ndc_y = d.dot(b.up) / (depth * t);
        Some(Vec2::new(
            (ndc_x + 1.0) * 0.5 * self.viewport.width_px,
            (1.0 - ndc_y) * 0.5 * self.viewport.height_px,
        ))
    }

    /// Ray from the eye through a pointer position, clamped to the canvas.
    pub fn ray_through(&self, pointer_px: Vec2) -> Option<Ray> {
        if !self.has_valid_projection() {
            return None;
        }
        let px = self.viewport.clamp(pointer_px);
        let ndc_x = 2.0 * px.x / self.viewport.width_px - 1.0;
        let ndc_y = 1.0 - 2.0 * px.y / self.viewport.height_px;

        let b = self.basis();
        let t = self.tan_half_fov();
        let dir = b.forward + b.right * (ndc_x * t * self.viewport.aspect()) + b.up * (ndc_y * t);
        Some(Ray::new(self.pose.position, dir.normalize()?))
    }
}
