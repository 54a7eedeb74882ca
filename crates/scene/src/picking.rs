use catalog::AnnotationId;
use foundation::math::Vec3;
use foundation::math::precision::stable_total_cmp_f64;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// A pickable marker: one annotation's label position on the current ship.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Hotspot {
    pub annotation: AnnotationId,
    pub position: Vec3,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickHit {
    pub annotation: AnnotationId,
    pub distance: f64,
    pub point: Vec3,
}

/// Something opaque in the scene (the hull) that can hide hotspots.
pub trait Occluder {
    /// Distance along `ray` to the first opaque surface, `None` if nothing
    /// is hit.
    fn occlusion_distance(&self, ray: &Ray) -> Option<f64>;
}

/// Scene without occluding geometry.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoOcclusion;

impl Occluder for NoOcclusion {
    fn occlusion_distance(&self, _ray: &Ray) -> Option<f64> {
        None
    }
}

impl<F> Occluder for F
where
    F: Fn(&Ray) -> Option<f64>,
{
    fn occlusion_distance(&self, ray: &Ray) -> Option<f64> {
        self(ray)
    }
}

/// Entry distance of `ray` into a sphere, or `None` on a miss.
///
/// A ray starting inside the sphere hits at distance 0.
pub fn ray_sphere_hit_t(ray: &Ray, center: Vec3, radius: f64) -> Option<f64> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.dir);
    let c = oc.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }
    if b > 0.0 {
        return None;
    }
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    Some(-b - disc.sqrt())
}

/// Nearest hotspot hit by `ray`.
///
/// Ordering contract:
/// - the closest hit along the ray wins;
/// - equal distances resolve to the lower `AnnotationId` (catalog order).
pub fn pick_nearest<'a>(
    hotspots: impl IntoIterator<Item = &'a Hotspot>,
    ray: &Ray,
    radius: f64,
) -> Option<PickHit> {
    let mut best: Option<(f64, AnnotationId)> = None;

    for h in hotspots {
        let Some(t) = ray_sphere_hit_t(ray, h.position, radius) else {
            continue;
        };
        best = match best {
            None => Some((t, h.annotation)),
            Some((bt, ba)) => {
                let ord = stable_total_cmp_f64(t, bt).then_with(|| h.annotation.cmp(&ba));
                if ord.is_lt() { Some((t, h.annotation)) } else { Some((bt, ba)) }
            }
        };
    }

    let (distance, annotation) = best?;
    Some(PickHit {
        annotation,
        distance,
        point: ray.at(distance),
    })
}

/// Whether the hull hides `point` from `eye`.
///
/// No intersection at all means visible; only a surface strictly in front of
/// the point (with a small tolerance for markers sitting on the hull) hides it.
pub fn is_occluded(occluder: &dyn Occluder, eye: Vec3, point: Vec3) -> bool {
    let to_point = point - eye;
    let Some(dir) = to_point.normalize() else {
        return false;
    };
    let ray = Ray::new(eye, dir);
    match occluder.occlusion_distance(&ray) {
        Some(hit) => hit + OCCLUSION_TOLERANCE < to_point.length(),
        None => false,
    }
}

const OCCLUSION_TOLERANCE: f64 = 1e-3;
