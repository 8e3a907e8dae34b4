//! Ray/surface intersection and shadow visibility
//!
//! The closed-form tests assume a ray whose direction is unit length. They
//! are derived for a ray starting at the origin; a ray anchored elsewhere is
//! handled by translating the surface into the ray's frame first.

use crate::math::{distance, unit, Vec3};
use crate::scene::{Light, Plane, Scene, Sphere, Surface};

/// A ray in 3D space
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Ray from the camera at the world origin
    pub fn from_camera(direction: Vec3) -> Self {
        Self::new(Vec3::zeros(), direction)
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Nearest surface along a ray
#[derive(Debug, Clone, Copy)]
pub struct Hit<'a> {
    /// Position of the surface in the scene list
    pub index: usize,
    pub surface: &'a Surface,
    pub t: f64,
    pub point: Vec3,
}

impl Hit<'_> {
    /// Unit surface normal at the hit point
    pub fn normal(&self) -> Vec3 {
        match self.surface {
            Surface::Sphere(s) => unit(&(self.point - s.center)),
            Surface::Plane(p) => unit(&p.normal),
        }
    }
}

/// Types that can be tested for intersection with a ray
pub trait Intersect {
    /// Distance to the first crossing in front of the ray origin, if any
    fn intersect(&self, ray: &Ray) -> Option<f64>;
}

impl Intersect for Sphere {
    fn intersect(&self, ray: &Ray) -> Option<f64> {
        let center = self.center - ray.origin;
        let t_ca = ray.direction.dot(&center);
        let closest = ray.direction * t_ca;
        let dist = distance(&closest, &center);

        if dist >= self.radius {
            return None;
        }

        let t = t_ca - (self.radius * self.radius - dist * dist).sqrt();
        (t > 0.0).then_some(t)
    }
}

impl Intersect for Plane {
    fn intersect(&self, ray: &Ray) -> Option<f64> {
        let denom = self.normal.dot(&ray.direction);
        if denom == 0.0 {
            return None;
        }

        let t = -self.normal.dot(&(ray.origin - self.point)) / denom;
        (t > 0.0).then_some(t)
    }
}

impl Intersect for Surface {
    fn intersect(&self, ray: &Ray) -> Option<f64> {
        match self {
            Surface::Sphere(s) => s.intersect(ray),
            Surface::Plane(p) => p.intersect(ray),
        }
    }
}

/// Scan every surface in scene order and keep the closest hit.
///
/// Ties go to the surface scanned last.
pub fn nearest_hit<'a>(ray: &Ray, scene: &'a Scene) -> Option<Hit<'a>> {
    let mut closest: Option<(usize, f64)> = None;

    for (index, surface) in scene.surfaces.iter().enumerate() {
        let Some(t) = surface.intersect(ray) else {
            continue;
        };

        match closest {
            Some((_, best)) if t > best => {}
            _ => closest = Some((index, t)),
        }
    }

    closest.map(|(index, t)| Hit {
        index,
        surface: &scene.surfaces[index],
        t,
        point: ray.at(t),
    })
}

/// Whether any surface other than the one that was hit sits between `light`
/// and the hit point. The hit surface never shadows itself.
pub fn is_shadowed(hit: &Hit<'_>, light: &Light, scene: &Scene) -> bool {
    let light_vector = hit.point - light.position;
    let dist_to_light = light_vector.norm();
    let ray = Ray::new(light.position, light_vector / dist_to_light);

    scene
        .surfaces
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != hit.index)
        .any(|(_, surface)| matches!(surface.intersect(&ray), Some(t) if t <= dist_to_light))
}
