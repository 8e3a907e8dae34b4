//! Scene definitions: surfaces, lights and the view plane

mod loader;

use std::fmt;

use crate::math::{Color, Vec3};

pub use loader::{load_scene, parse_scene, SceneError};

/// Surface material. Reflectivity, refractivity and ior are carried through
/// from the scene file but the lighting model does not read them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub diffuse_color: Color,
    pub specular_color: Color,
    pub reflectivity: f64,
    pub refractivity: f64,
    pub ior: f64,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse_color: Color::zeros(),
            specular_color: Color::zeros(),
            reflectivity: 0.0,
            refractivity: 0.0,
            ior: 0.0,
        }
    }
}

impl Material {
    pub fn diffuse(diffuse_color: Color) -> Self {
        Self {
            diffuse_color,
            ..Default::default()
        }
    }

    pub fn with_specular(mut self, specular_color: Color) -> Self {
        self.specular_color = specular_color;
        self
    }
}

/// Sphere primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f64,
    pub material: Material,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f64, material: Material) -> Self {
        Self { center, radius, material }
    }
}

/// Infinite plane through `point`. The normal does not have to be unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub point: Vec3,
    pub normal: Vec3,
    pub material: Material,
}

impl Plane {
    pub fn new(point: Vec3, normal: Vec3, material: Material) -> Self {
        Self { point, normal, material }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Surface {
    Sphere(Sphere),
    Plane(Plane),
}

impl Surface {
    pub fn material(&self) -> &Material {
        match self {
            Surface::Sphere(s) => &s.material,
            Surface::Plane(p) => &p.material,
        }
    }

    pub fn position(&self) -> Vec3 {
        match self {
            Surface::Sphere(s) => s.center,
            Surface::Plane(p) => p.point,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Surface::Sphere(_) => "sphere",
            Surface::Plane(_) => "plane",
        }
    }
}

impl From<Sphere> for Surface {
    fn from(sphere: Sphere) -> Self {
        Surface::Sphere(sphere)
    }
}

impl From<Plane> for Surface {
    fn from(plane: Plane) -> Self {
        Surface::Plane(plane)
    }
}

/// Coefficients of `1 / (a2·d² + a1·d + a0)`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RadialAttenuation {
    pub a2: f64,
    pub a1: f64,
    pub a0: f64,
}

impl RadialAttenuation {
    pub fn new(a2: f64, a1: f64, a0: f64) -> Self {
        Self { a2, a1, a0 }
    }

    /// Attenuation at distance `d`. A zero denominator yields infinity.
    pub fn factor(&self, d: f64) -> f64 {
        1.0 / (self.a2 * d * d + self.a1 * d + self.a0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Point,
    Spot {
        direction: Vec3,
        theta: f64,
        /// Stored falloff exponent; shading uses a fixed exponent of 1.
        angular_a0: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub color: Color,
    pub position: Vec3,
    pub radial: RadialAttenuation,
    pub kind: LightKind,
}

impl Light {
    pub fn point(position: Vec3, color: Color, radial: RadialAttenuation) -> Self {
        Self {
            color,
            position,
            radial,
            kind: LightKind::Point,
        }
    }

    pub fn spot(
        position: Vec3,
        color: Color,
        radial: RadialAttenuation,
        direction: Vec3,
        theta: f64,
        angular_a0: f64,
    ) -> Self {
        Self {
            color,
            position,
            radial,
            kind: LightKind::Spot {
                direction,
                theta,
                angular_a0,
            },
        }
    }

    pub fn is_spot(&self) -> bool {
        matches!(self.kind, LightKind::Spot { .. })
    }
}

/// View plane size in world units, centered on the z axis at z = 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
        }
    }
}

/// Everything the renderer reads. Built once and never mutated while shading.
///
/// Surface order matters: equal-distance hits resolve to the later surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub surfaces: Vec<Surface>,
    pub lights: Vec<Light>,
    pub viewport: Viewport,
}

impl Scene {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            surfaces: Vec::new(),
            lights: Vec::new(),
            viewport,
        }
    }

    pub fn with_surface(mut self, surface: impl Into<Surface>) -> Self {
        self.surfaces.push(surface.into());
        self
    }

    pub fn with_light(mut self, light: Light) -> Self {
        self.lights.push(light);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty() && self.lights.is_empty()
    }
}

struct V<'a>(&'a Vec3);

impl fmt::Display for V<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.6}, {:.6}, {:.6}]", self.0.x, self.0.y, self.0.z)
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Viewport: {} x {} (world units)",
            self.viewport.width, self.viewport.height
        )?;

        writeln!(f, "Surfaces ({}):", self.surfaces.len())?;
        for (i, surface) in self.surfaces.iter().enumerate() {
            let material = surface.material();
            writeln!(f, "  [{}] {}", i, surface.kind())?;
            writeln!(f, "      position:       {}", V(&surface.position()))?;
            match surface {
                Surface::Sphere(s) => writeln!(f, "      radius:         {:.6}", s.radius)?,
                Surface::Plane(p) => writeln!(f, "      normal:         {}", V(&p.normal))?,
            }
            writeln!(f, "      diffuse color:  {}", V(&material.diffuse_color))?;
            writeln!(f, "      specular color: {}", V(&material.specular_color))?;
            if material.reflectivity != 0.0 || material.refractivity != 0.0 || material.ior != 0.0 {
                writeln!(
                    f,
                    "      reflectivity {:.6}, refractivity {:.6}, ior {:.6}",
                    material.reflectivity, material.refractivity, material.ior
                )?;
            }
        }

        writeln!(f, "Lights ({}):", self.lights.len())?;
        for (i, light) in self.lights.iter().enumerate() {
            let kind = if light.is_spot() { "spotlight" } else { "pointlight" };
            writeln!(f, "  [{}] {}", i, kind)?;
            writeln!(f, "      color:          {}", V(&light.color))?;
            writeln!(f, "      position:       {}", V(&light.position))?;
            writeln!(
                f,
                "      radial a2/a1/a0: {:.6} / {:.6} / {:.6}",
                light.radial.a2, light.radial.a1, light.radial.a0
            )?;
            if let LightKind::Spot {
                direction,
                theta,
                angular_a0,
            } = light.kind
            {
                writeln!(f, "      direction:      {}", V(&direction))?;
                writeln!(f, "      theta {:.6}, angular-a0 {:.6}", theta, angular_a0)?;
            }
        }

        Ok(())
    }
}
