//! Phong shading and the per-pixel raster loop

use std::time::Instant;

use rayon::prelude::*;

use crate::config::RenderSettings;
use crate::intersect::{is_shadowed, nearest_hit, Hit, Ray};
use crate::math::{mirror, unit, Color, Vec3};
use crate::scene::{Light, LightKind, Scene, Viewport};
use crate::{DEFAULT_RECURSION_DEPTH, MAX_RECURSION_DEPTH, SPECULAR_EXPONENT};

/// Color returned for rays that hit nothing
pub const BACKGROUND: Color = Color::new(0.0, 0.0, 0.0);

/// Rendered colors, top row first, left to right within a row
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::zeros(); width * height],
        }
    }

    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Color>) -> Self {
        assert_eq!(pixels.len(), width * height, "pixel count does not match dimensions");
        Self { width, height, pixels }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Pixel at `y` rows from the top and `x` columns from the left
    pub fn get(&self, x: usize, y: usize) -> Color {
        self.pixels[y * self.width + x]
    }

    fn gradient_char(gradient: &[char], color: &Color) -> char {
        let luminance = 0.299 * color.x + 0.587 * color.y + 0.114 * color.z;
        let luminance = if luminance.is_nan() { 0.0 } else { luminance.clamp(0.0, 1.0) };

        let index = ((luminance * (gradient.len() - 1) as f64).round() as usize).min(gradient.len() - 1);
        gradient[index]
    }

    /// Convert to a grayscale character image, one character per pixel
    pub fn to_ascii(&self) -> String {
        let gradient_chars: Vec<char> = crate::ASCII_GRADIENT.chars().collect();
        let mut result = String::with_capacity(self.width * self.height + self.height);

        for y in 0..self.height {
            for x in 0..self.width {
                result.push(Self::gradient_char(&gradient_chars, &self.get(x, y)));
            }
            result.push('\n');
        }

        result
    }

    /// Convert to a character image with ANSI 24-bit color codes
    pub fn to_ascii_colored(&self) -> String {
        let gradient_chars: Vec<char> = crate::ASCII_GRADIENT.chars().collect();
        let mut result = String::with_capacity(self.width * self.height * 20 + self.height * 10);

        for y in 0..self.height {
            for x in 0..self.width {
                let color = self.get(x, y);
                let [r, g, b] = crate::ppm::to_rgb8(&color);

                // \x1b[38;2;R;G;Bm
                result.push_str(&format!(
                    "\x1b[38;2;{};{};{}m{}",
                    r,
                    g,
                    b,
                    Self::gradient_char(&gradient_chars, &color)
                ));
            }
            result.push_str("\x1b[0m\n");
        }

        result
    }
}

/// Casts one ray per pixel through the view plane and shades it
pub struct Renderer {
    width: usize,
    height: usize,
    framebuffer: Framebuffer,
    recursion_depth: u32,
    parallel: bool,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            framebuffer: Framebuffer::new(width, height),
            recursion_depth: DEFAULT_RECURSION_DEPTH,
            parallel: true,
        }
    }

    pub fn with_settings(self, settings: &RenderSettings) -> Self {
        self.with_recursion_depth(settings.recursion_depth)
            .with_parallel(settings.parallel)
    }

    /// Depth budget per primary ray, capped at `MAX_RECURSION_DEPTH`
    pub fn with_recursion_depth(mut self, depth: u32) -> Self {
        self.recursion_depth = depth.min(MAX_RECURSION_DEPTH);
        self
    }

    pub fn recursion_depth(&self) -> u32 {
        self.recursion_depth
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn into_framebuffer(self) -> Framebuffer {
        self.framebuffer
    }

    /// Render the scene into the framebuffer.
    ///
    /// Rows are visited from the top of the view plane down, so buffer index
    /// 0 is the top-left pixel. The parallel path collects in index order and
    /// produces the same buffer as the sequential one.
    pub fn render(&mut self, scene: &Scene) {
        let width = self.width;
        let height = self.height;
        let depth = self.recursion_depth;
        let viewport = scene.viewport;
        let started = Instant::now();

        tracing::info!(
            width,
            height,
            surfaces = scene.surfaces.len(),
            lights = scene.lights.len(),
            parallel = self.parallel,
            "Rendering"
        );

        let pixel = |index: usize| {
            let row = height - 1 - index / width;
            let column = index % width;
            let ray = primary_ray(&viewport, width, height, row, column);
            let color = trace_ray(&ray, scene, depth);
            tracing::trace!(index, r = color.x, g = color.y, b = color.z, "pixel");
            color
        };

        let pixels: Vec<Color> = if self.parallel {
            (0..width * height).into_par_iter().map(pixel).collect()
        } else {
            (0..width * height).map(pixel).collect()
        };

        self.framebuffer = Framebuffer::from_pixels(width, height, pixels);

        tracing::info!(elapsed_ms = started.elapsed().as_millis() as u64, "Render finished");
    }
}

/// Unit ray from the camera through the center of pixel (`row`, `column`).
///
/// Row 0 is the bottom of the view plane, which sits at z = 1.
pub fn primary_ray(viewport: &Viewport, width: usize, height: usize, row: usize, column: usize) -> Ray {
    let x = -viewport.width / 2.0 + (viewport.width / width as f64) * (column as f64 + 0.5);
    let y = -viewport.height / 2.0 + (viewport.height / height as f64) * (row as f64 + 0.5);
    Ray::from_camera(unit(&Vec3::new(x, y, 1.0)))
}

/// Shade a ray with `depth` levels of budget left.
///
/// Depth 0 is black. Otherwise the nearest hit is lit by every light it can
/// see. The secondary trace at `depth - 1` does not contribute to the color.
/// Budgets above `MAX_RECURSION_DEPTH` are capped.
pub fn trace_ray(ray: &Ray, scene: &Scene, depth: u32) -> Color {
    let depth = depth.min(MAX_RECURSION_DEPTH);
    if depth == 0 {
        return Color::zeros();
    }

    let Some(hit) = nearest_hit(ray, scene) else {
        return BACKGROUND;
    };

    let mut color = Color::zeros();
    for light in &scene.lights {
        if !is_shadowed(&hit, light, scene) {
            color += illuminate(&hit, light);
        }
    }

    let _ = trace_ray(ray, scene, depth - 1);

    color
}

/// Angular falloff for spotlights with a nonzero cutoff, 1 for everything else.
///
/// Uses an exponent of 1 regardless of the light's stored `angular_a0`.
pub fn angular_attenuation(light: &Light, light_dir: &Vec3) -> f64 {
    match light.kind {
        LightKind::Spot { direction, theta, .. } if theta != 0.0 => {
            let v_dot_l = light_dir.dot(&direction);
            if v_dot_l < theta {
                v_dot_l
            } else {
                0.0
            }
        }
        _ => 1.0,
    }
}

/// Diffuse + specular contribution of one unoccluded light at a hit
pub fn illuminate(hit: &Hit<'_>, light: &Light) -> Color {
    let material = hit.surface.material();
    let light_vector = hit.point - light.position;
    let dist_to_light = light_vector.norm();
    let light_dir = light_vector / dist_to_light;
    let normal = hit.normal();

    let f_rad = light.radial.factor(dist_to_light);
    let f_ang = angular_attenuation(light, &light_dir);

    let diffuse = (-light_dir.dot(&normal)).max(0.0);

    let view_dir = unit(&-hit.point);
    let reflected = mirror(&light_vector, &normal);
    let specular = reflected.dot(&view_dir).max(0.0).powi(SPECULAR_EXPONENT);

    let diffuse = light.color.component_mul(&material.diffuse_color) * diffuse;
    let specular = light.color.component_mul(&material.specular_color) * specular;

    (diffuse + specular) * (f_ang * f_rad)
}
