//! Ray caster for sphere/plane scenes
//!
//! Casts one ray per pixel from a camera fixed at the world origin looking
//! down +z, shades the nearest hit with Phong diffuse + specular terms and
//! hard shadows, and writes the result as a PPM image. A character-art
//! preview can be printed to the terminal.

pub mod config;
pub mod intersect;
pub mod math;
pub mod ppm;
pub mod renderer;
pub mod scene;
pub mod terminal;

pub use config::RenderConfig;
pub use renderer::{Framebuffer, Renderer};
pub use scene::{load_scene, parse_scene, Scene};
pub use terminal::TerminalPreview;

/// Maximum shading depth budget
pub const MAX_RECURSION_DEPTH: u32 = 16;

/// Default shading depth budget
pub const DEFAULT_RECURSION_DEPTH: u32 = 1;

/// Phong exponent for the specular term
pub const SPECULAR_EXPONENT: i32 = 50;

/// UTF-8 character gradient from dark to light (extended Unicode block characters)
pub const ASCII_GRADIENT: &str = " ·∙:;░▒▓█";
