use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::{Light, Material, Plane, RadialAttenuation, Scene, Sphere, Viewport};
use crate::math::{Color, Vec3};

/// Longest string literal the scene format allows
const MAX_STRING_LEN: usize = 128;

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("Scene file not found: {0}")]
    NotFound(String),

    #[error("Failed to read scene file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed scene description: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("Invalid string on line {line}: {reason}")]
    InvalidString { line: usize, reason: &'static str },
}

impl SceneError {
    /// Line the error was detected on, when known
    pub fn line(&self) -> Option<usize> {
        match self {
            SceneError::Syntax(e) => Some(e.line()),
            SceneError::InvalidString { line, .. } => Some(*line),
            _ => None,
        }
    }
}

type Unknown = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Entry {
    Camera(CameraEntry),
    Sphere(SphereEntry),
    Plane(PlaneEntry),
    Light(LightEntry),
}

#[derive(Debug, Deserialize)]
struct CameraEntry {
    width: f64,
    height: f64,
    #[serde(flatten)]
    unknown: Unknown,
}

#[derive(Debug, Deserialize)]
struct SphereEntry {
    position: [f64; 3],
    radius: f64,
    #[serde(default)]
    diffuse_color: [f64; 3],
    #[serde(default)]
    specular_color: [f64; 3],
    #[serde(default)]
    reflectivity: f64,
    #[serde(default)]
    refractivity: f64,
    #[serde(default)]
    ior: f64,
    #[serde(flatten)]
    unknown: Unknown,
}

#[derive(Debug, Deserialize)]
struct PlaneEntry {
    position: [f64; 3],
    normal: [f64; 3],
    #[serde(default)]
    diffuse_color: [f64; 3],
    #[serde(default)]
    specular_color: [f64; 3],
    #[serde(default)]
    reflectivity: f64,
    #[serde(default)]
    refractivity: f64,
    #[serde(default)]
    ior: f64,
    #[serde(flatten)]
    unknown: Unknown,
}

#[derive(Debug, Deserialize)]
struct LightEntry {
    color: [f64; 3],
    position: [f64; 3],
    #[serde(default)]
    direction: Option<[f64; 3]>,
    #[serde(default, rename = "radial-a2")]
    radial_a2: f64,
    #[serde(default, rename = "radial-a1")]
    radial_a1: f64,
    #[serde(default, rename = "radial-a0")]
    radial_a0: f64,
    #[serde(default, rename = "angular-a0")]
    angular_a0: f64,
    #[serde(default)]
    theta: f64,
    #[serde(flatten)]
    unknown: Unknown,
}

fn vec3(v: [f64; 3]) -> Vec3 {
    Vec3::new(v[0], v[1], v[2])
}

fn material(
    diffuse_color: [f64; 3],
    specular_color: [f64; 3],
    reflectivity: f64,
    refractivity: f64,
    ior: f64,
) -> Material {
    Material {
        diffuse_color: Color::from(diffuse_color),
        specular_color: Color::from(specular_color),
        reflectivity,
        refractivity,
        ior,
    }
}

/// Names of the properties an entry did not recognize, in sorted order
fn unknown_fields(unknown: &Unknown) -> Vec<&str> {
    unknown.keys().map(String::as_str).collect()
}

fn report_unknown(kind: &str, unknown: &Unknown) {
    for key in unknown_fields(unknown) {
        tracing::warn!(object = kind, property = key, "Unknown property, ignoring");
    }
}

/// Load a scene description from a file
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<Scene, SceneError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SceneError::NotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)?;
    parse_scene(&content)
}

/// Parse a scene description held in memory
pub fn parse_scene(text: &str) -> Result<Scene, SceneError> {
    validate_strings(text)?;
    let entries: Vec<Entry> = serde_json::from_str(text)?;

    if entries.is_empty() {
        tracing::warn!("Scene description contains no objects");
    }

    let mut viewport = None;
    let mut scene = Scene::default();

    for entry in entries {
        match entry {
            Entry::Camera(c) => {
                report_unknown("camera", &c.unknown);
                viewport = Some(Viewport {
                    width: c.width,
                    height: c.height,
                });
            }
            Entry::Sphere(s) => {
                report_unknown("sphere", &s.unknown);
                let material = material(
                    s.diffuse_color,
                    s.specular_color,
                    s.reflectivity,
                    s.refractivity,
                    s.ior,
                );
                scene
                    .surfaces
                    .push(Sphere::new(vec3(s.position), s.radius, material).into());
            }
            Entry::Plane(p) => {
                report_unknown("plane", &p.unknown);
                let material = material(
                    p.diffuse_color,
                    p.specular_color,
                    p.reflectivity,
                    p.refractivity,
                    p.ior,
                );
                scene
                    .surfaces
                    .push(Plane::new(vec3(p.position), vec3(p.normal), material).into());
            }
            Entry::Light(l) => {
                report_unknown("light", &l.unknown);
                let radial = RadialAttenuation::new(l.radial_a2, l.radial_a1, l.radial_a0);
                let light = match l.direction {
                    Some(direction) => Light::spot(
                        vec3(l.position),
                        Color::from(l.color),
                        radial,
                        vec3(direction),
                        l.theta,
                        l.angular_a0,
                    ),
                    None => Light::point(vec3(l.position), Color::from(l.color), radial),
                };
                scene.lights.push(light);
            }
        }
    }

    match viewport {
        Some(v) => scene.viewport = v,
        None => tracing::warn!(
            width = scene.viewport.width,
            height = scene.viewport.height,
            "No camera object in scene, using default view plane"
        ),
    }

    Ok(scene)
}

/// Reject string literals the scene format does not allow: escapes,
/// non-printable or non-ASCII characters, and anything over 128 characters.
fn validate_strings(text: &str) -> Result<(), SceneError> {
    let mut line = 1;
    let mut in_string = false;
    let mut len = 0;

    for c in text.chars() {
        if in_string {
            match c {
                '"' => in_string = false,
                '\\' => {
                    return Err(SceneError::InvalidString {
                        line,
                        reason: "escape sequences are not supported",
                    })
                }
                ' '..='~' => {
                    len += 1;
                    if len > MAX_STRING_LEN {
                        return Err(SceneError::InvalidString {
                            line,
                            reason: "strings longer than 128 characters are not supported",
                        });
                    }
                }
                _ => {
                    return Err(SceneError::InvalidString {
                        line,
                        reason: "strings may contain only printable ascii characters",
                    })
                }
            }
        } else if c == '"' {
            in_string = true;
            len = 0;
        }

        if c == '\n' {
            line += 1;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{LightKind, Surface};

    const SCENE: &str = r#"[
  {"type": "camera", "width": 2.0, "height": 2.0},
  {"type": "sphere", "position": [0, 1, 5], "radius": 2,
   "diffuse_color": [1, 0, 0], "specular_color": [1, 1, 1]},
  {"type": "plane", "position": [0, -1, 0], "normal": [0, 1, 0],
   "diffuse_color": [0, 0, 1], "reflectivity": 0.5, "ior": 1.3},
  {"type": "light", "color": [2, 2, 2], "position": [1, 3, 0],
   "radial-a2": 0.125, "radial-a1": 0.125, "radial-a0": 0.125},
  {"type": "light", "color": [1, 1, 1], "position": [0, 5, 5],
   "direction": [0, -1, 0], "theta": 0.5, "angular-a0": 2}
]"#;

    #[test]
    fn test_parse_full_scene() {
        let scene = parse_scene(SCENE).unwrap();

        assert_eq!(scene.viewport, Viewport { width: 2.0, height: 2.0 });
        assert_eq!(scene.surfaces.len(), 2);
        assert_eq!(scene.lights.len(), 2);

        match &scene.surfaces[0] {
            Surface::Sphere(s) => {
                assert_eq!(s.center, Vec3::new(0.0, 1.0, 5.0));
                assert_eq!(s.radius, 2.0);
                assert_eq!(s.material.diffuse_color, Color::new(1.0, 0.0, 0.0));
                assert_eq!(s.material.specular_color, Color::new(1.0, 1.0, 1.0));
            }
            other => panic!("expected sphere, got {:?}", other),
        }

        match &scene.surfaces[1] {
            Surface::Plane(p) => {
                assert_eq!(p.normal, Vec3::new(0.0, 1.0, 0.0));
                assert_eq!(p.material.specular_color, Color::zeros());
                assert_eq!(p.material.reflectivity, 0.5);
                assert_eq!(p.material.ior, 1.3);
            }
            other => panic!("expected plane, got {:?}", other),
        }
    }

    #[test]
    fn test_light_with_direction_is_spot() {
        let scene = parse_scene(SCENE).unwrap();

        assert_eq!(scene.lights[0].kind, LightKind::Point);
        assert_eq!(scene.lights[0].radial, RadialAttenuation::new(0.125, 0.125, 0.125));

        match scene.lights[1].kind {
            LightKind::Spot {
                direction,
                theta,
                angular_a0,
            } => {
                assert_eq!(direction, Vec3::new(0.0, -1.0, 0.0));
                assert_eq!(theta, 0.5);
                assert_eq!(angular_a0, 2.0);
            }
            LightKind::Point => panic!("light with direction should be a spotlight"),
        }
    }

    #[test]
    fn test_unknown_property_is_skipped() {
        let text = r#"[
  {"type": "camera", "width": 1, "height": 1, "fov": 60},
  {"type": "sphere", "position": [0, 0, 5], "radius": 1, "shininess": [1, 2, 3]}
]"#;
        let scene = parse_scene(text).unwrap();
        assert_eq!(scene.surfaces.len(), 1);
    }

    #[test]
    fn test_unknown_properties_are_collected() {
        let text = r#"[
  {"type": "camera", "width": 1, "height": 1, "fov": 60},
  {"type": "sphere", "position": [0, 0, 5], "radius": 1, "shininess": [1, 2, 3], "alpha": 1},
  {"type": "light", "color": [1, 1, 1], "position": [0, 0, 0]}
]"#;
        let entries: Vec<Entry> = serde_json::from_str(text).unwrap();

        let fields: Vec<Vec<&str>> = entries
            .iter()
            .map(|entry| match entry {
                Entry::Camera(c) => unknown_fields(&c.unknown),
                Entry::Sphere(s) => unknown_fields(&s.unknown),
                Entry::Plane(p) => unknown_fields(&p.unknown),
                Entry::Light(l) => unknown_fields(&l.unknown),
            })
            .collect();

        assert_eq!(fields[0], ["fov"]);
        assert_eq!(fields[1], ["alpha", "shininess"]);
        assert!(fields[2].is_empty());
    }

    #[test]
    fn test_unknown_type_is_fatal() {
        let text = "[\n  {\"type\": \"cube\", \"position\": [0, 0, 0]}\n]";
        let err = parse_scene(text).unwrap_err();
        assert!(matches!(err, SceneError::Syntax(_)));
        assert!(err.to_string().contains("cube"));
        assert!(err.line().is_some());
    }

    #[test]
    fn test_malformed_syntax_reports_line() {
        let text = "[\n  {\"type\": \"camera\", \"width\": 1, \"height\": 1},\n  {\"type\": \"sphere\" \"radius\": 1}\n]";
        let err = parse_scene(text).unwrap_err();
        assert!(matches!(err, SceneError::Syntax(_)));
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn test_missing_geometry_is_fatal() {
        let err = parse_scene(r#"[{"type": "sphere", "position": [0, 0, 1]}]"#).unwrap_err();
        assert!(err.to_string().contains("radius"));
    }

    #[test]
    fn test_escape_sequences_rejected() {
        let text = "[\n  {\"type\": \"cam\\u0065ra\", \"width\": 1, \"height\": 1}\n]";
        let err = parse_scene(text).unwrap_err();
        assert!(matches!(err, SceneError::InvalidString { line: 2, .. }));
    }

    #[test]
    fn test_long_strings_rejected() {
        let key = "k".repeat(MAX_STRING_LEN + 1);
        let text = format!("[{{\"type\": \"camera\", \"{}\": 1}}]", key);
        let err = parse_scene(&text).unwrap_err();
        assert!(matches!(err, SceneError::InvalidString { line: 1, .. }));

        let key = "k".repeat(MAX_STRING_LEN);
        let text = format!(
            "[{{\"type\": \"camera\", \"width\": 1, \"height\": 1, \"{}\": 1}}]",
            key
        );
        assert!(parse_scene(&text).is_ok());
    }

    #[test]
    fn test_non_ascii_rejected() {
        let err = parse_scene("[{\"type\": \"sphère\"}]").unwrap_err();
        assert!(matches!(err, SceneError::InvalidString { .. }));
    }

    #[test]
    fn test_empty_scene() {
        let scene = parse_scene("  [ ]  ").unwrap();
        assert!(scene.is_empty());
        assert_eq!(scene.viewport, Viewport::default());
    }

    #[test]
    fn test_last_camera_wins() {
        let text = r#"[
  {"type": "camera", "width": 1, "height": 1},
  {"type": "camera", "width": 4, "height": 3}
]"#;
        let scene = parse_scene(text).unwrap();
        assert_eq!(scene.viewport, Viewport { width: 4.0, height: 3.0 });
    }

    #[test]
    fn test_load_missing_scene() {
        let result = load_scene("/nonexistent/scene.json");
        assert!(matches!(result.unwrap_err(), SceneError::NotFound(_)));
    }
}
