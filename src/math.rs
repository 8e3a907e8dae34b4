//! Vector helpers on top of nalgebra
//!
//! Addition, subtraction, scaling, dot products and magnitudes come straight
//! from `nalgebra::Vector3`. The helpers here cover the few operations whose
//! semantics the shader depends on.

use nalgebra::Vector3;

/// 3-component vector in world space
pub type Vec3 = Vector3<f64>;

/// Linear RGB color, unbounded while lighting accumulates
pub type Color = Vector3<f64>;

/// Unit vector in the direction of `v`.
///
/// A zero vector divides by zero and yields NaN components.
pub fn unit(v: &Vec3) -> Vec3 {
    v / v.norm()
}

/// Euclidean distance between two points
pub fn distance(p: &Vec3, q: &Vec3) -> f64 {
    (p - q).norm()
}

/// Mirror `incident` about `normal`.
///
/// Both inputs are normalized first. Only light arriving at the front of the
/// surface (`normal · incident < 0`) is reflected; anything else returns the
/// zero vector.
pub fn mirror(incident: &Vec3, normal: &Vec3) -> Vec3 {
    let incident = unit(incident);
    let normal = unit(normal);
    let d = normal.dot(&incident);
    if d < 0.0 {
        unit(&(incident - normal * (2.0 * d)))
    } else {
        Vec3::zeros()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_has_magnitude_one() {
        for v in [
            Vec3::new(3.0, 4.0, 0.0),
            Vec3::new(-1.0, 2.0, -7.5),
            Vec3::new(0.0, 0.0, 1e-3),
            Vec3::new(1e6, -1e6, 5.0),
        ] {
            assert!((unit(&v).norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_unit_of_zero_is_nan() {
        let u = unit(&Vec3::zeros());
        assert!(u.x.is_nan() && u.y.is_nan() && u.z.is_nan());
    }

    #[test]
    fn test_distance() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        let q = Vec3::new(4.0, 6.0, 3.0);
        assert!((distance(&p, &q) - 5.0).abs() < 1e-12);
        assert_eq!(distance(&p, &p), 0.0);
    }

    #[test]
    fn test_mirror_front_facing() {
        let incident = Vec3::new(1.0, -1.0, 0.0);
        let normal = Vec3::new(0.0, 1.0, 0.0);
        let r = mirror(&incident, &normal);
        let expected = unit(&Vec3::new(1.0, 1.0, 0.0));
        assert!((r - expected).norm() < 1e-12);
    }

    #[test]
    fn test_mirror_normalizes_inputs() {
        let r = mirror(&Vec3::new(0.0, -10.0, 0.0), &Vec3::new(0.0, 3.0, 0.0));
        assert!((r - Vec3::new(0.0, 1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_mirror_back_facing_is_zero() {
        let normal = Vec3::new(0.0, 1.0, 0.0);
        assert_eq!(mirror(&Vec3::new(1.0, 1.0, 0.0), &normal), Vec3::zeros());
        // Grazing incidence counts as back-facing
        assert_eq!(mirror(&Vec3::new(1.0, 0.0, 0.0), &normal), Vec3::zeros());
    }
}
