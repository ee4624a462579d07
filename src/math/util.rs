use super::{Point2d, Point3d, Vector2d, Vector3d};

/// Rotates a vector 90 degrees anti-clockwise.
pub fn rot90(vec: Vector2d) -> Vector2d {
    Vector2d::new(-vec.y, vec.x)
}

/// Drops the z component of a point.
pub fn planar(point: Point3d) -> Point2d {
    Point2d::new(point.x, point.y)
}

/// Drops the z component of a vector.
pub fn planar_vec(vec: Vector3d) -> Vector2d {
    Vector2d::new(vec.x, vec.y)
}

/// A unit vector in the xy-plane pointing along `yaw`.
pub fn heading(yaw: f64) -> Vector2d {
    Vector2d::new(yaw.cos(), yaw.sin())
}

/// The sign of the z component of `a x b`: 1 when `b` is anti-clockwise
/// (to the left) of `a`, -1 when clockwise, 0 when collinear.
pub fn cross_sign(a: Vector2d, b: Vector2d) -> f64 {
    let z = a.perp_dot(b);
    if z > 0.0 {
        1.0
    } else if z < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn cross_sign_is_left_positive() {
        let forward = Vector2d::new(1.0, 0.0);
        assert_eq!(cross_sign(forward, Vector2d::new(1.0, 1.0)), 1.0);
        assert_eq!(cross_sign(forward, Vector2d::new(1.0, -1.0)), -1.0);
        assert_eq!(cross_sign(forward, Vector2d::new(3.0, 0.0)), 0.0);
    }

    #[test]
    fn rot90_points_left() {
        let left = rot90(Vector2d::new(1.0, 0.0));
        assert_approx_eq!(left.x, 0.0);
        assert_approx_eq!(left.y, 1.0);
    }
}
