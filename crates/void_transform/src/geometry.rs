//! Pick geometry: rays, planes and box frustums.
//!
//! Picking works on bounding spheres, so only the tests the tools need are
//! provided here.

use glam::Vec3;

use crate::EPSILON;

/// Ray with a normalized direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray. The direction is normalized.
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    #[inline]
    pub fn from_points(start: Vec3, end: Vec3) -> Self {
        Self::new(start, end - start)
    }

    /// Point at distance `t` along the ray
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance along the ray to the plane, if it is hit in front of the origin.
    pub fn intersect_plane(&self, plane: &Plane) -> Option<f32> {
        let denom = plane.normal.dot(self.direction);
        if denom.abs() < EPSILON {
            return None;
        }
        let t = -plane.distance_to_point(self.origin) / denom;
        (t >= 0.0).then_some(t)
    }

    /// Nearest non-negative hit distance against a sphere.
    ///
    /// An origin inside the sphere reports the exit distance.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;
        let discriminant = b * b - c;

        if discriminant < 0.0 {
            return None;
        }

        let sqrt_d = discriminant.sqrt();
        let t0 = -b - sqrt_d;
        let t1 = -b + sqrt_d;

        if t0 >= 0.0 {
            Some(t0)
        } else if t1 >= 0.0 {
            Some(t1)
        } else {
            None
        }
    }
}

/// Plane in 3D space (`normal . p + distance = 0`)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    /// Unit normal
    pub normal: Vec3,
    pub distance: f32,
}

impl Plane {
    /// Create a plane, normalizing the normal and distance together.
    pub fn new(normal: Vec3, distance: f32) -> Self {
        let len = normal.length();
        if len > EPSILON {
            Self {
                normal: normal / len,
                distance: distance / len,
            }
        } else {
            Self::default()
        }
    }

    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        let normal = normal.normalize_or_zero();
        Self {
            normal,
            distance: -normal.dot(point),
        }
    }

    /// Plane through three points (counter-clockwise winding faces the normal)
    pub fn from_points(p0: Vec3, p1: Vec3, p2: Vec3) -> Self {
        Self::from_point_normal(p0, (p1 - p0).cross(p2 - p0))
    }

    /// Signed distance. Positive on the side the normal points to.
    #[inline]
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }

    #[inline]
    pub fn is_in_front(&self, point: Vec3) -> bool {
        self.distance_to_point(point) > 0.0
    }

    /// Same plane facing the other way
    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            distance: -self.distance,
        }
    }
}

impl Default for Plane {
    fn default() -> Self {
        Self {
            normal: Vec3::Y,
            distance: 0.0,
        }
    }
}

/// Convex volume bounded by six planes with inward normals.
///
/// Plane order is left, right, bottom, top, near, far.
#[derive(Clone, Debug)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    pub const LEFT: usize = 0;
    pub const RIGHT: usize = 1;
    pub const BOTTOM: usize = 2;
    pub const TOP: usize = 3;
    pub const NEAR: usize = 4;
    pub const FAR: usize = 5;

    /// Build a frustum from the four near and four far corners of a
    /// screen rectangle.
    ///
    /// Corners are ordered `min`, `(max.x, min.y)`, `max`, `(min.x, max.y)`
    /// on both caps. Normals are oriented toward the centroid, so the
    /// winding of the rectangle does not matter.
    pub fn from_corners(near: [Vec3; 4], far: [Vec3; 4]) -> Self {
        let centroid = (near.iter().chain(far.iter()).copied().sum::<Vec3>()) / 8.0;

        let inward = |plane: Plane| {
            if plane.distance_to_point(centroid) < 0.0 {
                plane.flipped()
            } else {
                plane
            }
        };

        // Each side plane passes through one near edge and the matching far corner.
        let left = inward(Plane::from_points(near[0], near[3], far[0]));
        let right = inward(Plane::from_points(near[1], near[2], far[1]));
        let bottom = inward(Plane::from_points(near[0], near[1], far[0]));
        let top = inward(Plane::from_points(near[3], near[2], far[3]));
        let near_plane = inward(Plane::from_points(near[0], near[1], near[2]));
        let far_plane = inward(Plane::from_points(far[0], far[1], far[2]));

        Self {
            planes: [left, right, bottom, top, near_plane, far_plane],
        }
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|p| p.distance_to_point(point) >= 0.0)
    }

    /// Whether a sphere is at least partly inside.
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.planes.iter().all(|p| p.distance_to_point(center) >= -radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Frustum {
        let near = [
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
        ];
        let far = near.map(|c| c - Vec3::Z * 10.0);
        Frustum::from_corners(near, far)
    }

    #[test]
    fn test_ray_sphere_hit_and_miss() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -2.0));
        let t = ray.intersect_sphere(Vec3::ZERO, 1.0).unwrap();
        assert!((t - 9.0).abs() < 1e-5);
        assert!(ray.intersect_sphere(Vec3::new(5.0, 0.0, 0.0), 1.0).is_none());
    }

    #[test]
    fn test_ray_sphere_behind_origin() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::Z);
        assert!(ray.intersect_sphere(Vec3::ZERO, 1.0).is_none());
    }

    #[test]
    fn test_ray_plane() {
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), -Vec3::Y);
        let plane = Plane::from_point_normal(Vec3::ZERO, Vec3::Y);
        assert_eq!(ray.intersect_plane(&plane), Some(5.0));

        let parallel = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::X);
        assert_eq!(parallel.intersect_plane(&plane), None);
    }

    #[test]
    fn test_frustum_box_contains() {
        let f = unit_box();
        assert!(f.contains_point(Vec3::new(0.0, 0.0, -5.0)));
        assert!(f.contains_point(Vec3::new(0.9, -0.9, -0.1)));
        assert!(!f.contains_point(Vec3::new(2.0, 0.0, -5.0)));
        assert!(!f.contains_point(Vec3::new(0.0, 0.0, 1.0)));
        assert!(!f.contains_point(Vec3::new(0.0, 0.0, -11.0)));
    }

    #[test]
    fn test_frustum_sphere_overlap() {
        let f = unit_box();
        assert!(f.intersects_sphere(Vec3::new(1.5, 0.0, -5.0), 1.0));
        assert!(!f.intersects_sphere(Vec3::new(3.0, 0.0, -5.0), 1.0));
    }

    #[test]
    fn test_frustum_winding_independent() {
        let near = [
            Vec3::new(-1.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(-1.0, -1.0, 0.0),
        ];
        let far = near.map(|c| c - Vec3::Z * 10.0);
        let f = Frustum::from_corners(near, far);
        assert!(f.contains_point(Vec3::new(0.0, 0.0, -5.0)));
    }
}
