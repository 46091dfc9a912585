//! Matrix composition and decomposition.
//!
//! Every node transform is stored as translation / orientation / scale and
//! composed in the order orientation, then scale, then translation
//! (`T * R * S`). Decomposition works on arbitrary affine matrices: scale
//! comes from the column magnitudes first, rotation from the remaining
//! columns after Gram-Schmidt orthonormalization, so skewed or
//! non-uniformly scaled bases still produce a unit quaternion.

use glam::{Mat3, Mat4, Quat, Vec3};

use crate::error::TransformError;
use crate::space::TransformSpace;
use crate::EPSILON;

/// Translation, orientation and scale extracted from an affine matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decomposed {
    pub translation: Vec3,
    pub orientation: Quat,
    pub scale: Vec3,
}

impl Decomposed {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        orientation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Recompose into a matrix.
    #[inline]
    pub fn to_matrix(&self) -> Mat4 {
        compose(self.translation, self.orientation, self.scale)
    }
}

impl Default for Decomposed {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Build `T * R * S`.
#[inline]
pub fn compose(translation: Vec3, orientation: Quat, scale: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale, orientation, translation)
}

/// Split an affine matrix into translation, orientation and scale.
pub fn decompose(m: &Mat4) -> Decomposed {
    let (orientation, scale) = decompose_basis(&Mat3::from_mat4(*m));
    Decomposed {
        translation: m.w_axis.truncate(),
        orientation,
        scale,
    }
}

/// Split a 3x3 basis into orientation and scale.
///
/// A mirrored basis (negative determinant) is reported as a negative X scale.
pub fn decompose_basis(basis: &Mat3) -> (Quat, Vec3) {
    let c0 = basis.x_axis;
    let c1 = basis.y_axis;
    let c2 = basis.z_axis;

    let mut scale = Vec3::new(c0.length(), c1.length(), c2.length());

    let mut x = unit(c0)
        .or_else(|| unit(c1.cross(c2)))
        .unwrap_or(Vec3::X);
    let y = unit(c1 - x * x.dot(c1))
        .or_else(|| unit(c2.cross(x)))
        .unwrap_or_else(|| x.any_orthonormal_vector());

    if basis.determinant() < 0.0 {
        scale.x = -scale.x;
        x = -x;
    }
    let z = x.cross(y);

    let orientation = Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize();
    (orientation, scale)
}

/// Parent transform as seen by a child with the given inheritance flags.
///
/// `inherit_only_translate` keeps only the translation column. Otherwise,
/// when `inherit_scale` is false, each basis column is re-normalized so
/// rotation survives and scale does not.
pub fn effective_parent(parent_world: Mat4, inherit_only_translate: bool, inherit_scale: bool) -> Mat4 {
    if inherit_only_translate {
        return Mat4::from_translation(parent_world.w_axis.truncate());
    }

    if inherit_scale {
        return parent_world;
    }

    let mut m = parent_world;
    m.x_axis = m.x_axis.truncate().normalize_or_zero().extend(m.x_axis.w);
    m.y_axis = m.y_axis.truncate().normalize_or_zero().extend(m.y_axis.w);
    m.z_axis = m.z_axis.truncate().normalize_or_zero().extend(m.z_axis.w);
    m
}

/// Local scale that realizes `target` expressed in `space`.
///
/// Outside of local space the scale has to preserve the node's directions,
/// so the axis-aligned target scale is applied on top of the node's
/// orientation and the result is measured back along the node's own axes.
///
/// * `parent` - effective parent transform of the node
/// * `world_orientation` - the node's current world orientation
/// * `local_orientation` - the node's current orientation relative to its parent
pub fn scale_in_space(
    target: Vec3,
    space: TransformSpace,
    parent: Mat4,
    world_orientation: Quat,
    local_orientation: Quat,
) -> Result<Vec3, TransformError> {
    match space {
        TransformSpace::Local => Ok(target),
        TransformSpace::Parent => {
            let ts = Mat3::from_diagonal(target) * Mat3::from_quat(local_orientation);
            Ok(column_lengths(&ts))
        }
        TransformSpace::World => {
            let ps = Mat3::from_mat4(parent);
            let determinant = ps.determinant();
            if determinant.abs() < EPSILON {
                return Err(TransformError::SingularParent { determinant });
            }
            let ts = ps.inverse() * Mat3::from_diagonal(target) * Mat3::from_quat(world_orientation);
            Ok(column_lengths(&ts))
        }
    }
}

#[inline]
fn column_lengths(m: &Mat3) -> Vec3 {
    Vec3::new(m.x_axis.length(), m.y_axis.length(), m.z_axis.length())
}

#[inline]
fn unit(v: Vec3) -> Option<Vec3> {
    let len = v.length();
    (len > EPSILON).then(|| v / len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::FRAC_PI_3;

    #[test]
    fn test_compose_decompose_non_uniform() {
        let q = Quat::from_axis_angle(Vec3::new(1.0, 2.0, 0.5).normalize(), 0.7);
        let m = compose(Vec3::new(1.0, -2.0, 3.0), q, Vec3::new(0.5, 2.0, 4.0));
        let d = decompose(&m);

        assert!(d.translation.abs_diff_eq(Vec3::new(1.0, -2.0, 3.0), 1e-5));
        assert!(d.scale.abs_diff_eq(Vec3::new(0.5, 2.0, 4.0), 1e-4));
        assert!(d.orientation.abs_diff_eq(q, 1e-4) || d.orientation.abs_diff_eq(-q, 1e-4));
    }

    #[test]
    fn test_decompose_skewed_basis_gives_unit_rotation() {
        // Rotated child under a non-uniformly scaled parent produces skew.
        let parent = Mat4::from_scale(Vec3::new(1.0, 3.0, 1.0));
        let child = compose(Vec3::ZERO, Quat::from_rotation_z(FRAC_PI_3), Vec3::ONE);
        let d = decompose(&(parent * child));

        assert!((d.orientation.length() - 1.0).abs() < 1e-5);
        assert!(d.scale.x > 0.0 && d.scale.y > 0.0 && d.scale.z > 0.0);
    }

    #[test]
    fn test_decompose_mirrored_basis() {
        let m = Mat4::from_scale(Vec3::new(-2.0, 1.0, 1.0));
        let d = decompose(&m);
        assert!(d.scale.abs_diff_eq(Vec3::new(-2.0, 1.0, 1.0), 1e-5));
        assert!(d.to_matrix().abs_diff_eq(m, 1e-5));
    }

    #[test]
    fn test_decompose_zero_scale_axis() {
        let m = Mat4::from_scale(Vec3::new(1.0, 0.0, 2.0));
        let d = decompose(&m);
        assert!(d.scale.abs_diff_eq(Vec3::new(1.0, 0.0, 2.0), 1e-6));
        assert!(d.orientation.is_normalized());
    }

    #[test]
    fn test_effective_parent_only_translate() {
        let p = compose(Vec3::new(4.0, 5.0, 6.0), Quat::from_rotation_y(1.0), Vec3::splat(3.0));
        let e = effective_parent(p, true, true);
        assert!(e.abs_diff_eq(Mat4::from_translation(Vec3::new(4.0, 5.0, 6.0)), 1e-6));
    }

    #[test]
    fn test_effective_parent_drops_scale_keeps_rotation() {
        let q = Quat::from_rotation_x(0.4);
        let p = compose(Vec3::ONE, q, Vec3::new(2.0, 3.0, 4.0));
        let d = decompose(&effective_parent(p, false, false));
        assert!(d.scale.abs_diff_eq(Vec3::ONE, 1e-5));
        assert!(d.orientation.abs_diff_eq(q, 1e-5));
        assert!(d.translation.abs_diff_eq(Vec3::ONE, 1e-6));
    }

    #[test]
    fn test_scale_in_space_world_under_scaled_parent() {
        let parent = Mat4::from_scale(Vec3::splat(2.0));
        let s = scale_in_space(Vec3::splat(4.0), TransformSpace::World, parent, Quat::IDENTITY, Quat::IDENTITY)
            .unwrap();
        assert!(s.abs_diff_eq(Vec3::splat(2.0), 1e-5));
    }

    #[test]
    fn test_scale_in_space_parent_rotated_node() {
        // A quarter turn around Z swaps which parent axis the node's X follows.
        let q = Quat::from_rotation_z(core::f32::consts::FRAC_PI_2);
        let s = scale_in_space(Vec3::new(2.0, 3.0, 1.0), TransformSpace::Parent, Mat4::IDENTITY, q, q).unwrap();
        assert!(s.abs_diff_eq(Vec3::new(3.0, 2.0, 1.0), 1e-5));
    }

    #[test]
    fn test_scale_in_space_singular_parent() {
        let parent = Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0));
        let result = scale_in_space(Vec3::ONE, TransformSpace::World, parent, Quat::IDENTITY, Quat::IDENTITY);
        assert!(matches!(result, Err(TransformError::SingularParent { .. })));

        // Local and parent space never touch the parent basis.
        let local = scale_in_space(Vec3::ONE, TransformSpace::Local, parent, Quat::IDENTITY, Quat::IDENTITY);
        assert_eq!(local, Ok(Vec3::ONE));
    }
}
