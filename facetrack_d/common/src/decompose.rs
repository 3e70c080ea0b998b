use glam::{Mat3, Mat4, Vec3};

use api::MATRIX_LEN;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Euler angles in radians, XYZ order.
    pub rotation: Vec3,
    pub translation: Vec3,
}

/// Split a packed column-major 4x4 transform into rotation and translation.
///
/// Scale is removed before the rotation is read. Returns `None` for a
/// matrix that cannot carry a rotation: non-finite values or a collapsed
/// basis.
pub fn decompose(matrix: &[f32; MATRIX_LEN]) -> Option<Pose> {
    if matrix.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let m = Mat4::from_cols_array(matrix);
    let det = m.determinant();
    if !det.is_finite() || det.abs() < f32::MIN_POSITIVE {
        return None;
    }

    let (_scale, rotation, translation) = m.to_scale_rotation_translation();
    Some(Pose {
        rotation: euler_xyz(&Mat3::from_quat(rotation.normalize())),
        translation,
    })
}

/// Euler angles for a pure rotation matrix `R = Rx * Ry * Rz`.
pub fn euler_xyz(r: &Mat3) -> Vec3 {
    let m11 = r.x_axis.x;
    let m12 = r.y_axis.x;
    let m13 = r.z_axis.x;
    let m22 = r.y_axis.y;
    let m23 = r.z_axis.y;
    let m32 = r.y_axis.z;
    let m33 = r.z_axis.z;

    let y = m13.clamp(-1.0, 1.0).asin();
    if m13.abs() < 0.999_999_9 {
        Vec3::new((-m23).atan2(m33), y, (-m12).atan2(m11))
    } else {
        // gimbal lock: fold the whole X/Z rotation into X
        Vec3::new(m32.atan2(m22), y, 0.0)
    }
}
