use common::decompose;
use glam::{Mat4, Vec3};
use std::f32::consts::FRAC_PI_2;

fn packed(m: Mat4) -> [f32; 16] {
    m.to_cols_array()
}

fn assert_vec_close(actual: Vec3, expected: Vec3) {
    assert!(
        (actual - expected).length() < 1e-5,
        "expected {:?}, got {:?}",
        expected,
        actual
    );
}

#[test]
fn identity_has_no_rotation_or_translation() {
    let pose = decompose(&packed(Mat4::IDENTITY)).unwrap();
    assert_vec_close(pose.rotation, Vec3::ZERO);
    assert_vec_close(pose.translation, Vec3::ZERO);
}

#[test]
fn translation_is_read_from_last_column() {
    let mut m = [0.0f32; 16];
    m[0] = 1.0;
    m[5] = 1.0;
    m[10] = 1.0;
    m[15] = 1.0;
    m[12] = 1.5;
    m[13] = -2.0;
    m[14] = -45.0;

    let pose = decompose(&m).unwrap();
    assert_vec_close(pose.translation, Vec3::new(1.5, -2.0, -45.0));
    assert_vec_close(pose.rotation, Vec3::ZERO);
}

#[test]
fn single_axis_rotations() {
    let pose = decompose(&packed(Mat4::from_rotation_x(0.3))).unwrap();
    assert_vec_close(pose.rotation, Vec3::new(0.3, 0.0, 0.0));

    let pose = decompose(&packed(Mat4::from_rotation_y(-0.4))).unwrap();
    assert_vec_close(pose.rotation, Vec3::new(0.0, -0.4, 0.0));

    let pose = decompose(&packed(Mat4::from_rotation_z(1.2))).unwrap();
    assert_vec_close(pose.rotation, Vec3::new(0.0, 0.0, 1.2));
}

#[test]
fn composed_rotation_uses_xyz_order() {
    let m = Mat4::from_translation(Vec3::new(3.0, 4.0, -50.0))
        * Mat4::from_rotation_x(0.1)
        * Mat4::from_rotation_y(0.2)
        * Mat4::from_rotation_z(0.3);

    let pose = decompose(&packed(m)).unwrap();
    assert_vec_close(pose.rotation, Vec3::new(0.1, 0.2, 0.3));
    assert_vec_close(pose.translation, Vec3::new(3.0, 4.0, -50.0));
}

#[test]
fn scale_does_not_leak_into_rotation() {
    let m = Mat4::from_scale_rotation_translation(
        Vec3::splat(2.5),
        glam::Quat::from_rotation_y(0.25),
        Vec3::new(0.0, 1.0, 2.0),
    );

    let pose = decompose(&packed(m)).unwrap();
    assert_vec_close(pose.rotation, Vec3::new(0.0, 0.25, 0.0));
    assert_vec_close(pose.translation, Vec3::new(0.0, 1.0, 2.0));
}

#[test]
fn gimbal_lock_stays_finite() {
    let pose = decompose(&packed(Mat4::from_rotation_y(FRAC_PI_2))).unwrap();
    assert!((pose.rotation.y - FRAC_PI_2).abs() < 1e-3);
    assert!(pose.rotation.is_finite());
}

#[test]
fn repeated_calls_are_deterministic() {
    let m = packed(
        Mat4::from_translation(Vec3::new(-1.0, 0.5, -30.0))
            * Mat4::from_rotation_x(-0.7)
            * Mat4::from_rotation_z(0.05),
    );
    let first = decompose(&m).unwrap();
    for _ in 0..10 {
        assert_eq!(decompose(&m).unwrap(), first);
    }
}

#[test]
fn degenerate_matrices_are_rejected() {
    assert!(decompose(&[0.0; 16]).is_none());

    let mut m = packed(Mat4::IDENTITY);
    m[3] = f32::NAN;
    assert!(decompose(&m).is_none());
}
