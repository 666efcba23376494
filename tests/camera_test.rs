use cgmath::{Deg, Point3, Rad, Vector3, Vector4};
use ember_scene::{
    KeyCode,
    camera::{Camera, CameraConfig, OPENGL_TO_WGPU_MATRIX, PITCH_LIMIT},
};

use crate::common::test_utils::{assert_close, assert_vec_close};

mod common;

fn camera() -> Camera {
    Camera::new(&CameraConfig::default(), 1280, 720)
}

#[test]
fn pitch_stays_clamped() {
    let limit = Rad::from(PITCH_LIMIT).0;
    let mut camera = camera();
    for (dx, dy) in [(0.0, 1.0e4), (3.0, -2.5e5), (-7.0, 40.0), (0.0, 1.0e9)] {
        camera.rotate_camera(dx, dy);
        assert!(camera.pitch().0 <= limit && camera.pitch().0 >= -limit);
    }
    assert_eq!(camera.pitch().0, limit);
}

#[test]
fn rotation_scales_by_sensitivity() {
    let mut camera = camera();
    camera.rotate_camera(10.0, -4.0);
    assert_close(camera.yaw().0, 0.05);
    assert_close(camera.pitch().0, -0.02);
}

#[test]
fn resize_updates_aspect_and_projection() {
    let mut camera = camera();
    assert_close(camera.aspect(), 1280.0 / 720.0);

    camera.set_projection_mat(800, 600);
    assert_close(camera.aspect(), 800.0 / 600.0);
    let expected = OPENGL_TO_WGPU_MATRIX * cgmath::perspective(Deg(45.0), 800.0 / 600.0, 0.1, 100.0);
    assert_eq!(camera.projection_matrix(), expected);
}

#[test]
fn zero_sized_resize_is_ignored() {
    let mut camera = camera();
    let before = camera.projection_matrix();
    camera.set_projection_mat(800, 0);
    assert_eq!(camera.projection_matrix(), before);
    assert_close(camera.aspect(), 1280.0 / 720.0);
}

#[test]
fn held_keys_move_the_camera() {
    let mut camera = camera();
    assert!(camera.handle_key(KeyCode::KeyW, true));
    camera.update(1.0);
    assert_vec_close(
        Vector3::new(camera.position().x, camera.position().y, camera.position().z),
        Vector3::new(0.0, 0.0, -2.0),
    );

    camera.handle_key(KeyCode::KeyW, false);
    camera.handle_key(KeyCode::Space, true);
    camera.handle_key(KeyCode::ShiftLeft, true);
    camera.update(0.5);
    assert_close(camera.position().y, 4.5);
}

#[test]
fn other_keys_are_not_consumed() {
    let mut camera = camera();
    assert!(!camera.handle_key(KeyCode::KeyQ, true));
    assert_eq!(camera.keys(), Default::default());
}

#[test]
fn dolly_moves_along_view_direction() {
    let mut camera = camera();
    camera.dolly(2.0);
    assert_close(camera.position().z, -4.0);
    camera.dolly(-4.0);
    assert_close(camera.position().z, -6.0);
}

#[test]
fn view_looks_down_positive_z_at_start() {
    let camera = camera();
    assert_vec_close(camera.forward(), Vector3::new(0.0, 0.0, 1.0));

    let origin = camera.view_matrix() * Vector4::new(0.0, 0.0, 0.0, 1.0);
    assert_vec_close(origin.truncate(), Vector3::new(0.0, 0.0, -5.0));
}

#[test]
fn configured_start_pose_is_used() {
    let config = CameraConfig {
        position: Point3::new(1.0, 2.0, 3.0),
        pitch: Deg(120.0),
        ..Default::default()
    };
    let camera = Camera::new(&config, 640, 480);
    assert_eq!(camera.position(), Point3::new(1.0, 2.0, 3.0));
    assert_eq!(camera.pitch(), Rad::from(PITCH_LIMIT));
}
