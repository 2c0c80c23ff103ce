use obstacles_core::geometry::{CameraIntrinsics, Distortion};
use nalgebra::{Point2, Point3};

#[test]
fn test_pinhole_unproject_no_distortion() {
    let intrinsics = CameraIntrinsics::new(500.0, 500.0, 320.0, 240.0, 640, 480);

    // x = (420 - 320) * 5000 / 500 = 1000
    // y = (340 - 240) * 5000 / 500 = 1000
    let p3 = intrinsics.unproject(Point2::new(420.0, 340.0), 5000.0).unwrap();
    assert!((p3.x - 1000.0).abs() < 1e-9);
    assert!((p3.y - 1000.0).abs() < 1e-9);
    assert_eq!(p3.z, 5000.0);

    let p2 = intrinsics.project(&p3).unwrap();
    assert!((p2.x - 420.0).abs() < 1e-9);
    assert!((p2.y - 340.0).abs() < 1e-9);
}

#[test]
fn test_principal_point_maps_to_optical_axis() {
    let intrinsics = CameraIntrinsics::new(525.0, 520.0, 319.5, 239.5, 640, 480);
    let p3 = intrinsics.unproject(Point2::new(319.5, 239.5), 1234.0).unwrap();
    assert_eq!(p3, Point3::new(0.0, 0.0, 1234.0));
}

#[test]
fn test_pinhole_distortion_round_trip() {
    let intrinsics = CameraIntrinsics::new(500.0, 500.0, 320.0, 240.0, 640, 480)
        .with_distortion(Distortion::new(0.1, 0.01, 0.0, 0.0, 0.0));

    let p3 = Point3::new(1000.0, 1000.0, 5000.0);
    let p2 = intrinsics.project(&p3).unwrap();

    // Without distortion it would be (420, 340)
    assert!(p2.x > 420.5);

    let back = intrinsics.unproject(p2, 5000.0).unwrap();
    assert!((back.x - 1000.0).abs() < 1.0);
    assert!((back.y - 1000.0).abs() < 1.0);
}

#[test]
fn test_unproject_outside_distortion_fold_is_none() {
    let intrinsics = CameraIntrinsics::new(30.0, 30.0, 32.0, 24.0, 64, 48)
        .with_distortion(Distortion::new(-0.35, 0.12, 0.0, 0.0, -0.02));
    assert!(intrinsics.unproject(Point2::new(32.0, 24.0), 1000.0).is_some());
    // Image corner: normalised radius 1.33, beyond what the model can reach.
    assert!(intrinsics.unproject(Point2::new(0.0, 0.0), 1000.0).is_none());
}
