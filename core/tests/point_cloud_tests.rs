use obstacles_core::point_cloud::PointCloud;
use nalgebra::{Point2, Point3, Vector3};

#[test]
fn test_point_cloud_result_handling() {
    let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)];
    let cloud = PointCloud::new(points);

    let normals = vec![Vector3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 0.0, 1.0)];
    assert!(cloud.clone().with_normals(normals).is_ok());

    let bad_normals = vec![Vector3::new(0.0, 0.0, 1.0)];
    let err = cloud.clone().with_normals(bad_normals).unwrap_err();
    assert!(err.to_string().contains("Normal count"));

    let bad_pixels = vec![Point2::new(0u32, 0u32)];
    let err = cloud.with_pixels(bad_pixels).unwrap_err();
    assert!(err.to_string().contains("Pixel count"));
}

#[test]
fn test_select_keeps_attributes_aligned() {
    let cloud = PointCloud::new(vec![
        Point3::new(0.0, 0.0, 10.0),
        Point3::new(1.0, 0.0, 20.0),
        Point3::new(2.0, 0.0, 30.0),
    ])
    .with_pixels(vec![Point2::new(0, 0), Point2::new(1, 0), Point2::new(2, 0)])
    .unwrap();

    let sub = cloud.select(&[2, 0]);
    assert_eq!(sub.points, vec![Point3::new(2.0, 0.0, 30.0), Point3::new(0.0, 0.0, 10.0)]);
    assert_eq!(sub.pixels.unwrap(), vec![Point2::new(2, 0), Point2::new(0, 0)]);
    assert!(sub.normals.is_none());
}

#[test]
fn test_centroid() {
    let cloud: PointCloud<f64> = PointCloud::new(vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(2.0, 4.0, 6.0),
    ]);
    assert_eq!(cloud.centroid(), Some(Point3::new(1.0, 2.0, 3.0)));
    assert_eq!(PointCloud::<f64>::default().centroid(), None);
}
