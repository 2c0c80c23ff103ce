//! Benchmarks for the obstacle pipeline stages
//!
//! Synthetic floor-and-box frames at two resolutions, run stage by stage and
//! end to end, plus the async service path through `spawn_blocking`.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use obstacles_depth::core::{CameraIntrinsics, DepthMap};
use obstacles_depth::point_cloud::{
    cluster_obstacles, depth_to_point_cloud, estimate_normals, segment_ground, GroundPlaneParams,
    RegionGrowingParams, DEFAULT_NORMAL_NEIGHBORS,
};
use obstacles_depth::vision::{
    ClusterConfig, DepthSource, ObstacleDetector, ObstaclePipeline, ObstaclesDepthConfig,
    ObstaclesDepthService, StaticDepthSource,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

fn intrinsics(width: u32, height: u32) -> CameraIntrinsics {
    let f = width as f64 * 1.5;
    CameraIntrinsics::new(f, f, width as f64 / 2.0, height as f64 / 2.0, width, height)
}

/// Floor 500mm below the camera and a box face at 2500mm in the lower middle.
fn create_scene(width: u32, height: u32) -> (DepthMap, CameraIntrinsics) {
    let k = intrinsics(width, height);
    let (bx, by) = (width / 2, height * 5 / 8);
    let depth = DepthMap::from_fn(width, height, |u, v| {
        if (bx..bx + width / 8).contains(&u) && (by..by + height / 10).contains(&v) {
            return 2500;
        }
        let dy = v as f64 - k.cy;
        if dy <= 0.0 {
            return 0;
        }
        let d = 500.0 * k.fy / dy;
        if d > 8000.0 {
            return 0;
        }
        d.round() as u16
    });
    (depth, k)
}

fn ground_params() -> GroundPlaneParams {
    GroundPlaneParams {
        max_dist_from_plane: 50.0,
        ..Default::default()
    }
}

fn region_params() -> RegionGrowingParams {
    RegionGrowingParams {
        radius: 100.0,
        strictness: 1.0,
        min_points: 20,
    }
}

fn benchmark_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_stages");
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(20);

    for &(w, h) in &[(160u32, 120u32), (320, 240)] {
        let (depth, k) = create_scene(w, h);
        let cloud = depth_to_point_cloud(&depth, &k).unwrap();
        let seg = segment_ground(&cloud, &ground_params()).unwrap();
        let rest = seg.non_ground_cloud(&cloud);
        let label = format!("{w}x{h}");

        group.bench_with_input(BenchmarkId::new("projection", &label), &depth, |b, depth| {
            b.iter(|| depth_to_point_cloud(black_box(depth), black_box(&k)).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("normals", &label), &cloud, |b, cloud| {
            b.iter(|| estimate_normals(black_box(&cloud.points), DEFAULT_NORMAL_NEIGHBORS));
        });

        group.bench_with_input(BenchmarkId::new("ground", &label), &cloud, |b, cloud| {
            b.iter(|| segment_ground(black_box(cloud), &ground_params()).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("clustering", &label), &rest, |b, rest| {
            b.iter(|| cluster_obstacles(black_box(rest), &region_params()).unwrap());
        });
    }

    group.finish();
}

fn benchmark_end_to_end(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let (depth, k) = create_scene(320, 240);

    let mut group = c.benchmark_group("end_to_end");
    group.sample_size(10);

    let config = ClusterConfig::builder(100, 20, 100)
        .max_dist_from_plane(50.0)
        .build()
        .unwrap();
    let pipeline = ObstaclePipeline::new(config);
    group.bench_function("sync_direct", |b| {
        b.iter(|| pipeline.detect(black_box(&depth), Some(&k)).unwrap());
    });

    let source: Arc<dyn DepthSource> =
        Arc::new(StaticDepthSource::new("bench", depth.clone()).with_intrinsics(k));
    let mut sources: HashMap<String, Arc<dyn DepthSource>> = HashMap::new();
    sources.insert("bench".to_string(), source);
    let config = ObstaclesDepthConfig {
        min_points_in_plane: 100,
        min_points_in_segment: 20,
        max_dist_from_plane_mm: 50.0,
        clustering_radius: 100,
        clustering_strictness: 1.0,
        ground_angle_tolerance_degs: 30.0,
        camera_name: Some("bench".to_string()),
    };
    let service = ObstaclesDepthService::new("bench", &config, Arc::new(sources)).unwrap();

    group.bench_function("async_service", |b| {
        b.to_async(&rt)
            .iter(|| async { service.get_obstacles(None).await.unwrap() })
    });

    group.finish();
}

criterion_group!(benches, benchmark_stages, benchmark_end_to_end);
criterion_main!(benches);
