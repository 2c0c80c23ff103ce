//! Depth map to point cloud projection
//!
//! Back-projects every valid depth cell through the pinhole model. Points keep
//! the row-major order of their source pixels, and the pixel of each point is
//! recorded in [`PointCloud::pixels`].

use nalgebra::{Point2, Point3};
use obstacles_core::{CameraIntrinsics, DepthMap, Error, PointCloudf64, Result, INVALID_DEPTH};
use rayon::prelude::*;

/// Range of readings (in millimetres, inclusive) accepted as valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionOptions {
    pub min_depth_mm: u16,
    pub max_depth_mm: u16,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            min_depth_mm: 1,
            max_depth_mm: u16::MAX,
        }
    }
}

impl ProjectionOptions {
    #[inline]
    pub fn accepts(&self, depth: u16) -> bool {
        depth != INVALID_DEPTH && depth >= self.min_depth_mm && depth <= self.max_depth_mm
    }
}

/// Project a depth map using the default depth range.
pub fn depth_to_point_cloud(
    depth: &DepthMap,
    intrinsics: &CameraIntrinsics,
) -> Result<PointCloudf64> {
    depth_to_point_cloud_with_options(depth, intrinsics, &ProjectionOptions::default())
}

/// Project a depth map, keeping only cells inside `options`' depth range.
///
/// For pixel `(u, v)` with depth `d`: `x = (u - cx) * d / fx`, `y = (v - cy) * d / fy`, `z = d`
/// (after undistortion when the intrinsics carry distortion coefficients).
/// Cells the distortion model cannot invert are skipped, so every returned
/// point is finite.
pub fn depth_to_point_cloud_with_options(
    depth: &DepthMap,
    intrinsics: &CameraIntrinsics,
    options: &ProjectionOptions,
) -> Result<PointCloudf64> {
    intrinsics.validate()?;
    if depth.is_empty() {
        return Err(Error::Projection("depth map is empty".to_string()));
    }
    if options.min_depth_mm > options.max_depth_mm {
        return Err(Error::Projection(format!(
            "invalid depth range {}..={}",
            options.min_depth_mm, options.max_depth_mm
        )));
    }

    let rows: Vec<Vec<(Point3<f64>, Point2<u32>)>> = (0..depth.height())
        .into_par_iter()
        .map(|v| {
            let Some(row) = depth.row(v) else {
                return Vec::new();
            };
            row.iter()
                .enumerate()
                .filter(|(_, &d)| options.accepts(d))
                .filter_map(|(u, &d)| {
                    let pixel = Point2::new(u as f64, v as f64);
                    let point = intrinsics.unproject(pixel, d as f64)?;
                    Some((point, Point2::new(u as u32, v)))
                })
                .collect()
        })
        .collect();

    let total: usize = rows.iter().map(Vec::len).sum();
    let mut points = Vec::with_capacity(total);
    let mut pixels = Vec::with_capacity(total);
    for row in rows {
        for (p, px) in row {
            points.push(p);
            pixels.push(px);
        }
    }

    let skipped = depth
        .data()
        .iter()
        .filter(|&&d| options.accepts(d))
        .count()
        - points.len();
    tracing::debug!(
        width = depth.width(),
        height = depth.height(),
        points = points.len(),
        skipped,
        "projected depth map"
    );

    PointCloudf64::new(points).with_pixels(pixels)
}
