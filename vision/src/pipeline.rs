//! Obstacle pipeline
//!
//! Chooses between the calibrated path (projection, ground removal,
//! clustering) and the single-point fallback for one depth frame.

use crate::config::ClusterConfig;
use crate::fallback::estimate_fallback_obstacle;
use obstacles_core::{CameraIntrinsics, DepthMap, Obstacle, Result};
use obstacles_point_cloud::{
    cluster_obstacles, depth_to_point_cloud_with_options, segment_ground, ProjectionOptions,
};

#[derive(Debug, Clone)]
pub struct ObstaclePipeline {
    config: ClusterConfig,
    projection: ProjectionOptions,
}

impl ObstaclePipeline {
    pub fn new(config: ClusterConfig) -> Self {
        Self {
            config,
            projection: ProjectionOptions::default(),
        }
    }

    pub fn with_projection_options(mut self, options: ProjectionOptions) -> Self {
        self.projection = options;
        self
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Obstacles in one frame.
    ///
    /// Absent or malformed intrinsics fall back to a single obstacle at the
    /// median depth.
    #[tracing::instrument(skip_all, fields(width = depth.width(), height = depth.height()))]
    pub fn detect(
        &self,
        depth: &DepthMap,
        intrinsics: Option<&CameraIntrinsics>,
    ) -> Result<Vec<Obstacle>> {
        match intrinsics {
            Some(k) => match k.validate() {
                Ok(()) => self.detect_calibrated(depth, k),
                Err(e) => {
                    tracing::warn!(error = %e, "camera intrinsics are malformed, using median depth fallback");
                    self.detect_fallback(depth)
                }
            },
            None => {
                tracing::warn!("no camera intrinsics available, using median depth fallback");
                self.detect_fallback(depth)
            }
        }
    }

    /// Project, remove the ground plane and cluster what is left.
    pub fn detect_calibrated(
        &self,
        depth: &DepthMap,
        intrinsics: &CameraIntrinsics,
    ) -> Result<Vec<Obstacle>> {
        let cloud = depth_to_point_cloud_with_options(depth, intrinsics, &self.projection)?;
        let segmentation = segment_ground(&cloud, &self.config.ground_params())?;
        let rest = segmentation.non_ground_cloud(&cloud);
        let obstacles = cluster_obstacles(&rest, &self.config.region_params())?;

        tracing::debug!(
            projected = cloud.len(),
            ground = segmentation.ground.len(),
            obstacles = obstacles.len(),
            "calibrated obstacle pass"
        );
        Ok(obstacles)
    }

    pub fn detect_fallback(&self, depth: &DepthMap) -> Result<Vec<Obstacle>> {
        Ok(vec![estimate_fallback_obstacle(depth)?])
    }
}
