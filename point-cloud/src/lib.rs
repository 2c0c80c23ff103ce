//! Point cloud stages of the obstacle pipeline
//!
//! # Module Organization
//!
//! - `projection`: depth map to point cloud through pinhole intrinsics
//! - `normals`: k-nearest-neighbour PCA normal estimation
//! - `segmentation`: ground plane fit and ground / non-ground partition
//! - `clustering`: region growing of the non-ground points into clusters
//!
//! # Usage
//!
//! ```ignore
//! use obstacles_point_cloud::*;
//!
//! let cloud = depth_to_point_cloud(&depth, &intrinsics)?;
//! let seg = segment_ground(&cloud, &GroundPlaneParams::default())?;
//! let obstacles = cluster_obstacles(&seg.non_ground_cloud(&cloud), &params)?;
//! ```

pub mod clustering;
pub mod normals;
pub mod projection;
pub mod segmentation;
mod spatial;

pub use clustering::{
    cluster_obstacles, cluster_region_growing, label_components, Cluster, RegionGrowingParams,
};
pub use normals::{estimate_cloud_normals, estimate_normals, DEFAULT_NORMAL_NEIGHBORS};
pub use projection::{depth_to_point_cloud, depth_to_point_cloud_with_options, ProjectionOptions};
pub use segmentation::{
    fit_plane, partition_by_plane, segment_ground, GroundPlaneParams, GroundSegmentation,
};

pub use obstacles_core::{Error, Result};
