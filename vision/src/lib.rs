//! Obstacle detection service on top of the point cloud stages
//!
//! # Module Organization
//!
//! - `config`: JSON attributes and the validated [`ClusterConfig`]
//! - `fallback`: median-depth estimate used without intrinsics
//! - `pipeline`: picks the calibrated or fallback path for a frame
//! - `source`: async depth camera boundary and name resolution
//! - `service`: the [`ObstacleDetector`] capability surface
//!
//! # Usage
//!
//! ```ignore
//! use obstacles_vision::*;
//!
//! let config = ObstaclesDepthConfig::from_json(attributes)?;
//! let service = ObstaclesDepthService::new("obstacles", &config, Arc::new(cameras))?;
//! let obstacles = service.get_obstacles(None).await?;
//! ```

pub mod config;
pub mod fallback;
pub mod pipeline;
pub mod service;
pub mod source;

pub use config::{
    ClusterConfig, ClusterConfigBuilder, ObstaclesDepthConfig, DEFAULT_CLUSTERING_STRICTNESS,
    DEFAULT_GROUND_ANGLE_TOLERANCE_DEGS, DEFAULT_MAX_DIST_FROM_PLANE_MM,
};
pub use fallback::{estimate_fallback_obstacle, median_depth};
pub use pipeline::ObstaclePipeline;
pub use service::{
    CaptureOptions, Classification, Detection, ObstacleDetector, ObstaclesDepthService,
    Properties, VisCapture,
};
pub use source::{DepthSource, DepthSourceResolver, StaticDepthSource};

pub use obstacles_core::{Error, Result};
