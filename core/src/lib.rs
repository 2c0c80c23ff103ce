//! Core types for depth-camera obstacle detection
//!
//! Geometry primitives, depth frames, point clouds and the error type shared
//! by the projection, segmentation and clustering stages.

pub mod depth;
pub mod error;
pub mod geometry;
pub mod obstacle;
pub mod point_cloud;
pub mod runtime;

pub use depth::*;
pub use error::{Error, Result};
pub use geometry::*;
pub use obstacle::*;
pub use point_cloud::*;
pub use runtime::init_global_thread_pool;
