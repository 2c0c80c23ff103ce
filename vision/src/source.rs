//! Depth camera boundary

use async_trait::async_trait;
use obstacles_core::{CameraIntrinsics, DepthMap, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A camera that can deliver depth frames.
#[async_trait]
pub trait DepthSource: Send + Sync {
    fn name(&self) -> &str;

    /// Latest frame, millimetres per pixel.
    async fn depth_map(&self) -> Result<DepthMap>;

    /// Pinhole calibration, `None` when the camera does not report one.
    async fn intrinsics(&self) -> Result<Option<CameraIntrinsics>>;
}

/// Looks depth sources up by name.
pub trait DepthSourceResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Option<Arc<dyn DepthSource>>;
}

impl DepthSourceResolver for HashMap<String, Arc<dyn DepthSource>> {
    fn resolve(&self, name: &str) -> Option<Arc<dyn DepthSource>> {
        self.get(name).cloned()
    }
}

impl<F> DepthSourceResolver for F
where
    F: Fn(&str) -> Option<Arc<dyn DepthSource>> + Send + Sync,
{
    fn resolve(&self, name: &str) -> Option<Arc<dyn DepthSource>> {
        self(name)
    }
}

/// In-memory source that serves whatever frame was last stored.
#[derive(Debug)]
pub struct StaticDepthSource {
    name: String,
    frame: RwLock<DepthMap>,
    intrinsics: Option<CameraIntrinsics>,
}

impl StaticDepthSource {
    pub fn new(name: impl Into<String>, depth: DepthMap) -> Self {
        Self {
            name: name.into(),
            frame: RwLock::new(depth),
            intrinsics: None,
        }
    }

    pub fn with_intrinsics(mut self, intrinsics: CameraIntrinsics) -> Self {
        self.intrinsics = Some(intrinsics);
        self
    }

    pub async fn set_depth_map(&self, depth: DepthMap) {
        *self.frame.write().await = depth;
    }
}

#[async_trait]
impl DepthSource for StaticDepthSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn depth_map(&self) -> Result<DepthMap> {
        Ok(self.frame.read().await.clone())
    }

    async fn intrinsics(&self) -> Result<Option<CameraIntrinsics>> {
        Ok(self.intrinsics)
    }
}
