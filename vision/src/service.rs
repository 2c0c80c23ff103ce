//! Vision service surface
//!
//! [`ObstaclesDepthService`] binds an [`ObstaclePipeline`] to depth sources
//! and exposes it through the [`ObstacleDetector`] capability set. Only
//! obstacle clusters are supported; detection and classification requests
//! fail with [`Error::Unsupported`].

use crate::config::ObstaclesDepthConfig;
use crate::pipeline::ObstaclePipeline;
use crate::source::{DepthSource, DepthSourceResolver};
use async_trait::async_trait;
use obstacles_core::{DepthMap, Error, Obstacle, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Capabilities advertised to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties {
    pub object_clusters_supported: bool,
    pub detection_supported: bool,
    pub classification_supported: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureOptions {
    pub return_image: bool,
    pub return_objects: bool,
    pub return_detections: bool,
    pub return_classifications: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    pub score: f64,
}

/// Everything one capture call produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisCapture {
    pub image: Option<DepthMap>,
    pub objects: Vec<Obstacle>,
    pub detections: Vec<Detection>,
    pub classifications: Vec<Classification>,
}

#[async_trait]
pub trait ObstacleDetector: Send + Sync {
    fn name(&self) -> &str;

    fn properties(&self) -> Properties;

    /// Obstacles seen by `camera`, or by the default camera when `None`.
    async fn get_obstacles(&self, camera: Option<&str>) -> Result<Vec<Obstacle>>;

    async fn capture_all_from_camera(
        &self,
        camera: Option<&str>,
        options: CaptureOptions,
    ) -> Result<VisCapture>;

    async fn detections_from_camera(&self, camera: Option<&str>) -> Result<Vec<Detection>>;

    async fn detections(&self, frame: &DepthMap) -> Result<Vec<Detection>>;

    async fn classifications_from_camera(
        &self,
        camera: Option<&str>,
        n: usize,
    ) -> Result<Vec<Classification>>;

    async fn classifications(&self, frame: &DepthMap, n: usize) -> Result<Vec<Classification>>;

    async fn do_command(&self, command: serde_json::Value) -> Result<serde_json::Value>;
}

pub struct ObstaclesDepthService {
    name: String,
    pipeline: Arc<ObstaclePipeline>,
    default_camera: Option<Arc<dyn DepthSource>>,
    resolver: Arc<dyn DepthSourceResolver>,
}

impl std::fmt::Debug for ObstaclesDepthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObstaclesDepthService")
            .field("name", &self.name)
            .field("pipeline", &self.pipeline)
            .field("default_camera", &self.default_camera.as_ref().map(|c| c.name()))
            .finish()
    }
}

impl ObstaclesDepthService {
    /// Validates `config` and resolves its default camera, if one is named.
    pub fn new(
        name: impl Into<String>,
        config: &ObstaclesDepthConfig,
        resolver: Arc<dyn DepthSourceResolver>,
    ) -> Result<Self> {
        let pipeline = ObstaclePipeline::new(config.cluster_config()?);
        let default_camera = match config.default_camera() {
            Some(camera) => Some(
                resolver
                    .resolve(camera)
                    .ok_or_else(|| Error::CameraNotFound(camera.to_string()))?,
            ),
            None => None,
        };

        Ok(Self {
            name: name.into(),
            pipeline: Arc::new(pipeline),
            default_camera,
            resolver,
        })
    }

    pub fn pipeline(&self) -> &ObstaclePipeline {
        &self.pipeline
    }

    fn camera(&self, camera: Option<&str>) -> Result<Arc<dyn DepthSource>> {
        match camera.filter(|name| !name.is_empty()) {
            Some(name) => self
                .resolver
                .resolve(name)
                .ok_or_else(|| Error::CameraNotFound(name.to_string())),
            None => self.default_camera.clone().ok_or(Error::NoCamera),
        }
    }

    async fn fetch_frame(source: &dyn DepthSource) -> Result<DepthMap> {
        source.depth_map().await.map_err(|e| match e {
            Error::DepthSource(_) => e,
            other => Error::DepthSource(format!("{}: {other}", source.name())),
        })
    }

    /// Runs the pipeline on a frame already fetched from `source`.
    async fn obstacles_in(&self, source: &dyn DepthSource, depth: DepthMap) -> Result<Vec<Obstacle>> {
        let intrinsics = match source.intrinsics().await {
            Ok(intrinsics) => intrinsics,
            Err(e) => {
                tracing::warn!(
                    camera = source.name(),
                    error = %e,
                    "could not read camera intrinsics, using median depth fallback"
                );
                None
            }
        };

        let pipeline = Arc::clone(&self.pipeline);
        tokio::task::spawn_blocking(move || pipeline.detect(&depth, intrinsics.as_ref()))
            .await
            .map_err(|e| Error::RuntimeError(format!("obstacle pipeline task failed: {e}")))?
    }
}

#[async_trait]
impl ObstacleDetector for ObstaclesDepthService {
    fn name(&self) -> &str {
        &self.name
    }

    fn properties(&self) -> Properties {
        Properties {
            object_clusters_supported: true,
            detection_supported: false,
            classification_supported: false,
        }
    }

    #[tracing::instrument(skip(self), fields(service = %self.name))]
    async fn get_obstacles(&self, camera: Option<&str>) -> Result<Vec<Obstacle>> {
        let source = self.camera(camera)?;
        let depth = Self::fetch_frame(source.as_ref()).await?;
        self.obstacles_in(source.as_ref(), depth).await
    }

    async fn capture_all_from_camera(
        &self,
        camera: Option<&str>,
        options: CaptureOptions,
    ) -> Result<VisCapture> {
        let source = self.camera(camera)?;
        let mut capture = VisCapture::default();
        if !(options.return_image || options.return_objects) {
            return Ok(capture);
        }

        let depth = Self::fetch_frame(source.as_ref()).await?;
        if options.return_objects {
            capture.objects = self.obstacles_in(source.as_ref(), depth.clone()).await?;
        }
        if options.return_image {
            capture.image = Some(depth);
        }
        Ok(capture)
    }

    async fn detections_from_camera(&self, _camera: Option<&str>) -> Result<Vec<Detection>> {
        Err(Error::Unsupported("detections_from_camera".to_string()))
    }

    async fn detections(&self, _frame: &DepthMap) -> Result<Vec<Detection>> {
        Err(Error::Unsupported("detections".to_string()))
    }

    async fn classifications_from_camera(
        &self,
        _camera: Option<&str>,
        _n: usize,
    ) -> Result<Vec<Classification>> {
        Err(Error::Unsupported("classifications_from_camera".to_string()))
    }

    async fn classifications(&self, _frame: &DepthMap, _n: usize) -> Result<Vec<Classification>> {
        Err(Error::Unsupported("classifications".to_string()))
    }

    async fn do_command(&self, _command: serde_json::Value) -> Result<serde_json::Value> {
        Err(Error::Unsupported("do_command".to_string()))
    }
}
