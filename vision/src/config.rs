//! Service configuration
//!
//! [`ObstaclesDepthConfig`] is the JSON attribute block the host hands over;
//! [`ClusterConfig`] is the validated, immutable form the pipeline runs with.

use nalgebra::Vector3;
use obstacles_core::{Error, Result};
use obstacles_point_cloud::{GroundPlaneParams, RegionGrowingParams, DEFAULT_NORMAL_NEIGHBORS};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_DIST_FROM_PLANE_MM: f64 = 100.0;
pub const DEFAULT_GROUND_ANGLE_TOLERANCE_DEGS: f64 = 30.0;
pub const DEFAULT_CLUSTERING_STRICTNESS: f64 = 1.0;

fn default_max_dist_from_plane() -> f64 {
    DEFAULT_MAX_DIST_FROM_PLANE_MM
}

fn default_angle_tolerance() -> f64 {
    DEFAULT_GROUND_ANGLE_TOLERANCE_DEGS
}

fn default_strictness() -> f64 {
    DEFAULT_CLUSTERING_STRICTNESS
}

/// Attributes of an obstacles-depth service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstaclesDepthConfig {
    pub min_points_in_plane: i64,
    pub min_points_in_segment: i64,
    #[serde(default = "default_max_dist_from_plane")]
    pub max_dist_from_plane_mm: f64,
    pub clustering_radius: i64,
    #[serde(default = "default_strictness")]
    pub clustering_strictness: f64,
    #[serde(default = "default_angle_tolerance")]
    pub ground_angle_tolerance_degs: f64,
    /// Default depth source, used when a request names no camera.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_name: Option<String>,
}

impl ObstaclesDepthConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::ConfigValidation(format!("could not parse obstacles depth config: {e}")))
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| Error::ConfigValidation(format!("could not parse obstacles depth config: {e}")))
    }

    /// Configured default camera, ignoring an empty name.
    pub fn default_camera(&self) -> Option<&str> {
        self.camera_name.as_deref().filter(|name| !name.is_empty())
    }

    /// Names of the depth sources that must exist before the service is built.
    pub fn required_dependencies(&self) -> Vec<String> {
        self.default_camera().map(str::to_string).into_iter().collect()
    }

    pub fn cluster_config(&self) -> Result<ClusterConfig> {
        let min_points_in_plane = non_negative("min_points_in_plane", self.min_points_in_plane)?;
        let min_points_in_segment =
            non_negative("min_points_in_segment", self.min_points_in_segment)?;
        let clustering_radius = u32::try_from(self.clustering_radius).map_err(|_| {
            Error::ConfigValidation(format!(
                "clustering_radius must be a positive integer, got {}",
                self.clustering_radius
            ))
        })?;

        ClusterConfig::builder(min_points_in_plane, min_points_in_segment, clustering_radius)
            .max_dist_from_plane(self.max_dist_from_plane_mm)
            .clustering_strictness(self.clustering_strictness)
            .angle_tolerance(self.ground_angle_tolerance_degs)
            .build()
    }
}

fn non_negative(field: &str, value: i64) -> Result<usize> {
    usize::try_from(value).map_err(|_| {
        Error::ConfigValidation(format!("{field} must be greater than 0, got {value}"))
    })
}

/// Validated clustering parameters. Construct with [`ClusterConfig::builder`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterConfig {
    min_points_in_plane: usize,
    min_points_in_segment: usize,
    max_dist_from_plane: f64,
    clustering_radius: u32,
    clustering_strictness: f64,
    angle_tolerance: f64,
    ground_normal: Vector3<f64>,
}

impl ClusterConfig {
    pub fn builder(
        min_points_in_plane: usize,
        min_points_in_segment: usize,
        clustering_radius: u32,
    ) -> ClusterConfigBuilder {
        ClusterConfigBuilder {
            min_points_in_plane,
            min_points_in_segment,
            clustering_radius,
            max_dist_from_plane: DEFAULT_MAX_DIST_FROM_PLANE_MM,
            clustering_strictness: DEFAULT_CLUSTERING_STRICTNESS,
            angle_tolerance: DEFAULT_GROUND_ANGLE_TOLERANCE_DEGS,
            ground_normal: Vector3::new(0.0, -1.0, 0.0),
        }
    }

    pub fn min_points_in_plane(&self) -> usize {
        self.min_points_in_plane
    }

    pub fn min_points_in_segment(&self) -> usize {
        self.min_points_in_segment
    }

    pub fn max_dist_from_plane(&self) -> f64 {
        self.max_dist_from_plane
    }

    pub fn clustering_radius(&self) -> u32 {
        self.clustering_radius
    }

    pub fn clustering_strictness(&self) -> f64 {
        self.clustering_strictness
    }

    pub fn angle_tolerance(&self) -> f64 {
        self.angle_tolerance
    }

    /// Unit vector.
    pub fn ground_normal(&self) -> &Vector3<f64> {
        &self.ground_normal
    }

    pub fn ground_params(&self) -> GroundPlaneParams {
        GroundPlaneParams {
            ground_normal: self.ground_normal,
            angle_tolerance_deg: self.angle_tolerance,
            max_dist_from_plane: self.max_dist_from_plane,
            min_points_in_plane: self.min_points_in_plane,
            normal_neighbors: DEFAULT_NORMAL_NEIGHBORS,
        }
    }

    pub fn region_params(&self) -> RegionGrowingParams {
        RegionGrowingParams {
            radius: self.clustering_radius as f64,
            strictness: self.clustering_strictness,
            min_points: self.min_points_in_segment,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClusterConfigBuilder {
    min_points_in_plane: usize,
    min_points_in_segment: usize,
    clustering_radius: u32,
    max_dist_from_plane: f64,
    clustering_strictness: f64,
    angle_tolerance: f64,
    ground_normal: Vector3<f64>,
}

impl ClusterConfigBuilder {
    /// Millimetres.
    pub fn max_dist_from_plane(mut self, mm: f64) -> Self {
        self.max_dist_from_plane = mm;
        self
    }

    pub fn clustering_strictness(mut self, strictness: f64) -> Self {
        self.clustering_strictness = strictness;
        self
    }

    /// Degrees.
    pub fn angle_tolerance(mut self, degrees: f64) -> Self {
        self.angle_tolerance = degrees;
        self
    }

    pub fn ground_normal(mut self, normal: Vector3<f64>) -> Self {
        self.ground_normal = normal;
        self
    }

    pub fn build(self) -> Result<ClusterConfig> {
        if self.min_points_in_plane == 0 {
            return Err(Error::ConfigValidation(
                "min_points_in_plane must be greater than 0, got 0".to_string(),
            ));
        }
        if self.min_points_in_segment == 0 {
            return Err(Error::ConfigValidation(
                "min_points_in_segment must be greater than 0, got 0".to_string(),
            ));
        }
        if !(self.max_dist_from_plane.is_finite() && self.max_dist_from_plane > 0.0) {
            return Err(Error::ConfigValidation(format!(
                "max_dist_from_plane_mm must be greater than 0, got {}",
                self.max_dist_from_plane
            )));
        }
        if self.clustering_radius == 0 {
            return Err(Error::ConfigValidation(
                "clustering_radius must be greater than 0, got 0".to_string(),
            ));
        }
        if !(self.clustering_strictness > 0.0 && self.clustering_strictness <= 1.0) {
            return Err(Error::ConfigValidation(format!(
                "clustering_strictness must be in (0, 1], got {}",
                self.clustering_strictness
            )));
        }
        if !(0.0..=180.0).contains(&self.angle_tolerance) {
            return Err(Error::ConfigValidation(format!(
                "ground_angle_tolerance_degs must be in [0, 180], got {}",
                self.angle_tolerance
            )));
        }
        let norm = self.ground_normal.norm();
        if !norm.is_finite() || norm < 1e-12 {
            return Err(Error::ConfigValidation(
                "ground normal must be a finite non-zero vector".to_string(),
            ));
        }

        Ok(ClusterConfig {
            min_points_in_plane: self.min_points_in_plane,
            min_points_in_segment: self.min_points_in_segment,
            max_dist_from_plane: self.max_dist_from_plane,
            clustering_radius: self.clustering_radius,
            clustering_strictness: self.clustering_strictness,
            angle_tolerance: self.angle_tolerance,
            ground_normal: self.ground_normal / norm,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_json() -> serde_json::Value {
        serde_json::json!({
            "min_points_in_plane": 1500,
            "min_points_in_segment": 250,
            "max_dist_from_plane_mm": 10.0,
            "clustering_radius": 5,
            "clustering_strictness": 0.5,
            "ground_angle_tolerance_degs": 20.0,
            "camera_name": "front_depth"
        })
    }

    #[test]
    fn test_parse_full_config() {
        let conf = ObstaclesDepthConfig::from_value(valid_json()).unwrap();
        assert_eq!(conf.required_dependencies(), vec!["front_depth".to_string()]);

        let cc = conf.cluster_config().unwrap();
        assert_eq!(cc.min_points_in_plane(), 1500);
        assert_eq!(cc.min_points_in_segment(), 250);
        assert_eq!(cc.clustering_radius(), 5);
        assert_eq!(cc.clustering_strictness(), 0.5);
        assert_eq!(cc.angle_tolerance(), 20.0);
        assert_eq!(*cc.ground_normal(), Vector3::new(0.0, -1.0, 0.0));
        assert_eq!(cc.region_params().effective_radius(), 2.5);
    }

    #[test]
    fn test_defaults_for_absent_fields() {
        let conf = ObstaclesDepthConfig::from_json(
            r#"{"min_points_in_plane": 10, "min_points_in_segment": 5, "clustering_radius": 50}"#,
        )
        .unwrap();
        assert!(conf.required_dependencies().is_empty());
        let cc = conf.cluster_config().unwrap();
        assert_eq!(cc.max_dist_from_plane(), DEFAULT_MAX_DIST_FROM_PLANE_MM);
        assert_eq!(cc.angle_tolerance(), DEFAULT_GROUND_ANGLE_TOLERANCE_DEGS);
        assert_eq!(cc.clustering_strictness(), DEFAULT_CLUSTERING_STRICTNESS);
    }

    #[test]
    fn test_missing_required_field() {
        let err = ObstaclesDepthConfig::from_json(r#"{"min_points_in_plane": 10}"#).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation(_)));
    }

    #[test]
    fn test_empty_camera_name_is_no_dependency() {
        let mut json = valid_json();
        json["camera_name"] = serde_json::json!("");
        let conf = ObstaclesDepthConfig::from_value(json).unwrap();
        assert!(conf.default_camera().is_none());
        assert!(conf.required_dependencies().is_empty());
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let cases = [
            ("clustering_strictness", serde_json::json!(0.0)),
            ("clustering_strictness", serde_json::json!(1.01)),
            ("min_points_in_plane", serde_json::json!(0)),
            ("min_points_in_segment", serde_json::json!(0)),
            ("min_points_in_segment", serde_json::json!(-3)),
            ("max_dist_from_plane_mm", serde_json::json!(0.0)),
            ("clustering_radius", serde_json::json!(0)),
            ("clustering_radius", serde_json::json!(-1)),
            ("ground_angle_tolerance_degs", serde_json::json!(-5.0)),
            ("ground_angle_tolerance_degs", serde_json::json!(181.0)),
        ];
        for (field, value) in cases {
            let mut json = valid_json();
            json[field] = value.clone();
            let conf = ObstaclesDepthConfig::from_value(json).unwrap();
            assert!(
                matches!(conf.cluster_config(), Err(Error::ConfigValidation(_))),
                "{field} = {value} should be rejected"
            );
        }
    }

    #[test]
    fn test_builder_normalizes_ground_normal() {
        let cc = ClusterConfig::builder(1, 1, 10)
            .ground_normal(Vector3::new(0.0, 0.0, 2.0))
            .build()
            .unwrap();
        assert_eq!(*cc.ground_normal(), Vector3::new(0.0, 0.0, 1.0));
        assert!(ClusterConfig::builder(1, 1, 10)
            .ground_normal(Vector3::zeros())
            .build()
            .is_err());
    }

    #[test]
    fn test_zero_angle_tolerance_is_allowed() {
        assert!(ClusterConfig::builder(1, 1, 10).angle_tolerance(0.0).build().is_ok());
    }
}
