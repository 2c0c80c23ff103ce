use crate::geometry::Aabb;
use crate::point_cloud::PointCloudf64;
use nalgebra::{Point3, Vector3};

/// Region occupied by an obstacle, in camera-frame millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    /// A single representative point with no extent.
    Point(Point3<f64>),
    /// Axis-aligned box.
    Box {
        center: Point3<f64>,
        half_extents: Vector3<f64>,
    },
}

impl Geometry {
    pub fn center(&self) -> Point3<f64> {
        match self {
            Geometry::Point(p) => *p,
            Geometry::Box { center, .. } => *center,
        }
    }
}

impl From<Aabb> for Geometry {
    fn from(bb: Aabb) -> Self {
        Geometry::Box {
            center: bb.center(),
            half_extents: bb.half_extents(),
        }
    }
}

/// One detected obstacle together with the points it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub geometry: Geometry,
    pub centroid: Point3<f64>,
    pub cloud: PointCloudf64,
}

impl Obstacle {
    pub fn from_point(point: Point3<f64>) -> Self {
        Self {
            geometry: Geometry::Point(point),
            centroid: point,
            cloud: PointCloudf64::new(vec![point]),
        }
    }

    /// Boxes the cloud by its extent. Returns `None` for an empty cloud.
    pub fn from_cloud(cloud: PointCloudf64) -> Option<Self> {
        let bounds = Aabb::from_points(&cloud.points)?;
        let centroid = cloud.centroid()?;
        Some(Self {
            geometry: bounds.into(),
            centroid,
            cloud,
        })
    }

    pub fn num_points(&self) -> usize {
        self.cloud.len()
    }
}
