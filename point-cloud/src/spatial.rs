//! R-tree index over cloud points, keyed by point index.

use nalgebra::Point3;
use obstacles_core::{Error, Result};
use rstar::{PointDistance, RTree, RTreeObject, AABB};

#[derive(Debug, Clone, Copy)]
pub(crate) struct IndexedPoint(pub usize, pub Point3<f64>);

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.1.x, self.1.y, self.1.z])
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.1.x - point[0];
        let dy = self.1.y - point[1];
        let dz = self.1.z - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

/// Non-finite points are left out of the tree.
pub(crate) fn build_tree(points: &[Point3<f64>]) -> RTree<IndexedPoint> {
    let wrappers: Vec<IndexedPoint> = points
        .iter()
        .enumerate()
        .filter(|(_, p)| is_finite(p))
        .map(|(i, p)| IndexedPoint(i, *p))
        .collect();
    RTree::bulk_load(wrappers)
}

#[inline]
pub(crate) fn is_finite(p: &Point3<f64>) -> bool {
    p.coords.iter().all(|c| c.is_finite())
}

pub(crate) fn ensure_finite(points: &[Point3<f64>]) -> Result<()> {
    match points.iter().position(|p| !is_finite(p)) {
        Some(i) => Err(Error::InvalidInput(format!(
            "point {i} is not finite: {:?}",
            points[i].coords.as_slice()
        ))),
        None => Ok(()),
    }
}

#[inline]
pub(crate) fn as_query(p: &Point3<f64>) -> [f64; 3] {
    [p.x, p.y, p.z]
}
