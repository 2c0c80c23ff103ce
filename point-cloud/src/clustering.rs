//! Region-growing clustering
//!
//! Connected components of the graph where two points are adjacent when their
//! Euclidean distance is at most `radius * strictness`. Components are grown
//! breadth-first from seeds taken in input order, so clusters come out ordered
//! by the index of their first point.

use crate::spatial::{as_query, build_tree, ensure_finite};
use nalgebra::Point3;
use obstacles_core::{Error, Obstacle, PointCloudf64, Result};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionGrowingParams {
    /// Neighbour radius in millimetres.
    pub radius: f64,
    /// Scales the radius; must be in `(0, 1]`. Lower values merge less.
    pub strictness: f64,
    /// Smaller components are dropped as noise.
    pub min_points: usize,
}

impl RegionGrowingParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(Error::Clustering(format!(
                "clustering radius must be positive, got {}",
                self.radius
            )));
        }
        if !(self.strictness > 0.0 && self.strictness <= 1.0) {
            return Err(Error::Clustering(format!(
                "clustering strictness must be in (0, 1], got {}",
                self.strictness
            )));
        }
        if self.min_points == 0 {
            return Err(Error::Clustering(
                "min points in segment must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn effective_radius(&self) -> f64 {
        self.radius * self.strictness
    }
}

/// Member indices of one cluster, ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub indices: Vec<usize>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn to_obstacle(&self, cloud: &PointCloudf64) -> Option<Obstacle> {
        Obstacle::from_cloud(cloud.select(&self.indices))
    }
}

/// Component label of every point for neighbour radius `radius`.
///
/// Labels are dense and numbered in order of each component's lowest index.
/// Returns the labels and the number of components.
pub fn label_components(points: &[Point3<f64>], radius: f64) -> (Vec<usize>, usize) {
    let n = points.len();
    let mut labels: Vec<Option<usize>> = vec![None; n];
    if n == 0 {
        return (Vec::new(), 0);
    }

    let tree = build_tree(points);
    let r2 = radius * radius;
    let mut next = 0usize;
    let mut queue = VecDeque::new();

    for seed in 0..n {
        if labels[seed].is_some() {
            continue;
        }
        labels[seed] = Some(next);
        queue.push_back(seed);

        while let Some(current) = queue.pop_front() {
            for nb in tree.locate_within_distance(as_query(&points[current]), r2) {
                if labels[nb.0].is_none() {
                    labels[nb.0] = Some(next);
                    queue.push_back(nb.0);
                }
            }
        }
        next += 1;
    }

    (labels.into_iter().map(|l| l.unwrap_or(0)).collect(), next)
}

/// Group points into clusters and drop those below `min_points`.
///
/// An empty input gives no clusters; it is not an error.
pub fn cluster_region_growing(
    points: &[Point3<f64>],
    params: &RegionGrowingParams,
) -> Result<Vec<Cluster>> {
    params.validate()?;
    if points.is_empty() {
        return Ok(Vec::new());
    }
    ensure_finite(points)?;

    let (labels, count) = label_components(points, params.effective_radius());
    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); count];
    for (i, &label) in labels.iter().enumerate() {
        groups[label].push(i);
    }

    let clusters: Vec<Cluster> = groups
        .into_iter()
        .filter(|g| g.len() >= params.min_points)
        .map(|indices| Cluster { indices })
        .collect();

    tracing::debug!(
        points = points.len(),
        components = count,
        kept = clusters.len(),
        radius = params.effective_radius(),
        "clustered points"
    );

    Ok(clusters)
}

/// Cluster a cloud and box every surviving cluster as an obstacle.
pub fn cluster_obstacles(cloud: &PointCloudf64, params: &RegionGrowingParams) -> Result<Vec<Obstacle>> {
    let clusters = cluster_region_growing(&cloud.points, params)?;
    Ok(clusters
        .iter()
        .filter_map(|c| c.to_obstacle(cloud))
        .collect())
}
