//! Surface normal estimation
//!
//! PCA over the k nearest neighbours of each point: the normal is the
//! eigenvector of the neighbourhood covariance with the smallest eigenvalue.

use crate::spatial::{as_query, build_tree, is_finite, IndexedPoint};
use nalgebra::{Matrix3, Point3, SymmetricEigen, Vector3};
use obstacles_core::PointCloudf64;
use rayon::prelude::*;

/// Neighbourhood size used by the ground segmenter.
pub const DEFAULT_NORMAL_NEIGHBORS: usize = 16;

/// A neighbourhood whose second eigenvalue is below this fraction of the
/// largest is treated as collinear and gets no normal.
const DEGENERACY_RATIO: f64 = 1e-4;

/// Per-point unit normals, `None` where the neighbourhood cannot define a plane
/// or the point itself is not finite.
pub fn estimate_normals(points: &[Point3<f64>], k: usize) -> Vec<Option<Vector3<f64>>> {
    if points.is_empty() {
        return Vec::new();
    }

    let tree = build_tree(points);
    let k = k.max(3);

    points
        .par_iter()
        .map(|p| {
            if !is_finite(p) {
                return None;
            }
            let query_point = as_query(p);
            let neighbors: Vec<&IndexedPoint> =
                tree.nearest_neighbor_iter(&query_point).take(k).collect();
            if neighbors.len() < 3 {
                return None;
            }
            fit_normal(neighbors.iter().map(|n| &n.1))
        })
        .collect()
}

/// Estimate normals and store them on the cloud. Degenerate points get a zero vector.
pub fn estimate_cloud_normals(pc: &mut PointCloudf64, k: usize) {
    let normals = estimate_normals(&pc.points, k)
        .into_iter()
        .map(|n| n.unwrap_or_else(Vector3::zeros))
        .collect();
    pc.normals = Some(normals);
}

/// Smallest-variance direction of a point set, or `None` if the set is collinear.
pub(crate) fn fit_normal<'a, I>(points: I) -> Option<Vector3<f64>>
where
    I: Iterator<Item = &'a Point3<f64>> + Clone,
{
    let (_, cov) = covariance(points)?;
    smallest_eigenvector(&cov)
}

/// Centroid and covariance of a point set.
pub(crate) fn covariance<'a, I>(points: I) -> Option<(Vector3<f64>, Matrix3<f64>)>
where
    I: Iterator<Item = &'a Point3<f64>> + Clone,
{
    let mut centroid = Vector3::zeros();
    let mut count = 0usize;
    for p in points.clone() {
        centroid += p.coords;
        count += 1;
    }
    if count == 0 {
        return None;
    }
    centroid /= count as f64;

    let mut cov = Matrix3::zeros();
    for p in points {
        let d = p.coords - centroid;
        cov += d * d.transpose();
    }
    cov /= count as f64;
    Some((centroid, cov))
}

pub(crate) fn smallest_eigenvector(cov: &Matrix3<f64>) -> Option<Vector3<f64>> {
    let eigen = SymmetricEigen::new(*cov);

    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));
    let largest = eigen.eigenvalues[order[2]];
    let middle = eigen.eigenvalues[order[1]];
    if !largest.is_finite() || largest <= 0.0 || middle <= largest * DEGENERACY_RATIO {
        return None;
    }

    let normal = eigen.eigenvectors.column(order[0]).into_owned();
    let norm = normal.norm();
    if !norm.is_finite() || norm < 1e-12 {
        return None;
    }
    Some(normal / norm)
}
