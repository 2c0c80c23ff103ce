//! Ground plane segmentation
//!
//! The ground orientation is assumed known up to a tolerance. Steps:
//! 1. points whose local normal is within `angle_tolerance_deg` of `ground_normal`
//!    become ground candidates;
//! 2. candidates are narrowed to the most populated height band (width
//!    `max_dist_from_plane`) along the ground normal, so raised flat surfaces do
//!    not pull the fit;
//! 3. a least-squares plane is fitted through the band, then refitted through
//!    every candidate within `max_dist_from_plane` of it until that inlier set
//!    stops changing;
//! 4. every point within `max_dist_from_plane` of that plane is ground.
//!
//! There is no random sampling, so a frame always segments the same way.

use crate::normals::{covariance, estimate_normals, smallest_eigenvector, DEFAULT_NORMAL_NEIGHBORS};
use crate::spatial::ensure_finite;
use nalgebra::{Point3, Vector3};
use obstacles_core::{line_angle_deg, Error, Plane, PointCloudf64, Result};

/// Parameters for [`segment_ground`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundPlaneParams {
    /// Expected ground normal in the camera frame. Need not be unit length.
    pub ground_normal: Vector3<f64>,
    pub angle_tolerance_deg: f64,
    /// Millimetres.
    pub max_dist_from_plane: f64,
    pub min_points_in_plane: usize,
    /// Neighbourhood size for normal estimation.
    pub normal_neighbors: usize,
}

impl Default for GroundPlaneParams {
    fn default() -> Self {
        Self {
            ground_normal: Vector3::new(0.0, -1.0, 0.0),
            angle_tolerance_deg: 30.0,
            max_dist_from_plane: 100.0,
            min_points_in_plane: 100,
            normal_neighbors: DEFAULT_NORMAL_NEIGHBORS,
        }
    }
}

impl GroundPlaneParams {
    pub fn validate(&self) -> Result<()> {
        let norm = self.ground_normal.norm();
        if !norm.is_finite() || norm < 1e-12 {
            return Err(Error::ConfigValidation(format!(
                "ground normal must be a finite non-zero vector, got {:?}",
                self.ground_normal.as_slice()
            )));
        }
        if !(0.0..=180.0).contains(&self.angle_tolerance_deg) {
            return Err(Error::ConfigValidation(format!(
                "angle tolerance must be within [0, 180] degrees, got {}",
                self.angle_tolerance_deg
            )));
        }
        if !(self.max_dist_from_plane.is_finite() && self.max_dist_from_plane > 0.0) {
            return Err(Error::ConfigValidation(format!(
                "max distance from plane must be positive, got {}",
                self.max_dist_from_plane
            )));
        }
        if self.min_points_in_plane == 0 {
            return Err(Error::ConfigValidation(
                "min points in plane must be at least 1".to_string(),
            ));
        }
        if self.normal_neighbors < 3 {
            return Err(Error::ConfigValidation(format!(
                "normal estimation needs at least 3 neighbours, got {}",
                self.normal_neighbors
            )));
        }
        Ok(())
    }

    fn unit_normal(&self) -> Vector3<f64> {
        self.ground_normal.normalize()
    }
}

/// Ground / non-ground partition of a cloud. Both index lists are ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroundSegmentation {
    /// Fitted ground plane, oriented to agree with the expected normal.
    /// `None` only for an empty input cloud.
    pub plane: Option<Plane>,
    pub ground: Vec<usize>,
    pub non_ground: Vec<usize>,
}

impl GroundSegmentation {
    pub fn non_ground_cloud(&self, cloud: &PointCloudf64) -> PointCloudf64 {
        cloud.select(&self.non_ground)
    }

}

/// Split `cloud` into ground and non-ground points.
///
/// An empty cloud yields an empty partition. Fails with
/// [`Error::InsufficientPlaneData`] when fewer than `min_points_in_plane` points
/// support the ground plane, or the supporting points do not define a plane
/// within tolerance of `ground_normal`.
pub fn segment_ground(cloud: &PointCloudf64, params: &GroundPlaneParams) -> Result<GroundSegmentation> {
    params.validate()?;
    if cloud.is_empty() {
        return Ok(GroundSegmentation::default());
    }
    ensure_finite(&cloud.points)?;

    let up = params.unit_normal();
    let normals = estimate_normals(&cloud.points, params.normal_neighbors);

    let candidates: Vec<usize> = normals
        .iter()
        .enumerate()
        .filter_map(|(i, n)| {
            let angle = line_angle_deg(n.as_ref()?, &up)?;
            (angle <= params.angle_tolerance_deg).then_some(i)
        })
        .collect();
    if candidates.len() < params.min_points_in_plane {
        return Err(Error::InsufficientPlaneData(format!(
            "found {} ground candidates, need at least {}",
            candidates.len(),
            params.min_points_in_plane
        )));
    }

    let band = densest_height_band(&cloud.points, &candidates, &up, params.max_dist_from_plane);

    // A band holding a single image row is collinear; seed from all candidates then.
    let seed = fit_plane(band.iter().map(|&i| &cloud.points[i]), &up)
        .or_else(|| fit_plane(candidates.iter().map(|&i| &cloud.points[i]), &up))
        .ok_or_else(|| {
            Error::InsufficientPlaneData("ground candidates do not span a plane".to_string())
        })?;
    let (plane, support) = refine_plane(
        &cloud.points,
        &candidates,
        seed,
        &up,
        params.max_dist_from_plane,
    );
    if support < params.min_points_in_plane {
        return Err(Error::InsufficientPlaneData(format!(
            "refined ground plane has {} supporting points, need at least {}",
            support, params.min_points_in_plane
        )));
    }
    let deviation = line_angle_deg(plane.normal(), &up).unwrap_or(90.0);
    if deviation > params.angle_tolerance_deg {
        return Err(Error::InsufficientPlaneData(format!(
            "fitted ground plane is {:.1} degrees off the expected normal (tolerance {})",
            deviation, params.angle_tolerance_deg
        )));
    }

    let (ground, non_ground) = partition_by_plane(&cloud.points, &plane, params.max_dist_from_plane);

    tracing::debug!(
        candidates = candidates.len(),
        band = band.len(),
        support,
        ground = ground.len(),
        non_ground = non_ground.len(),
        offset = plane.offset(),
        "segmented ground plane"
    );

    Ok(GroundSegmentation {
        plane: Some(plane),
        ground,
        non_ground,
    })
}

/// Classify points against a known plane: `(ground, non_ground)` index lists.
pub fn partition_by_plane(
    points: &[Point3<f64>],
    plane: &Plane,
    max_dist: f64,
) -> (Vec<usize>, Vec<usize>) {
    let mut ground = Vec::new();
    let mut non_ground = Vec::new();
    for (i, p) in points.iter().enumerate() {
        if plane.distance(p) <= max_dist {
            ground.push(i);
        } else {
            non_ground.push(i);
        }
    }
    (ground, non_ground)
}

/// Least-squares plane through `points`, its normal flipped to agree with `up`.
pub fn fit_plane<'a, I>(points: I, up: &Vector3<f64>) -> Option<Plane>
where
    I: Iterator<Item = &'a Point3<f64>> + Clone,
{
    let (centroid, cov) = covariance(points)?;
    let mut normal = smallest_eigenvector(&cov)?;
    if normal.dot(up) < 0.0 {
        normal = -normal;
    }
    Plane::from_point_normal(&Point3::from(centroid), &normal)
}

const MAX_REFINE_ITERATIONS: usize = 20;

/// Refit `seed` through the candidates within `max_dist` of it until the
/// inlier set is stable. Returns the plane and its inlier count.
fn refine_plane(
    points: &[Point3<f64>],
    candidates: &[usize],
    seed: Plane,
    up: &Vector3<f64>,
    max_dist: f64,
) -> (Plane, usize) {
    let inliers_of = |plane: &Plane| -> Vec<usize> {
        candidates
            .iter()
            .copied()
            .filter(|&i| plane.distance(&points[i]) <= max_dist)
            .collect()
    };

    let mut plane = seed;
    let mut inliers = inliers_of(&plane);
    for _ in 0..MAX_REFINE_ITERATIONS {
        let Some(next) = fit_plane(inliers.iter().map(|&i| &points[i]), up) else {
            break;
        };
        let next_inliers = inliers_of(&next);
        if next_inliers.len() < inliers.len() {
            break;
        }
        plane = next;
        if next_inliers == inliers {
            break;
        }
        inliers = next_inliers;
    }
    let support = inliers_of(&plane).len();
    (plane, support)
}

/// Candidates falling in the most populated window `[h, h + width]` of heights
/// along `up`. The lowest window wins ties. Returned indices are ascending.
fn densest_height_band(
    points: &[Point3<f64>],
    candidates: &[usize],
    up: &Vector3<f64>,
    width: f64,
) -> Vec<usize> {
    let mut heights: Vec<(f64, usize)> = candidates
        .iter()
        .map(|&i| (up.dot(&points[i].coords), i))
        .collect();
    heights.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut best = (0usize, 0usize);
    let mut hi = 0usize;
    for lo in 0..heights.len() {
        if hi < lo {
            hi = lo;
        }
        while hi < heights.len() && heights[hi].0 - heights[lo].0 <= width {
            hi += 1;
        }
        if hi - lo > best.1 - best.0 {
            best = (lo, hi);
        }
    }

    let mut band: Vec<usize> = heights[best.0..best.1].iter().map(|&(_, i)| i).collect();
    band.sort_unstable();
    band
}
