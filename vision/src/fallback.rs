//! Single-obstacle estimate for frames without usable intrinsics.

use nalgebra::Point3;
use obstacles_core::{DepthMap, Error, Obstacle, Result};

/// Lower median of the valid readings in millimetres.
///
/// Selects index `floor(count / 2)` of the sorted valid readings, so an
/// even count picks the upper of the two middle values.
pub fn median_depth(depth: &DepthMap) -> Result<u16> {
    let mut readings: Vec<u16> = depth.valid_readings().collect();
    if readings.is_empty() {
        return Err(Error::EmptyDepthData(format!(
            "no valid depth readings in {}x{} frame",
            depth.width(),
            depth.height()
        )));
    }
    let mid = readings.len() / 2;
    let (_, median, _) = readings.select_nth_unstable(mid);
    Ok(*median)
}

/// One obstacle straight ahead of the camera at the median depth.
pub fn estimate_fallback_obstacle(depth: &DepthMap) -> Result<Obstacle> {
    let median = median_depth(depth)?;
    tracing::debug!(median_mm = median, "fallback obstacle estimate");
    Ok(Obstacle::from_point(Point3::new(0.0, 0.0, median as f64)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use obstacles_core::Geometry;

    #[test]
    fn test_median_of_odd_count() {
        let depth = DepthMap::new(5, 1, vec![10, 20, 30, 40, 50]).unwrap();
        assert_eq!(median_depth(&depth).unwrap(), 30);

        let obstacle = estimate_fallback_obstacle(&depth).unwrap();
        assert_eq!(obstacle.geometry, Geometry::Point(Point3::new(0.0, 0.0, 30.0)));
        assert_eq!(obstacle.num_points(), 1);
    }

    #[test]
    fn test_median_ignores_invalid_and_order() {
        let depth = DepthMap::new(3, 2, vec![0, 50, 10, 0, 40, 20]).unwrap();
        // valid: 10, 20, 40, 50 -> index 2
        assert_eq!(median_depth(&depth).unwrap(), 40);
    }

    #[test]
    fn test_all_invalid_is_empty_depth_data() {
        let depth = DepthMap::zeros(4, 4);
        assert!(matches!(median_depth(&depth), Err(Error::EmptyDepthData(_))));
        assert!(matches!(
            estimate_fallback_obstacle(&depth),
            Err(Error::EmptyDepthData(_))
        ));
    }

    #[test]
    fn test_single_reading() {
        let depth = DepthMap::new(2, 1, vec![0, 777]).unwrap();
        assert_eq!(median_depth(&depth).unwrap(), 777);
    }
}
