use nalgebra::{Point2, Point3, RealField, Scalar, Vector3};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud<T: Scalar = f64> {
    pub points: Vec<Point3<T>>,
    pub normals: Option<Vec<Vector3<T>>>,
    /// Source pixel `(u, v)` of each point, when the cloud came from a depth map.
    pub pixels: Option<Vec<Point2<u32>>>,
}

impl<T: Scalar> PointCloud<T> {
    pub fn new(points: Vec<Point3<T>>) -> Self {
        Self {
            points,
            normals: None,
            pixels: None,
        }
    }

    pub fn with_normals(mut self, normals: Vec<Vector3<T>>) -> crate::Result<Self> {
        if normals.len() == self.points.len() {
            self.normals = Some(normals);
            Ok(self)
        } else {
            Err(crate::Error::InvalidInput(format!(
                "Normal count {} does not match point count {}",
                normals.len(),
                self.points.len()
            )))
        }
    }

    pub fn with_pixels(mut self, pixels: Vec<Point2<u32>>) -> crate::Result<Self> {
        if pixels.len() == self.points.len() {
            self.pixels = Some(pixels);
            Ok(self)
        } else {
            Err(crate::Error::InvalidInput(format!(
                "Pixel count {} does not match point count {}",
                pixels.len(),
                self.points.len()
            )))
        }
    }

    /// Sub-cloud with the given indices, in the order given. Per-point attributes follow.
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            points: indices.iter().map(|&i| self.points[i].clone()).collect(),
            normals: self
                .normals
                .as_ref()
                .map(|n| indices.iter().map(|&i| n[i].clone()).collect()),
            pixels: self
                .pixels
                .as_ref()
                .map(|p| indices.iter().map(|&i| p[i]).collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl<T: RealField + Copy> PointCloud<T> {
    pub fn centroid(&self) -> Option<Point3<T>> {
        if self.points.is_empty() {
            return None;
        }
        let mut sum = Vector3::zeros();
        for p in &self.points {
            sum += p.coords;
        }
        Some(Point3::from(sum / nalgebra::convert::<f64, T>(self.points.len() as f64)))
    }
}

pub type PointCloudf64 = PointCloud<f64>;
