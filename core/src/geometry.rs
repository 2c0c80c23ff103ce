use crate::{Error, Result};
use nalgebra::{Point2, Point3, Vector3};

/// Pinhole calibration of a depth camera. Focal lengths and principal point are in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraIntrinsics {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
    pub width: u32,
    pub height: u32,
    pub distortion: Option<Distortion>,
}

impl CameraIntrinsics {
    pub fn new(fx: f64, fy: f64, cx: f64, cy: f64, width: u32, height: u32) -> Self {
        Self {
            fx,
            fy,
            cx,
            cy,
            width,
            height,
            distortion: None,
        }
    }

    pub fn with_distortion(mut self, distortion: Distortion) -> Self {
        self.distortion = Some(distortion);
        self
    }

    /// Checks `fx, fy > 0` and that every parameter, distortion included, is finite.
    pub fn validate(&self) -> Result<()> {
        if !(self.fx.is_finite() && self.fx > 0.0) || !(self.fy.is_finite() && self.fy > 0.0) {
            return Err(Error::Projection(format!(
                "focal lengths must be positive, got fx={} fy={}",
                self.fx, self.fy
            )));
        }
        if !self.cx.is_finite() || !self.cy.is_finite() {
            return Err(Error::Projection(format!(
                "principal point must be finite, got ({}, {})",
                self.cx, self.cy
            )));
        }
        if let Some(d) = &self.distortion {
            if !d.is_finite() {
                return Err(Error::Projection(format!(
                    "distortion coefficients must be finite, got {d:?}"
                )));
            }
        }
        Ok(())
    }

    pub fn is_well_formed(&self) -> bool {
        self.validate().is_ok()
    }

    /// Back-projects a pixel at the given depth into the camera frame.
    ///
    /// Returns `None` when the pixel lies outside the region where the
    /// distortion model can be inverted.
    pub fn unproject(&self, pixel: Point2<f64>, depth: f64) -> Option<Point3<f64>> {
        let mut x = (pixel.x - self.cx) / self.fx;
        let mut y = (pixel.y - self.cy) / self.fy;
        if let Some(distortion) = &self.distortion {
            (x, y) = distortion.remove(x, y)?;
        }
        let point = Point3::new(x * depth, y * depth, depth);
        point.coords.iter().all(|c| c.is_finite()).then_some(point)
    }

    pub fn project(&self, point: &Point3<f64>) -> Option<Point2<f64>> {
        if point.z.abs() < 1e-12 {
            return None;
        }
        let mut x = point.x / point.z;
        let mut y = point.y / point.z;
        if let Some(distortion) = &self.distortion {
            (x, y) = distortion.apply(x, y);
        }
        Some(Point2::new(x * self.fx + self.cx, y * self.fy + self.cy))
    }
}

const UNDISTORT_MAX_ITERATIONS: usize = 50;
/// Residual in normalised image coordinates.
const UNDISTORT_TOLERANCE: f64 = 1e-9;

/// Brown-Conrady lens distortion coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distortion {
    pub k1: f64,
    pub k2: f64,
    pub p1: f64,
    pub p2: f64,
    pub k3: f64,
}

impl Distortion {
    pub fn new(k1: f64, k2: f64, p1: f64, p2: f64, k3: f64) -> Self {
        Self { k1, k2, p1, p2, k3 }
    }

    pub fn none() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0, 0.0)
    }

    pub fn is_finite(&self) -> bool {
        [self.k1, self.k2, self.p1, self.p2, self.k3]
            .iter()
            .all(|c| c.is_finite())
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let r2 = x * x + y * y;
        let radial = 1.0 + self.k1 * r2 + self.k2 * r2 * r2 + self.k3 * r2 * r2 * r2;
        let dx = 2.0 * self.p1 * x * y + self.p2 * (r2 + 2.0 * x * x);
        let dy = self.p1 * (r2 + 2.0 * y * y) + 2.0 * self.p2 * x * y;
        (x * radial + dx, y * radial + dy)
    }

    /// Fixed-point inversion of [`Distortion::apply`].
    ///
    /// Returns `None` if the iteration does not converge, which happens far
    /// from the optical axis with strong barrel coefficients.
    pub fn remove(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let mut xu = x;
        let mut yu = y;
        for _ in 0..UNDISTORT_MAX_ITERATIONS {
            let (xd, yd) = self.apply(xu, yu);
            let (ex, ey) = (x - xd, y - yd);
            if !(ex.is_finite() && ey.is_finite()) {
                return None;
            }
            if ex * ex + ey * ey < UNDISTORT_TOLERANCE * UNDISTORT_TOLERANCE {
                return Some((xu, yu));
            }
            xu += ex;
            yu += ey;
        }
        None
    }
}

impl Default for Distortion {
    fn default() -> Self {
        Self::none()
    }
}

/// Plane in Hesse normal form: `normal · p = offset`, with `normal` of unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    normal: Vector3<f64>,
    offset: f64,
}

impl Plane {
    /// Returns `None` for a zero or non-finite normal.
    pub fn new(normal: Vector3<f64>, offset: f64) -> Option<Self> {
        let norm = normal.norm();
        if !norm.is_finite() || norm < 1e-12 || !offset.is_finite() {
            return None;
        }
        Some(Self {
            normal: normal / norm,
            offset: offset / norm,
        })
    }

    pub fn from_point_normal(point: &Point3<f64>, normal: &Vector3<f64>) -> Option<Self> {
        let norm = normal.norm();
        if !norm.is_finite() || norm < 1e-12 {
            return None;
        }
        let unit = normal / norm;
        Self::new(unit, unit.dot(&point.coords))
    }

    pub fn normal(&self) -> &Vector3<f64> {
        &self.normal
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) - self.offset
    }

    pub fn distance(&self, point: &Point3<f64>) -> f64 {
        self.signed_distance(point).abs()
    }
}

/// Angle in degrees between the lines spanned by `a` and `b`, in `[0, 90]`.
///
/// Returns `None` if either vector is zero.
pub fn line_angle_deg(a: &Vector3<f64>, b: &Vector3<f64>) -> Option<f64> {
    let na = a.norm();
    let nb = b.norm();
    if na < 1e-12 || nb < 1e-12 {
        return None;
    }
    let cos = (a.dot(b) / (na * nb)).abs().min(1.0);
    Some(cos.acos().to_degrees())
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3<f64>>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut min = *first;
        let mut max = *first;
        for p in iter {
            min = min.inf(p);
            max = max.sup(p);
        }
        Some(Self { min, max })
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn half_extents(&self) -> Vector3<f64> {
        (self.max - self.min) / 2.0
    }

    pub fn contains(&self, point: &Point3<f64>) -> bool {
        point.x >= self.min.x
            && point.y >= self.min.y
            && point.z >= self.min.z
            && point.x <= self.max.x
            && point.y <= self.max.y
            && point.z <= self.max.z
    }
}
