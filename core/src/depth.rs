//! Depth map representation
//!
//! One frame of range readings in millimetres, stored row-major.

use crate::{Error, Result};

/// Reading that means the sensor got no return for the pixel.
pub const INVALID_DEPTH: u16 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthMap {
    width: u32,
    height: u32,
    data: Vec<u16>,
}

impl DepthMap {
    pub fn new(width: u32, height: u32, data: Vec<u16>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(Error::InvalidInput(format!(
                "Depth buffer has {} readings, expected {}x{} = {}",
                data.len(),
                width,
                height,
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A frame with no valid readings.
    pub fn zeros(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![INVALID_DEPTH; width as usize * height as usize],
        }
    }

    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> u16,
    {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u16] {
        &self.data
    }

    /// True when the frame has no cells at all.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(self.index(x, y)).copied()
    }

    /// Fails with [`Error::InvalidInput`] outside the frame.
    pub fn set(&mut self, x: u32, y: u32, value: u16) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(Error::InvalidInput(format!(
                "pixel ({x}, {y}) is outside the {}x{} depth map",
                self.width, self.height
            )));
        }
        let idx = self.index(x, y);
        self.data[idx] = value;
        Ok(())
    }

    /// Readings of row `y`, or `None` past the last row.
    pub fn row(&self, y: u32) -> Option<&[u16]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.width as usize;
        self.data.get(start..start + self.width as usize)
    }

    /// Readings other than [`INVALID_DEPTH`], in row-major order.
    pub fn valid_readings(&self) -> impl Iterator<Item = u16> + '_ {
        self.data.iter().copied().filter(|&d| d != INVALID_DEPTH)
    }

    pub fn valid_count(&self) -> usize {
        self.valid_readings().count()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}
