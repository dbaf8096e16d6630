mod cpu;
#[cfg(feature = "opencv")]
mod opencv;

pub use cpu::CpuAnalysis;
#[cfg(feature = "opencv")]
pub use self::opencv::OpenCvAnalysis;

use std::fmt::{self, Debug};

use nalgebra::Point2;
use serde::Deserialize;

use crate::{
    sensor::{ColorFrame, ColorSpace},
    Error,
};

/// Binary thresholding, contour extraction, polygon approximation and image moments.
///
/// Everything the marker detection needs from an image-analysis library.
pub trait ImageAnalysis {
    /// Pixels brighter than `threshold` become `max_value`, all others 0.
    fn threshold_binary(&self, image: &GrayImage, threshold: u8, max_value: u8) -> Result<GrayImage, Error>;

    /// Outer contours of the non-zero regions.
    fn find_contours(&self, binary: &GrayImage) -> Result<Vec<Contour>, Error>;

    /// Closed polygon approximating `contour` within `epsilon` pixels.
    fn approx_poly(&self, contour: &Contour, epsilon: f64) -> Result<Vec<Point2<i32>>, Error>;

    fn moments(&self, contour: &Contour) -> Result<Moments, Error>;
}

/// Axis aligned rectangle in pixel, `width`/`height` count pixels (inclusive extents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Smallest rectangle containing every point, `None` for an empty set.
    pub fn bounding(points: &[Point2<i32>]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);

        for point in &points[1..] {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }

        Some(Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        })
    }

    /// Last column inside the rectangle
    pub fn right(&self) -> i32 {
        self.x + self.width - 1
    }

    /// Last row inside the rectangle
    pub fn bottom(&self) -> i32 {
        self.y + self.height - 1
    }
}

/// Spatial moments up to first order.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl Moments {
    /// Moments of the area enclosed by a closed polygon (Green's theorem).
    /// The sign is normalised so `m00` is never negative, whatever the winding.
    pub fn of_polygon(points: &[Point2<i32>]) -> Self {
        let mut moments = Self::default();

        if points.len() < 3 {
            return moments;
        }

        for (index, a) in points.iter().enumerate() {
            let b = &points[(index + 1) % points.len()];
            let (xa, ya, xb, yb) = (a.x as f64, a.y as f64, b.x as f64, b.y as f64);
            let cross = xa * yb - xb * ya;

            moments.m00 += cross;
            moments.m10 += (xa + xb) * cross;
            moments.m01 += (ya + yb) * cross;
        }

        moments.m00 /= 2.0;
        moments.m10 /= 6.0;
        moments.m01 /= 6.0;

        if moments.m00 < 0.0 {
            moments.m00 = -moments.m00;
            moments.m10 = -moments.m10;
            moments.m01 = -moments.m01;
        }

        moments
    }
}

/// Ordered boundary points of a region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contour {
    pub points: Vec<Point2<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point2<i32>>) -> Self {
        Self { points }
    }

    /// Length of the closed curve.
    pub fn perimeter(&self) -> f64 {
        let count = self.points.len();

        if count < 2 {
            return 0.0;
        }

        (0..count)
            .map(|index| {
                let a = self.points[index];
                let b = self.points[(index + 1) % count];

                ((b - a).cast::<f64>()).norm()
            })
            .sum()
    }

    pub fn bounding_rect(&self) -> Option<Rect> {
        Rect::bounding(&self.points)
    }
}

/// Single channel 8-bit image.
#[derive(Clone, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub buffer: Vec<u8>,
}

impl GrayImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            buffer: vec![0; width * height],
        }
    }

    /// Luminance of `frame` restricted to `roi` (clamped to the frame).
    pub fn from_color_frame(frame: &ColorFrame, roi: Option<Rect>) -> Result<Self, Error> {
        let bytes_per_pixel = frame.color_space.bytes_per_pixel();
        let expected = frame.width * frame.height * bytes_per_pixel;

        if frame.buffer.len() < expected {
            return Err(Error::FrameSize {
                expected,
                actual: frame.buffer.len(),
            });
        }

        let (x0, y0, x1, y1) = match roi {
            Some(roi) => (
                roi.x.clamp(0, frame.width as i32) as usize,
                roi.y.clamp(0, frame.height as i32) as usize,
                roi.x.saturating_add(roi.width).clamp(0, frame.width as i32) as usize,
                roi.y.saturating_add(roi.height).clamp(0, frame.height as i32) as usize,
            ),
            None => (0, 0, frame.width, frame.height),
        };
        let width = x1.saturating_sub(x0);
        let height = y1.saturating_sub(y0);
        let (r, g, b) = frame.color_space.channel_offsets();

        let luma_row = |row: &mut [u8], y: usize| {
            let line = &frame.buffer[((y0 + y) * frame.width + x0) * bytes_per_pixel..];

            for (x, value) in row.iter_mut().enumerate() {
                let pixel = &line[x * bytes_per_pixel..];
                let luma = 299 * pixel[r] as u32 + 587 * pixel[g] as u32 + 114 * pixel[b] as u32;

                *value = ((luma + 500) / 1000) as u8;
            }
        };

        let mut image = Self::new(width, height);

        if width == 0 {
            return Ok(image);
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            image
                .buffer
                .par_chunks_mut(width)
                .enumerate()
                .for_each(|(y, row)| luma_row(row, y));
        }
        #[cfg(not(feature = "parallel"))]
        image
            .buffer
            .chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| luma_row(row, y));

        Ok(image)
    }
}

impl Debug for GrayImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrayImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("buffer_length", &self.buffer.len())
            .finish()
    }
}

impl ColorSpace {
    /// Byte offsets of the red, green and blue channels inside a pixel.
    const fn channel_offsets(&self) -> (usize, usize, usize) {
        match self {
            ColorSpace::RGB | ColorSpace::RGBA => (0, 1, 2),
            ColorSpace::BGR | ColorSpace::BGRA => (2, 1, 0),
        }
    }
}
