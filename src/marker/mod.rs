mod detect;
mod order;

pub use detect::{detect_marker, MarkerDetection};
pub use order::{compare, order_around, precedes, winding};

use log::trace;
use nalgebra::Point2;

use crate::analysis::{Moments, Rect};

/// Marker corners in color pixels, ordered around the centroid.
pub type MarkerCorners = [Point2<f32>; 4];

/// Polygon approximation of the detected marker contour, any number of points.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerCandidate {
    pub points: Vec<Point2<i32>>,
}

impl MarkerCandidate {
    pub fn new(points: Vec<Point2<i32>>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Corners of the bounding rectangle in the order top-left, bottom-left,
    /// top-right, bottom-right. `None` when the rectangle has no area.
    pub fn fallback_quad(&self) -> Option<[Point2<i32>; 4]> {
        let rect = Rect::bounding(&self.points)?;

        if rect.width <= 1 || rect.height <= 1 {
            return None;
        }

        Some([
            Point2::new(rect.x, rect.y),
            Point2::new(rect.x, rect.bottom()),
            Point2::new(rect.right(), rect.y),
            Point2::new(rect.right(), rect.bottom()),
        ])
    }

    /// The candidate itself when it has exactly four points, its fallback quad otherwise.
    pub fn working_set(&self) -> Option<[Point2<i32>; 4]> {
        match self.points.as_slice() {
            [] => None,
            [a, b, c, d] => Some([*a, *b, *c, *d]),
            _ => self.fallback_quad(),
        }
    }
}

/// Center of mass of the marker contour, `(m10 / m00, m01 / m00)`.
/// The origin when the contour has no area.
pub fn centroid(moments: &Moments) -> Point2<f32> {
    if moments.m00 == 0.0 {
        return Point2::origin();
    }

    Point2::new(
        (moments.m10 / moments.m00) as f32,
        (moments.m01 / moments.m00) as f32,
    )
}

/// Turns a detected candidate into four consistently wound corners.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkerExtractor;

impl MarkerExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, candidate: &MarkerCandidate, centroid: Point2<f32>) -> Option<MarkerCorners> {
        let Some(working_set) = candidate.working_set() else {
            trace!("Discarding marker candidate with {} points", candidate.len());
            return None;
        };

        if candidate.len() != 4 {
            trace!("Marker candidate has {} points, using its bounding rectangle", candidate.len());
        }

        let mut corners = working_set.map(|point| point.cast::<f32>());
        order_around(&mut corners, centroid);

        Some(corners)
    }
}
