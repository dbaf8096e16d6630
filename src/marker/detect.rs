use log::trace;
use nalgebra::{Point2, Vector2};

use crate::{
    analysis::{GrayImage, ImageAnalysis, Moments, Rect},
    config::DetectionConfig,
    sensor::ColorFrame,
    Error,
};

use super::{centroid, MarkerCandidate};

/// Largest marker-like region of a color frame, in full-frame pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerDetection {
    pub candidate: MarkerCandidate,
    /// Moments of the contour the candidate was approximated from
    pub moments: Moments,
}

impl MarkerDetection {
    pub fn centroid(&self) -> Point2<f32> {
        centroid(&self.moments)
    }

    fn translate(&mut self, offset: Vector2<i32>) {
        self.candidate.points.iter_mut().for_each(|point| *point += offset);

        self.moments.m10 += offset.x as f64 * self.moments.m00;
        self.moments.m01 += offset.y as f64 * self.moments.m00;
    }
}

/// Threshold the frame, approximate every outer contour by a polygon and keep
/// the largest one whose bounding box is wider than `min_marker_width`.
pub fn detect_marker<A: ImageAnalysis + ?Sized>(
    analysis: &A,
    frame: &ColorFrame,
    config: &DetectionConfig,
) -> Result<Option<MarkerDetection>, Error> {
    let gray = GrayImage::from_color_frame(frame, config.roi)?;
    let binary = analysis.threshold_binary(&gray, config.threshold, config.max_value)?;
    let contours = analysis.find_contours(&binary)?;
    let mut best: Option<MarkerDetection> = None;

    for contour in &contours {
        let polygon = analysis.approx_poly(contour, contour.perimeter() * config.approx_epsilon)?;

        let Some(bounds) = Rect::bounding(&polygon) else {
            continue;
        };

        if bounds.width <= config.min_marker_width {
            continue;
        }

        let moments = analysis.moments(contour)?;

        if best.as_ref().is_some_and(|best| best.moments.m00 >= moments.m00) {
            continue;
        }

        best = Some(MarkerDetection {
            candidate: MarkerCandidate::new(polygon),
            moments,
        });
    }

    trace!(
        "Frame {}: {} contours, marker {}",
        frame.sequence,
        contours.len(),
        if best.is_some() { "found" } else { "not found" }
    );

    if let (Some(detection), Some(roi)) = (best.as_mut(), config.roi) {
        detection.translate(roi_origin(frame, roi));
    }

    Ok(best)
}

/// Top-left pixel of `roi` once clamped to the frame.
fn roi_origin(frame: &ColorFrame, roi: Rect) -> Vector2<i32> {
    Vector2::new(roi.x.clamp(0, frame.width as i32), roi.y.clamp(0, frame.height as i32))
}
