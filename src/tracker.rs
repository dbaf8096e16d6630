use std::time::Instant;

use log::{debug, trace, warn};

use crate::{
    analysis::ImageAnalysis,
    config::{Config, DetectionConfig},
    mapper::SensorSpaceMapper,
    marker::{detect_marker, MarkerExtractor},
    sensor::{CoordinateMapper, FramePair},
    shared::SharedPointBuffer,
    throttle::FrameThrottle,
};

/// What happened to a frame handed to [`MarkerTracker::on_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Arrived before the throttle interval elapsed
    Throttled,
    /// The sensor had no frame
    NoFrame,
    /// No usable marker in the color image
    NoMarker,
    /// Marker corners were written to the shared buffer, this many mapped
    Mapped(usize),
}

/// Sensor side of the pipeline: marker detection, corner ordering and mapping
/// into sensor space, publishing the result to a [`SharedPointBuffer`].
pub struct MarkerTracker<A, M> {
    analysis: A,
    mapper: M,
    extractor: MarkerExtractor,
    detection: DetectionConfig,
    throttle: FrameThrottle,
    points: SharedPointBuffer,
}

impl<A: ImageAnalysis, M: CoordinateMapper> MarkerTracker<A, M> {
    pub fn new(config: &Config, analysis: A, mapper: M, points: SharedPointBuffer) -> Self {
        Self {
            analysis,
            mapper,
            extractor: MarkerExtractor::new(),
            detection: config.detection.clone(),
            throttle: FrameThrottle::new(config.tracking.throttle_interval()),
            points,
        }
    }

    pub fn points(&self) -> &SharedPointBuffer {
        &self.points
    }

    /// Handle the frame pair delivered at `now`. Never fails: anything going
    /// wrong leaves the shared buffer as it was.
    pub fn on_frame(&mut self, frames: Option<&FramePair>, now: Instant) -> FrameOutcome {
        let Some(frames) = frames else {
            trace!("No frame from sensor");
            return FrameOutcome::NoFrame;
        };

        if !self.throttle.try_begin(now) {
            return FrameOutcome::Throttled;
        }

        let outcome = self.process(frames);
        self.throttle.finish();

        debug!("Frame {}: {:?}", frames.color.sequence, outcome);

        outcome
    }

    fn process(&self, frames: &FramePair) -> FrameOutcome {
        let detection = match detect_marker(&self.analysis, &frames.color, &self.detection) {
            Ok(Some(detection)) => detection,
            Ok(None) => return FrameOutcome::NoMarker,
            Err(error) => {
                warn!("Marker detection failed on frame {}: {}", frames.color.sequence, error);
                return FrameOutcome::NoMarker;
            }
        };

        let Some(corners) = self.extractor.extract(&detection.candidate, detection.centroid()) else {
            return FrameOutcome::NoMarker;
        };

        let mapper = SensorSpaceMapper::new(&self.mapper, &frames.depth, frames.color.width);
        let points = mapper.map_points(&corners);
        let count = points.len();

        self.points.replace(points);

        FrameOutcome::Mapped(count)
    }
}
