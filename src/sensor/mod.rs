mod frame;
mod params;
mod registration;
mod synthetic;

use nalgebra::Point3;

pub use frame::{ColorFrame, ColorSpace, DepthFrame, FramePair};
pub use params::{ColorParams, IrParams};
pub use registration::Registration;
pub use synthetic::{SyntheticScene, SyntheticSensor};

use crate::Error;

/// Depth+color capture device.
///
/// `poll_frames` hands out the latest synchronised pair; `None` means the
/// device had nothing ready for this tick.
pub trait Sensor {
    fn running(&self) -> bool;

    /// Start streaming.
    fn start(&mut self) -> Result<(), Error>;

    fn poll_frames(&mut self) -> Result<Option<FramePair>, Error>;

    /// Stop streaming.
    fn stop(&mut self) -> Result<(), Error>;
}

/// Pixel of the depth image together with its measured distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthImagePoint {
    pub x: i32,
    pub y: i32,
    /// Distance in millimeter, 0 when no depth pixel maps here
    pub depth: f32,
}

impl DepthImagePoint {
    pub const INVALID: Self = Self {
        x: 0,
        y: 0,
        depth: 0.0,
    };

    pub fn is_valid(&self) -> bool {
        self.depth > 0.0
    }
}

/// Alignment between the color image, the depth image and the 3-D sensor space.
pub trait CoordinateMapper {
    /// For every color pixel (row-major) the depth pixel seeing the same spot.
    fn map_color_frame_to_depth_frame(&self, depth: &DepthFrame) -> Vec<DepthImagePoint>;

    /// 3-D position (meter) of a depth pixel, `None` when its depth is invalid.
    fn map_depth_point_to_skeleton_point(&self, point: DepthImagePoint) -> Option<Point3<f32>>;
}
