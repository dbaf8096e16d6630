use log::trace;
use nalgebra::{Point2, Point3};

use crate::sensor::{CoordinateMapper, DepthFrame, DepthImagePoint};

/// Color pixels to sensor space through the device's alignment table.
pub struct SensorSpaceMapper<'a, M: CoordinateMapper + ?Sized> {
    mapper: &'a M,
    color_width: usize,
    /// Depth pixel for every color pixel of the current frame
    alignment: Vec<DepthImagePoint>,
}

impl<'a, M: CoordinateMapper + ?Sized> SensorSpaceMapper<'a, M> {
    /// Build the alignment table of `depth` once for all lookups of this frame.
    pub fn new(mapper: &'a M, depth: &DepthFrame, color_width: usize) -> Self {
        Self {
            mapper,
            color_width,
            alignment: mapper.map_color_frame_to_depth_frame(depth),
        }
    }

    /// Row-major index of a color pixel, `None` when it falls outside the table.
    pub fn index_of(&self, pixel: Point2<f32>) -> Option<usize> {
        let index = pixel.y.round() as i64 * self.color_width as i64 + pixel.x.round() as i64;

        (index >= 0 && (index as usize) < self.alignment.len()).then_some(index as usize)
    }

    pub fn map_point(&self, pixel: Point2<f32>) -> Option<Point3<f32>> {
        let index = self.index_of(pixel)?;

        self.mapper.map_depth_point_to_skeleton_point(self.alignment[index])
    }

    /// Sensor space positions of `pixels`, in order, skipping those that do not map.
    pub fn map_points(&self, pixels: &[Point2<f32>]) -> Vec<Point3<f32>> {
        pixels
            .iter()
            .filter_map(|pixel| {
                let point = self.map_point(*pixel);

                if point.is_none() {
                    trace!("Dropping color pixel ({}, {})", pixel.x, pixel.y);
                }

                point
            })
            .collect()
    }
}
