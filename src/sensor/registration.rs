use log::warn;
use nalgebra::{Point3, Vector3};

use crate::config::SensorConfig;

use super::{ColorParams, CoordinateMapper, DepthFrame, DepthImagePoint, IrParams};

const FILTER_WIDTH_HALF: i32 = 2;
const FILTER_HEIGHT_HALF: i32 = 1;

// depth values below this are treated as missing (meter)
const MIN_DEPTH: f32 = 0.001;

/// Maps between the depth camera, the color camera and 3-D sensor space.
pub struct Registration {
    /// Depth camera parameters.
    ir_params: IrParams,
    /// Color camera parameters.
    color_params: ColorParams,
    depth_width: usize,
    depth_height: usize,
    color_width: usize,
    color_height: usize,
    /// Source pixel of the raw depth image for every undistorted pixel
    distort_map: Vec<Option<usize>>,
}

impl Registration {
    pub fn new(config: &SensorConfig) -> Self {
        let mut registration = Self {
            ir_params: config.ir,
            color_params: config.color,
            depth_width: config.depth_width,
            depth_height: config.depth_height,
            color_width: config.color_width,
            color_height: config.color_height,
            distort_map: Vec::new(),
        };

        registration.fill_distort_map();

        registration
    }

    fn fill_distort_map(&mut self) {
        let width = self.depth_width;
        let height = self.depth_height;
        let source_index = |offset: usize| {
            // compute the distorted coordinate for current pixel
            let (mx, my) = self.distort(offset % width, offset / width);
            // rounding the values and check if the pixel is inside the image
            let ix = (mx + 0.5).floor();
            let iy = (my + 0.5).floor();

            (ix >= 0.0 && iy >= 0.0 && (ix as usize) < width && (iy as usize) < height)
                .then(|| iy as usize * width + ix as usize)
        };

        #[cfg(feature = "parallel")]
        let distort_map = {
            use rayon::prelude::*;

            (0..width * height).into_par_iter().map(source_index).collect()
        };
        #[cfg(not(feature = "parallel"))]
        let distort_map = (0..width * height).map(source_index).collect();

        self.distort_map = distort_map;
    }

    pub fn undistort_depth(&self, depth_frame: &DepthFrame) -> DepthFrame {
        let mut undistorted_frame = DepthFrame {
            width: self.depth_width,
            height: self.depth_height,
            buffer: Vec::with_capacity(self.distort_map.len()),
            sequence: depth_frame.sequence,
            timestamp: depth_frame.timestamp,
        };

        for index in &self.distort_map {
            undistorted_frame
                .buffer
                .push(index.and_then(|index| depth_frame.buffer.get(index).copied()).unwrap_or(0.0));
        }

        undistorted_frame
    }

    /// Back-projection of an undistorted depth pixel, `depth` in millimeter.
    pub fn point_to_xyz(&self, x: usize, y: usize, depth: f32) -> Option<Point3<f32>> {
        let depth_val = depth / 1000.0; // scaling factor, so that value of 1 is one meter.

        if depth_val.is_nan() || depth_val <= MIN_DEPTH {
            // depth value is not valid
            return None;
        }

        Some(Point3::new(
            (x as f32 + 0.5 - self.ir_params.cx) * (1.0 / self.ir_params.fx) * depth_val,
            (y as f32 + 0.5 - self.ir_params.cy) * (1.0 / self.ir_params.fy) * depth_val,
            depth_val,
        ))
    }

    /// Offset of the color pixel seeing depth pixel `(x, y)` at `depth` millimeter.
    pub fn depth_to_color(&self, x: usize, y: usize, depth: f32) -> Option<usize> {
        let point = self.point_to_xyz(x, y, depth)? + Vector3::from(self.color_params.translation);

        if point.z <= MIN_DEPTH {
            return None;
        }

        let cx = (self.color_params.fx * point.x / point.z + self.color_params.cx - 0.5).round();
        let cy = (self.color_params.fy * point.y / point.z + self.color_params.cy - 0.5).round();

        // check if the pixel is outside of color image
        if cx < 0.0 || cy < 0.0 || cx as usize >= self.color_width || cy as usize >= self.color_height {
            return None;
        }

        Some(cy as usize * self.color_width + cx as usize)
    }

    pub fn distort(&self, mx: usize, my: usize) -> (f32, f32) {
        // see http://en.wikipedia.org/wiki/Distortion_(optics) for description
        let dx = (mx as f32 - self.ir_params.cx) / self.ir_params.fx;
        let dy = (my as f32 - self.ir_params.cy) / self.ir_params.fy;
        let dx2 = dx * dx;
        let dy2 = dy * dy;
        let r2 = dx2 + dy2;
        let dxdy2 = 2.0 * dx * dy;
        let kr = 1.0 + ((self.ir_params.k3 * r2 + self.ir_params.k2) * r2 + self.ir_params.k1) * r2;

        (
            self.ir_params.fx
                * (dx * kr + self.ir_params.p2 * (r2 + 2.0 * dx2) + self.ir_params.p1 * dxdy2)
                + self.ir_params.cx,
            self.ir_params.fy
                * (dy * kr + self.ir_params.p1 * (r2 + 2.0 * dy2) + self.ir_params.p2 * dxdy2)
                + self.ir_params.cy,
        )
    }

    /// Fill color pixels no depth pixel landed on with the nearest depth of their
    /// neighbourhood, the two cameras do not share the same resolution per degree.
    fn fill_holes(&self, exact: &[DepthImagePoint]) -> Vec<DepthImagePoint> {
        let mut table = exact.to_vec();

        for (offset, entry) in table.iter_mut().enumerate() {
            if entry.is_valid() {
                continue;
            }

            let x = (offset % self.color_width) as i32;
            let y = (offset / self.color_width) as i32;

            for row in -FILTER_HEIGHT_HALF..=FILTER_HEIGHT_HALF {
                for column in -FILTER_WIDTH_HALF..=FILTER_WIDTH_HALF {
                    let (nx, ny) = (x + column, y + row);

                    if nx < 0 || ny < 0 || nx as usize >= self.color_width || ny as usize >= self.color_height {
                        continue;
                    }

                    let neighbour = exact[ny as usize * self.color_width + nx as usize];

                    if neighbour.is_valid() && (!entry.is_valid() || neighbour.depth < entry.depth) {
                        *entry = neighbour;
                    }
                }
            }
        }

        table
    }
}

impl CoordinateMapper for Registration {
    fn map_color_frame_to_depth_frame(&self, depth: &DepthFrame) -> Vec<DepthImagePoint> {
        let mut table = vec![DepthImagePoint::INVALID; self.color_width * self.color_height];

        if depth.width != self.depth_width
            || depth.height != self.depth_height
            || depth.buffer.len() < self.depth_width * self.depth_height
        {
            warn!(
                "Depth frame is {}x{}, registration expects {}x{}",
                depth.width, depth.height, self.depth_width, self.depth_height
            );
            return table;
        }

        let undistorted = self.undistort_depth(depth);
        let width = self.depth_width;
        let project = |offset: usize| {
            let (x, y) = (offset % width, offset / width);
            let z = undistorted.buffer[offset];

            self.depth_to_color(x, y, z).map(|c_off| {
                (
                    c_off,
                    DepthImagePoint {
                        x: x as i32,
                        y: y as i32,
                        depth: z,
                    },
                )
            })
        };

        #[cfg(feature = "parallel")]
        let hits: Vec<_> = {
            use rayon::prelude::*;

            (0..undistorted.buffer.len()).into_par_iter().filter_map(project).collect()
        };
        #[cfg(not(feature = "parallel"))]
        let hits: Vec<_> = (0..undistorted.buffer.len()).filter_map(project).collect();

        // keep the nearest surface when several depth pixels land on the same color pixel
        for (c_off, point) in hits {
            let entry = &mut table[c_off];

            if !entry.is_valid() || point.depth < entry.depth {
                *entry = point;
            }
        }

        self.fill_holes(&table)
    }

    fn map_depth_point_to_skeleton_point(&self, point: DepthImagePoint) -> Option<Point3<f32>> {
        if point.x < 0 || point.y < 0 {
            return None;
        }

        self.point_to_xyz(point.x as usize, point.y as usize, point.depth)
    }
}
