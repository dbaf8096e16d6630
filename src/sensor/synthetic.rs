use log::debug;
use nalgebra::Point2;

use crate::{config::SensorConfig, Error};

use super::{ColorFrame, ColorSpace, DepthFrame, FramePair, Sensor};

/// What the synthetic sensor looks at: a bright sheet on a dark table.
#[derive(Debug, Clone)]
pub struct SyntheticScene {
    /// Sheet corners in color pixels, in drawing order
    pub corners: [Point2<f32>; 4],
    /// Peak horizontal wobble of the sheet between frames (pixel)
    pub wobble: f32,
    /// Distance of the table plane (millimeter)
    pub plane_depth: f32,
    pub sheet_level: u8,
    pub table_level: u8,
    /// Every n-th poll yields no frame
    pub drop_every: Option<u32>,
}

impl Default for SyntheticScene {
    fn default() -> Self {
        Self {
            corners: [
                Point2::new(220.0, 150.0),
                Point2::new(420.0, 160.0),
                Point2::new(410.0, 330.0),
                Point2::new(230.0, 320.0),
            ],
            wobble: 3.0,
            plane_depth: 1200.0,
            sheet_level: 230,
            table_level: 30,
            drop_every: None,
        }
    }
}

/// Hardware-free stand-in for the depth+color device
pub struct SyntheticSensor {
    config: SensorConfig,
    scene: SyntheticScene,
    color_space: ColorSpace,
    sequence: u32,
    running: bool,
}

impl SyntheticSensor {
    pub fn new(config: &SensorConfig, scene: SyntheticScene) -> Self {
        Self {
            config: config.clone(),
            scene,
            color_space: ColorSpace::BGRA,
            sequence: 0,
            running: false,
        }
    }

    /// Sheet corners as drawn in the frame with the given sequence number.
    pub fn corners_at(&self, sequence: u32) -> [Point2<f32>; 4] {
        let offset = self.scene.wobble * (sequence as f32 * 0.1).sin();

        self.scene.corners.map(|corner| Point2::new(corner.x + offset, corner.y))
    }

    fn render(&self) -> FramePair {
        let corners = self.corners_at(self.sequence);
        let bytes_per_pixel = self.color_space.bytes_per_pixel();
        let width = self.config.color_width;
        let mut buffer = Vec::with_capacity(width * self.config.color_height * bytes_per_pixel);

        for y in 0..self.config.color_height {
            for x in 0..width {
                let level = if inside_convex(&corners, Point2::new(x as f32, y as f32)) {
                    self.scene.sheet_level
                } else {
                    self.scene.table_level
                };

                buffer.extend([level; 3]);

                if self.color_space.has_alpha() {
                    buffer.push(u8::MAX);
                }
            }
        }

        FramePair {
            color: ColorFrame {
                color_space: self.color_space,
                width,
                height: self.config.color_height,
                buffer,
                sequence: self.sequence,
                timestamp: self.sequence * 33,
            },
            depth: DepthFrame {
                width: self.config.depth_width,
                height: self.config.depth_height,
                buffer: vec![self.scene.plane_depth; self.config.depth_width * self.config.depth_height],
                sequence: self.sequence,
                timestamp: self.sequence * 33,
            },
        }
    }
}

impl Sensor for SyntheticSensor {
    fn running(&self) -> bool {
        self.running
    }

    fn start(&mut self) -> Result<(), Error> {
        if self.running {
            return Ok(());
        }

        debug!(
            "Synthetic sensor streaming {}x{} color, {}x{} depth",
            self.config.color_width, self.config.color_height, self.config.depth_width, self.config.depth_height
        );
        self.running = true;

        Ok(())
    }

    fn poll_frames(&mut self) -> Result<Option<FramePair>, Error> {
        if !self.running {
            return Err(Error::OnlyWhileRunning("Polling frames"));
        }

        self.sequence = self.sequence.wrapping_add(1);

        if self
            .scene
            .drop_every
            .is_some_and(|every| every > 0 && self.sequence % every == 0)
        {
            return Ok(None);
        }

        Ok(Some(self.render()))
    }

    fn stop(&mut self) -> Result<(), Error> {
        self.running = false;

        Ok(())
    }
}

/// Whether `point` lies inside (or on) the convex polygon `corners`.
fn inside_convex(corners: &[Point2<f32>; 4], point: Point2<f32>) -> bool {
    let mut positive = false;
    let mut negative = false;

    for index in 0..corners.len() {
        let a = corners[index];
        let b = corners[(index + 1) % corners.len()];
        let cross = (b - a).perp(&(point - a));

        positive |= cross > 0.0;
        negative |= cross < 0.0;
    }

    !(positive && negative)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SensorConfig {
        SensorConfig {
            color_width: 64,
            color_height: 48,
            depth_width: 64,
            depth_height: 48,
            ..SensorConfig::default()
        }
    }

    fn square_scene() -> SyntheticScene {
        SyntheticScene {
            corners: [
                Point2::new(10.0, 10.0),
                Point2::new(30.0, 10.0),
                Point2::new(30.0, 30.0),
                Point2::new(10.0, 30.0),
            ],
            wobble: 0.0,
            ..SyntheticScene::default()
        }
    }

    #[test]
    fn polling_requires_start() {
        let mut sensor = SyntheticSensor::new(&small_config(), square_scene());

        assert!(matches!(sensor.poll_frames(), Err(Error::OnlyWhileRunning(_))));

        sensor.start().unwrap();

        assert!(sensor.running());
        assert!(sensor.poll_frames().unwrap().is_some());

        sensor.stop().unwrap();

        assert!(sensor.poll_frames().is_err());
    }

    #[test]
    fn renders_sheet_and_plane() {
        let mut sensor = SyntheticSensor::new(&small_config(), square_scene());
        sensor.start().unwrap();

        let frames = sensor.poll_frames().unwrap().unwrap();
        let pixel = |x: usize, y: usize| frames.color.buffer[(y * 64 + x) * 4];

        assert_eq!(frames.color.buffer.len(), 64 * 48 * 4);
        assert_eq!(pixel(20, 20), 230);
        assert_eq!(pixel(10, 10), 230);
        assert_eq!(pixel(5, 20), 30);
        assert!(frames.depth.buffer.iter().all(|depth| *depth == 1200.0));
    }

    #[test]
    fn drops_frames_periodically() {
        let scene = SyntheticScene {
            drop_every: Some(2),
            ..square_scene()
        };
        let mut sensor = SyntheticSensor::new(&small_config(), scene);
        sensor.start().unwrap();

        assert!(sensor.poll_frames().unwrap().is_some());
        assert!(sensor.poll_frames().unwrap().is_none());
        assert!(sensor.poll_frames().unwrap().is_some());
    }
}
