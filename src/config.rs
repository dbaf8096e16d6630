use std::{fs, path::Path, time::Duration};

use log::{info, warn};
use serde::Deserialize;

use crate::{
    analysis::Rect,
    sensor::{ColorParams, IrParams},
    transform::TransformParameters,
    Error, COLOR_HEIGHT, COLOR_WIDTH, DEPTH_HEIGHT, DEPTH_WIDTH,
};

/// Runtime configuration, read from a TOML file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Calibration dump holding the OpenGL projection and view matrices
    pub calibration_file: String,
    pub transform: TransformParameters,
    pub detection: DetectionConfig,
    pub tracking: TrackingConfig,
    pub sensor: SensorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            calibration_file: "device_0.txt".to_string(),
            transform: TransformParameters::default(),
            detection: DetectionConfig::default(),
            tracking: TrackingConfig::default(),
            sensor: SensorConfig::default(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = fs::read_to_string(path)?;

        Ok(toml::from_str(&content)?)
    }

    /// Same as [`Config::load`] but falls back to the defaults when the file does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();

        if !path.exists() {
            warn!("{} not found, using default configuration", path.display());
            return Ok(Self::default());
        }

        let config = Self::load(path)?;
        info!("Loaded configuration from {}", path.display());

        Ok(config)
    }
}

/// Marker detection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Gray level a pixel must exceed to count as marker
    pub threshold: u8,
    /// Value written for pixels above the threshold
    pub max_value: u8,
    /// Polygon approximation accuracy, as a fraction of the contour perimeter
    pub approx_epsilon: f64,
    /// Contours whose approximated bounding box is not wider than this are ignored (pixel)
    pub min_marker_width: i32,
    /// Part of the color image that is analysed, the whole frame when absent
    pub roi: Option<Rect>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold: 60,
            max_value: 255,
            approx_epsilon: 0.015,
            min_marker_width: 20,
            roi: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub throttle_interval_ms: u64,
}

impl TrackingConfig {
    pub fn throttle_interval(&self) -> Duration {
        Duration::from_millis(self.throttle_interval_ms)
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            throttle_interval_ms: 500,
        }
    }
}

/// Frame geometry and factory calibration of the depth+color sensor.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub color_width: usize,
    pub color_height: usize,
    pub depth_width: usize,
    pub depth_height: usize,
    pub ir: IrParams,
    pub color: ColorParams,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            color_width: COLOR_WIDTH,
            color_height: COLOR_HEIGHT,
            depth_width: DEPTH_WIDTH,
            depth_height: DEPTH_HEIGHT,
            ir: IrParams::default(),
            color: ColorParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.calibration_file, "device_0.txt");
        assert_eq!(config.transform.angle_degrees, 70.0);
        assert_eq!(config.transform.height_meters, 0.8);
        assert_eq!(config.transform.distance_meters, -0.1);
        assert_eq!(config.detection.threshold, 60);
        assert_eq!(config.tracking.throttle_interval(), Duration::from_millis(500));
        assert!(config.detection.roi.is_none());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config: Config = toml::from_str(
            r#"
            calibration_file = "rig.txt"

            [transform]
            angle_degrees = 45.0

            [detection]
            threshold = 90
            roi = { x = 150, y = 0, width = 400, height = 250 }
            "#,
        )
        .unwrap();

        assert_eq!(config.calibration_file, "rig.txt");
        assert_eq!(config.transform.angle_degrees, 45.0);
        assert_eq!(config.transform.height_meters, 0.8);
        assert_eq!(config.detection.threshold, 90);
        assert_eq!(config.detection.max_value, 255);
        assert_eq!(
            config.detection.roi,
            Some(Rect {
                x: 150,
                y: 0,
                width: 400,
                height: 250
            })
        );
    }

    #[test]
    fn invalid_content_is_a_config_error() {
        let result: Result<Config, Error> =
            toml::from_str::<Config>("[transform]\nangle_degrees = \"steep\"").map_err(Error::from);

        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load_or_default("/nonexistent/origami.toml").unwrap();

        assert_eq!(config.sensor.color_width, COLOR_WIDTH);
    }
}
