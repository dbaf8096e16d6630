pub mod analysis;
pub mod calibration;
pub mod config;
pub mod mapper;
pub mod marker;
pub mod mesh;
pub mod projector;
pub mod scene;
pub mod sensor;
pub mod shared;
pub mod throttle;
pub mod tracker;
pub mod transform;

use thiserror::Error;

pub use calibration::CalibrationMatrices;
pub use config::Config;
pub use transform::{RigidTransform, TransformParameters};

pub const COLOR_WIDTH: usize = 640;
pub const COLOR_HEIGHT: usize = 480;
pub const DEPTH_WIDTH: usize = 640;
pub const DEPTH_HEIGHT: usize = 480;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] toml::de::Error),
    #[error("Section \"{0}\" not found in calibration file")]
    SectionNotFound(String),
    #[error("Malformed matrix in section \"{section}\": expected 16 values, found {found}")]
    MalformedMatrix { section: String, found: usize },
    #[error("Transform is not invertible")]
    SingularMatrix,
    #[error("{0} is only possible while the sensor is running")]
    OnlyWhileRunning(&'static str),
    #[error("Frame buffer has {actual} elements, expected {expected}")]
    FrameSize { expected: usize, actual: usize },
    #[error("Image analysis failed: {0}")]
    Analysis(String),
    #[cfg(feature = "opencv")]
    #[error(transparent)]
    OpenCv(#[from] opencv::Error),
}
