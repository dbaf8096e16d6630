use serde::Deserialize;

/// Color camera calibration parameters.
/// They are used in Registration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ColorParams {
    /*
        Intrinsic parameters
    */
    /// Focal length x (pixel)
    pub fx: f32,
    /// Focal length y (pixel)
    pub fy: f32,
    /// Principal point x (pixel)
    pub cx: f32,
    /// Principal point y (pixel)
    pub cy: f32,

    /*
        Extrinsic parameters
    */
    /// Position of the depth camera origin seen from the color camera (meter)
    pub translation: [f32; 3],
}

impl Default for ColorParams {
    fn default() -> Self {
        Self {
            fx: 594.21,
            fy: 591.04,
            cx: 339.5,
            cy: 242.7,
            translation: [-0.025, 0.0, 0.0],
        }
    }
}

/// IR camera intrinsic calibration parameters.
/// They are used in depth undistortion, and Registration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct IrParams {
    /// Focal length x (pixel)
    pub fx: f32,
    /// Focal length y (pixel)
    pub fy: f32,
    /// Principal point x (pixel)
    pub cx: f32,
    /// Principal point y (pixel)
    pub cy: f32,
    /// Radial distortion coefficient, 1st-order
    pub k1: f32,
    /// Radial distortion coefficient, 2nd-order
    pub k2: f32,
    /// Radial distortion coefficient, 3rd-order
    pub k3: f32,
    /// Tangential distortion coefficient
    pub p1: f32,
    /// Tangential distortion coefficient
    pub p2: f32,
}

impl Default for IrParams {
    fn default() -> Self {
        Self {
            fx: 580.0,
            fy: 580.0,
            cx: 319.5,
            cy: 239.5,
            k1: 0.0,
            k2: 0.0,
            k3: 0.0,
            p1: 0.0,
            p2: 0.0,
        }
    }
}
