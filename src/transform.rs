use nalgebra::{Isometry3, Matrix4, Translation3, UnitQuaternion, Vector3};
use serde::Deserialize;

use crate::Error;

/// Placement of the sensor relative to the scene origin.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TransformParameters {
    /// Height above the scene origin (meter)
    pub height_meters: f32,
    /// Standoff along the scene Z axis (meter)
    pub distance_meters: f32,
    /// Tilt about the X axis (degree)
    pub angle_degrees: f32,
}

impl Default for TransformParameters {
    fn default() -> Self {
        Self {
            height_meters: 0.80,
            distance_meters: -0.10,
            angle_degrees: 70.0,
        }
    }
}

impl TransformParameters {
    pub fn compose(&self) -> RigidTransform {
        RigidTransform::compose(self.height_meters, self.distance_meters, self.angle_degrees)
    }
}

/// Rotation about X followed by a translation, stored as a homogeneous matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    matrix: Matrix4<f32>,
}

impl RigidTransform {
    /// Single make-transform composition: the rotation orients the frame,
    /// `(0, height, distance)` becomes its origin.
    pub fn compose(height: f32, distance: f32, angle_degrees: f32) -> Self {
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), angle_degrees.to_radians());
        let translation = Translation3::new(0.0, height, distance);

        Self {
            matrix: Isometry3::from_parts(translation, rotation).to_homogeneous(),
        }
    }

    pub fn from_matrix(matrix: Matrix4<f32>) -> Self {
        Self { matrix }
    }

    pub fn matrix(&self) -> &Matrix4<f32> {
        &self.matrix
    }

    /// Exact inverse of the full 4x4 matrix. Non-finite entries, before or
    /// after inversion, count as singular.
    pub fn invert(&self) -> Result<Self, Error> {
        let finite = |matrix: &Matrix4<f32>| matrix.iter().all(|value| value.is_finite());

        if !finite(&self.matrix) {
            return Err(Error::SingularMatrix);
        }

        self.matrix
            .try_inverse()
            .filter(finite)
            .map(Self::from_matrix)
            .ok_or(Error::SingularMatrix)
    }
}

/// Scene view matrix handed to the renderer: `view * inverse`.
pub fn compose_view(view: &Matrix4<f32>, inverse: &RigidTransform) -> Matrix4<f32> {
    view * inverse.matrix()
}
