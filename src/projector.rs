use nalgebra::{Matrix4, Point3};

use crate::transform::RigidTransform;

/// Moves sensor space points into the render scene.
#[derive(Debug, Clone, Copy)]
pub struct SceneProjector {
    transform: Matrix4<f32>,
}

impl SceneProjector {
    pub fn new(transform: &RigidTransform) -> Self {
        Self {
            transform: *transform.matrix(),
        }
    }

    /// `transform * (-x, y, z, 1)`; the sensor mirrors the x axis relative to the scene.
    pub fn project(&self, point: &Point3<f32>) -> Point3<f32> {
        self.transform.transform_point(&Point3::new(-point.x, point.y, point.z))
    }

    pub fn project_all(&self, points: &[Point3<f32>]) -> Vec<Point3<f32>> {
        points.iter().map(|point| self.project(point)).collect()
    }
}
