use nalgebra::Matrix4;

/// Render engine camera whose matrices can be overridden.
pub trait SceneCamera {
    fn set_custom_projection_matrix(&mut self, projection: Matrix4<f32>);

    fn set_custom_view_matrix(&mut self, view: Matrix4<f32>);

    /// Back to the engine computed matrices.
    fn reset_custom_matrices(&mut self);
}

/// [`SceneCamera`] that only records the overrides it receives.
#[derive(Debug, Default, Clone)]
pub struct HeadlessCamera {
    projection: Option<Matrix4<f32>>,
    view: Option<Matrix4<f32>>,
    /// Number of matrices pushed so far
    overrides: usize,
}

impl HeadlessCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn projection(&self) -> Option<&Matrix4<f32>> {
        self.projection.as_ref()
    }

    pub fn view(&self) -> Option<&Matrix4<f32>> {
        self.view.as_ref()
    }

    pub fn overrides(&self) -> usize {
        self.overrides
    }
}

impl SceneCamera for HeadlessCamera {
    fn set_custom_projection_matrix(&mut self, projection: Matrix4<f32>) {
        self.projection = Some(projection);
        self.overrides += 1;
    }

    fn set_custom_view_matrix(&mut self, view: Matrix4<f32>) {
        self.view = Some(view);
        self.overrides += 1;
    }

    fn reset_custom_matrices(&mut self) {
        self.projection = None;
        self.view = None;
    }
}
