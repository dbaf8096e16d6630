mod camera;
mod state;

pub use camera::{HeadlessCamera, SceneCamera};
pub use state::{PaperTracking, SceneKind, SceneResources, SceneState, StateManager};

use crate::mesh::DynamicMesh;

/// Render engine objects handed to the active scene state on every call.
pub struct SceneContext<'a> {
    pub camera: &'a mut dyn SceneCamera,
    pub mesh: &'a mut dyn DynamicMesh,
}

impl<'a> SceneContext<'a> {
    pub fn new(camera: &'a mut dyn SceneCamera, mesh: &'a mut dyn DynamicMesh) -> Self {
        Self { camera, mesh }
    }
}
