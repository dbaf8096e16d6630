use std::time::Duration;

use log::{debug, info};

use crate::{
    calibration::CalibrationMatrices,
    mesh::MeshUpdater,
    projector::SceneProjector,
    shared::SharedPointBuffer,
    transform::{compose_view, TransformParameters},
    Error,
};

use super::SceneContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKind {
    /// Nothing projected
    Blank,
    /// Texture follows the tracked sheet of paper
    PaperTracking,
}

/// Everything scene states are built from.
#[derive(Debug, Clone)]
pub struct SceneResources {
    pub calibration: CalibrationMatrices,
    pub transform: TransformParameters,
    /// Written by the marker tracker
    pub points: SharedPointBuffer,
}

/// Projects the tracked marker corners onto the quad mesh.
#[derive(Debug)]
pub struct PaperTracking {
    calibration: CalibrationMatrices,
    transform: TransformParameters,
    points: SharedPointBuffer,
    projector: Option<SceneProjector>,
    updater: MeshUpdater,
}

impl PaperTracking {
    fn new(resources: &SceneResources) -> Self {
        Self {
            calibration: resources.calibration,
            transform: resources.transform,
            points: resources.points.clone(),
            projector: None,
            updater: MeshUpdater::new(),
        }
    }

    /// Place the scene camera where the projector sits, once.
    fn startup(&mut self, ctx: &mut SceneContext) -> Result<(), Error> {
        let transform = self.transform.compose();
        let inverse = transform.invert()?;
        let view = compose_view(&self.calibration.view, &inverse);

        debug!("Scene view matrix: {}", view);

        ctx.camera.set_custom_projection_matrix(self.calibration.projection);
        ctx.camera.set_custom_view_matrix(view);
        self.projector = Some(SceneProjector::new(&transform));

        Ok(())
    }

    fn update(&mut self, ctx: &mut SceneContext) -> bool {
        let Some(projector) = &self.projector else {
            return false;
        };

        let points = projector.project_all(&self.points.snapshot());

        self.updater.update(&mut *ctx.mesh, &points)
    }
}

/// A scene state, built by [`SceneState::create`].
#[derive(Debug)]
pub enum SceneState {
    Blank,
    PaperTracking(PaperTracking),
}

impl SceneState {
    pub fn create(kind: SceneKind, resources: &SceneResources) -> Self {
        match kind {
            SceneKind::Blank => SceneState::Blank,
            SceneKind::PaperTracking => SceneState::PaperTracking(PaperTracking::new(resources)),
        }
    }

    pub fn kind(&self) -> SceneKind {
        match self {
            SceneState::Blank => SceneKind::Blank,
            SceneState::PaperTracking(_) => SceneKind::PaperTracking,
        }
    }

    pub fn startup(&mut self, ctx: &mut SceneContext) -> Result<(), Error> {
        match self {
            SceneState::Blank => Ok(()),
            SceneState::PaperTracking(state) => state.startup(ctx),
        }
    }

    /// Returns whether the mesh was rewritten.
    pub fn update(&mut self, ctx: &mut SceneContext, _frame_time: Duration) -> bool {
        match self {
            SceneState::Blank => false,
            SceneState::PaperTracking(state) => state.update(ctx),
        }
    }

    pub fn shutdown(&mut self, ctx: &mut SceneContext) {
        match self {
            SceneState::Blank => {}
            SceneState::PaperTracking(state) => {
                state.projector = None;
                ctx.camera.reset_custom_matrices();
            }
        }
    }
}

/// Owns the active scene state and switches between states between frames.
#[derive(Debug)]
pub struct StateManager {
    resources: SceneResources,
    active: Option<SceneState>,
    pending: Option<SceneKind>,
}

impl StateManager {
    pub fn new(resources: SceneResources) -> Self {
        Self {
            resources,
            active: None,
            pending: None,
        }
    }

    pub fn active_kind(&self) -> Option<SceneKind> {
        self.active.as_ref().map(SceneState::kind)
    }

    /// Schedule `first` for the next update. False when already started.
    pub fn startup(&mut self, first: SceneKind) -> bool {
        if self.active.is_some() || self.pending.is_some() {
            return false;
        }

        self.pending = Some(first);

        true
    }

    /// Schedule a switch to `kind`. False when it is already the active state.
    pub fn request_state_change(&mut self, kind: SceneKind) -> bool {
        if self.active_kind() == Some(kind) {
            self.pending = None;
            return false;
        }

        self.pending = Some(kind);

        true
    }

    /// Apply a pending switch, then update the active state.
    /// Fails only when the new state cannot start.
    pub fn update(&mut self, ctx: &mut SceneContext, frame_time: Duration) -> Result<bool, Error> {
        if let Some(kind) = self.pending.take() {
            if let Some(mut previous) = self.active.take() {
                previous.shutdown(ctx);
            }

            let mut state = SceneState::create(kind, &self.resources);
            state.startup(ctx)?;

            info!("Switched to {:?} state", kind);
            self.active = Some(state);
        }

        Ok(self
            .active
            .as_mut()
            .is_some_and(|state| state.update(ctx, frame_time)))
    }

    pub fn shutdown(&mut self, ctx: &mut SceneContext) {
        self.pending = None;

        if let Some(mut state) = self.active.take() {
            state.shutdown(ctx);
        }
    }
}
