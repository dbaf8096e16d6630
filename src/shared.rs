use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use nalgebra::Point3;

/// Sensor space points handed from the sensor loop to the scene update.
///
/// Writers replace the whole content and readers copy it out, each under a
/// single lock, so nobody ever observes a half-filled buffer.
#[derive(Debug, Clone, Default)]
pub struct SharedPointBuffer {
    points: Arc<Mutex<Vec<Point3<f32>>>>,
}

impl SharedPointBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Point3<f32>>> {
        // keep serving frames after a panicked holder
        self.points.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clear and refill in one critical section.
    pub fn replace<I: IntoIterator<Item = Point3<f32>>>(&self, points: I) {
        let mut guard = self.lock();

        guard.clear();
        guard.extend(points);
    }

    /// Copy of the current points.
    pub fn snapshot(&self) -> Vec<Point3<f32>> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
