use std::{
    env,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use log::{debug, info, warn};
use tokio::task::JoinHandle;
use origami::{
    analysis::CpuAnalysis,
    mesh::VertexBufferMesh,
    scene::{HeadlessCamera, SceneContext, SceneKind, SceneResources, StateManager},
    sensor::{Registration, Sensor, SyntheticScene, SyntheticSensor},
    shared::SharedPointBuffer,
    tracker::MarkerTracker,
    CalibrationMatrices, Config, Error,
};

const DEFAULT_CONFIG: &str = "origami.toml";
const DEFAULT_SECONDS: u64 = 10;
const SENSOR_PERIOD: Duration = Duration::from_millis(33);
const FRAME_PERIOD: Duration = Duration::from_millis(16);

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let seconds = args
        .next()
        .and_then(|seconds| seconds.parse().ok())
        .unwrap_or(DEFAULT_SECONDS);

    let config = Config::load_or_default(&config_path)?;
    let calibration = CalibrationMatrices::load(&config.calibration_file)?;
    info!("Loaded calibration from {}", config.calibration_file);

    let points = SharedPointBuffer::new();
    let running = Arc::new(AtomicBool::new(true));

    let producer = {
        let config = config.clone();
        let points = points.clone();
        let running = running.clone();

        tokio::task::spawn_blocking(move || -> Result<(), Error> {
            let mut sensor = SyntheticSensor::new(&config.sensor, SyntheticScene::default());
            let mut tracker = MarkerTracker::new(
                &config,
                CpuAnalysis::new(),
                Registration::new(&config.sensor),
                points,
            );

            sensor.start()?;

            while running.load(Ordering::Relaxed) {
                let frames = sensor.poll_frames()?;
                tracker.on_frame(frames.as_ref(), Instant::now());

                thread::sleep(SENSOR_PERIOD);
            }

            sensor.stop()
        })
    };

    let mut manager = StateManager::new(SceneResources {
        calibration,
        transform: config.transform,
        points,
    });
    let mut camera = HeadlessCamera::new();
    let mut mesh = VertexBufferMesh::new();
    let mut ctx = SceneContext::new(&mut camera, &mut mesh);
    let mut ticker = tokio::time::interval(FRAME_PERIOD);
    let deadline = tokio::time::Instant::now() + Duration::from_secs(seconds);
    let mut last = Instant::now();

    manager.startup(SceneKind::PaperTracking);

    let outcome = async {
        while tokio::time::Instant::now() < deadline {
            ticker.tick().await;

            let now = Instant::now();

            if manager.update(&mut ctx, now - last)? {
                debug!("Mesh updated");
            }

            last = now;
        }

        Ok::<_, Error>(())
    }
    .await;

    manager.shutdown(&mut ctx);
    stop_producer(&running, producer, outcome).await?;

    info!("{} mesh updates, last quad {:?}", mesh.updates(), mesh.quad());

    Ok(())
}

/// Stop the sensor task and wait for it, whatever ended the render loop.
/// A render error wins over a sensor error.
async fn stop_producer(
    running: &AtomicBool,
    producer: JoinHandle<Result<(), Error>>,
    outcome: Result<(), Error>,
) -> Result<(), Error> {
    running.store(false, Ordering::Relaxed);

    let sensor = match producer.await {
        Ok(result) => result,
        Err(error) => {
            warn!("Sensor task ended abnormally: {}", error);
            Ok(())
        }
    };

    outcome.and(sensor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spin_until_stopped(running: Arc<AtomicBool>) -> JoinHandle<Result<(), Error>> {
        tokio::task::spawn_blocking(move || {
            while running.load(Ordering::Relaxed) {
                thread::sleep(Duration::from_millis(1));
            }

            Ok(())
        })
    }

    #[tokio::test]
    async fn render_error_still_stops_the_sensor_task() {
        let running = Arc::new(AtomicBool::new(true));
        let producer = spin_until_stopped(running.clone());

        let result = stop_producer(&running, producer, Err(Error::SingularMatrix)).await;

        assert!(matches!(result, Err(Error::SingularMatrix)));
        assert!(!running.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn sensor_error_is_reported_after_a_clean_run() {
        let running = Arc::new(AtomicBool::new(true));
        let producer = tokio::task::spawn_blocking(|| Err(Error::SingularMatrix));

        let result = stop_producer(&running, producer, Ok(())).await;

        assert!(matches!(result, Err(Error::SingularMatrix)));
    }
}
