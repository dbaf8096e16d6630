use std::time::{Duration, Instant};

use approx::assert_relative_eq;
use nalgebra::{Matrix4, Point2, Point3};
use origami::{
    analysis::CpuAnalysis,
    config::SensorConfig,
    mesh::VertexBufferMesh,
    scene::{HeadlessCamera, SceneContext, SceneKind, SceneResources, StateManager},
    sensor::{ColorParams, IrParams, Registration, Sensor, SyntheticScene, SyntheticSensor},
    shared::SharedPointBuffer,
    tracker::{FrameOutcome, MarkerTracker},
    CalibrationMatrices, Config, TransformParameters,
};

const WIDTH: usize = 320;
const HEIGHT: usize = 240;

/// Depth and color cameras sharing the same optics and position.
fn aligned_config() -> Config {
    let ir = IrParams {
        fx: 100.0,
        fy: 100.0,
        cx: 160.0,
        cy: 120.0,
        ..IrParams::default()
    };

    Config {
        transform: TransformParameters {
            height_meters: 0.0,
            distance_meters: 0.0,
            angle_degrees: 0.0,
        },
        sensor: SensorConfig {
            color_width: WIDTH,
            color_height: HEIGHT,
            depth_width: WIDTH,
            depth_height: HEIGHT,
            ir,
            color: ColorParams {
                fx: ir.fx,
                fy: ir.fy,
                cx: ir.cx,
                cy: ir.cy,
                translation: [0.0; 3],
            },
        },
        ..Config::default()
    }
}

fn sheet() -> SyntheticScene {
    SyntheticScene {
        corners: [
            Point2::new(80.0, 60.0),
            Point2::new(240.0, 60.0),
            Point2::new(240.0, 180.0),
            Point2::new(80.0, 180.0),
        ],
        wobble: 0.0,
        plane_depth: 1000.0,
        ..SyntheticScene::default()
    }
}

#[test]
fn sheet_ends_up_on_the_mesh() {
    let config = aligned_config();
    let points = SharedPointBuffer::new();
    let mut sensor = SyntheticSensor::new(&config.sensor, sheet());
    let mut tracker = MarkerTracker::new(
        &config,
        CpuAnalysis::new(),
        Registration::new(&config.sensor),
        points.clone(),
    );
    let mut manager = StateManager::new(SceneResources {
        calibration: CalibrationMatrices {
            projection: Matrix4::identity(),
            view: Matrix4::identity(),
        },
        transform: config.transform,
        points,
    });
    let mut camera = HeadlessCamera::new();
    let mut mesh = VertexBufferMesh::new();
    let mut ctx = SceneContext::new(&mut camera, &mut mesh);

    manager.startup(SceneKind::PaperTracking);

    // nothing tracked yet
    assert!(!manager.update(&mut ctx, Duration::ZERO).unwrap());

    sensor.start().unwrap();
    let frames = sensor.poll_frames().unwrap();

    assert_eq!(tracker.on_frame(frames.as_ref(), Instant::now()), FrameOutcome::Mapped(4));
    assert!(manager.update(&mut ctx, Duration::from_millis(16)).unwrap());

    let expected = [
        Point3::new(-0.805, 0.605, 1.0),
        Point3::new(-0.805, -0.595, 1.0),
        Point3::new(0.795, -0.595, 1.0),
        Point3::new(0.795, 0.605, 1.0),
    ];
    let texcoords = [
        Point2::new(0.0, 0.0),
        Point2::new(0.0, 1.0),
        Point2::new(1.0, 1.0),
        Point2::new(1.0, 0.0),
    ];

    assert_eq!(mesh.vertices().len(), 4);
    assert_eq!(mesh.indices(), &[0, 1, 2, 0, 2, 3]);

    for ((vertex, position), texcoord) in mesh.vertices().iter().zip(expected).zip(texcoords) {
        assert_relative_eq!(vertex.position, position, epsilon = 1e-5);
        assert_eq!(vertex.texcoord, texcoord);
    }
}

#[test]
fn lost_marker_keeps_last_quad() {
    let config = aligned_config();
    let points = SharedPointBuffer::new();
    let mut sensor = SyntheticSensor::new(&config.sensor, sheet());
    let mut tracker = MarkerTracker::new(
        &config,
        CpuAnalysis::new(),
        Registration::new(&config.sensor),
        points.clone(),
    );
    let mut manager = StateManager::new(SceneResources {
        calibration: CalibrationMatrices {
            projection: Matrix4::identity(),
            view: Matrix4::identity(),
        },
        transform: config.transform,
        points,
    });
    let mut camera = HeadlessCamera::new();
    let mut mesh = VertexBufferMesh::new();
    let mut ctx = SceneContext::new(&mut camera, &mut mesh);
    let start = Instant::now();

    manager.startup(SceneKind::PaperTracking);
    sensor.start().unwrap();

    let frames = sensor.poll_frames().unwrap().unwrap();
    tracker.on_frame(Some(&frames), start);
    manager.update(&mut ctx, Duration::ZERO).unwrap();

    let mut dark = frames.clone();
    dark.color.buffer.fill(0);

    assert_eq!(
        tracker.on_frame(Some(&dark), start + Duration::from_secs(1)),
        FrameOutcome::NoMarker
    );
    assert_eq!(tracker.on_frame(None, start + Duration::from_secs(2)), FrameOutcome::NoFrame);

    manager.update(&mut ctx, Duration::from_millis(16)).unwrap();

    let quad = mesh.quad().unwrap();

    assert_relative_eq!(quad.vertices[0].position, Point3::new(-0.805, 0.605, 1.0), epsilon = 1e-5);
}
