//! Whole-session behavior over the headless backend.

use trigon_engine::config::{SceneConfig, TriangleConfig};
use trigon_engine::core::Session;
use trigon_engine::frame::LoopState;
use trigon_engine::geometry::{LEFT_TRIANGLE, RIGHT_TRIANGLE};
use trigon_engine::gfx::{RecordingBackend, ResourceKind, ShaderError, ShaderStage, Topology};
use trigon_engine::input::{InputEvent, InputState, Key, KeyState};
use trigon_engine::paint::Color;

fn default_session() -> Session<RecordingBackend> {
    Session::new(RecordingBackend::new(), &SceneConfig::default(), Key::Escape).unwrap()
}

fn press(input: &mut InputState, key: Key) {
    input.apply_event(InputEvent::Key {
        key,
        state: KeyState::Pressed,
        repeat: false,
    });
}

#[test]
fn every_frame_draws_two_triangles_of_three_vertices() {
    let mut session = default_session();
    let input = InputState::default();

    for _ in 0..3 {
        assert_eq!(session.step(&input), LoopState::Running);
    }

    let frames = session.backend().frames();
    assert_eq!(frames.len(), 3);
    for frame in frames {
        assert_eq!(frame.clear, Color::rgba(0.5, 0.0, 1.0, 1.0));
        assert_eq!(frame.draws.len(), 2);
        for draw in &frame.draws {
            assert_eq!(draw.topology, Topology::TriangleList);
            assert_eq!(draw.vertices, 0..3);
        }
        // Each triangle has its own program and its own buffer.
        assert_ne!(frame.draws[0].program, frame.draws[1].program);
        assert_ne!(frame.draws[0].geometry, frame.draws[1].geometry);
    }
}

#[test]
fn exit_key_closes_within_one_iteration() {
    let mut session = default_session();
    let mut input = InputState::default();
    session.step(&input);

    press(&mut input, Key::Escape);
    assert_eq!(session.step(&input), LoopState::Closing);
    assert!(session.should_close());

    // The iteration that saw the key still presented; nothing after it does.
    let presented = session.backend().frames().len();
    assert_eq!(presented, 2);
    assert_eq!(session.step(&input), LoopState::Closing);
    assert_eq!(session.backend().frames().len(), presented);
}

#[test]
fn window_close_signal_stops_rendering() {
    let mut session = default_session();
    session.request_close();
    assert_eq!(session.step(&InputState::default()), LoopState::Closing);
    assert!(session.backend().frames().is_empty());
}

#[test]
fn viewport_follows_every_resize_exactly() {
    let mut session = default_session();
    assert_eq!(session.viewport().width, 800);
    assert_eq!(session.viewport().height, 600);

    for (w, h) in [(1, 1), (1920, 1080), (640, 480), (3840, 2160), (801, 599)] {
        session.resize(w, h);
        let v = session.viewport();
        assert_eq!((v.x, v.y, v.width, v.height), (0, 0, w, h));

        session.step(&InputState::default());
        let last = session.backend().frames().last().unwrap();
        assert_eq!((last.viewport.width, last.viewport.height), (w, h));
    }
}

#[test]
fn minimized_window_skips_frames_and_resumes() {
    let mut session = default_session();
    session.resize(0, 0);
    assert_eq!(session.step(&InputState::default()), LoopState::Running);
    assert!(session.backend().frames().is_empty());

    session.resize(800, 600);
    session.step(&InputState::default());
    assert_eq!(session.backend().frames().len(), 1);
}

#[test]
fn vertex_buffers_hold_nine_floats_and_never_change() {
    let mut session = default_session();
    let before: Vec<Vec<u8>> = session
        .geometry()
        .iter()
        .map(|g| g.handle().bytes().to_vec())
        .collect();

    for _ in 0..5 {
        session.step(&InputState::default());
    }

    let geometry = session.geometry();
    assert_eq!(geometry.len(), 2);
    assert_eq!(geometry[0].handle().floats(), LEFT_TRIANGLE.to_vec());
    assert_eq!(geometry[1].handle().floats(), RIGHT_TRIANGLE.to_vec());
    for (g, bytes) in geometry.iter().zip(&before) {
        assert_eq!(g.handle().floats().len(), 9);
        assert_eq!(g.handle().bytes(), bytes.as_slice());
    }
}

#[test]
fn both_triangles_declare_three_position_components() {
    let session = default_session();
    for g in session.geometry() {
        let layout = g.layout();
        assert_eq!(layout.components, 3);
        assert_eq!(layout.stride, 12);
        assert_eq!(layout.offset, 0);
    }
}

#[test]
fn two_component_declaration_is_still_drawable() {
    // The xy-only declaration keeps the xyz stride, so every vertex is still
    // read from the right place.
    let scene = SceneConfig::empty().with_triangle(TriangleConfig {
        position_components: 2,
        ..TriangleConfig::solid(RIGHT_TRIANGLE, Color::BLACK)
    });

    let mut session = Session::new(RecordingBackend::new(), &scene, Key::Escape).unwrap();
    session.step(&InputState::default());

    let layout = session.geometry()[0].layout();
    assert_eq!((layout.components, layout.stride), (2, 12));
    assert_eq!(session.backend().frames()[0].draws[0].vertices, 0..3);
}

#[test]
fn broken_shader_is_reported_and_the_loop_keeps_running() {
    let mut scene = SceneConfig::default();
    scene.triangles[0].fragment_shader =
        "@fragment fn fs_main() -> @location(0) vec4<f32> {".into();

    let mut session = Session::new(RecordingBackend::new(), &scene, Key::Escape).unwrap();
    assert!(session.programs()[0].is_none());
    assert!(session.programs()[1].is_some());

    let failures = session.shader_failures();
    assert_eq!(failures.len(), 1);
    assert!(matches!(
        &failures[0],
        ShaderError::Compile { stage: ShaderStage::Fragment, log } if !log.trim().is_empty()
    ));

    assert_eq!(session.step(&InputState::default()), LoopState::Running);
    assert_eq!(session.backend().frames()[0].draws.len(), 1);
}

#[test]
fn teardown_releases_every_handle_exactly_once() {
    let mut session = default_session();
    let ledger = session.backend().ledger();
    session.step(&InputState::default());

    session.teardown();
    drop(session);

    let ledger = ledger.borrow();
    for kind in [
        ResourceKind::Context,
        ResourceKind::Shader,
        ResourceKind::Program,
        ResourceKind::Geometry,
    ] {
        assert_eq!(ledger.created(kind), ledger.released(kind), "{kind:?}");
    }
    assert_eq!(ledger.created(ResourceKind::Shader), 3);
    assert_eq!(ledger.created(ResourceKind::Program), 2);
    assert_eq!(ledger.created(ResourceKind::Geometry), 2);
    assert_eq!(ledger.live(), 0);
    assert_eq!(ledger.double_releases(), 0);

    // GPU objects go before the context.
    let order = ledger.release_order();
    assert_eq!(order.last().map(|(k, _)| *k), Some(ResourceKind::Context));
}

#[test]
fn dropping_without_teardown_still_releases_context_last() {
    let session = default_session();
    let ledger = session.backend().ledger();
    drop(session);

    let ledger = ledger.borrow();
    assert_eq!(ledger.live(), 0);
    let kinds: Vec<_> = ledger.release_order().iter().map(|(k, _)| *k).collect();
    let first_program = kinds.iter().position(|k| *k == ResourceKind::Program).unwrap();
    let last_geometry = kinds.iter().rposition(|k| *k == ResourceKind::Geometry).unwrap();
    assert!(last_geometry < first_program);
    assert_eq!(kinds.last(), Some(&ResourceKind::Context));
}
