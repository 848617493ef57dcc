use nalgebra::Point3;
use prepscene_core::compose::LayerKind;
use prepscene_core::path::{smoothstep, THUMBNAIL_LOOP_PORTION};
use prepscene_core::scene::{CubeConfig, CubeVariant};
use prepscene_core::visibility::Facing;
use prepscene_core::{
    compose_thumbnail, cube_instances, render_thumbnail_svg, resolve, sample_curve, Animation,
    Camera, CubeScene, LiveView, MotionCurve, Playback, SceneConfig,
};

fn polyline_length(points: &[Point3<f32>]) -> f32 {
    points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
}

#[test]
fn single_cube_edges_split_front_and_back() {
    let scene = SceneConfig::cube();
    let cube = scene.as_cube().unwrap();
    let cubes = cube_instances(&cube.cube);
    assert_eq!(cubes.len(), 1);

    let camera = Camera::from_config(&cube.camera);
    let ball_depth = camera.project(&cube.ball.position).depth;
    let visibility = resolve(&cubes, &camera, Some(ball_depth));

    assert_eq!(visibility.edges.len(), 12);
    let front = visibility.count(Facing::Front);
    let back = visibility.count(Facing::Back);
    assert_eq!(front + back, 12);
    assert!(front > 0 && back > 0);
}

#[test]
fn approach_path_samples_endpoints_and_eases_playback() {
    let from = Point3::new(0.0, 0.0, 1.4);
    let to = Point3::new(0.0, 0.0, 0.1);
    assert_eq!(sample_curve(&[from, to], false, 1.0, 64), vec![from, to]);

    let scene = SceneConfig::Cube(CubeScene {
        animation: Some(Animation::segment(from, to, 2.0)),
        ..CubeScene::default()
    });

    let mut view = LiveView::new(scene.clone(), 320.0, 240.0);
    view.play_animation(0.0);
    view.tick(1.0);
    assert!(matches!(view.playback(), Playback::Playing { .. }));
    let expected = from.lerp(&to, smoothstep(0.5));
    assert!((view.ball_position() - expected).norm() < 1e-4);

    // A quarter of the way in, the ease lags the linear position.
    let mut view = LiveView::new(scene, 320.0, 240.0);
    view.play_animation(0.0);
    view.tick(0.5);
    let eased = from.lerp(&to, smoothstep(0.25));
    let linear = from.lerp(&to, 0.25);
    assert!((view.ball_position() - eased).norm() < 1e-4);
    assert!((view.ball_position() - linear).norm() > 0.05);
}

#[test]
fn closed_ring_stops_at_seventy_percent() {
    let ring = [
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(-1.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, -1.0),
    ];
    let full = sample_curve(&ring, true, 1.0, 256);
    let partial = sample_curve(&ring, true, THUMBNAIL_LOOP_PORTION, 64);

    let ratio = polyline_length(&partial) / polyline_length(&full);
    assert!((ratio - 0.7).abs() < 0.01, "ratio was {ratio}");

    let last = *partial.last().unwrap();
    assert!((last - partial[0]).norm() > 0.5);

    let loop_curve = MotionCurve::new(full, true).unwrap();
    assert!((loop_curve.point_at(0.7) - last).norm() < 0.02);
}

#[test]
fn two_cubes_are_classified_independently() {
    let config = CubeConfig {
        variant: CubeVariant::TwoCubes,
        ..CubeConfig::default()
    };
    let cubes = cube_instances(&config);
    assert_eq!(cubes.len(), 2);
    let vertices: usize = cubes.iter().map(|c| c.vertices.len()).sum();
    assert_eq!(vertices, 16);

    let camera = Camera::default();
    let ball_depth = Some(camera.project(&Point3::origin()).depth);
    let together = resolve(&cubes, &camera, ball_depth);

    for (index, cube) in cubes.iter().enumerate() {
        let alone = resolve(std::slice::from_ref(cube), &camera, ball_depth);
        let paired: Vec<_> = together.edges.iter().filter(|e| e.cube == index).collect();
        assert_eq!(paired.len(), alone.edges.len());
        for (a, b) in paired.iter().zip(&alone.edges) {
            assert_eq!(a.edge, b.edge);
            assert_eq!(a.facing, b.facing);
            assert_eq!(a.placement, b.placement);
        }
    }
}

#[test]
fn thumbnail_layers_follow_painter_order() {
    let scene = SceneConfig::Cube(CubeScene {
        animation: Some(Animation::segment(
            Point3::new(0.0, 0.0, 1.4),
            Point3::new(0.0, 0.0, 0.1),
            2.0,
        )),
        ..CubeScene::default()
    });
    let kinds = compose_thumbnail(&scene).kinds();
    let rank = |kind: LayerKind| match kind {
        LayerKind::GroundPlane => 0,
        LayerKind::BackEdgesBehind => 1,
        LayerKind::FacesBehind => 2,
        LayerKind::FrontEdgesBehind => 3,
        LayerKind::MotionPath => 4,
        LayerKind::Ball => 5,
        LayerKind::BackEdgesInFront => 6,
        LayerKind::FacesInFront => 7,
        LayerKind::FrontEdgesInFront => 8,
        _ => 9,
    };
    let ranks: Vec<u8> = kinds.iter().map(|k| rank(*k)).collect();
    assert!(ranks.windows(2).all(|w| w[0] < w[1]), "{kinds:?}");
    assert!(kinds.contains(&LayerKind::MotionPath));
    assert!(kinds.contains(&LayerKind::Ball));
}

#[test]
fn every_variant_renders_an_svg() {
    for name in ["singleCube", "twoCubes", "ringCubes", "unknownVariant"] {
        let json = format!(r#"{{"kind": "cube", "cube": {{"variant": "{name}"}}}}"#);
        let scene: SceneConfig = serde_json::from_str(&json).unwrap();
        let svg = render_thumbnail_svg(&scene);
        assert!(svg.contains("<circle"), "{name}");
        assert!(svg.contains("<line"), "{name}");
    }
}
