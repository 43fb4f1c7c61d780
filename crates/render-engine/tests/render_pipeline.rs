use std::path::PathBuf;
use std::sync::Arc;

use instavid_project_model::{Element, ElementKind, ExportSettings, SceneFile};
use instavid_render_engine::paint::chart::bar_geometry;
use instavid_render_engine::{
    resolve, DrawOp, ExportRequest, FontBook, FrameExporter, FrameRenderer, MemorySink, NoCues,
    RasterSurface, RecordingSurface, RenderMode, SceneView,
};

fn load_fixture_scene() -> SceneFile {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("launch.scene.json");
    SceneFile::load(path).expect("fixture scene should load")
}

fn fixture_elements() -> (SceneFile, Vec<Element>) {
    let scene = load_fixture_scene();
    let elements = scene.build_elements();
    (scene, elements)
}

#[test]
fn fixture_scene_recording_draws_bars_at_eased_height() {
    let (scene, elements) = fixture_elements();
    let chart = elements
        .iter()
        .find(|e| e.kind() == ElementKind::BarChart)
        .expect("fixture has a bar chart");
    let data = match &chart.content {
        instavid_project_model::ElementContent::Chart(c) => c.data.clone(),
        other => panic!("unexpected content {other:?}"),
    };

    let mut surface = RecordingSurface::new(1080.0, 1920.0);
    let mut renderer = FrameRenderer::new(3);
    renderer.render_frame(
        &mut surface,
        SceneView::new(std::slice::from_ref(chart), &scene.background),
        1.5,
        RenderMode::Still,
        &mut NoCues,
    );

    let eased = resolve(chart, 1.5, 3).expect("chart visible at 1.5s").eased;
    let expected: Vec<f64> = (0..data.len())
        .map(|i| bar_geometry(&data, i, eased, chart.width, chart.height).3)
        .collect();

    // rounded rects are the bars, in data order
    let heights: Vec<f64> = surface
        .commands()
        .iter()
        .filter_map(|c| match &c.op {
            DrawOp::Fill {
                shape: instavid_render_engine::geometry::Shape::Rect { h, radius, .. },
                ..
            } if *radius > 0.0 => Some(*h),
            _ => None,
        })
        .collect();

    assert_eq!(heights.len(), expected.len());
    for (got, want) in heights.iter().zip(&expected) {
        assert!((got - want).abs() < 1e-9, "bar height {got} != {want}");
    }
    // tallest value fills the plot area scaled by the eased progress
    assert!((expected[2] - (chart.height - 80.0) * eased).abs() < 1e-9);
}

#[test]
fn fixture_scene_rasterizes_gradient_background() {
    let (scene, elements) = fixture_elements();
    let mut surface = RasterSurface::new(108, 192, Arc::new(FontBook::empty()));
    FrameRenderer::new(0).render_frame(
        &mut surface,
        SceneView::new(&elements[..0], &scene.background),
        0.0,
        RenderMode::Still,
        &mut NoCues,
    );

    let top = surface.image().get_pixel(54, 0).0;
    let bottom = surface.image().get_pixel(54, 191).0;
    assert_eq!(top[3], 255);
    assert_ne!(top, bottom);
    // 180° runs from the first color at the top to the second at the bottom
    assert!((top[0] as i32 - 0x0f).abs() <= 2);
    assert!((bottom[0] as i32 - 0x1e).abs() <= 2);
}

#[test]
fn rendering_is_deterministic_for_a_seed() {
    let (scene, elements) = fixture_elements();
    let render = || {
        let mut s = RecordingSurface::new(1080.0, 1920.0);
        FrameRenderer::new(11).render_frame(
            &mut s,
            SceneView::new(&elements, &scene.background),
            0.2,
            RenderMode::Export,
            &mut NoCues,
        );
        s.into_commands()
    };
    assert_eq!(render(), render());
}

#[tokio::test]
async fn fixture_scene_exports_every_frame() {
    let (scene, elements) = fixture_elements();
    let settings = ExportSettings {
        include_audio: true,
        ..scene.export.clone()
    };
    let request = ExportRequest::new(elements, scene.background.clone(), 0.4, settings, 1).with_size(36, 64);
    let exporter = FrameExporter::new(Arc::new(FontBook::empty()));

    let mut sink = MemorySink::new();
    let mut percents = Vec::new();
    let outcome = exporter
        .export(&request, &mut sink, &mut |p| percents.push(p.percent), None)
        .await
        .expect("export should succeed");

    assert_eq!(outcome.frames, 12);
    assert_eq!(sink.frames.len(), 12);
    assert_eq!(sink.spec.as_ref().map(|s| (s.width, s.height, s.fps)), Some((36, 64, 30)));
    // typewriter starts at 0.5s, after this short export ends
    assert!(!outcome.has_audio);
    assert_eq!(percents.last().copied(), Some(100.0));
    assert!(!exporter.is_busy());
}
