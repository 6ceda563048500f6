mod common;

use common::{FakeInpainter, GREEN, RED, Recorder, config, red_file, services};
use egui::Pos2;
use futures::executor::block_on;
use inpaint_editor::canvas::decode_data_url;
use inpaint_editor::services::AnalyticsEvent;
use inpaint_editor::{Editor, EditorError, ServiceError};
use std::sync::Arc;

struct Fixture {
    editor: Editor,
    recorder: Arc<Recorder>,
    inpainter: Arc<FakeInpainter>,
}

fn fixture(inpainter: FakeInpainter, pro: bool) -> Fixture {
    let recorder = Arc::new(Recorder::default());
    let inpainter = Arc::new(inpainter);
    let mut editor = Editor::new(services(&recorder, &inpainter, pro), config());
    editor.set_file(red_file("beach.png", 40, 30)).unwrap();
    Fixture {
        editor,
        recorder,
        inpainter,
    }
}

fn drag(editor: &mut Editor, from: (f32, f32), to: (f32, f32)) {
    editor.add_point(Pos2::new(from.0, from.1));
    editor.add_point(Pos2::new(to.0, to.1));
}

#[test]
fn test_draw_after_render_shows_render() {
    let mut fx = fixture(FakeInpainter::solid(40, 30, GREEN), false);
    drag(&mut fx.editor, (5.0, 5.0), (20.0, 5.0));

    block_on(fx.editor.render()).unwrap();

    let canvas = fx.editor.canvas().unwrap().image();
    assert_eq!(*canvas.get_pixel(30, 25), GREEN);
    assert_eq!(*canvas.get_pixel(10, 5), GREEN);

    // Redrawing keeps showing the render
    fx.editor.draw().unwrap();
    assert_eq!(*fx.editor.canvas().unwrap().image().get_pixel(0, 0), GREEN);
}

#[test]
fn test_render_is_stored_with_its_stroke_and_logged() {
    let mut fx = fixture(FakeInpainter::solid(40, 30, GREEN), false);
    drag(&mut fx.editor, (5.0, 5.0), (20.0, 5.0));
    block_on(fx.editor.render()).unwrap();

    let history = fx.editor.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history.committed_len(), 1);
    assert!(history.batches()[0].render().is_some());
    assert_eq!(history.batches()[0].committed().len(), 1);
    assert!(history.current().is_bare());

    let events = fx.recorder.events.lock();
    assert!(matches!(
        events.as_slice(),
        [AnalyticsEvent::InpaintProcessed { width: 40, height: 30, .. }]
    ));
    assert!(fx.recorder.alerts.lock().is_empty());
}

#[test]
fn test_mask_covers_strokes_from_every_batch() {
    let mut fx = fixture(FakeInpainter::solid(40, 30, GREEN), true);
    drag(&mut fx.editor, (5.0, 5.0), (20.0, 5.0));
    fx.editor.add_line().unwrap();
    block_on(fx.editor.render()).unwrap();

    drag(&mut fx.editor, (5.0, 25.0), (20.0, 25.0));
    fx.editor.add_line().unwrap();
    block_on(fx.editor.render()).unwrap();

    let requests = fx.inpainter.requests.lock();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].token, "test-token");
    assert_eq!(requests[1].file.name, "beach.png");

    let mask = decode_data_url(&requests[1].mask).unwrap();
    assert_eq!(mask.dimensions(), (40, 30));
    assert_eq!(mask.get_pixel(10, 5).0, [255, 255, 255, 255]);
    assert_eq!(mask.get_pixel(10, 25).0, [255, 255, 255, 255]);
    assert_eq!(mask.get_pixel(35, 15).0[3], 0);
    assert_eq!(fx.editor.mask().unwrap().image(), &mask);
}

#[test]
fn test_failed_render_alerts_and_keeps_history() {
    let mut fx = fixture(
        FakeInpainter::failing(ServiceError::Request("backend down".to_owned())),
        false,
    );
    drag(&mut fx.editor, (5.0, 5.0), (20.0, 5.0));
    fx.editor.add_line().unwrap();
    let before = (fx.editor.history().len(), fx.editor.history().committed_len());

    let result = block_on(fx.editor.render());
    assert!(matches!(result, Err(EditorError::Service(ServiceError::Request(_)))));

    assert_eq!(fx.recorder.event_names(), vec!["inpaint_failed"]);
    let alerts = fx.recorder.alerts.lock();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].contains("backend down"));
    assert_eq!(
        (fx.editor.history().len(), fx.editor.history().committed_len()),
        before
    );
    assert_eq!(*fx.editor.canvas().unwrap().image().get_pixel(30, 25), RED);
}

#[test]
fn test_failed_render_keeps_pending_stroke() {
    let mut fx = fixture(FakeInpainter::failing(ServiceError::EmptyResponse), false);
    drag(&mut fx.editor, (5.0, 5.0), (20.0, 5.0));
    assert!(block_on(fx.editor.render()).is_err());

    let history = fx.editor.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history.current().committed().len(), 1);
    assert_ne!(*fx.editor.canvas().unwrap().image().get_pixel(10, 5), RED);

    // The next drag starts a new stroke next to the unrendered one
    fx.editor.start_stroke();
    drag(&mut fx.editor, (5.0, 25.0), (20.0, 25.0));
    let lines: Vec<usize> = fx.editor.history().all_lines().map(|line| line.points().len()).collect();
    assert_eq!(lines, vec![2, 2]);
    assert_eq!(fx.editor.history().len(), 1);

    assert!(fx.editor.undo().unwrap());
    assert_eq!(fx.editor.history().all_lines().count(), 0);
    assert_eq!(*fx.editor.canvas().unwrap().image().get_pixel(10, 5), RED);
}

#[test]
fn test_undo_after_preview_render_drops_stroke_and_render() {
    let mut fx = fixture(FakeInpainter::solid(40, 30, GREEN), false);
    fx.editor.start_stroke();
    drag(&mut fx.editor, (5.0, 5.0), (20.0, 5.0));
    block_on(fx.editor.render()).unwrap();

    assert!(fx.editor.undo().unwrap());
    let history = fx.editor.history();
    assert_eq!(history.all_lines().count(), 0);
    assert_eq!(history.committed_len(), 0);
    assert!(history.latest_render().is_none());
    assert_eq!(*fx.editor.canvas().unwrap().image().get_pixel(10, 5), RED);

    fx.editor.start_stroke();
    drag(&mut fx.editor, (5.0, 25.0), (20.0, 25.0));
    block_on(fx.editor.render()).unwrap();

    let requests = fx.inpainter.requests.lock();
    let mask = decode_data_url(&requests[1].mask).unwrap();
    assert_eq!(mask.get_pixel(10, 5).0[3], 0);
    assert_eq!(mask.get_pixel(10, 25).0, [255, 255, 255, 255]);
}

#[test]
fn test_undo_after_n_preview_renders_keeps_earlier_ones() {
    let mut fx = fixture(FakeInpainter::solid(40, 30, GREEN), false);
    for y in [5.0, 15.0, 25.0] {
        fx.editor.start_stroke();
        drag(&mut fx.editor, (5.0, y), (20.0, y));
        block_on(fx.editor.render()).unwrap();
    }
    assert_eq!(fx.editor.history().committed_len(), 3);

    assert!(fx.editor.undo().unwrap());
    let history = fx.editor.history();
    assert_eq!(history.committed_len(), 2);
    assert_eq!(history.all_lines().count(), 2);
    assert!(history.current().is_bare());
    assert_eq!(*fx.editor.canvas().unwrap().image().get_pixel(10, 5), GREEN);
}

#[test]
fn test_render_without_file_is_reported() {
    let recorder = Arc::new(Recorder::default());
    let inpainter = Arc::new(FakeInpainter::solid(1, 1, GREEN));
    let mut editor = Editor::new(services(&recorder, &inpainter, false), config());

    let result = block_on(editor.render());
    assert!(matches!(result, Err(EditorError::NoCanvas)));
    assert_eq!(recorder.event_names(), vec!["inpaint_failed"]);
    assert_eq!(recorder.alerts.lock().len(), 1);
    assert!(inpainter.requests.lock().is_empty());
}

#[test]
fn test_stale_render_is_dropped() {
    let mut fx = fixture(FakeInpainter::solid(40, 30, GREEN), false);
    drag(&mut fx.editor, (5.0, 5.0), (20.0, 5.0));
    let job = fx.editor.begin_render().unwrap();

    fx.editor.set_use_hd(true).unwrap();
    let outcome = block_on(job.run());
    assert!(outcome.is_ok());
    fx.editor.finish_render(outcome).unwrap();

    assert_eq!(fx.editor.history().len(), 1);
    assert!(fx.editor.history().latest_render().is_none());
    assert!(fx.recorder.events.lock().is_empty());
}

#[test]
fn test_smaller_render_is_scaled_onto_canvas() {
    let mut fx = fixture(FakeInpainter::solid(20, 15, GREEN), true);
    drag(&mut fx.editor, (5.0, 5.0), (20.0, 5.0));
    fx.editor.add_line().unwrap();
    block_on(fx.editor.render()).unwrap();

    let canvas = fx.editor.canvas().unwrap();
    assert_eq!(canvas.size(), [40, 30]);
    assert_eq!(*canvas.image().get_pixel(39, 29), GREEN);
}
