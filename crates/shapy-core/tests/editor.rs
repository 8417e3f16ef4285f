//! End-to-end behavior of the editor facade.

use kurbo::{Affine, Point, Rect, Size};
use shapy_core::hotkeys::KeyboardEvent;
use shapy_core::shapes::{ObjectKind, TextAlign};
use shapy_core::storage::BoxFuture;
use shapy_core::surface::{
    ExportOptions, ImageLoadError, ImageLoader, LoadedImage, RenderSurface, SurfaceError, decode_data_url,
};
use shapy_core::{
    DocumentChange, Editor, EditorConfig, EditorError, Scene, SceneEvent, SceneObject, SelectionKind,
    SerializableColor, TextOptions,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

fn block_on<F: std::future::Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}

#[derive(Default)]
struct SurfaceLog {
    transforms: Vec<Affine>,
    /// Transform in effect and region requested, per export.
    exports: Vec<(Affine, Rect)>,
}

struct RecordingSurface {
    log: Rc<RefCell<SurfaceLog>>,
    current: Affine,
}

impl RenderSurface for RecordingSurface {
    fn request_render(&mut self, _scene: &Scene) {}

    fn set_viewport_transform(&mut self, transform: Affine) {
        self.current = transform;
        self.log.borrow_mut().transforms.push(transform);
    }

    fn to_data_url(&mut self, _scene: &Scene, options: &ExportOptions) -> Result<String, SurfaceError> {
        self.log.borrow_mut().exports.push((self.current, options.region));
        Ok(format!("data:{};base64,", options.format.mime_type()))
    }
}

/// Serves a 300x200 image for any URL except `"broken"`.
struct FixedLoader;

impl ImageLoader for FixedLoader {
    fn load<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<LoadedImage, ImageLoadError>> {
        Box::pin(async move {
            if url == "broken" {
                return Err(ImageLoadError::Decode {
                    url: url.to_string(),
                    reason: "not an image".to_string(),
                });
            }
            Ok(LoadedImage {
                src: url.to_string(),
                width: 300.0,
                height: 200.0,
            })
        })
    }
}

fn editor_with(initial: Option<DocumentChange>) -> (Editor, Rc<RefCell<SurfaceLog>>) {
    let log = Rc::new(RefCell::new(SurfaceLog::default()));
    let surface = RecordingSurface {
        log: log.clone(),
        current: Affine::IDENTITY,
    };
    let editor = Editor::open(EditorConfig::default(), Box::new(surface), Box::new(FixedLoader), initial);
    (editor, log)
}

fn editor() -> Editor {
    editor_with(None).0
}

fn count(editor: &Editor, kind: ObjectKind) -> usize {
    editor.scene().objects().iter().filter(|o| o.kind() == kind).count()
}

#[test]
fn create_and_undo_scenario() {
    let mut editor = editor();
    assert_eq!(editor.get_workspace().map(SceneObject::size), Some(Size::new(1200.0, 1200.0)));
    assert_eq!(editor.history().len(), 1);
    assert!(!editor.can_undo());

    editor.add_circle();
    assert_eq!(editor.history().len(), 2);
    assert_eq!(editor.history().current_index(), 1);

    assert!(editor.undo().unwrap());
    assert_eq!(editor.history().current_index(), 0);
    assert_eq!(count(&editor, ObjectKind::Circle), 0);

    assert!(editor.redo().unwrap());
    assert_eq!(editor.history().current_index(), 1);
    assert_eq!(count(&editor, ObjectKind::Circle), 1);
    assert!(!editor.redo().unwrap());
}

#[test]
fn new_shapes_are_centered_selected_and_use_ambient_paint() {
    let mut editor = editor();
    let red = SerializableColor::new(255, 0, 0, 255);
    editor.change_fill_color(red);
    editor.change_stroke_width(7.0);

    let id = editor.add_diamond();
    let diamond = editor.scene().get(id).unwrap();
    assert_eq!(diamond.center(), Point::new(600.0, 600.0));
    assert_eq!(diamond.style().fill, Some(red));
    assert_eq!(diamond.style().stroke_width, 7.0);
    assert_eq!(editor.scene().index_of(id), Some(editor.scene().len() - 1));
    assert_eq!(editor.selection().selected(), &[id]);
    assert_eq!(editor.selection().kind(), SelectionKind::Single);
}

#[test]
fn undo_k_times_returns_to_start() {
    let mut editor = editor();
    let start = editor.document().unwrap().json;

    editor.add_rectangle();
    editor.add_soft_rectangle();
    editor.add_triangle();
    editor.add_inverse_triangle();
    let k = editor.history().current_index();
    assert_eq!(k, 4);

    for _ in 0..k {
        assert!(editor.can_undo());
        assert!(editor.undo().unwrap());
    }
    assert!(!editor.can_undo());
    assert!(!editor.undo().unwrap());
    assert_eq!(editor.history().current_index(), 0);
    assert_eq!(editor.scene().len(), 1);
    // Object ids are regenerated on load, so compare persisted forms.
    assert_eq!(editor.document().unwrap().json, start);
}

#[test]
fn new_mutation_after_undo_prunes_redo() {
    let mut editor = editor();
    editor.add_circle();
    editor.add_circle();
    editor.add_circle();
    editor.undo().unwrap();
    editor.undo().unwrap();
    assert!(editor.can_redo());

    editor.add_triangle();
    assert!(!editor.can_redo());
    assert_eq!(editor.history().len(), 3);
}

#[test]
fn send_backward_keeps_workspace_at_the_back() {
    let mut editor = editor();
    let circle = editor.add_circle();
    editor.send_backward();
    assert_eq!(editor.scene().workspace_index(), Some(0));
    assert_eq!(editor.scene().index_of(circle), Some(1));

    let rect = editor.add_rectangle();
    editor.select(&[rect, circle]);
    editor.send_backward();
    assert_eq!(editor.scene().workspace_index(), Some(0));

    editor.select(&[circle]);
    editor.bring_forward();
    assert_eq!(editor.scene().workspace_index(), Some(0));
}

#[test]
fn paste_cascades_from_previous_paste() {
    let mut editor = editor();
    let id = editor.add_circle();
    editor.update_object(id, |o| o.set_position(Point::new(100.0, 100.0)));
    editor.copy();

    let mut positions = Vec::new();
    for _ in 0..3 {
        editor.paste();
        let pasted = editor.selection().selected()[0];
        assert_ne!(pasted, id);
        positions.push(editor.scene().get(pasted).unwrap().position());
    }
    assert_eq!(
        positions,
        vec![Point::new(110.0, 110.0), Point::new(120.0, 120.0), Point::new(130.0, 130.0)]
    );
    assert_eq!(count(&editor, ObjectKind::Circle), 4);
}

#[test]
fn pasting_a_selection_adds_separate_objects() {
    let mut editor = editor();
    let a = editor.add_circle();
    let b = editor.add_rectangle();
    editor.select(&[a, b]);
    editor.copy();
    editor.paste();

    assert_eq!(editor.selection().kind(), SelectionKind::Multiple);
    assert_eq!(editor.scene().len(), 5);
    let pasted = editor.selection().selected().to_vec();
    editor.select(&pasted[..1]);
    assert_eq!(editor.selection().kind(), SelectionKind::Single);
}

#[test]
fn reserialization_is_byte_stable() {
    let mut editor = editor();
    editor.add_circle();
    editor.add_soft_rectangle();
    editor.add_diamond();
    editor.add_text(
        "Hello",
        TextOptions {
            font_size: Some(80.0),
            font_weight: Some(700),
            text_align: Some(TextAlign::Center),
            ..TextOptions::default()
        },
    );
    editor.change_stroke_dash_array(vec![5.0, 5.0]);
    editor.change_opacity(0.5);
    let first = editor.document().unwrap();

    let (reopened, _) = editor_with(Some(first.clone()));
    assert_eq!(reopened.document().unwrap().json, first.json);
    assert_eq!(reopened.scene().len(), 5);
}

#[test]
fn sepia_survives_save_and_load() {
    let mut editor = editor();
    let id = block_on(editor.add_image("https://images.test/photo.png")).unwrap();
    let image = editor.scene().get(id).unwrap();
    assert_eq!(image.size(), Size::new(1200.0, 1200.0));

    editor.change_image_filter("sepia").unwrap();
    assert_eq!(editor.get_active_image_filter(), "sepia");

    let exported = editor.save_json().unwrap();
    assert_eq!(exported.file_name, "shapy-image.json");
    let (_, bytes) = decode_data_url(&exported.data_url).unwrap();
    let json = String::from_utf8(bytes).unwrap();
    assert!(json.contains("\n\t\""));

    let mut other = self::editor();
    other.load_json(&json).unwrap();
    let image = other
        .scene()
        .objects()
        .iter()
        .find_map(SceneObject::as_image)
        .unwrap();
    assert_eq!(image.filter().map(|f| f.name()), Some("sepia"));
}

#[test]
fn failed_image_import_leaves_scene_unchanged() {
    let mut editor = editor();
    let before = editor.document().unwrap();
    let result = block_on(editor.add_image("broken"));
    assert!(matches!(result, Err(EditorError::ImageLoad(_))));
    assert_eq!(editor.document().unwrap(), before);
    assert_eq!(editor.history().len(), 1);
}

#[test]
fn preview_filter_is_not_recorded() {
    let mut editor = editor();
    block_on(editor.add_image("a.png")).unwrap();
    let len = editor.history().len();

    editor.preview_image_filter("invert").unwrap();
    assert_eq!(editor.get_active_image_filter(), "invert");
    assert_eq!(editor.history().len(), len);

    editor.change_image_filter("none").unwrap();
    assert_eq!(editor.get_active_image_filter(), "none");
    assert_eq!(editor.history().len(), len + 1);

    assert!(editor.change_image_filter("lomo").is_err());
    assert_eq!(editor.history().len(), len + 1);
}

#[test]
fn stroke_color_on_text_sets_fill() {
    let mut editor = editor();
    let text = editor.add_text("Title", TextOptions::default());
    let blue = SerializableColor::new(0, 0, 255, 255);
    editor.change_stroke_color(blue);

    let text = editor.scene().get(text).unwrap();
    assert_eq!(text.style().fill, Some(blue));
    assert_eq!(text.style().stroke, None);
    assert_eq!(editor.tool_defaults().stroke, blue);
}

#[test]
fn getters_fall_back_to_ambient_state() {
    let mut editor = editor();
    assert_eq!(editor.get_active_stroke_width(), 2.0);
    assert_eq!(editor.get_active_font_size(), 32.0);
    assert_eq!(editor.get_active_font_family(), "Arial");
    assert_eq!(editor.get_active_opacity(), 1.0);
    assert_eq!(editor.get_active_image_filter(), "none");
    assert!(editor.get_active_stroke_dash_array().is_empty());

    editor.change_font_family("Georgia");
    editor.change_stroke_width(4.0);
    assert_eq!(editor.get_active_font_family(), "Georgia");
    assert_eq!(editor.get_active_stroke_width(), 4.0);

    editor.add_text("x", TextOptions::default());
    editor.change_font_size(48.0);
    editor.change_font_underline(true);
    assert_eq!(editor.get_active_font_size(), 48.0);
    assert!(editor.get_active_font_underline());
    assert!(!editor.get_active_font_linethrough());
}

#[test]
fn property_change_without_selection_is_silent() {
    let mut editor = editor();
    editor.change_opacity(0.3);
    editor.change_font_size(10.0);
    assert_eq!(editor.history().len(), 1);
}

#[test]
fn delete_clears_selection_and_notifies() {
    let cleared = Rc::new(RefCell::new(0));
    let counter = cleared.clone();
    let mut editor = editor();
    editor.set_on_selection_cleared(move || *counter.borrow_mut() += 1);

    let a = editor.add_circle();
    let b = editor.add_circle();
    editor.select(&[a, b]);
    let len = editor.history().len();
    editor.delete();

    assert_eq!(editor.scene().len(), 1);
    assert_eq!(editor.selection().kind(), SelectionKind::Empty);
    assert_eq!(*cleared.borrow(), 1);
    assert_eq!(editor.history().len(), len + 1);
}

#[test]
fn select_all_skips_workspace() {
    let mut editor = editor();
    editor.add_circle();
    editor.add_rectangle();
    editor.select_all();
    assert_eq!(editor.selection().selected().len(), 2);
    let workspace = editor.get_workspace().map(SceneObject::id).unwrap();
    assert!(!editor.selection().selected().contains(&workspace));

    editor.select(&[workspace]);
    assert_eq!(editor.selection().kind(), SelectionKind::Empty);
}

#[test]
fn autosave_is_debounced() {
    let saved = Rc::new(RefCell::new(Vec::new()));
    let sink = saved.clone();
    let mut editor = editor();
    editor.set_on_save(move |change| sink.borrow_mut().push(change));

    editor.add_circle();
    editor.add_rectangle();
    assert!(!editor.poll_autosave(Instant::now()));
    assert!(editor.poll_autosave(Instant::now() + Duration::from_millis(600)));
    assert!(!editor.poll_autosave(Instant::now() + Duration::from_secs(5)));

    let saved = saved.borrow();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].width, 1200.0);
    assert!(saved[0].json.contains("\"type\":\"rect\""));
}

#[test]
fn ctrl_s_saves_immediately() {
    let saved = Rc::new(RefCell::new(Vec::new()));
    let sink = saved.clone();
    let mut editor = editor();
    editor.set_on_save(move |change| sink.borrow_mut().push(change));
    editor.add_circle();

    assert!(editor.handle_key(&KeyboardEvent::ctrl("s")));
    assert_eq!(saved.borrow().len(), 1);
    // The debounced change was superseded.
    assert!(!editor.poll_autosave(Instant::now() + Duration::from_secs(1)));
    assert_eq!(editor.history().len(), 2);
}

#[test]
fn hotkeys_drive_commands() {
    let mut editor = editor();
    editor.add_circle();
    assert!(editor.handle_key(&KeyboardEvent::ctrl("z")));
    assert_eq!(count(&editor, ObjectKind::Circle), 0);
    assert!(editor.handle_key(&KeyboardEvent::ctrl("z").with_shift()));
    assert_eq!(count(&editor, ObjectKind::Circle), 1);

    assert!(editor.handle_key(&KeyboardEvent::ctrl("a")));
    assert_eq!(editor.selection().selected().len(), 1);
    assert!(editor.handle_key(&KeyboardEvent::key("Escape")));
    assert!(editor.selection().is_empty());

    editor.handle_key(&KeyboardEvent::ctrl("a"));
    assert!(!editor.handle_key(&KeyboardEvent::key("Delete").in_text_input()));
    assert_eq!(count(&editor, ObjectKind::Circle), 1);
    assert!(editor.handle_key(&KeyboardEvent::key("Delete")));
    assert_eq!(count(&editor, ObjectKind::Circle), 0);
}

#[test]
fn export_renders_at_identity_then_restores_fit() {
    let (mut editor, log) = editor_with(None);
    editor.set_container_size(Size::new(1000.0, 800.0));
    let fitted = *log.borrow().transforms.last().unwrap();
    assert_ne!(fitted, Affine::IDENTITY);

    let file = editor.save_png().unwrap();
    assert_eq!(file.file_name, "shapy-image.png");
    assert!(file.data_url.starts_with("data:image/png"));

    {
        let log = log.borrow();
        assert_eq!(log.exports, vec![(Affine::IDENTITY, Rect::new(0.0, 0.0, 1200.0, 1200.0))]);
        assert_eq!(*log.transforms.last().unwrap(), fitted);
    }
    assert_eq!(editor.save_jpg().unwrap().file_name, "shapy-image.jpg");
    assert_eq!(log.borrow().exports.len(), 2);
}

#[test]
fn change_size_refits_and_records() {
    let (mut editor, log) = editor_with(None);
    editor.set_container_size(Size::new(1000.0, 1000.0));
    let before = log.borrow().transforms.len();

    editor.change_size(Size::new(600.0, 400.0)).unwrap();
    assert_eq!(editor.scene().workspace_size(), Some(Size::new(600.0, 400.0)));
    assert_eq!(editor.history().len(), 2);
    assert!(log.borrow().transforms.len() > before);

    editor.change_background(SerializableColor::new(0, 0, 0, 255)).unwrap();
    assert_eq!(editor.history().len(), 3);

    editor.undo().unwrap();
    editor.undo().unwrap();
    assert_eq!(editor.scene().workspace_size(), Some(Size::new(1200.0, 1200.0)));
}

#[test]
fn missing_workspace_fails_gracefully() {
    let mut editor = editor();
    let workspace = editor.get_workspace().map(SceneObject::id).unwrap();
    editor.update_object(workspace, |o| o.base_mut().name = None);
    assert!(editor.get_workspace().is_none());

    assert!(matches!(editor.change_size(Size::new(10.0, 10.0)), Err(EditorError::MissingWorkspace)));
    assert!(matches!(editor.save_png(), Err(EditorError::MissingWorkspace)));
    assert!(matches!(block_on(editor.add_image("a.png")), Err(EditorError::MissingWorkspace)));
    editor.auto_zoom();
}

#[test]
fn malformed_load_keeps_document() {
    let mut editor = editor();
    editor.add_circle();
    let before = editor.document().unwrap();
    assert!(editor.load_json("{\"objects\": 3}").is_err());
    assert!(editor.load_json("not json").is_err());
    assert_eq!(editor.document().unwrap(), before);
    assert_eq!(editor.history().len(), 2);
}

#[test]
fn load_without_workspace_adds_one() {
    let mut editor = editor();
    editor
        .load_json(r#"{"objects":[{"type":"circle","left":0,"top":0,"radius":10}]}"#)
        .unwrap();
    assert_eq!(editor.scene().workspace_index(), Some(0));
    assert_eq!(editor.scene().len(), 2);
    assert!(editor.can_undo());
}

#[test]
fn unreadable_initial_state_opens_empty_document() {
    let (editor, _) = editor_with(Some(DocumentChange {
        json: "{broken".to_string(),
        width: 500.0,
        height: 500.0,
    }));
    assert_eq!(editor.scene().len(), 1);
    assert_eq!(editor.scene().workspace_size(), Some(Size::new(1200.0, 1200.0)));
    assert_eq!(editor.history().len(), 1);
}

#[test]
fn listeners_see_events_until_unsubscribed() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    let mut editor = editor();
    let listener = editor.subscribe(move |event| sink.borrow_mut().push(event.clone()));

    let id = editor.add_circle();
    assert_eq!(
        *events.borrow(),
        vec![SceneEvent::ObjectAdded(id), SceneEvent::SelectionCreated(vec![id])]
    );

    assert!(editor.unsubscribe(listener));
    assert!(!editor.unsubscribe(listener));
    editor.add_circle();
    assert_eq!(events.borrow().len(), 2);
}

#[test]
fn freehand_paths_need_drawing_mode() {
    let mut editor = editor();
    let stroke = [Point::new(10.0, 10.0), Point::new(50.0, 80.0), Point::new(90.0, 20.0)];
    assert!(editor.add_freehand_path(&stroke).is_none());

    editor.add_circle();
    editor.enable_drawing_mode();
    assert!(editor.selection().is_empty());
    let id = editor.add_freehand_path(&stroke).unwrap();
    let path = editor.scene().get(id).unwrap();
    assert_eq!(path.position(), Point::new(10.0, 10.0));
    assert_eq!(path.style().fill, None);
    assert_eq!(path.style().stroke_width, 2.0);

    editor.disable_drawing_mode();
    assert!(!editor.is_drawing_mode());
}

#[test]
fn history_limit_caps_snapshots() {
    let config = EditorConfig {
        history_limit: Some(3),
        ..EditorConfig::default()
    };
    let mut editor = Editor::new(config);
    for _ in 0..5 {
        editor.add_circle();
    }
    assert_eq!(editor.history().len(), 3);
    editor.undo().unwrap();
    editor.undo().unwrap();
    assert!(!editor.can_undo());
    assert_eq!(count(&editor, ObjectKind::Circle), 3);
}

#[test]
fn fractional_geometry_reserializes_byte_stable() {
    let mut editor = editor();
    editor.enable_drawing_mode();
    editor
        .add_freehand_path(&[Point::new(1.3, 2.7), Point::new(50.1, 80.9), Point::new(100.0, 3.0)])
        .unwrap();
    editor.disable_drawing_mode();
    let id = editor.add_circle();
    editor.update_object(id, |o| o.set_position(Point::new(0.1 + 0.2, 48.8 / 3.0)));
    let first = editor.save_json().unwrap();
    let (_, bytes) = decode_data_url(&first.data_url).unwrap();

    editor.load_json(std::str::from_utf8(&bytes).unwrap()).unwrap();
    assert_eq!(editor.save_json().unwrap().data_url, first.data_url);

    // Undo replays the same text back.
    let before = editor.document().unwrap().json;
    editor.add_circle();
    editor.undo().unwrap();
    assert_eq!(editor.document().unwrap().json, before);
}

#[test]
fn inverted_zoom_range_falls_back_to_defaults() {
    let mut config = EditorConfig::default();
    config.viewport.min_zoom = 1.0;
    config.viewport.max_zoom = 0.5;
    let mut editor = Editor::new(config);

    editor.set_container_size(Size::new(800.0, 600.0));
    editor.zoom_out();
    assert_eq!(editor.config().viewport, EditorConfig::default().viewport);
    assert!(editor.viewport().zoom() >= 0.2 && editor.viewport().zoom() < 1.0);
}

#[test]
fn delete_hotkey_ignores_modifiers() {
    let mut editor = editor();
    editor.add_circle();
    assert!(editor.handle_key(&KeyboardEvent::ctrl("Backspace")));
    assert_eq!(count(&editor, ObjectKind::Circle), 0);
}

#[test]
fn undo_hotkey_without_history_is_consumed() {
    let mut editor = editor();
    assert!(editor.handle_key(&KeyboardEvent::ctrl("z")));
    assert!(editor.handle_key(&KeyboardEvent::ctrl("y")));
    assert_eq!(editor.history().len(), 1);
}

#[test]
fn export_without_container_keeps_manual_zoom() {
    let (mut editor, log) = editor_with(None);
    editor.zoom_out();
    editor.zoom_out();
    let zoom = editor.viewport().zoom();
    let view = editor.viewport().transform();
    assert!(zoom < 1.0);

    editor.save_png().unwrap();
    assert_eq!(editor.viewport().zoom(), zoom);
    let log = log.borrow();
    assert_eq!(log.exports[0].0, Affine::IDENTITY);
    assert_eq!(*log.transforms.last().unwrap(), view);
}
