//! End-to-end editing flows through `EditorSession`.

use template_core::{
    Background, CanvasFormat, EditorConfig, EditorSession, ElementId, ElementKind, Geometry,
    Handle, KeyInput, Point, PointerEvent, Scene, ShapeKind, Viewport,
};

fn square_session() -> EditorSession {
    EditorSession::with_scene(Scene::new(CanvasFormat::Square), EditorConfig::default())
}

fn geometry_of(session: &EditorSession, id: ElementId) -> Geometry {
    session.scene().get_element(id).expect("element").geometry
}

fn same_elements(a: &Scene, b: &Scene) -> bool {
    a.elements().eq(b.elements()) && a.background == b.background
}

#[test]
fn placeholders_and_markup_order() {
    let mut session = square_session();
    session.add_element(
        ElementKind::text("{{headline}}"),
        Geometry::new(80.0, 80.0, 920.0, 120.0),
    );
    session.add_element(ElementKind::image(""), Geometry::new(0.0, 300.0, 1080.0, 600.0));

    let export = session.serialize();
    assert_eq!(export.placeholders, vec!["headline", "image"]);

    let boxes: Vec<&str> = export
        .markup
        .lines()
        .filter(|line| line.contains("position:absolute"))
        .collect();
    assert_eq!(boxes.len(), 2);
    assert!(boxes[0].contains("tpl-text") && boxes[0].contains("z-index:1;"));
    assert!(boxes[1].contains("data-placeholder=\"image\"") && boxes[1].contains("z-index:2;"));
}

#[test]
fn bring_to_front_reorders() {
    let mut session = square_session();
    let a = session.add_element(ElementKind::shape(ShapeKind::Rect), Geometry::default());
    let b = session.add_element(ElementKind::shape(ShapeKind::Circle), Geometry::default());
    assert_eq!(session.scene().get_element(a).expect("a").z_index, 1);
    assert_eq!(session.scene().get_element(b).expect("b").z_index, 2);

    session.select(a).expect("select");
    let z = session.bring_to_front().expect("bring to front");
    assert!(z > 2);

    let order: Vec<ElementId> = session.scene().ordered_by_z().iter().map(|e| e.id).collect();
    assert_eq!(order, vec![b, a]);
}

#[test]
fn drag_moves_then_undo_restores() {
    let mut session = square_session();
    let id = session.add_element(
        ElementKind::shape(ShapeKind::Rect),
        Geometry::new(100.0, 100.0, 200.0, 200.0),
    );

    // Default display box fits the square canvas at half scale.
    let viewport = Viewport::fit(CanvasFormat::Square, session.config().display_bounds());
    let start = viewport.to_display(Point::new(150.0, 150.0));
    let end = viewport.to_display(Point::new(200.0, 130.0));

    session.begin_drag(id, start).expect("begin drag");
    session.handle_pointer(PointerEvent::move_to(end.x, end.y));
    assert!(session.handle_pointer(PointerEvent::Up));

    let moved = geometry_of(&session, id);
    assert!((moved.x - 150.0).abs() < f32::EPSILON);
    assert!((moved.y - 80.0).abs() < f32::EPSILON);

    assert!(session.undo());
    let back = geometry_of(&session, id);
    assert!((back.x - 100.0).abs() < f32::EPSILON);
    assert!((back.y - 100.0).abs() < f32::EPSILON);
}

#[test]
fn resize_from_west_clamps_and_keeps_right_edge() {
    let mut session = EditorSession::with_scene(
        Scene::new(CanvasFormat::Square),
        EditorConfig {
            display_width: 1080.0,
            display_height: 1080.0,
            ..EditorConfig::default()
        },
    );
    let id = session.add_element(
        ElementKind::shape(ShapeKind::Rect),
        Geometry::new(100.0, 100.0, 200.0, 100.0),
    );

    session
        .begin_resize(id, Handle::W, Point::new(100.0, 150.0))
        .expect("begin resize");
    session.handle_pointer(PointerEvent::move_to(400.0, 150.0));
    session.handle_pointer(PointerEvent::Up);

    let g = geometry_of(&session, id);
    assert!((g.width - template_core::MIN_WIDTH).abs() < f32::EPSILON);
    assert!((g.right() - 300.0).abs() < f32::EPSILON);
}

#[test]
fn undo_redo_symmetry_for_each_operation() {
    let mut session = square_session();
    let first = session.add_element(ElementKind::text("a"), Geometry::default());
    session.add_element(ElementKind::image(""), Geometry::default());
    session.select(first).expect("select");

    let ops: [fn(&mut EditorSession); 6] = [
        |s| {
            s.add_element(ElementKind::shape(ShapeKind::Line), Geometry::default());
        },
        |s| {
            s.duplicate_selected().expect("duplicate");
        },
        |s| {
            s.lower().expect("lower");
        },
        |s| {
            s.raise().expect("raise");
        },
        |s| {
            s.send_to_back().expect("send to back");
        },
        |s| {
            s.delete_selected().expect("delete");
        },
    ];

    for op in ops {
        if session.selected_id().is_none() {
            let id = session.scene().ordered_by_z()[0].id;
            session.select(id).expect("select");
        }
        let before = session.scene().clone();
        op(&mut session);
        let after = session.scene().clone();

        assert!(session.undo());
        assert!(same_elements(session.scene(), &before));
        assert!(session.redo());
        assert!(same_elements(session.scene(), &after));
    }
}

#[test]
fn new_operation_after_undo_clears_redo() {
    let mut session = square_session();
    session.add_element(ElementKind::text("a"), Geometry::default());
    session.add_element(ElementKind::text("b"), Geometry::default());
    assert!(session.undo());
    assert!(session.history().can_redo());

    session.add_element(ElementKind::text("c"), Geometry::default());
    assert!(!session.history().can_redo());
    assert!(!session.redo());
}

#[test]
fn ids_are_never_reused_after_undo() {
    let mut session = square_session();
    let first = session.add_element(ElementKind::text("a"), Geometry::default());
    assert!(session.undo());
    let second = session.add_element(ElementKind::text("b"), Geometry::default());
    assert_ne!(first, second);
}

#[test]
fn background_edits_are_debounced() {
    let mut session = square_session();
    session.set_background(Background::solid("#101010"), 1_000);
    session.set_background(Background::gradient("#101010", "#ffffff"), 1_200);
    assert!(!session.history().can_undo());
    assert!(session.tick(1_700));

    assert!(session.undo());
    assert_eq!(session.scene().background, Background::default());
}

#[test]
fn keyboard_shortcuts() {
    let mut session = square_session();
    let id = session.add_element(ElementKind::text("hello"), Geometry::default());

    let copy = session.handle_key(&KeyInput::ctrl("d"));
    assert!(copy.is_some());
    assert_eq!(session.scene().element_count(), 2);

    session.handle_key(&KeyInput::ctrl("z"));
    assert_eq!(session.scene().element_count(), 1);
    session.handle_key(&KeyInput::ctrl_shift("z"));
    assert_eq!(session.scene().element_count(), 2);

    session.begin_text_edit(id).expect("text edit");
    assert!(session.handle_key(&KeyInput::plain("Delete")).is_none());
    assert_eq!(session.scene().element_count(), 2);
}

#[test]
fn export_is_deterministic_and_survives_reload() {
    let mut session = square_session();
    session.add_element(ElementKind::text("Sale <50%> & {{code}}"), Geometry::default());
    session.add_element(ElementKind::shape(ShapeKind::Circle), Geometry::default());
    session.set_background(Background::gradient("#000000", "#ff00ff"), 0);

    let first = session.serialize();
    let second = session.serialize();
    assert_eq!(first, second);
    assert!(first.markup.contains("Sale &lt;50%&gt; &amp; {{code}}"));

    let json = session.to_json().expect("json");
    let reloaded = EditorSession::load(&json, EditorConfig::default());
    assert_eq!(reloaded.serialize(), first);
}
