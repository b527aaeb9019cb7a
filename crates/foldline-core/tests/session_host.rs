use foldline_core::{
    Action, ChangeOrigin, ClipboardBridge, Command, CommandResult, EditCommand, EditorConfig,
    EditorEvent, EditorSession, FoldMarker, MemoryClipboard, MonospaceMetrics,
};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn record(session: &mut EditorSession) -> Arc<Mutex<Vec<EditorEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    session.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
    events
}

#[test]
fn test_session_from_json_config_uses_custom_keymap() {
    init_tracing();
    let mut session = EditorSession::from_json_config(
        "abc",
        r#"{"indent": {"indent_width": 2}, "keymap": {"redo": "ctrl+shift+z"}}"#,
    )
    .unwrap();

    session.execute(Command::Edit(EditCommand::Tab));
    assert_eq!(session.text(), "  abc");
    assert_eq!(session.handle_key("ctrl+z"), Some(CommandResult::Edited));
    assert_eq!(session.text(), "abc");
    assert_eq!(session.handle_key("ctrl+y"), None);
    assert_eq!(session.handle_key("Ctrl+Shift+Z"), Some(CommandResult::Edited));
    assert_eq!(session.text(), "  abc");
}

#[test]
fn test_invalid_config_is_rejected() {
    assert!(EditorSession::from_json_config("", r#"{"keymap": {"save": "ctrl+z"}}"#).is_err());
    assert!(EditorSession::from_json_config("", "not json").is_err());
}

#[test]
fn test_clipboard_actions_through_keymap() {
    init_tracing();
    let mut session = EditorSession::with_parts(
        "hello world",
        EditorConfig::default(),
        ClipboardBridge::new(Box::new(MemoryClipboard::new())),
        Box::new(MonospaceMetrics::new(7.0, 14.0)),
    );

    session.execute(Command::Edit(EditCommand::SetSelection { start: 0, end: 5 }));
    assert_eq!(
        session.dispatch_action(Action::Copy),
        CommandResult::Copied("hello".to_string())
    );
    assert_eq!(session.dispatch_action(Action::Cut), CommandResult::Edited);
    assert_eq!(session.text(), " world");
    assert_eq!(session.dispatch_action(Action::Paste), CommandResult::Edited);
    assert_eq!(session.text(), "hello world");
    assert_eq!(session.gutter_width(), 21.0);
}

#[test]
fn test_every_committed_edit_reports_text_and_selection() {
    let mut session = EditorSession::new("if x:\n    y()\nw()", EditorConfig::default());
    session.toggle_fold(1);
    let events = record(&mut session);

    session.execute(Command::Edit(EditCommand::SetSelection { start: 9, end: 9 }));
    session.execute(Command::Edit(EditCommand::InsertText {
        text: ";".to_string(),
    }));

    let events = events.lock().unwrap();
    assert_eq!(
        events.as_slice(),
        &[
            EditorEvent::SelectionChanged {
                selection: foldline_core::Selection::caret(9)
            },
            EditorEvent::DocumentChanged {
                text: "if x:\n    y()\nw();".to_string(),
                selection: foldline_core::Selection::caret(10),
                version: 1,
                origin: ChangeOrigin::Edit,
            },
        ]
    );
}

#[test]
fn test_gutter_rows_with_folds_breakpoints_and_diagnostics() {
    let mut session = EditorSession::new("if x:\n    y()\nw()\nv()", EditorConfig::default());
    session.toggle_fold(1);
    session.toggle_breakpoint(3);
    let diagnostics = BTreeMap::from([(3, vec!["undefined name `w`".to_string()])]);

    let rows = session.gutter(1..10, &diagnostics);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].fold_marker, Some(FoldMarker::Collapsed));
    assert_eq!((rows[1].projected_line, rows[1].logical_line), (2, 3));
    assert!(rows[1].breakpoint);
    assert_eq!(rows[1].diagnostics.len(), 1);
    assert_eq!(rows[2].logical_line, 4);
    assert!(!rows[2].breakpoint);

    session.unfold_all();
    let rows = session.gutter(1..3, &diagnostics);
    assert_eq!(rows[0].fold_marker, Some(FoldMarker::Expanded));
    assert_eq!(rows.len(), 2);
}

#[test]
fn test_breakpoints_shift_with_edits_and_emit_events() {
    let mut session = EditorSession::new("a\nb\nc", EditorConfig::default());
    session.set_breakpoints([2]);
    let events = record(&mut session);

    session.execute(Command::Edit(EditCommand::InsertNewline));
    assert_eq!(session.breakpoints(), vec![3]);
    assert!(
        events
            .lock()
            .unwrap()
            .contains(&EditorEvent::BreakpointsChanged { lines: vec![3] })
    );
}
