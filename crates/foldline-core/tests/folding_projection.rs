use foldline_core::{
    Command, EditCommand, EditorConfig, EditorSession, FoldRegion, IndentConfig,
    detect_foldable_regions,
};
use pretty_assertions::assert_eq;

const BLOCK: &str = "if x:\n    y()\n    z()\nw()";

#[test]
fn test_detects_single_block() {
    assert_eq!(
        detect_foldable_regions(BLOCK, &IndentConfig::default()),
        vec![FoldRegion::new(1, 3)]
    );
}

#[test]
fn test_folded_projection_hides_body() {
    let mut session = EditorSession::new(BLOCK, EditorConfig::default());
    assert!(session.toggle_fold(1));

    let projection = session.projection();
    assert_eq!(projection.lines().collect::<Vec<_>>(), vec!["if x:", "w()"]);
    assert_eq!(projection.mapping(), &[1, 4]);
    assert_eq!(projection.logical_line(2), Some(4));

    assert!(session.toggle_fold(1));
    assert_eq!(session.projection().text(), BLOCK);
}

#[test]
fn test_blank_line_before_region_shifts_and_stays_folded() {
    let mut session = EditorSession::new(BLOCK, EditorConfig::default());
    session.toggle_fold(1);
    session.execute(Command::Edit(EditCommand::InsertNewline));

    let folding = session.executor().core().folding();
    assert_eq!(folding.regions(), &[FoldRegion::new(2, 4)]);
    assert!(folding.is_folded(2));
    assert!(!folding.is_folded(1));
    assert_eq!(session.projection().lines().collect::<Vec<_>>(), vec!["", "if x:", "w()"]);
}

#[test]
fn test_edits_after_region_shift_it_incrementally() {
    let text = "a\nif x:\n    y()\nw()";
    let mut session = EditorSession::new(text, EditorConfig::default());
    assert_eq!(
        session.executor().core().folding().regions(),
        &[FoldRegion::new(2, 3)]
    );

    // Typing on line 1 (outside any region) shifts nothing; a newline there shifts by one.
    session.execute(Command::Edit(EditCommand::SetSelection { start: 1, end: 1 }));
    session.execute(Command::Edit(EditCommand::InsertNewline));
    assert_eq!(
        session.executor().core().folding().regions(),
        &[FoldRegion::new(3, 4)]
    );
}

#[test]
fn test_nested_fold_all_and_jump() {
    let text = "fn a():\n    if b:\n        c()\n    d()\ne()";
    let mut session = EditorSession::new(text, EditorConfig::default());
    assert!(session.fold_all());
    assert!(!session.fold_all());
    assert_eq!(session.projection().mapping(), &[1, 5]);

    assert!(session.jump_to_line(3));
    assert_eq!(session.projection().mapping(), &[1, 2, 3, 4, 5]);
    assert!(!session.jump_to_line(6));

    assert!(session.toggle_fold(2));
    assert_eq!(session.projection().mapping(), &[1, 2, 4, 5]);
    assert!(session.unfold_all());
    assert!(!session.toggle_fold(3));
}

#[test]
fn test_region_removed_by_edit_drops_fold() {
    let mut session = EditorSession::new(BLOCK, EditorConfig::default());
    session.toggle_fold(1);
    // Select the whole projected text and replace it.
    let len = session.projection().char_len();
    session.execute(Command::Edit(EditCommand::SetSelection { start: 0, end: len }));
    session.paste_at_cursor("flat");

    assert_eq!(session.text(), "flat");
    assert!(session.executor().core().folding().regions().is_empty());
    assert!(session.executor().core().folding().folded().is_empty());
}

#[test]
fn test_highlights_follow_projection() {
    let mut session = EditorSession::new(BLOCK, EditorConfig::default());
    let markup = vec![
        "<kw>if</kw> x:".to_string(),
        "    y()".to_string(),
        "    z()".to_string(),
        "<fn>w</fn>()".to_string(),
    ];
    session.toggle_fold(1);
    let visible = session.visible_highlights(&markup);
    assert_eq!(visible, vec![Some(&markup[0]), Some(&markup[3])]);

    // Markup that lags behind the document yields `None` for lines it does not cover.
    let short = &markup[..2];
    session.unfold_all();
    assert_eq!(
        session.visible_highlights(short),
        vec![Some(&markup[0]), Some(&markup[1]), None, None]
    );
}
