use digitizer_rs::core::{Document, HistoryStore, Line, Mode};

fn document_with_line(name: &str) -> Document {
    let mut document = Document::new();
    document.lines.push(Line::new(name));
    document
}

#[test]
fn undo_at_the_bottom_returns_none() {
    let mut history = HistoryStore::new();
    assert!(history.undo().is_none());

    history.push(&Document::new());
    assert!(!history.can_undo());
    assert!(history.undo().is_none());
}

#[test]
fn undo_then_redo_walks_the_stack() {
    let mut history = HistoryStore::new();
    let first = Document::new();
    let second = document_with_line("A");
    let third = document_with_line("B");

    history.push(&first);
    history.push(&second);
    history.push(&third);

    assert_eq!(history.undo(), Some(second.clone()));
    assert_eq!(history.undo(), Some(first.clone()));
    assert!(history.undo().is_none());

    assert_eq!(history.redo(), Some(second));
    assert_eq!(history.redo(), Some(third));
    assert!(history.redo().is_none());
}

#[test]
fn push_truncates_the_redo_branch() {
    let mut history = HistoryStore::new();
    let first = Document::new();
    let second = document_with_line("A");
    let replacement = document_with_line("C");

    history.push(&first);
    history.push(&second);
    history.push(&document_with_line("B"));

    history.undo();
    history.undo();
    history.push(&replacement);

    assert!(!history.can_redo());
    assert_eq!(history.len(), 2);
    assert_eq!(history.undo(), Some(first));
    assert_eq!(history.redo(), Some(replacement));
}

#[test]
fn snapshots_are_isolated_from_later_mutation() {
    let mut history = HistoryStore::new();
    let mut live = Document::new();
    history.push(&live);
    history.push(&live);

    // Mutating the live document must not bleed into stored snapshots.
    live.lines[0].points.clear();
    live.lines[0].name = "mutated".to_owned();
    live.mode = Mode::Highlight;

    let restored = history.undo().expect("snapshot");
    assert_eq!(restored, Document::new());
}

#[test]
fn n_operations_then_n_undos_restores_the_baseline() {
    let mut history = HistoryStore::new();
    let mut live = Document::new();
    history.push(&live);
    let baseline = live.clone();

    let n = 6;
    for i in 0..n {
        live.lines.push(Line::new(format!("line {i}")));
        live.current_line_index = live.lines.len() - 1;
        history.push(&live);
    }

    for _ in 0..n {
        live = history.undo().expect("undo");
    }
    assert_eq!(live, baseline);
    assert!(!history.can_undo());
}
