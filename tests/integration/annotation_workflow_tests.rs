/*!
 * End-to-end annotation workflow tests
 */

use yavat::interchange::{parse_interval_rows, render_interval_rows};
use yavat::session::AnnotationSession;
use yavat::validator::RowFlag;

use crate::common::{gait_session, interval_row, label_row};

#[test]
fn test_workflow_markEditDeleteSort_shouldKeepReportFresh() {
    let mut session = gait_session();

    // Record two walks back to back, then a run in between by mistake
    session.mark("walk", 0);
    session.mark("walk", 4_000);
    session.mark("run", 2_000);
    session.mark("run", 3_000);
    assert_eq!(session.report().conflict_count, 2); // walk and run overlap each other

    // Fix the run to start after the walk ends
    session.set_begin_ms(1, 5_000).unwrap();
    session.set_end_ms(1, 6_000).unwrap();
    assert!(session.report().passed());

    // A note (ungrouped) can overlap anything
    session.mark("note", 500);
    session.mark("note", 10_000);
    assert!(session.report().passed());

    // Sort puts the note after the walk row it started inside of
    session.sort_intervals();
    let labels: Vec<&str> = session
        .store()
        .entries()
        .iter()
        .map(|e| e.label.as_str())
        .collect();
    assert_eq!(labels, vec!["walk", "note", "run"]);

    // Deleting the walk leaves the rest valid
    session.delete_interval(0).unwrap();
    assert!(session.report().passed());
    assert_eq!(session.store().len(), 2);
}

#[test]
fn test_workflow_predecessorRule_shouldFollowNearestPriorOnly() {
    let mut session = gait_session();

    // walk forbids run as its immediate predecessor within the group
    session.load_intervals(&[
        interval_row("run", "00:00:00,000", "00:00:01,000"),
        interval_row("walk", "00:00:02,000", "00:00:03,000"),
        interval_row("walk", "00:00:04,000", "00:00:05,000"),
    ]);

    // Only the first walk has run as nearest predecessor
    assert!(matches!(
        session.row_flag(1),
        RowFlag::IncompatiblePredecessor { predecessor: 0 }
    ));
    assert!(session.report().is_row_valid(0));
    assert!(session.report().is_row_valid(2));
}

#[test]
fn test_roundTrip_dumpAndReload_shouldReproduceValidity() {
    let mut session = gait_session();
    session.load_intervals(&[
        interval_row("walk", "00:00:00,000", "00:00:10,000"),
        interval_row("run", "00:00:05,000", "00:00:15,000"),
        interval_row("walk", "00:00:20,000", "..."),
        interval_row("run", "garbled", "00:00:30,000"),
        interval_row("note", "00:00:00,500", "00:00:40,000"),
    ]);
    let before: Vec<RowFlag> = session
        .report()
        .rows()
        .iter()
        .map(|r| r.flag.clone())
        .collect();
    // The set exercises every flag: rows 0/1 overlap, the open walk row
    // has run as nearest predecessor, row 3 is malformed, the note is free
    assert!(matches!(before[0], RowFlag::GroupOverlap { .. }));
    assert!(matches!(
        before[2],
        RowFlag::IncompatiblePredecessor { predecessor: 1 }
    ));
    assert!(matches!(before[3], RowFlag::Malformed));
    assert!(matches!(before[4], RowFlag::Valid));

    let dumped = session.dump_intervals();
    // Through the textual form and back
    let text = render_interval_rows(&dumped);
    let reparsed = parse_interval_rows(&text).unwrap();

    let mut fresh = gait_session();
    fresh.load_intervals(&reparsed);
    let after: Vec<RowFlag> = fresh
        .report()
        .rows()
        .iter()
        .map(|r| r.flag.clone())
        .collect();

    assert_eq!(before, after);
    // The malformed cell survived verbatim
    assert_eq!(fresh.dump_intervals()[3].begin, "garbled");
    // The open end kept its placeholder
    assert_eq!(fresh.dump_intervals()[2].end, "...");
}

#[test]
fn test_roundTrip_labelSet_shouldMirrorImportShape() {
    let mut session = AnnotationSession::new();
    let rows = vec![
        label_row("1", "walk", "gait", "run;jump"),
        label_row("2", "run", "gait", ""),
        label_row("3", "note", "", ""),
    ];

    session.load_label_set(rows.clone());

    assert_eq!(session.dump_label_set(), rows);
}

#[test]
fn test_workflow_openMark_shouldConflictUntilClosedBeforeNextGroupRow() {
    let mut session = gait_session();

    session.mark("walk", 1_000);
    let dumped = session.dump_intervals(); // the open end persists as "..."
    session.load_intervals(&dumped);

    // Reloaded open row still spans to the sentinel maximum
    session.push_interval(yavat::Interval::closed("run", 5_000, 6_000));
    assert_eq!(session.report().conflict_count, 2);

    // Stamping a real end before the run row resolves it
    session.set_end_ms(0, 2_000).unwrap();
    assert!(session.report().passed());
}
