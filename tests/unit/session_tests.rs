/*!
 * Tests for session orchestration: every mutation leaves a fresh report
 */

use yavat::errors::RegistryError;
use yavat::validator::RowFlag;

use crate::common::{gait_session, interval_row, label_row};

#[test]
fn test_mark_withOverlappingGroupRows_shouldFlagImmediately() {
    let mut session = gait_session();

    session.mark("walk", 0);
    // The open walk row spans to the sentinel maximum, so a run row
    // starting later in the same group conflicts as soon as it opens
    session.mark("run", 500);

    assert!(!session.report().is_row_valid(0));
    assert!(!session.report().is_row_valid(1));

    // Closing both does not help while the spans still intersect
    session.mark("walk", 1_000);
    session.mark("run", 1_500);
    assert_eq!(session.report().conflict_count, 2);
}

#[test]
fn test_editBegin_shouldRevalidateBeforeReturning() {
    let mut session = gait_session();
    session.mark("walk", 0);
    session.mark("walk", 1_000);
    session.mark("walk", 500); // second row overlaps the first
    session.mark("walk", 2_000);
    assert_eq!(session.report().conflict_count, 2);

    // Move the second row past the first; the conflict disappears with
    // the returning call, never later
    session.set_begin_ms(1, 1_001).unwrap();
    assert!(session.report().passed());
}

#[test]
fn test_removeLabel_shouldLiftConstraintsFromItsGroup() {
    let mut session = gait_session();
    session.load_intervals(&[
        interval_row("walk", "00:00:10,000", "00:00:20,000"),
        interval_row("run", "00:00:00,000", "00:00:05,000"),
    ]);
    // run precedes walk and walk forbids run as predecessor
    assert!(matches!(
        session.row_flag(0),
        RowFlag::IncompatiblePredecessor { predecessor: 1 }
    ));

    session.remove_label("run").unwrap();

    // run is now unknown, so its row is ungrouped and walk has no
    // same-group predecessor left
    assert!(session.report().passed());
}

#[test]
fn test_removeLabel_withUnknownName_shouldError() {
    let mut session = gait_session();
    assert_eq!(
        session.remove_label("ghost"),
        Err(RegistryError::LabelNotFound("ghost".to_string()))
    );
}

#[test]
fn test_addLabel_shouldRetriggerValidationOfExistingRows() {
    let mut session = gait_session();
    session.load_intervals(&[
        interval_row("jump", "00:00:00,000", "00:00:05,000"),
        interval_row("walk", "00:00:03,000", "00:00:08,000"),
    ]);
    // jump is unknown: no constraints yet
    assert!(session.report().passed());

    session.add_label(label_row("4", "jump", "gait", ""));

    // Registry mutation revalidates the table: both rows overlap now
    assert_eq!(session.report().conflict_count, 2);
}

#[test]
fn test_clearLabels_shouldKeepMarksButDropConstraints() {
    let mut session = gait_session();
    session.load_intervals(&[
        interval_row("walk", "00:00:00,000", "00:00:10,000"),
        interval_row("run", "00:00:05,000", "00:00:15,000"),
    ]);
    assert_eq!(session.report().conflict_count, 2);

    session.clear_labels();

    assert_eq!(session.store().len(), 2);
    assert!(session.report().passed());
    assert!(session.dump_label_set().is_empty());
}

#[test]
fn test_clearIntervals_shouldKeepLabelSet() {
    let mut session = gait_session();
    session.mark("walk", 0);

    session.clear_intervals();

    assert!(session.store().is_empty());
    assert!(session.registry().contains("walk"));
    assert_eq!(session.dump_label_set().len(), 3);
}

#[test]
fn test_loadLabelSet_withDuplicateNames_shouldLetLastRowWin() {
    let mut session = gait_session();
    session.load_label_set(vec![
        label_row("1", "walk", "gait", ""),
        label_row("2", "walk", "motion", "run"),
    ]);

    assert_eq!(session.registry().group_name("walk"), "motion");
    assert!(session.registry().is_incompatible_predecessor("walk", "run"));
}

#[test]
fn test_setEndText_withPlaceholder_shouldReopenRow() {
    let mut session = gait_session();
    session.load_intervals(&[interval_row("walk", "00:00:01,000", "00:00:02,000")]);

    session.set_end_text(0, "...").unwrap();

    assert!(session.store().get(0).unwrap().is_open());
}

#[test]
fn test_setBeginText_withGarbage_shouldMarkRowMalformed() {
    let mut session = gait_session();
    session.load_intervals(&[
        interval_row("walk", "00:00:01,000", "00:00:02,000"),
        interval_row("walk", "00:00:01,500", "00:00:03,000"),
    ]);
    assert_eq!(session.report().conflict_count, 2);

    session.set_begin_text(0, "not a time").unwrap();

    // The malformed row leaves the group checks entirely
    assert!(matches!(session.row_flag(0), RowFlag::Malformed));
    assert!(session.report().is_row_valid(1));
}

#[test]
fn test_rowsAtPosition_shouldMatchSpanningRows() {
    let mut session = gait_session();
    session.load_intervals(&[
        interval_row("walk", "00:00:01,000", "00:00:02,000"),
        interval_row("note", "00:00:01,500", "..."),
        interval_row("run", "00:00:05,000", "00:00:06,000"),
        interval_row("walk", "bad", "00:00:09,000"),
    ]);

    let hits = session.rows_at_position(1_700);

    // Closed row spanning it, plus the open row; the malformed begin
    // can never match
    assert_eq!(hits, vec![0, 1]);
}

#[test]
fn test_subscriptions_shouldFireOnRegistryAndStoreMutations() {
    use std::cell::Cell;
    use std::rc::Rc;

    let mut session = gait_session();
    let registry_hits = Rc::new(Cell::new(0usize));
    let interval_hits = Rc::new(Cell::new(0usize));

    let observed = Rc::clone(&registry_hits);
    session.subscribe_registry_changed(Box::new(move || observed.set(observed.get() + 1)));
    let observed = Rc::clone(&interval_hits);
    session.subscribe_intervals_changed(Box::new(move || observed.set(observed.get() + 1)));

    session.add_label(label_row("9", "jump", "gait", ""));
    session.mark("jump", 0);
    session.sort_intervals();

    assert_eq!(registry_hits.get(), 1);
    assert_eq!(interval_hits.get(), 2);
}
