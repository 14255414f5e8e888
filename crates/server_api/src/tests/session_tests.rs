use super::*;

fn vinegar_catalog() -> SolutionCatalog {
    SolutionCatalog::from_entries([("vinegar", Property::Acidic), ("soap", Property::Basic)])
}

#[test]
fn start_requires_solution_and_indicator() {
    let catalog = vinegar_catalog();
    let mut session = ExperimentSession::new();

    let err = session
        .start(&catalog, Some("vinegar"), None)
        .expect_err("missing indicator");
    assert_eq!(err.code, ErrorCode::Validation);

    let err = session
        .start(&catalog, Some("  "), Some(IndicatorKind::LitmusPaper))
        .expect_err("blank solution");
    assert_eq!(err.code, ErrorCode::Validation);
    assert_eq!(session.step(), Step::Ready);
}

#[test]
fn unknown_solution_silently_stays_ready() {
    let catalog = vinegar_catalog();
    let mut session = ExperimentSession::new();

    let started = session
        .start(&catalog, Some("orange juice"), Some(IndicatorKind::LitmusPaper))
        .expect("no error");
    assert!(!started);
    assert_eq!(session.step(), Step::Ready);
    assert!(session.selection().is_none());
}

#[test]
fn vinegar_litmus_guessed_basic_is_logged_as_wrong() {
    let catalog = vinegar_catalog();
    let mut session = ExperimentSession::new();
    assert!(session
        .start(&catalog, Some("vinegar"), Some(IndicatorKind::LitmusPaper))
        .expect("start"));
    assert_eq!(session.step(), Step::Result);
    assert_eq!(
        session.selection().expect("selection").outcome(),
        shared::domain::Outcome::LitmusTurnedRed
    );

    let entry = session
        .check(Some(Property::Basic), Instant::now(), Duration::from_secs(3))
        .expect("check")
        .expect("graded");

    assert_eq!(
        entry,
        LogEntry {
            solution_name: "vinegar".into(),
            indicator: IndicatorKind::LitmusPaper,
            predicted: Property::Basic,
            actual: Property::Acidic,
            correct: false,
        }
    );
    assert_eq!(session.log(), &[entry]);
    assert_eq!(session.step(), Step::Done);
}

#[test]
fn every_check_appends_exactly_one_entry() {
    let catalog = vinegar_catalog();
    let mut session = ExperimentSession::new();
    let mut now = Instant::now();

    for (solution, choice) in [
        ("vinegar", Property::Acidic),
        ("vinegar", Property::Basic),
        ("soap", Property::Basic),
        ("soap", Property::Acidic),
    ] {
        session
            .start(&catalog, Some(solution), Some(IndicatorKind::Phenolphthalein))
            .expect("start");
        let entry = session
            .check(Some(choice), now, Duration::ZERO)
            .expect("check")
            .expect("graded");
        assert_eq!(entry.correct, choice == catalog.lookup(solution).expect("known"));
        now += Duration::from_millis(1);
        assert!(session.advance(now));
    }

    assert_eq!(session.log().len(), 4);
    assert_eq!(session.log().iter().filter(|e| e.correct).count(), 2);
}

#[test]
fn check_without_choice_keeps_result_step() {
    let catalog = vinegar_catalog();
    let mut session = ExperimentSession::new();
    session
        .start(&catalog, Some("soap"), Some(IndicatorKind::LitmusPaper))
        .expect("start");

    let err = session
        .check(None, Instant::now(), Duration::from_secs(3))
        .expect_err("missing choice");
    assert_eq!(err.code, ErrorCode::Validation);
    assert_eq!(session.step(), Step::Result);
    assert!(session.log().is_empty());
}

#[test]
fn done_waits_for_the_pause_before_returning_to_ready() {
    let catalog = vinegar_catalog();
    let mut session = ExperimentSession::new();
    let now = Instant::now();
    session
        .start(&catalog, Some("vinegar"), Some(IndicatorKind::LitmusPaper))
        .expect("start");
    session
        .check(Some(Property::Acidic), now, Duration::from_secs(3))
        .expect("check");

    assert!(!session.advance(now + Duration::from_secs(1)));
    assert_eq!(session.step(), Step::Done);
    assert_eq!(
        session.remaining_pause(now + Duration::from_secs(1)),
        Some(Duration::from_secs(2))
    );

    assert!(session.advance(now + Duration::from_secs(3)));
    assert_eq!(session.step(), Step::Ready);
    assert!(session.selection().is_none());
    assert_eq!(session.remaining_pause(now), None);
}

#[test]
fn actions_out_of_step_are_ignored() {
    let catalog = vinegar_catalog();
    let mut session = ExperimentSession::new();

    let graded = session
        .check(Some(Property::Acidic), Instant::now(), Duration::ZERO)
        .expect("no error");
    assert!(graded.is_none());

    session
        .start(&catalog, Some("vinegar"), Some(IndicatorKind::LitmusPaper))
        .expect("start");
    let restarted = session
        .start(&catalog, Some("soap"), Some(IndicatorKind::LitmusPaper))
        .expect("no error");
    assert!(!restarted);
    assert_eq!(
        session.selection().expect("selection").solution.name,
        "vinegar"
    );
}

#[test]
fn clear_log_empties_only_the_log() {
    let mut session = ExperimentSession::new();
    session.append_log(LogEntry::graded(
        "soap",
        IndicatorKind::LitmusPaper,
        Property::Basic,
        Property::Basic,
    ));
    session.push_notice(Notice::info("kept"));

    session.clear_log();

    assert!(session.log().is_empty());
    assert_eq!(session.take_notices().len(), 1);
    assert!(session.take_notices().is_empty());
}

#[test]
fn touch_resets_idle_time_and_never_moves_backwards() {
    let mut session = ExperimentSession::new();
    let later = Instant::now() + Duration::from_secs(60);
    assert!(session.idle_for(later) >= Duration::from_secs(60));

    session.touch(later);
    assert_eq!(session.idle_for(later), Duration::ZERO);

    session.touch(later - Duration::from_secs(30));
    assert_eq!(session.idle_for(later), Duration::ZERO);
}
