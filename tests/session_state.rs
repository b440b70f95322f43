use quiniela_terminal::catalog::{Catalog, MatchDescriptor};
use quiniela_terminal::entry::{Selection, SelectionMode, SelectionValue};
use quiniela_terminal::error::{FormError, ParticipantField};
use quiniela_terminal::state::SessionState;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn two_match_catalog() -> Catalog {
    Catalog::new(vec![
        MatchDescriptor::new("m1", "A", "B"),
        MatchDescriptor::new("m2", "C", "D"),
    ])
    .expect("valid catalog")
}

fn session(mode: SelectionMode) -> SessionState {
    let mut state = SessionState::new(two_match_catalog(), mode);
    state.set_participant_name("Ana");
    state.set_participant_phone("5512345678");
    state
}

fn keys(state: &SessionState) -> Vec<String> {
    state.active.keys().map(str::to_string).collect()
}

#[test]
fn active_entry_keeps_one_key_per_match_through_edits() {
    let mut state = session(SelectionMode::Multi);
    let ops = [
        ("m1", SelectionValue::Home),
        ("m2", SelectionValue::Tie),
        ("m1", SelectionValue::Home),
        ("zz", SelectionValue::Away),
        ("m2", SelectionValue::Away),
    ];
    for (id, value) in ops {
        state.set_selection(id, value);
        assert_eq!(keys(&state), vec!["m1", "m2"]);
    }
    state.set_mode(SelectionMode::Single);
    assert_eq!(keys(&state), vec!["m1", "m2"]);
}

fn catalog_of(size: usize) -> Catalog {
    let matches = (1..=size)
        .map(|n| MatchDescriptor::new(&format!("m{n}"), &format!("H{n}"), &format!("A{n}")))
        .collect();
    Catalog::new(matches).expect("valid catalog")
}

#[test]
fn key_set_matches_catalog_under_random_edits() {
    let catalogs = vec![
        catalog_of(0),
        catalog_of(1),
        catalog_of(2),
        Catalog::embedded().expect("embedded catalog").clone(),
    ];
    let mut rng = StdRng::seed_from_u64(7);
    for catalog in catalogs {
        let ids: Vec<String> = catalog.ids().map(str::to_string).collect();
        let mut targets = ids.clone();
        targets.push("zz".to_string());
        let mut state = SessionState::new(catalog, SelectionMode::Single);

        for _ in 0..300 {
            let id = &targets[rng.gen_range(0..targets.len())];
            match rng.gen_range(0..10) {
                0 => state.toggle_mode(),
                1 => {
                    state.clear_selection(id);
                }
                _ => {
                    let value = SelectionValue::ALL[rng.gen_range(0..SelectionValue::ALL.len())];
                    state.set_selection(id, value);
                }
            }
            assert_eq!(keys(&state), ids);
            assert!(state.active.iter().all(|(_, sel)| sel.mode() == state.mode));
        }
    }
}

#[test]
fn empty_catalog_has_nothing_to_add_or_submit() {
    let mut state = SessionState::new(catalog_of(0), SelectionMode::Single);
    state.set_participant_name("Ana");
    state.set_participant_phone("5512345678");
    assert!(!state.set_selection("m1", SelectionValue::Home));

    assert_eq!(state.add_active_to_saved(), Err(FormError::EmptySubmission));
    assert!(state.saved.is_empty());
    assert_eq!(state.begin_submit(), Err(FormError::EmptySubmission));
    assert!(!state.submission_pending);
}

#[test]
fn untouched_entry_is_not_added() {
    let mut state = session(SelectionMode::Multi);
    assert_eq!(state.add_active_to_saved(), Err(FormError::EmptySubmission));
    assert!(state.saved.is_empty());
}

#[test]
fn single_mode_replaces_and_multi_mode_toggles() {
    let mut state = session(SelectionMode::Single);
    state.set_selection("m1", SelectionValue::Home);
    state.set_selection("m1", SelectionValue::Away);
    assert_eq!(
        state.active.get("m1"),
        Some(&Selection::Single(Some(SelectionValue::Away)))
    );

    let mut state = session(SelectionMode::Multi);
    state.set_selection("m1", SelectionValue::Home);
    state.set_selection("m1", SelectionValue::Tie);
    state.set_selection("m1", SelectionValue::Home);
    assert_eq!(
        state.active.get("m1"),
        Some(&Selection::Multi(vec![SelectionValue::Tie]))
    );
}

#[test]
fn unknown_match_id_is_ignored() {
    let mut state = session(SelectionMode::Single);
    assert!(!state.set_selection("nope", SelectionValue::Home));
    assert_eq!(state.active.filled_count(), 0);
}

#[test]
fn multi_then_single_round_trips_when_at_most_one_value() {
    let mut state = session(SelectionMode::Single);
    state.set_selection("m1", SelectionValue::Home);
    let before = state.active.clone();

    state.set_mode(SelectionMode::Multi);
    assert_eq!(
        state.active.get("m1"),
        Some(&Selection::Multi(vec![SelectionValue::Home]))
    );
    assert_eq!(state.active.get("m2"), Some(&Selection::Multi(Vec::new())));

    state.set_mode(SelectionMode::Single);
    assert_eq!(state.active, before);
}

#[test]
fn applying_same_mode_twice_changes_nothing() {
    let mut state = session(SelectionMode::Multi);
    state.set_selection("m1", SelectionValue::Home);
    state.set_selection("m1", SelectionValue::Away);
    state.set_mode(SelectionMode::Single);
    let once = state.active.clone();
    let logs = state.logs.len();
    state.set_mode(SelectionMode::Single);
    assert_eq!(state.active, once);
    assert_eq!(state.logs.len(), logs);

    state.set_mode(SelectionMode::Multi);
    let multi = state.active.clone();
    state.set_mode(SelectionMode::Multi);
    assert_eq!(state.active, multi);
}

#[test]
fn downgrade_keeps_first_inserted_value_in_saved_entries_too() {
    let mut state = session(SelectionMode::Multi);
    state.set_selection("m1", SelectionValue::Away);
    state.set_selection("m1", SelectionValue::Home);
    state.set_selection("m2", SelectionValue::Tie);
    state.add_active_to_saved().expect("complete entry");
    state.set_selection("m1", SelectionValue::Tie);
    state.set_selection("m1", SelectionValue::Away);

    state.set_mode(SelectionMode::Single);
    assert_eq!(
        state.saved[0].get("m1"),
        Some(&Selection::Single(Some(SelectionValue::Away)))
    );
    assert_eq!(
        state.active.get("m1"),
        Some(&Selection::Single(Some(SelectionValue::Tie)))
    );
    assert!(state.logs.iter().any(|l| l.contains("truncated")));
}

#[test]
fn remove_last_saved_on_empty_list_is_noop() {
    let mut state = session(SelectionMode::Single);
    state.set_selection("m1", SelectionValue::Home);
    let active = state.active.clone();
    assert!(state.remove_last_saved().is_none());
    assert!(state.saved.is_empty());
    assert_eq!(state.active, active);
    assert!(state.notice.is_none());
}

#[test]
fn add_rejects_incomplete_entry_without_state_change() {
    let mut state = session(SelectionMode::Single);
    state.set_selection("m1", SelectionValue::Home);
    let active = state.active.clone();

    let err = state.add_active_to_saved().expect_err("m2 unset");
    assert_eq!(
        err,
        FormError::IncompleteEntry {
            missing: vec!["C vs D".to_string()]
        }
    );
    assert!(state.saved.is_empty());
    assert_eq!(state.active, active);
    assert!(state.notice.is_some());
}

#[test]
fn add_requires_participant_info() {
    let mut state = SessionState::new(two_match_catalog(), SelectionMode::Single);
    state.set_selection("m1", SelectionValue::Home);
    state.set_selection("m2", SelectionValue::Home);
    state.set_participant_phone("  ");

    let err = state.add_active_to_saved().expect_err("no name or phone");
    assert_eq!(
        err,
        FormError::IncompleteParticipantInfo {
            missing: vec![ParticipantField::Name, ParticipantField::Phone]
        }
    );
    assert!(state.saved.is_empty());
}

#[test]
fn add_moves_active_to_saved_and_starts_fresh_entry() {
    let mut state = session(SelectionMode::Single);
    state.set_selection("m1", SelectionValue::Home);
    state.set_selection("m2", SelectionValue::Tie);
    assert_eq!(state.add_active_to_saved(), Ok(1));
    assert_eq!(state.saved.len(), 1);
    assert_eq!(state.active.filled_count(), 0);
    assert_eq!(keys(&state), vec!["m1", "m2"]);

    let removed = state.remove_last_saved().expect("one saved entry");
    assert_eq!(removed.filled_count(), 2);
    assert!(state.saved.is_empty());
}

#[test]
fn catalog_change_rekeys_every_entry() {
    let mut state = session(SelectionMode::Single);
    state.set_selection("m1", SelectionValue::Home);
    state.set_selection("m2", SelectionValue::Away);
    state.add_active_to_saved().expect("complete entry");
    state.set_selection("m2", SelectionValue::Tie);

    let next = Catalog::new(vec![
        MatchDescriptor::new("m2", "C", "D"),
        MatchDescriptor::new("m3", "E", "F"),
    ])
    .expect("valid catalog");
    state.set_catalog(next);

    assert_eq!(keys(&state), vec!["m2", "m3"]);
    assert_eq!(
        state.active.get("m2"),
        Some(&Selection::Single(Some(SelectionValue::Tie)))
    );
    assert_eq!(state.saved[0].keys().collect::<Vec<_>>(), vec!["m2", "m3"]);
    assert_eq!(state.schema.rules().len(), 2);
}
