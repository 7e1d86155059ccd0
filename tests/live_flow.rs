//! End-to-end flow: a four-pairing playoff scored to a champion, with
//! advancement resolved on read and gating checked between rounds.

use bracket_live_web::{
    resolve_advancement, resolve_goal_limit, GoalLimits, Match, MatchBackend, MatchEditor,
    MatchStore, PairingDirectory, Pairing, Role, RoundGating, Side,
};
use chrono::{DateTime, TimeZone, Utc};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 18, 0, 0).unwrap()
}

fn directory() -> PairingDirectory {
    PairingDirectory::new(vec![
        Pairing::new(1, "Ace/Aro"),
        Pairing::new(2, "Birch/Bay"),
        Pairing::new(3, "Cedar/Cliff"),
        Pairing::new(4, "Dune/Dale"),
    ])
}

/// Score one match through an editor built from the resolved view.
fn play(
    store: &mut MatchStore,
    id: i64,
    a: u32,
    b: u32,
    limits: &GoalLimits,
) -> Result<(), bracket_live_web::MatchError> {
    let resolved = resolve_advancement(&store.matches()?);
    let gating = RoundGating::new(&resolved);
    let m = resolved.iter().find(|m| m.id == id).unwrap().clone();
    let limit = resolve_goal_limit(m.round, limits);
    let mut editor = MatchEditor::new(&m, limit, Role::Staff);
    editor.submit_score(store, a, b, &gating, now())?;
    Ok(())
}

#[test]
fn a_full_playoff_runs_from_draw_to_champion() {
    let mut store = MatchStore::new(vec![
        Match::seeded(1, 1, 1, 2),
        Match::seeded(2, 1, 3, 4),
        Match::new(3, 2),
    ]);
    let limits = GoalLimits::default();
    let names = directory();

    // The final is locked while round 1 is open.
    let resolved = resolve_advancement(&store.matches().unwrap());
    let gating = RoundGating::new(&resolved);
    assert!(gating.is_round_locked(2));

    play(&mut store, 1, 3, 1, &limits).unwrap(); // Ace/Aro win
    play(&mut store, 2, 2, 3, &limits).unwrap(); // Dune/Dale win

    // Both semifinals done: the final unlocks with its slots filled on read,
    // while stored slots stay empty.
    let resolved = resolve_advancement(&store.matches().unwrap());
    let gating = RoundGating::new(&resolved);
    assert!(gating.is_round_complete(1));
    assert!(!gating.is_round_locked(2));
    let final_view = resolved.iter().find(|m| m.id == 3).unwrap();
    assert_eq!(final_view.pairing1_id, Some(1));
    assert_eq!(final_view.pairing2_id, Some(4));
    assert_eq!(store.fetch_match(3).unwrap().pairing1_id, None);
    assert_eq!(names.label(final_view.pairing1_id.unwrap()), "Ace/Aro");
    assert_eq!(names.label(final_view.pairing2_id.unwrap()), "Dune/Dale");

    play(&mut store, 3, 3, 2, &limits).unwrap();

    let resolved = resolve_advancement(&store.matches().unwrap());
    let final_done = resolved.iter().find(|m| m.id == 3).unwrap();
    let (side, champion) = bracket_live_web::winner_pairing(final_done).unwrap();
    assert_eq!(side, Side::A);
    assert_eq!(champion, 1);
    assert_eq!(names.label(champion), "Ace/Aro");
}

#[test]
fn a_forced_winner_feeds_advancement_like_a_played_one() {
    let mut store = MatchStore::new(vec![
        Match::seeded(1, 1, 1, 2),
        Match::seeded(2, 1, 3, 4),
        Match::new(3, 2),
    ]);
    let limits = GoalLimits::default();

    play(&mut store, 1, 3, 0, &limits).unwrap();

    // Semifinal 2 is abandoned; staff force Cedar/Cliff through.
    let resolved = resolve_advancement(&store.matches().unwrap());
    let gating = RoundGating::new(&resolved);
    let m2 = resolved.iter().find(|m| m.id == 2).unwrap().clone();
    let mut editor = MatchEditor::new(&m2, resolve_goal_limit(1, &limits), Role::Staff);
    editor
        .override_winner(&mut store, Side::A, true, &gating, now())
        .unwrap();

    let resolved = resolve_advancement(&store.matches().unwrap());
    let final_view = resolved.iter().find(|m| m.id == 3).unwrap();
    assert_eq!(final_view.pairing1_id, Some(1));
    assert_eq!(final_view.pairing2_id, Some(3));
}
