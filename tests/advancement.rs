//! Integration tests for bracket topology resolution.

use bracket_live_web::{
    resolve_advancement, resolve_goal_limit, resolve_stage, winner_side, GoalLimits, Match,
    MatchStatus, Score, SetScore, Side, Stage, StageType,
};

fn done_goals(id: i64, round: u32, p1: i64, p2: i64, a: u32, b: u32, limit: u32) -> Match {
    let mut m = Match::seeded(id, round, p1, p2);
    m.score = Some(Score::Goals {
        a,
        b,
        limit: Some(limit),
    });
    m.status = MatchStatus::Done;
    m
}

/// Round 1: M1 (A=1 vs B=2), M2 (C=3 vs D=4); Round 2: one empty final.
fn four_pairing_bracket() -> Vec<Match> {
    vec![
        Match::seeded(1, 1, 1, 2),
        Match::seeded(2, 1, 3, 4),
        Match::new(3, 2),
    ]
}

#[test]
fn winner_at_goal_limit_wins() {
    let score = Score::Goals {
        a: 3,
        b: 1,
        limit: Some(3),
    };
    assert_eq!(winner_side(&score), Some(Side::A));
}

#[test]
fn no_limit_higher_side_wins_and_tie_is_indeterminate() {
    let higher = Score::Goals {
        a: 2,
        b: 5,
        limit: None,
    };
    assert_eq!(winner_side(&higher), Some(Side::B));
    let tie = Score::Goals {
        a: 2,
        b: 2,
        limit: None,
    };
    assert_eq!(winner_side(&tie), None);
}

#[test]
fn sets_majority_wins_and_set_tie_is_indeterminate() {
    let sets = Score::Sets(vec![
        SetScore { a: 6, b: 4 },
        SetScore { a: 3, b: 6 },
        SetScore { a: 7, b: 5 },
    ]);
    assert_eq!(winner_side(&sets), Some(Side::A));
    let tied = Score::Sets(vec![SetScore { a: 6, b: 4 }, SetScore { a: 4, b: 6 }]);
    assert_eq!(winner_side(&tied), None);
}

#[test]
fn winners_fill_downstream_slots_in_order() {
    let mut matches = four_pairing_bracket();
    matches[0] = done_goals(1, 1, 1, 2, 3, 1, 3); // A wins M1
    matches[1] = done_goals(2, 1, 3, 4, 2, 3, 3); // D wins M2

    let resolved = resolve_advancement(&matches);
    let final_match = resolved.iter().find(|m| m.id == 3).unwrap();
    assert_eq!(final_match.pairing1_id, Some(1));
    assert_eq!(final_match.pairing2_id, Some(4));
}

#[test]
fn input_is_not_mutated_and_resolution_is_idempotent() {
    let mut matches = four_pairing_bracket();
    matches[0] = done_goals(1, 1, 1, 2, 3, 0, 3);

    let resolved = resolve_advancement(&matches);
    // Propagation is on the output only; storage stays untouched.
    assert_eq!(matches.iter().find(|m| m.id == 3).unwrap().pairing1_id, None);

    let twice = resolve_advancement(&resolved);
    assert_eq!(resolved, twice);
}

#[test]
fn filled_downstream_slot_is_never_overwritten() {
    let mut matches = four_pairing_bracket();
    matches[0] = done_goals(1, 1, 1, 2, 3, 1, 3); // A wins
    // Manually seeded final slot stays authoritative.
    matches[2].pairing1_id = Some(99);

    let resolved = resolve_advancement(&matches);
    assert_eq!(resolved.iter().find(|m| m.id == 3).unwrap().pairing1_id, Some(99));
}

#[test]
fn undecided_and_indeterminate_matches_propagate_nothing() {
    let mut matches = four_pairing_bracket();
    // In progress: no propagation even though a side leads.
    matches[0].score = Some(Score::Goals {
        a: 2,
        b: 0,
        limit: Some(3),
    });
    matches[0].status = MatchStatus::InProgress;
    // Done but tied with no limit: indeterminate.
    matches[1].score = Some(Score::Goals {
        a: 2,
        b: 2,
        limit: None,
    });
    matches[1].status = MatchStatus::Done;

    let resolved = resolve_advancement(&matches);
    let final_match = resolved.iter().find(|m| m.id == 3).unwrap();
    assert_eq!(final_match.pairing1_id, None);
    assert_eq!(final_match.pairing2_id, None);
}

#[test]
fn non_bracket_matches_pass_through_verbatim() {
    let mut group_match = Match::seeded(10, 0, 7, 8);
    group_match.status = MatchStatus::InProgress;
    let mut matches = four_pairing_bracket();
    matches.push(group_match.clone());

    let resolved = resolve_advancement(&matches);
    assert_eq!(resolved.iter().find(|m| m.id == 10), Some(&group_match));
    assert_eq!(resolved.len(), matches.len());
}

#[test]
fn one_sided_match_gets_no_auto_forfeit() {
    let mut m1 = Match::new(1, 1);
    m1.pairing1_id = Some(1); // opponent slot never filled
    let matches = vec![m1, Match::seeded(2, 1, 3, 4), Match::new(3, 2)];
    let resolved = resolve_advancement(&matches);
    let final_match = resolved.iter().find(|m| m.id == 3).unwrap();
    assert_eq!(final_match.pairing1_id, None);
}

#[test]
fn group_stage_is_left_alone_by_resolve_stage() {
    let mut stage = Stage::new(1, "Groups", StageType::Groups);
    stage.matches = vec![done_goals(1, 1, 1, 2, 3, 0, 3), Match::new(2, 2)];
    let resolved = resolve_stage(&stage);
    assert_eq!(resolved, stage);

    let mut playoff = Stage::new(2, "Playoffs", StageType::Playoff);
    playoff.matches = vec![
        done_goals(1, 1, 1, 2, 3, 0, 3),
        done_goals(2, 1, 3, 4, 3, 2, 3),
        Match::new(3, 2),
    ];
    let resolved = resolve_stage(&playoff);
    let final_match = resolved.matches.iter().find(|m| m.id == 3).unwrap();
    assert_eq!(final_match.pairing1_id, Some(1));
    assert_eq!(final_match.pairing2_id, Some(3));
}

#[test]
fn goal_limit_prefers_round_override_then_default_then_fallback() {
    let limits = GoalLimits::with_default(5).with_round_limit(2, 7);
    assert_eq!(resolve_goal_limit(1, &limits), 5);
    assert_eq!(resolve_goal_limit(2, &limits), 7);

    let empty = GoalLimits::default();
    assert_eq!(resolve_goal_limit(1, &empty), 3);
    assert_eq!(resolve_goal_limit(0, &empty), 3);
}
