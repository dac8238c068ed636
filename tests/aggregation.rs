use std::fs;
use std::path::PathBuf;

use courtlog::game_parse::{GameRecord, parse_game};
use courtlog::roster::default_roster;
use courtlog::season::aggregate;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn two_game_season() -> Vec<GameRecord> {
    ["state.xml", "rival.xml"]
        .iter()
        .map(|name| {
            parse_game(&read_fixture(name), default_roster())
                .expect("fixture parses")
                .record
        })
        .collect()
}

#[test]
fn counting_totals_accumulate_across_games() {
    let table = aggregate(default_roster(), &two_game_season());
    let teder = table.get("Johanna Teder").expect("roster player present");

    assert_eq!(teder.games, 2);
    assert_eq!(teder.minutes, 62);
    assert_eq!(teder.points, 30);
    assert_eq!(teder.fgm, 12);
    assert_eq!(teder.fga, 25);
    assert_eq!(teder.fgm3, 6);
    assert_eq!(teder.fga3, 14);
    assert_eq!(teder.oreb, 1);
    assert_eq!(teder.dreb, 7);
    assert_eq!(teder.assists, 9);
    assert_eq!(teder.steals, 3);
    assert_eq!(teder.blocks, 1);
    assert_eq!(teder.turnovers, 3);
    assert_eq!(teder.plus_minus, 11);
    assert_eq!(teder.paint_points, 6);
    assert_eq!(teder.fastbreak_points, 4);
    assert!(teder.fga >= teder.fgm);
    assert!(teder.fga3 >= teder.fgm3);

    assert_eq!(teder.game_log.len(), 2);
    assert_eq!(teder.game_log[0].opponent, "State");
    assert_eq!(teder.game_log[0].points, 10);
    assert_eq!(teder.game_log[1].opponent, "Rival");
    assert_eq!(teder.game_log[1].points, 20);
}

#[test]
fn zero_minute_line_logs_but_does_not_count_a_game() {
    let table = aggregate(default_roster(), &two_game_season());
    let wadsley = table.get("Lior Wadsley").expect("roster player present");

    assert_eq!(wadsley.games, 0);
    assert_eq!(wadsley.game_log.len(), 1);
    assert_eq!(wadsley.minutes, 0);
}

#[test]
fn absent_roster_player_stays_zero_valued() {
    let table = aggregate(default_roster(), &two_game_season());
    let oliver = table.get("Grace Oliver").expect("roster player present");

    assert_eq!(oliver.games, 0);
    assert_eq!(oliver.points, 0);
    assert_eq!(oliver.minutes, 0);
    assert!(oliver.game_log.is_empty());
    assert!(oliver.quarter_totals.is_empty());
    assert!(oliver.assisted_by.is_empty());
    assert_eq!(oliver.close_game.plus_minus, 0);
}

#[test]
fn quarter_buckets_merge_only_reported_quarters() {
    let table = aggregate(default_roster(), &two_game_season());
    let teder = table.get("Johanna Teder").expect("roster player present");

    assert_eq!(teder.quarter_totals.len(), 3);
    let q1 = teder.quarter_totals.get(&1).expect("q1 bucket");
    assert_eq!((q1.minutes, q1.points, q1.fgm, q1.fga), (18, 10, 5, 9));
    let q2 = teder.quarter_totals.get(&2).expect("q2 bucket");
    assert_eq!((q2.minutes, q2.points, q2.fgm, q2.fga), (7, 2, 1, 3));
    let q3 = teder.quarter_totals.get(&3).expect("q3 bucket");
    assert_eq!((q3.minutes, q3.points, q3.fgm, q3.fga), (8, 4, 2, 4));
    assert!(teder.quarter_totals.get(&4).is_none());

    // Quarter sums are not forced to match the game totals.
    let quarter_points: u32 = teder.quarter_totals.values().map(|q| q.points).sum();
    assert_ne!(quarter_points, teder.points);
}

#[test]
fn close_game_totals_only_cover_close_appearances() {
    let table = aggregate(default_roster(), &two_game_season());

    // Only the Rival game (60-64) is close; the opener is not.
    let teder = table.get("Johanna Teder").expect("roster player present");
    assert_eq!(teder.close_game.points, 20);
    assert_eq!(teder.close_game.fgm, 8);
    assert_eq!(teder.close_game.fga, 15);
    assert_eq!(teder.close_game.plus_minus, 3);

    let masogayo = table.get("Jade Masogayo").expect("roster player present");
    assert_eq!(masogayo.close_game.plus_minus, 12);
    let sanders = table.get("Kennedy Sanders").expect("roster player present");
    assert_eq!(sanders.close_game.plus_minus, 10);
}

#[test]
fn play_by_play_builds_shot_location_and_assist_network() {
    let table = aggregate(default_roster(), &two_game_season());

    let teder = table.get("Johanna Teder").expect("roster player present");
    assert_eq!(teder.paint_fgm, 1);
    assert_eq!(teder.paint_fga, 1);
    assert_eq!(teder.perimeter_fgm, 2);
    assert_eq!(teder.perimeter_fga, 3);
    assert_eq!(teder.assisted_fgm, 1);
    assert_eq!(teder.unassisted_fgm, 2);
    assert_eq!(teder.assisted_by.get("Jade Masogayo"), 1);
    assert_eq!(teder.assists_to.get("Jade Masogayo"), 1);
    assert_eq!(teder.assists_to.get("Kennedy Sanders"), 1);

    // Play-derived attempts come from a different source than the box score
    // and are allowed to diverge from it.
    assert_ne!(teder.paint_fga + teder.perimeter_fga, teder.fga);

    let masogayo = table.get("Jade Masogayo").expect("roster player present");
    assert_eq!(masogayo.paint_fgm, 1);
    assert_eq!(masogayo.paint_fga, 2);
    assert_eq!(masogayo.assisted_fgm, 1);
    assert_eq!(masogayo.assisted_by.get("Johanna Teder"), 1);
    assert_eq!(masogayo.assists_to.get("Johanna Teder"), 1);

    // A make assisted by an off-roster identifier still counts as assisted,
    // but moves no frequency table.
    let sanders = table.get("Kennedy Sanders").expect("roster player present");
    assert_eq!(sanders.assisted_fgm, 2);
    assert_eq!(sanders.unassisted_fgm, 0);
    assert_eq!(sanders.perimeter_fgm, 1);
    assert_eq!(sanders.paint_fgm, 1);
    assert!(sanders.assists_to.is_empty());
}

#[test]
fn off_roster_shooter_moves_no_counters() {
    let table = aggregate(default_roster(), &two_game_season());

    // The unknown shooter's assisted make credits nobody, including the
    // would-be giver.
    let teder = table.get("Johanna Teder").expect("roster player present");
    let assist_total: u32 = teder.assists_to.iter().map(|(_, count)| count).sum();
    assert_eq!(assist_total, 2);
}

#[test]
fn opponent_splits_track_each_opponent_separately() {
    let table = aggregate(default_roster(), &two_game_season());
    let teder = table.get("Johanna Teder").expect("roster player present");

    let vs_state = teder.vs_opponent.get("State").expect("split exists");
    assert_eq!(
        (vs_state.games, vs_state.points, vs_state.fgm, vs_state.fga),
        (1, 10, 4, 10)
    );
    let vs_rival = teder.vs_opponent.get("Rival").expect("split exists");
    assert_eq!(
        (vs_rival.games, vs_rival.points, vs_rival.fgm, vs_rival.fga),
        (1, 20, 8, 15)
    );
}
