use std::fs;
use std::path::PathBuf;

use courtlog::game_parse::parse_game;
use courtlog::ingest::IngestReport;
use courtlog::metrics;
use courtlog::persist::{open_db, record_season, stored_game_count};
use courtlog::roster::default_roster;
use courtlog::season::aggregate;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn season_snapshot_upserts_rather_than_duplicates() {
    let games: Vec<_> = ["state.xml", "rival.xml"]
        .iter()
        .map(|name| {
            parse_game(&read_fixture(name), default_roster())
                .expect("fixture parses")
                .record
        })
        .collect();
    let mut table = aggregate(default_roster(), &games);
    metrics::attach(&mut table);

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("season.sqlite");
    let mut conn = open_db(&path).expect("db opens");

    let report = IngestReport {
        parsed: games.len(),
        ..IngestReport::default()
    };
    let summary = record_season(&mut conn, &games, &table, &report).expect("first write");
    assert_eq!(summary.games_upserted, 2);
    assert_eq!(summary.players_upserted, default_roster().players.len());
    assert_eq!(stored_game_count(&conn).expect("count"), 2);

    // Re-recording the same batch must not grow the games table.
    record_season(&mut conn, &games, &table, &report).expect("second write");
    assert_eq!(stored_game_count(&conn).expect("count"), 2);
}
