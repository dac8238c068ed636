use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use courtlog::game_parse::parse_game;
use courtlog::metrics;
use courtlog::roster::default_roster;
use courtlog::season::aggregate;

static HOME_GAME_XML: &str = include_str!("../tests/fixtures/state.xml");
static AWAY_GAME_XML: &str = include_str!("../tests/fixtures/rival.xml");

fn bench_game_parse(c: &mut Criterion) {
    let roster = default_roster();
    c.bench_function("game_parse", |b| {
        b.iter(|| {
            let parsed = parse_game(black_box(HOME_GAME_XML), roster).unwrap();
            black_box(parsed.record.players.len());
        })
    });
}

fn bench_season_aggregate(c: &mut Criterion) {
    let roster = default_roster();
    let home = parse_game(HOME_GAME_XML, roster).unwrap().record;
    let away = parse_game(AWAY_GAME_XML, roster).unwrap().record;
    // A long season: the two fixture games alternated 15 times each.
    let games: Vec<_> = (0..30)
        .map(|idx| {
            if idx % 2 == 0 {
                home.clone()
            } else {
                away.clone()
            }
        })
        .collect();

    c.bench_function("season_aggregate", |b| {
        b.iter(|| {
            let table = aggregate(black_box(roster), black_box(&games));
            black_box(table.len());
        })
    });
}

fn bench_metrics_attach(c: &mut Criterion) {
    let roster = default_roster();
    let home = parse_game(HOME_GAME_XML, roster).unwrap().record;
    let away = parse_game(AWAY_GAME_XML, roster).unwrap().record;
    let games = vec![home, away];
    let table = aggregate(roster, &games);

    c.bench_function("metrics_attach", |b| {
        b.iter(|| {
            let mut table = table.clone();
            metrics::attach(&mut table);
            black_box(table.len());
        })
    });
}

criterion_group!(
    perf,
    bench_game_parse,
    bench_season_aggregate,
    bench_metrics_attach
);
criterion_main!(perf);
