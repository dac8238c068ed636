use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, params};

use crate::game_parse::GameRecord;
use crate::ingest::IngestReport;
use crate::season::SeasonStats;

#[derive(Debug, Clone, Copy)]
pub struct PersistSummary {
    pub games_upserted: usize,
    pub players_upserted: usize,
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS games (
            date TEXT NOT NULL,
            opponent TEXT NOT NULL,
            home_away TEXT NOT NULL,
            own_score INTEGER NOT NULL,
            opp_score INTEGER NOT NULL,
            result TEXT NOT NULL,
            is_close INTEGER NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (date, opponent)
        );
        CREATE TABLE IF NOT EXISTS player_season (
            name TEXT PRIMARY KEY,
            jersey INTEGER NOT NULL,
            position TEXT NOT NULL,
            games INTEGER NOT NULL,
            minutes INTEGER NOT NULL,
            points INTEGER NOT NULL,
            fgm INTEGER NOT NULL,
            fga INTEGER NOT NULL,
            fgm3 INTEGER NOT NULL,
            fga3 INTEGER NOT NULL,
            ftm INTEGER NOT NULL,
            fta INTEGER NOT NULL,
            oreb INTEGER NOT NULL,
            dreb INTEGER NOT NULL,
            assists INTEGER NOT NULL,
            steals INTEGER NOT NULL,
            blocks INTEGER NOT NULL,
            turnovers INTEGER NOT NULL,
            plus_minus INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_games_date ON games(date);

        CREATE TABLE IF NOT EXISTS ingest_runs (
            run_id INTEGER PRIMARY KEY AUTOINCREMENT,
            finished_at TEXT NOT NULL,
            games_parsed INTEGER NOT NULL,
            documents_skipped INTEGER NOT NULL,
            errors_json TEXT NOT NULL
        );
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

/// Upsert the batch's games and season snapshot, and record the run itself.
pub fn record_season(
    conn: &mut Connection,
    games: &[GameRecord],
    table: &BTreeMap<String, SeasonStats>,
    report: &IngestReport,
) -> Result<PersistSummary> {
    let now = Utc::now().to_rfc3339();
    let tx = conn.transaction().context("begin season transaction")?;

    let mut games_upserted = 0usize;
    for game in games {
        tx.execute(
            r#"
            INSERT INTO games (date, opponent, home_away, own_score, opp_score, result, is_close, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(date, opponent) DO UPDATE SET
                home_away = excluded.home_away,
                own_score = excluded.own_score,
                opp_score = excluded.opp_score,
                result = excluded.result,
                is_close = excluded.is_close,
                updated_at = excluded.updated_at
            "#,
            params![
                game.date,
                game.opponent,
                game.home_away.as_str(),
                game.own_score,
                game.opp_score,
                game.result.as_str(),
                game.is_close as i64,
                now,
            ],
        )
        .with_context(|| format!("upsert game vs {}", game.opponent))?;
        games_upserted += 1;
    }

    let mut players_upserted = 0usize;
    for stats in table.values() {
        tx.execute(
            r#"
            INSERT OR REPLACE INTO player_season
                (name, jersey, position, games, minutes, points, fgm, fga, fgm3, fga3,
                 ftm, fta, oreb, dreb, assists, steals, blocks, turnovers, plus_minus, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                    ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
            "#,
            params![
                stats.name,
                stats.jersey,
                stats.position,
                stats.games,
                stats.minutes,
                stats.points,
                stats.fgm,
                stats.fga,
                stats.fgm3,
                stats.fga3,
                stats.ftm,
                stats.fta,
                stats.oreb,
                stats.dreb,
                stats.assists,
                stats.steals,
                stats.blocks,
                stats.turnovers,
                stats.plus_minus,
                now,
            ],
        )
        .with_context(|| format!("upsert season row for {}", stats.name))?;
        players_upserted += 1;
    }

    let errors: Vec<String> = report
        .skipped
        .iter()
        .map(|(file, reason)| format!("{file}: {reason}"))
        .collect();
    tx.execute(
        "INSERT INTO ingest_runs (finished_at, games_parsed, documents_skipped, errors_json)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            now,
            report.parsed as i64,
            report.skipped.len() as i64,
            serde_json::to_string(&errors).context("serialize ingest errors")?,
        ],
    )
    .context("record ingest run")?;

    tx.commit().context("commit season transaction")?;

    Ok(PersistSummary {
        games_upserted,
        players_upserted,
    })
}

/// Count of stored games, for post-run reporting.
pub fn stored_game_count(conn: &Connection) -> Result<usize> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))
        .context("count stored games")?;
    Ok(count as usize)
}
